//! In-memory collaborators for testing.
//!
//! Provides [`MockUploader`], [`MockFetcher`], [`MockVault`] and
//! [`MockTranscoder`] so the image pipeline can be exercised without a
//! network or a vault on disk.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::ImageError;
use crate::service::{
    FetchedImage, ImageUploader, RemoteFetcher, Transcoder, UploadResult, VaultReader,
};

/// Mock upload endpoint.
///
/// Records every call and hands out URLs on the media host numbered from 1.
/// Use [`failing_with`](Self::failing_with) to make the API reject uploads,
/// or [`without_url`](Self::without_url) for an empty success response.
#[derive(Debug, Default)]
pub struct MockUploader {
    calls: RwLock<Vec<String>>,
    last_data: RwLock<Vec<u8>>,
    failure: RwLock<Option<(i64, String)>>,
}

impl MockUploader {
    /// Create an uploader that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every upload with this API error.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn failing_with(self, errcode: i64, errmsg: impl Into<String>) -> Self {
        *self.failure.write().unwrap() = Some((errcode, errmsg.into()));
        self
    }

    /// Accept uploads but answer with neither a URL nor a media id.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn without_url(self) -> Self {
        *self.failure.write().unwrap() = Some((0, String::new()));
        self
    }

    /// Accept uploads again after [`failing_with`](Self::failing_with).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn recover(&self) {
        *self.failure.write().unwrap() = None;
    }

    /// File names of every upload attempt, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// Bytes of the most recent upload attempt.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn last_data(&self) -> Vec<u8> {
        self.last_data.read().unwrap().clone()
    }
}

impl ImageUploader for MockUploader {
    fn upload(&self, data: &[u8], filename: &str, _token: &str) -> Result<UploadResult, ImageError> {
        let mut calls = self.calls.write().unwrap();
        calls.push(filename.to_owned());
        *self.last_data.write().unwrap() = data.to_vec();

        if let Some((errcode, errmsg)) = self.failure.read().unwrap().clone() {
            return Ok(UploadResult {
                errcode,
                errmsg,
                ..Default::default()
            });
        }

        let n = calls.len();
        Ok(UploadResult {
            url: Some(format!("https://mmbiz.qpic.cn/mmbiz_png/{n}/0")),
            media_id: Some(format!("media-{n}")),
            ..Default::default()
        })
    }
}

/// Mock remote downloader serving registered URLs.
#[derive(Debug, Default)]
pub struct MockFetcher {
    images: RwLock<HashMap<String, FetchedImage>>,
    count: RwLock<usize>,
}

impl MockFetcher {
    /// Create a fetcher with no URLs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bytes` at `url`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn insert(&self, url: impl Into<String>, bytes: Vec<u8>, content_type: Option<&str>) {
        self.images.write().unwrap().insert(
            url.into(),
            FetchedImage {
                bytes,
                content_type: content_type.map(str::to_owned),
            },
        );
    }

    /// Number of fetch calls so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        *self.count.read().unwrap()
    }
}

impl RemoteFetcher for MockFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedImage, ImageError> {
        *self.count.write().unwrap() += 1;
        self.images
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| ImageError::Fetch {
                url: url.to_owned(),
                message: "404 Not Found".to_owned(),
            })
    }
}

/// Mock vault holding binary files by vault path.
#[derive(Debug, Default)]
pub struct MockVault {
    files: HashMap<String, Vec<u8>>,
}

impl MockVault {
    /// Create an empty vault.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>, data: Vec<u8>) -> Self {
        self.files.insert(path.into(), data);
        self
    }
}

impl VaultReader for MockVault {
    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, ImageError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| ImageError::NotFound(path.to_owned()))
    }
}

/// Mock transcoder with recognisable output.
///
/// WebP conversion prefixes the input with `jpeg:`; watermarking appends
/// `+` and the watermark bytes.
#[derive(Debug)]
pub struct MockTranscoder {
    ready: bool,
}

impl MockTranscoder {
    /// Create a transcoder reporting the given readiness.
    #[must_use]
    pub fn new(ready: bool) -> Self {
        Self { ready }
    }
}

impl Transcoder for MockTranscoder {
    fn ready(&self) -> bool {
        self.ready
    }

    fn webp_to_jpeg(&self, data: &[u8]) -> Result<Vec<u8>, ImageError> {
        if !self.ready {
            return Err(ImageError::TranscoderUnavailable);
        }
        let mut out = b"jpeg:".to_vec();
        out.extend_from_slice(data);
        Ok(out)
    }

    fn add_watermark(&self, image: &[u8], watermark: &[u8]) -> Result<Vec<u8>, ImageError> {
        let mut out = image.to_vec();
        out.push(b'+');
        out.extend_from_slice(watermark);
        Ok(out)
    }
}
