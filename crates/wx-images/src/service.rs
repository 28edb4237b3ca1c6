//! Collaborator interfaces consumed by the image pipeline.
//!
//! The vault, the publishing API, remote downloads and transcoding all live
//! outside this crate. They are injected through these traits so the
//! pipeline can be driven by real clients or by in-memory mocks.

use serde::Deserialize;

use crate::error::ImageError;

/// Host that serves media uploaded through the publishing API.
pub const MEDIA_HOST: &str = "mmbiz.qpic.cn";

/// Response of the publishing API's image upload endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct UploadResult {
    /// Hosted URL of the image, when the endpoint returns one.
    #[serde(default)]
    pub url: Option<String>,
    /// Media id of the stored asset.
    #[serde(default)]
    pub media_id: Option<String>,
    /// API error code, `0` on success.
    #[serde(default)]
    pub errcode: i64,
    /// API error message.
    #[serde(default)]
    pub errmsg: String,
}

impl UploadResult {
    /// Whether the API reported success.
    pub fn is_ok(&self) -> bool {
        self.errcode == 0
    }

    /// URL to reference the image by.
    ///
    /// Prefers the direct URL and falls back to one derived from the media id,
    /// since some asset types are returned without a URL.
    pub fn hosted_url(&self) -> Option<String> {
        self.url
            .clone()
            .filter(|u| !u.is_empty())
            .or_else(|| {
                self.media_id
                    .as_ref()
                    .filter(|id| !id.is_empty())
                    .map(|id| format!("https://mmbiz.qlogo.cn/mmbiz_png/{id}/0?wx_fmt=png"))
            })
    }
}

/// Uploads image bytes to the publishing API.
pub trait ImageUploader {
    /// Upload one image. API-level failures are reported through
    /// [`UploadResult::errcode`]; `Err` means the request itself failed.
    fn upload(&self, data: &[u8], filename: &str, token: &str) -> Result<UploadResult, ImageError>;
}

/// Downloaded remote image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchedImage {
    /// Raw bytes.
    pub bytes: Vec<u8>,
    /// `Content-Type` header, if the server sent one.
    pub content_type: Option<String>,
}

/// Downloads remote images.
pub trait RemoteFetcher {
    /// Fetch the image at `url`.
    fn fetch(&self, url: &str) -> Result<FetchedImage, ImageError>;
}

/// Reads binary files from the vault by vault path.
pub trait VaultReader {
    /// Read the whole file.
    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, ImageError>;
}

/// Converts and decorates images before upload.
pub trait Transcoder {
    /// Whether the transcoder can process images right now.
    fn ready(&self) -> bool;

    /// Re-encode a WebP image as JPEG.
    fn webp_to_jpeg(&self, data: &[u8]) -> Result<Vec<u8>, ImageError>;

    /// Stamp `watermark` onto `image`, keeping the image's format.
    fn add_watermark(&self, image: &[u8], watermark: &[u8]) -> Result<Vec<u8>, ImageError>;
}

/// Transcoder that is never ready. Images are uploaded untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTranscoder;

impl Transcoder for NoopTranscoder {
    fn ready(&self) -> bool {
        false
    }

    fn webp_to_jpeg(&self, _data: &[u8]) -> Result<Vec<u8>, ImageError> {
        Err(ImageError::TranscoderUnavailable)
    }

    fn add_watermark(&self, _image: &[u8], _watermark: &[u8]) -> Result<Vec<u8>, ImageError> {
        Err(ImageError::TranscoderUnavailable)
    }
}

/// The set of collaborators one pipeline run talks to.
#[derive(Clone, Copy)]
pub struct ImageServices<'a> {
    /// Publishing API upload endpoint.
    pub uploader: &'a dyn ImageUploader,
    /// Remote image downloader.
    pub fetcher: &'a dyn RemoteFetcher,
    /// Vault file access.
    pub reader: &'a dyn VaultReader,
    /// WebP conversion and watermarking.
    pub transcoder: &'a dyn Transcoder,
}
