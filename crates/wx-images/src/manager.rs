//! Registry of image references and their upload state.

use std::collections::{HashMap, HashSet};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use indexmap::IndexMap;
use tracing::{debug, info, warn};
use wx_css::dom::{self, Fragment};

use crate::error::ImageError;
use crate::mime;
use crate::service::{ImageServices, MEDIA_HOST, Transcoder, UploadResult};

/// Upload state of one image reference.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageInfo {
    /// Reference as it appears in the rendered `src` (or `#id` for inline
    /// data images).
    pub res_url: String,
    /// Vault path of the source file; empty for remote and inline images.
    pub file_path: String,
    /// Hosted URL after a successful upload.
    pub url: Option<String>,
    /// Media id returned by the upload.
    pub media_id: Option<String>,
}

impl ImageInfo {
    /// Unresolved entry for a vault file.
    pub fn local(res_url: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            res_url: res_url.into(),
            file_path: file_path.into(),
            url: None,
            media_id: None,
        }
    }

    /// Whether the image already has a hosted URL.
    pub fn is_resolved(&self) -> bool {
        self.url.is_some()
    }

    fn resolve(&mut self, result: &UploadResult) {
        self.url = result.hosted_url();
        self.media_id = result.media_id.clone().filter(|id| !id.is_empty());
    }
}

/// Outcome counts of one upload pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UploadReport {
    /// Images uploaded successfully.
    pub uploaded: usize,
    /// Images that could not be uploaded and stay unresolved.
    pub failed: usize,
}

/// Maps every image reference of an article to its upload state.
///
/// Entries are keyed by the reference string and kept in registration
/// order. A key that already carries a hosted URL is never uploaded again,
/// so repeated render/publish cycles only upload new images until
/// [`cleanup`](Self::cleanup) is called.
#[derive(Debug, Default)]
pub struct LocalImageManager {
    images: IndexMap<String, ImageInfo>,
    watermark: Option<Vec<u8>>,
    webp_warned: HashSet<String>,
    warnings: Vec<String>,
}

impl LocalImageManager {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp this watermark onto every uploaded image.
    #[must_use]
    pub fn with_watermark(mut self, watermark: Vec<u8>) -> Self {
        self.watermark = Some(watermark);
        self
    }

    /// Register an image under `key`. The first registration wins.
    pub fn register_local_image(&mut self, key: impl Into<String>, info: ImageInfo) {
        self.images.entry(key.into()).or_insert(info);
    }

    /// Look up an entry.
    pub fn get(&self, key: &str) -> Option<&ImageInfo> {
        self.images.get(key)
    }

    /// All entries in registration order.
    pub fn images(&self) -> impl Iterator<Item = (&str, &ImageInfo)> {
        self.images.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of registered references.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Warnings raised by upload passes since the last cleanup.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Upload every registered vault image that has no hosted URL yet.
    pub fn upload_local_images(&mut self, token: &str, services: ImageServices<'_>) -> UploadReport {
        let mut report = UploadReport::default();
        let pending: Vec<String> = self
            .images
            .iter()
            .filter(|(_, info)| !info.is_resolved() && !info.file_path.is_empty())
            .map(|(key, _)| key.clone())
            .collect();

        for key in pending {
            let Some(file_path) = self.images.get(&key).map(|i| i.file_path.clone()) else {
                continue;
            };
            let data = match services.reader.read_bytes(&file_path) {
                Ok(data) => data,
                Err(err) => {
                    self.warn(format!("读取图片失败: {file_path}: {err}"));
                    report.failed += 1;
                    continue;
                }
            };
            let name = file_path.rsplit('/').next().unwrap_or(&file_path).to_owned();

            match self.upload_one(&key, data, &name, token, services) {
                Some(result) => {
                    if let Some(info) = self.images.get_mut(&key) {
                        info.resolve(&result);
                    }
                    report.uploaded += 1;
                }
                None => report.failed += 1,
            }
        }

        report
    }

    /// Upload remote (`http...`) and inline (`data:image/...`) images found
    /// in `html`.
    ///
    /// Images already served by the media host, or whose reference already
    /// has a hosted URL, are skipped. Inline images without an `id` get a
    /// generated `local-img-N` id and are registered as `#id`, so the
    /// returned HTML must replace the input.
    pub fn upload_remote_images(
        &mut self,
        html: &str,
        token: &str,
        services: ImageServices<'_>,
    ) -> (String, UploadReport) {
        let fragment = Fragment::parse(html);
        let mut report = UploadReport::default();

        for (index, img) in fragment.select_all("img").iter().enumerate() {
            let Some(src) = dom::get_attr(img, "src") else {
                continue;
            };
            if src.contains(MEDIA_HOST) || self.is_hosted(&src) {
                continue;
            }

            if src.starts_with("http") {
                if self.images.get(&src).is_some_and(ImageInfo::is_resolved) {
                    continue;
                }
                match self.upload_remote(&src, token, services) {
                    Ok(Some(result)) => {
                        let mut info = ImageInfo::local(src.clone(), "");
                        info.resolve(&result);
                        self.images.insert(src, info);
                        report.uploaded += 1;
                    }
                    Ok(None) => report.failed += 1,
                    Err(err) => {
                        self.warn(format!("上传图片失败: {src}: {err}"));
                        report.failed += 1;
                    }
                }
            } else if src.starts_with("data:image/") {
                let id = dom::get_attr(img, "id")
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| {
                        let id = format!("local-img-{index}");
                        dom::set_attr(img, "id", id.clone());
                        id
                    });
                let key = format!("#{id}");
                if self.images.get(&key).is_some_and(ImageInfo::is_resolved) {
                    continue;
                }
                let (data, ext) = match decode_data_uri(&src) {
                    Ok(decoded) => decoded,
                    Err(err) => {
                        self.warn(format!("上传图片失败: {key}: {err}"));
                        report.failed += 1;
                        continue;
                    }
                };
                let name = format!("{id}{ext}");
                match self.upload_one(&key, data, &name, token, services) {
                    Some(result) => {
                        let mut info = ImageInfo::local(key.clone(), "");
                        info.resolve(&result);
                        self.images.insert(key, info);
                        report.uploaded += 1;
                    }
                    None => report.failed += 1,
                }
            }
        }

        (fragment.to_html(), report)
    }

    /// Point every `<img>` with a hosted URL at that URL.
    ///
    /// Images are looked up by `src`, then by `#id`. Unresolved images keep
    /// their original reference.
    pub fn replace_image_references(&self, html: &str) -> String {
        let fragment = Fragment::parse(html);
        for img in fragment.select_all("img") {
            let src = dom::get_attr(&img, "src").unwrap_or_default();
            let info = self.images.get(&src).or_else(|| {
                dom::get_attr(&img, "id")
                    .filter(|id| !id.is_empty())
                    .and_then(|id| self.images.get(&format!("#{id}")))
            });
            match info.and_then(|i| i.url.as_deref()) {
                Some(url) => dom::set_attr(&img, "src", url),
                None => debug!("Leaving image reference unchanged: {src}"),
            }
        }
        fragment.to_html()
    }

    /// Produce a self-contained copy of `html` with every image inlined as a
    /// `data:` URI.
    ///
    /// Registered vault images are read through the vault reader; remote
    /// images are downloaded once per call.
    pub fn embed_as_base64(&self, html: &str, services: ImageServices<'_>) -> String {
        let mut local: HashMap<&str, String> = HashMap::new();
        for info in self.images.values().filter(|i| !i.file_path.is_empty()) {
            match services.reader.read_bytes(&info.file_path) {
                Ok(data) => {
                    let mime = mime::mime_for_path(&info.file_path);
                    local.insert(info.res_url.as_str(), data_uri(mime, &data));
                }
                Err(err) => warn!("Failed to read {}: {err}", info.file_path),
            }
        }

        let mut remote: HashMap<String, Option<String>> = HashMap::new();
        let fragment = Fragment::parse(html);
        for img in fragment.select_all("img") {
            let Some(src) = dom::get_attr(&img, "src") else {
                continue;
            };
            let inlined = if src.starts_with("http") {
                remote
                    .entry(src.clone())
                    .or_insert_with(|| download_as_data_uri(&src, services))
                    .clone()
            } else {
                local.get(src.as_str()).cloned()
            };
            if let Some(uri) = inlined {
                dom::set_attr(&img, "src", uri);
            }
        }
        fragment.to_html()
    }

    /// Forget every registered image and the warnings of the last cycle.
    pub fn cleanup(&mut self) {
        self.images.clear();
        self.warnings.clear();
        self.webp_warned.clear();
    }

    /// Prepare and upload one image. Returns the result on success; failures
    /// are recorded as warnings.
    fn upload_one(
        &mut self,
        key: &str,
        data: Vec<u8>,
        name: &str,
        token: &str,
        services: ImageServices<'_>,
    ) -> Option<UploadResult> {
        let (data, name) = self.prepare(key, data, name, services.transcoder);

        info!("Uploading image '{name}'");
        match services.uploader.upload(&data, &name, token) {
            Ok(result) if result.is_ok() && result.hosted_url().is_some() => Some(result),
            Ok(result) if result.is_ok() => {
                self.warn(format!("上传图片失败: {name}: 响应中没有图片地址"));
                None
            }
            Ok(result) => {
                self.warn(format!("上传图片失败: {} {}", result.errcode, result.errmsg));
                None
            }
            Err(err) => {
                self.warn(format!("上传图片失败: {name}: {err}"));
                None
            }
        }
    }

    /// Download and upload a remote image. `Ok(None)` means the API
    /// rejected the upload.
    fn upload_remote(
        &mut self,
        url: &str,
        token: &str,
        services: ImageServices<'_>,
    ) -> Result<Option<UploadResult>, ImageError> {
        let fetched = services.fetcher.fetch(url)?;
        let name = mime::image_name_from_url(url, fetched.content_type.as_deref());
        Ok(self.upload_one(url, fetched.bytes, &name, token, services))
    }

    /// Apply WebP conversion and the watermark.
    fn prepare(
        &mut self,
        key: &str,
        data: Vec<u8>,
        name: &str,
        transcoder: &dyn Transcoder,
    ) -> (Vec<u8>, String) {
        let mut data = data;
        let mut name = name.to_owned();

        if mime::is_webp(&name) {
            if transcoder.ready() {
                match transcoder.webp_to_jpeg(&data) {
                    Ok(jpeg) => {
                        data = jpeg;
                        name = mime::webp_to_jpg_name(&name);
                    }
                    Err(err) => self.warn(format!("WebP 转换失败，使用原图上传: {name}: {err}")),
                }
            } else if self.webp_warned.insert(key.to_owned()) {
                self.warn(format!("图片处理模块未就绪，WebP 图片按原格式上传: {name}"));
            }
        }

        let marked = self
            .watermark
            .as_deref()
            .map(|watermark| transcoder.add_watermark(&data, watermark));
        match marked {
            Some(Ok(marked)) => data = marked,
            Some(Err(err)) => self.warn(format!("添加水印失败: {name}: {err}")),
            None => {}
        }

        (data, name)
    }

    /// Whether `src` is the hosted URL of an uploaded image.
    fn is_hosted(&self, src: &str) -> bool {
        self.images.values().any(|info| info.url.as_deref() == Some(src))
    }

    fn warn(&mut self, message: String) {
        warn!("{message}");
        self.warnings.push(message);
    }
}

/// Decode a `data:image/...;base64,` URI into bytes and a file extension.
fn decode_data_uri(src: &str) -> Result<(Vec<u8>, &'static str), ImageError> {
    let (header, payload) = src.split_once(',').ok_or(ImageError::InvalidDataUri)?;
    let mime = header
        .trim_start_matches("data:")
        .split(';')
        .next()
        .unwrap_or_default();
    let data = STANDARD.decode(payload.trim())?;
    Ok((data, mime::extension_for_mime(mime)))
}

fn data_uri(mime: &str, data: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(data))
}

fn download_as_data_uri(url: &str, services: ImageServices<'_>) -> Option<String> {
    match services.fetcher.fetch(url) {
        Ok(fetched) => {
            let mime = fetched
                .content_type
                .as_deref()
                .map(|ct| ct.split(';').next().unwrap_or_default().trim().to_owned())
                .filter(|ct| ct.starts_with("image/"))
                .unwrap_or_else(|| {
                    let name = mime::image_name_from_url(url, None);
                    mime::mime_for_path(&name).to_owned()
                });
            Some(data_uri(&mime, &fetched.bytes))
        }
        Err(err) => {
            warn!("Failed to download {url}: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockFetcher, MockTranscoder, MockUploader, MockVault};
    use pretty_assertions::assert_eq;

    struct Fixture {
        uploader: MockUploader,
        fetcher: MockFetcher,
        vault: MockVault,
        transcoder: MockTranscoder,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                uploader: MockUploader::new(),
                fetcher: MockFetcher::new(),
                vault: MockVault::new()
                    .with_file("attachments/a.png", b"png-a".to_vec())
                    .with_file("attachments/b.webp", b"webp-b".to_vec()),
                transcoder: MockTranscoder::new(true),
            }
        }

        fn services(&self) -> ImageServices<'_> {
            ImageServices {
                uploader: &self.uploader,
                fetcher: &self.fetcher,
                reader: &self.vault,
                transcoder: &self.transcoder,
            }
        }
    }

    #[test]
    fn test_first_registration_wins() {
        let mut manager = LocalImageManager::new();
        manager.register_local_image("a.png", ImageInfo::local("a.png", "attachments/a.png"));
        manager.register_local_image("a.png", ImageInfo::local("a.png", "other/a.png"));
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.get("a.png").unwrap().file_path, "attachments/a.png");
    }

    #[test]
    fn test_upload_local_images_once_per_key() {
        let fixture = Fixture::new();
        let mut manager = LocalImageManager::new();
        for _ in 0..3 {
            manager.register_local_image("a.png", ImageInfo::local("a.png", "attachments/a.png"));
        }

        let report = manager.upload_local_images("tok", fixture.services());
        assert_eq!(report, UploadReport { uploaded: 1, failed: 0 });

        // A second cycle without cleanup issues no further uploads.
        manager.register_local_image("a.png", ImageInfo::local("a.png", "attachments/a.png"));
        let report = manager.upload_local_images("tok", fixture.services());
        assert_eq!(report, UploadReport::default());
        assert_eq!(fixture.uploader.calls(), vec!["a.png".to_owned()]);
        assert!(manager.get("a.png").unwrap().is_resolved());
    }

    #[test]
    fn test_cleanup_allows_reupload() {
        let fixture = Fixture::new();
        let mut manager = LocalImageManager::new();
        manager.register_local_image("a.png", ImageInfo::local("a.png", "attachments/a.png"));
        manager.upload_local_images("tok", fixture.services());
        manager.cleanup();
        assert!(manager.is_empty());

        manager.register_local_image("a.png", ImageInfo::local("a.png", "attachments/a.png"));
        manager.upload_local_images("tok", fixture.services());
        assert_eq!(fixture.uploader.calls().len(), 2);
    }

    #[test]
    fn test_upload_error_leaves_entry_unresolved() {
        let mut fixture = Fixture::new();
        fixture.uploader = MockUploader::new().failing_with(45009, "reach max api daily quota limit");
        let mut manager = LocalImageManager::new();
        manager.register_local_image("a.png", ImageInfo::local("a.png", "attachments/a.png"));

        let report = manager.upload_local_images("tok", fixture.services());
        assert_eq!(report, UploadReport { uploaded: 0, failed: 1 });
        assert!(!manager.get("a.png").unwrap().is_resolved());
        assert_eq!(
            manager.warnings(),
            ["上传图片失败: 45009 reach max api daily quota limit".to_owned()]
        );

        let html = manager.replace_image_references(r#"<img src="a.png">"#);
        assert_eq!(html, r#"<img src="a.png">"#);
    }

    #[test]
    fn test_missing_vault_file_is_isolated() {
        let fixture = Fixture::new();
        let mut manager = LocalImageManager::new();
        manager.register_local_image("gone.png", ImageInfo::local("gone.png", "gone.png"));
        manager.register_local_image("a.png", ImageInfo::local("a.png", "attachments/a.png"));

        let report = manager.upload_local_images("tok", fixture.services());
        assert_eq!(report, UploadReport { uploaded: 1, failed: 1 });
        assert!(manager.get("a.png").unwrap().is_resolved());
    }

    #[test]
    fn test_webp_is_transcoded_when_ready() {
        let fixture = Fixture::new();
        let mut manager = LocalImageManager::new();
        manager.register_local_image("b.webp", ImageInfo::local("b.webp", "attachments/b.webp"));

        manager.upload_local_images("tok", fixture.services());
        assert_eq!(fixture.uploader.calls(), vec!["b.jpg".to_owned()]);
        assert_eq!(fixture.uploader.last_data(), b"jpeg:webp-b".to_vec());
    }

    #[test]
    fn test_webp_uploaded_as_is_when_transcoder_not_ready() {
        let mut fixture = Fixture::new();
        fixture.transcoder = MockTranscoder::new(false);
        fixture.uploader = MockUploader::new().failing_with(-1, "system error");
        let mut manager = LocalImageManager::new();
        manager.register_local_image("b.webp", ImageInfo::local("b.webp", "attachments/b.webp"));

        // First attempt fails at the API, the retry succeeds.
        manager.upload_local_images("tok", fixture.services());
        fixture.uploader.recover();
        manager.upload_local_images("tok", fixture.services());

        assert_eq!(
            fixture.uploader.calls(),
            vec!["b.webp".to_owned(), "b.webp".to_owned()]
        );
        assert_eq!(fixture.uploader.last_data(), b"webp-b".to_vec());
        assert!(manager.get("b.webp").unwrap().is_resolved());
        let webp_warnings = manager
            .warnings()
            .iter()
            .filter(|w| w.contains("WebP"))
            .count();
        assert_eq!(webp_warnings, 1);
    }

    #[test]
    fn test_webp_warning_repeats_after_cleanup() {
        let mut fixture = Fixture::new();
        fixture.transcoder = MockTranscoder::new(false);
        let mut manager = LocalImageManager::new();
        let count_webp = |manager: &LocalImageManager| {
            manager.warnings().iter().filter(|w| w.contains("WebP")).count()
        };

        manager.register_local_image("b.webp", ImageInfo::local("b.webp", "attachments/b.webp"));
        manager.upload_local_images("tok", fixture.services());
        assert_eq!(count_webp(&manager), 1);

        manager.cleanup();
        manager.register_local_image("b.webp", ImageInfo::local("b.webp", "attachments/b.webp"));
        manager.upload_local_images("tok", fixture.services());
        assert_eq!(count_webp(&manager), 1);
        assert_eq!(fixture.uploader.calls().len(), 2);
    }

    #[test]
    fn test_upload_without_url_is_not_counted() {
        let mut fixture = Fixture::new();
        fixture.uploader = MockUploader::new().without_url();
        let mut manager = LocalImageManager::new();
        manager.register_local_image("a.png", ImageInfo::local("a.png", "attachments/a.png"));

        let report = manager.upload_local_images("tok", fixture.services());
        assert_eq!(report, UploadReport { uploaded: 0, failed: 1 });
        assert!(!manager.get("a.png").unwrap().is_resolved());
        assert_eq!(
            manager.warnings(),
            ["上传图片失败: a.png: 响应中没有图片地址".to_owned()]
        );

        fixture.fetcher.insert("https://example.com/x.png", b"x".to_vec(), Some("image/png"));
        let (_, report) = manager.upload_remote_images(
            r#"<img src="https://example.com/x.png">"#,
            "tok",
            fixture.services(),
        );
        assert_eq!(report, UploadReport { uploaded: 0, failed: 1 });
        assert!(manager.get("https://example.com/x.png").is_none());
    }

    #[test]
    fn test_watermark_applied_before_upload() {
        let fixture = Fixture::new();
        let mut manager = LocalImageManager::new().with_watermark(b"wm".to_vec());
        manager.register_local_image("a.png", ImageInfo::local("a.png", "attachments/a.png"));

        manager.upload_local_images("tok", fixture.services());
        assert_eq!(fixture.uploader.last_data(), b"png-a+wm".to_vec());
    }

    #[test]
    fn test_replace_image_references() {
        let fixture = Fixture::new();
        let mut manager = LocalImageManager::new();
        manager.register_local_image("a.png", ImageInfo::local("a.png", "attachments/a.png"));
        manager.upload_local_images("tok", fixture.services());

        let html = manager.replace_image_references(
            r#"<p><img alt="x" src="a.png"><img src="unknown.png"></p>"#,
        );
        assert_eq!(
            html,
            r#"<p><img alt="x" src="https://mmbiz.qpic.cn/mmbiz_png/1/0"><img src="unknown.png"></p>"#
        );
    }

    #[test]
    fn test_upload_remote_images() {
        let fixture = Fixture::new();
        fixture
            .fetcher
            .insert("https://example.com/cat.png", b"remote".to_vec(), Some("image/png"));
        let mut manager = LocalImageManager::new();

        let html = r#"<img src="https://example.com/cat.png"><img src="https://mmbiz.qpic.cn/x.png">"#;
        let (html, report) = manager.upload_remote_images(html, "tok", fixture.services());
        assert_eq!(report.uploaded, 1);
        assert_eq!(fixture.uploader.calls(), vec!["cat.png".to_owned()]);

        // Already uploaded: not fetched or uploaded again.
        let (_, report) = manager.upload_remote_images(&html, "tok", fixture.services());
        assert_eq!(report, UploadReport::default());
        assert_eq!(fixture.fetcher.fetch_count(), 1);

        let html = manager.replace_image_references(&html);
        assert!(html.contains(r#"src="https://mmbiz.qpic.cn/mmbiz_png/1/0""#));
    }

    #[test]
    fn test_upload_inline_data_image() {
        let fixture = Fixture::new();
        let mut manager = LocalImageManager::new();
        let src = format!("data:image/png;base64,{}", STANDARD.encode(b"inline"));
        let html = format!(r#"<p>x</p><img src="{src}">"#);

        let (html, report) = manager.upload_remote_images(&html, "tok", fixture.services());
        assert_eq!(report.uploaded, 1);
        assert_eq!(fixture.uploader.calls(), vec!["local-img-0.png".to_owned()]);
        assert_eq!(fixture.uploader.last_data(), b"inline".to_vec());
        assert!(html.contains(r#"id="local-img-0""#));
        assert!(manager.get("#local-img-0").unwrap().is_resolved());

        let replaced = manager.replace_image_references(&html);
        assert!(replaced.contains(r#"src="https://mmbiz.qpic.cn/mmbiz_png/1/0""#));
    }

    #[test]
    fn test_embed_as_base64() {
        let fixture = Fixture::new();
        fixture
            .fetcher
            .insert("https://example.com/cat.gif", b"gif".to_vec(), Some("image/gif"));
        let mut manager = LocalImageManager::new();
        manager.register_local_image("a.png", ImageInfo::local("a.png", "attachments/a.png"));

        let html = concat!(
            r#"<img src="a.png">"#,
            r#"<img src="https://example.com/cat.gif">"#,
            r#"<img src="https://example.com/cat.gif">"#,
        );
        let out = manager.embed_as_base64(html, fixture.services());

        let fragment = Fragment::parse(&out);
        let srcs: Vec<String> = fragment
            .select_all("img")
            .iter()
            .filter_map(|img| dom::get_attr(img, "src"))
            .collect();
        assert_eq!(srcs.len(), 3);
        assert!(srcs.iter().all(|s| s.starts_with("data:")));
        assert_eq!(srcs[0], format!("data:image/png;base64,{}", STANDARD.encode(b"png-a")));
        assert_eq!(srcs[1], format!("data:image/gif;base64,{}", STANDARD.encode(b"gif")));
        assert_eq!(fixture.fetcher.fetch_count(), 1);
        assert!(fixture.uploader.calls().is_empty());
    }

    #[test]
    fn test_decode_data_uri() {
        let (data, ext) = decode_data_uri("data:image/gif;base64,R0lG").unwrap();
        assert_eq!(data, vec![0x47, 0x49, 0x46]);
        assert_eq!(ext, ".gif");
        assert!(matches!(
            decode_data_uri("data:image/gif;base64"),
            Err(ImageError::InvalidDataUri)
        ));
    }
}
