//! Image handling for WeChat articles.
//!
//! Rendered articles reference images in three ways: vault attachments
//! embedded with `![[...]]`, remote `http(s)` URLs and inline `data:` URIs.
//! The publishing host accepts none of them, so every image has to be
//! uploaded through the publishing API and its `src` rewritten to the hosted
//! URL. [`LocalImageManager`] tracks each reference through that lifecycle:
//!
//! 1. the renderer registers vault images while rendering
//!    ([`LocalImageManager::register_local_image`]);
//! 2. [`upload_local_images`](LocalImageManager::upload_local_images) and
//!    [`upload_remote_images`](LocalImageManager::upload_remote_images)
//!    upload whatever is not hosted yet;
//! 3. [`replace_image_references`](LocalImageManager::replace_image_references)
//!    rewrites the HTML.
//!
//! For local export, [`embed_as_base64`](LocalImageManager::embed_as_base64)
//! inlines every image instead.
//!
//! Collaborators (uploader, downloader, vault, transcoder) are injected
//! through the traits in [`service`]; enable the `mock` feature for
//! in-memory implementations.

mod error;
mod manager;
pub mod mime;
#[cfg(any(test, feature = "mock"))]
mod mock;
pub mod service;
mod transcode;

pub use error::ImageError;
pub use manager::{ImageInfo, LocalImageManager, UploadReport};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockFetcher, MockTranscoder, MockUploader, MockVault};
pub use service::{
    FetchedImage, ImageServices, ImageUploader, MEDIA_HOST, NoopTranscoder, RemoteFetcher,
    Transcoder, UploadResult, VaultReader,
};
pub use transcode::ImageTranscoder;
