//! Client for the WeChat Official Accounts API.
//!
//! [`WxClient`] covers what publishing an article needs: an access token,
//! image uploads (permanent material and in-content images), the material
//! library, and the draft box. It plugs into the image pipeline as its
//! [`ImageUploader`](wx_images::ImageUploader) and
//! [`RemoteFetcher`](wx_images::RemoteFetcher), and into the article layer as
//! its [`DraftPublisher`].
//!
//! Enable the `mock` feature for an in-memory [`MockPublisher`].

mod client;
mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod publisher;
mod types;

pub use client::{DEFAULT_BASE_URL, WxClient};
pub use error::PublishError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockPublisher;
pub use publisher::DraftPublisher;
pub use types::{
    ApiStatus, DraftArticle, DraftContent, DraftItem, DraftList, DraftResult, MaterialItem,
    MaterialList, NewsItem, TokenResponse,
};
