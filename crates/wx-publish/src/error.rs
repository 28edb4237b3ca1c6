//! Error types for the publishing API client.

use wx_images::ImageError;

/// Publishing API error.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// HTTP request failed (network error, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response indicates an error (4xx, 5xx status).
    #[error("HTTP {status}: {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The API answered with a non-zero `errcode`.
    #[error("API error {errcode}: {errmsg}")]
    Api {
        /// API error code.
        errcode: i64,
        /// API error message.
        errmsg: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<PublishError> for ImageError {
    fn from(err: PublishError) -> Self {
        Self::Upload(err.to_string())
    }
}
