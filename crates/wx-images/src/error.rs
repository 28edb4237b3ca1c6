//! Error types for image handling.

/// Error from reading, converting or uploading an image.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// File missing from the vault.
    #[error("file not found: {0}")]
    NotFound(String),

    /// I/O error while reading a vault file.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// Transport-level upload failure (network error, unreadable response).
    #[error("upload failed: {0}")]
    Upload(String),

    /// Remote image could not be downloaded.
    #[error("failed to download {url}: {message}")]
    Fetch {
        /// Image URL.
        url: String,
        /// Failure description.
        message: String,
    },

    /// `data:` URI without the `<header>,<payload>` shape.
    #[error("malformed data URI")]
    InvalidDataUri,

    /// Base64 payload that does not decode.
    #[error("invalid base64 payload")]
    Base64(#[from] base64::DecodeError),

    /// Decoding or encoding failed inside the transcoder.
    #[error("image transcoding failed")]
    Transcode(#[from] image::ImageError),

    /// The transcoder is not able to process images.
    #[error("image transcoder is not available")]
    TranscoderUnavailable,
}
