//! Error types for rendering.

/// Error from a collaborator consulted while rendering.
///
/// Rendering itself never fails: these errors are turned into inline
/// messages in the produced HTML.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// File missing from the vault.
    #[error("file not found: {0}")]
    NotFound(String),

    /// I/O error while reading a vault file.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// Vault file that is not valid UTF-8.
    #[error("file is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    /// Math renderer failure.
    #[error("math rendering failed: {0}")]
    Math(String),
}
