//! Error types for the article pipeline.

use std::path::PathBuf;

/// Article pipeline error.
#[derive(Debug, thiserror::Error)]
pub enum ArticleError {
    /// Vault directory missing.
    #[error("Vault not found: {}", .0.display())]
    VaultNotFound(PathBuf),

    /// Note outside the vault.
    #[error("Note is not inside the vault: {}", .0.display())]
    OutsideVault(PathBuf),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Vault file could not be read.
    #[error(transparent)]
    Render(#[from] wx_renderer::RenderError),

    /// Image could not be read or converted.
    #[error(transparent)]
    Image(#[from] wx_images::ImageError),

    /// Publishing API error.
    #[error(transparent)]
    Publish(#[from] wx_publish::PublishError),

    /// The note rendered as an error block.
    #[error("Article failed to render: {0}")]
    RenderFailed(String),

    /// Cover image could not be uploaded.
    #[error("上传封面失败: {0}")]
    Cover(String),

    /// Neither the note nor the material library provides a cover.
    #[error("无法获取封面图片，请在 cover 中指定封面或确保素材库中有图片")]
    NoCover,
}
