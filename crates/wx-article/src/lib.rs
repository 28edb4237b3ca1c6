//! Obsidian notes as WeChat articles.
//!
//! Ties the pipeline together: [`FsVault`] reads the vault,
//! [`ArticleRenderer`] renders a note with `wx-renderer`, inlines the
//! stylesheet with `wx-css`, and then either exports self-contained HTML or
//! uploads images through `wx-images` and stores a draft through
//! `wx-publish`.
//!
//! # Example
//!
//! ```ignore
//! use wx_article::{ArticleRenderer, ArticleStyle, FsVault, render_settings};
//!
//! let config = wx_config::Config::load(None, None)?;
//! let vault = FsVault::open(&config.vault_resolved.root)?;
//! let mut renderer = ArticleRenderer::new(
//!     &vault,
//!     render_settings(&config),
//!     ArticleStyle::from_config(&config)?,
//! );
//! let article = renderer.render_note("notes/Post.md");
//! println!("{}", renderer.content(&article));
//! ```

mod article;
mod error;
mod meta;
mod style;
mod vault;

pub use article::{ARTICLE_CLASS, Article, ArticleRenderer, PublishOutcome, error_block};
pub use error::ArticleError;
pub use meta::ArticleMeta;
pub use style::{ArticleStyle, render_settings};
pub use vault::FsVault;
