//! The note to article pipeline.
//!
//! [`ArticleRenderer`] renders a note, inlines the stylesheet into the
//! result, and either exports it as self-contained HTML or uploads its
//! images and stores it as a draft.

use std::fmt::Display;

use tracing::{info, warn};
use wx_css::apply_css;
use wx_images::{ImageServices, LocalImageManager, mime};
use wx_publish::DraftPublisher;
use wx_renderer::{
    AssetResolver, CardDataManager, ElementCache, MarkedParser, MathRenderer, PlainMathRenderer,
    RenderContext, RenderSettings, escape_html,
};

use crate::error::ArticleError;
use crate::meta::ArticleMeta;
use crate::style::ArticleStyle;

/// Class of the section wrapping every article. Themes scope their rules
/// under it.
pub const ARTICLE_CLASS: &str = "wdwxedit";

/// Attribute rewrites applied after CSS inlining. The platform editor
/// drops the first two and expects `leaf` on text wrappers.
const POST_PROCESS: [(&str, &str); 3] = [
    (r#"rel="noopener nofollow""#, ""),
    (r#"target="_blank""#, ""),
    (r#"data-leaf="""#, r#"leaf="""#),
];

/// A rendered note.
#[derive(Debug, Clone, Default)]
pub struct Article {
    /// Note name, the title fallback.
    pub name: String,
    /// Front matter.
    pub meta: ArticleMeta,
    /// Article HTML wrapped in the article section, before CSS inlining.
    pub body: String,
    /// Theme CSS named by the note, replacing the configured theme.
    pub theme: Option<String>,
    /// Why rendering failed; `body` then holds the error block.
    pub error: Option<String>,
}

impl Article {
    /// Whether the body is the error block.
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Result of [`ArticleRenderer::publish`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Media id of the draft.
    pub media_id: String,
    /// Whether an existing draft with the same title was updated.
    pub updated: bool,
    /// Images uploaded by this run.
    pub uploaded: usize,
    /// Images left unresolved.
    pub failed: usize,
}

/// Renders notes and publishes the results.
///
/// Image and card registries live as long as the renderer, so publishing
/// the same note twice only uploads images that are new. Call
/// [`reset`](Self::reset) when switching to another note.
pub struct ArticleRenderer<'a> {
    vault: &'a dyn AssetResolver,
    math: &'a dyn MathRenderer,
    settings: RenderSettings,
    style: ArticleStyle,
    parser: MarkedParser,
    images: LocalImageManager,
    cards: CardDataManager,
    elements: ElementCache,
}

impl<'a> ArticleRenderer<'a> {
    /// Create a renderer reading from `vault`.
    pub fn new(vault: &'a dyn AssetResolver, settings: RenderSettings, style: ArticleStyle) -> Self {
        Self {
            vault,
            math: &PlainMathRenderer,
            settings,
            style,
            parser: MarkedParser::new(),
            images: LocalImageManager::new(),
            cards: CardDataManager::new(),
            elements: ElementCache::new(),
        }
    }

    /// Use another math renderer.
    #[must_use]
    pub fn with_math(mut self, math: &'a dyn MathRenderer) -> Self {
        self.math = math;
        self
    }

    /// Stamp this watermark onto every uploaded image.
    #[must_use]
    pub fn with_watermark(mut self, watermark: Vec<u8>) -> Self {
        self.images = std::mem::take(&mut self.images).with_watermark(watermark);
        self
    }

    /// Images referenced by rendered notes.
    pub fn images(&self) -> &LocalImageManager {
        &self.images
    }

    /// Elements left for a client to finish (diagrams).
    pub fn elements(&self) -> &ElementCache {
        &self.elements
    }

    /// Ids of the diagrams in the last rendered note that are left empty for
    /// a client to draw. The host cannot run the client, so these show up
    /// blank once published.
    pub fn deferred_diagrams(&self) -> Vec<&str> {
        self.elements.ids("mermaid").collect()
    }

    /// Forget images, cards and cached elements.
    pub fn reset(&mut self) {
        self.images.cleanup();
        self.cards.cleanup();
        self.elements.clear();
    }

    /// Render the note at vault path `path`.
    ///
    /// A note that cannot be read renders as the error block.
    pub fn render_note(&mut self, path: &str) -> Article {
        let name = note_name(path);
        match self.vault.read_text(path) {
            Ok(markdown) => self.render_markdown(&name, &markdown),
            Err(err) => {
                warn!("Failed to read note {path}: {err}");
                failed_article(name, &err)
            }
        }
    }

    /// Render markdown as the note `name`.
    ///
    /// Cards and deferred elements belong to one note and are dropped first.
    /// Images are kept so a later cycle does not upload them again.
    pub fn render_markdown(&mut self, name: &str, markdown: &str) -> Article {
        self.cards.cleanup();
        self.elements.clear();
        let meta = ArticleMeta::from_markdown(markdown);
        let theme = meta.theme.as_deref().and_then(|theme| self.load_theme(theme));

        let mut ctx = RenderContext {
            settings: &self.settings,
            resolver: self.vault,
            math: self.math,
            images: &mut self.images,
            cards: &mut self.cards,
            elements: &mut self.elements,
        };
        let html = self.parser.parse(markdown, &mut ctx);
        info!("Rendered {name} ({} images)", self.images.len());

        Article {
            name: name.to_owned(),
            meta,
            body: wrap_article(&html),
            theme,
            error: None,
        }
    }

    /// Final article HTML: styles inlined, attributes cleaned up, cards
    /// restored.
    pub fn content(&self, article: &Article) -> String {
        let css = match &article.theme {
            Some(theme) => self.style.with_theme(theme.clone()).css(),
            None => self.style.css(),
        };
        let html = post_process(&apply_css(&article.body, &css));
        self.cards.restore_card(&html)
    }

    /// Self-contained article HTML with every image inlined.
    pub fn export(&self, article: &Article, services: ImageServices<'_>) -> String {
        self.images
            .embed_as_base64(&self.content(article), services)
    }

    /// Upload the article's images and store it as a draft.
    ///
    /// A recent draft with the same title is updated in place; otherwise a
    /// new draft is created. Images that fail to upload keep their
    /// reference and are reported in the outcome.
    pub fn publish(
        &mut self,
        article: &mut Article,
        token: &str,
        services: ImageServices<'_>,
        publisher: &dyn DraftPublisher,
    ) -> Result<PublishOutcome, ArticleError> {
        if let Some(error) = &article.error {
            return Err(ArticleError::RenderFailed(error.clone()));
        }

        let local = self.images.upload_local_images(token, services);
        let body = self.images.replace_image_references(&article.body);
        let (body, remote) = self.images.upload_remote_images(&body, token, services);
        article.body = self.images.replace_image_references(&body);

        let thumb_media_id = self.cover_media_id(&article.meta, token, services, publisher)?;
        let draft = article
            .meta
            .to_draft(&article.name, self.content(article), &thumb_media_id);

        let existing = publisher.find_draft(&draft.title, token).unwrap_or_else(|err| {
            warn!("Failed to list drafts, creating a new one: {err}");
            None
        });
        let (media_id, updated) = if let Some(media_id) = existing {
            info!("Updating draft {media_id} titled {}", draft.title);
            publisher.update_draft(&media_id, 0, &draft, token)?;
            (media_id, true)
        } else {
            let result = publisher.create_draft(std::slice::from_ref(&draft), token)?;
            (result.media_id.unwrap_or_default(), false)
        };

        Ok(PublishOutcome {
            media_id,
            updated,
            uploaded: local.uploaded + remote.uploaded,
            failed: local.failed + remote.failed,
        })
    }

    /// Cover media id: the note's `thumb_media_id`, its uploaded `cover`,
    /// or the newest image of the material library.
    fn cover_media_id(
        &self,
        meta: &ArticleMeta,
        token: &str,
        services: ImageServices<'_>,
        publisher: &dyn DraftPublisher,
    ) -> Result<String, ArticleError> {
        if let Some(id) = meta.thumb_media_id.as_ref().filter(|id| !id.is_empty()) {
            return Ok(id.clone());
        }
        if let Some(cover) = meta.cover.as_ref().filter(|c| !c.trim().is_empty()) {
            return self.upload_cover(cover, token, services);
        }
        publisher.default_cover(token)?.ok_or(ArticleError::NoCover)
    }

    /// Upload a vault image as permanent material.
    fn upload_cover(
        &self,
        cover: &str,
        token: &str,
        services: ImageServices<'_>,
    ) -> Result<String, ArticleError> {
        let name = cover_name(cover);
        let path = self
            .vault
            .search_file(name)
            .ok_or_else(|| ArticleError::Cover(format!("找不到封面文件: {name}")))?;

        let mut data = services.reader.read_bytes(&path)?;
        let mut filename = path.rsplit('/').next().unwrap_or(&path).to_owned();
        if mime::is_webp(&filename) && services.transcoder.ready() {
            data = services.transcoder.webp_to_jpeg(&data)?;
            filename = mime::webp_to_jpg_name(&filename);
        }

        info!("Uploading cover {filename}");
        let result = services.uploader.upload(&data, &filename, token)?;
        match result.media_id.filter(|id| !id.is_empty()) {
            Some(media_id) if result.errcode == 0 => Ok(media_id),
            _ => Err(ArticleError::Cover(result.errmsg)),
        }
    }

    fn load_theme(&self, theme: &str) -> Option<String> {
        let css = self
            .vault
            .search_file(theme)
            .and_then(|path| self.vault.read_text(&path).ok());
        if css.is_none() {
            warn!("Theme not found in vault: {theme}");
        }
        css
    }
}

/// File name of a note without the `.md` extension.
fn note_name(path: &str) -> String {
    let file = path.rsplit('/').next().unwrap_or(path);
    file.strip_suffix(".md").unwrap_or(file).to_owned()
}

/// Vault name from a `cover` value, which may be an embed (`![[a.png|300]]`).
fn cover_name(cover: &str) -> &str {
    let cover = cover.trim();
    let inner = cover
        .strip_prefix("![[")
        .and_then(|c| c.strip_suffix("]]"))
        .unwrap_or(cover);
    inner.split('|').next().unwrap_or(inner).trim()
}

fn wrap_article(html: &str) -> String {
    format!(r#"<section class="{ARTICLE_CLASS}" id="article-section">{html}</section>"#)
}

fn post_process(html: &str) -> String {
    POST_PROCESS
        .iter()
        .fold(html.to_owned(), |html, (from, to)| html.replace(from, to))
}

/// Block shown instead of an article that failed to render.
pub fn error_block(error: &dyn Display) -> String {
    format!(
        "<h1>渲染失败!</h1><br/>请检查笔记内容后重试，反馈问题时请附上引发错误的完整 Markdown 内容。<br/><br/>错误信息：<br/>{}",
        escape_html(&error.to_string())
    )
}

fn failed_article(name: String, error: &dyn Display) -> Article {
    Article {
        name,
        body: wrap_article(&error_block(error)),
        error: Some(error.to_string()),
        ..Default::default()
    }
}
