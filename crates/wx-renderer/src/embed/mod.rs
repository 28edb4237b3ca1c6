//! `![[...]]` embeds: vault images, inline SVG drawings and transcluded notes.

mod extract;
mod link;

use std::collections::HashMap;
use std::fmt::Write;

use tracing::warn;
use wx_images::ImageInfo;

use crate::context::RenderContext;
use crate::extension::Extension;
use crate::preprocess::strip_front_matter;
use crate::state::escape_html;

pub(crate) use self::link::{EmbedTarget, NoteLink};

/// Renders image and SVG embeds and loads the markdown of note embeds.
///
/// Note embeds are parsed by the caller, which owns the markdown parser.
#[derive(Debug, Default)]
pub struct EmbedRenderer {
    index: usize,
    svg_cache: HashMap<String, String>,
}

impl EmbedRenderer {
    /// Next `fid-N` element id, starting at `fid-1`.
    pub(crate) fn next_id(&mut self) -> String {
        self.index += 1;
        format!("fid-{}", self.index)
    }

    /// `<img>` for a vault image, registering it for upload.
    ///
    /// An image that cannot be resolved gets an empty `src`.
    pub(crate) fn render_image(
        link: &str,
        path: &str,
        width: Option<u32>,
        height: Option<u32>,
        ctx: &mut RenderContext<'_>,
    ) -> String {
        let src = register_image(path, ctx).unwrap_or_default();
        let mut html = format!(
            r#"<img src="{}" alt="{}""#,
            escape_html(&src),
            escape_html(link)
        );
        if let Some(width) = width {
            write!(html, r#" width="{width}""#).unwrap();
        }
        if let Some(height) = height {
            write!(html, r#" height="{height}""#).unwrap();
        }
        html.push_str(" />");
        html
    }

    /// Inline SVG drawing. File contents are cached by filename for the
    /// renderer's lifetime.
    pub(crate) fn render_svg(
        &mut self,
        filename: &str,
        class: &str,
        style: &str,
        ctx: &RenderContext<'_>,
    ) -> String {
        let id = self.next_id();
        let svg = match self.svg_cache.get(filename) {
            Some(svg) => svg.clone(),
            None => match load_svg(filename, ctx) {
                Ok(svg) => {
                    self.svg_cache.insert(filename.to_owned(), svg.clone());
                    svg
                }
                Err(message) => message,
            },
        };
        format!(
            r#"<span class="{class}"><span class="note-embed-svg" id="{id}" {style}>{svg}</span></span>"#
        )
    }

    /// Markdown of a note embed with front matter removed, or the message to
    /// show when the note cannot be found.
    pub(crate) fn load_note(link: &NoteLink<'_>, ctx: &RenderContext<'_>) -> Result<String, String> {
        let resolver = ctx.resolver;
        let (path, file) = if link.path.is_empty() {
            (String::new(), resolver.active_file())
        } else {
            let path = if link.path.ends_with(".md") {
                link.path.to_owned()
            } else {
                format!("{}.md", link.path)
            };
            let file = resolver.search_file(&path);
            (path, file)
        };

        let Some(file) = file else {
            warn!("Embedded note not found: {path}");
            return Err(format!("找不到文件：{path}"));
        };

        let content = resolver.read_text(&file).map_err(|err| {
            warn!("Failed to read embedded note {file}: {err}");
            format!("找不到文件：{path}")
        })?;

        let content = match (link.heading, link.block) {
            (Some(heading), _) => extract::heading_section(&content, heading),
            (None, Some(block)) => extract::block_section(&content, block),
            (None, None) => content,
        };
        Ok(strip_front_matter(&content).to_owned())
    }
}

/// Resolve a vault image and register it, returning its `src`.
pub(crate) fn register_image(path: &str, ctx: &mut RenderContext<'_>) -> Option<String> {
    let Some(resource) = ctx.resolver.resolve_path(path) else {
        warn!("Image not found in vault: {path}");
        return None;
    };
    ctx.images.register_local_image(
        resource.res_url.clone(),
        ImageInfo::local(resource.res_url.clone(), resource.file_path),
    );
    Some(resource.res_url)
}

fn load_svg(filename: &str, ctx: &RenderContext<'_>) -> Result<String, String> {
    let not_found = || format!("找不到文件：{filename}");
    let Some(file) = ctx.resolver.search_file(filename) else {
        warn!("SVG not found in vault: {filename}");
        return Err(not_found());
    };
    ctx.resolver.read_text(&file).map_err(|err| {
        warn!("Failed to read SVG {file}: {err}");
        not_found()
    })
}

impl Extension for EmbedRenderer {
    fn name(&self) -> &'static str {
        "embed"
    }

    fn prepare(&mut self) {
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockResolver, TestEnv};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_image_registered() {
        let mut env =
            TestEnv::with_resolver(MockResolver::default().with_bytes("assets/pic.png", b"png"));
        let html = {
            let mut ctx = env.context();
            EmbedRenderer::render_image("pic.png|300", "pic.png", Some(300), None, &mut ctx)
        };
        assert_eq!(
            html,
            r#"<img src="app://vault/assets/pic.png" alt="pic.png|300" width="300" />"#
        );
        let info = env.images.get("app://vault/assets/pic.png").unwrap();
        assert_eq!(info.file_path, "assets/pic.png");
        assert!(!info.is_resolved());
    }

    #[test]
    fn test_missing_image_has_empty_src() {
        let mut env = TestEnv::new();
        let mut ctx = env.context();
        let html = EmbedRenderer::render_image("gone.png", "gone.png", None, None, &mut ctx);
        assert_eq!(html, r#"<img src="" alt="gone.png" />"#);
    }

    #[test]
    fn test_svg_cached_by_filename() {
        let mut env = TestEnv::with_resolver(
            MockResolver::default().with_text("d/draw.svg", "<svg>1</svg>"),
        );
        let mut embeds = EmbedRenderer::default();
        let first = embeds.render_svg("draw.svg", "note-embed-svg-left", "style=\"\"", &env.context());
        env.resolver = MockResolver::default();
        let second = embeds.render_svg("draw.svg", "note-embed-svg-left", "style=\"\"", &env.context());

        assert_eq!(
            first,
            r#"<span class="note-embed-svg-left"><span class="note-embed-svg" id="fid-1" style=""><svg>1</svg></span></span>"#
        );
        assert!(second.contains(r#"id="fid-2""#));
        assert!(second.contains("<svg>1</svg>"));
    }

    #[test]
    fn test_load_note_block_and_heading() {
        let note = "---\ntitle: x\n---\n# A\nalpha ^b1\n# B\nbeta";
        let mut env = TestEnv::with_resolver(MockResolver::default().with_text("notes/Note.md", note));
        let ctx = env.context();

        let link = NoteLink {
            path: "Note",
            heading: None,
            block: Some("^b1"),
        };
        assert_eq!(EmbedRenderer::load_note(&link, &ctx).unwrap(), "alpha");

        let link = NoteLink {
            path: "Note.md",
            heading: Some("B"),
            block: None,
        };
        assert_eq!(EmbedRenderer::load_note(&link, &ctx).unwrap(), "# B\nbeta");

        let link = NoteLink {
            path: "Note",
            heading: None,
            block: None,
        };
        assert_eq!(
            EmbedRenderer::load_note(&link, &ctx).unwrap(),
            "# A\nalpha ^b1\n# B\nbeta"
        );
    }

    #[test]
    fn test_load_note_missing() {
        let mut env = TestEnv::new();
        let ctx = env.context();
        let link = NoteLink {
            path: "Nope",
            heading: None,
            block: None,
        };
        assert_eq!(
            EmbedRenderer::load_note(&link, &ctx),
            Err("找不到文件：Nope.md".to_owned())
        );
    }

    #[test]
    fn test_load_active_note() {
        let mut env = TestEnv::with_resolver(
            MockResolver::default()
                .with_text("Current.md", "# Here\ntext")
                .with_active("Current.md"),
        );
        let ctx = env.context();
        let link = NoteLink {
            path: "",
            heading: Some("Here"),
            block: None,
        };
        assert_eq!(EmbedRenderer::load_note(&link, &ctx).unwrap(), "# Here\ntext");
    }
}
