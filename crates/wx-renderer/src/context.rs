//! Settings, collaborators and per-render state shared by the extensions.

use std::collections::BTreeMap;

use wx_images::{LocalImageManager, VaultReader};

use crate::card::CardDataManager;
use crate::error::RenderError;
use crate::state::escape_html;

/// How embedded notes are wrapped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmbedStyle {
    /// `<section class="note-embed-file">`.
    #[default]
    Content,
    /// `<blockquote class="note-embed-file">`.
    Quote,
}

impl EmbedStyle {
    /// Wrapper tag name.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Content => "section",
            Self::Quote => "blockquote",
        }
    }
}

/// Math notation of an expression.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MathSyntax {
    /// TeX / LaTeX.
    #[default]
    Latex,
    /// `AsciiMath`.
    AsciiMath,
}

impl MathSyntax {
    /// Math syntax selected by a fence language, if any.
    pub fn from_language(lang: &str) -> Option<Self> {
        match lang.trim().to_lowercase().as_str() {
            "latex" | "tex" => Some(Self::Latex),
            "am" | "asciimath" => Some(Self::AsciiMath),
            _ => None,
        }
    }
}

/// How external links are rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LinkStyle {
    /// `<a>text[href]</a>`.
    #[default]
    Inline,
    /// `<a>text<sup>[N]</sup></a>` plus a footnote list at the end.
    Footnote,
}

/// Options controlling the rendered markup.
#[derive(Clone, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct RenderSettings {
    /// Show a line-number gutter in code blocks.
    pub line_number: bool,
    /// Wrapper of embedded notes.
    pub embed_style: EmbedStyle,
    /// Render markdown images as `<figure>` with a caption.
    pub use_figcaption: bool,
    /// Syntax of `$...$` math.
    pub math: MathSyntax,
    /// Turn `#tag` into topic links.
    pub enable_topics: bool,
    /// Rendering of external links.
    pub link_style: LinkStyle,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            line_number: true,
            embed_style: EmbedStyle::Content,
            use_figcaption: false,
            math: MathSyntax::Latex,
            enable_topics: true,
            link_style: LinkStyle::Inline,
        }
    }
}

/// A vault file resolved for use as an image source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedResource {
    /// URL written into `src`, also the key in the image registry.
    pub res_url: String,
    /// Vault path of the file.
    pub file_path: String,
}

/// Access to the note vault.
///
/// Binary reads come from the [`VaultReader`] supertrait so the same vault
/// serves the image pipeline.
pub trait AssetResolver: VaultReader {
    /// Resolve a link target to an image resource.
    fn resolve_path(&self, name: &str) -> Option<ResolvedResource>;

    /// Read a text file by vault path.
    fn read_text(&self, path: &str) -> Result<String, RenderError>;

    /// Find a file by name or partial path, returning its vault path.
    fn search_file(&self, name: &str) -> Option<String>;

    /// Vault path of the note being rendered.
    fn active_file(&self) -> Option<String>;

    /// SVG markup of a custom callout icon, empty when there is none.
    fn load_icon(&self, _name: &str) -> String {
        String::new()
    }
}

/// Turns math expressions into markup.
pub trait MathRenderer {
    /// Render one expression.
    fn render(&self, expression: &str, inline: bool, syntax: MathSyntax)
    -> Result<String, RenderError>;
}

/// Math renderer keeping the TeX source, for clients that typeset it
/// themselves.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainMathRenderer;

impl MathRenderer for PlainMathRenderer {
    fn render(
        &self,
        expression: &str,
        inline: bool,
        _syntax: MathSyntax,
    ) -> Result<String, RenderError> {
        let expression = escape_html(expression);
        Ok(if inline {
            format!(r#"<span class="math-inline">${expression}$</span>"#)
        } else {
            format!(r#"<div class="math-block">$${expression}$$</div>"#)
        })
    }
}

/// Raw sources of elements finished outside the renderer (e.g. diagrams
/// rendered by a client), keyed `category:id`.
#[derive(Clone, Debug, Default)]
pub struct ElementCache {
    entries: BTreeMap<String, String>,
}

impl ElementCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the raw source of element `id` in `category`.
    pub fn cache_element(&mut self, category: &str, id: &str, raw: &str) {
        self.entries.insert(format!("{category}:{id}"), raw.to_owned());
    }

    /// Look up a cached element.
    pub fn get(&self, category: &str, id: &str) -> Option<&str> {
        self.entries.get(&format!("{category}:{id}")).map(String::as_str)
    }

    /// Ids cached under `category`, sorted as strings.
    pub fn ids<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries.keys().filter_map(move |key| {
            key.strip_prefix(category)
                .and_then(|rest| rest.strip_prefix(':'))
        })
    }

    /// All entries as `(key, raw)`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of cached elements.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Everything one render call reads from or writes to.
pub struct RenderContext<'a> {
    /// Markup options.
    pub settings: &'a RenderSettings,
    /// Vault access.
    pub resolver: &'a dyn AssetResolver,
    /// Math typesetting.
    pub math: &'a dyn MathRenderer,
    /// Registry of images referenced by the article.
    pub images: &'a mut LocalImageManager,
    /// Registry of account cards.
    pub cards: &'a mut CardDataManager,
    /// Elements completed outside the renderer.
    pub elements: &'a mut ElementCache,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_math_syntax_from_language() {
        assert_eq!(MathSyntax::from_language(" LaTeX "), Some(MathSyntax::Latex));
        assert_eq!(MathSyntax::from_language("tex"), Some(MathSyntax::Latex));
        assert_eq!(MathSyntax::from_language("am"), Some(MathSyntax::AsciiMath));
        assert_eq!(MathSyntax::from_language("asciimath"), Some(MathSyntax::AsciiMath));
        assert_eq!(MathSyntax::from_language("rust"), None);
    }

    #[test]
    fn test_plain_math_renderer_escapes() {
        let html = PlainMathRenderer
            .render("a < b", true, MathSyntax::Latex)
            .unwrap();
        assert_eq!(html, r#"<span class="math-inline">$a &lt; b$</span>"#);
    }

    #[test]
    fn test_element_cache_keys() {
        let mut cache = ElementCache::new();
        cache.cache_element("mermaid", "mermaid-0", "graph TD");
        assert_eq!(cache.get("mermaid", "mermaid-0"), Some("graph TD"));
        assert_eq!(cache.iter().next(), Some(("mermaid:mermaid-0", "graph TD")));

        cache.cache_element("mermaidx", "other", "");
        cache.cache_element("mermaid", "mermaid-1", "graph LR");
        assert_eq!(
            cache.ids("mermaid").collect::<Vec<_>>(),
            vec!["mermaid-0", "mermaid-1"]
        );
        cache.clear();
        assert!(cache.is_empty());
    }
}
