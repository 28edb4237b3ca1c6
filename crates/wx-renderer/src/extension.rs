//! Common interface of the syntax extensions.

/// A syntax extension plugged into [`MarkedParser`](crate::MarkedParser).
///
/// Extensions keep per-render state (counters, collected links) that is
/// reset by [`prepare`](Self::prepare) at the start of every top-level
/// parse, and may rewrite the finished HTML in
/// [`postprocess`](Self::postprocess).
pub trait Extension {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Reset per-render state.
    fn prepare(&mut self) {}

    /// Rewrite the HTML of a finished top-level render.
    fn postprocess(&mut self, html: String) -> String {
        html
    }
}

/// Output of a block-level extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderedBlock {
    /// Callout section.
    Callout {
        /// Lowercased callout type.
        kind: String,
        /// Rendered markup.
        html: String,
    },
    /// Plain block quote.
    Blockquote(String),
    /// Fenced code: highlighted code, math, diagram or card placeholder.
    Code {
        /// Normalized fence language.
        language: Option<String>,
        /// Rendered markup.
        html: String,
    },
    /// `![[...]]` embed: image, SVG or transcluded note.
    Embed(String),
}

impl RenderedBlock {
    /// Rendered markup.
    pub fn html(&self) -> &str {
        match self {
            Self::Callout { html, .. } | Self::Code { html, .. } => html,
            Self::Blockquote(html) | Self::Embed(html) => html,
        }
    }

    /// Consume the block, returning its markup.
    pub fn into_html(self) -> String {
        match self {
            Self::Callout { html, .. } | Self::Code { html, .. } => html,
            Self::Blockquote(html) | Self::Embed(html) => html,
        }
    }
}
