//! Fenced code blocks.
//!
//! The fence language selects a handler from a lookup table; anything not in
//! the table is syntax highlighted.

mod highlight;
mod math;

use tracing::debug;

use crate::card::{card_placeholder, parse_card};
use crate::context::{MathSyntax, RenderContext};
use crate::extension::{Extension, RenderedBlock};

use self::highlight::Highlighter;
use self::math::MathBlocks;

type Handler = fn(&mut CodeRenderer, &str, &str, &mut RenderContext<'_>) -> String;

/// Handlers keyed by normalized fence language.
const HANDLERS: &[(&str, Handler)] = &[
    ("latex", CodeRenderer::render_math_block),
    ("tex", CodeRenderer::render_math_block),
    ("am", CodeRenderer::render_math_block),
    ("asciimath", CodeRenderer::render_math_block),
    ("mermaid", CodeRenderer::render_mermaid),
    ("mpcard", CodeRenderer::render_card),
];

/// Language token of a fence info string: the first word, trimmed.
pub(crate) fn fence_language(info: &str) -> Option<&str> {
    info.split_whitespace().next()
}

/// Renders fenced code blocks and math.
#[derive(Debug, Default)]
pub struct CodeRenderer {
    mermaid_index: usize,
    math: MathBlocks,
    highlighter: Highlighter,
}

impl CodeRenderer {
    /// Create a renderer with the bundled syntax definitions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a fenced block given its info string and body.
    pub fn render(
        &mut self,
        info: Option<&str>,
        source: &str,
        ctx: &mut RenderContext<'_>,
    ) -> RenderedBlock {
        let lang = info.and_then(fence_language);
        let normalized = lang.map(str::to_lowercase);

        let handler = normalized.as_deref().and_then(|key| {
            HANDLERS
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, handler)| *handler)
        });

        let html = match (handler, normalized.as_deref()) {
            (Some(handler), Some(key)) => handler(self, key, source, ctx),
            _ => self
                .highlighter
                .render(source, lang, ctx.settings.line_number),
        };

        RenderedBlock::Code {
            language: normalized,
            html,
        }
    }

    /// Render `$...$` or `$$...$$` math in the configured syntax.
    pub fn render_math(
        &mut self,
        expression: &str,
        inline: bool,
        ctx: &mut RenderContext<'_>,
    ) -> String {
        self.math
            .render(expression, inline, ctx.settings.math, ctx.math)
    }

    fn render_math_block(&mut self, lang: &str, source: &str, ctx: &mut RenderContext<'_>) -> String {
        let syntax = MathSyntax::from_language(lang).unwrap_or(ctx.settings.math);
        self.math.render(source, false, syntax, ctx.math)
    }

    fn render_mermaid(&mut self, _lang: &str, source: &str, ctx: &mut RenderContext<'_>) -> String {
        let id = format!("mermaid-{}", self.mermaid_index);
        self.mermaid_index += 1;
        ctx.elements.cache_element("mermaid", &id, source);
        debug!("Deferred mermaid diagram {id}");
        format!(r#"<section id="{id}" class="note-mermaid"></section>"#)
    }

    fn render_card(&mut self, _lang: &str, source: &str, ctx: &mut RenderContext<'_>) -> String {
        let card = parse_card(source);
        if card.id.is_empty() {
            return "<span>公众号卡片数据错误，没有id</span>".to_owned();
        }
        ctx.cards.set_card_data(card.id.clone(), source);
        card_placeholder(&card)
    }
}

impl Extension for CodeRenderer {
    fn name(&self) -> &'static str {
        "code"
    }

    fn prepare(&mut self) {
        self.mermaid_index = 0;
        self.math.reset();
    }
}
