//! Obsidian callouts (`> [!type] Title`) and plain block quotes.

mod icons;

use std::sync::LazyLock;

use regex::Regex;

use crate::context::AssetResolver;
use crate::extension::{Extension, RenderedBlock};

static CALLOUT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[!(.*?)\]").expect("invalid callout regex"));

/// Icon and style class of a callout type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalloutInfo {
    /// SVG markup.
    pub icon: String,
    /// CSS class added next to `note-callout`.
    pub style: &'static str,
}

/// Look up a built-in callout type (case-insensitive).
pub fn builtin_callout(kind: &str) -> Option<CalloutInfo> {
    let (icon, style) = match kind.to_lowercase().as_str() {
        "note" => (icons::NOTE, "note-callout-note"),
        "abstract" | "summary" | "tldr" => (icons::ABSTRACT, "note-callout-abstract"),
        "info" => (icons::INFO, "note-callout-note"),
        "todo" => (icons::TODO, "note-callout-note"),
        "tip" | "hint" | "important" => (icons::TIP, "note-callout-abstract"),
        "success" | "check" | "done" => (icons::SUCCESS, "note-callout-success"),
        "question" | "help" | "faq" => (icons::QUESTION, "note-callout-question"),
        "warning" | "caution" | "attention" => (icons::WARNING, "note-callout-question"),
        "failure" | "fail" | "missing" => (icons::FAILURE, "note-callout-failure"),
        "danger" | "error" => (icons::DANGER, "note-callout-failure"),
        "bug" => (icons::BUG, "note-callout-failure"),
        "example" => (icons::EXAMPLE, "note-callout-example"),
        "quote" | "cite" => (icons::QUOTE, "note-callout-quote"),
        _ => return None,
    };
    Some(CalloutInfo {
        icon: icon.to_owned(),
        style,
    })
}

/// A callout split into its parts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalloutParts<'a> {
    /// Type as written between `[!` and `]`.
    pub kind: &'a str,
    /// Custom title, or the capitalized type.
    pub title: String,
    /// Markdown after the first line; empty when the callout is a single line.
    pub body: &'a str,
}

/// Split blockquote text (with `>` markers removed) into callout parts.
///
/// Returns `None` when the text carries no `[!type]` marker.
pub fn parse_callout(text: &str) -> Option<CalloutParts<'_>> {
    let kind = CALLOUT_MARKER
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|kind| !kind.is_empty())?;

    let body = text.split_once('\n').map_or("", |(_, body)| body);
    Some(CalloutParts {
        kind,
        title: callout_title(kind, text),
        body,
    })
}

/// Title shown in the callout header.
///
/// The custom title runs from after the first `]` (and a `-`/`+` fold
/// marker right after it) to the end of the first line.
fn callout_title(kind: &str, text: &str) -> String {
    let first_line = text.split('\n').next().unwrap_or_default();
    let custom = first_line.find(']').map_or("", |pos| {
        let rest = &first_line[pos + 1..];
        rest.strip_prefix(['-', '+']).unwrap_or(rest)
    });

    let custom = custom.trim();
    if custom.is_empty() {
        capitalize(kind)
    } else {
        custom.to_owned()
    }
}

fn capitalize(kind: &str) -> String {
    let mut chars = kind.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Strip one level of `>` markers from raw blockquote source.
pub(crate) fn strip_quote_markers(raw: &str) -> String {
    raw.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            match trimmed.strip_prefix('>') {
                Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
                None => line,
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders block quotes, turning those with a callout marker into callout
/// sections.
#[derive(Debug, Default)]
pub struct CalloutRenderer;

impl CalloutRenderer {
    /// Render a callout with its already rendered body.
    pub fn render_callout(
        &self,
        parts: &CalloutParts<'_>,
        body_html: &str,
        resolver: &dyn AssetResolver,
    ) -> RenderedBlock {
        let info = builtin_callout(parts.kind).unwrap_or_else(|| {
            let icon = resolver.load_icon(parts.kind);
            if icon.is_empty() {
                builtin_callout("note").unwrap_or(CalloutInfo {
                    icon: String::new(),
                    style: "note-callout-note",
                })
            } else {
                CalloutInfo {
                    icon,
                    style: "note-callout-custom",
                }
            }
        });

        let html = format!(
            concat!(
                r#"<section class="note-callout {style}">"#,
                r#"<section class="note-callout-title-wrap">"#,
                r#"<span class="note-callout-icon">{icon}</span>"#,
                r#"<span class="note-callout-title">{title}</span>"#,
                r#"</section>"#,
                r#"<section class="note-callout-content">{body}</section>"#,
                r#"</section>"#,
            ),
            style = info.style,
            icon = info.icon,
            title = crate::state::escape_html(&parts.title),
            body = body_html,
        );
        RenderedBlock::Callout {
            kind: parts.kind.to_lowercase(),
            html,
        }
    }

    /// Render a plain block quote.
    pub fn render_blockquote(&self, body_html: &str) -> RenderedBlock {
        RenderedBlock::Blockquote(format!("<blockquote>{body_html}</blockquote>"))
    }
}

impl Extension for CalloutRenderer {
    fn name(&self) -> &'static str {
        "callout"
    }
}
