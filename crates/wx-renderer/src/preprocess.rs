//! Source rewrites applied before the markdown parser runs.
//!
//! Obsidian syntax that pulldown-cmark does not know about is rewritten line
//! by line: `%%comments%%` and trailing `^block` ids are removed, `==marks==`
//! become highlight spans and `![[embeds]]` are replaced by placeholders that
//! the parser substitutes once the rest of the document is rendered. Fenced
//! code and inline code spans are left untouched.

use std::sync::LazyLock;

use regex::Regex;

use crate::fence::{FenceTracker, code_spans};

static EMBED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[\[(.*?)\]\]").expect("invalid embed regex"));

static HIGHLIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"==([^=\n]+)==").expect("invalid highlight regex"));

static BLOCK_MARK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s+)\^[0-9A-Za-z-]+\s*$").expect("invalid block mark regex")
});

/// Opens an embed placeholder. Private-use characters keep placeholders
/// apart from anything a note can spell out in text.
pub(crate) const EMBED_OPEN: char = '\u{E000}';
const EMBED_CLOSE: char = '\u{E001}';

/// Placeholder substituted for embed `index`, optionally wrapped in its own
/// paragraph.
pub(crate) static EMBED_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<p>\x{E000}EMBED_(\d+)\x{E001}</p>|\x{E000}EMBED_(\d+)\x{E001}")
        .expect("invalid embed placeholder regex")
});

pub(crate) fn embed_placeholder(index: usize) -> String {
    format!("{EMBED_OPEN}EMBED_{index}{EMBED_CLOSE}")
}

/// Skip a leading `---` front matter block.
///
/// Text without a closing `---` line is returned unchanged.
pub(crate) fn strip_front_matter(text: &str) -> &str {
    let Some(rest) = text
        .strip_prefix("---")
        .and_then(|rest| rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")))
    else {
        return text;
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return &rest[offset + line.len()..];
        }
        offset += line.len();
    }
    text
}

/// Remove `%%comments%%`, which may span several lines.
///
/// Lines left blank by a removed comment are dropped.
pub(crate) fn strip_comments(text: &str) -> String {
    if !text.contains("%%") {
        return text.to_owned();
    }

    let mut fence = FenceTracker::new();
    let mut in_comment = false;
    let mut lines = Vec::new();

    for line in text.split('\n') {
        if !in_comment && (fence.update(line) || fence.in_fence()) {
            lines.push(line.to_owned());
            continue;
        }

        let spans = code_spans(line);
        let bytes = line.as_bytes();
        let mut kept = String::new();
        let mut had_comment = in_comment;
        let mut segment_start = 0;
        let mut i = 0;

        while i + 1 < bytes.len() {
            let is_marker = bytes[i] == b'%' && bytes[i + 1] == b'%';
            if is_marker && (in_comment || !in_span(&spans, i)) {
                if in_comment {
                    segment_start = i + 2;
                } else {
                    kept.push_str(&line[segment_start..i]);
                    had_comment = true;
                }
                in_comment = !in_comment;
                i += 2;
                continue;
            }
            i += 1;
        }
        if !in_comment {
            kept.push_str(&line[segment_start..]);
        }

        if had_comment && kept.trim().is_empty() {
            continue;
        }
        lines.push(kept);
    }

    lines.join("\n")
}

/// Rewrite inline Obsidian syntax, collecting embed targets into `embeds`.
///
/// Placeholder numbers continue from `embeds.len()`, so one list can be
/// shared by nested renders.
pub(crate) fn rewrite_inline(text: &str, embeds: &mut Vec<String>) -> String {
    let mut fence = FenceTracker::new();
    let mut lines = Vec::new();

    for line in text.split('\n') {
        if fence.update(line) || fence.in_fence() {
            lines.push(line.to_owned());
            continue;
        }

        let spans = code_spans(line);
        let line = strip_block_mark(line, &spans);
        let spans = code_spans(&line);

        let mut out = String::with_capacity(line.len());
        let mut last = 0;
        for (start, end) in spans {
            rewrite_segment(&line[last..start], embeds, &mut out);
            out.push_str(&line[start..end]);
            last = end;
        }
        rewrite_segment(&line[last..], embeds, &mut out);
        lines.push(out);
    }

    lines.join("\n")
}

fn rewrite_segment(segment: &str, embeds: &mut Vec<String>, out: &mut String) {
    if !segment.contains("![[") && !segment.contains("==") {
        out.push_str(segment);
        return;
    }

    let segment = EMBED.replace_all(segment, |caps: &regex::Captures<'_>| {
        embeds.push(caps[1].to_owned());
        embed_placeholder(embeds.len() - 1)
    });
    let segment = HIGHLIGHT.replace_all(&segment, r#"<span class="note-highlight">$1</span>"#);
    out.push_str(&segment);
}

fn strip_block_mark(line: &str, spans: &[(usize, usize)]) -> String {
    match BLOCK_MARK.find(line) {
        Some(m) if !in_span(spans, m.start()) => line[..m.start()].to_owned(),
        _ => line.to_owned(),
    }
}

fn in_span(spans: &[(usize, usize)], pos: usize) -> bool {
    spans.iter().any(|&(start, end)| pos >= start && pos < end)
}
