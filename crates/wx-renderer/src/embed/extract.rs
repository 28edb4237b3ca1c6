//! Extraction of heading sections and referenced blocks from a note.

use std::sync::LazyLock;

use regex::Regex;

use crate::fence::FenceTracker;

static ORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.").expect("invalid ordered item regex"));

/// ATX heading level of a line, 0 when it is not a heading.
fn heading_level(line: &str) -> usize {
    let trimmed = line.trim_start();
    let level = trimmed.chars().take_while(|&c| c == '#').count();
    if !(1..=6).contains(&level) {
        return 0;
    }
    match trimmed[level..].chars().next() {
        None => level,
        Some(c) if c.is_whitespace() => level,
        Some(_) => 0,
    }
}

/// Lists, quotes and tables.
fn is_structured(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with(['-', '>', '|']) || ORDERED_ITEM.is_match(trimmed)
}

/// Section starting at the heading whose text is `heading`, up to the next
/// heading of the same or a higher level.
///
/// Returns an empty string when no heading matches.
pub(crate) fn heading_section(content: &str, heading: &str) -> String {
    let target = heading.trim();
    let mut fence = FenceTracker::new();
    let mut level = 0;
    let mut section = Vec::new();

    for line in content.lines() {
        let in_code = fence.update(line) || fence.in_fence();
        let line_level = if in_code { 0 } else { heading_level(line) };

        if level > 0 {
            if line_level > 0 && line_level <= level {
                break;
            }
            section.push(line);
            continue;
        }

        if line_level > 0 && line.trim_start()[line_level..].trim() == target {
            level = line_level;
            section.push(line);
        }
    }

    section.join("\n")
}

/// The block carrying the `^id` reference.
///
/// The line holding the id, with the id removed, seeds the block. A list,
/// quote or table line pulls in the contiguous structured lines above it; a
/// paragraph line pulls in the paragraph lines above it. A line holding only
/// the id refers to the block right above it (one blank line may separate
/// them), whose kind is set by its last line. Collection stops at a heading,
/// a blank line or a change of kind.
pub(crate) fn block_section(content: &str, id: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let Some(pos) = lines.iter().position(|line| line.contains(id)) else {
        return String::new();
    };

    let seed = lines[pos].replacen(id, "", 1).trim().to_owned();
    let mut collected = Vec::new();

    let (end, structured) = if seed.is_empty() {
        let mut end = pos;
        if end > 0 && lines[end - 1].trim().is_empty() {
            end -= 1;
        }
        match end.checked_sub(1).map(|i| lines[i]) {
            Some(last) if !last.trim().is_empty() => (end, is_structured(last)),
            _ => return String::new(),
        }
    } else {
        let structured = is_structured(&seed);
        collected.push(seed);
        (pos, structured)
    };

    for line in lines[..end].iter().rev() {
        if line.trim().is_empty() || heading_level(line) > 0 || is_structured(line) != structured {
            break;
        }
        collected.push((*line).to_owned());
    }

    collected.reverse();
    collected.join("\n")
}
