//! Code fence and code span tracking for line-based preprocessing.
//!
//! Embeds and comments are rewritten before the markdown parser runs, so
//! the rewriting has to skip fenced code blocks and inline code spans itself.

/// Tracks code fence state during line-by-line processing.
///
/// Code fences can use backticks or tildes (three or more). The closing
/// fence must use the same character and be at least as long as the opening
/// fence.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    fence_char: Option<char>,
    fence_len: usize,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Check if currently inside a fenced code block.
    pub(crate) fn in_fence(&self) -> bool {
        self.fence_char.is_some()
    }

    /// Update fence state based on a line.
    ///
    /// Returns `true` if the line is a fence marker (opening or closing).
    pub(crate) fn update(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start_matches([' ', '>']).trim_start();

        if let Some(fence_char) = self.fence_char {
            if is_closing_fence(trimmed, fence_char, self.fence_len) {
                self.fence_char = None;
                self.fence_len = 0;
                return true;
            }
            false
        } else if let Some((ch, len)) = detect_fence(trimmed) {
            self.fence_char = Some(ch);
            self.fence_len = len;
            true
        } else {
            false
        }
    }
}

fn detect_fence(trimmed: &str) -> Option<(char, usize)> {
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let count = trimmed.chars().take_while(|&c| c == first).count();
    (count >= 3).then_some((first, count))
}

fn is_closing_fence(trimmed: &str, expected_char: char, min_len: usize) -> bool {
    if !trimmed.starts_with(expected_char) {
        return false;
    }

    let count = trimmed.chars().take_while(|&c| c == expected_char).count();
    if count < min_len {
        return false;
    }

    trimmed[count..].chars().all(char::is_whitespace)
}

/// Byte ranges of inline code spans on a single line.
///
/// A span opens with a run of backticks and closes with a run of the same
/// length. An unmatched run is literal text.
pub(crate) fn code_spans(line: &str) -> Vec<(usize, usize)> {
    let bytes = line.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i] == b'`' {
            i += 1;
        }
        let run = i - start;

        let mut j = i;
        let mut closed = None;
        while j < bytes.len() {
            if bytes[j] == b'`' {
                let close_start = j;
                while j < bytes.len() && bytes[j] == b'`' {
                    j += 1;
                }
                if j - close_start == run {
                    closed = Some(j);
                    break;
                }
            } else {
                j += 1;
            }
        }

        if let Some(end) = closed {
            spans.push((start, end));
            i = end;
        }
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backtick_fence() {
        let mut tracker = FenceTracker::new();
        assert!(!tracker.in_fence());

        assert!(tracker.update("```rust"));
        assert!(tracker.in_fence());

        assert!(!tracker.update("![[inside.png]]"));
        assert!(tracker.in_fence());

        assert!(tracker.update("```"));
        assert!(!tracker.in_fence());
    }

    #[test]
    fn test_tilde_fence_needs_same_char() {
        let mut tracker = FenceTracker::new();
        tracker.update("~~~~");
        assert!(!tracker.update("```"));
        assert!(!tracker.update("~~~"));
        assert!(tracker.in_fence());
        assert!(tracker.update("~~~~"));
        assert!(!tracker.in_fence());
    }

    #[test]
    fn test_fence_inside_blockquote() {
        let mut tracker = FenceTracker::new();
        assert!(tracker.update("> ```"));
        assert!(tracker.in_fence());
        assert!(tracker.update("> ```"));
        assert!(!tracker.in_fence());
    }

    #[test]
    fn test_closing_fence_with_info_is_not_closing() {
        let mut tracker = FenceTracker::new();
        tracker.update("```");
        assert!(!tracker.update("```rust"));
        assert!(tracker.in_fence());
    }

    #[test]
    fn test_code_spans() {
        assert_eq!(code_spans("a `b` c"), vec![(2, 5)]);
        assert_eq!(code_spans("``a ` b`` `x`"), vec![(0, 9), (10, 13)]);
        assert!(code_spans("no `close").is_empty());
    }
}
