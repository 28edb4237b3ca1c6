//! Syntax-highlighted code blocks.

use std::fmt::Write;

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use tracing::debug;

use crate::state::escape_html;

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hljs-" };

/// Highlights code into per-line `<code>` markup.
pub(crate) struct Highlighter {
    syntaxes: SyntaxSet,
}

impl std::fmt::Debug for Highlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Highlighter").finish_non_exhaustive()
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
        }
    }
}

impl Highlighter {
    /// Render a code block.
    ///
    /// `lang` is the declared fence language; when it is unknown the syntax
    /// is guessed from the first line, falling back to plain text.
    pub(crate) fn render(&self, code: &str, lang: Option<&str>, line_number: bool) -> String {
        let code = code.strip_suffix('\n').unwrap_or(code);
        let highlighted = self.highlight(code, lang);
        let lines: Vec<&str> = highlighted.split('\n').collect();

        let mut body = String::new();
        let mut gutter = String::new();
        for (index, line) in balance_lines(&lines).iter().enumerate() {
            if is_blank_markup(line) {
                body.push_str("<code><br></code>");
            } else {
                write!(body, "<code>{}</code>", replace_spaces(line)).unwrap();
            }
            write!(gutter, "<li>{}</li>", index + 1).unwrap();
        }

        let mut html = String::from(r#"<section class="code-section code-snippet__fix hljs">"#);
        if line_number {
            write!(html, "<ul>{gutter}</ul>").unwrap();
        }
        match lang {
            Some(lang) => write!(
                html,
                r#"<pre style="max-width:1000% !important;" class="hljs language-{}">{body}</pre>"#,
                escape_html(lang)
            )
            .unwrap(),
            None => write!(html, "<pre>{body}</pre>").unwrap(),
        }
        html.push_str("</section>");
        html
    }

    fn find_syntax(&self, code: &str, lang: Option<&str>) -> &SyntaxReference {
        lang.and_then(|lang| self.syntaxes.find_syntax_by_token(lang))
            .or_else(|| {
                let first_line = code.lines().next().unwrap_or_default();
                self.syntaxes.find_syntax_by_first_line(first_line)
            })
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text())
    }

    /// Highlighted HTML with spans that may cross line boundaries.
    fn highlight(&self, code: &str, lang: Option<&str>) -> String {
        let syntax = self.find_syntax(code, lang);
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            if let Err(err) = generator.parse_html_for_line_which_includes_newline(line) {
                debug!("Highlighting failed, falling back to plain text: {err}");
                return escape_html(code);
            }
        }
        generator.finalize()
    }
}

/// Close spans still open at the end of each line and reopen them on the
/// next, so every line is self-contained markup.
fn balance_lines(lines: &[&str]) -> Vec<String> {
    let mut open: Vec<String> = Vec::new();
    let mut result = Vec::with_capacity(lines.len());

    for line in lines {
        let mut balanced: String = open.concat();
        balanced.push_str(line);

        let mut rest = *line;
        while let Some(start) = rest.find('<') {
            let Some(len) = rest[start..].find('>') else {
                break;
            };
            let tag = &rest[start..=start + len];
            if tag.starts_with("</") {
                open.pop();
            } else if tag.starts_with("<span") {
                open.push(tag.to_owned());
            }
            rest = &rest[start + len + 1..];
        }

        for _ in &open {
            balanced.push_str("</span>");
        }
        result.push(balanced);
    }

    result
}

/// Whether a line has no text outside its tags.
fn is_blank_markup(line: &str) -> bool {
    let mut in_tag = false;
    for c in line.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => return false,
            _ => {}
        }
    }
    true
}

/// Make whitespace outside tags survive the target's whitespace collapsing.
fn replace_spaces(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => {
                in_tag = true;
                result.push(c);
            }
            '>' => {
                in_tag = false;
                result.push(c);
            }
            ' ' if !in_tag => result.push_str("&nbsp;"),
            '\t' if !in_tag => result.push_str("&nbsp;&nbsp;&nbsp;&nbsp;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_replace_spaces_outside_tags() {
        assert_eq!(
            replace_spaces("<span class=\"a b\">x y</span>\tz"),
            "<span class=\"a b\">x&nbsp;y</span>&nbsp;&nbsp;&nbsp;&nbsp;z"
        );
    }

    #[test]
    fn test_is_blank_markup() {
        assert!(is_blank_markup(""));
        assert!(is_blank_markup("<span class=\"x\"></span>"));
        assert!(!is_blank_markup("<span> </span>"));
    }

    #[test]
    fn test_balance_lines_reopens_spans() {
        let lines = ["<span class=\"c\">/* a", "b */</span> x"];
        assert_eq!(
            balance_lines(&lines),
            vec![
                "<span class=\"c\">/* a</span>".to_owned(),
                "<span class=\"c\">b */</span> x".to_owned(),
            ]
        );
    }

    #[test]
    fn test_plain_block_without_language() {
        let html = Highlighter::default().render("a  b\n\nc\n", None, false);
        assert!(html.starts_with(r#"<section class="code-section code-snippet__fix hljs"><pre>"#));
        assert!(html.contains("a&nbsp;&nbsp;b"));
        assert!(html.contains("<code><br></code>"));
        assert_eq!(html.matches("<code>").count(), 3);
        assert!(html.ends_with("</pre></section>"));
    }

    #[test]
    fn test_line_number_gutter() {
        let html = Highlighter::default().render("one\ntwo", Some("text"), true);
        assert!(html.contains("<ul><li>1</li><li>2</li></ul>"));
        assert!(html.contains(r#"<pre style="max-width:1000% !important;" class="hljs language-text">"#));
    }

    #[test]
    fn test_known_language_gets_classes() {
        let html = Highlighter::default().render("fn main() {}", Some("rust"), false);
        assert!(html.contains("hljs-"));
        assert!(html.contains("language-rust"));
        // Every line is balanced.
        assert_eq!(html.matches("<span").count(), html.matches("</span>").count());
    }

    #[test]
    fn test_html_is_escaped() {
        let html = Highlighter::default().render("<b>&</b>", None, false);
        assert!(html.contains("&lt;b&gt;&amp;&lt;/b&gt;"));
    }
}
