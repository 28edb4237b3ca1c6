//! External links.
//!
//! Articles may only link to other articles on the platform. Other links keep
//! their text and show the target inline or as a numbered footnote.

use std::fmt::Write;

use crate::context::LinkStyle;
use crate::extension::Extension;
use crate::state::escape_html;

/// Link targets allowed to stay clickable.
const ALLOWED_PREFIXES: [&str; 2] = ["https://mp.weixin.qq.com/mp", "https://mp.weixin.qq.com/s"];

/// Decides the markup of each link and collects footnotes.
#[derive(Debug, Default)]
pub struct LinkRenderer {
    footnotes: Vec<String>,
}

impl LinkRenderer {
    /// Opening and closing markup placed around the rendered link text.
    pub(crate) fn wrap(&mut self, href: &str, text: &str, style: LinkStyle) -> (String, String) {
        if href.starts_with("mailto:") {
            return (String::new(), String::new());
        }

        if text.starts_with(href) || ALLOWED_PREFIXES.iter().any(|p| href.starts_with(p)) {
            return (
                format!(r#"<a href="{}">"#, escape_html(href)),
                "</a>".to_owned(),
            );
        }

        match style {
            LinkStyle::Inline => ("<a>".to_owned(), format!("[{}]</a>", escape_html(href))),
            LinkStyle::Footnote => {
                self.footnotes.push(href.to_owned());
                (
                    "<a>".to_owned(),
                    format!("<sup>[{}]</sup></a>", self.footnotes.len()),
                )
            }
        }
    }
}

impl Extension for LinkRenderer {
    fn name(&self) -> &'static str {
        "link"
    }

    fn prepare(&mut self) {
        self.footnotes.clear();
    }

    fn postprocess(&mut self, mut html: String) -> String {
        if self.footnotes.is_empty() {
            return html;
        }
        html.push_str(r#"<section class="footnotes"><hr><ol>"#);
        for href in &self.footnotes {
            write!(html, "<li>{}&nbsp;↩</li>", escape_html(href)).unwrap();
        }
        html.push_str("</ol></section>");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mailto_keeps_text_only() {
        let mut links = LinkRenderer::default();
        assert_eq!(
            links.wrap("mailto:a@b.c", "mail", LinkStyle::Inline),
            (String::new(), String::new())
        );
    }

    #[test]
    fn test_allowed_links_stay() {
        let mut links = LinkRenderer::default();
        let (open, close) = links.wrap("https://mp.weixin.qq.com/s/abc", "read", LinkStyle::Inline);
        assert_eq!(open, r#"<a href="https://mp.weixin.qq.com/s/abc">"#);
        assert_eq!(close, "</a>");

        let (open, _) = links.wrap("https://x.example", "https://x.example", LinkStyle::Footnote);
        assert_eq!(open, r#"<a href="https://x.example">"#);
        assert_eq!(links.postprocess(String::new()), "");
    }

    #[test]
    fn test_inline_style() {
        let mut links = LinkRenderer::default();
        let (open, close) = links.wrap("https://x.example", "site", LinkStyle::Inline);
        assert_eq!(format!("{open}site{close}"), "<a>site[https://x.example]</a>");
    }

    #[test]
    fn test_footnote_style() {
        let mut links = LinkRenderer::default();
        let (_, first) = links.wrap("https://a.example", "a", LinkStyle::Footnote);
        let (_, second) = links.wrap("https://b.example", "b", LinkStyle::Footnote);
        assert_eq!(first, "<sup>[1]</sup></a>");
        assert_eq!(second, "<sup>[2]</sup></a>");
        assert_eq!(
            links.postprocess("<p>x</p>".to_owned()),
            r#"<p>x</p><section class="footnotes"><hr><ol><li>https://a.example&nbsp;↩</li><li>https://b.example&nbsp;↩</li></ol></section>"#
        );

        links.prepare();
        assert_eq!(links.postprocess(String::new()), "");
    }
}
