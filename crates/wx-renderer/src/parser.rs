//! Markdown to article HTML.

use std::fmt::Write;
use std::ops::Range;
use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use pulldown_cmark::{
    CodeBlockKind, Event, HeadingLevel, LinkType, OffsetIter, Options, Parser, Tag, TagEnd,
};
use regex::Regex;
use tracing::{debug, warn};

use crate::callout::{CalloutRenderer, parse_callout, strip_quote_markers};
use crate::code::CodeRenderer;
use crate::context::RenderContext;
use crate::embed::{EmbedRenderer, EmbedTarget, register_image};
use crate::extension::Extension;
use crate::link::LinkRenderer;
use crate::preprocess::{
    EMBED_OPEN, EMBED_PLACEHOLDER, rewrite_inline, strip_comments, strip_front_matter,
};
use crate::state::{CodeBlockState, ImageState, LinkState, TableState, escape_html};

/// Nesting limit for notes embedded in embedded notes.
const MAX_EMBED_DEPTH: usize = 8;

static TOPIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[^\s#]+").expect("invalid topic regex"));

/// Markdown parser producing article HTML.
///
/// Standard markdown goes through pulldown-cmark; Obsidian callouts, embeds,
/// diagrams, math and account cards are handled by the extensions the parser
/// owns. Extension state (element numbering, footnotes) is reset at the start
/// of every [`parse`](Self::parse), while caches of rendered math and SVG
/// files live as long as the parser.
///
/// # Example
///
/// ```
/// use wx_images::{ImageError, LocalImageManager, VaultReader};
/// use wx_renderer::{
///     AssetResolver, CardDataManager, ElementCache, MarkedParser, PlainMathRenderer,
///     RenderContext, RenderError, RenderSettings, ResolvedResource,
/// };
///
/// struct EmptyVault;
///
/// impl VaultReader for EmptyVault {
///     fn read_bytes(&self, path: &str) -> Result<Vec<u8>, ImageError> {
///         Err(ImageError::NotFound(path.to_owned()))
///     }
/// }
///
/// impl AssetResolver for EmptyVault {
///     fn resolve_path(&self, _name: &str) -> Option<ResolvedResource> {
///         None
///     }
///     fn read_text(&self, path: &str) -> Result<String, RenderError> {
///         Err(RenderError::NotFound(path.to_owned()))
///     }
///     fn search_file(&self, _name: &str) -> Option<String> {
///         None
///     }
///     fn active_file(&self) -> Option<String> {
///         None
///     }
/// }
///
/// let settings = RenderSettings::default();
/// let mut images = LocalImageManager::new();
/// let mut cards = CardDataManager::new();
/// let mut elements = ElementCache::new();
/// let mut ctx = RenderContext {
///     settings: &settings,
///     resolver: &EmptyVault,
///     math: &PlainMathRenderer,
///     images: &mut images,
///     cards: &mut cards,
///     elements: &mut elements,
/// };
///
/// let html = MarkedParser::new().parse("Hello *world*", &mut ctx);
/// assert_eq!(html, "<p>Hello <em>world</em></p>");
/// ```
#[derive(Debug, Default)]
pub struct MarkedParser {
    callout: CalloutRenderer,
    code: CodeRenderer,
    embeds: EmbedRenderer,
    links: LinkRenderer,
    /// Embed targets by placeholder number.
    pending_embeds: Vec<String>,
}

impl MarkedParser {
    /// Create a parser with all extensions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn extensions_mut(&mut self) -> [&mut dyn Extension; 4] {
        [
            &mut self.callout,
            &mut self.code,
            &mut self.embeds,
            &mut self.links,
        ]
    }

    /// Render a note to HTML.
    ///
    /// Never fails: problems with referenced files are reported inline in
    /// the output and logged.
    pub fn parse(&mut self, markdown: &str, ctx: &mut RenderContext<'_>) -> String {
        for extension in self.extensions_mut() {
            debug!("Preparing {} extension", extension.name());
            extension.prepare();
        }
        self.pending_embeds.clear();

        let mut html = self.render(strip_front_matter(markdown), ctx, 0);
        for extension in self.extensions_mut() {
            html = extension.postprocess(html);
        }
        html
    }

    /// Render a markdown fragment. Used for the document and, recursively,
    /// for quote bodies and embedded notes.
    fn render(&mut self, markdown: &str, ctx: &mut RenderContext<'_>, depth: usize) -> String {
        let text = strip_comments(markdown);
        let text = rewrite_inline(&text, &mut self.pending_embeds);

        let html = EventWriter::new(self, ctx, depth).run(&text);
        self.substitute_embeds(&html, ctx, depth)
    }

    fn substitute_embeds(&mut self, html: &str, ctx: &mut RenderContext<'_>, depth: usize) -> String {
        if !html.contains(EMBED_OPEN) {
            return html.to_owned();
        }

        EMBED_PLACEHOLDER
            .replace_all(html, |caps: &regex::Captures<'_>| {
                let link = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .and_then(|m| m.as_str().parse::<usize>().ok())
                    .and_then(|index| self.pending_embeds.get(index).cloned());
                match link {
                    Some(link) => self.render_embed(&link, ctx, depth),
                    None => caps[0].to_owned(),
                }
            })
            .into_owned()
    }

    fn render_embed(&mut self, link: &str, ctx: &mut RenderContext<'_>, depth: usize) -> String {
        match EmbedTarget::parse(link) {
            EmbedTarget::Image(image) => {
                EmbedRenderer::render_image(link, image.path, image.width, image.height, ctx)
            }
            EmbedTarget::Svg(svg) => self.embeds.render_svg(svg.filename, svg.class, &svg.style, ctx),
            EmbedTarget::Note(note) => {
                let id = self.embeds.next_id();
                let body = if depth >= MAX_EMBED_DEPTH {
                    warn!("Embed nesting too deep, not expanding {link}");
                    format!("![[{}]]", escape_html(link))
                } else {
                    match EmbedRenderer::load_note(&note, ctx) {
                        Ok(markdown) => self.render(&markdown, ctx, depth + 1),
                        Err(message) => message,
                    }
                };
                let tag = ctx.settings.embed_style.tag();
                format!(r#"<{tag} class="note-embed-file" id="{id}">{body}</{tag}>"#)
            }
        }
    }
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_MATH
}

fn heading_number(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Escape text, turning `#tag` into topic links.
fn render_text(text: &str, topics: bool) -> String {
    if !topics || !text.contains('#') {
        return escape_html(text);
    }

    let mut html = String::with_capacity(text.len() + 64);
    let mut last = 0;
    for topic in TOPIC.find_iter(text) {
        html.push_str(&escape_html(&text[last..topic.start()]));
        write!(
            html,
            r#"<a class="wx_topic_link" data-topic="1">{}</a>"#,
            escape_html(topic.as_str())
        )
        .unwrap();
        last = topic.end();
    }
    html.push_str(&escape_html(&text[last..]));
    html
}

/// Consume events up to the end of the block quote just started.
fn skip_blockquote(events: &mut OffsetIter<'_>) {
    let mut depth = 1;
    for (event, _) in events.by_ref() {
        match event {
            Event::Start(Tag::BlockQuote(_)) => depth += 1,
            Event::End(TagEnd::BlockQuote(_)) => {
                depth -= 1;
                if depth == 0 {
                    return;
                }
            }
            _ => {}
        }
    }
}

/// Writes the HTML of one markdown fragment.
struct EventWriter<'p, 'c> {
    parser: &'p mut MarkedParser,
    ctx: &'p mut RenderContext<'c>,
    depth: usize,
    output: String,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    link: LinkState,
}

impl<'p, 'c> EventWriter<'p, 'c> {
    fn new(parser: &'p mut MarkedParser, ctx: &'p mut RenderContext<'c>, depth: usize) -> Self {
        Self {
            parser,
            ctx,
            depth,
            output: String::with_capacity(4096),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            link: LinkState::default(),
        }
    }

    fn run(mut self, text: &str) -> String {
        let mut events = Parser::new_ext(text, parser_options()).into_offset_iter();
        while let Some((event, range)) = events.next() {
            if let Event::Start(Tag::BlockQuote(_)) = event {
                skip_blockquote(&mut events);
                self.blockquote(text, range);
                continue;
            }
            self.process_event(event);
        }
        self.output
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::InlineMath(expression) => {
                let html = self.parser.code.render_math(&expression, true, self.ctx);
                self.output.push_str(&html);
            }
            Event::DisplayMath(expression) => {
                let html = self.parser.code.render_math(&expression, false, self.ctx);
                self.output.push_str(&html);
            }
            Event::Html(html) | Event::InlineHtml(html) => self.output.push_str(&html),
            Event::SoftBreak | Event::HardBreak => {
                if self.code.is_active() {
                    self.code.push_str("\n");
                } else if !self.image.is_active() {
                    self.output.push_str("<br>");
                }
            }
            Event::Rule => self.output.push_str("<hr>"),
            Event::TaskListMarker(checked) => {
                if checked {
                    self.output
                        .push_str(r#"<input checked="" disabled="" type="checkbox"> "#);
                } else {
                    self.output
                        .push_str(r#"<input disabled="" type="checkbox"> "#);
                }
            }
            Event::FootnoteReference(_) => {}
        }
    }

    /// Render a block quote from its source, as a callout when it carries a
    /// `[!type]` marker.
    fn blockquote(&mut self, text: &str, range: Range<usize>) {
        let quoted = strip_quote_markers(&text[range]);
        let block = match parse_callout(&quoted) {
            Some(parts) => {
                let body = self.parser.render(parts.body, self.ctx, self.depth);
                self.parser
                    .callout
                    .render_callout(&parts, &body, self.ctx.resolver)
            }
            None => {
                let body = self.parser.render(&quoted, self.ctx, self.depth);
                self.parser.callout.render_blockquote(&body)
            }
        };
        self.output.push_str(block.html());
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => {
                write!(self.output, "<h{}>", heading_number(level)).unwrap();
            }
            Tag::CodeBlock(kind) => {
                let info = match kind {
                    CodeBlockKind::Fenced(info) if !info.trim().is_empty() => {
                        Some(info.to_string())
                    }
                    _ => None,
                };
                self.code.start(info);
            }
            Tag::List(start) => {
                match start {
                    Some(1) => self.output.push_str(r#"<ol class="list-paddingleft-1">"#),
                    Some(n) => write!(
                        self.output,
                        r#"<ol start="{n}" class="list-paddingleft-1">"#
                    )
                    .unwrap(),
                    None => self.output.push_str(r#"<ul class="list-paddingleft-1">"#),
                }
            }
            Tag::Item => self.output.push_str(r#"<li><section><span data-leaf="">"#),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let align = self.table.current_alignment_style();
                let tag = if self.table.is_in_head() { "th" } else { "td" };
                write!(self.output, "<{tag}{align}>").unwrap();
            }
            Tag::Emphasis => self.output.push_str("<em>"),
            Tag::Strong => self.output.push_str("<strong>"),
            Tag::Strikethrough => self.output.push_str("<del>"),
            Tag::Superscript => self.output.push_str("<sup>"),
            Tag::Subscript => self.output.push_str("<sub>"),
            Tag::Link {
                link_type,
                dest_url,
                ..
            } => {
                let href = if link_type == LinkType::Email {
                    format!("mailto:{dest_url}")
                } else {
                    dest_url.to_string()
                };
                self.link.start(href, self.output.len());
            }
            Tag::Image {
                dest_url, title, ..
            } => self.image.start(dest_url.to_string(), title.to_string()),
            Tag::BlockQuote(_)
            | Tag::HtmlBlock
            | Tag::FootnoteDefinition(_)
            | Tag::MetadataBlock(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(level) => {
                write!(self.output, "</h{}>", heading_number(level)).unwrap();
            }
            TagEnd::CodeBlock => {
                let (info, content) = self.code.end();
                let block = self.parser.code.render(info.as_deref(), &content, self.ctx);
                self.output.push_str(block.html());
            }
            TagEnd::List(ordered) => {
                self.output.push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            TagEnd::Item => self.output.push_str("</span></section></li>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead><tbody>");
                self.table.end_head();
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                self.output.push_str(if self.table.is_in_head() {
                    "</th>"
                } else {
                    "</td>"
                });
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.output.push_str("</em>"),
            TagEnd::Strong => self.output.push_str("</strong>"),
            TagEnd::Strikethrough => self.output.push_str("</del>"),
            TagEnd::Superscript => self.output.push_str("</sup>"),
            TagEnd::Subscript => self.output.push_str("</sub>"),
            TagEnd::Link => {
                if let Some((href, offset)) = self.link.end() {
                    let (open, close) =
                        self.parser
                            .links
                            .wrap(&href, self.link.text(), self.ctx.settings.link_style);
                    self.output.insert_str(offset, &open);
                    self.output.push_str(&close);
                }
            }
            TagEnd::Image => {
                if let Some((src, title, alt)) = self.image.end() {
                    self.image_tag(&src, &title, &alt);
                }
            }
            TagEnd::BlockQuote(_)
            | TagEnd::HtmlBlock
            | TagEnd::FootnoteDefinition
            | TagEnd::MetadataBlock(_)
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition => {}
        }
    }

    /// Markdown image. Vault images are resolved and registered for upload.
    fn image_tag(&mut self, src: &str, title: &str, alt: &str) {
        let src = if src.starts_with("http") || src.starts_with("data:") {
            src.to_owned()
        } else {
            let path = percent_decode_str(src).decode_utf8_lossy();
            register_image(&path, self.ctx).unwrap_or_else(|| src.to_owned())
        };

        let mut img = format!(
            r#"<img src="{}" alt="{}""#,
            escape_html(&src),
            escape_html(alt)
        );
        if !title.is_empty() {
            write!(img, r#" title="{}""#, escape_html(title)).unwrap();
        }

        if self.ctx.settings.use_figcaption {
            write!(
                self.output,
                r#"<figure style="display: flex; flex-direction: column; align-items: center;">{img}>"#
            )
            .unwrap();
            if !alt.is_empty() {
                write!(self.output, "<figcaption>{}</figcaption>", escape_html(alt)).unwrap();
            }
            self.output.push_str("</figure>");
        } else {
            write!(self.output, "{img}>").unwrap();
        }
    }

    fn text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else if self.link.is_active() {
            self.link.push_text(text);
            self.output.push_str(&escape_html(text));
        } else {
            let html = render_text(text, self.ctx.settings.enable_topics);
            self.output.push_str(&html);
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
            return;
        }
        if self.link.is_active() {
            self.link.push_text(code);
        }
        write!(self.output, "<code>{}</code>", escape_html(code)).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{EmbedStyle, LinkStyle};
    use crate::test_support::{MockResolver, TestEnv};
    use pretty_assertions::assert_eq;

    fn render(env: &mut TestEnv, markdown: &str) -> String {
        let mut ctx = env.context();
        MarkedParser::new().parse(markdown, &mut ctx)
    }

    fn render_plain(markdown: &str) -> String {
        render(&mut TestEnv::new(), markdown)
    }

    #[test]
    fn test_paragraph_and_soft_break() {
        assert_eq!(render_plain("one\ntwo"), "<p>one<br>two</p>");
    }

    #[test]
    fn test_plain_heading() {
        assert_eq!(render_plain("## Title"), "<h2>Title</h2>");
    }

    #[test]
    fn test_front_matter_skipped() {
        assert_eq!(render_plain("---\ntitle: x\n---\nBody"), "<p>Body</p>");
    }

    #[test]
    fn test_list_markup() {
        assert_eq!(
            render_plain("- a\n- b"),
            r#"<ul class="list-paddingleft-1"><li><section><span data-leaf="">a</span></section></li><li><section><span data-leaf="">b</span></section></li></ul>"#
        );
        assert!(render_plain("3. c").starts_with(r#"<ol start="3" class="list-paddingleft-1">"#));
        assert!(render_plain("1. c").starts_with(r#"<ol class="list-paddingleft-1">"#));
    }

    #[test]
    fn test_task_list() {
        let html = render_plain("- [x] done");
        assert!(html.contains(r#"<input checked="" disabled="" type="checkbox"> done"#));
    }

    #[test]
    fn test_rule_and_inline() {
        assert_eq!(
            render_plain("**b** ~~s~~ `c`\n\n---"),
            "<p><strong>b</strong> <del>s</del> <code>c</code></p><hr>"
        );
    }

    #[test]
    fn test_table() {
        assert_eq!(
            render_plain("| a | b |\n|:--|---|\n| 1 | 2 |"),
            r#"<table><thead><tr><th style="text-align:left">a</th><th>b</th></tr></thead><tbody><tr><td style="text-align:left">1</td><td>2</td></tr></tbody></table>"#
        );
    }

    #[test]
    fn test_callout_with_custom_title() {
        let html = render_plain("> [!warning] Custom Title\n> Body text");
        assert!(html.starts_with(r#"<section class="note-callout note-callout-question">"#));
        assert!(html.contains(r#"<span class="note-callout-title">Custom Title</span>"#));
        assert!(html.ends_with(
            r#"<section class="note-callout-content"><p>Body text</p></section></section>"#
        ));
    }

    #[test]
    fn test_custom_callout_icon() {
        let mut env =
            TestEnv::with_resolver(MockResolver::default().with_icon("rocket", "<svg>r</svg>"));
        let html = render(&mut env, "> [!rocket]\n> Go");
        assert!(html.starts_with(r#"<section class="note-callout note-callout-custom">"#));
        assert!(html.contains(r#"<span class="note-callout-icon"><svg>r</svg></span>"#));
        assert!(html.contains(r#"<span class="note-callout-title">Rocket</span>"#));
    }

    #[test]
    fn test_plain_blockquote() {
        assert_eq!(
            render_plain("> quoted *text*\n> more"),
            "<blockquote><p>quoted <em>text</em><br>more</p></blockquote>"
        );
    }

    #[test]
    fn test_nested_quote_in_callout() {
        let html = render_plain("> [!note]\n> outer\n> > inner");
        assert!(html.contains("<blockquote><p>inner</p></blockquote>"));
    }

    #[test]
    fn test_mermaid_block() {
        let mut env = TestEnv::new();
        let html = render(&mut env, "```mermaid\ngraph TD\n```");
        assert_eq!(html, r#"<section id="mermaid-0" class="note-mermaid"></section>"#);
        assert_eq!(env.elements.get("mermaid", "mermaid-0"), Some("graph TD\n"));
    }

    #[test]
    fn test_card_block() {
        let mut env = TestEnv::new();
        let html = render(&mut env, "```mpcard\n<x data-id=\"c1\"></x>\n```");
        assert!(html.starts_with(r#"<section data-id="c1" class="note-mpcard-wrapper">"#));
        assert_eq!(env.cards.get("c1"), Some("<x data-id=\"c1\"></x>\n"));
    }

    #[test]
    fn test_inline_and_display_math() {
        let html = render_plain("a $x$ b\n\n$$y$$");
        assert!(html.contains(
            r#"<span id="math-id-1" class="inline-math-svg"><span class="math-inline">$x$</span></span>"#
        ));
        assert!(html.contains(r#"<span id="math-id-2" class="block-math-svg">"#));
    }

    #[test]
    fn test_math_numbering_restarts_per_parse() {
        let mut env = TestEnv::new();
        let mut parser = MarkedParser::new();
        let mut ctx = env.context();
        parser.parse("$a$", &mut ctx);
        let html = parser.parse("$a$", &mut ctx);
        assert!(html.contains(r#"id="math-id-1""#));
    }

    #[test]
    fn test_image_embed() {
        let mut env = TestEnv::with_resolver(MockResolver::default().with_bytes("img/a.png", b"x"));
        let html = render(&mut env, "![[a.png|120x80]]");
        assert_eq!(
            html,
            r#"<img src="app://vault/img/a.png" alt="a.png|120x80" width="120" height="80" />"#
        );
        assert_eq!(env.images.len(), 1);
    }

    #[test]
    fn test_inline_image_embed_stays_in_paragraph() {
        let mut env = TestEnv::with_resolver(MockResolver::default().with_bytes("a.png", b"x"));
        let html = render(&mut env, "see ![[a.png]] here");
        assert_eq!(
            html,
            r#"<p>see <img src="app://vault/a.png" alt="a.png" /> here</p>"#
        );
    }

    #[test]
    fn test_embed_in_code_is_literal() {
        let html = render_plain("`![[a.png]]`");
        assert_eq!(html, "<p><code>![[a.png]]</code></p>");
    }

    #[test]
    fn test_placeholder_lookalike_text_is_kept() {
        let mut env = TestEnv::with_resolver(MockResolver::default().with_bytes("a.png", b"x"));
        let html = render(&mut env, "{{EMBED_0}} and ![[a.png]]");
        assert_eq!(
            html,
            r#"<p>{{EMBED_0}} and <img src="app://vault/a.png" alt="a.png" /></p>"#
        );
    }

    #[test]
    fn test_note_embed_with_block_reference() {
        let mut env = TestEnv::with_resolver(
            MockResolver::default().with_text("Other.md", "- item1\n- item2 ^blockid\n- item3"),
        );
        let html = render(&mut env, "![[Other#^blockid]]");
        assert_eq!(
            html,
            r#"<section class="note-embed-file" id="fid-1"><ul class="list-paddingleft-1"><li><section><span data-leaf="">item1</span></section></li><li><section><span data-leaf="">item2</span></section></li></ul></section>"#
        );
    }

    #[test]
    fn test_note_embed_quote_style() {
        let mut env = TestEnv::with_resolver(MockResolver::default().with_text("N.md", "hi"));
        env.settings.embed_style = EmbedStyle::Quote;
        assert_eq!(
            render(&mut env, "![[N]]"),
            r#"<blockquote class="note-embed-file" id="fid-1"><p>hi</p></blockquote>"#
        );
    }

    #[test]
    fn test_missing_note_embed() {
        assert_eq!(
            render_plain("![[Missing]]"),
            r#"<section class="note-embed-file" id="fid-1">找不到文件：Missing.md</section>"#
        );
    }

    #[test]
    fn test_self_embed_is_bounded() {
        let mut env = TestEnv::with_resolver(MockResolver::default().with_text("Loop.md", "![[Loop]]"));
        let html = render(&mut env, "![[Loop]]");
        assert_eq!(html.matches("note-embed-file").count(), MAX_EMBED_DEPTH + 1);
        assert!(html.contains("![[Loop]]"));
    }

    #[test]
    fn test_embed_inside_callout() {
        let mut env = TestEnv::with_resolver(MockResolver::default().with_bytes("a.png", b"x"));
        let html = render(&mut env, "> [!tip]\n> ![[a.png]]");
        assert!(html.contains(
            r#"<section class="note-callout-content"><img src="app://vault/a.png" alt="a.png" /></section>"#
        ));
    }

    #[test]
    fn test_svg_embed() {
        let mut env = TestEnv::with_resolver(MockResolver::default().with_text("d.svg", "<svg/>"));
        let html = render(&mut env, "![[d.svg|center]]");
        assert_eq!(
            html,
            r#"<span class="note-embed-svg-center"><span class="note-embed-svg" id="fid-1" style="width:100%;height:100%"><svg/></span></span>"#
        );
    }

    #[test]
    fn test_markdown_image_registered() {
        let mut env = TestEnv::with_resolver(MockResolver::default().with_bytes("my pic.png", b"x"));
        let html = render(&mut env, "![cap](my%20pic.png \"T\")");
        assert_eq!(
            html,
            r#"<p><img src="app://vault/my pic.png" alt="cap" title="T"></p>"#
        );
        assert!(env.images.get("app://vault/my pic.png").is_some());
    }

    #[test]
    fn test_figcaption() {
        let mut env = TestEnv::new();
        env.settings.use_figcaption = true;
        let html = render(&mut env, "![cap](https://x.example/a.png)");
        assert_eq!(
            html,
            r#"<p><figure style="display: flex; flex-direction: column; align-items: center;"><img src="https://x.example/a.png" alt="cap"><figcaption>cap</figcaption></figure></p>"#
        );
    }

    #[test]
    fn test_topics() {
        assert_eq!(
            render_plain("hello #rust"),
            r#"<p>hello <a class="wx_topic_link" data-topic="1">#rust</a></p>"#
        );

        let mut env = TestEnv::new();
        env.settings.enable_topics = false;
        assert_eq!(render(&mut env, "hello #rust"), "<p>hello #rust</p>");
    }

    #[test]
    fn test_links_inline_style() {
        assert_eq!(
            render_plain("[site](https://x.example) [a](https://mp.weixin.qq.com/s/1)"),
            r#"<p><a>site[https://x.example]</a> <a href="https://mp.weixin.qq.com/s/1">a</a></p>"#
        );
        assert_eq!(render_plain("<me@x.example>"), "<p>me@x.example</p>");
    }

    #[test]
    fn test_links_footnote_style() {
        let mut env = TestEnv::new();
        env.settings.link_style = LinkStyle::Footnote;
        let html = render(&mut env, "[a](https://a.example) and [b](https://b.example)");
        assert_eq!(
            html,
            r#"<p><a>a<sup>[1]</sup></a> and <a>b<sup>[2]</sup></a></p><section class="footnotes"><hr><ol><li>https://a.example&nbsp;↩</li><li>https://b.example&nbsp;↩</li></ol></section>"#
        );
    }

    #[test]
    fn test_highlight_comment_and_block_mark() {
        assert_eq!(
            render_plain("a ==b== %%hidden%%c ^id1"),
            r#"<p>a <span class="note-highlight">b</span> c</p>"#
        );
    }

    #[test]
    fn test_code_block_highlighted() {
        let html = render_plain("```\nplain\n```");
        assert!(html.starts_with(r#"<section class="code-section code-snippet__fix hljs"><pre>"#));
        assert!(html.contains("plain"));
    }
}
