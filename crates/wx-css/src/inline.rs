//! Cascade a stylesheet into inline `style` attributes.

use std::collections::HashSet;

use kuchikiki::{NodeRef, Selectors};
use tracing::debug;

use crate::ast::{Declaration, Stylesheet, parse_declarations};
use crate::dom::{self, Fragment};
use crate::error::CssError;

/// Class of topic links. The publishing host styles these itself, so they
/// never receive inline styles.
pub const TOPIC_LINK_CLASS: &str = "wx_topic_link";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Target {
    Element,
    Before,
    After,
}

struct CompiledSelector {
    selectors: Selectors,
    target: Target,
}

struct CompiledRule<'a> {
    selectors: Vec<CompiledSelector>,
    declarations: &'a [Declaration],
}

/// Inline the rules of `css` into the elements of `html`.
///
/// For every element (pre-order, not descending into `<svg>`), each matching
/// rule's declarations are written into the `style` attribute in rule
/// order. A property already present in the element's original inline style
/// wins over rule declarations unless the rule marks it `!important`.
/// `::before`/`::after` rules become real `<span>` children carrying the
/// `content` text. Unsupported selectors are skipped.
#[must_use]
pub fn apply_css(html: &str, css: &str) -> String {
    let sheet = Stylesheet::parse(css);
    for err in &sheet.errors {
        debug!("Ignoring stylesheet entry: {err}");
    }
    let rules = compile_rules(&sheet);

    let fragment = Fragment::parse(html);
    let mut elements = Vec::new();
    for child in fragment.root().children() {
        collect_elements(&child, &mut elements);
    }
    for element in &elements {
        style_element(element, &rules);
    }

    fragment.to_html()
}

fn compile_rules(sheet: &Stylesheet) -> Vec<CompiledRule<'_>> {
    sheet
        .rules
        .iter()
        .map(|rule| CompiledRule {
            selectors: rule
                .selectors
                .iter()
                .filter_map(|selector| match compile_selector(selector) {
                    Ok(compiled) => Some(compiled),
                    Err(err) => {
                        debug!("{err}");
                        None
                    }
                })
                .collect(),
            declarations: &rule.declarations,
        })
        .filter(|rule| !rule.selectors.is_empty())
        .collect()
}

fn compile_selector(selector: &str) -> Result<CompiledSelector, CssError> {
    let (base, target) = split_pseudo(selector);
    let selectors = Selectors::compile(base)
        .map_err(|()| CssError::InvalidSelector(selector.to_owned()))?;
    Ok(CompiledSelector { selectors, target })
}

/// Strip a trailing `::before`/`::after` (or legacy single colon form).
fn split_pseudo(selector: &str) -> (&str, Target) {
    let lower = selector.to_ascii_lowercase();
    for (suffix, target) in [
        ("::before", Target::Before),
        ("::after", Target::After),
        (":before", Target::Before),
        (":after", Target::After),
    ] {
        if lower.ends_with(suffix) {
            let base = selector[..selector.len() - suffix.len()].trim_end();
            return (if base.is_empty() { "*" } else { base }, target);
        }
    }
    (selector, Target::Element)
}

fn collect_elements(node: &NodeRef, out: &mut Vec<NodeRef>) {
    let Some(tag) = dom::tag_name(node) else {
        return;
    };
    out.push(node.clone());
    if tag == "svg" {
        return;
    }
    for child in node.children() {
        collect_elements(&child, out);
    }
}

/// Declarations accumulated for one element or pseudo-element.
#[derive(Default)]
struct InlineStyle {
    entries: Vec<(String, String, bool)>,
    explicit: HashSet<String>,
    important: HashSet<String>,
}

impl InlineStyle {
    fn from_attribute(style: &str) -> Self {
        let (declarations, _) = parse_declarations(style);
        let mut inline = Self::default();
        for decl in declarations {
            inline.explicit.insert(decl.property.clone());
            inline.set(&decl.property, &decl.value, decl.important);
        }
        inline
    }

    fn apply(&mut self, decl: &Declaration) {
        let protected =
            self.explicit.contains(&decl.property) || self.important.contains(&decl.property);
        if protected && !decl.important {
            return;
        }
        if decl.important {
            self.important.insert(decl.property.clone());
        }
        self.set(&decl.property, &decl.value, false);
    }

    fn set(&mut self, property: &str, value: &str, keep_important: bool) {
        if let Some(entry) = self.entries.iter_mut().find(|(p, _, _)| p == property) {
            entry.1 = value.to_owned();
            entry.2 = keep_important;
        } else {
            self.entries
                .push((property.to_owned(), value.to_owned(), keep_important));
        }
    }

    fn take(&mut self, property: &str) -> Option<String> {
        let index = self.entries.iter().position(|(p, _, _)| p == property)?;
        Some(self.entries.remove(index).1)
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(property, value, important)| {
                if *important {
                    format!("{property}:{value} !important")
                } else {
                    format!("{property}:{value}")
                }
            })
            .collect::<Vec<_>>()
            .join(";")
    }
}

fn style_element(node: &NodeRef, rules: &[CompiledRule<'_>]) {
    if dom::has_class(node, TOPIC_LINK_CLASS) {
        return;
    }
    let Some(element) = node.clone().into_element_ref() else {
        return;
    };

    let mut style = dom::get_attr(node, "style")
        .map(|s| InlineStyle::from_attribute(&s))
        .unwrap_or_default();
    let mut before = InlineStyle::default();
    let mut after = InlineStyle::default();

    for rule in rules {
        let mut applied = Vec::with_capacity(1);
        for selector in &rule.selectors {
            if applied.contains(&selector.target) || !selector.selectors.matches(&element) {
                continue;
            }
            applied.push(selector.target);
            let target = match selector.target {
                Target::Element => &mut style,
                Target::Before => &mut before,
                Target::After => &mut after,
            };
            for decl in rule.declarations {
                target.apply(decl);
            }
        }
    }

    if !style.is_empty() {
        dom::set_attr(node, "style", style.render());
    }
    if let Some(span) = pseudo_span(&mut before) {
        node.prepend(span);
    }
    if let Some(span) = pseudo_span(&mut after) {
        node.append(span);
    }
}

/// Build the real node standing in for a `::before`/`::after` box.
fn pseudo_span(style: &mut InlineStyle) -> Option<NodeRef> {
    let content = style.take("content")?;
    let text = unquote(&content);
    if matches!(text, "none" | "normal") && text == content.trim() {
        return None;
    }

    let span = dom::new_element("span")?;
    if !style.is_empty() {
        dom::set_attr(&span, "style", style.render());
    }
    if !text.is_empty() {
        span.append(NodeRef::new_text(text));
    }
    Some(span)
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
