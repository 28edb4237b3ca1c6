//! Small DOM helpers over `kuchikiki` shared by the inliner and the image
//! pipeline.

use kuchikiki::NodeRef;
use kuchikiki::traits::TendrilSink;

/// An HTML fragment parsed into a detached document.
///
/// The fragment's top-level nodes live under the document `<body>`, which is
/// what [`root`](Self::root) returns and what [`to_html`](Self::to_html)
/// serializes (children only, without the `<body>` tag itself).
pub struct Fragment {
    document: NodeRef,
}

impl Fragment {
    /// Parse an HTML fragment.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        Self {
            document: kuchikiki::parse_html().one(html),
        }
    }

    /// Container node holding the fragment's top-level nodes.
    #[must_use]
    pub fn root(&self) -> NodeRef {
        self.document
            .select_first("body")
            .map_or_else(|()| self.document.clone(), |body| body.as_node().clone())
    }

    /// All elements matching a CSS selector, in document order.
    #[must_use]
    pub fn select_all(&self, selector: &str) -> Vec<NodeRef> {
        self.root()
            .select(selector)
            .map(|matches| matches.map(|m| m.as_node().clone()).collect())
            .unwrap_or_default()
    }

    /// Serialize the fragment back to HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        serialize_children(&self.root())
    }
}

/// Serialize the children of `node`, excluding `node` itself.
#[must_use]
pub fn serialize_children(node: &NodeRef) -> String {
    let mut out = Vec::new();
    for child in node.children() {
        if child.serialize(&mut out).is_err() {
            tracing::warn!("Failed to serialize DOM node");
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Create a detached element with the given tag name.
#[must_use]
pub fn new_element(tag: &str) -> Option<NodeRef> {
    let holder = kuchikiki::parse_html().one(format!("<{tag}></{tag}>"));
    let node = holder.select_first(tag).ok()?.as_node().clone();
    node.detach();
    Some(node)
}

/// Read an attribute from an element node.
#[must_use]
pub fn get_attr(node: &NodeRef, name: &str) -> Option<String> {
    node.as_element()
        .and_then(|el| el.attributes.borrow().get(name).map(str::to_owned))
}

/// Set an attribute on an element node. Non-element nodes are ignored.
pub fn set_attr(node: &NodeRef, name: &str, value: impl Into<String>) {
    if let Some(el) = node.as_element() {
        el.attributes.borrow_mut().insert(name, value.into());
    }
}

/// Check whether an element carries `class` in its class list.
#[must_use]
pub fn has_class(node: &NodeRef, class: &str) -> bool {
    get_attr(node, "class").is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
}

/// Lowercase tag name of an element node.
#[must_use]
pub fn tag_name(node: &NodeRef) -> Option<String> {
    node.as_element().map(|el| el.name.local.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fragment_round_trip() {
        let html = r#"<section class="a"><p>Hi <strong>there</strong></p></section>"#;
        assert_eq!(Fragment::parse(html).to_html(), html);
    }

    #[test]
    fn test_select_all_in_order() {
        let fragment = Fragment::parse(r#"<img src="a.png"><p><img src="b.png"></p>"#);
        let srcs: Vec<_> = fragment
            .select_all("img")
            .iter()
            .filter_map(|n| get_attr(n, "src"))
            .collect();
        assert_eq!(srcs, vec!["a.png".to_owned(), "b.png".to_owned()]);
    }

    #[test]
    fn test_set_attr_and_class() {
        let fragment = Fragment::parse(r#"<a class="x wx_topic_link">#t</a>"#);
        let link = &fragment.select_all("a")[0];
        assert!(has_class(link, "wx_topic_link"));
        assert!(!has_class(link, "wx"));
        set_attr(link, "data-topic", "1");
        assert_eq!(get_attr(link, "data-topic").as_deref(), Some("1"));
    }

    #[test]
    fn test_new_element_is_detached() {
        let span = new_element("span").unwrap();
        assert!(span.parent().is_none());
        assert_eq!(tag_name(&span).as_deref(), Some("span"));
    }
}
