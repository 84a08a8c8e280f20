//! Minimal HTML markup tree.
//!
//! Components build [`Node`]s instead of concatenating strings so that text
//! and attribute values are always escaped. [`Node::Raw`] carries trusted HTML,
//! such as rendered Markdown, through unchanged.

use std::fmt::Write;

/// Elements rendered without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// A piece of markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An element with attributes and children.
    Element(Element),
    /// Escaped text.
    Text(String),
    /// Trusted HTML emitted verbatim.
    Raw(String),
    /// Sequence of nodes without a wrapper.
    Fragment(Vec<Node>),
}

/// An HTML element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: &'static str,
    attrs: Vec<(&'static str, String)>,
    children: Vec<Node>,
}

/// Start building an element.
#[must_use]
pub fn el(tag: &'static str) -> Element {
    Element {
        tag,
        attrs: Vec::new(),
        children: Vec::new(),
    }
}

/// Escaped text node.
#[must_use]
pub fn text(value: impl Into<String>) -> Node {
    Node::Text(value.into())
}

/// Trusted HTML node.
#[must_use]
pub fn raw(html: impl Into<String>) -> Node {
    Node::Raw(html.into())
}

/// Group nodes without a wrapper element.
#[must_use]
pub fn fragment(nodes: impl IntoIterator<Item = Node>) -> Node {
    Node::Fragment(nodes.into_iter().collect())
}

impl Element {
    /// Set an attribute.
    #[must_use]
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    /// Set an attribute when `value` is present.
    #[must_use]
    pub fn attr_opt(self, name: &'static str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.attr(name, value),
            None => self,
        }
    }

    /// Set the `class` attribute.
    #[must_use]
    pub fn class(self, value: impl Into<String>) -> Self {
        self.attr("class", value)
    }

    /// Append a child.
    #[must_use]
    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    /// Append several children.
    #[must_use]
    pub fn children<N: Into<Node>>(mut self, nodes: impl IntoIterator<Item = N>) -> Self {
        self.children.extend(nodes.into_iter().map(Into::into));
        self
    }

    /// Append an escaped text child.
    #[must_use]
    pub fn text(self, value: impl Into<String>) -> Self {
        self.child(Node::Text(value.into()))
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Text(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Text(value)
    }
}

impl Node {
    /// Serialize to HTML.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) {
        match self {
            Node::Text(value) => out.push_str(&escape_html(value)),
            Node::Raw(html) => out.push_str(html),
            Node::Fragment(nodes) => nodes.iter().for_each(|node| node.write_to(out)),
            Node::Element(element) => {
                out.push('<');
                out.push_str(element.tag);
                for (name, value) in &element.attrs {
                    let _ = write!(out, " {name}=\"{}\"", escape_html(value));
                }
                out.push('>');

                if VOID_ELEMENTS.contains(&element.tag) {
                    return;
                }

                for child in &element.children {
                    child.write_to(out);
                }
                let _ = write!(out, "</{}>", element.tag);
            }
        }
    }
}

/// Escape text for HTML content and attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_nested() {
        let node: Node = el("ul")
            .class("list")
            .child(el("li").text("one"))
            .child(el("li").child(el("a").attr("href", "/x").text("two")))
            .into();

        assert_eq!(
            node.render(),
            r#"<ul class="list"><li>one</li><li><a href="/x">two</a></li></ul>"#
        );
    }

    #[test]
    fn test_escapes_text_and_attributes() {
        let node: Node = el("p").attr("title", "a \"b\" & c").text("<script>").into();
        assert_eq!(
            node.render(),
            r#"<p title="a &quot;b&quot; &amp; c">&lt;script&gt;</p>"#
        );
    }

    #[test]
    fn test_raw_passthrough() {
        let node: Node = el("div").child(raw("<em>hi</em>")).into();
        assert_eq!(node.render(), "<div><em>hi</em></div>");
    }

    #[test]
    fn test_void_elements() {
        let node: Node = el("img").attr("src", "a.png").attr("alt", "").into();
        assert_eq!(node.render(), r#"<img src="a.png" alt="">"#);
    }

    #[test]
    fn test_fragment_and_optional_attr() {
        let node = fragment([
            Node::from(el("a").attr_opt("href", Some("/a")).text("a")),
            Node::from(el("span").attr_opt("title", None::<String>).text("b")),
            text(", "),
        ]);
        assert_eq!(node.render(), r#"<a href="/a">a</a><span>b</span>, "#);
    }
}
