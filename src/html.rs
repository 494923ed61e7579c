//! A small typed HTML tree.
//!
//! Every string that reaches the output through [`text`] or an attribute is
//! escaped on display. Only [`raw`] bypasses escaping and it only accepts
//! `'static` markup written in this crate.

use std::borrow::Cow;
use std::fmt::{self, Write};

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Raw(Cow<'static, str>),
    Text(Cow<'static, str>),
    Element(Element),
    Fragment(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: &'static str,
    pub attributes: Vec<(&'static str, Cow<'static, str>)>,
    pub children: Vec<Node>,
    pub void: bool,
}

impl Element {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
            void: false,
        }
    }

    /// An element such as `<meta>` that never has children or a closing tag
    pub fn void(name: &'static str) -> Self {
        Self {
            void: true,
            ..Self::new(name)
        }
    }

    pub fn attr(mut self, key: &'static str, value: impl Into<Cow<'static, str>>) -> Self {
        self.attributes.push((key, value.into()));
        self
    }

    pub fn class(self, value: impl Into<Cow<'static, str>>) -> Self {
        self.attr("class", value)
    }

    pub fn id(self, value: impl Into<Cow<'static, str>>) -> Self {
        self.attr("id", value)
    }

    pub fn style(self, value: impl Into<Cow<'static, str>>) -> Self {
        self.attr("style", value)
    }

    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn class_list(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .iter()
            .filter(|(key, _)| *key == "class")
            .flat_map(|(_, value)| value.split_whitespace())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_list().any(|c| c == class)
    }

    /// Add a class to the first `class` attribute, creating it if needed
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        match self.attributes.iter_mut().find(|(key, _)| *key == "class") {
            Some((_, value)) => {
                let joined = if value.is_empty() {
                    class.to_string()
                } else {
                    format!("{} {}", value, class)
                };
                *value = joined.into();
            }
            None => self.attributes.push(("class", class.to_string().into())),
        }
    }
}

pub fn el(name: &'static str) -> Element {
    Element::new(name)
}

pub fn div() -> Element {
    Element::new("div")
}

pub fn span() -> Element {
    Element::new("span")
}

/// A Font Awesome icon, `<i class="fas fa-...">`
pub fn icon(name: &'static str) -> Element {
    Element::new("i").class(format!("fas {}", name))
}

pub fn text(value: impl Into<Cow<'static, str>>) -> Node {
    Node::Text(value.into())
}

pub fn raw(value: &'static str) -> Node {
    Node::Raw(Cow::Borrowed(value))
}

pub fn fragment<I>(nodes: I) -> Node
where
    I: IntoIterator,
    I::Item: Into<Node>,
{
    Node::Fragment(nodes.into_iter().map(Into::into).collect())
}

impl Node {
    pub fn render_to_string(&self) -> String {
        self.to_string()
    }
}

impl From<Element> for Node {
    fn from(value: Element) -> Node {
        Node::Element(value)
    }
}

impl From<String> for Node {
    fn from(value: String) -> Node {
        Node::Text(value.into())
    }
}

impl From<&'static str> for Node {
    fn from(value: &'static str) -> Node {
        Node::Text(value.into())
    }
}

impl<T> From<Option<T>> for Node
where
    T: Into<Node>,
{
    fn from(value: Option<T>) -> Node {
        match value {
            Some(value) => value.into(),
            None => Node::Fragment(Vec::new()),
        }
    }
}

impl From<Vec<Node>> for Node {
    fn from(value: Vec<Node>) -> Node {
        Node::Fragment(value)
    }
}

struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '>' => f.write_str("&gt;")?,
                '<' => f.write_str("&lt;")?,
                '"' => f.write_str("&quot;")?,
                '&' => f.write_str("&amp;")?,
                '\'' => f.write_str("&#39;")?,
                c => f.write_char(c)?,
            };
        }
        Ok(())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Raw(value) => f.write_str(value),
            Node::Text(value) => write!(f, "{}", Escaped(value)),
            Node::Element(element) => write!(f, "{}", element),
            Node::Fragment(children) => {
                for child in children {
                    write!(f, "{}", child)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for (key, value) in &self.attributes {
            write!(f, r#" {}="{}""#, key, Escaped(value))?;
        }
        write!(f, ">")?;
        if self.void {
            return Ok(());
        }
        for child in &self.children {
            write!(f, "{}", child)?;
        }
        write!(f, "</{}>", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_and_attributes_are_escaped() {
        let node: Node = div()
            .class("card")
            .attr("title", "a \"quoted\" <title>".to_string())
            .child(text("<script>alert('x')</script> & more".to_string()))
            .into();
        assert_eq!(
            node.render_to_string(),
            "<div class=\"card\" title=\"a &quot;quoted&quot; &lt;title&gt;\">&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; more</div>"
        );
    }

    #[test]
    fn raw_markup_is_not_escaped() {
        let node = fragment([raw("<!DOCTYPE html>"), text("<b>")]);
        assert_eq!(node.to_string(), "<!DOCTYPE html>&lt;b&gt;");
    }

    #[test]
    fn void_elements_have_no_closing_tag() {
        let node: Node = Element::void("meta").attr("charset", "UTF-8").into();
        assert_eq!(node.to_string(), r#"<meta charset="UTF-8">"#);
    }

    #[test]
    fn option_children_render_only_when_present() {
        let node: Node = div()
            .child(Some(span().child("badge")))
            .child(None::<Element>)
            .into();
        assert_eq!(node.to_string(), "<div><span>badge</span></div>");
    }

    #[test]
    fn class_manipulation() {
        let mut card = div().class("results-card animate__animated");
        card.add_class("animate__pulse");
        assert!(card.has_class("animate__pulse"));
        card.add_class("animate__pulse");
        assert_eq!(card.class_list().filter(|c| *c == "animate__pulse").count(), 1);
        assert!(card.has_class("results-card"));

        let mut bare = div();
        bare.add_class("active");
        assert_eq!(Node::from(bare).to_string(), r#"<div class="active"></div>"#);
    }

    #[test]
    fn icon_uses_font_awesome_classes() {
        assert_eq!(
            Node::from(icon("fa-robot")).to_string(),
            r#"<i class="fas fa-robot"></i>"#
        );
    }
}
