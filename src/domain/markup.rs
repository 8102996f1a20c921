//! Minimal markup tree. Views build a tree from snapshot fields and
//! serialize it once, so escaping happens in a single place.

use std::fmt::{self, Display, Write};

use html_escape::{encode_double_quoted_attribute, encode_text};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    Element(Element),
    Text(String),
    Fragment(Vec<Markup>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: &'static str,
    attributes: Vec<(&'static str, Option<String>)>,
    children: Vec<Markup>,
}

/// Tags that never carry children or a closing tag.
const VOID_TAGS: &[&str] = &["input", "img", "br", "hr", "meta", "link"];

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self { tag, attributes: Vec::new(), children: Vec::new() }
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((name, Some(value.into())));
        self
    }

    /// Boolean attribute such as `selected`.
    pub fn flag(mut self, name: &'static str, enabled: bool) -> Self {
        if enabled {
            self.attributes.push((name, None));
        }
        self
    }

    pub fn class(self, value: impl Into<String>) -> Self {
        self.attr("class", value)
    }

    pub fn id(self, value: impl Into<String>) -> Self {
        self.attr("id", value)
    }

    pub fn child(mut self, child: impl Into<Markup>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Markup>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Markup::Text(text.into()))
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| *key == name)
            .and_then(|(_, value)| value.as_deref())
    }
}

impl From<Element> for Markup {
    fn from(element: Element) -> Self {
        Markup::Element(element)
    }
}

impl From<&str> for Markup {
    fn from(text: &str) -> Self {
        Markup::Text(text.to_string())
    }
}

impl From<String> for Markup {
    fn from(text: String) -> Self {
        Markup::Text(text)
    }
}

impl Markup {
    pub fn text(text: impl Into<String>) -> Self {
        Markup::Text(text.into())
    }

    pub fn fragment(children: impl IntoIterator<Item = Markup>) -> Self {
        Markup::Fragment(children.into_iter().collect())
    }

    pub fn to_html(&self) -> String {
        self.to_string()
    }

    /// Depth-first search for elements carrying `class` among their classes.
    pub fn find_by_class(&self, class: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect_by_class(class, &mut found);
        found
    }

    fn collect_by_class<'a>(&'a self, class: &str, found: &mut Vec<&'a Element>) {
        match self {
            Markup::Element(element) => {
                if element
                    .attribute("class")
                    .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
                {
                    found.push(element);
                }
                for child in &element.children {
                    child.collect_by_class(class, found);
                }
            }
            Markup::Fragment(children) => {
                for child in children {
                    child.collect_by_class(class, found);
                }
            }
            Markup::Text(_) => {}
        }
    }
}

impl Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Markup::Text(text) => f.write_str(&encode_text(text)),
            Markup::Fragment(children) => children.iter().try_for_each(|child| Display::fmt(child, f)),
            Markup::Element(element) => {
                write!(f, "<{}", element.tag)?;
                for (name, value) in &element.attributes {
                    match value {
                        Some(value) => {
                            write!(f, " {name}=\"{}\"", encode_double_quoted_attribute(value))?
                        }
                        None => write!(f, " {name}")?,
                    }
                }
                f.write_char('>')?;
                if VOID_TAGS.contains(&element.tag) {
                    return Ok(());
                }
                for child in &element.children {
                    Display::fmt(child, f)?;
                }
                write!(f, "</{}>", element.tag)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_nested_elements_with_escaping() {
        let markup: Markup = Element::new("li")
            .class("col-5 center")
            .text("<b>&\"x\"")
            .child(Element::new("input").attr("type", "hidden").attr("value", "a'b \"q\""))
            .into();
        assert_eq!(
            markup.to_html(),
            "<li class=\"col-5 center\">&lt;b&gt;&amp;\"x\"\
             <input type=\"hidden\" value=\"a'b &quot;q&quot;\"></li>"
        );
    }

    #[test]
    fn boolean_attributes_only_render_when_set() {
        let on: Markup = Element::new("option").flag("selected", true).attr("value", "2").text("2").into();
        let off: Markup = Element::new("option").flag("selected", false).attr("value", "1").text("1").into();
        assert_eq!(on.to_html(), "<option selected value=\"2\">2</option>");
        assert_eq!(off.to_html(), "<option value=\"1\">1</option>");
    }

    #[test]
    fn finds_elements_by_class() {
        let markup = Markup::fragment([
            Markup::from(Element::new("ul").class("row").child(Element::new("li").class("note cell"))),
            Markup::from(Element::new("li").class("cell")),
        ]);
        assert_eq!(markup.find_by_class("cell").len(), 2);
        assert_eq!(markup.find_by_class("note").len(), 1);
        assert!(markup.find_by_class("missing").is_empty());
    }
}
