//! Document tree
//!
//! A small owned element tree standing in for the report form markup. The
//! pipeline only ever reads it, except for the neutralizer which works on a
//! clone.

use std::collections::BTreeMap;

// ============================================
// Markers
// ============================================

/// Class marking an element as one output page
pub const PAGE_CLASS: &str = "page";

/// Class hiding an element from every capture
pub const NO_PRINT_CLASS: &str = "no-print";

/// Attribute equivalent of `no-print`
pub const PRINT_EXCLUDE_ATTR: &str = "data-print-exclude";

/// Class of the chart container rendered outside the page flow
pub const CHART_REGION_CLASS: &str = "charts";

/// Class of containers that only render when captured directly
pub const OFFSCREEN_CLASS: &str = "offscreen";

/// Semantic heading level (1-3) used for spacing corrections
pub const HEADING_LEVEL_ATTR: &str = "data-heading-level";

/// Tags counted as media by the page collector
pub const MEDIA_TAGS: &[&str] = &["img", "svg", "canvas", "video", "picture"];

// ============================================
// Style declarations
// ============================================

/// Inline style declarations, in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    declarations: Vec<(String, String)>,
}

impl Style {
    /// Parse a `style` attribute value (`"a: b; c: d"`)
    pub fn parse(css: &str) -> Self {
        let mut style = Style::default();
        for decl in css.split(';') {
            if let Some((prop, value)) = decl.split_once(':') {
                let prop = prop.trim();
                let value = value.trim();
                if !prop.is_empty() && !value.is_empty() {
                    style.set(prop, value);
                }
            }
        }
        style
    }

    pub fn get(&self, prop: &str) -> Option<&str> {
        self.declarations
            .iter()
            .rev()
            .find(|(p, _)| p.eq_ignore_ascii_case(prop))
            .map(|(_, v)| v.as_str())
    }

    /// Set a declaration, replacing an existing one
    pub fn set(&mut self, prop: &str, value: &str) {
        let prop = prop.to_ascii_lowercase();
        if let Some(slot) = self.declarations.iter_mut().find(|(p, _)| *p == prop) {
            slot.1 = value.to_string();
        } else {
            self.declarations.push((prop, value.to_string()));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations.iter().map(|(p, v)| (p.as_str(), v.as_str()))
    }

    pub fn to_css(&self) -> String {
        self.declarations
            .iter()
            .map(|(p, v)| format!("{}: {}", p, v))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// ============================================
// Nodes
// ============================================

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    /// Lower-case tag name
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub style: Style,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    // ---- builders ----

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_style(mut self, prop: &str, value: &str) -> Self {
        self.style.set(prop, value);
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    // ---- attributes ----

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// `style` is routed into the parsed declaration list
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        if name == "style" {
            for (prop, v) in Style::parse(&value).iter() {
                self.style.set(prop, v);
            }
        } else {
            self.attrs.insert(name, value);
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let joined = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.attrs.insert("class".to_string(), joined);
    }

    /// `display: none` on the element itself
    pub fn is_display_none(&self) -> bool {
        self.style
            .get("display")
            .map(|d| d.eq_ignore_ascii_case("none"))
            .unwrap_or(false)
    }

    /// Flagged as exclude-from-print
    pub fn is_print_excluded(&self) -> bool {
        self.has_class(NO_PRINT_CLASS) || self.attrs.contains_key(PRINT_EXCLUDE_ATTR)
    }

    // ---- traversal ----

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Pre-order walk over this element and every element below it
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.descendants().find(|el| el.id() == Some(id))
    }

    pub fn find_first_by_class(&self, class: &str) -> Option<&Element> {
        self.descendants().find(|el| el.has_class(class))
    }

    /// Concatenated text of every text node below this element
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(el: &Element, out: &mut String) {
    for child in &el.children {
        match child {
            Node::Text(t) => out.push_str(t),
            Node::Element(c) => collect_text(c, out),
        }
    }
}

/// Document-order iterator, see [`Element::descendants`]
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let el = self.stack.pop()?;
        for child in el.children.iter().rev() {
            if let Node::Element(c) = child {
                self.stack.push(c);
            }
        }
        Some(el)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Element {
        Element::new("div")
            .with_attr("id", "root")
            .with_child(
                Element::new("section")
                    .with_class("page")
                    .with_child(Element::new("h1").with_text("العنوان")),
            )
            .with_child(
                Element::new("section")
                    .with_class("page")
                    .with_attr("id", "second")
                    .with_text("نص"),
            )
    }

    #[test]
    fn test_style_parse_and_set() {
        let mut style = Style::parse("display: none; color:#333 ;; bad");
        assert_eq!(style.get("display"), Some("none"));
        assert_eq!(style.get("COLOR"), Some("#333"));
        style.set("display", "block");
        assert_eq!(style.get("display"), Some("block"));
        assert_eq!(style.to_css(), "display: block; color: #333");
    }

    #[test]
    fn test_style_attribute_routed() {
        let el = Element::new("DIV").with_attr("style", "text-align: center");
        assert_eq!(el.tag, "div");
        assert_eq!(el.style.get("text-align"), Some("center"));
        assert!(el.attr("style").is_none());
    }

    #[test]
    fn test_classes() {
        let mut el = Element::new("div").with_attr("class", " page  wide ");
        assert!(el.has_class("page"));
        assert!(el.has_class("wide"));
        el.add_class("wide");
        el.add_class("no-print");
        assert_eq!(el.attr("class"), Some("page  wide no-print"));
        assert!(el.is_print_excluded());
    }

    #[test]
    fn test_descendants_document_order() {
        let root = sample();
        let tags: Vec<&str> = root.descendants().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["div", "section", "h1", "section"]);
    }

    #[test]
    fn test_find_and_text() {
        let root = sample();
        assert_eq!(root.find_by_id("second").map(|e| e.text_content()), Some("نص".to_string()));
        assert_eq!(root.text_content(), "العنواننص");
        assert!(root.find_first_by_class("missing").is_none());
    }
}
