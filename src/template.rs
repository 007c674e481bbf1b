//! XHTML templates as capture roots

use crate::error::Result;
use irshad_common::dom::{Element, Node};
use irshad_common::Error as CommonError;
use std::path::Path;

/// HTML entities that XML parsers reject, mapped to character references
const HTML_ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", "&#160;"),
    ("&laquo;", "&#171;"),
    ("&raquo;", "&#187;"),
    ("&mdash;", "&#8212;"),
    ("&ndash;", "&#8211;"),
];

pub fn load_template(path: &Path) -> Result<Element> {
    let source = std::fs::read_to_string(path)?;
    parse_template(&source)
}

/// Parse an XHTML document; the `body` element is the root when present
pub fn parse_template(source: &str) -> Result<Element> {
    let mut source = source.to_string();
    for (entity, reference) in HTML_ENTITIES {
        source = source.replace(entity, reference);
    }

    let doc = roxmltree::Document::parse(&source)
        .map_err(|e| CommonError::Template(e.to_string()))?;
    let root = convert(doc.root_element());

    let body = root.descendants().find(|el| el.tag == "body").cloned();
    Ok(body.unwrap_or(root))
}

fn convert(node: roxmltree::Node<'_, '_>) -> Element {
    let mut el = Element::new(node.tag_name().name());
    for attr in node.attributes() {
        el.set_attr(attr.name(), attr.value());
    }
    for child in node.children() {
        if child.is_element() {
            el.children.push(Node::Element(convert(child)));
        } else if child.is_text() {
            if let Some(text) = child.text() {
                el.children.push(Node::Text(text.to_string()));
            }
        }
    }
    el
}
