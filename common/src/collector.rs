//! Page collection
//!
//! Finds the elements marked as output pages, in document order, and drops
//! the blank ones (no visible text, no media, no table).

use crate::dom::{Element, Node, MEDIA_TAGS, PAGE_CLASS};

/// Marked page sections worth rendering, in document order.
///
/// Pages are not nested: once a page is found its subtree is not searched for
/// further markers. An empty result means the caller must capture the whole
/// container instead.
pub fn collect_pages(root: &Element) -> Vec<&Element> {
    let mut pages = Vec::new();
    find_pages(root, &mut pages);
    pages.retain(|page| is_renderable(page));
    pages
}

fn find_pages<'a>(el: &'a Element, out: &mut Vec<&'a Element>) {
    if el.has_class(PAGE_CLASS) {
        out.push(el);
        return;
    }
    for child in el.child_elements() {
        find_pages(child, out);
    }
}

/// A page is kept if it shows text, media or a table
pub fn is_renderable(page: &Element) -> bool {
    visible_text_length(page) > 0 || has_media(page) || has_table(page)
}

/// Characters of non-whitespace text outside `display: none` subtrees
pub fn visible_text_length(el: &Element) -> usize {
    if el.is_display_none() {
        return 0;
    }
    el.children
        .iter()
        .map(|child| match child {
            Node::Text(t) => t.trim().chars().count(),
            Node::Element(c) => visible_text_length(c),
        })
        .sum()
}

pub fn has_media(el: &Element) -> bool {
    el.descendants().any(|d| MEDIA_TAGS.contains(&d.tag.as_str()))
}

pub fn has_table(el: &Element) -> bool {
    el.descendants().any(|d| d.tag == "table")
}
