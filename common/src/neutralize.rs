//! Pre-capture rewrite of a document clone
//!
//! Form controls do not rasterize their state, so the clone handed to the
//! rasterizer replaces them with static text. The live tree is never touched:
//! [`neutralize`] takes a shared reference and returns a new tree.

use crate::dom::{Element, Node, HEADING_LEVEL_ATTR};

/// Input types whose value is shown as text
const TEXT_INPUT_TYPES: &[&str] = &[
    "text", "number", "email", "tel", "date", "search", "url", "time", "month",
];

/// Clone `root` and rewrite the clone for capture.
///
/// - text inputs → their value, or the placeholder when empty
/// - selects → the selected option label
/// - textareas → their text with whitespace preserved
/// - exclude-from-print elements → hidden
/// - tables → fixed layout with collapsed borders
/// - `data-heading-level` → heading spacing
pub fn neutralize(root: &Element) -> Element {
    let mut clone = root.clone();
    let in_cell = is_cell(&clone);
    rewrite(&mut clone, in_cell);
    clone
}

fn is_cell(el: &Element) -> bool {
    el.tag == "td" || el.tag == "th"
}

fn rewrite(el: &mut Element, in_cell: bool) {
    if el.is_print_excluded() {
        el.style.set("display", "none");
        return;
    }

    if el.tag == "table" {
        el.style.set("table-layout", "fixed");
        el.style.set("border-collapse", "collapse");
    }

    if let Some(level) = el.attr(HEADING_LEVEL_ATTR).and_then(|l| l.trim().parse::<u8>().ok()) {
        apply_heading_spacing(el, level);
    }

    for child in el.children.iter_mut() {
        let Node::Element(c) = child else { continue };
        let child_in_cell = in_cell || is_cell(c);
        if let Some(replacement) = replace_control(c, child_in_cell) {
            *child = Node::Element(replacement);
        } else {
            rewrite(c, child_in_cell);
        }
    }
}

fn replace_control(el: &Element, in_cell: bool) -> Option<Element> {
    match el.tag.as_str() {
        "input" if is_text_input(el) => {
            let text = match el.attr("value") {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => el.attr("placeholder").unwrap_or("").to_string(),
            };
            let span = static_span(el, text);
            Some(if in_cell {
                span.with_style("display", "block")
                    .with_style("text-align", "center")
                    .with_style("padding", "2px 4px")
            } else {
                span.with_style("display", "inline")
                    .with_style("text-align", "right")
                    .with_style("padding", "0 4px")
            })
        }
        "select" => Some(static_span(el, selected_label(el)).with_style("display", "inline")),
        "textarea" => {
            let text = match el.attr("value") {
                Some(v) => v.to_string(),
                None => el.text_content(),
            };
            Some(
                static_span(el, text)
                    .with_style("display", "block")
                    .with_style("white-space", "pre-wrap"),
            )
        }
        _ => None,
    }
}

fn is_text_input(el: &Element) -> bool {
    match el.attr("type") {
        None => true,
        Some(t) => TEXT_INPUT_TYPES.contains(&t.to_ascii_lowercase().as_str()),
    }
}

/// Span carrying the control's id and classes plus its text
fn static_span(control: &Element, text: String) -> Element {
    let mut span = Element::new("span");
    for name in ["id", "class"] {
        if let Some(v) = control.attr(name) {
            span.set_attr(name, v);
        }
    }
    span.style = control.style.clone();
    span.with_text(text)
}

/// Label of the option matching the select's value, else the `selected`
/// option, else the first one
fn selected_label(select: &Element) -> String {
    let options: Vec<&Element> = select.descendants().filter(|d| d.tag == "option").collect();
    let chosen = select
        .attr("value")
        .and_then(|value| {
            options
                .iter()
                .find(|o| o.attr("value").unwrap_or_default() == value)
                .copied()
        })
        .or_else(|| options.iter().find(|o| o.attrs.contains_key("selected")).copied())
        .or_else(|| options.first().copied());

    match chosen {
        Some(option) => match option.attr("label") {
            Some(label) => label.to_string(),
            None => option.text_content().trim().to_string(),
        },
        None => String::new(),
    }
}

fn apply_heading_spacing(el: &mut Element, level: u8) {
    let (top, bottom) = match level {
        1 => ("18px", "12px"),
        2 => ("14px", "8px"),
        3 => ("10px", "6px"),
        _ => return,
    };
    el.style.set("margin-top", top);
    el.style.set("margin-bottom", bottom);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Node;

    fn texts(el: &Element) -> Vec<String> {
        let mut out = Vec::new();
        for d in el.descendants() {
            for c in &d.children {
                if let Node::Text(t) = c {
                    out.push(t.clone());
                }
            }
        }
        out
    }

    #[test]
    fn test_input_value_and_placeholder() {
        let live = Element::new("form")
            .with_child(Element::new("input").with_attr("value", "X"))
            .with_child(
                Element::new("input")
                    .with_attr("type", "text")
                    .with_attr("value", "")
                    .with_attr("placeholder", "Y"),
            );
        let before = live.clone();

        let clone = neutralize(&live);
        let found = texts(&clone);
        assert!(found.contains(&"X".to_string()));
        assert!(found.contains(&"Y".to_string()));
        assert!(clone.descendants().all(|d| d.tag != "input"));

        // Live tree untouched
        assert_eq!(live, before);
    }

    #[test]
    fn test_input_alignment_depends_on_cell() {
        let live = Element::new("div")
            .with_child(Element::new("input").with_attr("id", "inline").with_attr("value", "a"))
            .with_child(
                Element::new("table").with_child(Element::new("tr").with_child(
                    Element::new("td").with_child(
                        Element::new("input").with_attr("id", "cell").with_attr("value", "b"),
                    ),
                )),
            );
        let clone = neutralize(&live);

        let inline = clone.find_by_id("inline").expect("inline span");
        assert_eq!(inline.tag, "span");
        assert_eq!(inline.style.get("text-align"), Some("right"));

        let cell = clone.find_by_id("cell").expect("cell span");
        assert_eq!(cell.style.get("text-align"), Some("center"));
        assert_eq!(cell.style.get("display"), Some("block"));
    }

    #[test]
    fn test_cell_root_centers_inputs() {
        let live = Element::new("td").with_child(Element::new("input").with_attr("id", "grade").with_attr("value", "14"));
        let clone = neutralize(&live);

        let span = clone.find_by_id("grade").expect("grade span");
        assert_eq!(span.style.get("text-align"), Some("center"));
        assert_eq!(live.children[0].as_element().map(|e| e.tag.as_str()), Some("input"));
    }

    #[test]
    fn test_checkbox_left_alone() {
        let live = Element::new("div").with_child(Element::new("input").with_attr("type", "checkbox"));
        let clone = neutralize(&live);
        assert!(clone.descendants().any(|d| d.tag == "input"));
    }

    #[test]
    fn test_select_label() {
        let select = Element::new("select")
            .with_child(Element::new("option").with_attr("value", "1").with_text("الفصل الأول"))
            .with_child(
                Element::new("option")
                    .with_attr("value", "2")
                    .with_attr("selected", "")
                    .with_text("الفصل الثاني"),
            );
        let clone = neutralize(&Element::new("div").with_child(select.clone()));
        assert_eq!(clone.text_content(), "الفصل الثاني");

        let by_value = select.with_attr("value", "1");
        let clone = neutralize(&Element::new("div").with_child(by_value));
        assert_eq!(clone.text_content(), "الفصل الأول");

        let empty = neutralize(&Element::new("div").with_child(Element::new("select")));
        assert_eq!(empty.text_content(), "");
    }

    #[test]
    fn test_textarea_keeps_newlines() {
        let live = Element::new("div")
            .with_child(Element::new("textarea").with_text("سطر أول\nسطر ثان"));
        let clone = neutralize(&live);
        let span = clone.child_elements().next().expect("span");
        assert_eq!(span.text_content(), "سطر أول\nسطر ثان");
        assert_eq!(span.style.get("white-space"), Some("pre-wrap"));
    }

    #[test]
    fn test_print_excluded_hidden_in_clone_only() {
        let live = Element::new("div")
            .with_child(Element::new("button").with_class("no-print").with_text("حفظ"))
            .with_child(Element::new("div").with_attr("data-print-exclude", "").with_text("x"));
        let clone = neutralize(&live);
        assert!(clone.child_elements().all(|c| c.is_display_none()));
        assert!(live.child_elements().all(|c| !c.is_display_none()));
    }

    #[test]
    fn test_tables_and_headings() {
        let live = Element::new("div")
            .with_child(Element::new("table"))
            .with_child(Element::new("h2").with_attr("data-heading-level", "2").with_text("1. الأهداف"));
        let clone = neutralize(&live);
        let mut children = clone.child_elements();
        let table = children.next().expect("table");
        assert_eq!(table.style.get("table-layout"), Some("fixed"));
        assert_eq!(table.style.get("border-collapse"), Some("collapse"));
        let heading = children.next().expect("heading");
        assert_eq!(heading.style.get("margin-top"), Some("14px"));
    }
}
