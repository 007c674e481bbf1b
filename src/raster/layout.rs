//! Block layout of a document tree into a display list
//!
//! Coordinates are CSS pixels with the origin at the top left of the captured
//! element. The model is deliberately small: block flow, wrapped inline text,
//! fixed-layout tables, images and chart canvases.

use super::text::TextShaper;
use crate::assets::AssetStore;
use crate::error::Result;
use image::RgbaImage;
use irshad_common::dom::{Element, Node, OFFSCREEN_CLASS};
use irshad_common::export::chart::{BarChart, CHART_ATTR};
use std::sync::Arc;

pub type Rgba = [u8; 4];

const BLACK: Rgba = [17, 17, 17, 255];
const CELL_BORDER: Rgba = [68, 68, 68, 255];
const HEADER_CELL_BG: Rgba = [229, 231, 235, 255];

/// Base font size (px)
const BASE_FONT_PX: f32 = 14.0;
const LINE_HEIGHT: f32 = 1.5;

/// Tags laid out inline unless styled otherwise
const INLINE_TAGS: &[&str] = &[
    "span", "strong", "b", "em", "i", "u", "label", "a", "small", "sub", "sup", "code", "br",
];

/// Default chart canvas size (px)
const CHART_WIDTH_PX: f32 = 760.0;
const CHART_HEIGHT_PX: f32 = 300.0;
const CHART_TITLE_PX: f32 = 16.0;

#[derive(Debug, Clone)]
pub enum DisplayItem {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgba,
    },
    Border {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgba,
        line_width: f32,
    },
    Text {
        x: f32,
        baseline: f32,
        size: f32,
        color: Rgba,
        bold: bool,
        text: String,
    },
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        image: Arc<RgbaImage>,
    },
    Chart {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        chart: BarChart,
        rtl: bool,
    },
}

#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    pub width: f32,
    pub height: f32,
    pub items: Vec<DisplayItem>,
}

impl DisplayList {
    /// Text of every text item, in paint order
    pub fn texts(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(|item| match item {
                DisplayItem::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Start,
    Left,
    Right,
    Center,
}

/// Inherited text properties
#[derive(Debug, Clone)]
struct TextStyle {
    size: f32,
    bold: bool,
    color: Rgba,
    align: Align,
    rtl: bool,
    pre_wrap: bool,
}

impl TextStyle {
    fn root() -> Self {
        Self {
            size: BASE_FONT_PX,
            bold: false,
            color: BLACK,
            align: Align::Start,
            rtl: true,
            pre_wrap: false,
        }
    }

    fn inherit(&self, el: &Element) -> Self {
        let mut style = self.clone();

        style.size = match el.tag.as_str() {
            "h1" => 24.0,
            "h2" => 20.0,
            "h3" => 17.0,
            "h4" => 15.0,
            "small" => self.size * 0.85,
            _ => self.size,
        };
        if let Some(size) = el.style.get("font-size").and_then(|v| parse_length(v, self.size, self.size)) {
            style.size = size;
        }

        if matches!(el.tag.as_str(), "b" | "strong" | "th" | "h1" | "h2" | "h3" | "h4") {
            style.bold = true;
        }
        if let Some(weight) = el.style.get("font-weight") {
            style.bold = match weight {
                "bold" | "bolder" => true,
                "normal" | "lighter" => false,
                w => w.parse::<u32>().map(|n| n >= 600).unwrap_or(style.bold),
            };
        }

        if let Some(color) = el.style.get("color").and_then(parse_color) {
            style.color = color;
        }

        if matches!(el.tag.as_str(), "td" | "th") {
            style.align = Align::Center;
        }
        if let Some(align) = el.style.get("text-align") {
            style.align = match align {
                "left" => Align::Left,
                "right" => Align::Right,
                "center" => Align::Center,
                _ => Align::Start,
            };
        }

        let dir = el.attr("dir").or_else(|| el.style.get("direction"));
        match dir {
            Some("rtl") => style.rtl = true,
            Some("ltr") => style.rtl = false,
            _ => {}
        }

        if let Some(ws) = el.style.get("white-space") {
            style.pre_wrap = matches!(ws, "pre" | "pre-wrap" | "pre-line" | "break-spaces");
        }
        style
    }

    fn resolved_align(&self) -> Align {
        match self.align {
            Align::Start if self.rtl => Align::Right,
            Align::Start => Align::Left,
            other => other,
        }
    }
}

/// Lay out `root` at `viewport_width` CSS pixels
pub fn layout(
    root: &Element,
    viewport_width: f32,
    shaper: &TextShaper<'_>,
    assets: &AssetStore,
) -> Result<DisplayList> {
    let mut engine = LayoutEngine {
        shaper,
        assets,
        items: Vec::new(),
    };
    let height = engine.block(root, 0.0, 0.0, viewport_width, &TextStyle::root(), true, true)?;
    Ok(DisplayList {
        width: viewport_width,
        height,
        items: engine.items,
    })
}

// ============================================
// Engine
// ============================================

enum InlinePiece {
    Text(String, TextStyle),
    Break,
}

struct Word {
    text: String,
    style: TextStyle,
    width: f32,
}

struct LayoutEngine<'a, 's> {
    shaper: &'a TextShaper<'s>,
    assets: &'a AssetStore,
    items: Vec<DisplayItem>,
}

impl LayoutEngine<'_, '_> {
    /// Lay out one block box; returns its outer height including margins
    #[allow(clippy::too_many_arguments)]
    fn block(
        &mut self,
        el: &Element,
        x: f32,
        y: f32,
        width: f32,
        parent: &TextStyle,
        is_root: bool,
        decorate: bool,
    ) -> Result<f32> {
        if el.is_display_none() || (!is_root && el.has_class(OFFSCREEN_CLASS)) {
            return Ok(0.0);
        }

        let style = parent.inherit(el);
        let (margin_top, margin_bottom) = margins(el, &style);
        let [pad_top, pad_right, pad_bottom, pad_left] = padding(el, &style);

        let box_width = el
            .style
            .get("width")
            .and_then(|v| parse_length(v, style.size, width))
            .map(|w| w.min(width))
            .unwrap_or(width);
        let box_x = if box_width < width && parent.rtl {
            x + width - box_width
        } else {
            x
        };
        let content_x = box_x + pad_left;
        let content_width = (box_width - pad_left - pad_right).max(0.0);

        let decor_index = self.items.len();
        let top = y + margin_top;
        let content_top = top + pad_top;

        let mut content_height = match el.tag.as_str() {
            "table" => self.table(el, content_x, content_top, content_width, &style)?,
            "img" => self.image(el, content_x, content_top, content_width, parent)?,
            "canvas" if el.attr(CHART_ATTR).is_some() => {
                self.chart(el, content_x, content_top, content_width, &style)?
            }
            "hr" => {
                self.items.push(DisplayItem::Rect {
                    x: content_x,
                    y: content_top + 4.0,
                    width: content_width,
                    height: 1.0,
                    color: [160, 160, 160, 255],
                });
                9.0
            }
            _ => self.flow(&el.children, content_x, content_top, content_width, &style)?,
        };
        for prop in ["height", "min-height"] {
            if let Some(min) = el.style.get(prop).and_then(|v| parse_length(v, style.size, 0.0)) {
                content_height = content_height.max(min);
            }
        }

        let box_height = pad_top + content_height + pad_bottom;
        if decorate {
            if let Some(color) = background(el) {
                self.items.insert(
                    decor_index,
                    DisplayItem::Rect {
                        x: box_x,
                        y: top,
                        width: box_width,
                        height: box_height,
                        color,
                    },
                );
            }
            if let Some((line_width, color)) = el.style.get("border").and_then(|b| parse_border(b, style.size)) {
                self.items.push(DisplayItem::Border {
                    x: box_x,
                    y: top,
                    width: box_width,
                    height: box_height,
                    color,
                    line_width,
                });
            }
        }

        Ok(margin_top + box_height + margin_bottom)
    }

    /// Children in normal flow; returns the content height
    fn flow(&mut self, children: &[Node], x: f32, y: f32, width: f32, style: &TextStyle) -> Result<f32> {
        let mut cursor = y;
        let mut pending: Vec<InlinePiece> = Vec::new();

        for child in children {
            match child {
                Node::Text(text) => pending.push(InlinePiece::Text(text.clone(), style.clone())),
                Node::Element(el) if el.is_display_none() => {}
                Node::Element(el) if is_inline(el) => collect_inline(el, style, &mut pending),
                Node::Element(el) => {
                    cursor += self.paragraph(&pending, x, cursor, width, style);
                    pending.clear();
                    cursor += self.block(el, x, cursor, width, style, false, true)?;
                }
            }
        }
        cursor += self.paragraph(&pending, x, cursor, width, style);
        Ok(cursor - y)
    }

    /// Wrap inline pieces into lines; returns the height used
    fn paragraph(&mut self, pieces: &[InlinePiece], x: f32, y: f32, width: f32, block: &TextStyle) -> f32 {
        let mut lines: Vec<Vec<Word>> = vec![Vec::new()];
        let mut line_width = 0.0f32;
        let mut has_text = false;

        for piece in pieces {
            match piece {
                InlinePiece::Break => {
                    lines.push(Vec::new());
                    line_width = 0.0;
                }
                InlinePiece::Text(text, style) => {
                    let segments: Vec<&str> = if style.pre_wrap {
                        text.split('\n').collect()
                    } else {
                        vec![text.as_str()]
                    };
                    for (i, segment) in segments.iter().enumerate() {
                        if i > 0 {
                            lines.push(Vec::new());
                            line_width = 0.0;
                            has_text = true;
                        }
                        for word in segment.split_whitespace() {
                            has_text = true;
                            let word_width = self.shaper.measure(word, style.size);
                            let space = self.space_width(style.size);
                            let line_is_empty = lines.last().map(Vec::is_empty).unwrap_or(true);
                            let needed = if line_is_empty { word_width } else { space + word_width };
                            if !line_is_empty && line_width + needed > width {
                                lines.push(Vec::new());
                                line_width = word_width;
                            } else {
                                line_width += needed;
                            }
                            if let Some(line) = lines.last_mut() {
                                line.push(Word {
                                    text: word.to_string(),
                                    style: style.clone(),
                                    width: word_width,
                                });
                            }
                        }
                    }
                }
            }
        }

        if !has_text {
            return 0.0;
        }
        while lines.last().map(Vec::is_empty).unwrap_or(false) {
            lines.pop();
        }

        let align = block.resolved_align();
        let mut cursor = y;
        for line in &lines {
            let size = line.iter().map(|w| w.style.size).fold(block.size, f32::max);
            let line_height = size * LINE_HEIGHT;
            let baseline = cursor + (line_height - size) / 2.0 + size * 0.8;

            let gaps: f32 = line
                .iter()
                .skip(1)
                .map(|w| self.space_width(w.style.size))
                .sum();
            let total: f32 = line.iter().map(|w| w.width).sum::<f32>() + gaps;
            let start = match align {
                Align::Right => x + width - total,
                Align::Center => x + (width - total) / 2.0,
                _ => x,
            };

            let mut pen = 0.0f32;
            for (i, word) in line.iter().enumerate() {
                if i > 0 {
                    pen += self.space_width(word.style.size);
                }
                let word_x = if block.rtl {
                    start + total - pen - word.width
                } else {
                    start + pen
                };
                pen += word.width;
                self.items.push(DisplayItem::Text {
                    x: word_x,
                    baseline,
                    size: word.style.size,
                    color: word.style.color,
                    bold: word.style.bold,
                    text: word.text.clone(),
                });
            }
            cursor += line_height;
        }
        cursor - y
    }

    fn space_width(&self, size: f32) -> f32 {
        self.shaper.measure(" ", size).max(size * 0.25)
    }

    /// Fixed layout: equal column widths, first column on the right under RTL
    fn table(&mut self, table: &Element, x: f32, y: f32, width: f32, style: &TextStyle) -> Result<f32> {
        let rows: Vec<&Element> = table_rows(table);
        let columns = rows
            .iter()
            .map(|row| row_cells(row).map(colspan).sum::<usize>())
            .max()
            .unwrap_or(0);
        if columns == 0 {
            return Ok(0.0);
        }
        let column_width = width / columns as f32;

        let mut cursor = y;
        for row in rows {
            let row_style = style.inherit(row);
            let mut cells = Vec::new();
            let mut column = 0usize;
            let mut row_height = 0.0f32;

            for cell in row_cells(row) {
                if column >= columns {
                    break;
                }
                let span = colspan(cell).min(columns - column);
                let cell_width = column_width * span as f32;
                let cell_x = if row_style.rtl {
                    x + width - column_width * (column + span) as f32
                } else {
                    x + column_width * column as f32
                };

                let index = self.items.len();
                let height = self.block(cell, cell_x, cursor, cell_width, &row_style, false, false)?;
                row_height = row_height.max(height);
                cells.push((cell, cell_x, cell_width, index));
                column += span;
            }
            if let Some(min) = row.style.get("height").and_then(|v| parse_length(v, row_style.size, 0.0)) {
                row_height = row_height.max(min);
            }

            for (cell, cell_x, cell_width, index) in cells.iter().rev() {
                let fill = background(cell)
                    .or_else(|| background(row))
                    .or_else(|| (cell.tag == "th").then_some(HEADER_CELL_BG));
                if let Some(color) = fill {
                    self.items.insert(
                        *index,
                        DisplayItem::Rect {
                            x: *cell_x,
                            y: cursor,
                            width: *cell_width,
                            height: row_height,
                            color,
                        },
                    );
                }
            }
            for (cell, cell_x, cell_width, _) in &cells {
                let (line_width, color) = cell
                    .style
                    .get("border")
                    .and_then(|b| parse_border(b, row_style.size))
                    .unwrap_or((1.0, CELL_BORDER));
                self.items.push(DisplayItem::Border {
                    x: *cell_x,
                    y: cursor,
                    width: *cell_width,
                    height: row_height,
                    color,
                    line_width,
                });
            }
            cursor += row_height;
        }
        Ok(cursor - y)
    }

    fn image(&mut self, el: &Element, x: f32, y: f32, width: f32, parent: &TextStyle) -> Result<f32> {
        let Some(src) = el.attr("src").filter(|s| !s.trim().is_empty()) else {
            return Ok(0.0);
        };
        let image = self.assets.load(src)?;
        let (natural_w, natural_h) = (image.width() as f32, image.height() as f32);
        if natural_w == 0.0 || natural_h == 0.0 {
            return Ok(0.0);
        }

        let requested_w = el
            .attr("width")
            .and_then(|v| parse_length(v, parent.size, width))
            .or_else(|| el.style.get("width").and_then(|v| parse_length(v, parent.size, width)));
        let requested_h = el
            .attr("height")
            .and_then(|v| parse_length(v, parent.size, 0.0))
            .or_else(|| el.style.get("height").and_then(|v| parse_length(v, parent.size, 0.0)));

        let (mut w, mut h) = match (requested_w, requested_h) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => (w, w * natural_h / natural_w),
            (None, Some(h)) => (h * natural_w / natural_h, h),
            (None, None) => (natural_w, natural_h),
        };
        if w > width {
            h *= width / w;
            w = width;
        }

        let image_x = match parent.resolved_align() {
            Align::Right => x + width - w,
            Align::Center => x + (width - w) / 2.0,
            _ => x,
        };
        self.items.push(DisplayItem::Image {
            x: image_x,
            y,
            width: w,
            height: h,
            image: Arc::new(image),
        });
        Ok(h)
    }

    /// Title line plus the bar chart box
    fn chart(&mut self, el: &Element, x: f32, y: f32, width: f32, style: &TextStyle) -> Result<f32> {
        let chart = BarChart::from_element(el)?;
        let requested_w = el
            .attr("width")
            .and_then(|v| parse_length(v, style.size, width))
            .unwrap_or(CHART_WIDTH_PX);
        let requested_h = el
            .attr("height")
            .and_then(|v| parse_length(v, style.size, 0.0))
            .unwrap_or(CHART_HEIGHT_PX);
        let scale = if requested_w > width { width / requested_w } else { 1.0 };
        let (w, h) = (requested_w * scale, requested_h * scale);
        let chart_x = x + (width - w) / 2.0;

        let mut cursor = y;
        if !chart.title.is_empty() {
            let title_width = self.shaper.measure(&chart.title, CHART_TITLE_PX);
            let line_height = CHART_TITLE_PX * LINE_HEIGHT;
            self.items.push(DisplayItem::Text {
                x: x + (width - title_width) / 2.0,
                baseline: cursor + (line_height - CHART_TITLE_PX) / 2.0 + CHART_TITLE_PX * 0.8,
                size: CHART_TITLE_PX,
                color: BLACK,
                bold: true,
                text: chart.title.clone(),
            });
            cursor += line_height;
        }

        self.items.push(DisplayItem::Chart {
            x: chart_x,
            y: cursor,
            width: w,
            height: h,
            chart,
            rtl: style.rtl,
        });
        Ok(cursor + h - y)
    }
}

// ============================================
// Tree helpers
// ============================================

fn is_inline(el: &Element) -> bool {
    let inline = match el.style.get("display") {
        Some("inline") | Some("inline-block") => true,
        Some(_) => false,
        None => INLINE_TAGS.contains(&el.tag.as_str()),
    };
    inline
        && !el
            .descendants()
            .any(|d| matches!(d.tag.as_str(), "img" | "canvas" | "table"))
}

fn collect_inline(el: &Element, parent: &TextStyle, out: &mut Vec<InlinePiece>) {
    if el.is_display_none() {
        return;
    }
    if el.tag == "br" {
        out.push(InlinePiece::Break);
        return;
    }
    let style = parent.inherit(el);
    for child in &el.children {
        match child {
            Node::Text(text) => out.push(InlinePiece::Text(text.clone(), style.clone())),
            Node::Element(c) => collect_inline(c, &style, out),
        }
    }
}

fn table_rows(table: &Element) -> Vec<&Element> {
    let mut rows = Vec::new();
    for child in table.child_elements() {
        match child.tag.as_str() {
            "tr" if !child.is_display_none() => rows.push(child),
            "thead" | "tbody" | "tfoot" if !child.is_display_none() => {
                rows.extend(child.child_elements().filter(|r| r.tag == "tr" && !r.is_display_none()));
            }
            _ => {}
        }
    }
    rows
}

fn row_cells(row: &Element) -> impl Iterator<Item = &Element> {
    row.child_elements()
        .filter(|c| matches!(c.tag.as_str(), "td" | "th") && !c.is_display_none())
}

fn colspan(cell: &Element) -> usize {
    cell.attr("colspan")
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .max(1)
}

fn margins(el: &Element, style: &TextStyle) -> (f32, f32) {
    let (mut top, mut bottom) = match el.tag.as_str() {
        "h1" => (16.0, 12.0),
        "h2" => (14.0, 8.0),
        "h3" => (10.0, 6.0),
        "h4" => (8.0, 4.0),
        "p" => (6.0, 6.0),
        "table" => (8.0, 8.0),
        _ => (0.0, 0.0),
    };
    if let Some(shorthand) = el.style.get("margin") {
        let [t, _, b, _] = parse_box(shorthand, style.size);
        top = t;
        bottom = b;
    }
    if let Some(v) = el.style.get("margin-top").and_then(|v| parse_length(v, style.size, 0.0)) {
        top = v;
    }
    if let Some(v) = el.style.get("margin-bottom").and_then(|v| parse_length(v, style.size, 0.0)) {
        bottom = v;
    }
    (top, bottom)
}

fn padding(el: &Element, style: &TextStyle) -> [f32; 4] {
    let mut pad = match el.tag.as_str() {
        "td" | "th" => [4.0, 6.0, 4.0, 6.0],
        _ => [0.0; 4],
    };
    if let Some(shorthand) = el.style.get("padding") {
        pad = parse_box(shorthand, style.size);
    }
    for (i, side) in ["padding-top", "padding-right", "padding-bottom", "padding-left"].iter().enumerate() {
        if let Some(v) = el.style.get(side).and_then(|v| parse_length(v, style.size, 0.0)) {
            pad[i] = v;
        }
    }
    pad
}

fn background(el: &Element) -> Option<Rgba> {
    el.style
        .get("background-color")
        .or_else(|| el.style.get("background"))
        .and_then(parse_color)
        .filter(|c| c[3] > 0)
}

// ============================================
// CSS value parsing
// ============================================

/// Length in px; `%` is taken of `reference`
pub fn parse_length(value: &str, font_size: f32, reference: f32) -> Option<f32> {
    let value = value.trim().to_ascii_lowercase();
    let number = |suffix: &str| value.strip_suffix(suffix).and_then(|n| n.trim().parse::<f32>().ok());

    if let Some(n) = number("px") {
        Some(n)
    } else if let Some(n) = number("pt") {
        Some(n * 96.0 / 72.0)
    } else if let Some(n) = number("rem") {
        Some(n * BASE_FONT_PX)
    } else if let Some(n) = number("em") {
        Some(n * font_size)
    } else if let Some(n) = number("mm") {
        Some(n * 96.0 / 25.4)
    } else if let Some(n) = number("%") {
        Some(n / 100.0 * reference)
    } else {
        value.parse::<f32>().ok()
    }
}

/// CSS box shorthand (1 to 4 values) → [top, right, bottom, left]
fn parse_box(value: &str, font_size: f32) -> [f32; 4] {
    let parts: Vec<f32> = value
        .split_whitespace()
        .map(|p| parse_length(p, font_size, 0.0).unwrap_or(0.0))
        .collect();
    match parts.as_slice() {
        [a] => [*a; 4],
        [v, h] => [*v, *h, *v, *h],
        [t, h, b] => [*t, *h, *b, *h],
        [t, r, b, l, ..] => [*t, *r, *b, *l],
        [] => [0.0; 4],
    }
}

/// `1px solid #333` → (1.0, colour)
fn parse_border(value: &str, font_size: f32) -> Option<(f32, Rgba)> {
    if value.trim() == "none" || value.trim() == "0" {
        return None;
    }
    let mut width = 1.0;
    let mut color = BLACK;
    for part in value.split_whitespace() {
        if let Some(w) = parse_length(part, font_size, 0.0) {
            width = w;
        } else if let Some(c) = parse_color(part) {
            color = c;
        }
    }
    (width > 0.0).then_some((width, color))
}

pub fn parse_color(value: &str) -> Option<Rgba> {
    let value = value.trim().to_ascii_lowercase();
    if let Some(hex) = value.strip_prefix('#') {
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        return match hex.len() {
            3 => {
                let mut out = [255u8; 4];
                for (i, c) in hex.chars().enumerate() {
                    let v = c.to_digit(16)? as u8;
                    out[i] = v * 17;
                }
                Some(out)
            }
            6 => Some([channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?, 255]),
            _ => None,
        };
    }
    if let Some(args) = value
        .strip_prefix("rgba(")
        .or_else(|| value.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        if parts.len() < 3 {
            return None;
        }
        let r = parts[0].parse::<f32>().ok()?.clamp(0.0, 255.0) as u8;
        let g = parts[1].parse::<f32>().ok()?.clamp(0.0, 255.0) as u8;
        let b = parts[2].parse::<f32>().ok()?.clamp(0.0, 255.0) as u8;
        let a = match parts.get(3) {
            Some(a) => (a.parse::<f32>().ok()?.clamp(0.0, 1.0) * 255.0) as u8,
            None => 255,
        };
        return Some([r, g, b, a]);
    }
    match value.as_str() {
        "black" => Some([0, 0, 0, 255]),
        "white" => Some([255, 255, 255, 255]),
        "red" => Some([220, 38, 38, 255]),
        "green" => Some([22, 163, 74, 255]),
        "blue" => Some([37, 99, 235, 255]),
        "gray" | "grey" => Some([128, 128, 128, 255]),
        "transparent" => Some([0, 0, 0, 0]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IrshadError;
    use crate::fonts::FontHandle;

    fn run(root: &Element, width: f32) -> Result<DisplayList> {
        let font = FontHandle::fallback();
        let shaper = TextShaper::new(&font);
        layout(root, width, &shaper, &AssetStore::default())
    }

    fn text_positions(list: &DisplayList) -> Vec<(String, f32, f32)> {
        list.items
            .iter()
            .filter_map(|item| match item {
                DisplayItem::Text { text, x, baseline, .. } => Some((text.clone(), *x, *baseline)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_rtl_words_run_right_to_left() {
        let root = Element::new("div").with_child(Element::new("p").with_text("أول ثاني"));
        let list = run(&root, 400.0).expect("layout");
        let words = text_positions(&list);
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].0, "أول");
        assert!(words[0].1 > words[1].1, "first word should sit to the right");
        // right aligned: first word ends at the right edge (3 chars * 7px)
        assert!((words[0].1 + 21.0 - 400.0).abs() < 1e-3);
    }

    #[test]
    fn test_ltr_block() {
        let root = Element::new("div")
            .with_attr("dir", "ltr")
            .with_child(Element::new("p").with_text("one two"));
        let words = text_positions(&run(&root, 400.0).expect("layout"));
        assert_eq!(words[0].1, 0.0);
        assert!(words[1].1 > words[0].1);
    }

    #[test]
    fn test_wrapping_adds_lines() {
        let text = "كلمة ".repeat(40);
        let root = Element::new("div").with_child(Element::new("p").with_text(text));
        let list = run(&root, 200.0).expect("layout");
        let words = text_positions(&list);
        let first_baseline = words[0].2;
        let last_baseline = words[words.len() - 1].2;
        assert!(last_baseline > first_baseline);
        assert!(list.height > BASE_FONT_PX * LINE_HEIGHT * 2.0);
    }

    #[test]
    fn test_hidden_and_offscreen_skipped() {
        let root = Element::new("div")
            .with_child(Element::new("p").with_style("display", "none").with_text("مخفي"))
            .with_child(Element::new("div").with_class("offscreen").with_text("خارج"))
            .with_child(Element::new("p").with_text("ظاهر"));
        let list = run(&root, 400.0).expect("layout");
        assert_eq!(list.texts(), vec!["ظاهر"]);

        let region = Element::new("div").with_class("offscreen").with_text("خارج");
        let list = run(&region, 400.0).expect("layout");
        assert_eq!(list.texts(), vec!["خارج"]);
    }

    #[test]
    fn test_table_columns_mirrored() {
        let table = Element::new("table").with_child(
            Element::new("tr")
                .with_child(Element::new("th").with_text("أ"))
                .with_child(Element::new("th").with_text("ب")),
        );
        let root = Element::new("div").with_child(table);
        let list = run(&root, 400.0).expect("layout");

        let borders: Vec<f32> = list
            .items
            .iter()
            .filter_map(|i| match i {
                DisplayItem::Border { x, width, .. } => Some(*x + *width),
                _ => None,
            })
            .collect();
        assert_eq!(borders.len(), 2);
        // first column ends at the right edge
        assert!((borders[0] - 400.0).abs() < 1e-3);
        assert!((borders[1] - 200.0).abs() < 1e-3);

        let words = text_positions(&list);
        assert!(words[0].1 > words[1].1);
        // header cells get their fill first
        assert!(matches!(list.items[0], DisplayItem::Rect { .. }));
    }

    #[test]
    fn test_missing_image_aborts() {
        let root = Element::new("div").with_child(Element::new("img").with_attr("src", "/nonexistent.png"));
        assert!(matches!(run(&root, 400.0), Err(IrshadError::Asset(_))));
    }

    #[test]
    fn test_chart_canvas() {
        let chart = BarChart::new("معدلات", vec!["أ".into()], vec![12.0]).expect("chart");
        let root = Element::new("div").with_child(chart.to_element(760, 300));
        let list = run(&root, 794.0).expect("layout");
        assert!(list
            .items
            .iter()
            .any(|i| matches!(i, DisplayItem::Chart { height, .. } if *height == 300.0)));
        assert_eq!(list.texts(), vec!["معدلات"]);
    }

    #[test]
    fn test_parse_values() {
        assert_eq!(parse_length("12px", 14.0, 0.0), Some(12.0));
        assert_eq!(parse_length("50%", 14.0, 300.0), Some(150.0));
        assert_eq!(parse_length("2em", 10.0, 0.0), Some(20.0));
        assert_eq!(parse_length("auto", 10.0, 0.0), None);
        assert_eq!(parse_color("#fff"), Some([255, 255, 255, 255]));
        assert_eq!(parse_color("#1e40af"), Some([30, 64, 175, 255]));
        assert_eq!(parse_color("rgba(59, 130, 246, 0.5)"), Some([59, 130, 246, 127]));
        assert_eq!(parse_box("2px 4px", 14.0), [2.0, 4.0, 2.0, 4.0]);
        assert_eq!(parse_border("1px solid #000", 14.0), Some((1.0, [0, 0, 0, 255])));
    }
}
