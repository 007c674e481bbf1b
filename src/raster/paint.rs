//! Display list → pixels (tiny-skia)

use super::layout::{DisplayItem, DisplayList, Rgba};
use super::text::TextShaper;
use super::CapturedBitmap;
use crate::error::{IrshadError, Result};
use image::RgbaImage;
use irshad_common::export::chart::{layout_bars, BarChart, ChartFrame};
use rustybuzz::ttf_parser::{GlyphId, OutlineBuilder};
use tiny_skia::{
    Color, FillRule, FilterQuality, IntSize, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Rect,
    Stroke, Transform,
};

const CHART_FRAME: Rgba = [209, 213, 219, 255];
const CHART_TEXT: Rgba = [55, 65, 81, 255];
const CHART_LABEL_PX: f32 = 11.0;
const CHART_GUTTER_PX: f32 = 44.0;

/// Paint `list` at `scale` device pixels per CSS pixel on opaque white
pub fn paint(list: &DisplayList, scale: f32, shaper: &TextShaper<'_>) -> Result<CapturedBitmap> {
    let width = (list.width * scale).ceil().max(0.0) as u32;
    let height = (list.height * scale).ceil().max(0.0) as u32;
    if width == 0 || height == 0 {
        return Ok(CapturedBitmap::new(width, 0, Vec::new()));
    }

    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| IrshadError::Capture(format!("canvas {}x{} unavailable", width, height)))?;
    pixmap.fill(Color::WHITE);
    let transform = Transform::from_scale(scale, scale);

    for item in &list.items {
        match item {
            DisplayItem::Rect {
                x,
                y,
                width,
                height,
                color,
            } => fill_rect(&mut pixmap, *x, *y, *width, *height, *color, transform),
            DisplayItem::Border {
                x,
                y,
                width,
                height,
                color,
                line_width,
            } => stroke_rect(&mut pixmap, *x, *y, *width, *height, *color, *line_width, transform),
            DisplayItem::Text {
                x,
                baseline,
                size,
                color,
                bold,
                text,
            } => draw_text(&mut pixmap, shaper, text, *x, *baseline, *size, *color, *bold, transform),
            DisplayItem::Image {
                x,
                y,
                width,
                height,
                image,
            } => draw_image(&mut pixmap, image, *x, *y, *width, *height, transform)?,
            DisplayItem::Chart {
                x,
                y,
                width,
                height,
                chart,
                rtl,
            } => {
                let frame = ChartFrame {
                    x: *x,
                    y: *y,
                    width: *width,
                    height: *height,
                    label_gutter: CHART_GUTTER_PX,
                };
                draw_chart(&mut pixmap, shaper, chart, &frame, *rtl, transform);
            }
        }
    }

    Ok(CapturedBitmap::from_pixmap(&pixmap))
}

fn paint_for(color: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color[0], color[1], color[2], color[3]);
    paint.anti_alias = true;
    paint
}

#[allow(clippy::too_many_arguments)]
fn fill_rect(pixmap: &mut Pixmap, x: f32, y: f32, w: f32, h: f32, color: Rgba, transform: Transform) {
    if let Some(rect) = Rect::from_xywh(x, y, w, h) {
        pixmap.fill_rect(rect, &paint_for(color), transform, None);
    }
}

#[allow(clippy::too_many_arguments)]
fn stroke_rect(
    pixmap: &mut Pixmap,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    color: Rgba,
    line_width: f32,
    transform: Transform,
) {
    let Some(rect) = Rect::from_xywh(x, y, w, h) else {
        return;
    };
    let path = PathBuilder::from_rect(rect);
    let stroke = Stroke {
        width: line_width,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &paint_for(color), &stroke, transform, None);
}

/// Text starting at `x` (left edge of the run) on `baseline`.
///
/// Without a font each run becomes a light bar of its fallback width.
#[allow(clippy::too_many_arguments)]
fn draw_text(
    pixmap: &mut Pixmap,
    shaper: &TextShaper<'_>,
    text: &str,
    x: f32,
    baseline: f32,
    size: f32,
    color: Rgba,
    bold: bool,
    transform: Transform,
) {
    let Some(face) = shaper.face() else {
        let width = shaper.measure(text, size);
        let faded = [color[0], color[1], color[2], 90];
        fill_rect(pixmap, x, baseline - size * 0.55, width, size * 0.5, faded, transform);
        return;
    };

    let run = shaper.shape(text, size);
    let scale = size / face.units_per_em().max(1) as f32;
    let paint = paint_for(color);
    let stroke = Stroke {
        width: size * 0.04,
        ..Stroke::default()
    };

    for glyph in &run.glyphs {
        let mut builder = GlyphPathBuilder::new(x + glyph.x, baseline - glyph.y, scale);
        if face.outline_glyph(GlyphId(glyph.id), &mut builder).is_none() {
            continue;
        }
        let Some(path) = builder.finish() else {
            continue;
        };
        pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
        if bold {
            pixmap.stroke_path(&path, &paint, &stroke, transform, None);
        }
    }
}

fn draw_text_centered(
    pixmap: &mut Pixmap,
    shaper: &TextShaper<'_>,
    text: &str,
    center_x: f32,
    baseline: f32,
    transform: Transform,
) {
    let width = shaper.measure(text, CHART_LABEL_PX);
    draw_text(
        pixmap,
        shaper,
        text,
        center_x - width / 2.0,
        baseline,
        CHART_LABEL_PX,
        CHART_TEXT,
        false,
        transform,
    );
}

fn draw_image(
    pixmap: &mut Pixmap,
    image: &RgbaImage,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    transform: Transform,
) -> Result<()> {
    let (iw, ih) = image.dimensions();
    let size = IntSize::from_wh(iw, ih)
        .ok_or_else(|| IrshadError::Capture("empty image".to_string()))?;

    // tiny-skia wants premultiplied RGBA
    let mut data = image.as_raw().clone();
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        for c in &mut px[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
    let source = Pixmap::from_vec(data, size)
        .ok_or_else(|| IrshadError::Capture("image buffer size mismatch".to_string()))?;

    let placement = Transform::from_row(w / iw as f32, 0.0, 0.0, h / ih as f32, x, y);
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, transform.pre_concat(placement), None);
    Ok(())
}

fn draw_chart(
    pixmap: &mut Pixmap,
    shaper: &TextShaper<'_>,
    chart: &BarChart,
    frame: &ChartFrame,
    rtl: bool,
    transform: Transform,
) {
    stroke_rect(
        pixmap,
        frame.x,
        frame.y,
        frame.width,
        frame.height,
        CHART_FRAME,
        1.0,
        transform,
    );
    fill_rect(
        pixmap,
        frame.x,
        frame.baseline(),
        frame.width,
        1.0,
        CHART_FRAME,
        transform,
    );

    for bar in layout_bars(chart, frame, rtl) {
        let [r, g, b] = bar.color;
        fill_rect(pixmap, bar.x, bar.y, bar.width, bar.height, [r, g, b, 220], transform);
        draw_text_centered(pixmap, shaper, &bar.value_text, bar.center_x, bar.value_y, transform);
        draw_text_centered(pixmap, shaper, &bar.label, bar.center_x, bar.label_y, transform);
    }
}

// ============================================
// Glyph outlines
// ============================================

/// Font units → CSS px, flipping y (font outlines grow upward)
struct GlyphPathBuilder {
    builder: PathBuilder,
    origin_x: f32,
    origin_y: f32,
    scale: f32,
}

impl GlyphPathBuilder {
    fn new(origin_x: f32, origin_y: f32, scale: f32) -> Self {
        Self {
            builder: PathBuilder::new(),
            origin_x,
            origin_y,
            scale,
        }
    }

    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.origin_x + x * self.scale, self.origin_y - y * self.scale)
    }

    fn finish(self) -> Option<Path> {
        self.builder.finish()
    }
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}
