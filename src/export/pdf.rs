//! PDF accumulator (printpdf layer API)
//!
//! One captured image per page at the compositor's placement. Vector charts
//! are drawn on their own page with lines, filled polygons and text.

use crate::error::{IrshadError, Result};
use crate::fonts::FontHandle;
use crate::raster::text::{is_rtl_text, TextShaper};
use crate::raster::CapturedBitmap;
use irshad_common::export::chart::{layout_bars, BarChart, ChartFrame};
use irshad_common::export::Placement;
use irshad_common::layout::{pt_to_mm, PageBudget};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;

/// Vector chart sizes (mm / pt)
const CHART_MAX_HEIGHT_MM: f32 = 85.0;
const CHART_TITLE_PT: f32 = 12.0;
const CHART_LABEL_PT: f32 = 8.0;
const CHART_GUTTER_MM: f32 = 12.0;
const CHART_SPACING_MM: f32 = 8.0;

pub struct PdfAccumulator {
    doc: PdfDocumentReference,
    budget: PageBudget,
    page: PdfPageIndex,
    layer: PdfLayerIndex,
    font: IndirectFontRef,
    /// Font handle backing `font`; `None` when Helvetica is used
    embedded: Option<FontHandle>,
    rtl: bool,
    pages: usize,
    placements: Vec<Placement>,
}

impl PdfAccumulator {
    /// Empty A4 document; the first page already exists
    pub fn new(title: &str, budget: PageBudget, font: &FontHandle) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(
            title,
            Mm(budget.page_width_mm),
            Mm(budget.page_height_mm),
            "Layer 1",
        );

        let external = font.data().and_then(|data| match doc.add_external_font(data) {
            Ok(f) => Some(f),
            Err(e) => {
                log::warn!("font embedding failed, using Helvetica: {:?}", e);
                None
            }
        });
        let (font_ref, embedded) = match external {
            Some(f) => {
                if let Some(path) = font.source() {
                    log::debug!("embedded font {}", path.display());
                }
                (f, Some(font.clone()))
            }
            None => (
                doc.add_builtin_font(BuiltinFont::Helvetica)
                    .map_err(|e| IrshadError::PdfGeneration(format!("font: {:?}", e)))?,
                None,
            ),
        };

        Ok(Self {
            doc,
            budget,
            page,
            layer,
            font: font_ref,
            embedded,
            rtl: font.rtl(),
            pages: 1,
            placements: Vec::new(),
        })
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn rtl(&self) -> bool {
        self.rtl
    }

    pub fn uses_builtin_font(&self) -> bool {
        self.embedded.is_none()
    }

    /// Layer for `placement`, adding a page first when it asks for one
    fn layer_for(&mut self, placement: &Placement) -> PdfLayerReference {
        if placement.new_page {
            self.pages += 1;
            let (page, layer) = self.doc.add_page(
                Mm(self.budget.page_width_mm),
                Mm(self.budget.page_height_mm),
                format!("Layer {}", self.pages),
            );
            self.page = page;
            self.layer = layer;
        }
        self.doc.get_page(self.page).get_layer(self.layer)
    }

    /// Draw `bitmap` at `placement`
    pub fn add_image(&mut self, bitmap: &CapturedBitmap, placement: &Placement) -> Result<()> {
        if bitmap.is_empty() || placement.width_mm <= 0.0 {
            return Err(IrshadError::PdfGeneration("empty image".to_string()));
        }
        let layer = self.layer_for(placement);

        let image = Image::from(ImageXObject {
            width: Px(bitmap.width as usize),
            height: Px(bitmap.height as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: bitmap.pixels.clone(),
            image_filter: None,
            clipping_bbox: None,
            smask: None,
        });

        // DPI = pixels / (mm / 25.4)
        let dpi = bitmap.width as f32 / (placement.width_mm / 25.4);
        image.add_to_layer(
            layer,
            ImageTransform {
                translate_x: Some(Mm(placement.x_mm)),
                translate_y: Some(Mm(placement.y_from_bottom_mm(self.budget.page_height_mm))),
                dpi: Some(dpi),
                ..Default::default()
            },
        );

        self.placements.push(*placement);
        Ok(())
    }

    /// Stack `charts` inside `placement`, one under the other
    pub fn add_vector_charts(&mut self, charts: &[BarChart], placement: &Placement) {
        if charts.is_empty() {
            return;
        }
        let layer = self.layer_for(placement);
        let page_h = self.budget.page_height_mm;

        let title_mm = pt_to_mm(CHART_TITLE_PT) * 1.6;
        let slot = (placement.height_mm / charts.len() as f32).min(CHART_MAX_HEIGHT_MM + title_mm);
        let mut top = placement.y_mm;

        for chart in charts {
            let frame = ChartFrame {
                x: placement.x_mm,
                y: top + title_mm,
                width: placement.width_mm,
                height: (slot - title_mm - CHART_SPACING_MM).max(CHART_GUTTER_MM),
                label_gutter: CHART_GUTTER_MM,
            };
            self.draw_chart(&layer, chart, &frame, top, page_h);
            top += slot;
        }

        self.placements.push(*placement);
    }

    fn draw_chart(
        &self,
        layer: &PdfLayerReference,
        chart: &BarChart,
        frame: &ChartFrame,
        title_top: f32,
        page_h: f32,
    ) {
        let flip = |y: f32| page_h - y;

        layer.set_fill_color(grey(55));
        let title_x = if self.rtl {
            frame.x + frame.width - self.text_width(&chart.title, CHART_TITLE_PT)
        } else {
            frame.x
        };
        self.write(layer, &chart.title, CHART_TITLE_PT, title_x, flip(title_top + pt_to_mm(CHART_TITLE_PT)));

        layer.set_outline_color(grey(209));
        layer.set_outline_thickness(0.5);
        layer.add_line(Line {
            points: rect_points(frame.x, flip(frame.y + frame.height), frame.width, frame.height),
            is_closed: true,
        });
        layer.add_line(Line {
            points: vec![
                (Point::new(Mm(frame.x), Mm(flip(frame.baseline()))), false),
                (Point::new(Mm(frame.x + frame.width), Mm(flip(frame.baseline()))), false),
            ],
            is_closed: false,
        });

        for bar in layout_bars(chart, frame, self.rtl) {
            let [r, g, b] = bar.color;
            if bar.height > 0.0 {
                layer.set_fill_color(Color::Rgb(Rgb::new(
                    r as f32 / 255.0,
                    g as f32 / 255.0,
                    b as f32 / 255.0,
                    None,
                )));
                layer.add_polygon(Polygon {
                    rings: vec![rect_points(bar.x, flip(bar.y + bar.height), bar.width, bar.height)],
                    mode: PaintMode::Fill,
                    winding_order: WindingOrder::NonZero,
                });
            }

            layer.set_fill_color(grey(55));
            self.write_centered(layer, &bar.value_text, bar.center_x, flip(bar.value_y));
            let label = self.printable_label(&bar.label, bar.index);
            self.write_centered(layer, &label, bar.center_x, flip(bar.label_y));
        }
    }

    /// Helvetica has no Arabic glyphs; such labels become their position
    fn printable_label(&self, label: &str, index: usize) -> String {
        if self.uses_builtin_font() && !label.is_ascii() {
            format!("#{}", index + 1)
        } else {
            label.to_string()
        }
    }

    /// Text width (mm)
    fn text_width(&self, text: &str, size_pt: f32) -> f32 {
        match &self.embedded {
            Some(font) => TextShaper::new(font).measure(text, pt_to_mm(size_pt)),
            None => text.chars().count() as f32 * pt_to_mm(size_pt) * 0.5,
        }
    }

    fn write_centered(&self, layer: &PdfLayerReference, text: &str, center_x: f32, baseline: f32) {
        let width = self.text_width(text, CHART_LABEL_PT);
        self.write(layer, text, CHART_LABEL_PT, center_x - width / 2.0, baseline);
    }

    /// PDF text runs are laid left to right; RTL runs are reversed into visual order
    fn write(&self, layer: &PdfLayerReference, text: &str, size_pt: f32, x: f32, y: f32) {
        if self.uses_builtin_font() && !text.is_ascii() {
            return;
        }
        let visual = if is_rtl_text(text) {
            text.chars().rev().collect::<String>()
        } else {
            text.to_string()
        };
        layer.use_text(visual, size_pt, Mm(x), Mm(y), &self.font);
    }

    /// Serialize the document
    pub fn finish(self) -> Result<Vec<u8>> {
        log::debug!("pdf: {} pages, {} placements", self.pages, self.placements.len());
        self.doc
            .save_to_bytes()
            .map_err(|e| IrshadError::PdfGeneration(format!("save: {:?}", e)))
    }
}

fn grey(level: u8) -> Color {
    let v = level as f32 / 255.0;
    Color::Rgb(Rgb::new(v, v, v, None))
}

/// Corners of a rectangle given its bottom-left corner (PDF space)
fn rect_points(x: f32, y: f32, w: f32, h: f32) -> Vec<(Point, bool)> {
    vec![
        (Point::new(Mm(x), Mm(y)), false),
        (Point::new(Mm(x + w), Mm(y)), false),
        (Point::new(Mm(x + w), Mm(y + h)), false),
        (Point::new(Mm(x), Mm(y + h)), false),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use irshad_common::export::PageCompositor;

    fn accumulator() -> PdfAccumulator {
        PdfAccumulator::new("تقرير", PageBudget::a4(), &FontHandle::fallback()).expect("new")
    }

    #[test]
    fn test_pages_follow_placements() {
        let mut pdf = accumulator();
        let mut compositor = PageCompositor::new(PageBudget::a4());
        let bitmap = CapturedBitmap::blank(40, 60);

        for _ in 0..3 {
            let placement = compositor.place(bitmap.width, bitmap.height);
            pdf.add_image(&bitmap, &placement).expect("add");
        }
        assert_eq!(pdf.pages, 3);
        assert_eq!(pdf.placements().len(), 3);

        let bytes = pdf.finish().expect("finish");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_fallback_font_keeps_rtl() {
        let pdf = accumulator();
        assert!(pdf.rtl());
        assert!(pdf.uses_builtin_font());
        assert_eq!(pdf.printable_label("الرياضيات", 1), "#2");
        assert_eq!(pdf.printable_label("Math", 1), "Math");
    }

    #[test]
    fn test_empty_bitmap_rejected() {
        let mut pdf = accumulator();
        let mut compositor = PageCompositor::new(PageBudget::a4());
        let placement = compositor.place(10, 10);
        let empty = CapturedBitmap::new(10, 0, Vec::new());
        assert!(pdf.add_image(&empty, &placement).is_err());
    }

    #[test]
    fn test_vector_charts_page() {
        let mut pdf = accumulator();
        let mut compositor = PageCompositor::new(PageBudget::a4());
        let chart = BarChart::new("Bands", vec!["A".into(), "B".into()], vec![3.0, 5.0])
            .expect("chart");

        let first = compositor.place(100, 100);
        pdf.add_image(&CapturedBitmap::blank(100, 100), &first).expect("add");
        let budget = *compositor.budget();
        let charts_page = compositor.place_sized(irshad_common::export::FittedSize {
            width_mm: budget.available_width_mm(),
            height_mm: budget.available_height_mm(),
        });
        pdf.add_vector_charts(&[chart], &charts_page);

        assert_eq!(pdf.pages, 2);
        assert!(pdf.finish().expect("finish").starts_with(b"%PDF"));
    }
}
