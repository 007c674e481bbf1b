//! Export pipeline integration tests
//!
//! Drives the async exporter end to end with the fallback font, so the
//! results do not depend on fonts installed on the machine.

use irshad_common::dom::{Element, CHART_REGION_CLASS, OFFSCREEN_CLASS};
use irshad_common::export::chart::BarChart;
use irshad_common::types::{SubjectStat, TopPerformer, Totals};
use irshad_common::{PageBudget, ReportData, ReportKind};
use irshad_reports::assets::AssetStore;
use irshad_reports::error::{IrshadError, Result};
use irshad_reports::export::{ChartRendering, Exporter, RenderStrategy};
use irshad_reports::fonts::{FontHandle, FontRegistry};
use irshad_reports::raster::{CanvasRasterizer, CapturedBitmap, Rasterizer};
use irshad_reports::report_view;
use irshad_reports::settings::AppSettings;
use std::sync::Arc;
use tempfile::tempdir;

fn report_data() -> ReportData {
    ReportData {
        title: "تحليل نتائج الفصل الأول".to_string(),
        school: "متوسطة حسن بن خير الدين".to_string(),
        level: "السنة الرابعة متوسط".to_string(),
        semester: "الفصل الأول".to_string(),
        average: 11.42,
        totals: Totals {
            total_students: 53,
            excellent: 5,
            good: 12,
            average: 20,
            weak: 16,
        },
        subjects: vec![
            SubjectStat {
                name: "الرياضيات".to_string(),
                average: 9.8,
                ..Default::default()
            },
            SubjectStat {
                name: "اللغة العربية".to_string(),
                average: 12.4,
                ..Default::default()
            },
        ],
        top_performers: vec![TopPerformer {
            student_name: "أمينة".to_string(),
            average: 17.5,
        }],
        report_date: "2026-01-20".to_string(),
        ..Default::default()
    }
}

fn exporter_with(rasterizer: Arc<dyn Rasterizer>) -> Exporter {
    let fonts = Arc::new(FontRegistry::preloaded(FontHandle::fallback()));
    Exporter::new(fonts, rasterizer, PageBudget::a4())
}

fn canvas_exporter() -> Exporter {
    exporter_with(Arc::new(CanvasRasterizer::new(AssetStore::default())))
}

fn section(text: &str) -> Element {
    Element::new("section").with_class("page").with_text(text)
}

/// Always returns the same blank bitmap
struct FixedRasterizer {
    width: u32,
    height: u32,
}

impl Rasterizer for FixedRasterizer {
    fn rasterize(&self, _element: &Element, _font: &FontHandle) -> Result<CapturedBitmap> {
        Ok(CapturedBitmap::blank(self.width, self.height))
    }
}

/// Canvas rasterizer that cannot capture the chart region
struct ChartFailingRasterizer {
    inner: CanvasRasterizer,
}

impl Rasterizer for ChartFailingRasterizer {
    fn rasterize(&self, element: &Element, font: &FontHandle) -> Result<CapturedBitmap> {
        if element.has_class(CHART_REGION_CLASS) {
            return Err(IrshadError::Capture("canvas tainted".to_string()));
        }
        self.inner.rasterize(element, font)
    }
}

/// Three sections, one blank: two pages
#[tokio::test]
async fn test_empty_section_is_skipped() {
    let root = Element::new("div")
        .with_attr("dir", "rtl")
        .with_child(section("الصفحة الأولى"))
        .with_child(section("   \n  "))
        .with_child(section("الصفحة الثالثة"));

    let outcome = canvas_exporter()
        .export(&report_data(), ReportKind::ResultsAnalysis, &root, RenderStrategy::Tables)
        .await
        .expect("export");

    assert_eq!(outcome.page_count(), 2);
    assert!(!outcome.used_slicer);
    assert!(outcome.used_fallback_font);
    assert!(outcome.bytes.starts_with(b"%PDF"));
    assert!(!outcome.placements[0].new_page);
    assert!(outcome.placements[1].new_page);
}

/// Every placed page stays inside the margins and keeps its aspect ratio
#[tokio::test]
async fn test_placements_fit_budget() {
    let root = report_view::render(&report_data(), ReportKind::ResultsAnalysis, &AppSettings::default());
    let outcome = canvas_exporter()
        .export(&report_data(), ReportKind::ResultsAnalysis, &root, RenderStrategy::Tables)
        .await
        .expect("export");

    let budget = PageBudget::a4();
    for p in &outcome.placements {
        assert!(p.width_mm <= budget.available_width_mm() + 0.01);
        assert!(p.height_mm <= budget.available_height_mm() + 0.01);
        assert_eq!(p.x_mm, budget.margin_mm);
        assert_eq!(p.y_mm, budget.margin_mm);
    }
    // cover, results, subjects, top performers, notes
    assert_eq!(outcome.page_count(), 5);
}

/// No page sections: one 1200x3000 capture sliced into two 1500px strips
#[tokio::test]
async fn test_fallback_slicing() {
    let exporter = exporter_with(Arc::new(FixedRasterizer {
        width: 1200,
        height: 3000,
    }));
    let root = Element::new("div").with_child(Element::new("p").with_text("نص طويل"));

    let outcome = exporter
        .export(&report_data(), ReportKind::ParentInformation, &root, RenderStrategy::Tables)
        .await
        .expect("export");

    assert!(outcome.used_slicer);
    assert_eq!(outcome.page_count(), 2);
    for p in &outcome.placements {
        assert!((p.width_mm - 190.0).abs() < 0.01);
        assert!((p.height_mm - 237.5).abs() < 0.01);
    }
}

/// A zero-height capture places nothing
#[tokio::test]
async fn test_nothing_to_export() {
    let exporter = exporter_with(Arc::new(FixedRasterizer {
        width: 1588,
        height: 0,
    }));
    let root = Element::new("div");

    let err = exporter
        .export(&report_data(), ReportKind::ResultsAnalysis, &root, RenderStrategy::Tables)
        .await
        .unwrap_err();
    assert!(matches!(err, IrshadError::EmptyContent));
}

/// A failing chart capture still yields the table pages
#[tokio::test]
async fn test_chart_failure_is_tolerated() {
    let exporter = exporter_with(Arc::new(ChartFailingRasterizer {
        inner: CanvasRasterizer::new(AssetStore::default()),
    }));
    let data = report_data();
    let root = report_view::render(&data, ReportKind::ResultsAnalysis, &AppSettings::default());

    let outcome = exporter
        .export(
            &data,
            ReportKind::ResultsAnalysis,
            &root,
            RenderStrategy::TablesWithCharts(ChartRendering::Captured),
        )
        .await
        .expect("export");

    assert!(outcome.skipped_charts);
    assert_eq!(outcome.page_count(), 5);
    assert!(outcome.bytes.starts_with(b"%PDF"));
}

/// Captured charts add one page
#[tokio::test]
async fn test_captured_charts_page() {
    let data = report_data();
    let root = report_view::render(&data, ReportKind::ResultsAnalysis, &AppSettings::default());

    let outcome = canvas_exporter()
        .export(
            &data,
            ReportKind::ResultsAnalysis,
            &root,
            RenderStrategy::TablesWithCharts(ChartRendering::Captured),
        )
        .await
        .expect("export");

    assert!(!outcome.skipped_charts);
    assert_eq!(outcome.page_count(), 6);
}

/// Vector charts add one full-budget page
#[tokio::test]
async fn test_vector_charts_page() {
    let data = report_data();
    let root = report_view::render(&data, ReportKind::ResultsAnalysis, &AppSettings::default());

    let outcome = canvas_exporter()
        .export(
            &data,
            ReportKind::ResultsAnalysis,
            &root,
            RenderStrategy::TablesWithCharts(ChartRendering::Vector),
        )
        .await
        .expect("export");

    assert_eq!(outcome.page_count(), 6);
    let last = outcome.placements.last().expect("chart page");
    assert!((last.width_mm - 190.0).abs() < 0.01);
    assert!((last.height_mm - 277.0).abs() < 0.01);
}

/// Charts requested without chart data are skipped, not an error
#[tokio::test]
async fn test_vector_charts_without_data() {
    let root = Element::new("div")
        .with_child(section("صفحة"))
        .with_child(Element::new("div").with_class(CHART_REGION_CLASS).with_class(OFFSCREEN_CLASS));

    let outcome = canvas_exporter()
        .export(
            &report_data(),
            ReportKind::AnnualActivity,
            &root,
            RenderStrategy::TablesWithCharts(ChartRendering::Vector),
        )
        .await
        .expect("export");

    assert!(outcome.skipped_charts);
    assert_eq!(outcome.page_count(), 1);
}

/// Same data twice gives the same pages
#[tokio::test]
async fn test_reexport_is_stable() {
    let data = report_data();
    let root = report_view::render(&data, ReportKind::ResultsAnalysis, &AppSettings::default());
    let exporter = canvas_exporter();

    let first = exporter
        .export(&data, ReportKind::ResultsAnalysis, &root, RenderStrategy::Tables)
        .await
        .expect("first export");
    let second = exporter
        .export(&data, ReportKind::ResultsAnalysis, &root, RenderStrategy::Tables)
        .await
        .expect("second export");

    assert_eq!(first.page_count(), second.page_count());
    let ratios = |o: &irshad_reports::export::ExportOutcome| -> Vec<f32> {
        o.placements.iter().map(|p| p.aspect_ratio()).collect()
    };
    assert_eq!(ratios(&first), ratios(&second));
}

/// A report without a title is rejected before anything is captured
#[tokio::test]
async fn test_missing_title() {
    let data = ReportData {
        title: "  ".to_string(),
        ..report_data()
    };
    let root = Element::new("div").with_child(section("صفحة"));

    let err = canvas_exporter()
        .export(&data, ReportKind::ResultsAnalysis, &root, RenderStrategy::Tables)
        .await
        .unwrap_err();
    assert!(matches!(err, IrshadError::MissingTitle));
}

/// A page whose image cannot be loaded aborts the export
#[tokio::test]
async fn test_primary_capture_error_aborts() {
    let root = Element::new("div").with_child(
        Element::new("section")
            .with_class("page")
            .with_child(Element::new("img").with_attr("src", "/nonexistent/stamp.png")),
    );

    let err = canvas_exporter()
        .export(&report_data(), ReportKind::ResultsAnalysis, &root, RenderStrategy::Tables)
        .await
        .unwrap_err();
    assert!(matches!(err, IrshadError::Asset(_)));
}

/// The PDF lands in the output folder under the kind/semester/date name
#[tokio::test]
async fn test_write_to_output_dir() {
    let dir = tempdir().expect("Failed to create temp dir");
    let root = Element::new("div").with_child(section("صفحة"));

    let outcome = canvas_exporter()
        .export(&report_data(), ReportKind::StudentInformation, &root, RenderStrategy::Tables)
        .await
        .expect("export");
    let path = outcome.write_to(&dir.path().join("out")).expect("write");

    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("تقرير_عملية_الإعلام_الفصل_الأول_"));
    assert!(name.ends_with(".pdf"));
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

/// Charts embedded in a custom tree are found for vector output
#[tokio::test]
async fn test_vector_charts_from_template_canvas() {
    let chart = BarChart::new("Groups", vec!["A".into(), "B".into()], vec![12.0, 9.5]).unwrap();
    let root = Element::new("div")
        .with_child(section("صفحة"))
        .with_child(
            Element::new("div")
                .with_class(CHART_REGION_CLASS)
                .with_child(chart.to_element(400, 200)),
        );

    let outcome = canvas_exporter()
        .export(
            &report_data(),
            ReportKind::AnnualActivity,
            &root,
            RenderStrategy::TablesWithCharts(ChartRendering::Vector),
        )
        .await
        .expect("export");
    assert!(!outcome.skipped_charts);
    assert_eq!(outcome.page_count(), 2);
}
