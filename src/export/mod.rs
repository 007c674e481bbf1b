//! Report-to-PDF export
//!
//! One service for every report kind. The caller hands over the report data,
//! the document tree to capture and a [`RenderStrategy`]; the exporter
//! captures each page section (or slices the whole tree when there are
//! none), places one image per A4 page and returns the finished PDF.

pub mod pdf;

use crate::cli::ChartMode;
use crate::error::{IrshadError, Result};
use crate::fonts::{FontHandle, FontRegistry};
use crate::raster::{capture, CapturedBitmap, Rasterizer};
use chrono::{Local, NaiveDate};
use indicatif::{ProgressBar, ProgressStyle};
use irshad_common::dom::{Element, CHART_REGION_CLASS};
use irshad_common::export::chart::{BarChart, CHART_ATTR};
use irshad_common::export::{plan_slices, FittedSize, PageCompositor, Placement};
use irshad_common::{collect_pages, PageBudget, ReportData, ReportKind};
use lazy_static::lazy_static;
use pdf::PdfAccumulator;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

lazy_static! {
    /// Runs of whitespace and characters that break paths on some platform
    static ref PATH_HOSTILE: Regex = Regex::new(r#"[\\/:*?"<>|\x00-\x1f\s]+"#).expect("valid regex");
}

/// How charts reach the PDF
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartRendering {
    /// The off-screen chart region is captured and added as a page
    Captured,
    /// Bars are drawn with PDF primitives on their own page
    Vector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStrategy {
    Tables,
    TablesWithCharts(ChartRendering),
}

impl From<ChartMode> for RenderStrategy {
    fn from(mode: ChartMode) -> Self {
        match mode {
            ChartMode::Off => RenderStrategy::Tables,
            ChartMode::Captured => RenderStrategy::TablesWithCharts(ChartRendering::Captured),
            ChartMode::Vector => RenderStrategy::TablesWithCharts(ChartRendering::Vector),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Every image or chart page, in page order
    pub placements: Vec<Placement>,
    /// No page sections were found and the whole tree was sliced
    pub used_slicer: bool,
    /// Charts were requested but left out
    pub skipped_charts: bool,
    /// No Arabic font was available
    pub used_fallback_font: bool,
}

impl ExportOutcome {
    pub fn page_count(&self) -> usize {
        self.placements.len()
    }

    /// Write the PDF into `dir` under its file name
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Replace path-hostile characters and whitespace runs with `_`
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned = PATH_HOSTILE.replace_all(name.trim(), "_");
    let cleaned = cleaned.trim_matches(|c| c == '.' || c == '_');
    if cleaned.is_empty() {
        "report".to_string()
    } else {
        cleaned.to_string()
    }
}

/// `<kind title>_<semester>_<YYYY-MM-DD>.pdf`
pub fn output_file_name(kind: ReportKind, semester: &str, date: NaiveDate) -> String {
    let stem = if semester.trim().is_empty() {
        format!("{}_{}", kind.title(), date.format("%Y-%m-%d"))
    } else {
        format!("{}_{}_{}", kind.title(), semester, date.format("%Y-%m-%d"))
    };
    format!("{}.pdf", sanitize_file_name(&stem))
}

pub struct Exporter {
    fonts: Arc<FontRegistry>,
    rasterizer: Arc<dyn Rasterizer>,
    budget: PageBudget,
    show_progress: bool,
}

impl Exporter {
    pub fn new(fonts: Arc<FontRegistry>, rasterizer: Arc<dyn Rasterizer>, budget: PageBudget) -> Self {
        Self {
            fonts,
            rasterizer,
            budget,
            show_progress: false,
        }
    }

    /// Draw a progress bar while pages are captured
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Export `root` as the `kind` report for `data`.
    ///
    /// Primary capture errors abort the export. Chart failures are logged
    /// and the PDF is produced without charts.
    pub async fn export(
        &self,
        data: &ReportData,
        kind: ReportKind,
        root: &Element,
        strategy: RenderStrategy,
    ) -> Result<ExportOutcome> {
        if data.title.trim().is_empty() {
            return Err(IrshadError::MissingTitle);
        }
        if !data.totals.is_consistent() {
            log::warn!(
                "band counts add up to {} for {} students",
                data.totals.banded_sum(),
                data.totals.total_students
            );
        }

        let font = self.fonts.get().await;
        let mut pdf = PdfAccumulator::new(kind.title(), self.budget, font)?;
        let mut compositor = PageCompositor::new(self.budget);

        let pages = collect_pages(root);
        let used_slicer = pages.is_empty();
        if used_slicer {
            log::info!("no page sections, slicing the whole report");
            self.slice_into(root, font, &mut compositor, &mut pdf).await?;
        } else {
            self.capture_pages(&pages, font, &mut compositor, &mut pdf).await?;
        }

        let skipped_charts = match strategy {
            RenderStrategy::Tables => false,
            RenderStrategy::TablesWithCharts(ChartRendering::Captured) => {
                !self.add_captured_charts(root, font, &mut compositor, &mut pdf).await
            }
            RenderStrategy::TablesWithCharts(ChartRendering::Vector) => {
                !add_vector_charts(root, &mut compositor, &mut pdf)
            }
        };

        if compositor.pages_placed() == 0 {
            return Err(IrshadError::EmptyContent);
        }

        let placements = pdf.placements().to_vec();
        let bytes = pdf.finish()?;
        log::info!("exported {} pages", placements.len());

        Ok(ExportOutcome {
            file_name: output_file_name(kind, &data.semester, Local::now().date_naive()),
            bytes,
            placements,
            used_slicer,
            skipped_charts,
            used_fallback_font: font.is_fallback(),
        })
    }

    fn progress(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len as u64);
        let style = ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar
    }

    async fn capture_pages(
        &self,
        pages: &[&Element],
        font: &FontHandle,
        compositor: &mut PageCompositor,
        pdf: &mut PdfAccumulator,
    ) -> Result<()> {
        let bar = self.progress(pages.len());
        for (i, page) in pages.iter().enumerate() {
            bar.set_message(format!("صفحة {}", i + 1));
            let bitmap = capture(self.rasterizer.clone(), font, page).await?;
            if bitmap.is_empty() {
                log::debug!("page {} rendered empty, skipped", i + 1);
                bar.inc(1);
                continue;
            }
            let placement = compositor.place(bitmap.width, bitmap.height);
            pdf.add_image(&bitmap, &placement)?;
            log::debug!(
                "page {}: {}x{}px -> {:.1}x{:.1}mm",
                i + 1,
                bitmap.width,
                bitmap.height,
                placement.width_mm,
                placement.height_mm
            );
            bar.inc(1);
        }
        bar.finish_and_clear();
        Ok(())
    }

    /// One tall capture cut into equal strips, one strip per page
    async fn slice_into(
        &self,
        root: &Element,
        font: &FontHandle,
        compositor: &mut PageCompositor,
        pdf: &mut PdfAccumulator,
    ) -> Result<()> {
        let bitmap = capture(self.rasterizer.clone(), font, root).await?;
        let plan = plan_slices(bitmap.width, bitmap.height, &self.budget);
        log::debug!(
            "slicing {}x{}px into {} pages",
            bitmap.width,
            bitmap.height,
            plan.pages_needed
        );

        let bar = self.progress(plan.strips.len());
        for strip in &plan.strips {
            let part = bitmap.crop_rows(strip.source_y, strip.source_height)?;
            let placement = compositor.place_sized(strip.placed);
            pdf.add_image(&part, &placement)?;
            bar.inc(1);
        }
        bar.finish_and_clear();
        Ok(())
    }

    /// Capture the chart region as one more page; `false` when it is left out
    async fn add_captured_charts(
        &self,
        root: &Element,
        font: &FontHandle,
        compositor: &mut PageCompositor,
        pdf: &mut PdfAccumulator,
    ) -> bool {
        let Some(region) = root.find_first_by_class(CHART_REGION_CLASS) else {
            log::warn!("no chart region in the report, charts skipped");
            return false;
        };

        let bitmap: CapturedBitmap = match capture(self.rasterizer.clone(), font, region).await {
            Ok(b) if !b.is_empty() => b,
            Ok(_) => {
                log::warn!("chart region rendered empty, charts skipped");
                return false;
            }
            Err(e) => {
                log::warn!("chart capture failed, exporting without charts: {}", e);
                return false;
            }
        };

        let placement = compositor.place(bitmap.width, bitmap.height);
        match pdf.add_image(&bitmap, &placement) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("chart page not added: {}", e);
                false
            }
        }
    }
}

/// Charts described by `canvas[data-chart]` elements under `root`
pub fn charts_in(root: &Element) -> Vec<BarChart> {
    root.descendants()
        .filter(|el| el.attr(CHART_ATTR).is_some())
        .filter_map(|el| match BarChart::from_element(el) {
            Ok(chart) if !chart.is_empty() => Some(chart),
            Ok(_) => None,
            Err(e) => {
                log::warn!("chart skipped: {}", e);
                None
            }
        })
        .collect()
}

/// Draw every chart on one extra page; `false` when there is nothing to draw
fn add_vector_charts(root: &Element, compositor: &mut PageCompositor, pdf: &mut PdfAccumulator) -> bool {
    let charts = charts_in(root);
    if charts.is_empty() {
        log::warn!("no chart data, charts skipped");
        return false;
    }
    let budget = *compositor.budget();
    let placement = compositor.place_sized(FittedSize {
        width_mm: budget.available_width_mm(),
        height_mm: budget.available_height_mm(),
    });
    pdf.add_vector_charts(&charts, &placement);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("تقرير: الفصل/الأول"), "تقرير_الفصل_الأول");
        assert_eq!(sanitize_file_name("a  b\tc"), "a_b_c");
        assert_eq!(sanitize_file_name("../.."), "report");
        assert_eq!(sanitize_file_name(""), "report");
    }

    #[test]
    fn test_output_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 20).expect("date");
        assert_eq!(
            output_file_name(ReportKind::ResultsAnalysis, "الفصل الأول", date),
            "تقرير_تحليل_النتائج_الفصل_الأول_2026-01-20.pdf"
        );
        assert_eq!(
            output_file_name(ReportKind::AnnualActivity, "", date),
            "التقرير_السنوي_للنشاطات_2026-01-20.pdf"
        );
    }

    #[test]
    fn test_strategy_from_mode() {
        assert_eq!(RenderStrategy::from(ChartMode::Off), RenderStrategy::Tables);
        assert_eq!(
            RenderStrategy::from(ChartMode::Vector),
            RenderStrategy::TablesWithCharts(ChartRendering::Vector)
        );
    }

    #[test]
    fn test_charts_in_skips_bad_elements() {
        let good = BarChart::new("t", vec!["a".into()], vec![1.0]).expect("chart");
        let root = Element::new("div")
            .with_child(good.to_element(100, 50))
            .with_child(Element::new("canvas").with_attr(CHART_ATTR, "pie"));
        assert_eq!(charts_in(&root), vec![good]);
    }
}
