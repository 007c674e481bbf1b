//! Bar chart geometry
//!
//! A chart is computed once as a list of bars and then handed to a sink:
//! the rasterizer paints it into a capture, the PDF accumulator draws it with
//! vector primitives. Units are whatever the frame is expressed in.

use crate::dom::Element;
use crate::error::{Error, Result};
use crate::types::{ReportData, Totals};

/// Bar colours, picked by `index % PALETTE.len()`
pub const PALETTE: [[u8; 3]; 5] = [
    [34, 197, 94],
    [59, 130, 246],
    [245, 158, 11],
    [239, 68, 68],
    [16, 185, 129],
];

/// Attribute names carried by `canvas` chart elements
pub const CHART_ATTR: &str = "data-chart";
pub const CHART_TITLE_ATTR: &str = "data-title";
pub const CHART_LABELS_ATTR: &str = "data-labels";
pub const CHART_VALUES_ATTR: &str = "data-values";

/// Separator for `data-labels`; names may contain commas
const LABEL_SEPARATOR: &str = "|";

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl BarChart {
    pub fn new(title: impl Into<String>, labels: Vec<String>, values: Vec<f64>) -> Result<Self> {
        if labels.len() != values.len() {
            return Err(Error::ChartData(format!(
                "{} labels for {} values",
                labels.len(),
                values.len()
            )));
        }
        Ok(Self {
            title: title.into(),
            labels,
            values,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Largest value, never below zero
    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    // ---- datasets of the results report ----

    /// Students per result band
    pub fn student_distribution(totals: &Totals) -> Self {
        let (labels, values) = totals
            .bands()
            .iter()
            .map(|(label, count)| (label.to_string(), *count as f64))
            .unzip();
        Self {
            title: "توزيع الطلاب حسب المستوى".to_string(),
            labels,
            values,
        }
    }

    pub fn subject_averages(data: &ReportData) -> Self {
        Self {
            title: "معدلات المواد".to_string(),
            labels: data.subjects.iter().map(|s| s.name.clone()).collect(),
            values: data.subjects.iter().map(|s| s.average).collect(),
        }
    }

    pub fn top_performers(data: &ReportData) -> Self {
        let top = data.top_ten();
        Self {
            title: "أفضل 10 طلاب".to_string(),
            labels: top.iter().map(|p| p.student_name.clone()).collect(),
            values: top.iter().map(|p| p.average).collect(),
        }
    }

    /// Every chart of the results report, empty datasets left out
    pub fn for_report(data: &ReportData) -> Vec<Self> {
        [
            Self::student_distribution(&data.totals),
            Self::subject_averages(data),
            Self::top_performers(data),
        ]
        .into_iter()
        .filter(|c| !c.is_empty())
        .collect()
    }

    // ---- canvas element round trip ----

    /// `canvas` element carrying this chart in data attributes
    pub fn to_element(&self, width_px: u32, height_px: u32) -> Element {
        let labels: Vec<&str> = self.labels.iter().map(String::as_str).collect();
        let values: Vec<String> = self.values.iter().map(|v| format_value(*v)).collect();
        Element::new("canvas")
            .with_attr(CHART_ATTR, "bar")
            .with_attr(CHART_TITLE_ATTR, self.title.clone())
            .with_attr(CHART_LABELS_ATTR, labels.join(LABEL_SEPARATOR))
            .with_attr(CHART_VALUES_ATTR, values.join(","))
            .with_attr("width", width_px.to_string())
            .with_attr("height", height_px.to_string())
    }

    /// Read a chart back from a `canvas[data-chart]` element
    pub fn from_element(el: &Element) -> Result<Self> {
        match el.attr(CHART_ATTR) {
            Some("bar") => {}
            Some(other) => {
                return Err(Error::ChartData(format!("unsupported chart type: {}", other)));
            }
            None => return Err(Error::ChartData("element has no chart".to_string())),
        }

        let values: Vec<f64> = match el.attr(CHART_VALUES_ATTR).map(str::trim) {
            None | Some("") => Vec::new(),
            Some(raw) => raw
                .split(',')
                .map(|v| {
                    v.trim()
                        .parse::<f64>()
                        .map_err(|_| Error::ChartData(format!("invalid value: {:?}", v.trim())))
                })
                .collect::<Result<_>>()?,
        };
        let labels: Vec<String> = match el.attr(CHART_LABELS_ATTR) {
            None | Some("") => Vec::new(),
            Some(raw) => raw.split(LABEL_SEPARATOR).map(|l| l.trim().to_string()).collect(),
        };

        Self::new(el.attr(CHART_TITLE_ATTR).unwrap_or_default(), labels, values)
    }
}

/// Integers without decimals, everything else with two
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

// ============================================
// Geometry
// ============================================

/// Plot box; `y` grows downward
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartFrame {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Room reserved for the value above and the label below the bars
    pub label_gutter: f32,
}

impl ChartFrame {
    /// Baseline the bars stand on
    pub fn baseline(&self) -> f32 {
        self.y + self.height - self.label_gutter / 2.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarGeometry {
    /// Position in the dataset
    pub index: usize,
    pub x: f32,
    /// Top edge
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: [u8; 3],
    /// Centre of the bar, for both texts
    pub center_x: f32,
    pub value_text: String,
    /// Baseline of the value text
    pub value_y: f32,
    pub label: String,
    /// Baseline of the label text
    pub label_y: f32,
}

/// Lay out one bar per value inside `frame`.
///
/// `height = value / max · (frame.height − label_gutter)`; negative values
/// and an all-zero dataset give flat bars. With `rtl` the first value sits
/// at the right edge.
pub fn layout_bars(chart: &BarChart, frame: &ChartFrame, rtl: bool) -> Vec<BarGeometry> {
    let count = chart.values.len();
    if count == 0 || frame.width <= 0.0 {
        return Vec::new();
    }

    let max = chart.max_value();
    let plot_height = (frame.height - frame.label_gutter).max(0.0);
    let slot = frame.width / count as f32;
    let bar_width = slot * 0.6;
    let baseline = frame.baseline();
    let quarter_gutter = frame.label_gutter / 4.0;

    chart
        .values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let height = if max > 0.0 {
                (value.max(0.0) / max) as f32 * plot_height
            } else {
                0.0
            };
            let slot_index = if rtl { count - 1 - index } else { index };
            let x = frame.x + slot * slot_index as f32 + (slot - bar_width) / 2.0;
            let top = baseline - height;
            BarGeometry {
                index,
                x,
                y: top,
                width: bar_width,
                height,
                color: PALETTE[index % PALETTE.len()],
                center_x: x + bar_width / 2.0,
                value_text: format_value(*value),
                value_y: top - quarter_gutter / 2.0,
                label: chart.labels.get(index).cloned().unwrap_or_default(),
                label_y: baseline + quarter_gutter * 1.5,
            }
        })
        .collect()
}
