//! Export core shared by the PDF accumulator: page geometry and chart layout.

pub mod chart;
pub mod compositor;
pub mod slicer;

pub use chart::{layout_bars, BarChart, BarGeometry, ChartFrame};
pub use compositor::{fit_to_budget, FittedSize, PageCompositor, Placement};
pub use slicer::{plan_slices, SlicePlan, Strip};
