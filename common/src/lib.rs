//! Irshad common library
//!
//! Pure core of the report exporter: report types, page geometry and the
//! document tree passes that run before capture. No I/O happens here.

pub mod collector;
pub mod cycle;
pub mod dom;
pub mod error;
pub mod export;
pub mod layout;
pub mod neutralize;
pub mod options;
pub mod types;

pub use collector::collect_pages;
pub use cycle::Cycle;
pub use dom::{Element, Node, Style};
pub use error::{Error, Result};
pub use layout::PageBudget;
pub use neutralize::neutralize;
pub use options::OptionTable;
pub use types::{ReportData, ReportKind, StoredReport, SubjectStat, TopPerformer, Totals, Trend};
