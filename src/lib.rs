//! irshad-reports
//!
//! Exports Arabic counselor report forms as paginated A4 PDFs: page sections
//! of a document tree are rasterized one by one and placed one per page.

pub mod assets;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod fonts;
pub mod raster;
pub mod report_view;
pub mod scanner;
pub mod settings;
pub mod storage;
pub mod template;
