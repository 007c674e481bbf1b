//! Error types

use thiserror::Error;

/// Shared error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Chart data error: {0}")]
    ChartData(String),
}

/// Result alias
pub type Result<T> = std::result::Result<T, Error>;
