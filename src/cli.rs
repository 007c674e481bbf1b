use clap::{Parser, Subcommand};
use irshad_common::{Cycle, ReportKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "irshad")]
#[command(about = "تصدير تقارير مستشار التوجيه إلى PDF", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export one report JSON file to PDF
    Export {
        /// Report data (JSON)
        #[arg(required = true)]
        input: PathBuf,

        /// Report template (student/parent/annual/results)
        #[arg(short, long, default_value = "results")]
        kind: ReportKind,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Charts (off/captured/vector); defaults to the configured mode
        #[arg(short, long)]
        charts: Option<ChartMode>,

        /// XHTML template used instead of the built-in report view
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Do not append the export to the report list
        #[arg(long)]
        no_store: bool,
    },

    /// Export every report JSON file in a folder
    Batch {
        /// Folder of report JSON files
        #[arg(required = true)]
        folder: PathBuf,

        #[arg(short, long, default_value = "results")]
        kind: ReportKind,

        /// Output directory (defaults to the input folder)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long)]
        charts: Option<ChartMode>,

        /// Scan sub-folders too
        #[arg(short = 'r', long)]
        recursive: bool,
    },

    /// Saved report records
    Reports {
        #[command(subcommand)]
        action: ReportsAction,
    },

    /// School settings (name, counselor, cycle, ...)
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Import/export named option tables
    Options {
        #[command(subcommand)]
        action: OptionsAction,
    },

    /// Show or edit the configuration
    Config {
        /// Arabic TrueType font file
        #[arg(long)]
        set_font: Option<PathBuf>,

        /// Default chart mode
        #[arg(long)]
        set_charts: Option<ChartMode>,

        /// Show the configuration
        #[arg(long)]
        show: bool,
    },
}

#[derive(Subcommand)]
pub enum ReportsAction {
    /// List saved reports, newest last
    List,
    /// Print one saved report as JSON
    Show { id: String },
    /// Delete a saved report
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    Show,
    /// Set one field: school, counselor, cycle, timezone, levels, semesters
    Set { key: String, value: String },
    /// Switch the cycle and rewrite level names for it
    Cycle { cycle: Cycle },
}

#[derive(Subcommand)]
pub enum OptionsAction {
    /// Import a JSON array as the named table
    Import { name: String, file: PathBuf },
    /// Write the named table as a JSON array
    Export {
        name: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List stored tables
    List,
}

/// Chart handling during export
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartMode {
    /// Tables only
    #[default]
    Off,
    /// Off-screen chart region rasterized and added as a page
    Captured,
    /// Bars drawn with PDF primitives
    Vector,
}

impl std::str::FromStr for ChartMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" | "none" | "tables" => Ok(ChartMode::Off),
            "captured" | "raster" => Ok(ChartMode::Captured),
            "vector" => Ok(ChartMode::Vector),
            _ => Err(format!("Unknown chart mode: {}. Use off, captured, or vector", s)),
        }
    }
}

impl std::fmt::Display for ChartMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartMode::Off => write!(f, "off"),
            ChartMode::Captured => write!(f, "captured"),
            ChartMode::Vector => write!(f, "vector"),
        }
    }
}
