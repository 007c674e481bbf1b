//! On-disk report list and option tables
//!
//! `reports.json` holds every exported report as one JSON array. It is only
//! written after a successful export, and always as a whole: the new list
//! goes to a temp file that is then renamed over the old one.

use crate::error::{IrshadError, Result};
use crate::export::sanitize_file_name;
use chrono::Local;
use irshad_common::{OptionTable, ReportData, ReportKind, StoredReport};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

const REPORTS_FILE: &str = "reports.json";
const OPTIONS_DIR: &str = "options";

/// Replace `path` with `content` via a sibling temp file
pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "data".to_string());
    let tmp = parent.join(format!(".{}.tmp", file_name));
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        IrshadError::Storage(format!("{}: {}", path.display(), e))
    })
}

/// Record for an export of `data` made today
pub fn new_record(kind: ReportKind, data: &ReportData) -> Result<StoredReport> {
    let content = serde_json::to_value(data)?;
    let now = Local::now();

    let mut hasher = Sha256::new();
    hasher.update(content.to_string().as_bytes());
    hasher.update(now.timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
    let id = hex::encode(&hasher.finalize()[..8]);

    let title = match (data.level.trim(), data.semester.trim()) {
        ("", "") => data.title.clone(),
        (level, semester) => format!("تقرير {} - {}", level, semester),
    };

    Ok(StoredReport {
        id,
        title,
        date: now.format("%Y-%m-%d").to_string(),
        kind: kind.title().to_string(),
        content,
    })
}

pub struct ReportStore {
    path: PathBuf,
}

impl ReportStore {
    pub fn open(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(REPORTS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved reports, oldest first; unreadable data reads as an empty list
    pub fn list(&self) -> Vec<StoredReport> {
        if !self.path.exists() {
            return Vec::new();
        }
        let parsed = std::fs::read_to_string(&self.path)
            .map_err(IrshadError::from)
            .and_then(|c| serde_json::from_str::<Vec<StoredReport>>(&c).map_err(IrshadError::from));
        match parsed {
            Ok(reports) => reports,
            Err(e) => {
                log::warn!("report list {} unreadable: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    pub fn add(&self, report: StoredReport) -> Result<()> {
        let mut reports = self.list();
        reports.push(report);
        self.write(&reports)
    }

    pub fn get(&self, id: &str) -> Result<StoredReport> {
        self.list()
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| IrshadError::ReportNotFound(id.to_string()))
    }

    /// Remove and return the report with `id`
    pub fn delete(&self, id: &str) -> Result<StoredReport> {
        let mut reports = self.list();
        let index = reports
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| IrshadError::ReportNotFound(id.to_string()))?;
        let removed = reports.remove(index);
        self.write(&reports)?;
        Ok(removed)
    }

    fn write(&self, reports: &[StoredReport]) -> Result<()> {
        let json = serde_json::to_string_pretty(reports)?;
        write_atomic(&self.path, json.as_bytes())
    }
}

/// Named option tables, one JSON file each
pub struct OptionStore {
    dir: PathBuf,
}

impl OptionStore {
    pub fn open(data_dir: &Path) -> Self {
        Self {
            dir: data_dir.join(OPTIONS_DIR),
        }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_file_name(name)))
    }

    /// Validate `json` and store it under `name`; nothing is written on error
    pub fn import(&self, name: &str, json: &str) -> Result<OptionTable> {
        let table = OptionTable::import(name, json)?;
        write_atomic(&self.path_for(name), table.export()?.as_bytes())?;
        Ok(table)
    }

    pub fn load(&self, name: &str) -> Result<OptionTable> {
        let path = self.path_for(name);
        if !path.exists() {
            return Err(IrshadError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(OptionTable::import(name, &content)?)
    }

    /// Table names, sorted
    pub fn names(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map(|x| x == "json").unwrap_or(false))
            .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().to_string()))
            .collect();
        names.sort();
        names
    }
}
