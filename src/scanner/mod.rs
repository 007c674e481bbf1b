use crate::error::{IrshadError, Result};
use irshad_common::ReportData;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ReportFile {
    pub path: PathBuf,
    pub file_name: String,
}

impl ReportFile {
    pub fn load(&self) -> Result<ReportData> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

const REPORT_EXTENSIONS: &[&str] = &["json", "JSON"];

/// Report JSON files in `folder`, sorted by file name
pub fn scan_folder(folder: &Path, recursive: bool) -> Result<Vec<ReportFile>> {
    if !folder.exists() {
        return Err(IrshadError::FolderNotFound(folder.display().to_string()));
    }

    let mut files = Vec::new();
    let depth = if recursive { usize::MAX } else { 1 };

    for entry in WalkDir::new(folder)
        .max_depth(depth)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let is_report = path
            .extension()
            .map(|ext| REPORT_EXTENSIONS.iter().any(|&e| e == ext.to_string_lossy()))
            .unwrap_or(false);
        // hidden files (temp writes, editor backups) are not reports
        let hidden = path
            .file_name()
            .map(|n| n.to_string_lossy().starts_with('.'))
            .unwrap_or(true);

        if is_report && !hidden {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            files.push(ReportFile {
                path: path.to_path_buf(),
                file_name,
            });
        }
    }

    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(files)
}
