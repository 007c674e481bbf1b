use crate::cli::ChartMode;
use crate::error::{IrshadError, Result};
use crate::fonts::check_font_file;
use irshad_common::layout::{CAPTURE_SCALE, MARGIN_MM};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Arabic TrueType font used for capture and vector text
    pub font_path: Option<PathBuf>,
    /// Page margin on every side (mm)
    pub margin_mm: f32,
    /// Device pixels per CSS pixel
    pub capture_scale: f32,
    pub chart_mode: ChartMode,
    /// Directory holding reports.json, settings.json and option tables
    pub data_dir: Option<PathBuf>,
    /// Where exported PDFs land when `--output` is not given
    pub output_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            font_path: None,
            margin_mm: MARGIN_MM,
            capture_scale: CAPTURE_SCALE,
            chart_mode: ChartMode::default(),
            data_dir: None,
            output_dir: None,
        }
    }
}

impl Config {
    /// Missing file gives the defaults; so does a corrupt one, with a warning
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Ok(Self::load_from(&config_path))
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let parsed = std::fs::read_to_string(path)
            .map_err(IrshadError::from)
            .and_then(|content| serde_json::from_str::<Config>(&content).map_err(IrshadError::from));
        match parsed {
            Ok(config) => config,
            Err(e) => {
                log::warn!("config {} unreadable, using defaults: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| IrshadError::Config("المجلد الرئيسي غير موجود".into()))?;
        Ok(home.join(".config").join("irshad").join("config.json"))
    }

    /// Configured data directory, else the platform data dir
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let base = dirs::data_dir()
            .ok_or_else(|| IrshadError::Config("مجلد البيانات غير موجود".into()))?;
        Ok(base.join("irshad"))
    }

    pub fn set_font(&mut self, path: PathBuf) -> Result<()> {
        check_font_file(&path)?;
        self.font_path = Some(path);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().expect("temp dir");
        let config = Config::load_from(&dir.path().join("none.json"));
        assert_eq!(config.margin_mm, 10.0);
        assert_eq!(config.capture_scale, 2.0);
        assert!(config.font_path.is_none());
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").expect("write");
        let config = Config::load_from(&path);
        assert_eq!(config.margin_mm, 10.0);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"margin_mm": 15.0, "chart_mode": "vector"}"#).expect("write");
        let config = Config::load_from(&path);
        assert_eq!(config.margin_mm, 15.0);
        assert_eq!(config.chart_mode, ChartMode::Vector);
        assert_eq!(config.capture_scale, 2.0);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            font_path: Some(PathBuf::from("/fonts/Amiri-Regular.ttf")),
            ..Default::default()
        };
        config.save_to(&path).expect("save");
        let loaded = Config::load_from(&path);
        assert_eq!(loaded.font_path, config.font_path);
    }
}
