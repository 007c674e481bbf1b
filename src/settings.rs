//! School settings with change notification
//!
//! Every mutation is persisted and then published on a watch channel, so
//! anything holding a receiver sees the new value without polling.

use crate::error::{IrshadError, Result};
use crate::storage::write_atomic;
use irshad_common::Cycle;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::watch;

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub school_name: String,
    pub counselor_name: String,
    pub cycle: Cycle,
    pub levels: Vec<String>,
    pub groups: Vec<String>,
    pub semesters: Vec<String>,
    pub timezone: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            school_name: String::new(),
            counselor_name: String::new(),
            cycle: Cycle::default(),
            levels: Vec::new(),
            groups: Vec::new(),
            semesters: Vec::new(),
            timezone: "Africa/Tunis".to_string(),
        }
    }
}

impl AppSettings {
    /// Configured levels, or the cycle's defaults when none are set
    pub fn effective_levels(&self) -> Vec<String> {
        if self.levels.is_empty() {
            self.cycle.default_levels()
        } else {
            self.levels.clone()
        }
    }

    /// Switch cycle and rewrite level names for it
    pub fn switch_cycle(&mut self, cycle: Cycle) {
        self.cycle = cycle;
        self.levels = self.levels.iter().map(|l| cycle.substitute(l)).collect();
    }

    /// Set one field from its CLI name. List fields take comma-separated values.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<()> {
        let list = || {
            value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect::<Vec<_>>()
        };
        match key {
            "school" | "schoolName" => self.school_name = value.to_string(),
            "counselor" | "counselorName" => self.counselor_name = value.to_string(),
            "cycle" => {
                let cycle = value.parse::<Cycle>().map_err(IrshadError::Validation)?;
                self.switch_cycle(cycle);
            }
            "levels" => self.levels = list(),
            "groups" => self.groups = list(),
            "semesters" => self.semesters = list(),
            "timezone" => self.timezone = value.to_string(),
            other => {
                return Err(IrshadError::Validation(format!("حقل غير معروف: {}", other)));
            }
        }
        Ok(())
    }
}

pub struct SettingsStore {
    path: PathBuf,
    tx: watch::Sender<AppSettings>,
}

impl SettingsStore {
    /// Load settings from `data_dir`; missing or corrupt data gives the defaults
    pub fn open(data_dir: &Path) -> Self {
        let path = data_dir.join(SETTINGS_FILE);
        let settings = load_or_default(&path);
        let (tx, _rx) = watch::channel(settings);
        Self { path, tx }
    }

    pub fn current(&self) -> AppSettings {
        self.tx.borrow().clone()
    }

    /// Receiver that sees every later mutation
    pub fn subscribe(&self) -> watch::Receiver<AppSettings> {
        self.tx.subscribe()
    }

    /// Apply `change`, persist, then notify subscribers
    pub fn update<F>(&self, change: F) -> Result<AppSettings>
    where
        F: FnOnce(&mut AppSettings) -> Result<()>,
    {
        let mut next = self.current();
        change(&mut next)?;
        let json = serde_json::to_string_pretty(&next)?;
        write_atomic(&self.path, json.as_bytes())?;
        self.tx.send_replace(next.clone());
        Ok(next)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<AppSettings> {
        self.update(|s| s.set_field(key, value))
    }
}

fn load_or_default(path: &Path) -> AppSettings {
    if !path.exists() {
        return AppSettings::default();
    }
    let parsed = std::fs::read_to_string(path)
        .map_err(IrshadError::from)
        .and_then(|c| serde_json::from_str::<AppSettings>(&c).map_err(IrshadError::from));
    match parsed {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("settings {} unreadable, using defaults: {}", path.display(), e);
            AppSettings::default()
        }
    }
}
