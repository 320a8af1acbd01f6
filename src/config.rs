use std::collections::BTreeSet;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::aggregate::KpiSettings;
use crate::error::{BugdashError, Result};
use crate::loader::LoadOptions;
use crate::types::DateField;

pub const CONFIG_ENV: &str = "BUGDASH_CONFIG";

#[derive(Deserialize, Serialize, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub open_statuses: Option<BTreeSet<String>>,
    pub high_priorities: Option<BTreeSet<String>>,
    pub recent_days: Option<u32>,
    pub recent_field: Option<DateField>,
    pub require_issue_type: Option<bool>,
    pub day_first: Option<bool>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            log::debug!("no config at {}, using defaults", config_path.display());
            return Ok(Config::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).map_err(|e| BugdashError::ConfigRead {
                path: config_path.clone(),
                source: e,
            })?;

        toml::from_str(&contents).map_err(|e| BugdashError::ConfigParse {
            path: config_path,
            source: e,
        })
    }

    /// Config file location, with the env var taking precedence
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }

        ProjectDirs::from("", "", "bugdash")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(BugdashError::NoConfigDir)
    }

    /// KPI settings with unset keys falling back to the defaults
    pub fn kpi_settings(&self) -> KpiSettings {
        let defaults = KpiSettings::default();
        KpiSettings {
            open_statuses: self.open_statuses.clone().unwrap_or(defaults.open_statuses),
            high_priorities: self
                .high_priorities
                .clone()
                .unwrap_or(defaults.high_priorities),
            recent_days: self.recent_days.unwrap_or(defaults.recent_days),
            recent_field: self.recent_field.unwrap_or(defaults.recent_field),
        }
    }

    /// Loader options, preferring an explicit flag over the file
    pub fn load_options(&self, require_issue_type: bool) -> LoadOptions {
        let defaults = LoadOptions::default();
        LoadOptions {
            require_issue_type: require_issue_type
                || self.require_issue_type.unwrap_or(defaults.require_issue_type),
            day_first: self.day_first.unwrap_or(defaults.day_first),
        }
    }
}
