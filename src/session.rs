//! The state one invocation works on: a loaded export and its KPI settings.

use std::path::Path;

use chrono::NaiveDateTime;

use crate::aggregate::{self, KpiSettings, Kpis};
use crate::cache::Cache;
use crate::config::Config;
use crate::error::{BugdashError, Result};
use crate::filter;
use crate::loader::{self, LoadOptions};
use crate::types::{Dataset, FilterCriteria, IssueView};

/// How a session obtains its dataset.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenOptions {
    pub use_cache: bool,
    pub require_issue_type: bool,
}

pub struct Session {
    dataset: Dataset,
    settings: KpiSettings,
}

impl Session {
    /// Load `path`, reusing a cached parse of identical bytes when allowed.
    pub fn open(path: &Path, config: &Config, options: OpenOptions) -> Result<Self> {
        let load_options = config.load_options(options.require_issue_type);

        let dataset = if options.use_cache {
            let bytes = std::fs::read(path).map_err(|source| BugdashError::FileRead {
                path: path.display().to_string(),
                source,
            })?;
            Self::load_cached(&bytes, &load_options)?
        } else {
            loader::load_file(path, &load_options)?
        };

        if dataset.is_empty() {
            log::warn!("{} has a header but no issues", path.display());
        }

        Ok(Self::new(dataset, config.kpi_settings()))
    }

    fn load_cached(bytes: &[u8], options: &LoadOptions) -> Result<Dataset> {
        let Some(cache) = Cache::open() else {
            return loader::load_bytes(bytes, options);
        };
        let key = Cache::key(bytes, options);

        if let Some(dataset) = cache.get(&key) {
            log::debug!("cache hit for {key}");
            return Ok(dataset);
        }

        log::debug!("cache miss for {key}");
        let dataset = loader::load_bytes(bytes, options)?;
        cache.insert(&key, &dataset);
        Ok(dataset)
    }

    pub fn new(dataset: Dataset, settings: KpiSettings) -> Self {
        Self { dataset, settings }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn settings(&self) -> &KpiSettings {
        &self.settings
    }

    pub fn filtered(&self, criteria: &FilterCriteria) -> IssueView<'_> {
        filter::apply(&self.dataset.view(), criteria)
    }

    pub fn kpis(&self, view: &IssueView, anchor: NaiveDateTime) -> Kpis {
        aggregate::kpis(view, &self.settings, anchor)
    }
}
