//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading statutory
//! payroll configuration from YAML files.

use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};

use super::types::{StatutoryConfig, StatutoryFile, StatutoryMetadata, StatutoryTables};

/// Loads and provides access to statutory payroll configuration.
///
/// # Directory Structure
///
/// ```text
/// config/br/
/// ├── statutory.yaml       # Metadata, INSS ceiling policy, labour constants
/// └── tables/
///     └── 2024-01-01.yaml  # INSS/IRRF/FGTS tables effective from this date
/// ```
///
/// Every table file is validated while loading. A malformed table is a
/// deployment defect, so loading fails instead of deferring the error to
/// individual calculations.
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/br").unwrap();
/// let date = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
/// let tables = loader.tables_for(date).unwrap();
/// println!("IRRF dependent deduction: R$ {}", tables.irrf.dependent_deduction);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: StatutoryConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - Any bracket table fails validation
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let statutory_path = path.join("statutory.yaml");
        let statutory = Self::load_yaml::<StatutoryFile>(&statutory_path)?;

        let tables_dir = path.join("tables");
        let tables = Self::load_tables(&tables_dir)?;
        let table_count = tables.len();

        let config = StatutoryConfig::new(
            statutory.metadata,
            statutory.inss_ceiling,
            statutory.labor,
            tables,
        )?;

        info!(
            path = %path.display(),
            version = %config.metadata().version,
            table_sets = table_count,
            inss_ceiling = ?config.inss_ceiling(),
            "Loaded statutory configuration"
        );

        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all table files from the tables directory.
    fn load_tables(tables_dir: &Path) -> EngineResult<Vec<StatutoryTables>> {
        let tables_dir_str = tables_dir.display().to_string();

        if !tables_dir.exists() {
            return Err(EngineError::ConfigNotFound {
                path: tables_dir_str,
            });
        }

        let entries = fs::read_dir(tables_dir).map_err(|_| EngineError::ConfigNotFound {
            path: tables_dir_str.clone(),
        })?;

        let mut tables = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: tables_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                let set = Self::load_yaml::<StatutoryTables>(&path)?;
                debug!(file = %path.display(), effective_date = %set.effective_date, "Loaded table set");
                tables.push(set);
            }
        }

        if tables.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no table files found)", tables_dir_str),
            });
        }

        Ok(tables)
    }

    /// Returns the underlying statutory configuration.
    pub fn config(&self) -> &StatutoryConfig {
        &self.config
    }

    /// Returns the rule set metadata.
    pub fn metadata(&self) -> &StatutoryMetadata {
        self.config.metadata()
    }

    /// Gets the table set effective on a given date.
    ///
    /// The most recent set whose effective date is on or before `date` wins.
    pub fn tables_for(&self, date: NaiveDate) -> EngineResult<&StatutoryTables> {
        self.config.tables_for(date)
    }
}
