//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading jurisdiction
//! rate tables from YAML files.

use chrono::NaiveDate;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{JurisdictionMetadata, RateSchedule, RateTable};

/// Loads and provides access to payroll tax configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory
/// and provides methods to query the rate table in force on a date.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/ee/
/// ├── jurisdiction.yaml   # Jurisdiction metadata
/// └── rates/
///     └── 2025-01-01.yaml # Rates effective from this date
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/ee").unwrap();
///
/// let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// let rates = loader.rate_table_for(date).unwrap();
/// println!("Income tax: {}", rates.income_tax_rate);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    jurisdiction: JurisdictionMetadata,
    schedule: RateSchedule,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - The rates directory holds no rate files
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let jurisdiction =
            Self::load_yaml::<JurisdictionMetadata>(&path.join("jurisdiction.yaml"))?;
        let tables = Self::load_rates(&path.join("rates"))?;

        tracing::debug!(
            jurisdiction = %jurisdiction.code,
            rate_tables = tables.len(),
            "Loaded payroll configuration"
        );

        Ok(Self {
            jurisdiction,
            schedule: RateSchedule::new(tables),
        })
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

    /// Loads all rate files from the rates directory.
    fn load_rates(rates_dir: &Path) -> EngineResult<Vec<RateTable>> {
        let rates_dir_str = rates_dir.display().to_string();

        let entries = fs::read_dir(rates_dir).map_err(|_| EngineError::ConfigNotFound {
            path: rates_dir_str.clone(),
        })?;

        let mut tables = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: rates_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                tables.push(Self::load_yaml::<RateTable>(&path)?);
            }
        }

        if tables.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no rate files found)", rates_dir_str),
            });
        }

        Ok(tables)
    }

    /// Returns the jurisdiction metadata.
    pub fn jurisdiction(&self) -> &JurisdictionMetadata {
        &self.jurisdiction
    }

    /// Returns the full rate schedule.
    pub fn schedule(&self) -> &RateSchedule {
        &self.schedule
    }

    /// Gets the rate table in force on a given date.
    pub fn rate_table_for(&self, date: NaiveDate) -> EngineResult<&RateTable> {
        self.schedule.rate_table_for(date)
    }
}
