//! Configuration loading and management for the payroll engine.
//!
//! This module loads jurisdiction metadata and dated rate tables from YAML
//! files. Tax rates are configuration values handed to the calculator, never
//! process-wide constants.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/ee").unwrap();
//! println!("Loaded jurisdiction: {}", config.jurisdiction().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{JurisdictionMetadata, RateSchedule, RateTable};
