//! Configuration loading and management for the payroll engine.
//!
//! This module loads the statutory rule set from YAML files: bracket tables
//! keyed by effective date, the INSS ceiling policy and labour constants.
//! The configuration is loaded once at start-up and passed by reference into
//! every calculation.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/br").unwrap();
//! println!("Loaded rule set: {}", loader.metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    Bracket, BracketTable, FgtsRate, InssCeilingPolicy, InssTable, IrrfTable, LaborRules,
    StatutoryConfig, StatutoryFile, StatutoryMetadata, StatutoryTables,
};
