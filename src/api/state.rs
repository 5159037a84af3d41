//! Application state for the payroll engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::models::{EmployeeDirectory, InMemoryDirectory};

/// Shared application state.
///
/// Holds the statutory configuration, loaded once at startup, and the
/// directory used to resolve employee ids in batch requests.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
    directory: Arc<dyn EmployeeDirectory>,
}

impl AppState {
    /// Creates a new application state with an empty employee directory.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            config: Arc::new(config),
            directory: Arc::new(InMemoryDirectory::new()),
        }
    }

    /// Replaces the employee directory.
    pub fn with_directory(mut self, directory: Arc<dyn EmployeeDirectory>) -> Self {
        self.directory = directory;
        self
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the employee directory.
    pub fn directory(&self) -> &dyn EmployeeDirectory {
        self.directory.as_ref()
    }
}
