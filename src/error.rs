//! Error types for the payroll calculation engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while loading statutory tables
//! or computing payroll figures.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the payroll calculation engine.
///
/// Input errors are per-calculation and are captured per entry by the
/// batch runner. Configuration errors are raised once, at load time.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::InvalidInput {
///     field: "base_salary".to_string(),
///     message: "must be greater than zero".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Invalid input 'base_salary': must be greater than zero"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A bracket table is empty, misordered or has gaps between brackets.
    #[error("Invalid bracket table '{table}': {message}")]
    InvalidBracketTable {
        /// The table that failed validation (e.g. "inss").
        table: String,
        /// A description of the defect.
        message: String,
    },

    /// A labour constant in `statutory.yaml` is out of range.
    #[error("Invalid labour rule '{field}': {message}")]
    InvalidLaborRule {
        /// The offending constant (e.g. "monthly_hours_divisor").
        field: String,
        /// A description of the defect.
        message: String,
    },

    /// No statutory table set is effective on the requested date.
    #[error("No statutory tables effective on {date}")]
    TableNotFound {
        /// The date for which tables were requested.
        date: NaiveDate,
    },

    /// A calculation input was missing or out of range.
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for building an [`EngineError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
