//! Employee compensation input.
//!
//! This module defines the read-only record every calculator consumes:
//! who the employee is, when they were admitted, what they earn and how
//! many dependents they declare for income tax.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Compensation data for one employee, as supplied by the upstream data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeCompensationInput {
    /// Unique identifier for the employee.
    pub employee_id: String,
    /// The employee's display name.
    pub employee_name: String,
    /// The date the employee was admitted.
    pub admission_date: NaiveDate,
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// Number of dependents declared for IRRF purposes.
    #[serde(default)]
    pub dependent_count: u32,
}

impl EmployeeCompensationInput {
    /// Checks the fields every calculator relies on.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::EmployeeCompensationInput;
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let input = EmployeeCompensationInput {
    ///     employee_id: "emp_001".to_string(),
    ///     employee_name: "João Silva".to_string(),
    ///     admission_date: NaiveDate::from_ymd_opt(2020, 1, 15).unwrap(),
    ///     base_salary: Decimal::new(500000, 2),
    ///     dependent_count: 2,
    /// };
    /// assert!(input.validate().is_ok());
    /// ```
    pub fn validate(&self) -> EngineResult<()> {
        if self.employee_id.trim().is_empty() {
            return Err(EngineError::invalid_input(
                "employee_id",
                "employee not identified",
            ));
        }
        if self.base_salary <= Decimal::ZERO {
            return Err(EngineError::invalid_input(
                "base_salary",
                format!("must be greater than zero, got {}", self.base_salary),
            ));
        }
        Ok(())
    }
}
