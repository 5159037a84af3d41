//! Request types for the payroll engine API.
//!
//! Single-employee requests carry the employee record next to the
//! calculator's parameters, flattened into one JSON object.

use serde::{Deserialize, Serialize};

use crate::calculation::{CalculationRequest, OvertimeParams, TaxParams, VacationParams};
use crate::models::{EmployeeCompensationInput, PaymentMode};

/// Request body for `POST /taxes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxRequest {
    /// The employee to calculate for.
    pub employee: EmployeeCompensationInput,
    /// Withholding parameters.
    #[serde(flatten)]
    pub params: TaxParams,
}

/// Request body for `POST /thirteenth`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThirteenthRequest {
    /// The employee to calculate for.
    pub employee: EmployeeCompensationInput,
    /// The year the 13th salary refers to.
    pub reference_year: i32,
    /// Payout mode, two installments by default.
    #[serde(default)]
    pub payment_mode: PaymentMode,
}

/// Request body for `POST /vacation`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacationRequest {
    /// The employee to calculate for.
    pub employee: EmployeeCompensationInput,
    /// Vacation parameters.
    #[serde(flatten)]
    pub params: VacationParams,
}

/// Request body for `POST /overtime`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OvertimeRequest {
    /// The employee to calculate for.
    pub employee: EmployeeCompensationInput,
    /// Overtime parameters.
    #[serde(flatten)]
    pub params: OvertimeParams,
}

/// Request body for `POST /batch`.
///
/// Employees are given either inline or as ids resolved through the
/// server's employee directory, not both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    /// The calculator to run and its parameters.
    pub calculation: CalculationRequest,
    /// Employee records to calculate for.
    #[serde(default)]
    pub employees: Vec<EmployeeCompensationInput>,
    /// Employee ids to look up in the directory.
    #[serde(default)]
    pub employee_ids: Option<Vec<String>>,
}
