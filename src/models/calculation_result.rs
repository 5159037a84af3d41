//! Calculation result models for the payroll engine.
//!
//! This module contains the [`CalculationResult`] type and its associated
//! structures: deduction lines, kind-specific details, lifecycle status and
//! the audit trace recording every rule applied.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EmployeeCompensationInput;

/// The version stamped on every result produced by this engine.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Which calculator produced a result.
///
/// # Example
///
/// ```
/// use payroll_engine::models::CalculationKind;
///
/// let json = serde_json::to_string(&CalculationKind::Thirteenth).unwrap();
/// assert_eq!(json, "\"thirteenth\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationKind {
    /// Monthly withholding (INSS, IRRF, union contribution).
    Tax,
    /// 13th salary.
    Thirteenth,
    /// Vacation pay.
    Vacation,
    /// Overtime, DSR reflex and night premium.
    Overtime,
}

/// Lifecycle of a result.
///
/// A result starts `Pending`, then becomes `Calculated` or `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationStatus {
    /// Not yet computed.
    Pending,
    /// Computed successfully.
    Calculated,
    /// Rejected because of invalid input.
    Error,
}

/// How the 13th salary is paid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    /// Paid at once.
    Full,
    /// Paid in two halves.
    #[default]
    Installments,
}

/// One levy applied to a base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionLine {
    /// The amount the levy was computed on.
    pub base: Decimal,
    /// The effective rate, as a fraction.
    pub rate: Decimal,
    /// The levied amount.
    pub value: Decimal,
}

impl DeductionLine {
    /// A line that levies nothing on `base`.
    pub fn zero(base: Decimal) -> Self {
        Self {
            base,
            rate: Decimal::ZERO,
            value: Decimal::ZERO,
        }
    }
}

/// All levies of a calculation.
///
/// `fgts` is an employer deposit. It is reported here for completeness but
/// is never part of [`Deductions::employee_total`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deductions {
    /// Social security contribution withheld from the employee.
    pub inss: DeductionLine,
    /// Income tax withheld from the employee.
    pub irrf: DeductionLine,
    /// Employer severance fund deposit.
    pub fgts: DeductionLine,
    /// Union contribution, when the calculation considers one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub union_contribution: Option<DeductionLine>,
    /// Other caller-supplied deductions.
    #[serde(default)]
    pub other: Decimal,
}

impl Deductions {
    /// Deductions with every line at zero.
    pub fn none() -> Self {
        Self {
            inss: DeductionLine::zero(Decimal::ZERO),
            irrf: DeductionLine::zero(Decimal::ZERO),
            fgts: DeductionLine::zero(Decimal::ZERO),
            union_contribution: None,
            other: Decimal::ZERO,
        }
    }

    /// Sum of everything withheld from the employee's pay.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::{DeductionLine, Deductions};
    /// use rust_decimal::Decimal;
    ///
    /// let mut deductions = Deductions::none();
    /// deductions.inss.value = Decimal::new(16020, 2);
    /// deductions.fgts.value = Decimal::new(16000, 2);
    /// assert_eq!(deductions.employee_total(), Decimal::new(16020, 2));
    /// ```
    pub fn employee_total(&self) -> Decimal {
        let union = self
            .union_contribution
            .as_ref()
            .map_or(Decimal::ZERO, |u| u.value);
        self.inss.value + self.irrf.value + union + self.other
    }

    /// Employer charges (FGTS) that do not reduce the employee's pay.
    pub fn employer_charges(&self) -> Decimal {
        self.fgts.value
    }
}

/// Details of a monthly withholding calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxDetails {
    /// The date whose tables were applied.
    pub reference_date: NaiveDate,
    /// Label of the highest INSS bracket reached.
    pub inss_bracket: Option<String>,
    /// Whether the salary exceeded the INSS ceiling under the capped policy.
    pub inss_ceiling_applied: bool,
    /// Label of the highest IRRF bracket reached.
    pub irrf_bracket: Option<String>,
    /// Number of dependents considered for IRRF.
    pub dependent_count: u32,
    /// Total dependent deduction subtracted from the IRRF base.
    pub dependent_deduction: Decimal,
}

/// Details of a 13th salary calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThirteenthDetails {
    /// The year the 13th salary refers to.
    pub reference_year: i32,
    /// The employee's admission date.
    pub admission_date: NaiveDate,
    /// Months counted towards the entitlement (1 to 12).
    pub working_months: u32,
    /// Monthly base salary the entitlement is prorated from.
    pub base_salary: Decimal,
    /// Payout mode.
    pub payment_mode: PaymentMode,
    /// First installment (the whole net value when paid in full).
    pub first_installment: Decimal,
    /// Second installment (zero when paid in full).
    pub second_installment: Decimal,
    /// Label of the highest INSS bracket reached.
    pub inss_bracket: Option<String>,
    /// Label of the highest IRRF bracket reached.
    pub irrf_bracket: Option<String>,
}

/// Details of a vacation calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationDetails {
    /// The date whose tables were applied and against which entitlement was measured.
    pub reference_date: NaiveDate,
    /// Vacation days taken.
    pub vacation_days: u32,
    /// Vacation days converted to cash (zero when not requested).
    pub pecuniary_days: u32,
    /// Monthly salary divided by 30.
    pub daily_salary: Decimal,
    /// Pay for the vacation days.
    pub vacation_value: Decimal,
    /// Constitutional one-third bonus over the vacation pay.
    pub constitutional_third: Decimal,
    /// Cash paid for converted days.
    pub pecuniary_allowance: Decimal,
    /// Days worked in the reference year.
    pub worked_days: u32,
    /// Proportional vacation entitlement earned in the reference year.
    pub proportional_days: u32,
}

/// Details of an overtime calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeDetails {
    /// First day of the month the records belong to.
    pub period: NaiveDate,
    /// Monthly salary divided by the monthly hours divisor.
    pub hourly_rate: Decimal,
    /// Days with time records.
    pub days_worked: u32,
    /// Contracted hours over the days worked.
    pub regular_hours: Decimal,
    /// Hours worked beyond the contracted daily journey.
    pub overtime_hours: Decimal,
    /// Overtime pay, premium included.
    pub overtime_value: Decimal,
    /// Rest days considered for the DSR reflex.
    pub rest_days: u32,
    /// Paid weekly rest reflex of the overtime.
    pub dsr_value: Decimal,
    /// Hours worked inside the night window.
    pub night_hours: Decimal,
    /// Night-work premium.
    pub night_value: Decimal,
}

/// Kind-specific part of a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationDetails {
    /// Monthly withholding details.
    Tax(TaxDetails),
    /// 13th salary details.
    Thirteenth(ThirteenthDetails),
    /// Vacation details.
    Vacation(VacationDetails),
    /// Overtime details.
    Overtime(OvertimeDetails),
}

impl CalculationDetails {
    /// The calculator kind these details belong to.
    pub fn kind(&self) -> CalculationKind {
        match self {
            CalculationDetails::Tax(_) => CalculationKind::Tax,
            CalculationDetails::Thirteenth(_) => CalculationKind::Thirteenth,
            CalculationDetails::Vacation(_) => CalculationKind::Vacation,
            CalculationDetails::Overtime(_) => CalculationKind::Overtime,
        }
    }
}

/// A single step in the audit trace recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Reference to the legislation behind this rule.
    pub legal_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings flag conditions that don't prevent calculation but may
/// require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// The result of one calculation for one employee.
///
/// Results are built with [`CalculationResult::pending`] and finished with
/// either [`CalculationResult::complete`] or [`CalculationResult::fail`].
///
/// # Example
///
/// ```
/// use payroll_engine::models::{
///     AuditTrace, CalculationKind, CalculationStatus, CalculationResult,
///     EmployeeCompensationInput,
/// };
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let input = EmployeeCompensationInput {
///     employee_id: "emp_001".to_string(),
///     employee_name: "Ana Oliveira".to_string(),
///     admission_date: NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
///     base_salary: Decimal::new(-100, 0),
///     dependent_count: 0,
/// };
///
/// let result = CalculationResult::pending(CalculationKind::Tax, &input);
/// assert_eq!(result.status, CalculationStatus::Pending);
///
/// let result = result.fail("base_salary must be greater than zero");
/// assert_eq!(result.status, CalculationStatus::Error);
/// assert_eq!(result.net_value, Decimal::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// The calculator that produced this result.
    pub kind: CalculationKind,
    /// The ID of the employee the calculation is for.
    pub employee_id: String,
    /// The employee's display name.
    pub employee_name: String,
    /// Lifecycle status.
    pub status: CalculationStatus,
    /// Taxable amount before deductions.
    pub gross_value: Decimal,
    /// Levies applied to the gross value.
    pub deductions: Deductions,
    /// Gross value minus the employee-side deductions.
    pub net_value: Decimal,
    /// Kind-specific figures; absent on error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<CalculationDetails>,
    /// Why the calculation failed; absent on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}

impl CalculationResult {
    /// Starts a new result for `input`.
    pub fn pending(kind: CalculationKind, input: &EmployeeCompensationInput) -> Self {
        Self::pending_for(kind, &input.employee_id, &input.employee_name)
    }

    /// Starts a new result for an employee known only by id and name.
    pub fn pending_for(kind: CalculationKind, employee_id: &str, employee_name: &str) -> Self {
        Self {
            calculation_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
            kind,
            employee_id: employee_id.to_string(),
            employee_name: employee_name.to_string(),
            status: CalculationStatus::Pending,
            gross_value: Decimal::ZERO,
            deductions: Deductions::none(),
            net_value: Decimal::ZERO,
            details: None,
            error: None,
            audit_trace: AuditTrace::default(),
        }
    }

    /// Marks the result as calculated.
    ///
    /// `net_value` is derived here, as gross minus the employee-side
    /// deductions, so it can never disagree with the deduction lines.
    pub fn complete(
        mut self,
        gross_value: Decimal,
        deductions: Deductions,
        details: CalculationDetails,
        audit_trace: AuditTrace,
    ) -> Self {
        self.net_value = gross_value - deductions.employee_total();
        self.gross_value = gross_value;
        self.deductions = deductions;
        self.details = Some(details);
        self.audit_trace = audit_trace;
        self.status = CalculationStatus::Calculated;
        self.error = None;
        self
    }

    /// Marks the result as failed.
    pub fn fail(mut self, message: impl Into<String>) -> Self {
        self.status = CalculationStatus::Error;
        self.error = Some(message.into());
        self.gross_value = Decimal::ZERO;
        self.deductions = Deductions::none();
        self.net_value = Decimal::ZERO;
        self.details = None;
        self
    }
}
