//! Vacation pay.
//!
//! Vacation days are paid at the daily salary (monthly salary / 30) plus the
//! constitutional one-third bonus. Up to ten days may be sold back to the
//! employer (abono pecuniário) and are paid at the daily salary without the
//! bonus.

use std::time::Instant;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::StatutoryConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditTrace, CalculationDetails, CalculationKind, CalculationResult,
    EmployeeCompensationInput, VacationDetails,
};

use super::levies::{apply_levies, next_step, record_net_pay};
use super::{elapsed_us, round_money};

const VACATION_LEGAL_REF: &str = "CF art. 7 XVII; CLT art. 130";
const PECUNIARY_LEGAL_REF: &str = "CLT art. 143";

const DAYS_IN_MONTH: u32 = 30;
const DAYS_IN_YEAR: u32 = 365;
const MAX_VACATION_DAYS: u32 = 30;
const MAX_PECUNIARY_DAYS: u32 = 10;

/// Parameters of a vacation calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationParams {
    /// Selects the statutory tables and anchors the entitlement count.
    pub reference_date: NaiveDate,
    /// Days of vacation taken (1 to 30).
    pub vacation_days: u32,
    /// Days sold back to the employer (0 to 10).
    #[serde(default)]
    pub pecuniary_days: u32,
    /// Whether the sold days are paid in this calculation.
    #[serde(default)]
    pub include_pecuniary: bool,
}

impl VacationParams {
    fn validate(&self) -> EngineResult<()> {
        if !(1..=MAX_VACATION_DAYS).contains(&self.vacation_days) {
            return Err(EngineError::invalid_input(
                "vacation_days",
                format!(
                    "must be between 1 and {}, got {}",
                    MAX_VACATION_DAYS, self.vacation_days
                ),
            ));
        }
        if self.pecuniary_days > MAX_PECUNIARY_DAYS {
            return Err(EngineError::invalid_input(
                "pecuniary_days",
                format!(
                    "must be between 0 and {}, got {}",
                    MAX_PECUNIARY_DAYS, self.pecuniary_days
                ),
            ));
        }
        Ok(())
    }
}

/// Vacation entitlement earned up to `reference_date`.
///
/// Returns `(worked_days, proportional_days)`. Employees admitted in the
/// reference year count the days since admission; everyone else counts a
/// full year. Thirty days of vacation accrue per 365 days worked.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] if the admission is after the
/// reference date.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::proportional_vacation_days;
/// use chrono::NaiveDate;
///
/// let admitted = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let reference = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
/// assert_eq!(proportional_vacation_days(admitted, reference).unwrap(), (184, 15));
/// ```
pub fn proportional_vacation_days(
    admission_date: NaiveDate,
    reference_date: NaiveDate,
) -> EngineResult<(u32, u32)> {
    if admission_date > reference_date {
        return Err(EngineError::invalid_input(
            "admission_date",
            format!(
                "admitted on {} after the reference date {}",
                admission_date, reference_date
            ),
        ));
    }

    let worked_days = if admission_date.year() == reference_date.year() {
        let days = (reference_date - admission_date).num_days();
        u32::try_from(days).unwrap_or(DAYS_IN_YEAR).min(DAYS_IN_YEAR)
    } else {
        DAYS_IN_YEAR
    };
    let proportional = (worked_days * MAX_VACATION_DAYS / DAYS_IN_YEAR).min(MAX_VACATION_DAYS);

    Ok((worked_days, proportional))
}

/// Computes vacation pay for one employee.
///
/// # Errors
///
/// - [`EngineError::InvalidInput`] for an invalid employee, vacation days
///   outside 1..=30, pecuniary days outside 0..=10, or an admission after
///   the reference date.
/// - [`EngineError::TableNotFound`] when no tables are in force on the
///   reference date.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::{VacationParams, compute_vacation};
/// use payroll_engine::config::ConfigLoader;
/// use payroll_engine::models::EmployeeCompensationInput;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("config/br").unwrap();
/// let input = EmployeeCompensationInput {
///     employee_id: "emp_003".to_string(),
///     employee_name: "Beatriz Costa".to_string(),
///     admission_date: NaiveDate::from_ymd_opt(2022, 2, 1).unwrap(),
///     base_salary: Decimal::new(3000, 0),
///     dependent_count: 0,
/// };
/// let params = VacationParams {
///     reference_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
///     vacation_days: 30,
///     pecuniary_days: 0,
///     include_pecuniary: false,
/// };
///
/// let result = compute_vacation(&input, &params, loader.config()).unwrap();
/// assert_eq!(result.gross_value, Decimal::new(4000, 0));
/// ```
pub fn compute_vacation(
    input: &EmployeeCompensationInput,
    params: &VacationParams,
    config: &StatutoryConfig,
) -> EngineResult<CalculationResult> {
    let start = Instant::now();
    input.validate()?;
    params.validate()?;
    let (worked_days, proportional_days) =
        proportional_vacation_days(input.admission_date, params.reference_date)?;
    let tables = config.tables_for(params.reference_date)?;

    let salary = input.base_salary;
    let month = Decimal::from(DAYS_IN_MONTH);
    let daily_salary = round_money(salary / month);
    let vacation_value = round_money(salary * Decimal::from(params.vacation_days) / month);
    let constitutional_third = round_money(vacation_value / Decimal::from(3));

    let mut trace = AuditTrace::default();
    trace.steps.push(AuditStep {
        step_number: next_step(&trace),
        rule_id: "vacation_pay".to_string(),
        rule_name: "Vacation Pay".to_string(),
        legal_ref: VACATION_LEGAL_REF.to_string(),
        input: serde_json::json!({
            "base_salary": salary.to_string(),
            "vacation_days": params.vacation_days,
            "admission_date": input.admission_date.to_string()
        }),
        output: serde_json::json!({
            "daily_salary": daily_salary.to_string(),
            "vacation_value": vacation_value.to_string(),
            "constitutional_third": constitutional_third.to_string(),
            "worked_days": worked_days,
            "proportional_days": proportional_days
        }),
        reasoning: format!(
            "{} day(s) at R$ {}/day = R$ {}, plus one third R$ {}; {} day(s) earned this year",
            params.vacation_days, daily_salary, vacation_value, constitutional_third, proportional_days
        ),
    });

    let (pecuniary_days, pecuniary_allowance) = if params.include_pecuniary {
        let allowance = round_money(salary * Decimal::from(params.pecuniary_days) / month);
        trace.steps.push(AuditStep {
            step_number: next_step(&trace),
            rule_id: "pecuniary_allowance".to_string(),
            rule_name: "Pecuniary Allowance".to_string(),
            legal_ref: PECUNIARY_LEGAL_REF.to_string(),
            input: serde_json::json!({
                "pecuniary_days": params.pecuniary_days,
                "daily_salary": daily_salary.to_string()
            }),
            output: serde_json::json!({
                "pecuniary_allowance": allowance.to_string()
            }),
            reasoning: format!(
                "{} day(s) sold at R$ {}/day = R$ {}",
                params.pecuniary_days, daily_salary, allowance
            ),
        });
        (params.pecuniary_days, allowance)
    } else {
        (0, Decimal::ZERO)
    };

    let gross = vacation_value + constitutional_third + pecuniary_allowance;
    let levies = apply_levies(
        gross,
        input.dependent_count,
        tables,
        config.inss_ceiling(),
        &mut trace,
    );
    let deductions = levies.deductions();
    record_net_pay(gross, &deductions, &mut trace);

    let details = VacationDetails {
        reference_date: params.reference_date,
        vacation_days: params.vacation_days,
        pecuniary_days,
        daily_salary,
        vacation_value,
        constitutional_third,
        pecuniary_allowance,
        worked_days,
        proportional_days,
    };

    trace.duration_us = elapsed_us(start);

    Ok(
        CalculationResult::pending(CalculationKind::Vacation, input).complete(
            gross,
            deductions,
            CalculationDetails::Vacation(details),
            trace,
        ),
    )
}
