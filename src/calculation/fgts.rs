//! FGTS (severance fund) deposit.
//!
//! A flat percentage of gross pay paid by the employer into the employee's
//! fund. It is reported next to the withholdings but never reduces net pay.

use rust_decimal::Decimal;

use crate::config::StatutoryTables;
use crate::models::{AuditStep, DeductionLine};

use super::round_money;

/// Legislation behind the FGTS deposit.
pub const FGTS_LEGAL_REF: &str = "Lei 8.036/1990 art. 15";

/// The result of an FGTS calculation.
#[derive(Debug, Clone)]
pub struct FgtsResult {
    /// Base, flat rate and deposit.
    pub line: DeductionLine,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes the FGTS deposit on `gross_salary`.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::compute_fgts;
/// use payroll_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("config/br").unwrap();
/// let tables = loader.tables_for(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()).unwrap();
///
/// let result = compute_fgts(Decimal::new(2000, 0), tables, 1);
/// assert_eq!(result.line.value, Decimal::new(16000, 2));
/// ```
pub fn compute_fgts(gross_salary: Decimal, tables: &StatutoryTables, step_number: u32) -> FgtsResult {
    let rate = tables.fgts.rate;
    let value = if gross_salary > Decimal::ZERO {
        round_money(gross_salary * rate)
    } else {
        Decimal::ZERO
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "fgts_deposit".to_string(),
        rule_name: "FGTS Deposit".to_string(),
        legal_ref: FGTS_LEGAL_REF.to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.to_string(),
            "rate": rate.to_string()
        }),
        output: serde_json::json!({
            "value": value.to_string()
        }),
        reasoning: format!(
            "R$ {} x {}% = R$ {} (employer charge, not withheld)",
            gross_salary,
            (rate * Decimal::ONE_HUNDRED).normalize(),
            value
        ),
    };

    FgtsResult {
        line: DeductionLine {
            base: gross_salary,
            rate,
            value,
        },
        audit_step,
    }
}
