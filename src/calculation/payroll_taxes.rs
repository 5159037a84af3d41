//! Monthly payroll withholding.
//!
//! Computes what is withheld from one month's base salary: INSS, IRRF,
//! the union contribution when authorised and any other deductions the
//! caller supplies. FGTS is reported alongside as an employer charge.

use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::StatutoryConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditTrace, CalculationDetails, CalculationKind, CalculationResult, EmployeeCompensationInput,
    TaxDetails,
};

use super::levies::{apply_levies, next_step, record_net_pay};
use super::{compute_union_contribution, elapsed_us, round_money};

/// Union contribution settings for a withholding run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnionParams {
    /// Whether the employee authorised the contribution.
    #[serde(default)]
    pub enabled: bool,
    /// Rate in percent. Falls back to the configured default when absent.
    #[serde(default)]
    pub rate_percent: Option<Decimal>,
}

/// Parameters of a monthly withholding calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxParams {
    /// Selects the statutory tables in force.
    pub reference_date: NaiveDate,
    /// Union contribution settings.
    #[serde(default)]
    pub union: UnionParams,
    /// Other deductions withheld from pay (advances, benefits, etc.).
    #[serde(default)]
    pub other_deductions: Decimal,
}

impl TaxParams {
    fn validate(&self) -> EngineResult<()> {
        if let Some(rate) = self.union.rate_percent {
            if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
                return Err(EngineError::invalid_input(
                    "union.rate_percent",
                    format!("must be between 0 and 100, got {}", rate),
                ));
            }
        }
        if self.other_deductions < Decimal::ZERO {
            return Err(EngineError::invalid_input(
                "other_deductions",
                format!("must not be negative, got {}", self.other_deductions),
            ));
        }
        Ok(())
    }
}

/// Computes the monthly withholding for one employee.
///
/// # Errors
///
/// - [`EngineError::InvalidInput`] for an unidentified employee, a
///   non-positive salary, a union rate outside 0..=100 or negative other
///   deductions.
/// - [`EngineError::TableNotFound`] when no tables are in force on the
///   reference date.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::{TaxParams, UnionParams, compute_payroll_taxes};
/// use payroll_engine::config::ConfigLoader;
/// use payroll_engine::models::EmployeeCompensationInput;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("config/br").unwrap();
/// let input = EmployeeCompensationInput {
///     employee_id: "emp_001".to_string(),
///     employee_name: "Maria Souza".to_string(),
///     admission_date: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
///     base_salary: Decimal::new(200000, 2),
///     dependent_count: 0,
/// };
/// let params = TaxParams {
///     reference_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
///     union: UnionParams::default(),
///     other_deductions: Decimal::ZERO,
/// };
///
/// let result = compute_payroll_taxes(&input, &params, loader.config()).unwrap();
/// assert_eq!(result.deductions.inss.value, Decimal::new(16020, 2));
/// assert_eq!(result.net_value, Decimal::new(183980, 2));
/// ```
pub fn compute_payroll_taxes(
    input: &EmployeeCompensationInput,
    params: &TaxParams,
    config: &StatutoryConfig,
) -> EngineResult<CalculationResult> {
    let start = Instant::now();
    input.validate()?;
    params.validate()?;
    let tables = config.tables_for(params.reference_date)?;

    let gross = input.base_salary;
    let mut trace = AuditTrace::default();
    let levies = apply_levies(
        gross,
        input.dependent_count,
        tables,
        config.inss_ceiling(),
        &mut trace,
    );

    let mut deductions = levies.deductions();
    if params.union.enabled {
        let rate_percent = params
            .union
            .rate_percent
            .unwrap_or(config.labor().default_union_rate_percent);
        let union = compute_union_contribution(gross, rate_percent, true, next_step(&trace));
        trace.steps.push(union.audit_step);
        deductions.union_contribution = Some(union.line);
    }
    deductions.other = round_money(params.other_deductions);

    record_net_pay(gross, &deductions, &mut trace);

    let details = TaxDetails {
        reference_date: params.reference_date,
        inss_bracket: levies.inss.bracket_label.clone(),
        inss_ceiling_applied: levies.inss.ceiling_applied,
        irrf_bracket: levies.irrf.bracket_label.clone(),
        dependent_count: levies.irrf.dependent_count,
        dependent_deduction: levies.irrf.dependent_deduction,
    };

    trace.duration_us = elapsed_us(start);

    Ok(CalculationResult::pending(CalculationKind::Tax, input).complete(
        gross,
        deductions,
        CalculationDetails::Tax(details),
        trace,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigLoader, InssCeilingPolicy};
    use crate::models::CalculationStatus;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn config() -> StatutoryConfig {
        ConfigLoader::load("config/br").unwrap().config().clone()
    }

    fn create_input(salary: &str, dependents: u32) -> EmployeeCompensationInput {
        EmployeeCompensationInput {
            employee_id: "emp_001".to_string(),
            employee_name: "Maria Souza".to_string(),
            admission_date: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
            base_salary: dec(salary),
            dependent_count: dependents,
        }
    }

    fn params() -> TaxParams {
        TaxParams {
            reference_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            union: UnionParams::default(),
            other_deductions: Decimal::ZERO,
        }
    }

    #[test]
    fn test_withholding_on_2000() {
        let result = compute_payroll_taxes(&create_input("2000.00", 0), &params(), &config()).unwrap();

        assert_eq!(result.status, CalculationStatus::Calculated);
        assert_eq!(result.kind, CalculationKind::Tax);
        assert_eq!(result.gross_value, dec("2000.00"));
        assert_eq!(result.deductions.inss.value, dec("160.20"));
        assert_eq!(result.deductions.irrf.value, Decimal::ZERO);
        assert_eq!(result.deductions.fgts.value, dec("160.00"));
        assert!(result.deductions.union_contribution.is_none());
        assert_eq!(result.net_value, dec("1839.80"));
    }

    #[test]
    fn test_withholding_with_dependents() {
        // INSS 525.92, IRRF on 4620.82 = 387.96
        let result = compute_payroll_taxes(&create_input("5000.00", 2), &params(), &config()).unwrap();

        assert_eq!(result.deductions.inss.value, dec("525.92"));
        assert_eq!(result.deductions.irrf.value, dec("387.96"));
        assert_eq!(result.net_value, dec("4086.12"));

        let Some(CalculationDetails::Tax(details)) = &result.details else {
            panic!("expected tax details");
        };
        assert_eq!(details.dependent_count, 2);
        assert_eq!(details.dependent_deduction, dec("379.18"));
        assert_eq!(
            details.irrf_bracket.as_deref(),
            Some("De R$ 3.751,06 até R$ 4.664,68")
        );
    }

    #[test]
    fn test_union_and_other_deductions_reduce_net() {
        let mut params = params();
        params.union = UnionParams {
            enabled: true,
            rate_percent: None,
        };
        params.other_deductions = dec("50.00");

        let result = compute_payroll_taxes(&create_input("2000.00", 0), &params, &config()).unwrap();

        let union = result.deductions.union_contribution.as_ref().unwrap();
        assert_eq!(union.rate, dec("0.01"));
        assert_eq!(union.value, dec("20.00"));
        assert_eq!(result.deductions.other, dec("50.00"));
        // 2000 - 160.20 - 20.00 - 50.00
        assert_eq!(result.net_value, dec("1769.80"));
    }

    #[test]
    fn test_fgts_never_reduces_net() {
        let result = compute_payroll_taxes(&create_input("3000.00", 0), &params(), &config()).unwrap();
        assert_eq!(
            result.net_value,
            result.gross_value - result.deductions.inss.value - result.deductions.irrf.value
        );
        assert_eq!(result.deductions.employer_charges(), dec("240.00"));
    }

    #[test]
    fn test_ceiling_policy_from_config() {
        let capped = compute_payroll_taxes(&create_input("10000.00", 0), &params(), &config()).unwrap();
        let unbounded_config = config().with_inss_ceiling(InssCeilingPolicy::Unbounded);
        let unbounded =
            compute_payroll_taxes(&create_input("10000.00", 0), &params(), &unbounded_config).unwrap();

        assert_eq!(capped.deductions.inss.value, dec("876.97"));
        assert!(unbounded.deductions.inss.value > capped.deductions.inss.value);
        assert_eq!(capped.audit_trace.warnings.len(), 1);
        assert!(unbounded.audit_trace.warnings.is_empty());
    }

    #[test]
    fn test_audit_trace_sequence() {
        let mut params = params();
        params.union.enabled = true;
        let result = compute_payroll_taxes(&create_input("2000.00", 0), &params, &config()).unwrap();

        let ids: Vec<&str> = result
            .audit_trace
            .steps
            .iter()
            .map(|s| s.rule_id.as_str())
            .collect();
        assert_eq!(
            ids,
            vec![
                "inss_contribution",
                "irrf_withholding",
                "fgts_deposit",
                "union_contribution",
                "net_pay"
            ]
        );
    }

    #[test]
    fn test_non_positive_salary_is_rejected() {
        let err = compute_payroll_taxes(&create_input("-100", 0), &params(), &config()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { ref field, .. } if field == "base_salary"));
    }

    #[test]
    fn test_union_rate_out_of_range() {
        let mut params = params();
        params.union = UnionParams {
            enabled: true,
            rate_percent: Some(dec("150")),
        };
        let err = compute_payroll_taxes(&create_input("2000.00", 0), &params, &config()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { ref field, .. } if field == "union.rate_percent"));
    }

    #[test]
    fn test_negative_other_deductions() {
        let mut params = params();
        params.other_deductions = dec("-1");
        let err = compute_payroll_taxes(&create_input("2000.00", 0), &params, &config()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));
    }

    #[test]
    fn test_date_before_first_table() {
        let mut params = params();
        params.reference_date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let err = compute_payroll_taxes(&create_input("2000.00", 0), &params, &config()).unwrap_err();
        assert!(matches!(err, EngineError::TableNotFound { .. }));
    }

    #[test]
    fn test_params_deserialize_with_defaults() {
        let params: TaxParams = serde_json::from_str(r#"{"reference_date": "2024-05-01"}"#).unwrap();
        assert!(!params.union.enabled);
        assert_eq!(params.union.rate_percent, None);
        assert_eq!(params.other_deductions, Decimal::ZERO);
    }
}
