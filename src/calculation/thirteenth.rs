//! 13th salary (gratificação natalina).
//!
//! Employees earn one twelfth of their monthly salary for each month worked
//! in the year. Mid-year hires are prorated from their admission month. The
//! net amount is paid at once or split into two installments.

use std::time::Instant;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::config::StatutoryConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditTrace, CalculationDetails, CalculationKind, CalculationResult,
    EmployeeCompensationInput, PaymentMode, ThirteenthDetails,
};

use super::levies::{apply_levies, next_step, record_net_pay};
use super::{elapsed_us, round_money};

const THIRTEENTH_LEGAL_REF: &str = "Lei 4.090/1962 art. 1; Lei 4.749/1965 arts. 1 e 2";

const MONTHS_IN_YEAR: u32 = 12;

/// Months counted towards the 13th salary of `reference_year`.
///
/// Counting starts at the later of the admission month and January, includes
/// that month, and runs through December. The result is clamped to 1..=12.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] if the employee was admitted after
/// the reference year. Such an admission is not clamped up to one month:
/// it earns no 13th salary for that year and is reported as bad input.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::working_months;
/// use chrono::NaiveDate;
///
/// let july_hire = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
/// assert_eq!(working_months(july_hire, 2024).unwrap(), 6);
///
/// let veteran = NaiveDate::from_ymd_opt(2019, 3, 10).unwrap();
/// assert_eq!(working_months(veteran, 2024).unwrap(), 12);
///
/// let future_hire = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
/// assert!(working_months(future_hire, 2024).is_err());
/// ```
pub fn working_months(admission_date: NaiveDate, reference_year: i32) -> EngineResult<u32> {
    if admission_date.year() > reference_year {
        return Err(EngineError::invalid_input(
            "admission_date",
            format!(
                "admitted on {} after the reference year {}",
                admission_date, reference_year
            ),
        ));
    }

    let start_month = if admission_date.year() < reference_year {
        1
    } else {
        admission_date.month()
    };

    Ok((MONTHS_IN_YEAR - start_month + 1).clamp(1, MONTHS_IN_YEAR))
}

/// Computes the 13th salary of `reference_year` for one employee.
///
/// Tables in force on December 31 of the reference year are applied. With
/// [`PaymentMode::Installments`] the first installment is half the net
/// value, rounded to cents, and the second takes the remainder so the two
/// always add up to the net value.
///
/// # Errors
///
/// - [`EngineError::InvalidInput`] for an invalid employee or an admission
///   after the reference year.
/// - [`EngineError::TableNotFound`] when no tables cover the reference year.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::compute_thirteenth;
/// use payroll_engine::config::ConfigLoader;
/// use payroll_engine::models::{EmployeeCompensationInput, PaymentMode};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("config/br").unwrap();
/// let input = EmployeeCompensationInput {
///     employee_id: "emp_002".to_string(),
///     employee_name: "Carlos Lima".to_string(),
///     admission_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
///     base_salary: Decimal::new(4000, 0),
///     dependent_count: 0,
/// };
///
/// let result = compute_thirteenth(&input, 2024, PaymentMode::Installments, loader.config()).unwrap();
/// assert_eq!(result.gross_value, Decimal::new(2000, 0));
/// ```
pub fn compute_thirteenth(
    input: &EmployeeCompensationInput,
    reference_year: i32,
    payment_mode: PaymentMode,
    config: &StatutoryConfig,
) -> EngineResult<CalculationResult> {
    let start = Instant::now();
    input.validate()?;

    let year_end = NaiveDate::from_ymd_opt(reference_year, 12, 31).ok_or_else(|| {
        EngineError::invalid_input(
            "reference_year",
            format!("{} is not a valid year", reference_year),
        )
    })?;
    let months = working_months(input.admission_date, reference_year)?;
    let tables = config.tables_for(year_end)?;

    let mut trace = AuditTrace::default();
    let gross = round_money(
        input.base_salary * Decimal::from(months) / Decimal::from(MONTHS_IN_YEAR),
    );
    trace.steps.push(AuditStep {
        step_number: next_step(&trace),
        rule_id: "thirteenth_proration".to_string(),
        rule_name: "13th Salary Proration".to_string(),
        legal_ref: THIRTEENTH_LEGAL_REF.to_string(),
        input: serde_json::json!({
            "base_salary": input.base_salary.to_string(),
            "admission_date": input.admission_date.to_string(),
            "reference_year": reference_year
        }),
        output: serde_json::json!({
            "working_months": months,
            "gross_value": gross.to_string()
        }),
        reasoning: format!(
            "{} month(s) worked in {}: R$ {} x {}/12 = R$ {}",
            months, reference_year, input.base_salary, months, gross
        ),
    });

    let levies = apply_levies(
        gross,
        input.dependent_count,
        tables,
        config.inss_ceiling(),
        &mut trace,
    );
    let deductions = levies.deductions();
    record_net_pay(gross, &deductions, &mut trace);

    let net = gross - deductions.employee_total();
    let (first, second) = match payment_mode {
        PaymentMode::Installments => {
            let first = round_money(net / Decimal::TWO);
            (first, net - first)
        }
        PaymentMode::Full => (net, Decimal::ZERO),
    };
    trace.steps.push(AuditStep {
        step_number: next_step(&trace),
        rule_id: "thirteenth_installments".to_string(),
        rule_name: "13th Salary Installments".to_string(),
        legal_ref: THIRTEENTH_LEGAL_REF.to_string(),
        input: serde_json::json!({
            "net_value": net.to_string(),
            "payment_mode": payment_mode
        }),
        output: serde_json::json!({
            "first_installment": first.to_string(),
            "second_installment": second.to_string()
        }),
        reasoning: match payment_mode {
            PaymentMode::Installments => format!(
                "Net R$ {} split into R$ {} and R$ {}",
                net, first, second
            ),
            PaymentMode::Full => format!("Net R$ {} paid in a single installment", net),
        },
    });

    let details = ThirteenthDetails {
        reference_year,
        admission_date: input.admission_date,
        working_months: months,
        base_salary: input.base_salary,
        payment_mode,
        first_installment: first,
        second_installment: second,
        inss_bracket: levies.inss.bracket_label.clone(),
        irrf_bracket: levies.irrf.bracket_label.clone(),
    };

    trace.duration_us = elapsed_us(start);

    Ok(
        CalculationResult::pending(CalculationKind::Thirteenth, input).complete(
            gross,
            deductions,
            CalculationDetails::Thirteenth(details),
            trace,
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn config() -> StatutoryConfig {
        ConfigLoader::load("config/br").unwrap().config().clone()
    }

    fn create_input(salary: &str, admission: NaiveDate) -> EmployeeCompensationInput {
        EmployeeCompensationInput {
            employee_id: "emp_002".to_string(),
            employee_name: "Carlos Lima".to_string(),
            admission_date: admission,
            base_salary: dec(salary),
            dependent_count: 0,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn details(result: &CalculationResult) -> &ThirteenthDetails {
        match &result.details {
            Some(CalculationDetails::Thirteenth(d)) => d,
            other => panic!("expected thirteenth details, got {:?}", other),
        }
    }

    #[test]
    fn test_working_months() {
        assert_eq!(working_months(date(2020, 5, 4), 2024).unwrap(), 12);
        assert_eq!(working_months(date(2024, 1, 1), 2024).unwrap(), 12);
        assert_eq!(working_months(date(2024, 7, 1), 2024).unwrap(), 6);
        assert_eq!(working_months(date(2024, 7, 31), 2024).unwrap(), 6);
        assert_eq!(working_months(date(2024, 12, 20), 2024).unwrap(), 1);
    }

    #[test]
    fn test_admission_after_reference_year() {
        let err = working_months(date(2025, 2, 1), 2024).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { ref field, .. } if field == "admission_date"));
    }

    #[test]
    fn test_full_year_gross_equals_salary() {
        let input = create_input("3000.00", date(2019, 3, 10));
        let result = compute_thirteenth(&input, 2024, PaymentMode::Installments, &config()).unwrap();

        assert_eq!(details(&result).working_months, 12);
        assert_eq!(result.gross_value, dec("3000.00"));
        // INSS 99.00 + 112.6161 + 51.4452 = 263.0613
        assert_eq!(result.deductions.inss.value, dec("263.06"));
        // IRRF 53.59875 + 26.0025 = 79.60125
        assert_eq!(result.deductions.irrf.value, dec("79.60"));
        assert_eq!(result.net_value, dec("2657.34"));
        assert_eq!(details(&result).first_installment, dec("1328.67"));
        assert_eq!(details(&result).second_installment, dec("1328.67"));
    }

    #[test]
    fn test_july_hire_is_prorated() {
        let input = create_input("4000.00", date(2024, 7, 1));
        let result = compute_thirteenth(&input, 2024, PaymentMode::Installments, &config()).unwrap();

        assert_eq!(details(&result).working_months, 6);
        assert_eq!(result.gross_value, dec("2000.00"));
        assert_eq!(result.deductions.inss.value, dec("160.20"));
        assert_eq!(result.net_value, dec("1839.80"));
    }

    #[test]
    fn test_full_payment_mode() {
        let input = create_input("4000.00", date(2024, 7, 1));
        let result = compute_thirteenth(&input, 2024, PaymentMode::Full, &config()).unwrap();

        assert_eq!(details(&result).first_installment, result.net_value);
        assert_eq!(details(&result).second_installment, Decimal::ZERO);
    }

    #[test]
    fn test_fgts_reported_not_withheld() {
        let input = create_input("4000.00", date(2024, 7, 1));
        let result = compute_thirteenth(&input, 2024, PaymentMode::Full, &config()).unwrap();
        assert_eq!(result.deductions.fgts.value, dec("160.00"));
        assert_eq!(result.deductions.employee_total(), dec("160.20"));
    }

    #[test]
    fn test_audit_trace_starts_with_proration() {
        let input = create_input("4000.00", date(2024, 7, 1));
        let result = compute_thirteenth(&input, 2024, PaymentMode::Installments, &config()).unwrap();
        let steps = &result.audit_trace.steps;

        assert_eq!(steps[0].rule_id, "thirteenth_proration");
        assert_eq!(steps[0].output["working_months"], 6);
        assert_eq!(steps.last().unwrap().rule_id, "thirteenth_installments");
        assert_eq!(steps.len(), 6);
    }

    #[test]
    fn test_year_without_tables() {
        let input = create_input("4000.00", date(2020, 7, 1));
        let err = compute_thirteenth(&input, 2023, PaymentMode::Full, &config()).unwrap_err();
        assert!(matches!(err, EngineError::TableNotFound { .. }));
    }

    proptest! {
        #[test]
        fn prop_installments_add_up_to_net(cents in 100_000i64..3_000_000, month in 1u32..=12) {
            let input = EmployeeCompensationInput {
                employee_id: "emp_p".to_string(),
                employee_name: "Prop".to_string(),
                admission_date: date(2024, month, 1),
                base_salary: Decimal::new(cents, 2),
                dependent_count: 1,
            };
            let result = compute_thirteenth(&input, 2024, PaymentMode::Installments, &config()).unwrap();
            let d = details(&result);
            prop_assert_eq!(d.first_installment + d.second_installment, result.net_value);
            prop_assert_eq!(d.working_months, 13 - month);
        }
    }
}
