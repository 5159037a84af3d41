//! IRRF (income tax withheld at source).
//!
//! Each declared dependent reduces the taxable base by a fixed allowance
//! before the base is resolved against the IRRF bracket table. The effective
//! rate is reported against the gross salary, i.e. the burden on gross pay.

use rust_decimal::Decimal;

use crate::config::StatutoryTables;
use crate::models::{AuditStep, DeductionLine};

use super::{resolve_brackets, round_money, round_rate};

/// Legislation behind the IRRF withholding.
pub const IRRF_LEGAL_REF: &str = "Lei 7.713/1988 art. 7; Lei 9.250/1995 art. 4";

/// The result of an IRRF calculation.
#[derive(Debug, Clone)]
pub struct IrrfResult {
    /// Adjusted base, effective rate over gross, and tax.
    pub line: DeductionLine,
    /// Label of the highest bracket reached (the lowest bracket when nothing is taxable).
    pub bracket_label: Option<String>,
    /// Number of dependents considered.
    pub dependent_count: u32,
    /// Total amount deducted for dependents.
    pub dependent_deduction: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes the IRRF withholding on `gross_salary`.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::compute_irrf;
/// use payroll_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("config/br").unwrap();
/// let tables = loader.tables_for(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()).unwrap();
///
/// // Below the exempt band: nothing withheld.
/// let result = compute_irrf(Decimal::new(2000, 0), 0, tables, 1);
/// assert_eq!(result.line.value, Decimal::ZERO);
/// ```
pub fn compute_irrf(
    gross_salary: Decimal,
    dependent_count: u32,
    tables: &StatutoryTables,
    step_number: u32,
) -> IrrfResult {
    let table = &tables.irrf.brackets;
    let dependent_deduction = tables.irrf.dependent_deduction * Decimal::from(dependent_count);
    let adjusted_base = gross_salary - dependent_deduction;

    let resolution = resolve_brackets(adjusted_base, table);
    let value = round_money(resolution.total_value);
    let rate = if gross_salary > Decimal::ZERO {
        round_rate(resolution.total_value / gross_salary)
    } else {
        Decimal::ZERO
    };

    let bracket_label = resolution
        .label
        .or_else(|| table.brackets().first().map(|b| b.label.clone()));

    let reasoning = if adjusted_base <= Decimal::ZERO {
        format!(
            "Dependent deduction R$ {} ({} x R$ {}) absorbs the whole gross of R$ {}; no IRRF due",
            dependent_deduction, dependent_count, tables.irrf.dependent_deduction, gross_salary
        )
    } else {
        format!(
            "R$ {} - R$ {} for {} dependent(s) = base R$ {}; IRRF R$ {} ({}% of gross)",
            gross_salary,
            dependent_deduction,
            dependent_count,
            adjusted_base,
            value,
            (rate * Decimal::ONE_HUNDRED).normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "irrf_withholding".to_string(),
        rule_name: "IRRF Withholding".to_string(),
        legal_ref: IRRF_LEGAL_REF.to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.to_string(),
            "dependent_count": dependent_count,
            "per_dependent": tables.irrf.dependent_deduction.to_string(),
            "table_effective_date": tables.effective_date.to_string()
        }),
        output: serde_json::json!({
            "adjusted_base": adjusted_base.to_string(),
            "value": value.to_string(),
            "effective_rate": rate.to_string(),
            "bracket": bracket_label
        }),
        reasoning,
    };

    IrrfResult {
        line: DeductionLine {
            base: adjusted_base,
            rate,
            value,
        },
        bracket_label,
        dependent_count,
        dependent_deduction,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn tables() -> StatutoryTables {
        ConfigLoader::load("config/br")
            .unwrap()
            .tables_for(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
            .unwrap()
            .clone()
    }

    #[test]
    fn test_exempt_band() {
        let result = compute_irrf(dec("2112.00"), 0, &tables(), 1);
        assert_eq!(result.line.value, Decimal::ZERO);
        assert_eq!(result.bracket_label.as_deref(), Some("Até R$ 2.112,00"));
    }

    #[test]
    fn test_second_bracket() {
        // (2500 - 2112) x 7.5% = 29.10
        let result = compute_irrf(dec("2500.00"), 0, &tables(), 1);
        assert_eq!(result.line.value, dec("29.10"));
        assert_eq!(result.line.base, dec("2500.00"));
        assert_eq!(result.line.rate, dec("0.0116"));
    }

    #[test]
    fn test_top_bracket_with_dependents() {
        // 5000 - 2 x 189.59 = 4620.82
        // 714.65 x 7.5% + 924.40 x 15% + 869.77 x 22.5%
        //   = 53.59875 + 138.66 + 195.69825 = 387.9570
        let result = compute_irrf(dec("5000.00"), 2, &tables(), 1);

        assert_eq!(result.dependent_deduction, dec("379.18"));
        assert_eq!(result.line.base, dec("4620.82"));
        assert_eq!(result.line.value, dec("387.96"));
        assert_eq!(result.dependent_count, 2);
        assert_eq!(
            result.bracket_label.as_deref(),
            Some("De R$ 3.751,06 até R$ 4.664,68")
        );
    }

    #[test]
    fn test_rate_reported_against_gross() {
        let result = compute_irrf(dec("5000.00"), 2, &tables(), 1);
        // 387.957 / 5000
        assert_eq!(result.line.rate, dec("0.0776"));
    }

    #[test]
    fn test_dependents_absorbing_whole_base() {
        let result = compute_irrf(dec("300.00"), 3, &tables(), 1);

        assert_eq!(result.line.value, Decimal::ZERO);
        assert!(result.line.base < Decimal::ZERO);
        assert_eq!(result.bracket_label.as_deref(), Some("Até R$ 2.112,00"));
        assert!(result.audit_step.reasoning.contains("no IRRF due"));
    }

    #[test]
    fn test_audit_step_content() {
        let result = compute_irrf(dec("5000.00"), 1, &tables(), 4);
        assert_eq!(result.audit_step.step_number, 4);
        assert_eq!(result.audit_step.rule_id, "irrf_withholding");
        assert_eq!(result.audit_step.input["dependent_count"], 1);
    }
}
