//! INSS (social security) contribution.
//!
//! The contribution is progressive: the gross salary is resolved against the
//! INSS bracket table. What happens above the table's top bound is decided by
//! the configured [`InssCeilingPolicy`].

use rust_decimal::Decimal;

use crate::config::{InssCeilingPolicy, StatutoryTables};
use crate::models::{AuditStep, DeductionLine};

use super::{resolve_brackets, round_money, round_rate};

/// Legislation behind the INSS contribution.
pub const INSS_LEGAL_REF: &str = "Lei 8.212/1991 art. 20; EC 103/2019 art. 28";

/// The result of an INSS calculation.
#[derive(Debug, Clone)]
pub struct InssResult {
    /// Base, effective rate and contribution.
    pub line: DeductionLine,
    /// Label of the highest bracket reached.
    pub bracket_label: Option<String>,
    /// True when the salary exceeded the top bound and the capped policy held the contribution.
    pub ceiling_applied: bool,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes the INSS contribution on `gross_salary`.
///
/// # Arguments
///
/// * `gross_salary` - The contribution base
/// * `tables` - The statutory tables in force
/// * `ceiling` - Behaviour above the top bracket
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::compute_inss;
/// use payroll_engine::config::{ConfigLoader, InssCeilingPolicy};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("config/br").unwrap();
/// let tables = loader.tables_for(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()).unwrap();
///
/// let result = compute_inss(Decimal::new(200000, 2), tables, InssCeilingPolicy::Capped, 1);
/// assert_eq!(result.line.value, Decimal::new(16020, 2));
/// ```
pub fn compute_inss(
    gross_salary: Decimal,
    tables: &StatutoryTables,
    ceiling: InssCeilingPolicy,
    step_number: u32,
) -> InssResult {
    let table = &tables.inss.brackets;
    let resolution = resolve_brackets(gross_salary, table);
    let mut total = resolution.total_value;

    let top_bound = table.top().and_then(|b| b.upper_bound.map(|u| (u, b.rate)));
    let above_top = top_bound.filter(|(upper, _)| gross_salary > *upper);

    let ceiling_applied = match (above_top, ceiling) {
        (Some(_), InssCeilingPolicy::Capped) => true,
        (Some((upper, rate)), InssCeilingPolicy::Unbounded) => {
            total += (gross_salary - upper) * rate;
            false
        }
        (None, _) => false,
    };

    let value = round_money(total);
    let rate = if gross_salary > Decimal::ZERO {
        round_rate(total / gross_salary)
    } else {
        Decimal::ZERO
    };

    let reasoning = match &resolution.label {
        Some(label) if ceiling_applied => format!(
            "R$ {} exceeds the INSS ceiling; contribution capped at R$ {} (bracket '{}')",
            gross_salary, value, label
        ),
        Some(label) => format!(
            "Progressive INSS on R$ {} up to bracket '{}': R$ {} ({}%)",
            gross_salary,
            label,
            value,
            (rate * Decimal::ONE_HUNDRED).normalize()
        ),
        None => format!("No INSS due on a base of R$ {}", gross_salary),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "inss_contribution".to_string(),
        rule_name: "INSS Contribution".to_string(),
        legal_ref: INSS_LEGAL_REF.to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.to_string(),
            "ceiling_policy": ceiling,
            "table_effective_date": tables.effective_date.to_string()
        }),
        output: serde_json::json!({
            "value": value.to_string(),
            "effective_rate": rate.to_string(),
            "bracket": resolution.label,
            "ceiling_applied": ceiling_applied
        }),
        reasoning,
    };

    InssResult {
        line: DeductionLine {
            base: gross_salary,
            rate,
            value,
        },
        bracket_label: resolution.label,
        ceiling_applied,
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
    fn test_inss_on_2000() {
        let result = compute_inss(dec("2000.00"), &tables(), InssCeilingPolicy::Capped, 1);

        assert_eq!(result.line.base, dec("2000.00"));
        assert_eq!(result.line.value, dec("160.20"));
        assert_eq!(result.line.rate, dec("0.0801"));
        assert_eq!(
            result.bracket_label.as_deref(),
            Some("De R$ 1.320,01 até R$ 2.571,29")
        );
        assert!(!result.ceiling_applied);
    }

    #[test]
    fn test_inss_on_first_bracket_is_flat() {
        let result = compute_inss(dec("1320.00"), &tables(), InssCeilingPolicy::Capped, 1);
        assert_eq!(result.line.value, dec("99.00"));
        assert_eq!(result.line.rate, dec("0.075"));
    }

    #[test]
    fn test_inss_on_5000() {
        // 99.00 + 112.6161 + 154.2780 + 160.0284 = 525.9225
        let result = compute_inss(dec("5000.00"), &tables(), InssCeilingPolicy::Capped, 1);
        assert_eq!(result.line.value, dec("525.92"));
    }

    #[test]
    fn test_capped_policy_holds_contribution_at_ceiling() {
        let at_ceiling = compute_inss(dec("7507.49"), &tables(), InssCeilingPolicy::Capped, 1);
        let above = compute_inss(dec("12000.00"), &tables(), InssCeilingPolicy::Capped, 1);

        assert_eq!(at_ceiling.line.value, above.line.value);
        assert_eq!(above.line.value, dec("876.97"));
        assert!(above.ceiling_applied);
        assert!(!at_ceiling.ceiling_applied);
        assert!(above.audit_step.reasoning.contains("ceiling"));
    }

    #[test]
    fn test_unbounded_policy_keeps_top_rate() {
        let capped = compute_inss(dec("8507.49"), &tables(), InssCeilingPolicy::Capped, 1);
        let unbounded = compute_inss(dec("8507.49"), &tables(), InssCeilingPolicy::Unbounded, 1);

        assert_eq!(unbounded.line.value - capped.line.value, dec("140.00"));
        assert!(!unbounded.ceiling_applied);
    }

    #[test]
    fn test_zero_salary_has_no_contribution() {
        let result = compute_inss(Decimal::ZERO, &tables(), InssCeilingPolicy::Capped, 1);
        assert_eq!(result.line.value, Decimal::ZERO);
        assert_eq!(result.line.rate, Decimal::ZERO);
        assert!(result.bracket_label.is_none());
    }

    #[test]
    fn test_audit_step_content() {
        let result = compute_inss(dec("2000.00"), &tables(), InssCeilingPolicy::Capped, 3);
        let step = &result.audit_step;

        assert_eq!(step.step_number, 3);
        assert_eq!(step.rule_id, "inss_contribution");
        assert_eq!(step.legal_ref, INSS_LEGAL_REF);
        assert_eq!(step.output["value"], "160.20");
        assert_eq!(step.input["ceiling_policy"], "capped");
    }
}
