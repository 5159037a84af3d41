//! Union contribution.
//!
//! A flat percentage of gross pay, withheld only when the employee has
//! authorised it. The rate is given in percent (1.0 means 1%).

use rust_decimal::Decimal;

use crate::models::{AuditStep, DeductionLine};

use super::round_money;

/// Legislation behind the union contribution.
pub const UNION_LEGAL_REF: &str = "CLT arts. 545 e 578";

/// The result of a union contribution calculation.
#[derive(Debug, Clone)]
pub struct UnionContributionResult {
    /// Base, rate (as a fraction) and contribution.
    pub line: DeductionLine,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes the union contribution.
///
/// When `enabled` is false the line is zero, whatever `rate_percent` says.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::compute_union_contribution;
/// use rust_decimal::Decimal;
///
/// let on = compute_union_contribution(Decimal::new(2000, 0), Decimal::ONE, true, 1);
/// assert_eq!(on.line.value, Decimal::new(2000, 2));
///
/// let off = compute_union_contribution(Decimal::new(2000, 0), Decimal::ONE, false, 1);
/// assert_eq!(off.line.value, Decimal::ZERO);
/// ```
pub fn compute_union_contribution(
    gross_salary: Decimal,
    rate_percent: Decimal,
    enabled: bool,
    step_number: u32,
) -> UnionContributionResult {
    let (rate, value) = if enabled {
        let rate = rate_percent / Decimal::ONE_HUNDRED;
        (rate, round_money(gross_salary * rate))
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    let reasoning = if enabled {
        format!(
            "R$ {} x {}% = R$ {}",
            gross_salary,
            rate_percent.normalize(),
            value
        )
    } else {
        "Union contribution not authorised; nothing withheld".to_string()
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "union_contribution".to_string(),
        rule_name: "Union Contribution".to_string(),
        legal_ref: UNION_LEGAL_REF.to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.to_string(),
            "rate_percent": rate_percent.to_string(),
            "enabled": enabled
        }),
        output: serde_json::json!({
            "rate": rate.to_string(),
            "value": value.to_string()
        }),
        reasoning,
    };

    UnionContributionResult {
        line: DeductionLine {
            base: gross_salary,
            rate,
            value,
        },
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_enabled_applies_percentage() {
        let result = compute_union_contribution(dec("3500.00"), dec("1.5"), true, 1);
        assert_eq!(result.line.rate, dec("0.015"));
        assert_eq!(result.line.value, dec("52.50"));
    }

    #[test]
    fn test_disabled_ignores_rate() {
        let result = compute_union_contribution(dec("3500.00"), dec("3.0"), false, 1);
        assert_eq!(result.line.rate, Decimal::ZERO);
        assert_eq!(result.line.value, Decimal::ZERO);
        assert_eq!(result.line.base, dec("3500.00"));
        assert!(result.audit_step.reasoning.contains("not authorised"));
    }

    #[test]
    fn test_zero_rate_enabled() {
        let result = compute_union_contribution(dec("3500.00"), Decimal::ZERO, true, 1);
        assert_eq!(result.line.value, Decimal::ZERO);
    }
}
