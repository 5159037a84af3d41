//! Statutory levies shared by the calculators.
//!
//! Monthly withholding, 13th salary and vacation pay all run the same INSS,
//! IRRF and FGTS sequence over their gross value. The steps are appended to
//! the caller's audit trace in that order.

use rust_decimal::Decimal;

use crate::config::{InssCeilingPolicy, StatutoryTables};
use crate::models::{AuditStep, AuditTrace, AuditWarning, Deductions};

use super::{FgtsResult, InssResult, IrrfResult, compute_fgts, compute_inss, compute_irrf};

/// Only deductions authorised by law or by the employee may reduce wages.
const NET_PAY_LEGAL_REF: &str = "CLT art. 462";

/// INSS, IRRF and FGTS computed over one gross value.
#[derive(Debug, Clone)]
pub(crate) struct Levies {
    pub inss: InssResult,
    pub irrf: IrrfResult,
    pub fgts: FgtsResult,
}

impl Levies {
    /// The deduction lines, with no union contribution and no other deductions.
    pub fn deductions(&self) -> Deductions {
        Deductions {
            inss: self.inss.line.clone(),
            irrf: self.irrf.line.clone(),
            fgts: self.fgts.line.clone(),
            union_contribution: None,
            other: Decimal::ZERO,
        }
    }
}

/// Applies INSS, IRRF and FGTS to `gross`, recording each step in `trace`.
pub(crate) fn apply_levies(
    gross: Decimal,
    dependent_count: u32,
    tables: &StatutoryTables,
    ceiling: InssCeilingPolicy,
    trace: &mut AuditTrace,
) -> Levies {
    let inss = compute_inss(gross, tables, ceiling, next_step(trace));
    trace.steps.push(inss.audit_step.clone());
    if inss.ceiling_applied {
        trace.warnings.push(AuditWarning {
            code: "INSS_CEILING_APPLIED".to_string(),
            message: format!(
                "Base of R$ {} exceeds the INSS ceiling; contribution held at R$ {}",
                gross, inss.line.value
            ),
            severity: "low".to_string(),
        });
    }

    let irrf = compute_irrf(gross, dependent_count, tables, next_step(trace));
    trace.steps.push(irrf.audit_step.clone());

    let fgts = compute_fgts(gross, tables, next_step(trace));
    trace.steps.push(fgts.audit_step.clone());

    Levies { inss, irrf, fgts }
}

/// Records the net pay derivation as the last step of `trace`.
pub(crate) fn record_net_pay(gross: Decimal, deductions: &Deductions, trace: &mut AuditTrace) {
    let withheld = deductions.employee_total();
    let net = gross - withheld;
    let step = AuditStep {
        step_number: next_step(trace),
        rule_id: "net_pay".to_string(),
        rule_name: "Net Pay".to_string(),
        legal_ref: NET_PAY_LEGAL_REF.to_string(),
        input: serde_json::json!({
            "gross_value": gross.to_string(),
            "withheld": withheld.to_string(),
            "employer_charges": deductions.employer_charges().to_string()
        }),
        output: serde_json::json!({
            "net_value": net.to_string()
        }),
        reasoning: format!(
            "R$ {} - R$ {} withheld = R$ {}; FGTS of R$ {} is paid by the employer",
            gross,
            withheld,
            net,
            deductions.employer_charges()
        ),
    };
    trace.steps.push(step);
}

/// The number the next step appended to `trace` should carry.
pub(crate) fn next_step(trace: &AuditTrace) -> u32 {
    u32::try_from(trace.steps.len()).unwrap_or(u32::MAX).saturating_add(1)
}
