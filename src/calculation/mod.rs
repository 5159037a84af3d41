//! Calculation logic for the payroll engine.
//!
//! This module contains the progressive bracket resolver shared by INSS and
//! IRRF, the individual levies (INSS, IRRF, FGTS, union contribution), the
//! calculators built on top of them (monthly withholding, 13th salary,
//! vacation pay, overtime) and the batch runner that drives any of them over
//! many employees.

mod batch;
mod bracket;
mod fgts;
mod inss;
mod irrf;
mod levies;
mod overtime;
mod payroll_taxes;
mod thirteenth;
mod union_contribution;
mod vacation;

use rust_decimal::{Decimal, RoundingStrategy};

pub use batch::{CalculationRequest, run_batch, run_batch_for_ids};
pub use bracket::{BracketResolution, resolve_brackets};
pub use fgts::{FGTS_LEGAL_REF, FgtsResult, compute_fgts};
pub use inss::{INSS_LEGAL_REF, InssResult, compute_inss};
pub use irrf::{IRRF_LEGAL_REF, IrrfResult, compute_irrf};
pub use overtime::{OvertimeParams, compute_overtime};
pub use payroll_taxes::{TaxParams, UnionParams, compute_payroll_taxes};
pub use thirteenth::{compute_thirteenth, working_months};
pub use union_contribution::{UNION_LEGAL_REF, UnionContributionResult, compute_union_contribution};
pub use vacation::{VacationParams, compute_vacation, proportional_vacation_days};

/// Rounds a monetary amount to cents, half away from zero.
pub(crate) fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a rate (fraction) to four decimal places.
pub(crate) fn round_rate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}

/// Microseconds elapsed since `start`, saturating.
pub(crate) fn elapsed_us(start: std::time::Instant) -> u64 {
    u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX)
}
