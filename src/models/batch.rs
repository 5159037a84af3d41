//! Batch result models.
//!
//! A batch is an ordered list of per-employee results plus totals reduced
//! over the successfully calculated entries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CalculationKind, CalculationResult, CalculationStatus};

/// Aggregated totals of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTotals {
    /// Sum of gross values.
    pub gross_value: Decimal,
    /// Sum of INSS withheld.
    pub inss: Decimal,
    /// Sum of IRRF withheld.
    pub irrf: Decimal,
    /// Sum of FGTS deposits (employer charge).
    pub fgts: Decimal,
    /// Sum of union contributions.
    pub union_contribution: Decimal,
    /// Sum of other deductions.
    pub other_deductions: Decimal,
    /// Sum of net values.
    pub net_value: Decimal,
    /// Number of entries calculated successfully.
    pub calculated_count: usize,
    /// Number of entries that failed.
    pub error_count: usize,
}

impl BatchTotals {
    /// Reduces a sequence of results into totals.
    ///
    /// Failed entries are counted but contribute no money.
    pub fn from_results(results: &[CalculationResult]) -> Self {
        results.iter().fold(Self::default(), |mut totals, result| {
            match result.status {
                CalculationStatus::Calculated => {
                    let d = &result.deductions;
                    totals.gross_value += result.gross_value;
                    totals.inss += d.inss.value;
                    totals.irrf += d.irrf.value;
                    totals.fgts += d.fgts.value;
                    totals.union_contribution +=
                        d.union_contribution.as_ref().map_or(Decimal::ZERO, |u| u.value);
                    totals.other_deductions += d.other;
                    totals.net_value += result.net_value;
                    totals.calculated_count += 1;
                }
                CalculationStatus::Error => totals.error_count += 1,
                CalculationStatus::Pending => {}
            }
            totals
        })
    }
}

/// The outcome of running one calculator over many employees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Unique identifier for this run.
    pub batch_id: Uuid,
    /// The calculator that was run.
    pub kind: CalculationKind,
    /// Per-employee results, in input order.
    pub results: Vec<CalculationResult>,
    /// Totals over the calculated entries.
    pub totals: BatchTotals,
}

impl BatchResult {
    /// Builds a batch result, computing its totals.
    pub fn new(kind: CalculationKind, results: Vec<CalculationResult>) -> Self {
        let totals = BatchTotals::from_results(&results);
        Self {
            batch_id: Uuid::new_v4(),
            kind,
            results,
            totals,
        }
    }

    /// Number of entries in the batch.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if the batch has no entries.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
