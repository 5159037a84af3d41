//! Progressive bracket resolution.
//!
//! Shared by INSS and IRRF: the base is split across the brackets it passes
//! through and each slice is taxed at its bracket's marginal rate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::BracketTable;

/// The outcome of resolving a base against a bracket table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketResolution {
    /// Sum of every slice times its rate. Not rounded.
    pub total_value: Decimal,
    /// `total_value / base`, or zero when the base is not positive. Not rounded.
    pub effective_rate: Decimal,
    /// Index of the highest bracket the base reached.
    pub reached_bracket: Option<usize>,
    /// Label of the highest bracket the base reached.
    pub label: Option<String>,
}

/// Resolves `base` against a progressive table.
///
/// For every bracket whose lower bound is below the base, the slice
/// `min(base, upper) - lower` is taxed at the bracket's rate. A base of zero
/// or less reaches no bracket and levies nothing; that is a valid outcome
/// (zero-pay periods exist), not an error.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::resolve_brackets;
/// use payroll_engine::config::{Bracket, BracketTable};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let dec = |s: &str| Decimal::from_str(s).unwrap();
/// let table = BracketTable::new(vec![
///     Bracket { lower_bound: dec("0"), upper_bound: Some(dec("1320")), rate: dec("0.075"), label: "1".into() },
///     Bracket { lower_bound: dec("1320"), upper_bound: Some(dec("2571.29")), rate: dec("0.09"), label: "2".into() },
/// ]);
///
/// let resolution = resolve_brackets(dec("2000"), &table);
/// assert_eq!(resolution.total_value, dec("160.20"));
/// assert_eq!(resolution.reached_bracket, Some(1));
/// ```
pub fn resolve_brackets(base: Decimal, table: &BracketTable) -> BracketResolution {
    if base <= Decimal::ZERO {
        return BracketResolution {
            total_value: Decimal::ZERO,
            effective_rate: Decimal::ZERO,
            reached_bracket: None,
            label: None,
        };
    }

    let mut total_value = Decimal::ZERO;
    let mut reached: Option<usize> = None;

    for (index, bracket) in table.brackets().iter().enumerate() {
        if base <= bracket.lower_bound {
            break;
        }
        let ceiling = match bracket.upper_bound {
            Some(upper) if upper < base => upper,
            _ => base,
        };
        total_value += (ceiling - bracket.lower_bound) * bracket.rate;
        reached = Some(index);
    }

    BracketResolution {
        total_value,
        effective_rate: total_value / base,
        reached_bracket: reached,
        label: reached.map(|i| table.brackets()[i].label.clone()),
    }
}
