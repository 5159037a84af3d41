//! Configuration types for statutory payroll calculations.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files, plus the validation
//! that every bracket table must pass before it can be used.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Metadata about the statutory rule set.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatutoryMetadata {
    /// The jurisdiction code (e.g., "BR").
    pub jurisdiction: String,
    /// The human-readable name of the rule set.
    pub name: String,
    /// The version of the rule set.
    pub version: String,
    /// URL to the official legislation.
    pub source_url: String,
}

/// How INSS contributions behave for salaries above the top bracket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InssCeilingPolicy {
    /// Salary above the top bound contributes nothing further.
    #[default]
    Capped,
    /// The top bracket's rate keeps applying above its upper bound.
    Unbounded,
}

/// A single progressive bracket.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Bracket {
    /// The amount at which this bracket starts (exclusive).
    pub lower_bound: Decimal,
    /// The amount at which this bracket ends (inclusive). `None` means unbounded.
    #[serde(default)]
    pub upper_bound: Option<Decimal>,
    /// The marginal rate applied inside this bracket, as a fraction.
    pub rate: Decimal,
    /// Human-readable description of the bracket.
    pub label: String,
}

/// An ordered, contiguous list of progressive brackets.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct BracketTable(Vec<Bracket>);

impl BracketTable {
    /// Creates a bracket table without validating it.
    ///
    /// Call [`BracketTable::validate`] before using a table built by hand.
    pub fn new(brackets: Vec<Bracket>) -> Self {
        Self(brackets)
    }

    /// Returns the brackets in ascending order.
    pub fn brackets(&self) -> &[Bracket] {
        &self.0
    }

    /// Returns the last bracket of the table, if any.
    pub fn top(&self) -> Option<&Bracket> {
        self.0.last()
    }

    /// Checks that the table is usable for progressive resolution.
    ///
    /// A valid table is non-empty, starts at zero, has rates between 0 and 1,
    /// each bracket starts exactly where the previous one ends, and only the
    /// last bracket may be unbounded.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::config::{Bracket, BracketTable};
    /// use rust_decimal::Decimal;
    ///
    /// let table = BracketTable::new(vec![]);
    /// assert!(table.validate("inss").is_err());
    ///
    /// let table = BracketTable::new(vec![Bracket {
    ///     lower_bound: Decimal::ZERO,
    ///     upper_bound: None,
    ///     rate: Decimal::new(10, 2),
    ///     label: "Flat".to_string(),
    /// }]);
    /// assert!(table.validate("flat").is_ok());
    /// ```
    pub fn validate(&self, table: &str) -> EngineResult<()> {
        let invalid = |message: String| EngineError::InvalidBracketTable {
            table: table.to_string(),
            message,
        };

        let first = self
            .0
            .first()
            .ok_or_else(|| invalid("table has no brackets".to_string()))?;

        if first.lower_bound != Decimal::ZERO {
            return Err(invalid(format!(
                "first bracket must start at 0, starts at {}",
                first.lower_bound
            )));
        }

        let last_index = self.0.len() - 1;
        for (index, bracket) in self.0.iter().enumerate() {
            let position = index + 1;

            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(invalid(format!(
                    "bracket {} has rate {} outside [0, 1]",
                    position, bracket.rate
                )));
            }

            match bracket.upper_bound {
                Some(upper) if upper <= bracket.lower_bound => {
                    return Err(invalid(format!(
                        "bracket {} upper bound {} is not above its lower bound {}",
                        position, upper, bracket.lower_bound
                    )));
                }
                None if index != last_index => {
                    return Err(invalid(format!(
                        "bracket {} is unbounded but is not the last bracket",
                        position
                    )));
                }
                _ => {}
            }

            if let Some(next) = self.0.get(index + 1) {
                // Upper is Some here: an unbounded non-last bracket was rejected above.
                if bracket.upper_bound != Some(next.lower_bound) {
                    return Err(invalid(format!(
                        "bracket {} does not start where bracket {} ends",
                        position + 1,
                        position
                    )));
                }
            }
        }

        Ok(())
    }
}

/// INSS (social security) table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InssTable {
    /// Progressive contribution brackets.
    pub brackets: BracketTable,
}

/// IRRF (withholding income tax) table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IrrfTable {
    /// Progressive tax brackets.
    pub brackets: BracketTable,
    /// Amount deducted from the taxable base for each dependent.
    pub dependent_deduction: Decimal,
}

/// FGTS (severance fund) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FgtsRate {
    /// Employer deposit rate, as a fraction of gross pay.
    pub rate: Decimal,
}

/// One effective-dated set of statutory tables, from a `tables/*.yaml` file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatutoryTables {
    /// The first date on which these tables apply.
    pub effective_date: NaiveDate,
    /// INSS contribution table.
    pub inss: InssTable,
    /// IRRF withholding table.
    pub irrf: IrrfTable,
    /// FGTS deposit rate.
    pub fgts: FgtsRate,
}

impl StatutoryTables {
    /// Validates every bracket table and constant in this set.
    pub fn validate(&self) -> EngineResult<()> {
        self.inss.brackets.validate("inss")?;
        self.irrf.brackets.validate("irrf")?;

        if self.irrf.dependent_deduction < Decimal::ZERO {
            return Err(EngineError::InvalidBracketTable {
                table: "irrf".to_string(),
                message: "dependent deduction cannot be negative".to_string(),
            });
        }
        if self.fgts.rate < Decimal::ZERO || self.fgts.rate > Decimal::ONE {
            return Err(EngineError::InvalidBracketTable {
                table: "fgts".to_string(),
                message: format!("rate {} outside [0, 1]", self.fgts.rate),
            });
        }
        Ok(())
    }
}

/// Labour constants that are not bracket tables.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LaborRules {
    /// Monthly hours used to derive the hourly rate from a monthly salary.
    pub monthly_hours_divisor: Decimal,
    /// Contracted daily hours when the caller does not supply a journey.
    pub default_daily_hours: Decimal,
    /// Overtime premium over the hourly rate (0.5 = +50%).
    pub overtime_premium: Decimal,
    /// Night-work premium over the hourly rate (0.2 = +20%).
    pub night_premium: Decimal,
    /// Start of the night-work window.
    pub night_start: NaiveTime,
    /// End of the night-work window (on the following day).
    pub night_end: NaiveTime,
    /// Paid rest days (Sundays and holidays) per month for the DSR reflex.
    pub default_rest_days: u32,
    /// Union contribution rate, in percent, when the caller does not supply one.
    pub default_union_rate_percent: Decimal,
}

impl LaborRules {
    /// Checks that divisors and journeys are positive and premiums and rates non-negative.
    pub fn validate(&self) -> EngineResult<()> {
        let positive = [
            ("monthly_hours_divisor", self.monthly_hours_divisor),
            ("default_daily_hours", self.default_daily_hours),
        ];
        for (field, value) in positive {
            if value <= Decimal::ZERO {
                return Err(EngineError::InvalidLaborRule {
                    field: field.to_string(),
                    message: format!("must be greater than zero, got {}", value),
                });
            }
        }

        let non_negative = [
            ("overtime_premium", self.overtime_premium),
            ("night_premium", self.night_premium),
            ("default_union_rate_percent", self.default_union_rate_percent),
        ];
        for (field, value) in non_negative {
            if value < Decimal::ZERO {
                return Err(EngineError::InvalidLaborRule {
                    field: field.to_string(),
                    message: format!("must not be negative, got {}", value),
                });
            }
        }

        if self.default_union_rate_percent > Decimal::ONE_HUNDRED {
            return Err(EngineError::InvalidLaborRule {
                field: "default_union_rate_percent".to_string(),
                message: format!("must be at most 100, got {}", self.default_union_rate_percent),
            });
        }
        Ok(())
    }
}

/// Contents of `statutory.yaml`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatutoryFile {
    /// Rule set metadata.
    pub metadata: StatutoryMetadata,
    /// INSS behaviour above the top bracket.
    #[serde(default)]
    pub inss_ceiling: InssCeilingPolicy,
    /// Labour constants.
    pub labor: LaborRules,
}

/// The complete statutory configuration loaded from YAML files.
///
/// Table sets are kept sorted by effective date, oldest first.
#[derive(Debug, Clone)]
pub struct StatutoryConfig {
    metadata: StatutoryMetadata,
    inss_ceiling: InssCeilingPolicy,
    labor: LaborRules,
    tables: Vec<StatutoryTables>,
}

impl StatutoryConfig {
    /// Creates a StatutoryConfig from its component parts.
    ///
    /// Every table set and the labour constants are validated. An empty set
    /// of tables, or two sets sharing an effective date, is rejected.
    pub fn new(
        metadata: StatutoryMetadata,
        inss_ceiling: InssCeilingPolicy,
        labor: LaborRules,
        tables: Vec<StatutoryTables>,
    ) -> EngineResult<Self> {
        if tables.is_empty() {
            return Err(EngineError::InvalidBracketTable {
                table: "tables".to_string(),
                message: "no statutory table sets configured".to_string(),
            });
        }
        for set in &tables {
            set.validate()?;
        }
        labor.validate()?;

        let mut sorted = tables;
        sorted.sort_by(|a, b| a.effective_date.cmp(&b.effective_date));
        if let Some(pair) = sorted
            .windows(2)
            .find(|w| w[0].effective_date == w[1].effective_date)
        {
            return Err(EngineError::InvalidBracketTable {
                table: "tables".to_string(),
                message: format!(
                    "more than one table set effective on {}",
                    pair[0].effective_date
                ),
            });
        }
        Ok(Self {
            metadata,
            inss_ceiling,
            labor,
            tables: sorted,
        })
    }

    /// Returns the rule set metadata.
    pub fn metadata(&self) -> &StatutoryMetadata {
        &self.metadata
    }

    /// Returns the INSS ceiling policy.
    pub fn inss_ceiling(&self) -> InssCeilingPolicy {
        self.inss_ceiling
    }

    /// Returns a copy of this configuration with a different INSS ceiling policy.
    pub fn with_inss_ceiling(mut self, policy: InssCeilingPolicy) -> Self {
        self.inss_ceiling = policy;
        self
    }

    /// Returns the labour constants.
    pub fn labor(&self) -> &LaborRules {
        &self.labor
    }

    /// Returns all table sets, oldest first.
    pub fn tables(&self) -> &[StatutoryTables] {
        &self.tables
    }

    /// Returns the most recent table set effective on or before `date`.
    pub fn tables_for(&self, date: NaiveDate) -> EngineResult<&StatutoryTables> {
        self.tables
            .iter()
            .rfind(|t| t.effective_date <= date)
            .ok_or(EngineError::TableNotFound { date })
    }
}
