//! Daily time record model.
//!
//! This module defines the TimeRecord and Break structs for representing
//! clock-in/clock-out entries used by the overtime calculation.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A break taken during a working day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Break {
    /// The start time of the break.
    pub start_time: NaiveDateTime,
    /// The end time of the break.
    pub end_time: NaiveDateTime,
    /// Whether the break is paid (true) or unpaid (false).
    #[serde(default)]
    pub is_paid: bool,
}

impl Break {
    /// Returns the duration of the break in minutes.
    fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

/// One day of clocked work.
///
/// `end_time` may fall on the day after `date` for night shifts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRecord {
    /// The working day this record belongs to.
    pub date: NaiveDate,
    /// Clock-in time.
    pub start_time: NaiveDateTime,
    /// Clock-out time.
    pub end_time: NaiveDateTime,
    /// Breaks taken during the day.
    #[serde(default)]
    pub breaks: Vec<Break>,
}

impl TimeRecord {
    /// Rejects records whose clock-out precedes clock-in, whose breaks
    /// fall outside the worked interval, or whose breaks overlap.
    pub fn validate(&self) -> EngineResult<()> {
        if self.end_time <= self.start_time {
            return Err(EngineError::invalid_input(
                "time_records",
                format!(
                    "record on {} ends at {} before it starts at {}",
                    self.date, self.end_time, self.start_time
                ),
            ));
        }
        for b in &self.breaks {
            if b.end_time < b.start_time || b.start_time < self.start_time || b.end_time > self.end_time {
                return Err(EngineError::invalid_input(
                    "time_records",
                    format!("record on {} has a break outside the worked interval", self.date),
                ));
            }
        }

        // Unpaid time is subtracted per break, so breaks must be disjoint
        let mut sorted: Vec<&Break> = self.breaks.iter().collect();
        sorted.sort_by_key(|b| b.start_time);
        if let Some(pair) = sorted.windows(2).find(|w| w[1].start_time < w[0].end_time) {
            return Err(EngineError::invalid_input(
                "time_records",
                format!(
                    "record on {} has overlapping breaks starting at {} and {}",
                    self.date, pair[0].start_time, pair[1].start_time
                ),
            ));
        }
        Ok(())
    }

    /// Calculates the worked hours for the day.
    ///
    /// Unpaid breaks are subtracted; paid breaks count as worked time.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::{Break, TimeRecord};
    /// use chrono::{NaiveDate, NaiveDateTime};
    /// use rust_decimal::Decimal;
    ///
    /// let dt = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
    /// let record = TimeRecord {
    ///     date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
    ///     start_time: dt("2024-03-04 08:00:00"),
    ///     end_time: dt("2024-03-04 18:00:00"),
    ///     breaks: vec![Break {
    ///         start_time: dt("2024-03-04 12:00:00"),
    ///         end_time: dt("2024-03-04 13:00:00"),
    ///         is_paid: false,
    ///     }],
    /// };
    /// assert_eq!(record.worked_hours(), Decimal::new(9, 0));
    /// ```
    pub fn worked_hours(&self) -> Decimal {
        let total_minutes = (self.end_time - self.start_time).num_minutes();

        let unpaid_break_minutes: i64 = self
            .unpaid_breaks()
            .map(|b| b.duration_minutes())
            .sum();

        Decimal::new(total_minutes - unpaid_break_minutes, 0) / Decimal::new(60, 0)
    }

    /// Returns the unpaid breaks of the day.
    pub fn unpaid_breaks(&self) -> impl Iterator<Item = &Break> {
        self.breaks.iter().filter(|b| !b.is_paid)
    }
}
