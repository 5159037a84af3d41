//! Overtime, paid weekly rest reflex and night premium.
//!
//! Works from one month of daily time records. Hours beyond the contracted
//! daily journey are paid with the overtime premium; the overtime pay is
//! reflected on the paid weekly rest days (DSR); hours inside the night
//! window earn the night premium. These are earnings that feed the monthly
//! payroll, so no withholding is applied here.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{LaborRules, StatutoryConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditTrace, CalculationDetails, CalculationKind, CalculationResult, DeductionLine,
    Deductions, EmployeeCompensationInput, OvertimeDetails, TimeRecord,
};

use super::levies::next_step;
use super::{elapsed_us, round_money};

const OVERTIME_LEGAL_REF: &str = "CF art. 7 XVI; CLT art. 59";
const DSR_LEGAL_REF: &str = "Lei 605/1949 art. 7";
const NIGHT_LEGAL_REF: &str = "CF art. 7 IX; CLT art. 73";

/// Parameters of an overtime calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OvertimeParams {
    /// Any day of the month the records belong to.
    pub period: NaiveDate,
    /// The month's time records.
    #[serde(default)]
    pub time_records: Vec<TimeRecord>,
    /// Contracted hours per day. Falls back to the configured default.
    #[serde(default)]
    pub contracted_daily_hours: Option<Decimal>,
    /// Paid rest days in the month. Falls back to the configured default.
    #[serde(default)]
    pub rest_days: Option<u32>,
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn overlap_minutes(
    a: (NaiveDateTime, NaiveDateTime),
    b: (NaiveDateTime, NaiveDateTime),
) -> i64 {
    let start = a.0.max(b.0);
    let end = a.1.min(b.1);
    (end - start).num_minutes().max(0)
}

/// Minutes of `record` worked inside the night window.
///
/// The window opens at `night_start` and closes at `night_end`, on the next
/// day when it crosses midnight. Unpaid breaks inside the window do not count.
fn night_minutes(record: &TimeRecord, rules: &LaborRules) -> i64 {
    let worked = (record.start_time, record.end_time);
    let crosses_midnight = rules.night_end <= rules.night_start;

    let mut total = 0;
    let mut day = record
        .start_time
        .date()
        .pred_opt()
        .unwrap_or(record.start_time.date());
    let last = record.end_time.date();

    while day <= last {
        let window_start = day.and_time(rules.night_start);
        let window_end = if crosses_midnight {
            match day.succ_opt() {
                Some(next) => next.and_time(rules.night_end),
                None => break,
            }
        } else {
            day.and_time(rules.night_end)
        };
        let window = (window_start, window_end);

        total += overlap_minutes(worked, window);
        total -= record
            .unpaid_breaks()
            .map(|b| overlap_minutes((b.start_time, b.end_time), window))
            .sum::<i64>();

        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }

    total
}

/// Computes overtime, DSR reflex and night premium for one employee.
///
/// Records of the same day are added together before the contracted
/// journey is applied. DSR is `overtime_value / days_worked * rest_days`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] for an invalid employee, a record
/// that ends before it starts or lies outside the period, or contracted
/// hours outside (0, 24].
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::{OvertimeParams, compute_overtime};
/// use payroll_engine::config::ConfigLoader;
/// use payroll_engine::models::{EmployeeCompensationInput, TimeRecord};
/// use chrono::{NaiveDate, NaiveDateTime};
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("config/br").unwrap();
/// let dt = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// let input = EmployeeCompensationInput {
///     employee_id: "emp_004".to_string(),
///     employee_name: "Diego Alves".to_string(),
///     admission_date: NaiveDate::from_ymd_opt(2023, 1, 9).unwrap(),
///     base_salary: Decimal::new(2200, 0),
///     dependent_count: 0,
/// };
/// let params = OvertimeParams {
///     period: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
///     time_records: vec![TimeRecord {
///         date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
///         start_time: dt("2024-03-04 08:00:00"),
///         end_time: dt("2024-03-04 18:00:00"),
///         breaks: vec![],
///     }],
///     contracted_daily_hours: None,
///     rest_days: Some(0),
/// };
///
/// // 2 hours at R$ 10.00 x 1.5
/// let result = compute_overtime(&input, &params, loader.config()).unwrap();
/// assert_eq!(result.gross_value, Decimal::new(3000, 2));
/// ```
pub fn compute_overtime(
    input: &EmployeeCompensationInput,
    params: &OvertimeParams,
    config: &StatutoryConfig,
) -> EngineResult<CalculationResult> {
    let start = Instant::now();
    input.validate()?;

    let rules = config.labor();
    let period = first_of_month(params.period);
    let contracted = params
        .contracted_daily_hours
        .unwrap_or(rules.default_daily_hours);
    if contracted <= Decimal::ZERO || contracted > Decimal::from(24) {
        return Err(EngineError::invalid_input(
            "contracted_daily_hours",
            format!("must be greater than 0 and at most 24, got {}", contracted),
        ));
    }
    let rest_days = params.rest_days.unwrap_or(rules.default_rest_days);

    let mut worked_by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    let mut night_total_minutes = 0;
    for record in &params.time_records {
        record.validate()?;
        if first_of_month(record.date) != period {
            return Err(EngineError::invalid_input(
                "time_records",
                format!(
                    "record on {} is outside the period starting {}",
                    record.date, period
                ),
            ));
        }
        *worked_by_day.entry(record.date).or_insert(Decimal::ZERO) += record.worked_hours();
        night_total_minutes += night_minutes(record, rules);
    }

    let (regular_hours, overtime_hours) = worked_by_day.values().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(regular, overtime), worked| {
            if *worked > contracted {
                (regular + contracted, overtime + (*worked - contracted))
            } else {
                (regular + *worked, overtime)
            }
        },
    );
    let days_worked = u32::try_from(worked_by_day.len()).unwrap_or(u32::MAX);

    let hourly = input.base_salary / rules.monthly_hours_divisor;
    let hourly_rate = round_money(hourly);
    let mut trace = AuditTrace::default();

    let overtime_multiplier = Decimal::ONE + rules.overtime_premium;
    let overtime_value = round_money(overtime_hours * hourly * overtime_multiplier);
    trace.steps.push(AuditStep {
        step_number: next_step(&trace),
        rule_id: "overtime_pay".to_string(),
        rule_name: "Overtime Pay".to_string(),
        legal_ref: OVERTIME_LEGAL_REF.to_string(),
        input: serde_json::json!({
            "base_salary": input.base_salary.to_string(),
            "monthly_hours_divisor": rules.monthly_hours_divisor.to_string(),
            "contracted_daily_hours": contracted.normalize().to_string(),
            "days_worked": days_worked
        }),
        output: serde_json::json!({
            "hourly_rate": hourly_rate.to_string(),
            "regular_hours": regular_hours.normalize().to_string(),
            "overtime_hours": overtime_hours.normalize().to_string(),
            "overtime_value": overtime_value.to_string()
        }),
        reasoning: format!(
            "{} overtime hour(s) beyond {}h/day at R$ {} x {} = R$ {}",
            overtime_hours.normalize(),
            contracted.normalize(),
            hourly_rate,
            overtime_multiplier.normalize(),
            overtime_value
        ),
    });

    let dsr_value = if days_worked > 0 {
        round_money(overtime_value / Decimal::from(days_worked) * Decimal::from(rest_days))
    } else {
        Decimal::ZERO
    };
    trace.steps.push(AuditStep {
        step_number: next_step(&trace),
        rule_id: "dsr_reflex".to_string(),
        rule_name: "Paid Weekly Rest Reflex".to_string(),
        legal_ref: DSR_LEGAL_REF.to_string(),
        input: serde_json::json!({
            "overtime_value": overtime_value.to_string(),
            "days_worked": days_worked,
            "rest_days": rest_days
        }),
        output: serde_json::json!({
            "dsr_value": dsr_value.to_string()
        }),
        reasoning: format!(
            "R$ {} / {} day(s) worked x {} rest day(s) = R$ {}",
            overtime_value, days_worked, rest_days, dsr_value
        ),
    });

    let night_hours = Decimal::from(night_total_minutes) / Decimal::from(60);
    let night_value = round_money(night_hours * hourly * rules.night_premium);
    trace.steps.push(AuditStep {
        step_number: next_step(&trace),
        rule_id: "night_premium".to_string(),
        rule_name: "Night Premium".to_string(),
        legal_ref: NIGHT_LEGAL_REF.to_string(),
        input: serde_json::json!({
            "night_start": rules.night_start.to_string(),
            "night_end": rules.night_end.to_string(),
            "night_premium": rules.night_premium.to_string()
        }),
        output: serde_json::json!({
            "night_hours": night_hours.normalize().to_string(),
            "night_value": night_value.to_string()
        }),
        reasoning: format!(
            "{} night hour(s) at R$ {} x {}% = R$ {}",
            night_hours.normalize(),
            hourly_rate,
            (rules.night_premium * Decimal::ONE_HUNDRED).normalize(),
            night_value
        ),
    });

    let gross = overtime_value + dsr_value + night_value;
    let deductions = Deductions {
        inss: DeductionLine::zero(gross),
        irrf: DeductionLine::zero(gross),
        fgts: DeductionLine::zero(gross),
        union_contribution: None,
        other: Decimal::ZERO,
    };

    let details = OvertimeDetails {
        period,
        hourly_rate,
        days_worked,
        regular_hours,
        overtime_hours,
        overtime_value,
        rest_days,
        dsr_value,
        night_hours,
        night_value,
    };

    trace.duration_us = elapsed_us(start);

    Ok(
        CalculationResult::pending(CalculationKind::Overtime, input).complete(
            gross,
            deductions,
            CalculationDetails::Overtime(details),
            trace,
        ),
    )
}
