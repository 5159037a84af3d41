//! Batch runner.
//!
//! Runs one calculator over many employees. Entries are independent and are
//! computed in parallel; the output keeps the input order. A failing entry
//! becomes an error-status result and never aborts the batch.

use std::collections::HashMap;

use chrono::NaiveDate;
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::StatutoryConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    BatchResult, CalculationKind, CalculationResult, EmployeeCompensationInput, EmployeeDirectory,
    PaymentMode, TimeRecord,
};

use super::{
    OvertimeParams, TaxParams, VacationParams, compute_overtime, compute_payroll_taxes,
    compute_thirteenth, compute_vacation,
};

/// Which calculator a batch runs, with its period parameters.
///
/// Serialized with a `kind` tag:
///
/// ```
/// use payroll_engine::calculation::CalculationRequest;
/// use payroll_engine::models::{CalculationKind, PaymentMode};
///
/// let request: CalculationRequest =
///     serde_json::from_str(r#"{"kind": "thirteenth", "reference_year": 2024}"#).unwrap();
/// assert_eq!(request.kind(), CalculationKind::Thirteenth);
/// assert_eq!(
///     request,
///     CalculationRequest::Thirteenth { reference_year: 2024, payment_mode: PaymentMode::Installments }
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalculationRequest {
    /// Monthly withholding.
    Tax(TaxParams),
    /// 13th salary.
    Thirteenth {
        /// The year the 13th salary refers to.
        reference_year: i32,
        /// Payout mode.
        #[serde(default)]
        payment_mode: PaymentMode,
    },
    /// Vacation pay, with the same days for every employee.
    Vacation(VacationParams),
    /// Overtime from each employee's time records.
    Overtime {
        /// Any day of the month the records belong to.
        period: NaiveDate,
        /// Time records keyed by employee id. Employees without records have no overtime.
        #[serde(default)]
        time_records: HashMap<String, Vec<TimeRecord>>,
        /// Contracted hours per day. Falls back to the configured default.
        #[serde(default)]
        contracted_daily_hours: Option<Decimal>,
        /// Paid rest days in the month. Falls back to the configured default.
        #[serde(default)]
        rest_days: Option<u32>,
    },
}

impl CalculationRequest {
    /// The kind of result this request produces.
    pub fn kind(&self) -> CalculationKind {
        match self {
            CalculationRequest::Tax(_) => CalculationKind::Tax,
            CalculationRequest::Thirteenth { .. } => CalculationKind::Thirteenth,
            CalculationRequest::Vacation(_) => CalculationKind::Vacation,
            CalculationRequest::Overtime { .. } => CalculationKind::Overtime,
        }
    }

    /// Runs the requested calculator for one employee.
    pub fn calculate(
        &self,
        input: &EmployeeCompensationInput,
        config: &StatutoryConfig,
    ) -> EngineResult<CalculationResult> {
        match self {
            CalculationRequest::Tax(params) => compute_payroll_taxes(input, params, config),
            CalculationRequest::Thirteenth {
                reference_year,
                payment_mode,
            } => compute_thirteenth(input, *reference_year, *payment_mode, config),
            CalculationRequest::Vacation(params) => compute_vacation(input, params, config),
            CalculationRequest::Overtime {
                period,
                time_records,
                contracted_daily_hours,
                rest_days,
            } => {
                let params = OvertimeParams {
                    period: *period,
                    time_records: time_records
                        .get(&input.employee_id)
                        .cloned()
                        .unwrap_or_default(),
                    contracted_daily_hours: *contracted_daily_hours,
                    rest_days: *rest_days,
                };
                compute_overtime(input, &params, config)
            }
        }
    }
}

fn calculate_entry(
    input: &EmployeeCompensationInput,
    request: &CalculationRequest,
    config: &StatutoryConfig,
) -> CalculationResult {
    match request.calculate(input, config) {
        Ok(result) => {
            debug!(
                employee_id = %input.employee_id,
                net_value = %result.net_value,
                "Batch entry calculated"
            );
            result
        }
        Err(err) => {
            warn!(
                employee_id = %input.employee_id,
                error = %err,
                "Batch entry failed"
            );
            CalculationResult::pending(request.kind(), input).fail(err.to_string())
        }
    }
}

fn finish(kind: CalculationKind, results: Vec<CalculationResult>) -> BatchResult {
    let batch = BatchResult::new(kind, results);
    info!(
        batch_id = %batch.batch_id,
        kind = ?kind,
        entries = batch.len(),
        calculated = batch.totals.calculated_count,
        errors = batch.totals.error_count,
        "Batch completed"
    );
    batch
}

/// Runs `request` for every input.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::{CalculationRequest, run_batch};
/// use payroll_engine::config::ConfigLoader;
/// use payroll_engine::models::{CalculationStatus, EmployeeCompensationInput, PaymentMode};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("config/br").unwrap();
/// let employee = |id: &str, salary: i64| EmployeeCompensationInput {
///     employee_id: id.to_string(),
///     employee_name: format!("Employee {}", id),
///     admission_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
///     base_salary: Decimal::new(salary, 0),
///     dependent_count: 0,
/// };
/// let inputs = vec![employee("1", 3000), employee("2", -100), employee("3", 5000)];
/// let request = CalculationRequest::Thirteenth {
///     reference_year: 2024,
///     payment_mode: PaymentMode::Full,
/// };
///
/// let batch = run_batch(&inputs, &request, loader.config());
/// let statuses: Vec<_> = batch.results.iter().map(|r| r.status).collect();
/// assert_eq!(
///     statuses,
///     vec![CalculationStatus::Calculated, CalculationStatus::Error, CalculationStatus::Calculated]
/// );
/// ```
pub fn run_batch(
    inputs: &[EmployeeCompensationInput],
    request: &CalculationRequest,
    config: &StatutoryConfig,
) -> BatchResult {
    let results: Vec<CalculationResult> = inputs
        .par_iter()
        .map(|input| calculate_entry(input, request, config))
        .collect();
    finish(request.kind(), results)
}

/// Runs `request` for every id, looking employees up in `directory`.
///
/// Ids the directory does not know become error entries.
pub fn run_batch_for_ids(
    ids: &[String],
    directory: &dyn EmployeeDirectory,
    request: &CalculationRequest,
    config: &StatutoryConfig,
) -> BatchResult {
    let kind = request.kind();
    let results: Vec<CalculationResult> = ids
        .par_iter()
        .map(|id| match directory.find(id) {
            Some(input) => calculate_entry(&input, request, config),
            None => {
                let err = EngineError::invalid_input("employee_id", format!("employee not found: {}", id));
                warn!(employee_id = %id, error = %err, "Batch entry failed");
                CalculationResult::pending_for(kind, id, "").fail(err.to_string())
            }
        })
        .collect();
    finish(kind, results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::UnionParams;
    use crate::config::ConfigLoader;
    use crate::models::{CalculationStatus, InMemoryDirectory};
    use chrono::NaiveDateTime;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn config() -> StatutoryConfig {
        ConfigLoader::load("config/br").unwrap().config().clone()
    }

    fn employee(id: &str, salary: &str) -> EmployeeCompensationInput {
        EmployeeCompensationInput {
            employee_id: id.to_string(),
            employee_name: format!("Employee {}", id),
            admission_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            base_salary: dec(salary),
            dependent_count: 0,
        }
    }

    fn tax_request() -> CalculationRequest {
        CalculationRequest::Tax(TaxParams {
            reference_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            union: UnionParams::default(),
            other_deductions: Decimal::ZERO,
        })
    }

    #[test]
    fn test_partial_failure_keeps_order() {
        let inputs = vec![
            employee("emp_1", "2000.00"),
            employee("emp_2", "-100"),
            employee("emp_3", "3000.00"),
        ];
        let batch = run_batch(&inputs, &tax_request(), &config());

        assert_eq!(batch.len(), 3);
        assert_eq!(batch.kind, CalculationKind::Tax);
        let ids: Vec<&str> = batch.results.iter().map(|r| r.employee_id.as_str()).collect();
        assert_eq!(ids, vec!["emp_1", "emp_2", "emp_3"]);

        assert_eq!(batch.results[0].status, CalculationStatus::Calculated);
        assert_eq!(batch.results[1].status, CalculationStatus::Error);
        assert_eq!(batch.results[2].status, CalculationStatus::Calculated);
        assert!(batch.results[1]
            .error
            .as_deref()
            .unwrap()
            .contains("base_salary"));

        assert_eq!(batch.totals.calculated_count, 2);
        assert_eq!(batch.totals.error_count, 1);
        assert_eq!(batch.totals.gross_value, dec("5000.00"));
    }

    #[test]
    fn test_large_batch_preserves_order() {
        let inputs: Vec<EmployeeCompensationInput> = (0..200)
            .map(|i| employee(&format!("emp_{:03}", i), &format!("{}.00", 1500 + i * 10)))
            .collect();
        let batch = run_batch(&inputs, &tax_request(), &config());

        for (input, result) in inputs.iter().zip(&batch.results) {
            assert_eq!(input.employee_id, result.employee_id);
            assert_eq!(input.base_salary, result.gross_value);
        }
    }

    #[test]
    fn test_totals_match_sum_of_entries() {
        let inputs = vec![employee("a", "2000.00"), employee("b", "5000.00")];
        let batch = run_batch(&inputs, &tax_request(), &config());

        let net: Decimal = batch.results.iter().map(|r| r.net_value).sum();
        let inss: Decimal = batch.results.iter().map(|r| r.deductions.inss.value).sum();
        assert_eq!(batch.totals.net_value, net);
        assert_eq!(batch.totals.inss, inss);
        assert_eq!(batch.totals.fgts, dec("560.00"));
    }

    #[test]
    fn test_empty_batch() {
        let batch = run_batch(&[], &tax_request(), &config());
        assert!(batch.is_empty());
        assert_eq!(batch.totals.calculated_count, 0);
    }

    #[test]
    fn test_batch_for_ids_reports_unknown_employee() {
        let directory: InMemoryDirectory =
            vec![employee("emp_1", "2000.00"), employee("emp_3", "3000.00")]
                .into_iter()
                .collect();
        let ids = vec![
            "emp_1".to_string(),
            "emp_2".to_string(),
            "emp_3".to_string(),
        ];

        let batch = run_batch_for_ids(&ids, &directory, &tax_request(), &config());

        assert_eq!(batch.results[0].status, CalculationStatus::Calculated);
        assert_eq!(batch.results[1].status, CalculationStatus::Error);
        assert_eq!(batch.results[1].employee_id, "emp_2");
        assert!(batch.results[1]
            .error
            .as_deref()
            .unwrap()
            .contains("employee not found"));
        assert_eq!(batch.results[2].status, CalculationStatus::Calculated);
    }

    #[test]
    fn test_overtime_batch_uses_records_per_employee() {
        let dt = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
        let mut records = HashMap::new();
        records.insert(
            "emp_1".to_string(),
            vec![TimeRecord {
                date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
                start_time: dt("2024-03-04 08:00:00"),
                end_time: dt("2024-03-04 18:00:00"),
                breaks: vec![],
            }],
        );
        let request = CalculationRequest::Overtime {
            period: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            time_records: records,
            contracted_daily_hours: None,
            rest_days: Some(0),
        };
        let inputs = vec![employee("emp_1", "2200.00"), employee("emp_2", "2200.00")];

        let batch = run_batch(&inputs, &request, &config());

        assert_eq!(batch.kind, CalculationKind::Overtime);
        assert_eq!(batch.results[0].gross_value, dec("30.00"));
        assert_eq!(batch.results[1].gross_value, Decimal::ZERO);
        assert_eq!(batch.totals.calculated_count, 2);
    }

    #[test]
    fn test_request_deserialization() {
        let request: CalculationRequest = serde_json::from_str(
            r#"{"kind": "vacation", "reference_date": "2024-06-01", "vacation_days": 20,
                "pecuniary_days": 10, "include_pecuniary": true}"#,
        )
        .unwrap();
        assert_eq!(request.kind(), CalculationKind::Vacation);

        let request: CalculationRequest = serde_json::from_str(
            r#"{"kind": "tax", "reference_date": "2024-05-01", "union": {"enabled": true}}"#,
        )
        .unwrap();
        assert_eq!(request.kind(), CalculationKind::Tax);
    }
}
