//! Performance benchmarks for the payroll engine.
//!
//! Covers a single withholding request, a month of time records, and batch
//! runs both through the HTTP layer and straight into the rayon batch runner.
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use chrono::{Datelike, NaiveDate, Weekday};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::calculation::{CalculationRequest, TaxParams, run_batch};
use payroll_engine::config::ConfigLoader;
use payroll_engine::models::EmployeeCompensationInput;

use axum::{Router, body::Body, http::Request};
use tower::ServiceExt;

fn load_config() -> ConfigLoader {
    ConfigLoader::load("./config/br").expect("Failed to load config")
}

fn create_test_state() -> AppState {
    AppState::new(load_config())
}

async fn send(router: Router, uri: &'static str, body: String) -> axum::response::Response {
    router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Employees with salaries spread over every INSS and IRRF bracket.
fn create_employees(count: usize) -> Vec<EmployeeCompensationInput> {
    (0..count)
        .map(|i| EmployeeCompensationInput {
            employee_id: format!("emp_bench_{:04}", i),
            employee_name: format!("Employee {}", i),
            admission_date: NaiveDate::from_ymd_opt(2018 + (i % 6) as i32, 1 + (i % 12) as u32, 1)
                .unwrap(),
            base_salary: Decimal::new(1_412_00 + (i as i64 % 50) * 250_00, 2),
            dependent_count: (i % 4) as u32,
        })
        .collect()
}

fn tax_request() -> CalculationRequest {
    CalculationRequest::Tax(TaxParams {
        reference_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        union: Default::default(),
        other_deductions: Decimal::ZERO,
    })
}

/// One 09:00 to 19:00 record per weekday of March 2024.
fn create_march_records() -> Vec<serde_json::Value> {
    (1..=31)
        .filter_map(|day| NaiveDate::from_ymd_opt(2024, 3, day))
        .filter(|date| !matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
        .map(|date| {
            serde_json::json!({
                "date": date,
                "start_time": format!("{}T09:00:00", date),
                "end_time": format!("{}T19:00:00", date),
                "breaks": [{
                    "start_time": format!("{}T12:00:00", date),
                    "end_time": format!("{}T13:00:00", date)
                }]
            })
        })
        .collect()
}

/// Benchmark: Monthly withholding for one employee.
fn bench_single_tax(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let router = create_router(create_test_state());
    let body = serde_json::json!({
        "employee": create_employees(1)[0],
        "reference_date": "2024-05-01",
        "union": {"enabled": true}
    })
    .to_string();

    c.bench_function("single_tax", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(send(router.clone(), "/taxes", body.clone()).await) })
    });
}

/// Benchmark: Overtime over a full month of records.
fn bench_overtime_month(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let router = create_router(create_test_state());
    let body = serde_json::json!({
        "employee": create_employees(1)[0],
        "period": "2024-03-01",
        "time_records": create_march_records()
    })
    .to_string();

    c.bench_function("overtime_month", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(send(router.clone(), "/overtime", body.clone()).await) })
    });
}

/// Benchmark: Batch endpoint with 100 and 1000 employees.
fn bench_batch_endpoint(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let router = create_router(create_test_state());

    let mut group = c.benchmark_group("batch_endpoint");
    // Reduce sample size for large batches to keep benchmark time reasonable
    group.sample_size(10);

    for count in [100usize, 1000] {
        let body = serde_json::json!({
            "calculation": {"kind": "thirteenth", "reference_year": 2024},
            "employees": create_employees(count)
        })
        .to_string();

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("thirteenth", count), &count, |b, _| {
            b.to_async(&rt)
                .iter(|| async { black_box(send(router.clone(), "/batch", body.clone()).await) })
        });
    }

    group.finish();
}

/// Benchmark: Batch runner scaling, without the HTTP layer.
fn bench_scaling(c: &mut Criterion) {
    let loader = load_config();
    let request = tax_request();

    let mut group = c.benchmark_group("scaling");

    for count in [1usize, 10, 100, 1000] {
        let employees = create_employees(count);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("employees", count), &employees, |b, employees| {
            b.iter(|| black_box(run_batch(employees, &request, loader.config())))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_tax,
    bench_overtime_month,
    bench_batch_endpoint,
    bench_scaling,
);
criterion_main!(benches);
