//! HTTP request handlers for the payroll engine API.
//!
//! This module contains the handler functions for all API endpoints.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    compute_overtime, compute_payroll_taxes, compute_thirteenth, compute_vacation, run_batch,
    run_batch_for_ids,
};
use crate::error::{EngineError, EngineResult};
use crate::models::CalculationResult;

use super::request::{BatchRequest, OvertimeRequest, TaxRequest, ThirteenthRequest, VacationRequest};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/taxes", post(taxes_handler))
        .route("/thirteenth", post(thirteenth_handler))
        .route("/vacation", post(vacation_handler))
        .route("/overtime", post(overtime_handler))
        .route("/batch", post(batch_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(error: impl Into<ApiErrorResponse>) -> Response {
    let api_error = error.into();
    json_response(api_error.status, api_error.error)
}

/// Turns a body that could not be read as the expected JSON into a 400.
fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's description of the bad field
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::invalid_input(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, error)
}

fn calculation_response(
    correlation_id: Uuid,
    outcome: EngineResult<CalculationResult>,
) -> Response {
    match outcome {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %result.employee_id,
                kind = ?result.kind,
                gross_value = %result.gross_value,
                net_value = %result.net_value,
                duration_us = result.audit_trace.duration_us,
                "Calculation completed successfully"
            );
            json_response(StatusCode::OK, result)
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Calculation failed"
            );
            error_response(err)
        }
    }
}

/// Handler for POST /taxes.
async fn taxes_handler(
    State(state): State<AppState>,
    payload: Result<Json<TaxRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, route = "/taxes", "Processing calculation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let outcome = compute_payroll_taxes(&request.employee, &request.params, state.config().config());
    calculation_response(correlation_id, outcome)
}

/// Handler for POST /thirteenth.
async fn thirteenth_handler(
    State(state): State<AppState>,
    payload: Result<Json<ThirteenthRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, route = "/thirteenth", "Processing calculation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let outcome = compute_thirteenth(
        &request.employee,
        request.reference_year,
        request.payment_mode,
        state.config().config(),
    );
    calculation_response(correlation_id, outcome)
}

/// Handler for POST /vacation.
async fn vacation_handler(
    State(state): State<AppState>,
    payload: Result<Json<VacationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, route = "/vacation", "Processing calculation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let outcome = compute_vacation(&request.employee, &request.params, state.config().config());
    calculation_response(correlation_id, outcome)
}

/// Handler for POST /overtime.
async fn overtime_handler(
    State(state): State<AppState>,
    payload: Result<Json<OvertimeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, route = "/overtime", "Processing calculation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let outcome = compute_overtime(&request.employee, &request.params, state.config().config());
    calculation_response(correlation_id, outcome)
}

/// Handler for POST /batch.
///
/// The batch runs on the blocking pool since it occupies the rayon workers.
async fn batch_handler(
    State(state): State<AppState>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, route = "/batch", "Processing batch request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    if request.employee_ids.is_some() && !request.employees.is_empty() {
        warn!(correlation_id = %correlation_id, "Batch request names employees twice");
        return error_response(EngineError::invalid_input(
            "employees",
            "provide either employees or employee_ids, not both",
        ));
    }

    let outcome = tokio::task::spawn_blocking(move || {
        let config = state.config().config();
        match &request.employee_ids {
            Some(ids) => run_batch_for_ids(ids, state.directory(), &request.calculation, config),
            None => run_batch(&request.employees, &request.calculation, config),
        }
    })
    .await;

    match outcome {
        Ok(batch) => {
            info!(
                correlation_id = %correlation_id,
                batch_id = %batch.batch_id,
                entries = batch.len(),
                calculated = batch.totals.calculated_count,
                errors = batch.totals.error_count,
                net_value = %batch.totals.net_value,
                "Batch completed"
            );
            json_response(StatusCode::OK, batch)
        }
        Err(join_error) => {
            warn!(
                correlation_id = %correlation_id,
                error = %join_error,
                "Batch task failed"
            );
            error_response(EngineError::CalculationError {
                message: format!("batch task failed: {}", join_error),
            })
        }
    }
}
