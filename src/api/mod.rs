//! HTTP API module for the payroll engine.
//!
//! This module provides the JSON endpoints that expose the calculators and
//! the batch runner to presentation and export collaborators.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{BatchRequest, OvertimeRequest, TaxRequest, ThirteenthRequest, VacationRequest};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
