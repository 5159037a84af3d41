//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod batch;
mod calculation_result;
mod directory;
mod employee;
mod time_record;

pub use batch::{BatchResult, BatchTotals};
pub use calculation_result::{
    AuditStep, AuditTrace, AuditWarning, CalculationDetails, CalculationKind, CalculationResult,
    CalculationStatus, DeductionLine, Deductions, ENGINE_VERSION, OvertimeDetails, PaymentMode,
    TaxDetails, ThirteenthDetails, VacationDetails,
};
pub use directory::{EmployeeDirectory, InMemoryDirectory};
pub use employee::EmployeeCompensationInput;
pub use time_record::{Break, TimeRecord};
