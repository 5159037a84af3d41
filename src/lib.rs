//! Statutory payroll engine for Brazilian labour law
//!
//! This crate computes INSS and IRRF withholding, FGTS deposits, union
//! contributions, the 13th salary, vacation pay and overtime from effective-dated
//! statutory tables, and runs any of those calculations over many employees.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
