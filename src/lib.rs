//! Payroll Engine for Estonian Payroll
//!
//! This crate computes monthly salary taxes, keeps employee leave balances
//! consistent with leave requests, runs payroll periods through their
//! approval lifecycle and produces the monthly TSD tax declaration as XML
//! or CSV. Storage is reached only through the [`store::PayrollStore`] port.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod declaration;
pub mod error;
pub mod leave;
pub mod models;
pub mod payroll;
pub mod store;
