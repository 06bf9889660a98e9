//! Calculation logic for the payroll engine.
//!
//! This module contains the pure functions the engine is built on: the
//! statutory tax breakdown, personal code checksum validation, effective
//! base salary lookup and working-day counting. None of them touch storage.

mod personal_code;
mod salary;
mod tax;
mod working_days;

pub use personal_code::validate_personal_code;
pub use salary::current_base_salary;
pub use tax::{TaxBreakdown, TaxCalculator, round_money};
pub use working_days::count_working_days;
