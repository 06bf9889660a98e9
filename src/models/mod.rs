//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod declaration;
mod employee;
mod leave;
mod payroll_run;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use declaration::{
    DeclarationStatus, DeclarationTotals, Organization, PaymentType, TsdDeclaration, TsdRow,
};
pub use employee::{ComponentType, Employee, SalaryComponent};
pub use leave::{
    AbsenceType, CreateLeaveRecordRequest, LeaveBalance, LeaveBalanceUpdate, LeaveRecord,
    LeaveRecordView, LeaveStatus,
};
pub use payroll_run::{
    PaymentStatus, PayrollRun, PayrollRunStatus, PayrollTotals, Payslip, PayslipView,
};

/// Identifies the tenant whose data an operation reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TenantId(String);

impl TenantId {
    /// Creates a tenant id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
