//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the engine can report: bad input, missing entities,
//! business-rule conflicts, configuration problems and persistence failures.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

/// The main error type for the payroll engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/file.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/file.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No rate table is effective on the given date.
    #[error("No rate table effective on {date}")]
    RateNotFound {
        /// The date for which rates were requested.
        date: NaiveDate,
    },

    /// A request field was missing or malformed.
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The offending field.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// A payroll period was outside the accepted range.
    #[error("Invalid payroll period {year}-{month:02}")]
    InvalidPeriod {
        /// The requested year.
        year: i32,
        /// The requested month.
        month: u32,
    },

    /// Employee does not exist in the tenant.
    #[error("Employee not found: {id}")]
    EmployeeNotFound {
        /// The employee id.
        id: Uuid,
    },

    /// Absence type does not exist in the tenant.
    #[error("Absence type not found: {id}")]
    AbsenceTypeNotFound {
        /// The absence type id.
        id: Uuid,
    },

    /// Leave record does not exist in the tenant.
    #[error("Leave record not found: {id}")]
    LeaveRecordNotFound {
        /// The leave record id.
        id: Uuid,
    },

    /// Leave balance does not exist in the tenant.
    #[error("Leave balance not found: {id}")]
    LeaveBalanceNotFound {
        /// The leave balance id.
        id: Uuid,
    },

    /// Payroll run does not exist, or was not in the status an update required.
    #[error("Payroll run not found: {id}")]
    PayrollRunNotFound {
        /// The payroll run id.
        id: Uuid,
    },

    /// Declaration does not exist in the tenant.
    #[error("Declaration not found: {id}")]
    DeclarationNotFound {
        /// The declaration id.
        id: Uuid,
    },

    /// The balance cannot cover the requested days.
    #[error("Insufficient leave balance: requested {requested} days, {remaining} remaining")]
    InsufficientLeaveBalance {
        /// Working days requested.
        requested: Decimal,
        /// Days left on the balance.
        remaining: Decimal,
    },

    /// The leave record has already been decided.
    #[error("Leave record {id} is not pending (status: {status})")]
    LeaveRecordNotPending {
        /// The leave record id.
        id: Uuid,
        /// The record's current status.
        status: String,
    },

    /// A status change that the entity's lifecycle does not allow.
    #[error("Invalid {entity} status transition from {from} to {to}")]
    InvalidStatusTransition {
        /// The kind of entity (e.g. "payroll run").
        entity: &'static str,
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },

    /// A payroll run already exists for the period.
    #[error("Payroll run already exists for {year}-{month:02}")]
    PayrollRunExists {
        /// Period year.
        year: i32,
        /// Period month.
        month: u32,
    },

    /// A balance already exists for (employee, absence type, year).
    #[error("Leave balance already exists for employee {employee_id} in {year}")]
    LeaveBalanceExists {
        /// The employee id.
        employee_id: Uuid,
        /// The balance year.
        year: i32,
    },

    /// The run has no payslips to declare.
    #[error("No payslips for payroll run {run_id}")]
    NoPayslips {
        /// The payroll run id.
        run_id: Uuid,
    },

    /// Another writer changed the row between read and write.
    #[error("Concurrent modification of {entity} {id}")]
    ConcurrentModification {
        /// The kind of entity.
        entity: &'static str,
        /// The entity id.
        id: Uuid,
    },

    /// The underlying store rejected a read or write.
    #[error("Persistence failure during {operation}: {source}")]
    Persistence {
        /// The engine operation that was running.
        operation: &'static str,
        /// The store's error.
        #[source]
        source: StoreError,
    },

    /// Declaration export failed.
    #[error("Export error: {message}")]
    Export {
        /// A description of the failure.
        message: String,
    },
}

impl EngineError {
    /// Wraps a store error with the name of the engine operation that hit it.
    ///
    /// Version conflicts become [`EngineError::ConcurrentModification`] so
    /// callers can tell them apart from backend failures.
    pub fn persistence(operation: &'static str, source: StoreError) -> Self {
        match source {
            StoreError::Conflict { entity, id } => EngineError::ConcurrentModification { entity, id },
            source => EngineError::Persistence { operation, source },
        }
    }

    /// Shorthand for an [`EngineError::InvalidInput`].
    pub fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Returns a mapper that wraps store errors with `operation`, for use with
/// `map_err`.
pub(crate) fn during(operation: &'static str) -> impl Fn(StoreError) -> EngineError {
    move |source| EngineError::persistence(operation, source)
}

impl From<StoreError> for EngineError {
    fn from(source: StoreError) -> Self {
        EngineError::persistence("transaction", source)
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
