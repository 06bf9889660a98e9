//! Persistence port for the payroll engine.
//!
//! The engine never talks to a database directly. Everything it reads or
//! writes goes through the [`PayrollStore`] trait, keyed by a [`TenantId`]
//! scope and an entity id. [`InMemoryStore`] is the in-process adapter used
//! by tests and embedders that do not need durable storage.
//!
//! ```text
//! LeaveLedger ─┐
//! PayrollEngine ├──► PayrollStore ──► InMemoryStore / database adapter
//! DeclarationGenerator ─┘
//! ```

mod memory;

use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    AbsenceType, Employee, LeaveBalance, LeaveRecord, PayrollRun, PayrollRunStatus, Payslip,
    LeaveStatus, SalaryComponent, TenantId, TsdDeclaration, TsdRow,
};

pub use memory::InMemoryStore;

/// Errors raised by a store adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The row changed since it was read.
    #[error("Version conflict on {entity} {id}")]
    Conflict {
        /// The kind of entity.
        entity: &'static str,
        /// The entity id.
        id: Uuid,
    },

    /// A write targeted a row that does not exist.
    #[error("{entity} {id} does not exist")]
    Missing {
        /// The kind of entity.
        entity: &'static str,
        /// The entity id.
        id: Uuid,
    },

    /// The backend rejected the operation.
    #[error("Store backend error: {message}")]
    Backend {
        /// Backend-specific description.
        message: String,
    },
}

/// A type alias for Results that return StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

fn rollback_quietly<S: PayrollStore + ?Sized>(store: &S) {
    if let Err(rollback_err) = store.rollback() {
        tracing::error!(error = %rollback_err, "Rollback failed");
    }
}

/// CRUD access to every entity the engine uses, plus a transaction scope.
///
/// Lookups return `Ok(None)` for missing rows; the engine decides which
/// not-found error to raise. Writes to missing rows fail with
/// [`StoreError::Missing`].
pub trait PayrollStore {
    /// Opens a transaction scope.
    ///
    /// Scopes opened by different callers are isolated: a rollback discards
    /// only the writes made inside its own scope.
    fn begin(&self) -> StoreResult<()>;

    /// Makes every write since [`PayrollStore::begin`] durable.
    fn commit(&self) -> StoreResult<()>;

    /// Discards every write since [`PayrollStore::begin`].
    fn rollback(&self) -> StoreResult<()>;

    /// Runs `work` inside a transaction scope.
    ///
    /// Commits when `work` returns `Ok` and rolls back when it returns `Err`
    /// or the commit itself fails, so either every write inside `work` is
    /// kept or none is.
    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        Self: Sized,
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<StoreError>,
    {
        self.begin()?;
        match work(self) {
            Ok(value) => match self.commit() {
                Ok(()) => Ok(value),
                Err(commit_err) => {
                    rollback_quietly(self);
                    Err(commit_err.into())
                }
            },
            Err(err) => {
                rollback_quietly(self);
                Err(err)
            }
        }
    }

    // Employees

    /// Loads an employee.
    fn get_employee(&self, tenant: &TenantId, id: Uuid) -> StoreResult<Option<Employee>>;
    /// Lists employees with `is_active` set.
    fn list_active_employees(&self, tenant: &TenantId) -> StoreResult<Vec<Employee>>;
    /// Inserts an employee.
    fn insert_employee(&self, tenant: &TenantId, employee: &Employee) -> StoreResult<()>;
    /// Overwrites an employee.
    fn update_employee(&self, tenant: &TenantId, employee: &Employee) -> StoreResult<()>;

    // Salary components

    /// Lists all salary components of an employee.
    fn list_salary_components(
        &self,
        tenant: &TenantId,
        employee_id: Uuid,
    ) -> StoreResult<Vec<SalaryComponent>>;
    /// Inserts a salary component.
    fn insert_salary_component(
        &self,
        tenant: &TenantId,
        component: &SalaryComponent,
    ) -> StoreResult<()>;
    /// Overwrites a salary component.
    fn update_salary_component(
        &self,
        tenant: &TenantId,
        component: &SalaryComponent,
    ) -> StoreResult<()>;

    // Absence types

    /// Loads an absence type.
    fn get_absence_type(&self, tenant: &TenantId, id: Uuid) -> StoreResult<Option<AbsenceType>>;
    /// Lists absence types with `is_active` set.
    fn list_active_absence_types(&self, tenant: &TenantId) -> StoreResult<Vec<AbsenceType>>;
    /// Inserts an absence type.
    fn insert_absence_type(&self, tenant: &TenantId, absence_type: &AbsenceType)
    -> StoreResult<()>;

    // Leave balances

    /// Loads a balance by id.
    fn get_leave_balance(&self, tenant: &TenantId, id: Uuid) -> StoreResult<Option<LeaveBalance>>;
    /// Finds the balance for (employee, absence type, year).
    fn find_leave_balance(
        &self,
        tenant: &TenantId,
        employee_id: Uuid,
        absence_type_id: Uuid,
        year: i32,
    ) -> StoreResult<Option<LeaveBalance>>;
    /// Lists an employee's balances for a year.
    fn list_leave_balances(
        &self,
        tenant: &TenantId,
        employee_id: Uuid,
        year: i32,
    ) -> StoreResult<Vec<LeaveBalance>>;
    /// Inserts a balance.
    fn insert_leave_balance(&self, tenant: &TenantId, balance: &LeaveBalance) -> StoreResult<()>;
    /// Compare-and-set update on `balance.version`.
    ///
    /// Succeeds only if the stored version equals `balance.version`; the
    /// stored copy gets the next version, which is returned. A mismatch
    /// fails with [`StoreError::Conflict`].
    fn update_leave_balance(&self, tenant: &TenantId, balance: &LeaveBalance) -> StoreResult<u64>;

    // Leave records

    /// Loads a leave record.
    fn get_leave_record(&self, tenant: &TenantId, id: Uuid) -> StoreResult<Option<LeaveRecord>>;
    /// Inserts a leave record.
    fn insert_leave_record(&self, tenant: &TenantId, record: &LeaveRecord) -> StoreResult<()>;
    /// Overwrites a leave record only if its stored status is `expected`.
    ///
    /// Returns the number of rows affected: 0 when the record is missing or
    /// has already moved on, 1 otherwise.
    fn update_leave_record_if_status(
        &self,
        tenant: &TenantId,
        record: &LeaveRecord,
        expected: LeaveStatus,
    ) -> StoreResult<u64>;

    // Payroll runs

    /// Loads a payroll run.
    fn get_payroll_run(&self, tenant: &TenantId, id: Uuid) -> StoreResult<Option<PayrollRun>>;
    /// Finds the run for a period.
    fn find_payroll_run_by_period(
        &self,
        tenant: &TenantId,
        year: i32,
        month: u32,
    ) -> StoreResult<Option<PayrollRun>>;
    /// Inserts a payroll run.
    fn insert_payroll_run(&self, tenant: &TenantId, run: &PayrollRun) -> StoreResult<()>;
    /// Overwrites a payroll run.
    fn update_payroll_run(&self, tenant: &TenantId, run: &PayrollRun) -> StoreResult<()>;
    /// Overwrites a payroll run only if its stored status is `expected`.
    ///
    /// Returns the number of rows affected: 0 when the run is missing or in
    /// another status, 1 otherwise.
    fn update_payroll_run_if_status(
        &self,
        tenant: &TenantId,
        run: &PayrollRun,
        expected: PayrollRunStatus,
    ) -> StoreResult<u64>;

    // Payslips

    /// Lists the payslips of a run.
    fn list_payslips(&self, tenant: &TenantId, payroll_run_id: Uuid) -> StoreResult<Vec<Payslip>>;
    /// Deletes every payslip of a run, returning how many were removed.
    fn delete_payslips_for_run(&self, tenant: &TenantId, payroll_run_id: Uuid)
    -> StoreResult<u64>;
    /// Inserts a payslip.
    fn insert_payslip(&self, tenant: &TenantId, payslip: &Payslip) -> StoreResult<()>;

    // Declarations

    /// Loads a declaration header (rows left empty).
    fn get_declaration(&self, tenant: &TenantId, id: Uuid) -> StoreResult<Option<TsdDeclaration>>;
    /// Finds the declaration for a period (rows left empty).
    fn find_declaration_by_period(
        &self,
        tenant: &TenantId,
        year: i32,
        month: u32,
    ) -> StoreResult<Option<TsdDeclaration>>;
    /// Inserts a declaration header.
    fn insert_declaration(&self, tenant: &TenantId, declaration: &TsdDeclaration)
    -> StoreResult<()>;
    /// Overwrites a declaration header.
    fn update_declaration(&self, tenant: &TenantId, declaration: &TsdDeclaration)
    -> StoreResult<()>;
    /// Deletes a declaration and all of its rows.
    fn delete_declaration(&self, tenant: &TenantId, id: Uuid) -> StoreResult<()>;
    /// Lists a declaration's rows in insertion order.
    fn list_declaration_rows(&self, tenant: &TenantId, declaration_id: Uuid)
    -> StoreResult<Vec<TsdRow>>;
    /// Inserts a declaration row.
    fn insert_declaration_row(&self, tenant: &TenantId, row: &TsdRow) -> StoreResult<()>;
}
