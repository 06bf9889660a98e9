//! In-memory store adapter.
//!
//! Holds every tenant's tables behind a mutex. Transactions snapshot all
//! tables on `begin` and restore the snapshot on `rollback`.
//!
//! A transaction belongs to the thread that opened it and is serialized
//! against everything else: while it is open, `begin` and every read or write
//! from other threads block until it commits or rolls back. A rollback can
//! therefore only discard its owner's writes.

use std::collections::{HashMap, HashSet};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::thread::{self, ThreadId};

use uuid::Uuid;

use super::{PayrollStore, StoreError, StoreResult};
use crate::models::{
    AbsenceType, Employee, LeaveBalance, LeaveRecord, LeaveStatus, PayrollRun, PayrollRunStatus,
    Payslip, SalaryComponent, TenantId, TsdDeclaration, TsdRow,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    employees: HashMap<Uuid, Employee>,
    salary_components: Vec<SalaryComponent>,
    absence_types: HashMap<Uuid, AbsenceType>,
    leave_balances: HashMap<Uuid, LeaveBalance>,
    leave_records: HashMap<Uuid, LeaveRecord>,
    payroll_runs: HashMap<Uuid, PayrollRun>,
    payslips: Vec<Payslip>,
    declarations: HashMap<Uuid, TsdDeclaration>,
    declaration_rows: Vec<TsdRow>,
}

#[derive(Debug, Default)]
struct State {
    tenants: HashMap<TenantId, Tables>,
    snapshot: Option<HashMap<TenantId, Tables>>,
    owner: Option<ThreadId>,
}

impl State {
    fn held_elsewhere(&self, me: ThreadId) -> bool {
        self.owner.is_some_and(|owner| owner != me)
    }
}

/// A [`PayrollStore`] that keeps everything in process memory.
///
/// Besides being the default adapter, it supports fault injection: after
/// [`InMemoryStore::fail_on`] the named operation fails with
/// [`StoreError::Backend`], which lets callers exercise rollback paths.
///
/// # Example
///
/// ```
/// use payroll_engine::models::TenantId;
/// use payroll_engine::store::{InMemoryStore, PayrollStore};
/// use uuid::Uuid;
///
/// let store = InMemoryStore::new();
/// let tenant = TenantId::new("acme");
///
/// store.fail_on("get_employee");
/// assert!(store.get_employee(&tenant, Uuid::new_v4()).is_err());
///
/// store.clear_failures();
/// assert!(store.get_employee(&tenant, Uuid::new_v4()).unwrap().is_none());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    idle: Condvar,
    failures: Mutex<HashSet<String>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later call to `operation` fail until cleared.
    pub fn fail_on(&self, operation: &str) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(operation.to_string());
        }
    }

    /// Removes all injected failures.
    pub fn clear_failures(&self) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.clear();
        }
    }

    /// Number of declarations stored for a tenant.
    pub fn declaration_count(&self, tenant: &TenantId) -> usize {
        self.read("declaration_count", tenant, |t| t.declarations.len())
            .unwrap_or_default()
    }

    /// Number of declaration rows stored for a tenant, across all declarations.
    pub fn declaration_row_count(&self, tenant: &TenantId) -> usize {
        self.read("declaration_row_count", tenant, |t| t.declaration_rows.len())
            .unwrap_or_default()
    }

    fn check(&self, operation: &str) -> StoreResult<()> {
        let failures = self.failures.lock().map_err(|_| poisoned())?;
        if failures.contains(operation) {
            return Err(StoreError::Backend {
                message: format!("injected failure in {operation}"),
            });
        }
        Ok(())
    }

    /// Locks the tables once no other thread holds a transaction open.
    fn lock(&self) -> StoreResult<MutexGuard<'_, State>> {
        let me = thread::current().id();
        let state = self.state.lock().map_err(|_| poisoned())?;
        self.idle
            .wait_while(state, |state| state.held_elsewhere(me))
            .map_err(|_| poisoned())
    }

    /// Ends the calling thread's transaction, restoring the snapshot when
    /// `restore` is set, and wakes every waiter.
    fn finish(&self, restore: bool) -> StoreResult<()> {
        let mut state = self.lock()?;
        let snapshot = match state.snapshot.take() {
            Some(snapshot) => snapshot,
            None => {
                return Err(StoreError::Backend {
                    message: "no open transaction".to_string(),
                });
            }
        };
        if restore {
            state.tenants = snapshot;
        }
        state.owner = None;
        drop(state);
        self.idle.notify_all();
        Ok(())
    }

    fn read<T>(
        &self,
        operation: &str,
        tenant: &TenantId,
        f: impl FnOnce(&Tables) -> T,
    ) -> StoreResult<T> {
        self.check(operation)?;
        let state = self.lock()?;
        Ok(match state.tenants.get(tenant) {
            Some(tables) => f(tables),
            None => f(&Tables::default()),
        })
    }

    fn write<T>(
        &self,
        operation: &str,
        tenant: &TenantId,
        f: impl FnOnce(&mut Tables) -> StoreResult<T>,
    ) -> StoreResult<T> {
        self.check(operation)?;
        let mut state = self.lock()?;
        f(state.tenants.entry(tenant.clone()).or_default())
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend {
        message: "store lock poisoned".to_string(),
    }
}

fn replace<T>(slot: Option<&mut T>, value: &T, entity: &'static str, id: Uuid) -> StoreResult<()>
where
    T: Clone,
{
    match slot {
        Some(existing) => {
            *existing = value.clone();
            Ok(())
        }
        None => Err(StoreError::Missing { entity, id }),
    }
}

impl PayrollStore for InMemoryStore {
    fn begin(&self) -> StoreResult<()> {
        self.check("begin")?;
        let mut state = self.lock()?;
        // Only the owning thread gets past `lock` while one is open.
        if state.owner.is_some() {
            return Err(StoreError::Backend {
                message: "transaction already open".to_string(),
            });
        }
        state.owner = Some(thread::current().id());
        state.snapshot = Some(state.tenants.clone());
        Ok(())
    }

    fn commit(&self) -> StoreResult<()> {
        self.check("commit")?;
        self.finish(false)
    }

    fn rollback(&self) -> StoreResult<()> {
        self.finish(true)
    }

    fn get_employee(&self, tenant: &TenantId, id: Uuid) -> StoreResult<Option<Employee>> {
        self.read("get_employee", tenant, |t| t.employees.get(&id).cloned())
    }

    fn list_active_employees(&self, tenant: &TenantId) -> StoreResult<Vec<Employee>> {
        self.read("list_active_employees", tenant, |t| {
            let mut employees: Vec<_> = t.employees.values().filter(|e| e.is_active).cloned().collect();
            employees.sort_by(|a, b| {
                (&a.last_name, &a.first_name, a.id).cmp(&(&b.last_name, &b.first_name, b.id))
            });
            employees
        })
    }

    fn insert_employee(&self, tenant: &TenantId, employee: &Employee) -> StoreResult<()> {
        self.write("insert_employee", tenant, |t| {
            t.employees.insert(employee.id, employee.clone());
            Ok(())
        })
    }

    fn update_employee(&self, tenant: &TenantId, employee: &Employee) -> StoreResult<()> {
        self.write("update_employee", tenant, |t| {
            replace(t.employees.get_mut(&employee.id), employee, "employee", employee.id)
        })
    }

    fn list_salary_components(
        &self,
        tenant: &TenantId,
        employee_id: Uuid,
    ) -> StoreResult<Vec<SalaryComponent>> {
        self.read("list_salary_components", tenant, |t| {
            t.salary_components
                .iter()
                .filter(|c| c.employee_id == employee_id)
                .cloned()
                .collect()
        })
    }

    fn insert_salary_component(
        &self,
        tenant: &TenantId,
        component: &SalaryComponent,
    ) -> StoreResult<()> {
        self.write("insert_salary_component", tenant, |t| {
            t.salary_components.push(component.clone());
            Ok(())
        })
    }

    fn update_salary_component(
        &self,
        tenant: &TenantId,
        component: &SalaryComponent,
    ) -> StoreResult<()> {
        self.write("update_salary_component", tenant, |t| {
            let slot = t.salary_components.iter_mut().find(|c| c.id == component.id);
            replace(slot, component, "salary component", component.id)
        })
    }

    fn get_absence_type(&self, tenant: &TenantId, id: Uuid) -> StoreResult<Option<AbsenceType>> {
        self.read("get_absence_type", tenant, |t| t.absence_types.get(&id).cloned())
    }

    fn list_active_absence_types(&self, tenant: &TenantId) -> StoreResult<Vec<AbsenceType>> {
        self.read("list_active_absence_types", tenant, |t| {
            let mut types: Vec<_> = t.absence_types.values().filter(|a| a.is_active).cloned().collect();
            types.sort_by(|a, b| a.code.cmp(&b.code));
            types
        })
    }

    fn insert_absence_type(
        &self,
        tenant: &TenantId,
        absence_type: &AbsenceType,
    ) -> StoreResult<()> {
        self.write("insert_absence_type", tenant, |t| {
            t.absence_types.insert(absence_type.id, absence_type.clone());
            Ok(())
        })
    }

    fn get_leave_balance(&self, tenant: &TenantId, id: Uuid) -> StoreResult<Option<LeaveBalance>> {
        self.read("get_leave_balance", tenant, |t| t.leave_balances.get(&id).cloned())
    }

    fn find_leave_balance(
        &self,
        tenant: &TenantId,
        employee_id: Uuid,
        absence_type_id: Uuid,
        year: i32,
    ) -> StoreResult<Option<LeaveBalance>> {
        self.read("find_leave_balance", tenant, |t| {
            t.leave_balances
                .values()
                .find(|b| {
                    b.employee_id == employee_id
                        && b.absence_type_id == absence_type_id
                        && b.year == year
                })
                .cloned()
        })
    }

    fn list_leave_balances(
        &self,
        tenant: &TenantId,
        employee_id: Uuid,
        year: i32,
    ) -> StoreResult<Vec<LeaveBalance>> {
        self.read("list_leave_balances", tenant, |t| {
            t.leave_balances
                .values()
                .filter(|b| b.employee_id == employee_id && b.year == year)
                .cloned()
                .collect()
        })
    }

    fn insert_leave_balance(&self, tenant: &TenantId, balance: &LeaveBalance) -> StoreResult<()> {
        self.write("insert_leave_balance", tenant, |t| {
            t.leave_balances.insert(balance.id, balance.clone());
            Ok(())
        })
    }

    fn update_leave_balance(&self, tenant: &TenantId, balance: &LeaveBalance) -> StoreResult<u64> {
        self.write("update_leave_balance", tenant, |t| {
            let stored = t.leave_balances.get_mut(&balance.id).ok_or(StoreError::Missing {
                entity: "leave balance",
                id: balance.id,
            })?;
            if stored.version != balance.version {
                return Err(StoreError::Conflict {
                    entity: "leave balance",
                    id: balance.id,
                });
            }
            *stored = balance.clone();
            stored.version += 1;
            Ok(stored.version)
        })
    }

    fn get_leave_record(&self, tenant: &TenantId, id: Uuid) -> StoreResult<Option<LeaveRecord>> {
        self.read("get_leave_record", tenant, |t| t.leave_records.get(&id).cloned())
    }

    fn insert_leave_record(&self, tenant: &TenantId, record: &LeaveRecord) -> StoreResult<()> {
        self.write("insert_leave_record", tenant, |t| {
            t.leave_records.insert(record.id, record.clone());
            Ok(())
        })
    }

    fn update_leave_record_if_status(
        &self,
        tenant: &TenantId,
        record: &LeaveRecord,
        expected: LeaveStatus,
    ) -> StoreResult<u64> {
        self.write("update_leave_record_if_status", tenant, |t| {
            match t.leave_records.get_mut(&record.id) {
                Some(stored) if stored.status == expected => {
                    *stored = record.clone();
                    Ok(1)
                }
                _ => Ok(0),
            }
        })
    }

    fn get_payroll_run(&self, tenant: &TenantId, id: Uuid) -> StoreResult<Option<PayrollRun>> {
        self.read("get_payroll_run", tenant, |t| t.payroll_runs.get(&id).cloned())
    }

    fn find_payroll_run_by_period(
        &self,
        tenant: &TenantId,
        year: i32,
        month: u32,
    ) -> StoreResult<Option<PayrollRun>> {
        self.read("find_payroll_run_by_period", tenant, |t| {
            t.payroll_runs
                .values()
                .find(|r| r.period_year == year && r.period_month == month)
                .cloned()
        })
    }

    fn insert_payroll_run(&self, tenant: &TenantId, run: &PayrollRun) -> StoreResult<()> {
        self.write("insert_payroll_run", tenant, |t| {
            t.payroll_runs.insert(run.id, run.clone());
            Ok(())
        })
    }

    fn update_payroll_run(&self, tenant: &TenantId, run: &PayrollRun) -> StoreResult<()> {
        self.write("update_payroll_run", tenant, |t| {
            replace(t.payroll_runs.get_mut(&run.id), run, "payroll run", run.id)
        })
    }

    fn update_payroll_run_if_status(
        &self,
        tenant: &TenantId,
        run: &PayrollRun,
        expected: PayrollRunStatus,
    ) -> StoreResult<u64> {
        self.write("update_payroll_run_if_status", tenant, |t| {
            match t.payroll_runs.get_mut(&run.id) {
                Some(stored) if stored.status == expected => {
                    *stored = run.clone();
                    Ok(1)
                }
                _ => Ok(0),
            }
        })
    }

    fn list_payslips(&self, tenant: &TenantId, payroll_run_id: Uuid) -> StoreResult<Vec<Payslip>> {
        self.read("list_payslips", tenant, |t| {
            t.payslips
                .iter()
                .filter(|p| p.payroll_run_id == payroll_run_id)
                .cloned()
                .collect()
        })
    }

    fn delete_payslips_for_run(
        &self,
        tenant: &TenantId,
        payroll_run_id: Uuid,
    ) -> StoreResult<u64> {
        self.write("delete_payslips_for_run", tenant, |t| {
            let before = t.payslips.len();
            t.payslips.retain(|p| p.payroll_run_id != payroll_run_id);
            Ok((before - t.payslips.len()) as u64)
        })
    }

    fn insert_payslip(&self, tenant: &TenantId, payslip: &Payslip) -> StoreResult<()> {
        self.write("insert_payslip", tenant, |t| {
            t.payslips.push(payslip.clone());
            Ok(())
        })
    }

    fn get_declaration(&self, tenant: &TenantId, id: Uuid) -> StoreResult<Option<TsdDeclaration>> {
        self.read("get_declaration", tenant, |t| t.declarations.get(&id).cloned())
    }

    fn find_declaration_by_period(
        &self,
        tenant: &TenantId,
        year: i32,
        month: u32,
    ) -> StoreResult<Option<TsdDeclaration>> {
        self.read("find_declaration_by_period", tenant, |t| {
            t.declarations
                .values()
                .find(|d| d.period_year == year && d.period_month == month)
                .cloned()
        })
    }

    fn insert_declaration(
        &self,
        tenant: &TenantId,
        declaration: &TsdDeclaration,
    ) -> StoreResult<()> {
        self.write("insert_declaration", tenant, |t| {
            let mut header = declaration.clone();
            header.rows.clear();
            t.declarations.insert(header.id, header);
            Ok(())
        })
    }

    fn update_declaration(
        &self,
        tenant: &TenantId,
        declaration: &TsdDeclaration,
    ) -> StoreResult<()> {
        self.write("update_declaration", tenant, |t| {
            let mut header = declaration.clone();
            header.rows.clear();
            replace(t.declarations.get_mut(&declaration.id), &header, "declaration", declaration.id)
        })
    }

    fn delete_declaration(&self, tenant: &TenantId, id: Uuid) -> StoreResult<()> {
        self.write("delete_declaration", tenant, |t| {
            t.declarations.remove(&id).ok_or(StoreError::Missing {
                entity: "declaration",
                id,
            })?;
            t.declaration_rows.retain(|r| r.declaration_id != id);
            Ok(())
        })
    }

    fn list_declaration_rows(
        &self,
        tenant: &TenantId,
        declaration_id: Uuid,
    ) -> StoreResult<Vec<TsdRow>> {
        self.read("list_declaration_rows", tenant, |t| {
            t.declaration_rows
                .iter()
                .filter(|r| r.declaration_id == declaration_id)
                .cloned()
                .collect()
        })
    }

    fn insert_declaration_row(&self, tenant: &TenantId, row: &TsdRow) -> StoreResult<()> {
        self.write("insert_declaration_row", tenant, |t| {
            t.declaration_rows.push(row.clone());
            Ok(())
        })
    }
}
