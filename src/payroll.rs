//! Payroll run lifecycle: creation, calculation, approval and payment.
//!
//! A run moves through `DRAFT → CALCULATED → APPROVED → PAID → DECLARED`.
//! Calculation replaces the run's payslips wholesale and is the only step
//! that writes more than one row, so it runs inside a single store
//! transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calculation::{TaxCalculator, current_base_salary};
use crate::config::RateSchedule;
use crate::error::{EngineError, EngineResult, during};
use crate::models::{
    ComponentType, PayrollRun, PayrollRunStatus, PayrollTotals, Payslip, PayslipView,
    SalaryComponent, TenantId,
};
use crate::store::PayrollStore;

/// Earliest accepted payroll year.
pub const MIN_PERIOD_YEAR: i32 = 2020;
/// Latest accepted payroll year.
pub const MAX_PERIOD_YEAR: i32 = 2100;

/// Drives payroll runs for one tenant.
///
/// The engine holds the rate schedule and picks the rate table effective
/// on the first day of each run's period, so a run for December 2024 and
/// one for January 2025 can use different rates.
///
/// # Example
///
/// ```
/// use payroll_engine::config::{RateSchedule, RateTable};
/// use payroll_engine::models::{PayrollRunStatus, TenantId};
/// use payroll_engine::payroll::PayrollEngine;
/// use payroll_engine::store::InMemoryStore;
/// use std::sync::Arc;
///
/// let engine = PayrollEngine::new(
///     Arc::new(InMemoryStore::new()),
///     TenantId::new("acme"),
///     RateSchedule::from(RateTable::estonia_2025()),
/// );
///
/// let run = engine.create_payroll_run(2025, 3, None, None, None).unwrap();
/// assert_eq!(run.status, PayrollRunStatus::Draft);
/// assert!(run.totals().is_none());
/// ```
pub struct PayrollEngine<S> {
    store: Arc<S>,
    tenant: TenantId,
    schedule: RateSchedule,
}

impl<S: PayrollStore> PayrollEngine<S> {
    /// Creates an engine over `store`, scoped to `tenant`.
    pub fn new(store: Arc<S>, tenant: TenantId, schedule: RateSchedule) -> Self {
        Self {
            store,
            tenant,
            schedule,
        }
    }

    /// Creates a `DRAFT` run for the period.
    ///
    /// # Errors
    ///
    /// - `InvalidPeriod` if the year is outside 2020..=2100 or the month outside 1..=12
    /// - `PayrollRunExists` if the tenant already has a run for the period
    pub fn create_payroll_run(
        &self,
        year: i32,
        month: u32,
        payment_date: Option<NaiveDate>,
        notes: Option<String>,
        created_by: Option<Uuid>,
    ) -> EngineResult<PayrollRun> {
        const OP: &str = "create_payroll_run";

        if !(MIN_PERIOD_YEAR..=MAX_PERIOD_YEAR).contains(&year) || !(1..=12).contains(&month) {
            return Err(EngineError::InvalidPeriod { year, month });
        }

        let run = PayrollRun {
            id: Uuid::new_v4(),
            period_year: year,
            period_month: month,
            status: PayrollRunStatus::Draft,
            payment_date,
            total_gross: Decimal::ZERO,
            total_net: Decimal::ZERO,
            total_employer_cost: Decimal::ZERO,
            notes,
            created_by,
            approved_by: None,
            approved_at: None,
            created_at: Utc::now(),
        };

        self.store.atomically(|store| {
            let existing = store
                .find_payroll_run_by_period(&self.tenant, year, month)
                .map_err(during(OP))?;
            if existing.is_some() {
                return Err(EngineError::PayrollRunExists { year, month });
            }
            store
                .insert_payroll_run(&self.tenant, &run)
                .map_err(during(OP))
        })?;

        info!(tenant = %self.tenant, run_id = %run.id, period = %run.period_code(), "Payroll run created");
        Ok(run)
    }

    /// Loads a run by id.
    pub fn get_payroll_run(&self, id: Uuid) -> EngineResult<PayrollRun> {
        self.load_run(id, "get_payroll_run")
    }

    /// Calculates payslips for every active employee with a base salary.
    ///
    /// Equivalent to [`PayrollEngine::calculate_payroll_at`] with the current
    /// time.
    pub fn calculate_payroll(&self, run_id: Uuid) -> EngineResult<PayrollRun> {
        self.calculate_payroll_at(run_id, Utc::now())
    }

    /// Calculates payslips with salaries read as of `now`.
    ///
    /// Employees whose base salary on `now`'s date is zero are skipped. Any
    /// payslips already stored for the run are replaced. The run must be
    /// `DRAFT`; on success it is `CALCULATED` with totals attached.
    pub fn calculate_payroll_at(
        &self,
        run_id: Uuid,
        now: DateTime<Utc>,
    ) -> EngineResult<PayrollRun> {
        const OP: &str = "calculate_payroll";

        let mut run = self.load_run(run_id, OP)?;
        let previous = run.status;
        run.status = previous.transition_to(PayrollRunStatus::Calculated)?;

        let rates = self.schedule.rate_table_for(run.period_start()?)?;
        let calculator = TaxCalculator::new(rates.clone());
        let today = now.date_naive();

        let employees = self
            .store
            .list_active_employees(&self.tenant)
            .map_err(during(OP))?;

        let mut payslips = Vec::with_capacity(employees.len());
        let mut totals = PayrollTotals::default();
        for employee in &employees {
            let components = match self.store.list_salary_components(&self.tenant, employee.id) {
                Ok(components) => components,
                Err(error) => {
                    warn!(employee_id = %employee.id, %error, "Salary unavailable, skipping employee");
                    continue;
                }
            };

            let gross = current_base_salary(&components, today);
            if gross <= Decimal::ZERO {
                debug!(employee_id = %employee.id, "No base salary, skipping employee");
                continue;
            }

            let breakdown = calculator.calculate(
                gross,
                employee.exemption_amount(),
                employee.funded_pension_rate,
            );
            let payslip = Payslip::from_breakdown(run.id, employee.id, &breakdown, now);
            totals.add(&payslip);
            payslips.push(payslip);
        }

        run.total_gross = totals.gross;
        run.total_net = totals.net;
        run.total_employer_cost = totals.employer_cost;

        self.store.atomically(|store| {
            let removed = store
                .delete_payslips_for_run(&self.tenant, run.id)
                .map_err(during(OP))?;
            if removed > 0 {
                debug!(run_id = %run.id, removed, "Replaced existing payslips");
            }
            for payslip in &payslips {
                store
                    .insert_payslip(&self.tenant, payslip)
                    .map_err(during(OP))?;
            }
            let updated = store
                .update_payroll_run_if_status(&self.tenant, &run, previous)
                .map_err(during(OP))?;
            if updated == 0 {
                return Err(EngineError::ConcurrentModification {
                    entity: "payroll run",
                    id: run.id,
                });
            }
            Ok(())
        })?;

        info!(
            tenant = %self.tenant,
            run_id = %run.id,
            period = %run.period_code(),
            employees = payslips.len(),
            skipped = employees.len() - payslips.len(),
            total_gross = %totals.gross,
            total_net = %totals.net,
            total_employer_cost = %totals.employer_cost,
            "Payroll calculated"
        );
        Ok(run)
    }

    /// Approves a `CALCULATED` run.
    ///
    /// The write only lands if the stored run is still `CALCULATED`. A run in
    /// any other status is reported as [`EngineError::PayrollRunNotFound`],
    /// the same as a missing one.
    pub fn approve_payroll_run(&self, run_id: Uuid, approver: Uuid) -> EngineResult<PayrollRun> {
        const OP: &str = "approve_payroll_run";

        let mut run = self.load_run(run_id, OP)?;
        run.status = PayrollRunStatus::Approved;
        run.approved_by = Some(approver);
        run.approved_at = Some(Utc::now());

        let updated = self
            .store
            .update_payroll_run_if_status(&self.tenant, &run, PayrollRunStatus::Calculated)
            .map_err(during(OP))?;
        if updated == 0 {
            return Err(EngineError::PayrollRunNotFound { id: run_id });
        }

        info!(tenant = %self.tenant, run_id = %run_id, approver = %approver, "Payroll run approved");
        Ok(run)
    }

    /// Marks an `APPROVED` run as paid.
    pub fn mark_payroll_run_paid(&self, run_id: Uuid) -> EngineResult<PayrollRun> {
        self.advance(run_id, PayrollRunStatus::Paid, "mark_payroll_run_paid")
    }

    /// Marks a `PAID` run as declared.
    pub fn mark_payroll_run_declared(&self, run_id: Uuid) -> EngineResult<PayrollRun> {
        self.advance(run_id, PayrollRunStatus::Declared, "mark_payroll_run_declared")
    }

    /// Lists a run's payslips with their employees attached.
    pub fn payslips_with_employees(&self, run_id: Uuid) -> EngineResult<Vec<PayslipView>> {
        const OP: &str = "payslips_with_employees";

        self.load_run(run_id, OP)?;
        let payslips = self
            .store
            .list_payslips(&self.tenant, run_id)
            .map_err(during(OP))?;

        payslips
            .into_iter()
            .map(|payslip| {
                let employee = self
                    .store
                    .get_employee(&self.tenant, payslip.employee_id)
                    .map_err(during(OP))?;
                Ok(PayslipView { payslip, employee })
            })
            .collect()
    }

    /// Sets an employee's recurring base salary from `effective_from`.
    ///
    /// The currently open base salary, if any, is closed the day before
    /// `effective_from`, so at most one base salary is open at a time.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if `amount` is not positive, or `effective_from` does
    ///   not fall after the start of the open base salary
    /// - `EmployeeNotFound` if the employee does not exist
    pub fn set_base_salary(
        &self,
        employee_id: Uuid,
        amount: Decimal,
        effective_from: NaiveDate,
    ) -> EngineResult<SalaryComponent> {
        const OP: &str = "set_base_salary";

        if amount <= Decimal::ZERO {
            return Err(EngineError::invalid_input("amount", "must be positive"));
        }
        self.store
            .get_employee(&self.tenant, employee_id)
            .map_err(during(OP))?
            .ok_or(EngineError::EmployeeNotFound { id: employee_id })?;

        let closing_date = effective_from.pred_opt().ok_or_else(|| {
            EngineError::invalid_input("effective_from", format!("{effective_from} has no previous day"))
        })?;

        let component = SalaryComponent {
            id: Uuid::new_v4(),
            employee_id,
            component_type: ComponentType::BaseSalary,
            amount,
            is_recurring: true,
            effective_from,
            effective_to: None,
            created_at: Utc::now(),
        };

        self.store.atomically(|store| {
            let open = store
                .list_salary_components(&self.tenant, employee_id)
                .map_err(during(OP))?
                .into_iter()
                .filter(SalaryComponent::is_open_base_salary);

            for mut previous in open {
                if previous.effective_from >= effective_from {
                    return Err(EngineError::invalid_input(
                        "effective_from",
                        format!(
                            "{effective_from} is not after the open base salary starting {}",
                            previous.effective_from
                        ),
                    ));
                }
                previous.effective_to = Some(closing_date);
                store
                    .update_salary_component(&self.tenant, &previous)
                    .map_err(during(OP))?;
            }

            store
                .insert_salary_component(&self.tenant, &component)
                .map_err(during(OP))
        })?;

        info!(
            tenant = %self.tenant,
            employee_id = %employee_id,
            amount = %amount,
            effective_from = %effective_from,
            "Base salary set"
        );
        Ok(component)
    }

    fn load_run(&self, id: Uuid, op: &'static str) -> EngineResult<PayrollRun> {
        self.store
            .get_payroll_run(&self.tenant, id)
            .map_err(during(op))?
            .ok_or(EngineError::PayrollRunNotFound { id })
    }

    fn advance(
        &self,
        run_id: Uuid,
        next: PayrollRunStatus,
        op: &'static str,
    ) -> EngineResult<PayrollRun> {
        let mut run = self.load_run(run_id, op)?;
        let previous = run.status;
        run.status = previous.transition_to(next)?;

        let updated = self
            .store
            .update_payroll_run_if_status(&self.tenant, &run, previous)
            .map_err(during(op))?;
        if updated == 0 {
            return Err(EngineError::ConcurrentModification {
                entity: "payroll run",
                id: run_id,
            });
        }

        info!(
            tenant = %self.tenant,
            run_id = %run_id,
            period = %run.period_code(),
            from = %previous,
            to = %next,
            "Payroll run status changed"
        );
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateTable;
    use crate::models::Employee;
    use crate::store::InMemoryStore;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn dec(n: i64, scale: u32) -> Decimal {
        Decimal::new(n, scale)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn march_15() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap()
    }

    fn tenant() -> TenantId {
        TenantId::new("acme")
    }

    fn employee(last_name: &str, code: &str, is_active: bool) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            first_name: "Mari".to_string(),
            last_name: last_name.to_string(),
            personal_code: code.to_string(),
            start_date: date(2024, 1, 1),
            end_date: None,
            is_active,
            tax_resident: true,
            apply_basic_exemption: true,
            basic_exemption_amount: dec(700, 0),
            funded_pension_rate: dec(2, 2),
        }
    }

    fn engine(store: &Arc<InMemoryStore>) -> PayrollEngine<InMemoryStore> {
        PayrollEngine::new(
            store.clone(),
            tenant(),
            RateSchedule::from(RateTable::estonia_2025()),
        )
    }

    struct Fixture {
        store: Arc<InMemoryStore>,
        engine: PayrollEngine<InMemoryStore>,
        paid: Employee,
        unpaid: Employee,
    }

    fn setup() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let engine = engine(&store);

        let paid = employee("Tamm", "48001010005", true);
        let unpaid = employee("Kask", "38001010009", true);
        let former = employee("Saar", "39005151236", false);
        for e in [&paid, &unpaid, &former] {
            store.insert_employee(&tenant(), e).unwrap();
        }
        engine
            .set_base_salary(paid.id, dec(2000, 0), date(2025, 1, 1))
            .unwrap();
        engine
            .set_base_salary(former.id, dec(3000, 0), date(2025, 1, 1))
            .unwrap();

        Fixture {
            store,
            engine,
            paid,
            unpaid,
        }
    }

    #[test]
    fn test_create_run_validates_period() {
        let f = setup();
        for (year, month) in [(2019, 1), (2101, 1), (2025, 0), (2025, 13)] {
            assert!(matches!(
                f.engine.create_payroll_run(year, month, None, None, None),
                Err(EngineError::InvalidPeriod { .. })
            ));
        }
        assert!(f.engine.create_payroll_run(2020, 1, None, None, None).is_ok());
        assert!(f.engine.create_payroll_run(2100, 12, None, None, None).is_ok());
    }

    #[test]
    fn test_duplicate_period_is_rejected() {
        let f = setup();
        f.engine.create_payroll_run(2025, 3, None, None, None).unwrap();
        assert!(matches!(
            f.engine.create_payroll_run(2025, 3, None, None, None),
            Err(EngineError::PayrollRunExists { year: 2025, month: 3 })
        ));
    }

    #[test]
    fn test_calculate_builds_payslips_and_totals() {
        let f = setup();
        let run = f
            .engine
            .create_payroll_run(2025, 3, Some(date(2025, 4, 10)), None, None)
            .unwrap();

        let calculated = f.engine.calculate_payroll_at(run.id, march_15()).unwrap();
        assert_eq!(calculated.status, PayrollRunStatus::Calculated);

        let totals = calculated.totals().unwrap();
        assert_eq!(totals.gross, dec(200000, 2));
        assert_eq!(totals.net, dec(164200, 2));
        assert_eq!(totals.employer_cost, dec(267600, 2));

        let payslips = f.store.list_payslips(&tenant(), run.id).unwrap();
        assert_eq!(payslips.len(), 1);
        assert_eq!(payslips[0].employee_id, f.paid.id);
        assert_eq!(payslips[0].income_tax, dec(28600, 2));
        assert_eq!(payslips[0].social_tax, dec(66000, 2));

        assert_eq!(f.engine.get_payroll_run(run.id).unwrap(), calculated);
    }

    #[test]
    fn test_calculate_twice_fails_on_status() {
        let f = setup();
        let run = f.engine.create_payroll_run(2025, 3, None, None, None).unwrap();
        f.engine.calculate_payroll_at(run.id, march_15()).unwrap();

        assert!(matches!(
            f.engine.calculate_payroll_at(run.id, march_15()),
            Err(EngineError::InvalidStatusTransition { entity: "payroll run", .. })
        ));
    }

    #[test]
    fn test_calculate_replaces_stale_payslips() {
        let f = setup();
        let run = f.engine.create_payroll_run(2025, 3, None, None, None).unwrap();

        let stale = Payslip::from_breakdown(
            run.id,
            f.unpaid.id,
            &TaxCalculator::default().calculate(dec(100, 0), Decimal::ZERO, Decimal::ZERO),
            march_15(),
        );
        f.store.insert_payslip(&tenant(), &stale).unwrap();

        f.engine.calculate_payroll_at(run.id, march_15()).unwrap();
        let payslips = f.store.list_payslips(&tenant(), run.id).unwrap();
        assert_eq!(payslips.len(), 1);
        assert_ne!(payslips[0].id, stale.id);
    }

    #[test]
    fn test_calculate_reads_salary_as_of_now() {
        let f = setup();
        f.engine
            .set_base_salary(f.paid.id, dec(2500, 0), date(2025, 4, 1))
            .unwrap();
        let run = f.engine.create_payroll_run(2025, 3, None, None, None).unwrap();

        let calculated = f.engine.calculate_payroll_at(run.id, march_15()).unwrap();
        assert_eq!(calculated.total_gross, dec(2000, 0));
    }

    #[test]
    fn test_calculate_without_rates_for_period_fails() {
        let f = setup();
        let run = f.engine.create_payroll_run(2024, 12, None, None, None).unwrap();
        assert!(matches!(
            f.engine.calculate_payroll_at(run.id, march_15()),
            Err(EngineError::RateNotFound { .. })
        ));
        assert_eq!(
            f.engine.get_payroll_run(run.id).unwrap().status,
            PayrollRunStatus::Draft
        );
    }

    #[test]
    fn test_failed_calculation_rolls_back_everything() {
        let f = setup();
        let run = f.engine.create_payroll_run(2025, 3, None, None, None).unwrap();

        f.store.fail_on("update_payroll_run_if_status");
        let err = f.engine.calculate_payroll_at(run.id, march_15()).unwrap_err();
        assert!(matches!(err, EngineError::Persistence { operation: "calculate_payroll", .. }));
        f.store.clear_failures();

        assert!(f.store.list_payslips(&tenant(), run.id).unwrap().is_empty());
        let stored = f.engine.get_payroll_run(run.id).unwrap();
        assert_eq!(stored.status, PayrollRunStatus::Draft);
        assert_eq!(stored.total_gross, Decimal::ZERO);
    }

    #[test]
    fn test_approve_requires_calculated() {
        let f = setup();
        let run = f.engine.create_payroll_run(2025, 3, None, None, None).unwrap();
        let approver = Uuid::new_v4();

        assert!(matches!(
            f.engine.approve_payroll_run(run.id, approver),
            Err(EngineError::PayrollRunNotFound { id }) if id == run.id
        ));

        f.engine.calculate_payroll_at(run.id, march_15()).unwrap();
        let approved = f.engine.approve_payroll_run(run.id, approver).unwrap();
        assert_eq!(approved.status, PayrollRunStatus::Approved);
        assert_eq!(approved.approved_by, Some(approver));
        assert!(approved.approved_at.is_some());

        assert!(matches!(
            f.engine.approve_payroll_run(run.id, approver),
            Err(EngineError::PayrollRunNotFound { .. })
        ));
    }

    #[test]
    fn test_approve_missing_run_is_not_found() {
        let f = setup();
        assert!(matches!(
            f.engine.approve_payroll_run(Uuid::new_v4(), Uuid::new_v4()),
            Err(EngineError::PayrollRunNotFound { .. })
        ));
    }

    #[test]
    fn test_paid_and_declared_follow_lifecycle() {
        let f = setup();
        let run = f.engine.create_payroll_run(2025, 3, None, None, None).unwrap();

        assert!(matches!(
            f.engine.mark_payroll_run_paid(run.id),
            Err(EngineError::InvalidStatusTransition { .. })
        ));

        f.engine.calculate_payroll_at(run.id, march_15()).unwrap();
        f.engine.approve_payroll_run(run.id, Uuid::new_v4()).unwrap();
        assert!(matches!(
            f.engine.mark_payroll_run_declared(run.id),
            Err(EngineError::InvalidStatusTransition { .. })
        ));

        let paid = f.engine.mark_payroll_run_paid(run.id).unwrap();
        assert_eq!(paid.status, PayrollRunStatus::Paid);
        let declared = f.engine.mark_payroll_run_declared(run.id).unwrap();
        assert_eq!(declared.status, PayrollRunStatus::Declared);
    }

    #[test]
    fn test_payslips_with_employees_hydrates() {
        let f = setup();
        let run = f.engine.create_payroll_run(2025, 3, None, None, None).unwrap();
        f.engine.calculate_payroll_at(run.id, march_15()).unwrap();

        let views = f.engine.payslips_with_employees(run.id).unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(
            views[0].employee.as_ref().map(|e| e.personal_code.as_str()),
            Some("48001010005")
        );
    }

    #[test]
    fn test_set_base_salary_closes_open_component() {
        let f = setup();
        f.engine
            .set_base_salary(f.paid.id, dec(2400, 0), date(2025, 6, 1))
            .unwrap();

        let components = f.store.list_salary_components(&tenant(), f.paid.id).unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(components.iter().filter(|c| c.is_open_base_salary()).count(), 1);

        let closed = components
            .iter()
            .find(|c| c.amount == dec(2000, 0))
            .unwrap();
        assert_eq!(closed.effective_to, Some(date(2025, 5, 31)));
        assert_eq!(current_base_salary(&components, date(2025, 5, 31)), dec(2000, 0));
        assert_eq!(current_base_salary(&components, date(2025, 6, 1)), dec(2400, 0));
    }

    #[test]
    fn test_set_base_salary_validation() {
        let f = setup();
        assert!(matches!(
            f.engine.set_base_salary(f.paid.id, Decimal::ZERO, date(2025, 6, 1)),
            Err(EngineError::InvalidInput { field, .. }) if field == "amount"
        ));
        assert!(matches!(
            f.engine.set_base_salary(Uuid::new_v4(), dec(1000, 0), date(2025, 6, 1)),
            Err(EngineError::EmployeeNotFound { .. })
        ));
        assert!(matches!(
            f.engine.set_base_salary(f.paid.id, dec(1000, 0), date(2024, 6, 1)),
            Err(EngineError::InvalidInput { field, .. }) if field == "effective_from"
        ));
    }

    proptest! {
        #[test]
        fn prop_calculation_is_deterministic(salaries in prop::collection::vec(1i64..1_000_000, 1..8)) {
            let run_once = || {
                let store = Arc::new(InMemoryStore::new());
                let engine = engine(&store);
                for (i, cents) in salaries.iter().enumerate() {
                    let mut e = employee(&format!("E{i:02}"), "38001010009", true);
                    e.id = Uuid::from_u128(i as u128 + 1);
                    store.insert_employee(&tenant(), &e).unwrap();
                    engine.set_base_salary(e.id, Decimal::new(*cents, 2), date(2025, 1, 1)).unwrap();
                }
                let run = engine.create_payroll_run(2025, 3, None, None, None).unwrap();
                let run = engine.calculate_payroll_at(run.id, march_15()).unwrap();
                let mut slips: Vec<_> = store
                    .list_payslips(&tenant(), run.id)
                    .unwrap()
                    .into_iter()
                    .map(|p| (p.employee_id, p.gross_salary, p.net_salary, p.total_employer_cost))
                    .collect();
                slips.sort();
                (run.totals(), slips)
            };

            let (first_totals, first) = run_once();
            let (second_totals, second) = run_once();
            prop_assert_eq!(first_totals, second_totals);
            prop_assert_eq!(&first, &second);

            let gross: Decimal = first.iter().map(|s| s.1).sum();
            prop_assert_eq!(first_totals.map(|t| t.gross), Some(gross));
        }
    }
}
