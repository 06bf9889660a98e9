//! Leave balance ledger and leave request workflow.
//!
//! The [`LeaveLedger`] keeps every [`LeaveBalance`] consistent with the
//! leave records charged against it:
//!
//! ```text
//! create   ──► pending += days
//! approve  ──► pending -= days, used += days
//! reject   ──► pending -= days
//! cancel   ──► pending -= days   (was PENDING)
//!              used    -= days   (was APPROVED)
//! ```
//!
//! Balance tracking is opt-in per absence type: when no balance row exists
//! for (employee, type, year) the record moves through its states without
//! touching any balance.

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult, during};
use crate::models::{
    CreateLeaveRecordRequest, LeaveBalance, LeaveBalanceUpdate, LeaveRecord, LeaveRecordView,
    LeaveStatus, TenantId,
};
use crate::store::PayrollStore;

/// Leave workflow and balance bookkeeping for one tenant.
///
/// Balance rows are updated with a compare-and-set on their version, so two
/// writers racing on the same balance cannot both win; the loser gets
/// [`EngineError::ConcurrentModification`] and may retry.
pub struct LeaveLedger<S> {
    store: Arc<S>,
    tenant: TenantId,
}

impl<S: PayrollStore> LeaveLedger<S> {
    /// Creates a ledger over `store`, scoped to `tenant`.
    pub fn new(store: Arc<S>, tenant: TenantId) -> Self {
        Self { store, tenant }
    }

    /// Creates a pending leave request and reserves its days.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for nil ids, missing or reversed dates, or non-positive days
    /// - `AbsenceTypeNotFound` if the absence type does not exist
    /// - `InsufficientLeaveBalance` if a tracked balance cannot cover the days
    pub fn create_leave_record(
        &self,
        request: CreateLeaveRecordRequest,
    ) -> EngineResult<LeaveRecord> {
        const OP: &str = "create_leave_record";

        if request.employee_id.is_nil() {
            return Err(EngineError::invalid_input("employee_id", "is required"));
        }
        if request.absence_type_id.is_nil() {
            return Err(EngineError::invalid_input("absence_type_id", "is required"));
        }
        let start_date = request
            .start_date
            .ok_or_else(|| EngineError::invalid_input("start_date", "is required"))?;
        let end_date = request
            .end_date
            .ok_or_else(|| EngineError::invalid_input("end_date", "is required"))?;
        if end_date < start_date {
            return Err(EngineError::invalid_input(
                "end_date",
                format!("{end_date} is before start date {start_date}"),
            ));
        }
        if request.working_days <= Decimal::ZERO {
            return Err(EngineError::invalid_input("working_days", "must be positive"));
        }

        let absence_type = self
            .store
            .get_absence_type(&self.tenant, request.absence_type_id)
            .map_err(during(OP))?
            .ok_or(EngineError::AbsenceTypeNotFound {
                id: request.absence_type_id,
            })?;

        let record = LeaveRecord {
            id: Uuid::new_v4(),
            employee_id: request.employee_id,
            absence_type_id: absence_type.id,
            start_date,
            end_date,
            working_days: request.working_days,
            status: LeaveStatus::Pending,
            notes: request.notes,
            approved_by: None,
            approved_at: None,
            rejected_by: None,
            rejected_at: None,
            rejection_reason: None,
            canceled_by: None,
            canceled_at: None,
            created_at: Utc::now(),
        };

        self.store.atomically(|store| {
            let balance = store
                .find_leave_balance(
                    &self.tenant,
                    record.employee_id,
                    record.absence_type_id,
                    start_date.year(),
                )
                .map_err(during(OP))?;

            if let Some(mut balance) = balance {
                if balance.remaining_days < record.working_days {
                    return Err(EngineError::InsufficientLeaveBalance {
                        requested: record.working_days,
                        remaining: balance.remaining_days,
                    });
                }
                balance.reserve(record.working_days);
                self.save_balance(store, &mut balance, OP)?;
            }

            store
                .insert_leave_record(&self.tenant, &record)
                .map_err(during(OP))
        })?;

        info!(
            tenant = %self.tenant,
            leave_record_id = %record.id,
            employee_id = %record.employee_id,
            working_days = %record.working_days,
            "Leave record created"
        );
        Ok(record)
    }

    /// Approves a pending request, moving its days from pending to used.
    pub fn approve_leave_record(&self, id: Uuid, approver: Uuid) -> EngineResult<LeaveRecord> {
        const OP: &str = "approve_leave_record";

        let mut record = self.load_pending(id, OP)?;
        record.status = record.status.transition_to(LeaveStatus::Approved)?;
        record.approved_by = Some(approver);
        record.approved_at = Some(Utc::now());

        self.commit_decision(&record, LeaveStatus::Pending, OP, |balance, days| {
            balance.consume(days)
        })?;

        info!(tenant = %self.tenant, leave_record_id = %id, approver = %approver, "Leave record approved");
        Ok(record)
    }

    /// Rejects a pending request and releases its reservation.
    pub fn reject_leave_record(
        &self,
        id: Uuid,
        rejecter: Uuid,
        reason: Option<String>,
    ) -> EngineResult<LeaveRecord> {
        const OP: &str = "reject_leave_record";

        let mut record = self.load_pending(id, OP)?;
        record.status = record.status.transition_to(LeaveStatus::Rejected)?;
        record.rejected_by = Some(rejecter);
        record.rejected_at = Some(Utc::now());
        record.rejection_reason = reason;

        self.commit_decision(&record, LeaveStatus::Pending, OP, |balance, days| {
            balance.release(days)
        })?;

        info!(tenant = %self.tenant, leave_record_id = %id, rejecter = %rejecter, "Leave record rejected");
        Ok(record)
    }

    /// Cancels a pending or approved request.
    ///
    /// A pending request releases its reservation; an approved one gives its
    /// used days back. Any other status fails with
    /// [`EngineError::InvalidStatusTransition`].
    pub fn cancel_leave_record(&self, id: Uuid, actor: Uuid) -> EngineResult<LeaveRecord> {
        const OP: &str = "cancel_leave_record";

        let mut record = self.load_record(id, OP)?;
        let previous = record.status;
        record.status = previous.transition_to(LeaveStatus::Canceled)?;
        record.canceled_by = Some(actor);
        record.canceled_at = Some(Utc::now());

        self.commit_decision(&record, previous, OP, |balance, days| match previous {
            LeaveStatus::Approved => balance.restore(days),
            _ => balance.release(days),
        })?;

        info!(
            tenant = %self.tenant,
            leave_record_id = %id,
            previous_status = %previous,
            "Leave record canceled"
        );
        Ok(record)
    }

    /// Creates a balance for (employee, absence type, year).
    ///
    /// Fails with [`EngineError::LeaveBalanceExists`] if one is already there.
    pub fn create_leave_balance(
        &self,
        employee_id: Uuid,
        absence_type_id: Uuid,
        year: i32,
        entitled_days: Decimal,
        carryover_days: Decimal,
    ) -> EngineResult<LeaveBalance> {
        const OP: &str = "create_leave_balance";

        self.store
            .get_absence_type(&self.tenant, absence_type_id)
            .map_err(during(OP))?
            .ok_or(EngineError::AbsenceTypeNotFound {
                id: absence_type_id,
            })?;

        let balance = LeaveBalance::new(
            employee_id,
            absence_type_id,
            year,
            entitled_days,
            carryover_days,
        );

        self.store.atomically(|store| {
            let existing = store
                .find_leave_balance(&self.tenant, employee_id, absence_type_id, year)
                .map_err(during(OP))?;
            if existing.is_some() {
                return Err(EngineError::LeaveBalanceExists { employee_id, year });
            }
            store
                .insert_leave_balance(&self.tenant, &balance)
                .map_err(during(OP))
        })?;

        debug!(tenant = %self.tenant, balance_id = %balance.id, year, "Leave balance created");
        Ok(balance)
    }

    /// Loads a balance by id.
    pub fn get_leave_balance(&self, id: Uuid) -> EngineResult<LeaveBalance> {
        self.store
            .get_leave_balance(&self.tenant, id)
            .map_err(during("get_leave_balance"))?
            .ok_or(EngineError::LeaveBalanceNotFound { id })
    }

    /// Overwrites entitlement, carryover and notes on an existing balance.
    ///
    /// This is an administrative override: beyond existence nothing is
    /// validated, and `remaining_days` is recomputed from the new values.
    pub fn update_leave_balance(
        &self,
        id: Uuid,
        patch: LeaveBalanceUpdate,
    ) -> EngineResult<LeaveBalance> {
        const OP: &str = "update_leave_balance";

        let balance = self.store.atomically(|store| {
            let mut balance = store
                .get_leave_balance(&self.tenant, id)
                .map_err(during(OP))?
                .ok_or(EngineError::LeaveBalanceNotFound { id })?;

            if let Some(entitled) = patch.entitled_days {
                balance.entitled_days = entitled;
            }
            if let Some(carryover) = patch.carryover_days {
                balance.carryover_days = carryover;
            }
            if let Some(notes) = patch.notes {
                balance.notes = Some(notes);
            }
            balance.recalculate();

            self.save_balance(store, &mut balance, OP)?;
            Ok::<_, EngineError>(balance)
        })?;

        info!(tenant = %self.tenant, balance_id = %id, remaining = %balance.remaining_days, "Leave balance overridden");
        Ok(balance)
    }

    /// Ensures the employee has a balance for every active absence type.
    ///
    /// Existing balances are returned untouched; missing ones are created
    /// with the type's default entitlement. Calling this twice for the same
    /// year creates nothing the second time.
    pub fn initialize_employee_leave_balances(
        &self,
        employee_id: Uuid,
        year: i32,
    ) -> EngineResult<Vec<LeaveBalance>> {
        const OP: &str = "initialize_employee_leave_balances";

        self.store
            .get_employee(&self.tenant, employee_id)
            .map_err(during(OP))?
            .ok_or(EngineError::EmployeeNotFound { id: employee_id })?;

        let absence_types = self
            .store
            .list_active_absence_types(&self.tenant)
            .map_err(during(OP))?;

        self.store.atomically(|store| {
            let mut balances = Vec::with_capacity(absence_types.len());
            for absence_type in &absence_types {
                let existing = store
                    .find_leave_balance(&self.tenant, employee_id, absence_type.id, year)
                    .map_err(during(OP))?;

                let balance = match existing {
                    Some(balance) => balance,
                    None => {
                        let balance = LeaveBalance::new(
                            employee_id,
                            absence_type.id,
                            year,
                            absence_type.default_days_per_year,
                            Decimal::ZERO,
                        );
                        store
                            .insert_leave_balance(&self.tenant, &balance)
                            .map_err(during(OP))?;
                        debug!(absence_type = %absence_type.code, year, "Seeded leave balance");
                        balance
                    }
                };
                balances.push(balance);
            }
            Ok(balances)
        })
    }

    /// Loads a leave record by id.
    pub fn get_leave_record(&self, id: Uuid) -> EngineResult<LeaveRecord> {
        self.load_record(id, "get_leave_record")
    }

    /// Attaches the employee and absence type to a record.
    ///
    /// Missing relations are left as `None` rather than failing.
    pub fn hydrate_leave_record(&self, record: LeaveRecord) -> EngineResult<LeaveRecordView> {
        const OP: &str = "hydrate_leave_record";

        let employee = self
            .store
            .get_employee(&self.tenant, record.employee_id)
            .map_err(during(OP))?;
        let absence_type = self
            .store
            .get_absence_type(&self.tenant, record.absence_type_id)
            .map_err(during(OP))?;

        Ok(LeaveRecordView {
            record,
            employee,
            absence_type,
        })
    }

    fn load_record(&self, id: Uuid, op: &'static str) -> EngineResult<LeaveRecord> {
        self.store
            .get_leave_record(&self.tenant, id)
            .map_err(during(op))?
            .ok_or(EngineError::LeaveRecordNotFound { id })
    }

    fn load_pending(&self, id: Uuid, op: &'static str) -> EngineResult<LeaveRecord> {
        let record = self.load_record(id, op)?;
        if record.status != LeaveStatus::Pending {
            return Err(EngineError::LeaveRecordNotPending {
                id,
                status: record.status.to_string(),
            });
        }
        Ok(record)
    }

    /// Persists the record's new status and applies `adjust` to its balance,
    /// if one is tracked, as one unit.
    ///
    /// The record is only written while its stored status is still
    /// `expected`. If another decision got there first nothing is written:
    /// a record that is no longer pending fails with
    /// [`EngineError::LeaveRecordNotPending`], and any other move fails with
    /// [`EngineError::InvalidStatusTransition`] or
    /// [`EngineError::ConcurrentModification`].
    fn commit_decision(
        &self,
        record: &LeaveRecord,
        expected: LeaveStatus,
        op: &'static str,
        adjust: impl FnOnce(&mut LeaveBalance, Decimal),
    ) -> EngineResult<()> {
        self.store.atomically(|store| {
            let affected = store
                .update_leave_record_if_status(&self.tenant, record, expected)
                .map_err(during(op))?;
            if affected == 0 {
                return Err(self.lost_decision(store, record, expected, op));
            }

            let balance = store
                .find_leave_balance(
                    &self.tenant,
                    record.employee_id,
                    record.absence_type_id,
                    record.balance_year(),
                )
                .map_err(during(op))?;

            if let Some(mut balance) = balance {
                adjust(&mut balance, record.working_days);
                self.save_balance(store, &mut balance, op)?;
            }
            Ok(())
        })
    }

    fn lost_decision(
        &self,
        store: &S,
        record: &LeaveRecord,
        expected: LeaveStatus,
        op: &'static str,
    ) -> EngineError {
        let id = record.id;
        let current = match store.get_leave_record(&self.tenant, id) {
            Ok(Some(current)) => current,
            Ok(None) => return EngineError::LeaveRecordNotFound { id },
            Err(source) => return EngineError::persistence(op, source),
        };

        warn!(
            tenant = %self.tenant,
            leave_record_id = %id,
            expected = %expected,
            current = %current.status,
            "Leave record changed before the decision was saved"
        );

        if expected == LeaveStatus::Pending && current.status != LeaveStatus::Pending {
            return EngineError::LeaveRecordNotPending {
                id,
                status: current.status.to_string(),
            };
        }
        match current.status.transition_to(record.status) {
            Err(err) => err,
            Ok(_) => EngineError::ConcurrentModification {
                entity: "leave record",
                id,
            },
        }
    }

    fn save_balance(
        &self,
        store: &S,
        balance: &mut LeaveBalance,
        op: &'static str,
    ) -> EngineResult<()> {
        balance.updated_at = Utc::now();
        balance.version = store
            .update_leave_balance(&self.tenant, balance)
            .map_err(during(op))?;
        Ok(())
    }
}
