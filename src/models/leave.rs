//! Leave models: absence types, balances and leave records.
//!
//! A [`LeaveBalance`] is the per-employee, per-type, per-year ledger of
//! entitled, used, pending and remaining days. A [`LeaveRecord`] is one
//! leave request moving through its own small state machine.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::Employee;
use crate::error::{EngineError, EngineResult};

/// A tenant-configured leave category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsenceType {
    /// Unique identifier for the absence type.
    pub id: Uuid,
    /// Short code (e.g. "ANNUAL").
    pub code: String,
    /// Display name.
    pub name: String,
    /// Entitlement seeded into new balances.
    pub default_days_per_year: Decimal,
    /// Whether the leave is paid.
    pub is_paid: bool,
    /// Inactive types are not seeded into new balances.
    pub is_active: bool,
}

/// Leave ledger for one (employee, absence type, year).
///
/// The invariant `remaining = entitled + carryover - used - pending` holds
/// after every mutation; `used` and `pending` never go below zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveBalance {
    /// Unique identifier for the balance.
    pub id: Uuid,
    /// The employee the balance belongs to.
    pub employee_id: Uuid,
    /// The absence type tracked.
    pub absence_type_id: Uuid,
    /// Calendar year.
    pub year: i32,
    /// Days granted for the year.
    pub entitled_days: Decimal,
    /// Days brought forward from the previous year.
    pub carryover_days: Decimal,
    /// Days taken on approved leave.
    pub used_days: Decimal,
    /// Days reserved by pending requests.
    pub pending_days: Decimal,
    /// Days still available.
    pub remaining_days: Decimal,
    /// Administrative notes.
    pub notes: Option<String>,
    /// Optimistic concurrency counter, bumped by the store on every update.
    pub version: u64,
    /// When the balance was last changed.
    pub updated_at: DateTime<Utc>,
}

impl LeaveBalance {
    /// Creates a fresh balance with no usage.
    pub fn new(
        employee_id: Uuid,
        absence_type_id: Uuid,
        year: i32,
        entitled_days: Decimal,
        carryover_days: Decimal,
    ) -> Self {
        let mut balance = Self {
            id: Uuid::new_v4(),
            employee_id,
            absence_type_id,
            year,
            entitled_days,
            carryover_days,
            used_days: Decimal::ZERO,
            pending_days: Decimal::ZERO,
            remaining_days: Decimal::ZERO,
            notes: None,
            version: 0,
            updated_at: Utc::now(),
        };
        balance.recalculate();
        balance
    }

    /// Clamps usage at zero and recomputes `remaining_days`.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::LeaveBalance;
    /// use rust_decimal::Decimal;
    /// use uuid::Uuid;
    ///
    /// let mut balance = LeaveBalance::new(Uuid::new_v4(), Uuid::new_v4(), 2025,
    ///     Decimal::new(28, 0), Decimal::new(2, 0));
    /// balance.pending_days = Decimal::new(-3, 0);
    /// balance.used_days = Decimal::new(5, 0);
    /// balance.recalculate();
    ///
    /// assert_eq!(balance.pending_days, Decimal::ZERO);
    /// assert_eq!(balance.remaining_days, Decimal::new(25, 0));
    /// ```
    pub fn recalculate(&mut self) {
        self.pending_days = self.pending_days.max(Decimal::ZERO);
        self.used_days = self.used_days.max(Decimal::ZERO);
        self.remaining_days =
            self.entitled_days + self.carryover_days - self.used_days - self.pending_days;
    }

    /// Reserves days for a new request.
    pub fn reserve(&mut self, days: Decimal) {
        self.pending_days += days;
        self.recalculate();
    }

    /// Releases a pending reservation.
    pub fn release(&mut self, days: Decimal) {
        self.pending_days -= days;
        self.recalculate();
    }

    /// Moves a pending reservation into used days.
    pub fn consume(&mut self, days: Decimal) {
        self.pending_days -= days;
        self.used_days += days;
        self.recalculate();
    }

    /// Gives back days that were already used.
    pub fn restore(&mut self, days: Decimal) {
        self.used_days -= days;
        self.recalculate();
    }

    /// Checks the ledger invariant.
    pub fn is_consistent(&self) -> bool {
        self.used_days >= Decimal::ZERO
            && self.pending_days >= Decimal::ZERO
            && self.remaining_days
                == self.entitled_days + self.carryover_days - self.used_days - self.pending_days
    }
}

/// Administrative override of a balance's entitlement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaveBalanceUpdate {
    /// New entitlement, if changing.
    pub entitled_days: Option<Decimal>,
    /// New carryover, if changing.
    pub carryover_days: Option<Decimal>,
    /// New notes, if changing.
    pub notes: Option<String>,
}

/// Lifecycle of a leave request.
///
/// `PENDING → {APPROVED, REJECTED, CANCELED}` and `APPROVED → CANCELED`.
/// No other transition is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveStatus {
    /// Awaiting a decision; days are reserved.
    Pending,
    /// Approved; days are used.
    Approved,
    /// Rejected; nothing reserved.
    Rejected,
    /// Withdrawn; nothing reserved or used.
    Canceled,
}

impl LeaveStatus {
    /// Checks the legal-transition table.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::LeaveStatus;
    ///
    /// assert!(LeaveStatus::Approved.can_transition_to(LeaveStatus::Canceled));
    /// assert!(!LeaveStatus::Canceled.can_transition_to(LeaveStatus::Approved));
    /// ```
    pub fn can_transition_to(self, next: LeaveStatus) -> bool {
        use LeaveStatus::*;
        matches!(
            (self, next),
            (Pending, Approved) | (Pending, Rejected) | (Pending, Canceled) | (Approved, Canceled)
        )
    }

    /// Returns `next` if the transition is legal, otherwise an
    /// [`EngineError::InvalidStatusTransition`].
    pub fn transition_to(self, next: LeaveStatus) -> EngineResult<LeaveStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(EngineError::InvalidStatusTransition {
                entity: "leave record",
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LeaveStatus::Pending => "PENDING",
            LeaveStatus::Approved => "APPROVED",
            LeaveStatus::Rejected => "REJECTED",
            LeaveStatus::Canceled => "CANCELED",
        };
        f.write_str(s)
    }
}

/// One leave request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRecord {
    /// Unique identifier for the record.
    pub id: Uuid,
    /// The employee taking leave.
    pub employee_id: Uuid,
    /// The kind of leave.
    pub absence_type_id: Uuid,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Working days charged against the balance.
    pub working_days: Decimal,
    /// Current status.
    pub status: LeaveStatus,
    /// Reason given by the employee.
    pub notes: Option<String>,
    /// Who approved the request.
    pub approved_by: Option<Uuid>,
    /// When the request was approved.
    pub approved_at: Option<DateTime<Utc>>,
    /// Who rejected the request.
    pub rejected_by: Option<Uuid>,
    /// When the request was rejected.
    pub rejected_at: Option<DateTime<Utc>>,
    /// Why the request was rejected.
    pub rejection_reason: Option<String>,
    /// Who canceled the request.
    pub canceled_by: Option<Uuid>,
    /// When the request was canceled.
    pub canceled_at: Option<DateTime<Utc>>,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
}

impl LeaveRecord {
    /// The balance year this record is charged to.
    pub fn balance_year(&self) -> i32 {
        self.start_date.year()
    }
}

/// Input for creating a leave record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateLeaveRecordRequest {
    /// The employee taking leave.
    pub employee_id: Uuid,
    /// The kind of leave.
    pub absence_type_id: Uuid,
    /// First day of leave.
    pub start_date: Option<NaiveDate>,
    /// Last day of leave (inclusive).
    pub end_date: Option<NaiveDate>,
    /// Working days to charge.
    pub working_days: Decimal,
    /// Reason given by the employee.
    pub notes: Option<String>,
}

/// A leave record with its employee and absence type attached.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaveRecordView {
    /// The record.
    pub record: LeaveRecord,
    /// The employee, if it could be loaded.
    pub employee: Option<Employee>,
    /// The absence type, if it could be loaded.
    pub absence_type: Option<AbsenceType>,
}
