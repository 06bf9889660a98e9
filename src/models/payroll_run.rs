//! Payroll run and payslip models.
//!
//! A [`PayrollRun`] is one payroll cycle for a (tenant, year, month). Its
//! [`Payslip`]s are derived entirely from the tax calculator and are
//! replaced wholesale each time the run is calculated.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::Employee;
use crate::calculation::TaxBreakdown;
use crate::error::{EngineError, EngineResult};

/// Lifecycle of a payroll run.
///
/// The lifecycle is monotonic:
/// `DRAFT → CALCULATED → APPROVED → PAID → DECLARED`.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayrollRunStatus;
///
/// assert!(PayrollRunStatus::Draft.can_transition_to(PayrollRunStatus::Calculated));
/// assert!(!PayrollRunStatus::Approved.can_transition_to(PayrollRunStatus::Draft));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayrollRunStatus {
    /// Created, no payslips yet.
    Draft,
    /// Payslips and totals computed.
    Calculated,
    /// Signed off for payment.
    Approved,
    /// Salaries paid out.
    Paid,
    /// Included in a submitted tax declaration.
    Declared,
}

impl PayrollRunStatus {
    /// Checks the legal-transition table.
    pub fn can_transition_to(self, next: PayrollRunStatus) -> bool {
        use PayrollRunStatus::*;
        matches!(
            (self, next),
            (Draft, Calculated) | (Calculated, Approved) | (Approved, Paid) | (Paid, Declared)
        )
    }

    /// Returns `next` if the transition is legal, otherwise an
    /// [`EngineError::InvalidStatusTransition`].
    pub fn transition_to(self, next: PayrollRunStatus) -> EngineResult<PayrollRunStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(EngineError::InvalidStatusTransition {
                entity: "payroll run",
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }

    /// Whether a declaration may be generated from a run in this status.
    pub fn is_declarable(self) -> bool {
        matches!(self, PayrollRunStatus::Approved | PayrollRunStatus::Paid)
    }
}

impl fmt::Display for PayrollRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PayrollRunStatus::Draft => "DRAFT",
            PayrollRunStatus::Calculated => "CALCULATED",
            PayrollRunStatus::Approved => "APPROVED",
            PayrollRunStatus::Paid => "PAID",
            PayrollRunStatus::Declared => "DECLARED",
        };
        f.write_str(s)
    }
}

/// Aggregated money totals of a calculated run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollTotals {
    /// Sum of gross salaries.
    pub gross: Decimal,
    /// Sum of net salaries.
    pub net: Decimal,
    /// Sum of employer costs.
    pub employer_cost: Decimal,
}

impl PayrollTotals {
    /// Adds one payslip to the running totals.
    pub fn add(&mut self, payslip: &Payslip) {
        self.gross += payslip.gross_salary;
        self.net += payslip.net_salary;
        self.employer_cost += payslip.total_employer_cost;
    }
}

/// One payroll computation cycle for a tenant and calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollRun {
    /// Unique identifier for the run.
    pub id: Uuid,
    /// Period year.
    pub period_year: i32,
    /// Period month (1-12).
    pub period_month: u32,
    /// Current lifecycle status.
    pub status: PayrollRunStatus,
    /// Planned salary payment date.
    pub payment_date: Option<NaiveDate>,
    /// Sum of gross salaries.
    pub total_gross: Decimal,
    /// Sum of net salaries.
    pub total_net: Decimal,
    /// Sum of employer costs.
    pub total_employer_cost: Decimal,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Who created the run.
    pub created_by: Option<Uuid>,
    /// Who approved the run.
    pub approved_by: Option<Uuid>,
    /// When the run was approved.
    pub approved_at: Option<DateTime<Utc>>,
    /// When the run was created.
    pub created_at: DateTime<Utc>,
}

impl PayrollRun {
    /// Returns the totals once they are authoritative.
    ///
    /// Totals on a `DRAFT` run are placeholders and are not exposed.
    pub fn totals(&self) -> Option<PayrollTotals> {
        (self.status >= PayrollRunStatus::Calculated).then_some(PayrollTotals {
            gross: self.total_gross,
            net: self.total_net,
            employer_cost: self.total_employer_cost,
        })
    }

    /// Returns the period formatted as `YYYYMM`.
    pub fn period_code(&self) -> String {
        format!("{:04}{:02}", self.period_year, self.period_month)
    }

    /// Returns the first day of the run's period.
    pub fn period_start(&self) -> EngineResult<NaiveDate> {
        NaiveDate::from_ymd_opt(self.period_year, self.period_month, 1).ok_or(
            EngineError::InvalidPeriod {
                year: self.period_year,
                month: self.period_month,
            },
        )
    }
}

/// Payment bookkeeping for a payslip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Not yet paid.
    Pending,
    /// Paid out.
    Paid,
}

/// The computed tax and net breakdown for one employee within one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payslip {
    /// Unique identifier for the payslip.
    pub id: Uuid,
    /// The run this payslip belongs to.
    pub payroll_run_id: Uuid,
    /// The employee paid.
    pub employee_id: Uuid,
    /// Gross salary for the period.
    pub gross_salary: Decimal,
    /// Basic exemption applied.
    pub basic_exemption: Decimal,
    /// Income after the exemption.
    pub taxable_income: Decimal,
    /// Income tax withheld.
    pub income_tax: Decimal,
    /// Employee unemployment insurance withheld.
    pub unemployment_insurance_employee: Decimal,
    /// Funded pension withheld.
    pub funded_pension: Decimal,
    /// Sum of employee withholdings.
    pub total_deductions: Decimal,
    /// Salary paid to the employee.
    pub net_salary: Decimal,
    /// Employer social tax.
    pub social_tax: Decimal,
    /// Employer unemployment insurance.
    pub unemployment_insurance_employer: Decimal,
    /// Gross plus employer contributions.
    pub total_employer_cost: Decimal,
    /// Payment bookkeeping status.
    pub payment_status: PaymentStatus,
    /// When the payslip was created.
    pub created_at: DateTime<Utc>,
}

impl Payslip {
    /// Builds a pending payslip from a tax breakdown.
    pub fn from_breakdown(
        payroll_run_id: Uuid,
        employee_id: Uuid,
        breakdown: &TaxBreakdown,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            payroll_run_id,
            employee_id,
            gross_salary: breakdown.gross_salary,
            basic_exemption: breakdown.basic_exemption,
            taxable_income: breakdown.taxable_income,
            income_tax: breakdown.income_tax,
            unemployment_insurance_employee: breakdown.unemployment_insurance_employee,
            funded_pension: breakdown.funded_pension,
            total_deductions: breakdown.total_deductions,
            net_salary: breakdown.net_salary,
            social_tax: breakdown.social_tax,
            unemployment_insurance_employer: breakdown.unemployment_insurance_employer,
            total_employer_cost: breakdown.total_employer_cost,
            payment_status: PaymentStatus::Pending,
            created_at,
        }
    }
}

/// A payslip with its employee attached, if the employee could be loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct PayslipView {
    /// The payslip.
    pub payslip: Payslip,
    /// The paid employee.
    pub employee: Option<Employee>,
}
