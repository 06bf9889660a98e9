//! Tax declaration (TSD) models.
//!
//! A [`TsdDeclaration`] aggregates one approved payroll run into the
//! government filing: six totals plus one [`TsdRow`] per paid employee.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::Payslip;
use crate::error::{EngineError, EngineResult};

/// Lifecycle of a declaration: `DRAFT → SUBMITTED → {ACCEPTED, REJECTED}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeclarationStatus {
    /// Generated, not yet filed.
    Draft,
    /// Filed with the tax authority.
    Submitted,
    /// Accepted by the tax authority.
    Accepted,
    /// Rejected by the tax authority.
    Rejected,
}

impl DeclarationStatus {
    /// Checks the legal-transition table.
    pub fn can_transition_to(self, next: DeclarationStatus) -> bool {
        use DeclarationStatus::*;
        matches!(
            (self, next),
            (Draft, Submitted) | (Submitted, Accepted) | (Submitted, Rejected)
        )
    }

    /// Returns `next` if the transition is legal, otherwise an
    /// [`EngineError::InvalidStatusTransition`].
    pub fn transition_to(self, next: DeclarationStatus) -> EngineResult<DeclarationStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(EngineError::InvalidStatusTransition {
                entity: "declaration",
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl fmt::Display for DeclarationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeclarationStatus::Draft => "DRAFT",
            DeclarationStatus::Submitted => "SUBMITTED",
            DeclarationStatus::Accepted => "ACCEPTED",
            DeclarationStatus::Rejected => "REJECTED",
        };
        f.write_str(s)
    }
}

/// Payment type code printed on each declaration row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentType {
    /// Regular salary under an employment contract.
    RegularSalary,
}

impl PaymentType {
    /// The code the tax authority expects.
    pub fn code(self) -> &'static str {
        match self {
            PaymentType::RegularSalary => "10",
        }
    }
}

/// Organization identity printed in the declaration header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Business registry code.
    pub registry_code: String,
    /// Registered name.
    pub name: String,
}

/// The six running totals of a declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationTotals {
    /// Sum of gross payments.
    pub payments: Decimal,
    /// Sum of income tax withheld.
    pub income_tax: Decimal,
    /// Sum of social tax.
    pub social_tax: Decimal,
    /// Sum of employer unemployment insurance.
    pub unemployment_employer: Decimal,
    /// Sum of employee unemployment insurance.
    pub unemployment_employee: Decimal,
    /// Sum of funded pension withheld.
    pub funded_pension: Decimal,
}

impl DeclarationTotals {
    /// Adds one row to the running totals.
    pub fn add(&mut self, row: &TsdRow) {
        self.payments += row.gross_payment;
        self.income_tax += row.income_tax;
        self.social_tax += row.social_tax;
        self.unemployment_employer += row.unemployment_employer;
        self.unemployment_employee += row.unemployment_employee;
        self.funded_pension += row.funded_pension;
    }

    /// Sums a set of rows.
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a TsdRow>) -> Self {
        let mut totals = Self::default();
        for row in rows {
            totals.add(row);
        }
        totals
    }
}

/// One declaration per tenant and period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TsdDeclaration {
    /// Unique identifier for the declaration.
    pub id: Uuid,
    /// The payroll run it was generated from.
    pub payroll_run_id: Uuid,
    /// Period year.
    pub period_year: i32,
    /// Period month (1-12).
    pub period_month: u32,
    /// Current lifecycle status.
    pub status: DeclarationStatus,
    /// Aggregated totals.
    pub totals: DeclarationTotals,
    /// When the declaration was filed.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Reference code assigned by the tax authority on submission.
    pub external_reference: Option<String>,
    /// When the declaration was generated.
    pub created_at: DateTime<Utc>,
    /// Declaration rows; empty until loaded.
    #[serde(default)]
    pub rows: Vec<TsdRow>,
}

impl TsdDeclaration {
    /// Returns the period formatted as `YYYYMM`.
    pub fn period_code(&self) -> String {
        format!("{:04}{:02}", self.period_year, self.period_month)
    }
}

/// One employee's line on the declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TsdRow {
    /// Unique identifier for the row.
    pub id: Uuid,
    /// The declaration this row belongs to.
    pub declaration_id: Uuid,
    /// The employee paid.
    pub employee_id: Uuid,
    /// National identification code.
    pub personal_code: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Kind of payment.
    pub payment_type: PaymentType,
    /// Gross payment.
    pub gross_payment: Decimal,
    /// Basic exemption applied.
    pub basic_exemption: Decimal,
    /// Income after the exemption.
    pub taxable_amount: Decimal,
    /// Income tax withheld.
    pub income_tax: Decimal,
    /// Employer social tax.
    pub social_tax: Decimal,
    /// Employee unemployment insurance.
    pub unemployment_employee: Decimal,
    /// Employer unemployment insurance.
    pub unemployment_employer: Decimal,
    /// Funded pension withheld.
    pub funded_pension: Decimal,
}

impl TsdRow {
    /// Builds a regular-salary row from a payslip and the employee's identity.
    pub fn from_payslip(
        declaration_id: Uuid,
        payslip: &Payslip,
        personal_code: &str,
        first_name: &str,
        last_name: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            declaration_id,
            employee_id: payslip.employee_id,
            personal_code: personal_code.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            payment_type: PaymentType::RegularSalary,
            gross_payment: payslip.gross_salary,
            basic_exemption: payslip.basic_exemption,
            taxable_amount: payslip.taxable_income,
            income_tax: payslip.income_tax,
            social_tax: payslip.social_tax,
            unemployment_employee: payslip.unemployment_insurance_employee,
            unemployment_employer: payslip.unemployment_insurance_employer,
            funded_pension: payslip.funded_pension,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_lifecycle_table() {
        use DeclarationStatus::*;
        assert!(Draft.can_transition_to(Submitted));
        assert!(Submitted.can_transition_to(Accepted));
        assert!(Submitted.can_transition_to(Rejected));
        assert!(!Draft.can_transition_to(Accepted));
        assert!(!Accepted.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Submitted));
    }

    #[test]
    fn test_declaration_transition_error_names_entity() {
        let err = DeclarationStatus::Accepted
            .transition_to(DeclarationStatus::Submitted)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid declaration status transition from ACCEPTED to SUBMITTED"
        );
    }

    #[test]
    fn test_regular_salary_code() {
        assert_eq!(PaymentType::RegularSalary.code(), "10");
    }

    #[test]
    fn test_totals_from_rows_sums_each_column() {
        let row = |gross: i64, tax: i64| TsdRow {
            id: Uuid::new_v4(),
            declaration_id: Uuid::nil(),
            employee_id: Uuid::new_v4(),
            personal_code: "38001010009".to_string(),
            first_name: "Jaan".to_string(),
            last_name: "Tamm".to_string(),
            payment_type: PaymentType::RegularSalary,
            gross_payment: Decimal::new(gross, 0),
            basic_exemption: Decimal::ZERO,
            taxable_amount: Decimal::new(gross, 0),
            income_tax: Decimal::new(tax, 0),
            social_tax: Decimal::new(1, 0),
            unemployment_employee: Decimal::new(2, 0),
            unemployment_employer: Decimal::new(3, 0),
            funded_pension: Decimal::ZERO,
        };

        let rows = [row(1000, 220), row(2000, 440)];
        let totals = DeclarationTotals::from_rows(&rows);

        assert_eq!(totals.payments, Decimal::new(3000, 0));
        assert_eq!(totals.income_tax, Decimal::new(660, 0));
        assert_eq!(totals.social_tax, Decimal::new(2, 0));
        assert_eq!(totals.unemployment_employee, Decimal::new(4, 0));
        assert_eq!(totals.unemployment_employer, Decimal::new(6, 0));
        assert_eq!(totals.funded_pension, Decimal::ZERO);
    }
}
