//! Employee model and salary components.
//!
//! This module defines the [`Employee`] struct and the [`SalaryComponent`]
//! pay elements the payroll engine reads gross salary from.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents an employee on the tenant's payroll.
///
/// Employees are never deleted; leaving the company end-dates the record
/// and flips `is_active` off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: Uuid,
    /// Given name as printed on the declaration.
    pub first_name: String,
    /// Family name as printed on the declaration.
    pub last_name: String,
    /// 11-digit national identification code.
    pub personal_code: String,
    /// First day of employment.
    pub start_date: NaiveDate,
    /// Last day of employment, if the employee has left.
    pub end_date: Option<NaiveDate>,
    /// Whether the employee is currently employed.
    pub is_active: bool,
    /// Whether the employee is tax resident in the jurisdiction.
    pub tax_resident: bool,
    /// Whether the employee has asked for the basic exemption to be applied.
    pub apply_basic_exemption: bool,
    /// Monthly basic exemption amount claimed.
    pub basic_exemption_amount: Decimal,
    /// Funded pension contribution rate as a fraction (0.02 = 2%).
    pub funded_pension_rate: Decimal,
}

impl Employee {
    /// Returns the basic exemption to deduct before income tax.
    ///
    /// The configured amount applies only when the employee opted in.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::Employee;
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    /// use uuid::Uuid;
    ///
    /// let mut employee = Employee {
    ///     id: Uuid::new_v4(),
    ///     first_name: "Mari".to_string(),
    ///     last_name: "Maasikas".to_string(),
    ///     personal_code: "48001010005".to_string(),
    ///     start_date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
    ///     end_date: None,
    ///     is_active: true,
    ///     tax_resident: true,
    ///     apply_basic_exemption: true,
    ///     basic_exemption_amount: Decimal::new(700, 0),
    ///     funded_pension_rate: Decimal::new(2, 2),
    /// };
    /// assert_eq!(employee.exemption_amount(), Decimal::new(700, 0));
    ///
    /// employee.apply_basic_exemption = false;
    /// assert_eq!(employee.exemption_amount(), Decimal::ZERO);
    /// ```
    pub fn exemption_amount(&self) -> Decimal {
        if self.apply_basic_exemption {
            self.basic_exemption_amount
        } else {
            Decimal::ZERO
        }
    }

    /// Ends employment on `date` and marks the employee inactive.
    pub fn end_employment(&mut self, date: NaiveDate) {
        self.end_date = Some(date);
        self.is_active = false;
    }
}

/// The kind of pay element a salary component represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentType {
    /// Monthly base salary. The only type the payroll engine currently consumes.
    BaseSalary,
    /// Performance or holiday bonus.
    Bonus,
    /// Fringe benefit or allowance.
    Allowance,
}

/// A time-bounded pay element attached to an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryComponent {
    /// Unique identifier for the component.
    pub id: Uuid,
    /// The employee the component belongs to.
    pub employee_id: Uuid,
    /// What kind of pay this is.
    pub component_type: ComponentType,
    /// Monthly amount.
    pub amount: Decimal,
    /// Whether the component repeats every period.
    pub is_recurring: bool,
    /// First day the component applies.
    pub effective_from: NaiveDate,
    /// Last day the component applies; `None` while open.
    pub effective_to: Option<NaiveDate>,
    /// When the component was recorded.
    pub created_at: DateTime<Utc>,
}

impl SalaryComponent {
    /// Checks if the component's effective window contains `date`.
    ///
    /// Both ends of the window are inclusive; an open component has no end.
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        date >= self.effective_from && self.effective_to.is_none_or(|to| date <= to)
    }

    /// Checks if this is an open recurring base salary.
    pub fn is_open_base_salary(&self) -> bool {
        self.component_type == ComponentType::BaseSalary
            && self.is_recurring
            && self.effective_to.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_employee() -> Employee {
        Employee {
            id: Uuid::new_v4(),
            first_name: "Jaan".to_string(),
            last_name: "Tamm".to_string(),
            personal_code: "38001010009".to_string(),
            start_date: date(2023, 6, 1),
            end_date: None,
            is_active: true,
            tax_resident: true,
            apply_basic_exemption: true,
            basic_exemption_amount: Decimal::new(700, 0),
            funded_pension_rate: Decimal::new(2, 2),
        }
    }

    fn component(from: NaiveDate, to: Option<NaiveDate>) -> SalaryComponent {
        SalaryComponent {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            component_type: ComponentType::BaseSalary,
            amount: Decimal::new(2000, 0),
            is_recurring: true,
            effective_from: from,
            effective_to: to,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_exemption_amount_when_not_opted_in_is_zero() {
        let mut employee = create_test_employee();
        employee.apply_basic_exemption = false;
        assert_eq!(employee.exemption_amount(), Decimal::ZERO);
    }

    #[test]
    fn test_end_employment_flips_active() {
        let mut employee = create_test_employee();
        employee.end_employment(date(2025, 3, 31));

        assert!(!employee.is_active);
        assert_eq!(employee.end_date, Some(date(2025, 3, 31)));
    }

    #[test]
    fn test_serialize_employee_round_trip() {
        let employee = create_test_employee();
        let json = serde_json::to_string(&employee).unwrap();

        let deserialized: Employee = serde_json::from_str(&json).unwrap();
        assert_eq!(employee, deserialized);
    }

    #[test]
    fn test_component_type_serialization() {
        assert_eq!(
            serde_json::to_string(&ComponentType::BaseSalary).unwrap(),
            "\"BASE_SALARY\""
        );
    }

    #[test]
    fn test_open_component_is_effective_from_start_onwards() {
        let c = component(date(2025, 1, 1), None);
        assert!(!c.is_effective_on(date(2024, 12, 31)));
        assert!(c.is_effective_on(date(2025, 1, 1)));
        assert!(c.is_effective_on(date(2030, 1, 1)));
        assert!(c.is_open_base_salary());
    }

    #[test]
    fn test_closed_component_window_is_inclusive() {
        let c = component(date(2025, 1, 1), Some(date(2025, 6, 30)));
        assert!(c.is_effective_on(date(2025, 6, 30)));
        assert!(!c.is_effective_on(date(2025, 7, 1)));
        assert!(!c.is_open_base_salary());
    }
}
