//! Effective base salary lookup.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{ComponentType, SalaryComponent};

/// Sums the recurring base-salary components effective on `date`.
///
/// Components of other types, one-off components, and components whose
/// window does not contain `date` are ignored. Returns zero when nothing
/// applies.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::current_base_salary;
/// use payroll_engine::models::{ComponentType, SalaryComponent};
/// use chrono::{NaiveDate, Utc};
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let component = SalaryComponent {
///     id: Uuid::new_v4(),
///     employee_id: Uuid::new_v4(),
///     component_type: ComponentType::BaseSalary,
///     amount: Decimal::new(2000, 0),
///     is_recurring: true,
///     effective_from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     effective_to: None,
///     created_at: Utc::now(),
/// };
///
/// let date = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
/// assert_eq!(current_base_salary(&[component], date), Decimal::new(2000, 0));
/// ```
pub fn current_base_salary(components: &[SalaryComponent], date: NaiveDate) -> Decimal {
    components
        .iter()
        .filter(|c| c.component_type == ComponentType::BaseSalary && c.is_recurring)
        .filter(|c| c.is_effective_on(date))
        .map(|c| c.amount)
        .sum()
}
