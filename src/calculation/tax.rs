//! Statutory payroll tax calculation.
//!
//! This module turns a gross monthly salary into the full employee and
//! employer tax breakdown, using the rates in a [`RateTable`].

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::config::RateTable;

/// Rounds a money amount to cents, half away from zero.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_money(Decimal::from_str("10.005").unwrap()), Decimal::from_str("10.01").unwrap());
/// assert_eq!(round_money(Decimal::from_str("-10.005").unwrap()), Decimal::from_str("-10.01").unwrap());
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Full tax breakdown for one gross salary.
///
/// Every line item is rounded on its own; sums are built from the
/// already-rounded items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    /// Gross salary the breakdown was computed from.
    pub gross_salary: Decimal,
    /// Basic exemption deducted before income tax.
    pub basic_exemption: Decimal,
    /// `max(0, gross - exemption)`.
    pub taxable_income: Decimal,
    /// Income tax withheld.
    pub income_tax: Decimal,
    /// Employee unemployment insurance withheld.
    pub unemployment_insurance_employee: Decimal,
    /// Funded pension withheld.
    pub funded_pension: Decimal,
    /// Sum of the three withholdings.
    pub total_deductions: Decimal,
    /// Gross minus withholdings.
    pub net_salary: Decimal,
    /// Employer social tax, floored at the monthly minimum.
    pub social_tax: Decimal,
    /// Employer unemployment insurance.
    pub unemployment_insurance_employer: Decimal,
    /// Gross plus employer contributions.
    pub total_employer_cost: Decimal,
}

/// Pure tax calculator bound to one rate table.
///
/// The calculator has no side effects and no error conditions, so the same
/// inputs always produce the same breakdown. Rejecting negative gross is the
/// caller's job.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::TaxCalculator;
/// use payroll_engine::config::RateTable;
/// use rust_decimal::Decimal;
///
/// let calculator = TaxCalculator::new(RateTable::estonia_2025());
/// let breakdown = calculator.calculate(
///     Decimal::new(2000, 0),
///     Decimal::new(700, 0),
///     Decimal::new(2, 2),
/// );
///
/// assert_eq!(breakdown.income_tax, Decimal::new(286, 0));
/// assert_eq!(breakdown.net_salary, Decimal::new(1642, 0));
/// assert_eq!(breakdown.total_employer_cost, Decimal::new(2676, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxCalculator {
    rates: RateTable,
}

impl TaxCalculator {
    /// Creates a calculator for the given rates.
    pub fn new(rates: RateTable) -> Self {
        Self { rates }
    }

    /// Returns the rate table in use.
    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Computes the breakdown for one month's gross salary.
    ///
    /// # Arguments
    ///
    /// * `gross` - Gross salary for the month
    /// * `exemption` - Basic exemption to deduct (zero if not claimed)
    /// * `pension_rate` - Funded pension rate as a fraction
    pub fn calculate(&self, gross: Decimal, exemption: Decimal, pension_rate: Decimal) -> TaxBreakdown {
        let rates = &self.rates;

        let unemployment_insurance_employee = round_money(gross * rates.unemployment_employee_rate);
        let funded_pension = round_money(gross * pension_rate);
        let taxable_income = (gross - exemption).max(Decimal::ZERO);
        let income_tax = round_money(taxable_income * rates.income_tax_rate);

        let total_deductions = income_tax + unemployment_insurance_employee + funded_pension;
        let net_salary = gross - total_deductions;

        let mut social_tax = round_money(gross * rates.social_tax_rate);
        if gross > Decimal::ZERO && social_tax < rates.minimum_social_tax {
            social_tax = rates.minimum_social_tax;
        }
        let unemployment_insurance_employer = round_money(gross * rates.unemployment_employer_rate);
        let total_employer_cost = gross + social_tax + unemployment_insurance_employer;

        TaxBreakdown {
            gross_salary: gross,
            basic_exemption: exemption,
            taxable_income,
            income_tax,
            unemployment_insurance_employee,
            funded_pension,
            total_deductions,
            net_salary,
            social_tax,
            unemployment_insurance_employer,
            total_employer_cost,
        }
    }
}

impl Default for TaxCalculator {
    fn default() -> Self {
        Self::new(RateTable::estonia_2025())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn calculate(gross: &str, exemption: &str, pension: &str) -> TaxBreakdown {
        TaxCalculator::default().calculate(dec(gross), dec(exemption), dec(pension))
    }

    #[test]
    fn test_standard_salary_breakdown() {
        let b = calculate("2000.00", "700.00", "0.02");

        assert_eq!(b.taxable_income, dec("1300.00"));
        assert_eq!(b.income_tax, dec("286.00"));
        assert_eq!(b.unemployment_insurance_employee, dec("32.00"));
        assert_eq!(b.funded_pension, dec("40.00"));
        assert_eq!(b.total_deductions, dec("358.00"));
        assert_eq!(b.net_salary, dec("1642.00"));
        assert_eq!(b.social_tax, dec("660.00"));
        assert_eq!(b.unemployment_insurance_employer, dec("16.00"));
        assert_eq!(b.total_employer_cost, dec("2676.00"));
    }

    #[test]
    fn test_social_tax_exactly_at_floor() {
        let b = calculate("820.00", "700.00", "0.02");
        assert_eq!(b.social_tax, dec("270.60"));
        assert_eq!(b.income_tax, dec("26.40"));
    }

    #[test]
    fn test_social_tax_below_floor_is_clamped() {
        let b = calculate("500.00", "0", "0");
        assert_eq!(b.social_tax, dec("270.60"));
        assert_eq!(b.total_employer_cost, dec("774.60"));
    }

    #[test]
    fn test_zero_gross_has_no_social_tax_floor() {
        let b = calculate("0", "700.00", "0.02");
        assert_eq!(b.social_tax, Decimal::ZERO);
        assert_eq!(b.total_employer_cost, Decimal::ZERO);
        assert_eq!(b.net_salary, Decimal::ZERO);
    }

    #[test]
    fn test_exemption_larger_than_gross_means_no_income_tax() {
        let b = calculate("600.00", "700.00", "0");
        assert_eq!(b.taxable_income, Decimal::ZERO);
        assert_eq!(b.income_tax, Decimal::ZERO);
        assert_eq!(b.net_salary, dec("590.40"));
    }

    #[test]
    fn test_each_line_item_is_rounded_independently() {
        // 1234.56 * 0.016 = 19.75296, * 0.02 = 24.6912, (1234.56 - 654.32) * 0.22 = 127.6528
        let b = calculate("1234.56", "654.32", "0.02");
        assert_eq!(b.unemployment_insurance_employee, dec("19.75"));
        assert_eq!(b.funded_pension, dec("24.69"));
        assert_eq!(b.income_tax, dec("127.65"));
        assert_eq!(b.total_deductions, dec("172.09"));
        assert_eq!(b.net_salary, dec("1062.47"));
        // 1234.56 * 0.33 = 407.4048, * 0.008 = 9.87648
        assert_eq!(b.social_tax, dec("407.40"));
        assert_eq!(b.unemployment_insurance_employer, dec("9.88"));
    }

    #[test]
    fn test_midpoint_rounds_away_from_zero() {
        // 0.3125 * 0.016 = 0.005 exactly
        let b = calculate("0.3125", "0", "0");
        assert_eq!(b.unemployment_insurance_employee, dec("0.01"));
    }

    #[test]
    fn test_rates_come_from_table() {
        let rates = RateTable {
            income_tax_rate: dec("0.24"),
            ..RateTable::estonia_2025()
        };
        let b = TaxCalculator::new(rates).calculate(dec("1000"), dec("0"), dec("0"));
        assert_eq!(b.income_tax, dec("240.00"));
    }

    proptest! {
        #[test]
        fn prop_breakdown_reconciles(
            cents in 0i64..5_000_000,
            exemption_cents in 0i64..100_000,
            pension_pct in prop::sample::select(vec![0i64, 2, 4, 6]),
        ) {
            let gross = Decimal::new(cents, 2);
            let exemption = Decimal::new(exemption_cents, 2);
            let pension = Decimal::new(pension_pct, 2);
            let b = TaxCalculator::default().calculate(gross, exemption, pension);

            prop_assert!(b.taxable_income >= Decimal::ZERO);
            prop_assert!(b.income_tax >= Decimal::ZERO);
            prop_assert_eq!(b.net_salary + b.total_deductions, gross);
            prop_assert_eq!(
                b.total_employer_cost,
                gross + b.social_tax + b.unemployment_insurance_employer
            );
            if gross > Decimal::ZERO {
                prop_assert!(b.social_tax >= dec("270.60"));
            }
        }

        #[test]
        fn prop_calculation_is_deterministic(cents in 0i64..5_000_000) {
            let gross = Decimal::new(cents, 2);
            let calculator = TaxCalculator::default();
            prop_assert_eq!(
                calculator.calculate(gross, dec("700"), dec("0.02")),
                calculator.calculate(gross, dec("700"), dec("0.02"))
            );
        }
    }
}
