//! Configuration types for payroll tax rules.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Metadata about the jurisdiction whose rules are loaded.
#[derive(Debug, Clone, Deserialize)]
pub struct JurisdictionMetadata {
    /// ISO country code (e.g., "EE").
    pub code: String,
    /// The human-readable name of the jurisdiction.
    pub name: String,
    /// Currency all amounts are expressed in.
    pub currency: String,
    /// URL to the official tax authority documentation.
    pub source_url: String,
}

/// Statutory rates in effect from a given date.
///
/// Every rate is a decimal fraction (0.22 means 22%). The rate table is
/// passed into the tax calculator instead of living in process-wide
/// constants, so a new year's rates are a new file rather than a code change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    /// First day these rates apply.
    pub effective_date: NaiveDate,
    /// Flat income tax rate applied to taxable income.
    pub income_tax_rate: Decimal,
    /// Employer social tax rate applied to gross.
    pub social_tax_rate: Decimal,
    /// Monthly social tax floor for any positive gross.
    pub minimum_social_tax: Decimal,
    /// Unemployment insurance withheld from the employee.
    pub unemployment_employee_rate: Decimal,
    /// Unemployment insurance paid by the employer.
    pub unemployment_employer_rate: Decimal,
}

// Evaluated at compile time, so an invalid date fails the build.
const JANUARY_2025: NaiveDate = match NaiveDate::from_ymd_opt(2025, 1, 1) {
    Some(date) => date,
    None => panic!("invalid rate table date"),
};

impl RateTable {
    /// The Estonian rates for 2025.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::config::RateTable;
    /// use rust_decimal::Decimal;
    ///
    /// let rates = RateTable::estonia_2025();
    /// assert_eq!(rates.income_tax_rate, Decimal::new(22, 2));
    /// assert_eq!(rates.minimum_social_tax, Decimal::new(27060, 2));
    /// ```
    pub fn estonia_2025() -> Self {
        Self {
            effective_date: JANUARY_2025,
            income_tax_rate: Decimal::new(22, 2),
            social_tax_rate: Decimal::new(33, 2),
            minimum_social_tax: Decimal::new(27060, 2),
            unemployment_employee_rate: Decimal::new(16, 3),
            unemployment_employer_rate: Decimal::new(8, 3),
        }
    }
}

/// All rate tables for a jurisdiction, ordered by effective date.
#[derive(Debug, Clone)]
pub struct RateSchedule {
    /// Rate tables sorted oldest first.
    tables: Vec<RateTable>,
}

impl RateSchedule {
    /// Creates a schedule from rate tables in any order.
    pub fn new(tables: Vec<RateTable>) -> Self {
        let mut sorted = tables;
        sorted.sort_by(|a, b| a.effective_date.cmp(&b.effective_date));
        Self { tables: sorted }
    }

    /// Returns all rate tables, oldest first.
    pub fn tables(&self) -> &[RateTable] {
        &self.tables
    }

    /// Finds the most recent rate table effective on or before `date`.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::config::{RateSchedule, RateTable};
    /// use chrono::NaiveDate;
    ///
    /// let schedule = RateSchedule::new(vec![RateTable::estonia_2025()]);
    /// let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    /// assert!(schedule.rate_table_for(date).is_ok());
    ///
    /// let too_early = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    /// assert!(schedule.rate_table_for(too_early).is_err());
    /// ```
    pub fn rate_table_for(&self, date: NaiveDate) -> EngineResult<&RateTable> {
        self.tables
            .iter()
            .rfind(|table| table.effective_date <= date)
            .ok_or(EngineError::RateNotFound { date })
    }
}

impl From<RateTable> for RateSchedule {
    fn from(table: RateTable) -> Self {
        Self::new(vec![table])
    }
}
