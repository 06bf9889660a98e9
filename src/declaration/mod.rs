//! Monthly tax declarations (TSD).
//!
//! [`DeclarationGenerator`] turns an approved payroll run into a stored
//! declaration and drives its filing lifecycle. The exporters are pure
//! functions over a loaded declaration:
//!
//! - [`export_xml`] renders the government XML document
//! - [`export_csv`] renders the semicolon-delimited spreadsheet view
//! - [`declaration_filename`] names the exported file
//!
//! [`validate_declaration`] reports problems that would make the filing
//! bounce without refusing to export it.

mod csv;
mod filename;
mod generator;
mod validate;
mod xml;

use rust_decimal::Decimal;

use crate::calculation::round_money;

pub use csv::{CSV_HEADER, export_csv};
pub use filename::declaration_filename;
pub use generator::DeclarationGenerator;
pub use validate::{ValidationIssue, validate_declaration};
pub use xml::{DOCUMENT_TYPE, SCHEMA_VERSION, TSD_NAMESPACE, export_xml};

/// Formats an amount with exactly two decimal places.
pub(crate) fn format_amount(amount: Decimal) -> String {
    let mut rounded = round_money(amount);
    if rounded.is_zero() {
        rounded = Decimal::ZERO;
    }
    rounded.rescale(2);
    rounded.to_string()
}
