//! Pre-filing checks for a loaded declaration.

use std::fmt;

use crate::calculation::validate_personal_code;
use crate::models::{DeclarationTotals, TsdDeclaration};

/// A problem found in a declaration before filing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// The declaration has no rows.
    Empty,
    /// A row's personal code fails the checksum.
    InvalidPersonalCode {
        /// 1-based row number as exported.
        row_number: usize,
        /// The rejected code.
        personal_code: String,
    },
    /// The stored totals differ from the sum of the rows.
    TotalsMismatch {
        /// Totals recomputed from the rows.
        expected: DeclarationTotals,
        /// Totals stored on the declaration.
        actual: DeclarationTotals,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::Empty => write!(f, "Declaration has no rows"),
            ValidationIssue::InvalidPersonalCode {
                row_number,
                personal_code,
            } => write!(f, "Row {row_number}: invalid personal code '{personal_code}'"),
            ValidationIssue::TotalsMismatch { expected, actual } => write!(
                f,
                "Totals do not match rows: payments {} vs {}",
                actual.payments, expected.payments
            ),
        }
    }
}

/// Checks a loaded declaration and returns every issue found.
///
/// An empty list means the declaration is ready to file.
pub fn validate_declaration(declaration: &TsdDeclaration) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if declaration.rows.is_empty() {
        issues.push(ValidationIssue::Empty);
    }

    for (index, row) in declaration.rows.iter().enumerate() {
        if !validate_personal_code(&row.personal_code) {
            issues.push(ValidationIssue::InvalidPersonalCode {
                row_number: index + 1,
                personal_code: row.personal_code.clone(),
            });
        }
    }

    let expected = DeclarationTotals::from_rows(&declaration.rows);
    if expected != declaration.totals {
        issues.push(ValidationIssue::TotalsMismatch {
            expected,
            actual: declaration.totals,
        });
    }

    issues
}
