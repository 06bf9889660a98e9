//! Semicolon-delimited declaration export.

use super::format_amount;
use crate::models::{TsdDeclaration, TsdRow};

/// The fixed header line, without the line terminator.
pub const CSV_HEADER: &str = "row_number;personal_code;first_name;last_name;payment_type;\
gross_payment;basic_exemption;taxable_amount;income_tax;social_tax;\
unemployment_ee;unemployment_er;funded_pension";

/// Renders the declaration's rows as CSV.
///
/// Every money column is printed with two decimals, including zeros and
/// negatives. Lines end with `\n`.
pub fn export_csv(declaration: &TsdDeclaration) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + declaration.rows.len() * 128);
    out.push_str(CSV_HEADER);
    out.push('\n');

    for (index, row) in declaration.rows.iter().enumerate() {
        write_row(&mut out, index + 1, row);
    }
    out
}

fn write_row(out: &mut String, row_number: usize, row: &TsdRow) {
    out.push_str(&row_number.to_string());
    out.push(';');
    csv_field(out, &row.personal_code);
    out.push(';');
    csv_field(out, &row.first_name);
    out.push(';');
    csv_field(out, &row.last_name);
    out.push(';');
    out.push_str(row.payment_type.code());

    for amount in [
        row.gross_payment,
        row.basic_exemption,
        row.taxable_amount,
        row.income_tax,
        row.social_tax,
        row.unemployment_employee,
        row.unemployment_employer,
        row.funded_pension,
    ] {
        out.push(';');
        out.push_str(&format_amount(amount));
    }
    out.push('\n');
}

/// Quotes a text field only if it contains a delimiter, quote or line break.
fn csv_field(out: &mut String, value: &str) {
    if !value.contains([';', '"', '\n', '\r']) {
        out.push_str(value);
        return;
    }
    out.push('"');
    for ch in value.chars() {
        if ch == '"' {
            out.push_str("\"\"");
        } else {
            out.push(ch);
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeclarationStatus, DeclarationTotals, PaymentType};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn row(first_name: &str, gross: i64) -> TsdRow {
        TsdRow {
            id: Uuid::new_v4(),
            declaration_id: Uuid::nil(),
            employee_id: Uuid::new_v4(),
            personal_code: "38001010009".to_string(),
            first_name: first_name.to_string(),
            last_name: "Tamm".to_string(),
            payment_type: PaymentType::RegularSalary,
            gross_payment: Decimal::new(gross, 2),
            basic_exemption: Decimal::new(700, 0),
            taxable_amount: Decimal::new(1300, 0),
            income_tax: Decimal::new(286, 0),
            social_tax: Decimal::new(660, 0),
            unemployment_employee: Decimal::new(32, 0),
            unemployment_employer: Decimal::new(16, 0),
            funded_pension: Decimal::ZERO,
        }
    }

    fn declaration(rows: Vec<TsdRow>) -> TsdDeclaration {
        TsdDeclaration {
            id: Uuid::nil(),
            payroll_run_id: Uuid::nil(),
            period_year: 2025,
            period_month: 3,
            status: DeclarationStatus::Draft,
            totals: DeclarationTotals::from_rows(&rows),
            submitted_at: None,
            external_reference: None,
            created_at: Utc::now(),
            rows,
        }
    }

    #[test]
    fn test_header_has_thirteen_columns() {
        assert_eq!(CSV_HEADER.split(';').count(), 13);
        assert!(CSV_HEADER.starts_with("row_number;personal_code;"));
        assert!(CSV_HEADER.ends_with(";unemployment_ee;unemployment_er;funded_pension"));
    }

    #[test]
    fn test_rows_are_numbered_and_zeros_printed() {
        let csv = export_csv(&declaration(vec![row("Jaan", 200000), row("Mari", 150050)]));
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            "1;38001010009;Jaan;Tamm;10;2000.00;700.00;1300.00;286.00;660.00;32.00;16.00;0.00"
        );
        assert!(lines[2].starts_with("2;38001010009;Mari;Tamm;10;1500.50;"));
        assert!(csv.ends_with('\n'));
    }

    #[test]
    fn test_empty_declaration_is_header_only() {
        assert_eq!(export_csv(&declaration(Vec::new())), format!("{CSV_HEADER}\n"));
    }

    #[test]
    fn test_fields_with_delimiters_are_quoted() {
        let mut out = String::new();
        csv_field(&mut out, "Mari;Liis");
        out.push('|');
        csv_field(&mut out, "O\"Neil");
        out.push('|');
        csv_field(&mut out, "Plain");
        assert_eq!(out, "\"Mari;Liis\"|\"O\"\"Neil\"|Plain");
    }
}
