//! TSD XML export using quick-xml.
//!
//! Document shape:
//!
//! ```text
//! <TSD xmlns="…">
//!   <Header>  RegistryCode, OrganizationName, Period, DocumentType, Version
//!   <Totals>  TotalPayments, TotalIncomeTax, TotalSocialTax,
//!             TotalUnemploymentEmployer?, TotalUnemploymentEmployee?, TotalFundedPension?
//!   <Rows>
//!     <Row>   RowNumber, PersonalCode, FirstName, LastName, PaymentType,
//!             GrossPayment, BasicExemption?, TaxableAmount?, IncomeTax?,
//!             SocialTax?, UnemploymentEmployee?, UnemploymentEmployer?, FundedPension?
//! ```
//!
//! Elements marked `?` are left out when the amount is zero or negative.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use rust_decimal::Decimal;
use std::io::Cursor;

use super::format_amount;
use crate::error::{EngineError, EngineResult};
use crate::models::{DeclarationTotals, Organization, TsdDeclaration, TsdRow};

/// Namespace URI of the declaration document.
pub const TSD_NAMESPACE: &str = "http://www.emta.ee/schemas/tsd/2025";
/// Document type written in the header.
pub const DOCUMENT_TYPE: &str = "TSD";
/// Schema version written in the header.
pub const SCHEMA_VERSION: &str = "1.0";

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Renders a loaded declaration as the TSD XML document.
///
/// # Errors
///
/// Returns [`EngineError::Export`] if the writer fails.
pub fn export_xml(declaration: &TsdDeclaration, organization: &Organization) -> EngineResult<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_err)?;

    let mut root = BytesStart::new("TSD");
    root.push_attribute(("xmlns", TSD_NAMESPACE));
    writer.write_event(Event::Start(root)).map_err(xml_err)?;

    start(&mut writer, "Header")?;
    text_element(&mut writer, "RegistryCode", &organization.registry_code)?;
    text_element(&mut writer, "OrganizationName", &organization.name)?;
    text_element(&mut writer, "Period", &declaration.period_code())?;
    text_element(&mut writer, "DocumentType", DOCUMENT_TYPE)?;
    text_element(&mut writer, "Version", SCHEMA_VERSION)?;
    end(&mut writer, "Header")?;

    write_totals(&mut writer, &declaration.totals)?;

    start(&mut writer, "Rows")?;
    for (index, row) in declaration.rows.iter().enumerate() {
        write_row(&mut writer, index + 1, row)?;
    }
    end(&mut writer, "Rows")?;

    end(&mut writer, "TSD")?;

    let buf = writer.into_inner().into_inner();
    String::from_utf8(buf).map_err(|e| EngineError::Export {
        message: format!("UTF-8 error: {e}"),
    })
}

fn write_totals(writer: &mut XmlWriter, totals: &DeclarationTotals) -> EngineResult<()> {
    start(writer, "Totals")?;
    amount_element(writer, "TotalPayments", totals.payments)?;
    amount_element(writer, "TotalIncomeTax", totals.income_tax)?;
    amount_element(writer, "TotalSocialTax", totals.social_tax)?;
    optional_amount(writer, "TotalUnemploymentEmployer", totals.unemployment_employer)?;
    optional_amount(writer, "TotalUnemploymentEmployee", totals.unemployment_employee)?;
    optional_amount(writer, "TotalFundedPension", totals.funded_pension)?;
    end(writer, "Totals")
}

fn write_row(writer: &mut XmlWriter, row_number: usize, row: &TsdRow) -> EngineResult<()> {
    start(writer, "Row")?;
    text_element(writer, "RowNumber", &row_number.to_string())?;
    text_element(writer, "PersonalCode", &row.personal_code)?;
    text_element(writer, "FirstName", &row.first_name)?;
    text_element(writer, "LastName", &row.last_name)?;
    text_element(writer, "PaymentType", row.payment_type.code())?;
    amount_element(writer, "GrossPayment", row.gross_payment)?;
    optional_amount(writer, "BasicExemption", row.basic_exemption)?;
    optional_amount(writer, "TaxableAmount", row.taxable_amount)?;
    optional_amount(writer, "IncomeTax", row.income_tax)?;
    optional_amount(writer, "SocialTax", row.social_tax)?;
    optional_amount(writer, "UnemploymentEmployee", row.unemployment_employee)?;
    optional_amount(writer, "UnemploymentEmployer", row.unemployment_employer)?;
    optional_amount(writer, "FundedPension", row.funded_pension)?;
    end(writer, "Row")
}

fn start(writer: &mut XmlWriter, tag: &str) -> EngineResult<()> {
    writer
        .write_event(Event::Start(BytesStart::new(tag)))
        .map_err(xml_err)
}

fn end(writer: &mut XmlWriter, tag: &str) -> EngineResult<()> {
    writer
        .write_event(Event::End(BytesEnd::new(tag)))
        .map_err(xml_err)
}

fn text_element(writer: &mut XmlWriter, tag: &str, text: &str) -> EngineResult<()> {
    start(writer, tag)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_err)?;
    end(writer, tag)
}

fn amount_element(writer: &mut XmlWriter, tag: &str, amount: Decimal) -> EngineResult<()> {
    text_element(writer, tag, &format_amount(amount))
}

fn optional_amount(writer: &mut XmlWriter, tag: &str, amount: Decimal) -> EngineResult<()> {
    if amount > Decimal::ZERO {
        amount_element(writer, tag, amount)?;
    }
    Ok(())
}

fn xml_err(e: std::io::Error) -> EngineError {
    EngineError::Export {
        message: format!("XML generation error: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeclarationStatus, PaymentType};
    use chrono::Utc;
    use quick_xml::Reader;
    use uuid::Uuid;

    fn organization() -> Organization {
        Organization {
            registry_code: "12345678".to_string(),
            name: "Näidis & Partnerid OÜ".to_string(),
        }
    }

    fn row(personal_code: &str, gross: i64, funded_pension: i64) -> TsdRow {
        TsdRow {
            id: Uuid::new_v4(),
            declaration_id: Uuid::nil(),
            employee_id: Uuid::new_v4(),
            personal_code: personal_code.to_string(),
            first_name: "Mari".to_string(),
            last_name: "Maasikas".to_string(),
            payment_type: PaymentType::RegularSalary,
            gross_payment: Decimal::new(gross, 0),
            basic_exemption: Decimal::new(700, 0),
            taxable_amount: Decimal::new(gross - 700, 0).max(Decimal::ZERO),
            income_tax: Decimal::new(286, 0),
            social_tax: Decimal::new(660, 0),
            unemployment_employee: Decimal::new(32, 0),
            unemployment_employer: Decimal::new(16, 0),
            funded_pension: Decimal::new(funded_pension, 0),
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

    fn assert_well_formed(xml: &str) {
        let mut reader = Reader::from_str(xml);
        loop {
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("malformed XML: {e}"),
            }
        }
    }

    #[test]
    fn test_header_and_namespace() {
        let xml = export_xml(&declaration(vec![row("38001010009", 2000, 40)]), &organization()).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(&format!("<TSD xmlns=\"{TSD_NAMESPACE}\">")));
        assert!(xml.contains("<RegistryCode>12345678</RegistryCode>"));
        assert!(xml.contains("<OrganizationName>Näidis &amp; Partnerid OÜ</OrganizationName>"));
        assert!(xml.contains("<Period>202503</Period>"));
        assert!(xml.contains("<DocumentType>TSD</DocumentType>"));
        assert!(xml.contains("<Version>1.0</Version>"));
        assert_well_formed(&xml);
    }

    #[test]
    fn test_totals_and_rows_are_formatted() {
        let xml = export_xml(
            &declaration(vec![row("38001010009", 2000, 40), row("48001010005", 1500, 0)]),
            &organization(),
        )
        .unwrap();

        assert!(xml.contains("<TotalPayments>3500.00</TotalPayments>"));
        assert!(xml.contains("<TotalIncomeTax>572.00</TotalIncomeTax>"));
        assert!(xml.contains("<TotalFundedPension>40.00</TotalFundedPension>"));
        assert!(xml.contains("<RowNumber>1</RowNumber>"));
        assert!(xml.contains("<RowNumber>2</RowNumber>"));
        assert!(xml.contains("<PaymentType>10</PaymentType>"));
        assert!(xml.contains("<GrossPayment>2000.00</GrossPayment>"));
        assert_eq!(xml.matches("<FundedPension>").count(), 1);
        assert_eq!(xml.matches("<Row>").count(), 2);
    }

    #[test]
    fn test_zero_amounts_are_omitted_except_required_ones() {
        let mut zero = row("38001010009", 0, 0);
        zero.basic_exemption = Decimal::ZERO;
        zero.income_tax = Decimal::ZERO;
        zero.social_tax = Decimal::ZERO;
        zero.unemployment_employee = Decimal::ZERO;
        zero.unemployment_employer = Decimal::ZERO;
        zero.taxable_amount = Decimal::new(-5, 0);

        let xml = export_xml(&declaration(vec![zero]), &organization()).unwrap();

        assert!(xml.contains("<TotalPayments>0.00</TotalPayments>"));
        assert!(xml.contains("<TotalIncomeTax>0.00</TotalIncomeTax>"));
        assert!(xml.contains("<TotalSocialTax>0.00</TotalSocialTax>"));
        assert!(!xml.contains("TotalUnemploymentEmployer"));
        assert!(!xml.contains("TotalUnemploymentEmployee"));
        assert!(!xml.contains("TotalFundedPension"));

        assert!(xml.contains("<GrossPayment>0.00</GrossPayment>"));
        for tag in ["BasicExemption", "TaxableAmount", "IncomeTax>", "SocialTax>", "FundedPension"] {
            assert!(!xml.contains(&format!("<{tag}")), "{tag} should be omitted");
        }
        assert_well_formed(&xml);
    }

    #[test]
    fn test_empty_rows_still_produce_document() {
        let xml = export_xml(&declaration(Vec::new()), &organization()).unwrap();
        assert!(xml.contains("<Rows>") || xml.contains("<Rows/>"));
        assert_well_formed(&xml);
    }
}
