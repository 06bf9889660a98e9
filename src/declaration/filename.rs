//! File names for exported declarations.

use chrono::NaiveDate;

/// Builds an export file name: `<prefix>_<registry>_<YYYYMM>_<YYYYMMDD>.<ext>`.
///
/// # Example
///
/// ```
/// use payroll_engine::declaration::declaration_filename;
/// use chrono::NaiveDate;
///
/// let generated = NaiveDate::from_ymd_opt(2025, 4, 9).unwrap();
/// assert_eq!(
///     declaration_filename("TSD", "12345678", "202503", generated, "xml"),
///     "TSD_12345678_202503_20250409.xml"
/// );
/// ```
pub fn declaration_filename(
    prefix: &str,
    registry_code: &str,
    period: &str,
    generated_on: NaiveDate,
    extension: &str,
) -> String {
    format!(
        "{prefix}_{registry_code}_{period}_{}.{extension}",
        generated_on.format("%Y%m%d")
    )
}
