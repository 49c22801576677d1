//! Invoice numbers and suggested file names

use chrono::{Datelike, NaiveDate};

use crate::format::date::{iso_date, period_label};
use crate::tax::report::ReportPeriod;
use crate::types::Invoice;

/// `#INV-{YYYY}-{MM}-{DD}-{NNN}`
pub fn format_invoice_number(date: NaiveDate, sequence: usize) -> String {
    format!(
        "#INV-{}-{:02}-{:02}-{:03}",
        date.year(),
        date.month(),
        date.day(),
        sequence
    )
}

/// Next number for `date`: one past the count of invoices already dated that day.
///
/// Two callers that read the same invoice list get the same number; the
/// sequence is only unique under a single writer.
pub fn next_invoice_number(date: NaiveDate, invoices: &[Invoice]) -> String {
    let same_day = invoices.iter().filter(|invoice| invoice.date == date).count();
    format_invoice_number(date, same_day + 1)
}

/// Replace characters that are unsafe in file names (`#`, `/`, `\`, whitespace)
pub fn sanitize_file_component(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| match c {
            '#' | '/' | '\\' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}

/// `Invoice_{number}.pdf`
pub fn invoice_file_name(invoice_number: &str) -> String {
    format!("Invoice_{}.pdf", sanitize_file_component(invoice_number))
}

/// `GST_Report_{MONTH_YEAR}.pdf`
pub fn report_file_name(period: ReportPeriod) -> String {
    format!("GST_Report_{}.pdf", sanitize_file_component(&period_label(period)))
}

/// `gst_backup_{YYYY-MM-DD}.json`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("gst_backup_{}.json", iso_date(date))
}
