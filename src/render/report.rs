//! Monthly GST liability report layout

use chrono::NaiveDateTime;
use tracing::warn;

use crate::config::DocumentConfig;
use crate::format::{display_datetime, format_currency, period_label, report_file_name};
use crate::render::document::{
    Align, Block, Column, Document, DocumentKind, Field, FooterBlock, HeaderBlock, SummaryBlock,
    TableBlock, TableRow,
};
use crate::tax::report::MonthlyGstSummary;
use crate::types::Factory;

pub const REPORT_TITLE: &str = "GST Tax Liability";
pub const OFFICIAL_COPY: &str = "Official Copy";
pub const FALLBACK_BUSINESS_NAME: &str = "My Business";
pub const FALLBACK_BUSINESS_ADDRESS: &str = "No Address";
pub const REPORT_FOOTER: &str =
    "This is a computer generated report and does not require a physical signature.";

/// Lay out a monthly summary. `generated_on` is the only clock input.
pub fn render_gst_report(
    summary: &MonthlyGstSummary,
    factory: Option<&Factory>,
    generated_on: NaiveDateTime,
    config: &DocumentConfig,
) -> Document {
    let symbol = config.currency_symbol.as_str();
    let label = period_label(summary.period);

    if factory.is_none() {
        warn!(period = %summary.period, "No factory for report, rendering placeholder business");
    }

    let mut doc = Document::new(
        DocumentKind::GstReport,
        REPORT_TITLE,
        report_file_name(summary.period),
    );

    let business_name = factory
        .map(|f| f.name.clone())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_BUSINESS_NAME.to_string());
    let address = factory
        .map(|f| f.location.clone())
        .filter(|loc| !loc.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_BUSINESS_ADDRESS.to_string());
    let gstin = factory.map(|f| f.gstin.clone()).unwrap_or_default();

    doc.push(Block::Header(HeaderBlock {
        title: REPORT_TITLE.to_string(),
        subtitle: Some(format!("Report Period: {}", label)),
        badge: OFFICIAL_COPY.to_string(),
        logo: None,
        business_name,
        business_lines: vec![address, format!("GSTIN: {}", gstin)],
        meta: vec![
            Field::new("Generated On", display_datetime(generated_on)),
            Field::new("Reference", summary.period.reference_code()),
            Field::new("Status", "FINAL"),
        ],
    }));

    doc.push(Block::Summary(SummaryBlock {
        heading: "Tax Summary".to_string(),
        cards: vec![
            Field::new("Total Output GST", format_currency(&summary.total_tax, symbol)),
            Field::new(
                "Input Tax Credit",
                format_currency(&summary.input_tax_credit(), symbol),
            ),
            Field::new("Net Payable", format_currency(&summary.net_payable(), symbol)),
        ],
    }));

    let rows = summary
        .breakdown
        .iter()
        .map(|row| {
            TableRow::Cells(vec![
                row.description(),
                format_currency(&row.split.cgst, symbol),
                format_currency(&row.split.sgst, symbol),
                format_currency(&row.split.igst, symbol),
                format_currency(&row.total, symbol),
            ])
        })
        .collect();

    doc.push(Block::Table(TableBlock {
        heading: Some("Detailed Breakdown".to_string()),
        columns: vec![
            Column::new("Category", Align::Left),
            Column::new("CGST", Align::Right),
            Column::new("SGST", Align::Right),
            Column::new("IGST", Align::Right),
            Column::new("Total Tax", Align::Right),
        ],
        rows,
    }));

    doc.push(Block::Footer(FooterBlock {
        notes: vec![REPORT_FOOTER.to_string()],
    }));

    doc
}
