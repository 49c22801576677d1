//! Monthly GST liability for a handful of invoices, plus a backup export

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use gst_billing_core::{
    format_currency, Billing, Customer, DirectorySink, Factory, InvoiceDraft, InvoiceItem,
    InvoiceQuery, InvoiceStatus, MemoryStorage, ReportPeriod, RUPEE_SYMBOL,
};
use tracing_subscriber::EnvFilter;

fn item(name: &str, quantity: i64, rate: i64, gst: i64) -> InvoiceItem {
    InvoiceItem::new(
        String::new(),
        name.to_string(),
        BigDecimal::from(quantity),
        BigDecimal::from(rate),
        BigDecimal::from(gst),
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,gst_billing_core=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut billing = Billing::new(MemoryStorage::new());

    let plant = billing
        .save_factory(Factory::new(
            String::new(),
            "Plant1".to_string(),
            "27AAACA0000A1Z5".to_string(),
            "MIDC, Pune".to_string(),
        ))
        .await?;

    let mut local = Customer::new(String::new(), "Acme".to_string());
    local.gstin = Some("27AAAAA0000A1Z5".to_string());
    let local = billing.save_customer(local).await?;

    let mut remote = Customer::new(String::new(), "Globex".to_string());
    remote.gstin = Some("29AAGCG1234K1Z2".to_string());
    let remote = billing.save_customer(remote).await?;

    let day = |month: u32, d: u32| NaiveDate::from_ymd_opt(2024, month, d).ok_or("invalid date");

    let drafts = vec![
        InvoiceDraft::new(day(2, 20)?, local.id.clone()).item(item("Bolt", 10, 40, 18)),
        InvoiceDraft::new(day(3, 5)?, local.id.clone()).item(item("Bolt", 20, 40, 18)),
        InvoiceDraft::new(day(3, 12)?, local.id.clone())
            .item(item("Bearing", 4, 350, 12))
            .item(item("Grease", 2, 120, 5)),
        InvoiceDraft::new(day(3, 18)?, remote.id.clone()).item(item("Gearbox", 1, 12000, 28)),
    ];
    for draft in drafts {
        billing.save_invoice(draft.factory(plant.id.clone())).await?;
    }

    let march = ReportPeriod::new(2024, 3)?;
    let summary = billing.monthly_summary(march).await?;
    let money = |amount: &BigDecimal| format_currency(amount, RUPEE_SYMBOL);

    println!("📊 GST liability for {}", march);
    println!("  Invoices:     {}", summary.invoice_count);
    println!("  Total sales:  {}", money(&summary.total_sales));
    println!("  Output GST:   {} ({})", money(&summary.total_tax), summary.growth);
    println!("  CGST / SGST:  {} / {}", money(&summary.split.cgst), money(&summary.split.sgst));
    println!("  IGST:         {}", money(&summary.split.igst));
    for row in &summary.breakdown {
        println!("    {:<22} {}", row.description(), money(&row.total));
    }
    println!();

    let march_invoices = billing
        .list_invoices(&InvoiceQuery::new().period(march))
        .await?;
    if let Some(oldest) = march_invoices.last() {
        billing.set_invoice_status(&oldest.id, InvoiceStatus::Paid).await?;
    }

    let stats = billing.dashboard_stats(march).await?;
    println!("🏠 Dashboard");
    println!("  Pending: {} across {} invoices", money(&stats.pending_amount), stats.pending_count);
    println!("  Sales growth: {}", stats.sales_growth);
    println!();

    let report = billing
        .render_monthly_report(march, billing.local_now(), None)
        .await?;
    let sink = DirectorySink::new(billing.config().sink.output_dir.clone());
    let delivered = billing.deliver(&sink, &report).await?;
    if let Some(path) = delivered.location {
        println!("📄 Report written to {}", path.display());
    }

    let backup = billing.export_json().await?;
    println!("💾 {} would hold {} bytes", billing.backup_file_name(), backup.len());

    Ok(())
}
