//! Build a tax invoice and write its document to disk

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use gst_billing_core::{
    amount_in_words, format_currency, Billing, BillingConfig, Customer, DirectorySink, Factory,
    GstCategory, InvoiceDraft, InvoiceItem, MemoryStorage, Product,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,gst_billing_core=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = BillingConfig::load_or_default(None);
    let symbol = config.document.currency_symbol.clone();
    let output_dir = config.sink.output_dir.clone();
    let mut billing = Billing::with_config(MemoryStorage::new(), config);

    println!("🏭 Setting up seller, buyer and catalogue\n");

    let mut plant = Factory::new(
        String::new(),
        "Shree Ganesh Fabricators".to_string(),
        "27AAACS1234F1Z5".to_string(),
        "Gala 12, Bhosari MIDC, Pune".to_string(),
    );
    plant.pincode = Some("411026".to_string());
    plant.bank_name = Some("State Bank of India".to_string());
    plant.account_number = Some("30012345678".to_string());
    plant.ifsc_code = Some("SBIN0001234".to_string());
    let plant = billing.save_factory(plant).await?;

    let mut buyer = Customer::new(String::new(), "Acme Engineering".to_string());
    buyer.gstin = Some("27AAAAA0000A1Z5".to_string());
    buyer.address = "Plot 45, Andheri East, Mumbai".to_string();
    buyer.phone = "+91 98200 12345".to_string();
    let buyer = billing.save_customer(buyer).await?;

    let bolt = billing
        .save_product(Product::new(
            String::new(),
            "Hex Bolt M12".to_string(),
            "7318".to_string(),
            BigDecimal::from(45),
            GstCategory::Higher.rate(),
        ))
        .await?;
    let mut kit = Product::new(
        String::new(),
        "Service Kit".to_string(),
        "8483".to_string(),
        BigDecimal::from(1180),
        GstCategory::Higher.rate(),
    );
    kit.is_inclusive = true;
    let kit = billing.save_product(kit).await?;

    let date = NaiveDate::from_ymd_opt(2024, 3, 15).ok_or("invalid date")?;
    let invoice = billing
        .save_invoice(
            InvoiceDraft::new(date, buyer.id.clone())
                .factory(plant.id.clone())
                .item(InvoiceItem::from_product(String::new(), &bolt, BigDecimal::from(120)))
                .item(InvoiceItem::from_product(String::new(), &kit, BigDecimal::from(2)))
                .item(InvoiceItem::new(
                    String::new(),
                    "Packing charges".to_string(),
                    BigDecimal::from(1),
                    BigDecimal::from(250),
                    GstCategory::Standard.rate(),
                ))
                .discount(BigDecimal::from(100)),
        )
        .await?;

    println!("🧾 Invoice {}", invoice.invoice_number);
    for (i, item) in invoice.items.iter().enumerate() {
        println!(
            "  {}. {} × {} @ {} ({}% GST) = {}",
            i + 1,
            item.product_name,
            item.quantity,
            format_currency(&item.rate, &symbol),
            item.gst_rate,
            format_currency(&item.total, &symbol)
        );
    }
    println!();
    println!("  Subtotal:    {}", format_currency(&invoice.sub_total, &symbol));
    println!("  Total GST:   {}", format_currency(&invoice.tax_total, &symbol));
    println!("  Discount:    {}", format_currency(&invoice.discount, &symbol));
    println!("  Grand Total: {}", format_currency(&invoice.grand_total, &symbol));
    println!("  In words:    {}", amount_in_words(&invoice.grand_total));
    println!();

    let document = billing.render_invoice(&invoice.id).await?;
    let sink = DirectorySink::new(output_dir);
    let delivered = billing.deliver(&sink, &document).await?;

    if let Some(path) = delivered.location {
        println!("📄 Written {} ({} bytes)", path.display(), delivered.bytes);
    }

    Ok(())
}
