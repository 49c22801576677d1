//! Integration tests for gst-billing-core

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use gst_billing_core::{
    amount_in_words, BackupSnapshot, Billing, BillingConfig, BillingError, BillingStorage,
    Customer, DirectorySink, Factory, InvoiceDraft, InvoiceItem, InvoiceQuery, InvoiceStatus,
    InvoiceTotals, MemoryStorage, Product, ReportPeriod, ShippingAddress,
};

fn march(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

fn line(name: &str, quantity: i64, rate: i64, gst: i64) -> InvoiceItem {
    InvoiceItem::new(
        String::new(),
        name.to_string(),
        BigDecimal::from(quantity),
        BigDecimal::from(rate),
        BigDecimal::from(gst),
    )
}

async fn acme_and_plant(billing: &mut Billing<MemoryStorage>) -> (Customer, Factory) {
    let mut acme = Customer::new("c1".to_string(), "Acme".to_string());
    acme.gstin = Some("27AAAAA0000A1Z5".to_string());
    acme.address = "Plot 45, MIDC, Mumbai".to_string();
    acme.shipping_addresses = vec![ShippingAddress::same_as_billing(
        "s1".to_string(),
        "Head Office".to_string(),
    )];
    let acme = billing.save_customer(acme).await.unwrap();

    let mut plant = Factory::new(
        "f1".to_string(),
        "Plant1".to_string(),
        "27AAACA0000A1Z5".to_string(),
        "Gala 12, Industrial Estate, Pune".to_string(),
    );
    plant.bank_name = Some("State Bank".to_string());
    plant.account_number = Some("1234567890".to_string());
    plant.ifsc_code = Some("SBIN0001234".to_string());
    let plant = billing.save_factory(plant).await.unwrap();

    (acme, plant)
}

#[tokio::test]
async fn test_complete_billing_workflow() {
    let mut billing = Billing::new(MemoryStorage::new());
    let (acme, plant) = acme_and_plant(&mut billing).await;

    let invoice = billing
        .save_invoice(
            InvoiceDraft::new(march(15), acme.id.clone())
                .factory(plant.id.clone())
                .item(line("Steel Bolt", 2, 100, 18)),
        )
        .await
        .unwrap();

    assert_eq!(invoice.invoice_number, "#INV-2024-03-15-001");
    assert_eq!(invoice.sub_total, BigDecimal::from(200));
    assert_eq!(invoice.tax_total, BigDecimal::from(36));
    assert_eq!(invoice.grand_total, BigDecimal::from(236));
    assert_eq!(invoice.status, InvoiceStatus::Pending);
    assert!(!invoice.is_interstate);

    // Invoice document
    let doc = billing.render_invoice(&invoice.id).await.unwrap();
    assert_eq!(doc.file_name, "Invoice__INV-2024-03-15-001.pdf");

    let totals = doc.totals().unwrap();
    assert_eq!(totals.line("Subtotal").unwrap().amount, "₹200.00");
    assert_eq!(totals.line("CGST").unwrap().amount, "₹18.00");
    assert_eq!(totals.line("SGST").unwrap().amount, "₹18.00");
    assert!(totals.line("IGST").is_none());
    assert!(totals.line("Discount").is_none());
    assert_eq!(totals.line("GRAND TOTAL").unwrap().amount, "₹236.00");

    let table = doc.table().unwrap();
    assert_eq!(table.data_rows().count(), 1);
    assert_eq!(table.padding_count(), 7);

    assert!(doc.contains_text(&amount_in_words(&invoice.grand_total)));
    assert!(doc.contains_text("IFSC: SBIN0001234 | Current Account"));
    assert!(doc.contains_text("Pune"));

    // Monthly report
    let summary = billing
        .monthly_summary(ReportPeriod::new(2024, 3).unwrap())
        .await
        .unwrap();
    assert_eq!(summary.invoice_count, 1);
    assert_eq!(summary.total_tax, BigDecimal::from(36));
    assert_eq!(summary.split.cgst, BigDecimal::from(18));
    assert_eq!(summary.split.sgst, BigDecimal::from(18));
    assert_eq!(summary.split.igst, BigDecimal::from(0));
    assert_eq!(summary.net_payable(), BigDecimal::from(36));

    let report = billing
        .render_monthly_report(
            summary.period,
            march(31).and_hms_opt(18, 0, 0).unwrap(),
            None,
        )
        .await
        .unwrap();
    assert_eq!(report.file_name, "GST_Report_MARCH_2024.pdf");
    assert!(report.contains_text("Local Sales (18%)"));
}

#[tokio::test]
async fn test_invoice_numbering_per_day() {
    let mut billing = Billing::new(MemoryStorage::new());
    let (acme, _) = acme_and_plant(&mut billing).await;

    for _ in 0..2 {
        billing
            .save_invoice(InvoiceDraft::new(march(15), acme.id.clone()).item(line("Nut", 1, 10, 5)))
            .await
            .unwrap();
    }

    assert_eq!(
        billing.next_invoice_number(march(15)).await.unwrap(),
        "#INV-2024-03-15-003"
    );
    assert_eq!(
        billing.next_invoice_number(march(16)).await.unwrap(),
        "#INV-2024-03-16-001"
    );
}

#[tokio::test]
async fn test_interstate_invoice_uses_igst() {
    let mut billing = Billing::new(MemoryStorage::new());
    let (_, plant) = acme_and_plant(&mut billing).await;

    let mut globex = Customer::new(String::new(), "Globex".to_string());
    globex.gstin = Some("29AAAAA0000A1Z5".to_string());
    let globex = billing.save_customer(globex).await.unwrap();

    let invoice = billing
        .save_invoice(
            InvoiceDraft::new(march(20), globex.id)
                .factory(plant.id)
                .item(line("Gear", 1, 1000, 18)),
        )
        .await
        .unwrap();
    assert!(invoice.is_interstate);

    let doc = billing.render_invoice(&invoice.id).await.unwrap();
    let totals = doc.totals().unwrap();
    assert_eq!(totals.line("IGST").unwrap().amount, "₹180.00");
    assert!(totals.line("CGST").is_none());

    let summary = billing
        .monthly_summary(ReportPeriod::new(2024, 3).unwrap())
        .await
        .unwrap();
    assert_eq!(summary.split.igst, BigDecimal::from(180));
}

#[tokio::test]
async fn test_inclusive_pricing_backs_out_tax() {
    let mut billing = Billing::new(MemoryStorage::new());
    let (acme, _) = acme_and_plant(&mut billing).await;

    let invoice = billing
        .save_invoice(
            InvoiceDraft::new(march(15), acme.id).item(line("Kit", 1, 118, 18).inclusive(true)),
        )
        .await
        .unwrap();

    assert_eq!(invoice.sub_total, BigDecimal::from(100));
    assert_eq!(invoice.tax_total, BigDecimal::from(18));
    assert_eq!(invoice.grand_total, BigDecimal::from(118));
}

#[tokio::test]
async fn test_validation_rejections() {
    let mut billing = Billing::new(MemoryStorage::new());
    let (acme, _) = acme_and_plant(&mut billing).await;

    let blank_name = billing
        .save_customer(Customer::new(String::new(), "  ".to_string()))
        .await;
    assert!(matches!(blank_name, Err(BillingError::Validation(_))));

    let bad_slab = billing
        .save_product(Product::new(
            String::new(),
            "Widget".to_string(),
            "8481".to_string(),
            BigDecimal::from(10),
            BigDecimal::from(15),
        ))
        .await;
    assert!(matches!(bad_slab, Err(BillingError::Validation(_))));

    let excess_discount = billing
        .save_invoice(
            InvoiceDraft::new(march(15), acme.id.clone())
                .item(line("Nut", 1, 100, 18))
                .discount(BigDecimal::from(500)),
        )
        .await;
    assert!(matches!(excess_discount, Err(BillingError::Validation(_))));
    assert!(billing
        .list_invoices(&InvoiceQuery::new())
        .await
        .unwrap()
        .is_empty());

    let mut lenient = BillingConfig::default();
    lenient.tax.reject_excess_discount = false;
    let mut lenient_billing = Billing::with_config(MemoryStorage::new(), lenient);
    let (acme, _) = acme_and_plant(&mut lenient_billing).await;
    let negative = lenient_billing
        .save_invoice(
            InvoiceDraft::new(march(15), acme.id)
                .item(line("Nut", 1, 100, 18))
                .discount(BigDecimal::from(500)),
        )
        .await
        .unwrap();
    assert_eq!(negative.grand_total, BigDecimal::from(-382));
}

#[tokio::test]
async fn test_render_falls_back_when_parties_are_gone() {
    let mut billing = Billing::new(MemoryStorage::new());
    let (acme, plant) = acme_and_plant(&mut billing).await;

    let invoice = billing
        .save_invoice(
            InvoiceDraft::new(march(15), acme.id.clone())
                .factory(plant.id.clone())
                .ship_to("s1")
                .item(line("Nut", 1, 100, 18)),
        )
        .await
        .unwrap();

    billing.delete_factory(&plant.id).await.unwrap();
    billing.delete_customer(&acme.id).await.unwrap();

    let doc = billing.render_invoice(&invoice.id).await.unwrap();
    assert!(doc.contains_text("ABC Factory Pvt Ltd"));
    assert!(doc.contains_text("No bank details provided"));
    // Snapshots survive the deletions
    assert!(doc.contains_text("Acme"));
    assert!(doc.contains_text("Plot 45, MIDC, Mumbai"));
}

#[tokio::test]
async fn test_import_merge_preserves_existing_ids() {
    let mut billing = Billing::new(MemoryStorage::new());
    let (acme, _) = acme_and_plant(&mut billing).await;
    billing
        .save_invoice(InvoiceDraft::new(march(15), acme.id.clone()).item(line("Nut", 1, 10, 5)))
        .await
        .unwrap();

    let backup = billing.export_json().await.unwrap();

    let mut other = Billing::new(MemoryStorage::new());
    let mut renamed = Customer::new(acme.id.clone(), "Acme Renamed".to_string());
    renamed.address = "Elsewhere".to_string();
    other.save_customer(renamed).await.unwrap();

    let report = other.import_json(&backup).await.unwrap();
    assert_eq!(report.customers.added, 0);
    assert_eq!(report.customers.skipped, 1);
    assert_eq!(report.factories.added, 1);
    assert_eq!(report.invoices.added, 1);

    let customers = other.list_customers().await.unwrap();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].name, "Acme Renamed");

    // A second import is a no-op
    let again = other.import_json(&backup).await.unwrap();
    assert_eq!(again.total_added(), 0);
    assert_eq!(
        other.list_invoices(&InvoiceQuery::new()).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_legacy_backup_keys_import() {
    let mut storage = MemoryStorage::new();
    let json = r#"{
        "gst_billing_products": [
            {"id": "p1", "name": "Bolt", "hsnCode": "7318", "price": "12.50", "gstRate": "18"}
        ]
    }"#;

    let snapshot = BackupSnapshot::from_json(json).unwrap();
    gst_billing_core::billing::backup::import_snapshot(&mut storage, snapshot)
        .await
        .unwrap();

    let products = storage.list_products().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].price, "12.50".parse::<BigDecimal>().unwrap());
    assert!(storage.list_customers().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_legacy_numeric_invoice_imports_exactly() {
    let mut billing = Billing::new(MemoryStorage::new());
    let json = r##"{
        "gst_billing_invoices": [{
            "id": "inv-legacy",
            "invoiceNumber": "#INV-2024-03-15-001",
            "date": "2024-03-15T10:30:00.000Z",
            "customerId": "c1",
            "customerName": "Acme Manufacturing Ltd",
            "items": [{
                "id": "i1",
                "productId": "p1",
                "productName": "Steel Bolt",
                "quantity": 500,
                "rate": 45.1,
                "gstRate": 18,
                "taxAmount": 4059,
                "total": 26609
            }],
            "subTotal": 22550,
            "taxTotal": 4059,
            "grandTotal": 26609,
            "status": "PAID"
        }]
    }"##;

    let report = billing.import_json(json).await.unwrap();
    assert_eq!(report.invoices.added, 1);

    let invoice = billing.get_invoice("inv-legacy").await.unwrap().unwrap();
    assert_eq!(invoice.date, march(15));
    assert_eq!(invoice.items[0].rate, "45.1".parse::<BigDecimal>().unwrap());
    assert!(InvoiceTotals::for_invoice(&invoice).matches(&invoice));

    let summary = billing
        .monthly_summary(ReportPeriod::new(2024, 3).unwrap())
        .await
        .unwrap();
    assert_eq!(summary.total_tax, BigDecimal::from(4059));
    assert_eq!(summary.split.cgst, "2029.5".parse::<BigDecimal>().unwrap());
}

#[tokio::test]
async fn test_documents_written_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let mut billing = Billing::new(MemoryStorage::new());
    let (acme, plant) = acme_and_plant(&mut billing).await;

    let invoice = billing
        .save_invoice(
            InvoiceDraft::new(march(15), acme.id)
                .factory(plant.id)
                .item(line("Nut", 3, 50, 12)),
        )
        .await
        .unwrap();

    let sink = DirectorySink::new(dir.path());
    let doc = billing.render_invoice(&invoice.id).await.unwrap();
    let delivered = billing.deliver(&sink, &doc).await.unwrap();

    let path = delivered.location.unwrap();
    assert_eq!(path, dir.path().join("Invoice__INV-2024-03-15-001.html"));
    let html = std::fs::read_to_string(path).unwrap();
    assert!(html.contains("TAX INVOICE"));
    assert!(html.contains("₹168.00"));
}
