//! Tax invoice layout

use bigdecimal::{BigDecimal, Zero};
use tracing::warn;

use crate::config::DocumentConfig;
use crate::format::{
    amount_in_words, display_date, format_amount, format_currency, format_percent,
    format_quantity, invoice_file_name,
};
use crate::render::document::{
    Align, BankBlock, Block, Column, Document, DocumentKind, Field, FooterBlock, HeaderBlock,
    LineStyle, Logo, PartiesBlock, PartyColumn, SignatureBlock, TableBlock, TableRow, TotalLine,
    TotalsBlock, WordsBlock,
};
use crate::tax::gst::{InvoiceTotals, LineComputation};
use crate::types::{Customer, Factory, Invoice, Product};

pub const INVOICE_TITLE: &str = "TAX INVOICE";
pub const ORIGINAL_COPY: &str = "ORIGINAL COPY";
pub const LOGO_PLACEHOLDER: &str = "LOGO";
pub const FALLBACK_FACTORY_NAME: &str = "ABC Factory Pvt Ltd";
pub const FALLBACK_FACTORY_ADDRESS: &str = "Company Address Location";
pub const FALLBACK_CUSTOMER_ADDRESS: &str = "Customer Address Information";
pub const UNREGISTERED: &str = "Unregistered";
pub const NO_BANK_DETAILS: &str = "No bank details provided";
pub const SIGNATORY_CAPTION: &str = "AUTHORIZED SIGNATORY";

const FOOTER_NOTES: [&str; 2] = [
    "Notes: Goods once sold will not be taken back.",
    "Computer generated invoice, does not require a Signature.",
];

/// Everything the invoice layout reads. Factory and customer are optional:
/// a deleted party degrades to placeholder text.
#[derive(Debug, Clone, Copy)]
pub struct InvoiceContext<'a> {
    pub invoice: &'a Invoice,
    pub factory: Option<&'a Factory>,
    pub customer: Option<&'a Customer>,
    /// Used only to look up HSN codes for catalogue items
    pub products: &'a [Product],
}

impl<'a> InvoiceContext<'a> {
    pub fn new(invoice: &'a Invoice) -> Self {
        Self {
            invoice,
            factory: None,
            customer: None,
            products: &[],
        }
    }

    pub fn with_factory(mut self, factory: Option<&'a Factory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn with_customer(mut self, customer: Option<&'a Customer>) -> Self {
        self.customer = customer;
        self
    }

    pub fn with_products(mut self, products: &'a [Product]) -> Self {
        self.products = products;
        self
    }

    fn hsn_for(&self, product_id: Option<&str>) -> String {
        product_id
            .and_then(|id| self.products.iter().find(|p| p.id == id))
            .map(|p| p.hsn_code.clone())
            .filter(|code| !code.trim().is_empty())
            .unwrap_or_else(|| "-".to_string())
    }
}

/// Lay out a saved invoice. Deterministic for the same inputs.
pub fn render_invoice(ctx: &InvoiceContext<'_>, config: &DocumentConfig) -> Document {
    let invoice = ctx.invoice;
    let totals = InvoiceTotals::for_invoice(invoice);

    if ctx.factory.is_none() {
        warn!(invoice = %invoice.invoice_number, branch = ?invoice.branch_name, "Factory not found, rendering placeholder seller");
    }
    if ctx.customer.is_none() {
        warn!(invoice = %invoice.invoice_number, customer_id = %invoice.customer_id, "Customer not found, rendering placeholder address");
    }
    if !totals.matches(invoice) {
        warn!(invoice = %invoice.invoice_number, "Stored totals differ from recomputed totals");
    }

    let mut doc = Document::new(
        DocumentKind::Invoice,
        INVOICE_TITLE,
        invoice_file_name(&invoice.invoice_number),
    );

    doc.push(Block::Header(header(ctx, config)));
    doc.push(Block::Parties(parties(ctx)));
    doc.push(Block::Table(item_table(ctx, &totals.lines, config)));
    doc.push(Block::Totals(totals_block(invoice, &totals, config)));
    doc.push(Block::AmountInWords(WordsBlock {
        heading: "TOTAL IN WORDS".to_string(),
        text: amount_in_words(&invoice.grand_total),
    }));
    doc.push(Block::BankDetails(bank_block(ctx.factory)));
    doc.push(Block::Signature(SignatureBlock {
        image: ctx
            .factory
            .and_then(|f| f.signature.clone())
            .filter(|blob| !blob.is_empty()),
        caption: SIGNATORY_CAPTION.to_string(),
    }));
    doc.push(Block::Footer(FooterBlock {
        notes: FOOTER_NOTES.iter().map(|s| s.to_string()).collect(),
    }));

    doc
}

fn header(ctx: &InvoiceContext<'_>, config: &DocumentConfig) -> HeaderBlock {
    let invoice = ctx.invoice;
    let factory = ctx.factory;

    let logo = match factory.and_then(|f| f.logo.clone()) {
        Some(blob) if !blob.is_empty() => Logo::Image(blob),
        _ => Logo::Placeholder(LOGO_PLACEHOLDER.to_string()),
    };

    let business_name = factory
        .map(|f| f.name.clone())
        .or_else(|| invoice.branch_name.clone())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_FACTORY_NAME.to_string());

    let location = factory
        .map(|f| f.location.clone())
        .filter(|loc| !loc.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_FACTORY_ADDRESS.to_string());

    let mut business_lines = vec![location];
    if let Some(pincode) = factory.and_then(|f| f.pincode.as_deref()) {
        business_lines.push(format!("Pincode: {}", pincode));
    }
    let gstin = factory
        .map(|f| f.gstin.as_str())
        .filter(|g| !g.trim().is_empty())
        .unwrap_or("N/A");
    business_lines.push(format!("GSTIN: {}", gstin));

    let place = factory
        .and_then(Factory::place_of_supply)
        .unwrap_or(config.place_of_supply_fallback.as_str());

    HeaderBlock {
        title: INVOICE_TITLE.to_string(),
        subtitle: None,
        badge: ORIGINAL_COPY.to_string(),
        logo: Some(logo),
        business_name,
        business_lines,
        meta: vec![
            Field::new("Invoice", invoice.invoice_number.clone()),
            Field::new("Date", display_date(invoice.date)),
            Field::new("Place", place),
        ],
    }
}

fn parties(ctx: &InvoiceContext<'_>) -> PartiesBlock {
    let invoice = ctx.invoice;
    let customer = ctx.customer;

    let billing_address = customer
        .map(|c| c.address.clone())
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_CUSTOMER_ADDRESS.to_string());

    let gstin = customer
        .and_then(|c| c.gstin.as_deref())
        .unwrap_or(UNREGISTERED);

    // The snapshot wins over the live customer record
    let shipping_lines = match &invoice.shipping_address {
        Some(ship) if !ship.address.trim().is_empty() => {
            vec![ship.name.clone(), ship.address.clone()]
        }
        _ => vec![billing_address.clone()],
    };

    let contact = customer
        .map(|c| c.phone.as_str())
        .filter(|p| !p.trim().is_empty())
        .unwrap_or("N/A");

    let mut right_lines = shipping_lines;
    right_lines.push(format!("Contact: {}", contact));

    PartiesBlock {
        left: PartyColumn {
            heading: "BILL TO".to_string(),
            name: invoice.customer_name.clone(),
            lines: vec![billing_address, format!("GSTIN: {}", gstin)],
        },
        right: PartyColumn {
            heading: "SHIP TO".to_string(),
            name: invoice.customer_name.clone(),
            lines: right_lines,
        },
    }
}

fn item_table(
    ctx: &InvoiceContext<'_>,
    lines: &[LineComputation],
    config: &DocumentConfig,
) -> TableBlock {
    let columns = vec![
        Column::new("#", Align::Center),
        Column::new("HSN", Align::Left),
        Column::new("Item Description", Align::Left),
        Column::new("Qty", Align::Center),
        Column::new("Rate", Align::Right),
        Column::new("GST%", Align::Center),
        Column::new("Amt", Align::Right),
    ];

    let mut rows: Vec<TableRow> = ctx
        .invoice
        .items
        .iter()
        .zip(lines)
        .enumerate()
        .map(|(index, (item, line))| {
            TableRow::Cells(vec![
                (index + 1).to_string(),
                ctx.hsn_for(item.product_id.as_deref()),
                item.product_name.clone(),
                format_quantity(&item.quantity),
                format_amount(&line.base_rate),
                format_percent(&item.gst_rate),
                format_amount(&line.taxable_value),
            ])
        })
        .collect();

    let padding = config.min_table_rows.saturating_sub(rows.len());
    rows.extend(std::iter::repeat(TableRow::Padding).take(padding));

    TableBlock {
        heading: None,
        columns,
        rows,
    }
}

fn totals_block(invoice: &Invoice, totals: &InvoiceTotals, config: &DocumentConfig) -> TotalsBlock {
    let symbol = config.currency_symbol.as_str();
    let money = |amount: &BigDecimal| format_currency(amount, symbol);
    let normal = |label: &str, amount: String| TotalLine {
        label: label.to_string(),
        amount,
        style: LineStyle::Normal,
    };

    let mut lines = vec![normal("Subtotal", money(&invoice.sub_total))];

    if invoice.discount > BigDecimal::zero() {
        lines.push(TotalLine {
            label: "Discount".to_string(),
            amount: format!("-{}", money(&invoice.discount)),
            style: LineStyle::Negative,
        });
    }

    lines.push(normal("Taxable Value", money(&totals.taxable_value())));

    if !invoice.tax_total.is_zero() {
        if invoice.is_interstate {
            lines.push(normal("IGST", money(&totals.split.igst)));
        } else {
            lines.push(normal("CGST", money(&totals.split.cgst)));
            lines.push(normal("SGST", money(&totals.split.sgst)));
        }
    }

    lines.push(normal("Total GST", money(&invoice.tax_total)));
    lines.push(TotalLine {
        label: "GRAND TOTAL".to_string(),
        amount: money(&invoice.grand_total),
        style: LineStyle::Emphasis,
    });

    TotalsBlock { lines }
}

fn bank_block(factory: Option<&Factory>) -> BankBlock {
    let lines = match factory.filter(|f| f.has_bank_details()) {
        Some(f) => {
            let mut lines = vec![format!(
                "{} | AC: {}",
                f.bank_name.as_deref().unwrap_or_default(),
                f.account_number.as_deref().unwrap_or("N/A")
            )];
            if let Some(ifsc) = f.ifsc_code.as_deref() {
                lines.push(format!("IFSC: {} | Current Account", ifsc));
            }
            lines
        }
        None => vec![NO_BANK_DETAILS.to_string()],
    };

    BankBlock {
        heading: "BANK DETAILS".to_string(),
        lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ImageBlob, InvoiceItem, ShippingAddress};
    use chrono::NaiveDate;

    fn sample_invoice(discount: i64, is_interstate: bool) -> Invoice {
        let mut invoice = Invoice {
            id: "inv-1".to_string(),
            invoice_number: "#INV-2024-03-15-001".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            customer_id: "c1".to_string(),
            customer_name: "Acme".to_string(),
            branch_name: Some("Plant1".to_string()),
            shipping_address: None,
            items: vec![InvoiceItem::new(
                "i1".to_string(),
                "Steel Bolt".to_string(),
                BigDecimal::from(2),
                BigDecimal::from(100),
                BigDecimal::from(18),
            )],
            sub_total: BigDecimal::zero(),
            tax_total: BigDecimal::zero(),
            discount: BigDecimal::from(discount),
            grand_total: BigDecimal::zero(),
            status: Default::default(),
            is_interstate,
        };
        InvoiceTotals::for_invoice(&invoice).apply_to(&mut invoice);
        invoice
    }

    fn plant() -> Factory {
        let mut factory = Factory::new(
            "f1".to_string(),
            "Plant1".to_string(),
            "27AAACA0000A1Z5".to_string(),
            "Gala 12, MIDC, Pune".to_string(),
        );
        factory.pincode = Some("411019".to_string());
        factory.bank_name = Some("State Bank".to_string());
        factory.account_number = Some("001122".to_string());
        factory.ifsc_code = Some("SBIN0001234".to_string());
        factory
    }

    #[test]
    fn test_full_invoice_layout() {
        let invoice = sample_invoice(0, false);
        let factory = plant();
        let mut customer = Customer::new("c1".to_string(), "Acme".to_string());
        customer.address = "Plot 45, Worli, Mumbai".to_string();
        customer.gstin = Some("27AAAAA0000A1Z5".to_string());
        customer.phone = "9800000000".to_string();

        let ctx = InvoiceContext::new(&invoice)
            .with_factory(Some(&factory))
            .with_customer(Some(&customer));
        let doc = render_invoice(&ctx, &DocumentConfig::default());

        assert_eq!(doc.file_name, "Invoice__INV-2024-03-15-001.pdf");

        let header = doc.header().unwrap();
        assert_eq!(header.business_name, "Plant1");
        assert_eq!(header.badge, "ORIGINAL COPY");
        assert_eq!(header.logo, Some(Logo::Placeholder("LOGO".to_string())));
        assert!(header.meta.contains(&Field::new("Date", "15 Mar 2024")));
        assert!(header.meta.contains(&Field::new("Place", "Pune")));
        assert!(header.business_lines.contains(&"Pincode: 411019".to_string()));

        let parties = doc.parties().unwrap();
        assert!(parties.left.lines.contains(&"GSTIN: 27AAAAA0000A1Z5".to_string()));
        assert!(parties.right.lines.contains(&"Plot 45, Worli, Mumbai".to_string()));
        assert!(parties.right.lines.contains(&"Contact: 9800000000".to_string()));

        let table = doc.table().unwrap();
        assert_eq!(table.data_rows().count(), 1);
        assert_eq!(table.padding_count(), 7);
        let first = table.data_rows().next().unwrap();
        assert_eq!(first[2], "Steel Bolt");
        assert_eq!(first[4], "100.00");
        assert_eq!(first[6], "200.00");

        let totals = doc.totals().unwrap();
        assert_eq!(totals.line("Subtotal").unwrap().amount, "₹200.00");
        assert_eq!(totals.line("Taxable Value").unwrap().amount, "₹200.00");
        assert_eq!(totals.line("CGST").unwrap().amount, "₹18.00");
        assert_eq!(totals.line("SGST").unwrap().amount, "₹18.00");
        assert!(totals.line("IGST").is_none());
        assert!(totals.line("Discount").is_none());
        let grand = totals.line("GRAND TOTAL").unwrap();
        assert_eq!(grand.amount, "₹236.00");
        assert_eq!(grand.style, LineStyle::Emphasis);

        assert!(doc.contains_text("Two Hundred and Thirty Six Only"));
        assert!(doc.contains_text("State Bank | AC: 001122"));
        assert!(doc.contains_text("IFSC: SBIN0001234 | Current Account"));
        assert!(doc.contains_text("AUTHORIZED SIGNATORY"));
        assert!(doc.contains_text("Goods once sold will not be taken back."));
    }

    #[test]
    fn test_missing_parties_fall_back() {
        let mut invoice = sample_invoice(0, false);
        invoice.branch_name = None;
        let doc = render_invoice(&InvoiceContext::new(&invoice), &DocumentConfig::default());

        let header = doc.header().unwrap();
        assert_eq!(header.business_name, FALLBACK_FACTORY_NAME);
        assert!(header.meta.contains(&Field::new("Place", "Internal")));
        assert!(doc.contains_text(FALLBACK_FACTORY_ADDRESS));
        assert!(doc.contains_text(FALLBACK_CUSTOMER_ADDRESS));
        assert!(doc.contains_text("GSTIN: Unregistered"));
        assert!(doc.contains_text("Contact: N/A"));
        assert!(doc.contains_text(NO_BANK_DETAILS));
        assert!(doc.contains_text(SIGNATORY_CAPTION));
    }

    #[test]
    fn test_discount_and_interstate_lines() {
        let invoice = sample_invoice(36, true);
        let doc = render_invoice(&InvoiceContext::new(&invoice), &DocumentConfig::default());
        let totals = doc.totals().unwrap();

        let discount = totals.line("Discount").unwrap();
        assert_eq!(discount.amount, "-₹36.00");
        assert_eq!(discount.style, LineStyle::Negative);
        assert_eq!(totals.line("Taxable Value").unwrap().amount, "₹164.00");
        assert_eq!(totals.line("IGST").unwrap().amount, "₹36.00");
        assert!(totals.line("CGST").is_none());
        assert_eq!(totals.line("GRAND TOTAL").unwrap().amount, "₹200.00");
    }

    #[test]
    fn test_inclusive_line_shows_base_rate() {
        let mut invoice = sample_invoice(0, false);
        invoice.items = vec![InvoiceItem::new(
            "i1".to_string(),
            "Gear Oil".to_string(),
            BigDecimal::from(1),
            BigDecimal::from(118),
            BigDecimal::from(18),
        )
        .inclusive(true)];
        InvoiceTotals::for_invoice(&invoice).apply_to(&mut invoice);

        let doc = render_invoice(&InvoiceContext::new(&invoice), &DocumentConfig::default());

        let row = doc.table().unwrap().data_rows().next().unwrap();
        assert_eq!(row[4], "100.00");
        assert_eq!(row[5], "18%");
        assert_eq!(row[6], "100.00");

        let totals = doc.totals().unwrap();
        assert_eq!(totals.line("Subtotal").unwrap().amount, "₹100.00");
        assert_eq!(totals.line("Taxable Value").unwrap().amount, "₹100.00");
        assert_eq!(totals.line("CGST").unwrap().amount, "₹9.00");
        assert_eq!(totals.line("Total GST").unwrap().amount, "₹18.00");
        assert_eq!(totals.line("GRAND TOTAL").unwrap().amount, "₹118.00");
    }

    #[test]
    fn test_shipping_snapshot_and_images() {
        let mut invoice = sample_invoice(0, false);
        invoice.shipping_address = Some(ShippingAddress::new(
            "s2".to_string(),
            "Warehouse".to_string(),
            "Bhiwandi".to_string(),
        ));
        let mut factory = plant();
        factory.logo = Some(ImageBlob::new("data:image/png;base64,iVBORw0KGgo"));
        factory.signature = Some(ImageBlob::new("iVBORw0KGgoAAAA"));

        let ctx = InvoiceContext::new(&invoice).with_factory(Some(&factory));
        let doc = render_invoice(&ctx, &DocumentConfig::default());

        let parties = doc.parties().unwrap();
        assert_eq!(parties.right.lines[0], "Warehouse");
        assert_eq!(parties.right.lines[1], "Bhiwandi");
        assert!(matches!(doc.header().unwrap().logo, Some(Logo::Image(_))));
        assert!(doc.blocks.iter().any(|block| matches!(
            block,
            Block::Signature(SignatureBlock { image: Some(_), .. })
        )));
    }

    #[test]
    fn test_table_padding_and_hsn_lookup() {
        let mut invoice = sample_invoice(0, false);
        invoice.items[0].product_id = Some("p1".to_string());
        let products = vec![Product::new(
            "p1".to_string(),
            "Steel Bolt".to_string(),
            "7318".to_string(),
            BigDecimal::from(100),
            BigDecimal::from(18),
        )];
        let config = DocumentConfig {
            min_table_rows: 3,
            ..DocumentConfig::default()
        };

        let ctx = InvoiceContext::new(&invoice).with_products(&products);
        let doc = render_invoice(&ctx, &config);
        let table = doc.table().unwrap();

        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.data_rows().next().unwrap()[1], "7318");
    }
}
