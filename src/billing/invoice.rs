//! Invoice drafting, persistence and listing

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use crate::format::next_invoice_number;
use crate::tax::gst::{InvoiceTotals, SupplyType};
use crate::tax::report::ReportPeriod;
use crate::traits::*;
use crate::types::*;

/// What the caller supplies to create or edit an invoice. Everything the tax
/// engine derives (line tax, totals, interstate flag) is computed on save.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
    /// Set to edit an existing invoice in place
    pub id: Option<String>,
    /// Overrides the generated or existing number
    pub invoice_number: Option<String>,
    pub date: NaiveDate,
    pub customer_id: String,
    /// Seller; without it the branch name falls back to the configured default
    pub factory_id: Option<String>,
    /// One of the customer's shipping addresses, copied by value on save
    pub shipping_address_id: Option<String>,
    pub items: Vec<InvoiceItem>,
    pub discount: BigDecimal,
    /// Overrides the existing status; new invoices default to pending
    pub status: Option<InvoiceStatus>,
}

impl InvoiceDraft {
    pub fn new(date: NaiveDate, customer_id: impl Into<String>) -> Self {
        Self {
            id: None,
            invoice_number: None,
            date,
            customer_id: customer_id.into(),
            factory_id: None,
            shipping_address_id: None,
            items: Vec::new(),
            discount: BigDecimal::from(0),
            status: None,
        }
    }

    /// Draft that re-saves an existing invoice, keeping its number and status
    pub fn edit(invoice: &Invoice) -> Self {
        Self {
            id: Some(invoice.id.clone()),
            invoice_number: None,
            date: invoice.date,
            customer_id: invoice.customer_id.clone(),
            factory_id: None,
            shipping_address_id: invoice.shipping_address.as_ref().map(|s| s.id.clone()),
            items: invoice.items.clone(),
            discount: invoice.discount.clone(),
            status: None,
        }
    }

    pub fn factory(mut self, factory_id: impl Into<String>) -> Self {
        self.factory_id = Some(factory_id.into());
        self
    }

    pub fn ship_to(mut self, shipping_address_id: impl Into<String>) -> Self {
        self.shipping_address_id = Some(shipping_address_id.into());
        self
    }

    pub fn item(mut self, item: InvoiceItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn discount(mut self, discount: BigDecimal) -> Self {
        self.discount = discount;
        self
    }

    pub fn status(mut self, status: InvoiceStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn number(mut self, invoice_number: impl Into<String>) -> Self {
        self.invoice_number = Some(invoice_number.into());
        self
    }
}

/// Filter for invoice listings. Results are newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceQuery {
    /// Case-insensitive match on customer name or invoice number
    pub search: Option<String>,
    pub status: Option<InvoiceStatus>,
    pub period: Option<ReportPeriod>,
    pub customer_id: Option<String>,
}

impl InvoiceQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn status(mut self, status: InvoiceStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn period(mut self, period: ReportPeriod) -> Self {
        self.period = Some(period);
        self
    }

    pub fn customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    pub fn matches(&self, invoice: &Invoice) -> bool {
        let search_ok = match self.search.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => {
                let needle = text.to_lowercase();
                invoice.customer_name.to_lowercase().contains(&needle)
                    || invoice.invoice_number.to_lowercase().contains(&needle)
            }
            _ => true,
        };

        search_ok
            && self.status.map_or(true, |status| invoice.status == status)
            && self.period.map_or(true, |period| period.contains(invoice.date))
            && self
                .customer_id
                .as_deref()
                .map_or(true, |id| invoice.customer_id == id)
    }

    /// Filter and sort by date, newest first; same-day invoices keep their order
    pub fn apply(&self, invoices: Vec<Invoice>) -> Vec<Invoice> {
        let mut selected: Vec<Invoice> = invoices
            .into_iter()
            .filter(|invoice| self.matches(invoice))
            .collect();
        selected.sort_by(|a, b| b.date.cmp(&a.date));
        selected
    }
}

/// Invoice manager for drafting and persisting invoices
pub struct InvoiceManager<S: BillingStorage> {
    storage: S,
    validator: Box<dyn EntityValidator>,
    default_branch_name: String,
}

impl<S: BillingStorage> InvoiceManager<S> {
    /// Create a new invoice manager
    pub fn new(storage: S, default_branch_name: impl Into<String>) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultEntityValidator),
            default_branch_name: default_branch_name.into(),
        }
    }

    /// Create a new invoice manager with custom validator
    pub fn with_validator(
        storage: S,
        default_branch_name: impl Into<String>,
        validator: Box<dyn EntityValidator>,
    ) -> Self {
        Self {
            storage,
            validator,
            default_branch_name: default_branch_name.into(),
        }
    }

    /// Resolve the draft's references, compute totals and persist.
    ///
    /// Nothing is written when validation fails.
    pub async fn save_invoice(&mut self, draft: InvoiceDraft) -> BillingResult<Invoice> {
        let mut customer = self
            .storage
            .get_customer(&draft.customer_id)
            .await?
            .ok_or_else(|| BillingError::CustomerNotFound(draft.customer_id.clone()))?;
        customer.sync_shipping_addresses();

        let factory = match draft.factory_id.as_deref() {
            Some(factory_id) => Some(
                self.storage
                    .get_factory(factory_id)
                    .await?
                    .ok_or_else(|| BillingError::FactoryNotFound(factory_id.to_string()))?,
            ),
            None => None,
        };

        let existing = match draft.id.as_deref() {
            Some(id) => self.storage.get_invoice(id).await?,
            None => None,
        };

        // An edit that keeps its ship-to keeps the stored snapshot, even if
        // the customer has since changed or dropped that address
        let kept_snapshot = existing
            .as_ref()
            .and_then(|invoice| invoice.shipping_address.as_ref())
            .filter(|snapshot| draft.shipping_address_id.as_deref() == Some(snapshot.id.as_str()))
            .cloned();

        let shipping_address = match (kept_snapshot, draft.shipping_address_id.as_deref()) {
            (Some(snapshot), _) => Some(snapshot),
            (None, Some(shipping_id)) => Some(
                customer.shipping_address(shipping_id).cloned().ok_or_else(|| {
                    BillingError::Validation(format!(
                        "Shipping address '{}' does not belong to customer '{}'",
                        shipping_id, customer.name
                    ))
                })?,
            ),
            (None, None) => None,
        };

        let invoice_number = match (&draft.invoice_number, &existing) {
            (Some(number), _) => number.clone(),
            (None, Some(existing)) => existing.invoice_number.clone(),
            (None, None) => {
                let invoices = self.storage.list_invoices().await?;
                next_invoice_number(draft.date, &invoices)
            }
        };

        let status = draft
            .status
            .or_else(|| existing.as_ref().map(|invoice| invoice.status))
            .unwrap_or_default();

        let branch_name = match (&factory, &existing) {
            (Some(factory), _) => factory.name.clone(),
            (None, Some(existing)) => existing
                .branch_name
                .clone()
                .unwrap_or_else(|| self.default_branch_name.clone()),
            (None, None) => self.default_branch_name.clone(),
        };

        // An edit without a factory keeps the interstate decision made at creation
        let supply = match (&factory, &existing) {
            (None, Some(existing)) => SupplyType::from_interstate_flag(existing.is_interstate),
            _ => SupplyType::for_parties(factory.as_ref(), Some(&customer)),
        };

        let mut items = draft.items;
        for item in &mut items {
            if item.id.trim().is_empty() {
                item.id = Uuid::new_v4().to_string();
            }
        }

        let mut invoice = Invoice {
            id: draft
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            invoice_number,
            date: draft.date,
            customer_id: customer.id.clone(),
            customer_name: customer.name.clone(),
            branch_name: Some(branch_name),
            shipping_address,
            items,
            sub_total: BigDecimal::from(0),
            tax_total: BigDecimal::from(0),
            discount: draft.discount.clone(),
            grand_total: BigDecimal::from(0),
            status,
            is_interstate: supply.is_interstate(),
        };

        InvoiceTotals::calculate(&invoice.items, &draft.discount, supply).apply_to(&mut invoice);

        self.validator.validate_invoice(&invoice)?;
        self.storage.save_invoice(&invoice).await?;

        info!(
            invoice_id = %invoice.id,
            number = %invoice.invoice_number,
            customer = %invoice.customer_name,
            grand_total = %invoice.grand_total,
            interstate = invoice.is_interstate,
            "Invoice saved"
        );
        Ok(invoice)
    }

    pub async fn get_invoice(&self, invoice_id: &str) -> BillingResult<Option<Invoice>> {
        self.storage.get_invoice(invoice_id).await
    }

    /// Get an invoice by ID, returning an error if not found
    pub async fn get_invoice_required(&self, invoice_id: &str) -> BillingResult<Invoice> {
        self.storage
            .get_invoice(invoice_id)
            .await?
            .ok_or_else(|| BillingError::InvoiceNotFound(invoice_id.to_string()))
    }

    /// Manual status transition; any status may follow any other
    pub async fn set_status(&mut self, invoice_id: &str, status: InvoiceStatus) -> BillingResult<Invoice> {
        let mut invoice = self.get_invoice_required(invoice_id).await?;
        let previous = invoice.status;
        invoice.status = status;
        self.storage.save_invoice(&invoice).await?;

        info!(invoice_id, from = %previous, to = %status, "Invoice status changed");
        Ok(invoice)
    }

    pub async fn delete_invoice(&mut self, invoice_id: &str) -> BillingResult<()> {
        self.storage.delete_invoice(invoice_id).await?;
        info!(invoice_id, "Invoice deleted");
        Ok(())
    }

    /// Number the next invoice dated `date` would get
    pub async fn next_invoice_number(&self, date: NaiveDate) -> BillingResult<String> {
        let invoices = self.storage.list_invoices().await?;
        let number = next_invoice_number(date, &invoices);
        debug!(%date, %number, "Next invoice number");
        Ok(number)
    }

    pub async fn all_invoices(&self) -> BillingResult<Vec<Invoice>> {
        self.storage.list_invoices().await
    }

    pub async fn list_invoices(&self, query: &InvoiceQuery) -> BillingResult<Vec<Invoice>> {
        Ok(query.apply(self.storage.list_invoices().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::MemoryStorage;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn bolt(quantity: i64) -> InvoiceItem {
        InvoiceItem::new(
            String::new(),
            "Bolt".to_string(),
            BigDecimal::from(quantity),
            BigDecimal::from(100),
            BigDecimal::from(18),
        )
    }

    async fn manager_with_parties() -> InvoiceManager<MemoryStorage> {
        let mut storage = MemoryStorage::new();

        let mut acme = Customer::new("c1".to_string(), "Acme".to_string());
        acme.gstin = Some("27AAAAA0000A1Z5".to_string());
        acme.address = "Worli, Mumbai".to_string();
        acme.shipping_addresses = vec![
            ShippingAddress::same_as_billing("s1".to_string(), "Office".to_string()),
            ShippingAddress::new("s2".to_string(), "Depot".to_string(), "Bhiwandi".to_string()),
        ];
        storage.save_customer(&acme).await.unwrap();

        let mut globex = Customer::new("c2".to_string(), "Globex".to_string());
        globex.gstin = Some("29AAAAA0000A1Z5".to_string());
        storage.save_customer(&globex).await.unwrap();

        storage
            .save_factory(&Factory::new(
                "f1".to_string(),
                "Plant1".to_string(),
                "27AAACA0000A1Z5".to_string(),
                "MIDC, Pune".to_string(),
            ))
            .await
            .unwrap();

        InvoiceManager::new(storage, "Default Plant")
    }

    #[tokio::test]
    async fn test_new_invoice_numbering_and_totals() {
        let mut manager = manager_with_parties().await;

        let first = manager
            .save_invoice(InvoiceDraft::new(date(15), "c1").factory("f1").item(bolt(2)))
            .await
            .unwrap();
        assert_eq!(first.invoice_number, "#INV-2024-03-15-001");
        assert_eq!(first.sub_total, BigDecimal::from(200));
        assert_eq!(first.tax_total, BigDecimal::from(36));
        assert_eq!(first.grand_total, BigDecimal::from(236));
        assert_eq!(first.status, InvoiceStatus::Pending);
        assert_eq!(first.branch_name.as_deref(), Some("Plant1"));
        assert!(!first.is_interstate);
        assert!(!first.items[0].id.is_empty());

        let second = manager
            .save_invoice(InvoiceDraft::new(date(15), "c1").item(bolt(1)))
            .await
            .unwrap();
        assert_eq!(second.invoice_number, "#INV-2024-03-15-002");
        assert_eq!(second.branch_name.as_deref(), Some("Default Plant"));
    }

    #[tokio::test]
    async fn test_interstate_from_state_codes() {
        let mut manager = manager_with_parties().await;
        let invoice = manager
            .save_invoice(InvoiceDraft::new(date(15), "c2").factory("f1").item(bolt(1)))
            .await
            .unwrap();
        assert!(invoice.is_interstate);
    }

    #[tokio::test]
    async fn test_shipping_snapshot_is_copied() {
        let mut manager = manager_with_parties().await;

        let mirrored = manager
            .save_invoice(InvoiceDraft::new(date(15), "c1").ship_to("s1").item(bolt(1)))
            .await
            .unwrap();
        assert_eq!(
            mirrored.shipping_address.as_ref().map(|s| s.address.as_str()),
            Some("Worli, Mumbai")
        );

        let result = manager
            .save_invoice(InvoiceDraft::new(date(15), "c1").ship_to("s9").item(bolt(1)))
            .await;
        assert!(matches!(result, Err(BillingError::Validation(_))));
    }

    #[tokio::test]
    async fn test_edit_keeps_number_and_status() {
        let mut manager = manager_with_parties().await;
        let original = manager
            .save_invoice(InvoiceDraft::new(date(15), "c1").factory("f1").item(bolt(2)))
            .await
            .unwrap();
        manager.set_status(&original.id, InvoiceStatus::Paid).await.unwrap();

        let edited = manager
            .save_invoice(InvoiceDraft::edit(&original).discount(BigDecimal::from(36)))
            .await
            .unwrap();

        assert_eq!(edited.id, original.id);
        assert_eq!(edited.invoice_number, original.invoice_number);
        assert_eq!(edited.status, InvoiceStatus::Paid);
        assert_eq!(edited.branch_name.as_deref(), Some("Plant1"));
        assert_eq!(edited.grand_total, BigDecimal::from(200));
        assert_eq!(manager.all_invoices().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_edit_keeps_shipping_snapshot_after_customer_changes() {
        let mut manager = manager_with_parties().await;
        let original = manager
            .save_invoice(InvoiceDraft::new(date(15), "c1").ship_to("s2").item(bolt(1)))
            .await
            .unwrap();

        let mut acme = manager.storage.get_customer("c1").await.unwrap().unwrap();
        acme.shipping_addresses.clear();
        manager.storage.save_customer(&acme).await.unwrap();

        let edited = manager
            .save_invoice(InvoiceDraft::edit(&original).status(InvoiceStatus::Paid))
            .await
            .unwrap();
        assert_eq!(edited.status, InvoiceStatus::Paid);
        assert_eq!(edited.shipping_address, original.shipping_address);
        assert_eq!(
            edited.shipping_address.as_ref().map(|s| s.address.as_str()),
            Some("Bhiwandi")
        );

        // Picking another address still resolves against the live customer
        let moved = manager
            .save_invoice(InvoiceDraft::edit(&original).ship_to("s1"))
            .await;
        assert!(matches!(moved, Err(BillingError::Validation(_))));
    }

    #[tokio::test]
    async fn test_rejections_leave_storage_untouched() {
        let mut manager = manager_with_parties().await;

        let missing_customer = manager
            .save_invoice(InvoiceDraft::new(date(15), "ghost").item(bolt(1)))
            .await;
        assert!(matches!(missing_customer, Err(BillingError::CustomerNotFound(_))));

        let missing_factory = manager
            .save_invoice(InvoiceDraft::new(date(15), "c1").factory("f9").item(bolt(1)))
            .await;
        assert!(matches!(missing_factory, Err(BillingError::FactoryNotFound(_))));

        let empty = manager.save_invoice(InvoiceDraft::new(date(15), "c1")).await;
        assert!(matches!(empty, Err(BillingError::Validation(_))));

        let zero_qty = manager
            .save_invoice(InvoiceDraft::new(date(15), "c1").item(bolt(0)))
            .await;
        assert!(matches!(zero_qty, Err(BillingError::Validation(_))));

        assert!(manager.all_invoices().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_filters_and_order() {
        let mut manager = manager_with_parties().await;
        manager
            .save_invoice(InvoiceDraft::new(date(10), "c1").item(bolt(1)))
            .await
            .unwrap();
        manager
            .save_invoice(InvoiceDraft::new(date(20), "c2").item(bolt(1)).status(InvoiceStatus::Paid))
            .await
            .unwrap();
        manager
            .save_invoice(
                InvoiceDraft::new(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(), "c1").item(bolt(1)),
            )
            .await
            .unwrap();

        let all = manager.list_invoices(&InvoiceQuery::new()).await.unwrap();
        let dates: Vec<NaiveDate> = all.iter().map(|i| i.date).collect();
        assert_eq!(
            dates,
            vec![NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(), date(20), date(10)]
        );

        let acme = manager.list_invoices(&InvoiceQuery::new().search("ACME")).await.unwrap();
        assert_eq!(acme.len(), 2);

        let by_number = manager
            .list_invoices(&InvoiceQuery::new().search("2024-03-20"))
            .await
            .unwrap();
        assert_eq!(by_number.len(), 1);

        let paid = manager
            .list_invoices(&InvoiceQuery::new().status(InvoiceStatus::Paid))
            .await
            .unwrap();
        assert_eq!(paid[0].customer_name, "Globex");

        let march = manager
            .list_invoices(&InvoiceQuery::new().period(ReportPeriod::new(2024, 3).unwrap()))
            .await
            .unwrap();
        assert_eq!(march.len(), 2);
    }
}
