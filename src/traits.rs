//! Traits for storage abstraction, validation and document delivery

use async_trait::async_trait;
use bigdecimal::{BigDecimal, Zero};
use std::path::PathBuf;

use crate::render::Document;
use crate::types::*;

/// Result of a sink delivery
pub type SinkResult<T> = Result<T, SinkError>;

/// Anything stored under a string id
pub trait Record {
    fn record_id(&self) -> &str;
}

impl Record for Customer {
    fn record_id(&self) -> &str {
        &self.id
    }
}

impl Record for Factory {
    fn record_id(&self) -> &str {
        &self.id
    }
}

impl Record for Product {
    fn record_id(&self) -> &str {
        &self.id
    }
}

impl Record for Invoice {
    fn record_id(&self) -> &str {
        &self.id
    }
}

/// Storage abstraction for the billing system
///
/// Implementations keep each collection in insertion order. `save_*` is an
/// upsert: a new id is appended, an existing id is replaced in place.
#[async_trait]
pub trait BillingStorage: Send + Sync {
    async fn save_customer(&mut self, customer: &Customer) -> BillingResult<()>;

    /// `Ok(None)` when absent
    async fn get_customer(&self, customer_id: &str) -> BillingResult<Option<Customer>>;

    async fn list_customers(&self) -> BillingResult<Vec<Customer>>;

    /// Fails with `CustomerNotFound` for an unknown id
    async fn delete_customer(&mut self, customer_id: &str) -> BillingResult<()>;

    async fn save_factory(&mut self, factory: &Factory) -> BillingResult<()>;

    async fn get_factory(&self, factory_id: &str) -> BillingResult<Option<Factory>>;

    async fn list_factories(&self) -> BillingResult<Vec<Factory>>;

    async fn delete_factory(&mut self, factory_id: &str) -> BillingResult<()>;

    async fn save_product(&mut self, product: &Product) -> BillingResult<()>;

    async fn get_product(&self, product_id: &str) -> BillingResult<Option<Product>>;

    async fn list_products(&self) -> BillingResult<Vec<Product>>;

    async fn delete_product(&mut self, product_id: &str) -> BillingResult<()>;

    async fn save_invoice(&mut self, invoice: &Invoice) -> BillingResult<()>;

    async fn get_invoice(&self, invoice_id: &str) -> BillingResult<Option<Invoice>>;

    async fn list_invoices(&self) -> BillingResult<Vec<Invoice>>;

    async fn delete_invoice(&mut self, invoice_id: &str) -> BillingResult<()>;
}

/// Rules checked before any entity is persisted
pub trait EntityValidator: Send + Sync {
    fn validate_customer(&self, customer: &Customer) -> BillingResult<()>;

    fn validate_factory(&self, factory: &Factory) -> BillingResult<()>;

    fn validate_product(&self, product: &Product) -> BillingResult<()>;

    /// Called with totals already computed
    fn validate_invoice(&self, invoice: &Invoice) -> BillingResult<()>;
}

/// Required-field checks only
pub struct DefaultEntityValidator;

fn required(value: &str, message: &str) -> BillingResult<()> {
    if value.trim().is_empty() {
        Err(BillingError::Validation(message.to_string()))
    } else {
        Ok(())
    }
}

impl EntityValidator for DefaultEntityValidator {
    fn validate_customer(&self, customer: &Customer) -> BillingResult<()> {
        required(&customer.id, "Customer ID cannot be empty")?;
        required(&customer.name, "Customer name cannot be empty")?;

        let mirrored = customer
            .shipping_addresses
            .iter()
            .filter(|address| address.is_same_as_billing)
            .count();
        if mirrored > 1 {
            return Err(BillingError::Validation(
                "Only one shipping address can be the same as billing".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_factory(&self, factory: &Factory) -> BillingResult<()> {
        required(&factory.id, "Factory ID cannot be empty")?;
        required(&factory.name, "Factory name cannot be empty")?;
        required(&factory.gstin, "Factory GSTIN cannot be empty")
    }

    fn validate_product(&self, product: &Product) -> BillingResult<()> {
        required(&product.id, "Product ID cannot be empty")?;
        required(&product.name, "Product name cannot be empty")?;
        required(&product.hsn_code, "HSN code cannot be empty")?;

        if product.price < BigDecimal::zero() {
            return Err(BillingError::Validation(
                "Product price cannot be negative".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_invoice(&self, invoice: &Invoice) -> BillingResult<()> {
        required(&invoice.id, "Invoice ID cannot be empty")?;
        required(&invoice.customer_id, "Invoice must reference a customer")?;

        if invoice.items.is_empty() {
            return Err(BillingError::Validation(
                "Invoice must have at least one item".to_string(),
            ));
        }

        for (index, item) in invoice.items.iter().enumerate() {
            if item.product_name.trim().is_empty() {
                return Err(BillingError::Validation(format!(
                    "Item {} has no product name",
                    index + 1
                )));
            }
            if item.quantity <= BigDecimal::zero() {
                return Err(BillingError::Validation(format!(
                    "Item {} ('{}') must have a quantity greater than zero",
                    index + 1,
                    item.product_name
                )));
            }
        }

        if invoice.discount < BigDecimal::zero() {
            return Err(BillingError::Validation(
                "Discount cannot be negative".to_string(),
            ));
        }

        Ok(())
    }
}

/// Where a delivered document ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredDocument {
    pub file_name: String,
    /// Filesystem path, when the sink writes files
    pub location: Option<PathBuf>,
    pub bytes: usize,
}

/// Share/save target for rendered documents
#[async_trait]
pub trait DocumentSink: Send + Sync {
    async fn deliver(&self, document: &Document, file_name: &str)
        -> SinkResult<DeliveredDocument>;
}
