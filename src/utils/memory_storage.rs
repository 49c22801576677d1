//! In-memory storage implementation for testing

use async_trait::async_trait;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::traits::*;
use crate::types::*;

type Shared<T> = Arc<RwLock<Vec<T>>>;

/// In-memory storage implementation for testing and development.
///
/// Clones share the same underlying collections.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    customers: Shared<Customer>,
    factories: Shared<Factory>,
    products: Shared<Product>,
    invoices: Shared<Invoice>,
}

fn read<'a, T>(lock: &'a Shared<T>, collection: &str) -> BillingResult<RwLockReadGuard<'a, Vec<T>>> {
    lock.read()
        .map_err(|_| BillingError::Storage(format!("{} lock poisoned", collection)))
}

fn write<'a, T>(lock: &'a Shared<T>, collection: &str) -> BillingResult<RwLockWriteGuard<'a, Vec<T>>> {
    lock.write()
        .map_err(|_| BillingError::Storage(format!("{} lock poisoned", collection)))
}

fn upsert<T: Record + Clone>(lock: &Shared<T>, collection: &str, record: &T) -> BillingResult<()> {
    let mut records = write(lock, collection)?;
    match records.iter_mut().find(|r| r.record_id() == record.record_id()) {
        Some(existing) => {
            debug!(collection, id = record.record_id(), "Replacing record");
            *existing = record.clone();
        }
        None => {
            debug!(collection, id = record.record_id(), "Appending record");
            records.push(record.clone());
        }
    }
    Ok(())
}

fn find<T: Record + Clone>(lock: &Shared<T>, collection: &str, id: &str) -> BillingResult<Option<T>> {
    Ok(read(lock, collection)?
        .iter()
        .find(|r| r.record_id() == id)
        .cloned())
}

fn list<T: Clone>(lock: &Shared<T>, collection: &str) -> BillingResult<Vec<T>> {
    Ok(read(lock, collection)?.clone())
}

/// Returns whether a record was removed
fn remove<T: Record>(lock: &Shared<T>, collection: &str, id: &str) -> BillingResult<bool> {
    let mut records = write(lock, collection)?;
    let before = records.len();
    records.retain(|r| r.record_id() != id);
    let removed = records.len() != before;
    if removed {
        debug!(collection, id, "Removed record");
    }
    Ok(removed)
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> BillingResult<()> {
        write(&self.customers, "customers")?.clear();
        write(&self.factories, "factories")?.clear();
        write(&self.products, "products")?.clear();
        write(&self.invoices, "invoices")?.clear();
        Ok(())
    }
}

#[async_trait]
impl BillingStorage for MemoryStorage {
    async fn save_customer(&mut self, customer: &Customer) -> BillingResult<()> {
        upsert(&self.customers, "customers", customer)
    }

    async fn get_customer(&self, customer_id: &str) -> BillingResult<Option<Customer>> {
        find(&self.customers, "customers", customer_id)
    }

    async fn list_customers(&self) -> BillingResult<Vec<Customer>> {
        list(&self.customers, "customers")
    }

    async fn delete_customer(&mut self, customer_id: &str) -> BillingResult<()> {
        if remove(&self.customers, "customers", customer_id)? {
            Ok(())
        } else {
            Err(BillingError::CustomerNotFound(customer_id.to_string()))
        }
    }

    async fn save_factory(&mut self, factory: &Factory) -> BillingResult<()> {
        upsert(&self.factories, "factories", factory)
    }

    async fn get_factory(&self, factory_id: &str) -> BillingResult<Option<Factory>> {
        find(&self.factories, "factories", factory_id)
    }

    async fn list_factories(&self) -> BillingResult<Vec<Factory>> {
        list(&self.factories, "factories")
    }

    async fn delete_factory(&mut self, factory_id: &str) -> BillingResult<()> {
        if remove(&self.factories, "factories", factory_id)? {
            Ok(())
        } else {
            Err(BillingError::FactoryNotFound(factory_id.to_string()))
        }
    }

    async fn save_product(&mut self, product: &Product) -> BillingResult<()> {
        upsert(&self.products, "products", product)
    }

    async fn get_product(&self, product_id: &str) -> BillingResult<Option<Product>> {
        find(&self.products, "products", product_id)
    }

    async fn list_products(&self) -> BillingResult<Vec<Product>> {
        list(&self.products, "products")
    }

    async fn delete_product(&mut self, product_id: &str) -> BillingResult<()> {
        if remove(&self.products, "products", product_id)? {
            Ok(())
        } else {
            Err(BillingError::ProductNotFound(product_id.to_string()))
        }
    }

    async fn save_invoice(&mut self, invoice: &Invoice) -> BillingResult<()> {
        upsert(&self.invoices, "invoices", invoice)
    }

    async fn get_invoice(&self, invoice_id: &str) -> BillingResult<Option<Invoice>> {
        find(&self.invoices, "invoices", invoice_id)
    }

    async fn list_invoices(&self) -> BillingResult<Vec<Invoice>> {
        list(&self.invoices, "invoices")
    }

    async fn delete_invoice(&mut self, invoice_id: &str) -> BillingResult<()> {
        if remove(&self.invoices, "invoices", invoice_id)? {
            Ok(())
        } else {
            Err(BillingError::InvoiceNotFound(invoice_id.to_string()))
        }
    }
}
