//! One-shot JSON backup: export every collection, merge an import by id

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

use crate::traits::*;
use crate::types::*;

/// All four collections in one document. A collection missing from an
/// imported document is left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackupSnapshot {
    #[serde(default, alias = "gst_billing_invoices", skip_serializing_if = "Option::is_none")]
    pub invoices: Option<Vec<Invoice>>,
    #[serde(default, alias = "gst_billing_customers", skip_serializing_if = "Option::is_none")]
    pub customers: Option<Vec<Customer>>,
    #[serde(default, alias = "gst_billing_products", skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,
    #[serde(default, alias = "gst_billing_factories", skip_serializing_if = "Option::is_none")]
    pub factories: Option<Vec<Factory>>,
}

impl BackupSnapshot {
    pub fn from_json(json: &str) -> BillingResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> BillingResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Outcome of merging one collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeCount {
    pub added: usize,
    /// Ids already present locally, or repeated inside the snapshot
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub customers: MergeCount,
    pub factories: MergeCount,
    pub products: MergeCount,
    pub invoices: MergeCount,
}

impl ImportReport {
    pub fn total_added(&self) -> usize {
        self.customers.added + self.factories.added + self.products.added + self.invoices.added
    }
}

pub async fn export_snapshot<S: BillingStorage>(storage: &S) -> BillingResult<BackupSnapshot> {
    let snapshot = BackupSnapshot {
        invoices: Some(storage.list_invoices().await?),
        customers: Some(storage.list_customers().await?),
        products: Some(storage.list_products().await?),
        factories: Some(storage.list_factories().await?),
    };

    info!(
        invoices = snapshot.invoices.as_ref().map_or(0, Vec::len),
        customers = snapshot.customers.as_ref().map_or(0, Vec::len),
        products = snapshot.products.as_ref().map_or(0, Vec::len),
        factories = snapshot.factories.as_ref().map_or(0, Vec::len),
        "Exported backup snapshot"
    );
    Ok(snapshot)
}

/// Records of `incoming` whose ids are new, in snapshot order
fn new_records<T: Record>(existing: &[T], incoming: Vec<T>) -> (Vec<T>, MergeCount) {
    let mut seen: HashSet<String> = existing.iter().map(|r| r.record_id().to_string()).collect();
    let mut count = MergeCount::default();
    let mut fresh = Vec::new();

    for record in incoming {
        if seen.insert(record.record_id().to_string()) {
            count.added += 1;
            fresh.push(record);
        } else {
            count.skipped += 1;
        }
    }

    (fresh, count)
}

fn import_error(collection: &str, err: BillingError) -> BillingError {
    BillingError::Import {
        collection: collection.to_string(),
        reason: err.to_string(),
    }
}

/// Merge a snapshot into storage without overwriting any existing record.
///
/// Collections are applied in the order customers, factories, products,
/// invoices. A storage failure stops the import; collections merged before
/// it stay applied.
pub async fn import_snapshot<S: BillingStorage>(
    storage: &mut S,
    snapshot: BackupSnapshot,
) -> BillingResult<ImportReport> {
    let mut report = ImportReport::default();

    if let Some(customers) = snapshot.customers {
        let existing = storage
            .list_customers()
            .await
            .map_err(|e| import_error("customers", e))?;
        let (fresh, count) = new_records(&existing, customers);
        for customer in &fresh {
            storage
                .save_customer(customer)
                .await
                .map_err(|e| import_error("customers", e))?;
        }
        info!(added = count.added, skipped = count.skipped, "Imported customers");
        report.customers = count;
    }

    if let Some(factories) = snapshot.factories {
        let existing = storage
            .list_factories()
            .await
            .map_err(|e| import_error("factories", e))?;
        let (fresh, count) = new_records(&existing, factories);
        for factory in &fresh {
            storage
                .save_factory(factory)
                .await
                .map_err(|e| import_error("factories", e))?;
        }
        info!(added = count.added, skipped = count.skipped, "Imported factories");
        report.factories = count;
    }

    if let Some(products) = snapshot.products {
        let existing = storage
            .list_products()
            .await
            .map_err(|e| import_error("products", e))?;
        let (fresh, count) = new_records(&existing, products);
        for product in &fresh {
            storage
                .save_product(product)
                .await
                .map_err(|e| import_error("products", e))?;
        }
        info!(added = count.added, skipped = count.skipped, "Imported products");
        report.products = count;
    }

    if let Some(invoices) = snapshot.invoices {
        let existing = storage
            .list_invoices()
            .await
            .map_err(|e| import_error("invoices", e))?;
        let (fresh, count) = new_records(&existing, invoices);
        for invoice in &fresh {
            storage
                .save_invoice(invoice)
                .await
                .map_err(|e| import_error("invoices", e))?;
        }
        info!(added = count.added, skipped = count.skipped, "Imported invoices");
        report.invoices = count;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::MemoryStorage;

    fn customer(id: &str, name: &str) -> Customer {
        Customer::new(id.to_string(), name.to_string())
    }

    #[tokio::test]
    async fn test_import_never_overwrites() {
        let mut storage = MemoryStorage::new();
        storage.save_customer(&customer("c1", "Local Acme")).await.unwrap();

        let snapshot = BackupSnapshot {
            customers: Some(vec![
                customer("c1", "Imported Acme"),
                customer("c2", "Globex"),
                customer("c2", "Globex again"),
            ]),
            ..Default::default()
        };

        let report = import_snapshot(&mut storage, snapshot).await.unwrap();
        assert_eq!(report.customers, MergeCount { added: 1, skipped: 2 });
        assert_eq!(report.total_added(), 1);

        let customers = storage.list_customers().await.unwrap();
        let names: Vec<&str> = customers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Local Acme", "Globex"]);
    }

    #[test]
    fn test_legacy_keys_and_missing_collections() {
        let json = r#"{
            "gst_billing_customers": [{"id": "c1", "name": "Acme"}],
            "factories": []
        }"#;

        let snapshot = BackupSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.customers.as_ref().map(Vec::len), Some(1));
        assert_eq!(snapshot.factories, Some(Vec::new()));
        assert!(snapshot.invoices.is_none());
        assert!(snapshot.products.is_none());
    }

    #[tokio::test]
    async fn test_export_has_all_collections() {
        let mut storage = MemoryStorage::new();
        storage.save_customer(&customer("c1", "Acme")).await.unwrap();

        let json = export_snapshot(&storage).await.unwrap().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for key in ["invoices", "customers", "products", "factories"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(value["customers"][0]["name"], "Acme");
        assert_eq!(value["customers"][0]["isActive"], true);
    }
}
