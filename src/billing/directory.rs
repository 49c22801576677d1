//! Customer, factory and product management

use tracing::info;
use uuid::Uuid;

use crate::traits::*;
use crate::types::*;

fn assign_id(id: &mut String) {
    if id.trim().is_empty() {
        *id = Uuid::new_v4().to_string();
    }
}

/// Directory manager for the parties and catalogue an invoice refers to
pub struct DirectoryManager<S: BillingStorage> {
    storage: S,
    validator: Box<dyn EntityValidator>,
}

impl<S: BillingStorage> DirectoryManager<S> {
    /// Create a new directory manager
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultEntityValidator),
        }
    }

    /// Create a new directory manager with custom validator
    pub fn with_validator(storage: S, validator: Box<dyn EntityValidator>) -> Self {
        Self { storage, validator }
    }

    // Customers

    /// Save (create or update) a customer.
    ///
    /// A blank id gets a fresh UUID. Shipping addresses marked same-as-billing
    /// are re-mirrored from the billing address before validation.
    pub async fn save_customer(&mut self, mut customer: Customer) -> BillingResult<Customer> {
        assign_id(&mut customer.id);
        for address in &mut customer.shipping_addresses {
            assign_id(&mut address.id);
        }
        customer.sync_shipping_addresses();

        self.validator.validate_customer(&customer)?;
        self.storage.save_customer(&customer).await?;

        info!(customer_id = %customer.id, name = %customer.name, "Customer saved");
        Ok(customer)
    }

    pub async fn get_customer(&self, customer_id: &str) -> BillingResult<Option<Customer>> {
        self.storage.get_customer(customer_id).await
    }

    /// Get a customer by ID, returning an error if not found
    pub async fn get_customer_required(&self, customer_id: &str) -> BillingResult<Customer> {
        self.storage
            .get_customer(customer_id)
            .await?
            .ok_or_else(|| BillingError::CustomerNotFound(customer_id.to_string()))
    }

    pub async fn list_customers(&self) -> BillingResult<Vec<Customer>> {
        self.storage.list_customers().await
    }

    pub async fn delete_customer(&mut self, customer_id: &str) -> BillingResult<()> {
        self.storage.delete_customer(customer_id).await?;
        info!(customer_id, "Customer deleted");
        Ok(())
    }

    // Factories

    pub async fn save_factory(&mut self, mut factory: Factory) -> BillingResult<Factory> {
        assign_id(&mut factory.id);

        self.validator.validate_factory(&factory)?;
        self.storage.save_factory(&factory).await?;

        info!(factory_id = %factory.id, name = %factory.name, "Factory saved");
        Ok(factory)
    }

    pub async fn get_factory(&self, factory_id: &str) -> BillingResult<Option<Factory>> {
        self.storage.get_factory(factory_id).await
    }

    pub async fn get_factory_required(&self, factory_id: &str) -> BillingResult<Factory> {
        self.storage
            .get_factory(factory_id)
            .await?
            .ok_or_else(|| BillingError::FactoryNotFound(factory_id.to_string()))
    }

    /// Look a factory up by its name, the way invoices reference it.
    /// Absent is a normal result.
    pub async fn find_factory_by_name(&self, name: &str) -> BillingResult<Option<Factory>> {
        Ok(self
            .storage
            .list_factories()
            .await?
            .into_iter()
            .find(|factory| factory.name == name))
    }

    pub async fn list_factories(&self) -> BillingResult<Vec<Factory>> {
        self.storage.list_factories().await
    }

    pub async fn delete_factory(&mut self, factory_id: &str) -> BillingResult<()> {
        self.storage.delete_factory(factory_id).await?;
        info!(factory_id, "Factory deleted");
        Ok(())
    }

    // Products

    pub async fn save_product(&mut self, mut product: Product) -> BillingResult<Product> {
        assign_id(&mut product.id);

        self.validator.validate_product(&product)?;
        self.storage.save_product(&product).await?;

        info!(product_id = %product.id, name = %product.name, "Product saved");
        Ok(product)
    }

    pub async fn get_product(&self, product_id: &str) -> BillingResult<Option<Product>> {
        self.storage.get_product(product_id).await
    }

    pub async fn get_product_required(&self, product_id: &str) -> BillingResult<Product> {
        self.storage
            .get_product(product_id)
            .await?
            .ok_or_else(|| BillingError::ProductNotFound(product_id.to_string()))
    }

    pub async fn list_products(&self) -> BillingResult<Vec<Product>> {
        self.storage.list_products().await
    }

    pub async fn delete_product(&mut self, product_id: &str) -> BillingResult<()> {
        self.storage.delete_product(product_id).await?;
        info!(product_id, "Product deleted");
        Ok(())
    }
}
