//! Main billing orchestrator that coordinates the directory, invoices,
//! reports, documents and backups

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::info;

use crate::billing::backup::{export_snapshot, import_snapshot, BackupSnapshot, ImportReport};
use crate::billing::{DirectoryManager, InvoiceDraft, InvoiceManager, InvoiceQuery};
use crate::config::BillingConfig;
use crate::format::{backup_file_name, local_date, local_datetime};
use crate::render::{render_gst_report, render_invoice, Document, InvoiceContext};
use crate::tax::report::{DashboardStats, MonthlyGstSummary, ReportPeriod};
use crate::traits::*;
use crate::types::*;
use crate::utils::EnhancedEntityValidator;

/// Main billing system.
///
/// Every clone of `S` must see the same records: the managers each hold one.
pub struct Billing<S: BillingStorage + Clone> {
    storage: S,
    directory: DirectoryManager<S>,
    invoices: InvoiceManager<S>,
    config: BillingConfig,
}

impl<S: BillingStorage + Clone> Billing<S> {
    /// Create a billing system with the default configuration
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, BillingConfig::default())
    }

    /// Create a billing system whose validators follow the configured tax policy
    pub fn with_config(storage: S, config: BillingConfig) -> Self {
        Self::with_validators(
            storage,
            config.clone(),
            Box::new(EnhancedEntityValidator::from_policy(&config.tax)),
            Box::new(EnhancedEntityValidator::from_policy(&config.tax)),
        )
    }

    /// Create a billing system with custom validators
    pub fn with_validators(
        storage: S,
        config: BillingConfig,
        directory_validator: Box<dyn EntityValidator>,
        invoice_validator: Box<dyn EntityValidator>,
    ) -> Self {
        Self {
            directory: DirectoryManager::with_validator(storage.clone(), directory_validator),
            invoices: InvoiceManager::with_validator(
                storage.clone(),
                config.document.default_branch_name.clone(),
                invoice_validator,
            ),
            storage,
            config,
        }
    }

    pub fn config(&self) -> &BillingConfig {
        &self.config
    }

    /// Today's date in the configured timezone
    pub fn today(&self) -> NaiveDate {
        self.today_at(Utc::now())
    }

    pub fn today_at(&self, now: DateTime<Utc>) -> NaiveDate {
        local_date(now, self.config.locale.utc_offset_minutes)
    }

    /// Wall-clock time in the configured timezone, for report stamps
    pub fn local_now(&self) -> NaiveDateTime {
        local_datetime(Utc::now(), self.config.locale.utc_offset_minutes)
    }

    // Customer operations
    pub async fn save_customer(&mut self, customer: Customer) -> BillingResult<Customer> {
        self.directory.save_customer(customer).await
    }

    pub async fn get_customer(&self, customer_id: &str) -> BillingResult<Option<Customer>> {
        self.directory.get_customer(customer_id).await
    }

    pub async fn list_customers(&self) -> BillingResult<Vec<Customer>> {
        self.directory.list_customers().await
    }

    pub async fn delete_customer(&mut self, customer_id: &str) -> BillingResult<()> {
        self.directory.delete_customer(customer_id).await
    }

    // Factory operations
    pub async fn save_factory(&mut self, factory: Factory) -> BillingResult<Factory> {
        self.directory.save_factory(factory).await
    }

    pub async fn get_factory(&self, factory_id: &str) -> BillingResult<Option<Factory>> {
        self.directory.get_factory(factory_id).await
    }

    pub async fn find_factory_by_name(&self, name: &str) -> BillingResult<Option<Factory>> {
        self.directory.find_factory_by_name(name).await
    }

    pub async fn list_factories(&self) -> BillingResult<Vec<Factory>> {
        self.directory.list_factories().await
    }

    pub async fn delete_factory(&mut self, factory_id: &str) -> BillingResult<()> {
        self.directory.delete_factory(factory_id).await
    }

    // Product operations
    pub async fn save_product(&mut self, product: Product) -> BillingResult<Product> {
        self.directory.save_product(product).await
    }

    pub async fn get_product(&self, product_id: &str) -> BillingResult<Option<Product>> {
        self.directory.get_product(product_id).await
    }

    pub async fn list_products(&self) -> BillingResult<Vec<Product>> {
        self.directory.list_products().await
    }

    pub async fn delete_product(&mut self, product_id: &str) -> BillingResult<()> {
        self.directory.delete_product(product_id).await
    }

    // Invoice operations
    pub async fn save_invoice(&mut self, draft: InvoiceDraft) -> BillingResult<Invoice> {
        self.invoices.save_invoice(draft).await
    }

    pub async fn get_invoice(&self, invoice_id: &str) -> BillingResult<Option<Invoice>> {
        self.invoices.get_invoice(invoice_id).await
    }

    pub async fn set_invoice_status(
        &mut self,
        invoice_id: &str,
        status: InvoiceStatus,
    ) -> BillingResult<Invoice> {
        self.invoices.set_status(invoice_id, status).await
    }

    pub async fn delete_invoice(&mut self, invoice_id: &str) -> BillingResult<()> {
        self.invoices.delete_invoice(invoice_id).await
    }

    pub async fn next_invoice_number(&self, date: NaiveDate) -> BillingResult<String> {
        self.invoices.next_invoice_number(date).await
    }

    pub async fn list_invoices(&self, query: &InvoiceQuery) -> BillingResult<Vec<Invoice>> {
        self.invoices.list_invoices(query).await
    }

    // Reports
    pub async fn monthly_summary(&self, period: ReportPeriod) -> BillingResult<MonthlyGstSummary> {
        let invoices = self.storage.list_invoices().await?;
        Ok(MonthlyGstSummary::build(&invoices, period))
    }

    pub async fn dashboard_stats(&self, period: ReportPeriod) -> BillingResult<DashboardStats> {
        let invoices = self.storage.list_invoices().await?;
        Ok(DashboardStats::build(&invoices, period))
    }

    // Documents

    /// Lay out a saved invoice with the current factory, customer and
    /// catalogue. Parties deleted since the invoice was saved render as
    /// placeholders.
    pub async fn render_invoice(&self, invoice_id: &str) -> BillingResult<Document> {
        let invoice = self.invoices.get_invoice_required(invoice_id).await?;

        let factory = match invoice.branch_name.as_deref() {
            Some(name) => self.directory.find_factory_by_name(name).await?,
            None => None,
        };
        let customer = self.directory.get_customer(&invoice.customer_id).await?;
        let products = self.directory.list_products().await?;

        let ctx = InvoiceContext::new(&invoice)
            .with_factory(factory.as_ref())
            .with_customer(customer.as_ref())
            .with_products(&products);
        Ok(render_invoice(&ctx, &self.config.document))
    }

    /// Lay out the GST report for `period`. Without a factory id the first
    /// factory is the issuing business.
    pub async fn render_monthly_report(
        &self,
        period: ReportPeriod,
        generated_on: NaiveDateTime,
        factory_id: Option<&str>,
    ) -> BillingResult<Document> {
        let summary = self.monthly_summary(period).await?;
        let factory = match factory_id {
            Some(id) => Some(self.directory.get_factory_required(id).await?),
            None => self.directory.list_factories().await?.into_iter().next(),
        };

        Ok(render_gst_report(
            &summary,
            factory.as_ref(),
            generated_on,
            &self.config.document,
        ))
    }

    /// Hand a document to a sink under its suggested file name
    pub async fn deliver(
        &self,
        sink: &dyn DocumentSink,
        document: &Document,
    ) -> BillingResult<DeliveredDocument> {
        let delivered = sink.deliver(document, &document.file_name).await?;
        info!(file_name = %delivered.file_name, bytes = delivered.bytes, "Document delivered");
        Ok(delivered)
    }

    // Backup
    pub async fn export_snapshot(&self) -> BillingResult<BackupSnapshot> {
        export_snapshot(&self.storage).await
    }

    pub async fn export_json(&self) -> BillingResult<String> {
        self.export_snapshot().await?.to_json()
    }

    /// Suggested name for a backup taken today
    pub fn backup_file_name(&self) -> String {
        backup_file_name(self.today())
    }

    pub async fn import_snapshot(&mut self, snapshot: BackupSnapshot) -> BillingResult<ImportReport> {
        import_snapshot(&mut self.storage, snapshot).await
    }

    /// Parse the whole document before touching storage; malformed input
    /// applies nothing
    pub async fn import_json(&mut self, json: &str) -> BillingResult<ImportReport> {
        let snapshot = BackupSnapshot::from_json(json)?;
        self.import_snapshot(snapshot).await
    }
}
