//! # GST Billing Core
//!
//! Billing library for small Indian businesses: customers, factories,
//! products and invoices, GST computation, and printable tax documents.
//!
//! ## Features
//!
//! - **Tax engine**: inclusive and exclusive pricing, CGST/SGST/IGST split by place of supply
//! - **Invoices**: day-sequenced numbering, denormalized party snapshots, manual status changes
//! - **Monthly GST report**: output tax by category with month-over-month growth
//! - **Formatting**: Indian digit grouping, dates, amounts in words (lakh/crore)
//! - **Documents**: typed block trees for the tax invoice and GST liability report, with HTML output
//! - **Storage abstraction**: trait-based storage, in-memory backend, JSON backup merge
//!
//! ## Quick Start
//!
//! ```rust
//! use gst_billing_core::{Billing, Customer, InvoiceDraft, InvoiceItem, MemoryStorage};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! # async fn run() -> gst_billing_core::BillingResult<()> {
//! let mut billing = Billing::new(MemoryStorage::new());
//! let acme = billing
//!     .save_customer(Customer::new(String::new(), "Acme".to_string()))
//!     .await?;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
//! let invoice = billing
//!     .save_invoice(InvoiceDraft::new(date, acme.id).item(InvoiceItem::new(
//!         String::new(),
//!         "Bolt".to_string(),
//!         BigDecimal::from(2),
//!         BigDecimal::from(100),
//!         BigDecimal::from(18),
//!     )))
//!     .await?;
//! assert_eq!(invoice.grand_total, BigDecimal::from(236));
//! # Ok(())
//! # }
//! ```

pub mod billing;
pub mod config;
pub mod format;
pub mod render;
pub mod tax;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use billing::{
    BackupSnapshot, Billing, DirectoryManager, ImportReport, InvoiceDraft, InvoiceManager,
    InvoiceQuery, MergeCount,
};
pub use config::BillingConfig;
pub use format::*;
pub use render::{render_gst_report, render_invoice, to_html, Block, Document, DocumentKind, InvoiceContext};
pub use tax::gst::*;
pub use tax::report::*;
pub use traits::*;
pub use types::*;
pub use utils::{DirectorySink, EnhancedEntityValidator, MemorySink, MemoryStorage};
