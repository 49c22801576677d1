//! Document renderer: invoice and monthly GST report layouts as typed block trees

pub mod document;
pub mod html;
pub mod invoice;
pub mod report;

pub use document::*;
pub use html::to_html;
pub use invoice::{render_invoice, InvoiceContext};
pub use report::render_gst_report;
