//! Billing operations: parties and catalogue, invoices, backups

pub mod backup;
pub mod core;
pub mod directory;
pub mod invoice;

pub use backup::{BackupSnapshot, ImportReport, MergeCount};
pub use self::core::*;
pub use directory::*;
pub use invoice::*;
