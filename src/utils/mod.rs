//! Utility modules

pub mod memory_storage;
pub mod sink;
pub mod validation;

pub use memory_storage::*;
pub use sink::*;
pub use validation::*;
