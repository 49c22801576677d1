//! Deterministic display formatting: currency, dates, amounts in words, numbering

pub mod currency;
pub mod date;
pub mod numbering;
pub mod words;

pub use currency::*;
pub use date::*;
pub use numbering::*;
pub use words::*;
