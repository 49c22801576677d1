//! Tax computation and monthly GST aggregation

pub mod gst;
pub mod report;

pub use gst::*;
pub use report::*;
