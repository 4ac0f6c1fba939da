//! The product-state core: pure list transitions and the processor that
//! commits them to the store and announces them to listeners.

pub mod processor;
pub mod registry;

pub use processor::{CommandProcessor, ScanOutcome};
