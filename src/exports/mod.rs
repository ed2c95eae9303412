//! # Exports: keys, values and the shared store.
//!
//! - [`ExportKey`], [`Export`], [`ExportValue`] identify and carry produced values
//! - [`ExportProvider`] is the store contract; [`ExportStore`] the default implementation

mod export;
mod store;

pub use export::{Export, ExportKey, ExportValue};
pub use store::{ExportProvider, ExportStore};
