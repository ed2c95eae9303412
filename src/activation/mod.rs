//! # Activation: turning descriptors into runnable instances.
//!
//! - [`Activator`]: checks imports, resolves dependencies, invokes the factory
//! - [`Arguments`]: per-slot values handed to the factory
//! - [`ServiceResolver`], [`ServiceMap`]: lookup of ordinary dependencies

mod activator;
mod arguments;
mod resolver;

pub use activator::Activator;
pub use arguments::Arguments;
pub use resolver::{ServiceMap, ServiceResolver};
