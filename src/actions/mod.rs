//! # Actions: authoring surface and registration.
//!
//! - [`Action`] / [`ActionType`]: what users implement
//! - [`ActionBuilder`] / [`ActionDescriptor`] / [`ActionInfo`]: static description
//! - [`ActionContext`]: per-instance export staging
//! - [`DescriptorCache`] / [`ActionRegistry`]: registration

mod action;
mod cache;
mod context;
mod descriptor;
mod registry;

pub use action::{Action, ActionType};
pub use cache::DescriptorCache;
pub use context::ActionContext;
pub use descriptor::{ActionBuilder, ActionDescriptor, ActionInfo, Dependency, ImportRequirement};
pub use registry::ActionRegistry;
