//! # Auxiliary service resolution.
//!
//! Ordinary (non-import) factory parameters are looked up by declared type via a
//! host-supplied [`ServiceResolver`]. [`ServiceMap`] is a minimal map-backed
//! implementation for hosts without a container of their own.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::exports::ExportValue;

/// Resolves an ordinary dependency by declared type.
pub trait ServiceResolver: Send + Sync {
    /// Returns the service registered for `type_id`, if any.
    fn resolve(&self, type_id: TypeId) -> Option<ExportValue>;
}

/// `HashMap`-backed [`ServiceResolver`].
///
/// ```rust
/// use std::any::TypeId;
/// use actionflow::{ServiceMap, ServiceResolver};
///
/// let services = ServiceMap::new().with(String::from("db://local"));
/// assert!(services.resolve(TypeId::of::<String>()).is_some());
/// assert!(services.resolve(TypeId::of::<u32>()).is_none());
/// ```
#[derive(Default, Clone)]
pub struct ServiceMap {
    services: HashMap<TypeId, ExportValue>,
}

impl ServiceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `service` under its own type, replacing any previous one.
    pub fn insert<S: Any + Send + Sync>(&mut self, service: S) -> &mut Self {
        self.services.insert(TypeId::of::<S>(), Arc::new(service));
        self
    }

    /// Builder-style [`ServiceMap::insert`].
    pub fn with<S: Any + Send + Sync>(mut self, service: S) -> Self {
        self.insert(service);
        self
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl ServiceResolver for ServiceMap {
    fn resolve(&self, type_id: TypeId) -> Option<ExportValue> {
        self.services.get(&type_id).cloned()
    }
}

impl fmt::Debug for ServiceMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceMap")
            .field("len", &self.services.len())
            .finish()
    }
}
