//! # Action registry.
//!
//! Ordered set of descriptors seeding a run. Entries are kept sorted by
//! priority with a **stable** insertion: lower values come first, equal
//! priorities keep their insertion order.
//!
//! ```text
//! add::<A>()            [A:0]
//! add_with_priority(-1) [B:-1, A:0]
//! add::<C>()            [B:-1, A:0, C:0]
//! add_with_priority(0)  [B:-1, A:0, C:0, D:0]
//! ```
//!
//! Priority only orders actions that are ready in the same pass; it never
//! overrides an import dependency.

use std::fmt;
use std::sync::Arc;

use crate::actions::{ActionDescriptor, ActionInfo, ActionType, DescriptorCache};
use crate::core::SequenceFactory;
use crate::error::ConfigError;

struct Entry<T> {
    descriptor: Arc<ActionDescriptor<T>>,
    priority: i32,
}

/// Mutable, priority-ordered collection of action descriptors.
pub struct ActionRegistry<T> {
    entries: Vec<Entry<T>>,
    cache: Arc<DescriptorCache<T>>,
}

impl<T: 'static> ActionRegistry<T> {
    /// Creates an empty registry with its own descriptor cache.
    pub fn new() -> Self {
        Self::with_cache(Arc::new(DescriptorCache::new()))
    }

    /// Creates an empty registry resolving descriptors through `cache`.
    pub fn with_cache(cache: Arc<DescriptorCache<T>>) -> Self {
        Self {
            entries: Vec::with_capacity(4),
            cache,
        }
    }

    /// Adds action type `A` with priority `0`.
    pub fn add<A: ActionType<T> + 'static>(&mut self) -> Result<&mut Self, ConfigError> {
        self.add_with_priority::<A>(0)
    }

    /// Adds action type `A`; lower `priority` runs earlier among independents.
    pub fn add_with_priority<A: ActionType<T> + 'static>(
        &mut self,
        priority: i32,
    ) -> Result<&mut Self, ConfigError> {
        let descriptor = self.cache.resolve::<A>()?;
        Ok(self.add_descriptor(descriptor, priority))
    }

    /// Adds a hand-built descriptor.
    pub fn add_descriptor(
        &mut self,
        descriptor: impl Into<Arc<ActionDescriptor<T>>>,
        priority: i32,
    ) -> &mut Self {
        let at = self
            .entries
            .iter()
            .rposition(|e| e.priority <= priority)
            .map_or(0, |i| i + 1);

        self.entries.insert(
            at,
            Entry {
                descriptor: descriptor.into(),
                priority,
            },
        );
        self
    }

    /// Metadata of every entry, in scheduling order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ActionInfo>> + '_ {
        self.entries.iter().map(|e| e.descriptor.info())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freezes the registry into a reusable [`SequenceFactory`].
    pub fn into_factory(self) -> SequenceFactory<T> {
        SequenceFactory::new(self.entries.into_iter().map(|e| e.descriptor).collect())
    }
}

impl<T: 'static> Default for ActionRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ActionRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.entries
                    .iter()
                    .map(|e| (e.descriptor.info().name(), e.priority)),
            )
            .finish()
    }
}
