use std::fmt;
use std::sync::Arc;

use crate::{
    actions::{ActionDescriptor, ActionInfo},
    activation::ServiceResolver,
    config::SequenceConfig,
    exports::{ExportProvider, ExportStore},
};

use super::sequence::Sequence;

/// Immutable, reusable set of descriptors produced by
/// [`ActionRegistry::into_factory`](crate::ActionRegistry::into_factory).
///
/// Cheap to clone; every [`Sequence`] it creates starts from the full set.
pub struct SequenceFactory<T> {
    descriptors: Arc<[Arc<ActionDescriptor<T>>]>,
}

impl<T> SequenceFactory<T> {
    pub(crate) fn new(descriptors: Vec<Arc<ActionDescriptor<T>>>) -> Self {
        Self {
            descriptors: descriptors.into(),
        }
    }

    /// Creates a sequence with a fresh store and default configuration.
    pub fn create(&self) -> Sequence<T> {
        self.builder().build()
    }

    /// Creates a sequence running against a caller-supplied store.
    pub fn create_with_store(&self, store: Arc<dyn ExportProvider>) -> Sequence<T> {
        self.builder().with_store(store).build()
    }

    /// Starts a builder for a sequence with custom configuration.
    pub fn builder(&self) -> SequenceBuilder<T> {
        SequenceBuilder::new(self.descriptors.to_vec())
    }

    /// Metadata of every descriptor, in scheduling order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ActionInfo>> + '_ {
        self.descriptors.iter().map(|d| d.info())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl<T> Clone for SequenceFactory<T> {
    fn clone(&self) -> Self {
        Self {
            descriptors: Arc::clone(&self.descriptors),
        }
    }
}

impl<T> fmt::Debug for SequenceFactory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.descriptors.iter().map(|d| d.info().name()))
            .finish()
    }
}

/// Builder for constructing a [`Sequence`] with optional collaborators.
pub struct SequenceBuilder<T> {
    descriptors: Vec<Arc<ActionDescriptor<T>>>,
    cfg: SequenceConfig,
    store: Option<Arc<dyn ExportProvider>>,
    resolver: Option<Arc<dyn ServiceResolver>>,
}

impl<T> SequenceBuilder<T> {
    fn new(descriptors: Vec<Arc<ActionDescriptor<T>>>) -> Self {
        Self {
            descriptors,
            cfg: SequenceConfig::default(),
            store: None,
            resolver: None,
        }
    }

    /// Sets the run configuration.
    pub fn with_config(mut self, cfg: SequenceConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Shares `store` with the sequence, e.g. to pre-seed values or to chain runs.
    pub fn with_store(mut self, store: Arc<dyn ExportProvider>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the resolver for ordinary (non-import) dependencies.
    pub fn with_resolver(mut self, resolver: Arc<dyn ServiceResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Builds the sequence.
    ///
    /// Without an explicit store a fresh [`ExportStore`] is created, allowing
    /// re-export when [`SequenceConfig::allow_reexport`] is set.
    pub fn build(self) -> Sequence<T> {
        let store = self.store.unwrap_or_else(|| {
            let store = if self.cfg.allow_reexport {
                ExportStore::with_reexport()
            } else {
                ExportStore::new()
            };
            store.shared() as Arc<dyn ExportProvider>
        });
        Sequence::new(self.descriptors, store, self.resolver, self.cfg)
    }
}
