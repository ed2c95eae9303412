//! # Descriptor cache.
//!
//! Building a descriptor runs the type's [`ActionType::describe`] and validates
//! it. [`DescriptorCache`] memoizes the result per action type so repeated
//! registrations share one `Arc<ActionDescriptor<T>>`.
//!
//! The cache is an ordinary value owned by the host (no global state); share it
//! between registries with `Arc`.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::actions::{ActionDescriptor, ActionType};
use crate::error::ConfigError;

/// Read-mostly cache of descriptors keyed by action type.
pub struct DescriptorCache<T> {
    entries: RwLock<HashMap<TypeId, Arc<ActionDescriptor<T>>>>,
}

impl<T: 'static> DescriptorCache<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the descriptor of `A`, building and caching it on first use.
    ///
    /// A failed build is not cached.
    pub fn resolve<A>(&self) -> Result<Arc<ActionDescriptor<T>>, ConfigError>
    where
        A: ActionType<T> + 'static,
    {
        let id = TypeId::of::<A>();
        if let Some(found) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
        {
            return Ok(Arc::clone(found));
        }

        let built = Arc::new(A::describe().build()?);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.entry(id).or_insert_with(|| {
            tracing::debug!(action = %built.info(), "descriptor cached");
            Arc::clone(&built)
        });
        Ok(Arc::clone(entry))
    }

    /// Whether `A` has already been resolved.
    pub fn contains<A: 'static>(&self) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&TypeId::of::<A>())
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for DescriptorCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for DescriptorCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.entries.read().unwrap_or_else(PoisonError::into_inner).len();
        f.debug_struct("DescriptorCache").field("len", &len).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{Action, ActionBuilder};
    use crate::error::ActionError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_util::sync::CancellationToken;

    static DESCRIBED: AtomicUsize = AtomicUsize::new(0);

    struct Counted;

    #[async_trait]
    impl Action<()> for Counted {
        async fn execute(&self, _: &(), _: CancellationToken) -> Result<(), ActionError> {
            Ok(())
        }
    }

    impl ActionType<()> for Counted {
        fn describe() -> ActionBuilder<()> {
            DESCRIBED.fetch_add(1, Ordering::SeqCst);
            ActionBuilder::for_type::<Self>().factory(|_| Ok(Counted))
        }
    }

    struct Invalid;

    #[async_trait]
    impl Action<()> for Invalid {
        async fn execute(&self, _: &(), _: CancellationToken) -> Result<(), ActionError> {
            Ok(())
        }
    }

    impl ActionType<()> for Invalid {
        fn describe() -> ActionBuilder<()> {
            ActionBuilder::for_type::<Self>()
        }
    }

    #[test]
    fn test_resolve_describes_once() {
        let cache = DescriptorCache::<()>::new();
        let a = cache.resolve::<Counted>().unwrap();
        let b = cache.resolve::<Counted>().unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(DESCRIBED.load(Ordering::SeqCst), 1);
        assert!(cache.contains::<Counted>());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failed_build_not_cached() {
        let cache = DescriptorCache::<()>::new();
        let err = cache.resolve::<Invalid>().unwrap_err();
        assert_eq!(err.as_label(), "config_missing_factory");
        assert!(cache.is_empty());
    }
}
