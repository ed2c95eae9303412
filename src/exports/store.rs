//! # Export store: the shared record of produced values.
//!
//! [`ExportProvider`] is the seam a run reads imports from and commits exports into.
//! [`ExportStore`] is the default implementation, a `HashMap` behind a `RwLock`.
//!
//! ## Rules
//! - A key is written **at most once** unless re-export is enabled.
//! - Reads of a missing key return `None`; they never fail.
//! - The check-and-insert in [`ExportProvider::try_export`] happens under one write
//!   lock, so two commits racing on the same key cannot both succeed.
//! - [`ExportProvider::try_export_all`] is all-or-nothing: one refused key leaves
//!   the store untouched.
//!
//! ## Example
//! ```rust
//! use actionflow::{ExportProvider, ExportStore};
//!
//! let store = ExportStore::new();
//! assert!(store.try_export_value(Some("port"), 8080_u16));
//! assert!(!store.try_export_value(Some("port"), 9090_u16));
//! assert_eq!(store.get::<u16>(Some("port")).as_deref(), Some(&8080));
//! assert!(!store.contains::<u16>(None));
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, PoisonError, RwLock};

use super::export::{Export, ExportKey, ExportValue};

/// Concurrency-safe mapping from [`ExportKey`] to a produced value.
pub trait ExportProvider: Send + Sync {
    /// Stores `export` unless its key is already present and re-export is disabled.
    ///
    /// Returns `true` if the value was stored.
    fn try_export(&self, export: Export) -> bool;

    /// Stores every export in `batch`, or none of them.
    ///
    /// Returns the number stored, or the first key that is already present.
    /// The check and the inserts must be atomic with respect to other writers.
    fn try_export_all(&self, batch: Vec<Export>) -> Result<usize, ExportKey>;

    /// Returns whether a value exists for `key`.
    fn contains_export(&self, key: &ExportKey) -> bool;

    /// Returns the value for `key`, if any.
    fn get_export(&self, key: &ExportKey) -> Option<ExportValue>;

    /// Snapshot of all current exports.
    fn exports(&self) -> Vec<Export>;

    /// Whether an existing key may be overwritten.
    fn allows_reexport(&self) -> bool {
        false
    }
}

/// Default [`ExportProvider`].
#[derive(Debug, Default)]
pub struct ExportStore {
    inner: RwLock<HashMap<ExportKey, ExportValue>>,
    allow_reexport: bool,
}

impl ExportStore {
    /// Creates an empty store with single-producer semantics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that lets later exports replace earlier ones.
    pub fn with_reexport() -> Self {
        Self {
            inner: RwLock::default(),
            allow_reexport: true,
        }
    }

    /// Wraps the store for sharing across runs.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Typed convenience over [`ExportProvider::try_export`].
    pub fn try_export_value<T: Any + Send + Sync>(&self, name: Option<&str>, value: T) -> bool {
        self.try_export(Export::new(name, value))
    }

    /// Typed lookup; `None` if missing or stored under a different runtime type.
    pub fn get<T: Any + Send + Sync>(&self, name: Option<&str>) -> Option<Arc<T>> {
        self.get_export(&ExportKey::of::<T>(name))
            .and_then(|value| value.downcast::<T>().ok())
    }

    /// Typed existence check.
    pub fn contains<T: Any>(&self, name: Option<&str>) -> bool {
        self.contains_export(&ExportKey::of::<T>(name))
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ExportProvider for ExportStore {
    fn try_export(&self, export: Export) -> bool {
        let (key, value) = export.into_parts();
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        match map.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
            Entry::Occupied(mut slot) if self.allow_reexport => {
                slot.insert(value);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    fn try_export_all(&self, batch: Vec<Export>) -> Result<usize, ExportKey> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if !self.allow_reexport {
            if let Some(taken) = batch.iter().map(Export::key).find(|k| map.contains_key(*k)) {
                return Err(taken.clone());
            }
        }
        let count = batch.len();
        map.extend(batch.into_iter().map(Export::into_parts));
        Ok(count)
    }

    fn contains_export(&self, key: &ExportKey) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    fn get_export(&self, key: &ExportKey) -> Option<ExportValue> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn exports(&self) -> Vec<Export> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(key, value)| Export::from_parts(key.clone(), Arc::clone(value)))
            .collect()
    }

    fn allows_reexport(&self) -> bool {
        self.allow_reexport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Foo(u32);

    #[test]
    fn test_missing_key_reads_absent() {
        let store = ExportStore::new();
        assert!(!store.contains::<Foo>(None));
        assert!(store.get::<Foo>(None).is_none());
        assert!(store.get_export(&ExportKey::of::<Foo>(Some("x"))).is_none());
    }

    #[test]
    fn test_second_export_rejected_without_reexport() {
        let store = ExportStore::new();
        assert!(store.try_export_value(None, Foo(1)));
        assert!(!store.try_export_value(None, Foo(2)));
        assert_eq!(store.get::<Foo>(None).as_deref(), Some(&Foo(1)));
    }

    #[test]
    fn test_reexport_overwrites() {
        let store = ExportStore::with_reexport();
        assert!(store.allows_reexport());
        assert!(store.try_export_value(None, Foo(1)));
        assert!(store.try_export_value(None, Foo(2)));
        assert_eq!(store.get::<Foo>(None).as_deref(), Some(&Foo(2)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_named_and_default_are_independent() {
        let store = ExportStore::new();
        assert!(store.try_export_value(None, Foo(1)));
        assert!(store.try_export_value(Some("a"), Foo(2)));
        assert!(store.try_export_value(Some("b"), Foo(3)));
        assert_eq!(store.get::<Foo>(Some("b")).as_deref(), Some(&Foo(3)));

        let mut names: Vec<Option<String>> = store
            .exports()
            .iter()
            .map(|e| e.key().name().map(str::to_owned))
            .collect();
        names.sort();
        assert_eq!(names, vec![None, Some("a".into()), Some("b".into())]);
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let store = ExportStore::new();
        assert!(store.try_export_value(Some("b"), Foo(0)));

        let batch = vec![
            Export::new(Some("a"), Foo(1)),
            Export::new(Some("b"), Foo(2)),
            Export::new(Some("c"), Foo(3)),
        ];
        assert_eq!(store.try_export_all(batch), Err(ExportKey::of::<Foo>(Some("b"))));
        assert!(!store.contains::<Foo>(Some("a")));
        assert!(!store.contains::<Foo>(Some("c")));
        assert_eq!(store.get::<Foo>(Some("b")).as_deref(), Some(&Foo(0)));

        let batch = vec![Export::new(Some("a"), Foo(1)), Export::new(Some("c"), Foo(3))];
        assert_eq!(store.try_export_all(batch), Ok(2));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_batch_overwrites_with_reexport() {
        let store = ExportStore::with_reexport();
        assert!(store.try_export_value(None, Foo(1)));
        assert_eq!(store.try_export_all(vec![Export::new(None, Foo(2))]), Ok(1));
        assert_eq!(store.get::<Foo>(None).as_deref(), Some(&Foo(2)));
    }

    #[test]
    fn test_concurrent_writers_single_winner() {
        let store = Arc::new(ExportStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.try_export_value(Some("race"), Foo(i)))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
