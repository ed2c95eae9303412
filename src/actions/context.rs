//! # Per-action export context.
//!
//! Every activated instance gets a fresh [`ActionContext`]. Exports made through
//! it are **staged** privately and only reach the shared store once the action
//! finishes successfully.
//!
//! ```text
//! action.execute()
//!   └─► ctx.export(value) ─► duplicate in stage or shared store? ─► ExportError
//!                          └─► stage
//! action Ok
//!   └─► commit: stage ─► shared.try_export_all() (all or nothing)
//! action Err
//!   └─► stage discarded
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::ExportError;
use crate::exports::{Export, ExportKey, ExportProvider, ExportStore};

/// Scoped facade through which one action publishes its exports.
///
/// Cheap to clone; clones share the same stage.
#[derive(Clone)]
pub struct ActionContext {
    inner: Arc<Inner>,
}

struct Inner {
    staged: ExportStore,
    shared: Arc<dyn ExportProvider>,
}

impl ActionContext {
    /// Creates a context staging on top of `shared`.
    pub fn new(shared: Arc<dyn ExportProvider>) -> Self {
        let staged = if shared.allows_reexport() {
            ExportStore::with_reexport()
        } else {
            ExportStore::new()
        };
        Self {
            inner: Arc::new(Inner { staged, shared }),
        }
    }

    /// Exports `value` as the default export of its type.
    pub fn export<V: Any + Send + Sync>(&self, value: V) -> Result<(), ExportError> {
        self.export_raw(Export::new(None, value))
    }

    /// Exports `value` under `name`.
    pub fn export_named<V>(&self, name: &str, value: V) -> Result<(), ExportError>
    where
        V: Any + Send + Sync,
    {
        self.export_raw(Export::new(Some(name), value))
    }

    /// Stages an already built [`Export`].
    pub fn export_raw(&self, export: Export) -> Result<(), ExportError> {
        let key = export.key().clone();
        let shared = &self.inner.shared;

        if !shared.allows_reexport() && shared.contains_export(&key) {
            return Err(ExportError::AlreadyExported { key });
        }
        if !self.inner.staged.try_export(export) {
            return Err(ExportError::AlreadyExported { key });
        }
        Ok(())
    }

    /// Whether `key` is staged in this context.
    pub fn is_staged(&self, key: &ExportKey) -> bool {
        self.inner.staged.contains_export(key)
    }

    /// Snapshot of the staged exports.
    pub fn staged(&self) -> Vec<Export> {
        self.inner.staged.exports()
    }

    /// Writes every staged export into the shared store.
    ///
    /// Nothing is written if the shared store refuses any key; that key is returned.
    pub(crate) fn commit(&self) -> Result<usize, ExportKey> {
        self.inner.shared.try_export_all(self.inner.staged.exports())
    }
}

impl fmt::Debug for ActionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionContext")
            .field("staged", &self.inner.staged.len())
            .finish()
    }
}
