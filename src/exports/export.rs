//! # Export keys and values.
//!
//! An export is identified by its declared type plus an optional name. The
//! unnamed slot of a type is its *default* export.
//!
//! ```text
//! ExportKey::of::<Foo>(None)        → default Foo
//! ExportKey::of::<Foo>(Some("x"))   → Foo named "x"
//! ```
//!
//! ## Rules
//! - Equality and hashing use `(TypeId, name)` only; the type name is carried for messages.
//! - Values are type-erased as [`ExportValue`] and recovered with [`Export::downcast`].

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Type-erased, shareable export value.
pub type ExportValue = Arc<dyn Any + Send + Sync>;

/// Identity of an export: declared type and optional name.
#[derive(Clone)]
pub struct ExportKey {
    type_id: TypeId,
    type_name: &'static str,
    name: Option<Cow<'static, str>>,
}

impl ExportKey {
    /// Key for type `T`; `None` addresses the default export of `T`.
    pub fn of<T: Any>(name: Option<&str>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            name: name.map(|n| Cow::Owned(n.to_owned())),
        }
    }

    /// Key for type `T` with a static name.
    pub fn named<T: Any>(name: &'static str) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            name: Some(Cow::Borrowed(name)),
        }
    }

    /// Returns the declared type id.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the declared type name (diagnostics only).
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the export name, `None` for the default export.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// True when this key addresses the default export of its type.
    pub fn is_default(&self) -> bool {
        self.name.is_none()
    }
}

impl PartialEq for ExportKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.name == other.name
    }
}

impl Eq for ExportKey {}

impl Hash for ExportKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Debug for ExportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportKey")
            .field("type", &self.type_name)
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for ExportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "\"{}\" with name \"{}\"", self.type_name, name),
            None => write!(f, "\"{}\"", self.type_name),
        }
    }
}

/// A produced value together with its key.
#[derive(Clone)]
pub struct Export {
    key: ExportKey,
    value: ExportValue,
}

impl Export {
    /// Wraps a typed value; the key is derived from `T` and `name`.
    pub fn new<T: Any + Send + Sync>(name: Option<&str>, value: T) -> Self {
        Self {
            key: ExportKey::of::<T>(name),
            value: Arc::new(value),
        }
    }

    /// Builds an export from an already erased value.
    ///
    /// The caller is responsible for `value` actually having the key's type;
    /// a mismatch surfaces later as an activation error.
    pub fn from_parts(key: ExportKey, value: ExportValue) -> Self {
        Self { key, value }
    }

    pub fn key(&self) -> &ExportKey {
        &self.key
    }

    pub fn value(&self) -> &ExportValue {
        &self.value
    }

    /// True for a default (unnamed) export.
    pub fn is_default(&self) -> bool {
        self.key.is_default()
    }

    /// Returns the value as `Arc<T>` if the runtime type matches.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }

    pub fn into_parts(self) -> (ExportKey, ExportValue) {
        (self.key, self.value)
    }
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Export").field("key", &self.key).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_key_identity_ignores_name_storage() {
        let borrowed = ExportKey::named::<u32>("x");
        let owned = ExportKey::of::<u32>(Some("x"));
        assert_eq!(borrowed, owned);

        let mut set = HashSet::new();
        set.insert(borrowed);
        assert!(set.contains(&owned));
    }

    #[test]
    fn test_default_and_named_keys_differ() {
        let default = ExportKey::of::<u32>(None);
        let named = ExportKey::of::<u32>(Some("x"));
        assert!(default.is_default());
        assert!(!named.is_default());
        assert_ne!(default, named);
        assert_ne!(default, ExportKey::of::<i32>(None));
    }

    #[test]
    fn test_downcast_checks_runtime_type() {
        let export = Export::new(Some("answer"), 42_u64);
        assert_eq!(export.downcast::<u64>().as_deref(), Some(&42));
        assert!(export.downcast::<i64>().is_none());
        assert!(!export.is_default());
    }

    #[test]
    fn test_display_mentions_name() {
        let key = ExportKey::of::<String>(Some("greeting"));
        let text = key.to_string();
        assert!(text.contains("String"));
        assert!(text.contains("greeting"));
    }
}
