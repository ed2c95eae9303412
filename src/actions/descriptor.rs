//! # Action descriptors.
//!
//! A descriptor is the static description of an action: identity, display
//! metadata, the values it imports, the ordinary dependencies it needs, and the
//! factory that builds an instance from them.
//!
//! - [`ActionInfo`]: metadata, not generic over the target (carried by errors)
//! - [`ActionDescriptor`]: `ActionInfo` plus the factory
//! - [`ActionBuilder`]: fluent construction; every parameter occupies one slot
//!
//! ## Slots
//! Each `import*`/`service*` call claims the next slot index (0-based). The
//! factory reads its arguments back by slot through [`Arguments`].
//!
//! ```text
//! ActionBuilder::for_type::<Report>()
//!     .import::<Rows>()              slot 0  ← ExportStore (Rows, default)
//!     .service::<Formatter>()        slot 1  ← ServiceResolver
//!     .import_named::<Rows>("old")   slot 2  ← ExportStore (Rows, "old")
//!     .service_or(80_u16)            slot 3  ← ServiceResolver, else 80
//!     .factory(|args| ...)
//! ```

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::actions::action::Action;
use crate::activation::Arguments;
use crate::error::{ActivationError, ConfigError};
use crate::exports::{ExportKey, ExportValue};

/// One import requirement: an export key bound to a factory slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequirement {
    key: ExportKey,
    slot: usize,
}

impl ImportRequirement {
    pub fn new(key: ExportKey, slot: usize) -> Self {
        Self { key, slot }
    }

    pub fn key(&self) -> &ExportKey {
        &self.key
    }

    pub fn slot(&self) -> usize {
        self.slot
    }
}

type DefaultFn = Arc<dyn Fn() -> ExportValue + Send + Sync>;

/// An ordinary (non-import) parameter resolved through the service resolver.
#[derive(Clone)]
pub struct Dependency {
    type_id: TypeId,
    type_name: &'static str,
    slot: usize,
    default: Option<DefaultFn>,
}

impl Dependency {
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    /// True if the parameter falls back to a declared default.
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Produces a fresh default value, if one was declared.
    pub fn default_value(&self) -> Option<ExportValue> {
        self.default.as_ref().map(|f| f())
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependency")
            .field("type", &self.type_name)
            .field("slot", &self.slot)
            .field("has_default", &self.default.is_some())
            .finish()
    }
}

fn default_from<S: Any + Clone + Send + Sync>(value: S) -> DefaultFn {
    Arc::new(move || Arc::new(value.clone()) as ExportValue)
}

fn default_of<S: Any + Default + Send + Sync>() -> DefaultFn {
    Arc::new(|| Arc::new(S::default()) as ExportValue)
}

/// Static metadata of an action.
#[derive(Debug, Clone)]
pub struct ActionInfo {
    id: Cow<'static, str>,
    name: Cow<'static, str>,
    description: Option<Cow<'static, str>>,
    imports: Vec<ImportRequirement>,
    dependencies: Vec<Dependency>,
}

impl ActionInfo {
    /// Creates metadata with no parameters; the display name is derived from `id`.
    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        let id = id.into();
        Self {
            name: Cow::Owned(short_name(&id).to_owned()),
            id,
            description: None,
            imports: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Unique identity token of the action.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name (defaults to the last path segment of the id).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn imports(&self) -> &[ImportRequirement] {
        &self.imports
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Number of factory slots (highest declared slot + 1).
    pub fn slot_count(&self) -> usize {
        self.imports
            .iter()
            .map(ImportRequirement::slot)
            .chain(self.dependencies.iter().map(Dependency::slot))
            .max()
            .map_or(0, |max| max + 1)
    }
}

/// Renders `name` or `name(description)`; used as the trace identifier.
impl fmt::Display for ActionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(description) => write!(f, "{}({})", self.name, description),
            None => f.write_str(&self.name),
        }
    }
}

/// Last `::` segment of a type path, ignoring generic arguments.
fn short_name(id: &str) -> &str {
    let base = id.split('<').next().unwrap_or(id);
    base.rsplit("::").next().unwrap_or(base)
}

type Factory<T> =
    Arc<dyn Fn(&mut Arguments) -> Result<Box<dyn Action<T>>, ActivationError> + Send + Sync>;

/// Metadata plus factory; immutable once built and shared via `Arc`.
pub struct ActionDescriptor<T> {
    info: Arc<ActionInfo>,
    factory: Factory<T>,
}

impl<T> ActionDescriptor<T> {
    /// Starts a builder with an explicit identity.
    pub fn builder(id: impl Into<Cow<'static, str>>) -> ActionBuilder<T> {
        ActionBuilder::new(id)
    }

    pub fn info(&self) -> &Arc<ActionInfo> {
        &self.info
    }

    /// Runs the factory with fully assembled arguments.
    pub(crate) fn instantiate(
        &self,
        args: &mut Arguments,
    ) -> Result<Box<dyn Action<T>>, ActivationError> {
        (self.factory)(args)
    }
}

impl<T> Clone for ActionDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            info: Arc::clone(&self.info),
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<T> fmt::Debug for ActionDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDescriptor")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// Fluent builder for [`ActionDescriptor`].
pub struct ActionBuilder<T> {
    info: ActionInfo,
    next_slot: usize,
    factories: Vec<Factory<T>>,
}

impl<T> ActionBuilder<T> {
    /// Creates a builder with an explicit identity token.
    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self {
            info: ActionInfo::new(id),
            next_slot: 0,
            factories: Vec::new(),
        }
    }

    /// Creates a builder whose identity is the type name of `A`.
    pub fn for_type<A: 'static>() -> Self {
        Self::new(std::any::type_name::<A>())
    }

    /// Overrides the display name.
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.info.name = name.into();
        self
    }

    pub fn description(mut self, description: impl Into<Cow<'static, str>>) -> Self {
        self.info.description = Some(description.into());
        self
    }

    /// Imports the default export of `I` into the next slot.
    pub fn import<I: Any>(self) -> Self {
        let slot = self.next_slot;
        self.import_at(slot, ExportKey::of::<I>(None))
    }

    /// Imports the export of `I` named `name` into the next slot.
    pub fn import_named<I: Any>(self, name: &'static str) -> Self {
        let slot = self.next_slot;
        self.import_at(slot, ExportKey::named::<I>(name))
    }

    /// Imports `key` into an explicit slot.
    pub fn import_at(mut self, slot: usize, key: ExportKey) -> Self {
        self.info.imports.push(ImportRequirement::new(key, slot));
        self.next_slot = self.next_slot.max(slot + 1);
        self
    }

    /// Requires a service of type `S` in the next slot.
    pub fn service<S: Any>(self) -> Self {
        self.push_dependency::<S>(None)
    }

    /// Requires a service of type `S`, falling back to `default` when unresolved.
    pub fn service_or<S: Any + Clone + Send + Sync>(self, default: S) -> Self {
        self.push_dependency::<S>(Some(default_from(default)))
    }

    /// Requires a service of type `S`, falling back to `S::default()`.
    pub fn service_or_default<S: Any + Default + Send + Sync>(self) -> Self {
        self.push_dependency::<S>(Some(default_of::<S>()))
    }

    fn push_dependency<S: Any>(mut self, default: Option<DefaultFn>) -> Self {
        let slot = self.next_slot;
        self.info.dependencies.push(Dependency {
            type_id: TypeId::of::<S>(),
            type_name: std::any::type_name::<S>(),
            slot,
            default,
        });
        self.next_slot = slot + 1;
        self
    }

    /// Declares the factory building the action from its arguments.
    pub fn factory<A, F>(mut self, f: F) -> Self
    where
        T: 'static,
        A: Action<T> + 'static,
        F: Fn(&mut Arguments) -> Result<A, ActivationError> + Send + Sync + 'static,
    {
        self.factories.push(Arc::new(move |args: &mut Arguments| {
            f(args).map(|action| Box::new(action) as Box<dyn Action<T>>)
        }));
        self
    }

    /// Validates the declaration and produces the descriptor.
    pub fn build(mut self) -> Result<ActionDescriptor<T>, ConfigError> {
        let action = self.info.id.to_string();

        let mut slots = HashSet::new();
        let claimed = self
            .info
            .imports
            .iter()
            .map(ImportRequirement::slot)
            .chain(self.info.dependencies.iter().map(Dependency::slot));
        for slot in claimed {
            if !slots.insert(slot) {
                return Err(ConfigError::DuplicateSlot { action, slot });
            }
        }

        if self.factories.len() > 1 {
            return Err(ConfigError::DuplicateFactory { action });
        }
        let factory = self
            .factories
            .pop()
            .ok_or(ConfigError::MissingFactory { action })?;

        Ok(ActionDescriptor {
            info: Arc::new(self.info),
            factory,
        })
    }
}
