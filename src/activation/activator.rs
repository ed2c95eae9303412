//! # Activator: builds action instances from descriptors.
//!
//! ## Flow
//! ```text
//! activate(descriptor, context)
//!   ├─► every import present in the store?   no ─► UnresolvedImport (first missing)
//!   ├─► fill import slots from the store
//!   ├─► fill dependency slots:
//!   │     resolver.resolve(type) ─► default ─► UnresolvedDependency
//!   └─► descriptor factory(Arguments) ─► Box<dyn Action<T>>
//! ```
//!
//! ## Rules
//! - All imports are checked before any slot is filled; no partial activation.
//! - Factory errors come back as [`ActivationError::Factory`] carrying the factory's own error.

use std::sync::Arc;

use crate::actions::{Action, ActionContext, ActionDescriptor};
use crate::activation::{Arguments, ServiceResolver};
use crate::error::ActivationError;
use crate::exports::ExportProvider;

/// Builds action instances against one store and an optional resolver.
pub struct Activator<'a> {
    store: &'a dyn ExportProvider,
    resolver: Option<&'a dyn ServiceResolver>,
}

impl<'a> Activator<'a> {
    pub fn new(store: &'a dyn ExportProvider) -> Self {
        Self {
            store,
            resolver: None,
        }
    }

    /// Sets the resolver used for ordinary dependencies.
    pub fn with_resolver(mut self, resolver: Option<&'a dyn ServiceResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// True when every import of `descriptor` is currently available.
    pub fn is_satisfied<T>(&self, descriptor: &ActionDescriptor<T>) -> bool {
        descriptor
            .info()
            .imports()
            .iter()
            .all(|import| self.store.contains_export(import.key()))
    }

    /// Builds an instance of `descriptor` that exports through `context`.
    pub fn activate<T>(
        &self,
        descriptor: &ActionDescriptor<T>,
        context: ActionContext,
    ) -> Result<Box<dyn Action<T>>, ActivationError> {
        let info = descriptor.info();
        let mut values = vec![None; info.slot_count()];

        let mut imported = Vec::with_capacity(info.imports().len());
        for import in info.imports() {
            let value = self.store.get_export(import.key()).ok_or_else(|| {
                ActivationError::UnresolvedImport {
                    action: info.id().to_owned(),
                    type_name: import.key().type_name(),
                    name: import.key().name().map(str::to_owned),
                }
            })?;
            imported.push((import.slot(), value));
        }
        for (slot, value) in imported {
            values[slot] = Some(value);
        }

        for dependency in info.dependencies() {
            let value = self
                .resolver
                .and_then(|r| r.resolve(dependency.type_id()))
                .or_else(|| dependency.default_value())
                .ok_or_else(|| ActivationError::UnresolvedDependency {
                    action: info.id().to_owned(),
                    type_name: dependency.type_name(),
                })?;
            values[dependency.slot()] = Some(value);
        }

        let mut args = Arguments::new(Arc::clone(info), values, context);
        descriptor.instantiate(&mut args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionBuilder;
    use crate::activation::ServiceMap;
    use crate::error::ActionError;
    use crate::exports::ExportStore;
    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    const IMPORT_NAME: &str = "SomeNamedImport";
    const IMPORT_NAME_2: &str = "SomeNamedImport2";

    #[derive(Debug, Default, PartialEq)]
    struct WithImports {
        import1: i32,
        service1: String,
        import2: f64,
        import3: u64,
        service2: f64,
    }

    #[async_trait]
    impl Action<()> for WithImports {
        async fn execute(&self, _: &(), _: CancellationToken) -> Result<(), ActionError> {
            Ok(())
        }
    }

    fn with_imports() -> ActionDescriptor<()> {
        ActionBuilder::for_type::<WithImports>()
            .import::<i32>()
            .service::<String>()
            .import_named::<f64>(IMPORT_NAME)
            .import::<u64>()
            .service::<f64>()
            .factory(|args| {
                Ok(WithImports {
                    import1: args.cloned(0)?,
                    service1: args.cloned(1)?,
                    import2: args.cloned(2)?,
                    import3: args.cloned(3)?,
                    service2: args.cloned(4)?,
                })
            })
            .build()
            .unwrap()
    }

    #[derive(Debug, Default, PartialEq)]
    struct WithOptionalService {
        service1: String,
        service2: i32,
        mode: Option<Mode>,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Mode {
        Fast,
    }

    #[async_trait]
    impl Action<()> for WithOptionalService {
        async fn execute(&self, _: &(), _: CancellationToken) -> Result<(), ActionError> {
            Ok(())
        }
    }

    fn with_optional_service() -> ActionDescriptor<()> {
        ActionBuilder::for_type::<WithOptionalService>()
            .service::<String>()
            .service_or(-1_i32)
            .service_or(Some(Mode::Fast))
            .factory(|args| {
                Ok(WithOptionalService {
                    service1: args.cloned(0)?,
                    service2: args.cloned(1)?,
                    mode: args.cloned(2)?,
                })
            })
            .build()
            .unwrap()
    }

    fn context(store: &Arc<ExportStore>) -> ActionContext {
        ActionContext::new(Arc::clone(store) as Arc<dyn ExportProvider>)
    }

    fn try_activate(
        descriptor: &ActionDescriptor<()>,
        store: &Arc<ExportStore>,
        services: &ServiceMap,
    ) -> Result<(), ActivationError> {
        let resolver: &dyn ServiceResolver = services;
        let activator = Activator::new(store.as_ref()).with_resolver(Some(resolver));
        activator.activate(descriptor, context(store)).map(|_| ())
    }

    #[test]
    fn test_activation_fills_imports_and_services() {
        let store = Arc::new(ExportStore::new());
        store.try_export_value(None, 2_i32);
        store.try_export_value(Some(IMPORT_NAME), 3.0_f64);
        store.try_export_value(None, 4_u64);
        let services = ServiceMap::new().with(String::from("TEST")).with(1.0_f64);

        let built = Arc::new(std::sync::Mutex::new(None));
        let sink = Arc::clone(&built);
        let descriptor = ActionBuilder::<()>::for_type::<WithImports>()
            .import::<i32>()
            .service::<String>()
            .import_named::<f64>(IMPORT_NAME)
            .import::<u64>()
            .service::<f64>()
            .factory(move |args| {
                let action = WithImports {
                    import1: args.cloned(0)?,
                    service1: args.cloned(1)?,
                    import2: args.cloned(2)?,
                    import3: args.cloned(3)?,
                    service2: args.cloned(4)?,
                };
                *sink.lock().unwrap() = Some(format!("{action:?}"));
                Ok(action)
            })
            .build()
            .unwrap();

        try_activate(&descriptor, &store, &services).unwrap();

        let expected = WithImports {
            import1: 2,
            service1: "TEST".into(),
            import2: 3.0,
            import3: 4,
            service2: 1.0,
        };
        assert_eq!(built.lock().unwrap().as_deref(), Some(format!("{expected:?}").as_str()));
    }

    #[test]
    fn test_imports_of_same_type_by_name() {
        let store = Arc::new(ExportStore::new());
        store.try_export_value(None, 1_i32);
        store.try_export_value(Some(IMPORT_NAME), 2_i32);
        store.try_export_value(Some(IMPORT_NAME_2), 3_i32);

        let descriptor = ActionBuilder::<()>::new("same_type")
            .import::<i32>()
            .import_named::<i32>(IMPORT_NAME)
            .import_named::<i32>(IMPORT_NAME_2)
            .factory(|args| {
                let got: Vec<i32> = (0..3).map(|i| args.cloned(i)).collect::<Result<_, _>>()?;
                assert_eq!(got, vec![1, 2, 3]);
                Ok(WithImports::default())
            })
            .build()
            .unwrap();

        try_activate(&descriptor, &store, &ServiceMap::new()).unwrap();
    }

    #[test]
    fn test_missing_import_fails_before_factory() {
        let store = Arc::new(ExportStore::new());
        store.try_export_value(None, 2_i32);
        let services = ServiceMap::new().with(String::from("TEST")).with(1.0_f64);

        let err = try_activate(&with_imports(), &store, &services).unwrap_err();
        match err {
            ActivationError::UnresolvedImport { type_name, name, action } => {
                assert_eq!(type_name, "f64");
                assert_eq!(name.as_deref(), Some(IMPORT_NAME));
                assert!(action.ends_with("WithImports"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_satisfied_tracks_store() {
        let store = Arc::new(ExportStore::new());
        let descriptor = with_imports();
        let activator = Activator::new(store.as_ref());
        assert!(!activator.is_satisfied(&descriptor));

        store.try_export_value(None, 2_i32);
        store.try_export_value(Some(IMPORT_NAME), 3.0_f64);
        assert!(!activator.is_satisfied(&descriptor));

        store.try_export_value(None, 4_u64);
        assert!(activator.is_satisfied(&descriptor));
    }

    #[test]
    fn test_optional_service_uses_default() {
        let store = Arc::new(ExportStore::new());
        let services = ServiceMap::new().with(String::from("TEST"));

        let seen = Arc::new(std::sync::Mutex::new(None));
        let sink = Arc::clone(&seen);
        let descriptor = ActionBuilder::<()>::for_type::<WithOptionalService>()
            .service::<String>()
            .service_or(-1_i32)
            .service_or(Some(Mode::Fast))
            .service_or_default::<u8>()
            .factory(move |args| {
                *sink.lock().unwrap() = Some((
                    args.cloned::<String>(0)?,
                    args.cloned::<i32>(1)?,
                    args.cloned::<Option<Mode>>(2)?,
                    args.cloned::<u8>(3)?,
                ));
                Ok(WithOptionalService::default())
            })
            .build()
            .unwrap();

        try_activate(&descriptor, &store, &services).unwrap();
        assert_eq!(
            seen.lock().unwrap().clone(),
            Some(("TEST".to_string(), -1, Some(Mode::Fast), 0))
        );
    }

    #[test]
    fn test_missing_service_without_default_fails() {
        let store = Arc::new(ExportStore::new());
        let err = try_activate(
            &with_optional_service(),
            &store,
            &ServiceMap::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ActivationError::UnresolvedDependency { type_name, .. } if type_name.ends_with("String")
        ));
    }

    #[test]
    fn test_factory_error_passes_through() {
        let store = Arc::new(ExportStore::new());
        let descriptor = ActionBuilder::<()>::new("broken")
            .factory(|_| Err::<WithImports, _>(ActionError::fatal("ctor exploded").into()))
            .build()
            .unwrap();

        let err = try_activate(&descriptor, &store, &ServiceMap::new()).unwrap_err();
        match err {
            ActivationError::Factory(ActionError::Fatal { error }) => {
                assert_eq!(error, "ctor exploded")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_wrong_argument_type_reported() {
        let store = Arc::new(ExportStore::new());
        store.try_export_value(None, 7_i32);
        let descriptor = ActionBuilder::<()>::new("confused")
            .import::<i32>()
            .factory(|args| {
                let _: Arc<String> = args.get(0)?;
                Ok(WithImports::default())
            })
            .build()
            .unwrap();

        let err = try_activate(&descriptor, &store, &ServiceMap::new()).unwrap_err();
        assert_eq!(err.as_label(), "activation_argument_type");
    }
}
