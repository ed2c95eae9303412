//! # Factory arguments.
//!
//! [`Arguments`] is what a factory sees: one resolved value per declared slot
//! plus the fresh [`ActionContext`] of the instance being built.

use std::any::Any;
use std::sync::Arc;

use crate::actions::{ActionContext, ActionInfo};
use crate::error::ActivationError;
use crate::exports::ExportValue;

/// Resolved arguments for one activation.
pub struct Arguments {
    action: Arc<ActionInfo>,
    values: Vec<Option<ExportValue>>,
    context: ActionContext,
}

impl Arguments {
    pub(crate) fn new(
        action: Arc<ActionInfo>,
        values: Vec<Option<ExportValue>>,
        context: ActionContext,
    ) -> Self {
        Self {
            action,
            values,
            context,
        }
    }

    /// Returns the value in `slot` as `Arc<V>`.
    pub fn get<V: Any + Send + Sync>(&self, slot: usize) -> Result<Arc<V>, ActivationError> {
        let value = self
            .values
            .get(slot)
            .and_then(Option::as_ref)
            .ok_or_else(|| ActivationError::MissingArgument {
                action: self.action.id().to_owned(),
                slot,
            })?;

        Arc::clone(value)
            .downcast::<V>()
            .map_err(|_| ActivationError::ArgumentType {
                action: self.action.id().to_owned(),
                slot,
                expected: std::any::type_name::<V>(),
            })
    }

    /// Returns an owned copy of the value in `slot`.
    pub fn cloned<V: Any + Clone + Send + Sync>(&self, slot: usize) -> Result<V, ActivationError> {
        self.get::<V>(slot).map(|v| V::clone(&v))
    }

    /// The context the new instance exports through.
    pub fn context(&self) -> ActionContext {
        self.context.clone()
    }

    /// Metadata of the action being activated.
    pub fn action(&self) -> &Arc<ActionInfo> {
        &self.action
    }

    /// Number of slots (declared or not).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
