//! Error types used by actions, registration and the scheduler.
//!
//! - [`ActionError`]: returned by an action's `execute` or its factory.
//! - [`ExportError`]: a duplicate export raised from [`ActionContext::export`](crate::ActionContext::export).
//! - [`ConfigError`]: raised while building descriptors.
//! - [`ActivationError`]: raised while assembling an action's arguments.
//! - [`RunError`]: the fatal failures that abort [`Sequence::run`](crate::Sequence::run).
//!
//! Each type provides `as_label` (stable snake_case label for logs).

use std::sync::Arc;

use thiserror::Error;

use crate::actions::ActionInfo;
use crate::exports::ExportKey;

/// Boxed error used for release failures and wrapped causes.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// # Errors produced by an action.
///
/// `Fatal` and `Export` abort the run. `Fail` and `Canceled` are ordinary
/// failures: they are recorded in the trace and, under the default
/// [`FailurePolicy`](crate::FailurePolicy), do not stop sibling actions or later waves.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ActionError {
    /// Domain failure signalled by the action itself; aborts the run.
    #[error("fatal action error: {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// Ordinary failure.
    #[error("action failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The action tried to export a key that was already produced.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// The action stopped because the run was cancelled.
    #[error("action cancelled")]
    Canceled,
}

impl ActionError {
    /// Convenience constructor for [`ActionError::Fatal`].
    pub fn fatal(error: impl Into<String>) -> Self {
        ActionError::Fatal {
            error: error.into(),
        }
    }

    /// Convenience constructor for [`ActionError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        ActionError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use actionflow::ActionError;
    ///
    /// assert_eq!(ActionError::fatal("boom").as_label(), "action_fatal");
    /// assert_eq!(ActionError::Canceled.as_label(), "action_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ActionError::Fatal { .. } => "action_fatal",
            ActionError::Fail { .. } => "action_failed",
            ActionError::Export(_) => "action_duplicate_export",
            ActionError::Canceled => "action_canceled",
        }
    }

    /// Whether this error aborts the whole run regardless of policy.
    ///
    /// ```
    /// use actionflow::ActionError;
    ///
    /// assert!(ActionError::fatal("nope").is_fatal());
    /// assert!(!ActionError::fail("retry later").is_fatal());
    /// ```
    pub fn is_fatal(&self) -> bool {
        matches!(self, ActionError::Fatal { .. } | ActionError::Export(_))
    }
}

/// Raised when an action exports a key that already exists.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum ExportError {
    /// The key is already present in the action's stage or the shared store.
    #[error("export {key} already exists")]
    AlreadyExported {
        /// The offending key.
        key: ExportKey,
    },
}

impl ExportError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ExportError::AlreadyExported { .. } => "export_already_exists",
        }
    }
}

/// # Errors raised while describing an action.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The builder was finished without a factory.
    #[error("no factory was declared for action \"{action}\"")]
    MissingFactory { action: String },

    /// More than one factory was declared.
    #[error("multiple factories were declared for action \"{action}\"")]
    DuplicateFactory { action: String },

    /// Two parameters claim the same slot.
    #[error("slot {slot} of action \"{action}\" is declared more than once")]
    DuplicateSlot { action: String, slot: usize },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::MissingFactory { .. } => "config_missing_factory",
            ConfigError::DuplicateFactory { .. } => "config_duplicate_factory",
            ConfigError::DuplicateSlot { .. } => "config_duplicate_slot",
        }
    }
}

/// # Errors raised while activating an action instance.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ActivationError {
    /// A declared import is not present in the export store.
    #[error("unable to resolve import for type \"{type_name}\"{} while activating \"{action}\"", name_suffix(.name))]
    UnresolvedImport {
        action: String,
        type_name: &'static str,
        name: Option<String>,
    },

    /// An ordinary dependency could not be resolved and has no default.
    #[error("unable to resolve dependency of type \"{type_name}\" while activating \"{action}\"")]
    UnresolvedDependency {
        action: String,
        type_name: &'static str,
    },

    /// A resolved value does not have the type the factory asked for.
    #[error("argument {slot} of \"{action}\" is not of type \"{expected}\"")]
    ArgumentType {
        action: String,
        slot: usize,
        expected: &'static str,
    },

    /// The factory asked for a slot that was not declared.
    #[error("argument {slot} of \"{action}\" was not declared")]
    MissingArgument { action: String, slot: usize },

    /// The factory itself failed; the factory's own error is kept as-is.
    #[error(transparent)]
    Factory(ActionError),
}

impl ActivationError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ActivationError::UnresolvedImport { .. } => "activation_unresolved_import",
            ActivationError::UnresolvedDependency { .. } => "activation_unresolved_dependency",
            ActivationError::ArgumentType { .. } => "activation_argument_type",
            ActivationError::MissingArgument { .. } => "activation_missing_argument",
            ActivationError::Factory(e) => e.as_label(),
        }
    }
}

impl From<ActionError> for ActivationError {
    fn from(e: ActionError) -> Self {
        ActivationError::Factory(e)
    }
}

fn name_suffix(name: &Option<String>) -> String {
    name.as_ref()
        .map(|n| format!(" and name \"{n}\""))
        .unwrap_or_default()
}

/// # Fatal errors that abort a run.
///
/// Every variant carries the [`ActionInfo`] of the action it originated from.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RunError {
    /// An action (or its factory) raised a fatal error, or any error under
    /// [`FailurePolicy::Abort`](crate::FailurePolicy::Abort).
    #[error("action \"{action}\" failed: {source}")]
    Action {
        action: Arc<ActionInfo>,
        #[source]
        source: ActionError,
    },

    /// Releasing the action instance failed.
    #[error("releasing action \"{action}\" failed: {source}")]
    Release {
        action: Arc<ActionInfo>,
        #[source]
        source: BoxError,
    },

    /// A staged export collided with an existing key at commit time.
    #[error("export {key} of action \"{action}\" already exists")]
    DuplicateExport {
        action: Arc<ActionInfo>,
        key: ExportKey,
    },

    /// The action could not be activated.
    #[error("activating action \"{action}\" failed: {source}")]
    Activation {
        action: Arc<ActionInfo>,
        #[source]
        source: ActivationError,
    },
}

impl RunError {
    /// Maps an activation failure, unwrapping factory errors into [`RunError::Action`].
    pub(crate) fn activation(action: Arc<ActionInfo>, source: ActivationError) -> Self {
        match source {
            ActivationError::Factory(source) => RunError::Action { action, source },
            source => RunError::Activation { action, source },
        }
    }

    /// The action this error originated from.
    pub fn action(&self) -> &Arc<ActionInfo> {
        match self {
            RunError::Action { action, .. }
            | RunError::Release { action, .. }
            | RunError::DuplicateExport { action, .. }
            | RunError::Activation { action, .. } => action,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RunError::Action { .. } => "run_action_failed",
            RunError::Release { .. } => "run_release_failed",
            RunError::DuplicateExport { .. } => "run_duplicate_export",
            RunError::Activation { .. } => "run_activation_failed",
        }
    }
}
