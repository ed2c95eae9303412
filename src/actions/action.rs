//! # Action abstraction.
//!
//! An [`Action`] is one unit of work run against a shared target of type `T`.
//! It receives a [`CancellationToken`] and decides itself how to honor it; the
//! scheduler never interrupts a running action.
//!
//! Types that describe themselves (imports, dependencies, factory) implement
//! [`ActionType`] so they can be registered by type with
//! [`ActionRegistry::add`](crate::ActionRegistry::add).

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::actions::descriptor::ActionBuilder;
use crate::error::{ActionError, BoxError};

/// # Asynchronous, cancelable action.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use actionflow::{Action, ActionContext, ActionError};
///
/// struct Announce {
///     ctx: ActionContext,
/// }
///
/// #[async_trait]
/// impl Action<()> for Announce {
///     async fn execute(&self, _target: &(), cancel: CancellationToken) -> Result<(), ActionError> {
///         if cancel.is_cancelled() {
///             return Err(ActionError::Canceled);
///         }
///         self.ctx.export(String::from("hello"))?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Action<T>: Send + Sync {
    /// Runs the action against `target`.
    ///
    /// Return [`ActionError::Fatal`] to abort the whole run. Any other error is
    /// recorded and, by default, does not stop sibling actions.
    async fn execute(&self, target: &T, cancel: CancellationToken) -> Result<(), ActionError>;

    /// Releases resources owned by the instance.
    ///
    /// Called exactly once after `execute`, on every exit path. A failure here is
    /// always fatal to the run.
    fn release(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
}

/// An action type that carries its own descriptor.
///
/// Replaces metadata scanning: the type states its display name, imports,
/// dependencies and factory once, and registries cache the result.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use actionflow::{Action, ActionBuilder, ActionError, ActionType};
///
/// struct Greeting(String);
///
/// struct Greet {
///     greeting: std::sync::Arc<Greeting>,
/// }
///
/// #[async_trait]
/// impl Action<()> for Greet {
///     async fn execute(&self, _: &(), _: CancellationToken) -> Result<(), ActionError> {
///         println!("{}", self.greeting.0);
///         Ok(())
///     }
/// }
///
/// impl ActionType<()> for Greet {
///     fn describe() -> ActionBuilder<()> {
///         ActionBuilder::for_type::<Self>()
///             .description("prints the greeting")
///             .import::<Greeting>()
///             .factory(|args| Ok(Greet { greeting: args.get(0)? }))
///     }
/// }
/// ```
pub trait ActionType<T>: Action<T> + Sized {
    /// Returns the builder describing this action.
    fn describe() -> ActionBuilder<T>;
}
