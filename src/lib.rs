//! # actionflow
//!
//! **Actionflow** runs a set of independently written async actions against a
//! shared target. Run order is not declared up front: each action states which
//! typed values it *imports*, and whichever action *exports* them must have
//! finished first. The scheduler discovers the order wave by wave.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ActionRegistry ──(priority, stable)──► SequenceFactory ──create()──► Sequence
//!                                                                         │
//!   ┌─────────────────────────────────────────────────────────────────────┘
//!   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Sequence (wave scheduler)                                        │
//! │  - pending descriptors (registration order)                       │
//! │  - ExportStore (single producer per (type, name))                 │
//! │  - ServiceResolver (ordinary dependencies)                        │
//! └──────┬────────────────────────────────────────────────────────────┘
//!        │ select: every pending action whose imports are in the store
//!        ▼
//! ┌──────────────────────────┐  activate  ┌──────────────────────────────┐
//! │ Activator                │───────────►│ Wave: ActionItem × M         │
//! │  imports  ◄─ store       │            │  execute ─► commit ─► release│
//! │  services ◄─ resolver    │            │  (sequential or concurrent)  │
//! └──────────────────────────┘            └──────────────┬───────────────┘
//!                                                        │ staged exports
//!                                                        ▼
//!                                                  ExportStore ──► next selection
//! ```
//!
//! ### Lifecycle
//! ```text
//! Sequence::run(target, cancel)
//! loop {
//!   ├─► cancelled?                          ─► stop
//!   ├─► select + activate eligible actions
//!   │     ├─ none eligible                  ─► stop (stalled)
//!   │     └─ activation error               ─► abort (RunError)
//!   └─► run wave
//!         ├─ Ok / swallowed failure         ─► commit, continue
//!         └─ fatal / release error          ─► abort (RunError)
//! }
//! outcome: Canceled | None | Partial | Full
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Actions**       | Author actions and describe their imports and dependencies.  | [`Action`], [`ActionType`], [`ActionBuilder`] |
//! | **Registration**  | Priority-ordered registry, cached descriptors.               | [`ActionRegistry`], [`DescriptorCache`]     |
//! | **Exports**       | Typed, optionally named values passed between actions.       | [`ActionContext`], [`ExportStore`]          |
//! | **Scheduling**    | Wave-by-wave execution with cancellation.                    | [`Sequence`], [`SequenceOutcome`]           |
//! | **Tracing**       | Begin/end record attached to the run target.                 | [`ActionTrace`], [`Traceable`]              |
//! | **Errors**        | Typed errors for configuration, activation and runs.         | [`ActionError`], [`RunError`]               |
//! | **Configuration** | Execution mode, concurrency cap, failure policy.             | [`SequenceConfig`]                          |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use actionflow::{
//!     Action, ActionBuilder, ActionContext, ActionError, ActionRegistry, ActionTrace,
//!     ActionType, SequenceOutcome,
//! };
//!
//! struct Greeting(String);
//!
//! struct Compose {
//!     ctx: ActionContext,
//! }
//!
//! #[async_trait]
//! impl Action<ActionTrace> for Compose {
//!     async fn execute(&self, _: &ActionTrace, _: CancellationToken) -> Result<(), ActionError> {
//!         self.ctx.export(Greeting("hello".into()))?;
//!         Ok(())
//!     }
//! }
//!
//! impl ActionType<ActionTrace> for Compose {
//!     fn describe() -> ActionBuilder<ActionTrace> {
//!         ActionBuilder::for_type::<Self>().factory(|args| Ok(Compose { ctx: args.context() }))
//!     }
//! }
//!
//! struct Print {
//!     greeting: Arc<Greeting>,
//! }
//!
//! #[async_trait]
//! impl Action<ActionTrace> for Print {
//!     async fn execute(&self, _: &ActionTrace, _: CancellationToken) -> Result<(), ActionError> {
//!         println!("{}", self.greeting.0);
//!         Ok(())
//!     }
//! }
//!
//! impl ActionType<ActionTrace> for Print {
//!     fn describe() -> ActionBuilder<ActionTrace> {
//!         ActionBuilder::for_type::<Self>()
//!             .import::<Greeting>()
//!             .factory(|args| Ok(Print { greeting: args.get(0)? }))
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut registry = ActionRegistry::<ActionTrace>::new();
//!     registry.add::<Print>()?;
//!     registry.add::<Compose>()?;
//!
//!     let trace = ActionTrace::new();
//!     let mut sequence = registry.into_factory().create();
//!     let outcome = sequence.run(&trace, CancellationToken::new()).await?;
//!
//!     assert_eq!(outcome, SequenceOutcome::Full);
//!     assert_eq!(trace.len(), 10);
//!     Ok(())
//! }
//! ```
mod actions;
mod activation;
mod config;
mod core;
mod error;
mod exports;
mod trace;

// ---- Public re-exports ----

pub use actions::{
    Action, ActionBuilder, ActionContext, ActionDescriptor, ActionInfo, ActionRegistry, ActionType,
    Dependency, DescriptorCache, ImportRequirement,
};
pub use activation::{Activator, Arguments, ServiceMap, ServiceResolver};
pub use config::{FailurePolicy, SequenceConfig, WaveExecution};
pub use crate::core::{Sequence, SequenceBuilder, SequenceFactory, SequenceOutcome};
pub use error::{ActionError, ActivationError, BoxError, ConfigError, ExportError, RunError};
pub use exports::{Export, ExportKey, ExportProvider, ExportStore, ExportValue};
pub use trace::{ActionTrace, TraceEntry, TraceEvent, Traceable};
