//! # Run a single wave member.
//!
//! Executes one [`ActionItem`], commits its exports, releases it, and records
//! the outcome in the trace.
//!
//! ## Flow
//! ```text
//! trace Begin(action)
//!   ├─► action.execute(target, child token)   (panics caught → Fail)
//!   ├─► Ok  ─► commit staged exports           (collision → DuplicateExport)
//!   ├─► release instance                       (always, on every path)
//!   └─► trace End / UnexpectedEnd(error)
//! ```
//!
//! ## Rules
//! - Release runs even when execute or commit failed; a release error wins.
//! - `Fatal`, `Export`, commit and release errors are returned as fatal.
//! - `Fail`/`Canceled` (and panics) are logged and swallowed unless the
//!   policy is [`FailurePolicy::Abort`](crate::FailurePolicy::Abort).
//! - Each action gets a **child token**; cancelling it does not cancel the run.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::{
    config::SequenceConfig,
    core::item::ActionItem,
    error::{ActionError, RunError},
    trace::ActionTrace,
};

/// Runs `item` against `target`.
///
/// Returns `Err` only for errors that must abort the run.
pub(crate) async fn run_item<T>(
    item: &mut ActionItem<T>,
    target: &T,
    parent: &CancellationToken,
    trace: Option<&ActionTrace>,
    cfg: &SequenceConfig,
) -> Result<(), RunError> {
    let identifier = item.identifier().clone();
    if let Some(trace) = trace {
        trace.begin(identifier.clone());
    }

    let executed = match item.action() {
        Some(action) => AssertUnwindSafe(action.execute(target, parent.child_token()))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(ActionError::fail(panic_message(payload)))),
        None => Ok(()),
    };

    let outcome = match executed {
        Ok(()) => item.commit(),
        Err(source) => Err(RunError::Action {
            action: item.info().clone(),
            source,
        }),
    };

    let result = match item.release() {
        Ok(()) => outcome,
        Err(released) => {
            if let Err(e) = &outcome {
                tracing::warn!(action = %identifier, error = %e, "superseded by release failure");
            }
            Err(released)
        }
    };

    match result {
        Ok(()) => {
            if let Some(trace) = trace {
                trace.end(identifier);
            }
            Ok(())
        }
        Err(e) => {
            if let Some(trace) = trace {
                trace.unexpected_end(identifier.clone(), e.to_string());
            }
            if is_fatal(&e, cfg) {
                Err(e)
            } else {
                tracing::warn!(
                    action = %identifier,
                    error = %e,
                    label = e.as_label(),
                    "action failed; continuing"
                );
                Ok(())
            }
        }
    }
}

fn is_fatal(e: &RunError, cfg: &SequenceConfig) -> bool {
    match e {
        RunError::Action { source, .. } => source.is_fatal() || cfg.aborts_on_failure(),
        _ => true,
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    let msg = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_owned());
    format!("panicked: {msg}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{Action, ActionContext, ActionInfo};
    use crate::config::FailurePolicy;
    use crate::exports::{ExportProvider, ExportStore};
    use crate::trace::TraceEvent;
    use async_trait::async_trait;
    use std::sync::Arc;

    enum Behavior {
        Export,
        Fail,
        Fatal,
        Panic,
    }

    struct Scripted {
        ctx: ActionContext,
        behavior: Behavior,
    }

    #[async_trait]
    impl Action<()> for Scripted {
        async fn execute(&self, _: &(), _: CancellationToken) -> Result<(), ActionError> {
            match self.behavior {
                Behavior::Export => {
                    self.ctx.export(7_u32)?;
                    Ok(())
                }
                Behavior::Fail => Err(ActionError::fail("flaky")),
                Behavior::Fatal => Err(ActionError::fatal("broken")),
                Behavior::Panic => panic!("kaboom"),
            }
        }
    }

    fn item(store: &Arc<ExportStore>, behavior: Behavior) -> ActionItem<()> {
        let shared: Arc<dyn ExportProvider> = store.clone();
        let ctx = ActionContext::new(shared);
        ActionItem::new(
            Arc::new(ActionInfo::new("jobs::Scripted")),
            Box::new(Scripted {
                ctx: ctx.clone(),
                behavior,
            }),
            ctx,
        )
    }

    async fn run(
        behavior: Behavior,
        cfg: &SequenceConfig,
    ) -> (Result<(), RunError>, ActionTrace, Arc<ExportStore>) {
        let store = Arc::new(ExportStore::new());
        let trace = ActionTrace::new();
        let mut it = item(&store, behavior);
        let res = run_item(&mut it, &(), &CancellationToken::new(), Some(&trace), cfg).await;
        (res, trace, store)
    }

    #[tokio::test]
    async fn test_success_commits_and_ends() {
        let (res, trace, store) = run(Behavior::Export, &SequenceConfig::default()).await;
        res.unwrap();
        assert_eq!(store.get::<u32>(None).as_deref(), Some(&7));
        assert_eq!(
            trace.events(),
            vec![
                (TraceEvent::Begin, "Scripted".to_string()),
                (TraceEvent::End, "Scripted".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_fail_is_swallowed_by_default() {
        let (res, trace, _) = run(Behavior::Fail, &SequenceConfig::default()).await;
        res.unwrap();
        let last = trace.entries().pop().unwrap();
        assert_eq!(last.event, TraceEvent::UnexpectedEnd);
        assert!(last.error.unwrap().contains("flaky"));
    }

    #[tokio::test]
    async fn test_fail_aborts_under_abort_policy() {
        let cfg = SequenceConfig {
            failure_policy: FailurePolicy::Abort,
            ..SequenceConfig::default()
        };
        let (res, _, _) = run(Behavior::Fail, &cfg).await;
        assert_eq!(res.unwrap_err().as_label(), "run_action_failed");
    }

    #[tokio::test]
    async fn test_fatal_propagates() {
        let (res, trace, _) = run(Behavior::Fatal, &SequenceConfig::default()).await;
        match res.unwrap_err() {
            RunError::Action { source: ActionError::Fatal { error }, action } => {
                assert_eq!(error, "broken");
                assert_eq!(action.name(), "Scripted");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(trace.entries()[1].event, TraceEvent::UnexpectedEnd);
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let (res, trace, _) = run(Behavior::Panic, &SequenceConfig::default()).await;
        res.unwrap();
        let last = trace.entries().pop().unwrap();
        assert!(last.error.unwrap().contains("kaboom"));
    }
}
