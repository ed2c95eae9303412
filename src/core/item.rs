//! # One activated wave member.
//!
//! [`ActionItem`] owns the activated instance together with its
//! [`ActionContext`]. The instance is released exactly once: explicitly through
//! [`ActionItem::release`] on the normal path, or by `Drop` when the wave is
//! abandoned (fatal sibling, dropped run future). Failures on the drop path can
//! only be logged.

use std::sync::Arc;

use crate::actions::{Action, ActionContext, ActionInfo};
use crate::error::RunError;

pub(crate) struct ActionItem<T> {
    info: Arc<ActionInfo>,
    identifier: Arc<str>,
    action: Option<Box<dyn Action<T>>>,
    context: ActionContext,
}

impl<T> ActionItem<T> {
    pub(crate) fn new(
        info: Arc<ActionInfo>,
        action: Box<dyn Action<T>>,
        context: ActionContext,
    ) -> Self {
        Self {
            identifier: info.to_string().into(),
            info,
            action: Some(action),
            context,
        }
    }

    pub(crate) fn info(&self) -> &Arc<ActionInfo> {
        &self.info
    }

    /// Trace identifier: `name` or `name(description)`.
    pub(crate) fn identifier(&self) -> &Arc<str> {
        &self.identifier
    }

    /// The live instance; `None` once released.
    pub(crate) fn action(&self) -> Option<&dyn Action<T>> {
        self.action.as_deref()
    }

    /// Moves staged exports into the shared store.
    pub(crate) fn commit(&self) -> Result<(), RunError> {
        match self.context.commit() {
            Ok(count) => {
                tracing::debug!(action = %self.identifier, count, "exports committed");
                Ok(())
            }
            Err(key) => Err(RunError::DuplicateExport {
                action: Arc::clone(&self.info),
                key,
            }),
        }
    }

    /// Releases the instance; a second call is a no-op.
    pub(crate) fn release(&mut self) -> Result<(), RunError> {
        let Some(mut action) = self.action.take() else {
            return Ok(());
        };
        action.release().map_err(|source| RunError::Release {
            action: Arc::clone(&self.info),
            source,
        })
    }
}

impl<T> Drop for ActionItem<T> {
    fn drop(&mut self) {
        if let Some(mut action) = self.action.take() {
            if let Err(e) = action.release() {
                tracing::warn!(
                    action = %self.identifier,
                    error = %e,
                    "release failed while abandoning action"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ActionError, BoxError};
    use crate::exports::{ExportProvider, ExportStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_util::sync::CancellationToken;

    struct Tracked {
        releases: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl Action<()> for Tracked {
        async fn execute(&self, _: &(), _: CancellationToken) -> Result<(), ActionError> {
            Ok(())
        }

        fn release(&mut self) -> Result<(), BoxError> {
            self.releases.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err("handle already closed".into());
            }
            Ok(())
        }
    }

    fn item(releases: &Arc<AtomicUsize>, fail: bool) -> ActionItem<()> {
        let store: Arc<dyn ExportProvider> = Arc::new(ExportStore::new());
        ActionItem::new(
            Arc::new(ActionInfo::new("jobs::Tracked")),
            Box::new(Tracked {
                releases: Arc::clone(releases),
                fail,
            }),
            ActionContext::new(store),
        )
    }

    #[test]
    fn test_release_runs_once() {
        let releases = Arc::new(AtomicUsize::new(0));
        let mut it = item(&releases, false);
        it.release().unwrap();
        it.release().unwrap();
        assert!(it.action().is_none());
        drop(it);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_releases_abandoned_instance() {
        let releases = Arc::new(AtomicUsize::new(0));
        drop(item(&releases, true));
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_release_failure_carries_action() {
        let releases = Arc::new(AtomicUsize::new(0));
        let mut it = item(&releases, true);
        let err = it.release().unwrap_err();
        assert_eq!(err.as_label(), "run_release_failed");
        assert_eq!(err.action().name(), "Tracked");
        assert!(err.to_string().contains("handle already closed"));
    }
}
