//! # Wave execution.
//!
//! A [`Wave`] is the set of actions activated in one scheduling pass. Members are
//! mutually independent (none imports what another member exports), so they may
//! run one by one or concurrently.
//!
//! ```text
//! trace Begin(Wave (M))
//!   Sequential:  member₁ ─► member₂ ─► … (stop at first fatal error)
//!   Concurrent:  member₁ ┐
//!                member₂ ├─► join (semaphore-bounded); fatal error cancels
//!                memberₙ ┘    the wave token, first fatal error in order wins
//! trace End(Wave (M)) / UnexpectedEnd(Wave (M), error)
//! ```
//!
//! Members not yet run when a sequential wave aborts are released by their drop
//! guard and never traced.

use std::fmt;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::{
    config::{SequenceConfig, WaveExecution},
    core::{item::ActionItem, runner::run_item},
    error::RunError,
    trace::ActionTrace,
};

pub(crate) struct Wave<T> {
    items: Vec<ActionItem<T>>,
}

impl<T> Wave<T> {
    pub(crate) fn new(items: Vec<ActionItem<T>>) -> Self {
        Self { items }
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    /// Runs every member; returns the first error that must abort the run.
    pub(crate) async fn execute(
        mut self,
        target: &T,
        cancel: &CancellationToken,
        trace: Option<&ActionTrace>,
        cfg: &SequenceConfig,
        semaphore: Option<&Semaphore>,
    ) -> Result<(), RunError> {
        let identifier = self.to_string();
        if let Some(trace) = trace {
            trace.begin(identifier.as_str());
        }
        tracing::debug!(wave = %identifier, mode = ?cfg.execution, "wave started");

        let res = match cfg.execution {
            WaveExecution::Sequential => self.run_sequential(target, cancel, trace, cfg).await,
            WaveExecution::Concurrent => {
                self.run_concurrent(target, cancel, trace, cfg, semaphore)
                    .await
            }
        };

        if let Some(trace) = trace {
            match &res {
                Ok(()) => trace.end(identifier.as_str()),
                Err(e) => trace.unexpected_end(identifier.as_str(), e.to_string()),
            }
        }
        res
    }

    async fn run_sequential(
        &mut self,
        target: &T,
        cancel: &CancellationToken,
        trace: Option<&ActionTrace>,
        cfg: &SequenceConfig,
    ) -> Result<(), RunError> {
        for item in &mut self.items {
            run_item(item, target, cancel, trace, cfg).await?;
        }
        Ok(())
    }

    async fn run_concurrent(
        &mut self,
        target: &T,
        cancel: &CancellationToken,
        trace: Option<&ActionTrace>,
        cfg: &SequenceConfig,
        semaphore: Option<&Semaphore>,
    ) -> Result<(), RunError> {
        let wave_token = cancel.child_token();

        let members = self.items.iter_mut().map(|item| {
            let wave_token = &wave_token;
            async move {
                let _permit = match semaphore {
                    Some(sem) => sem.acquire().await.ok(),
                    None => None,
                };
                let res = run_item(item, target, wave_token, trace, cfg).await;
                if res.is_err() {
                    wave_token.cancel();
                }
                res
            }
        });

        join_all(members).await.into_iter().collect()
    }
}

impl<T> fmt::Display for Wave<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Wave ({})", self.items.len())
    }
}
