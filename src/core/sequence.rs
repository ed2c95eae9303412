//! # Sequence: the wave scheduler.
//!
//! A [`Sequence`] owns the pending descriptors of one run and the store they
//! read from and export into. [`Sequence::run`] repeatedly forms a wave out of
//! every pending action whose imports are present, runs it, and loops.
//!
//! ## Lifecycle
//! ```text
//! run(target, cancel)
//!   trace Begin(Sequence (N))
//!   loop while pending non-empty {
//!     ├─► cancel requested?            ─► stop
//!     ├─► next_wave():
//!     │     for each pending (registration order):
//!     │       imports all present? ─► activate
//!     │     activation error       ─► abort run (selection stays pending)
//!     │     selection activated    ─► remove it from pending
//!     │     nothing eligible       ─► stop (stalled)
//!     └─► wave.execute()  fatal    ─► abort run
//!   }
//!   trace End(Sequence (N))            (UnexpectedEnd on abort)
//!   classify ─► Canceled | None | Partial | Full
//! ```
//!
//! ## Rules
//! - Waves run strictly one after another; eligibility is computed only from
//!   exports committed by earlier waves.
//! - Cancellation is checked before each selection and wins the classification.
//! - An abort returns the [`RunError`] after tracing `UnexpectedEnd` for the
//!   sequence; no outcome is produced.

use std::fmt;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::{
    actions::{ActionContext, ActionDescriptor, ActionInfo},
    activation::{Activator, ServiceResolver},
    config::SequenceConfig,
    core::{item::ActionItem, wave::Wave},
    error::RunError,
    exports::ExportProvider,
    trace::{ActionTrace, Traceable},
};

/// Classification of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceOutcome {
    /// No action was scheduled.
    None,
    /// Every action was scheduled.
    Full,
    /// Some actions were scheduled; the rest stalled on missing imports.
    Partial,
    /// Cancellation was observed.
    Canceled,
}

impl SequenceOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceOutcome::None => "none",
            SequenceOutcome::Full => "full",
            SequenceOutcome::Partial => "partial",
            SequenceOutcome::Canceled => "canceled",
        }
    }
}

/// One run of a registered action set.
pub struct Sequence<T> {
    pending: Vec<Arc<ActionDescriptor<T>>>,
    initial: usize,
    store: Arc<dyn ExportProvider>,
    resolver: Option<Arc<dyn ServiceResolver>>,
    cfg: SequenceConfig,
    semaphore: Option<Semaphore>,
}

impl<T> Sequence<T> {
    pub(crate) fn new(
        pending: Vec<Arc<ActionDescriptor<T>>>,
        store: Arc<dyn ExportProvider>,
        resolver: Option<Arc<dyn ServiceResolver>>,
        cfg: SequenceConfig,
    ) -> Self {
        let semaphore = cfg.concurrency_limit().map(Semaphore::new);
        Self {
            initial: pending.len(),
            pending,
            store,
            resolver,
            cfg,
            semaphore,
        }
    }

    /// Runs the sequence against `target` until it completes, stalls, is
    /// cancelled, or hits a fatal error.
    ///
    /// Calling `run` again resumes with whatever is still pending.
    pub async fn run(
        &mut self,
        target: &T,
        cancel: CancellationToken,
    ) -> Result<SequenceOutcome, RunError>
    where
        T: Traceable,
    {
        let trace = target.action_trace();
        let identifier = self.to_string();
        if let Some(trace) = trace {
            trace.begin(identifier.as_str());
        }

        if let Err(e) = self.drive(target, &cancel, trace).await {
            if let Some(trace) = trace {
                trace.unexpected_end(identifier.as_str(), e.to_string());
            }
            tracing::error!(
                sequence = %identifier,
                action = %e.action(),
                error = %e,
                label = e.as_label(),
                "run aborted"
            );
            return Err(e);
        }

        if let Some(trace) = trace {
            trace.end(identifier.as_str());
        }
        let outcome = self.outcome(&cancel);
        tracing::info!(
            sequence = %identifier,
            outcome = outcome.as_str(),
            pending = self.pending.len(),
            "run finished"
        );
        Ok(outcome)
    }

    async fn drive(
        &mut self,
        target: &T,
        cancel: &CancellationToken,
        trace: Option<&ActionTrace>,
    ) -> Result<(), RunError> {
        while !self.pending.is_empty() {
            if cancel.is_cancelled() {
                tracing::debug!(pending = self.pending.len(), "cancellation observed");
                break;
            }
            let Some(wave) = self.next_wave()? else {
                tracing::debug!(pending = self.pending.len(), "no eligible actions; stalled");
                break;
            };
            tracing::debug!(members = wave.len(), "wave formed");
            wave.execute(target, cancel, trace, &self.cfg, self.semaphore.as_ref())
                .await?;
        }
        Ok(())
    }

    /// Activates every pending action whose imports are satisfied.
    ///
    /// The selection leaves `pending` only once all of it has activated; on an
    /// activation error every descriptor stays pending.
    fn next_wave(&mut self) -> Result<Option<Wave<T>>, RunError> {
        let activator = Activator::new(self.store.as_ref()).with_resolver(self.resolver.as_deref());
        let mut selected = Vec::new();
        let mut items = Vec::new();

        for (i, descriptor) in self.pending.iter().enumerate() {
            let descriptor: &ActionDescriptor<T> = descriptor;
            if !activator.is_satisfied(descriptor) {
                continue;
            }

            let info = Arc::clone(descriptor.info());
            let context = ActionContext::new(Arc::clone(&self.store));
            let action = activator
                .activate(descriptor, context.clone())
                .map_err(|e| RunError::activation(Arc::clone(&info), e))?;

            items.push(ActionItem::new(info, action, context));
            selected.push(i);
        }

        let mut index = 0;
        self.pending.retain(|_| {
            let keep = selected.binary_search(&index).is_err();
            index += 1;
            keep
        });

        Ok((!items.is_empty()).then(|| Wave::new(items)))
    }

    fn outcome(&self, cancel: &CancellationToken) -> SequenceOutcome {
        if cancel.is_cancelled() {
            SequenceOutcome::Canceled
        } else if self.pending.len() == self.initial {
            SequenceOutcome::None
        } else if !self.pending.is_empty() {
            SequenceOutcome::Partial
        } else {
            SequenceOutcome::Full
        }
    }

    /// Metadata of the actions not scheduled yet, in registration order.
    pub fn pending(&self) -> impl Iterator<Item = &Arc<ActionInfo>> + '_ {
        self.pending.iter().map(|d| d.info())
    }

    /// The store this sequence reads imports from and commits exports into.
    pub fn store(&self) -> &Arc<dyn ExportProvider> {
        &self.store
    }

    pub fn config(&self) -> &SequenceConfig {
        &self.cfg
    }
}

impl<T> fmt::Display for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sequence ({})", self.initial)
    }
}

impl<T> fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("initial", &self.initial)
            .field("pending", &self.pending.len())
            .field("cfg", &self.cfg)
            .finish_non_exhaustive()
    }
}
