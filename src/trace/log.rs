//! # Trace log attached to a run target.
//!
//! A target opts into tracing by implementing [`Traceable`] and returning its
//! [`ActionTrace`]. Targets that don't care implement the trait with the default
//! body and nothing is recorded.
//!
//! ```rust
//! use actionflow::{ActionTrace, Traceable};
//!
//! #[derive(Default)]
//! struct Deployment {
//!     trace: ActionTrace,
//! }
//!
//! impl Traceable for Deployment {
//!     fn action_trace(&self) -> Option<&ActionTrace> {
//!         Some(&self.trace)
//!     }
//! }
//!
//! struct Silent;
//! impl Traceable for Silent {}
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::trace::{TraceEntry, TraceEvent};

/// Ordered, append-only record of lifecycle events.
#[derive(Default)]
pub struct ActionTrace {
    entries: Mutex<Vec<TraceEntry>>,
}

impl ActionTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, identifier: impl Into<Arc<str>>) {
        self.push(TraceEntry::new(TraceEvent::Begin, identifier));
    }

    pub fn end(&self, identifier: impl Into<Arc<str>>) {
        self.push(TraceEntry::new(TraceEvent::End, identifier));
    }

    pub fn unexpected_end(&self, identifier: impl Into<Arc<str>>, error: impl Into<Arc<str>>) {
        self.push(TraceEntry::new(TraceEvent::UnexpectedEnd, identifier).with_error(error));
    }

    /// Appends a prepared entry.
    pub fn push(&self, entry: TraceEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    /// Snapshot of all entries in append order.
    pub fn entries(&self) -> Vec<TraceEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `(event, identifier)` pairs, handy for assertions and logging.
    pub fn events(&self) -> Vec<(TraceEvent, String)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|e| (e.event, e.identifier.to_string()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl fmt::Debug for ActionTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionTrace").field("len", &self.len()).finish()
    }
}

/// Implemented by run targets; returns the trace to record into, if any.
pub trait Traceable {
    fn action_trace(&self) -> Option<&ActionTrace> {
        None
    }
}

impl Traceable for () {}

impl Traceable for ActionTrace {
    fn action_trace(&self) -> Option<&ActionTrace> {
        Some(self)
    }
}

impl<U: Traceable + ?Sized> Traceable for Arc<U> {
    fn action_trace(&self) -> Option<&ActionTrace> {
        (**self).action_trace()
    }
}

impl<U: Traceable + ?Sized> Traceable for &U {
    fn action_trace(&self) -> Option<&ActionTrace> {
        (**self).action_trace()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let trace = ActionTrace::new();
        trace.begin("Sequence (1)");
        trace.unexpected_end("Wave (1)", "boom");
        trace.end("Sequence (1)");

        assert_eq!(
            trace.events(),
            vec![
                (TraceEvent::Begin, "Sequence (1)".to_string()),
                (TraceEvent::UnexpectedEnd, "Wave (1)".to_string()),
                (TraceEvent::End, "Sequence (1)".to_string()),
            ]
        );
        let entries = trace.entries();
        assert_eq!(entries[1].error.as_deref(), Some("boom"));
        assert!(entries.windows(2).all(|w| w[0].seq < w[1].seq));

        trace.clear();
        assert!(trace.is_empty());
    }

    #[test]
    fn test_opt_in() {
        assert!(().action_trace().is_none());
        let shared = Arc::new(ActionTrace::new());
        assert!(shared.action_trace().is_some());
    }
}
