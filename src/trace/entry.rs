//! # Trace entries.
//!
//! One [`TraceEntry`] is appended per lifecycle step of a run, a wave or a single
//! action. Identifiers follow the display form of the traced unit:
//!
//! | Unit     | Identifier            |
//! |----------|-----------------------|
//! | run      | `Sequence (N)`        |
//! | wave     | `Wave (M)`            |
//! | action   | `name` / `name(desc)` |
//!
//! ## Ordering guarantees
//! `seq` is drawn from one process-wide counter and increases monotonically, so
//! entries from concurrently running wave members can always be put back in order.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

static TRACE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Lifecycle step recorded in a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// The unit started.
    Begin,
    /// The unit finished normally.
    End,
    /// The unit finished with an error (`error` is set).
    UnexpectedEnd,
}

impl TraceEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            TraceEvent::Begin => "begin",
            TraceEvent::End => "end",
            TraceEvent::UnexpectedEnd => "unexpected_end",
        }
    }
}

/// One recorded lifecycle step.
#[derive(Debug, Clone)]
pub struct TraceEntry {
    /// Monotonic sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Lifecycle step.
    pub event: TraceEvent,
    /// Display identifier of the traced unit.
    pub identifier: Arc<str>,
    /// Error message, for [`TraceEvent::UnexpectedEnd`].
    pub error: Option<Arc<str>>,
}

impl TraceEntry {
    /// Creates an entry stamped with the current time and next sequence number.
    pub fn new(event: TraceEvent, identifier: impl Into<Arc<str>>) -> Self {
        Self {
            seq: TRACE_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            event,
            identifier: identifier.into(),
            error: None,
        }
    }

    #[inline]
    pub fn with_error(mut self, error: impl Into<Arc<str>>) -> Self {
        self.error = Some(error.into());
        self
    }

    #[inline]
    pub fn is_unexpected(&self) -> bool {
        matches!(self.event, TraceEvent::UnexpectedEnd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = TraceEntry::new(TraceEvent::Begin, "x");
        let b = TraceEntry::new(TraceEvent::End, "x");
        assert!(b.seq > a.seq);
        assert!(b.at >= a.at);
    }

    #[test]
    fn test_error_marks_entry() {
        let e = TraceEntry::new(TraceEvent::UnexpectedEnd, "Wave (1)").with_error("boom");
        assert!(e.is_unexpected());
        assert_eq!(e.error.as_deref(), Some("boom"));
        assert_eq!(e.event.as_str(), "unexpected_end");
    }
}
