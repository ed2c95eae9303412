//! # Run configuration.
//!
//! [`SequenceConfig`] controls how a [`Sequence`](crate::Sequence) executes:
//! wave execution mode, concurrency cap, failure policy, and whether a store
//! the sequence creates itself accepts re-exports.
//!
//! # Example
//! ```
//! use actionflow::{FailurePolicy, SequenceConfig, WaveExecution};
//!
//! let mut cfg = SequenceConfig::default();
//! cfg.execution = WaveExecution::Concurrent;
//! cfg.max_concurrent = 4;
//! cfg.failure_policy = FailurePolicy::Abort;
//!
//! assert_eq!(cfg.concurrency_limit(), Some(4));
//! ```

/// How the members of one wave are executed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WaveExecution {
    /// One after another, in registration order.
    #[default]
    Sequential,
    /// All members at once, bounded by [`SequenceConfig::max_concurrent`].
    Concurrent,
}

/// What happens to an ordinary (non-fatal) action failure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Record `UnexpectedEnd`, drop the action's exports, continue the run.
    #[default]
    Swallow,
    /// Treat every failure as fatal and abort the run.
    Abort,
}

/// Configuration of a single run.
#[derive(Clone, Debug)]
pub struct SequenceConfig {
    /// Wave execution mode.
    pub execution: WaveExecution,
    /// Maximum number of wave members running at once in concurrent mode (0 = unlimited).
    pub max_concurrent: usize,
    /// Handling of non-fatal action failures.
    pub failure_policy: FailurePolicy,
    /// Whether a store created by the sequence allows overwriting exports.
    pub allow_reexport: bool,
}

impl SequenceConfig {
    /// Returns the concurrency limit, or `None` when unlimited.
    #[inline]
    pub fn concurrency_limit(&self) -> Option<usize> {
        (self.max_concurrent > 0).then_some(self.max_concurrent)
    }

    /// Whether an ordinary failure should abort the run.
    #[inline]
    pub fn aborts_on_failure(&self) -> bool {
        matches!(self.failure_policy, FailurePolicy::Abort)
    }
}

impl Default for SequenceConfig {
    /// Provides a default configuration:
    /// - `execution = WaveExecution::Sequential`
    /// - `max_concurrent = 0` (unlimited)
    /// - `failure_policy = FailurePolicy::Swallow`
    /// - `allow_reexport = false`
    fn default() -> Self {
        Self {
            execution: WaveExecution::default(),
            max_concurrent: 0,
            failure_policy: FailurePolicy::default(),
            allow_reexport: false,
        }
    }
}
