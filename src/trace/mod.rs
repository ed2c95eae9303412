//! # Trace log.
//!
//! Data-level record of what a run did, owned by the run target. Independent of
//! `tracing` diagnostics, which go to whatever subscriber the host installs.

mod entry;
mod log;

pub use entry::{TraceEntry, TraceEvent};
pub use self::log::{ActionTrace, Traceable};
