//! Runtime core: scheduling and execution.
//!
//! Public API from this module is [`Sequence`] (the scheduler), its
//! [`SequenceOutcome`], and the [`SequenceFactory`]/[`SequenceBuilder`] that
//! create it.
//!
//! Internal modules:
//! - [`sequence`]: selects waves, activates members, classifies the outcome;
//! - [`wave`]: runs the members of one wave sequentially or concurrently;
//! - [`runner`]: executes one member with trace, commit and release;
//! - [`item`]: activated instance with guaranteed release;
//! - [`builder`]: factory and builder for sequences.

mod builder;
mod item;
mod runner;
mod sequence;
mod wave;

pub use builder::{SequenceBuilder, SequenceFactory};
pub use sequence::{Sequence, SequenceOutcome};
