//! Headless testing: a tree index, a minimal synchronous interpreter, and
//! the dispatch-by-id harness.
//!
//! The harness stands in for a real platform: it builds a tree, runs the
//! init and update passes, dispatches events by node id, and replays
//! deferred work on a virtual clock so every timing-dependent behavior is
//! deterministic.

mod eval;
pub mod harness;
pub mod index;

pub use harness::Harness;
pub use index::{NodeEntry, NodeKey, TreeIndex};
