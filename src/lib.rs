//! # plait
//!
//! A serializable, platform-agnostic UI component tree assembled from small
//! composable builder functions, with client-side behaviors — stack-based
//! route navigation, a single-flight toast queue, and a contextual tutorial
//! overlay — expressed as pure data-flow programs that a platform
//! interpreter replays with identical semantics everywhere.
//!
//! ## Core Systems
//!
//! - **[`geometry`]** — Measure (MATCH/WRAP sentinels), Rect, Edges, Border
//! - **[`component`]** — The closed node record: Tag, Animation, Events
//! - **[`expr`]** — The expression algebra: behavior programs as data
//! - **[`build`]** — Builder combinators: tags, setters, box shorthand,
//!   event registration, adapters, recursive templates
//! - **[`behavior`]** — Function bundles and the built-in state machines:
//!   router, toast, tutorial
//! - **[`capability`]** — Inert platform-capability call constructors
//! - **[`output`]** — Byte-sink file output
//! - **[`testing`]** — Headless harness with a virtual clock
//! - **[`diag`]** — Soft warn-and-continue diagnostics

pub mod behavior;
pub mod build;
pub mod capability;
pub mod component;
pub mod diag;
pub mod expr;
pub mod geometry;
pub mod output;
pub mod testing;

pub use geometry::{MATCH, WRAP};
