//! The combinator layer: builders that assemble the component tree.
//!
//! Builders are [`Fragment`]s — closures applied against a [`BuildContext`]
//! that carries the current parent node, the application state, and the
//! session-scoped id registry. Tag constructors create one node per call and
//! append it to the enclosing parent's child list; property setters,
//! box-shorthand normalizers, and event registrars side-effect the current
//! parent and leave it in place, so builders compose by nesting.

mod boxmodel;
mod context;
mod events;
mod fragment;
mod setters;
mod tags;

pub use boxmodel::{border, margin, padding, position, BoxShorthand};
pub use context::{BuildContext, IdRegistry};
pub use events::{
    adapters, bind_value, funcs, id, observe, on_back, on_change, on_click, on_enter, on_init,
    on_resize,
};
pub use fragment::{feature, props, recursive, AdapterMap, Fragment, Prop};
pub use setters::{
    align, alt, animation, background, bold, clickable, clip, color, cross_axis_alignment, data,
    enabled, grow, height, index, main_axis_alignment, medium, opacity, placeholder, regular,
    round, shadow, size, src, value, visible, weight, width,
};
pub use tags::{
    anchor, button, canvas, checkbox, column, date, fixed, grid, image, input, number, option,
    progress, row, scrollable, select, stack, text, textarea,
};
