//! Typed property setters: one builder per scalar field.
//!
//! Each setter assigns exactly one field on the current parent and leaves
//! everything else untouched. Applying the same setter twice keeps the last
//! value (last writer wins).

use serde_json::Value;

use crate::component::{Alignment, Animation};
use crate::geometry::Measure;

use super::fragment::Fragment;

macro_rules! setter {
    ($(#[$doc:meta])* $name:ident: $ty:ty => $field:ident) => {
        $(#[$doc])*
        pub fn $name(value: $ty) -> Fragment {
            Fragment::new(move |ctx| {
                ctx.parent_mut().$field = Some(value.clone().into());
            })
        }
    };
}

macro_rules! string_setter {
    ($(#[$doc:meta])* $name:ident => $field:ident) => {
        $(#[$doc])*
        pub fn $name(value: impl Into<String>) -> Fragment {
            let value = value.into();
            Fragment::new(move |ctx| {
                ctx.parent_mut().$field = Some(value.clone());
            })
        }
    };
}

/// Overwrite the node's width.
pub fn width(value: impl Into<Measure>) -> Fragment {
    let value = value.into();
    Fragment::new(move |ctx| ctx.parent_mut().width = value)
}

/// Overwrite the node's height.
pub fn height(value: impl Into<Measure>) -> Fragment {
    let value = value.into();
    Fragment::new(move |ctx| ctx.parent_mut().height = value)
}

setter!(
    /// Show or hide the node.
    visible: bool => visible
);
setter!(
    /// Enable or disable event dispatch to the node.
    enabled: bool => enabled
);
setter!(
    /// Whether the node intercepts pointer events.
    clickable: bool => clickable
);
setter!(
    /// Clip children to the node's bounds.
    clip: bool => clip
);
setter!(
    /// Draw a drop shadow.
    shadow: bool => shadow
);
setter!(
    /// Let the node grow into leftover space.
    grow: bool => grow
);
setter!(
    /// Font size.
    size: f64 => size
);
setter!(
    /// Font weight.
    weight: f64 => weight
);
setter!(
    /// Node opacity, 0–1.
    opacity: f64 => opacity
);
setter!(
    /// Corner radius.
    round: f64 => round
);
setter!(
    /// Text alignment.
    align: Alignment => align
);
setter!(
    /// Main-axis child alignment.
    main_axis_alignment: Alignment => main_axis_alignment
);
setter!(
    /// Cross-axis child alignment.
    cross_axis_alignment: Alignment => cross_axis_alignment
);
setter!(
    /// The node's animation descriptor.
    animation: Animation => animation
);
setter!(
    /// The node's current input value.
    value: Value => value
);
setter!(
    /// Runtime data records for adapter instantiation.
    data: Value => data
);
setter!(
    /// Explicit ordering index.
    index: i64 => index
);

string_setter!(
    /// Background color.
    background => background
);
string_setter!(
    /// Foreground color.
    color => color
);
string_setter!(
    /// Media source.
    src => src
);
string_setter!(
    /// Accessible description for media.
    alt => alt
);
string_setter!(
    /// Input placeholder text.
    placeholder => placeholder
);

// ---------------------------------------------------------------------------
// Font helpers
// ---------------------------------------------------------------------------

fn font(weight: f64, size: f64) -> Fragment {
    Fragment::new(move |ctx| {
        let parent = ctx.parent_mut();
        parent.weight = Some(weight);
        parent.size = Some(size);
    })
}

/// Regular text (weight 400) at the given size.
pub fn regular(size: f64) -> Fragment {
    font(400.0, size)
}

/// Medium text (weight 500) at the given size.
pub fn medium(size: f64) -> Fragment {
    font(500.0, size)
}

/// Bold text (weight 700) at the given size.
pub fn bold(size: f64) -> Fragment {
    font(700.0, size)
}

// ===========================================================================
// Tests
// ===========================================================================
