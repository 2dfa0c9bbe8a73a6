//! Tag constructors: one builder function per node kind.
//!
//! Each constructor takes width, height, and a prop list, and returns a
//! [`Fragment`] that appends the built node to the enclosing parent.

use crate::component::Tag;
use crate::geometry::{Measure, WRAP};

use super::fragment::{node, Fragment, Prop};

macro_rules! tag_constructor {
    ($(#[$doc:meta])* $name:ident => $tag:expr) => {
        $(#[$doc])*
        pub fn $name(
            width: impl Into<Measure>,
            height: impl Into<Measure>,
            props: Vec<Prop>,
        ) -> Fragment {
            node($tag, width.into(), height.into(), props)
        }
    };
}

// Containers.
tag_constructor!(
    /// A horizontal container.
    row => Tag::Row
);
tag_constructor!(
    /// A vertical container.
    column => Tag::Column
);
tag_constructor!(
    /// A container whose children overlap.
    stack => Tag::Stack
);
tag_constructor!(
    /// A scrolling container.
    scrollable => Tag::Scrollable
);
tag_constructor!(
    /// A grid container.
    grid => Tag::Grid
);
tag_constructor!(
    /// A container pinned to the viewport.
    fixed => Tag::Fixed
);

// Inputs.
tag_constructor!(
    /// A pressable button.
    button => Tag::Button
);
tag_constructor!(
    /// A free-text input.
    input => Tag::Input
);
tag_constructor!(
    /// A numeric input.
    number => Tag::Number
);
tag_constructor!(
    /// A dropdown select.
    select => Tag::Select
);
tag_constructor!(
    /// A multi-line text input.
    textarea => Tag::Textarea
);
tag_constructor!(
    /// A date/time input.
    date => Tag::Date
);

// Text and media.
tag_constructor!(
    /// A text leaf. Must carry text.
    text => Tag::Text
);
tag_constructor!(
    /// An image.
    image => Tag::Image
);
tag_constructor!(
    /// A drawing surface.
    canvas => Tag::Canvas
);
tag_constructor!(
    /// A progress indicator.
    progress => Tag::Progress
);
tag_constructor!(
    /// A navigational link.
    anchor => Tag::Anchor
);

/// A select option. Always wraps its content.
pub fn option(props: Vec<Prop>) -> Fragment {
    node(Tag::Option, WRAP, WRAP, props)
}

/// A checkbox. Always wraps its content.
pub fn checkbox(props: Vec<Prop>) -> Fragment {
    node(Tag::Checkbox, WRAP, WRAP, props)
}

// ===========================================================================
// Tests
// ===========================================================================
