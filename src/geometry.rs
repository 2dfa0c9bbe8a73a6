//! Core geometry types: Measure, Rect, Edges, Border.
//!
//! These are the foundational value types used throughout plait for sizing
//! nodes, describing event rectangles, and carrying per-edge box properties.

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Measure
// ---------------------------------------------------------------------------

/// Fill the parent dimension. Shorthand for [`Measure::Match`].
pub const MATCH: Measure = Measure::Match;

/// Size to content. Shorthand for [`Measure::Wrap`].
pub const WRAP: Measure = Measure::Wrap;

/// A width or height: a concrete unit count or one of the two layout
/// sentinels.
///
/// The sentinels are distinct from any concrete size: `Match` fills the
/// parent dimension, `Wrap` sizes to content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measure {
    /// Fill the parent dimension.
    Match,
    /// Size to content.
    Wrap,
    /// A concrete measurement in platform units.
    Units(f64),
}

impl Measure {
    /// Whether this measure is one of the two layout sentinels.
    pub fn is_sentinel(self) -> bool {
        matches!(self, Measure::Match | Measure::Wrap)
    }
}

impl From<f64> for Measure {
    fn from(value: f64) -> Self {
        Measure::Units(value)
    }
}

impl From<i32> for Measure {
    fn from(value: i32) -> Self {
        Measure::Units(value as f64)
    }
}

// Sentinels serialize as strings, concrete sizes as bare numbers, so the
// tree stays readable to platform interpreters.
impl Serialize for Measure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Measure::Match => serializer.serialize_str("match"),
            Measure::Wrap => serializer.serialize_str("wrap"),
            Measure::Units(value) => serializer.serialize_f64(*value),
        }
    }
}

impl<'de> Deserialize<'de> for Measure {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MeasureVisitor;

        impl Visitor<'_> for MeasureVisitor {
            type Value = Measure;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("\"match\", \"wrap\", or a number")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Measure, E> {
                match value {
                    "match" => Ok(Measure::Match),
                    "wrap" => Ok(Measure::Wrap),
                    other => Err(E::custom(format!("unknown measure: {other}"))),
                }
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<Measure, E> {
                Ok(Measure::Units(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Measure, E> {
                Ok(Measure::Units(value as f64))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Measure, E> {
                Ok(Measure::Units(value as f64))
            }
        }

        deserializer.deserialize_any(MeasureVisitor)
    }
}

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// A rectangle in viewport coordinates, as delivered by resize events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rect.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// The right edge: `x + width`.
    pub fn right(self) -> f64 {
        self.x + self.width
    }

    /// The bottom edge: `y + height`.
    pub fn bottom(self) -> f64 {
        self.y + self.height
    }
}

// ---------------------------------------------------------------------------
// Edges
// ---------------------------------------------------------------------------

/// A per-edge record (top, right, bottom, left), each side optional.
///
/// Box properties on a node carry a full record after shorthand
/// normalization; a partial record supplied by the caller passes through
/// unchanged, so absent sides stay absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<T>,
}

impl<T> Edges<T> {
    /// A record with no sides set.
    pub fn none() -> Self {
        Self { top: None, right: None, bottom: None, left: None }
    }

    /// A full record with explicit values for all four sides.
    pub fn new(top: T, right: T, bottom: T, left: T) -> Self {
        Self {
            top: Some(top),
            right: Some(right),
            bottom: Some(bottom),
            left: Some(left),
        }
    }

    /// Set the top side (builder).
    pub fn top(mut self, value: T) -> Self {
        self.top = Some(value);
        self
    }

    /// Set the right side (builder).
    pub fn right(mut self, value: T) -> Self {
        self.right = Some(value);
        self
    }

    /// Set the bottom side (builder).
    pub fn bottom(mut self, value: T) -> Self {
        self.bottom = Some(value);
        self
    }

    /// Set the left side (builder).
    pub fn left(mut self, value: T) -> Self {
        self.left = Some(value);
        self
    }

    /// Whether any of the four sides is absent.
    pub fn is_partial(&self) -> bool {
        !(self.top.is_some() && self.right.is_some() && self.bottom.is_some() && self.left.is_some())
    }
}

impl<T: Clone> Edges<T> {
    /// All four sides set to the same value.
    pub fn all(value: T) -> Self {
        Self::new(value.clone(), value.clone(), value.clone(), value)
    }

    /// Symmetric record: `vertical` for top/bottom, `horizontal` for
    /// left/right (the CSS two-value convention).
    pub fn symmetric(vertical: T, horizontal: T) -> Self {
        Self::new(vertical.clone(), horizontal.clone(), vertical, horizontal)
    }
}

// ---------------------------------------------------------------------------
// Border
// ---------------------------------------------------------------------------

/// A border line style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    Solid,
    Dashed,
}

/// One border edge: width, line style, color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub width: f64,
    pub style: BorderStyle,
    pub color: String,
}

impl Border {
    /// Create a solid border.
    pub fn solid(width: f64, color: impl Into<String>) -> Self {
        Self { width, style: BorderStyle::Solid, color: color.into() }
    }

    /// Create a dashed border.
    pub fn dashed(width: f64, color: impl Into<String>) -> Self {
        Self { width, style: BorderStyle::Dashed, color: color.into() }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
