//! Box-shorthand normalization: margin, padding, border, position.
//!
//! Callers may supply a single value (fanned out to all four edges), a
//! `[vertical, horizontal]` pair, a `[top, right, bottom, left]` quad in
//! CSS clockwise order, or a partial edge record that passes through
//! unchanged. Any other shape — a list of three values, say — is silently
//! ignored and the property is left unset.

use crate::component::Component;
use crate::geometry::{Border, Edges};

use super::fragment::Fragment;

// ---------------------------------------------------------------------------
// BoxShorthand
// ---------------------------------------------------------------------------

/// A box-property input before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum BoxShorthand<T> {
    /// A single value for all four edges.
    Value(T),
    /// A value list: 1, 2, or 4 entries are meaningful, anything else is a
    /// no-op.
    List(Vec<T>),
    /// An edge record, possibly partial; passes through unchanged.
    Edges(Edges<T>),
}

impl<T: Clone> BoxShorthand<T> {
    /// Expand into a full edge record, or `None` for unrecognized shapes.
    pub fn normalize(&self) -> Option<Edges<T>> {
        match self {
            BoxShorthand::Value(v) => Some(Edges::all(v.clone())),
            BoxShorthand::List(list) => match list.as_slice() {
                [v] => Some(Edges::all(v.clone())),
                [vertical, horizontal] => {
                    Some(Edges::symmetric(vertical.clone(), horizontal.clone()))
                }
                [top, right, bottom, left] => Some(Edges::new(
                    top.clone(),
                    right.clone(),
                    bottom.clone(),
                    left.clone(),
                )),
                _ => None,
            },
            BoxShorthand::Edges(edges) => Some(edges.clone()),
        }
    }
}

impl<T> From<T> for BoxShorthand<T> {
    fn from(value: T) -> Self {
        BoxShorthand::Value(value)
    }
}

impl<T> From<[T; 2]> for BoxShorthand<T> {
    fn from(pair: [T; 2]) -> Self {
        BoxShorthand::List(pair.into_iter().collect())
    }
}

impl<T> From<[T; 4]> for BoxShorthand<T> {
    fn from(quad: [T; 4]) -> Self {
        BoxShorthand::List(quad.into_iter().collect())
    }
}

impl<T> From<Vec<T>> for BoxShorthand<T> {
    fn from(list: Vec<T>) -> Self {
        BoxShorthand::List(list)
    }
}

impl<T> From<Edges<T>> for BoxShorthand<T> {
    fn from(edges: Edges<T>) -> Self {
        BoxShorthand::Edges(edges)
    }
}

// ---------------------------------------------------------------------------
// Box property builders
// ---------------------------------------------------------------------------

fn box_prop<T: Clone + 'static>(
    input: BoxShorthand<T>,
    assign: impl Fn(&mut Component, Edges<T>) + 'static,
) -> Fragment {
    Fragment::new(move |ctx| {
        if let Some(edges) = input.normalize() {
            assign(ctx.parent_mut(), edges);
        }
    })
}

/// Set the node's margin.
pub fn margin(input: impl Into<BoxShorthand<f64>>) -> Fragment {
    box_prop(input.into(), |component, edges| component.margin = Some(edges))
}

/// Set the node's padding.
pub fn padding(input: impl Into<BoxShorthand<f64>>) -> Fragment {
    box_prop(input.into(), |component, edges| component.padding = Some(edges))
}

/// Set the node's position offsets.
pub fn position(input: impl Into<BoxShorthand<f64>>) -> Fragment {
    box_prop(input.into(), |component, edges| component.position = Some(edges))
}

/// Set the node's border edges.
pub fn border(input: impl Into<BoxShorthand<Border>>) -> Fragment {
    box_prop(input.into(), |component, edges| component.border = Some(edges))
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::BuildContext;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn ctx() -> BuildContext {
        BuildContext::new(json!({}), json!({}))
    }

    // ── Normalization laws ───────────────────────────────────────────

    #[test]
    fn single_value_fans_out_to_all_edges() {
        let edges = BoxShorthand::Value(8.0).normalize().unwrap();
        assert_eq!(edges, Edges::new(8.0, 8.0, 8.0, 8.0));
    }

    #[test]
    fn one_element_list_fans_out() {
        let edges = BoxShorthand::List(vec![3.0]).normalize().unwrap();
        assert_eq!(edges, Edges::new(3.0, 3.0, 3.0, 3.0));
    }

    #[test]
    fn pair_is_vertical_then_horizontal() {
        let edges = BoxShorthand::List(vec![1.0, 2.0]).normalize().unwrap();
        assert_eq!(edges, Edges::new(1.0, 2.0, 1.0, 2.0));
    }

    #[test]
    fn quad_is_css_clockwise() {
        let edges = BoxShorthand::List(vec![1.0, 2.0, 3.0, 4.0]).normalize().unwrap();
        assert_eq!(edges, Edges::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn partial_record_passes_through_without_fan_out() {
        let partial = Edges::none().top(1.0).left(4.0);
        let edges = BoxShorthand::Edges(partial).normalize().unwrap();
        assert_eq!(edges, partial);
        assert!(edges.is_partial());
    }

    #[test]
    fn unrecognized_shapes_normalize_to_none() {
        assert_eq!(BoxShorthand::List(Vec::<f64>::new()).normalize(), None);
        assert_eq!(BoxShorthand::List(vec![1.0, 2.0, 3.0]).normalize(), None);
        assert_eq!(BoxShorthand::List(vec![1.0; 5]).normalize(), None);
    }

    // ── Builders ─────────────────────────────────────────────────────

    #[test]
    fn margin_from_scalar() {
        let mut ctx = ctx();
        margin(16.0).apply(&mut ctx);
        let (root, _) = ctx.finish();
        assert_eq!(root.margin, Some(Edges::all(16.0)));
    }

    #[test]
    fn padding_from_quad() {
        let mut ctx = ctx();
        padding([1.0, 2.0, 3.0, 4.0]).apply(&mut ctx);
        let (root, _) = ctx.finish();
        assert_eq!(root.padding, Some(Edges::new(1.0, 2.0, 3.0, 4.0)));
    }

    #[test]
    fn position_partial_record() {
        let mut ctx = ctx();
        position(Edges::none().top(0.0).left(0.0)).apply(&mut ctx);
        let (root, _) = ctx.finish();
        let position = root.position.unwrap();
        assert_eq!(position.top, Some(0.0));
        assert_eq!(position.bottom, None);
    }

    #[test]
    fn malformed_shorthand_leaves_property_unset() {
        let mut ctx = ctx();
        margin(vec![1.0, 2.0, 3.0]).apply(&mut ctx);
        let (root, _) = ctx.finish();
        assert_eq!(root.margin, None);
    }

    #[test]
    fn border_from_single_edge_value() {
        let mut ctx = ctx();
        border(Border::solid(1.0, "#000")).apply(&mut ctx);
        let (root, _) = ctx.finish();
        let edges = root.border.unwrap();
        assert_eq!(edges.top, Some(Border::solid(1.0, "#000")));
        assert_eq!(edges.left, Some(Border::solid(1.0, "#000")));
    }
}
