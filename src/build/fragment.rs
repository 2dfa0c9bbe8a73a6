//! Fragment: the builder unit, and prop application.
//!
//! A [`Fragment`] is a deferred builder step. Tag constructors return
//! fragments that create a node; setters and registrars return fragments
//! that modify the current parent. Applying a sequence of props swaps the
//! context's parent to the node under construction for the duration of the
//! sequence and restores it afterwards, so sibling construction after a
//! nested call resumes against the original parent.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::component::{Component, Tag};
use crate::geometry::Measure;

use super::context::BuildContext;

// ---------------------------------------------------------------------------
// Fragment
// ---------------------------------------------------------------------------

/// One deferred builder step.
#[derive(Clone)]
pub struct Fragment(Rc<dyn Fn(&mut BuildContext)>);

impl Fragment {
    /// Wrap a builder closure.
    pub fn new(apply: impl Fn(&mut BuildContext) + 'static) -> Self {
        Self(Rc::new(apply))
    }

    /// Run this builder against the context.
    pub fn apply(&self, ctx: &mut BuildContext) {
        (self.0)(ctx);
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Fragment")
    }
}

/// Named sub-tree templates attached to a node, resolved at render time by
/// a data record's discriminator.
pub type AdapterMap = BTreeMap<String, Fragment>;

// ---------------------------------------------------------------------------
// Prop
// ---------------------------------------------------------------------------

/// One entry in a tag constructor's prop list: a bare string (sugar for the
/// node's text) or a nested builder.
#[derive(Debug, Clone)]
pub enum Prop {
    Text(String),
    Fragment(Fragment),
}

impl From<&str> for Prop {
    fn from(text: &str) -> Self {
        Prop::Text(text.to_owned())
    }
}

impl From<String> for Prop {
    fn from(text: String) -> Self {
        Prop::Text(text)
    }
}

impl From<Fragment> for Prop {
    fn from(fragment: Fragment) -> Self {
        Prop::Fragment(fragment)
    }
}

/// Build a prop list from mixed strings and fragments.
#[macro_export]
macro_rules! props {
    ($($prop:expr),* $(,)?) => {
        vec![$($crate::build::Prop::from($prop)),*]
    };
}

// ---------------------------------------------------------------------------
// Prop application
// ---------------------------------------------------------------------------

/// Apply `props` to a node under construction.
///
/// The context's parent is swapped to `component` for the duration and
/// restored afterwards — an explicit scoped save/restore.
pub(crate) fn apply_props(
    component: Component,
    props: &[Prop],
    ctx: &mut BuildContext,
) -> Component {
    let saved = std::mem::replace(&mut ctx.parent, component);
    for prop in props {
        match prop {
            Prop::Text(text) => ctx.parent.text = Some(text.clone()),
            Prop::Fragment(fragment) => fragment.apply(ctx),
        }
    }
    std::mem::replace(&mut ctx.parent, saved)
}

/// The shared tag-constructor shape: build a node, apply its props, append
/// it to the parent's ordered child list. The parent itself is returned to
/// the caller unchanged (builders compose by side-effecting the parent).
pub(crate) fn node(tag: Tag, width: Measure, height: Measure, props: Vec<Prop>) -> Fragment {
    Fragment::new(move |ctx| {
        let built = apply_props(Component::new(tag, width, height), &props, ctx);
        ctx.parent.push_child(built);
    })
}

// ---------------------------------------------------------------------------
// Composition helpers
// ---------------------------------------------------------------------------

/// Apply several props against the current parent without creating a node.
pub fn props(props: Vec<Prop>) -> Fragment {
    Fragment::new(move |ctx| {
        for prop in &props {
            match prop {
                Prop::Text(text) => ctx.parent.text = Some(text.clone()),
                Prop::Fragment(fragment) => fragment.apply(ctx),
            }
        }
    })
}

/// Defer a self-referencing template until it is actually applied.
///
/// `recursive(f)` behaves exactly like `f()` except that `f` runs at
/// application time, never at definition time — this is what breaks the
/// otherwise-infinite eager recursion of a template that references itself.
pub fn recursive(thunk: impl Fn() -> Fragment + 'static) -> Fragment {
    Fragment::new(move |ctx| thunk().apply(ctx))
}

/// Select between two builders based on an assembly-time feature flag in
/// the global state (`global.features` array).
pub fn feature(name: impl Into<String>, component: Fragment, fallback: Fragment) -> Fragment {
    let name = name.into();
    Fragment::new(move |ctx| {
        let enabled = ctx
            .global
            .get("features")
            .and_then(|features| features.as_array())
            .is_some_and(|features| features.iter().any(|f| f.as_str() == Some(&name)));
        if enabled {
            component.apply(ctx);
        } else {
            fallback.apply(ctx);
        }
    })
}

// ===========================================================================
// Tests
// ===========================================================================
