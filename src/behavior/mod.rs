//! Behavior programs: function bundles and the built-in state machines.
//!
//! The three state machines — [`router`], [`toast`], [`tutorial`] — are
//! composed from the builder layer plus the expression algebra. Each is pure
//! data once built: the programs are installed as node-level event bindings
//! and named function bundles, and an external interpreter replays them with
//! identical semantics on every target platform.

pub mod router;
pub mod toast;
pub mod tutorial;

use serde::{Deserialize, Serialize};

use crate::build::{
    background, clickable, clip, id, observe, padding, position, round, scrollable, stack,
    Fragment,
};
use crate::expr::{lit, obj, set, Expr};
use crate::geometry::{Edges, MATCH, WRAP};
use crate::props;

// ---------------------------------------------------------------------------
// Function bundles
// ---------------------------------------------------------------------------

/// One named function in a bundle: parameters and a program body.
///
/// Arguments are bound positionally to `params` when the function is
/// invoked; the body's [`crate::expr::result`] value is what the invocation
/// yields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Expr>,
}

/// A named group of functions attached to a node via
/// [`crate::build::funcs`].
///
/// Members are invokable from any handler program as
/// `"<bundle>.<function>"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionBundle {
    pub name: String,
    pub functions: Vec<FunctionDef>,
}

impl FunctionBundle {
    /// Create an empty bundle.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
        }
    }

    /// Add a function (builder).
    pub fn function(
        mut self,
        name: impl Into<String>,
        params: impl IntoIterator<Item = &'static str>,
        body: impl IntoIterator<Item = Expr>,
    ) -> Self {
        self.functions.push(FunctionDef {
            name: name.into(),
            params: params.into_iter().map(str::to_owned).collect(),
            body: body.into_iter().collect(),
        });
        self
    }

    /// Look up a member by name.
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// The invocation target for a member: `"<bundle>.<name>"`.
    pub fn target(&self, name: &str) -> String {
        format!("{}.{name}", self.name)
    }
}

// ---------------------------------------------------------------------------
// Screen / modal chrome
// ---------------------------------------------------------------------------

/// A full-bleed screen wrapper for router adapters.
///
/// Binds the node's animation to the instantiating route's animation state
/// so entry/exit staging is driven entirely by the navigation stack.
pub fn screen(child: Fragment) -> Fragment {
    stack(
        MATCH,
        MATCH,
        props![
            id("screen"),
            clickable(true),
            clip(true),
            position(Edges::none().top(0.0).left(0.0)),
            observe(set(
                Expr::event().key("animation"),
                obj([
                    ("direction", Expr::local().key("animation").key("direction")),
                    ("name", lit("right")),
                    ("start", Expr::local().key("animation").key("start")),
                ]),
            )),
            child,
        ],
    )
}

/// A dimmed modal wrapper for router adapters: an opacity-animated scrim
/// with a white card.
pub fn modal(child: Fragment) -> Fragment {
    scrollable(
        MATCH,
        MATCH,
        props![
            id("modal"),
            clip(true),
            clickable(true),
            padding(16.0),
            position(Edges::none().top(0.0).left(0.0)),
            background("#000000aa"),
            observe(set(
                Expr::event().key("animation"),
                obj([
                    ("direction", Expr::local().key("animation").key("direction")),
                    ("name", lit("opacity")),
                    ("start", Expr::local().key("animation").key("start")),
                ]),
            )),
            stack(
                MATCH,
                WRAP,
                props![background("white"), round(4.0), child],
            ),
        ],
    )
}

// Re-exported so `props![...]` call sites can stay terse.
pub use router::{navigation, router, RouterConfig};
pub use toast::{push_toast, toaster};
pub use tutorial::{step, tutorial, StepConfig};

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{text, BuildContext};
    use crate::component::{EventKind, Tag};
    use crate::expr::lit;
    use crate::props;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    // ── FunctionBundle ───────────────────────────────────────────────

    #[test]
    fn bundle_builder_accumulates_functions() {
        let bundle = FunctionBundle::new("nav")
            .function("push", ["route"], [lit(1)])
            .function("pop", [], [lit(2)]);
        assert_eq!(bundle.functions.len(), 2);
        assert_eq!(bundle.get("push").unwrap().params, vec!["route"]);
        assert!(bundle.get("missing").is_none());
    }

    #[test]
    fn bundle_targets_are_qualified() {
        let bundle = FunctionBundle::new("nav");
        assert_eq!(bundle.target("push"), "nav.push");
    }

    #[test]
    fn bundles_serialize() {
        let bundle = FunctionBundle::new("nav").function("pop", [], []);
        let value = serde_json::to_value(&bundle).unwrap();
        assert_eq!(value["name"], json!("nav"));
        assert_eq!(value["functions"][0]["name"], json!("pop"));
    }

    // ── screen / modal ───────────────────────────────────────────────

    #[test]
    fn screen_wraps_child_in_animated_stack() {
        let mut ctx = BuildContext::new(json!({}), json!({}));
        screen(text(WRAP, WRAP, props!["content"])).apply(&mut ctx);
        let (root, _) = ctx.finish();
        let wrapper = &root.children()[0];
        assert_eq!(wrapper.name, Tag::Stack);
        assert_eq!(wrapper.id.as_deref(), Some("screen"));
        assert_eq!(wrapper.clickable, Some(true));
        assert!(wrapper.events.list(EventKind::Observe).is_some());
        assert_eq!(wrapper.children()[0].text.as_deref(), Some("content"));
    }

    #[test]
    fn modal_wraps_child_in_card() {
        let mut ctx = BuildContext::new(json!({}), json!({}));
        modal(text(WRAP, WRAP, props!["body"])).apply(&mut ctx);
        let (root, _) = ctx.finish();
        let wrapper = &root.children()[0];
        assert_eq!(wrapper.name, Tag::Scrollable);
        assert_eq!(wrapper.background.as_deref(), Some("#000000aa"));
        let card = &wrapper.children()[0];
        assert_eq!(card.background.as_deref(), Some("white"));
        assert_eq!(card.children()[0].text.as_deref(), Some("body"));
    }
}
