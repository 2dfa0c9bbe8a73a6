//! Contextual tutorial overlay with region hit-testing.
//!
//! Each tutorial [`step`] wraps an interactive node. When the step's
//! rectangle is reported by a resize event — and layout has settled, the
//! step is not already completed, and no other step holds the highlight —
//! the step activates: its rectangle is converted to viewport-edge
//! coordinates and stored in `global.tutorial.active` along with its
//! explanatory text. The [`tutorial`] overlay renders four dismissible
//! scrim regions around the highlight; dismissing any of them (or clicking
//! the step itself) marks the step completed and clears the highlight.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::build::{
    align, background, button, clickable, color, id, observe, on_click, on_init, on_resize,
    padding, position, regular, stack, text, Fragment, Prop,
};
use crate::component::Alignment;
use crate::expr::{
    add, and, bind, block, condition, declare, eq, fallback, gte, lit, lt, not, obj, or, set, sub,
    timeout, Expr,
};
use crate::geometry::{Edges, Measure, MATCH, WRAP};
use crate::props;

/// Settle delay before geometry capture is trusted, in milliseconds.
/// Matches the entry-animation length so rectangles are measured at rest.
const TUTORIAL_SETTLE_MS: i64 = 600;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// The highlight rectangle in viewport-edge coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeRect {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// The currently highlighted step, or the empty record when inactive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveStep {
    pub name: String,
    pub position: EdgeRect,
    pub text: String,
}

/// The `global.tutorial` slice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TutorialState {
    pub active: ActiveStep,
    pub completed: std::collections::BTreeMap<String, bool>,
    #[serde(rename = "isReady")]
    pub is_ready: bool,
}

/// The default `global.tutorial` value: inactive, nothing completed,
/// geometry capture gated off.
pub fn empty_tutorial() -> Value {
    json!({
        "active": {
            "name": "",
            "position": { "top": 0, "right": 0, "bottom": 0, "left": 0 },
            "text": "",
        },
        "completed": {},
        "isReady": false,
    })
}

/// `global.tutorial`, defaulting to [`empty_tutorial`].
fn tutorial_or_empty() -> Expr {
    fallback(Expr::global().key("tutorial"), Expr::from(empty_tutorial()))
}

fn tutorial_bind() -> Expr {
    bind("tutorial")
}

/// The cleared `active` record.
fn inactive_record() -> Expr {
    Expr::from(json!({
        "name": "",
        "position": { "top": 0, "right": 0, "bottom": 0, "left": 0 },
        "text": "",
    }))
}

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// Configuration for one tutorial [`step`].
pub struct StepConfig {
    pub width: Measure,
    pub height: Measure,
    /// The step's unique name, used as its key in `completed`.
    pub name: String,
    /// Explanatory text shown on the overlay while this step is active.
    pub text: String,
    /// The step's own content.
    pub children: Vec<Prop>,
    /// Continuation run after the step is completed by a direct click.
    pub on_click: Expr,
    /// Activation predicate, evaluated against the resize event.
    pub condition: Expr,
}

/// Wrap an interactive node in tutorial-step behavior.
pub fn step(config: StepConfig) -> Fragment {
    let StepConfig {
        width,
        height,
        name,
        text: step_text,
        children,
        on_click: click_continuation,
        condition: activation,
    } = config;

    let mut step_props = props![
        on_init(init_program()),
        // Once layout has settled, ask the platform to (re)measure this
        // node so onResize fires with a trustworthy rectangle.
        observe(declare(
            [("tutorial", tutorial_or_empty())],
            [condition(
                tutorial_bind().key("isReady"),
                set(Expr::event().key("resize"), lit(true)),
            )
            .end()],
        )),
        on_resize(resize_program(&name, &step_text, activation)),
        on_click(click_program(&name, click_continuation)),
    ];
    step_props.extend(children);

    button(width, height, step_props)
}

/// Gate geometry capture off, then back on once the settle delay elapses.
fn init_program() -> Expr {
    declare(
        [("tutorial", tutorial_or_empty())],
        [
            set(tutorial_bind().key("isReady"), lit(false)),
            set(Expr::global().key("tutorial"), tutorial_bind()),
            timeout(
                lit(TUTORIAL_SETTLE_MS),
                [declare(
                    [("live", tutorial_or_empty())],
                    [
                        set(bind("live").key("isReady"), lit(true)),
                        set(Expr::global().key("tutorial"), bind("live")),
                    ],
                )],
            ),
        ],
    )
}

/// Activate the highlight when every gate holds.
fn resize_program(name: &str, step_text: &str, activation: Expr) -> Expr {
    let active = tutorial_bind().key("active");
    declare(
        [("tutorial", tutorial_or_empty())],
        [condition(
            and(
                and(
                    and(
                        // Layout has settled.
                        tutorial_bind().key("isReady"),
                        // Not already done.
                        not(tutorial_bind().key("completed").key(name)),
                    ),
                    // Nothing else holds the highlight, or this step
                    // already does (idempotent re-activation).
                    or_active_is(name, active.clone()),
                ),
                // The step's own predicate agrees.
                activation,
            ),
            block([
                set(
                    active,
                    obj([
                        ("name", lit(name)),
                        (
                            "position",
                            obj([
                                ("top", Expr::event().key("y")),
                                (
                                    "right",
                                    sub(
                                        Expr::global().key("width"),
                                        add(Expr::event().key("x"), Expr::event().key("width")),
                                    ),
                                ),
                                (
                                    "bottom",
                                    sub(
                                        Expr::global().key("height"),
                                        add(Expr::event().key("y"), Expr::event().key("height")),
                                    ),
                                ),
                                ("left", Expr::event().key("x")),
                            ]),
                        ),
                        ("text", lit(step_text)),
                    ]),
                ),
                set(Expr::global().key("tutorial"), tutorial_bind()),
            ]),
        )
        .end()],
    )
}

fn or_active_is(name: &str, active: Expr) -> Expr {
    or(
        eq(active.clone().key("name"), lit("")),
        eq(active.key("name"), lit(name)),
    )
}

/// Complete the step and hand off to the caller's continuation.
fn click_program(name: &str, continuation: Expr) -> Expr {
    declare(
        [("tutorial", tutorial_or_empty())],
        [
            set(tutorial_bind().key("completed").key(name), lit(true)),
            set(tutorial_bind().key("active"), inactive_record()),
            set(Expr::global().key("tutorial"), tutorial_bind()),
            continuation,
        ],
    )
}

// ---------------------------------------------------------------------------
// Overlay
// ---------------------------------------------------------------------------

/// Complete whichever step currently holds the highlight.
fn dismiss_program() -> Expr {
    declare(
        [("tutorial", tutorial_or_empty())],
        [
            set(
                tutorial_bind()
                    .key("completed")
                    .index(tutorial_bind().key("active").key("name")),
                lit(true),
            ),
            set(tutorial_bind().key("active"), inactive_record()),
            set(Expr::global().key("tutorial"), tutorial_bind()),
        ],
    )
}

#[derive(Clone, Copy)]
enum Scrim {
    Top,
    Right,
    Bottom,
    Left,
}

/// One dismissible scrim region, positioned against the active highlight.
///
/// The top and bottom scrims also carry the explanatory text, shown on
/// whichever of the two is larger (`top >= bottom` puts it on top) —
/// mutually exclusive by construction.
fn scrim(side: Scrim) -> Fragment {
    let active = || tutorial_bind().key("active").key("position");
    let geometry = match side {
        Scrim::Top => obj([
            ("top", lit(0)),
            ("right", lit(0)),
            (
                "bottom",
                sub(Expr::global().key("height"), active().key("top")),
            ),
            ("left", lit(0)),
        ]),
        Scrim::Right => obj([
            ("top", active().key("top")),
            ("right", lit(0)),
            ("bottom", active().key("bottom")),
            (
                "left",
                sub(Expr::global().key("width"), active().key("right")),
            ),
        ]),
        Scrim::Bottom => obj([
            (
                "top",
                sub(Expr::global().key("height"), active().key("bottom")),
            ),
            ("right", lit(0)),
            ("bottom", lit(0)),
            ("left", lit(0)),
        ]),
        Scrim::Left => obj([
            ("top", active().key("top")),
            (
                "right",
                sub(Expr::global().key("width"), active().key("left")),
            ),
            ("bottom", active().key("bottom")),
            ("left", lit(0)),
        ]),
    };

    let caption = |visible_when: Expr, anchor: Edges<f64>| {
        text(
            MATCH,
            WRAP,
            props![
                align(Alignment::Center),
                color("white"),
                regular(16.0),
                padding(16.0),
                position(anchor),
                observe(declare(
                    [("tutorial", tutorial_or_empty())],
                    [
                        set(Expr::event().key("visible"), visible_when),
                        set(
                            Expr::event().key("text"),
                            tutorial_bind().key("active").key("text"),
                        ),
                    ],
                )),
            ],
        )
    };

    let mut scrim_props = props![
        on_click(dismiss_program()),
        clickable(true),
        background("rgba(0, 0, 0, .7)"),
        observe(declare(
            [("tutorial", tutorial_or_empty())],
            [set(Expr::event().key("position"), geometry)],
        )),
    ];

    match side {
        Scrim::Top => scrim_props.push(Prop::from(caption(
            gte(active().key("top"), active().key("bottom")),
            Edges::none().left(0.0).bottom(0.0),
        ))),
        Scrim::Bottom => scrim_props.push(Prop::from(caption(
            lt(active().key("top"), active().key("bottom")),
            Edges::none().top(0.0).left(0.0),
        ))),
        Scrim::Right | Scrim::Left => {}
    }

    stack(WRAP, WRAP, scrim_props)
}

/// The tutorial overlay: opacity gate, viewport capture, state reset, and
/// the four scrim regions.
pub fn tutorial() -> Fragment {
    stack(
        MATCH,
        MATCH,
        props![
            id("tutorial"),
            observe(declare(
                [("tutorial", tutorial_or_empty())],
                [condition(
                    and(
                        tutorial_bind().key("isReady"),
                        not(eq(tutorial_bind().key("active").key("name"), lit(""))),
                    ),
                    set(Expr::event().key("opacity"), lit(1)),
                )
                .otherwise(set(Expr::event().key("opacity"), lit(0)))],
            )),
            on_resize(block([
                set(Expr::global().key("width"), Expr::event().key("width")),
                set(Expr::global().key("height"), Expr::event().key("height")),
            ])),
            // Re-entering resets the gate and the highlight but keeps the
            // completion record.
            on_init(declare(
                [("tutorial", tutorial_or_empty())],
                [set(
                    Expr::global().key("tutorial"),
                    obj([
                        ("isReady", lit(false)),
                        ("active", inactive_record()),
                        ("completed", tutorial_bind().key("completed")),
                    ]),
                )],
            )),
            clickable(false),
            position(0.0),
            scrim(Scrim::Top),
            scrim(Scrim::Right),
            scrim(Scrim::Bottom),
            scrim(Scrim::Left),
        ],
    )
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::BuildContext;
    use crate::component::{EventKind, Tag};
    use pretty_assertions::assert_eq;

    fn build_step() -> crate::component::Component {
        let mut ctx = BuildContext::new(json!({}), json!({}));
        step(StepConfig {
            width: WRAP,
            height: WRAP,
            name: "first".into(),
            text: "Tap here".into(),
            children: props!["Go"],
            on_click: block([]),
            condition: lit(true),
        })
        .apply(&mut ctx);
        let (root, _) = ctx.finish();
        root.children()[0].clone()
    }

    #[test]
    fn empty_tutorial_deserializes_to_default_state() {
        let state: TutorialState = serde_json::from_value(empty_tutorial()).unwrap();
        assert_eq!(state, TutorialState::default());
        assert!(!state.is_ready);
        assert_eq!(state.active.name, "");
    }

    #[test]
    fn step_is_a_button_with_all_gates_bound() {
        let node = build_step();
        assert_eq!(node.name, Tag::Button);
        assert!(node.events.list(EventKind::Init).is_some());
        assert!(node.events.list(EventKind::Observe).is_some());
        assert!(node.events.list(EventKind::Resize).is_some());
        assert!(node.events.list(EventKind::Click).is_some());
        assert_eq!(node.text.as_deref(), Some("Go"));
    }

    #[test]
    fn tutorial_overlay_renders_four_scrims() {
        let mut ctx = BuildContext::new(json!({}), json!({}));
        tutorial().apply(&mut ctx);
        let (root, _) = ctx.finish();
        let node = &root.children()[0];
        assert_eq!(node.name, Tag::Stack);
        assert_eq!(node.clickable, Some(false));
        assert_eq!(node.children().len(), 4);
        for scrim in node.children() {
            assert_eq!(scrim.clickable, Some(true));
            assert!(scrim.events.list(EventKind::Click).is_some());
        }
        // Only the top and bottom scrims carry the caption.
        assert_eq!(node.children()[0].children().len(), 1);
        assert_eq!(node.children()[1].children().len(), 0);
        assert_eq!(node.children()[2].children().len(), 1);
        assert_eq!(node.children()[3].children().len(), 0);
    }
}
