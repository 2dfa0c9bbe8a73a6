//! Stack-based route navigation with exit-animation staging.
//!
//! The navigation stack lives in `global.routes`, ordered oldest first; the
//! top of the stack is the last element and is marked `direction: "in"`.
//! Pushing appends an "in"-marked route; going back re-marks the active
//! route "out", lets the exit animation play for a platform-dependent
//! settle delay, then truncates the stack to everything strictly below the
//! active route.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::build::{adapters, funcs, id, observe, on_back, on_init, stack, Fragment};
use crate::component::Animation;
use crate::expr::{
    and, arr, bind, block, concat, condition, declare, eq, fallback, for_each, gen_id, gt, invoke,
    lit, now, obj, result, set, slice, timeout, Expr,
};
use crate::geometry::MATCH;
use crate::props;

/// Settle delay before a dismissed route is dropped, in milliseconds.
/// iOS stages its own exit animation, so it gets no delay.
const BACK_SETTLE_MS: i64 = 300;

// ---------------------------------------------------------------------------
// Route
// ---------------------------------------------------------------------------

/// One entry in the navigation stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: String,
    pub adapter: String,
    pub animation: Animation,
}

/// The expression for a fresh "in"-marked route record whose id and adapter
/// both come from `route`.
fn route_record(route: Expr) -> Expr {
    obj([
        ("id", route.clone()),
        ("adapter", route),
        (
            "animation",
            obj([
                ("start", now()),
                ("direction", lit("in")),
                ("name", lit("right")),
            ]),
        ),
    ])
}

/// `global.routes`, defaulting to an empty stack.
fn routes_or_empty() -> Expr {
    fallback(Expr::global().key("routes"), arr([]))
}

// ---------------------------------------------------------------------------
// Navigation bundle
// ---------------------------------------------------------------------------

/// The `navigation` function bundle: `push_route`, `pop_route`,
/// `clear_routes`.
pub fn navigation() -> crate::behavior::FunctionBundle {
    crate::behavior::FunctionBundle::new("navigation")
        .function(
            "push_route",
            ["route"],
            [set(
                Expr::global().key("routes"),
                concat([routes_or_empty(), arr([route_record(bind("route"))])]),
            )],
        )
        .function(
            // Signals back navigation rather than mutating directly; the
            // router's own onBack chain performs the collapse.
            "pop_route",
            [],
            [invoke("onBack", [])],
        )
        .function(
            // Push a route, then drop everything beneath it once its entry
            // animation has settled.
            "clear_routes",
            ["route"],
            [block([
                set(
                    Expr::global().key("routes"),
                    concat([routes_or_empty(), arr([route_record(bind("route"))])]),
                ),
                timeout(
                    lit(600),
                    [set(
                        Expr::global().key("routes"),
                        slice(routes_or_empty(), lit(-1), None),
                    )],
                ),
            ])],
        )
}

// ---------------------------------------------------------------------------
// Router component
// ---------------------------------------------------------------------------

/// Configuration for [`router`].
pub struct RouterConfig {
    /// The adapter seeded when the stack is empty.
    pub initial: String,
    /// Named screen templates, resolved by each route's `adapter` field.
    pub adapters: Vec<(String, Fragment)>,
    /// Screen-local back handling, run before the router's own collapse
    /// logic — always, not conditionally.
    pub on_back: Expr,
}

/// Build the router node: the navigation bundle, the stack-seeding init
/// program, the back-collapse program, and the screen adapters.
pub fn router(config: RouterConfig) -> Fragment {
    let RouterConfig {
        initial,
        adapters: screens,
        on_back: caller_on_back,
    } = config;

    stack(
        MATCH,
        MATCH,
        props![
            id("router"),
            funcs(navigation()),
            observe(set(Expr::event().key("data"), Expr::global().key("routes"))),
            on_init(
                condition(
                    eq(routes_or_empty().length(), lit(0)),
                    set(
                        Expr::global().key("routes"),
                        arr([obj([
                            ("id", gen_id()),
                            ("adapter", lit(initial.as_str())),
                            (
                                "animation",
                                Expr::from(json!({
                                    "direction": "in",
                                    "name": "right",
                                    "start": 0,
                                })),
                            ),
                        ])]),
                    ),
                )
                .end()
            ),
            on_back(back_program(caller_on_back)),
            adapters(screens),
        ],
    )
}

/// The router's own back handling.
///
/// Scans the stack from index 0 for the route marked `in` — first match
/// wins, so with more than one `in` entry (a defensive case) the lowest
/// index is chosen. Intentionally so: the documented scan order is
/// load-bearing, even though it only matches LIFO intuition while exactly
/// one route is marked `in` at a time.
fn back_program(caller_on_back: Expr) -> Expr {
    declare(
        [
            ("routes", routes_or_empty()),
            ("settle", lit(BACK_SETTLE_MS)),
            ("route_index", lit(-1)),
        ],
        [
            caller_on_back,
            for_each(
                bind("routes"),
                [condition(
                    and(
                        eq(
                            bind("item").key("animation").key("direction"),
                            lit("in"),
                        ),
                        eq(bind("route_index"), lit(-1)),
                    ),
                    set(bind("route_index"), bind("index")),
                )
                .end()],
            ),
            condition(
                gt(bind("route_index"), lit(-1)),
                block([
                    // Stage the exit: re-mark the active route "out" and
                    // commit the stack wholesale so the animation is
                    // externally visible while the settle delay runs.
                    set(
                        bind("routes")
                            .index(bind("route_index"))
                            .key("animation"),
                        obj([
                            ("direction", lit("out")),
                            ("name", lit("right")),
                            ("start", now()),
                        ]),
                    ),
                    set(Expr::global().key("routes"), bind("routes")),
                    condition(
                        eq(Expr::global().key("os"), lit("ios")),
                        set(bind("settle"), lit(0)),
                    )
                    .end(),
                    // The truncation uses the stack captured at schedule
                    // time: everything from the found index up is dropped.
                    timeout(
                        bind("settle"),
                        [set(
                            Expr::global().key("routes"),
                            slice(bind("routes"), lit(0), bind("route_index")),
                        )],
                    ),
                    result(lit(true)),
                ]),
            )
            .end(),
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
    use crate::props;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn build_router() -> crate::component::Component {
        let mut ctx = BuildContext::new(json!({}), json!({}));
        router(RouterConfig {
            initial: "home".into(),
            adapters: vec![
                ("home".into(), crate::build::text(MATCH, MATCH, props!["home"])),
                ("detail".into(), crate::build::text(MATCH, MATCH, props!["detail"])),
            ],
            on_back: block([]),
        })
        .apply(&mut ctx);
        let (root, _) = ctx.finish();
        root.children()[0].clone()
    }

    #[test]
    fn router_node_shape() {
        let node = build_router();
        assert_eq!(node.name, Tag::Stack);
        assert_eq!(node.id.as_deref(), Some("router"));
        assert_eq!(node.width, MATCH);
        assert!(node.adapters.as_ref().unwrap().contains_key("home"));
        assert!(node.adapters.as_ref().unwrap().contains_key("detail"));
    }

    #[test]
    fn router_carries_navigation_bundle() {
        let node = build_router();
        let bundles = node.funcs.as_ref().unwrap();
        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0].name, "navigation");
        assert!(bundles[0].get("push_route").is_some());
        assert!(bundles[0].get("pop_route").is_some());
        assert!(bundles[0].get("clear_routes").is_some());
    }

    #[test]
    fn router_binds_all_event_programs() {
        let node = build_router();
        assert!(node.events.list(EventKind::Observe).is_some());
        assert!(node.events.list(EventKind::Init).is_some());
        assert!(node.events.list(EventKind::Back).is_some());
    }

    #[test]
    fn pop_route_defers_to_on_back() {
        let bundle = navigation();
        let pop = bundle.get("pop_route").unwrap();
        assert_eq!(pop.body, vec![invoke("onBack", [])]);
    }

    #[test]
    fn route_serde_round_trip() {
        let route: Route = serde_json::from_value(json!({
            "id": "r1",
            "adapter": "home",
            "animation": { "name": "right", "direction": "in", "start": 0.0 },
        }))
        .unwrap();
        assert_eq!(route.adapter, "home");
        let back = serde_json::to_value(&route).unwrap();
        assert_eq!(back["animation"]["direction"], json!("in"));
    }
}
