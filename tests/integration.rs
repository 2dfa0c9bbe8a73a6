//! Integration tests for plait.
//!
//! These exercise the public API from outside the crate: tree assembly,
//! the harness dispatch loop, and the three behavior state machines
//! replayed on the virtual clock.

use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use plait::behavior::{router, toast, tutorial, RouterConfig, StepConfig};
use plait::build::{column, id, on_click, text};
use plait::expr::{block, concat, arr, lit, set, Expr};
use plait::geometry::Rect;
use plait::props;
use plait::testing::Harness;
use plait::{MATCH, WRAP};

fn append_log(entry: &str) -> Expr {
    set(
        Expr::global().key("log"),
        concat([Expr::global().key("log"), arr([lit(entry)])]),
    )
}

// ---------------------------------------------------------------------------
// Assembly and dispatch
// ---------------------------------------------------------------------------

#[test]
fn handlers_fire_in_registration_order() {
    let tree = column(
        WRAP,
        WRAP,
        props![
            id("target"),
            on_click(append_log("h1")),
            on_click(append_log("h2")),
        ],
    );
    let mut harness = Harness::new(tree, json!({ "log": [] }), json!({}));
    assert!(harness.click("target"));
    assert_eq!(harness.global()["log"], json!(["h1", "h2"]));
}

#[test]
fn built_trees_serialize_to_json() {
    let tree = column(MATCH, WRAP, props![text(WRAP, WRAP, props!["hello"])]);
    let harness = Harness::new(tree, json!({}), json!({}));
    let value = serde_json::to_value(harness.root()).unwrap();
    assert_eq!(value["name"], json!("root"));
    assert_eq!(value["children"][0]["name"], json!("column"));
    assert_eq!(value["children"][0]["children"][0]["text"], json!("hello"));
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

fn router_tree() -> plait::build::Fragment {
    router(RouterConfig {
        initial: "home".into(),
        adapters: vec![
            ("home".into(), text(MATCH, MATCH, props!["home screen"])),
            ("detail".into(), text(MATCH, MATCH, props!["detail screen"])),
        ],
        on_back: block([]),
    })
}

fn routes(harness: &Harness) -> &Vec<Value> {
    harness.global()["routes"].as_array().expect("routes slice")
}

#[test]
fn router_init_seeds_a_single_in_route() {
    let harness = Harness::new(router_tree(), json!({}), json!({}));
    // The harness root resolves to exactly one child: the router node.
    assert_eq!(harness.root().children().len(), 1);

    let routes = routes(&harness);
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0]["adapter"], json!("home"));
    assert_eq!(routes[0]["animation"]["direction"], json!("in"));
    assert_eq!(routes[0]["animation"]["start"], json!(0));
}

#[test]
fn router_init_preserves_an_existing_stack() {
    let preset = json!({
        "routes": [{
            "id": "r0",
            "adapter": "detail",
            "animation": { "direction": "in", "name": "right", "start": 0 },
        }],
    });
    let harness = Harness::new(router_tree(), preset, json!({}));
    let routes = routes(&harness);
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0]["adapter"], json!("detail"));
}

#[test]
fn push_route_appends_an_in_marked_route() {
    let mut harness = Harness::new(router_tree(), json!({}), json!({}));
    harness.call("navigation.push_route", vec![json!("detail")]);

    let routes = routes(&harness);
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[1]["id"], json!("detail"));
    assert_eq!(routes[1]["adapter"], json!("detail"));
    assert_eq!(routes[1]["animation"]["direction"], json!("in"));
}

#[test]
fn router_observe_projects_the_stack_as_data() {
    let harness = Harness::new(router_tree(), json!({}), json!({}));
    let projection = harness.projection("router").unwrap();
    assert_eq!(projection["data"].as_array().unwrap().len(), 1);
    assert_eq!(projection["data"][0]["adapter"], json!("home"));
}

// Load-bearing scan order: with two routes both marked "in" (the defensive
// case after a plain push), back finds the lowest-index match and the
// truncation drops that route and everything above it — the stack
// collapses to [].
#[test]
fn router_back_collapses_to_first_in_route() {
    let mut harness = Harness::new(router_tree(), json!({}), json!({}));
    harness.call("navigation.push_route", vec![json!("detail")]);
    assert_eq!(routes(&harness).len(), 2);

    assert!(harness.back());

    // Exit staging is committed immediately: the found route is re-marked
    // "out" while the settle delay runs, and the stack is still intact.
    let staged = routes(&harness);
    assert_eq!(staged.len(), 2);
    assert_eq!(staged[0]["animation"]["direction"], json!("out"));
    assert_eq!(staged[1]["animation"]["direction"], json!("in"));

    harness.advance(300);
    assert_eq!(routes(&harness).len(), 0);
}

#[test]
fn router_back_pops_the_top_when_only_it_is_in() {
    let preset = json!({
        "routes": [
            {
                "id": "home",
                "adapter": "home",
                "animation": { "direction": "out", "name": "right", "start": 0 },
            },
            {
                "id": "detail",
                "adapter": "detail",
                "animation": { "direction": "in", "name": "right", "start": 0 },
            },
        ],
    });
    let mut harness = Harness::new(router_tree(), preset, json!({}));
    assert!(harness.back());
    harness.advance(300);

    let routes = routes(&harness);
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0]["adapter"], json!("home"));
}

#[test]
fn router_back_settles_immediately_on_ios() {
    let mut harness = Harness::new(router_tree(), json!({ "os": "ios" }), json!({}));
    harness.call("navigation.push_route", vec![json!("detail")]);
    assert!(harness.back());
    harness.advance(0);
    assert_eq!(routes(&harness).len(), 0);
}

#[test]
fn router_back_without_in_routes_reports_failure() {
    let preset = json!({
        "routes": [{
            "id": "home",
            "adapter": "home",
            "animation": { "direction": "out", "name": "right", "start": 0 },
        }],
    });
    let mut harness = Harness::new(router_tree(), preset, json!({}));
    assert!(!harness.back());
    harness.advance(1000);
    assert_eq!(routes(&harness).len(), 1);
}

#[test]
fn pop_route_routes_through_on_back() {
    let mut harness = Harness::new(router_tree(), json!({}), json!({}));
    harness.call("navigation.push_route", vec![json!("detail")]);
    harness.call("navigation.pop_route", vec![]);
    harness.advance(300);
    assert_eq!(routes(&harness).len(), 0);
}

#[test]
fn caller_on_back_always_runs_before_the_collapse() {
    let tree = router(RouterConfig {
        initial: "home".into(),
        adapters: vec![("home".into(), text(MATCH, MATCH, props!["home"]))],
        on_back: append_log("screen-local"),
    });
    // No route is marked "in", so the collapse finds nothing; the caller's
    // handler must run regardless.
    let preset = json!({
        "log": [],
        "routes": [{
            "id": "home",
            "adapter": "home",
            "animation": { "direction": "out", "name": "right", "start": 0 },
        }],
    });
    let mut harness = Harness::new(tree, preset, json!({}));
    assert!(!harness.back());
    assert_eq!(harness.global()["log"], json!(["screen-local"]));
}

#[test]
fn clear_routes_drops_everything_beneath_after_settling() {
    let mut harness = Harness::new(router_tree(), json!({}), json!({}));
    harness.call("navigation.push_route", vec![json!("detail")]);
    harness.call("navigation.clear_routes", vec![json!("home")]);
    assert_eq!(routes(&harness).len(), 3);

    harness.advance(600);
    let routes = routes(&harness);
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0]["adapter"], json!("home"));
}

// ---------------------------------------------------------------------------
// Toast
// ---------------------------------------------------------------------------

fn toast_state(harness: &Harness) -> toast::ToastState {
    serde_json::from_value(harness.global()["toast"].clone()).expect("toast slice")
}

#[test]
fn toaster_init_seeds_the_default_slice() {
    let harness = Harness::new(toast::toaster(), json!({}), json!({}));
    let state = toast_state(&harness);
    assert!(state.is_free);
    assert!(state.queue.is_empty());
    assert_eq!(state.curr.message, "");
}

#[test]
fn toast_drains_fifo_across_settle_delays() {
    let mut harness = Harness::new(toast::toaster(), json!({}), json!({}));

    harness.call("toast.push_toast", vec![json!("a")]);
    let state = toast_state(&harness);
    assert_eq!(state.curr.message, "a");
    assert!(!state.is_free);
    assert!(state.queue.is_empty());

    // Pushing while busy only enqueues.
    harness.call("toast.push_toast", vec![json!("b")]);
    let state = toast_state(&harness);
    assert_eq!(state.curr.message, "a");
    assert_eq!(state.queue, vec!["b"]);

    // After the 300 + 5000 ms dwell the gate reopens and "b" slides in.
    harness.advance(5300);
    let state = toast_state(&harness);
    assert_eq!(state.curr.message, "b");
    assert_eq!(state.prev.message, "a");
    assert_eq!(state.prev.animation.direction, plait::component::AnimationDirection::Out);
    assert!(state.queue.is_empty());
    assert!(!state.is_free);
}

#[test]
fn toast_transition_slides_current_out_to_prev() {
    let mut harness = Harness::new(toast::toaster(), json!({}), json!({}));
    harness.call("toast.push_toast", vec![json!("only")]);
    let state = toast_state(&harness);
    assert_eq!(state.prev.message, "");
    assert_eq!(state.curr.message, "only");
    assert_eq!(state.curr.animation.direction, plait::component::AnimationDirection::In);
}

#[test]
fn empty_current_uses_the_short_settle_only() {
    let mut harness = Harness::new(toast::toaster(), json!({}), json!({}));
    harness.call("toast.push_toast", vec![json!("a")]);

    // Drain "a" out; the queue is empty so the incoming slot is the empty
    // sentinel, which gets the 600 ms default instead of the long dwell.
    harness.advance(5300);
    let state = toast_state(&harness);
    assert_eq!(state.curr.message, "");
    assert!(!state.is_free);

    harness.advance(599);
    assert!(!toast_state(&harness).is_free);
    harness.advance(1);
    assert!(toast_state(&harness).is_free);
}

#[test]
fn idle_drain_retires_the_stale_prev_slot() {
    let mut harness = Harness::new(toast::toaster(), json!({}), json!({}));
    harness.call("toast.push_toast", vec![json!("a")]);
    harness.advance(5300); // "a" out, empty sentinel in
    harness.advance(600); // gate reopens with nothing to show

    let state = toast_state(&harness);
    assert!(state.is_free);
    assert_eq!(state.prev.message, "");
    assert_eq!(state.prev.animation.direction, plait::component::AnimationDirection::Out);
}

#[test]
fn toaster_observe_feeds_both_slots_to_the_adapter() {
    let mut harness = Harness::new(toast::toaster(), json!({}), json!({}));
    harness.call("toast.push_toast", vec![json!("hey")]);
    let projection = harness.projection("toaster").unwrap();
    let data = projection["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["message"], json!(""));
    assert_eq!(data[1]["message"], json!("hey"));
}

// ---------------------------------------------------------------------------
// Tutorial
// ---------------------------------------------------------------------------

fn tutorial_tree() -> plait::build::Fragment {
    column(
        MATCH,
        MATCH,
        props![
            tutorial::tutorial(),
            tutorial::step(StepConfig {
                width: WRAP,
                height: WRAP,
                name: "one".into(),
                text: "Step one".into(),
                children: props![id("step_one"), "Go"],
                on_click: append_log("clicked-one"),
                condition: lit(true),
            }),
            tutorial::step(StepConfig {
                width: WRAP,
                height: WRAP,
                name: "two".into(),
                text: "Step two".into(),
                children: props![id("step_two"), "Next"],
                on_click: block([]),
                condition: lit(true),
            }),
        ],
    )
}

fn tutorial_state(harness: &Harness) -> tutorial::TutorialState {
    serde_json::from_value(harness.global()["tutorial"].clone()).expect("tutorial slice")
}

fn settle_tutorial(harness: &mut Harness) {
    harness.resize("tutorial", Rect::new(0.0, 0.0, 400.0, 800.0));
    harness.advance(600);
}

#[test]
fn tutorial_gates_activation_until_ready() {
    let mut harness = Harness::new(tutorial_tree(), json!({}), json!({}));
    harness.resize("tutorial", Rect::new(0.0, 0.0, 400.0, 800.0));

    // Before the settle delay, resize events must not activate anything.
    harness.resize("step_one", Rect::new(10.0, 20.0, 100.0, 40.0));
    assert_eq!(tutorial_state(&harness).active.name, "");

    harness.advance(600);
    harness.resize("step_one", Rect::new(10.0, 20.0, 100.0, 40.0));
    assert_eq!(tutorial_state(&harness).active.name, "one");
}

#[test]
fn tutorial_highlight_is_in_viewport_edge_coordinates() {
    let mut harness = Harness::new(tutorial_tree(), json!({}), json!({}));
    settle_tutorial(&mut harness);
    harness.resize("step_one", Rect::new(10.0, 20.0, 100.0, 40.0));

    let state = tutorial_state(&harness);
    assert_eq!(state.active.text, "Step one");
    assert_eq!(state.active.position.top, 20.0);
    assert_eq!(state.active.position.left, 10.0);
    assert_eq!(state.active.position.right, 400.0 - (10.0 + 100.0));
    assert_eq!(state.active.position.bottom, 800.0 - (20.0 + 40.0));
}

#[test]
fn only_the_first_arriving_step_activates() {
    let mut harness = Harness::new(tutorial_tree(), json!({}), json!({}));
    settle_tutorial(&mut harness);

    harness.resize("step_one", Rect::new(10.0, 20.0, 100.0, 40.0));
    harness.resize("step_two", Rect::new(10.0, 100.0, 100.0, 40.0));

    // Both conditions are true, but "one" arrived first and holds the
    // highlight; re-reporting "one" stays idempotent.
    assert_eq!(tutorial_state(&harness).active.name, "one");
    harness.resize("step_one", Rect::new(10.0, 20.0, 100.0, 40.0));
    assert_eq!(tutorial_state(&harness).active.name, "one");
}

#[test]
fn clicking_a_step_completes_it_and_runs_the_continuation() {
    let mut harness = Harness::new(tutorial_tree(), json!({ "log": [] }), json!({}));
    settle_tutorial(&mut harness);
    harness.resize("step_one", Rect::new(10.0, 20.0, 100.0, 40.0));

    assert!(harness.click("step_one"));
    let state = tutorial_state(&harness);
    assert_eq!(state.completed.get("one"), Some(&true));
    assert_eq!(state.active.name, "");
    assert_eq!(harness.global()["log"], json!(["clicked-one"]));

    // A completed step never re-activates; the next one can.
    harness.resize("step_one", Rect::new(10.0, 20.0, 100.0, 40.0));
    assert_eq!(tutorial_state(&harness).active.name, "");
    harness.resize("step_two", Rect::new(10.0, 100.0, 100.0, 40.0));
    assert_eq!(tutorial_state(&harness).active.name, "two");
}

#[test]
fn dismissing_a_scrim_completes_the_active_step() {
    let mut harness = Harness::new(tutorial_tree(), json!({}), json!({}));
    settle_tutorial(&mut harness);
    harness.resize("step_one", Rect::new(10.0, 20.0, 100.0, 40.0));
    assert_eq!(tutorial_state(&harness).active.name, "one");

    // Scrims carry lazily assigned ids; pull one off the overlay node.
    let overlay = harness.find("tutorial").unwrap();
    let scrim_id = overlay.children()[0].id.clone().unwrap();
    assert!(harness.click(&scrim_id));

    let state = tutorial_state(&harness);
    assert_eq!(state.completed.get("one"), Some(&true));
    assert_eq!(state.active.name, "");
}

#[test]
fn overlay_opacity_follows_readiness_and_activation() {
    let mut harness = Harness::new(tutorial_tree(), json!({}), json!({}));
    settle_tutorial(&mut harness);
    assert_eq!(harness.projection("tutorial").unwrap()["opacity"], json!(0));

    harness.resize("step_one", Rect::new(10.0, 20.0, 100.0, 40.0));
    assert_eq!(harness.projection("tutorial").unwrap()["opacity"], json!(1));

    harness.click("step_one");
    assert_eq!(harness.projection("tutorial").unwrap()["opacity"], json!(0));
}

#[test]
fn explanatory_text_binds_to_the_larger_scrim() {
    let mut harness = Harness::new(tutorial_tree(), json!({}), json!({}));
    settle_tutorial(&mut harness);
    // top = 20, bottom = 740: the bottom scrim is larger, so its caption
    // shows and the top one hides.
    harness.resize("step_one", Rect::new(10.0, 20.0, 100.0, 40.0));

    let overlay = harness.find("tutorial").unwrap();
    let top_caption = overlay.children()[0].children()[0].id.clone().unwrap();
    let bottom_caption = overlay.children()[2].children()[0].id.clone().unwrap();

    assert_eq!(harness.projection(&top_caption).unwrap()["visible"], json!(false));
    assert_eq!(harness.projection(&bottom_caption).unwrap()["visible"], json!(true));
    assert_eq!(
        harness.projection(&bottom_caption).unwrap()["text"],
        json!("Step one")
    );
}

// ---------------------------------------------------------------------------
// Mocks
// ---------------------------------------------------------------------------

#[test]
fn mocks_reach_behavior_programs() {
    let tree = column(
        WRAP,
        WRAP,
        props![plait::build::on_init(set(
            Expr::global().key("copied"),
            plait::expr::bind("injected"),
        ))],
    );
    let mut mocks = BTreeMap::new();
    mocks.insert("injected".to_owned(), json!({ "deep": [1, 2] }));
    let harness = Harness::with_mocks(tree, json!({}), json!({}), mocks);
    assert_eq!(harness.global()["copied"], json!({ "deep": [1, 2] }));
}
