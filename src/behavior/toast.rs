//! Single-flight toast notification queue.
//!
//! Messages enqueue FIFO in `global.toast.queue`; at most one toast
//! transition is ever mid-flight, gated by `isFree`. A transition slides
//! the current toast out to `prev`, the next queued message in as `curr`,
//! and schedules a settle timeout that reopens the gate and drains the
//! queue further. An empty-string message is a valid sentinel meaning
//! "nothing shown" and is distinct from absence.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::behavior::FunctionBundle;
use crate::build::{
    adapters, background, clickable, color, column, funcs, id, observe, on_init, opacity, padding,
    position, stack, text, Fragment,
};
use crate::component::Animation;
use crate::expr::{
    and, arr, bind, block, concat, condition, declare, eq, fallback, gen_id, invoke, length, lit,
    not, now, obj, or, result, set, slice, timeout, Expr,
};
use crate::geometry::{Edges, MATCH, WRAP};
use crate::props;

/// How long a non-empty toast stays up: entry animation plus dwell.
const TOAST_DWELL_MS: i64 = 300 + 5000;

/// Settle delay when the incoming slot is the empty sentinel.
const TOAST_EMPTY_SETTLE_MS: i64 = 600;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// One toast slot: an adapter data record plus its message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToastItem {
    pub id: String,
    pub adapter: String,
    pub message: String,
    pub animation: Animation,
}

/// The `global.toast` slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToastState {
    pub prev: ToastItem,
    pub curr: ToastItem,
    pub queue: Vec<String>,
    #[serde(rename = "isFree")]
    pub is_free: bool,
}

/// The default `global.toast` value: both slots empty, queue empty, gate
/// open.
pub fn default_toast() -> Value {
    let empty_slot = |id: &str| {
        json!({
            "id": id,
            "adapter": "local",
            "message": "",
            "animation": { "direction": "in", "name": "right", "start": 0 },
        })
    };
    json!({
        "curr": empty_slot("curr"),
        "prev": empty_slot("prev"),
        "queue": [],
        "isFree": true,
    })
}

/// `global.toast`, defaulting to [`default_toast`].
fn toast_or_default() -> Expr {
    fallback(Expr::global().key("toast"), Expr::from(default_toast()))
}

// ---------------------------------------------------------------------------
// Bundles
// ---------------------------------------------------------------------------

/// The `helpers` bundle: shared utilities for behavior programs.
pub fn helpers() -> FunctionBundle {
    FunctionBundle::new("helpers").function("generate_id", [], [result(gen_id())])
}

/// The `toast` bundle: `push_toast` and the drain step `next_toast`.
pub fn toast_functions() -> FunctionBundle {
    FunctionBundle::new("toast")
        .function(
            "push_toast",
            ["message"],
            [declare(
                [("instance", toast_or_default())],
                [
                    set(
                        bind_instance().key("queue"),
                        concat([
                            bind_instance().key("queue"),
                            arr([bind("message")]),
                        ]),
                    ),
                    set(Expr::global().key("toast"), bind_instance()),
                    invoke("toast.next_toast", []),
                ],
            )],
        )
        .function("next_toast", [], [next_toast_program()])
}

fn bind_instance() -> Expr {
    bind("instance")
}

/// One drain step.
///
/// Gate: free AND (something queued OR something currently showing). When
/// the gate is closed or there is nothing to do, a stale `prev` is retired
/// with an "out" animation instead.
fn next_toast_program() -> Expr {
    declare(
        [("instance", toast_or_default())],
        [
            condition(
                and(
                    bind_instance().key("isFree"),
                    or(
                        not(eq(length(bind_instance().key("queue")), lit(0))),
                        not(eq(bind_instance().key("curr").key("message"), lit(""))),
                    ),
                ),
                transition_program(),
            )
            .otherwise(set(
                bind_instance().key("prev"),
                obj([
                    ("id", lit("")),
                    ("message", lit("")),
                    ("adapter", lit("local")),
                    (
                        "animation",
                        obj([
                            ("direction", lit("out")),
                            ("name", lit("left")),
                            ("start", now()),
                        ]),
                    ),
                ]),
            )),
            set(Expr::global().key("toast"), bind_instance()),
        ],
    )
}

/// The in-flight transition: close the gate, slide `curr` out into `prev`,
/// dequeue into a fresh `curr`, and schedule the settle timeout.
fn transition_program() -> Expr {
    declare(
        [("start", now()), ("settle", lit(TOAST_EMPTY_SETTLE_MS))],
        [
            set(bind_instance().key("isFree"), lit(false)),
            set(
                bind_instance().key("prev"),
                obj([
                    ("id", bind_instance().key("curr").key("id")),
                    ("message", bind_instance().key("curr").key("message")),
                    ("adapter", lit("local")),
                    (
                        "animation",
                        obj([
                            ("direction", lit("out")),
                            ("name", lit("left")),
                            ("start", bind("start")),
                        ]),
                    ),
                ]),
            ),
            set(
                bind_instance().key("curr"),
                obj([
                    ("id", invoke("helpers.generate_id", [])),
                    (
                        "message",
                        fallback(bind_instance().key("queue").index(lit(0)), lit("")),
                    ),
                    ("adapter", lit("local")),
                    (
                        "animation",
                        obj([
                            ("direction", lit("in")),
                            ("name", lit("right")),
                            ("start", bind("start")),
                        ]),
                    ),
                ]),
            ),
            set(
                bind_instance().key("queue"),
                slice(
                    bind_instance().key("queue"),
                    lit(1),
                    length(bind_instance().key("queue")),
                ),
            ),
            // Only a non-empty incoming message earns the long dwell; the
            // empty sentinel settles on the short default.
            condition(
                not(eq(bind_instance().key("curr").key("message"), lit(""))),
                set(bind("settle"), lit(TOAST_DWELL_MS)),
            )
            .end(),
            // The settle body re-reads the live slice: anything enqueued
            // while this transition was in flight must survive the commit.
            timeout(
                bind("settle"),
                [declare(
                    [("live", toast_or_default())],
                    [
                        set(bind("live").key("isFree"), lit(true)),
                        set(Expr::global().key("toast"), bind("live")),
                        invoke("toast.next_toast", []),
                    ],
                )],
            ),
        ],
    )
}

/// Enqueue a toast message from any handler program.
pub fn push_toast(message: impl Into<Expr>) -> Expr {
    invoke("toast.push_toast", [message.into()])
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

/// The template instantiated for each toast slot.
fn toaster_item() -> Fragment {
    column(
        MATCH,
        WRAP,
        props![
            id("toaster_item"),
            position(Edges::none().bottom(0.0)),
            padding(16.0),
            observe(block([
                set(
                    Expr::event().key("visible"),
                    not(eq(Expr::local().key("message"), lit(""))),
                ),
                set(Expr::event().key("animation"), Expr::local().key("animation")),
            ])),
            text(
                MATCH,
                WRAP,
                props![
                    opacity(0.9),
                    background("black"),
                    color("white"),
                    padding(16.0),
                    observe(set(Expr::event().key("text"), Expr::local().key("message"))),
                ],
            ),
        ],
    )
}

/// The toaster host: seeds the slice, carries the bundles, and feeds the
/// two slots (`prev`, `curr`) to the slot template.
pub fn toaster() -> Fragment {
    stack(
        MATCH,
        WRAP,
        props![
            clickable(false),
            id("toaster"),
            position(Edges::none().bottom(0.0)),
            on_init(set(Expr::global().key("toast"), Expr::from(default_toast()))),
            funcs(toast_functions()),
            funcs(helpers()),
            observe(declare(
                [("toast", toast_or_default())],
                [set(
                    Expr::event().key("data"),
                    arr([
                        bind("toast").key("prev"),
                        bind("toast").key("curr"),
                    ]),
                )],
            )),
            adapters([("local", toaster_item())]),
        ],
    )
}

// ===========================================================================
// Tests
// ===========================================================================
