//! The test harness: build a tree, run it headlessly, dispatch by id.
//!
//! [`Harness::new`] assembles the tree from a builder, runs the init pass
//! (depth-first, parent before children), then one update pass evaluating
//! every `observe` binding and soft-validating every node. Dispatch methods
//! re-run the update pass after any successful dispatch. Deferred work
//! never runs on its own: [`Harness::advance`] moves the virtual clock and
//! fires due timers in order.

use std::collections::BTreeMap;

use serde_json::Value;
use slotmap::SecondaryMap;

use crate::behavior::FunctionDef;
use crate::build::{BuildContext, Fragment};
use crate::component::{validate, Component, EventKind};
use crate::diag::Diagnostics;
use crate::expr::{invoke, Expr};
use crate::geometry::Rect;

use super::eval::{Env, Runtime, Timer};
use super::index::{NodeKey, TreeIndex};

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// A built tree plus everything needed to exercise it without a renderer.
pub struct Harness {
    root: Component,
    global: Value,
    local: Value,
    mocks: BTreeMap<String, Value>,
    functions: BTreeMap<String, FunctionDef>,
    index: TreeIndex,
    projections: SecondaryMap<NodeKey, Value>,
    diagnostics: Diagnostics,
    runtime: Runtime,
}

impl Harness {
    /// Build the tree and run the init and first update passes.
    pub fn new(component: Fragment, global: Value, local: Value) -> Self {
        Self::with_mocks(component, global, local, BTreeMap::new())
    }

    /// Like [`Harness::new`], with extra read-only bindings visible to
    /// every program.
    pub fn with_mocks(
        component: Fragment,
        global: Value,
        local: Value,
        mocks: BTreeMap<String, Value>,
    ) -> Self {
        let mut ctx = BuildContext::new(global.clone(), local.clone());
        component.apply(&mut ctx);
        let (root, diagnostics) = ctx.finish();

        let index = TreeIndex::build(&root);
        let mut functions = BTreeMap::new();
        collect_functions(&root, &mut functions);

        let mut harness = Self {
            root,
            global,
            local,
            mocks,
            functions,
            index,
            projections: SecondaryMap::new(),
            diagnostics,
            runtime: Runtime::new(),
        };
        harness.run_init();
        harness.update();
        harness
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Dispatch `onEnter` to the node with the given id. Returns whether
    /// any handler ran.
    pub fn enter(&mut self, id: &str) -> bool {
        self.dispatch_to_id(id, EventKind::Enter, Value::Null)
    }

    /// Dispatch `onClick` to the node with the given id.
    pub fn click(&mut self, id: &str) -> bool {
        self.dispatch_to_id(id, EventKind::Click, Value::Null)
    }

    /// Dispatch `onChange` to the node with the given id, with the new
    /// value as the event payload.
    pub fn change(&mut self, id: &str, value: Value) -> bool {
        self.dispatch_to_id(id, EventKind::Change, value)
    }

    /// Dispatch `onResize` to the node with the given id, with its screen
    /// rectangle as the event payload.
    pub fn resize(&mut self, id: &str, rect: Rect) -> bool {
        let event = serde_json::to_value(rect).unwrap_or(Value::Null);
        self.dispatch_to_id(id, EventKind::Resize, event)
    }

    /// Request back navigation: `onBack` fires on every node that binds
    /// it, in traversal order. Returns whether any handler reported
    /// success via `result(true)`.
    pub fn back(&mut self) -> bool {
        let keys = self.index.order().to_vec();
        let mut handled = false;
        let mut succeeded = false;
        for key in keys {
            let outcome = self.run_node_programs(key, EventKind::Back, &Value::Null);
            handled |= outcome.handled;
            succeeded |= outcome.succeeded;
        }
        if handled {
            self.drain_pending();
            self.update();
        }
        succeeded
    }

    /// Invoke a function-bundle member directly, as a platform shell
    /// would: `harness.call("navigation.push_route", vec![json!("detail")])`.
    pub fn call(&mut self, target: &str, args: Vec<Value>) -> Value {
        let program = invoke(target, args.into_iter().map(Expr::from));
        let value = {
            let mut env = self.env(Value::Null);
            env.eval(&program)
        };
        self.drain_pending();
        self.update();
        value
    }

    /// Advance the virtual clock, firing due timers in (due, schedule)
    /// order. Each fired timer is followed by a full update pass.
    pub fn advance(&mut self, ms: u64) {
        let target = self.runtime.clock.saturating_add(ms);
        while let Some(timer) = self.runtime.take_due(target) {
            self.runtime.clock = self.runtime.clock.max(timer.due);
            let Timer { body, frames, event, .. } = timer;
            {
                let mut env = self.env(event);
                env.frames = frames;
                for expr in &body {
                    env.eval(expr);
                }
            }
            self.drain_pending();
            self.update();
        }
        self.runtime.clock = target;
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// The built root node.
    pub fn root(&self) -> &Component {
        &self.root
    }

    /// The first node (in traversal order) with the given id.
    pub fn find(&self, id: &str) -> Option<&Component> {
        let key = self.index.find(id)?;
        self.index.resolve(&self.root, key)
    }

    /// The live global state.
    pub fn global(&self) -> &Value {
        &self.global
    }

    /// The live local state.
    pub fn local(&self) -> &Value {
        &self.local
    }

    /// A node's post-observe view from the last update pass.
    pub fn projection(&self, id: &str) -> Option<&Value> {
        let key = self.index.find(id)?;
        self.projections.get(key)
    }

    /// Everything soft-flagged so far, in trigger order.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Capability calls declared by executed programs, in call order.
    pub fn invocations(&self) -> &[String] {
        &self.runtime.invocations
    }

    /// The current virtual time, in milliseconds.
    pub fn clock(&self) -> u64 {
        self.runtime.clock
    }

    /// Timers scheduled but not yet fired.
    pub fn pending_timers(&self) -> usize {
        self.runtime.pending_timers()
    }

    // ── Internals ────────────────────────────────────────────────────

    fn env(&mut self, event: Value) -> Env<'_> {
        Env::new(
            &mut self.global,
            &mut self.local,
            event,
            &self.mocks,
            &self.functions,
            &mut self.runtime,
        )
    }

    fn dispatch_to_id(&mut self, id: &str, kind: EventKind, event: Value) -> bool {
        let Some(key) = self.index.find(id) else {
            return false;
        };
        let outcome = self.run_node_programs(key, kind, &event);
        if outcome.handled {
            self.drain_pending();
            self.update();
        }
        outcome.handled
    }

    fn run_node_programs(&mut self, key: NodeKey, kind: EventKind, event: &Value) -> Outcome {
        let (enabled, programs) = match self.index.resolve(&self.root, key) {
            Some(node) => (
                node.is_enabled(),
                node.events.list(kind).map(<[Expr]>::to_vec),
            ),
            None => (false, None),
        };
        let Some(programs) = programs else {
            return Outcome::default();
        };
        if !enabled || programs.is_empty() {
            return Outcome::default();
        }

        let mut succeeded = false;
        for program in &programs {
            let mut env = self.env(event.clone());
            env.eval(program);
            if env.result == Some(Value::Bool(true)) {
                succeeded = true;
            }
        }
        Outcome { handled: true, succeeded }
    }

    /// Run every deferred event dispatch queued by `invoke`, until none
    /// remain. Deferred events fire on every node that binds them, in
    /// traversal order.
    fn drain_pending(&mut self) {
        loop {
            let pending = std::mem::take(&mut self.runtime.pending_events);
            if pending.is_empty() {
                break;
            }
            for kind in pending {
                let keys = self.index.order().to_vec();
                for key in keys {
                    self.run_node_programs(key, kind, &Value::Null);
                }
            }
        }
    }

    /// The init pass: `onInit` on every node, parent before children.
    fn run_init(&mut self) {
        let keys = self.index.order().to_vec();
        for key in keys {
            self.run_node_programs(key, EventKind::Init, &Value::Null);
        }
        self.drain_pending();
    }

    /// The update pass: evaluate every `observe` binding against the
    /// node's serialized view and soft-validate every node.
    fn update(&mut self) {
        let keys = self.index.order().to_vec();
        for key in keys {
            let (programs, projection, mut flagged) =
                match self.index.resolve(&self.root, key) {
                    Some(node) => {
                        let mut flagged = Diagnostics::new();
                        validate(node, &mut flagged);
                        (
                            node.events.list(EventKind::Observe).map(<[Expr]>::to_vec),
                            serde_json::to_value(node).unwrap_or(Value::Null),
                            flagged,
                        )
                    }
                    None => continue,
                };
            for diagnostic in flagged.take() {
                self.diagnostics.push(diagnostic);
            }

            let mut projection = projection;
            if let Some(programs) = programs {
                for program in &programs {
                    let mut env = self.env(projection);
                    env.eval(program);
                    let Env { event, .. } = env;
                    projection = event;
                }
            }
            self.projections.insert(key, projection);
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Outcome {
    handled: bool,
    succeeded: bool,
}

fn collect_functions(node: &Component, into: &mut BTreeMap<String, FunctionDef>) {
    if let Some(bundles) = &node.funcs {
        for bundle in bundles {
            for def in &bundle.functions {
                into.insert(bundle.target(&def.name), def.clone());
            }
        }
    }
    for child in node.children() {
        collect_functions(child, into);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
