//! The minimal synchronous interpreter behind the test harness.
//!
//! On a real target an external compiler translates behavior programs to
//! platform-native logic; for structural testing this module stands in for
//! that executor. It evaluates one [`Expr`] program at a time against the
//! shared state, with a virtual clock: `Timeout` nodes enqueue timers
//! (fire-and-forget, never cancelled) that the harness fires in due order
//! when the clock advances. Scheduled bodies run against the binding frames
//! captured at schedule time plus the live global/local state.
//!
//! Evaluation is deliberately soft: unresolved places read as null and
//! writes to them are ignored, matching the no-propagating-faults error
//! model of the builder layer.

use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};

use crate::behavior::FunctionDef;
use crate::component::EventKind;
use crate::expr::{BinaryOp, Expr, UnaryOp};

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

/// A scheduled program body.
#[derive(Debug, Clone)]
pub(crate) struct Timer {
    pub due: u64,
    pub(crate) seq: u64,
    pub body: Vec<Expr>,
    pub frames: Vec<Value>,
    pub event: Value,
}

/// Shared execution resources: the virtual clock, the timer queue, the id
/// generator, deferred event dispatch, and the capability-call log.
#[derive(Debug, Default)]
pub(crate) struct Runtime {
    pub clock: u64,
    timer_seq: u64,
    timers: Vec<Timer>,
    id_seq: u64,
    pub pending_events: Vec<EventKind>,
    pub invocations: Vec<String>,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh unique id.
    pub fn next_id(&mut self) -> String {
        let id = format!("_{:x}_{:x}", self.id_seq, self.clock);
        self.id_seq += 1;
        id
    }

    /// Enqueue a timer.
    pub fn schedule(&mut self, due: u64, body: Vec<Expr>, frames: Vec<Value>, event: Value) {
        let seq = self.timer_seq;
        self.timer_seq += 1;
        self.timers.push(Timer { due, seq, body, frames, event });
    }

    /// Remove and return the earliest timer due at or before `upto`.
    /// Ties fire in schedule order.
    pub fn take_due(&mut self, upto: u64) -> Option<Timer> {
        let position = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= upto)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(i, _)| i)?;
        Some(self.timers.remove(position))
    }

    /// Number of timers still pending.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// One program evaluation: live state roots, the event payload, and the
/// binding frame stack.
pub(crate) struct Env<'a> {
    pub global: &'a mut Value,
    pub local: &'a mut Value,
    pub event: Value,
    pub frames: Vec<Value>,
    pub mocks: &'a BTreeMap<String, Value>,
    pub functions: &'a BTreeMap<String, FunctionDef>,
    pub runtime: &'a mut Runtime,
    pub result: Option<Value>,
}

/// Where a place's path starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Root {
    Global,
    Local,
    Event,
    Frame(usize),
}

impl<'a> Env<'a> {
    pub fn new(
        global: &'a mut Value,
        local: &'a mut Value,
        event: Value,
        mocks: &'a BTreeMap<String, Value>,
        functions: &'a BTreeMap<String, FunctionDef>,
        runtime: &'a mut Runtime,
    ) -> Self {
        Self {
            global,
            local,
            event,
            frames: Vec::new(),
            mocks,
            functions,
            runtime,
            result: None,
        }
    }

    /// Evaluate one expression.
    pub fn eval(&mut self, expr: &Expr) -> Value {
        match expr {
            Expr::Lit(value) => value.clone(),
            Expr::Obj(fields) => {
                let mut map = Map::new();
                for (name, field) in fields {
                    let value = self.eval(field);
                    map.insert(name.clone(), value);
                }
                Value::Object(map)
            }
            Expr::Arr(items) => {
                Value::Array(items.iter().map(|item| self.eval(item)).collect())
            }
            Expr::Bind(_) | Expr::Symbol { .. } => self.read(expr),
            Expr::Set { target, value } => {
                let value = self.eval(value);
                if let Some((root, path)) = self.resolve_place(target) {
                    self.write_place(root, &path, value);
                }
                Value::Null
            }
            Expr::Block(body) => {
                let mut last = Value::Null;
                for expr in body {
                    last = self.eval(expr);
                }
                last
            }
            Expr::If { cond, then, otherwise } => {
                let cond = self.eval(cond);
                if truthy(&cond) {
                    self.eval(then)
                } else if let Some(otherwise) = otherwise {
                    self.eval(otherwise)
                } else {
                    Value::Null
                }
            }
            Expr::Declare { bindings, body } => {
                let mut frame = Map::new();
                for (name, init) in bindings {
                    let value = self.eval(init);
                    frame.insert(name.clone(), value);
                }
                self.frames.push(Value::Object(frame));
                for expr in body {
                    self.eval(expr);
                }
                self.frames.pop();
                Value::Null
            }
            Expr::Fallback { value, default } => {
                let value = self.eval(value);
                if value.is_null() {
                    self.eval(default)
                } else {
                    value
                }
            }
            Expr::Unary { op: UnaryOp::Not, expr } => {
                let value = self.eval(expr);
                Value::Bool(!truthy(&value))
            }
            Expr::Binary { op, lhs, rhs } => self.eval_binary(*op, lhs, rhs),
            Expr::Invoke { target, args } => self.eval_invoke(target, args),
            Expr::Result(expr) => {
                let value = self.eval(expr);
                self.result = Some(value.clone());
                value
            }
            Expr::Length(expr) => {
                let value = self.eval(expr);
                let length = match &value {
                    Value::Array(items) => items.len(),
                    Value::String(text) => text.chars().count(),
                    _ => 0,
                };
                Value::Number(Number::from(length as i64))
            }
            Expr::Concat(lists) => {
                let mut result = Vec::new();
                for list in lists {
                    match self.eval(list) {
                        Value::Array(items) => result.extend(items),
                        Value::Null => {}
                        other => result.push(other),
                    }
                }
                Value::Array(result)
            }
            Expr::Slice { list, start, end } => self.eval_slice(list, start, end.as_deref()),
            Expr::ForEach { list, body } => {
                if let Value::Array(items) = self.eval(list) {
                    for (index, item) in items.into_iter().enumerate() {
                        let mut frame = Map::new();
                        frame.insert("item".to_owned(), item);
                        frame.insert("index".to_owned(), Value::from(index as i64));
                        self.frames.push(Value::Object(frame));
                        for expr in body {
                            self.eval(expr);
                        }
                        self.frames.pop();
                    }
                }
                Value::Null
            }
            Expr::Now => Value::from(self.runtime.clock as f64),
            Expr::GenId => Value::String(self.runtime.next_id()),
            Expr::Timeout { delay, body } => {
                let delay = as_f64(&self.eval(delay)).unwrap_or(0.0).max(0.0) as u64;
                self.runtime.schedule(
                    self.runtime.clock + delay,
                    body.clone(),
                    self.frames.clone(),
                    self.event.clone(),
                );
                Value::Null
            }
        }
    }

    // ── Places ───────────────────────────────────────────────────────

    /// Resolve a bind/symbol chain to an assignable place.
    fn resolve_place(&mut self, expr: &Expr) -> Option<(Root, Vec<Value>)> {
        match expr {
            Expr::Bind(name) => match name.as_str() {
                "global" => Some((Root::Global, Vec::new())),
                "local" => Some((Root::Local, Vec::new())),
                "event" => Some((Root::Event, Vec::new())),
                _ => {
                    let frame = self
                        .frames
                        .iter()
                        .rposition(|frame| frame.get(name.as_str()).is_some())?;
                    Some((Root::Frame(frame), vec![Value::String(name.clone())]))
                }
            },
            Expr::Symbol { target, key } => {
                let (root, mut path) = self.resolve_place(target)?;
                let key = self.eval(key);
                path.push(key);
                Some((root, path))
            }
            _ => None,
        }
    }

    /// Read a bind/symbol chain; unresolved reads are null.
    fn read(&mut self, expr: &Expr) -> Value {
        if let Some((root, path)) = self.resolve_place(expr) {
            return self.read_place(root, &path);
        }
        match expr {
            // A bare name that is not a binding may be a harness mock.
            Expr::Bind(name) => self.mocks.get(name).cloned().unwrap_or(Value::Null),
            // A symbol whose target is a computed value: index into it.
            Expr::Symbol { target, key } => {
                let target = self.eval(target);
                let key = self.eval(key);
                index_value(&target, &key).cloned().unwrap_or(Value::Null)
            }
            _ => Value::Null,
        }
    }

    fn root_container(&mut self, root: Root) -> &mut Value {
        match root {
            Root::Global => self.global,
            Root::Local => self.local,
            Root::Event => &mut self.event,
            Root::Frame(i) => &mut self.frames[i],
        }
    }

    fn read_place(&mut self, root: Root, path: &[Value]) -> Value {
        let mut cursor: &Value = self.root_container(root);
        for key in path {
            match index_value(cursor, key) {
                Some(next) => cursor = next,
                None => return Value::Null,
            }
        }
        cursor.clone()
    }

    /// Write through a path, creating missing object keys on the way.
    /// Out-of-range list indices are ignored.
    fn write_place(&mut self, root: Root, path: &[Value], value: Value) {
        let mut cursor: &mut Value = self.root_container(root);
        let Some((last, ancestors)) = path.split_last() else {
            *cursor = value;
            return;
        };
        for key in ancestors {
            match descend(cursor, key) {
                Some(next) => cursor = next,
                None => return,
            }
        }
        match (cursor, last) {
            (Value::Object(map), Value::String(key)) => {
                map.insert(key.clone(), value);
            }
            (Value::Array(items), key) => {
                if let Some(index) = as_index(key) {
                    if index < items.len() {
                        items[index] = value;
                    }
                }
            }
            (slot @ Value::Null, Value::String(key)) => {
                let mut map = Map::new();
                map.insert(key.clone(), value);
                *slot = Value::Object(map);
            }
            _ => {}
        }
    }

    // ── Operators ────────────────────────────────────────────────────

    fn eval_binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Value {
        match op {
            BinaryOp::And => {
                let lhs = self.eval(lhs);
                if !truthy(&lhs) {
                    return Value::Bool(false);
                }
                let rhs = self.eval(rhs);
                Value::Bool(truthy(&rhs))
            }
            BinaryOp::Or => {
                let lhs = self.eval(lhs);
                if truthy(&lhs) {
                    return Value::Bool(true);
                }
                let rhs = self.eval(rhs);
                Value::Bool(truthy(&rhs))
            }
            _ => {
                let lhs = self.eval(lhs);
                let rhs = self.eval(rhs);
                match op {
                    BinaryOp::Eq => Value::Bool(value_eq(&lhs, &rhs)),
                    BinaryOp::Gt => compare(&lhs, &rhs, |a, b| a > b),
                    BinaryOp::Gte => compare(&lhs, &rhs, |a, b| a >= b),
                    BinaryOp::Lt => compare(&lhs, &rhs, |a, b| a < b),
                    BinaryOp::Add => arithmetic(&lhs, &rhs, |a, b| a + b),
                    BinaryOp::Sub => arithmetic(&lhs, &rhs, |a, b| a - b),
                    BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
                }
            }
        }
    }

    fn eval_slice(&mut self, list: &Expr, start: &Expr, end: Option<&Expr>) -> Value {
        let Value::Array(items) = self.eval(list) else {
            return Value::Array(Vec::new());
        };
        let len = items.len() as i64;
        let start = as_f64(&self.eval(start)).unwrap_or(0.0) as i64;
        let start = if start < 0 { (len + start).max(0) } else { start.min(len) };
        let end = match end {
            Some(end) => {
                let end = as_f64(&self.eval(end)).unwrap_or(len as f64) as i64;
                end.clamp(start, len)
            }
            None => len,
        };
        Value::Array(items[start as usize..end as usize].to_vec())
    }

    // ── Invocation ───────────────────────────────────────────────────

    /// Route an invocation: an event name defers dispatch to the harness, a
    /// known function runs immediately, anything else is an inert
    /// capability call recorded for structural assertions.
    fn eval_invoke(&mut self, target: &str, args: &[Expr]) -> Value {
        if let Some(kind) = EventKind::parse(target) {
            self.runtime.pending_events.push(kind);
            return Value::Null;
        }
        if let Some(def) = self.functions.get(target).cloned() {
            let mut frame = Map::new();
            for (param, arg) in def.params.iter().zip(args) {
                let value = self.eval(arg);
                frame.insert(param.clone(), value);
            }
            let saved_frames =
                std::mem::replace(&mut self.frames, vec![Value::Object(frame)]);
            let saved_result = self.result.take();
            for expr in &def.body {
                self.eval(expr);
            }
            let value = self.result.take().unwrap_or(Value::Null);
            self.frames = saved_frames;
            self.result = saved_result;
            return value;
        }
        self.runtime.invocations.push(target.to_owned());
        Value::Null
    }
}

// ---------------------------------------------------------------------------
// Value helpers
// ---------------------------------------------------------------------------

/// Truthiness: null, false, zero, and the empty string are false.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Equality with numeric coercion, so `0` and `0.0` compare equal.
pub(crate) fn value_eq(lhs: &Value, rhs: &Value) -> bool {
    match (as_f64(lhs), as_f64(rhs)) {
        (Some(a), Some(b)) => a == b,
        _ => lhs == rhs,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    value.as_f64()
}

fn as_index(value: &Value) -> Option<usize> {
    let index = as_f64(value)?;
    if index < 0.0 {
        return None;
    }
    Some(index as usize)
}

fn compare(lhs: &Value, rhs: &Value, op: impl Fn(f64, f64) -> bool) -> Value {
    match (as_f64(lhs), as_f64(rhs)) {
        (Some(a), Some(b)) => Value::Bool(op(a, b)),
        _ => Value::Bool(false),
    }
}

fn arithmetic(lhs: &Value, rhs: &Value, op: impl Fn(f64, f64) -> f64) -> Value {
    match (as_f64(lhs), as_f64(rhs)) {
        (Some(a), Some(b)) => Value::from(op(a, b)),
        _ => Value::Null,
    }
}

/// Index a value by key: object field or list element.
fn index_value<'v>(value: &'v Value, key: &Value) -> Option<&'v Value> {
    match (value, key) {
        (Value::Object(map), Value::String(key)) => map.get(key),
        (Value::Array(items), key) => items.get(as_index(key)?),
        _ => None,
    }
}

/// Like [`index_value`] but mutable, creating missing object keys so
/// assignment paths can extend state.
fn descend<'v>(value: &'v mut Value, key: &Value) -> Option<&'v mut Value> {
    match (value, key) {
        (Value::Object(map), Value::String(key)) => {
            Some(map.entry(key.clone()).or_insert(Value::Null))
        }
        (Value::Array(items), key) => items.get_mut(as_index(key)?),
        _ => None,
    }
}

// ===========================================================================
// Tests
// ===========================================================================
