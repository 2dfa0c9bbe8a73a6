//! The expression algebra: behavior programs as data.
//!
//! Event handlers and function bundles are not Rust closures — they are
//! [`Expr`] trees built from the combinators below and handed to an external
//! compiler/executor per target platform. This module only *constructs*
//! expressions; it never evaluates them. Construction is referentially
//! transparent: building a program has no side effects.
//!
//! Three root bindings are always in scope for a handler program: `global`,
//! `local`, and `event`. [`declare`] introduces further scoped bindings;
//! [`for_each`] binds `item` and `index` inside its body.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// AST
// ---------------------------------------------------------------------------

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnaryOp {
    Not,
}

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryOp {
    Eq,
    Gt,
    Gte,
    Lt,
    And,
    Or,
    Add,
    Sub,
}

/// One node of an expression program.
///
/// Programs are plain serde data: a platform interpreter walks the same
/// tree this crate builds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// A literal JSON value.
    Lit(Value),
    /// A record literal with expression-valued fields, in declaration order.
    Obj(Vec<(String, Expr)>),
    /// A list literal with expression-valued elements.
    Arr(Vec<Expr>),
    /// A named binding: `global`, `local`, `event`, a [`declare`]d name, a
    /// function parameter, or a harness mock.
    Bind(String),
    /// Keyed or indexed access on a target expression.
    Symbol { target: Box<Expr>, key: Box<Expr> },
    /// Assign `value` to the place described by `target`.
    Set { target: Box<Expr>, value: Box<Expr> },
    /// Run expressions in order.
    Block(Vec<Expr>),
    /// Conditional with optional else branch.
    If {
        cond: Box<Expr>,
        then: Box<Expr>,
        #[serde(skip_serializing_if = "Option::is_none")]
        otherwise: Option<Box<Expr>>,
    },
    /// Introduce scoped bindings, then run the body.
    Declare {
        bindings: Vec<(String, Expr)>,
        body: Vec<Expr>,
    },
    /// `value` if present (non-null), else `default`.
    Fallback { value: Box<Expr>, default: Box<Expr> },
    /// Apply a unary operator.
    Unary { op: UnaryOp, expr: Box<Expr> },
    /// Apply a binary operator.
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Cross-handler side-effecting call: a function-bundle member
    /// (`"navigation.push_route"`), an event name (`"onBack"`), or a
    /// platform capability (`"speech.listen"`).
    Invoke { target: String, args: Vec<Expr> },
    /// Yield a value from the enclosing handler or function.
    Result(Box<Expr>),
    /// Length of a list or string.
    Length(Box<Expr>),
    /// Concatenate lists.
    Concat(Vec<Expr>),
    /// Sub-list `[start, end)`; a negative start counts from the end; an
    /// absent end means "to the end".
    Slice {
        list: Box<Expr>,
        start: Box<Expr>,
        #[serde(skip_serializing_if = "Option::is_none")]
        end: Option<Box<Expr>>,
    },
    /// Run the body once per element, binding `item` and `index`.
    ForEach { list: Box<Expr>, body: Vec<Expr> },
    /// The current timestamp, in milliseconds.
    Now,
    /// A freshly generated unique id string.
    GenId,
    /// Schedule the body to run after `delay` milliseconds. Fire-and-forget:
    /// scheduled work is never cancelled.
    Timeout { delay: Box<Expr>, body: Vec<Expr> },
}

impl Expr {
    /// The `global` state binding.
    pub fn global() -> Expr {
        Expr::Bind("global".into())
    }

    /// The `local` state binding.
    pub fn local() -> Expr {
        Expr::Bind("local".into())
    }

    /// The `event` payload binding.
    pub fn event() -> Expr {
        Expr::Bind("event".into())
    }

    /// Keyed access: `self[key]` with a literal string key.
    pub fn key(self, key: impl Into<String>) -> Expr {
        Expr::Symbol {
            target: Box::new(self),
            key: Box::new(Expr::Lit(Value::String(key.into()))),
        }
    }

    /// Indexed access: `self[index]` with a computed key.
    pub fn index(self, index: Expr) -> Expr {
        Expr::Symbol {
            target: Box::new(self),
            key: Box::new(index),
        }
    }

    /// Length of this expression's value.
    pub fn length(self) -> Expr {
        Expr::Length(Box::new(self))
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Lit(value)
    }
}

// ---------------------------------------------------------------------------
// Constructors
// ---------------------------------------------------------------------------

/// A literal value.
pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::Lit(value.into())
}

/// A named binding.
pub fn bind(name: impl Into<String>) -> Expr {
    Expr::Bind(name.into())
}

/// A record literal with expression-valued fields.
pub fn obj<K: Into<String>>(fields: impl IntoIterator<Item = (K, Expr)>) -> Expr {
    Expr::Obj(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
}

/// A list literal with expression-valued elements.
pub fn arr(items: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Arr(items.into_iter().collect())
}

/// Keyed/indexed access on `target`.
pub fn symbol(target: Expr, key: Expr) -> Expr {
    target.index(key)
}

/// Assign `value` to the place described by `target`.
pub fn set(target: Expr, value: Expr) -> Expr {
    Expr::Set {
        target: Box::new(target),
        value: Box::new(value),
    }
}

/// Run expressions in order.
pub fn block(body: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Block(body.into_iter().collect())
}

/// Introduce scoped bindings, then run the body.
pub fn declare<K: Into<String>>(
    bindings: impl IntoIterator<Item = (K, Expr)>,
    body: impl IntoIterator<Item = Expr>,
) -> Expr {
    Expr::Declare {
        bindings: bindings.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        body: body.into_iter().collect(),
    }
}

/// `value` if present (non-null), else `default`.
pub fn fallback(value: Expr, default: Expr) -> Expr {
    Expr::Fallback {
        value: Box::new(value),
        default: Box::new(default),
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

/// Equality.
pub fn eq(lhs: Expr, rhs: Expr) -> Expr {
    binary(BinaryOp::Eq, lhs, rhs)
}

/// Greater-than.
pub fn gt(lhs: Expr, rhs: Expr) -> Expr {
    binary(BinaryOp::Gt, lhs, rhs)
}

/// Greater-or-equal.
pub fn gte(lhs: Expr, rhs: Expr) -> Expr {
    binary(BinaryOp::Gte, lhs, rhs)
}

/// Less-than.
pub fn lt(lhs: Expr, rhs: Expr) -> Expr {
    binary(BinaryOp::Lt, lhs, rhs)
}

/// Logical conjunction (short-circuit).
pub fn and(lhs: Expr, rhs: Expr) -> Expr {
    binary(BinaryOp::And, lhs, rhs)
}

/// Logical disjunction (short-circuit).
pub fn or(lhs: Expr, rhs: Expr) -> Expr {
    binary(BinaryOp::Or, lhs, rhs)
}

/// Numeric addition.
pub fn add(lhs: Expr, rhs: Expr) -> Expr {
    binary(BinaryOp::Add, lhs, rhs)
}

/// Numeric subtraction.
pub fn sub(lhs: Expr, rhs: Expr) -> Expr {
    binary(BinaryOp::Sub, lhs, rhs)
}

/// Logical negation.
pub fn not(expr: Expr) -> Expr {
    Expr::Unary {
        op: UnaryOp::Not,
        expr: Box::new(expr),
    }
}

/// Cross-handler side-effecting call.
pub fn invoke(target: impl Into<String>, args: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Invoke {
        target: target.into(),
        args: args.into_iter().collect(),
    }
}

/// Yield a value from the enclosing handler or function.
pub fn result(expr: Expr) -> Expr {
    Expr::Result(Box::new(expr))
}

/// Length of a list or string.
pub fn length(expr: Expr) -> Expr {
    expr.length()
}

/// Concatenate lists.
pub fn concat(lists: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Concat(lists.into_iter().collect())
}

/// Sub-list `[start, end)`. Pass `None` for "to the end"; a negative start
/// counts from the end of the list.
pub fn slice(list: Expr, start: Expr, end: impl Into<Option<Expr>>) -> Expr {
    Expr::Slice {
        list: Box::new(list),
        start: Box::new(start),
        end: end.into().map(Box::new),
    }
}

/// Run the body once per element of `list`, binding `item` and `index`.
pub fn for_each(list: Expr, body: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::ForEach {
        list: Box::new(list),
        body: body.into_iter().collect(),
    }
}

/// The current timestamp, in milliseconds.
pub fn now() -> Expr {
    Expr::Now
}

/// A freshly generated unique id string.
pub fn gen_id() -> Expr {
    Expr::GenId
}

/// Schedule the body to run after `delay` milliseconds.
pub fn timeout(delay: Expr, body: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Timeout {
        delay: Box::new(delay),
        body: body.into_iter().collect(),
    }
}

// ---------------------------------------------------------------------------
// Condition
// ---------------------------------------------------------------------------

/// A conditional under construction; finish with [`Condition::otherwise`]
/// or [`Condition::end`].
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    cond: Expr,
    then: Expr,
}

/// Begin a conditional.
pub fn condition(cond: Expr, then: Expr) -> Condition {
    Condition { cond, then }
}

impl Condition {
    /// Attach an else branch and finish.
    pub fn otherwise(self, otherwise: Expr) -> Expr {
        Expr::If {
            cond: Box::new(self.cond),
            then: Box::new(self.then),
            otherwise: Some(Box::new(otherwise)),
        }
    }

    /// Finish without an else branch.
    pub fn end(self) -> Expr {
        Expr::If {
            cond: Box::new(self.cond),
            then: Box::new(self.then),
            otherwise: None,
        }
    }
}

impl From<Condition> for Expr {
    fn from(condition: Condition) -> Expr {
        condition.end()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn key_builds_symbol_chain() {
        let expr = Expr::global().key("routes").key("length");
        match expr {
            Expr::Symbol { target, key } => {
                assert_eq!(*key, lit("length"));
                assert!(matches!(*target, Expr::Symbol { .. }));
            }
            other => panic!("expected symbol, got {other:?}"),
        }
    }

    #[test]
    fn condition_without_otherwise() {
        let expr = condition(lit(true), lit(1)).end();
        assert_eq!(
            expr,
            Expr::If {
                cond: Box::new(lit(true)),
                then: Box::new(lit(1)),
                otherwise: None,
            }
        );
    }

    #[test]
    fn condition_with_otherwise() {
        let expr = condition(lit(false), lit(1)).otherwise(lit(2));
        match expr {
            Expr::If { otherwise, .. } => assert_eq!(otherwise, Some(Box::new(lit(2)))),
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn obj_preserves_field_order() {
        let expr = obj([("b", lit(1)), ("a", lit(2))]);
        match expr {
            Expr::Obj(fields) => {
                assert_eq!(fields[0].0, "b");
                assert_eq!(fields[1].0, "a");
            }
            other => panic!("expected obj, got {other:?}"),
        }
    }

    #[test]
    fn slice_without_end() {
        let expr = slice(bind("routes"), lit(-1), None);
        match expr {
            Expr::Slice { end, .. } => assert!(end.is_none()),
            other => panic!("expected slice, got {other:?}"),
        }
    }

    #[test]
    fn construction_is_pure() {
        // Building the same program twice yields identical data.
        let build = || {
            declare(
                [("routes", fallback(Expr::global().key("routes"), arr([])))],
                [set(Expr::global().key("routes"), slice(bind("routes"), lit(0), lit(1)))],
            )
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn programs_serialize() {
        let program = set(Expr::event().key("data"), Expr::global().key("routes"));
        let value = serde_json::to_value(&program).unwrap();
        // Externally tagged: the variant name is the single key.
        assert!(value.get("set").is_some());
        let back: Expr = serde_json::from_value(value).unwrap();
        assert_eq!(back, program);
    }

    #[test]
    fn lit_accepts_json_scalars() {
        assert_eq!(lit("home"), Expr::Lit(json!("home")));
        assert_eq!(lit(0), Expr::Lit(json!(0)));
        assert_eq!(lit(true), Expr::Lit(json!(true)));
    }
}
