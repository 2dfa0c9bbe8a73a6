//! Event registration, explicit ids, adapters, and function bundles.
//!
//! Registrars append a program to the node's ordered list for one event
//! kind, lazily assigning a stable id the first time anything is attached.
//! Multiple attachments to the same event accumulate in registration order
//! and all fire on dispatch, in that order.

use crate::behavior::FunctionBundle;
use crate::component::EventKind;
use crate::expr::{self, Expr};

use super::fragment::{AdapterMap, Fragment};

// ---------------------------------------------------------------------------
// Registrars
// ---------------------------------------------------------------------------

fn event(kind: EventKind, program: Expr) -> Fragment {
    Fragment::new(move |ctx| {
        ctx.ensure_parent_id();
        ctx.parent_mut().events.push(kind, program.clone());
    })
}

/// Bind a program re-evaluated on every update pass, with the node itself
/// as the event payload.
pub fn observe(program: impl Into<Expr>) -> Fragment {
    event(EventKind::Observe, program.into())
}

/// Run a program once when the node enters the tree.
pub fn on_init(program: impl Into<Expr>) -> Fragment {
    event(EventKind::Init, program.into())
}

/// Run a program when the node is entered (focus/submit).
pub fn on_enter(program: impl Into<Expr>) -> Fragment {
    event(EventKind::Enter, program.into())
}

/// Run a program when the node is clicked.
pub fn on_click(program: impl Into<Expr>) -> Fragment {
    event(EventKind::Click, program.into())
}

/// Run a program when back navigation is requested.
pub fn on_back(program: impl Into<Expr>) -> Fragment {
    event(EventKind::Back, program.into())
}

/// Run a program when the node's input value changes, with the new value
/// as the event payload.
pub fn on_change(program: impl Into<Expr>) -> Fragment {
    event(EventKind::Change, program.into())
}

/// Run a program when the node's on-screen rectangle changes, with the
/// rectangle as the event payload.
pub fn on_resize(program: impl Into<Expr>) -> Fragment {
    event(EventKind::Resize, program.into())
}

// ---------------------------------------------------------------------------
// Explicit id
// ---------------------------------------------------------------------------

/// Give the node an explicit id.
///
/// Ids must be unique within one tree build; a collision is flagged as a
/// diagnostic and both nodes keep the id.
pub fn id(value: impl Into<String>) -> Fragment {
    let value = value.into();
    Fragment::new(move |ctx| {
        ctx.claim_parent_id(value.clone());
    })
}

// ---------------------------------------------------------------------------
// Adapters and function bundles
// ---------------------------------------------------------------------------

/// Attach named sub-tree templates to the node for runtime-keyed list
/// instantiation.
///
/// The map is stored faithfully and exposed unchanged; resolving a data
/// record's discriminator against it is a renderer concern. Attaching
/// adapters lazily ids the node.
pub fn adapters<K: Into<String>>(entries: impl IntoIterator<Item = (K, Fragment)>) -> Fragment {
    let map: AdapterMap = entries
        .into_iter()
        .map(|(name, template)| (name.into(), template))
        .collect();
    Fragment::new(move |ctx| {
        ctx.ensure_parent_id();
        ctx.parent_mut().adapters = Some(map.clone());
    })
}

/// Attach a function bundle to the node, making its members invokable by
/// name from any handler program.
pub fn funcs(bundle: FunctionBundle) -> Fragment {
    Fragment::new(move |ctx| {
        ctx.parent_mut()
            .funcs
            .get_or_insert_with(Vec::new)
            .push(bundle.clone());
    })
}

// ---------------------------------------------------------------------------
// Two-way binding
// ---------------------------------------------------------------------------

/// Bind an input node's value to a state place, both ways: `onChange`
/// writes the event payload into the place, and every update pass reflects
/// the place back into the node's value.
pub fn bind_value(place: Expr) -> Fragment {
    let write = on_change(expr::set(place.clone(), Expr::event()));
    let read = observe(expr::set(Expr::event().key("value"), place));
    Fragment::new(move |ctx| {
        write.apply(ctx);
        read.apply(ctx);
    })
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{text, BuildContext};
    use crate::diag::Diagnostic;
    use crate::expr::{lit, set};
    use crate::geometry::WRAP;
    use crate::props;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn ctx() -> BuildContext {
        BuildContext::new(json!({}), json!({}))
    }

    // ── Registration ─────────────────────────────────────────────────

    #[test]
    fn registrar_assigns_id_lazily() {
        let mut ctx = ctx();
        assert!(ctx.parent().id.is_none());
        on_click(lit(1)).apply(&mut ctx);
        let (root, _) = ctx.finish();
        assert!(root.id.is_some());
    }

    #[test]
    fn registrar_keeps_existing_id() {
        let mut ctx = ctx();
        id("fixed").apply(&mut ctx);
        on_click(lit(1)).apply(&mut ctx);
        let (root, _) = ctx.finish();
        assert_eq!(root.id.as_deref(), Some("fixed"));
    }

    #[test]
    fn handlers_accumulate_in_registration_order() {
        let mut ctx = ctx();
        on_click(lit("first")).apply(&mut ctx);
        on_click(lit("second")).apply(&mut ctx);
        let (root, _) = ctx.finish();
        let list = root.events.list(EventKind::Click).unwrap();
        assert_eq!(list, &[lit("first"), lit("second")]);
    }

    // ── Ids ──────────────────────────────────────────────────────────

    #[test]
    fn duplicate_ids_flag_but_both_nodes_keep_them() {
        let mut ctx = ctx();
        text(WRAP, WRAP, props!["a", id("shared")]).apply(&mut ctx);
        text(WRAP, WRAP, props!["b", id("shared")]).apply(&mut ctx);
        let (root, diags) = ctx.finish();
        assert_eq!(root.children()[0].id.as_deref(), Some("shared"));
        assert_eq!(root.children()[1].id.as_deref(), Some("shared"));
        assert!(diags.contains(&Diagnostic::DuplicateId("shared".into())));
    }

    // ── Adapters ─────────────────────────────────────────────────────

    #[test]
    fn adapters_store_the_map_faithfully() {
        let mut ctx = ctx();
        adapters([
            ("home", text(WRAP, WRAP, props!["home"])),
            ("detail", text(WRAP, WRAP, props!["detail"])),
        ])
        .apply(&mut ctx);
        let (root, _) = ctx.finish();
        let map = root.adapters.as_ref().unwrap();
        assert_eq!(map.len(), 2);
        assert!(map.contains_key("home"));
        assert!(map.contains_key("detail"));
        assert!(root.id.is_some());
    }

    // ── Function bundles ─────────────────────────────────────────────

    #[test]
    fn funcs_append_bundles() {
        let mut ctx = ctx();
        funcs(FunctionBundle::new("a")).apply(&mut ctx);
        funcs(FunctionBundle::new("b")).apply(&mut ctx);
        let (root, _) = ctx.finish();
        let bundles = root.funcs.as_ref().unwrap();
        assert_eq!(bundles.len(), 2);
        assert_eq!(bundles[0].name, "a");
        assert_eq!(bundles[1].name, "b");
    }

    // ── bind_value ───────────────────────────────────────────────────

    #[test]
    fn bind_value_registers_both_directions() {
        let mut ctx = ctx();
        bind_value(Expr::global().key("draft")).apply(&mut ctx);
        let (root, _) = ctx.finish();
        assert_eq!(
            root.events.list(EventKind::Change).unwrap(),
            &[set(Expr::global().key("draft"), Expr::event())]
        );
        assert_eq!(
            root.events.list(EventKind::Observe).unwrap(),
            &[set(Expr::event().key("value"), Expr::global().key("draft"))]
        );
    }
}
