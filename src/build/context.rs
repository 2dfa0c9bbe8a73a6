//! Build context: the explicit state threaded through nested builders.
//!
//! Instead of captured mutable variables, every combinator receives a
//! `&mut BuildContext` holding the current parent node, the application
//! state visible at assembly time, the id registry for this assembly
//! session, and the diagnostics collector.

use serde_json::Value;

use crate::component::{Component, Tag};
use crate::diag::{Diagnostic, Diagnostics};
use crate::geometry::WRAP;

// ---------------------------------------------------------------------------
// IdRegistry
// ---------------------------------------------------------------------------

/// Tracks node ids for one assembly session.
///
/// Uniqueness is required within one tree build, not process-wide, so the
/// registry lives in the [`BuildContext`] rather than in module state.
/// Collisions are flagged, never blocked: both nodes keep the id.
#[derive(Debug, Clone, Default)]
pub struct IdRegistry {
    seen: std::collections::BTreeSet<String>,
    seq: u64,
}

impl IdRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh id, distinct from every id this registry has seen.
    pub fn generate(&mut self) -> String {
        loop {
            let id = format!("_{:x}", self.seq);
            self.seq += 1;
            if self.seen.insert(id.clone()) {
                return id;
            }
        }
    }

    /// Record a caller-supplied id. Returns `false` if it was already
    /// claimed in this session.
    pub fn claim(&mut self, id: &str) -> bool {
        self.seen.insert(id.to_owned())
    }
}

// ---------------------------------------------------------------------------
// BuildContext
// ---------------------------------------------------------------------------

/// The immediate context a builder runs against: `{parent, global, local}`
/// plus the per-session id registry and diagnostics.
#[derive(Debug)]
pub struct BuildContext {
    pub(crate) parent: Component,
    /// Application-wide state visible at assembly time.
    pub global: Value,
    /// Screen- or item-local state visible at assembly time.
    pub local: Value,
    ids: IdRegistry,
    diagnostics: Diagnostics,
}

impl BuildContext {
    /// Create a context rooted at a fresh `root` node.
    pub fn new(global: Value, local: Value) -> Self {
        Self {
            parent: Component::new(Tag::Root, WRAP, WRAP),
            global,
            local,
            ids: IdRegistry::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// The node builders are currently attaching to.
    pub fn parent(&self) -> &Component {
        &self.parent
    }

    /// Mutable access to the current parent node.
    pub fn parent_mut(&mut self) -> &mut Component {
        &mut self.parent
    }

    /// Assign a registry-generated id to the current parent if it has none
    /// yet, and return the id it ends up with.
    pub fn ensure_parent_id(&mut self) -> &str {
        if self.parent.id.is_none() {
            self.parent.id = Some(self.ids.generate());
        }
        self.parent.id.as_deref().expect("id just ensured")
    }

    /// Record a caller-supplied id for the current parent, flagging
    /// duplicates within this session.
    pub fn claim_parent_id(&mut self, id: String) {
        if !self.ids.claim(&id) {
            self.diagnostics.push(Diagnostic::DuplicateId(id.clone()));
        }
        self.parent.id = Some(id);
    }

    /// Append a diagnostic.
    pub fn warn(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Finish the session: the root node and everything collected on the
    /// way.
    pub fn finish(self) -> (Component, Diagnostics) {
        (self.parent, self.diagnostics)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
