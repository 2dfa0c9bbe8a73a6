//! A slotmap-backed index over a built tree.
//!
//! The tree itself is immutable once built, so the index is computed once:
//! every node gets a stable [`NodeKey`], its path from the root, and its id
//! if it has one. Traversal order is depth-first, parent before children —
//! the order dispatch and re-evaluation use.

use slotmap::{new_key_type, SlotMap};

use crate::component::Component;

new_key_type! {
    /// Stable key for one node in an indexed tree.
    pub struct NodeKey;
}

/// Index entry: where the node lives and what it is called.
#[derive(Debug, Clone)]
pub struct NodeEntry {
    /// Child indices from the root down to this node. Empty for the root.
    pub path: Vec<usize>,
    /// The node's explicit or lazily assigned id, if any.
    pub id: Option<String>,
}

/// The index over one built tree.
#[derive(Debug)]
pub struct TreeIndex {
    entries: SlotMap<NodeKey, NodeEntry>,
    order: Vec<NodeKey>,
}

impl TreeIndex {
    /// Index a tree, assigning keys in depth-first parent-first order.
    pub fn build(root: &Component) -> Self {
        let mut index = Self {
            entries: SlotMap::with_key(),
            order: Vec::new(),
        };
        index.visit(root, Vec::new());
        index
    }

    fn visit(&mut self, node: &Component, path: Vec<usize>) {
        let key = self.entries.insert(NodeEntry {
            path: path.clone(),
            id: node.id.clone(),
        });
        self.order.push(key);
        for (i, child) in node.children().iter().enumerate() {
            let mut child_path = path.clone();
            child_path.push(i);
            self.visit(child, child_path);
        }
    }

    /// All keys in traversal order.
    pub fn order(&self) -> &[NodeKey] {
        &self.order
    }

    /// The entry for a key.
    pub fn get(&self, key: NodeKey) -> Option<&NodeEntry> {
        self.entries.get(key)
    }

    /// The first node (in traversal order) with the given id.
    pub fn find(&self, id: &str) -> Option<NodeKey> {
        self.order
            .iter()
            .copied()
            .find(|&key| self.entries[key].id.as_deref() == Some(id))
    }

    /// Follow a key's path back into the tree it was built from.
    pub fn resolve<'a>(&self, root: &'a Component, key: NodeKey) -> Option<&'a Component> {
        let entry = self.entries.get(key)?;
        let mut node = root;
        for &i in &entry.path {
            node = node.children().get(i)?;
        }
        Some(node)
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
