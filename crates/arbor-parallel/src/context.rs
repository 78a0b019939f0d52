// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Per-node context for parallel walks.
//!
//! A [`ParallelContext`] borrows its parent context. Child tasks only run
//! while the parent's task is blocked waiting for them, so the borrow
//! always outlives every child.

use std::any::Any;

use arbor_core::{
    Breadcrumb, ChildEdit, ModificationType, NodeIdentity, NodeLocation, Phase, SyncVars,
};

/// The context handed to [`ParallelVisitor`](crate::ParallelVisitor)
/// callbacks.
pub struct ParallelContext<'p, N> {
    node: N,
    original: Option<N>,
    parent: Option<&'p ParallelContext<'p, N>>,
    root_vars: &'p SyncVars,
    location: Option<NodeLocation>,
    depth: usize,
    pub(crate) phase: Phase,
    pub(crate) visited: bool,
    deleted: bool,
    /// Set by `change_node`; merging child edits does not set it.
    changed: bool,
    vars: SyncVars,
    edits: Vec<(ModificationType, N)>,
}

impl<'p, N> ParallelContext<'p, N> {
    pub(crate) fn root(node: N, root_vars: &'p SyncVars) -> Self {
        Self {
            node,
            original: None,
            parent: None,
            root_vars,
            location: None,
            depth: 0,
            phase: Phase::Enter,
            visited: false,
            deleted: false,
            changed: false,
            vars: SyncVars::new(),
            edits: Vec::new(),
        }
    }

    pub(crate) fn child(
        node: N,
        parent: &'p ParallelContext<'p, N>,
        location: NodeLocation,
    ) -> Self {
        Self {
            node,
            original: None,
            parent: Some(parent),
            root_vars: parent.root_vars,
            location: Some(location),
            depth: parent.depth + 1,
            phase: Phase::Enter,
            visited: false,
            deleted: false,
            changed: false,
            vars: SyncVars::new(),
            edits: Vec::new(),
        }
    }

    /// Consume a child context, turning its edits into edits of its parent.
    pub(crate) fn into_child_edits(self) -> Vec<ChildEdit<N>> {
        let Some(location) = self.location else {
            return Vec::new();
        };
        self.edits
            .into_iter()
            .map(|(kind, node)| ChildEdit::new(location.clone(), kind, node))
            .collect()
    }

    pub(crate) fn into_node(self) -> N {
        self.node
    }

    /// Swap in a new node, remembering the first original.
    fn replace_node(&mut self, node: N) {
        let previous = std::mem::replace(&mut self.node, node);
        if self.original.is_none() {
            self.original = Some(previous);
        }
    }

    pub fn this_node(&self) -> &N {
        &self.node
    }

    /// The node as it was first reached, before any change.
    pub fn original_node(&self) -> &N {
        self.original.as_ref().unwrap_or(&self.node)
    }

    pub fn parent_context(&self) -> Option<&'p ParallelContext<'p, N>> {
        self.parent
    }

    pub fn parent_node(&self) -> Option<&'p N> {
        self.parent.map(|parent| &parent.node)
    }

    /// Location in the parent, `None` for the root.
    pub fn location(&self) -> Option<&NodeLocation> {
        self.location.as_ref()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_root_context(&self) -> bool {
        self.parent.is_none()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True when this occurrence repeats an ancestor.
    pub fn is_visited(&self) -> bool {
        self.visited
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Number of edits this context will hand to its parent.
    pub fn pending_edits(&self) -> usize {
        self.edits.len()
    }

    pub fn var<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.vars.get::<T>()
    }

    pub fn var_mut<T: Any + Send + Sync>(&mut self) -> Option<&mut T> {
        self.vars.get_mut::<T>()
    }

    pub fn set_var<T: Any + Send + Sync>(&mut self, value: T) -> Option<T> {
        self.vars.insert(value)
    }

    /// The nearest ancestor's variable of type `T`, falling back to the
    /// root variables.
    pub fn var_from_parents<T: Any + Send + Sync>(&self) -> Option<&T> {
        let mut parent = self.parent;
        while let Some(context) = parent {
            if let Some(value) = context.vars.get::<T>() {
                return Some(value);
            }
            parent = context.parent;
        }
        self.root_vars.get::<T>()
    }
}

impl<N: NodeIdentity> ParallelContext<'_, N> {
    /// True if the node is the same node as one of its ancestors.
    pub(crate) fn repeats_ancestor(&self) -> bool {
        let id = self.node.node_id();
        let mut parent = self.parent;
        while let Some(context) = parent {
            if context.node.node_id() == id {
                return true;
            }
            parent = context.parent;
        }
        false
    }
}

impl<N: Clone> ParallelContext<'_, N> {
    /// Ancestor nodes, nearest first.
    pub fn parent_nodes(&self) -> Vec<N> {
        let mut nodes = Vec::with_capacity(self.depth);
        let mut parent = self.parent;
        while let Some(context) = parent {
            nodes.push(context.node.clone());
            parent = context.parent;
        }
        nodes
    }

    /// Path to the root, nearest ancestor first.
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb<N>> {
        let mut crumbs = Vec::with_capacity(self.depth);
        let mut current: &ParallelContext<'_, N> = self;
        while let (Some(parent), Some(location)) = (current.parent, current.location.as_ref()) {
            crumbs.push(Breadcrumb::new(parent.node.clone(), location.clone()));
            current = parent;
        }
        crumbs
    }

    /// Replace the current node. Descent continues into `node`.
    ///
    /// # Panics
    ///
    /// If the node was deleted.
    pub fn change_node(&mut self, node: N) {
        assert!(!self.deleted, "cannot change a deleted node");
        self.changed = true;
        self.record_replacement(node);
    }

    /// Record `node` as this context's replacement, merging with any earlier
    /// replacement.
    pub(crate) fn record_replacement(&mut self, node: N) {
        match self
            .edits
            .iter_mut()
            .find(|(kind, _)| *kind == ModificationType::Replace)
        {
            Some((_, replacement)) => *replacement = node.clone(),
            None => self.edits.push((ModificationType::Replace, node.clone())),
        }
        self.replace_node(node);
    }

    /// Delete the current node. Its children are not visited.
    ///
    /// Called from `leave`, the deletion discards the merged edits of the
    /// node's children.
    ///
    /// # Panics
    ///
    /// On the root, or on a node already changed or used as an insertion
    /// anchor.
    pub fn delete_node(&mut self) {
        assert!(!self.is_root_context(), "the root node cannot be deleted");
        assert!(!self.deleted, "node is already deleted");
        assert!(
            !self.changed && self.edits.iter().all(|(kind, _)| !kind.is_insertion()),
            "a changed node or an insertion anchor cannot also be deleted"
        );
        self.edits.clear();
        self.deleted = true;
        self.edits.push((ModificationType::Delete, self.node.clone()));
    }

    /// Insert `node` as the sibling immediately before the current node.
    ///
    /// # Panics
    ///
    /// On the root or on a deleted node.
    pub fn insert_before(&mut self, node: N) {
        self.insert(ModificationType::InsertBefore, node);
    }

    /// Insert `node` as the sibling immediately after the current node.
    ///
    /// # Panics
    ///
    /// On the root or on a deleted node.
    pub fn insert_after(&mut self, node: N) {
        self.insert(ModificationType::InsertAfter, node);
    }

    fn insert(&mut self, kind: ModificationType, node: N) {
        assert!(
            !self.is_root_context(),
            "siblings cannot be inserted around the root node"
        );
        assert!(!self.deleted, "cannot insert around a deleted node");
        self.edits.push((kind, node));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::testing::{leaf, node, TestNode};

    fn with_child<R>(f: impl FnOnce(&mut ParallelContext<'_, TestNode>) -> R) -> R {
        let mut root_vars = SyncVars::new();
        root_vars.insert(7u32);
        let mut root = ParallelContext::root(node("a", vec![leaf("b")]), &root_vars);
        root.set_var("from-root");
        let parent = &root;
        let mut child = ParallelContext::child(leaf("b"), parent, NodeLocation::unnamed(0));
        f(&mut child)
    }

    #[test]
    fn navigation() {
        with_child(|child| {
            assert_eq!(child.depth(), 1);
            assert!(!child.is_root_context());
            assert_eq!(child.parent_node().unwrap().label, "a");
            assert_eq!(child.location(), Some(&NodeLocation::unnamed(0)));
            let crumbs = child.breadcrumbs();
            assert_eq!(crumbs.len(), 1);
            assert_eq!(crumbs[0].node.label, "a");
            assert_eq!(child.parent_nodes().len(), 1);
        });
    }

    #[test]
    fn vars_lookup() {
        with_child(|child| {
            assert_eq!(child.var_from_parents::<&str>(), Some(&"from-root"));
            assert_eq!(child.var_from_parents::<u32>(), Some(&7));
            assert!(child.var::<u32>().is_none());
            child.set_var(1u8);
            *child.var_mut::<u8>().unwrap() += 1;
            assert_eq!(child.var::<u8>(), Some(&2));
        });
    }

    #[test]
    fn change_twice_keeps_one_replacement() {
        with_child(|child| {
            child.change_node(leaf("x"));
            child.change_node(leaf("y"));
            assert_eq!(child.this_node().label, "y");
            assert_eq!(child.original_node().label, "b");
            assert_eq!(child.pending_edits(), 1);
        });
    }

    #[test]
    fn child_edits_carry_location() {
        let root_vars = SyncVars::new();
        let root = ParallelContext::root(node("a", vec![leaf("b"), leaf("c")]), &root_vars);
        let mut child = ParallelContext::child(leaf("c"), &root, NodeLocation::unnamed(1));
        child.insert_before(leaf("x"));
        child.change_node(leaf("C"));
        let edits = child.into_child_edits();
        assert_eq!(edits.len(), 2);
        assert!(edits.iter().all(|edit| edit.location == NodeLocation::unnamed(1)));
        assert_eq!(edits[0].kind, ModificationType::InsertBefore);
        assert_eq!(edits[1].node.label, "C");
        assert!(ParallelContext::root(leaf("r"), &root_vars).into_child_edits().is_empty());
    }

    #[test]
    #[should_panic(expected = "cannot also be deleted")]
    fn delete_after_insert() {
        with_child(|child| {
            child.insert_after(leaf("x"));
            child.delete_node();
        });
    }

    #[test]
    fn delete_replaces_merged_children() {
        with_child(|child| {
            child.record_replacement(leaf("merged"));
            child.delete_node();
            assert!(child.is_deleted());
            assert_eq!(child.pending_edits(), 1);
        });
    }

    #[test]
    #[should_panic(expected = "cannot also be deleted")]
    fn delete_after_change() {
        with_child(|child| {
            child.change_node(leaf("x"));
            child.delete_node();
        });
    }

    #[test]
    #[should_panic(expected = "root node cannot be deleted")]
    fn delete_root() {
        let root_vars = SyncVars::new();
        let mut root = ParallelContext::root(leaf("r"), &root_vars);
        root.delete_node();
    }
}
