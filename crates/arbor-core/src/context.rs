// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Per-node traversal contexts.
//!
//! The sequential traverser creates one context per visited node occurrence.
//! Contexts mirror the traversal as a tree, but they are not linked by owning
//! back-references: every context lives in a per-traversal arena and refers
//! to its parent by [`ContextId`]. The arena is dropped when the traverse call
//! returns.
//!
//! Visitor callbacks receive a [`TraverserContext`], a mutable handle onto
//! one arena slot plus the traversal-wide state (accumulator, shared data,
//! root variables). Read-only access to ancestors goes through
//! [`ContextView`].

use std::any::Any;

use crate::children::{Breadcrumb, NodeLocation};
use crate::vars::Vars;

/// Index of a context in the traversal arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub(crate) usize);

impl ContextId {
    /// Position of the context in creation order.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Which callback a context is currently being handed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// `enter` (or the context has not been processed yet).
    Enter,
    /// `leave`.
    Leave,
    /// `back_ref`: the node repeats an ancestor on its own path.
    BackRef,
}

pub(crate) struct ContextFrame<N> {
    pub(crate) node: N,
    pub(crate) original: Option<N>,
    pub(crate) parent: Option<ContextId>,
    pub(crate) location: Option<NodeLocation>,
    pub(crate) depth: usize,
    pub(crate) phase: Phase,
    pub(crate) visited: bool,
    pub(crate) deleted: bool,
    pub(crate) vars: Vars,
}

impl<N> ContextFrame<N> {
    pub(crate) fn root(node: N) -> Self {
        Self::new(node, None, None, 0)
    }

    pub(crate) fn child(node: N, parent: ContextId, location: NodeLocation, depth: usize) -> Self {
        Self::new(node, Some(parent), Some(location), depth)
    }

    fn new(
        node: N,
        parent: Option<ContextId>,
        location: Option<NodeLocation>,
        depth: usize,
    ) -> Self {
        Self {
            node,
            original: None,
            parent,
            location,
            depth,
            phase: Phase::Enter,
            visited: false,
            deleted: false,
            vars: Vars::new(),
        }
    }
}

/// Everything one traversal call owns.
pub(crate) struct TraversalState<N, A> {
    pub(crate) frames: Vec<ContextFrame<N>>,
    pub(crate) root_vars: Vars,
    pub(crate) shared: Vars,
    pub(crate) accumulate: A,
}

impl<N, A> TraversalState<N, A> {
    pub(crate) fn push(&mut self, frame: ContextFrame<N>) -> ContextId {
        self.frames.push(frame);
        ContextId(self.frames.len() - 1)
    }

    pub(crate) fn frame(&self, id: ContextId) -> &ContextFrame<N> {
        &self.frames[id.0]
    }

    pub(crate) fn frame_mut(&mut self, id: ContextId) -> &mut ContextFrame<N> {
        &mut self.frames[id.0]
    }

    pub(crate) fn context(&mut self, id: ContextId) -> TraverserContext<'_, N, A> {
        TraverserContext { state: self, id }
    }
}

// ============================================================================
// Read-only view
// ============================================================================

/// Read-only view of a context and its ancestors.
pub struct ContextView<'a, N> {
    frames: &'a [ContextFrame<N>],
    root_vars: &'a Vars,
    id: ContextId,
}

impl<N> Clone for ContextView<'_, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N> Copy for ContextView<'_, N> {}

impl<'a, N> ContextView<'a, N> {
    fn frame(&self) -> &'a ContextFrame<N> {
        &self.frames[self.id.0]
    }

    fn at(&self, id: ContextId) -> ContextView<'a, N> {
        ContextView {
            frames: self.frames,
            root_vars: self.root_vars,
            id,
        }
    }

    /// Arena id of this context.
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// The node as it currently stands (after any `change_node`).
    pub fn this_node(&self) -> &'a N {
        &self.frame().node
    }

    /// The node as it was first reached, before any `change_node`.
    pub fn original_node(&self) -> &'a N {
        let frame = self.frame();
        frame.original.as_ref().unwrap_or(&frame.node)
    }

    /// Location of this node in its parent; `None` for roots.
    pub fn location(&self) -> Option<&'a NodeLocation> {
        self.frame().location.as_ref()
    }

    /// Distance from the root context (roots have depth 0).
    pub fn depth(&self) -> usize {
        self.frame().depth
    }

    /// The callback this context is being processed for.
    pub fn phase(&self) -> Phase {
        self.frame().phase
    }

    /// True if this node repeats an ancestor on its path.
    pub fn is_visited(&self) -> bool {
        self.frame().visited
    }

    /// True if the node was marked deleted.
    pub fn is_deleted(&self) -> bool {
        self.frame().deleted
    }

    /// True for a context of one of the traversal roots.
    pub fn is_root_context(&self) -> bool {
        self.frame().parent.is_none()
    }

    /// The parent context.
    pub fn parent(&self) -> Option<ContextView<'a, N>> {
        self.frame().parent.map(|id| self.at(id))
    }

    /// The parent's node.
    pub fn parent_node(&self) -> Option<&'a N> {
        self.parent().map(|parent| parent.this_node())
    }

    /// Ancestors of this context, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = ContextView<'a, N>> {
        let mut next = self.parent();
        std::iter::from_fn(move || {
            let current = next?;
            next = current.parent();
            Some(current)
        })
    }

    /// A variable stored on this context.
    pub fn var<T: Any>(&self) -> Option<&'a T> {
        self.frame().vars.get::<T>()
    }

    /// The nearest variable of type `T` on an ancestor, falling back to the
    /// traversal's root variables.
    pub fn var_from_parents<T: Any>(&self) -> Option<&'a T> {
        self.ancestors()
            .find_map(|ancestor| ancestor.var::<T>())
            .or_else(|| self.root_vars.get::<T>())
    }
}

impl<'a, N: Clone> ContextView<'a, N> {
    /// Nodes of all ancestors, nearest first.
    pub fn parent_nodes(&self) -> Vec<N> {
        self.ancestors()
            .map(|ancestor| ancestor.this_node().clone())
            .collect()
    }

    /// Path from this node to the root as breadcrumbs, nearest first.
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb<N>> {
        let mut crumbs = Vec::with_capacity(self.depth());
        let mut current = *self;
        while let (Some(parent), Some(location)) = (current.parent(), current.location()) {
            crumbs.push(Breadcrumb::new(parent.this_node().clone(), location.clone()));
            current = parent;
        }
        crumbs
    }
}

// ============================================================================
// Mutable handle
// ============================================================================

/// The context handed to visitor callbacks.
///
/// `N` is the node type, `A` the accumulator threaded through the walk.
pub struct TraverserContext<'t, N, A = ()> {
    state: &'t mut TraversalState<N, A>,
    id: ContextId,
}

impl<'t, N, A> TraverserContext<'t, N, A> {
    fn frame(&self) -> &ContextFrame<N> {
        self.state.frame(self.id)
    }

    fn frame_mut(&mut self) -> &mut ContextFrame<N> {
        self.state.frame_mut(self.id)
    }

    /// Read-only view of this context.
    pub fn view(&self) -> ContextView<'_, N> {
        ContextView {
            frames: &self.state.frames,
            root_vars: &self.state.root_vars,
            id: self.id,
        }
    }

    /// Arena id of this context.
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// The node as it currently stands.
    pub fn this_node(&self) -> &N {
        &self.frame().node
    }

    /// The node as it was first reached, before any `change_node`.
    pub fn original_node(&self) -> &N {
        self.view().original_node()
    }

    /// Replace the node this context is focused on.
    ///
    /// Children are extracted from the node as it stands once `enter`
    /// returns, so changing the node in `enter` redirects the descent.
    pub fn change_node(&mut self, node: N) {
        let frame = self.frame_mut();
        let previous = std::mem::replace(&mut frame.node, node);
        if frame.original.is_none() {
            frame.original = Some(previous);
        }
    }

    /// Location of this node in its parent; `None` for roots.
    pub fn location(&self) -> Option<&NodeLocation> {
        self.frame().location.as_ref()
    }

    /// Distance from the root context.
    pub fn depth(&self) -> usize {
        self.frame().depth
    }

    /// The callback this context is being processed for.
    pub fn phase(&self) -> Phase {
        self.frame().phase
    }

    /// True if this node repeats an ancestor on its path.
    pub fn is_visited(&self) -> bool {
        self.frame().visited
    }

    /// True if the node was marked deleted.
    pub fn is_deleted(&self) -> bool {
        self.frame().deleted
    }

    /// Mark the node deleted. Its children will not be traversed.
    pub fn delete_node(&mut self) {
        self.frame_mut().deleted = true;
    }

    /// True for a context of one of the traversal roots.
    pub fn is_root_context(&self) -> bool {
        self.frame().parent.is_none()
    }

    /// The parent context.
    pub fn parent_context(&self) -> Option<ContextView<'_, N>> {
        self.view().parent()
    }

    /// The parent's node.
    pub fn parent_node(&self) -> Option<&N> {
        self.view().parent_node()
    }

    /// A variable stored on this context.
    pub fn var<T: Any>(&self) -> Option<&T> {
        self.frame().vars.get::<T>()
    }

    /// A variable stored on this context, mutably.
    pub fn var_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.frame_mut().vars.get_mut::<T>()
    }

    /// Store a variable on this context.
    pub fn set_var<T: Any>(&mut self, value: T) -> Option<T> {
        self.frame_mut().vars.insert(value)
    }

    /// The nearest variable of type `T` on an ancestor, falling back to the
    /// traversal's root variables.
    pub fn var_from_parents<T: Any>(&self) -> Option<&T> {
        self.view().var_from_parents::<T>()
    }

    /// The accumulator as left by the previous callback.
    pub fn current_accumulate(&self) -> &A {
        &self.state.accumulate
    }

    /// The accumulator, mutably.
    pub fn accumulate_mut(&mut self) -> &mut A {
        &mut self.state.accumulate
    }

    /// Replace the accumulator; the next callback observes `value`.
    pub fn set_accumulate(&mut self, value: A) -> A {
        std::mem::replace(&mut self.state.accumulate, value)
    }

    /// Traversal-wide shared data of type `T`.
    pub fn shared_data<T: Any>(&self) -> Option<&T> {
        self.state.shared.get::<T>()
    }

    /// Traversal-wide shared data of type `T`, mutably.
    pub fn shared_data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.state.shared.get_mut::<T>()
    }
}

impl<N: Clone, A> TraverserContext<'_, N, A> {
    /// Nodes of all ancestors, nearest first.
    pub fn parent_nodes(&self) -> Vec<N> {
        self.view().parent_nodes()
    }

    /// Path from this node to the root as breadcrumbs, nearest first.
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb<N>> {
        self.view().breadcrumbs()
    }
}

impl<A: Default, N> TraverserContext<'_, N, A> {
    /// Take the accumulator, leaving `A::default()` in its place.
    pub fn take_accumulate(&mut self) -> A {
        std::mem::take(&mut self.state.accumulate)
    }
}
