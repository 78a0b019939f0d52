// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Fork-join recursion shared by the parallel traverser and transformer.
//!
//! Once a node's `enter` returns `Continue`, one task per child is forked
//! onto the pool and joined before the node's completion step. The
//! completion step is where the transformer merges child edits into the
//! node, so it never runs concurrently with its children.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};

use arbor_core::{
    apply_child_edits, ArborResult, ChildEdit, NamedChildren, NodeAdapter, NodeIdentity,
    NodeLocation, Phase, TraversalControl,
};
use rayon::prelude::*;
use tracing::trace;

use crate::context::ParallelContext;
use crate::visitor::ParallelVisitor;

/// What a node does with its children's edits once they have all joined.
pub(crate) trait Completion<N>: Sync {
    fn complete(
        &self,
        context: &mut ParallelContext<'_, N>,
        edits: Vec<ChildEdit<N>>,
    ) -> ArborResult<()>;
}

/// Drop child edits (plain traversal).
pub(crate) struct Discard;

impl<N> Completion<N> for Discard {
    fn complete(
        &self,
        _context: &mut ParallelContext<'_, N>,
        _edits: Vec<ChildEdit<N>>,
    ) -> ArborResult<()> {
        Ok(())
    }
}

/// Rebuild the node through an adapter with its children's edits applied.
pub(crate) struct AdapterMerge<'a, Ad> {
    pub(crate) adapter: &'a Ad,
}

impl<N, Ad> Completion<N> for AdapterMerge<'_, Ad>
where
    N: Clone,
    Ad: NodeAdapter<N> + Sync,
{
    fn complete(
        &self,
        context: &mut ParallelContext<'_, N>,
        edits: Vec<ChildEdit<N>>,
    ) -> ArborResult<()> {
        let mut children = self.adapter.named_children(context.this_node());
        apply_child_edits(&mut children, edits)?;
        let merged = self.adapter.with_children(context.this_node(), children);
        context.record_replacement(merged);
        Ok(())
    }
}

pub(crate) struct Walk<'w, N, C, V: ?Sized, K> {
    children_of: &'w C,
    visitor: &'w V,
    completion: &'w K,
    entered: AtomicUsize,
    _nodes: PhantomData<fn(&N)>,
}

impl<'w, N, C, V, K> Walk<'w, N, C, V, K>
where
    N: NodeIdentity + Send + Sync,
    C: Fn(&N) -> NamedChildren<N> + Sync,
    V: ParallelVisitor<N> + ?Sized,
    K: Completion<N>,
{
    pub(crate) fn new(children_of: &'w C, visitor: &'w V, completion: &'w K) -> Self {
        Self {
            children_of,
            visitor,
            completion,
            entered: AtomicUsize::new(0),
            _nodes: PhantomData,
        }
    }

    pub(crate) fn entered(&self) -> usize {
        self.entered.load(Ordering::Relaxed)
    }

    /// Visit `context` and its subtree. Returns after every descendant task
    /// has joined.
    pub(crate) fn visit(&self, context: &mut ParallelContext<'_, N>) -> ArborResult<()> {
        if context.repeats_ancestor() {
            context.visited = true;
            context.phase = Phase::BackRef;
            trace!(depth = context.depth(), "back reference");
            reject_quit(self.visitor.back_ref(context));
            return Ok(());
        }

        self.entered.fetch_add(1, Ordering::Relaxed);
        context.phase = Phase::Enter;
        let control = self.visitor.enter(context);
        reject_quit(control);
        if control.is_abort() {
            return Ok(());
        }

        if !context.is_deleted() {
            let edits = self.visit_children(context)?;
            if !edits.is_empty() {
                trace!(depth = context.depth(), edits = edits.len(), "merging child edits");
                self.completion.complete(context, edits)?;
            }
        }

        context.phase = Phase::Leave;
        reject_quit(self.visitor.leave(context));
        Ok(())
    }

    fn visit_children(&self, parent: &ParallelContext<'_, N>) -> ArborResult<Vec<ChildEdit<N>>> {
        let mut children = Vec::new();
        for (group, nodes) in (self.children_of)(parent.this_node()) {
            for (index, node) in nodes.into_iter().enumerate() {
                let location = NodeLocation::new(group.clone(), index);
                children.push(ParallelContext::child(node, parent, location));
            }
        }

        let edits: Vec<Vec<ChildEdit<N>>> = children
            .into_par_iter()
            .map(|mut child| -> ArborResult<Vec<ChildEdit<N>>> {
                self.visit(&mut child)?;
                Ok(child.into_child_edits())
            })
            .collect::<ArborResult<_>>()?;
        Ok(edits.into_iter().flatten().collect())
    }
}

fn reject_quit(control: TraversalControl) {
    assert!(
        !control.is_quit(),
        "TraversalControl::Quit is not supported by parallel walks"
    );
}
