// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Sequential tree transformer.
//!
//! [`TreeTransformer::transform`] walks a tree depth-first and lets the
//! caller's visitor record edits through the free functions of this module
//! ([`change_node`], [`delete_node`], [`insert_before`], [`insert_after`]).
//! Every edit is a [`NodeZipper`] collected into a [`NodeMultiZipper`].
//! When a node is left, the edits made below it are folded into it, so
//! `leave` sees the node with its children's edits applied.
//!
//! ```
//! use std::sync::Arc;
//! use arbor_core::{
//!     transformer, FnVisitor, NamedChildren, NodeAdapter, TraversalControl, TraverserContext,
//!     TreeTransformer,
//! };
//!
//! struct Item {
//!     name: &'static str,
//!     parts: Vec<Arc<Item>>,
//! }
//!
//! fn part(name: &'static str) -> Arc<Item> {
//!     Arc::new(Item { name, parts: vec![] })
//! }
//!
//! struct Items;
//!
//! impl NodeAdapter<Arc<Item>> for Items {
//!     fn named_children(&self, item: &Arc<Item>) -> NamedChildren<Arc<Item>> {
//!         NamedChildren::unnamed(item.parts.clone())
//!     }
//!
//!     fn with_children(
//!         &self,
//!         item: &Arc<Item>,
//!         children: NamedChildren<Arc<Item>>,
//!     ) -> Arc<Item> {
//!         let parts = children.into_iter().flat_map(|(_, nodes)| nodes).collect();
//!         Arc::new(Item { name: item.name, parts })
//!     }
//! }
//!
//! let car = Arc::new(Item {
//!     name: "car",
//!     parts: vec![part("wheel"), part("door")],
//! });
//! let mut visitor = FnVisitor::new().on_enter(|ctx: &mut TraverserContext<'_, Arc<Item>>| {
//!     match ctx.this_node().name {
//!         "wheel" => transformer::insert_after(ctx, part("spare")),
//!         "door" => transformer::change_node(ctx, part("hatch")),
//!         _ => TraversalControl::Continue,
//!     }
//! });
//! let result = TreeTransformer::new(Items).transform(car.clone(), &mut visitor).unwrap();
//! let names: Vec<_> = result.parts.iter().map(|item| item.name).collect();
//! assert_eq!(names, ["wheel", "spare", "hatch"]);
//! assert_eq!(car.parts.len(), 2);
//! ```

use tracing::{debug, trace};

use crate::adapter::NodeAdapter;
use crate::context::TraverserContext;
use crate::control::TraversalControl;
use crate::error::{ArborError, ArborResult};
use crate::identity::NodeIdentity;
use crate::traverser::{Traverser, TraverserVisitor};
use crate::zipper::{NodeMultiZipper, NodeZipper};

/// Rewrites immutable trees through a [`NodeAdapter`].
#[derive(Debug, Clone, Default)]
pub struct TreeTransformer<Ad> {
    adapter: Ad,
}

impl<Ad> TreeTransformer<Ad> {
    pub fn new(adapter: Ad) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &Ad {
        &self.adapter
    }

    /// Walk `root` with `visitor` and return the edited tree.
    ///
    /// Returns `root` itself when no edits were recorded. In `leave`,
    /// `this_node()` already carries the edits made below it, and a
    /// change or delete made there takes precedence over them.
    ///
    /// # Errors
    ///
    /// A lookup error if an edit names a location that does not exist in
    /// its parent's children as the adapter reports them.
    pub fn transform<N, V>(&self, root: N, visitor: &mut V) -> ArborResult<N>
    where
        Ad: NodeAdapter<N>,
        N: Clone + NodeIdentity + 'static,
        V: TraverserVisitor<N> + ?Sized,
    {
        let mut stash = ZipperStash {
            inner: visitor,
            adapter: &self.adapter,
            failure: None,
        };
        let mut result = Traverser::depth_first(|node: &N| self.adapter.named_children(node))
            .shared_data(NodeMultiZipper::new(root.clone(), Vec::new()))
            .traverse(root, &mut stash);
        if let Some(err) = stash.failure {
            return Err(err);
        }

        let Some(edits) = result.take_shared_data::<NodeMultiZipper<N>>() else {
            unreachable!("edit accumulator is installed before the walk");
        };
        debug!(
            edits = edits.len(),
            entered = result.entered_count(),
            "transform walk finished"
        );
        edits.to_root_node(&self.adapter)
    }
}

/// Stashes a zipper on every entered context and folds the edits below a
/// node into it before its `leave`, then delegates.
struct ZipperStash<'v, V: ?Sized, Ad> {
    inner: &'v mut V,
    adapter: &'v Ad,
    failure: Option<ArborError>,
}

/// Accumulator slot of the first edit made below a node.
#[derive(Debug, Clone, Copy)]
struct FoldStart(usize);

impl<N, V, Ad> TraverserVisitor<N> for ZipperStash<'_, V, Ad>
where
    N: Clone + NodeIdentity + 'static,
    V: TraverserVisitor<N> + ?Sized,
    Ad: NodeAdapter<N>,
{
    fn enter(&mut self, context: &mut TraverserContext<'_, N>) -> TraversalControl {
        let zipper = NodeZipper::new(context.this_node().clone(), context.breadcrumbs());
        context.set_var(zipper);
        let control = self.inner.enter(context);
        let start = accumulator(context).len();
        context.set_var(FoldStart(start));
        control
    }

    fn leave(&mut self, context: &mut TraverserContext<'_, N>) -> TraversalControl {
        if let Err(err) = fold_descendants(self.adapter, context) {
            self.failure = Some(err);
            return TraversalControl::Quit;
        }
        self.inner.leave(context)
    }

    fn back_ref(&mut self, context: &mut TraverserContext<'_, N>) -> TraversalControl {
        self.inner.back_ref(context)
    }
}

/// Fold the zippers recorded below the current node into a replacement of
/// it.
fn fold_descendants<N, Ad>(adapter: &Ad, context: &mut TraverserContext<'_, N>) -> ArborResult<()>
where
    N: Clone + NodeIdentity + 'static,
    Ad: NodeAdapter<N> + ?Sized,
{
    let Some(&FoldStart(start)) = context.var::<FoldStart>() else {
        return Ok(());
    };
    let below = accumulator(context).split_off(start);
    if below.is_empty() {
        return Ok(());
    }
    trace!(depth = context.depth(), edits = below.len(), "folding edits into node");
    let levels = context.depth();
    let below = below.into_iter().map(|zipper| zipper.rebased(levels)).collect();
    let merged = NodeMultiZipper::new(context.this_node().clone(), below).to_root_node(adapter)?;
    record_replacement(context, merged);
    Ok(())
}

// ============================================================================
// Edit helpers
// ============================================================================

/// Per-context record of the edits already made.
#[derive(Debug, Clone, Copy, Default)]
struct EditMarks {
    /// Slot of this context's `Replace` zipper in the accumulator.
    replace_slot: Option<usize>,
    /// Set by `change_node`; a fold alone does not set it.
    changed: bool,
    inserted: bool,
}

fn stashed_zipper<'c, N: 'static>(context: &'c TraverserContext<'_, N>) -> &'c NodeZipper<N> {
    context.var::<NodeZipper<N>>().unwrap_or_else(|| {
        panic!("edits can only be made from enter or leave of a TreeTransformer walk")
    })
}

fn accumulator<'c, N: 'static>(
    context: &'c mut TraverserContext<'_, N>,
) -> &'c mut NodeMultiZipper<N> {
    context
        .shared_data_mut::<NodeMultiZipper<N>>()
        .unwrap_or_else(|| panic!("edits can only be made during a TreeTransformer walk"))
}

fn marks<N>(context: &TraverserContext<'_, N>) -> EditMarks {
    context.var::<EditMarks>().copied().unwrap_or_default()
}

/// Make `node` the current node and its `Replace` zipper, reusing the
/// context's slot.
fn record_replacement<N: Clone + 'static>(context: &mut TraverserContext<'_, N>, node: N) {
    let zipper = stashed_zipper(context).with_new_node(node.clone());
    context.set_var(zipper.clone());

    let mut edit_marks = marks(context);
    let edits = accumulator(context);
    match edit_marks.replace_slot {
        Some(slot) => edits.replace_zipper_at(slot, zipper),
        None => edit_marks.replace_slot = Some(edits.push(zipper)),
    }
    context.set_var(edit_marks);
    context.change_node(node);
}

/// Replace the current node.
///
/// Descent continues into `node`. Changing the same node twice keeps only
/// the last replacement.
///
/// # Panics
///
/// If the node was deleted or this is not a `TreeTransformer` walk.
pub fn change_node<N: Clone + 'static>(
    context: &mut TraverserContext<'_, N>,
    node: N,
) -> TraversalControl {
    assert!(!context.is_deleted(), "cannot change a deleted node");
    record_replacement(context, node);
    let mut edit_marks = marks(context);
    edit_marks.changed = true;
    context.set_var(edit_marks);
    TraversalControl::Continue
}

/// Delete the current node. Its children are not visited.
///
/// Called from `leave`, the deletion discards the edits made below the
/// node.
///
/// # Panics
///
/// On the root, on a node already changed or used as an insertion anchor,
/// or outside a `TreeTransformer` walk.
pub fn delete_node<N: Clone + 'static>(context: &mut TraverserContext<'_, N>) -> TraversalControl {
    assert!(!context.is_root_context(), "the root node cannot be deleted");
    assert!(!context.is_deleted(), "node is already deleted");
    let edit_marks = marks(context);
    assert!(
        !edit_marks.changed && !edit_marks.inserted,
        "a changed node or an insertion anchor cannot also be deleted"
    );
    let zipper = stashed_zipper(context).delete_node();
    let edits = accumulator(context);
    match edit_marks.replace_slot {
        Some(slot) => edits.replace_zipper_at(slot, zipper),
        None => {
            edits.push(zipper);
        }
    }
    context.delete_node();
    TraversalControl::Continue
}

/// Insert `node` as the sibling immediately before the current node.
///
/// # Panics
///
/// On the root, on a deleted node, or outside a `TreeTransformer` walk.
pub fn insert_before<N: Clone + 'static>(
    context: &mut TraverserContext<'_, N>,
    node: N,
) -> TraversalControl {
    let zipper = insertion_anchor(context).insert_before(node);
    record_insertion(context, zipper)
}

/// Insert `node` as the sibling immediately after the current node.
///
/// # Panics
///
/// On the root, on a deleted node, or outside a `TreeTransformer` walk.
pub fn insert_after<N: Clone + 'static>(
    context: &mut TraverserContext<'_, N>,
    node: N,
) -> TraversalControl {
    let zipper = insertion_anchor(context).insert_after(node);
    record_insertion(context, zipper)
}

fn insertion_anchor<'c, N: 'static>(context: &'c TraverserContext<'_, N>) -> &'c NodeZipper<N> {
    assert!(
        !context.is_root_context(),
        "siblings cannot be inserted around the root node"
    );
    assert!(!context.is_deleted(), "cannot insert around a deleted node");
    stashed_zipper(context)
}

fn record_insertion<N: 'static>(
    context: &mut TraverserContext<'_, N>,
    zipper: NodeZipper<N>,
) -> TraversalControl {
    accumulator(context).push(zipper);
    let mut edit_marks = marks(context);
    edit_marks.inserted = true;
    context.set_var(edit_marks);
    TraversalControl::Continue
}
