// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Sequential traverser.
//!
//! Walks one or more roots using a caller-supplied child-extraction function
//! and dispatches `enter` / `leave` / `back_ref` to a [`TraverserVisitor`].
//!
//! # Traversal Order
//!
//! - **Depth-first** (stack order): a node's whole subtree is processed
//!   before its next sibling; `leave` fires after the subtree, so sibling
//!   subtrees close in reverse order of how they were entered.
//! - **Breadth-first** (queue order): children are queued behind the node's
//!   siblings; `leave` fires when the node's end marker reaches the front of
//!   the queue.
//!
//! # Control Flow
//!
//! - `TraversalControl::Continue` - traverse into children, `leave` follows
//! - `TraversalControl::Abort` - from `enter`: prune children, no `leave`
//! - `TraversalControl::Quit` - halt immediately, dropping all pending work
//!
//! # Cycles
//!
//! A node whose identity matches an ancestor on its own path is a back
//! reference: `back_ref` is called instead of `enter`/`leave` and its
//! children are not scheduled. The same node appearing twice among siblings
//! is two independent occurrences.

use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;

use tracing::{debug, trace};

use crate::children::{NamedChildren, NodeLocation};
use crate::context::{ContextFrame, ContextId, Phase, TraversalState, TraverserContext};
use crate::control::TraversalControl;
use crate::identity::NodeIdentity;
use crate::options::{TraversalOrder, TraverserOptions};
use crate::vars::Vars;

// ============================================================================
// Visitor
// ============================================================================

/// Callbacks invoked by the sequential traverser.
///
/// Every method defaults to returning `Continue`.
pub trait TraverserVisitor<N, A = ()> {
    /// Called when a node is reached, before its children are scheduled.
    fn enter(&mut self, _context: &mut TraverserContext<'_, N, A>) -> TraversalControl {
        TraversalControl::Continue
    }

    /// Called after all of a node's children have been processed.
    fn leave(&mut self, _context: &mut TraverserContext<'_, N, A>) -> TraversalControl {
        TraversalControl::Continue
    }

    /// Called instead of `enter`/`leave` when the node repeats an ancestor.
    fn back_ref(&mut self, _context: &mut TraverserContext<'_, N, A>) -> TraversalControl {
        TraversalControl::Continue
    }
}

impl<N, A, V: TraverserVisitor<N, A> + ?Sized> TraverserVisitor<N, A> for &mut V {
    fn enter(&mut self, context: &mut TraverserContext<'_, N, A>) -> TraversalControl {
        (**self).enter(context)
    }

    fn leave(&mut self, context: &mut TraverserContext<'_, N, A>) -> TraversalControl {
        (**self).leave(context)
    }

    fn back_ref(&mut self, context: &mut TraverserContext<'_, N, A>) -> TraversalControl {
        (**self).back_ref(context)
    }
}

type Callback<'f, N, A> =
    Box<dyn FnMut(&mut TraverserContext<'_, N, A>) -> TraversalControl + 'f>;

/// A visitor assembled from closures.
///
/// ```
/// use arbor_core::{FnVisitor, NamedChildren, TraversalControl, Traverser, TraverserContext};
/// use std::sync::Arc;
///
/// let root = Arc::new(3u32);
/// let mut seen = Vec::new();
/// let mut visitor = FnVisitor::new().on_enter(|ctx: &mut TraverserContext<'_, Arc<u32>>| {
///     seen.push(**ctx.this_node());
///     TraversalControl::Continue
/// });
/// Traverser::depth_first(|_: &Arc<u32>| NamedChildren::new()).traverse(root, &mut visitor);
/// drop(visitor);
/// assert_eq!(seen, vec![3]);
/// ```
pub struct FnVisitor<'f, N, A = ()> {
    enter: Option<Callback<'f, N, A>>,
    leave: Option<Callback<'f, N, A>>,
    back_ref: Option<Callback<'f, N, A>>,
}

impl<'f, N, A> Default for FnVisitor<'f, N, A> {
    fn default() -> Self {
        Self {
            enter: None,
            leave: None,
            back_ref: None,
        }
    }
}

impl<'f, N, A> FnVisitor<'f, N, A> {
    /// A visitor that continues everywhere.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `enter` callback.
    pub fn on_enter<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut TraverserContext<'_, N, A>) -> TraversalControl + 'f,
    {
        self.enter = Some(Box::new(callback));
        self
    }

    /// Set the `leave` callback.
    pub fn on_leave<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut TraverserContext<'_, N, A>) -> TraversalControl + 'f,
    {
        self.leave = Some(Box::new(callback));
        self
    }

    /// Set the `back_ref` callback.
    pub fn on_back_ref<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut TraverserContext<'_, N, A>) -> TraversalControl + 'f,
    {
        self.back_ref = Some(Box::new(callback));
        self
    }
}

impl<N, A> TraverserVisitor<N, A> for FnVisitor<'_, N, A> {
    fn enter(&mut self, context: &mut TraverserContext<'_, N, A>) -> TraversalControl {
        self.enter
            .as_mut()
            .map_or(TraversalControl::Continue, |callback| callback(context))
    }

    fn leave(&mut self, context: &mut TraverserContext<'_, N, A>) -> TraversalControl {
        self.leave
            .as_mut()
            .map_or(TraversalControl::Continue, |callback| callback(context))
    }

    fn back_ref(&mut self, context: &mut TraverserContext<'_, N, A>) -> TraversalControl {
        self.back_ref
            .as_mut()
            .map_or(TraversalControl::Continue, |callback| callback(context))
    }
}

impl<N, A> fmt::Debug for FnVisitor<'_, N, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnVisitor")
            .field("enter", &self.enter.is_some())
            .field("leave", &self.leave.is_some())
            .field("back_ref", &self.back_ref.is_some())
            .finish()
    }
}

// ============================================================================
// Result
// ============================================================================

/// Outcome of a traversal.
#[derive(Debug)]
pub struct TraverserResult<A> {
    accumulated: A,
    shared: Vars,
    entered: usize,
    quit: bool,
}

impl<A> TraverserResult<A> {
    /// The accumulator as left by the last callback.
    pub fn accumulated_result(&self) -> &A {
        &self.accumulated
    }

    /// Consume the result, returning the accumulator.
    pub fn into_accumulated(self) -> A {
        self.accumulated
    }

    /// Shared data of type `T` as left by the traversal.
    pub fn shared_data<T: Any>(&self) -> Option<&T> {
        self.shared.get::<T>()
    }

    /// Take shared data of type `T` out of the result.
    pub fn take_shared_data<T: Any>(&mut self) -> Option<T> {
        self.shared.remove::<T>()
    }

    /// Number of `enter` callbacks made.
    pub fn entered_count(&self) -> usize {
        self.entered
    }

    /// True if a callback returned `Quit`.
    pub fn was_quit(&self) -> bool {
        self.quit
    }
}

// ============================================================================
// Traverser
// ============================================================================

enum Work {
    Visit(ContextId),
    Leave(ContextId),
}

/// Sequential depth-first or breadth-first traverser.
///
/// `C` extracts a node's named children; `A` is the accumulator threaded
/// through the callbacks.
pub struct Traverser<N, C, A = ()> {
    children_of: C,
    options: TraverserOptions,
    root_vars: Vars,
    shared: Vars,
    accumulate: A,
    _nodes: PhantomData<fn(&N)>,
}

impl<N, C> Traverser<N, C, ()>
where
    C: Fn(&N) -> NamedChildren<N>,
{
    /// A depth-first traverser.
    pub fn depth_first(children_of: C) -> Self {
        Self::with_options(children_of, TraverserOptions::depth_first())
    }

    /// A breadth-first traverser.
    pub fn breadth_first(children_of: C) -> Self {
        Self::with_options(children_of, TraverserOptions::breadth_first())
    }

    /// A traverser configured by `options`.
    pub fn with_options(children_of: C, options: TraverserOptions) -> Self {
        Self {
            children_of,
            options,
            root_vars: Vars::new(),
            shared: Vars::new(),
            accumulate: (),
            _nodes: PhantomData,
        }
    }
}

impl<N, C, A> Traverser<N, C, A>
where
    C: Fn(&N) -> NamedChildren<N>,
    N: NodeIdentity,
{
    /// Set the initial accumulator value.
    pub fn initial_accumulate<B>(self, value: B) -> Traverser<N, C, B> {
        Traverser {
            children_of: self.children_of,
            options: self.options,
            root_vars: self.root_vars,
            shared: self.shared,
            accumulate: value,
            _nodes: PhantomData,
        }
    }

    /// Add a root variable, visible through `var_from_parents`.
    pub fn root_var<T: Any>(mut self, value: T) -> Self {
        self.root_vars.insert(value);
        self
    }

    /// Add traversal-wide shared data.
    pub fn shared_data<T: Any>(mut self, value: T) -> Self {
        self.shared.insert(value);
        self
    }

    /// The options this traverser was built with.
    pub fn options(&self) -> &TraverserOptions {
        &self.options
    }

    /// Traverse a single root.
    pub fn traverse<V>(self, root: N, visitor: &mut V) -> TraverserResult<A>
    where
        V: TraverserVisitor<N, A> + ?Sized,
    {
        self.traverse_many(std::iter::once(root), visitor)
    }

    /// Traverse several roots in order.
    pub fn traverse_many<I, V>(self, roots: I, visitor: &mut V) -> TraverserResult<A>
    where
        I: IntoIterator<Item = N>,
        V: TraverserVisitor<N, A> + ?Sized,
    {
        let depth_first = self.options.order == TraversalOrder::DepthFirst;
        let children_of = self.children_of;
        let mut state = TraversalState {
            frames: Vec::new(),
            root_vars: self.root_vars,
            shared: self.shared,
            accumulate: self.accumulate,
        };

        let mut pending = VecDeque::new();
        for root in roots {
            let id = state.push(ContextFrame::root(root));
            pending.push_back(Work::Visit(id));
        }
        if depth_first {
            // The stack pops from the back; the first root goes there.
            pending.make_contiguous().reverse();
        }
        debug!(order = ?self.options.order, roots = pending.len(), "traversal started");

        let mut entered = 0;
        let mut quit = false;
        loop {
            let work = if depth_first {
                pending.pop_back()
            } else {
                pending.pop_front()
            };
            let Some(work) = work else { break };

            let control = match work {
                Work::Leave(id) => {
                    state.frame_mut(id).phase = Phase::Leave;
                    visitor.leave(&mut state.context(id))
                }
                Work::Visit(id) if is_back_ref(&state, id) => {
                    let frame = state.frame_mut(id);
                    frame.visited = true;
                    frame.phase = Phase::BackRef;
                    trace!(depth = frame.depth, "back reference");
                    visitor.back_ref(&mut state.context(id))
                }
                Work::Visit(id) => {
                    entered += 1;
                    let control = visitor.enter(&mut state.context(id));
                    if control.is_continue() {
                        schedule_children(&mut state, &children_of, id, depth_first, &mut pending);
                    }
                    control
                }
            };

            if control.is_quit() {
                debug!(entered, dropped = pending.len(), "traversal quit");
                quit = true;
                break;
            }
        }

        debug!(entered, contexts = state.frames.len(), "traversal finished");
        TraverserResult {
            accumulated: state.accumulate,
            shared: state.shared,
            entered,
            quit,
        }
    }
}

impl<N, C, A: fmt::Debug> fmt::Debug for Traverser<N, C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Traverser")
            .field("options", &self.options)
            .field("root_vars", &self.root_vars)
            .field("shared", &self.shared)
            .field("accumulate", &self.accumulate)
            .finish()
    }
}

/// True if the node of context `id` is the same node as one of its ancestors.
fn is_back_ref<N: NodeIdentity, A>(state: &TraversalState<N, A>, id: ContextId) -> bool {
    let frame = state.frame(id);
    let target = frame.node.node_id();
    let mut parent = frame.parent;
    while let Some(parent_id) = parent {
        let ancestor = state.frame(parent_id);
        if ancestor.node.node_id() == target {
            return true;
        }
        parent = ancestor.parent;
    }
    false
}

/// Create contexts for the children of `id` and queue them with the end
/// marker of `id`.
fn schedule_children<N, A, C>(
    state: &mut TraversalState<N, A>,
    children_of: &C,
    id: ContextId,
    depth_first: bool,
    pending: &mut VecDeque<Work>,
) where
    C: Fn(&N) -> NamedChildren<N>,
{
    let frame = state.frame(id);
    let depth = frame.depth + 1;
    let children = if frame.deleted {
        NamedChildren::new()
    } else {
        children_of(&frame.node)
    };

    let mut child_ids = Vec::with_capacity(children.child_count());
    for (group, nodes) in children {
        for (index, node) in nodes.into_iter().enumerate() {
            let location = NodeLocation::new(group.clone(), index);
            child_ids.push(state.push(ContextFrame::child(node, id, location, depth)));
        }
    }
    trace!(depth, children = child_ids.len(), "scheduling children");

    if depth_first {
        pending.push_back(Work::Leave(id));
        pending.extend(child_ids.into_iter().rev().map(Work::Visit));
    } else {
        pending.extend(child_ids.into_iter().map(Work::Visit));
        pending.push_back(Work::Leave(id));
    }
}
