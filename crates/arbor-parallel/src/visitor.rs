// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitor trait for parallel walks.

use std::fmt;

use arbor_core::TraversalControl;

use crate::context::ParallelContext;

/// Callbacks invoked from worker threads.
///
/// Callbacks take `&self` and may run concurrently for sibling subtrees;
/// per-node state belongs in context vars, shared state behind a lock or an
/// atomic. Only `Continue` and `Abort` are allowed: returning `Quit` panics.
pub trait ParallelVisitor<N>: Sync {
    fn enter(&self, _context: &mut ParallelContext<'_, N>) -> TraversalControl {
        TraversalControl::Continue
    }

    fn leave(&self, _context: &mut ParallelContext<'_, N>) -> TraversalControl {
        TraversalControl::Continue
    }

    fn back_ref(&self, _context: &mut ParallelContext<'_, N>) -> TraversalControl {
        TraversalControl::Continue
    }
}

impl<N, V: ParallelVisitor<N> + ?Sized> ParallelVisitor<N> for &V {
    fn enter(&self, context: &mut ParallelContext<'_, N>) -> TraversalControl {
        (**self).enter(context)
    }

    fn leave(&self, context: &mut ParallelContext<'_, N>) -> TraversalControl {
        (**self).leave(context)
    }

    fn back_ref(&self, context: &mut ParallelContext<'_, N>) -> TraversalControl {
        (**self).back_ref(context)
    }
}

type Callback<'f, N> =
    Box<dyn Fn(&mut ParallelContext<'_, N>) -> TraversalControl + Send + Sync + 'f>;

/// A parallel visitor assembled from closures.
pub struct ParallelFnVisitor<'f, N> {
    enter: Option<Callback<'f, N>>,
    leave: Option<Callback<'f, N>>,
    back_ref: Option<Callback<'f, N>>,
}

impl<N> Default for ParallelFnVisitor<'_, N> {
    fn default() -> Self {
        Self {
            enter: None,
            leave: None,
            back_ref: None,
        }
    }
}

impl<'f, N> ParallelFnVisitor<'f, N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_enter<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut ParallelContext<'_, N>) -> TraversalControl + Send + Sync + 'f,
    {
        self.enter = Some(Box::new(callback));
        self
    }

    pub fn on_leave<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut ParallelContext<'_, N>) -> TraversalControl + Send + Sync + 'f,
    {
        self.leave = Some(Box::new(callback));
        self
    }

    pub fn on_back_ref<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut ParallelContext<'_, N>) -> TraversalControl + Send + Sync + 'f,
    {
        self.back_ref = Some(Box::new(callback));
        self
    }
}

impl<N> ParallelVisitor<N> for ParallelFnVisitor<'_, N> {
    fn enter(&self, context: &mut ParallelContext<'_, N>) -> TraversalControl {
        self.enter
            .as_ref()
            .map_or(TraversalControl::Continue, |callback| callback(context))
    }

    fn leave(&self, context: &mut ParallelContext<'_, N>) -> TraversalControl {
        self.leave
            .as_ref()
            .map_or(TraversalControl::Continue, |callback| callback(context))
    }

    fn back_ref(&self, context: &mut ParallelContext<'_, N>) -> TraversalControl {
        self.back_ref
            .as_ref()
            .map_or(TraversalControl::Continue, |callback| callback(context))
    }
}

impl<N> fmt::Debug for ParallelFnVisitor<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParallelFnVisitor")
            .field("enter", &self.enter.is_some())
            .field("leave", &self.leave.is_some())
            .field("back_ref", &self.back_ref.is_some())
            .finish()
    }
}
