// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Parallel traverser.

use std::any::Any;
use std::marker::PhantomData;

use arbor_core::{ArborResult, NamedChildren, NodeIdentity, SyncVars};
use tracing::debug;

use crate::context::ParallelContext;
use crate::options::{install, ParallelOptions};
use crate::visitor::ParallelVisitor;
use crate::walk::{Discard, Walk};

/// Outcome of a parallel traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelTraverseResult {
    entered: usize,
}

impl ParallelTraverseResult {
    /// Number of `enter` callbacks made.
    pub fn entered_count(&self) -> usize {
        self.entered
    }
}

/// Fork-join traverser: each child subtree is walked as its own task.
///
/// Sibling order of `enter` calls is unspecified; a node's `leave` runs
/// after every descendant has finished.
pub struct ParallelTraverser<N, C> {
    children_of: C,
    options: ParallelOptions,
    root_vars: SyncVars,
    _nodes: PhantomData<fn(&N)>,
}

impl<N, C> ParallelTraverser<N, C>
where
    N: NodeIdentity + Send + Sync,
    C: Fn(&N) -> NamedChildren<N> + Sync,
{
    pub fn new(children_of: C) -> Self {
        Self::with_options(children_of, ParallelOptions::default())
    }

    pub fn with_options(children_of: C, options: ParallelOptions) -> Self {
        Self {
            children_of,
            options,
            root_vars: SyncVars::new(),
            _nodes: PhantomData,
        }
    }

    /// Add a root variable, visible through `var_from_parents`.
    pub fn root_var<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.root_vars.insert(value);
        self
    }

    pub fn options(&self) -> &ParallelOptions {
        &self.options
    }

    /// Walk `root` with `visitor`.
    ///
    /// # Errors
    ///
    /// `WorkerPool` if a dedicated pool was requested and could not be built.
    ///
    /// # Panics
    ///
    /// If a callback returns `Quit`.
    pub fn traverse<V>(&self, root: N, visitor: &V) -> ArborResult<ParallelTraverseResult>
    where
        V: ParallelVisitor<N> + ?Sized,
    {
        debug!(threads = ?self.options.threads, "parallel traversal started");
        let walk = Walk::new(&self.children_of, visitor, &Discard);
        install(&self.options, || {
            let mut context = ParallelContext::root(root, &self.root_vars);
            walk.visit(&mut context)
        })?;
        let entered = walk.entered();
        debug!(entered, "parallel traversal finished");
        Ok(ParallelTraverseResult { entered })
    }
}
