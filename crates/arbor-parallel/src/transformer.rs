// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Parallel tree transformer.
//!
//! Edits are recorded on each [`ParallelContext`] and handed to the parent
//! when the child's task joins. Once all of a node's children have joined,
//! their edits are merged into the node with a single
//! [`NodeAdapter::with_children`] call, using the same ordering rules as
//! [`arbor_core::apply_child_edits`]. The merged node then becomes an edit of
//! its own parent, so rebuilt nodes bubble up to the root.

use std::any::Any;

use arbor_core::{ArborResult, NodeAdapter, NodeIdentity, SyncVars};
use tracing::debug;

use crate::context::ParallelContext;
use crate::options::{install, ParallelOptions};
use crate::visitor::ParallelVisitor;
use crate::walk::{AdapterMerge, Walk};

/// Rewrites immutable trees on a worker pool.
pub struct ParallelTransformer<Ad> {
    adapter: Ad,
    options: ParallelOptions,
    root_vars: SyncVars,
}

impl<Ad> ParallelTransformer<Ad> {
    pub fn new(adapter: Ad) -> Self {
        Self::with_options(adapter, ParallelOptions::default())
    }

    pub fn with_options(adapter: Ad, options: ParallelOptions) -> Self {
        Self {
            adapter,
            options,
            root_vars: SyncVars::new(),
        }
    }

    /// Add a root variable, visible through `var_from_parents`.
    pub fn root_var<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.root_vars.insert(value);
        self
    }

    pub fn adapter(&self) -> &Ad {
        &self.adapter
    }

    pub fn options(&self) -> &ParallelOptions {
        &self.options
    }

    /// Walk `root` with `visitor` and return the edited tree.
    ///
    /// Returns `root` itself when no edits were recorded.
    ///
    /// # Errors
    ///
    /// `WorkerPool` if a dedicated pool could not be built, or a lookup
    /// error if a merged edit points outside its parent's children.
    ///
    /// # Panics
    ///
    /// If a callback returns `Quit` or misuses an edit operation.
    pub fn transform<N, V>(&self, root: N, visitor: &V) -> ArborResult<N>
    where
        Ad: NodeAdapter<N> + Sync,
        N: Clone + NodeIdentity + Send + Sync,
        V: ParallelVisitor<N> + ?Sized,
    {
        debug!(threads = ?self.options.threads, "parallel transform started");
        let children_of = |node: &N| self.adapter.named_children(node);
        let merge = AdapterMerge {
            adapter: &self.adapter,
        };
        let walk = Walk::new(&children_of, visitor, &merge);
        let root = install(&self.options, || {
            let mut context = ParallelContext::root(root, &self.root_vars);
            walk.visit(&mut context)?;
            Ok(context.into_node())
        })?;
        debug!(entered = walk.entered(), "parallel transform finished");
        Ok(root)
    }
}
