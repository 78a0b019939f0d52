// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Node adapter trait.
//!
//! [`NodeAdapter`] is the only crossing point between the generic engine and
//! a domain tree type. A domain type implements it once to become walkable by
//! the [`TreeTransformer`](crate::transformer::TreeTransformer), the zipper
//! machinery and the parallel transformer.
//!
//! # Contract
//!
//! - `named_children` lists the node's child groups in a stable order.
//! - `with_children` returns a new node equal to the given one except that
//!   its child groups are replaced wholesale. Non-child data is preserved.
//! - `remove_child` structurally deletes one child, renumbering the rest of
//!   its group downward.
//!
//! No adapter method may have side effects; the engine may call them any
//! number of times and from worker threads (for the parallel transformer).

use crate::children::{NamedChildren, NodeLocation};
use crate::error::{ArborError, ArborResult};

/// Capability a domain tree type provides to be rewritten generically.
pub trait NodeAdapter<N> {
    /// The node's child groups, in insertion order.
    fn named_children(&self, node: &N) -> NamedChildren<N>;

    /// A copy of `node` with its child groups replaced by `children`.
    fn with_children(&self, node: &N, children: NamedChildren<N>) -> N;

    /// A copy of `node` without the child at `location`.
    ///
    /// # Errors
    ///
    /// `UnknownGroup` if the group does not exist, `ChildOutOfBounds` if the
    /// index is past the end of the group.
    fn remove_child(&self, node: &N, location: &NodeLocation) -> ArborResult<N> {
        let mut children = self.named_children(node);
        let group = children
            .get_mut(&location.group)
            .ok_or_else(|| ArborError::unknown_group(location.group.clone()))?;
        if location.index >= group.len() {
            return Err(ArborError::out_of_bounds(
                location.group.clone(),
                location.index,
                group.len(),
            ));
        }
        group.remove(location.index);
        Ok(self.with_children(node, children))
    }
}

impl<N, Ad: NodeAdapter<N> + ?Sized> NodeAdapter<N> for &Ad {
    fn named_children(&self, node: &N) -> NamedChildren<N> {
        (**self).named_children(node)
    }

    fn with_children(&self, node: &N, children: NamedChildren<N>) -> N {
        (**self).with_children(node, children)
    }

    fn remove_child(&self, node: &N, location: &NodeLocation) -> ArborResult<N> {
        (**self).remove_child(node, location)
    }
}
