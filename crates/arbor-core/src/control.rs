// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Traversal control signals returned by visitor callbacks.

/// Result of a visitor callback - controls traversal behavior.
///
/// When a visitor method returns a `TraversalControl`, it controls how the
/// traverser proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TraversalControl {
    /// Continue traversal into children.
    ///
    /// After the children have been processed, `leave` is called for this
    /// node.
    #[default]
    Continue,

    /// Skip children, continue with siblings.
    ///
    /// Returned from `enter`, the node's children are never scheduled and no
    /// `leave` is called for it. Returned from `leave` or `back_ref` it has
    /// the same effect as `Continue`.
    Abort,

    /// Stop traversal entirely.
    ///
    /// All pending work is dropped and the traverse call returns
    /// immediately. Only legal for sequential traversals.
    Quit,
}

impl TraversalControl {
    /// Returns true if this is `Continue`.
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }

    /// Returns true if this is `Abort`.
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Abort)
    }

    /// Returns true if this is `Quit`.
    pub fn is_quit(&self) -> bool {
        matches!(self, Self::Quit)
    }
}
