// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Configuration for sequential traversals.
//!
//! Option structs are plain data with `Default` values and `with_*`
//! builders. They derive serde so a host can embed them in its own
//! configuration files.

use serde::{Deserialize, Serialize};

/// Order in which pending nodes are taken off the work list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalOrder {
    /// Stack order: a node's whole subtree is processed before its next
    /// sibling.
    #[default]
    DepthFirst,
    /// Queue order: nodes are processed level by level.
    BreadthFirst,
}

/// Options for a sequential [`Traverser`](crate::traverser::Traverser).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraverserOptions {
    /// Work-list order.
    pub order: TraversalOrder,
}

impl TraverserOptions {
    /// Options for a depth-first walk.
    pub fn depth_first() -> Self {
        Self {
            order: TraversalOrder::DepthFirst,
        }
    }

    /// Options for a breadth-first walk.
    pub fn breadth_first() -> Self {
        Self {
            order: TraversalOrder::BreadthFirst,
        }
    }

    /// Set the traversal order.
    pub fn with_order(mut self, order: TraversalOrder) -> Self {
        self.order = order;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_depth_first() {
        assert_eq!(TraverserOptions::default().order, TraversalOrder::DepthFirst);
    }

    #[test]
    fn deserialize_from_host_config() {
        let options: TraverserOptions =
            serde_json::from_str(r#"{"order":"breadth_first"}"#).unwrap();
        assert_eq!(options, TraverserOptions::breadth_first());
    }

    #[test]
    fn missing_fields_use_defaults() {
        let options: TraverserOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, TraverserOptions::depth_first());
    }

    #[test]
    fn with_order_overrides() {
        let options = TraverserOptions::default().with_order(TraversalOrder::BreadthFirst);
        assert_eq!(options.order, TraversalOrder::BreadthFirst);
    }
}
