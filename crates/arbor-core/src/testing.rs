// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Test fixtures shared by the arbor crates.
//!
//! Provides a small `Arc`-based labelled tree, an adapter for it, a compact
//! string rendering for assertions, and a logging initializer for tests.
//!
//! Enabled for this crate's own tests and, for other crates, through the
//! `test-support` feature.

use std::sync::Arc;

use crate::adapter::NodeAdapter;
use crate::children::NamedChildren;

/// Payload of a [`TestNode`].
#[derive(Debug, PartialEq, Eq)]
pub struct TestNodeData {
    pub label: String,
    pub children: NamedChildren<TestNode>,
}

/// Reference-counted test node; identity is the `Arc` address.
pub type TestNode = Arc<TestNodeData>;

/// A node without child groups.
pub fn leaf(label: &str) -> TestNode {
    Arc::new(TestNodeData {
        label: label.to_string(),
        children: NamedChildren::new(),
    })
}

/// A node with one unnamed group.
pub fn node(label: &str, children: Vec<TestNode>) -> TestNode {
    Arc::new(TestNodeData {
        label: label.to_string(),
        children: NamedChildren::unnamed(children),
    })
}

/// A node with named groups, in the given order.
pub fn grouped(label: &str, groups: Vec<(&str, Vec<TestNode>)>) -> TestNode {
    Arc::new(TestNodeData {
        label: label.to_string(),
        children: groups.into_iter().collect(),
    })
}

/// Child extraction for [`Traverser`](crate::traverser::Traverser).
pub fn children_of(node: &TestNode) -> NamedChildren<TestNode> {
    node.children.clone()
}

/// Same children, new label.
pub fn relabel(node: &TestNode, label: &str) -> TestNode {
    Arc::new(TestNodeData {
        label: label.to_string(),
        children: node.children.clone(),
    })
}

/// Node adapter for [`TestNode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TestAdapter;

impl NodeAdapter<TestNode> for TestAdapter {
    fn named_children(&self, node: &TestNode) -> NamedChildren<TestNode> {
        node.children.clone()
    }

    fn with_children(&self, node: &TestNode, children: NamedChildren<TestNode>) -> TestNode {
        Arc::new(TestNodeData {
            label: node.label.clone(),
            children,
        })
    }
}

/// Render a tree as `label(child,child;group=[child])`.
///
/// The unnamed group renders as a bare list, named groups as `name=[...]`,
/// groups are separated by `;`. A node without groups renders as its label.
pub fn render(node: &TestNode) -> String {
    if node.children.group_count() == 0 {
        return node.label.clone();
    }
    let groups: Vec<String> = node
        .children
        .iter()
        .map(|(group, children)| {
            let rendered: Vec<String> = children.iter().map(render).collect();
            match group.as_str() {
                None => rendered.join(","),
                Some(name) => format!("{}=[{}]", name, rendered.join(",")),
            }
        })
        .collect();
    format!("{}({})", node.label, groups.join(";"))
}

/// Install a test-writer `tracing` subscriber honoring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
