// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Zippers over immutable trees.
//!
//! A [`NodeZipper`] is a focused node plus its breadcrumbs back to the root
//! and the kind of edit it represents. Moving up rebuilds each ancestor
//! through the [`NodeAdapter`], so the original tree is never touched and
//! untouched subtrees are shared with the result.
//!
//! A [`NodeMultiZipper`] holds many independently edited zippers that trace
//! back to one common root and folds them bottom-up into a single new root.

use tracing::trace;

use crate::adapter::NodeAdapter;
use crate::children::{Breadcrumb, NodeLocation};
use crate::edit::{apply_child_edits, ChildEdit, ModificationType};
use crate::error::ArborResult;
use crate::identity::{NodeId, NodeIdentity};

// ============================================================================
// NodeZipper
// ============================================================================

/// A focused node, its path to the root (nearest ancestor first) and the
/// edit it carries.
///
/// Breadcrumbs are empty exactly when the zipper is focused on the root.
#[derive(Debug, Clone)]
pub struct NodeZipper<N> {
    node: N,
    breadcrumbs: Vec<Breadcrumb<N>>,
    modification: ModificationType,
}

impl<N> NodeZipper<N> {
    /// A `Replace` zipper.
    pub fn new(node: N, breadcrumbs: Vec<Breadcrumb<N>>) -> Self {
        Self::with_modification(node, breadcrumbs, ModificationType::Replace)
    }

    pub fn with_modification(
        node: N,
        breadcrumbs: Vec<Breadcrumb<N>>,
        modification: ModificationType,
    ) -> Self {
        Self {
            node,
            breadcrumbs,
            modification,
        }
    }

    pub fn cur_node(&self) -> &N {
        &self.node
    }

    pub fn breadcrumbs(&self) -> &[Breadcrumb<N>] {
        &self.breadcrumbs
    }

    pub fn modification(&self) -> ModificationType {
        self.modification
    }

    /// Location of the focused node in its parent, `None` at the root.
    pub fn location(&self) -> Option<&NodeLocation> {
        self.breadcrumbs.first().map(|crumb| &crumb.location)
    }

    pub fn is_root(&self) -> bool {
        self.breadcrumbs.is_empty()
    }

    /// Number of breadcrumbs.
    pub fn depth(&self) -> usize {
        self.breadcrumbs.len()
    }

    pub fn into_node(self) -> N {
        self.node
    }

    /// Drop the `levels` breadcrumbs nearest the root, so the zipper starts
    /// at the ancestor `levels` steps below the old root.
    pub fn rebased(mut self, levels: usize) -> Self {
        let keep = self.breadcrumbs.len().saturating_sub(levels);
        self.breadcrumbs.truncate(keep);
        self
    }
}

impl<N: Clone> NodeZipper<N> {
    /// Same path and edit kind, different node.
    pub fn with_new_node(&self, node: N) -> Self {
        Self::with_modification(node, self.breadcrumbs.clone(), self.modification)
    }

    /// A zipper that deletes the focused node.
    pub fn delete_node(&self) -> Self {
        Self::with_modification(
            self.node.clone(),
            self.breadcrumbs.clone(),
            ModificationType::Delete,
        )
    }

    /// A zipper that inserts `node` before the focused node.
    pub fn insert_before(&self, node: N) -> Self {
        Self::with_modification(node, self.breadcrumbs.clone(), ModificationType::InsertBefore)
    }

    /// A zipper that inserts `node` after the focused node.
    pub fn insert_after(&self, node: N) -> Self {
        Self::with_modification(node, self.breadcrumbs.clone(), ModificationType::InsertAfter)
    }

    /// Apply this zipper's edit to its parent and focus on the parent.
    ///
    /// The returned zipper is always a `Replace`.
    ///
    /// # Panics
    ///
    /// If the zipper is focused on the root.
    pub fn move_up<Ad: NodeAdapter<N> + ?Sized>(&self, adapter: &Ad) -> ArborResult<Self> {
        assert!(!self.is_root(), "cannot move up from the root node");
        let crumb = &self.breadcrumbs[0];
        let parent = match self.modification {
            ModificationType::Delete => adapter.remove_child(&crumb.node, &crumb.location)?,
            kind => {
                let mut children = adapter.named_children(&crumb.node);
                apply_child_edits(
                    &mut children,
                    vec![ChildEdit::new(crumb.location.clone(), kind, self.node.clone())],
                )?;
                adapter.with_children(&crumb.node, children)
            }
        };
        Ok(NodeZipper::new(parent, self.breadcrumbs[1..].to_vec()))
    }

    /// Move up until the root and return the rebuilt root.
    ///
    /// # Panics
    ///
    /// If the zipper is focused on the root and is not a `Replace`.
    pub fn to_root<Ad: NodeAdapter<N> + ?Sized>(self, adapter: &Ad) -> ArborResult<N> {
        let mut zipper = self;
        while !zipper.is_root() {
            zipper = zipper.move_up(adapter)?;
        }
        assert_eq!(
            zipper.modification,
            ModificationType::Replace,
            "the root node can only be replaced"
        );
        Ok(zipper.node)
    }
}

// ============================================================================
// NodeMultiZipper
// ============================================================================

/// A set of edited zippers sharing one common root.
#[derive(Debug, Clone)]
pub struct NodeMultiZipper<N> {
    common_root: N,
    zippers: Vec<NodeZipper<N>>,
}

impl<N> NodeMultiZipper<N> {
    pub fn new(common_root: N, zippers: Vec<NodeZipper<N>>) -> Self {
        Self {
            common_root,
            zippers,
        }
    }

    pub fn common_root(&self) -> &N {
        &self.common_root
    }

    pub fn zippers(&self) -> &[NodeZipper<N>] {
        &self.zippers
    }

    pub fn len(&self) -> usize {
        self.zippers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zippers.is_empty()
    }

    /// Add a zipper, returning its slot.
    pub fn push(&mut self, zipper: NodeZipper<N>) -> usize {
        self.zippers.push(zipper);
        self.zippers.len() - 1
    }

    /// Overwrite the zipper in `slot`.
    pub fn replace_zipper_at(&mut self, slot: usize, zipper: NodeZipper<N>) {
        self.zippers[slot] = zipper;
    }

    /// Remove and return the zippers from `slot` on.
    pub fn split_off(&mut self, slot: usize) -> Vec<NodeZipper<N>> {
        self.zippers.split_off(slot)
    }

    pub fn with_new_zipper(mut self, zipper: NodeZipper<N>) -> Self {
        self.zippers.push(zipper);
        self
    }

    pub fn with_replaced_zippers(self, zippers: Vec<NodeZipper<N>>) -> Self {
        Self::new(self.common_root, zippers)
    }

    /// The focused nodes of every zipper.
    pub fn modified_nodes(&self) -> impl Iterator<Item = &N> {
        self.zippers.iter().map(NodeZipper::cur_node)
    }
}

impl<N: NodeIdentity> NodeMultiZipper<N> {
    /// The first zipper focused on the node with identity `id`.
    pub fn zipper_for_node(&self, id: NodeId) -> Option<&NodeZipper<N>> {
        self.zippers.iter().find(|zipper| zipper.node.node_id() == id)
    }
}

/// Identity of a path: each breadcrumb's node identity and location.
type PathKey = Vec<(NodeId, NodeLocation)>;

fn path_key<N: NodeIdentity>(breadcrumbs: &[Breadcrumb<N>]) -> PathKey {
    breadcrumbs
        .iter()
        .map(|crumb| (crumb.node.node_id(), crumb.location.clone()))
        .collect()
}

impl<N: Clone + NodeIdentity> NodeMultiZipper<N> {
    /// Fold every zipper into one new root.
    ///
    /// Repeatedly takes the deepest zippers, groups them by their immediate
    /// parent (identity and path), and folds each group into one
    /// `Replace` zipper on the parent with a single `with_children` call.
    ///
    /// The parent's own zipper is found by path. A `Replace` that still
    /// holds the node the children were edited under is superseded by the
    /// folded zipper. A `Delete`, or a `Replace` with a different node,
    /// was made after the children were edited and wins: the fold is
    /// dropped. Returns the common root when there are no zippers.
    ///
    /// # Panics
    ///
    /// If several zippers remain at the root, which means they do not share
    /// the common root.
    pub fn to_root_node<Ad: NodeAdapter<N> + ?Sized>(self, adapter: &Ad) -> ArborResult<N> {
        let NodeMultiZipper {
            common_root,
            mut zippers,
        } = self;

        while zippers.len() > 1 {
            let max_depth = zippers.iter().map(NodeZipper::depth).max().unwrap_or(0);
            assert!(
                max_depth > 0,
                "{} zippers remain at the root and cannot be merged",
                zippers.len()
            );

            let (deepest, mut rest): (Vec<_>, Vec<_>) = zippers
                .into_iter()
                .partition(|zipper| zipper.depth() == max_depth);

            let mut groups: Vec<((NodeId, PathKey), Vec<NodeZipper<N>>)> = Vec::new();
            for zipper in deepest {
                let key = (
                    zipper.breadcrumbs[0].node.node_id(),
                    path_key(&zipper.breadcrumbs[1..]),
                );
                match groups.iter_mut().find(|(existing, _)| *existing == key) {
                    Some((_, members)) => members.push(zipper),
                    None => groups.push((key, vec![zipper])),
                }
            }
            trace!(depth = max_depth, parents = groups.len(), "folding zippers");

            for ((parent_id, parent_path), members) in groups {
                let at_parent =
                    |zipper: &NodeZipper<N>| path_key(&zipper.breadcrumbs) == parent_path;
                let overridden = rest.iter().any(|zipper| {
                    at_parent(zipper)
                        && match zipper.modification {
                            ModificationType::Delete => true,
                            ModificationType::Replace => zipper.node.node_id() != parent_id,
                            _ => false,
                        }
                });
                if overridden {
                    trace!(edits = members.len(), "parent was edited later, dropping fold");
                    continue;
                }
                rest.retain(|zipper| {
                    !(zipper.modification == ModificationType::Replace && at_parent(zipper))
                });
                rest.push(fold_into_parent(adapter, members)?);
            }
            zippers = rest;
        }

        match zippers.pop() {
            Some(zipper) => zipper.to_root(adapter),
            None => Ok(common_root),
        }
    }
}

/// Merge zippers that share an immediate parent into one zipper on it.
fn fold_into_parent<N, Ad>(adapter: &Ad, members: Vec<NodeZipper<N>>) -> ArborResult<NodeZipper<N>>
where
    N: Clone,
    Ad: NodeAdapter<N> + ?Sized,
{
    let parent = members[0].breadcrumbs[0].node.clone();
    let path = members[0].breadcrumbs[1..].to_vec();

    let edits = members
        .into_iter()
        .map(|zipper| {
            ChildEdit::new(
                zipper.breadcrumbs[0].location.clone(),
                zipper.modification,
                zipper.node,
            )
        })
        .collect();
    let mut children = adapter.named_children(&parent);
    apply_child_edits(&mut children, edits)?;
    Ok(NodeZipper::new(adapter.with_children(&parent, children), path))
}
