// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Named child groups, child locations and breadcrumbs.
//!
//! A node exposes its children as an insertion-ordered list of *groups*.
//! Each group has a [`GroupName`] (or is [`GroupName::Unnamed`] for trees
//! with a single child list) and an ordered `Vec` of children. A child's
//! position is a [`NodeLocation`]: the group name plus a zero-based index
//! into that group.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ArborError, ArborResult};

// ============================================================================
// Group names and locations
// ============================================================================

/// Name of a child group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GroupName {
    /// The single child list of a tree without named groups.
    Unnamed,
    /// A named group such as `"fields"` or `"arguments"`.
    Named(String),
}

impl GroupName {
    /// Create a named group.
    pub fn named(name: impl Into<String>) -> Self {
        GroupName::Named(name.into())
    }

    /// The group name as a string, if it has one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            GroupName::Unnamed => None,
            GroupName::Named(name) => Some(name),
        }
    }
}

impl From<&str> for GroupName {
    fn from(name: &str) -> Self {
        GroupName::Named(name.to_string())
    }
}

impl From<String> for GroupName {
    fn from(name: String) -> Self {
        GroupName::Named(name)
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupName::Unnamed => write!(f, "<unnamed>"),
            GroupName::Named(name) => write!(f, "{}", name),
        }
    }
}

/// Position of a child within its parent: `(group, index)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeLocation {
    /// The child group.
    pub group: GroupName,
    /// Zero-based index inside the group.
    pub index: usize,
}

impl NodeLocation {
    /// Create a location in a group.
    pub fn new(group: impl Into<GroupName>, index: usize) -> Self {
        Self {
            group: group.into(),
            index,
        }
    }

    /// Create a location in the unnamed group.
    pub fn unnamed(index: usize) -> Self {
        Self {
            group: GroupName::Unnamed,
            index,
        }
    }
}

impl fmt::Display for NodeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.group, self.index)
    }
}

/// One step of a path towards the root.
///
/// Records that `node` has, at `location`, the node one level below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb<N> {
    /// The ancestor node.
    pub node: N,
    /// Location of the child below `node`.
    pub location: NodeLocation,
}

impl<N> Breadcrumb<N> {
    /// Create a breadcrumb.
    pub fn new(node: N, location: NodeLocation) -> Self {
        Self { node, location }
    }
}

// ============================================================================
// NamedChildren
// ============================================================================

/// Insertion-ordered map from [`GroupName`] to the children in that group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedChildren<N> {
    groups: Vec<(GroupName, Vec<N>)>,
}

impl<N> Default for NamedChildren<N> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

impl<N> NamedChildren<N> {
    /// Create an empty set of groups.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create children consisting of a single unnamed group.
    pub fn unnamed(children: Vec<N>) -> Self {
        Self {
            groups: vec![(GroupName::Unnamed, children)],
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_group(mut self, group: impl Into<GroupName>, children: Vec<N>) -> Self {
        self.insert(group, children);
        self
    }

    /// Set the children of a group.
    ///
    /// An existing group keeps its position and its previous children are
    /// returned; a new group is appended.
    pub fn insert(&mut self, group: impl Into<GroupName>, children: Vec<N>) -> Option<Vec<N>> {
        let group = group.into();
        match self.groups.iter_mut().find(|(name, _)| *name == group) {
            Some((_, existing)) => Some(std::mem::replace(existing, children)),
            None => {
                self.groups.push((group, children));
                None
            }
        }
    }

    /// Append a child to a group, creating the group if needed.
    pub fn push(&mut self, group: impl Into<GroupName>, child: N) {
        let group = group.into();
        match self.get_mut(&group) {
            Some(children) => children.push(child),
            None => self.groups.push((group, vec![child])),
        }
    }

    /// Children of a group.
    pub fn get(&self, group: &GroupName) -> Option<&[N]> {
        self.groups
            .iter()
            .find(|(name, _)| name == group)
            .map(|(_, children)| children.as_slice())
    }

    /// Children of a group, mutably.
    pub fn get_mut(&mut self, group: &GroupName) -> Option<&mut Vec<N>> {
        self.groups
            .iter_mut()
            .find(|(name, _)| name == group)
            .map(|(_, children)| children)
    }

    /// The child at `location`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownGroup` if the group does not exist and
    /// `ChildOutOfBounds` if the index is past the end of the group.
    pub fn child_at(&self, location: &NodeLocation) -> ArborResult<&N> {
        let children = self
            .get(&location.group)
            .ok_or_else(|| ArborError::unknown_group(location.group.clone()))?;
        children.get(location.index).ok_or_else(|| {
            ArborError::out_of_bounds(location.group.clone(), location.index, children.len())
        })
    }

    /// Group names in insertion order.
    pub fn group_names(&self) -> impl Iterator<Item = &GroupName> {
        self.groups.iter().map(|(name, _)| name)
    }

    /// Iterate over `(group, children)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&GroupName, &[N])> {
        self.groups
            .iter()
            .map(|(name, children)| (name, children.as_slice()))
    }

    /// Iterate over every child with its location, group by group.
    pub fn locations(&self) -> impl Iterator<Item = (NodeLocation, &N)> {
        self.groups.iter().flat_map(|(name, children)| {
            children
                .iter()
                .enumerate()
                .map(move |(index, child)| (NodeLocation::new(name.clone(), index), child))
        })
    }

    /// Number of groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Total number of children across all groups.
    pub fn child_count(&self) -> usize {
        self.groups.iter().map(|(_, children)| children.len()).sum()
    }

    /// Returns true if there are no children in any group.
    pub fn is_empty(&self) -> bool {
        self.child_count() == 0
    }
}

impl<N: Clone> NamedChildren<N> {
    /// Every child with its location, cloned out of the groups.
    pub fn to_located(&self) -> Vec<(NodeLocation, N)> {
        self.locations()
            .map(|(location, child)| (location, child.clone()))
            .collect()
    }
}

impl<N> IntoIterator for NamedChildren<N> {
    type Item = (GroupName, Vec<N>);
    type IntoIter = std::vec::IntoIter<(GroupName, Vec<N>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

impl<N, G: Into<GroupName>> FromIterator<(G, Vec<N>)> for NamedChildren<N> {
    fn from_iter<I: IntoIterator<Item = (G, Vec<N>)>>(iter: I) -> Self {
        let mut children = NamedChildren::new();
        for (group, nodes) in iter {
            children.insert(group, nodes);
        }
        children
    }
}
