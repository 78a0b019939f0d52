// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Child edit primitives and their ordered application.
//!
//! Both transformers reduce the edits made under one parent to a list of
//! [`ChildEdit`]s and apply them to the parent's child groups in a single
//! pass with [`apply_child_edits`].
//!
//! # Ordering
//!
//! Edits are applied in ascending location index. Edits sharing an index are
//! applied by kind: `Replace`, then `InsertBefore`, then `InsertAfter`. The
//! sort is stable, so inserts of the same kind at the same index keep the
//! order in which they were recorded.
//!
//! Each group carries a running offset: a `Delete` shifts the remaining
//! indices of its group down by one and an insert shifts them up by one, so
//! every edit is expressed against the original child positions.

use std::collections::{HashMap, HashSet};

use crate::children::{GroupName, NamedChildren, NodeLocation};
use crate::error::{ArborError, ArborResult};

/// The kind of edit a zipper carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModificationType {
    /// Substitute the node at its location.
    #[default]
    Replace,
    /// Remove the node at its location.
    Delete,
    /// Insert a new node immediately before the anchor location.
    InsertBefore,
    /// Insert a new node immediately after the anchor location.
    InsertAfter,
}

impl ModificationType {
    /// Rank among edits sharing a location index. `Delete` never shares an
    /// index with another edit.
    pub fn precedence(&self) -> u8 {
        match self {
            ModificationType::Replace | ModificationType::Delete => 0,
            ModificationType::InsertBefore => 1,
            ModificationType::InsertAfter => 2,
        }
    }

    /// Returns true for `InsertBefore` and `InsertAfter`.
    pub fn is_insertion(&self) -> bool {
        matches!(
            self,
            ModificationType::InsertBefore | ModificationType::InsertAfter
        )
    }
}

/// One edit to a parent's children, expressed against original positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEdit<N> {
    /// The edited (or anchor) child.
    pub location: NodeLocation,
    /// What to do at `location`.
    pub kind: ModificationType,
    /// Replacement or inserted node. Ignored for `Delete`.
    pub node: N,
}

impl<N> ChildEdit<N> {
    /// An edit of `kind` at `location` carrying `node`.
    pub fn new(location: NodeLocation, kind: ModificationType, node: N) -> Self {
        Self {
            location,
            kind,
            node,
        }
    }
}

/// Apply `edits` to `children` in one pass.
///
/// # Errors
///
/// `UnknownGroup` or `ChildOutOfBounds` if an edit's location does not name
/// an existing child.
///
/// # Panics
///
/// If a deleted location carries any other edit.
pub fn apply_child_edits<N>(
    children: &mut NamedChildren<N>,
    mut edits: Vec<ChildEdit<N>>,
) -> ArborResult<()> {
    edits.sort_by_key(|edit| (edit.location.index, edit.kind.precedence()));

    let mut offsets: HashMap<GroupName, isize> = HashMap::new();
    let mut deleted: HashSet<NodeLocation> = HashSet::new();

    for ChildEdit {
        location,
        kind,
        node,
    } in edits
    {
        assert!(
            !deleted.contains(&location),
            "deleted child {} cannot carry further edits",
            location
        );
        let group = children
            .get_mut(&location.group)
            .ok_or_else(|| ArborError::unknown_group(location.group.clone()))?;
        let offset = offsets.entry(location.group.clone()).or_insert(0);
        let position = location.index as isize + *offset;
        if position < 0 || position as usize >= group.len() {
            let original_len = (group.len() as isize - *offset).max(0) as usize;
            return Err(ArborError::out_of_bounds(
                location.group.clone(),
                location.index,
                original_len,
            ));
        }
        let position = position as usize;

        match kind {
            ModificationType::Replace => group[position] = node,
            ModificationType::Delete => {
                group.remove(position);
                *offset -= 1;
                deleted.insert(location);
            }
            ModificationType::InsertBefore => {
                group.insert(position, node);
                *offset += 1;
            }
            ModificationType::InsertAfter => {
                group.insert(position + 1, node);
                *offset += 1;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> NamedChildren<&'static str> {
        NamedChildren::unnamed(vec!["c0", "c1", "c2"])
    }

    fn edit(index: usize, kind: ModificationType, node: &'static str) -> ChildEdit<&'static str> {
        ChildEdit::new(NodeLocation::unnamed(index), kind, node)
    }

    fn unnamed(children: &NamedChildren<&'static str>) -> Vec<&'static str> {
        children.get(&GroupName::Unnamed).unwrap().to_vec()
    }

    mod ordering {
        use super::*;

        #[test]
        fn replace_and_insert_after_at_diverging_indices() {
            let mut children = abc();
            apply_child_edits(
                &mut children,
                vec![
                    edit(1, ModificationType::Replace, "r1"),
                    edit(0, ModificationType::InsertAfter, "inserted"),
                ],
            )
            .unwrap();
            assert_eq!(unnamed(&children), vec!["c0", "inserted", "r1", "c2"]);
        }

        #[test]
        fn same_index_uses_kind_precedence() {
            let mut children = abc();
            apply_child_edits(
                &mut children,
                vec![
                    edit(1, ModificationType::InsertAfter, "after"),
                    edit(1, ModificationType::InsertBefore, "before"),
                    edit(1, ModificationType::Replace, "r1"),
                ],
            )
            .unwrap();
            assert_eq!(unnamed(&children), vec!["c0", "before", "r1", "after", "c2"]);
        }

        #[test]
        fn same_kind_inserts_keep_recording_order() {
            let mut children = abc();
            apply_child_edits(
                &mut children,
                vec![
                    edit(0, ModificationType::InsertAfter, "a"),
                    edit(0, ModificationType::InsertAfter, "b"),
                    edit(2, ModificationType::InsertBefore, "x"),
                    edit(2, ModificationType::InsertBefore, "y"),
                ],
            )
            .unwrap();
            assert_eq!(unnamed(&children), vec!["c0", "a", "b", "c1", "x", "y", "c2"]);
        }
    }

    mod offsets {
        use super::*;

        #[test]
        fn delete_shifts_later_indices_down() {
            let mut children = abc();
            apply_child_edits(
                &mut children,
                vec![
                    edit(0, ModificationType::Delete, "c0"),
                    edit(2, ModificationType::Replace, "r2"),
                ],
            )
            .unwrap();
            assert_eq!(unnamed(&children), vec!["c1", "r2"]);
        }

        #[test]
        fn delete_every_child() {
            let mut children = abc();
            apply_child_edits(
                &mut children,
                (0..3)
                    .map(|i| edit(i, ModificationType::Delete, ""))
                    .collect(),
            )
            .unwrap();
            assert!(children.is_empty());
        }

        #[test]
        fn groups_have_independent_offsets() {
            let mut children = NamedChildren::new()
                .with_group("a", vec!["a0", "a1"])
                .with_group("b", vec!["b0", "b1"]);
            apply_child_edits(
                &mut children,
                vec![
                    ChildEdit::new(
                        NodeLocation::new("a", 0),
                        ModificationType::InsertBefore,
                        "new",
                    ),
                    ChildEdit::new(NodeLocation::new("b", 1), ModificationType::Replace, "rb1"),
                ],
            )
            .unwrap();
            assert_eq!(children.get(&"a".into()), Some(&["new", "a0", "a1"][..]));
            assert_eq!(children.get(&"b".into()), Some(&["b0", "rb1"][..]));
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn out_of_bounds_reports_original_length() {
            let mut children = abc();
            let err = apply_child_edits(
                &mut children,
                vec![
                    edit(0, ModificationType::InsertBefore, "x"),
                    edit(3, ModificationType::Replace, "r3"),
                ],
            )
            .unwrap_err();
            assert_eq!(err, ArborError::out_of_bounds(GroupName::Unnamed, 3, 3));
        }

        #[test]
        fn unknown_group() {
            let mut children = abc();
            let err = apply_child_edits(
                &mut children,
                vec![ChildEdit::new(
                    NodeLocation::new("fields", 0),
                    ModificationType::Replace,
                    "x",
                )],
            )
            .unwrap_err();
            assert_eq!(err.class(), crate::error::ErrorClass::Lookup);
        }

        #[test]
        #[should_panic(expected = "cannot carry further edits")]
        fn deleted_location_rejects_other_edits() {
            let mut children = abc();
            let _ = apply_child_edits(
                &mut children,
                vec![
                    edit(1, ModificationType::Delete, ""),
                    edit(1, ModificationType::InsertAfter, "x"),
                ],
            );
        }
    }

    #[test]
    fn precedence_table() {
        assert_eq!(ModificationType::Replace.precedence(), 0);
        assert_eq!(ModificationType::Delete.precedence(), 0);
        assert!(
            ModificationType::InsertBefore.precedence() < ModificationType::InsertAfter.precedence()
        );
        assert!(ModificationType::InsertAfter.is_insertion());
        assert!(!ModificationType::Delete.is_insertion());
    }
}
