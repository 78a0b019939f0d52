// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Property-based tests for the transformers.
//!
//! These tests use proptest to check that rewriting holds up across
//! randomly shaped trees.

use std::sync::Arc;

use proptest::prelude::*;

use arbor::parallel::{ParallelContext, ParallelFnVisitor, ParallelOptions, ParallelTransformer};
use arbor::{transformer, FnVisitor, TraversalControl, TraverserContext, TreeTransformer};
use arbor_core::testing::{leaf, node, relabel, render, TestAdapter, TestNode};

#[derive(Debug, Clone)]
enum Shape {
    Leaf,
    Branch(Vec<Shape>),
}

/// Strategy for tree shapes of up to a few dozen nodes.
fn shape() -> impl Strategy<Value = Shape> {
    Just(Shape::Leaf).prop_recursive(4, 32, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(Shape::Branch)
    })
}

/// Build a tree labelled `n0`, `n1`, ... in preorder.
fn build(shape: &Shape, next: &mut usize) -> TestNode {
    let label = format!("n{}", *next);
    *next += 1;
    match shape {
        Shape::Leaf => leaf(&label),
        Shape::Branch(children) => {
            let children = children.iter().map(|child| build(child, next)).collect();
            node(&label, children)
        }
    }
}

fn tree(shape: &Shape) -> TestNode {
    build(shape, &mut 0)
}

/// Nodes in preorder with the preorder index of their parent.
fn preorder(root: &TestNode) -> Vec<(TestNode, Option<usize>)> {
    fn walk(node: &TestNode, parent: Option<usize>, out: &mut Vec<(TestNode, Option<usize>)>) {
        let index = out.len();
        out.push((node.clone(), parent));
        for (_, children) in node.children.iter() {
            for child in children {
                walk(child, Some(index), out);
            }
        }
    }
    let mut out = Vec::new();
    walk(root, None, &mut out);
    out
}

/// Edit chosen for a node from the number in its label.
enum Rule {
    Keep,
    Delete,
    Change(String),
    InsertAfter(String),
}

fn rule(label: &str) -> Rule {
    let Some(n) = label.strip_prefix('n').and_then(|n| n.parse::<usize>().ok()) else {
        return Rule::Keep;
    };
    if n % 5 == 1 {
        Rule::Delete
    } else if n % 3 == 0 {
        Rule::Change(format!("N{}", n))
    } else if n % 7 == 2 {
        Rule::InsertAfter(format!("x{}", n))
    } else {
        Rule::Keep
    }
}

fn sequential(root: TestNode, edit: bool) -> TestNode {
    let mut visitor = FnVisitor::new().on_enter(|ctx: &mut TraverserContext<'_, TestNode>| {
        if !edit || ctx.is_root_context() {
            return TraversalControl::Continue;
        }
        match rule(&ctx.this_node().label) {
            Rule::Keep => TraversalControl::Continue,
            Rule::Delete => transformer::delete_node(ctx),
            Rule::Change(label) => {
                let changed = relabel(ctx.this_node(), &label);
                transformer::change_node(ctx, changed)
            }
            Rule::InsertAfter(label) => transformer::insert_after(ctx, leaf(&label)),
        }
    });
    TreeTransformer::new(TestAdapter)
        .transform(root, &mut visitor)
        .unwrap()
}

fn parallel(root: TestNode, edit: bool) -> TestNode {
    let visitor = ParallelFnVisitor::new().on_enter(|ctx: &mut ParallelContext<'_, TestNode>| {
        if !edit || ctx.is_root_context() {
            return TraversalControl::Continue;
        }
        match rule(&ctx.this_node().label) {
            Rule::Keep => {}
            Rule::Delete => ctx.delete_node(),
            Rule::Change(label) => {
                let changed = relabel(ctx.this_node(), &label);
                ctx.change_node(changed);
            }
            Rule::InsertAfter(label) => ctx.insert_after(leaf(&label)),
        }
        TraversalControl::Continue
    });
    ParallelTransformer::with_options(TestAdapter, ParallelOptions::default().with_threads(4))
        .transform(root, &visitor)
        .unwrap()
}

proptest! {
    /// A visitor that never edits gives back the very same root.
    #[test]
    fn no_edit_round_trip(shape in shape()) {
        let root = tree(&shape);
        let rendered = render(&root);

        let result = sequential(root.clone(), false);
        prop_assert!(Arc::ptr_eq(&result, &root));
        let result = parallel(root.clone(), false);
        prop_assert!(Arc::ptr_eq(&result, &root));
        prop_assert_eq!(render(&result), rendered);
    }

    /// Replacing one node rebuilds only the path from it to the root.
    #[test]
    fn single_replace_shares_everything_off_the_path(
        shape in shape(),
        pick in any::<prop::sample::Index>(),
    ) {
        let root = tree(&shape);
        let before = preorder(&root);
        let target = before[pick.index(before.len())].0.label.clone();

        let mut visitor = FnVisitor::new().on_enter(|ctx: &mut TraverserContext<'_, TestNode>| {
            if ctx.this_node().label == target {
                let changed = relabel(ctx.this_node(), "changed");
                return transformer::change_node(ctx, changed);
            }
            TraversalControl::Continue
        });
        let result = TreeTransformer::new(TestAdapter)
            .transform(root, &mut visitor)
            .unwrap();
        let after = preorder(&result);
        prop_assert_eq!(before.len(), after.len());

        let mut on_path = vec![false; before.len()];
        let mut current = Some(pick.index(before.len()));
        while let Some(index) = current {
            on_path[index] = true;
            current = before[index].1;
        }
        for (index, ((old, _), (new, _))) in before.iter().zip(&after).enumerate() {
            prop_assert_eq!(Arc::ptr_eq(old, new), !on_path[index], "node {}", index);
        }
    }

    /// Both transformers agree on the same edits.
    #[test]
    fn parallel_matches_sequential(shape in shape()) {
        let root = tree(&shape);
        let expected = render(&sequential(root.clone(), true));
        let actual = render(&parallel(root, true));
        prop_assert_eq!(actual, expected);
    }
}
