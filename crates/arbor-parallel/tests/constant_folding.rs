// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Bottom-up rewriting with the parallel transformer on a domain type with
//! named child groups.

use std::sync::Arc;

use arbor_core::{GroupName, NamedChildren, NodeAdapter, TraversalControl};
use arbor_parallel::{ParallelContext, ParallelFnVisitor, ParallelOptions, ParallelTransformer};

#[derive(Debug, PartialEq)]
enum Expr {
    Num(i64),
    Var(&'static str),
    Add(Arc<Expr>, Arc<Expr>),
    Mul(Arc<Expr>, Arc<Expr>),
}

type ExprRef = Arc<Expr>;

fn num(n: i64) -> ExprRef {
    Arc::new(Expr::Num(n))
}

fn var(name: &'static str) -> ExprRef {
    Arc::new(Expr::Var(name))
}

fn add(lhs: ExprRef, rhs: ExprRef) -> ExprRef {
    Arc::new(Expr::Add(lhs, rhs))
}

fn mul(lhs: ExprRef, rhs: ExprRef) -> ExprRef {
    Arc::new(Expr::Mul(lhs, rhs))
}

struct ExprAdapter;

impl NodeAdapter<ExprRef> for ExprAdapter {
    fn named_children(&self, node: &ExprRef) -> NamedChildren<ExprRef> {
        match node.as_ref() {
            Expr::Num(_) | Expr::Var(_) => NamedChildren::new(),
            Expr::Add(lhs, rhs) | Expr::Mul(lhs, rhs) => NamedChildren::new()
                .with_group("lhs", vec![lhs.clone()])
                .with_group("rhs", vec![rhs.clone()]),
        }
    }

    fn with_children(&self, node: &ExprRef, children: NamedChildren<ExprRef>) -> ExprRef {
        let operand = |name: &str| {
            children
                .get(&GroupName::named(name))
                .and_then(|group| group.first())
                .cloned()
        };
        match (node.as_ref(), operand("lhs"), operand("rhs")) {
            (Expr::Add(..), Some(lhs), Some(rhs)) => add(lhs, rhs),
            (Expr::Mul(..), Some(lhs), Some(rhs)) => mul(lhs, rhs),
            _ => node.clone(),
        }
    }
}

fn value(expr: &Expr) -> Option<i64> {
    match expr {
        Expr::Num(n) => Some(*n),
        _ => None,
    }
}

fn fold(ctx: &mut ParallelContext<'_, ExprRef>) -> TraversalControl {
    let folded = match ctx.this_node().as_ref() {
        Expr::Add(lhs, rhs) => value(lhs).zip(value(rhs)).map(|(l, r)| l + r),
        Expr::Mul(lhs, rhs) => value(lhs).zip(value(rhs)).map(|(l, r)| l * r),
        Expr::Num(_) | Expr::Var(_) => None,
    };
    if let Some(n) = folded {
        ctx.change_node(num(n));
    }
    TraversalControl::Continue
}

fn fold_constants(expr: ExprRef, options: ParallelOptions) -> ExprRef {
    let visitor = ParallelFnVisitor::new().on_leave(fold);
    ParallelTransformer::with_options(ExprAdapter, options)
        .transform(expr, &visitor)
        .unwrap()
}

#[test]
fn folds_to_a_single_constant() {
    let expr = mul(add(num(1), num(2)), add(num(3), num(4)));
    let result = fold_constants(expr, ParallelOptions::default());
    assert_eq!(*result, Expr::Num(21));
}

#[test]
fn variables_stop_folding() {
    let expr = mul(var("x"), add(num(2), num(3)));
    let result = fold_constants(expr, ParallelOptions::default());
    assert_eq!(*result, Expr::Mul(var("x"), num(5)));
}

#[test]
fn untouched_subtrees_are_shared() {
    let shared = mul(var("x"), var("y"));
    let expr = add(shared.clone(), add(num(1), num(1)));
    let result = fold_constants(expr, ParallelOptions::default());
    match result.as_ref() {
        Expr::Add(lhs, rhs) => {
            assert!(Arc::ptr_eq(lhs, &shared));
            assert_eq!(**rhs, Expr::Num(2));
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn deep_chain_on_a_single_worker() {
    let expr = (1..=64).fold(num(0), |acc, n| add(acc, num(n)));
    let result = fold_constants(expr, ParallelOptions::default().with_threads(1));
    assert_eq!(*result, Expr::Num(64 * 65 / 2));
}
