// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Traversal and rewriting of an `Rc`-based document tree with two named
//! child groups.

use std::rc::Rc;

use arbor_core::{
    transformer, ErrorClass, FnVisitor, NamedChildren, NodeAdapter, NodeLocation,
    TraversalControl, Traverser, TraverserContext, TreeTransformer,
};

#[derive(Debug)]
struct Element {
    tag: &'static str,
    head: Vec<Rc<Element>>,
    body: Vec<Rc<Element>>,
}

type El = Rc<Element>;

fn el(tag: &'static str) -> El {
    Rc::new(Element {
        tag,
        head: vec![],
        body: vec![],
    })
}

fn with_body(tag: &'static str, body: Vec<El>) -> El {
    Rc::new(Element {
        tag,
        head: vec![],
        body,
    })
}

fn retag(element: &El, tag: &'static str) -> El {
    Rc::new(Element {
        tag,
        head: element.head.clone(),
        body: element.body.clone(),
    })
}

/// `html` with `title` and `script` in its head and a body of sections.
fn document() -> El {
    Rc::new(Element {
        tag: "html",
        head: vec![el("title"), el("script")],
        body: vec![
            with_body("section", vec![el("p"), el("b")]),
            with_body("footer", vec![el("b")]),
        ],
    })
}

struct Markup;

impl NodeAdapter<El> for Markup {
    fn named_children(&self, node: &El) -> NamedChildren<El> {
        NamedChildren::new()
            .with_group("head", node.head.clone())
            .with_group("body", node.body.clone())
    }

    fn with_children(&self, node: &El, children: NamedChildren<El>) -> El {
        let group = |name: &str| {
            children
                .get(&name.into())
                .map(<[El]>::to_vec)
                .unwrap_or_default()
        };
        Rc::new(Element {
            tag: node.tag,
            head: group("head"),
            body: group("body"),
        })
    }
}

/// Tags in preorder, children in parentheses.
fn outline(node: &El) -> String {
    let children: Vec<String> = node.head.iter().chain(&node.body).map(outline).collect();
    if children.is_empty() {
        node.tag.to_string()
    } else {
        format!("{}({})", node.tag, children.join(" "))
    }
}

fn children_of(node: &El) -> NamedChildren<El> {
    Markup.named_children(node)
}

#[test]
fn breadth_first_visits_groups_in_order() {
    let mut tags = Vec::new();
    let mut visitor = FnVisitor::new().on_enter(|ctx: &mut TraverserContext<'_, El>| {
        tags.push(ctx.this_node().tag);
        TraversalControl::Continue
    });
    Traverser::breadth_first(children_of).traverse(document(), &mut visitor);
    drop(visitor);
    assert_eq!(
        tags,
        vec!["html", "title", "script", "section", "footer", "p", "b", "b"]
    );
}

#[test]
fn accumulator_tracks_max_depth() {
    let mut visitor = FnVisitor::new().on_enter(|ctx: &mut TraverserContext<'_, El, usize>| {
        let depth = ctx.depth();
        let deepest = ctx.accumulate_mut();
        *deepest = (*deepest).max(depth);
        TraversalControl::Continue
    });
    let result = Traverser::depth_first(children_of)
        .initial_accumulate(0usize)
        .traverse(document(), &mut visitor);
    assert_eq!(*result.accumulated_result(), 2);
    assert_eq!(result.entered_count(), 8);
}

#[test]
fn section_var_reaches_descendants() {
    struct Section(&'static str);

    let mut seen = Vec::new();
    let mut visitor = FnVisitor::new().on_enter(|ctx: &mut TraverserContext<'_, El>| {
        if matches!(ctx.this_node().tag, "section" | "footer") {
            ctx.set_var(Section(ctx.this_node().tag));
        } else if ctx.this_node().tag == "b" {
            let section = ctx.var_from_parents::<Section>().map(|s| s.0);
            let location = ctx.location().map(ToString::to_string);
            seen.push((section, location));
        }
        TraversalControl::Continue
    });
    Traverser::depth_first(children_of).traverse(document(), &mut visitor);
    drop(visitor);
    assert_eq!(
        seen,
        vec![
            (Some("section"), Some(NodeLocation::new("body", 1).to_string())),
            (Some("footer"), Some(NodeLocation::new("body", 0).to_string())),
        ]
    );
}

#[test]
fn transform_across_groups() {
    let mut visitor = FnVisitor::new().on_enter(|ctx: &mut TraverserContext<'_, El>| {
        match ctx.this_node().tag {
            "script" => transformer::delete_node(ctx),
            "b" => {
                let strong = retag(ctx.this_node(), "strong");
                transformer::change_node(ctx, strong)
            }
            "footer" => transformer::insert_before(ctx, el("hr")),
            _ => TraversalControl::Continue,
        }
    });
    let original = document();
    let result = TreeTransformer::new(Markup)
        .transform(original.clone(), &mut visitor)
        .unwrap();

    assert_eq!(
        outline(&result),
        "html(title section(p strong) hr footer(strong))"
    );
    assert_eq!(
        outline(&original),
        "html(title script section(p b) footer(b))"
    );
    assert!(Rc::ptr_eq(&result.head[0], &original.head[0]));
}

#[test]
fn remove_child_reports_lookup_errors() {
    let doc = document();
    let trimmed = Markup
        .remove_child(&doc, &NodeLocation::new("head", 1))
        .unwrap();
    assert_eq!(outline(&trimmed), "html(title section(p b) footer(b))");

    let err = Markup
        .remove_child(&doc, &NodeLocation::new("head", 5))
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Lookup);
    let err = Markup
        .remove_child(&doc, &NodeLocation::new("aside", 0))
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Lookup);
}
