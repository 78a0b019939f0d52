// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Build ordering with a custom vertex type and edge actions.

use arbor_graph::{DependencyGraph, OrderingOptions, Vertex};

#[derive(Debug)]
struct Target {
    name: &'static str,
    /// Outputs handed over by finished dependencies.
    inputs: Vec<String>,
    built: bool,
}

impl Target {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            inputs: Vec::new(),
            built: false,
        }
    }
}

impl Vertex for Target {
    type Key = &'static str;

    fn key(&self) -> &'static str {
        self.name
    }

    fn resolve(&mut self) {
        self.built = true;
    }
}

fn hand_over(source: &Target, sink: &mut Target) {
    sink.inputs.push(format!("{}.o", source.name));
}

fn project() -> DependencyGraph<Target> {
    let mut graph = DependencyGraph::new();
    graph.add_dependency_with(Target::new("app"), Target::new("core"), hand_over);
    graph.add_dependency_with(Target::new("app"), Target::new("util"), hand_over);
    graph.add_dependency_with(Target::new("util"), Target::new("core"), hand_over);
    graph
}

#[test]
fn actions_deliver_outputs_to_dependents() {
    let mut graph = project();
    let order: Vec<Vec<&str>> = {
        let mut names = Vec::new();
        let mut iter = graph.order_dependencies();
        while iter.has_next() {
            let Some(closure) = iter.next() else { break };
            names.push(closure.iter().map(|id| iter.graph()[*id].name).collect());
        }
        names
    };
    assert_eq!(order, vec![vec!["core"], vec!["util"], vec!["app"]]);

    let app = graph.get_node(&"app").unwrap();
    assert_eq!(app.inputs, vec!["core.o", "util.o"]);
    assert!(graph.vertices().all(|(_, target)| target.built));
}

#[test]
fn actions_fire_on_manual_close() {
    let mut graph = project();
    let core = graph.id_of(&"core").unwrap();
    let util = graph.id_of(&"util").unwrap();
    {
        let options = OrderingOptions::default().with_auto_close(false);
        let mut iter = graph.order_dependencies_with(options);
        assert_eq!(iter.next(), Some(vec![core]));
        assert!(iter.graph()[util].inputs.is_empty());
        iter.close([core]);
        assert_eq!(iter.graph()[util].inputs, vec!["core.o"]);
    }
    assert!(graph[core].built);
    assert!(!graph[util].built);
}

#[test]
fn removed_dependency_no_longer_orders() {
    let mut graph = project();
    let app = graph.id_of(&"app").unwrap();
    let util = graph.id_of(&"util").unwrap();
    assert!(graph.remove_dependency(app, util));

    let first = graph.order_dependencies().next().unwrap();
    let core = graph.id_of(&"core").unwrap();
    assert_eq!(first, vec![core]);
    assert_eq!(graph.dependency_set(app).collect::<Vec<_>>(), vec![core]);
}
