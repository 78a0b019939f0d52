// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Online topological iteration.
//!
//! [`TopologicalIter`] yields *closures*: batches of vertices whose
//! dependencies are all closed. Each vertex moves from unclosed to eligible
//! (yielded, waiting for the caller) to closed. Closing a vertex calls
//! [`Vertex::resolve`] and fires the actions of its outgoing edges, which may
//! make its dependents eligible for the next closure.

use std::fmt;

use tracing::{debug, error, trace};

use crate::graph::{DependencyGraph, VertexId};
use crate::options::OrderingOptions;
use crate::vertex::Vertex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Unclosed,
    Eligible,
    Closed,
}

/// Iterator over closures of a [`DependencyGraph`].
///
/// Vertices inside a closure are in insertion order.
///
/// # Panics
///
/// `has_next` and `next` panic if the remaining vertices form a cycle.
pub struct TopologicalIter<'g, V: Vertex> {
    graph: &'g mut DependencyGraph<V>,
    options: OrderingOptions,
    states: Vec<State>,
    unclosed: usize,
    /// Yielded and not yet closed.
    yielded: Vec<VertexId>,
    /// Computed by `has_next`, not yet yielded.
    pending: Vec<VertexId>,
}

impl<'g, V: Vertex> TopologicalIter<'g, V> {
    pub(crate) fn new(graph: &'g mut DependencyGraph<V>, options: OrderingOptions) -> Self {
        let size = graph.size();
        debug!(vertices = size, edges = graph.edge_count(), "ordering dependencies");
        Self {
            graph,
            options,
            states: vec![State::Unclosed; size],
            unclosed: size,
            yielded: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn graph(&self) -> &DependencyGraph<V> {
        self.graph
    }

    pub fn options(&self) -> &OrderingOptions {
        &self.options
    }

    /// True if another closure is available.
    ///
    /// With `auto_close`, the rest of the previous closure is closed first.
    /// Without it, returns false while yielded vertices are waiting to be
    /// closed and nothing else is eligible.
    pub fn has_next(&mut self) -> bool {
        if self.options.auto_close && !self.yielded.is_empty() {
            let rest = std::mem::take(&mut self.yielded);
            trace!(count = rest.len(), "auto-closing previous closure");
            self.close(rest);
        }
        if self.pending.is_empty() {
            self.pending = self.next_closure();
        }
        !self.pending.is_empty()
    }

    /// Close `ids`: resolve each vertex and fire its outgoing edge actions.
    /// Already closed vertices are skipped.
    pub fn close<I: IntoIterator<Item = VertexId>>(&mut self, ids: I) {
        for id in ids {
            self.close_vertex(id);
        }
    }

    pub fn is_closed(&self, id: VertexId) -> bool {
        self.states.get(id.index()) == Some(&State::Closed)
    }

    pub fn unclosed_count(&self) -> usize {
        self.unclosed
    }

    fn close_vertex(&mut self, id: VertexId) {
        let Some(state) = self.states.get_mut(id.index()) else {
            panic!("vertex {} does not belong to this graph", id);
        };
        if *state == State::Closed {
            return;
        }
        *state = State::Closed;
        self.unclosed -= 1;
        self.yielded.retain(|other| *other != id);
        self.pending.retain(|other| *other != id);
        self.graph.resolve_vertex(id);
        trace!(vertex = id.index(), "vertex closed");
    }

    fn is_ready(&self, id: VertexId) -> bool {
        self.states[id.index()] == State::Unclosed
            && self
                .graph
                .dependency_set(id)
                .all(|dependency| self.states[dependency.index()] == State::Closed)
    }

    /// Eligible vertices that cannot resolve themselves. Self-resolving ones
    /// are closed on the spot, which may unlock more.
    fn next_closure(&mut self) -> Vec<VertexId> {
        loop {
            let (resolvable, closure): (Vec<VertexId>, Vec<VertexId>) = self
                .graph
                .vertex_ids()
                .filter(|id| self.is_ready(*id))
                .partition(|id| self.graph.vertex(*id).can_resolve());

            if resolvable.is_empty() {
                if closure.is_empty() {
                    self.assert_no_cycle();
                }
                for id in &closure {
                    self.states[id.index()] = State::Eligible;
                }
                return closure;
            }
            trace!(count = resolvable.len(), "closing self-resolving vertices");
            self.close(resolvable);
        }
    }

    fn assert_no_cycle(&self) {
        let waiting = self.states.iter().any(|state| *state == State::Eligible);
        if waiting || self.unclosed == 0 {
            return;
        }
        error!(unclosed = self.unclosed, "dependency cycle detected");
        panic!(
            "dependency cycle: {} vertices can never be closed",
            self.unclosed
        );
    }
}

impl<V: Vertex> Iterator for TopologicalIter<'_, V> {
    type Item = Vec<VertexId>;

    fn next(&mut self) -> Option<Vec<VertexId>> {
        if !self.has_next() {
            return None;
        }
        let closure = std::mem::take(&mut self.pending);
        self.yielded.extend(closure.iter().copied());
        debug!(size = closure.len(), "closure yielded");
        Some(closure)
    }
}

impl<V: Vertex> fmt::Debug for TopologicalIter<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopologicalIter")
            .field("options", &self.options)
            .field("unclosed", &self.unclosed)
            .field("yielded", &self.yielded)
            .field("pending", &self.pending)
            .finish()
    }
}
