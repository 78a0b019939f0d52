// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Dependency graph storage.
//!
//! An edge runs from a *source* to a *sink* and means "the sink depends on
//! the source". Vertices are stored in insertion order and addressed by
//! [`VertexId`]; edges are addressed by [`EdgeId`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::Index;

use tracing::{trace, warn};

use crate::iter::TopologicalIter;
use crate::options::OrderingOptions;
use crate::vertex::Vertex;

/// Position of a vertex in its graph, in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(usize);

impl VertexId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(usize);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Fired with `(source, sink)` when the edge's source is closed.
pub type EdgeAction<V> = Box<dyn FnMut(&V, &mut V)>;

/// A dependency edge.
pub struct Edge<V> {
    source: VertexId,
    sink: VertexId,
    action: Option<EdgeAction<V>>,
}

impl<V> Edge<V> {
    /// The vertex depended upon.
    pub fn source(&self) -> VertexId {
        self.source
    }

    /// The dependent vertex.
    pub fn sink(&self) -> VertexId {
        self.sink
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }
}

impl<V> fmt::Debug for Edge<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edge")
            .field("source", &self.source)
            .field("sink", &self.sink)
            .field("has_action", &self.has_action())
            .finish()
    }
}

struct Slot<V> {
    vertex: V,
    /// Edges where this vertex is the sink, keyed by source.
    incoming: BTreeMap<VertexId, EdgeId>,
    /// Edges where this vertex is the source, keyed by sink.
    outgoing: BTreeMap<VertexId, EdgeId>,
}

impl<V> Slot<V> {
    fn new(vertex: V) -> Self {
        Self {
            vertex,
            incoming: BTreeMap::new(),
            outgoing: BTreeMap::new(),
        }
    }
}

/// A directed dependency graph over caller-defined vertices.
pub struct DependencyGraph<V: Vertex> {
    slots: Vec<Slot<V>>,
    index: HashMap<V::Key, VertexId>,
    edges: Vec<Option<Edge<V>>>,
    edge_count: usize,
}

impl<V: Vertex> Default for DependencyGraph<V> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
            edge_count: 0,
        }
    }
}

impl<V: Vertex> DependencyGraph<V> {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Vertices
    // ------------------------------------------------------------------------

    /// Insert `vertex`, or return the id of the vertex with the same key.
    pub fn add_node(&mut self, vertex: V) -> VertexId {
        let key = vertex.key();
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = VertexId(self.slots.len());
        self.slots.push(Slot::new(vertex));
        self.index.insert(key, id);
        trace!(vertex = id.0, "vertex added");
        id
    }

    pub fn get_node(&self, key: &V::Key) -> Option<&V> {
        self.id_of(key).map(|id| &self.slots[id.0].vertex)
    }

    pub fn id_of(&self, key: &V::Key) -> Option<VertexId> {
        self.index.get(key).copied()
    }

    /// # Panics
    ///
    /// If `id` does not belong to this graph.
    pub fn vertex(&self, id: VertexId) -> &V {
        &self.slot(id).vertex
    }

    /// Mutable access to a vertex. The vertex's key must not change.
    ///
    /// # Panics
    ///
    /// If `id` does not belong to this graph.
    pub fn vertex_mut(&mut self, id: VertexId) -> &mut V {
        &mut self.slot_mut(id).vertex
    }

    /// Vertex ids in insertion order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> {
        (0..self.slots.len()).map(VertexId)
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &V)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| (VertexId(index), &slot.vertex))
    }

    /// Number of vertices.
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    // ------------------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------------------

    /// Record that `sink` depends on `source`, adding either vertex if new.
    ///
    /// Returns `None` when both are the same vertex.
    pub fn add_dependency(&mut self, sink: V, source: V) -> Option<EdgeId> {
        let sink = self.add_node(sink);
        let source = self.add_node(source);
        self.depends_on(sink, source, None)
    }

    /// Like [`add_dependency`](Self::add_dependency), with an action fired
    /// when `source` is closed.
    pub fn add_dependency_with<F>(&mut self, sink: V, source: V, action: F) -> Option<EdgeId>
    where
        F: FnMut(&V, &mut V) + 'static,
    {
        let sink = self.add_node(sink);
        let source = self.add_node(source);
        self.depends_on(sink, source, Some(Box::new(action)))
    }

    /// Record that `sink` depends on `source`.
    ///
    /// Adding an existing edge returns its id; a new `action` replaces the
    /// old one. Self-loops are rejected and logged.
    ///
    /// # Panics
    ///
    /// If either id does not belong to this graph.
    pub fn depends_on(
        &mut self,
        sink: VertexId,
        source: VertexId,
        action: Option<EdgeAction<V>>,
    ) -> Option<EdgeId> {
        assert!(
            sink.0 < self.slots.len() && source.0 < self.slots.len(),
            "vertex does not belong to this graph"
        );
        if sink == source {
            warn!(vertex = sink.0, "self-loop rejected");
            return None;
        }
        if let Some(&edge_id) = self.slot(sink).incoming.get(&source) {
            if let Some(edge) = self.edges[edge_id.0].as_mut() {
                if action.is_some() {
                    edge.action = action;
                }
            }
            return Some(edge_id);
        }

        let edge_id = EdgeId(self.edges.len());
        self.edges.push(Some(Edge {
            source,
            sink,
            action,
        }));
        self.slots[sink.0].incoming.insert(source, edge_id);
        self.slots[source.0].outgoing.insert(sink, edge_id);
        self.edge_count += 1;
        trace!(source = source.0, sink = sink.0, "dependency added");
        Some(edge_id)
    }

    /// Remove the edge from `source` to `sink`. Returns false if there was
    /// none.
    pub fn remove_dependency(&mut self, sink: VertexId, source: VertexId) -> bool {
        let Some(edge_id) = self.slot_mut(sink).incoming.remove(&source) else {
            return false;
        };
        self.slot_mut(source).outgoing.remove(&sink);
        self.edges[edge_id.0] = None;
        self.edge_count -= 1;
        true
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge<V>> {
        self.edges.get(id.0).and_then(Option::as_ref)
    }

    /// Vertices `id` depends on, in id order.
    pub fn dependency_set(&self, id: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.slot(id).incoming.keys().copied()
    }

    /// Vertices that depend on `id`, in id order.
    pub fn adjacency_set(&self, id: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.slot(id).outgoing.keys().copied()
    }

    pub fn indegree(&self, id: VertexId) -> usize {
        self.slot(id).incoming.len()
    }

    pub fn outdegree(&self, id: VertexId) -> usize {
        self.slot(id).outgoing.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    // ------------------------------------------------------------------------
    // Ordering
    // ------------------------------------------------------------------------

    /// Iterate closures of vertices whose dependencies are all closed.
    pub fn order_dependencies(&mut self) -> TopologicalIter<'_, V> {
        self.order_dependencies_with(OrderingOptions::default())
    }

    pub fn order_dependencies_with(&mut self, options: OrderingOptions) -> TopologicalIter<'_, V> {
        TopologicalIter::new(self, options)
    }

    /// Resolve `id` and fire its outgoing edge actions.
    pub(crate) fn resolve_vertex(&mut self, id: VertexId) {
        self.slot_mut(id).vertex.resolve();
        let Self { slots, edges, .. } = self;
        let targets: Vec<(VertexId, EdgeId)> = slots[id.0]
            .outgoing
            .iter()
            .map(|(sink, edge)| (*sink, *edge))
            .collect();
        for (sink, edge_id) in targets {
            let Some(action) = edges[edge_id.0]
                .as_mut()
                .and_then(|edge| edge.action.as_mut())
            else {
                continue;
            };
            let (source_slot, sink_slot) = source_and_sink(slots, id, sink);
            action(&source_slot.vertex, &mut sink_slot.vertex);
        }
    }

    fn slot(&self, id: VertexId) -> &Slot<V> {
        self.slots
            .get(id.0)
            .unwrap_or_else(|| panic!("vertex {} does not belong to this graph", id))
    }

    fn slot_mut(&mut self, id: VertexId) -> &mut Slot<V> {
        self.slots
            .get_mut(id.0)
            .unwrap_or_else(|| panic!("vertex {} does not belong to this graph", id))
    }
}

fn source_and_sink<V>(
    slots: &mut [Slot<V>],
    source: VertexId,
    sink: VertexId,
) -> (&Slot<V>, &mut Slot<V>) {
    if source.0 < sink.0 {
        let (head, tail) = slots.split_at_mut(sink.0);
        (&head[source.0], &mut tail[0])
    } else {
        let (head, tail) = slots.split_at_mut(source.0);
        (&tail[0], &mut head[sink.0])
    }
}

impl<V: Vertex> Index<VertexId> for DependencyGraph<V> {
    type Output = V;

    fn index(&self, id: VertexId) -> &V {
        self.vertex(id)
    }
}

impl<V: Vertex> fmt::Debug for DependencyGraph<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("size", &self.size())
            .field("edge_count", &self.edge_count)
            .finish()
    }
}
