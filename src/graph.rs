//! Graph Store: an in-memory labeled multigraph with per-vertex adjacency
//! indexed by edge id.
//!
//! Vertex and edge indices are stable for the lifetime of the graph: nothing
//! in this module ever removes or renumbers an element. The Compressor
//! (compress.rs) produces a brand new `GraphStore` rather than mutating one
//! in place, which keeps this invariant simple to maintain.

use serde::{Deserialize, Serialize};

use crate::label::LabelId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexData {
    pub label: LabelId,
    /// Edge ids incident to this vertex, append-only, self-loops listed once.
    pub incident: Vec<EdgeId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeData {
    pub label: LabelId,
    pub source: VertexId,
    pub target: VertexId,
    pub directed: bool,
    /// Set by callers building a streaming boundary; the core never reads
    /// this flag itself, it only carries it through for a downstream
    /// incremental-processing layer.
    pub spans_increment: bool,
}

/// Which example (the `XP`/`XN` markers) a vertex range belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExampleKind {
    Positive,
    Negative,
}

/// One example's vertex range, `[start, end)`, within the host graph.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExampleBoundary {
    pub kind: ExampleKind,
    pub start: VertexId,
    pub end: VertexId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphStore {
    vertices: Vec<VertexData>,
    edges: Vec<EdgeData>,
    /// Example boundaries in insertion order, used by the set-cover
    /// Evaluator and preserved (remapped) by the Compressor.
    pub examples: Vec<ExampleBoundary>,
}

impl GraphStore {
    pub fn new() -> Self {
        GraphStore::default()
    }

    /// Allocates an empty graph with capacity hints for vertices and edges.
    pub fn with_capacity(vertex_hint: usize, edge_hint: usize) -> Self {
        GraphStore {
            vertices: Vec::with_capacity(vertex_hint),
            edges: Vec::with_capacity(edge_hint),
            examples: Vec::new(),
        }
    }

    pub fn add_vertex(&mut self, label: LabelId) -> VertexId {
        let id = VertexId(self.vertices.len() as u32);
        self.vertices.push(VertexData {
            label,
            incident: Vec::new(),
        });
        id
    }

    /// Adds an edge between `source` and `target`, updating both endpoints'
    /// adjacency lists. A self-loop is recorded once in the shared
    /// incidence list, not twice.
    pub fn add_edge(
        &mut self,
        source: VertexId,
        target: VertexId,
        label: LabelId,
        directed: bool,
        spans_increment: bool,
    ) -> EdgeId {
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(EdgeData {
            label,
            source,
            target,
            directed,
            spans_increment,
        });
        self.vertices[source.0 as usize].incident.push(id);
        if source != target {
            self.vertices[target.0 as usize].incident.push(id);
        }
        id
    }

    pub fn vertex(&self, id: VertexId) -> &VertexData {
        &self.vertices[id.0 as usize]
    }

    pub fn edge(&self, id: EdgeId) -> &EdgeData {
        &self.edges[id.0 as usize]
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> {
        (0..self.vertices.len() as u32).map(VertexId)
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> {
        (0..self.edges.len() as u32).map(EdgeId)
    }

    pub fn incident_edges(&self, v: VertexId) -> impl Iterator<Item = EdgeId> + '_ {
        self.vertex(v).incident.iter().copied()
    }

    /// Returns the endpoint of `edge` that is not `from`. For a self-loop
    /// this returns `from` itself.
    pub fn other_endpoint(&self, edge: EdgeId, from: VertexId) -> VertexId {
        let e = self.edge(edge);
        if e.source == from {
            e.target
        } else {
            e.source
        }
    }

    pub fn is_self_loop(&self, edge: EdgeId) -> bool {
        let e = self.edge(edge);
        e.source == e.target
    }

    /// Maximum vertex degree (counting a self-loop once), used by the MDL
    /// formula's `B = max k_i` term.
    pub fn max_degree(&self) -> usize {
        self.vertices.iter().map(|v| v.incident.len()).max().unwrap_or(0)
    }

    /// Sum of all vertex degrees, the MDL formula's `K = sum k_i` term.
    pub fn degree_sum(&self) -> usize {
        self.vertices.iter().map(|v| v.incident.len()).sum()
    }

    /// Maximum number of (parallel) edges between any ordered pair of
    /// vertices, the MDL formula's `M` term.
    pub fn max_parallel_edges(&self) -> usize {
        use std::collections::HashMap;
        let mut counts: HashMap<(VertexId, VertexId), usize> = HashMap::new();
        for e in &self.edges {
            let key = if e.source.0 <= e.target.0 {
                (e.source, e.target)
            } else {
                (e.target, e.source)
            };
            *counts.entry(key).or_insert(0) += 1;
        }
        counts.values().copied().max().unwrap_or(0)
    }

    /// Deep copy preserving all indices.
    pub fn deep_copy(&self) -> GraphStore {
        self.clone()
    }

    pub fn is_empty_graph(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Which example (if any) a vertex index falls within.
    pub fn example_of(&self, v: VertexId) -> Option<&ExampleBoundary> {
        self.examples
            .iter()
            .find(|b| v.0 >= b.start.0 && v.0 < b.end.0)
    }

    /// Writes this graph as JSON, an alternative to the native `.g` grammar
    /// (format.rs) for tooling that prefers a structured interchange format.
    pub fn serialize_to_file(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self).map_err(std::io::Error::from)
    }

    pub fn deserialize_from_file(path: &str) -> std::io::Result<GraphStore> {
        let file = std::fs::File::open(path)?;
        serde_json::from_reader(file).map_err(std::io::Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::{Label, LabelRegistry};

    #[test]
    fn adjacency_is_bidirectional() {
        let mut reg = LabelRegistry::new();
        let x = reg.intern(Label::str("X"));
        let t = reg.intern(Label::str("t"));
        let mut g = GraphStore::new();
        let a = g.add_vertex(x);
        let b = g.add_vertex(x);
        let e = g.add_edge(a, b, t, false, false);
        assert!(g.vertex(a).incident.contains(&e));
        assert!(g.vertex(b).incident.contains(&e));
    }

    #[test]
    fn self_loop_listed_once() {
        let mut reg = LabelRegistry::new();
        let x = reg.intern(Label::str("X"));
        let t = reg.intern(Label::str("t"));
        let mut g = GraphStore::new();
        let a = g.add_vertex(x);
        let e = g.add_edge(a, a, t, true, false);
        assert_eq!(g.vertex(a).incident.iter().filter(|&&i| i == e).count(), 1);
    }
}
