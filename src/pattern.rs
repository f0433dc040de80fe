//! Substructure (Pattern).
//!
//! A pattern graph plus its instance lists, scored by the Evaluator, and
//! ranked/deduplicated by the Beam Discovery Engine.

use crate::graph::GraphStore;
use crate::instance::InstanceHandle;
use crate::label::LabelId;

/// A candidate repeating subgraph pattern together with where it occurs.
#[derive(Debug, Clone)]
pub struct Substructure {
    /// The pattern graph itself.
    pub definition: GraphStore,
    /// Instances found in the positive graph.
    pub positive_instances: Vec<InstanceHandle>,
    /// Instances found in the negative graph, when running supervised
    /// (set-cover) discovery.
    pub negative_instances: Vec<InstanceHandle>,
    /// Score assigned by the Evaluator; `f64::NEG_INFINITY` until scored.
    pub score: f64,
    /// Present when this pattern has been declared recursive: the edge
    /// label of the self-loop temporarily added before evaluation.
    pub recursive_edge_label: Option<LabelId>,
}

impl Substructure {
    pub fn new(definition: GraphStore) -> Self {
        Substructure {
            definition,
            positive_instances: Vec::new(),
            negative_instances: Vec::new(),
            score: f64::NEG_INFINITY,
            recursive_edge_label: None,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.definition.vertex_count()
    }

    pub fn instance_count(&self) -> usize {
        self.positive_instances.len() + self.negative_instances.len()
    }

    /// A deterministic, order-independent key used for lexicographic
    /// tie-breaking: the sorted sequence of (vertex label, incident edge
    /// label) pairs.
    pub fn lexicographic_key(&self) -> Vec<(u32, u32)> {
        let mut key: Vec<(u32, u32)> = self
            .definition
            .vertex_ids()
            .map(|v| {
                let vertex = self.definition.vertex(v);
                let edge_label = vertex
                    .incident
                    .first()
                    .map(|&e| self.definition.edge(e).label.0)
                    .unwrap_or(u32::MAX);
                (vertex.label.0, edge_label)
            })
            .collect();
        key.sort_unstable();
        key
    }
}

/// Ordering used by the beam and best-N lists: higher score first, then
/// fewer vertices, then lexicographic pattern order.
pub fn compare_substructures(a: &Substructure, b: &Substructure) -> std::cmp::Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(std::cmp::Ordering::Equal)
        .then_with(|| a.vertex_count().cmp(&b.vertex_count()))
        .then_with(|| a.lexicographic_key().cmp(&b.lexicographic_key()))
}
