//! Subgraph Matcher: enumerates occurrences ("instances") of a pattern
//! graph within a host graph.
//!
//! An Ullmann-style extension-queue algorithm: seed with vertices matching
//! the pattern's first vertex, then grow partial instances one pattern edge
//! at a time in breadth-first order from that seed, consulting the label
//! registry's mismatch function (and, above a nonzero threshold, the
//! Inexact Matcher) at every edge extension.

use std::collections::{HashSet, VecDeque};

use crate::graph::{EdgeId, GraphStore, VertexId};
use crate::inexact;
use crate::instance::{Instance, InstanceArena, InstanceHandle};
use crate::label::LabelRegistry;

/// One step of the breadth-first pattern-edge processing order: extend the
/// partial instance across `edge`, which runs between `from` (already
/// mapped) and `other` (newly mapped iff `introduces_new_vertex`).
#[derive(Debug, Clone, Copy)]
struct PatternStep {
    edge: EdgeId,
    from: VertexId,
    other: VertexId,
    introduces_new_vertex: bool,
}

/// Computes the BFS order in which a connected pattern graph's edges are
/// introduced, starting from vertex 0. Every edge of `pattern` appears
/// exactly once.
fn bfs_edge_order(pattern: &GraphStore) -> Vec<PatternStep> {
    let mut visited: HashSet<VertexId> = HashSet::new();
    let mut processed_edges: HashSet<EdgeId> = HashSet::new();
    let mut steps = Vec::new();

    let Some(root) = pattern.vertex_ids().next() else {
        return steps;
    };
    visited.insert(root);
    let mut queue = VecDeque::from([root]);

    while let Some(v) = queue.pop_front() {
        for edge in pattern.incident_edges(v) {
            if processed_edges.contains(&edge) {
                continue;
            }
            processed_edges.insert(edge);
            let other = pattern.other_endpoint(edge, v);
            let introduces_new_vertex = !visited.contains(&other);
            if introduces_new_vertex {
                visited.insert(other);
                queue.push_back(other);
            }
            steps.push(PatternStep {
                edge,
                from: v,
                other,
                introduces_new_vertex,
            });
        }
    }
    steps
}

/// A partial (or, once `bfs_edge_order` is exhausted, complete) instance
/// plus the pattern-vertex -> host-vertex mapping built up so far.
#[derive(Clone)]
struct Partial {
    vertices: Vec<VertexId>,
    edges: Vec<EdgeId>,
    mapping: Vec<Option<VertexId>>,
}

impl Partial {
    fn host_of(&self, pattern_vertex: VertexId) -> VertexId {
        self.mapping[pattern_vertex.0 as usize].expect("pattern vertex not yet mapped")
    }

    fn contains_host_vertex(&self, v: VertexId) -> bool {
        self.vertices.contains(&v)
    }

    fn contains_host_edge(&self, e: EdgeId) -> bool {
        self.edges.contains(&e)
    }
}

fn edge_compatible(
    pattern: &GraphStore,
    pattern_edge: EdgeId,
    pattern_from: VertexId,
    host: &GraphStore,
    host_edge: EdgeId,
    host_from: VertexId,
    registry: &LabelRegistry,
    threshold: f64,
) -> bool {
    let pe = pattern.edge(pattern_edge);
    let he = host.edge(host_edge);

    if pe.directed != he.directed {
        return false;
    }
    if registry.mismatch(pe.label, he.label) > threshold {
        return false;
    }
    if pe.directed {
        let pattern_from_is_source = pe.source == pattern_from;
        let host_from_is_source = he.source == host_from;
        if pattern_from_is_source != host_from_is_source {
            return false;
        }
    }
    true
}

/// Parameters controlling a single Subgraph Matcher invocation.
#[derive(Debug, Clone, Copy)]
pub struct MatchOptions {
    pub allow_overlap: bool,
    /// Inexact tolerance in `[0, 1]`; 0 means exact matching only.
    pub threshold: f64,
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatchOptions {
            allow_overlap: false,
            threshold: 0.0,
        }
    }
}

/// Finds all occurrences of `pattern` within `host`.
///
/// Instances are inserted into `arena` and returned as handles with a
/// refcount of 1 each; callers own that reference.
pub fn find_instances(
    pattern: &GraphStore,
    host: &GraphStore,
    registry: &LabelRegistry,
    options: MatchOptions,
    arena: &mut InstanceArena,
) -> Vec<InstanceHandle> {
    let Some(root) = pattern.vertex_ids().next() else {
        return Vec::new();
    };
    let root_label = pattern.vertex(root).label;

    // Step 1: seed with vertices whose label matches pattern vertex 0.
    let mut partials: Vec<Partial> = host
        .vertex_ids()
        .filter(|&v| registry.mismatch(root_label, host.vertex(v).label) <= options.threshold)
        .map(|v| {
            let mut mapping = vec![None; pattern.vertex_count()];
            mapping[root.0 as usize] = Some(v);
            Partial {
                vertices: vec![v],
                edges: vec![],
                mapping,
            }
        })
        .collect();

    // Step 2/3: grow one pattern edge at a time, breadth-first from root.
    for step in bfs_edge_order(pattern) {
        let mut next = Vec::new();
        for partial in &partials {
            let host_from = partial.host_of(step.from);
            if step.introduces_new_vertex {
                for host_edge in host.incident_edges(host_from) {
                    if partial.contains_host_edge(host_edge) {
                        continue;
                    }
                    let host_other = host.other_endpoint(host_edge, host_from);
                    if partial.contains_host_vertex(host_other) {
                        continue;
                    }
                    if !edge_compatible(
                        pattern, step.edge, step.from, host, host_edge, host_from, registry,
                        options.threshold,
                    ) {
                        continue;
                    }
                    if registry.mismatch(pattern.vertex(step.other).label, host.vertex(host_other).label)
                        > options.threshold
                    {
                        continue;
                    }
                    let mut p2 = partial.clone();
                    p2.vertices.push(host_other);
                    p2.edges.push(host_edge);
                    p2.mapping[step.other.0 as usize] = Some(host_other);
                    next.push(p2);
                }
            } else {
                let host_other = partial.host_of(step.other);
                for host_edge in host.incident_edges(host_from) {
                    if partial.contains_host_edge(host_edge) {
                        continue;
                    }
                    if host.other_endpoint(host_edge, host_from) != host_other {
                        continue;
                    }
                    if !edge_compatible(
                        pattern, step.edge, step.from, host, host_edge, host_from, registry,
                        options.threshold,
                    ) {
                        continue;
                    }
                    let mut p2 = partial.clone();
                    p2.edges.push(host_edge);
                    next.push(p2);
                }
            }
        }
        partials = next;
    }

    // Step 4: filter instances against the pattern using the Inexact
    // Matcher, at cost <= threshold * max(|P|, |instance|).
    let mut candidates: Vec<Instance> = Vec::new();
    for partial in partials {
        let induced = induced_subgraph(host, &partial.vertices, &partial.edges);
        let bound = options.threshold * pattern.vertex_count().max(induced.vertex_count()) as f64;
        let outcome = inexact::match_graphs(pattern, &induced, registry, bound);
        if let Some(mapping) = outcome.mapping {
            let mapping_by_instance_pos: Vec<usize> = (0..partial.vertices.len())
                .map(|local| {
                    mapping.node_mapping[local].expect("filtered instance must be fully mapped")
                })
                .collect();
            let mut instance = Instance::new(partial.vertices, partial.edges);
            instance.mapping = Some(mapping_by_instance_pos);
            instance.min_cost = outcome.cost;
            candidates.push(instance);
        }
    }

    // Step 5: greedy non-overlap selection, in insertion order, when
    // overlap is disallowed.
    let mut accepted_vertices: HashSet<VertexId> = HashSet::new();
    let mut handles = Vec::new();
    for instance in candidates {
        if !options.allow_overlap
            && instance.vertices.iter().any(|v| accepted_vertices.contains(v))
        {
            continue;
        }
        accepted_vertices.extend(instance.vertices.iter().copied());
        let mut out = Vec::new();
        arena.push_deduped(&mut out, instance);
        handles.extend(out);
    }
    handles
}

/// Builds the induced subgraph of `host` restricted to `vertices`/`edges`,
/// used both to validate candidate instances and by the Evaluator/
/// Compressor.
pub fn induced_subgraph(host: &GraphStore, vertices: &[VertexId], edges: &[EdgeId]) -> GraphStore {
    let mut local = std::collections::HashMap::new();
    let mut out = GraphStore::with_capacity(vertices.len(), edges.len());
    for &v in vertices {
        let id = out.add_vertex(host.vertex(v).label);
        local.insert(v, id);
    }
    for &e in edges {
        let data = host.edge(e);
        let (s, t) = (local[&data.source], local[&data.target]);
        out.add_edge(s, t, data.label, data.directed, data.spans_increment);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::Label;

    fn triangle() -> (GraphStore, LabelRegistry) {
        let mut reg = LabelRegistry::new();
        let x = reg.intern(Label::str("X"));
        let t = reg.intern(Label::str("t"));
        let mut g = GraphStore::new();
        let a = g.add_vertex(x);
        let b = g.add_vertex(x);
        let c = g.add_vertex(x);
        g.add_edge(a, b, t, false, false);
        g.add_edge(b, c, t, false, false);
        g.add_edge(a, c, t, false, false);
        (g, reg)
    }

    #[test]
    fn self_match_is_unique_without_overlap() {
        let (g, reg) = triangle();
        let mut arena = InstanceArena::new();
        let handles = find_instances(&g, &g, &reg, MatchOptions::default(), &mut arena);
        assert_eq!(handles.len(), 1);
        assert_eq!(arena.get(handles[0]).vertices.len(), 3);
        assert_eq!(arena.get(handles[0]).edges.len(), 3);
    }
}
