//! Inexact Matcher: best-first search over partial vertex-to-vertex
//! mappings, computing the minimum-cost transformation between two
//! labeled graphs.
//!
//! The search node ordering mirrors the `MinScored`-style wrapper idiom
//! used for `BinaryHeap`-backed best-first search elsewhere in the graph
//! ecosystem: increasing cost first, ties broken by preferring the deeper
//! (more complete) mapping so a plausible best-found answer is available
//! early and pruning kicks in sooner.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use crate::graph::{GraphStore, VertexId};
use crate::label::LabelRegistry;

/// Transformation costs for the Inexact Matcher; all default to `1.0`.
#[derive(Debug, Clone, Copy)]
pub struct MatchCosts {
    pub insert_vertex: f64,
    pub delete_vertex: f64,
    pub substitute_vertex_label: f64,
    pub insert_edge: f64,
    pub insert_edge_with_vertex: f64,
    pub delete_edge: f64,
    pub delete_edge_with_vertex: f64,
    pub substitute_edge_label: f64,
    pub substitute_edge_directedness: f64,
    pub reverse_directed_edge: f64,
}

impl Default for MatchCosts {
    fn default() -> Self {
        MatchCosts {
            insert_vertex: 1.0,
            delete_vertex: 1.0,
            substitute_vertex_label: 1.0,
            insert_edge: 1.0,
            insert_edge_with_vertex: 1.0,
            delete_edge: 1.0,
            delete_edge_with_vertex: 1.0,
            substitute_edge_label: 1.0,
            substitute_edge_directedness: 1.0,
            reverse_directed_edge: 1.0,
        }
    }
}

/// After how many expanded nodes (as a multiple of `|G1|^K`) the search
/// compresses its frontier and degrades to greedy. `K = 0` means
/// exhaustive/unbounded.
const DEFAULT_NODE_BUDGET_EXPONENT: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Target {
    Deleted,
    To(usize),
}

#[derive(Clone)]
struct SearchNode {
    cost: f64,
    depth: usize,
    /// Indexed by position in `order` (i.e., by G1 local vertex id after
    /// reordering); `None` means not yet decided.
    mapping: Vec<Option<Target>>,
    used_g2_vertices: HashSet<usize>,
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.depth == other.depth
    }
}
impl Eq for SearchNode {}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; we want the lowest cost (ties: deepest)
        // to compare as the greatest element so it pops first.
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.depth.cmp(&other.depth))
    }
}
impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Result of an Inexact Matcher run.
pub struct MatchResult {
    pub cost: f64,
    pub mapping: Option<Mapping>,
}

pub struct Mapping {
    pub node_mapping: Vec<Option<usize>>,
}

fn local_ids(g: &GraphStore) -> Vec<VertexId> {
    g.vertex_ids().collect()
}

fn degree_order(g: &GraphStore, ids: &[VertexId]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..ids.len()).collect();
    // Insertion sort by descending degree: stable, simple, fine for the
    // small patterns this engine handles.
    for i in 1..order.len() {
        let mut j = i;
        while j > 0
            && g.vertex(ids[order[j - 1]]).incident.len() < g.vertex(ids[order[j]]).incident.len()
        {
            order.swap(j - 1, j);
            j -= 1;
        }
    }
    order
}

fn edge_substitution_cost(
    g1: &GraphStore,
    e1: crate::graph::EdgeId,
    g2: &GraphStore,
    e2: crate::graph::EdgeId,
    registry: &LabelRegistry,
    costs: &MatchCosts,
) -> f64 {
    let a = g1.edge(e1);
    let b = g2.edge(e2);
    let mut cost = registry.mismatch(a.label, b.label) * costs.substitute_edge_label;
    if a.directed != b.directed {
        cost += costs.substitute_edge_directedness;
    }
    cost
}

/// Cost of reversing a directed edge `e2` relative to `e1`'s orientation,
/// when both ends are otherwise identically mapped. Exposed separately so
/// callers modeling a known vertex correspondence (the Subgraph Matcher's
/// edge-compatibility predicate) can add it on top of
/// [`edge_substitution_cost`] when direction is swapped but label and
/// endpoints otherwise line up.
pub fn reversal_cost(a_directed: bool, a_forward: bool, b_forward: bool, costs: &MatchCosts) -> f64 {
    if a_directed && a_forward != b_forward {
        costs.reverse_directed_edge
    } else {
        0.0
    }
}

/// Finds the minimum-cost transformation of `g1` into `g2`, returning that
/// cost and, if it is within `threshold`, the resulting node mapping.
///
/// Size-based swap, descending-degree ordering, best-first search with a
/// node budget that degrades to greedy.
pub fn match_graphs(
    g1: &GraphStore,
    g2: &GraphStore,
    registry: &LabelRegistry,
    threshold: f64,
) -> MatchResult {
    match_graphs_with_costs(g1, g2, registry, threshold, &MatchCosts::default(), DEFAULT_NODE_BUDGET_EXPONENT)
}

pub fn match_graphs_with_costs(
    g1_in: &GraphStore,
    g2_in: &GraphStore,
    registry: &LabelRegistry,
    threshold: f64,
    costs: &MatchCosts,
    k: u32,
) -> MatchResult {
    // Step 1: swap so g1 is the larger graph by vertex count.
    let swapped = g1_in.vertex_count() < g2_in.vertex_count();
    let (g1, g2) = if swapped { (g2_in, g1_in) } else { (g1_in, g2_in) };

    let ids1 = local_ids(g1);
    let ids2 = local_ids(g2);
    let n1 = ids1.len();
    let n2 = ids2.len();

    if n1 == 0 {
        let cost = (n2 as f64) * costs.insert_vertex;
        let result = if cost <= threshold {
            Some(Mapping {
                node_mapping: vec![None; n2],
            })
        } else {
            None
        };
        return finish(swapped, cost, result);
    }

    // Step 2: order g1's vertices by descending degree.
    let order = degree_order(g1, &ids1);

    let node_budget = if k == 0 {
        usize::MAX
    } else {
        (n1 as u64).saturating_pow(k).min(usize::MAX as u64) as usize
    };

    let mut heap = BinaryHeap::new();
    heap.push(SearchNode {
        cost: 0.0,
        depth: 0,
        mapping: vec![None; n1],
        used_g2_vertices: HashSet::new(),
    });

    let mut best: Option<(f64, Vec<Option<Target>>)> = None;
    let mut expanded = 0usize;
    let mut greedy = false;

    while let Some(node) = heap.pop() {
        if let Some((best_cost, _)) = &best {
            if node.cost > *best_cost {
                continue;
            }
        }
        if node.cost > threshold {
            continue;
        }

        if node.depth == n1 {
            let total = node.cost + inserted_vertices_cost(g1, g2, &ids1, &ids2, &order, &node.mapping, registry, costs);
            if total <= threshold && best.as_ref().map(|(b, _)| total < *b).unwrap_or(true) {
                best = Some((total, node.mapping.clone()));
                if greedy {
                    break;
                }
            }
            continue;
        }

        expanded += 1;
        if expanded > node_budget {
            greedy = true;
        }

        let v1_local = order[node.depth];
        let mut children = expand(
            g1, g2, &ids1, &ids2, &order, &node, v1_local, registry, costs,
        );
        children.retain(|c| c.cost <= threshold);

        if greedy {
            // Accept the first completion reachable; push only the single
            // best child to behave as a greedy descent from here on.
            if let Some(c) = children
                .into_iter()
                .min_by(|a, b| a.cost.partial_cmp(&b.cost).unwrap_or(Ordering::Equal))
            {
                heap.push(c);
            }
        } else {
            for c in children {
                heap.push(c);
            }
        }
    }

    match best {
        Some((cost, mapping)) => {
            let node_mapping = build_node_mapping(n2, &mapping);
            finish(
                swapped,
                cost,
                Some(Mapping { node_mapping }),
            )
        }
        None => finish(swapped, f64::INFINITY, None),
    }
}

fn finish(swapped: bool, cost: f64, mapping: Option<Mapping>) -> MatchResult {
    if !swapped {
        return MatchResult { cost, mapping };
    }
    // internal g1/g2 were swapped relative to the caller's g1/g2: invert so
    // the mapping is always indexed by the caller's own g2.
    let mapping = mapping.map(|m| invert_after_swap(&m.node_mapping));
    MatchResult { cost, mapping }
}

fn invert_after_swap(internal_mapping_g2_to_g1: &[Option<usize>]) -> Mapping {
    // internal_mapping_g2_to_g1[g2_local] = Some(g1_local) | None (g2 vertex inserted)
    // We need: for each g1_local (now the caller's g2 since we swapped),
    // the caller's g1 local id (internal g2 local id) it maps to.
    let g1_len = internal_mapping_g2_to_g1
        .iter()
        .filter_map(|x| *x)
        .max()
        .map(|m| m + 1)
        .unwrap_or(0);
    let mut result = vec![None; g1_len.max(0)];
    for (g2_local, g1_local) in internal_mapping_g2_to_g1.iter().enumerate() {
        if let Some(g1_local) = g1_local {
            if *g1_local >= result.len() {
                result.resize(g1_local + 1, None);
            }
            result[*g1_local] = Some(g2_local);
        }
    }
    Mapping { node_mapping: result }
}

fn build_node_mapping(n2: usize, mapping: &[Option<Target>]) -> Vec<Option<usize>> {
    let mut out = vec![None; n2];
    for (g1_local, target) in mapping.iter().enumerate() {
        if let Some(Target::To(g2_local)) = target {
            out[*g2_local] = Some(g1_local);
        }
    }
    out
}

#[allow(clippy::too_many_arguments)]
fn expand(
    g1: &GraphStore,
    g2: &GraphStore,
    ids1: &[VertexId],
    ids2: &[VertexId],
    order: &[usize],
    node: &SearchNode,
    v1_local: usize,
    registry: &LabelRegistry,
    costs: &MatchCosts,
) -> Vec<SearchNode> {
    let v1 = ids1[v1_local];
    let mut out = Vec::new();

    // (a) delete v1.
    {
        let mut mapping = node.mapping.clone();
        mapping[v1_local] = Some(Target::Deleted);
        let mut cost = node.cost + costs.delete_vertex;
        for edge in g1.incident_edges(v1) {
            let other = g1.other_endpoint(edge, v1);
            let other_local = ids1.iter().position(|&x| x == other).unwrap();
            let self_loop = other_local == v1_local;
            let other_already_mapped =
                self_loop || order[..node.depth].contains(&other_local);
            if other_already_mapped {
                cost += costs.delete_edge_with_vertex;
            }
        }
        out.push(SearchNode {
            cost,
            depth: node.depth + 1,
            mapping,
            used_g2_vertices: node.used_g2_vertices.clone(),
        });
    }

    // (b) map v1 to each unmapped g2 vertex.
    for (v2_local, &v2) in ids2.iter().enumerate() {
        if node.used_g2_vertices.contains(&v2_local) {
            continue;
        }
        let mut mapping = node.mapping.clone();
        mapping[v1_local] = Some(Target::To(v2_local));
        let mut used = node.used_g2_vertices.clone();
        used.insert(v2_local);

        let mut cost = node.cost
            + registry.mismatch(g1.vertex(v1).label, g2.vertex(v2).label) * costs.substitute_vertex_label;

        let mut used_g2_edges: HashSet<crate::graph::EdgeId> = HashSet::new();

        // Deleted-edges cost: pair v1's edges to already-mapped neighbors.
        for e1 in g1.incident_edges(v1) {
            let u1 = g1.other_endpoint(e1, v1);
            let u1_local = ids1.iter().position(|&x| x == u1).unwrap();
            let Some(target) = mapping.get(u1_local).copied().flatten() else {
                continue;
            };
            if u1_local == v1_local {
                continue;
            }
            // Only consider neighbors that were decided at an earlier depth.
            if order.iter().position(|&x| x == u1_local).unwrap() >= node.depth {
                continue;
            }
            match target {
                Target::Deleted => cost += costs.delete_edge,
                Target::To(u2_local) => {
                    let u2 = ids2[u2_local];
                    let best = g2
                        .incident_edges(v2)
                        .filter(|e2| !used_g2_edges.contains(e2))
                        .filter(|&e2| g2.other_endpoint(e2, v2) == u2)
                        .map(|e2| (e2, edge_substitution_cost(g1, e1, g2, e2, registry, costs)))
                        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
                    match best {
                        Some((e2, sub_cost)) => {
                            used_g2_edges.insert(e2);
                            cost += sub_cost;
                        }
                        None => cost += costs.delete_edge,
                    }
                }
            }
        }

        // Inserted-edges cost: unused g2 edges of v2 to an already-mapped
        // g2 vertex.
        for e2 in g2.incident_edges(v2) {
            if used_g2_edges.contains(&e2) {
                continue;
            }
            let w2 = g2.other_endpoint(e2, v2);
            let w2_local = ids2.iter().position(|&x| x == w2).unwrap();
            if node.used_g2_vertices.contains(&w2_local) || w2_local == v2_local {
                cost += costs.insert_edge;
            }
        }

        out.push(SearchNode {
            cost,
            depth: node.depth + 1,
            mapping,
            used_g2_vertices: used,
        });
    }

    out
}

#[allow(clippy::too_many_arguments)]
fn inserted_vertices_cost(
    g1: &GraphStore,
    g2: &GraphStore,
    ids1: &[VertexId],
    ids2: &[VertexId],
    _order: &[usize],
    mapping: &[Option<Target>],
    _registry: &LabelRegistry,
    costs: &MatchCosts,
) -> f64 {
    let _ = g1;
    let mapped_g2: HashSet<usize> = mapping
        .iter()
        .filter_map(|t| match t {
            Some(Target::To(g2_local)) => Some(*g2_local),
            _ => None,
        })
        .collect();
    let mut cost = 0.0;
    for (v2_local, &v2) in ids2.iter().enumerate() {
        if mapped_g2.contains(&v2_local) {
            continue;
        }
        cost += costs.insert_vertex;
        for e2 in g2.incident_edges(v2) {
            let w2 = g2.other_endpoint(e2, v2);
            let w2_local = ids2.iter().position(|&x| x == w2).unwrap();
            if mapped_g2.contains(&w2_local) || w2_local == v2_local {
                cost += costs.insert_edge_with_vertex;
            }
        }
    }
    cost
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::Label;

    fn triangle(label_t2: bool) -> (GraphStore, LabelRegistry) {
        let mut reg = LabelRegistry::new();
        let x = reg.intern(Label::str("X"));
        let t = reg.intern(Label::str("t"));
        let t2 = reg.intern(Label::str("t2"));
        let mut g = GraphStore::new();
        let a = g.add_vertex(x);
        let b = g.add_vertex(x);
        let c = g.add_vertex(x);
        g.add_edge(a, b, t, false, false);
        g.add_edge(b, c, t, false, false);
        g.add_edge(a, c, if label_t2 { t2 } else { t }, false, false);
        (g, reg)
    }

    #[test]
    fn identity_is_zero_cost() {
        let (g, reg) = triangle(false);
        let result = match_graphs(&g, &g, &reg, f64::INFINITY);
        assert!((result.cost - 0.0).abs() < 1e-9);
    }

    #[test]
    fn differing_edge_label_costs_one() {
        let (g1, reg) = triangle(false);
        let (g2, _) = triangle(true);
        let result = match_graphs(&g1, &g2, &reg, f64::INFINITY);
        assert!((result.cost - 1.0).abs() < 1e-9);
    }

    #[test]
    fn threshold_gate() {
        let (g1, reg) = triangle(false);
        let (g2, _) = triangle(true);
        let low = match_graphs(&g1, &g2, &reg, 0.5);
        assert!(low.mapping.is_none());
        let high = match_graphs(&g1, &g2, &reg, 3.0);
        assert!(high.mapping.is_some());
    }
}
