//! Beam Discovery Engine: the outer search loop over candidate
//! substructures.

use std::collections::HashSet;

use tracing::debug;

use crate::eval::{self, DlCache, EvalContext};
use crate::graph::GraphStore;
use crate::inexact;
use crate::instance::InstanceArena;
use crate::label::{LabelId, LabelRegistry};
use crate::matcher::{self, MatchOptions};
use crate::params::DiscoveryParams;
use crate::pattern::{compare_substructures, Substructure};

/// Whether `pattern`'s instances chain end-to-start (one instance's second
/// vertex is another instance's first vertex), the condition under which
/// `-recursion` may flag it as a recursive substructure: the edge linking
/// consecutive instances is the same edge the pattern itself already uses.
fn chains(pattern: &Substructure, arena: &InstanceArena) -> Option<LabelId> {
    if pattern.vertex_count() != 2 {
        return None;
    }
    let edge_label = pattern.definition.edge(pattern.definition.edge_ids().next()?).label;
    let firsts: HashSet<_> = pattern
        .positive_instances
        .iter()
        .map(|&h| arena.get(h).vertices[0])
        .collect();
    let chains = pattern
        .positive_instances
        .iter()
        .any(|&h| firsts.contains(&arena.get(h).vertices[1]));
    chains.then_some(edge_label)
}

/// One discovery pass over `pos_graph` (and, for set-cover, `neg_graph`).
/// Returns the best-N substructures found, in ranked order.
pub fn discover(
    pos_graph: &GraphStore,
    neg_graph: Option<&GraphStore>,
    registry: &LabelRegistry,
    params: &DiscoveryParams,
    arena: &mut InstanceArena,
) -> Vec<Substructure> {
    let match_options = MatchOptions {
        allow_overlap: params.allow_overlap,
        threshold: params.threshold,
    };
    let dl_cache = DlCache::new();

    let mut score_one = |pattern: &mut Substructure, arena: &InstanceArena| {
        let ctx = EvalContext {
            registry,
            arena,
            dl_cache: &dl_cache,
            pos_graph,
            neg_graph,
            allow_overlap: params.allow_overlap,
            iteration: 1,
        };
        let base_score = eval::score(pattern, params.eval_method, &ctx);
        if !params.recursion {
            return base_score;
        }
        let Some(edge_label) = chains(pattern, arena) else {
            return base_score;
        };
        pattern.recursive_edge_label = Some(edge_label);
        let recursive_score = eval::score(pattern, params.eval_method, &ctx);
        if recursive_score > base_score {
            recursive_score
        } else {
            pattern.recursive_edge_label = None;
            pattern.score = base_score;
            base_score
        }
    };

    // Seed: one Substructure per unique vertex label.
    let mut beam: Vec<Substructure> = seed_patterns(pos_graph, registry)
        .into_iter()
        .map(|label| {
            let def = single_vertex_pattern(label);
            let mut pattern = Substructure::new(def);
            pattern.positive_instances =
                matcher::find_instances(&pattern.definition, pos_graph, registry, match_options, arena);
            if let Some(neg) = neg_graph {
                pattern.negative_instances =
                    matcher::find_instances(&pattern.definition, neg, registry, match_options, arena);
            }
            score_one(&mut pattern, arena);
            pattern
        })
        .filter(|p| p.vertex_count() >= params.min_vertices && p.vertex_count() <= params.max_vertices)
        .collect();
    beam.sort_by(compare_substructures);
    truncate_beam(&mut beam, params);

    let mut best_n: Vec<Substructure> = Vec::new();
    merge_into_best_n(&mut best_n, beam.iter().cloned(), params.num_best_subs, registry, arena);

    let limit = params.resolved_limit(pos_graph.edge_count());
    let mut expansions = 0usize;

    while !beam.is_empty() && expansions < limit {
        let parent = beam.remove(0);
        expansions += 1;

        let mut children = expand_one(&parent, pos_graph, neg_graph, registry, match_options, arena);
        for child in &mut children {
            score_one(child, arena);
        }
        if params.prune {
            children.retain(|c| c.score >= parent.score);
        }
        children.retain(|c| c.vertex_count() >= params.min_vertices && c.vertex_count() <= params.max_vertices);

        debug!(parent_score = parent.score, n_children = children.len(), "expanded candidate");

        merge_into_best_n(&mut best_n, children.iter().cloned(), params.num_best_subs, registry, arena);

        for child in children {
            insert_dedup(&mut beam, child, registry, arena);
        }
        beam.sort_by(compare_substructures);
        truncate_beam(&mut beam, params);
    }

    best_n
}

fn single_vertex_pattern(label: crate::label::LabelId) -> GraphStore {
    let mut g = GraphStore::new();
    g.add_vertex(label);
    g
}

fn seed_patterns(host: &GraphStore, registry: &LabelRegistry) -> Vec<crate::label::LabelId> {
    let mut seen = std::collections::HashSet::new();
    let mut labels = Vec::new();
    for v in host.vertex_ids() {
        let label = host.vertex(v).label;
        if seen.insert(label) {
            labels.push(label);
        }
    }
    let _ = registry;
    labels
}

/// Keeps the top-W beam (count-based) or all candidates scoring at least as
/// well as the W-th best (value-based).
fn truncate_beam(beam: &mut Vec<Substructure>, params: &DiscoveryParams) {
    if beam.len() <= params.beam_width {
        return;
    }
    if params.value_based {
        let cutoff = beam[params.beam_width - 1].score;
        beam.retain(|p| p.score >= cutoff);
    } else {
        beam.truncate(params.beam_width);
    }
}

/// Produces every one-edge extension of `parent`'s instances, grouped by the
/// resulting pattern shape.
fn expand_one(
    parent: &Substructure,
    pos_graph: &GraphStore,
    neg_graph: Option<&GraphStore>,
    registry: &LabelRegistry,
    match_options: MatchOptions,
    arena: &mut InstanceArena,
) -> Vec<Substructure> {
    // Candidate extension patterns are generated from the positive
    // instances' possible one-edge growth, then re-matched against both
    // graphs from scratch, so every extended pattern's instance lists are
    // internally consistent with the matcher's contract.
    let mut seen_patterns: Vec<GraphStore> = Vec::new();
    let mut out = Vec::new();

    for &handle in &parent.positive_instances {
        let instance = arena.get(handle).clone();
        for &v in &instance.vertices {
            for edge in pos_graph.incident_edges(v) {
                if instance.edges.contains(&edge) {
                    continue;
                }
                let other = pos_graph.other_endpoint(edge, v);
                let mut vertices = instance.vertices.clone();
                if !vertices.contains(&other) {
                    vertices.push(other);
                }
                let mut edges = instance.edges.clone();
                edges.push(edge);

                let candidate_def = matcher::induced_subgraph(pos_graph, &vertices, &edges);
                if seen_patterns.iter().any(|existing| {
                    inexact::match_graphs(existing, &candidate_def, registry, 0.0)
                        .mapping
                        .is_some()
                }) {
                    continue;
                }
                seen_patterns.push(candidate_def.clone());

                let mut pattern = Substructure::new(candidate_def);
                pattern.positive_instances = matcher::find_instances(
                    &pattern.definition,
                    pos_graph,
                    registry,
                    match_options,
                    arena,
                );
                if let Some(neg) = neg_graph {
                    pattern.negative_instances = matcher::find_instances(
                        &pattern.definition,
                        neg,
                        registry,
                        match_options,
                        arena,
                    );
                }
                if !pattern.positive_instances.is_empty() {
                    out.push(pattern);
                }
            }
        }
    }
    out
}

/// Inserts `candidate` into `list`, merging instance lists into an existing
/// structurally-duplicate pattern (detected via the Inexact Matcher at
/// threshold 0) rather than adding a second copy.
fn insert_dedup(list: &mut Vec<Substructure>, candidate: Substructure, registry: &LabelRegistry, arena: &mut InstanceArena) {
    for existing in list.iter_mut() {
        if inexact::match_graphs(&existing.definition, &candidate.definition, registry, 0.0)
            .mapping
            .is_some()
        {
            merge_instances(existing, candidate, arena);
            return;
        }
    }
    list.push(candidate);
}

fn merge_instances(existing: &mut Substructure, incoming: Substructure, arena: &mut InstanceArena) {
    for handle in incoming.positive_instances {
        if !existing
            .positive_instances
            .iter()
            .any(|&h| arena.get(h).structurally_eq(arena.get(handle)))
        {
            arena.retain(handle);
            existing.positive_instances.push(handle);
        }
    }
    for handle in incoming.negative_instances {
        if !existing
            .negative_instances
            .iter()
            .any(|&h| arena.get(h).structurally_eq(arena.get(handle)))
        {
            arena.retain(handle);
            existing.negative_instances.push(handle);
        }
    }
    existing.score = existing.score.max(incoming.score);
}

fn merge_into_best_n(
    best_n: &mut Vec<Substructure>,
    candidates: impl Iterator<Item = Substructure>,
    cap: usize,
    registry: &LabelRegistry,
    arena: &mut InstanceArena,
) {
    for candidate in candidates {
        insert_dedup(best_n, candidate, registry, arena);
    }
    best_n.sort_by(compare_substructures);
    best_n.truncate(cap);
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
    fn triangle_discovery_finds_full_triangle() {
        let (g, reg) = triangle();
        let mut arena = InstanceArena::new();
        let mut params = DiscoveryParams {
            eval_method: crate::eval::EvalMethod::Size,
            num_best_subs: 1,
            ..DiscoveryParams::default()
        };
        params.limit = Some(10);
        let best = discover(&g, None, &reg, &params, &mut arena);
        assert!(!best.is_empty());
        let top = &best[0];
        assert_eq!(top.vertex_count(), 3);
        // See DESIGN.md: a single-instance SIZE score is 6/7 under the
        // size-evaluation formula, not 1.0.
        assert!((top.score - 6.0 / 7.0).abs() < 1e-9, "expected 6/7, got {}", top.score);
    }
}
