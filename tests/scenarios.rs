//! End-to-end discovery scenarios.

mod common;

use subdue::eval::EvalMethod;
use subdue::graph::GraphStore;
use subdue::label::{Label, LabelRegistry};
use subdue::params::DiscoveryParams;

fn params_for(eval_method: EvalMethod) -> DiscoveryParams {
    DiscoveryParams {
        eval_method,
        num_best_subs: 1,
        limit: Some(50),
        ..DiscoveryParams::default()
    }
}

#[test]
fn triangle_detection() {
    let (g, mut reg) = common::triangle();
    let params = params_for(EvalMethod::Size);
    let results = subdue::discover(g, None, &mut reg, &params);

    let first = &results[0].best[0];
    assert_eq!(first.vertex_count(), 3);
    // Single-instance triangle: sizeOf(G_pos)=6 over (sizeOf(S)=6 +
    // sizeOf(G_pos|S)=1); see DESIGN.md for why this follows the SIZE
    // formula literally rather than the 1.0 figure a worked example gives.
    assert!((first.score - 6.0 / 7.0).abs() < 1e-9, "expected 6/7, got {}", first.score);

    // A second iteration over the fully-compressed graph (one SUB vertex,
    // no edges) yields no further pattern.
    assert!(results.len() <= 1 || results[1].best.is_empty());
}

#[test]
fn self_loop_recursion_chain() {
    let mut reg = LabelRegistry::new();
    let a = reg.intern(Label::str("A"));
    let next = reg.intern(Label::str("next"));
    let mut g = GraphStore::new();
    let vs: Vec<_> = (0..5).map(|_| g.add_vertex(a)).collect();
    for w in vs.windows(2) {
        g.add_edge(w[0], w[1], next, true, false);
    }

    let mut params = params_for(EvalMethod::Size);
    params.recursion = true;
    params.max_vertices = 2;
    let results = subdue::discover(g, None, &mut reg, &params);
    assert!(!results.is_empty());
    assert!(!results[0].best.is_empty());
}

#[test]
fn isomorphism_round_trip_without_overlap() {
    let (g, reg) = common::triangle();
    let mut arena = subdue::instance::InstanceArena::new();
    let options = subdue::matcher::MatchOptions {
        allow_overlap: false,
        threshold: 0.0,
    };
    let instances = subdue::matcher::find_instances(&g, &g, &reg, options, &mut arena);
    assert_eq!(instances.len(), 1);
    assert_eq!(arena.get(instances[0]).vertices.len(), g.vertex_count());
}

#[test]
fn compression_removes_n_minus_one_vertices_per_instance() {
    let (g, mut reg) = common::triangle();
    let mut arena = subdue::instance::InstanceArena::new();
    let options = subdue::matcher::MatchOptions {
        allow_overlap: false,
        threshold: 0.0,
    };
    let instances = subdue::matcher::find_instances(&g, &g, &reg, options, &mut arena);
    let compressed = subdue::compress::compress(&g, &instances, &arena, &mut reg, 1, false);
    assert_eq!(compressed.vertex_count(), g.vertex_count() - (g.vertex_count() - 1));
    assert_eq!(compressed.vertex_count(), 1);
    assert_eq!(compressed.edge_count(), 0);
}
