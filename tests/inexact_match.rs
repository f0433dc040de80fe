//! Inexact Matcher properties: identity, symmetry, and the threshold
//! scenario (two triangles differing in one edge label).

mod common;

use subdue::inexact;
use subdue::label::{Label, LabelRegistry};

fn triangle_with_label(t2: bool) -> (subdue::graph::GraphStore, LabelRegistry) {
    let mut reg = LabelRegistry::new();
    let x = reg.intern(Label::str("X"));
    let t = reg.intern(Label::str("t"));
    let t2_label = reg.intern(Label::str("t2"));
    let mut g = subdue::graph::GraphStore::new();
    let a = g.add_vertex(x);
    let b = g.add_vertex(x);
    let c = g.add_vertex(x);
    g.add_edge(a, b, t, false, false);
    g.add_edge(b, c, t, false, false);
    g.add_edge(a, c, if t2 { t2_label } else { t }, false, false);
    (g, reg)
}

#[test]
fn identity_match_is_zero_cost() {
    let (g, reg) = common::triangle();
    let result = inexact::match_graphs(&g, &g, &reg, f64::INFINITY);
    assert!((result.cost - 0.0).abs() < 1e-9);
}

#[test]
fn symmetry_at_infinite_threshold() {
    let (g1, reg) = triangle_with_label(false);
    let (g2, _) = triangle_with_label(true);
    let a = inexact::match_graphs(&g1, &g2, &reg, f64::INFINITY);
    let b = inexact::match_graphs(&g2, &g1, &reg, f64::INFINITY);
    assert!((a.cost - b.cost).abs() < 1e-9);
}

#[test]
fn threshold_scenario_three_point_zero_succeeds_zero_point_five_fails() {
    let (g1, reg) = triangle_with_label(false);
    let (g2, _) = triangle_with_label(true);

    let exact = inexact::match_graphs(&g1, &g2, &reg, f64::INFINITY);
    assert!((exact.cost - 1.0).abs() < 1e-9);

    let threshold = 0.5 * (g1.vertex_count() + g1.edge_count()) as f64;
    assert!((threshold - 3.0).abs() < 1e-9);

    let high = inexact::match_graphs(&g1, &g2, &reg, threshold);
    assert!(high.mapping.is_some());

    let low = inexact::match_graphs(&g1, &g2, &reg, 0.5);
    assert!(low.mapping.is_none());
}
