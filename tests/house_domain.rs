//! House domain supervised scenario: triangle/square shapes linked by
//! "on"/"shape" edges to generic "object" vertices, scored by set-cover
//! against positive and negative examples.

mod common;

use subdue::eval::EvalMethod;
use subdue::graph::GraphStore;
use subdue::label::{Label, LabelRegistry};
use subdue::params::DiscoveryParams;

/// One "house" example: three generic objects, one triangle and one square,
/// linked `on` (object-object) and `shape` (object-triangle/square) edges.
fn add_house_example(
    g: &mut GraphStore,
    reg: &mut LabelRegistry,
    kind: subdue::graph::ExampleKind,
) {
    let object = reg.intern(Label::str("object"));
    let triangle = reg.intern(Label::str("triangle"));
    let square = reg.intern(Label::str("square"));
    let on = reg.intern(Label::str("on"));
    let shape = reg.intern(Label::str("shape"));

    let start = g.vertex_count() as u32;
    let o1 = g.add_vertex(object);
    let o2 = g.add_vertex(object);
    let o3 = g.add_vertex(object);
    let t = g.add_vertex(triangle);
    let s = g.add_vertex(square);

    g.add_edge(o1, o2, on, true, false);
    g.add_edge(o2, o3, on, true, false);
    g.add_edge(o1, t, shape, true, false);
    g.add_edge(o2, s, shape, true, false);

    g.examples.push(subdue::graph::ExampleBoundary {
        kind,
        start: subdue::graph::VertexId(start),
        end: subdue::graph::VertexId(g.vertex_count() as u32),
    });
}

#[test]
fn set_cover_discovers_house_pattern() {
    let mut reg = LabelRegistry::new();
    let mut pos = GraphStore::new();
    for _ in 0..4 {
        add_house_example(&mut pos, &mut reg, subdue::graph::ExampleKind::Positive);
    }

    let params = DiscoveryParams {
        eval_method: EvalMethod::SetCover,
        num_best_subs: 1,
        limit: Some(200),
        max_vertices: 5,
        ..DiscoveryParams::default()
    };

    let results = subdue::discover(pos, None, &mut reg, &params);
    assert!(!results.is_empty());
    let top = &results[0].best[0];
    assert!(top.score >= 0.75, "expected score >= 0.75, got {}", top.score);
    assert!((0.0..=1.0).contains(&top.score));
}
