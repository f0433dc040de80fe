use subdue::graph::GraphStore;
use subdue::label::{Label, LabelRegistry};

pub fn triangle() -> (GraphStore, LabelRegistry) {
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
