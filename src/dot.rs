//! Minimal DOT-format debug formatter, gated behind the `dot` feature.
//!
//! A thin debug aid: hand-formats DOT text directly from `GraphStore` and
//! shells out to `graphviz_rust::exec_dot` to render it, since `GraphStore`
//! isn't a `petgraph::Graph`.

use std::fmt::Write as _;

use crate::graph::GraphStore;
use crate::label::LabelRegistry;

/// Renders `graph` as a DOT-language string suitable for `dot -Tsvg`.
pub fn to_dot(graph: &GraphStore, registry: &LabelRegistry) -> String {
    let mut out = String::from("digraph host {\n");
    for v in graph.vertex_ids() {
        let label = registry.get(graph.vertex(v).label);
        let _ = writeln!(out, "    {} [label=\"{}\"];", v.0, label);
    }
    let mut seen = std::collections::HashSet::new();
    for e in graph.edge_ids() {
        if !seen.insert(e) {
            continue;
        }
        let data = graph.edge(e);
        let label = registry.get(data.label);
        let arrow = if data.directed { "->" } else { "--" };
        let _ = writeln!(
            out,
            "    {} {} {} [label=\"{}\"];",
            data.source.0, arrow, data.target.0, label
        );
    }
    out.push_str("}\n");
    out
}

/// Renders `graph` to an SVG file at `path` using a locally installed
/// graphviz engine.
pub fn write_svg(graph: &GraphStore, registry: &LabelRegistry, path: &str) -> std::io::Result<String> {
    use graphviz_rust::cmd::{CommandArg, Format};
    graphviz_rust::exec_dot(
        to_dot(graph, registry),
        vec![CommandArg::Format(Format::Svg), CommandArg::Output(path.to_string())],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::Label;

    #[test]
    fn renders_vertices_and_edges() {
        let mut reg = LabelRegistry::new();
        let x = reg.intern(Label::str("X"));
        let t = reg.intern(Label::str("t"));
        let mut g = GraphStore::new();
        let a = g.add_vertex(x);
        let b = g.add_vertex(x);
        g.add_edge(a, b, t, true, false);
        let dot = to_dot(&g, &reg);
        assert!(dot.contains("digraph"));
        assert!(dot.contains("->"));
    }
}
