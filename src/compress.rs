//! Compressor: rewrites a graph by replacing every instance of a
//! chosen pattern with a single synthetic vertex, preserving external
//! connectivity.
//!
//! Open question noted in DESIGN.md: when overlap is allowed and two
//! instances genuinely share a vertex, the exact bookkeeping for that shared
//! vertex is ambiguous. This implementation assigns a shared vertex to the
//! lowest-indexed instance that contains it for remapping purposes, and
//! records the sharing with an `OVERLAP`-labeled edge between the two
//! instances' synthetic vertices.

use std::collections::HashMap;

use crate::graph::{EdgeId, ExampleBoundary, GraphStore, VertexId};
use crate::instance::{InstanceArena, InstanceHandle};
use crate::label::{Label, LabelId, LabelRegistry};

/// Synthetic label used for the OVERLAP marker edges.
pub fn overlap_label(registry: &mut LabelRegistry) -> LabelId {
    registry.intern(Label::str("OVERLAP"))
}

/// Compresses `host` by replacing every instance in `instances` with a
/// fresh `SUB_<iteration>`-labeled vertex.
///
/// `instances` need not be non-overlapping when `allow_overlap` is `true`;
/// when `false`, callers are expected to have already filtered to a
/// non-overlapping set (the Subgraph Matcher does this).
pub fn compress(
    host: &GraphStore,
    instances: &[InstanceHandle],
    arena: &InstanceArena,
    registry: &mut LabelRegistry,
    iteration: usize,
    allow_overlap: bool,
) -> GraphStore {
    let sub_label = registry.intern(Label::str(format!("SUB_{iteration}")));
    let overlap = overlap_label(registry);

    // owner[v] = lowest-indexed instance containing v, if any.
    let mut owner: HashMap<VertexId, usize> = HashMap::new();
    for (idx, &handle) in instances.iter().enumerate() {
        for &v in &arena.get(handle).vertices {
            owner.entry(v).or_insert(idx);
        }
    }

    let mut out = GraphStore::with_capacity(host.vertex_count(), host.edge_count());

    let sub_vertices: Vec<VertexId> = instances.iter().map(|_| out.add_vertex(sub_label)).collect();

    let mut remap: HashMap<VertexId, VertexId> = HashMap::new();
    for v in host.vertex_ids() {
        if owner.contains_key(&v) {
            continue;
        }
        let new_id = out.add_vertex(host.vertex(v).label);
        remap.insert(v, new_id);
    }

    let endpoint = |v: VertexId| -> VertexId {
        match owner.get(&v) {
            Some(&idx) => sub_vertices[idx],
            None => remap[&v],
        }
    };

    let mut seen_edges: std::collections::HashSet<EdgeId> = std::collections::HashSet::new();
    for e in host.edge_ids() {
        if seen_edges.contains(&e) {
            continue;
        }
        seen_edges.insert(e);
        let data = host.edge(e);
        let same_instance = matches!(
            (owner.get(&data.source), owner.get(&data.target)),
            (Some(a), Some(b)) if a == b
        );
        if same_instance {
            continue;
        }
        out.add_edge(
            endpoint(data.source),
            endpoint(data.target),
            data.label,
            data.directed,
            data.spans_increment,
        );
    }

    if allow_overlap {
        for i in 0..instances.len() {
            for j in (i + 1)..instances.len() {
                let vi = &arena.get(instances[i]).vertices;
                let vj = &arena.get(instances[j]).vertices;
                if vi.iter().any(|v| vj.contains(v)) {
                    out.add_edge(sub_vertices[i], sub_vertices[j], overlap, false, false);
                }
            }
        }
    }

    out.examples = host
        .examples
        .iter()
        .map(|b| ExampleBoundary {
            kind: b.kind,
            start: remap_boundary_vertex(b.start, &owner, &sub_vertices, &remap, host),
            end: remap_boundary_vertex(b.end, &owner, &sub_vertices, &remap, host),
        })
        .collect();

    out
}

/// `WriteCompressedGraphToFile` variant: runs [`compress`] and writes the
/// result to `path` in the native graph grammar rather than returning it
/// only in memory.
pub fn write_compressed_graph_to_file(
    host: &GraphStore,
    instances: &[InstanceHandle],
    arena: &InstanceArena,
    registry: &mut LabelRegistry,
    iteration: usize,
    allow_overlap: bool,
    path: &str,
) -> std::io::Result<GraphStore> {
    let compressed = compress(host, instances, arena, registry, iteration, allow_overlap);
    let text = crate::format::write_graph(&compressed, registry);
    std::fs::write(path, text)?;
    Ok(compressed)
}

fn remap_boundary_vertex(
    v: VertexId,
    owner: &HashMap<VertexId, usize>,
    sub_vertices: &[VertexId],
    remap: &HashMap<VertexId, VertexId>,
    host: &GraphStore,
) -> VertexId {
    // `end` is an exclusive bound that may equal `host.vertex_count()`,
    // one past the last real vertex; map it to the new graph's vertex
    // count in that case.
    if v.0 as usize >= host.vertex_count() {
        return VertexId(remap.len() as u32 + sub_vertices.len() as u32);
    }
    match owner.get(&v) {
        Some(&idx) => sub_vertices[idx],
        None => remap[&v],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Instance;
    use test_dir::DirBuilder;

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
    fn empty_instance_list_is_identity() {
        let (g, mut reg) = triangle();
        let arena = InstanceArena::new();
        let out = compress(&g, &[], &arena, &mut reg, 1, false);
        assert_eq!(out.vertex_count(), g.vertex_count());
        assert_eq!(out.edge_count(), g.edge_count());
    }

    #[test]
    fn single_instance_collapses_to_one_vertex() {
        let (g, mut reg) = triangle();
        let mut arena = InstanceArena::new();
        let handle = arena.insert(Instance::new(
            g.vertex_ids().collect(),
            g.edge_ids().collect(),
        ));
        let out = compress(&g, &[handle], &arena, &mut reg, 1, false);
        assert_eq!(out.vertex_count(), 1);
        assert_eq!(out.edge_count(), 0);
    }

    #[test]
    fn write_compressed_graph_to_file_matches_in_memory_result() {
        let (g, mut reg) = triangle();
        let mut arena = InstanceArena::new();
        let handle = arena.insert(Instance::new(
            g.vertex_ids().collect(),
            g.edge_ids().collect(),
        ));
        let dir = test_dir::TestDir::temp();
        let path = dir.path("compressed.g");
        let written = write_compressed_graph_to_file(
            &g,
            &[handle],
            &arena,
            &mut reg,
            1,
            false,
            path.to_str().unwrap(),
        )
        .unwrap();
        assert_eq!(written.vertex_count(), 1);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("SUB_1"));
    }
}
