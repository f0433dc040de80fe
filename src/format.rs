//! Graph file grammar: a tokenizer and writer for the line-oriented
//! vertex/edge format shared by input graphs, the substructure output file,
//! and the predefined-patterns file.
//!
//! This is not a general-purpose parser generator: every record is one
//! line, every field is whitespace-separated, and quoting only ever wraps a
//! single string label.

use std::collections::HashMap;

use crate::error::{Result, SubdueError};
use crate::graph::{ExampleBoundary, ExampleKind, GraphStore, VertexId};
use crate::label::{Label, LabelRegistry};
use crate::pattern::Substructure;

/// Splits one line into whitespace-separated tokens, treating a
/// double-quoted run as a single token with the quotes stripped.
fn tokenize_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();
    let mut current = String::new();
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn parse_label(token: &str) -> Label {
    match token.parse::<f64>() {
        Ok(n) => Label::num(n),
        Err(_) => Label::str(token),
    }
}

fn input_error(file: &str, line: usize, token: impl Into<String>, message: impl Into<String>) -> SubdueError {
    SubdueError::InputFormat {
        file: file.to_string(),
        line,
        token: token.into(),
        message: message.into(),
    }
}

fn parse_file_id(token: &str, file: &str, line: usize) -> Result<usize> {
    token
        .parse::<usize>()
        .map_err(|_| input_error(file, line, token, "expected an integer vertex id"))
}

/// Parses one graph (or predefined-patterns) file in the grammar above.
/// `directed_default` governs the bare `e` token; `u`/`d` are always
/// unambiguous. Vertex ids in the file are 1-based; the returned
/// [`GraphStore`] uses 0-based [`VertexId`]s assigned in first-seen order.
pub fn parse_graph(text: &str, file_name: &str, directed_default: bool, registry: &mut LabelRegistry) -> Result<GraphStore> {
    let mut graph = GraphStore::new();
    let mut file_id_to_vertex: HashMap<usize, VertexId> = HashMap::new();
    let mut current_kind = ExampleKind::Positive;
    let mut example_start: Option<VertexId> = None;
    let mut seen_example_marker = false;

    for (line_no, raw_line) in text.lines().enumerate() {
        let line_no = line_no + 1;
        let line = raw_line.trim_end();
        if line.trim().is_empty() {
            continue;
        }
        if line.trim_start().starts_with('%') {
            continue;
        }

        let tokens = tokenize_line(line);
        let Some(head) = tokens.first() else { continue };

        match head.as_str() {
            "XP" | "XN" => {
                let boundary_end = Some(VertexId(graph.vertex_count() as u32));
                close_example(&mut graph, current_kind, example_start, boundary_end);
                current_kind = if head == "XP" { ExampleKind::Positive } else { ExampleKind::Negative };
                example_start = None;
                seen_example_marker = true;
            }
            "v" => {
                if tokens.len() != 3 {
                    return Err(input_error(file_name, line_no, line, "expected 'v <id> <label>'"));
                }
                let file_id = parse_file_id(&tokens[1], file_name, line_no)?;
                let label = registry.intern(parse_label(&tokens[2]));
                let vertex = graph.add_vertex(label);
                file_id_to_vertex.insert(file_id, vertex);
                if example_start.is_none() {
                    example_start = Some(vertex);
                }
            }
            "e" | "u" | "d" => {
                if tokens.len() != 4 {
                    return Err(input_error(file_name, line_no, line, "expected '<kind> <src> <dst> <label>'"));
                }
                let directed = match head.as_str() {
                    "u" => false,
                    "d" => true,
                    _ => directed_default,
                };
                let src_id = parse_file_id(&tokens[1], file_name, line_no)?;
                let dst_id = parse_file_id(&tokens[2], file_name, line_no)?;
                let src = *file_id_to_vertex
                    .get(&src_id)
                    .ok_or_else(|| input_error(file_name, line_no, &tokens[1], "edge references unknown vertex"))?;
                let dst = *file_id_to_vertex
                    .get(&dst_id)
                    .ok_or_else(|| input_error(file_name, line_no, &tokens[2], "edge references unknown vertex"))?;
                let label = registry.intern(parse_label(&tokens[3]));
                graph.add_edge(src, dst, label, directed, false);
            }
            "S" | "PS" => {
                // Substructure/predefined-pattern header lines are consumed
                // by the higher-level record parsers below, not here.
                continue;
            }
            other => {
                return Err(input_error(file_name, line_no, other, "unknown record type"));
            }
        }
    }

    let final_vertex_count = graph.vertex_count() as u32;
    close_example(&mut graph, current_kind, example_start, Some(VertexId(final_vertex_count)));
    if !seen_example_marker && !graph.examples.is_empty() {
        // The first example may omit XP and is assumed positive; already
        // the default, nothing further to do.
    }
    Ok(graph)
}

fn close_example(graph: &mut GraphStore, kind: ExampleKind, start: Option<VertexId>, end: Option<VertexId>) {
    if let (Some(start), Some(end)) = (start, end) {
        if end.0 > start.0 {
            graph.examples.push(ExampleBoundary { kind, start, end });
        }
    }
}

/// Writes one vertex/edge record block for `graph`, 1-based ids in
/// insertion order, using the canonical (non-quoted unless needed) label
/// form.
pub fn write_graph(graph: &GraphStore, registry: &LabelRegistry) -> String {
    let mut out = String::new();
    for v in graph.vertex_ids() {
        out.push_str(&format!("v {} {}\n", v.0 + 1, registry.get(graph.vertex(v).label)));
    }
    let mut written = std::collections::HashSet::new();
    for e in graph.edge_ids() {
        if written.contains(&e) {
            continue;
        }
        written.insert(e);
        let data = graph.edge(e);
        let kind = if data.directed { "d" } else { "u" };
        out.push_str(&format!(
            "{} {} {} {}\n",
            kind,
            data.source.0 + 1,
            data.target.0 + 1,
            registry.get(data.label)
        ));
    }
    out
}

/// Writes the substructure output file: one `S`-prefixed record per
/// reported pattern followed by its vertex/edge lines.
pub fn write_substructures(patterns: &[Substructure], registry: &LabelRegistry) -> String {
    let mut out = String::new();
    for (idx, pattern) in patterns.iter().enumerate() {
        out.push_str(&format!(
            "S {idx} score={} instances={}\n",
            pattern.score,
            pattern.instance_count()
        ));
        out.push_str(&write_graph(&pattern.definition, registry));
    }
    out
}

/// Parses a predefined-patterns file: a sequence of `PS`-delimited graph
/// blocks, each compressed out of the input graph before discovery begins.
pub fn parse_predefined_patterns(text: &str, file_name: &str, registry: &mut LabelRegistry) -> Result<Vec<GraphStore>> {
    let mut patterns = Vec::new();
    let mut current_block = String::new();

    for raw_line in text.lines() {
        if raw_line.trim_start().starts_with("PS") {
            if !current_block.trim().is_empty() {
                patterns.push(parse_graph(&current_block, file_name, false, registry)?);
            }
            current_block.clear();
        } else {
            current_block.push_str(raw_line);
            current_block.push('\n');
        }
    }
    if !current_block.trim().is_empty() {
        patterns.push(parse_graph(&current_block, file_name, false, registry)?);
    }
    Ok(patterns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_triangle() {
        let mut reg = LabelRegistry::new();
        let text = "v 1 X\nv 2 X\nv 3 X\nu 1 2 t\nu 2 3 t\nu 1 3 t\n";
        let g = parse_graph(text, "test.g", false, &mut reg).unwrap();
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.edge_count(), 3);

        let written = write_graph(&g, &reg);
        let mut reg2 = LabelRegistry::new();
        let g2 = parse_graph(&written, "roundtrip.g", false, &mut reg2).unwrap();
        assert_eq!(g2.vertex_count(), g.vertex_count());
        assert_eq!(g2.edge_count(), g.edge_count());
    }

    #[test]
    fn numeric_label_autodetected() {
        let mut reg = LabelRegistry::new();
        let text = "v 1 3.5\nv 2 X\nu 1 2 t\n";
        let g = parse_graph(text, "test.g", false, &mut reg).unwrap();
        assert_eq!(reg.get(g.vertex(VertexId(0)).label), &Label::num(3.5));
    }

    #[test]
    fn quoted_label_with_whitespace() {
        let mut reg = LabelRegistry::new();
        let text = "v 1 \"has space\"\n";
        let g = parse_graph(text, "test.g", false, &mut reg).unwrap();
        assert_eq!(reg.get(g.vertex(VertexId(0)).label), &Label::str("has space"));
    }

    #[test]
    fn unknown_vertex_reference_is_input_error() {
        let mut reg = LabelRegistry::new();
        let text = "v 1 X\nu 1 2 t\n";
        let err = parse_graph(text, "test.g", false, &mut reg).unwrap_err();
        assert!(matches!(err, SubdueError::InputFormat { .. }));
    }

    #[test]
    fn example_markers_split_boundaries() {
        let mut reg = LabelRegistry::new();
        let text = "XP\nv 1 X\nv 2 X\nu 1 2 t\nXN\nv 3 X\nv 4 X\nu 3 4 t\n";
        let g = parse_graph(text, "test.g", false, &mut reg).unwrap();
        assert_eq!(g.examples.len(), 2);
        assert_eq!(g.examples[0].kind, ExampleKind::Positive);
        assert_eq!(g.examples[1].kind, ExampleKind::Negative);
    }
}
