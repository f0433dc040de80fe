//! Graph file grammar round-trip through actual files, using the same
//! temp-directory idiom used elsewhere for serialization tests.

mod common;

use std::fs;

use subdue::format;
use subdue::label::LabelRegistry;
use test_dir::{DirBuilder, TestDir};

#[test]
fn write_then_parse_preserves_labels_and_edge_count() {
    let dir = TestDir::temp();
    let path = dir.path("triangle.g");

    let (g, reg) = common::triangle();
    let text = format::write_graph(&g, &reg);
    fs::write(&path, &text).unwrap();

    let read_back = fs::read_to_string(&path).unwrap();
    let mut reg2 = LabelRegistry::new();
    let g2 = format::parse_graph(&read_back, path.to_str().unwrap(), false, &mut reg2).unwrap();

    assert_eq!(g2.vertex_count(), g.vertex_count());
    assert_eq!(g2.edge_count(), g.edge_count());
}

#[test]
fn parse_missing_file_is_a_parameter_error_path() {
    let dir = TestDir::temp();
    let path = dir.path("missing.g");
    let err = fs::read_to_string(&path).expect_err("file should not exist");
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
}
