//! JSON file persistence round-trip for `GraphStore`, mirroring the
//! teacher crate's own `test_serde_json.rs` idiom (file-backed serde
//! round-trip plus missing-file error behavior).

mod common;

use subdue::graph::GraphStore;
use test_dir::{DirBuilder, TestDir};

#[test]
fn serialize_then_deserialize_preserves_graph() {
    let dir = TestDir::temp();
    let path = dir.path("triangle.json");

    let (g, _reg) = common::triangle();
    g.serialize_to_file(path.to_str().unwrap()).unwrap();

    let read_back = GraphStore::deserialize_from_file(path.to_str().unwrap()).unwrap();
    assert_eq!(read_back.vertex_count(), g.vertex_count());
    assert_eq!(read_back.edge_count(), g.edge_count());
}

#[test]
fn deserialize_missing_file_is_not_found() {
    let dir = TestDir::temp();
    let path = dir.path("missing.json");
    let err = GraphStore::deserialize_from_file(path.to_str().unwrap())
        .expect_err("missing file should fail to open");
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
}
