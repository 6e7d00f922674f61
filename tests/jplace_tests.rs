use phylomass::jplace::{JplaceReader, JplaceWriter};
use phylomass::parser::ParseErrorKind;
use phylomass::tree::Tree;

const SIMPLE_DOC: &str = r#"{
    "version": 3,
    "tree": "((A:1{0},B:1{1}):1{2},C:2{3});",
    "placements": [
        {"p": [[0, -120.5, 0.8, 0.25, 0.1], [1, -122.0, 0.2, 0.5, 0.1]], "n": ["read_1"]},
        {"p": [[3, -110.0, 1.0, 1.5, 0.0]], "nm": [["read_2", 3.0]]}
    ],
    "fields": ["edge_num", "likelihood", "like_weight_ratio",
               "distal_length", "pendant_length"],
    "metadata": {"invocation": "placement-tool run"}
}"#;

// ============= Reader Tests =============

#[test]
fn test_read_simple_document() {
    let smp = JplaceReader::new().from_string(SIMPLE_DOC).unwrap();

    assert_eq!(smp.pquery_count(), 2);
    assert_eq!(smp.placement_count(), 3);
    assert_eq!(smp.tree().leaf_count(), 3);
    assert!(smp.tree().validate());
    assert!(smp.validate());
    assert_eq!(smp.metadata()["invocation"], "placement-tool run");

    let first = &smp.pqueries()[0];
    assert_eq!(first.names[0].name, "read_1");
    assert_eq!(first.names[0].multiplicity, 0.0);
    assert_eq!(first.placements[0].edge_num, 0);
    assert_eq!(first.placements[0].likelihood, -120.5);
    assert_eq!(first.placements[0].distal_length, 0.25);

    let second = &smp.pqueries()[1];
    assert_eq!(second.names[0].multiplicity, 3.0);
}

#[test]
fn test_read_reordered_fields() {
    let doc = r#"{
        "version": 3,
        "tree": "(A:1{0},B:1{1});",
        "placements": [{"p": [[0.7, 0]], "n": ["q"]}],
        "fields": ["like_weight_ratio", "edge_num", "distal_length"],
        "metadata": {}
    }"#;
    // distal_length column missing from the row: invalid.
    let result = JplaceReader::new().from_string(doc);
    assert!(result.is_err());

    let doc = r#"{
        "version": 3,
        "tree": "(A:1{0},B:1{1});",
        "placements": [{"p": [[0.7, 0, 0.5]], "n": ["q"]}],
        "fields": ["like_weight_ratio", "edge_num", "distal_length"],
        "metadata": {}
    }"#;
    let smp = JplaceReader::new().from_string(doc).unwrap();
    assert_eq!(smp.pqueries()[0].placements[0].like_weight_ratio, 0.7);
    assert_eq!(smp.pqueries()[0].placements[0].edge_num, 0);
}

#[test]
fn test_read_converts_proximal_to_distal() {
    let doc = r#"{
        "version": "3",
        "tree": "(A:2{0},B:1{1});",
        "placements": [{"p": [[0, 1.0, 0.5]], "n": ["q"]}],
        "fields": ["edge_num", "like_weight_ratio", "proximal_length"],
        "metadata": {}
    }"#;
    let smp = JplaceReader::new().from_string(doc).unwrap();
    // Branch length 2, proximal 0.5, so distal is 1.5.
    assert!((smp.pqueries()[0].placements[0].distal_length - 1.5).abs() < 1e-9);
}

#[test]
fn test_read_rejects_wrong_version() {
    let doc = SIMPLE_DOC.replace("\"version\": 3", "\"version\": 2");
    let err = JplaceReader::new().from_string(&doc).unwrap_err();
    assert_eq!(*err.kind(), ParseErrorKind::UnsupportedJplaceVersion(2));
}

#[test]
fn test_read_rejects_unknown_edge_num() {
    let doc = SIMPLE_DOC.replace("[3, -110.0, 1.0, 1.5, 0.0]", "[9, -110.0, 1.0, 1.5, 0.0]");
    let err = JplaceReader::new().from_string(&doc).unwrap_err();
    assert_eq!(*err.kind(), ParseErrorKind::UnresolvedEdgeNum(9));
}

#[test]
fn test_read_rejects_missing_required_field() {
    let doc = r#"{
        "version": 3,
        "tree": "(A:1{0},B:1{1});",
        "placements": [],
        "fields": ["edge_num", "distal_length"],
        "metadata": {}
    }"#;
    let err = JplaceReader::new().from_string(doc).unwrap_err();
    assert!(matches!(err.kind(), ParseErrorKind::InvalidJplaceFields(_)));
}

#[test]
fn test_read_rejects_both_length_conventions() {
    let doc = r#"{
        "version": 3,
        "tree": "(A:1{0},B:1{1});",
        "placements": [],
        "fields": ["edge_num", "like_weight_ratio", "distal_length", "proximal_length"],
        "metadata": {}
    }"#;
    let err = JplaceReader::new().from_string(doc).unwrap_err();
    assert!(matches!(err.kind(), ParseErrorKind::InvalidJplaceFields(_)));
}

// ============= Writer Tests =============

#[test]
fn test_round_trip_preserves_sample() {
    let reader = JplaceReader::new();
    let smp = reader.from_string(SIMPLE_DOC).unwrap();

    let json = JplaceWriter::new().to_string(&smp).unwrap();
    let back = reader.from_string(&json).unwrap();

    assert_eq!(back.pquery_count(), smp.pquery_count());
    assert_eq!(back.placement_count(), smp.placement_count());
    assert!(Tree::has_identical_topology(smp.tree(), back.tree()));
    assert!(Tree::has_identical_edge_data(smp.tree(), back.tree()));
    assert!(Tree::has_identical_node_data(smp.tree(), back.tree()));
    assert_eq!(back.metadata(), smp.metadata());

    for (a, b) in smp.pqueries().iter().zip(back.pqueries()) {
        assert_eq!(a.names, b.names);
        for (pa, pb) in a.placements.iter().zip(&b.placements) {
            assert_eq!(pa.edge_num, pb.edge_num);
            assert!((pa.likelihood - pb.likelihood).abs() < 1e-9);
            assert!((pa.like_weight_ratio - pb.like_weight_ratio).abs() < 1e-9);
            assert!((pa.distal_length - pb.distal_length).abs() < 1e-9);
            assert!((pa.pendant_length - pb.pendant_length).abs() < 1e-9);
        }
    }
}

#[test]
fn test_writer_uses_plain_names_without_multiplicity() {
    let smp = JplaceReader::new().from_string(SIMPLE_DOC).unwrap();
    let json = JplaceWriter::new().to_string(&smp).unwrap();
    // read_1 has no multiplicity, read_2 does.
    assert!(json.contains("\"n\""));
    assert!(json.contains("\"nm\""));
}

#[test]
fn test_write_file_refuses_to_overwrite() {
    let smp = JplaceReader::new().from_string(SIMPLE_DOC).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.jplace");

    assert!(JplaceWriter::new().to_file(&smp, &path).unwrap());
    let first = std::fs::read_to_string(&path).unwrap();

    // Second write is skipped and the file stays as it was.
    assert!(!JplaceWriter::new().to_file(&smp, &path).unwrap());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
}

#[test]
fn test_file_round_trip() {
    let smp = JplaceReader::new().from_string(SIMPLE_DOC).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.jplace");

    assert!(phylomass::write_jplace_file(&smp, &path).unwrap());
    let back = phylomass::read_jplace_file(&path).unwrap();
    assert_eq!(back.pquery_count(), smp.pquery_count());
    assert!(Tree::has_identical_topology(smp.tree(), back.tree()));
}
