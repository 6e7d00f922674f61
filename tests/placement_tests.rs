use phylomass::newick;
use phylomass::placement::{Pquery, PqueryName, PqueryPlacement, Sample};

fn placement(edge_num: i64, like_weight_ratio: f64) -> PqueryPlacement {
    PqueryPlacement {
        edge_num,
        likelihood: -100.0,
        like_weight_ratio,
        ..PqueryPlacement::default()
    }
}

fn pquery(name: &str, placements: Vec<PqueryPlacement>) -> Pquery {
    Pquery::new(placements, vec![PqueryName::new(name, 0.0)])
}

fn two_clade_sample() -> Sample {
    let tree = newick::parse("((A:1{0},B:1{1}):1{2},C:1{3});").unwrap();
    Sample::new(tree)
}

// ============= Pquery Tests =============

#[test]
fn test_weight_ratio_sum() {
    let pq = pquery("q", vec![placement(0, 0.6), placement(1, 0.2)]);
    assert!((pq.weight_ratio_sum() - 0.8).abs() < 1e-12);
}

#[test]
fn test_normalize_weight_ratios() {
    let mut pq = pquery("q", vec![placement(0, 0.6), placement(1, 0.2)]);
    pq.normalize_weight_ratios();
    assert!((pq.weight_ratio_sum() - 1.0).abs() < 1e-9);
    assert!((pq.placements[0].like_weight_ratio - 0.75).abs() < 1e-9);
    assert!((pq.placements[1].like_weight_ratio - 0.25).abs() < 1e-9);
}

#[test]
fn test_normalize_leaves_zero_mass_untouched() {
    let mut pq = pquery("q", vec![placement(0, 0.0)]);
    pq.normalize_weight_ratios();
    assert_eq!(pq.placements[0].like_weight_ratio, 0.0);
}

#[test]
fn test_restrain_to_max_weight_placement() {
    let mut pq = pquery("q", vec![placement(0, 0.3), placement(1, 0.5), placement(3, 0.2)]);
    pq.restrain_to_max_weight_placement();
    assert_eq!(pq.placements.len(), 1);
    assert_eq!(pq.placements[0].edge_num, 1);
    assert_eq!(pq.placements[0].like_weight_ratio, 0.5);
}

// ============= Sample Tests =============

#[test]
fn test_add_pquery_resolves_edges() {
    let mut smp = two_clade_sample();
    smp.add_pquery(pquery("q", vec![placement(3, 1.0)])).unwrap();

    assert_eq!(smp.pquery_count(), 1);
    assert_eq!(smp.placement_count(), 1);
    let resolved = smp.pqueries()[0].placements[0].edge;
    assert_eq!(smp.tree().edge(resolved).edge_num(), 3);
    assert!(smp.validate());
}

#[test]
fn test_add_pquery_unknown_edge_num_fails() {
    let mut smp = two_clade_sample();
    let result = smp.add_pquery(pquery("q", vec![placement(42, 1.0)]));
    assert!(result.is_err());
    // Sample is unchanged on failure.
    assert_eq!(smp.pquery_count(), 0);
}

#[test]
fn test_placement_mass() {
    let mut smp = two_clade_sample();
    smp.add_pquery(pquery("q1", vec![placement(0, 0.7), placement(1, 0.3)])).unwrap();
    smp.add_pquery(pquery("q2", vec![placement(3, 0.5)])).unwrap();
    assert!((smp.placement_mass() - 1.5).abs() < 1e-12);
}

#[test]
fn test_mass_per_edge_normalizes_per_pquery() {
    let mut smp = two_clade_sample();
    // Sums to 0.5, so normalization doubles each ratio.
    smp.add_pquery(pquery("q", vec![placement(0, 0.4), placement(1, 0.1)])).unwrap();

    let masses = smp.mass_per_edge();
    let edge_of = |num: i64| smp.edge_num_map()[&num];
    assert!((masses[edge_of(0)] - 0.8).abs() < 1e-9);
    assert!((masses[edge_of(1)] - 0.2).abs() < 1e-9);
    assert_eq!(masses[edge_of(3)], 0.0);
    assert!((masses.iter().sum::<f64>() - 1.0).abs() < 1e-9);
}

#[test]
fn test_merge_same_topology() {
    let mut lhs = two_clade_sample();
    lhs.add_pquery(pquery("q1", vec![placement(0, 1.0)])).unwrap();
    lhs.set_metadata("invocation", "first");

    let mut rhs = two_clade_sample();
    rhs.add_pquery(pquery("q2", vec![placement(1, 1.0)])).unwrap();
    rhs.add_pquery(pquery("q3", vec![placement(3, 1.0)])).unwrap();
    rhs.set_metadata("invocation", "second");
    rhs.set_metadata("tool", "other");

    assert!(lhs.merge(rhs).is_ok());
    assert_eq!(lhs.pquery_count(), 3);
    assert!(lhs.validate());
    // Existing metadata keys win, new ones are taken over.
    assert_eq!(lhs.metadata()["invocation"], "first");
    assert_eq!(lhs.metadata()["tool"], "other");
}

#[test]
fn test_merge_different_topology_fails_unchanged() {
    let mut lhs = two_clade_sample();
    lhs.add_pquery(pquery("q1", vec![placement(0, 1.0)])).unwrap();

    let tree = newick::parse("(A:1{0},B:1{1},C:1{2},D:1{3});").unwrap();
    let mut rhs = Sample::new(tree);
    rhs.add_pquery(pquery("q2", vec![placement(2, 1.0)])).unwrap();

    let result = lhs.merge(rhs);
    assert!(result.is_err());
    // Both sides unchanged; the right side is handed back.
    assert_eq!(lhs.pquery_count(), 1);
    assert_eq!(result.unwrap_err().pquery_count(), 1);
}

#[test]
fn test_merge_unknown_edge_num_fails_unchanged() {
    let mut lhs = two_clade_sample();
    lhs.add_pquery(pquery("q1", vec![placement(0, 1.0)])).unwrap();

    // Same shape as lhs, but C's branch carries a different edge num tag.
    let tree = newick::parse("((A:1{0},B:1{1}):1{2},C:1{7});").unwrap();
    let mut rhs = Sample::new(tree);
    rhs.add_pquery(pquery("q2", vec![placement(7, 1.0)])).unwrap();

    let result = lhs.merge(rhs);
    assert!(result.is_err());
    // The placement on the unknown edge num must not be taken over, and
    // must not be lost from the returned sample either.
    assert_eq!(lhs.pquery_count(), 1);
    assert_eq!(lhs.placement_count(), 1);
    let back = result.unwrap_err();
    assert_eq!(back.pquery_count(), 1);
    assert_eq!(back.placement_count(), 1);
    assert!(lhs.validate());
    assert!(back.validate());
}

#[test]
fn test_validate_rejects_ratio_out_of_range() {
    let mut smp = two_clade_sample();
    smp.add_pquery(pquery("q", vec![placement(0, 1.5)])).unwrap();
    assert!(!smp.validate());
}
