use phylomass::newick;
use phylomass::placement::{Pquery, PqueryName, PqueryPlacement, Sample};
use phylomass::placement::{center_of_gravity, earth_movers_distance, variance};

fn placement(edge_num: i64, like_weight_ratio: f64) -> PqueryPlacement {
    PqueryPlacement { edge_num, like_weight_ratio, ..PqueryPlacement::default() }
}

fn sample_with(placements: Vec<Vec<PqueryPlacement>>) -> Sample {
    let tree = newick::parse("((A:1{0},B:1{1}):1{2},C:1{3});").unwrap();
    let mut smp = Sample::new(tree);
    for (i, p) in placements.into_iter().enumerate() {
        let name = format!("q{}", i);
        smp.add_pquery(Pquery::new(p, vec![PqueryName::new(&name, 0.0)])).unwrap();
    }
    smp
}

// ============= Earth Mover's Distance Tests =============

#[test]
fn test_emd_of_sample_with_itself_is_zero() {
    let smp = sample_with(vec![vec![placement(0, 0.7), placement(2, 0.3)]]);
    let d = earth_movers_distance(&smp, &smp).unwrap();
    assert!(d.abs() < 1e-12);
}

#[test]
fn test_emd_between_sibling_leaf_edges() {
    // One unit of mass at A's branch vs one at B's branch: the mass
    // travels across both unit-length branches.
    let lhs = sample_with(vec![vec![placement(0, 1.0)]]);
    let rhs = sample_with(vec![vec![placement(1, 1.0)]]);
    let d = earth_movers_distance(&lhs, &rhs).unwrap();
    assert!((d - 2.0).abs() < 1e-9);
}

#[test]
fn test_emd_across_inner_edge() {
    // A's branch to C's branch: path A -> inner -> root -> C, length 3.
    let lhs = sample_with(vec![vec![placement(0, 1.0)]]);
    let rhs = sample_with(vec![vec![placement(3, 1.0)]]);
    let d = earth_movers_distance(&lhs, &rhs).unwrap();
    assert!((d - 3.0).abs() < 1e-9);
}

#[test]
fn test_emd_is_symmetric() {
    let lhs = sample_with(vec![vec![placement(0, 0.6), placement(3, 0.4)]]);
    let rhs = sample_with(vec![vec![placement(1, 0.5), placement(2, 0.5)]]);
    let ab = earth_movers_distance(&lhs, &rhs).unwrap();
    let ba = earth_movers_distance(&rhs, &lhs).unwrap();
    assert!((ab - ba).abs() < 1e-12);
    assert!(ab > 0.0);
}

#[test]
fn test_emd_rejects_different_topologies() {
    let lhs = sample_with(vec![vec![placement(0, 1.0)]]);
    let tree = newick::parse("(A:1{0},B:1{1},C:1{2},D:1{3});").unwrap();
    let rhs = Sample::new(tree);
    assert!(earth_movers_distance(&lhs, &rhs).is_none());
}

#[test]
fn test_emd_of_empty_trees_is_zero() {
    use phylomass::tree::Tree;
    let lhs = Sample::new(Tree::empty());
    let rhs = Sample::new(Tree::empty());
    assert_eq!(earth_movers_distance(&lhs, &rhs), Some(0.0));
}

#[test]
fn test_emd_member_form_matches() {
    let lhs = sample_with(vec![vec![placement(0, 1.0)]]);
    let rhs = sample_with(vec![vec![placement(1, 1.0)]]);
    assert_eq!(lhs.earth_movers_distance(&rhs), earth_movers_distance(&lhs, &rhs));
}

// ============= Center Of Gravity Tests =============

#[test]
fn test_cog_of_single_mass_is_its_midpoint() {
    // All mass on C's branch; its mass sits at the branch midpoint.
    let smp = sample_with(vec![vec![placement(3, 1.0)]]);
    let (edge, offset) = center_of_gravity(&smp).unwrap();
    assert_eq!(smp.tree().edge(edge).edge_num(), 3);
    assert!((offset - 0.5).abs() < 1e-9);
}

#[test]
fn test_cog_of_balanced_siblings_is_their_parent_node() {
    // Equal mass on A's and B's branch balances at the inner node.
    let smp = sample_with(vec![
        vec![placement(0, 1.0)],
        vec![placement(1, 1.0)],
    ]);
    let (edge, offset) = center_of_gravity(&smp).unwrap();
    assert_eq!(offset, 0.0);
    // The balancing node is the proximal end of the reported edge, which
    // must be one of the two leaf branches.
    let num = smp.tree().edge(edge).edge_num();
    assert!(num == 0 || num == 1);
}

#[test]
fn test_cog_none_for_empty_sample() {
    let smp = sample_with(vec![]);
    assert!(center_of_gravity(&smp).is_none());
}

// ============= Variance Tests =============

#[test]
fn test_variance_of_point_mass_is_zero() {
    let smp = sample_with(vec![vec![placement(3, 1.0)]]);
    let v = variance(&smp).unwrap();
    assert!(v.abs() < 1e-12);
}

#[test]
fn test_variance_of_balanced_siblings() {
    // COG at the inner node; both masses sit half a branch away, so the
    // mass-weighted variance is 0.5^2.
    let smp = sample_with(vec![
        vec![placement(0, 1.0)],
        vec![placement(1, 1.0)],
    ]);
    let v = variance(&smp).unwrap();
    assert!((v - 0.25).abs() < 1e-9);
}

#[test]
fn test_variance_none_for_empty_sample() {
    let smp = sample_with(vec![]);
    assert!(variance(&smp).is_none());
}
