use std::collections::BTreeMap;
use std::fs;

use phylomass::newick;
use phylomass::placement::{
    DEFAULT_THRESHOLD, Pquery, PqueryName, PqueryPlacement, Sample, partition_by_clades,
    read_clade_directory,
};

fn placement(edge_num: i64, like_weight_ratio: f64) -> PqueryPlacement {
    PqueryPlacement { edge_num, like_weight_ratio, ..PqueryPlacement::default() }
}

/// Two cherries: clade {A,B} lives on edge nums 0 and 1, clade {C,D} on 3
/// and 4; the branches 2 and 5 connect the cherries to the root.
fn four_leaf_sample() -> Sample {
    let tree = newick::parse("((A:1{0},B:1{1}):1{2},(C:1{3},D:1{4}):1{5});").unwrap();
    Sample::new(tree)
}

fn two_clades() -> BTreeMap<String, Vec<String>> {
    let mut clades = BTreeMap::new();
    clades.insert("AB".to_string(), vec!["A".to_string(), "B".to_string()]);
    clades.insert("CD".to_string(), vec!["C".to_string(), "D".to_string()]);
    clades
}

fn add(smp: &mut Sample, name: &str, placements: Vec<PqueryPlacement>) {
    smp.add_pquery(Pquery::new(placements, vec![PqueryName::new(name, 0.0)])).unwrap();
}

// ============= Partition Tests =============

#[test]
fn test_dominant_mass_goes_to_its_clade() {
    let mut smp = four_leaf_sample();
    add(&mut smp, "q", vec![placement(0, 0.97), placement(3, 0.03)]);

    let parts = partition_by_clades(&smp, &two_clades(), DEFAULT_THRESHOLD);
    assert_eq!(parts["AB"].pquery_count(), 1);
    assert_eq!(parts["CD"].pquery_count(), 0);
    assert_eq!(parts["uncertain"].pquery_count(), 0);
    assert_eq!(parts["basal_branches"].pquery_count(), 0);
}

#[test]
fn test_split_mass_is_uncertain() {
    let mut smp = four_leaf_sample();
    add(&mut smp, "q", vec![placement(0, 0.60), placement(3, 0.40)]);

    let parts = partition_by_clades(&smp, &two_clades(), DEFAULT_THRESHOLD);
    assert_eq!(parts["AB"].pquery_count(), 0);
    assert_eq!(parts["CD"].pquery_count(), 0);
    assert_eq!(parts["uncertain"].pquery_count(), 1);
}

#[test]
fn test_backbone_mass_is_basal() {
    let mut smp = four_leaf_sample();
    // The branch between a cherry and the root belongs to no clade.
    add(&mut smp, "q", vec![placement(2, 1.0)]);

    let parts = partition_by_clades(&smp, &two_clades(), DEFAULT_THRESHOLD);
    assert_eq!(parts["AB"].pquery_count(), 0);
    assert_eq!(parts["basal_branches"].pquery_count(), 1);
}

#[test]
fn test_partition_covers_every_pquery_once() {
    let mut smp = four_leaf_sample();
    add(&mut smp, "q1", vec![placement(0, 1.0)]);
    add(&mut smp, "q2", vec![placement(3, 0.5), placement(4, 0.5)]);
    add(&mut smp, "q3", vec![placement(5, 0.9), placement(1, 0.1)]);
    add(&mut smp, "q4", vec![placement(0, 0.5), placement(3, 0.5)]);

    let parts = partition_by_clades(&smp, &two_clades(), DEFAULT_THRESHOLD);
    let total: usize = parts.values().map(|p| p.pquery_count()).sum();
    assert_eq!(total, smp.pquery_count());
    assert_eq!(parts["AB"].pquery_count(), 1);
    // q2's mass sums to 1.0 inside {C,D} after normalization.
    assert_eq!(parts["CD"].pquery_count(), 1);
    assert_eq!(parts["uncertain"].pquery_count(), 2);
}

#[test]
fn test_output_samples_keep_the_full_tree() {
    let mut smp = four_leaf_sample();
    add(&mut smp, "q", vec![placement(0, 1.0)]);

    let parts = partition_by_clades(&smp, &two_clades(), DEFAULT_THRESHOLD);
    for part in parts.values() {
        assert_eq!(part.tree().edge_count(), smp.tree().edge_count());
        assert!(part.validate());
    }
}

#[test]
fn test_missing_taxon_is_skipped() {
    let mut smp = four_leaf_sample();
    add(&mut smp, "q", vec![placement(0, 1.0)]);

    let mut clades = BTreeMap::new();
    // "X" is not in the tree; the clade degrades to the single taxon A.
    clades.insert("AX".to_string(), vec!["A".to_string(), "X".to_string()]);

    let parts = partition_by_clades(&smp, &clades, DEFAULT_THRESHOLD);
    assert_eq!(parts["AX"].pquery_count(), 1);
}

#[test]
fn test_lower_threshold_claims_split_mass() {
    let mut smp = four_leaf_sample();
    add(&mut smp, "q", vec![placement(0, 0.60), placement(3, 0.40)]);

    let parts = partition_by_clades(&smp, &two_clades(), 0.5);
    assert_eq!(parts["AB"].pquery_count(), 1);
    assert_eq!(parts["uncertain"].pquery_count(), 0);
}

// ============= Clade Directory Tests =============

#[test]
fn test_read_clade_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("AB.txt"), "A\nB\n").unwrap();
    fs::write(dir.path().join("CD.txt"), "C\n\n  D  \n").unwrap();

    let clades = read_clade_directory(dir.path()).unwrap();
    assert_eq!(clades.len(), 2);
    assert_eq!(clades["AB"], vec!["A", "B"]);
    // Blank lines are dropped, names are trimmed.
    assert_eq!(clades["CD"], vec!["C", "D"]);
}

#[test]
fn test_read_clade_directory_rejects_reserved_name() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("uncertain.txt"), "A\n").unwrap();
    assert!(read_clade_directory(dir.path()).is_err());
}

#[test]
fn test_read_empty_clade_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(read_clade_directory(dir.path()).is_err());
}
