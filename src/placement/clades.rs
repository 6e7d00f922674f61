//! Partitioning of a sample's pqueries into named clades.
//!
//! A clade is given as an unordered set of taxon names (leaf labels). For
//! each clade the partitioner computes the minimal edge-induced subtree
//! containing exactly the clade's leaves, then classifies every pquery by
//! the placement mass it accumulates inside each clade's edge set.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rayon::prelude::*;

use crate::parser::{ParseError, ParseErrorKind};
use crate::placement::sample::Sample;
use crate::tree::Tree;
use crate::tree::element::NodeIndex;

/// Default classification threshold: a pquery belongs to a clade if at
/// least this share of its normalized placement mass falls inside it.
pub const DEFAULT_THRESHOLD: f64 = 0.95;

/// Reserved output name for placement mass outside every clade.
pub const BASAL_BRANCHES: &str = "basal_branches";

/// Reserved output name for pqueries no clade claims with enough mass.
pub const UNCERTAIN: &str = "uncertain";

// =#========================================================================#=
// CLADE DIRECTORY READER
// =#========================================================================#=
/// Reads clade definitions from a directory of plain-text files.
///
/// Every regular file in the directory defines one clade: the file stem is
/// the clade name, and each non-empty line names one taxon. Blank lines
/// and lines starting with `#` are skipped; subdirectories are ignored.
///
/// # Errors
/// Fails with `InvalidCladeDirectory` if the directory cannot be read, a
/// file is not valid UTF-8, or a clade uses one of the reserved names
/// `basal_branches` / `uncertain`.
pub fn read_clade_directory(path: &Path) -> Result<BTreeMap<String, Vec<String>>, ParseError> {
    let invalid = |message: String| {
        ParseError::without_context(ParseErrorKind::InvalidCladeDirectory(message))
    };

    let mut clades = BTreeMap::new();
    let entries = fs::read_dir(path)
        .map_err(|e| invalid(format!("cannot read clade directory {}: {}", path.display(), e)))?;
    for entry in entries {
        let entry =
            entry.map_err(|e| invalid(format!("cannot read clade directory entry: {}", e)))?;
        let file = entry.path();
        if !file.is_file() {
            continue;
        }
        let name = match file.file_stem().and_then(|s| s.to_str()) {
            Some(stem) if !stem.is_empty() => stem.to_string(),
            _ => {
                tracing::warn!(file = %file.display(), "skipping clade file without a usable name");
                continue;
            }
        };
        if name == BASAL_BRANCHES || name == UNCERTAIN {
            return Err(invalid(format!("clade name '{}' is reserved", name)));
        }
        let content = fs::read_to_string(&file)
            .map_err(|e| invalid(format!("cannot read clade file {}: {}", file.display(), e)))?;
        let taxa: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        clades.insert(name, taxa);
    }

    if clades.is_empty() {
        return Err(invalid(format!("no clade files found in {}", path.display())));
    }
    Ok(clades)
}

// =#========================================================================#=
// PARTITIONER
// =#========================================================================#=
/// Splits a sample into one sample per clade, plus the two reserved
/// samples [BASAL_BRANCHES] and [UNCERTAIN].
///
/// Every output sample carries a clone of the full tree, so edge numbers
/// stay interpretable downstream, but only the pqueries assigned to it. A
/// pquery is assigned to the clade (or to the basal branches) that holds
/// at least `threshold` of its normalized placement mass, and to
/// `uncertain` when none does. Taxa absent from the tree are warned about
/// and skipped; an edge claimed by more than one clade stays with the
/// first claimant and is warned about, since overlapping clades indicate a
/// non-monophyletic definition.
pub fn partition_by_clades(
    smp: &Sample,
    clades: &BTreeMap<String, Vec<String>>,
    threshold: f64,
) -> BTreeMap<String, Sample> {
    let tree = smp.tree();
    let names: Vec<&String> = clades.keys().collect();
    let basal = names.len();
    let uncertain = names.len() + 1;

    // Edge index to bucket index; unclaimed edges stay basal.
    let mut edge_bucket = vec![basal; tree.edge_count()];
    for (bucket, name) in names.iter().enumerate() {
        let leaves = resolve_taxa(tree, name.as_str(), &clades[*name]);
        for edge in clade_edges(tree, &leaves) {
            if edge_bucket[edge] != basal {
                tracing::warn!(
                    clade = %name,
                    other = %names[edge_bucket[edge]],
                    edge,
                    "edge claimed by two clades; keeping the first (clades overlap?)"
                );
                continue;
            }
            edge_bucket[edge] = bucket;
        }
    }

    // Classification is independent per pquery over the shared table.
    let choices: Vec<usize> = smp
        .pqueries()
        .par_iter()
        .map(|pquery| {
            let ratios = pquery.normalized_ratios();
            let mut mass = vec![0.0; basal + 1];
            for (placement, ratio) in pquery.placements.iter().zip(&ratios) {
                mass[edge_bucket[placement.edge]] += *ratio;
            }
            mass.iter()
                .position(|&m| m >= threshold)
                .unwrap_or(uncertain)
        })
        .collect();

    let mut output: Vec<Sample> = (0..uncertain + 1).map(|_| Sample::new(tree.clone())).collect();
    for (pquery, &bucket) in smp.pqueries().iter().zip(&choices) {
        output[bucket].push_resolved(pquery.clone());
    }

    let mut result = BTreeMap::new();
    for (bucket, sample) in output.into_iter().enumerate() {
        let name = match bucket {
            b if b == basal => BASAL_BRANCHES.to_string(),
            b if b == uncertain => UNCERTAIN.to_string(),
            b => names[b].clone(),
        };
        result.insert(name, sample);
    }
    result
}

/// Resolves taxon names to leaf node indices, warning about and skipping
/// names absent from the tree.
fn resolve_taxa(tree: &Tree, clade: &str, taxa: &[String]) -> Vec<NodeIndex> {
    let mut leaves = Vec::with_capacity(taxa.len());
    for taxon in taxa {
        let found = tree
            .nodes()
            .find(|node| tree.is_leaf(node.index()) && node.name() == taxon.as_str());
        match found {
            Some(node) => leaves.push(node.index()),
            None => {
                tracing::warn!(clade, taxon = %taxon, "taxon not found in tree; skipping");
            }
        }
    }
    leaves
}

/// Computes the minimal connected edge set covering exactly the given
/// leaves: one postorder pass counts clade leaves and total leaves per
/// subtree, and an edge is inside iff every leaf below it is a clade leaf
/// and there is at least one. The branch above the subtree holding the
/// whole clade connects the clade to the backbone and is not part of the
/// set, except for a single-taxon clade, which keeps its leaf branch.
fn clade_edges(tree: &Tree, leaves: &[NodeIndex]) -> Vec<usize> {
    let mut in_clade = vec![false; tree.node_count()];
    for &leaf in leaves {
        in_clade[leaf] = true;
    }

    // Per node: (clade leaves below, all leaves below), the node itself
    // included if it is a leaf.
    let mut counts = vec![(0usize, 0usize); tree.node_count()];
    for node in tree.nodes() {
        if tree.is_leaf(node.index()) {
            counts[node.index()] = (in_clade[node.index()] as usize, 1);
        }
    }

    let mut edges = Vec::new();
    for visit in tree.postorder() {
        let edge = visit.edge();
        if visit.link().index() != edge.secondary_link() {
            continue;
        }
        let child = counts[visit.node().index()];
        if child.0 == child.1 && child.0 > 0 && (child.0 < leaves.len() || leaves.len() == 1) {
            edges.push(edge.index());
        }
        let parent = tree.link(edge.primary_link()).node();
        counts[parent].0 += child.0;
        counts[parent].1 += child.1;
    }
    edges
}
