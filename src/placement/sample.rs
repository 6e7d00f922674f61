//! A collection of placement queries on a reference tree.

use crate::parser::parse_error::ParseError;
use crate::placement::pquery::Pquery;
use crate::tree::Tree;
use crate::tree::element::{EdgeIndex, EdgeNum};
use std::collections::{BTreeMap, HashMap};

// =#========================================================================#=
// SAMPLE
// =#========================================================================#=
/// A set of [Pquery] records placed on one reference [Tree], plus free-form
/// string metadata.
///
/// The tree is immutable once inside a sample; placements back-reference
/// edges by index, and the `edge_num -> edge` lookup table is built once at
/// construction time.
///
/// # Invariant
/// Every placement's `edge_num` resolves to an edge of the owned tree;
/// [add_pquery](Sample::add_pquery) enforces this and fails on violation
/// instead of silently dropping the placement.
#[derive(Debug, Clone)]
pub struct Sample {
    tree: Tree,
    pqueries: Vec<Pquery>,
    metadata: BTreeMap<String, String>,
    edge_num_map: HashMap<EdgeNum, EdgeIndex>,
}

impl Sample {
    /// Creates an empty sample on the given tree.
    pub fn new(tree: Tree) -> Self {
        let edge_num_map = build_edge_num_map(&tree);
        Sample { tree, pqueries: Vec::new(), metadata: BTreeMap::new(), edge_num_map }
    }

    /// Returns the reference tree of this sample.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Returns the pqueries of this sample, in insertion order.
    pub fn pqueries(&self) -> &[Pquery] {
        &self.pqueries
    }

    /// Returns the number of pqueries in this sample.
    pub fn pquery_count(&self) -> usize {
        self.pqueries.len()
    }

    /// Returns the metadata of this sample.
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Sets one metadata entry.
    pub fn set_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), value.to_string());
    }

    /// Returns the mapping from external `edge_num` to edge index in the
    /// owned tree.
    pub fn edge_num_map(&self) -> &HashMap<EdgeNum, EdgeIndex> {
        &self.edge_num_map
    }

    /// Appends a pquery, resolving every placement's `edge_num` against the
    /// owned tree.
    ///
    /// # Errors
    /// Fails with `UnresolvedEdgeNum` if any placement references an edge
    /// number not present in the tree; the sample is left unchanged.
    pub fn add_pquery(&mut self, mut pquery: Pquery) -> Result<(), ParseError> {
        for placement in &mut pquery.placements {
            match self.edge_num_map.get(&placement.edge_num) {
                Some(&edge) => placement.edge = edge,
                None => return Err(ParseError::unresolved_edge_num(placement.edge_num)),
            }
        }
        self.pqueries.push(pquery);
        Ok(())
    }

    /// Appends a pquery whose placements already carry resolved edge
    /// indices for this sample's tree. No edge num lookup is performed.
    pub(crate) fn push_resolved(&mut self, pquery: Pquery) {
        self.pqueries.push(pquery);
    }

    /// Merges another sample into this one.
    ///
    /// Requires both samples' trees to have identical topology and every
    /// incoming `edge_num` to resolve against this sample's tree; the other
    /// sample's pqueries are re-pointed to this sample's edges through the
    /// edge num map and appended, and its metadata entries are unioned in
    /// (existing keys win).
    ///
    /// # Errors
    /// If the topologies differ, or any incoming placement references an
    /// edge number absent from this sample's tree, both samples are left
    /// unchanged and `other` is handed back to the caller through the
    /// error side.
    pub fn merge(&mut self, other: Sample) -> Result<(), Sample> {
        if !Tree::has_identical_topology(&self.tree, &other.tree) {
            tracing::warn!("cannot merge samples: tree topologies differ");
            return Err(other);
        }

        // Identical topology does not guarantee identical edge num tags;
        // every incoming placement must resolve before anything is mutated.
        let unresolved = other
            .pqueries
            .iter()
            .flat_map(|pquery| &pquery.placements)
            .map(|placement| placement.edge_num)
            .find(|num| !self.edge_num_map.contains_key(num));
        if let Some(edge_num) = unresolved {
            tracing::warn!(edge_num, "cannot merge samples: edge num not present in target tree");
            return Err(other);
        }

        for mut pquery in other.pqueries {
            for placement in &mut pquery.placements {
                placement.edge = self.edge_num_map[&placement.edge_num];
            }
            self.pqueries.push(pquery);
        }
        for (key, value) in other.metadata {
            self.metadata.entry(key).or_insert(value);
        }
        Ok(())
    }

    /// For each pquery, keeps only the placement with the greatest
    /// `like_weight_ratio`.
    ///
    /// Converts probabilistic placements to best-hit placements for
    /// algorithms that assume one position per query.
    pub fn restrain_to_max_weight_placements(&mut self) {
        for pquery in &mut self.pqueries {
            pquery.restrain_to_max_weight_placement();
        }
    }

    /// Returns the total number of placements across all pqueries.
    pub fn placement_count(&self) -> usize {
        self.pqueries.iter().map(|p| p.placements.len()).sum()
    }

    /// Returns the sum of `like_weight_ratio` over all placements of all
    /// pqueries.
    ///
    /// If every pquery's ratios are normalized this is close to the pquery
    /// count; useful as a sanity check.
    pub fn placement_mass(&self) -> f64 {
        self.pqueries.iter().map(|p| p.weight_ratio_sum()).sum()
    }

    /// Rescales every pquery's `like_weight_ratio` values to sum to 1.
    pub fn normalize_weight_ratios(&mut self) {
        for pquery in &mut self.pqueries {
            pquery.normalize_weight_ratios();
        }
    }

    /// Returns the total normalized placement mass per edge, indexed by
    /// edge.
    ///
    /// This is the distribution the mass algorithms operate on: every
    /// pquery contributes its per-pquery-normalized ratios to the edges its
    /// placements attach to.
    pub fn mass_per_edge(&self) -> Vec<f64> {
        let mut masses = vec![0.0; self.tree.edge_count()];
        for pquery in &self.pqueries {
            let ratios = pquery.normalized_ratios();
            for (placement, ratio) in pquery.placements.iter().zip(ratios) {
                masses[placement.edge] += ratio;
            }
        }
        masses
    }

    /// Validates the placement data of this sample.
    ///
    /// Checks that every placement's edge back-reference is in bounds and
    /// agrees with its `edge_num`, and that every `like_weight_ratio` is in
    /// [0, 1].
    ///
    /// # Returns
    /// `true` if the sample is valid; `false` otherwise, with the first
    /// violation logged as a warning.
    pub fn validate(&self) -> bool {
        for (i, pquery) in self.pqueries.iter().enumerate() {
            for placement in &pquery.placements {
                if placement.edge >= self.tree.edge_count() {
                    tracing::warn!(pquery = i, edge = placement.edge, "placement edge out of bounds");
                    return false;
                }
                if self.tree.edge(placement.edge).edge_num() != placement.edge_num {
                    tracing::warn!(
                        pquery = i,
                        edge_num = placement.edge_num,
                        "placement edge num disagrees with its resolved edge"
                    );
                    return false;
                }
                if !(0.0..=1.0).contains(&placement.like_weight_ratio) {
                    tracing::warn!(
                        pquery = i,
                        ratio = placement.like_weight_ratio,
                        "like_weight_ratio outside [0, 1]"
                    );
                    return false;
                }
            }
        }
        true
    }

    /// Returns a textual dump of this sample's pqueries for debugging.
    pub fn dump(&self) -> String {
        let mut out = format!(
            "Sample with {} pqueries, {} placements\n",
            self.pqueries.len(),
            self.placement_count()
        );
        for pquery in &self.pqueries {
            let names: Vec<&str> = pquery.names.iter().map(|n| n.name.as_str()).collect();
            out.push_str(&format!("{}\n", names.join(", ")));
            for placement in &pquery.placements {
                out.push_str(&format!(
                    "  edge_num {}, likelihood {}, like_weight_ratio {}\n",
                    placement.edge_num, placement.likelihood, placement.like_weight_ratio
                ));
            }
        }
        out
    }
}

/// Builds the `edge_num -> edge index` lookup table with a single pass over
/// the tree's edges.
fn build_edge_num_map(tree: &Tree) -> HashMap<EdgeNum, EdgeIndex> {
    let mut map = HashMap::with_capacity(tree.edge_count());
    for edge in tree.edges() {
        map.insert(edge.edge_num(), edge.index());
    }
    map
}
