//! Placement query records.
//!
//! A [Pquery] is one placement query (e.g. a sequenced read) with one or
//! more candidate attachment positions on a reference tree, plus one or
//! more names (multiple names occur when identical sequences were
//! dereplicated upstream).

use crate::tree::element::{EdgeIndex, EdgeNum};

// =#========================================================================#=
// PQUERY PLACEMENT
// =#========================================================================#=
/// One candidate attachment of a [Pquery] to a tree edge.
///
/// `edge` is a non-owning back-reference into the tree of the owning
/// [Sample](crate::placement::Sample), resolved from `edge_num` when the
/// pquery is attached; it makes per-edge mass aggregation O(1).
///
/// `distal_length` is the attachment position measured from the edge's
/// root-distal node; readers that encounter the proximal convention convert
/// with `branch_length - proximal_length` before constructing this record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PqueryPlacement {
    /// External edge identifier as given in the placement file
    pub edge_num: EdgeNum,
    /// Resolved edge in the sample's tree
    pub edge: EdgeIndex,
    /// Log-likelihood of this attachment
    pub likelihood: f64,
    /// Probability mass of this attachment, in [0, 1]
    pub like_weight_ratio: f64,
    /// Attachment position, measured from the root-distal end of the edge
    pub distal_length: f64,
    /// Length of the pendant branch to the query sequence
    pub pendant_length: f64,
    /// Parsimony score, 0 if not provided
    pub parsimony: i64,
}

// =#========================================================================#=
// PQUERY NAME
// =#========================================================================#=
/// A name of a [Pquery] with its multiplicity weight (0 if unspecified).
#[derive(Debug, Clone, PartialEq)]
pub struct PqueryName {
    /// The name label
    pub name: String,
    /// Abundance weight of this name; 0 when the input did not specify one
    pub multiplicity: f64,
}

impl PqueryName {
    /// Creates a name with the given multiplicity.
    pub fn new(name: &str, multiplicity: f64) -> Self {
        PqueryName { name: name.to_string(), multiplicity }
    }
}

// =#========================================================================#=
// PQUERY
// =#========================================================================#=
/// One placement query: an ordered collection of candidate placements plus
/// an ordered collection of names.
///
/// A pquery is only ever constructed fully populated; parsers assemble
/// placements and names first and append the finished record to a
/// [Sample](crate::placement::Sample).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pquery {
    /// Candidate placements, in input order
    pub placements: Vec<PqueryPlacement>,
    /// Names with multiplicities, in input order
    pub names: Vec<PqueryName>,
}

impl Pquery {
    /// Creates a pquery from its placements and names.
    pub fn new(placements: Vec<PqueryPlacement>, names: Vec<PqueryName>) -> Self {
        Pquery { placements, names }
    }

    /// Returns the sum of `like_weight_ratio` over all placements.
    pub fn weight_ratio_sum(&self) -> f64 {
        self.placements.iter().map(|p| p.like_weight_ratio).sum()
    }

    /// Returns the placements' `like_weight_ratio` values rescaled so they
    /// sum to 1, in placement order.
    ///
    /// Placement tools prune low-weight positions, so the stored ratios of
    /// a pquery may sum to less than 1; rescaling removes the bias this
    /// introduces into mass computations. If the stored sum is not positive
    /// the ratios are returned unchanged.
    pub fn normalized_ratios(&self) -> Vec<f64> {
        let sum = self.weight_ratio_sum();
        if sum > 0.0 {
            self.placements.iter().map(|p| p.like_weight_ratio / sum).collect()
        } else {
            self.placements.iter().map(|p| p.like_weight_ratio).collect()
        }
    }

    /// Rescales the stored `like_weight_ratio` values so they sum to 1.
    ///
    /// Mutating variant of [normalized_ratios](Pquery::normalized_ratios);
    /// does nothing if the current sum is not positive.
    pub fn normalize_weight_ratios(&mut self) {
        let sum = self.weight_ratio_sum();
        if sum > 0.0 {
            for placement in &mut self.placements {
                placement.like_weight_ratio /= sum;
            }
        }
    }

    /// Keeps only the single placement with the greatest
    /// `like_weight_ratio`, dropping all others.
    ///
    /// Does nothing for a pquery without placements.
    pub fn restrain_to_max_weight_placement(&mut self) {
        let best = self
            .placements
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| {
                a.like_weight_ratio
                    .partial_cmp(&b.like_weight_ratio)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i);
        if let Some(best) = best {
            let keep = self.placements.swap_remove(best);
            self.placements.clear();
            self.placements.push(keep);
        }
    }
}
