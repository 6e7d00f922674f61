//! Placement mass model: pqueries attached to tree edges, samples
//! aggregating them, and the algorithms that compare and partition
//! placement mass distributions.

/// Clade definitions and the pquery partitioner.
pub mod clades;
/// Earth mover's distance, center of gravity, variance.
pub mod measures;
/// Pquery, placement, and name records.
pub mod pquery;
/// Sample: a tree plus the pqueries placed on it.
pub mod sample;

pub use clades::{DEFAULT_THRESHOLD, partition_by_clades, read_clade_directory};
pub use measures::{center_of_gravity, earth_movers_distance, variance};
pub use pquery::{Pquery, PqueryName, PqueryPlacement};
pub use sample::Sample;
