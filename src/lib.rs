//! Phylomass is a library for analyzing phylogenetic placement data.
//!
//! This crate provides an indexed half-edge tree structure together with
//! the placement model of the jplace file format, and algorithms that
//! compare and partition the placement mass distributions queries induce
//! on a reference tree. Core functionality provided:
//! - Tree engine: arena-pattern tree of nodes, edges, and half-edge links,
//!   with preorder, postorder, and levelorder traversal iterators,
//!   structural queries, and validation. See [crate::tree].
//! - Placement model: [Pquery](crate::placement::Pquery) records
//!   (placements plus names) aggregated into a [Sample] together with the
//!   tree they are placed on.
//! - Mass measures: earth mover's distance between two samples, center of
//!   gravity, and variance of a mass distribution. See
//!   [crate::placement::measures].
//! - Clade partitioner: splits a sample into per-clade samples by
//!   accumulated placement mass against a threshold. See
//!   [crate::placement::clades].
//! - Formats: Newick strings with jplace `{N}` edge number tags, and
//!   jplace version 3 documents. See [crate::newick] and [crate::jplace].
//!
//! Limitations:
//! - Placement likelihoods and branch lengths are taken as given; no
//!   alignment, likelihood computation, or tree search is performed.
//! - Trees are immutable once built; re-rooting and topology edits are
//!   not supported.
//!
//! # Usage patterns
//! 1. Several methods provide quick access with default settings, see the
//!    re-exports below and [crate::newick] / [crate::jplace].
//! 2. Use [NewickParser](crate::newick::NewickParser),
//!    [JplaceReader](crate::jplace::JplaceReader), and
//!    [TreeBuilder](crate::tree::TreeBuilder) directly for full control.
//!
//! ## Example
//!
//! Read a jplace document and partition its pqueries into clades:
//! ```no_run
//! use std::collections::BTreeMap;
//! use phylomass::placement::{DEFAULT_THRESHOLD, partition_by_clades};
//!
//! let sample = phylomass::read_jplace_file("placements.jplace")?;
//! let mut clades = BTreeMap::new();
//! clades.insert("crustacea".to_string(), vec!["Daphnia".to_string()]);
//!
//! let partition = partition_by_clades(&sample, &clades, DEFAULT_THRESHOLD);
//! for (name, part) in &partition {
//!     println!("{}: {} pqueries", name, part.pquery_count());
//! }
//! # Ok::<(), phylomass::parser::ParseError>(())
//! ```

pub mod jplace;
pub mod newick;
pub mod parser;
pub mod placement;
pub mod tree;

use std::path::Path;

use crate::parser::ParseError;
use crate::placement::Sample;
use crate::tree::Tree;

// ============================================================================
// Quick Newick API
// ============================================================================
/// Parses a Newick string using default settings, returning a [Tree].
///
/// See [`newick::parse`] for full documentation of this convenience function.
pub fn parse_newick_str<S: AsRef<str>>(input: S) -> Result<Tree, ParseError> {
    newick::parse(input.as_ref())
}

// ============================================================================
// Quick jplace API
// ============================================================================
/// Reads a jplace file using default settings, returning a [Sample].
///
/// See [`jplace::read_file`] for full documentation of this convenience function.
pub fn read_jplace_file<P: AsRef<Path>>(path: P) -> Result<Sample, ParseError> {
    jplace::read_file(path.as_ref())
}

/// Writes a [Sample] to a jplace file using default settings. Returns
/// whether the file was written; an existing file is never overwritten.
///
/// See [`jplace::write_file`] for full documentation of this convenience function.
pub fn write_jplace_file<P: AsRef<Path>>(smp: &Sample, path: P) -> Result<bool, ParseError> {
    jplace::write_file(smp, path.as_ref())
}
