//! Reading and writing of the jplace placement file format, version 3.
//!
//! A jplace document is a JSON object carrying a Newick tree annotated
//! with `{N}` edge numbers, a list of placement entries referring to those
//! numbers, a `fields` array naming the columns of each placement row, a
//! format version, and free-form metadata.

pub mod reader;
pub mod writer;

pub use reader::{JplaceReader, read_file};
pub use writer::{JplaceWriter, write_file};

/// The jplace format version this crate reads and writes.
pub const JPLACE_VERSION: i64 = 3;
