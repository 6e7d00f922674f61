//! Newick reading and writing, including jplace `{N}` edge number tags.

pub mod parser;
pub mod writer;

pub use parser::NewickParser;
pub use writer::{NewickFlavor, write};

use crate::parser::parse_error::ParseError;
use crate::tree::Tree;

/// Parses a single Newick string using default settings.
///
/// See [NewickParser] for the accepted grammar.
pub fn parse(input: &str) -> Result<Tree, ParseError> {
    NewickParser::new().parse(input)
}
