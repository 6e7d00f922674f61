//! Error types for the Newick, jplace and clade-file readers.
//!
//! This module provides [ParseError] and [ParseErrorKind] for representing
//! and reporting errors that occur while reading placement data.

use crate::parser::byte_parser::ByteParser;
use std::error::Error;
use std::fmt;

/// Default length of context provided by error from parser
const DEFAULT_CONTEXT_LENGTH: usize = 50;

// =#========================================================================#=
// PARSE ERROR KIND
// =#========================================================================#=
/// Error kinds that can occur while reading placement data.
#[derive(PartialEq, Debug, Clone)]
pub enum ParseErrorKind {
    IoError(String),
    UnexpectedEof,
    UnclosedComment,
    InvalidNewickString(String),
    InvalidNumber(String),
    InvalidTreeStructure(String),
    InvalidJplaceDocument(String),
    UnsupportedJplaceVersion(i64),
    InvalidJplaceFields(String),
    UnresolvedEdgeNum(i64),
    InvalidCladeDirectory(String),
}

// =#========================================================================#=
// PARSE ERROR
// =#========================================================================#=
/// Reader error with contextual information (position and surrounding
/// bytes) where a byte parser was involved.
#[derive(Debug)]
pub struct ParseError {
    kind: ParseErrorKind,
    position: usize,
    context: String,
}

impl ParseError {
    /// Create a ParseError from an error kind and parser state.
    pub fn from_parser(kind: ParseErrorKind, parser: &ByteParser<'_>) -> Self {
        Self {
            kind,
            position: parser.position(),
            context: parser.get_context_as_string(DEFAULT_CONTEXT_LENGTH),
        }
    }

    /// Convenience constructor for UnexpectedEof
    pub fn unexpected_eof(parser: &ByteParser<'_>) -> Self {
        Self::from_parser(ParseErrorKind::UnexpectedEof, parser)
    }

    /// Convenience constructor for UnclosedComment
    pub fn unclosed_comment(parser: &ByteParser<'_>) -> Self {
        Self::from_parser(ParseErrorKind::UnclosedComment, parser)
    }

    /// Convenience constructor for InvalidNewickString
    pub fn invalid_newick(parser: &ByteParser<'_>, msg: String) -> Self {
        Self::from_parser(ParseErrorKind::InvalidNewickString(msg), parser)
    }

    /// Convenience constructor for InvalidNumber
    pub fn invalid_number(parser: &ByteParser<'_>, text: String) -> Self {
        Self::from_parser(ParseErrorKind::InvalidNumber(text), parser)
    }

    /// Create a ParseError without parser context.
    pub fn without_context(kind: ParseErrorKind) -> Self {
        Self { kind, position: 0, context: String::new() }
    }

    /// Convenience constructor for UnresolvedEdgeNum
    pub fn unresolved_edge_num(edge_num: i64) -> Self {
        Self::without_context(ParseErrorKind::UnresolvedEdgeNum(edge_num))
    }

    /// Get the error kind
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// Get the position where the error occurred
    pub fn position(&self) -> usize {
        self.position
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Main error message
        match &self.kind {
            ParseErrorKind::IoError(msg) => write!(f, "IO error - {msg}")?,
            ParseErrorKind::UnexpectedEof => write!(f, "Unexpected end of input")?,
            ParseErrorKind::UnclosedComment => write!(f, "Unclosed comment")?,
            ParseErrorKind::InvalidNewickString(msg) => {
                write!(f, "Invalid Newick string: {msg}")?
            }
            ParseErrorKind::InvalidNumber(text) => write!(f, "Invalid number '{text}'")?,
            ParseErrorKind::InvalidTreeStructure(msg) => {
                write!(f, "Invalid tree structure: {msg}")?
            }
            ParseErrorKind::InvalidJplaceDocument(msg) => {
                write!(f, "Invalid jplace document: {msg}")?
            }
            ParseErrorKind::UnsupportedJplaceVersion(v) => {
                write!(f, "Unsupported jplace version {v}, expected 3")?
            }
            ParseErrorKind::InvalidJplaceFields(msg) => {
                write!(f, "Invalid jplace fields array: {msg}")?
            }
            ParseErrorKind::UnresolvedEdgeNum(num) => {
                write!(f, "Placement references edge_num {num} not present in the tree")?
            }
            ParseErrorKind::InvalidCladeDirectory(msg) => {
                write!(f, "Invalid clade directory: {msg}")?
            }
        }

        // Additional position information for parser errors
        if self.position != 0 || !self.context.is_empty() {
            write!(f, " at position {}", self.position)?;
        }
        if !self.context.is_empty() {
            write!(f, "\n  Context (next {} bytes): {}", self.context.len(), self.context)?;
        }

        Ok(())
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        ParseError::without_context(ParseErrorKind::IoError(err.to_string()))
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        ParseError::without_context(ParseErrorKind::InvalidJplaceDocument(err.to_string()))
    }
}
