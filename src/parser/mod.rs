//! Low-level parsing infrastructure shared by the format readers.

pub mod byte_parser;
pub mod parse_error;

pub use byte_parser::ByteParser;
pub use parse_error::{ParseError, ParseErrorKind};
