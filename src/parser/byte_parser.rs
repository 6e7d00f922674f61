//! Low-level byte-by-byte parser for text formats with ASCII structure.
//!
//! Provides [ByteParser] for parsing text-based formats with support for
//! peeking, consuming, quote-aware label parsing and numeric reads. All
//! structural characters are ASCII; label content is decoded as UTF-8, so
//! non-ASCII taxon names pass through intact. Used as the foundation for
//! the Newick parser; jplace hands its embedded Newick string over as an
//! in-memory slice, so no buffered source is needed.

use crate::parser::parse_error::ParseError;

// =#========================================================================#=
// BYTE PARSER
// =#========================================================================#=
/// A byte-by-byte parser over an in-memory input with ASCII structural
/// characters and UTF-8 label content.
///
/// # Features
/// - Peek and consume operations with position tracking
/// - Whitespace and square-bracket comment skipping
/// - Quote-aware label parsing (single quotes with `''` escaping)
/// - Numeric reads for branch lengths and edge numbers
/// - Context extraction for error reporting
///
/// # Example
/// ```
/// use phylomass::parser::ByteParser;
///
/// let mut parser = ByteParser::from_str("(A:1.0,B:1.0);");
/// assert!(parser.consume_if(b'('));
/// assert_eq!(parser.peek(), Some(b'A'));
/// ```
pub struct ByteParser<'a> {
    input: &'a [u8],
    position: usize,
}

impl<'a> ByteParser<'a> {
    /// Creates a new `ByteParser` over a byte slice.
    pub fn from_bytes(input: &'a [u8]) -> Self {
        Self { input, position: 0 }
    }

    /// Creates a new `ByteParser` over a string slice.
    pub fn from_str(input: &'a str) -> Self {
        Self::from_bytes(input.as_bytes())
    }

    /// Peeks at the current byte without consuming it.
    ///
    /// # Returns
    /// * `Some(u8)` - The current byte if available
    /// * `None` - If at end of data (EOF)
    #[inline(always)]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.position).copied()
    }

    /// Gets the current byte and advances the position (consumes it).
    #[inline(always)]
    pub fn next(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.position += 1;
        Some(b)
    }

    /// Skips (consumes) all consecutive whitespace characters.
    ///
    /// Whitespace includes: space, tab, newline and carriage return.
    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b == b' ' || b == b'\t' || b == b'\n' || b == b'\r' {
                self.position += 1;
            } else {
                break;
            }
        }
    }

    /// Skips (consumes) a square-bracket comment if present.
    ///
    /// # Returns
    /// * `Ok(true)` - A comment was found and consumed
    /// * `Ok(false)` - No comment at current position
    /// * `Err(ParseError)` - Comment was opened but never closed
    pub fn skip_comment(&mut self) -> Result<bool, ParseError> {
        if self.consume_if(b'[') {
            while let Some(b) = self.next() {
                if b == b']' {
                    return Ok(true);
                }
            }
            return Err(ParseError::unclosed_comment(self));
        }
        Ok(false)
    }

    /// Skips (consumes) all consecutive whitespace and comments.
    ///
    /// # Errors
    /// Returns an error if an unclosed comment is encountered.
    pub fn skip_comment_and_whitespace(&mut self) -> Result<(), ParseError> {
        self.skip_whitespace();
        while self.skip_comment()? {
            self.skip_whitespace();
        }
        Ok(())
    }

    /// Consumes the current byte if it matches the target byte.
    ///
    /// # Returns
    /// `true` if the byte was matched and consumed, `false` otherwise
    pub fn consume_if(&mut self, ch: u8) -> bool {
        if self.peek() == Some(ch) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Returns whether the end of data (EOF) has been reached.
    pub fn is_eof(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Returns the current parser position in the input.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns a string of up to `k` bytes from the current position, for
    /// error context. Invalid UTF-8 is replaced with the replacement
    /// character.
    pub fn get_context_as_string(&self, k: usize) -> String {
        let end = (self.position + k).min(self.input.len());
        String::from_utf8_lossy(&self.input[self.position..end]).into_owned()
    }

    /// Parses a label (quoted or unquoted) with the given delimiter set.
    ///
    /// Detects whether the label is enclosed in single quotes and calls the
    /// appropriate parsing method.
    ///
    /// # Arguments
    /// * `delimiters` - Bytes that end an unquoted label
    ///
    /// # Errors
    /// Returns an error if quote or comment parsing fails.
    pub fn parse_label(&mut self, delimiters: &[u8]) -> Result<String, ParseError> {
        self.skip_comment_and_whitespace()?;

        if self.peek() == Some(b'\'') {
            self.parse_quoted_label()
        } else {
            Ok(self.parse_unquoted_label(delimiters))
        }
    }

    /// Parses a quoted label enclosed in single quotes with escape support.
    ///
    /// Assumes the opening quote has not been consumed yet. Single quotes
    /// within the label are escaped by doubling them (`'Wilson''s'` becomes
    /// `Wilson's`).
    ///
    /// # Errors
    /// Returns an error if the quoted label is not properly closed.
    pub fn parse_quoted_label(&mut self) -> Result<String, ParseError> {
        self.next(); // consume opening '

        let mut bytes = Vec::new();
        loop {
            match self.next() {
                Some(b'\'') => {
                    // Escaped quote: two single quotes in a row.
                    if self.peek() == Some(b'\'') {
                        bytes.push(b'\'');
                        self.next();
                    } else {
                        return Ok(String::from_utf8_lossy(&bytes).into_owned());
                    }
                }
                Some(b) => bytes.push(b),
                None => return Err(ParseError::unexpected_eof(self)),
            }
        }
    }

    /// Parses an unquoted label until any of the given delimiters is
    /// encountered. Delimiters are ASCII bytes, so the byte-wise scan never
    /// splits a multi-byte UTF-8 sequence.
    pub fn parse_unquoted_label(&mut self, delimiters: &[u8]) -> String {
        let start = self.position;
        while let Some(b) = self.peek() {
            if delimiters.contains(&b) {
                break;
            }
            self.position += 1;
        }
        String::from_utf8_lossy(&self.input[start..self.position]).into_owned()
    }

    /// Parses a floating point number at the current position.
    ///
    /// Accepts an optional sign, decimal point and exponent.
    ///
    /// # Errors
    /// Returns an error if no valid number starts at the current position.
    pub fn parse_f64(&mut self) -> Result<f64, ParseError> {
        let start = self.position;
        if self.peek() == Some(b'-') || self.peek() == Some(b'+') {
            self.position += 1;
        }
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() || b == b'.' {
                self.position += 1;
            } else {
                break;
            }
        }
        if self.peek() == Some(b'e') || self.peek() == Some(b'E') {
            self.position += 1;
            if self.peek() == Some(b'-') || self.peek() == Some(b'+') {
                self.position += 1;
            }
            while let Some(b) = self.peek() {
                if b.is_ascii_digit() {
                    self.position += 1;
                } else {
                    break;
                }
            }
        }

        let text = std::str::from_utf8(&self.input[start..self.position]).unwrap_or("");
        text.parse::<f64>().map_err(|_| ParseError::invalid_number(self, text.to_string()))
    }

    /// Parses a (possibly signed) integer at the current position.
    ///
    /// # Errors
    /// Returns an error if no valid integer starts at the current position.
    pub fn parse_i64(&mut self) -> Result<i64, ParseError> {
        let start = self.position;
        if self.peek() == Some(b'-') || self.peek() == Some(b'+') {
            self.position += 1;
        }
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() {
                self.position += 1;
            } else {
                break;
            }
        }

        let text = std::str::from_utf8(&self.input[start..self.position]).unwrap_or("");
        text.parse::<i64>().map_err(|_| ParseError::invalid_number(self, text.to_string()))
    }
}
