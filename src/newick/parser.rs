//! Parser for Newick strings with optional jplace edge-number tags.

use crate::parser::byte_parser::ByteParser;
use crate::parser::parse_error::{ParseError, ParseErrorKind};
use crate::tree::element::NodeIndex;
use crate::tree::{Tree, TreeBuilder};

/// Newick label delimiters: parentheses, comma, colon, semicolon, braces,
/// brackets, whitespace
const NEWICK_LABEL_DELIMITERS: &[u8] = b"(),:;{}[] \t\n\r";

/// Parser for Newick format phylogenetic [Tree]s.
///
/// Supports the plain Newick grammar with arbitrary node degrees, quoted
/// labels, square-bracket comments, and the jplace extension of edge-number
/// tags written as `{N}` on a branch:
///
/// * tree ::= subtree ';'
/// * subtree ::= '(' subtree (',' subtree)* ')' rest | label rest
/// * rest ::= [label] [':' number] ['{' integer '}']
///
/// If no branch carries a tag, edges are numbered densely in creation
/// order; if some but not all branches carry tags, the string is rejected.
/// A trailing length or tag on the root itself has no edge to attach to and
/// is ignored.
///
/// # Example
/// ```
/// use phylomass::newick::NewickParser;
///
/// let tree = NewickParser::new().parse("((A:0.1,B:0.2):0.3,C:0.4);").unwrap();
/// assert_eq!(tree.leaf_count(), 3);
/// ```
pub struct NewickParser {
    builder: TreeBuilder,
    /// Edge-number tag per created edge, in creation order
    tags: Vec<Option<i64>>,
}

impl NewickParser {
    /// Creates a new `NewickParser`.
    pub fn new() -> Self {
        Self { builder: TreeBuilder::new(), tags: Vec::new() }
    }

    /// Parses a single Newick tree from the given string.
    ///
    /// # Returns
    /// * `Ok(Tree)` - The parsed phylogenetic tree
    /// * `Err(ParseError)` - If the Newick format is invalid
    pub fn parse(mut self, input: &str) -> Result<Tree, ParseError> {
        let mut parser = ByteParser::from_str(input);
        parser.skip_comment_and_whitespace()?;

        let root = self.parse_subtree(&mut parser)?.node;

        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b';') {
            return Err(ParseError::invalid_newick(
                &parser,
                "expected ';' at end of tree".to_string(),
            ));
        }

        // Tags must be all present or all absent; a dense numbering is
        // assigned when absent.
        let tagged = self.tags.iter().filter(|t| t.is_some()).count();
        if tagged != 0 && tagged != self.tags.len() {
            return Err(ParseError::without_context(ParseErrorKind::InvalidNewickString(
                "some but not all branches carry {N} edge number tags".to_string(),
            )));
        }
        if tagged == self.tags.len() {
            for (edge, tag) in self.tags.iter().enumerate() {
                if let Some(num) = tag {
                    self.builder.set_edge_num(edge, *num);
                }
            }
        }

        self.builder.finish(root)
    }

    /// Parses one subtree and returns its top node together with the branch
    /// annotation that connects it to its parent.
    fn parse_subtree(&mut self, parser: &mut ByteParser<'_>) -> Result<Subtree, ParseError> {
        parser.skip_comment_and_whitespace()?;

        let node: NodeIndex;
        if parser.consume_if(b'(') {
            // Inner node: parse children first, then connect them.
            let mut children = Vec::new();
            loop {
                children.push(self.parse_subtree(parser)?);
                parser.skip_comment_and_whitespace()?;
                if parser.consume_if(b',') {
                    continue;
                }
                if parser.consume_if(b')') {
                    break;
                }
                return Err(ParseError::invalid_newick(
                    parser,
                    "expected ',' or ')' in subtree".to_string(),
                ));
            }

            let label = parser.parse_label(NEWICK_LABEL_DELIMITERS)?;
            node = self.builder.add_node(&label);
            for child in children {
                let edge = self.builder.connect(
                    node,
                    child.node,
                    child.length.unwrap_or(0.0),
                    self.tags.len() as i64,
                );
                debug_assert_eq!(edge, self.tags.len());
                self.tags.push(child.tag);
            }
        } else {
            // Leaf node: just a label.
            let label = parser.parse_label(NEWICK_LABEL_DELIMITERS)?;
            if label.is_empty() {
                return Err(ParseError::invalid_newick(parser, "empty leaf label".to_string()));
            }
            node = self.builder.add_node(&label);
        }

        // Branch annotation: optional length and optional edge number tag.
        parser.skip_comment_and_whitespace()?;
        let mut length = None;
        if parser.consume_if(b':') {
            parser.skip_comment_and_whitespace()?;
            let value = parser.parse_f64()?;
            if value < 0.0 || !value.is_finite() {
                return Err(ParseError::invalid_newick(
                    parser,
                    format!("branch length {} is not a non-negative finite number", value),
                ));
            }
            length = Some(value);
        }
        parser.skip_whitespace();
        let mut tag = None;
        if parser.consume_if(b'{') {
            let num = parser.parse_i64()?;
            if !parser.consume_if(b'}') {
                return Err(ParseError::invalid_newick(
                    parser,
                    "unclosed edge number tag".to_string(),
                ));
            }
            tag = Some(num);
        }

        Ok(Subtree { node, length, tag })
    }
}

impl Default for NewickParser {
    fn default() -> Self {
        NewickParser::new()
    }
}

/// Top node of a parsed subtree plus the annotation of its parent branch.
struct Subtree {
    node: NodeIndex,
    length: Option<f64>,
    tag: Option<i64>,
}
