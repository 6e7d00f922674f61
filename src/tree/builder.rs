//! Construction of half-edge trees.
//!
//! [TreeBuilder] decouples the Newick parser from the link/node/edge wiring:
//! the parser creates nodes and connects them with edges in any bottom-up
//! order, and [finish](TreeBuilder::finish) assembles the three arenas of a
//! [Tree], wiring the circular `next` chains and the designated root link.

use crate::parser::parse_error::{ParseError, ParseErrorKind};
use crate::tree::Tree;
use crate::tree::element::{BranchLength, Edge, EdgeIndex, EdgeNum, Link, Node, NodeIndex};

/// Marker for a link slot that has not been wired yet.
const UNWIRED: usize = usize::MAX;

// =#========================================================================#=
// TREE BUILDER
// =#========================================================================#=
/// Incremental builder for [Tree].
///
/// Nodes are created first, then connected with edges; each
/// [connect](TreeBuilder::connect) call creates the edge together with its
/// two links. The link on the child side is put at the front of the child's
/// circular order, so a finished non-root node's first link is always the
/// one toward the root.
///
/// # Example
/// ```
/// use phylomass::tree::TreeBuilder;
///
/// let mut builder = TreeBuilder::new();
/// let root = builder.add_node("");
/// let a = builder.add_node("A");
/// let b = builder.add_node("B");
/// builder.connect(root, a, 1.0, 0);
/// builder.connect(root, b, 2.0, 1);
///
/// let tree = builder.finish(root).unwrap();
/// assert!(tree.validate());
/// assert_eq!(tree.edge_count(), 2);
/// ```
pub struct TreeBuilder {
    links: Vec<Link>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    /// Per-node link adjacency in circular order, front = upward link
    adjacency: Vec<Vec<usize>>,
}

impl TreeBuilder {
    /// Creates a new, empty builder.
    pub fn new() -> Self {
        TreeBuilder { links: Vec::new(), nodes: Vec::new(), edges: Vec::new(), adjacency: Vec::new() }
    }

    /// Creates a node with the given display name and returns its index.
    pub fn add_node(&mut self, name: &str) -> NodeIndex {
        let index = self.nodes.len();
        self.nodes.push(Node { index, link: UNWIRED, name: name.to_string() });
        self.adjacency.push(Vec::new());
        index
    }

    /// Connects a parent node to a child node with a new edge, returning the
    /// edge index.
    ///
    /// The parent-side link becomes the edge's primary link and is appended
    /// to the parent's circular order; the child-side link becomes the
    /// secondary link and is inserted at the front of the child's order.
    ///
    /// # Panics
    /// Panics if `branch_length` is negative or either node is unknown.
    pub fn connect(
        &mut self,
        parent: NodeIndex,
        child: NodeIndex,
        branch_length: f64,
        edge_num: EdgeNum,
    ) -> EdgeIndex {
        assert!(parent < self.nodes.len() && child < self.nodes.len());

        let edge_index = self.edges.len();
        let parent_link = self.links.len();
        let child_link = parent_link + 1;

        self.links.push(Link {
            index: parent_link,
            next: UNWIRED,
            outer: child_link,
            node: parent,
            edge: edge_index,
        });
        self.links.push(Link {
            index: child_link,
            next: UNWIRED,
            outer: parent_link,
            node: child,
            edge: edge_index,
        });
        self.edges.push(Edge {
            index: edge_index,
            primary_link: parent_link,
            secondary_link: child_link,
            branch_length: BranchLength::new(branch_length),
            edge_num,
        });

        self.adjacency[parent].push(parent_link);
        self.adjacency[child].insert(0, child_link);

        edge_index
    }

    /// Returns the number of edges created so far.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Overrides the external edge number of an already created edge.
    ///
    /// The Newick parser assigns provisional dense numbers and rewrites them
    /// once it knows whether the input carried `{N}` tags.
    ///
    /// # Panics
    /// Panics if the edge is unknown.
    pub fn set_edge_num(&mut self, edge: EdgeIndex, edge_num: EdgeNum) {
        self.edges[edge].edge_num = edge_num;
    }

    /// Wires the circular `next` chains and finalizes the tree, rooted at
    /// the given node.
    ///
    /// # Returns
    /// The finished [Tree], or an error if the structure is degenerate
    /// (a node without any edge, or no edges at all).
    pub fn finish(mut self, root: NodeIndex) -> Result<Tree, ParseError> {
        if self.edges.is_empty() {
            return Err(ParseError::without_context(ParseErrorKind::InvalidTreeStructure(
                "tree has no edges".to_string(),
            )));
        }

        for (node, around) in self.adjacency.iter().enumerate() {
            if around.is_empty() {
                return Err(ParseError::without_context(ParseErrorKind::InvalidTreeStructure(
                    format!("node {} is not connected to any edge", node),
                )));
            }
            self.nodes[node].link = around[0];
            for (i, &link) in around.iter().enumerate() {
                self.links[link].next = around[(i + 1) % around.len()];
            }
        }

        let root_link = self.nodes[root].link;
        Ok(Tree { links: self.links, nodes: self.nodes, edges: self.edges, root_link })
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        TreeBuilder::new()
    }
}
