//! Element records for phylogenetic tree representation.
//!
//! A tree is made of three record kinds stored in arenas on [Tree](crate::tree::Tree):
//! - [Node]: a branching point, carrying a display name.
//! - [Edge]: an undirected branch with a [BranchLength] and an external `edge_num`.
//! - [Link]: a directed half-edge; two links make up one edge.

use std::ops::Deref;

/// Index of a link in a tree's link arena.
pub type LinkIndex = usize;
/// Index of a node in a tree's node arena.
pub type NodeIndex = usize;
/// Index of an edge in a tree's edge arena.
pub type EdgeIndex = usize;

/// External edge identifier as used by jplace files.
///
/// Distinct from [EdgeIndex]: edge nums are assigned by the producer of the
/// placement file and need not be dense or ordered.
pub type EdgeNum = i64;

// =#========================================================================#=
// LINK
// =#========================================================================#=
/// A half-edge of the tree topology.
///
/// Every edge is represented by two links, one on each of its end nodes.
/// A link knows its node, its edge, the `next` link in the circular order
/// around its node, and the `outer` link on the opposite end of its edge.
/// This quadruple is the sole topology representation: the degree of a node
/// equals the length of the `next` cycle through its first link, and
/// following `next` then `outer` from any link walks an Euler tour that
/// passes through every link of the tree exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Index of this link in the tree arena
    pub(crate) index: LinkIndex,
    /// Next link in the circular order around this link's node
    pub(crate) next: LinkIndex,
    /// Link on the opposite end of this link's edge
    pub(crate) outer: LinkIndex,
    /// Node this link belongs to
    pub(crate) node: NodeIndex,
    /// Edge this link belongs to
    pub(crate) edge: EdgeIndex,
}

impl Link {
    /// Returns the index of this link in the tree arena.
    pub fn index(&self) -> LinkIndex {
        self.index
    }

    /// Returns the next link in the circular order around this link's node.
    pub fn next(&self) -> LinkIndex {
        self.next
    }

    /// Returns the link on the opposite end of this link's edge.
    pub fn outer(&self) -> LinkIndex {
        self.outer
    }

    /// Returns the node this link belongs to.
    pub fn node(&self) -> NodeIndex {
        self.node
    }

    /// Returns the edge this link belongs to.
    pub fn edge(&self) -> EdgeIndex {
        self.edge
    }
}

// =#========================================================================#=
// NODE
// =#========================================================================#=
/// A node (branching point or leaf) of the tree.
///
/// Only stores its first link; all adjacency is read off the link cycle.
/// For non-root nodes the first link is by construction the one whose edge
/// leads toward the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Index of this node in the tree arena
    pub(crate) index: NodeIndex,
    /// First link of this node's circular link order
    pub(crate) link: LinkIndex,
    /// Display name; empty for unnamed inner nodes
    pub(crate) name: String,
}

impl Node {
    /// Returns the index of this node in the tree arena.
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    /// Returns this node's first link.
    pub fn link(&self) -> LinkIndex {
        self.link
    }

    /// Returns this node's display name; empty for unnamed inner nodes.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if this node has a non-empty name.
    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }
}

// =#========================================================================#=
// EDGE
// =#========================================================================#=
/// An undirected branch of the tree.
///
/// The `primary` link sits on the root-proximal node, `secondary` on the
/// root-distal node. Carries the branch length and the external `edge_num`
/// used by placement files to refer to this branch.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Index of this edge in the tree arena
    pub(crate) index: EdgeIndex,
    /// Link on the root-proximal end
    pub(crate) primary_link: LinkIndex,
    /// Link on the root-distal end
    pub(crate) secondary_link: LinkIndex,
    /// Length of this branch (non-negative)
    pub(crate) branch_length: BranchLength,
    /// External identifier used by placement files
    pub(crate) edge_num: EdgeNum,
}

impl Edge {
    /// Returns the index of this edge in the tree arena.
    pub fn index(&self) -> EdgeIndex {
        self.index
    }

    /// Returns the link on the root-proximal end of this edge.
    pub fn primary_link(&self) -> LinkIndex {
        self.primary_link
    }

    /// Returns the link on the root-distal end of this edge.
    pub fn secondary_link(&self) -> LinkIndex {
        self.secondary_link
    }

    /// Returns the length of this branch.
    pub fn branch_length(&self) -> BranchLength {
        self.branch_length
    }

    /// Returns the external edge number of this edge.
    pub fn edge_num(&self) -> EdgeNum {
        self.edge_num
    }
}

// =#========================================================================#=
// BRANCH LENGTH
// =#========================================================================#=
/// Branch length in a phylogenetic tree, enforced non-negative.
///
/// Represents the evolutionary distance between the two nodes of an edge.
/// The value is guaranteed to be non-negative and finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchLength(f64);

impl BranchLength {
    /// Creates a new branch length.
    ///
    /// # Arguments
    /// * `length` - The branch length value (must be non-negative)
    ///
    /// # Panics
    /// Panics if `length` is negative or not finite.
    pub fn new(length: f64) -> Self {
        assert!(length >= 0.0, "Branch length must be non-negative, got {}", length);
        assert!(length.is_finite(), "Branch length must be finite, got {}", length);
        BranchLength(length)
    }
}

impl Deref for BranchLength {
    type Target = f64;
    fn deref(&self) -> &f64 {
        &self.0
    }
}
