//! Tree topology engine: half-edge trees, traversal iterators, distances.

/// Construction of trees from parsed input
pub mod builder;
/// Topological and branch-length distances
pub mod distances;
/// Link, node and edge records
pub mod element;
/// Traversal iterators (preorder, postorder, levelorder)
pub mod traversal;
/// The tree arena structure and its operations
pub mod tree;

pub use builder::TreeBuilder;
pub use element::{BranchLength, Edge, EdgeIndex, EdgeNum, Link, LinkIndex, Node, NodeIndex};
pub use traversal::{LevelorderIter, LevelorderVisit, PostorderIter, PreorderIter, TreeVisit};
pub use tree::Tree;
