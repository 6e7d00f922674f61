//! Tree module for phylogenetic tree representation.
//!
//! Provides the core [Tree] structure using the arena pattern: links, nodes
//! and edges are stored in contiguous vectors and cross-reference each other
//! by index. See [crate::tree::element] for the record types.

use crate::tree::element::{Edge, EdgeIndex, Link, LinkIndex, Node, NodeIndex};
use crate::tree::traversal::{LevelorderIter, PostorderIter, PreorderIter, TreeVisit};

// =#========================================================================#=
// TREE
// =#========================================================================#=
/// A phylogenetic tree represented as three arenas of half-edge records.
///
/// Links, nodes and edges are stored in contiguous vectors and referenced by
/// [LinkIndex], [NodeIndex] and [EdgeIndex]. Aim is to avoid referencing
/// troubles as well as to provide efficient memory layout and cache locality
/// for traversal operations.
///
/// # Structure
/// - Each node stores only its first link; adjacency is read off the
///   circular `next` chain of links around the node.
/// - Each edge stores its two links; the primary link sits on the
///   root-proximal node, the secondary link on the root-distal node.
/// - A designated root link marks the traversal seed.
/// - An empty tree has all three arenas empty.
///
/// # Construction
/// Trees are built through [TreeBuilder](crate::tree::TreeBuilder) (used by
/// the Newick parser) and are immutable afterwards; all operations on this
/// type are read-only. Test validity with [Tree::validate].
///
/// # Example
/// ```
/// use phylomass::newick;
///
/// let tree = newick::parse("((A:0.2,B:0.2):0.2,C:0.4);").unwrap();
/// assert!(tree.validate());
/// assert_eq!(tree.leaf_count(), 3);
/// assert!(tree.is_bifurcating());
/// ```
#[derive(Debug, Clone)]
pub struct Tree {
    /// Half-edges of this tree (arena pattern)
    pub(crate) links: Vec<Link>,
    /// Nodes of this tree (arena pattern)
    pub(crate) nodes: Vec<Node>,
    /// Edges of this tree (arena pattern)
    pub(crate) edges: Vec<Edge>,
    /// Designated root link; traversal seed, meaningless for an empty tree
    pub(crate) root_link: LinkIndex,
}

// ============================================================================
// New, Getters / Accessors, etc. (pub)
// ============================================================================
impl Tree {
    /// Creates an empty tree with no links, nodes or edges.
    pub fn empty() -> Self {
        Tree { links: Vec::new(), nodes: Vec::new(), edges: Vec::new(), root_link: 0 }
    }

    /// Returns `true` if this tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns a reference to the link at the given index.
    ///
    /// # Panics
    /// Panics if the index is out of bounds.
    pub fn link(&self, index: LinkIndex) -> &Link {
        &self.links[index]
    }

    /// Returns a reference to the node at the given index.
    ///
    /// # Panics
    /// Panics if the index is out of bounds.
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index]
    }

    /// Returns a reference to the edge at the given index.
    ///
    /// # Panics
    /// Panics if the index is out of bounds.
    pub fn edge(&self, index: EdgeIndex) -> &Edge {
        &self.edges[index]
    }

    /// Returns the number of links in this tree.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Returns the number of nodes in this tree.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges in this tree.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the number of leaf nodes in this tree.
    pub fn leaf_count(&self) -> usize {
        (0..self.nodes.len()).filter(|&n| self.is_leaf(n)).count()
    }

    /// Returns the designated root link of this tree.
    ///
    /// # Panics
    /// Panics if the tree is empty.
    pub fn root_link(&self) -> &Link {
        &self.links[self.root_link]
    }

    /// Returns the node at the designated root of this tree.
    ///
    /// # Panics
    /// Panics if the tree is empty.
    pub fn root_node(&self) -> &Node {
        &self.nodes[self.root_link().node()]
    }

    /// Returns an iterator over the nodes of this tree, in arena order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Returns an iterator over the edges of this tree, in arena order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Returns an iterator over the links around a node, starting at its
    /// first link and following the circular `next` chain.
    pub fn links_around(&self, node: NodeIndex) -> AroundNodeIter<'_> {
        AroundNodeIter { tree: self, start: self.nodes[node].link, current: Some(self.nodes[node].link) }
    }

    /// Returns the degree of a node: the number of links around it.
    pub fn degree_of(&self, node: NodeIndex) -> usize {
        self.links_around(node).count()
    }

    /// Returns the rank of a node: its degree minus one, i.e. the number of
    /// incident branches beyond the first. A leaf has rank 0.
    pub fn rank_of(&self, node: NodeIndex) -> usize {
        self.degree_of(node) - 1
    }

    /// Returns `true` if the node at the given index is a leaf.
    pub fn is_leaf(&self, node: NodeIndex) -> bool {
        let first = self.nodes[node].link;
        self.links[first].next == first
    }

    /// Returns the highest rank over all nodes of this tree.
    ///
    /// Logs a warning for every non-root rank-1 node encountered: such a
    /// node sits in a chain without branching, which is almost always a
    /// sign of a malformed input tree. The root is exempt since a root with
    /// two children has rank 1 as well.
    ///
    /// Returns 0 for the empty tree.
    pub fn max_rank(&self) -> usize {
        let root = if self.is_empty() { 0 } else { self.root_node().index };
        let mut max = 0;
        for node in &self.nodes {
            let rank = self.rank_of(node.index);
            if rank == 1 && node.index != root {
                tracing::warn!(node = node.index, name = %node.name, "node has rank 1");
            }
            max = max.max(rank);
        }
        max
    }

    /// Returns `true` iff every node of this tree has at most two children,
    /// that is, iff [max_rank](Tree::max_rank) is 2.
    pub fn is_bifurcating(&self) -> bool {
        self.max_rank() == 2
    }
}

// ============================================================================
// Validation
// ============================================================================
impl Tree {
    /// Validates the tree structure and all index references.
    ///
    /// Checks:
    /// - Link, node and edge arenas are either all empty or all non-empty
    /// - Every record's stored index matches its position in its arena
    /// - All cross-reference indices are in bounds
    /// - Following `next` then `outer` from the root link walks an Euler
    ///   tour that passes through every link exactly once before closing
    /// - Every edge's two links resolve to two different nodes and point
    ///   back at the edge
    /// - Every link agrees with the node reached through its `next` chain
    ///
    /// Rank-1 nodes are flagged with a warning but do not fail validation.
    ///
    /// # Returns
    /// `true` if the tree is valid; `false` otherwise, with the first
    /// violation found logged as a warning.
    pub fn validate(&self) -> bool {
        // Empty tree: all arenas must agree.
        if self.links.is_empty() || self.nodes.is_empty() || self.edges.is_empty() {
            if !self.links.is_empty() || !self.nodes.is_empty() || !self.edges.is_empty() {
                tracing::warn!(
                    links = self.links.len(),
                    nodes = self.nodes.len(),
                    edges = self.edges.len(),
                    "arenas must be all empty or all non-empty"
                );
                return false;
            }
            return true;
        }

        if self.root_link >= self.links.len() {
            tracing::warn!(root_link = self.root_link, "root link out of bounds");
            return false;
        }

        // Stored indices and cross-reference bounds.
        for (i, link) in self.links.iter().enumerate() {
            if link.index != i {
                tracing::warn!(slot = i, stored = link.index, "link index does not match its slot");
                return false;
            }
            if link.next >= self.links.len() || link.outer >= self.links.len() {
                tracing::warn!(link = i, "link next/outer out of bounds");
                return false;
            }
            if link.node >= self.nodes.len() || link.edge >= self.edges.len() {
                tracing::warn!(link = i, "link node/edge out of bounds");
                return false;
            }
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if node.index != i {
                tracing::warn!(slot = i, stored = node.index, "node index does not match its slot");
                return false;
            }
            if node.link >= self.links.len() {
                tracing::warn!(node = i, "node link out of bounds");
                return false;
            }
            if self.links[node.link].node != i {
                tracing::warn!(node = i, "node's first link belongs to another node");
                return false;
            }
        }
        for (i, edge) in self.edges.iter().enumerate() {
            if edge.index != i {
                tracing::warn!(slot = i, stored = edge.index, "edge index does not match its slot");
                return false;
            }
            if edge.primary_link >= self.links.len() || edge.secondary_link >= self.links.len() {
                tracing::warn!(edge = i, "edge link out of bounds");
                return false;
            }
            let p = &self.links[edge.primary_link];
            let s = &self.links[edge.secondary_link];
            if p.edge != i || s.edge != i {
                tracing::warn!(edge = i, "edge's links do not point back at the edge");
                return false;
            }
            if p.node == s.node {
                tracing::warn!(edge = i, node = p.node, "edge connects a node to itself");
                return false;
            }
            if p.outer != edge.secondary_link || s.outer != edge.primary_link {
                tracing::warn!(edge = i, "edge's links are not each other's outer");
                return false;
            }
        }

        // next chains must stay on one node.
        for link in &self.links {
            if self.links[link.next].node != link.node {
                tracing::warn!(link = link.index, "next link belongs to another node");
                return false;
            }
        }

        // Euler tour closure: following next -> outer from the root link must
        // cycle through every link exactly once.
        let mut seen = vec![false; self.links.len()];
        let mut current = self.root_link;
        let mut steps = 0usize;
        loop {
            if seen[current] {
                tracing::warn!(link = current, "euler tour revisits a link before closing");
                return false;
            }
            seen[current] = true;
            steps += 1;
            current = self.links[self.links[current].next].outer;
            if current == self.root_link {
                break;
            }
            if steps > self.links.len() {
                tracing::warn!("euler tour does not close");
                return false;
            }
        }
        if steps != self.links.len() {
            tracing::warn!(visited = steps, total = self.links.len(), "euler tour misses links");
            return false;
        }

        // Not an error, but worth flagging. The root is exempt since a root
        // with two children has rank 1 as well.
        let root = self.root_node().index;
        for node in &self.nodes {
            if self.rank_of(node.index) == 1 && node.index != root {
                tracing::warn!(node = node.index, name = %node.name, "node has rank 1");
            }
        }

        true
    }
}

// ============================================================================
// Traversal entry points
// ============================================================================
impl Tree {
    /// Returns a preorder iterator rooted at the designated root link.
    ///
    /// The traversal walks the Euler tour of the tree's links: every link is
    /// visited exactly once, so an inner node appears once per incident
    /// branch while each leaf appears once. The first visit is at the root
    /// link and is flagged via [TreeVisit::is_first].
    pub fn preorder(&self) -> PreorderIter<'_> {
        PreorderIter::new(self, self.root_link)
    }

    /// Returns a preorder iterator rooted at the given node's first link.
    pub fn preorder_at(&self, node: NodeIndex) -> PreorderIter<'_> {
        PreorderIter::new(self, self.nodes[node].link)
    }

    /// Returns a postorder iterator rooted at the designated root link.
    ///
    /// Every link is visited exactly once, after the entire subtree across
    /// it has been visited: an inner node appears after each of its child
    /// subtrees and once more when the traversal ascends past it. The last
    /// visit is at the root and flagged via [TreeVisit::is_last].
    pub fn postorder(&self) -> PostorderIter<'_> {
        PostorderIter::new(self, self.root_link)
    }

    /// Returns a postorder iterator rooted at the given node's first link.
    pub fn postorder_at(&self, node: NodeIndex) -> PostorderIter<'_> {
        PostorderIter::new(self, self.nodes[node].link)
    }

    /// Returns a levelorder (breadth-first) iterator rooted at the
    /// designated root link. Each node is visited exactly once; visits
    /// expose their [depth](crate::tree::traversal::LevelorderVisit::depth).
    pub fn levelorder(&self) -> LevelorderIter<'_> {
        LevelorderIter::new(self, self.root_link)
    }

    /// Returns a levelorder iterator rooted at the given node's first link.
    pub fn levelorder_at(&self, node: NodeIndex) -> LevelorderIter<'_> {
        LevelorderIter::new(self, self.nodes[node].link)
    }
}

// ============================================================================
// Comparison
// ============================================================================
impl Tree {
    /// Compares two trees by a synchronized preorder walk.
    ///
    /// Returns `true` iff both trees have identical arena sizes and at every
    /// step of the walk the visited nodes have equal rank and the comparator
    /// returns `true` for the pair of visits.
    ///
    /// The comparator receives the current visit of `lhs` and `rhs` in this
    /// order; pass `|_, _| true` to compare positions only (see
    /// [has_identical_topology](Tree::has_identical_topology)).
    pub fn equal<F>(lhs: &Tree, rhs: &Tree, comparator: F) -> bool
    where
        F: Fn(&TreeVisit<'_>, &TreeVisit<'_>) -> bool,
    {
        if lhs.links.len() != rhs.links.len()
            || lhs.nodes.len() != rhs.nodes.len()
            || lhs.edges.len() != rhs.edges.len()
        {
            return false;
        }

        let mut l_it = lhs.preorder();
        let mut r_it = rhs.preorder();
        loop {
            match (l_it.next(), r_it.next()) {
                (Some(l), Some(r)) => {
                    if lhs.rank_of(l.node().index()) != rhs.rank_of(r.node().index()) {
                        return false;
                    }
                    if !comparator(&l, &r) {
                        return false;
                    }
                }
                (None, None) => return true,
                _ => return false,
            }
        }
    }

    /// Returns `true` iff both trees have the same topology, ignoring all
    /// node and edge data.
    pub fn has_identical_topology(lhs: &Tree, rhs: &Tree) -> bool {
        Tree::equal(lhs, rhs, |_, _| true)
    }

    /// Returns `true` iff a synchronized preorder walk finds equal branch
    /// lengths and edge nums at every step. Does not re-confirm topology
    /// beyond what the walk itself implies.
    pub fn has_identical_edge_data(lhs: &Tree, rhs: &Tree) -> bool {
        Tree::equal(lhs, rhs, |l, r| {
            *l.edge().branch_length() == *r.edge().branch_length()
                && l.edge().edge_num() == r.edge().edge_num()
        })
    }

    /// Returns `true` iff a synchronized preorder walk finds equal node
    /// names at every step.
    pub fn has_identical_node_data(lhs: &Tree, rhs: &Tree) -> bool {
        Tree::equal(lhs, rhs, |l, r| l.node().name() == r.node().name())
    }
}

// ============================================================================
// Dump and Debug
// ============================================================================
impl Tree {
    /// Returns a textual dump of this tree, one line per preorder visit.
    ///
    /// Inner nodes appear once per incident branch, so the output makes the
    /// full Euler tour visible; useful for debugging topology issues.
    pub fn dump(&self) -> String {
        if self.is_empty() {
            return String::from("Tree (empty)\n");
        }

        let mut out = format!(
            "Tree with {} nodes, {} edges, {} links\n",
            self.nodes.len(),
            self.edges.len(),
            self.links.len()
        );
        for visit in self.preorder() {
            let node = visit.node();
            let name = if node.is_named() { node.name() } else { "(inner)" };
            if visit.is_first() {
                out.push_str(&format!("* [{}] {}\n", node.index(), name));
            } else {
                let edge = visit.edge();
                out.push_str(&format!(
                    "  [{}] {} via edge {} (num {}, length {})\n",
                    node.index(),
                    name,
                    edge.index(),
                    edge.edge_num(),
                    *edge.branch_length()
                ));
            }
        }
        out
    }
}

// =#========================================================================#=
// AROUND NODE ITERATOR
// =#========================================================================#=
/// Iterator over the links around one node, in circular `next` order,
/// starting at the node's first link.
pub struct AroundNodeIter<'a> {
    tree: &'a Tree,
    start: LinkIndex,
    current: Option<LinkIndex>,
}

impl<'a> Iterator for AroundNodeIter<'a> {
    type Item = &'a Link;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        let link = &self.tree.links[current];
        let next = link.next;
        self.current = if next == self.start { None } else { Some(next) };
        Some(link)
    }
}
