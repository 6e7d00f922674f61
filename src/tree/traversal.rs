//! Traversal iterators over phylogenetic trees.
//!
//! Three traversal orders are provided, all lazy, finite and restartable:
//! - [PreorderIter]: Euler tour of the links, parents before children.
//! - [PostorderIter]: every subtree complete before its parent visit.
//! - [LevelorderIter]: breadth-first over nodes, each node exactly once.
//!
//! Preorder and postorder visit every *link* exactly once, so an inner node
//! of degree `d` appears `d` times while a leaf appears once; 2E steps in
//! total for a tree with E edges. Levelorder visits every *node* once.
//! Downstream dump and distance code relies on these multiplicities.

use crate::tree::Tree;
use crate::tree::element::{Edge, Link, LinkIndex, Node};
use std::collections::VecDeque;

// =#========================================================================#=
// TREE VISIT
// =#========================================================================#=
/// One step of a preorder or postorder traversal.
///
/// Bundles the visited link with the node and edge it resolves to, plus
/// flags for detecting the traversal seed.
pub struct TreeVisit<'a> {
    tree: &'a Tree,
    link: LinkIndex,
    first: bool,
    last: bool,
}

impl<'a> TreeVisit<'a> {
    /// Returns the link visited at this step.
    pub fn link(&self) -> &'a Link {
        self.tree.link(self.link)
    }

    /// Returns the node the visited link belongs to.
    pub fn node(&self) -> &'a Node {
        self.tree.node(self.tree.link(self.link).node())
    }

    /// Returns the edge the visited link belongs to.
    ///
    /// On the first preorder step this is the edge of the seed link itself;
    /// check [is_first](TreeVisit::is_first) when the distinction matters.
    pub fn edge(&self) -> &'a Edge {
        self.tree.edge(self.tree.link(self.link).edge())
    }

    /// Returns `true` if this is the first step of the traversal.
    pub fn is_first(&self) -> bool {
        self.first
    }

    /// Returns `true` if this is the last step of the traversal.
    pub fn is_last(&self) -> bool {
        self.last
    }
}

// =#========================================================================#=
// PREORDER
// =#========================================================================#=
/// Iterator for preorder traversal (parents before children).
///
/// Walks the Euler tour of the tree's links with successor
/// `outer(link).next`, starting at the seed link. Every link is yielded
/// exactly once; the tour closes when the successor returns to the seed.
pub struct PreorderIter<'a> {
    tree: &'a Tree,
    start: LinkIndex,
    current: Option<LinkIndex>,
    first: bool,
}

impl<'a> PreorderIter<'a> {
    pub(crate) fn new(tree: &'a Tree, start: LinkIndex) -> Self {
        let current = if tree.is_empty() { None } else { Some(start) };
        PreorderIter { tree, start, current, first: true }
    }
}

impl<'a> Iterator for PreorderIter<'a> {
    type Item = TreeVisit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        let successor = self.tree.link(self.tree.link(current).outer()).next();
        self.current = if successor == self.start { None } else { Some(successor) };

        let visit = TreeVisit {
            tree: self.tree,
            link: current,
            first: self.first,
            last: self.current.is_none(),
        };
        self.first = false;
        Some(visit)
    }
}

// =#========================================================================#=
// POSTORDER
// =#========================================================================#=
/// Work item on the postorder stack: either descend across a link into its
/// subtree, or yield the link itself.
enum Frame {
    Enter(LinkIndex),
    Visit(LinkIndex),
}

/// Iterator for postorder traversal (children before parents).
///
/// Uses an explicit stack of [Frame]s to traverse without recursion. For a
/// link `L` on node `N`, descend across `L` means: visit the subtrees
/// hanging off the far node, visiting the far node after each one, then
/// visit the far node once more through its upward link. The seed node is
/// visited after each of its subtrees, the last of those visits being the
/// final step of the traversal.
pub struct PostorderIter<'a> {
    tree: &'a Tree,
    stack: Vec<Frame>,
    first: bool,
}

impl<'a> PostorderIter<'a> {
    pub(crate) fn new(tree: &'a Tree, start: LinkIndex) -> Self {
        let mut stack = Vec::new();
        if !tree.is_empty() {
            // Seed node: one Enter+Visit pair per link around it, pushed in
            // reverse so the first link's subtree is processed first.
            let around: Vec<LinkIndex> =
                tree.links_around(tree.link(start).node()).map(|l| l.index()).collect();
            for &link in around.iter().rev() {
                stack.push(Frame::Visit(link));
                stack.push(Frame::Enter(link));
            }
        }
        PostorderIter { tree, stack, first: true }
    }

    fn visit(&mut self, link: LinkIndex) -> TreeVisit<'a> {
        let visit = TreeVisit {
            tree: self.tree,
            link,
            first: self.first,
            last: self.stack.is_empty(),
        };
        self.first = false;
        visit
    }
}

impl<'a> Iterator for PostorderIter<'a> {
    type Item = TreeVisit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stack.pop()? {
                Frame::Visit(link) => return Some(self.visit(link)),
                Frame::Enter(link) => {
                    // Cross the edge; the link on the far side is the far
                    // node's upward link for this traversal.
                    let up = self.tree.link(link).outer();
                    let far = self.tree.link(up).node();

                    // Child links of the far node: its circular order minus
                    // the upward link, starting after it.
                    let mut children = Vec::new();
                    let mut c = self.tree.link(up).next();
                    while c != up {
                        children.push(c);
                        c = self.tree.link(c).next();
                    }
                    debug_assert_eq!(self.tree.link(up).node(), far);

                    // Final ascent visit goes below the per-child visits on
                    // the stack, so it is yielded last.
                    self.stack.push(Frame::Visit(up));
                    for &child in children.iter().rev() {
                        self.stack.push(Frame::Visit(child));
                        self.stack.push(Frame::Enter(child));
                    }
                }
            }
        }
    }
}

// =#========================================================================#=
// LEVELORDER
// =#========================================================================#=
/// One step of a levelorder traversal.
///
/// Like [TreeVisit] but additionally exposes the depth (edge count from the
/// traversal seed) of the visited node.
pub struct LevelorderVisit<'a> {
    tree: &'a Tree,
    link: LinkIndex,
    depth: usize,
    first: bool,
}

impl<'a> LevelorderVisit<'a> {
    /// Returns the link visited at this step. For non-seed nodes this is
    /// the node's upward link, whose edge leads toward the seed.
    pub fn link(&self) -> &'a Link {
        self.tree.link(self.link)
    }

    /// Returns the node visited at this step.
    pub fn node(&self) -> &'a Node {
        self.tree.node(self.tree.link(self.link).node())
    }

    /// Returns the edge of the visited link; for non-seed nodes the edge
    /// toward the seed. Check [is_first](LevelorderVisit::is_first) before
    /// interpreting the edge of the seed visit.
    pub fn edge(&self) -> &'a Edge {
        self.tree.edge(self.tree.link(self.link).edge())
    }

    /// Returns the topological distance (edge count) from the seed node.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns `true` if this is the seed visit.
    pub fn is_first(&self) -> bool {
        self.first
    }
}

/// Iterator for levelorder (breadth-first) traversal.
///
/// Each node is visited exactly once, in order of increasing depth from the
/// seed node.
pub struct LevelorderIter<'a> {
    tree: &'a Tree,
    queue: VecDeque<(LinkIndex, usize)>,
    first: bool,
}

impl<'a> LevelorderIter<'a> {
    pub(crate) fn new(tree: &'a Tree, start: LinkIndex) -> Self {
        let mut queue = VecDeque::new();
        if !tree.is_empty() {
            queue.push_back((start, 0));
        }
        LevelorderIter { tree, queue, first: true }
    }
}

impl<'a> Iterator for LevelorderIter<'a> {
    type Item = LevelorderVisit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (link, depth) = self.queue.pop_front()?;
        let node = self.tree.link(link).node();
        let seed = self.first;

        // Enqueue children: every link around the node except the entry
        // link leads down; the seed node has no entry link, so all of its
        // links lead down.
        for around in self.tree.links_around(node) {
            if !seed && around.index() == link {
                continue;
            }
            self.queue.push_back((around.outer(), depth + 1));
        }

        self.first = false;
        Some(LevelorderVisit { tree: self.tree, link, depth, first: seed })
    }
}
