//! Topological and branch-length distances between tree nodes.

use crate::tree::Tree;
use crate::tree::element::NodeIndex;

impl Tree {
    /// Returns the topological distance (edge count) from the given node to
    /// every node of the tree, indexed by node.
    ///
    /// Computed with a single levelorder traversal seeded at 0 for the given
    /// node; every other node gets its parent's distance plus one.
    pub fn node_depth_vector(&self, node: NodeIndex) -> Vec<usize> {
        let mut depths = vec![0; self.node_count()];
        for visit in self.levelorder_at(node) {
            depths[visit.node().index()] = visit.depth();
        }
        depths
    }

    /// Returns the all-pairs node distance matrix using branch lengths as
    /// edge weights, indexed by node on both axes.
    ///
    /// One levelorder traversal per row node accumulates
    /// `distance(row, child) = branch_length(edge) + distance(row, parent)`.
    /// O(n²), which is acceptable for the tree sizes of this domain (at most
    /// a few thousand taxa).
    pub fn node_distance_matrix(&self) -> Vec<Vec<f64>> {
        let n = self.node_count();
        let mut matrix = vec![vec![0.0; n]; n];

        for row in 0..n {
            for visit in self.levelorder_at(row) {
                if visit.is_first() {
                    continue;
                }
                // The visited link is the node's upward link; its outer end
                // is the parent, whose distance is already known.
                let parent = self.link(visit.link().outer()).node();
                let to = visit.node().index();
                matrix[row][to] = matrix[row][parent] + *visit.edge().branch_length();
            }
        }

        matrix
    }
}
