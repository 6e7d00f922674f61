//! Mass distribution measures: earth mover's distance, center of gravity,
//! variance.
//!
//! All three operate on the per-edge mass distribution of a
//! [Sample](crate::placement::Sample) (normalized per pquery, see
//! [Sample::mass_per_edge](crate::placement::Sample::mass_per_edge)) and
//! are root independent: re-rooting only changes the traversal seed, not
//! the result.

use crate::placement::sample::Sample;
use crate::tree::Tree;
use crate::tree::element::EdgeIndex;

// =#========================================================================#=
// EARTH MOVER'S DISTANCE
// =#========================================================================#=
/// Calculates the earth mover's distance between the placement mass
/// distributions of two samples on the same tree topology.
///
/// The masses of `lhs` are stored with positive sign, the masses of `rhs`
/// with negative sign; a single postorder traversal then accumulates the
/// net signed mass of every subtree, and the distance is the sum over all
/// edges of `|subtree net mass| * branch_length` — the work needed to move
/// the imbalanced mass across each branch. Symmetric by construction, and
/// zero iff the two distributions agree on every edge.
///
/// The result is only meaningful if both samples carry the same total
/// mass; with per-pquery normalization this means equal pquery counts, or
/// an explicitly rescaled pair.
///
/// # Returns
/// * `Some(distance)` - For samples on identical topologies
/// * `Some(0.0)` - If both trees are empty
/// * `None` - If the topologies differ (logged as a warning)
pub fn earth_movers_distance(lhs: &Sample, rhs: &Sample) -> Option<f64> {
    if lhs.tree().is_empty() && rhs.tree().is_empty() {
        return Some(0.0);
    }
    if !Tree::has_identical_topology(lhs.tree(), rhs.tree()) {
        tracing::warn!("cannot compute earth mover's distance: tree topologies differ");
        return None;
    }

    let tree = lhs.tree();
    let mut masses = lhs.mass_per_edge();
    for (edge, mass) in rhs.mass_per_edge().into_iter().enumerate() {
        masses[edge] -= mass;
    }

    Some(signed_mass_distance(tree, &masses))
}

/// One postorder pass over signed per-edge masses: fold every subtree's net
/// mass up toward the seed, summing `|net| * branch_length` per edge.
fn signed_mass_distance(tree: &Tree, masses: &[f64]) -> f64 {
    let mut node_mass = vec![0.0; tree.node_count()];
    let mut distance = 0.0;

    for visit in tree.postorder() {
        let edge = visit.edge();
        // Fold when ascending: the visited link is the root-distal end of
        // a completed subtree.
        if visit.link().index() != edge.secondary_link() {
            continue;
        }
        let below = node_mass[visit.node().index()] + masses[edge.index()];
        distance += below.abs() * *edge.branch_length();
        node_mass[tree.link(edge.primary_link()).node()] += below;
    }

    distance
}

// =#========================================================================#=
// CENTER OF GRAVITY
// =#========================================================================#=
/// Computes the mass-weighted center of gravity of a sample: the point on
/// the tree minimizing the total mass-weighted branch-length distance to
/// all placement masses.
///
/// Each edge's mass is treated as sitting at the middle of its branch. The
/// walk starts at the root and repeatedly descends into the subtree that
/// holds more than half of the total mass; once no subtree does, the
/// balance point lies on the entered edge: at its midpoint if the mass
/// strictly below no longer outweighs the rest, at its distal node
/// otherwise.
///
/// # Returns
/// * `Some((edge, offset))` - The balancing edge and the offset from its
///   root-proximal node, in branch length units
/// * `None` - If the tree is empty or the sample carries no mass
pub fn center_of_gravity(smp: &Sample) -> Option<(EdgeIndex, f64)> {
    let tree = smp.tree();
    if tree.is_empty() {
        return None;
    }
    let masses = smp.mass_per_edge();
    let total: f64 = masses.iter().sum();
    if total <= 0.0 {
        return None;
    }

    let below = subtree_masses(tree, &masses);
    let half = total / 2.0;

    // Descend from the root while some subtree holds more than half of the
    // total mass.
    let mut node = tree.root_node().index();
    let mut entry = None;
    loop {
        let heavier = tree
            .links_around(node)
            .filter(|l| Some(l.index()) != entry)
            .map(|l| l.edge())
            .find(|&e| below[e] > half);

        match heavier {
            None => {
                // Balance point is at this node; report it as offset 0 on
                // the heaviest incident edge below it.
                let edge = tree
                    .links_around(node)
                    .filter(|l| Some(l.index()) != entry)
                    .map(|l| l.edge())
                    .max_by(|&a, &b| {
                        below[a]
                            .partial_cmp(&below[b])
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })?;
                return Some((edge, 0.0));
            }
            Some(edge) => {
                let length = *tree.edge(edge).branch_length();
                let strictly_below = below[edge] - masses[edge];
                if strictly_below <= half {
                    // The edge's own mass (at its midpoint) tips the
                    // balance: the point of equilibrium is the midpoint.
                    return Some((edge, length / 2.0));
                }
                // Keep walking toward the distal node.
                node = tree.link(tree.edge(edge).secondary_link()).node();
                entry = Some(tree.edge(edge).secondary_link());
            }
        }
    }
}

/// Returns per edge the total mass on and below it (relative to the tree's
/// root), computed with one postorder pass.
fn subtree_masses(tree: &Tree, masses: &[f64]) -> Vec<f64> {
    let mut below = vec![0.0; tree.edge_count()];
    let mut node_mass = vec![0.0; tree.node_count()];

    for visit in tree.postorder() {
        let edge = visit.edge();
        if visit.link().index() != edge.secondary_link() {
            continue;
        }
        let sum = node_mass[visit.node().index()] + masses[edge.index()];
        below[edge.index()] = sum;
        node_mass[tree.link(edge.primary_link()).node()] += sum;
    }

    below
}

// =#========================================================================#=
// VARIANCE
// =#========================================================================#=
/// Computes the mass-weighted variance of the tree distances from the
/// center of gravity to all placement masses (each edge's mass at its
/// branch midpoint).
///
/// # Returns
/// * `Some(variance)` - For a sample with mass on a non-empty tree
/// * `None` - If [center_of_gravity] is undefined for this sample
pub fn variance(smp: &Sample) -> Option<f64> {
    let (cog_edge, offset) = center_of_gravity(smp)?;
    let tree = smp.tree();
    let masses = smp.mass_per_edge();
    let total: f64 = masses.iter().sum();

    // Distances from the COG point to every node, through either end of
    // the COG edge.
    let prox = tree.link(tree.edge(cog_edge).primary_link()).node();
    let dist = tree.link(tree.edge(cog_edge).secondary_link()).node();
    let cog_len = *tree.edge(cog_edge).branch_length();
    let from_prox = node_distances(tree, prox);
    let from_dist = node_distances(tree, dist);
    let node_dist = |node: usize| -> f64 {
        (offset + from_prox[node]).min((cog_len - offset) + from_dist[node])
    };

    let mut sum = 0.0;
    for edge in tree.edges() {
        let mass = masses[edge.index()];
        if mass == 0.0 {
            continue;
        }
        let half = *edge.branch_length() / 2.0;
        let d = if edge.index() == cog_edge {
            (offset - half).abs()
        } else {
            let via_prox = node_dist(tree.link(edge.primary_link()).node()) + half;
            let via_dist = node_dist(tree.link(edge.secondary_link()).node()) + half;
            via_prox.min(via_dist)
        };
        sum += mass * d * d;
    }

    Some(sum / total)
}

/// Branch-length distances from one node to every node, by a single
/// levelorder traversal.
fn node_distances(tree: &Tree, from: usize) -> Vec<f64> {
    let mut distances = vec![0.0; tree.node_count()];
    for visit in tree.levelorder_at(from) {
        if visit.is_first() {
            continue;
        }
        let parent = tree.link(visit.link().outer()).node();
        distances[visit.node().index()] = distances[parent] + *visit.edge().branch_length();
    }
    distances
}

// ============================================================================
// Member-form conveniences
// ============================================================================
impl Sample {
    /// Member form of [earth_movers_distance]: `self` against `other`.
    pub fn earth_movers_distance(&self, other: &Sample) -> Option<f64> {
        earth_movers_distance(self, other)
    }

    /// Member form of [center_of_gravity].
    pub fn center_of_gravity(&self) -> Option<(EdgeIndex, f64)> {
        center_of_gravity(self)
    }

    /// Member form of [variance].
    pub fn variance(&self) -> Option<f64> {
        variance(self)
    }
}
