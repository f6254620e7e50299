use crate::rrt::metric::DistanceMetric;
use crate::rrt::state::RealVectorState;
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// A node in an exploration tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TreeNode<F: Float, const N: usize> {
    /// The state in N-dimensional space.
    state: RealVectorState<F, N>,
    /// The index of the parent node (None if the node is the root).
    parent: Option<usize>,
    /// Sampling weight. Only meaningful for weighted (EST) growth.
    weight: F,
}

impl<F: Float, const N: usize> TreeNode<F, N> {
    pub fn state(&self) -> &RealVectorState<F, N> {
        &self.state
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn weight(&self) -> F {
        self.weight
    }
}

/// An append-only, parent-linked tree of visited states.
///
/// Node 0 is the root. Nodes are never removed or reordered, so an index is a
/// node's identity for the lifetime of the tree. Every parent index is smaller
/// than the index of its child, which rules out cycles.
///
/// `total_weight` is kept equal to the sum of node weights by applying each
/// weight change as a delta.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tree<F: Float, const N: usize> {
    nodes: Vec<TreeNode<F, N>>,
    total_weight: F,
}

impl<F: Float, const N: usize> Tree<F, N> {
    /// Creates a tree containing only the root.
    pub fn new(root: RealVectorState<F, N>, root_weight: F) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            total_weight: F::zero(),
        };
        tree.insert_node(root, root_weight, None);
        tree
    }

    /// Appends a node and returns its index.
    ///
    /// The state is not validated; callers only insert collision-free states.
    pub fn insert_node(
        &mut self,
        state: RealVectorState<F, N>,
        weight: F,
        parent: Option<usize>,
    ) -> usize {
        let index = self.nodes.len();
        debug_assert!(
            parent.map_or(index == 0, |p| p < index),
            "parent must be an existing node and only the root may lack one"
        );
        self.nodes.push(TreeNode {
            state,
            parent,
            weight,
        });
        self.total_weight = self.total_weight + weight;
        index
    }

    /// Replaces the weight of a node, adjusting the total by the difference.
    pub fn set_weight(&mut self, index: usize, weight: F) {
        let node = &mut self.nodes[index];
        let delta = weight - node.weight;
        node.weight = weight;
        self.total_weight = self.total_weight + delta;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: usize) -> &TreeNode<F, N> {
        &self.nodes[index]
    }

    pub fn state(&self, index: usize) -> &RealVectorState<F, N> {
        &self.nodes[index].state
    }

    pub fn nodes(&self) -> &[TreeNode<F, N>] {
        &self.nodes
    }

    pub fn root(&self) -> &RealVectorState<F, N> {
        &self.nodes[0].state
    }

    pub fn total_weight(&self) -> F {
        self.total_weight
    }

    /// Index of the node closest to `target`, first one on ties.
    ///
    /// Returns `None` only for an empty tree.
    pub fn closest_index(
        &self,
        target: &RealVectorState<F, N>,
        metric: &dyn DistanceMetric<F, N>,
    ) -> Option<usize> {
        let mut best: Option<(usize, F)> = None;
        for (i, node) in self.nodes.iter().enumerate() {
            let distance = metric.distance(&node.state, target);
            let improves = match best {
                Some((_, best_distance)) => distance < best_distance,
                None => true,
            };
            if improves {
                best = Some((i, distance));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Indices of all nodes strictly closer than `radius` to `target`, ascending.
    pub fn radius_search(
        &self,
        target: &RealVectorState<F, N>,
        radius: F,
        metric: &dyn DistanceMetric<F, N>,
    ) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| metric.distance(&node.state, target) < radius)
            .map(|(i, _)| i)
            .collect()
    }

    /// Node indices from `index` up to the root, both included.
    pub fn path_to_root(&self, index: usize) -> Vec<usize> {
        let mut path = vec![index];
        let mut current = index;
        while let Some(parent) = self.nodes[current].parent {
            debug_assert!(parent < current);
            path.push(parent);
            current = parent;
        }
        path
    }

    /// Inverse-CDF sampling over node weights for a uniform draw `u` in `[0, 1)`.
    ///
    /// Walks the nodes in index order accumulating `weight / total_weight` and
    /// returns the first index where the running sum exceeds `u`. Round-off can
    /// leave the final sum marginally below `u`, in which case the last node is
    /// returned.
    pub fn sample_weighted(&self, u: F) -> Option<usize> {
        if self.nodes.is_empty() {
            return None;
        }
        let mut cumulative = F::zero();
        for (i, node) in self.nodes.iter().enumerate() {
            cumulative = cumulative + node.weight / self.total_weight;
            if cumulative > u {
                return Some(i);
            }
        }
        Some(self.nodes.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rrt::metric::EuclideanDistance;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn p(x: f64, y: f64) -> RealVectorState<f64, 2> {
        RealVectorState::new([x, y])
    }

    fn chain(len: usize) -> Tree<f64, 2> {
        let mut tree = Tree::new(p(0.0, 0.0), 1.0);
        for i in 1..len {
            tree.insert_node(p(i as f64, 0.0), 1.0, Some(i - 1));
        }
        tree
    }

    #[test]
    fn insert_returns_sequential_indices() {
        let mut tree = Tree::new(p(0.0, 0.0), 1.0);
        assert_eq!(tree.insert_node(p(1.0, 0.0), 0.5, Some(0)), 1);
        assert_eq!(tree.insert_node(p(2.0, 0.0), 0.25, Some(1)), 2);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.node(0).parent(), None);
        assert_eq!(tree.node(2).parent(), Some(1));
        assert_relative_eq!(tree.total_weight(), 1.75);
    }

    #[test]
    fn set_weight_tracks_total() {
        let mut tree = chain(4);
        tree.set_weight(2, 0.5);
        tree.set_weight(0, 0.1);
        let sum: f64 = tree.nodes().iter().map(|n| n.weight()).sum();
        assert_relative_eq!(tree.total_weight(), sum, epsilon = 1e-12);
    }

    #[test]
    fn closest_breaks_ties_by_earliest_index() {
        let mut tree = Tree::new(p(1.0, 0.0), 1.0);
        tree.insert_node(p(-1.0, 0.0), 1.0, Some(0));
        tree.insert_node(p(0.0, 1.0), 1.0, Some(0));
        assert_eq!(tree.closest_index(&p(0.0, 0.0), &EuclideanDistance), Some(0));
        assert_eq!(tree.closest_index(&p(-0.9, 0.0), &EuclideanDistance), Some(1));
    }

    #[test]
    fn radius_search_is_strict() {
        let tree = chain(5);
        assert_eq!(
            tree.radius_search(&p(2.0, 0.0), 1.0, &EuclideanDistance),
            vec![2]
        );
        assert_eq!(
            tree.radius_search(&p(2.0, 0.0), 1.5, &EuclideanDistance),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn path_to_root_is_leaf_first() {
        let mut tree = chain(4);
        let branch = tree.insert_node(p(1.0, 1.0), 1.0, Some(1));
        assert_eq!(tree.path_to_root(3), vec![3, 2, 1, 0]);
        assert_eq!(tree.path_to_root(branch), vec![branch, 1, 0]);
        assert_eq!(tree.path_to_root(0), vec![0]);
    }

    #[test]
    fn weighted_sampling_walks_cdf() {
        let mut tree = Tree::new(p(0.0, 0.0), 1.0);
        tree.insert_node(p(1.0, 0.0), 2.0, Some(0));
        tree.insert_node(p(2.0, 0.0), 1.0, Some(1));
        // CDF: 0.25, 0.75, 1.0
        assert_eq!(tree.sample_weighted(0.0), Some(0));
        assert_eq!(tree.sample_weighted(0.2499), Some(0));
        assert_eq!(tree.sample_weighted(0.25), Some(1));
        assert_eq!(tree.sample_weighted(0.7), Some(1));
        assert_eq!(tree.sample_weighted(0.9), Some(2));
        assert_eq!(tree.sample_weighted(0.999_999_999), Some(2));
    }

    #[test]
    fn weighted_sampling_frequencies_match_weights() {
        let weights = [1.0, 0.5, 0.25, 2.0, 0.25];
        let mut tree = Tree::new(p(0.0, 0.0), weights[0]);
        for (i, &w) in weights.iter().enumerate().skip(1) {
            tree.insert_node(p(i as f64, 0.0), w, Some(i - 1));
        }

        let draws = 40_000;
        let mut counts = [0usize; 5];
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..draws {
            let u: f64 = rng.gen();
            counts[tree.sample_weighted(u).unwrap()] += 1;
        }

        // Pearson chi-squared with 4 degrees of freedom; 18.47 is the 0.999 quantile.
        let total: f64 = weights.iter().sum();
        let chi_squared: f64 = weights
            .iter()
            .zip(counts.iter())
            .map(|(&w, &c)| {
                let expected = draws as f64 * w / total;
                (c as f64 - expected).powi(2) / expected
            })
            .sum();
        assert!(chi_squared < 18.47, "chi squared {}", chi_squared);
    }

    fn arb_points() -> impl Strategy<Value = Vec<(f64, f64)>> {
        prop::collection::vec((-100.0..100.0f64, -100.0..100.0f64), 1..60)
    }

    proptest! {
        #[test]
        fn closest_matches_brute_force(points in arb_points(), target in (-100.0..100.0f64, -100.0..100.0f64)) {
            let mut tree = Tree::new(p(points[0].0, points[0].1), 1.0);
            for (i, &(x, y)) in points.iter().enumerate().skip(1) {
                tree.insert_node(p(x, y), 1.0, Some(i / 2));
            }
            let target = p(target.0, target.1);
            let found = tree.closest_index(&target, &EuclideanDistance).unwrap();

            let best = points
                .iter()
                .map(|&(x, y)| p(x, y).euclidean_distance(&target))
                .fold(f64::INFINITY, f64::min);
            prop_assert_eq!(tree.state(found).euclidean_distance(&target), best);
            for i in 0..found {
                prop_assert!(tree.state(i).euclidean_distance(&target) > best);
            }
        }

        #[test]
        fn parent_chains_terminate_at_root(parents in prop::collection::vec(any::<prop::sample::Index>(), 0..80)) {
            let mut tree = Tree::new(p(0.0, 0.0), 1.0);
            for (i, parent) in parents.iter().enumerate() {
                let parent = parent.index(i + 1);
                tree.insert_node(p(i as f64, 1.0), 1.0, Some(parent));
            }
            for index in 0..tree.len() {
                let path = tree.path_to_root(index);
                prop_assert!(path.len() <= tree.len());
                prop_assert_eq!(*path.last().unwrap(), 0);
                prop_assert!(path.windows(2).all(|w| w[0] > w[1]));
            }
        }
    }
}
