use crate::rrt::metric::DistanceMetric;
use crate::rrt::state::RealVectorState;
use crate::rrt::tree_pair::TreePair;
use num_traits::Float;

/// What a feature vector is computed for.
#[derive(Clone, Copy, Debug)]
pub enum FeatureQuery<'a, F: Float, const N: usize> {
    /// An existing node of the active tree.
    Node(usize),
    /// A free candidate state.
    State(&'a RealVectorState<F, N>),
}

/// Turns a candidate into the numeric features a decision policy sees.
///
/// The planners treat the output as opaque.
pub trait FeatureExtractor<F: Float, const N: usize> {
    fn features(&self, query: FeatureQuery<'_, F, N>, trees: &TreePair<F, N>) -> Vec<F>;
}

/// Yields no features. Useful with policies that ignore them.
pub struct NoFeatures;

impl<F: Float, const N: usize> FeatureExtractor<F, N> for NoFeatures {
    fn features(&self, _query: FeatureQuery<'_, F, N>, _trees: &TreePair<F, N>) -> Vec<F> {
        Vec::new()
    }
}

/// `[distance to the active tree, distance to the other tree, node weight]`.
///
/// For node queries the active-tree distance is zero and the weight is the
/// node's sampling weight; for state queries the weight is one.
pub struct NearestDistanceFeatures<F: Float, const N: usize> {
    metric: Box<dyn DistanceMetric<F, N>>,
}

impl<F: Float, const N: usize> NearestDistanceFeatures<F, N> {
    pub fn new(metric: Box<dyn DistanceMetric<F, N>>) -> Self {
        Self { metric }
    }

    fn nearest_distance(
        &self,
        trees: &TreePair<F, N>,
        other: bool,
        state: &RealVectorState<F, N>,
    ) -> F {
        let tree = if other { trees.other() } else { trees.active() };
        tree.closest_index(state, self.metric.as_ref())
            .map(|i| self.metric.distance(tree.state(i), state))
            .unwrap_or_else(F::infinity)
    }
}

impl<F: Float, const N: usize> FeatureExtractor<F, N> for NearestDistanceFeatures<F, N> {
    fn features(&self, query: FeatureQuery<'_, F, N>, trees: &TreePair<F, N>) -> Vec<F> {
        match query {
            FeatureQuery::Node(index) => {
                let node = trees.active().node(index);
                vec![
                    F::zero(),
                    self.nearest_distance(trees, true, node.state()),
                    node.weight(),
                ]
            }
            FeatureQuery::State(state) => vec![
                self.nearest_distance(trees, false, state),
                self.nearest_distance(trees, true, state),
                F::one(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rrt::metric::EuclideanDistance;

    #[test]
    fn distances_to_both_trees() {
        let trees = TreePair::new(
            RealVectorState::new([0.0, 0.0]),
            RealVectorState::new([10.0, 0.0]),
            1.0,
        );
        let extractor = NearestDistanceFeatures::new(Box::new(EuclideanDistance));

        let candidate = RealVectorState::new([3.0, 4.0]);
        let features = extractor.features(FeatureQuery::State(&candidate), &trees);
        assert_eq!(features[0], 5.0);
        assert!((features[1] - 65.0f64.sqrt()).abs() < 1e-12);

        let node_features = extractor.features(FeatureQuery::Node(0), &trees);
        assert_eq!(node_features, vec![0.0, 10.0, 1.0]);
    }
}
