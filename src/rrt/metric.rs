use crate::rrt::state::RealVectorState;
use num_traits::Float;

/// Distance between two states.
///
/// Nearest-node lookup, radius search and the reach threshold are all judged
/// through this trait, so it needs to be consistent but does not have to be a
/// true metric.
pub trait DistanceMetric<F: Float, const N: usize> {
    fn distance(&self, a: &RealVectorState<F, N>, b: &RealVectorState<F, N>) -> F;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct EuclideanDistance;

impl<F: Float, const N: usize> DistanceMetric<F, N> for EuclideanDistance {
    fn distance(&self, a: &RealVectorState<F, N>, b: &RealVectorState<F, N>) -> F {
        a.euclidean_distance(b)
    }
}
