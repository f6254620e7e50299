use num_traits::Float;

/// Decides whether candidates are used to grow a tree.
///
/// A learned policy plugs in here; the planners only see accept or reject.
pub trait DecisionPolicy<F: Float> {
    fn accept(&mut self, features: &[F]) -> bool;

    /// Decides a batch of candidates at once. One decision per feature vector.
    fn accept_batch(&mut self, batch: &[Vec<F>]) -> Vec<bool> {
        batch.iter().map(|features| self.accept(features)).collect()
    }
}

/// Accepts every candidate, which turns the planners into their plain variants.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll;

impl<F: Float> DecisionPolicy<F> for AcceptAll {
    fn accept(&mut self, _features: &[F]) -> bool {
        true
    }
}

/// Wraps a closure as a policy.
pub struct FnPolicy<P>(pub P);

impl<F: Float, P: FnMut(&[F]) -> bool> DecisionPolicy<F> for FnPolicy<P> {
    fn accept(&mut self, features: &[F]) -> bool {
        (self.0)(features)
    }
}
