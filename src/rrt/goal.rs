use crate::rrt::state::RealVectorState;
use num_traits::Float;

/// Membership test for the goal region of the forward tree.
pub trait GoalRegion<F: Float, const N: usize> {
    fn contains(&self, state: &RealVectorState<F, N>, goal: &RealVectorState<F, N>) -> bool;
}

/// A ball of radius `tolerance` around the goal state.
#[derive(Clone, Copy, Debug)]
pub struct BallGoalRegion<F: Float> {
    tolerance: F,
}

impl<F: Float> BallGoalRegion<F> {
    pub fn new(tolerance: F) -> Self {
        Self { tolerance }
    }
}

impl<F: Float, const N: usize> GoalRegion<F, N> for BallGoalRegion<F> {
    fn contains(&self, state: &RealVectorState<F, N>, goal: &RealVectorState<F, N>) -> bool {
        state.euclidean_distance_squared(goal) <= self.tolerance * self.tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ball_boundary_is_inside() {
        let region = BallGoalRegion::new(1.0);
        let goal = RealVectorState::new([10.0, 0.0]);
        assert!(region.contains(&RealVectorState::new([9.0, 0.0]), &goal));
        assert!(region.contains(&RealVectorState::new([10.5, 0.5]), &goal));
        assert!(!region.contains(&RealVectorState::new([8.9, 0.0]), &goal));
    }
}
