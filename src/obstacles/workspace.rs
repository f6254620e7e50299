use crate::error::{PlannerError, Result};
use crate::obstacles::Obstacle;
use crate::rrt::state::RealVectorState;
use crate::rrt::validity_checker::ValidityChecker;
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// A bounded workspace populated with static obstacles.
///
/// States outside the bounds are in collision. Since the bounds are convex an
/// edge is inside them whenever both endpoints are.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Workspace<F: Float, const N: usize> {
    lower: RealVectorState<F, N>,
    upper: RealVectorState<F, N>,
    obstacles: Vec<Obstacle<F, N>>,
}

impl<F: Float, const N: usize> Workspace<F, N> {
    pub fn new(lower: RealVectorState<F, N>, upper: RealVectorState<F, N>) -> Result<Self> {
        if (0..N).any(|i| !(lower[i] <= upper[i])) {
            return Err(PlannerError::InvalidConfig(
                "workspace lower bound must not exceed the upper bound".to_string(),
            ));
        }
        Ok(Self {
            lower,
            upper,
            obstacles: Vec::new(),
        })
    }

    pub fn with_obstacle(mut self, obstacle: Obstacle<F, N>) -> Self {
        self.obstacles.push(obstacle);
        self
    }

    pub fn add_obstacle(&mut self, obstacle: Obstacle<F, N>) {
        self.obstacles.push(obstacle);
    }

    pub fn obstacles(&self) -> &[Obstacle<F, N>] {
        &self.obstacles
    }

    /// Per-axis `(min, max)` ranges of the workspace bounds.
    pub fn ranges(&self) -> [(F, F); N] {
        let mut ranges = [(F::zero(), F::zero()); N];
        for (i, range) in ranges.iter_mut().enumerate() {
            *range = (self.lower[i], self.upper[i]);
        }
        ranges
    }

    pub fn in_bounds(&self, state: &RealVectorState<F, N>) -> bool {
        (0..N).all(|i| state[i] >= self.lower[i] && state[i] <= self.upper[i])
    }
}

impl<F: Float, const N: usize> ValidityChecker<F, N> for Workspace<F, N> {
    fn is_state_valid(&self, state: &RealVectorState<F, N>) -> bool {
        self.in_bounds(state) && self.obstacles.iter().all(|o| !o.contains(state))
    }

    fn is_edge_valid(&self, a: &RealVectorState<F, N>, b: &RealVectorState<F, N>) -> bool {
        self.in_bounds(a)
            && self.in_bounds(b)
            && self.obstacles.iter().all(|o| !o.intersects_segment(a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> RealVectorState<f64, 2> {
        RealVectorState::new([x, y])
    }

    #[test]
    fn rejects_inverted_bounds() {
        assert!(Workspace::new(p(1.0, 0.0), p(0.0, 1.0)).is_err());
    }

    #[test]
    fn bounds_and_obstacles_block() {
        let workspace = Workspace::new(p(-10.0, -10.0), p(10.0, 10.0))
            .unwrap()
            .with_obstacle(Obstacle::ball(p(0.0, 0.0), 1.0));

        assert!(workspace.is_state_valid(&p(5.0, 5.0)));
        assert!(!workspace.is_state_valid(&p(11.0, 0.0)));
        assert!(!workspace.is_state_valid(&p(0.5, 0.0)));
        assert!(!workspace.is_edge_valid(&p(-5.0, 0.0), &p(5.0, 0.0)));
        assert!(workspace.is_edge_valid(&p(-5.0, 5.0), &p(5.0, 5.0)));
        assert_eq!(workspace.ranges(), [(-10.0, 10.0), (-10.0, 10.0)]);
    }
}
