use crate::rrt::state::RealVectorState;
use num_traits::Float;

/// The outcome of checking a steered path for collisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathCheck {
    /// True when the path is in collision.
    pub blocked: bool,
    /// Number of state and edge checks performed.
    pub checks: usize,
}

/// Checks if a state or edge is valid (i.e., not in collision).
pub trait ValidityChecker<F: Float, const N: usize> {
    /// Checks if a state is valid (i.e., does not collide with obstacles).
    fn is_state_valid(&self, state: &RealVectorState<F, N>) -> bool;

    /// Checks if the straight edge between two states is valid.
    fn is_edge_valid(&self, a: &RealVectorState<F, N>, b: &RealVectorState<F, N>) -> bool;

    /// Checks every state of a path and every edge between consecutive states.
    ///
    /// Stops at the first collision. The returned count includes the failing check.
    fn check_path(&self, path: &[RealVectorState<F, N>]) -> PathCheck {
        let mut checks = 0;
        for (i, state) in path.iter().enumerate() {
            checks += 1;
            if !self.is_state_valid(state) {
                return PathCheck {
                    blocked: true,
                    checks,
                };
            }
            if i > 0 {
                checks += 1;
                if !self.is_edge_valid(&path[i - 1], state) {
                    return PathCheck {
                        blocked: true,
                        checks,
                    };
                }
            }
        }
        PathCheck {
            blocked: false,
            checks,
        }
    }
}

/// A validity checker for an empty space.
pub struct AlwaysValid;

impl<F: Float, const N: usize> ValidityChecker<F, N> for AlwaysValid {
    fn is_state_valid(&self, _state: &RealVectorState<F, N>) -> bool {
        true
    }

    fn is_edge_valid(&self, _a: &RealVectorState<F, N>, _b: &RealVectorState<F, N>) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Everything with a negative x coordinate is in collision.
    struct HalfPlane;

    impl ValidityChecker<f64, 2> for HalfPlane {
        fn is_state_valid(&self, state: &RealVectorState<f64, 2>) -> bool {
            state[0] >= 0.0
        }

        fn is_edge_valid(&self, a: &RealVectorState<f64, 2>, b: &RealVectorState<f64, 2>) -> bool {
            a[0] >= 0.0 && b[0] >= 0.0
        }
    }

    #[test]
    fn free_path_counts_all_checks() {
        let path = vec![
            RealVectorState::new([0.0, 0.0]),
            RealVectorState::new([1.0, 0.0]),
            RealVectorState::new([2.0, 0.0]),
        ];
        let check = HalfPlane.check_path(&path);
        assert!(!check.blocked);
        assert_eq!(check.checks, 5);
    }

    #[test]
    fn stops_at_first_collision() {
        let path = vec![
            RealVectorState::new([1.0, 0.0]),
            RealVectorState::new([-1.0, 0.0]),
            RealVectorState::new([-2.0, 0.0]),
        ];
        let check = HalfPlane.check_path(&path);
        assert!(check.blocked);
        assert_eq!(check.checks, 2);
    }

    #[test]
    fn always_valid_never_blocks() {
        let path = vec![RealVectorState::new([-5.0, 0.0]); 3];
        let check = ValidityChecker::<f64, 2>::check_path(&AlwaysValid, &path);
        assert!(!check.blocked);
    }
}
