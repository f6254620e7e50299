use crate::error::{PlannerError, Result};
use crate::rrt::state::RealVectorState;
use crate::util::count_as;
use num_traits::Float;

/// Upper bound on the number of interpolation segments in one steered motion.
pub const MAX_STEER_SEGMENTS: usize = 100_000;

/// The result of steering from one state towards another.
#[derive(Clone, Debug)]
pub struct SteerResult<F: Float, const N: usize> {
    /// Ordered states along the motion. The last one is the attempted endpoint.
    pub path: Vec<RealVectorState<F, N>>,
    /// Cost of the motion.
    pub cost: F,
}

impl<F: Float, const N: usize> SteerResult<F, N> {
    pub fn endpoint(&self) -> Option<&RealVectorState<F, N>> {
        self.path.last()
    }
}

/// Produces a candidate motion from one state towards another.
pub trait Steering<F: Float, const N: usize> {
    fn steer(&self, from: &RealVectorState<F, N>, to: &RealVectorState<F, N>) -> SteerResult<F, N>;
}

/// Holonomic steering along the straight line between two states.
///
/// The motion is truncated to `max_step` and interpolated every `resolution`
/// units so the validity checker sees intermediate states. The returned path
/// starts at `from`. A full step may be split into at most
/// `MAX_STEER_SEGMENTS` segments.
#[derive(Clone, Copy, Debug)]
pub struct StraightLineSteering<F: Float> {
    max_step: F,
    resolution: F,
}

impl<F: Float> StraightLineSteering<F> {
    pub fn new(max_step: F, resolution: F) -> Result<Self> {
        if !(max_step > F::zero()) || !(resolution > F::zero()) {
            return Err(PlannerError::InvalidConfig(
                "steering step and resolution must be positive".to_string(),
            ));
        }
        if max_step / resolution > count_as::<F>(MAX_STEER_SEGMENTS) {
            return Err(PlannerError::InvalidConfig(format!(
                "steering resolution splits a step into more than {} segments",
                MAX_STEER_SEGMENTS
            )));
        }
        Ok(Self {
            max_step,
            resolution,
        })
    }
}

impl<F: Float, const N: usize> Steering<F, N> for StraightLineSteering<F> {
    fn steer(&self, from: &RealVectorState<F, N>, to: &RealVectorState<F, N>) -> SteerResult<F, N> {
        let direction = to - from;
        let distance = direction.norm();
        let (endpoint, cost) = if distance > self.max_step {
            (from + &(direction / distance * self.max_step), self.max_step)
        } else {
            (*to, distance)
        };

        let mut path = vec![*from];
        if cost > F::zero() {
            let segments = (cost / self.resolution)
                .ceil()
                .to_usize()
                .unwrap_or(1)
                .clamp(1, MAX_STEER_SEGMENTS);
            let n = count_as::<F>(segments);
            for i in 1..segments {
                path.push(from.lerp(&endpoint, count_as::<F>(i) / n));
            }
            path.push(endpoint);
        }

        SteerResult { path, cost }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn truncates_to_max_step() {
        let steering = StraightLineSteering::new(1.0, 0.25).unwrap();
        let from = RealVectorState::new([0.0, 0.0]);
        let to = RealVectorState::new([10.0, 0.0]);
        let result = steering.steer(&from, &to);

        assert_relative_eq!(result.cost, 1.0);
        assert_eq!(result.path.first(), Some(&from));
        let end = result.endpoint().unwrap();
        assert_relative_eq!(end[0], 1.0);
        assert_relative_eq!(end[1], 0.0);
        for pair in result.path.windows(2) {
            assert!(pair[0].euclidean_distance(&pair[1]) <= 0.25 + 1e-9);
        }
    }

    #[test]
    fn reaches_nearby_target_exactly() {
        let steering = StraightLineSteering::new(1.0, 0.1).unwrap();
        let from = RealVectorState::new([0.0, 0.0]);
        let to = RealVectorState::new([0.3, 0.4]);
        let result = steering.steer(&from, &to);
        assert_eq!(result.endpoint(), Some(&to));
        assert_relative_eq!(result.cost, 0.5);
    }

    #[test]
    fn zero_length_motion_is_single_state() {
        let steering = StraightLineSteering::new(1.0, 0.1).unwrap();
        let from = RealVectorState::new([2.0, 2.0]);
        let result = steering.steer(&from, &from);
        assert_eq!(result.path, vec![from]);
        assert_eq!(result.cost, 0.0);
    }

    #[test]
    fn fine_f32_resolution_terminates() {
        let steering = StraightLineSteering::<f32>::new(1.0, 1e-4).unwrap();
        let from = RealVectorState::new([0.0f32, 0.0]);
        let to = RealVectorState::new([10.0f32, 0.0]);
        let result = steering.steer(&from, &to);

        assert!(result.path.len() >= 10_000 && result.path.len() <= 10_002);
        assert_eq!(result.path.first(), Some(&from));
        assert_eq!(result.endpoint(), Some(&RealVectorState::new([1.0f32, 0.0])));
        for pair in result.path.windows(2) {
            assert!(pair[0].euclidean_distance(&pair[1]) <= 1.01e-4);
            assert!(pair[1][0] > pair[0][0]);
        }
    }

    #[test]
    fn rejects_resolution_below_float_precision() {
        assert!(StraightLineSteering::<f32>::new(1.0, 1e-8).is_err());
        assert!(StraightLineSteering::<f64>::new(1.0, 1e-6).is_err());
    }

    #[test]
    fn rejects_non_positive_parameters() {
        assert!(StraightLineSteering::new(0.0, 0.1).is_err());
        assert!(StraightLineSteering::new(1.0, -0.1).is_err());
    }
}
