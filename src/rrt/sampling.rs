use crate::error::{PlannerError, Result};
use crate::rrt::state::RealVectorState;
use num_traits::Float;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A distribution that random candidate states are drawn from.
pub trait SamplingDistribution<F: Float, const N: usize> {
    fn sample(&mut self) -> RealVectorState<F, N>;

    /// Restarts the sequence of samples. Seeded distributions repeat their
    /// first draws after this; the default does nothing.
    fn reset(&mut self) {}
}

/// Uniform distribution over an axis-aligned box.
pub struct UniformDistribution<F: Float, const N: usize> {
    ranges: [(f64, f64); N],
    rng: StdRng,
    seed: Option<u64>,
    _phantom: std::marker::PhantomData<F>,
}

impl<F: Float, const N: usize> UniformDistribution<F, N> {
    /// Constructs a new uniform distribution seeded from entropy.
    ///
    /// Parameters:
    /// - `ranges`: The `(min, max)` range of each dimension.
    pub fn new(ranges: [(F, F); N]) -> Result<Self> {
        Self::with_optional_seed(ranges, None)
    }

    /// Constructs a new uniform distribution with a reproducible seed.
    pub fn with_seed(ranges: [(F, F); N], seed: u64) -> Result<Self> {
        Self::with_optional_seed(ranges, Some(seed))
    }

    fn with_optional_seed(ranges: [(F, F); N], seed: Option<u64>) -> Result<Self> {
        let mut converted = [(0.0, 0.0); N];
        for (i, (min, max)) in ranges.iter().enumerate() {
            let (min, max) = match (min.to_f64(), max.to_f64()) {
                (Some(min), Some(max)) if min.is_finite() && max.is_finite() => (min, max),
                _ => {
                    return Err(PlannerError::InvalidConfig(format!(
                        "sampling range {} is not finite",
                        i
                    )))
                }
            };
            if min > max {
                return Err(PlannerError::InvalidConfig(format!(
                    "sampling range {} has min {} greater than max {}",
                    i, min, max
                )));
            }
            converted[i] = (min, max);
        }
        Ok(Self {
            ranges: converted,
            rng: seeded_rng(seed),
            seed,
            _phantom: std::marker::PhantomData,
        })
    }
}

impl<F: Float, const N: usize> SamplingDistribution<F, N> for UniformDistribution<F, N> {
    fn sample(&mut self) -> RealVectorState<F, N> {
        let mut state = RealVectorState::zeros();
        for (i, &(min, max)) in self.ranges.iter().enumerate() {
            let value = if min < max {
                self.rng.gen_range(min..max)
            } else {
                min
            };
            state[i] = F::from(value).unwrap_or_else(F::zero);
        }
        state
    }

    fn reset(&mut self) {
        if let Some(seed) = self.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Uniform distribution which returns the goal with probability `goal_bias`.
pub struct GoalBiasedUniformDistribution<F: Float, const N: usize> {
    uniform: UniformDistribution<F, N>,
    goal: RealVectorState<F, N>,
    goal_bias: f64,
}

impl<F: Float, const N: usize> GoalBiasedUniformDistribution<F, N> {
    pub fn new(ranges: [(F, F); N], goal: RealVectorState<F, N>, goal_bias: F) -> Result<Self> {
        Self::from_uniform(UniformDistribution::new(ranges)?, goal, goal_bias)
    }

    pub fn with_seed(
        ranges: [(F, F); N],
        goal: RealVectorState<F, N>,
        goal_bias: F,
        seed: u64,
    ) -> Result<Self> {
        Self::from_uniform(UniformDistribution::with_seed(ranges, seed)?, goal, goal_bias)
    }

    fn from_uniform(
        uniform: UniformDistribution<F, N>,
        goal: RealVectorState<F, N>,
        goal_bias: F,
    ) -> Result<Self> {
        let goal_bias = goal_bias.to_f64().unwrap_or(f64::NAN);
        if !(0.0..=1.0).contains(&goal_bias) {
            return Err(PlannerError::InvalidConfig(
                "goal bias must be within [0, 1]".to_string(),
            ));
        }
        Ok(Self {
            uniform,
            goal,
            goal_bias,
        })
    }
}

impl<F: Float, const N: usize> SamplingDistribution<F, N> for GoalBiasedUniformDistribution<F, N> {
    fn sample(&mut self) -> RealVectorState<F, N> {
        if self.uniform.rng.gen::<f64>() < self.goal_bias {
            self.goal
        } else {
            self.uniform.sample()
        }
    }

    fn reset(&mut self) {
        self.uniform.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_stays_in_range() {
        let mut distribution =
            UniformDistribution::<f64, 2>::with_seed([(-1.0, 1.0), (5.0, 6.0)], 7).unwrap();
        for _ in 0..1000 {
            let s = distribution.sample();
            assert!(s[0] >= -1.0 && s[0] < 1.0);
            assert!(s[1] >= 5.0 && s[1] < 6.0);
        }
    }

    #[test]
    fn degenerate_range_is_constant() {
        let mut distribution =
            UniformDistribution::<f64, 2>::with_seed([(3.0, 3.0), (0.0, 1.0)], 1).unwrap();
        assert_eq!(distribution.sample()[0], 3.0);
    }

    #[test]
    fn seeded_reset_repeats_samples() {
        let goal = RealVectorState::new([0.5, 0.5]);
        let mut distribution =
            GoalBiasedUniformDistribution::<f64, 2>::with_seed([(0.0, 1.0), (0.0, 1.0)], goal, 0.2, 5)
                .unwrap();
        let first: Vec<_> = (0..20).map(|_| distribution.sample()).collect();
        distribution.reset();
        let second: Vec<_> = (0..20).map(|_| distribution.sample()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        assert!(UniformDistribution::<f64, 1>::new([(1.0, 0.0)]).is_err());
        assert!(UniformDistribution::<f64, 1>::new([(0.0, f64::INFINITY)]).is_err());
    }

    #[test]
    fn full_goal_bias_always_returns_goal() {
        let goal = RealVectorState::new([4.0, 4.0]);
        let mut distribution =
            GoalBiasedUniformDistribution::with_seed([(0.0, 1.0), (0.0, 1.0)], goal, 1.0, 3)
                .unwrap();
        for _ in 0..10 {
            assert_eq!(distribution.sample(), goal);
        }
        assert!(GoalBiasedUniformDistribution::new([(0.0, 1.0)], RealVectorState::new([0.0]), 1.5)
            .is_err());
    }
}
