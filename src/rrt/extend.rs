use crate::config::{to_float, PlannerConfig};
use crate::error::{PlannerError, Result};
use crate::obstacles::Workspace;
use crate::rrt::goal::{BallGoalRegion, GoalRegion};
use crate::rrt::metric::{DistanceMetric, EuclideanDistance};
use crate::rrt::outcome::PlannerStats;
use crate::rrt::state::RealVectorState;
use crate::rrt::steering::{SteerResult, Steering, StraightLineSteering};
use crate::rrt::tree::Tree;
use crate::rrt::validity_checker::ValidityChecker;
use log::trace;
use num_traits::Float;
use std::fmt;

/// Classification of a single extension attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtendOutcome {
    /// The steered path is in collision. Nothing was inserted.
    Blocked,
    /// A node was inserted but the target is not reached yet.
    Advanced,
    /// A node was inserted within the reach threshold of the target.
    Reached,
}

impl fmt::Display for ExtendOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExtendOutcome::Blocked => "Blocked",
            ExtendOutcome::Advanced => "Advanced",
            ExtendOutcome::Reached => "Reached",
        };
        write!(f, "{}", s)
    }
}

/// Result of a single extension attempt.
#[derive(Clone, Copy, Debug)]
pub struct Extension<F: Float> {
    pub outcome: ExtendOutcome,
    /// Index of the inserted node (None if blocked).
    pub new_index: Option<usize>,
    /// Distance from the steered endpoint to the target.
    pub distance_to_target: F,
}

/// The collaborators the planners call through: distance metric, steering,
/// collision checking and the goal region test, plus the reach threshold.
pub struct PlanningContext<F: Float, const N: usize> {
    metric: Box<dyn DistanceMetric<F, N>>,
    steering: Box<dyn Steering<F, N>>,
    validity_checker: Box<dyn ValidityChecker<F, N>>,
    goal_region: Box<dyn GoalRegion<F, N>>,
    reach_threshold: F,
}

impl<F: Float, const N: usize> PlanningContext<F, N> {
    pub fn new(
        metric: Box<dyn DistanceMetric<F, N>>,
        steering: Box<dyn Steering<F, N>>,
        validity_checker: Box<dyn ValidityChecker<F, N>>,
        goal_region: Box<dyn GoalRegion<F, N>>,
        reach_threshold: F,
    ) -> Self {
        Self {
            metric,
            steering,
            validity_checker,
            goal_region,
            reach_threshold,
        }
    }

    /// Euclidean metric, straight-line steering, a ball goal region and the
    /// workspace as validity checker, parameterized from `config`.
    pub fn with_defaults(workspace: Workspace<F, N>, config: &PlannerConfig) -> Result<Self>
    where
        F: 'static,
    {
        config.validate()?;
        let steering = StraightLineSteering::new(
            to_float::<F>(config.max_step)?,
            to_float::<F>(config.steer_resolution)?,
        )?;
        Ok(Self::new(
            Box::new(EuclideanDistance),
            Box::new(steering),
            Box::new(workspace),
            Box::new(BallGoalRegion::new(to_float::<F>(config.goal_tolerance)?)),
            to_float::<F>(config.reach_threshold)?,
        ))
    }

    pub fn metric(&self) -> &dyn DistanceMetric<F, N> {
        self.metric.as_ref()
    }

    pub fn validity_checker(&self) -> &dyn ValidityChecker<F, N> {
        self.validity_checker.as_ref()
    }

    pub fn goal_region(&self) -> &dyn GoalRegion<F, N> {
        self.goal_region.as_ref()
    }

    pub fn reach_threshold(&self) -> F {
        self.reach_threshold
    }

    pub fn distance(&self, a: &RealVectorState<F, N>, b: &RealVectorState<F, N>) -> F {
        self.metric.distance(a, b)
    }

    /// Steers from `from` toward `to` and collision checks the motion.
    ///
    /// Returns `None` when the motion is blocked. Checks are counted either way.
    pub fn steer_checked(
        &self,
        from: &RealVectorState<F, N>,
        to: &RealVectorState<F, N>,
        stats: &mut PlannerStats,
    ) -> Result<Option<SteerResult<F, N>>> {
        let motion = self.steering.steer(from, to);
        if motion.path.is_empty() {
            return Err(PlannerError::EmptySteerPath);
        }
        let check = self.validity_checker.check_path(&motion.path);
        stats.collision_checks += check.checks;
        if check.blocked {
            Ok(None)
        } else {
            Ok(Some(motion))
        }
    }

    /// Grows `tree` one step from node `from_index` toward `target`.
    ///
    /// The endpoint of a collision-free motion is appended as a child of
    /// `from_index` with unit weight.
    pub fn extend(
        &self,
        tree: &mut Tree<F, N>,
        from_index: usize,
        target: &RealVectorState<F, N>,
        stats: &mut PlannerStats,
    ) -> Result<Extension<F>> {
        let from = *tree.state(from_index);
        let motion = match self.steer_checked(&from, target, stats)? {
            Some(motion) => motion,
            None => {
                trace!("Extension from node {} blocked", from_index);
                return Ok(Extension {
                    outcome: ExtendOutcome::Blocked,
                    new_index: None,
                    distance_to_target: self.metric.distance(&from, target),
                });
            }
        };

        let endpoint = *motion.endpoint().ok_or(PlannerError::EmptySteerPath)?;
        let distance_to_target = self.metric.distance(&endpoint, target);
        let new_index = tree.insert_node(endpoint, F::one(), Some(from_index));
        let outcome = if distance_to_target < self.reach_threshold {
            ExtendOutcome::Reached
        } else {
            ExtendOutcome::Advanced
        };
        trace!(
            "Extension from node {} -> node {}: {} ({:?} left)",
            from_index,
            new_index,
            outcome,
            distance_to_target.to_f64()
        );

        Ok(Extension {
            outcome,
            new_index: Some(new_index),
            distance_to_target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacles::Obstacle;

    fn p(x: f64, y: f64) -> RealVectorState<f64, 2> {
        RealVectorState::new([x, y])
    }

    fn context_with_wall() -> PlanningContext<f64, 2> {
        let workspace = Workspace::new(p(-20.0, -20.0), p(20.0, 20.0))
            .unwrap()
            .with_obstacle(Obstacle::aabb(p(4.0, -20.0), p(6.0, 20.0)));
        PlanningContext::with_defaults(workspace, &PlannerConfig::default()).unwrap()
    }

    #[test]
    fn advanced_then_reached() {
        let context = context_with_wall();
        let mut tree = Tree::new(p(0.0, 0.0), 1.0);
        let mut stats = PlannerStats::default();

        let first = context
            .extend(&mut tree, 0, &p(0.0, 1.5), &mut stats)
            .unwrap();
        assert_eq!(first.outcome, ExtendOutcome::Advanced);
        assert_eq!(first.new_index, Some(1));
        assert!(first.distance_to_target >= context.reach_threshold());

        let second = context
            .extend(&mut tree, 1, &p(0.0, 1.5), &mut stats)
            .unwrap();
        assert_eq!(second.outcome, ExtendOutcome::Reached);
        assert!(second.distance_to_target < context.reach_threshold());
        assert_eq!(tree.node(2).parent(), Some(1));
        assert!(stats.collision_checks > 0);
    }

    #[test]
    fn blocked_extension_leaves_tree_untouched() {
        let context = context_with_wall();
        let mut tree = Tree::new(p(3.5, 0.0), 1.0);
        let mut stats = PlannerStats::default();

        let extension = context
            .extend(&mut tree, 0, &p(10.0, 0.0), &mut stats)
            .unwrap();
        assert_eq!(extension.outcome, ExtendOutcome::Blocked);
        assert_eq!(extension.new_index, None);
        assert_eq!(tree.len(), 1);
        assert!(stats.collision_checks > 0);
    }

    struct NoMotion;

    impl Steering<f64, 2> for NoMotion {
        fn steer(&self, _from: &RealVectorState<f64, 2>, _to: &RealVectorState<f64, 2>) -> SteerResult<f64, 2> {
            SteerResult {
                path: Vec::new(),
                cost: 0.0,
            }
        }
    }

    #[test]
    fn empty_steer_path_is_an_error() {
        let context = PlanningContext::new(
            Box::new(EuclideanDistance),
            Box::new(NoMotion),
            Box::new(crate::rrt::validity_checker::AlwaysValid),
            Box::new(BallGoalRegion::new(0.5)),
            0.01,
        );
        let mut tree = Tree::new(p(0.0, 0.0), 1.0);
        let result = context.extend(&mut tree, 0, &p(1.0, 0.0), &mut PlannerStats::default());
        assert!(matches!(result, Err(PlannerError::EmptySteerPath)));
    }
}
