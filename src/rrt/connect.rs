use crate::error::{PlannerError, Result};
use crate::rrt::extend::{ExtendOutcome, PlanningContext};
use crate::rrt::features::{FeatureExtractor, FeatureQuery};
use crate::rrt::outcome::{PlannerStats, RoundOutcome};
use crate::rrt::path::{extract_path, GoalIndices, PlannedPath};
use crate::rrt::planner::Planner;
use crate::rrt::policy::DecisionPolicy;
use crate::rrt::sampling::SamplingDistribution;
use crate::rrt::state::RealVectorState;
use crate::rrt::tree_pair::{TreePair, TreeSide};
use crate::util::count_as;
use log::{debug, info};
use num_traits::Float;

/// The result of one step of the step-driven planner.
#[derive(Clone, Debug)]
pub struct StepResult<F: Float> {
    /// Features of the next candidate.
    pub features: Vec<F>,
    /// Step penalty plus one per added node and one per collision, negated.
    pub reward: F,
    /// True once a path was found.
    pub done: bool,
    pub outcome: RoundOutcome,
}

/// Bidirectional RRT-Connect.
///
/// Every step offers one random candidate to the active tree. If the candidate
/// is accepted the active tree extends toward it and the other tree greedily
/// tries to connect to the new node. The active tree alternates after every
/// step.
///
/// There is no built-in iteration cap: drivers keep stepping until a path is
/// found or their own budget runs out.
pub struct RRTConnect<F: Float, const N: usize> {
    start: RealVectorState<F, N>,
    goal: RealVectorState<F, N>,
    context: PlanningContext<F, N>,
    sampling_distribution: Box<dyn SamplingDistribution<F, N>>,
    feature_extractor: Box<dyn FeatureExtractor<F, N>>,
    policy: Box<dyn DecisionPolicy<F>>,
    step_penalty: F,

    trees: TreePair<F, N>,
    found_path: bool,
    goal_indices: GoalIndices,
    stats: PlannerStats,

    /// Candidate offered in the next step and its features.
    candidate: RealVectorState<F, N>,
    features: Vec<F>,
}

impl<F: Float, const N: usize> RRTConnect<F, N> {
    /// Constructs a new RRT-Connect planner, ready for its first step.
    ///
    /// Parameters:
    /// - `start`: Root of the forward tree.
    /// - `goal`: Root of the backward tree and center of the goal region.
    /// - `context`: Metric, steering, collision checking and goal test.
    /// - `sampling_distribution`: Source of candidate targets.
    /// - `feature_extractor`: Features handed to the decision policy.
    /// - `policy`: Used by `Planner::round` to accept or reject candidates.
    /// - `step_penalty`: Reward penalty applied on every step.
    pub fn new(
        start: RealVectorState<F, N>,
        goal: RealVectorState<F, N>,
        context: PlanningContext<F, N>,
        sampling_distribution: Box<dyn SamplingDistribution<F, N>>,
        feature_extractor: Box<dyn FeatureExtractor<F, N>>,
        policy: Box<dyn DecisionPolicy<F>>,
        step_penalty: F,
    ) -> Self {
        let mut planner = Self {
            start,
            goal,
            context,
            sampling_distribution,
            feature_extractor,
            policy,
            step_penalty,
            trees: TreePair::new(start, goal, F::one()),
            found_path: false,
            goal_indices: GoalIndices::default(),
            stats: PlannerStats::default(),
            candidate: start,
            features: Vec::new(),
        };
        planner.restart();
        planner
    }

    /// Features of the candidate offered in the next step.
    pub fn features(&self) -> &[F] {
        &self.features
    }

    /// Runs one step with an external accept/reject decision for the current candidate.
    pub fn step(&mut self, accept: bool) -> Result<StepResult<F>> {
        if self.found_path {
            return Ok(StepResult {
                features: self.features.clone(),
                reward: F::zero(),
                done: true,
                outcome: RoundOutcome::AlreadySolved,
            });
        }

        let nodes_before = self.trees.node_count();
        let collisions_before = self.stats.collisions;
        self.stats.rounds += 1;

        let outcome = if accept {
            let target = self.candidate;
            self.connect_round(&target)?
        } else {
            RoundOutcome::Rejected
        };
        debug!(
            "Round {} on the {} tree: {}",
            self.stats.rounds,
            self.trees.active_side(),
            outcome
        );

        // The trees are frozen once a path exists.
        if !self.found_path {
            self.trees.swap_active();
            self.draw_candidate();
        }

        let nodes_added = self.trees.node_count() - nodes_before;
        let collisions_added = self.stats.collisions - collisions_before;
        let reward = -self.step_penalty - count_as::<F>(nodes_added) - count_as::<F>(collisions_added);

        Ok(StepResult {
            features: self.features.clone(),
            reward,
            done: self.found_path,
            outcome,
        })
    }

    fn restart(&mut self) -> Vec<F> {
        self.trees = TreePair::new(self.start, self.goal, F::one());
        self.found_path = false;
        self.goal_indices = GoalIndices::default();
        self.stats = PlannerStats::default();
        self.sampling_distribution.reset();
        self.draw_candidate();
        debug!("RRT-Connect reset");
        self.features.clone()
    }

    fn draw_candidate(&mut self) {
        self.candidate = self.sampling_distribution.sample();
        self.stats.samples_drawn += 1;
        self.features = self
            .feature_extractor
            .features(FeatureQuery::State(&self.candidate), &self.trees);
    }

    /// Extends the active tree toward `target`, then greedily connects the other tree.
    fn connect_round(&mut self, target: &RealVectorState<F, N>) -> Result<RoundOutcome> {
        let active_side = self.trees.active_side();
        let nearest = self
            .trees
            .active()
            .closest_index(target, self.context.metric())
            .ok_or(PlannerError::EmptyTree)?;
        let extension =
            self.context
                .extend(self.trees.active_mut(), nearest, target, &mut self.stats)?;
        let new_index = match extension.new_index {
            Some(index) => index,
            None => {
                self.stats.collisions += 1;
                return Ok(RoundOutcome::Blocked);
            }
        };
        let new_state = *self.trees.active().state(new_index);

        if active_side == TreeSide::Forward
            && self.context.goal_region().contains(&new_state, &self.goal)
        {
            self.goal_indices.forward = Some(new_index);
            self.found_path = true;
            self.log_solution("forward tree reached the goal region");
            return Ok(RoundOutcome::GoalReached);
        }

        let mut last_distance = F::infinity();
        loop {
            let other = self.trees.other_mut();
            let nearest = other
                .closest_index(&new_state, self.context.metric())
                .ok_or(PlannerError::EmptyTree)?;
            let extension = self
                .context
                .extend(other, nearest, &new_state, &mut self.stats)?;

            match (extension.outcome, extension.new_index) {
                (ExtendOutcome::Reached, Some(other_index)) => {
                    self.goal_indices.set(active_side, new_index);
                    self.goal_indices.set(active_side.opposite(), other_index);
                    self.found_path = true;
                    self.log_solution("trees connected");
                    return Ok(RoundOutcome::Connected);
                }
                (ExtendOutcome::Advanced, Some(_))
                    if extension.distance_to_target < last_distance =>
                {
                    last_distance = extension.distance_to_target;
                }
                (ExtendOutcome::Advanced, _) => {
                    debug!("Connection stalled without getting closer to the new node");
                    return Ok(RoundOutcome::Extended);
                }
                _ => {
                    self.stats.collisions += 1;
                    return Ok(RoundOutcome::Extended);
                }
            }
        }
    }

    fn log_solution(&self, reason: &str) {
        info!(
            "Path found ({}): forward tree {} nodes, backward tree {} nodes, {}",
            reason,
            self.trees.forward().len(),
            self.trees.backward().len(),
            self.stats
        );
    }
}

impl<F: Float, const N: usize> Planner<F, N> for RRTConnect<F, N> {
    fn reset(&mut self) -> Vec<F> {
        self.restart()
    }

    fn round(&mut self) -> Result<RoundOutcome> {
        let accept = self.policy.accept(&self.features);
        Ok(self.step(accept)?.outcome)
    }

    fn found_path(&self) -> bool {
        self.found_path
    }

    fn goal_indices(&self) -> &GoalIndices {
        &self.goal_indices
    }

    fn trees(&self) -> &TreePair<F, N> {
        &self.trees
    }

    fn stats(&self) -> &PlannerStats {
        &self.stats
    }

    fn get_path(&self) -> Result<PlannedPath<F, N>> {
        if !self.found_path {
            return Err(PlannerError::PathNotFound);
        }
        extract_path(&self.trees, &self.goal_indices, self.context.metric())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlannerConfig;
    use crate::obstacles::{Obstacle, Workspace};
    use crate::rrt::features::NearestDistanceFeatures;
    use crate::rrt::metric::EuclideanDistance;
    use crate::rrt::policy::{AcceptAll, FnPolicy};
    use crate::rrt::sampling::UniformDistribution;

    fn p(x: f64, y: f64) -> RealVectorState<f64, 2> {
        RealVectorState::new([x, y])
    }

    fn planner(workspace: Workspace<f64, 2>, seed: u64) -> RRTConnect<f64, 2> {
        planner_with(workspace, seed, &PlannerConfig::default())
    }

    fn planner_with(
        workspace: Workspace<f64, 2>,
        seed: u64,
        config: &PlannerConfig,
    ) -> RRTConnect<f64, 2> {
        let ranges = workspace.ranges();
        let context = PlanningContext::with_defaults(workspace, config).unwrap();
        RRTConnect::new(
            p(0.0, 0.0),
            p(10.0, 0.0),
            context,
            Box::new(UniformDistribution::with_seed(ranges, seed).unwrap()),
            Box::new(NearestDistanceFeatures::new(Box::new(EuclideanDistance))),
            Box::new(AcceptAll),
            0.01,
        )
    }

    fn open_space() -> Workspace<f64, 2> {
        Workspace::new(p(-5.0, -5.0), p(15.0, 5.0)).unwrap()
    }

    #[test]
    fn reset_offers_a_candidate() {
        let mut rrt = planner(open_space(), 1);
        let features = rrt.reset();
        assert_eq!(features.len(), 3);
        assert_eq!(rrt.trees().node_count(), 2);
        assert_eq!(rrt.stats().samples_drawn, 1);
    }

    #[test]
    fn rejected_step_only_alternates() {
        let mut rrt = planner(open_space(), 2);
        let result = rrt.step(false).unwrap();
        assert_eq!(result.outcome, RoundOutcome::Rejected);
        assert_eq!(rrt.trees().node_count(), 2);
        assert_eq!(rrt.trees().active_side(), TreeSide::Backward);
        assert!((result.reward + 0.01).abs() < 1e-12);
    }

    #[test]
    fn open_space_connects_on_first_accepted_step() {
        let mut rrt = planner(open_space(), 3);
        let result = rrt.step(true).unwrap();
        assert!(result.done);
        assert!(result.outcome.is_success());
        assert!(result.reward < -1.0);

        let path = rrt.get_path().unwrap();
        assert_eq!(path.states.first(), Some(&p(0.0, 0.0)));
        assert_eq!(path.states.last(), Some(&p(10.0, 0.0)));
    }

    #[test]
    fn solved_planner_is_frozen() {
        let mut rrt = planner(open_space(), 4);
        while !rrt.step(true).unwrap().done {}
        let nodes = rrt.trees().node_count();
        let side = rrt.trees().active_side();

        let result = rrt.step(true).unwrap();
        assert_eq!(result.outcome, RoundOutcome::AlreadySolved);
        assert_eq!(result.reward, 0.0);
        assert_eq!(rrt.trees().node_count(), nodes);
        assert_eq!(rrt.trees().active_side(), side);
    }

    #[test]
    fn get_path_before_success_fails() {
        let rrt = planner(open_space(), 5);
        assert!(matches!(rrt.get_path(), Err(PlannerError::PathNotFound)));
    }

    #[test]
    fn wall_blocks_every_connection() {
        let workspace = Workspace::new(p(-20.0, -20.0), p(20.0, 20.0))
            .unwrap()
            .with_obstacle(Obstacle::aabb(p(4.0, -20.0), p(6.0, 20.0)));
        let mut rrt = planner(workspace, 6);
        for _ in 0..500 {
            assert!(!rrt.step(true).unwrap().done);
        }
        assert!(rrt.stats().collisions > 0);
        assert!(rrt.stats().collision_checks > 0);
    }

    #[test]
    fn forward_tree_in_goal_region_solves_without_connecting() {
        // Every state in the workspace is inside this goal region.
        let config = PlannerConfig {
            goal_tolerance: 30.0,
            ..PlannerConfig::default()
        };
        let mut rrt = planner_with(open_space(), 8, &config);
        let result = rrt.step(true).unwrap();
        assert_eq!(result.outcome, RoundOutcome::GoalReached);
        assert!(result.done);

        let goal_indices = *rrt.goal_indices();
        assert_eq!(goal_indices.forward, Some(1));
        assert!(goal_indices.backward.is_none());
        assert_eq!(rrt.trees().backward().len(), 1);

        let path = rrt.get_path().unwrap();
        assert_eq!(path.states.len(), 2);
        assert_eq!(path.states.first(), Some(&p(0.0, 0.0)));
        assert_eq!(path.states.last(), Some(rrt.trees().forward().state(1)));
    }

    #[test]
    fn seeded_reset_repeats_the_first_run() {
        let workspace = Workspace::new(p(-20.0, -20.0), p(20.0, 20.0))
            .unwrap()
            .with_obstacle(Obstacle::aabb(p(4.0, -20.0), p(6.0, 20.0)));
        let mut rrt = planner(workspace, 9);
        let first_features = rrt.features().to_vec();
        for _ in 0..30 {
            rrt.step(true).unwrap();
        }
        let first_run: Vec<_> = rrt.trees().forward().nodes().iter().map(|n| *n.state()).collect();
        let first_stats = *rrt.stats();

        assert_eq!(rrt.reset(), first_features);
        for _ in 0..30 {
            rrt.step(true).unwrap();
        }
        let second_run: Vec<_> = rrt.trees().forward().nodes().iter().map(|n| *n.state()).collect();
        assert_eq!(first_run, second_run);
        assert_eq!(*rrt.stats(), first_stats);
    }

    #[test]
    fn policy_drives_rounds() {
        let mut rrt = planner(open_space(), 7);
        rrt.policy = Box::new(FnPolicy(|_: &[f64]| false));
        for _ in 0..20 {
            assert_eq!(rrt.round().unwrap(), RoundOutcome::Rejected);
        }
        assert_eq!(rrt.trees().node_count(), 2);
        assert_eq!(rrt.stats().rounds, 20);
    }
}
