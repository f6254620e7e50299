use crate::config::{to_float, PlannerConfig, PlannerKind};
use crate::error::{PlannerError, Result};
use crate::rrt::connect::RRTConnect;
use crate::rrt::est::{EstParams, WeightedEst};
use crate::rrt::extend::PlanningContext;
use crate::rrt::features::{FeatureExtractor, NoFeatures};
use crate::rrt::outcome::{PlannerStats, RoundOutcome};
use crate::rrt::path::{GoalIndices, PlannedPath};
use crate::rrt::policy::{AcceptAll, DecisionPolicy};
use crate::rrt::sampling::SamplingDistribution;
use crate::rrt::state::RealVectorState;
use crate::rrt::termination::TerminationCondition;
use crate::rrt::tree_pair::TreePair;
use num_traits::Float;

/// A bidirectional tree-growing planner.
///
/// A round is one atomic unit of growth. Rounds on a solved planner do
/// nothing and report `RoundOutcome::AlreadySolved`.
pub trait Planner<F: Float, const N: usize> {
    /// Discards both trees and starts a new attempt.
    ///
    /// Returns the features of the first candidate, or nothing when the
    /// strategy draws candidates lazily.
    fn reset(&mut self) -> Vec<F>;

    /// Runs a single round.
    fn round(&mut self) -> Result<RoundOutcome>;

    /// Returns true if a path was found.
    fn found_path(&self) -> bool;

    fn goal_indices(&self) -> &GoalIndices;

    fn trees(&self) -> &TreePair<F, N>;

    fn stats(&self) -> &PlannerStats;

    /// Returns the start-to-goal path, failing if none was found yet.
    fn get_path(&self) -> Result<PlannedPath<F, N>>;

    /// Attempts to find a solution.
    ///
    /// Returns true when a solution is found, or false once the termination
    /// condition is met.
    fn plan_until_solved_or(&mut self, termination: &mut dyn TerminationCondition) -> Result<bool> {
        loop {
            if self.found_path() {
                return Ok(true);
            }
            if termination.evaluate() {
                return Ok(false);
            }
            self.round()?;
        }
    }

    /// Runs at most `rounds` rounds, stopping early on success.
    fn run_rounds(&mut self, rounds: usize) -> Result<bool> {
        for _ in 0..rounds {
            if self.found_path() {
                break;
            }
            self.round()?;
        }
        Ok(self.found_path())
    }
}

/// Assembles a planner of the kind named in the configuration.
pub struct PlannerBuilder<F: Float, const N: usize> {
    start: RealVectorState<F, N>,
    goal: RealVectorState<F, N>,
    context: PlanningContext<F, N>,
    config: PlannerConfig,
    sampling_distribution: Option<Box<dyn SamplingDistribution<F, N>>>,
    feature_extractor: Option<Box<dyn FeatureExtractor<F, N>>>,
    policy: Option<Box<dyn DecisionPolicy<F>>>,
}

impl<F: Float + 'static, const N: usize> PlannerBuilder<F, N> {
    pub fn new(
        start: RealVectorState<F, N>,
        goal: RealVectorState<F, N>,
        context: PlanningContext<F, N>,
    ) -> Self {
        Self {
            start,
            goal,
            context,
            config: PlannerConfig::default(),
            sampling_distribution: None,
            feature_extractor: None,
            policy: None,
        }
    }

    pub fn config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    /// Candidate source for RRT-Connect. Required for that kind, unused by EST.
    pub fn sampling_distribution(mut self, distribution: Box<dyn SamplingDistribution<F, N>>) -> Self {
        self.sampling_distribution = Some(distribution);
        self
    }

    pub fn feature_extractor(mut self, extractor: Box<dyn FeatureExtractor<F, N>>) -> Self {
        self.feature_extractor = Some(extractor);
        self
    }

    pub fn policy(mut self, policy: Box<dyn DecisionPolicy<F>>) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn build(self) -> Result<Box<dyn Planner<F, N>>> {
        self.config.validate()?;
        let feature_extractor: Box<dyn FeatureExtractor<F, N>> = match self.feature_extractor {
            Some(extractor) => extractor,
            None => Box::new(NoFeatures),
        };
        let policy: Box<dyn DecisionPolicy<F>> = match self.policy {
            Some(policy) => policy,
            None => Box::new(AcceptAll),
        };

        match self.config.kind {
            PlannerKind::Connect => {
                let sampling_distribution = self.sampling_distribution.ok_or_else(|| {
                    PlannerError::InvalidConfig(
                        "RRT-Connect needs a sampling distribution".to_string(),
                    )
                })?;
                Ok(Box::new(RRTConnect::new(
                    self.start,
                    self.goal,
                    self.context,
                    sampling_distribution,
                    feature_extractor,
                    policy,
                    to_float(self.config.step_penalty)?,
                )))
            }
            PlannerKind::Est => {
                let params = EstParams::from_config(&self.config)?;
                Ok(Box::new(WeightedEst::new(
                    self.start,
                    self.goal,
                    self.context,
                    feature_extractor,
                    policy,
                    params,
                )))
            }
        }
    }
}
