use crate::config::{to_float, PlannerConfig};
use crate::error::{PlannerError, Result};
use crate::rrt::extend::PlanningContext;
use crate::rrt::features::{FeatureExtractor, FeatureQuery};
use crate::rrt::outcome::{PlannerStats, RoundOutcome};
use crate::rrt::path::{extract_path, GoalIndices, PlannedPath};
use crate::rrt::planner::Planner;
use crate::rrt::policy::{AcceptAll, DecisionPolicy};
use crate::rrt::state::RealVectorState;
use crate::rrt::termination::TerminationCondition;
use crate::rrt::tree::Tree;
use crate::rrt::tree_pair::{TreePair, TreeSide};
use crate::util::{count_as, draw_as};
use log::{debug, info, warn};
use num_traits::Float;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Parameters of the weighted EST planner.
#[derive(Clone, Copy, Debug)]
pub struct EstParams<F: Float> {
    /// Neighborhood radius and distance of free-space proposals from their node.
    pub sampling_radius: F,
    /// Proposals drawn around each expanded node.
    pub samples_per_round: usize,
    /// Probability of proposing a step straight toward the goal.
    pub goal_bias: f64,
    /// The trees are joined when the link endpoint is closer than this to the new node.
    pub connect_threshold: F,
    /// Node candidates offered to the policy at once.
    pub batch_size: usize,
    /// Retry cap of free-space rejection sampling.
    pub max_sampling_attempts: usize,
    pub seed: Option<u64>,
}

impl<F: Float> EstParams<F> {
    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            sampling_radius: to_float(config.sampling_radius)?,
            samples_per_round: config.samples_per_round,
            goal_bias: config.goal_bias,
            connect_threshold: to_float(config.connect_threshold)?,
            batch_size: config.batch_size,
            max_sampling_attempts: config.max_sampling_attempts,
            seed: config.seed,
        })
    }
}

impl<F: Float> Default for EstParams<F> {
    fn default() -> Self {
        // The default configuration only holds small finite values.
        Self::from_config(&PlannerConfig::default()).unwrap_or(Self {
            sampling_radius: F::one(),
            samples_per_round: 1,
            goal_bias: 0.0,
            connect_threshold: F::one(),
            batch_size: 1,
            max_sampling_attempts: 1,
            seed: None,
        })
    }
}

/// Bidirectional Expansive Space Trees with adaptive inverse-density weights.
///
/// Nodes are expanded with probability proportional to their weight. A node
/// spawned in a neighborhood of `k` existing nodes starts with weight
/// `1 / (k + 1)`, and each of those neighbors decays from `w` to `w / (w + 1)`,
/// so crowded regions are sampled less and less.
///
/// Candidates drawn from the weights are filtered by a decision policy in
/// batches and queued per tree. Each round expands one queued node of the
/// active tree, then the active tree alternates.
pub struct WeightedEst<F: Float, const N: usize> {
    start: RealVectorState<F, N>,
    goal: RealVectorState<F, N>,
    context: PlanningContext<F, N>,
    feature_extractor: Box<dyn FeatureExtractor<F, N>>,
    policy: Box<dyn DecisionPolicy<F>>,
    params: EstParams<F>,
    rng: StdRng,

    trees: TreePair<F, N>,
    found_path: bool,
    goal_indices: GoalIndices,
    stats: PlannerStats,
    forward_queue: VecDeque<usize>,
    backward_queue: VecDeque<usize>,
}

impl<F: Float, const N: usize> WeightedEst<F, N> {
    /// Constructs a new weighted EST planner.
    ///
    /// Parameters:
    /// - `start`: Root of the forward tree.
    /// - `goal`: Root of the backward tree and center of the goal region.
    /// - `context`: Metric, steering, collision checking and goal test.
    /// - `feature_extractor`: Features of node candidates handed to the policy.
    /// - `policy`: Used by `Planner::round` to filter node candidates.
    /// - `params`: Radii, batch sizes and retry cap.
    pub fn new(
        start: RealVectorState<F, N>,
        goal: RealVectorState<F, N>,
        context: PlanningContext<F, N>,
        feature_extractor: Box<dyn FeatureExtractor<F, N>>,
        policy: Box<dyn DecisionPolicy<F>>,
        params: EstParams<F>,
    ) -> Self {
        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut planner = Self {
            start,
            goal,
            context,
            feature_extractor,
            policy,
            params,
            rng,
            trees: TreePair::new(start, goal, F::one()),
            found_path: false,
            goal_indices: GoalIndices::default(),
            stats: PlannerStats::default(),
            forward_queue: VecDeque::new(),
            backward_queue: VecDeque::new(),
        };
        planner.restart();
        planner
    }

    pub fn params(&self) -> &EstParams<F> {
        &self.params
    }

    /// Runs rounds with `policy` until a path is found.
    ///
    /// There is no cap: a policy that rejects everything, or a problem without
    /// a solution, keeps this running forever. Use `run_until` for a bounded
    /// search.
    pub fn run(&mut self, policy: &mut dyn DecisionPolicy<F>) -> Result<()> {
        while !self.found_path {
            self.round_with(policy)?;
        }
        Ok(())
    }

    /// Runs rounds with `policy` until a path is found or `termination` fires.
    pub fn run_until(
        &mut self,
        policy: &mut dyn DecisionPolicy<F>,
        termination: &mut dyn TerminationCondition,
    ) -> Result<bool> {
        while !self.found_path {
            if termination.evaluate() {
                return Ok(false);
            }
            self.round_with(policy)?;
        }
        Ok(true)
    }

    /// One round: refill the active tree's queue if needed, expand its front node.
    pub fn round_with(&mut self, policy: &mut dyn DecisionPolicy<F>) -> Result<RoundOutcome> {
        if self.found_path {
            return Ok(RoundOutcome::AlreadySolved);
        }
        self.stats.rounds += 1;

        let side = self.trees.active_side();
        if self.queue(side).is_empty() {
            self.fill_queue(policy);
        }
        let outcome = match self.queue(side).pop_front() {
            Some(node_index) => self.expand(node_index)?,
            None => RoundOutcome::NoCandidate,
        };
        debug!("Round {} on the {} tree: {}", self.stats.rounds, side, outcome);

        if !self.found_path {
            self.trees.swap_active();
        }
        Ok(outcome)
    }

    /// Draws a node of the active tree with probability proportional to its weight.
    pub fn sample_node(&mut self) -> Option<usize> {
        let u = draw_as::<F>(self.rng.gen::<f64>());
        self.trees.active().sample_weighted(u)
    }

    /// Proposes a collision-free state within the sampling radius of `center`.
    ///
    /// With probability `goal_bias` the proposal is the point at the sampling
    /// radius straight toward the goal, if that point is free. Otherwise points
    /// are drawn uniformly from the ball around `center` until one is free, at
    /// most `max_sampling_attempts` times.
    pub fn sample_free_space(&mut self, center: &RealVectorState<F, N>) -> Result<RealVectorState<F, N>> {
        let radius = self.params.sampling_radius;
        let checker = self.context.validity_checker();

        if self.rng.gen::<f64>() < self.params.goal_bias {
            let direction = &self.goal - center;
            let length = direction.norm();
            if length > draw_as::<F>(1e-2) {
                let proposal = center + &(direction / length * radius);
                if checker.is_state_valid(&proposal) {
                    return Ok(proposal);
                }
            }
        }

        for _ in 0..self.params.max_sampling_attempts {
            let proposal = center + &(unit_ball_sample::<F, N>(&mut self.rng) * radius);
            if checker.is_state_valid(&proposal) {
                return Ok(proposal);
            }
        }
        Err(PlannerError::SamplingExhausted {
            attempts: self.params.max_sampling_attempts,
        })
    }

    fn restart(&mut self) {
        self.trees = TreePair::new(self.start, self.goal, F::one());
        self.found_path = false;
        self.goal_indices = GoalIndices::default();
        self.stats = PlannerStats::default();
        self.forward_queue.clear();
        self.backward_queue.clear();
        if let Some(seed) = self.params.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        debug!("Weighted EST reset");
    }

    fn queue(&mut self, side: TreeSide) -> &mut VecDeque<usize> {
        match side {
            TreeSide::Forward => &mut self.forward_queue,
            TreeSide::Backward => &mut self.backward_queue,
        }
    }

    /// Offers a batch of weighted node samples to the policy and queues the accepted ones.
    fn fill_queue(&mut self, policy: &mut dyn DecisionPolicy<F>) {
        let batch = self.params.batch_size.min(self.trees.node_count());
        let mut candidates = Vec::with_capacity(batch);
        let mut features = Vec::with_capacity(batch);
        for _ in 0..batch {
            if let Some(index) = self.sample_node() {
                self.stats.samples_drawn += 1;
                features.push(
                    self.feature_extractor
                        .features(FeatureQuery::Node(index), &self.trees),
                );
                candidates.push(index);
            }
        }

        let decisions = policy.accept_batch(&features);
        let side = self.trees.active_side();
        let accepted = candidates
            .into_iter()
            .zip(decisions)
            .filter(|&(_, accept)| accept)
            .map(|(index, _)| index);
        self.queue(side).extend(accepted);
    }

    /// Grows the active tree from `node_index` toward nearby free-space proposals
    /// and tries to link each new node to the other tree.
    fn expand(&mut self, node_index: usize) -> Result<RoundOutcome> {
        let side = self.trees.active_side();
        let node_state = *self.trees.active().state(node_index);
        let radius = self.params.sampling_radius;
        let mut outcome = RoundOutcome::Rejected;

        for _ in 0..self.params.samples_per_round {
            let proposal = match self.sample_free_space(&node_state) {
                Ok(proposal) => proposal,
                Err(PlannerError::SamplingExhausted { attempts }) => {
                    self.stats.sampling_failures += 1;
                    warn!(
                        "No free state found around node {} of the {} tree after {} attempts",
                        node_index, side, attempts
                    );
                    if !outcome.grew() {
                        outcome = RoundOutcome::SamplingFailed;
                    }
                    continue;
                }
                Err(e) => return Err(e),
            };
            self.stats.samples_drawn += 1;

            // Neighbors are taken before the new node exists so it never counts itself.
            let neighbors = self
                .trees
                .active()
                .radius_search(&proposal, radius, self.context.metric());
            let accept_probability = 1.0 / (neighbors.len() + 1) as f64;
            if self.rng.gen::<f64>() > accept_probability {
                continue;
            }

            let motion = match self
                .context
                .steer_checked(&node_state, &proposal, &mut self.stats)?
            {
                Some(motion) => motion,
                None => {
                    self.stats.collisions += 1;
                    if !outcome.grew() {
                        outcome = RoundOutcome::Blocked;
                    }
                    continue;
                }
            };
            let new_state = *motion.endpoint().ok_or(PlannerError::EmptySteerPath)?;
            let new_index =
                insert_weighted(self.trees.active_mut(), new_state, node_index, &neighbors);
            outcome = RoundOutcome::Extended;

            if side == TreeSide::Forward
                && self.context.goal_region().contains(&new_state, &self.goal)
            {
                self.goal_indices.forward = Some(new_index);
                self.found_path = true;
                self.log_solution("forward tree reached the goal region");
                return Ok(RoundOutcome::GoalReached);
            }

            // Try to link the other tree to the new node.
            let other = self.trees.other();
            let nearest = other
                .closest_index(&new_state, self.context.metric())
                .ok_or(PlannerError::EmptyTree)?;
            let nearest_state = *other.state(nearest);
            let link = match self
                .context
                .steer_checked(&nearest_state, &new_state, &mut self.stats)?
            {
                Some(link) => link,
                None => {
                    self.stats.collisions += 1;
                    continue;
                }
            };
            let link_state = *link.endpoint().ok_or(PlannerError::EmptySteerPath)?;
            let link_neighbors =
                self.trees
                    .other()
                    .radius_search(&link_state, radius, self.context.metric());
            let link_index =
                insert_weighted(self.trees.other_mut(), link_state, nearest, &link_neighbors);

            if self.context.distance(&new_state, &link_state) < self.params.connect_threshold {
                self.goal_indices.set(side, new_index);
                self.goal_indices.set(side.opposite(), link_index);
                self.found_path = true;
                self.log_solution("trees connected");
                return Ok(RoundOutcome::Connected);
            }
        }

        Ok(outcome)
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

/// Appends a node with the inverse-density weight rule.
///
/// `neighbors` must be computed before the insertion. The new node gets weight
/// `1 / (|neighbors| + 1)` and every neighbor weight `w` becomes `w / (w + 1)`;
/// the tree applies each change to its total as a delta.
pub fn insert_weighted<F: Float, const N: usize>(
    tree: &mut Tree<F, N>,
    state: RealVectorState<F, N>,
    parent: usize,
    neighbors: &[usize],
) -> usize {
    let weight = F::one() / count_as::<F>(neighbors.len() + 1);
    let index = tree.insert_node(state, weight, Some(parent));
    for &neighbor in neighbors {
        let w = tree.node(neighbor).weight();
        tree.set_weight(neighbor, w / (w + F::one()));
    }
    index
}

/// Uniform sample from the unit ball by rejection from the enclosing cube.
fn unit_ball_sample<F: Float, const N: usize>(rng: &mut StdRng) -> RealVectorState<F, N> {
    loop {
        let mut sample = RealVectorState::zeros();
        let mut norm_squared = 0.0;
        for i in 0..N {
            let x: f64 = rng.gen_range(-1.0..1.0);
            norm_squared += x * x;
            sample[i] = draw_as::<F>(x);
        }
        if norm_squared <= 1.0 {
            return sample;
        }
    }
}

impl<F: Float, const N: usize> Planner<F, N> for WeightedEst<F, N> {
    fn reset(&mut self) -> Vec<F> {
        self.restart();
        Vec::new()
    }

    fn round(&mut self) -> Result<RoundOutcome> {
        // The stored policy is moved out so it can be borrowed next to `self`.
        let mut policy = std::mem::replace(&mut self.policy, Box::new(AcceptAll));
        let result = self.round_with(policy.as_mut());
        self.policy = policy;
        result
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
