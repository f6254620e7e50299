pub mod connect;
pub mod est;
pub mod export;
pub mod extend;
pub mod features;
pub mod goal;
pub mod metric;
pub mod outcome;
pub mod path;
pub mod planner;
pub mod policy;
pub mod sampling;
pub mod state;
pub mod steering;
pub mod termination;
pub mod tree;
pub mod tree_pair;
pub mod validity_checker;

pub use connect::{RRTConnect, StepResult};
pub use est::{EstParams, WeightedEst};
pub use export::PlanningReport;
pub use extend::{ExtendOutcome, Extension, PlanningContext};
pub use features::{FeatureExtractor, FeatureQuery, NearestDistanceFeatures, NoFeatures};
pub use goal::{BallGoalRegion, GoalRegion};
pub use metric::{DistanceMetric, EuclideanDistance};
pub use outcome::{PlannerStats, RoundOutcome};
pub use path::{GoalIndices, PlannedPath};
pub use planner::{Planner, PlannerBuilder};
pub use policy::{AcceptAll, DecisionPolicy, FnPolicy};
pub use sampling::{GoalBiasedUniformDistribution, SamplingDistribution, UniformDistribution};
pub use state::RealVectorState;
pub use steering::{SteerResult, Steering, StraightLineSteering, MAX_STEER_SEGMENTS};
pub use termination::{MaxIterationsTermination, TerminationCondition, TimeTermination};
pub use tree::{Tree, TreeNode};
pub use tree_pair::{TreePair, TreeSide};
pub use validity_checker::{AlwaysValid, PathCheck, ValidityChecker};
