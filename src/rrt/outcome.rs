use serde::{Deserialize, Serialize};
use std::fmt;

/// What a single planning round did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    /// The planner had already found a path; nothing changed.
    AlreadySolved,
    /// The decision policy rejected the candidate.
    Rejected,
    /// No candidate was accepted by the policy this round.
    NoCandidate,
    /// Free-space sampling hit its retry cap.
    SamplingFailed,
    /// The extension of the active tree was in collision.
    Blocked,
    /// Nodes were added but the trees are not connected yet.
    Extended,
    /// The forward tree entered the goal region.
    GoalReached,
    /// The two trees were joined.
    Connected,
}

impl RoundOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            RoundOutcome::GoalReached | RoundOutcome::Connected | RoundOutcome::AlreadySolved
        )
    }

    pub fn grew(&self) -> bool {
        matches!(
            self,
            RoundOutcome::Extended | RoundOutcome::GoalReached | RoundOutcome::Connected
        )
    }
}

impl fmt::Display for RoundOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoundOutcome::AlreadySolved => "AlreadySolved",
            RoundOutcome::Rejected => "Rejected",
            RoundOutcome::NoCandidate => "NoCandidate",
            RoundOutcome::SamplingFailed => "SamplingFailed",
            RoundOutcome::Blocked => "Blocked",
            RoundOutcome::Extended => "Extended",
            RoundOutcome::GoalReached => "GoalReached",
            RoundOutcome::Connected => "Connected",
        };
        write!(f, "{}", s)
    }
}

/// Diagnostic counters of a planning attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerStats {
    /// Rounds run since the last reset.
    pub rounds: usize,
    /// Extensions that ended blocked.
    pub collisions: usize,
    /// State and edge checks performed on steered paths.
    pub collision_checks: usize,
    /// Candidate states or nodes drawn.
    pub samples_drawn: usize,
    /// Free-space sampling attempts that hit the retry cap.
    pub sampling_failures: usize,
}

impl fmt::Display for PlannerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rounds={} collisions={} collision_checks={} samples={} sampling_failures={}",
            self.rounds,
            self.collisions,
            self.collision_checks,
            self.samples_drawn,
            self.sampling_failures
        )
    }
}
