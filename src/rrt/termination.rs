use std::time::{Duration, Instant};

/// Decides when a planning loop should stop.
pub trait TerminationCondition {
    /// Returns true when planning should stop.
    fn evaluate(&mut self) -> bool;

    /// Starts over, e.g. before a new planning attempt.
    fn reset(&mut self);
}

/// Stops after a fixed number of evaluations.
pub struct MaxIterationsTermination {
    max_iterations: usize,
    iterations: usize,
}

impl MaxIterationsTermination {
    pub fn new(max_iterations: usize) -> Self {
        Self {
            max_iterations,
            iterations: 0,
        }
    }
}

impl TerminationCondition for MaxIterationsTermination {
    fn evaluate(&mut self) -> bool {
        if self.iterations >= self.max_iterations {
            return true;
        }
        self.iterations += 1;
        false
    }

    fn reset(&mut self) {
        self.iterations = 0;
    }
}

/// Stops once a wall-clock budget is used up.
pub struct TimeTermination {
    budget: Duration,
    start: Instant,
}

impl TimeTermination {
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            start: Instant::now(),
        }
    }
}

impl TerminationCondition for TimeTermination {
    fn evaluate(&mut self) -> bool {
        self.start.elapsed() >= self.budget
    }

    fn reset(&mut self) {
        self.start = Instant::now();
    }
}
