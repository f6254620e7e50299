use crate::error::{PlannerError, Result};
use crate::rrt::metric::DistanceMetric;
use crate::rrt::state::RealVectorState;
use crate::rrt::tree_pair::{TreePair, TreeSide};
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Node indices at which the goal region was hit or the trees were joined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalIndices {
    pub forward: Option<usize>,
    pub backward: Option<usize>,
}

impl GoalIndices {
    pub fn set(&mut self, side: TreeSide, index: usize) {
        match side {
            TreeSide::Forward => self.forward = Some(index),
            TreeSide::Backward => self.backward = Some(index),
        }
    }
}

/// A start-to-goal sequence of states with its total length.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlannedPath<F: Float, const N: usize> {
    pub states: Vec<RealVectorState<F, N>>,
    pub length: F,
}

/// Reconstructs the path from the goal indices.
///
/// The forward half runs from the start to the forward goal index. When the
/// backward goal index is set the backward half follows, running from that
/// index to the backward root, which is the goal state.
pub fn extract_path<F: Float, const N: usize>(
    trees: &TreePair<F, N>,
    goal_indices: &GoalIndices,
    metric: &dyn DistanceMetric<F, N>,
) -> Result<PlannedPath<F, N>> {
    let forward_index = goal_indices.forward.ok_or(PlannerError::PathNotFound)?;

    let forward = trees.forward();
    let mut states: Vec<RealVectorState<F, N>> = forward
        .path_to_root(forward_index)
        .into_iter()
        .rev()
        .map(|i| *forward.state(i))
        .collect();

    if let Some(backward_index) = goal_indices.backward {
        let backward = trees.backward();
        states.extend(
            backward
                .path_to_root(backward_index)
                .into_iter()
                .map(|i| *backward.state(i)),
        );
    }

    let length = path_length(&states, metric);
    Ok(PlannedPath { states, length })
}

/// Sum of the distances between consecutive states.
pub fn path_length<F: Float, const N: usize>(
    states: &[RealVectorState<F, N>],
    metric: &dyn DistanceMetric<F, N>,
) -> F {
    states
        .windows(2)
        .fold(F::zero(), |acc, pair| acc + metric.distance(&pair[0], &pair[1]))
}
