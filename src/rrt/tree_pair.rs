use crate::rrt::state::RealVectorState;
use crate::rrt::tree::Tree;
use num_traits::Float;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one of the two trees of a bidirectional planner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeSide {
    /// Rooted at the start state.
    Forward,
    /// Rooted at the goal state.
    Backward,
}

impl TreeSide {
    pub fn opposite(self) -> Self {
        match self {
            TreeSide::Forward => TreeSide::Backward,
            TreeSide::Backward => TreeSide::Forward,
        }
    }
}

impl fmt::Display for TreeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TreeSide::Forward => "forward",
            TreeSide::Backward => "backward",
        };
        write!(f, "{}", s)
    }
}

/// The forward and backward trees plus which one grows this round.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TreePair<F: Float, const N: usize> {
    forward: Tree<F, N>,
    backward: Tree<F, N>,
    active: TreeSide,
}

impl<F: Float, const N: usize> TreePair<F, N> {
    /// Creates both trees with their roots. The forward tree starts active.
    pub fn new(start: RealVectorState<F, N>, goal: RealVectorState<F, N>, root_weight: F) -> Self {
        Self {
            forward: Tree::new(start, root_weight),
            backward: Tree::new(goal, root_weight),
            active: TreeSide::Forward,
        }
    }

    pub fn active_side(&self) -> TreeSide {
        self.active
    }

    pub fn swap_active(&mut self) {
        self.active = self.active.opposite();
    }

    pub fn get(&self, side: TreeSide) -> &Tree<F, N> {
        match side {
            TreeSide::Forward => &self.forward,
            TreeSide::Backward => &self.backward,
        }
    }

    pub fn get_mut(&mut self, side: TreeSide) -> &mut Tree<F, N> {
        match side {
            TreeSide::Forward => &mut self.forward,
            TreeSide::Backward => &mut self.backward,
        }
    }

    pub fn forward(&self) -> &Tree<F, N> {
        &self.forward
    }

    pub fn backward(&self) -> &Tree<F, N> {
        &self.backward
    }

    pub fn active(&self) -> &Tree<F, N> {
        self.get(self.active)
    }

    pub fn other(&self) -> &Tree<F, N> {
        self.get(self.active.opposite())
    }

    pub fn active_mut(&mut self) -> &mut Tree<F, N> {
        self.get_mut(self.active)
    }

    pub fn other_mut(&mut self) -> &mut Tree<F, N> {
        self.get_mut(self.active.opposite())
    }

    /// Total number of nodes over both trees.
    pub fn node_count(&self) -> usize {
        self.forward.len() + self.backward.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_and_other_follow_swaps() {
        let mut trees = TreePair::new(
            RealVectorState::new([0.0, 0.0]),
            RealVectorState::new([10.0, 0.0]),
            1.0,
        );
        assert_eq!(trees.active_side(), TreeSide::Forward);
        assert_eq!(trees.active().root()[0], 0.0);
        assert_eq!(trees.other().root()[0], 10.0);

        trees.swap_active();
        assert_eq!(trees.active_side(), TreeSide::Backward);
        trees
            .active_mut()
            .insert_node(RealVectorState::new([9.0, 0.0]), 1.0, Some(0));
        assert_eq!(trees.other().len(), 1);
        assert_eq!(trees.backward().len(), 2);
        assert_eq!(trees.forward().len(), 1);
        assert_eq!(trees.node_count(), 3);
    }
}
