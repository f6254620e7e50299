use crate::config::PlannerKind;
use crate::error::Result;
use crate::obstacles::{Obstacle, Workspace};
use crate::rrt::outcome::PlannerStats;
use crate::rrt::path::PlannedPath;
use crate::rrt::planner::Planner;
use crate::rrt::state::RealVectorState;
use crate::rrt::tree::Tree;
use json::JsonValue;
use log::info;
use num_traits::Float;
use std::fs;
use std::path::Path;

fn number<F: Float>(value: F) -> JsonValue {
    JsonValue::Number(value.to_f64().unwrap_or(f64::NAN).into())
}

pub fn state_to_json<F: Float, const N: usize>(state: &RealVectorState<F, N>) -> Result<JsonValue> {
    let mut array = JsonValue::new_array();
    for i in 0..N {
        array.push(number(state[i]))?;
    }
    Ok(array)
}

pub fn obstacle_to_json<F: Float, const N: usize>(obstacle: &Obstacle<F, N>) -> Result<JsonValue> {
    let json_object = match obstacle {
        Obstacle::Aabb {
            min_corner,
            max_corner,
        } => json::object! {
            kind: "aabb",
            min_corner: state_to_json(min_corner)?,
            max_corner: state_to_json(max_corner)?,
        },
        Obstacle::Ball { center, radius } => json::object! {
            kind: "ball",
            center: state_to_json(center)?,
            radius: number(*radius),
        },
    };
    Ok(json_object)
}

pub fn workspace_to_json<F: Float, const N: usize>(workspace: &Workspace<F, N>) -> Result<JsonValue> {
    let mut ranges = JsonValue::new_array();
    for (low, high) in workspace.ranges() {
        ranges.push(json::array![number(low), number(high)])?;
    }
    let mut obstacles = JsonValue::new_array();
    for obstacle in workspace.obstacles() {
        obstacles.push(obstacle_to_json(obstacle)?)?;
    }
    Ok(json::object! {
        ranges: ranges,
        obstacles: obstacles,
    })
}

/// Nodes as `{state, parent, weight}` objects in insertion order.
pub fn tree_to_json<F: Float, const N: usize>(tree: &Tree<F, N>) -> Result<JsonValue> {
    let mut nodes = JsonValue::new_array();
    for node in tree.nodes() {
        let parent = match node.parent() {
            Some(parent) => JsonValue::from(parent),
            None => JsonValue::Null,
        };
        nodes.push(json::object! {
            state: state_to_json(node.state())?,
            parent: parent,
            weight: number(node.weight()),
        })?;
    }
    Ok(json::object! {
        nodes: nodes,
        total_weight: number(tree.total_weight()),
    })
}

pub fn path_to_json<F: Float, const N: usize>(path: &PlannedPath<F, N>) -> Result<JsonValue> {
    let mut states = JsonValue::new_array();
    for state in &path.states {
        states.push(state_to_json(state)?)?;
    }
    Ok(json::object! {
        states: states,
        length: number(path.length),
    })
}

pub fn stats_to_json(stats: &PlannerStats) -> JsonValue {
    json::object! {
        rounds: stats.rounds,
        collisions: stats.collisions,
        collision_checks: stats.collision_checks,
        samples_drawn: stats.samples_drawn,
        sampling_failures: stats.sampling_failures,
    }
}

/// Snapshot of a planning attempt for plotting or offline inspection.
#[derive(Clone, Debug)]
pub struct PlanningReport<F: Float, const N: usize> {
    pub kind: PlannerKind,
    pub path: Option<PlannedPath<F, N>>,
    pub forward: Tree<F, N>,
    pub backward: Tree<F, N>,
    pub stats: PlannerStats,
    pub workspace: Option<Workspace<F, N>>,
}

impl<F: Float, const N: usize> PlanningReport<F, N> {
    /// Copies trees, statistics and, if one was found, the path out of `planner`.
    pub fn from_planner(kind: PlannerKind, planner: &dyn Planner<F, N>) -> Result<Self> {
        let path = if planner.found_path() {
            Some(planner.get_path()?)
        } else {
            None
        };
        Ok(Self {
            kind,
            path,
            forward: planner.trees().forward().clone(),
            backward: planner.trees().backward().clone(),
            stats: *planner.stats(),
            workspace: None,
        })
    }

    pub fn with_workspace(mut self, workspace: Workspace<F, N>) -> Self {
        self.workspace = Some(workspace);
        self
    }

    pub fn to_json(&self) -> Result<JsonValue> {
        let mut json_object = json::object! {
            planner: self.kind.to_string(),
            found_path: self.path.is_some(),
            path: JsonValue::Null,
            forward_tree: tree_to_json(&self.forward)?,
            backward_tree: tree_to_json(&self.backward)?,
            stats: stats_to_json(&self.stats),
            workspace: JsonValue::Null,
        };
        if let Some(path) = &self.path {
            json_object["path"] = path_to_json(path)?;
        }
        if let Some(workspace) = &self.workspace {
            json_object["workspace"] = workspace_to_json(workspace)?;
        }
        Ok(json_object)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = json::stringify_pretty(self.to_json()?, 2);
        fs::write(path.as_ref(), text)?;
        info!("Planning report written to {}", path.as_ref().display());
        Ok(())
    }
}
