//! # Bidirectional planning in 2 dimensions
//!
//! Plans from (2, 2) to (28, 28) through a field of boxes and balls with
//! either RRT-Connect or weighted EST and writes the trees and path to JSON.
//!
//! ## Usage
//! ```bash
//! RUST_LOG=info cargo run --example plan_2d -- --planner est --seed 7
//! ```

use bitree_planner::obstacles::{Obstacle, Workspace};
use bitree_planner::rrt::{
    termination::{MaxIterationsTermination, TerminationCondition, TimeTermination},
    GoalBiasedUniformDistribution, PlannerBuilder, PlanningContext, PlanningReport,
    RealVectorState,
};
use bitree_planner::{PlannerConfig, PlannerKind, Result};
use clap::Parser;
use log::{info, warn};
use std::fs;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(version, about = "Plan a 2D path with a bidirectional tree planner", long_about = None)]
struct CliArgs {
    /// Planner to run: connect or est. Overrides the configuration file.
    #[arg(short, long)]
    planner: Option<PlannerKind>,

    /// JSON configuration file. Keys that are left out keep their defaults.
    #[arg(short, long)]
    config: Option<String>,

    /// Seed for reproducible runs.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Maximum number of rounds.
    #[arg(short, long, default_value_t = 20_000)]
    max_rounds: usize,

    /// Wall-clock budget in seconds. Checked in addition to the round limit.
    #[arg(short, long)]
    time_limit: Option<f64>,

    /// Close the gap in the middle wall so no path exists.
    #[arg(long)]
    closed_wall: bool,

    /// Where to write the planning report.
    #[arg(short, long, default_value = "output/plan_2d.json")]
    output: String,
}

const MIN_X: f64 = 0.0;
const MAX_X: f64 = 30.0;
const MIN_Y: f64 = 0.0;
const MAX_Y: f64 = 30.0;

fn build_workspace(closed_wall: bool) -> Result<Workspace<f64, 2>> {
    let mut workspace = Workspace::new(
        RealVectorState::new([MIN_X, MIN_Y]),
        RealVectorState::new([MAX_X, MAX_Y]),
    )?
    .with_obstacle(Obstacle::ball(RealVectorState::new([8.0, 20.0]), 3.0))
    .with_obstacle(Obstacle::ball(RealVectorState::new([22.0, 8.0]), 3.0))
    // Wall across the middle with a gap near the top.
    .with_obstacle(Obstacle::aabb(
        RealVectorState::new([14.0, 0.0]),
        RealVectorState::new([16.0, 24.0]),
    ));
    if closed_wall {
        workspace.add_obstacle(Obstacle::aabb(
            RealVectorState::new([14.0, 24.0]),
            RealVectorState::new([16.0, MAX_Y]),
        ));
    }
    Ok(workspace)
}

/// Stops on whichever limit is hit first.
struct AnyOf(Vec<Box<dyn TerminationCondition>>);

impl TerminationCondition for AnyOf {
    fn evaluate(&mut self) -> bool {
        // Every condition is evaluated so round counters stay in step.
        self.0
            .iter_mut()
            .fold(false, |stop, condition| condition.evaluate() || stop)
    }

    fn reset(&mut self) {
        self.0.iter_mut().for_each(|condition| condition.reset());
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => PlannerConfig::from_json(&fs::read_to_string(path)?)?,
        None => PlannerConfig::default(),
    };
    if let Some(kind) = args.planner {
        config.kind = kind;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let start = RealVectorState::new([2.0, 2.0]);
    let goal = RealVectorState::new([28.0, 28.0]);
    let workspace = build_workspace(args.closed_wall)?;
    let ranges = workspace.ranges();

    let sampling_distribution = match config.seed {
        Some(seed) => GoalBiasedUniformDistribution::with_seed(ranges, goal, config.goal_bias, seed)?,
        None => GoalBiasedUniformDistribution::new(ranges, goal, config.goal_bias)?,
    };
    let context = PlanningContext::with_defaults(workspace.clone(), &config)?;
    let mut planner = PlannerBuilder::new(start, goal, context)
        .config(config.clone())
        .sampling_distribution(Box::new(sampling_distribution))
        .build()?;

    let mut limits: Vec<Box<dyn TerminationCondition>> =
        vec![Box::new(MaxIterationsTermination::new(args.max_rounds))];
    if let Some(seconds) = args.time_limit {
        limits.push(Box::new(TimeTermination::new(Duration::from_secs_f64(seconds))));
    }
    let mut termination = AnyOf(limits);

    info!("Running {} planner", config.kind);
    let solved = planner.plan_until_solved_or(&mut termination)?;
    if solved {
        let path = planner.get_path()?;
        println!(
            "Path with {} states, length {:.3} ({})",
            path.states.len(),
            path.length,
            planner.stats()
        );
    } else {
        warn!("No path found ({})", planner.stats());
    }

    let report = PlanningReport::from_planner(config.kind, planner.as_ref())?.with_workspace(workspace);
    if let Some(parent) = std::path::Path::new(&args.output).parent() {
        fs::create_dir_all(parent)?;
    }
    report.write_json(&args.output)?;
    println!("Report saved to {}", args.output);
    Ok(())
}
