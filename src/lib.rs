pub mod config;
pub mod error;
pub mod obstacles;
pub mod rrt;
mod util;

pub use config::{PlannerConfig, PlannerKind};
pub use error::{PlannerError, Result};
