//! Error types for the planners.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Path not found yet")]
    PathNotFound,

    #[error("No nodes in the tree")]
    EmptyTree,

    #[error("Steering returned an empty path")]
    EmptySteerPath,

    #[error("Could not sample a free state after {attempts} attempts")]
    SamplingExhausted { attempts: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
