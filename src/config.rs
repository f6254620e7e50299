//! Planner configuration.
//!
//! Every parameter has a default matching the values the planners were tuned
//! with. Configurations can be loaded from JSON, where missing keys keep
//! their defaults.

use crate::error::{PlannerError, Result};
use crate::rrt::steering::MAX_STEER_SEGMENTS;
use json::JsonValue;
use num_traits::Float;
use std::fmt;
use std::str::FromStr;

/// Which growth strategy to build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlannerKind {
    /// Bidirectional RRT-Connect driven one candidate at a time.
    Connect,
    /// Weighted Expansive Space Trees driven in batches.
    Est,
}

impl fmt::Display for PlannerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlannerKind::Connect => "connect",
            PlannerKind::Est => "est",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for PlannerKind {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "connect" | "rrt-connect" | "rrt_connect" => Ok(PlannerKind::Connect),
            "est" => Ok(PlannerKind::Est),
            other => Err(PlannerError::InvalidConfig(format!(
                "unknown planner kind '{}'",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlannerConfig {
    pub kind: PlannerKind,
    /// An extension reaches its target when the endpoint is closer than this.
    pub reach_threshold: f64,
    /// Radius of the default ball goal region.
    pub goal_tolerance: f64,
    /// Maximum distance covered by one straight-line steer.
    pub max_step: f64,
    /// Spacing of interpolated states along a steered path.
    pub steer_resolution: f64,
    /// EST neighborhood and proposal radius.
    pub sampling_radius: f64,
    /// EST proposals per expansion.
    pub samples_per_round: usize,
    /// EST probability of proposing a step straight toward the goal.
    pub goal_bias: f64,
    /// EST trees are joined when the link endpoint is this close to the new node.
    pub connect_threshold: f64,
    /// EST node candidates offered to the policy at once.
    pub batch_size: usize,
    /// Retry cap for EST free-space rejection sampling.
    pub max_sampling_attempts: usize,
    /// Reward penalty applied on every step.
    pub step_penalty: f64,
    /// Seed for the planner's random number generator.
    pub seed: Option<u64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            kind: PlannerKind::Connect,
            reach_threshold: 0.01,
            goal_tolerance: 0.5,
            max_step: 1.0,
            steer_resolution: 0.1,
            sampling_radius: 4.0,
            samples_per_round: 1,
            goal_bias: 0.05,
            connect_threshold: 0.1,
            batch_size: 1,
            max_sampling_attempts: 10_000,
            step_penalty: 0.01,
            seed: None,
        }
    }
}

impl PlannerConfig {
    /// Parses a JSON object. Keys that are absent keep their default value.
    pub fn from_json(text: &str) -> Result<Self> {
        let parsed = json::parse(text)?;
        if !parsed.is_object() {
            return Err(PlannerError::InvalidConfig(
                "configuration must be a JSON object".to_string(),
            ));
        }

        let mut config = Self::default();
        if let Some(kind) = parsed["kind"].as_str() {
            config.kind = kind.parse()?;
        }
        read_f64(&parsed, "reach_threshold", &mut config.reach_threshold)?;
        read_f64(&parsed, "goal_tolerance", &mut config.goal_tolerance)?;
        read_f64(&parsed, "max_step", &mut config.max_step)?;
        read_f64(&parsed, "steer_resolution", &mut config.steer_resolution)?;
        read_f64(&parsed, "sampling_radius", &mut config.sampling_radius)?;
        read_usize(&parsed, "samples_per_round", &mut config.samples_per_round)?;
        read_f64(&parsed, "goal_bias", &mut config.goal_bias)?;
        read_f64(&parsed, "connect_threshold", &mut config.connect_threshold)?;
        read_usize(&parsed, "batch_size", &mut config.batch_size)?;
        read_usize(
            &parsed,
            "max_sampling_attempts",
            &mut config.max_sampling_attempts,
        )?;
        read_f64(&parsed, "step_penalty", &mut config.step_penalty)?;
        let seed = &parsed["seed"];
        if !seed.is_null() {
            config.seed = Some(seed.as_u64().ok_or_else(|| {
                PlannerError::InvalidConfig("seed must be a non-negative integer".to_string())
            })?);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> JsonValue {
        let mut value = json::object! {
            kind: self.kind.to_string(),
            reach_threshold: self.reach_threshold,
            goal_tolerance: self.goal_tolerance,
            max_step: self.max_step,
            steer_resolution: self.steer_resolution,
            sampling_radius: self.sampling_radius,
            samples_per_round: self.samples_per_round,
            goal_bias: self.goal_bias,
            connect_threshold: self.connect_threshold,
            batch_size: self.batch_size,
            max_sampling_attempts: self.max_sampling_attempts,
            step_penalty: self.step_penalty,
        };
        value["seed"] = match self.seed {
            Some(seed) => seed.into(),
            None => JsonValue::Null,
        };
        value
    }

    pub fn validate(&self) -> Result<()> {
        positive("reach_threshold", self.reach_threshold)?;
        positive("max_step", self.max_step)?;
        positive("steer_resolution", self.steer_resolution)?;
        positive("sampling_radius", self.sampling_radius)?;
        positive("connect_threshold", self.connect_threshold)?;
        if !(self.goal_tolerance >= 0.0) || !self.goal_tolerance.is_finite() {
            return Err(PlannerError::InvalidConfig(
                "goal_tolerance must be a non-negative number".to_string(),
            ));
        }
        if self.max_step / self.steer_resolution > MAX_STEER_SEGMENTS as f64 {
            return Err(PlannerError::InvalidConfig(format!(
                "steer_resolution splits max_step into more than {} segments",
                MAX_STEER_SEGMENTS
            )));
        }
        if !(0.0..=1.0).contains(&self.goal_bias) {
            return Err(PlannerError::InvalidConfig(
                "goal_bias must be within [0, 1]".to_string(),
            ));
        }
        if self.samples_per_round == 0 || self.batch_size == 0 || self.max_sampling_attempts == 0 {
            return Err(PlannerError::InvalidConfig(
                "samples_per_round, batch_size and max_sampling_attempts must be at least 1"
                    .to_string(),
            ));
        }
        if !self.step_penalty.is_finite() {
            return Err(PlannerError::InvalidConfig(
                "step_penalty must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Converts a configuration value into the planner's float type.
pub fn to_float<F: Float>(value: f64) -> Result<F> {
    F::from(value)
        .ok_or_else(|| PlannerError::InvalidConfig(format!("{} is not representable", value)))
}

fn positive(key: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(PlannerError::InvalidConfig(format!(
            "{} must be positive, got {}",
            key, value
        )))
    }
}

fn read_f64(parsed: &JsonValue, key: &str, target: &mut f64) -> Result<()> {
    let field = &parsed[key];
    if field.is_null() {
        return Ok(());
    }
    *target = field
        .as_f64()
        .ok_or_else(|| PlannerError::InvalidConfig(format!("{} must be a number", key)))?;
    Ok(())
}

fn read_usize(parsed: &JsonValue, key: &str, target: &mut usize) -> Result<()> {
    let field = &parsed[key];
    if field.is_null() {
        return Ok(());
    }
    *target = field.as_usize().ok_or_else(|| {
        PlannerError::InvalidConfig(format!("{} must be a non-negative integer", key))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_are_valid() {
        let config = PlannerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reach_threshold, 0.01);
        assert_eq!(config.sampling_radius, 4.0);
    }

    #[test]
    fn json_overrides_only_given_keys() {
        let config =
            PlannerConfig::from_json(r#"{ "kind": "est", "sampling_radius": 2.5, "seed": 42 }"#)
                .unwrap();
        assert_eq!(config.kind, PlannerKind::Est);
        assert_eq!(config.sampling_radius, 2.5);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.max_step, PlannerConfig::default().max_step);
    }

    #[test]
    fn json_round_trips_through_to_json() {
        let config = PlannerConfig {
            kind: PlannerKind::Est,
            batch_size: 4,
            seed: Some(9),
            ..PlannerConfig::default()
        };
        let text = config.to_json().dump();
        let parsed = PlannerConfig::from_json(&text).unwrap();
        assert_eq!(parsed.kind, PlannerKind::Est);
        assert_eq!(parsed.batch_size, 4);
        assert_eq!(parsed.seed, Some(9));
        assert_relative_eq!(parsed.goal_bias, config.goal_bias);
        assert_relative_eq!(parsed.reach_threshold, config.reach_threshold);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(PlannerConfig::from_json(r#"{ "goal_bias": 2.0 }"#).is_err());
        assert!(PlannerConfig::from_json(r#"{ "max_step": -1 }"#).is_err());
        assert!(PlannerConfig::from_json(r#"{ "steer_resolution": 1e-8 }"#).is_err());
        assert!(PlannerConfig::from_json(r#"{ "kind": "prm" }"#).is_err());
        assert!(PlannerConfig::from_json(r#"{ "batch_size": "many" }"#).is_err());
        assert!(PlannerConfig::from_json("[1, 2]").is_err());
        assert!(matches!(
            PlannerConfig::from_json("{ not json"),
            Err(PlannerError::Json(_))
        ));
    }
}
