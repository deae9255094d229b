//! Per-run simulation settings.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What a finished run hands back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Final court counts and time only.
    #[default]
    Summary,
    /// Every snapshot, starting from `(N, N)` at `t = 0`.
    Trajectory,
}

/// Configuration for a single game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Players per team (`N`).
    pub roster: u32,
    /// Mean throw rate per player.
    #[serde(default = "SimulationConfig::default_rate")]
    pub rate: f64,
    /// Game-time cutoff; `None` runs until elimination.
    #[serde(default)]
    pub timeout: Option<f64>,
    /// Hard cap on accepted transitions; `None` means no cap.
    #[serde(default)]
    pub max_transitions: Option<u64>,
    #[serde(default)]
    pub output: OutputMode,
}

impl SimulationConfig {
    /// Largest roster whose two courts still sum within `u32`, with room
    /// for the `sum(X) + 1` term of the strategy evaluator.
    pub const MAX_ROSTER: u32 = u32::MAX / 2;

    #[must_use]
    pub const fn default_rate() -> f64 {
        1.0
    }

    #[must_use]
    pub const fn new(roster: u32) -> Self {
        Self {
            roster,
            rate: Self::default_rate(),
            timeout: None,
            max_transitions: None,
            output: OutputMode::Summary,
        }
    }

    #[must_use]
    pub const fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: f64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub const fn with_max_transitions(mut self, max_transitions: u64) -> Self {
        self.max_transitions = Some(max_transitions);
        self
    }

    #[must_use]
    pub const fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    #[must_use]
    pub const fn trajectory(self) -> Self {
        self.with_output(OutputMode::Trajectory)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.roster == 0 {
            return Err(ConfigError::RosterSize);
        }
        if self.roster > Self::MAX_ROSTER {
            return Err(ConfigError::RosterTooLarge {
                roster: self.roster,
                max: Self::MAX_ROSTER,
            });
        }
        positive_finite("rate", self.rate)?;
        if let Some(timeout) = self.timeout {
            positive_finite("timeout", timeout)?;
        }
        if self.max_transitions == Some(0) {
            return Err(ConfigError::ZeroTransitionLimit);
        }
        Ok(())
    }
}

fn positive_finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field });
    }
    if value <= 0.0 {
        return Err(ConfigError::NonPositive { field, value });
    }
    Ok(())
}
