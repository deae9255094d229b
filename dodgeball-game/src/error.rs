//! Error taxonomy for configuration and simulation failures.
//!
//! Every failure here is a programming or configuration error. Nothing is
//! transient and nothing is retried.

use std::fmt;
use thiserror::Error;

/// Which caller-supplied probability function produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Oracle {
    /// `pe`: hit probability against the enemy court.
    Enemy,
    /// `pj`: rescue probability against the own jail.
    Jail,
}

impl fmt::Display for Oracle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enemy => f.write_str("pe"),
            Self::Jail => f.write_str("pj"),
        }
    }
}

/// Errors raised when simulation configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("roster size must be at least 1 (got 0)")]
    RosterSize,
    #[error("roster size {roster} exceeds the maximum of {max}")]
    RosterTooLarge { roster: u32, max: u32 },
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} must be finite")]
    NotFinite { field: &'static str },
    #[error("max_transitions must be at least 1 when set")]
    ZeroTransitionLimit,
}

/// Failures surfaced while stepping or running a game.
#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    #[error("{oracle}({count}) returned {value}, expected a probability in [0, 1]")]
    ProbabilityOutOfRange {
        oracle: Oracle,
        count: u32,
        value: f64,
    },
    #[error("no transition possible at court {court:?}: aggregate event rate is zero")]
    Stalled { court: [u32; 2] },
    #[error("court {court:?} is already decided, no further transitions")]
    AlreadyEliminated { court: [u32; 2] },
    #[error("strategy evaluated with {court:?}: fewer than two players left on court")]
    DegenerateStrategyInput { court: [u32; 2] },
    #[error("exponential draw requires a positive finite rate (got {rate})")]
    NonPositiveRate { rate: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = SimulationError::ProbabilityOutOfRange {
            oracle: Oracle::Jail,
            count: 3,
            value: 1.5,
        };
        assert_eq!(
            err.to_string(),
            "pj(3) returned 1.5, expected a probability in [0, 1]"
        );

        let cfg = ConfigError::NonPositive {
            field: "rate",
            value: -1.0,
        };
        assert_eq!(cfg.to_string(), "rate must be positive (got -1)");
    }

    #[test]
    fn config_errors_convert_into_simulation_errors() {
        let err: SimulationError = ConfigError::RosterSize.into();
        assert!(matches!(
            err,
            SimulationError::InvalidConfiguration(ConfigError::RosterSize)
        ));
        assert!(err.to_string().starts_with("invalid configuration"));
    }
}
