//! Caller-supplied hit and rescue probabilities.

use std::fmt;
use std::sync::Arc;

use crate::error::{Oracle, SimulationError};

/// Probability as a function of a player count.
pub type ProbabilityFn = Arc<dyn Fn(u32) -> f64 + Send + Sync>;

/// The `pe` / `pj` pair driving every throw.
///
/// Values are range-checked on every use, so a misbehaving function surfaces
/// as [`SimulationError::ProbabilityOutOfRange`] on the step that first hits it.
#[derive(Clone)]
pub struct HitProbabilities {
    enemy: ProbabilityFn,
    jail: ProbabilityFn,
}

impl HitProbabilities {
    /// Build from `pe(enemy_court)` and `pj(own_jailed)`.
    pub fn new<E, J>(pe: E, pj: J) -> Self
    where
        E: Fn(u32) -> f64 + Send + Sync + 'static,
        J: Fn(u32) -> f64 + Send + Sync + 'static,
    {
        Self {
            enemy: Arc::new(pe),
            jail: Arc::new(pj),
        }
    }

    /// Both probabilities independent of the counts.
    #[must_use]
    pub fn constant(pe: f64, pj: f64) -> Self {
        Self::new(move |_| pe, move |_| pj)
    }

    /// Probabilities growing linearly with the count, reaching `pe` / `pj`
    /// at a full roster.
    #[must_use]
    pub fn linear(roster: u32, pe: f64, pj: f64) -> Self {
        let full = f64::from(roster.max(1));
        Self::new(
            move |k| pe * f64::from(k) / full,
            move |k| pj * f64::from(k) / full,
        )
    }

    /// `pe(enemy_court)`, checked to lie in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::ProbabilityOutOfRange`] for values outside
    /// `[0, 1]` or NaN.
    pub fn enemy(&self, enemy_court: u32) -> Result<f64, SimulationError> {
        checked(Oracle::Enemy, enemy_court, (self.enemy)(enemy_court))
    }

    /// `pj(jailed)`, checked to lie in `[0, 1]`.
    ///
    /// An empty jail has nobody to rescue, so `jailed == 0` yields 0 without
    /// consulting `pj`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::ProbabilityOutOfRange`] for values outside
    /// `[0, 1]` or NaN.
    pub fn jail(&self, jailed: u32) -> Result<f64, SimulationError> {
        if jailed == 0 {
            return Ok(0.0);
        }
        checked(Oracle::Jail, jailed, (self.jail)(jailed))
    }
}

impl fmt::Debug for HitProbabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HitProbabilities").finish_non_exhaustive()
    }
}

fn checked(oracle: Oracle, count: u32, value: f64) -> Result<f64, SimulationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(SimulationError::ProbabilityOutOfRange {
            oracle,
            count,
            value,
        })
    }
}
