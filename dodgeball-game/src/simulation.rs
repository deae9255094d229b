//! Simulation driver: loops the transition step until a terminal condition.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::config::{OutputMode, SimulationConfig};
use crate::error::SimulationError;
use crate::probability::HitProbabilities;
use crate::rng::CountingRng;
use crate::state::{GameState, Team, Transition};
use crate::step::step;
use crate::strategy::TargetingPolicy;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    /// One court emptied; `winner` still has players.
    Elimination { winner: Team },
    /// The game clock reached the configured timeout.
    Timeout,
    /// The configured transition cap was reached.
    TransitionLimit,
}

/// Court snapshots and the cumulative times they were reached.
///
/// `states[k]` holds from `times[k]` on. Entry 0 is `(N, N)` at `t = 0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub states: Vec<GameState>,
    pub times: Vec<f64>,
}

impl Trajectory {
    fn start(roster: u32) -> Self {
        Self {
            states: vec![GameState::new(roster)],
            times: vec![0.0],
        }
    }

    fn push(&mut self, state: GameState, time: f64) {
        self.states.push(state);
        self.times.push(time);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Iterate `(time, state)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, GameState)> + '_ {
        self.times.iter().copied().zip(self.states.iter().copied())
    }

    #[must_use]
    pub fn last(&self) -> Option<(f64, GameState)> {
        Some((*self.times.last()?, *self.states.last()?))
    }
}

/// Final figures of a run, present in both output modes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub final_state: GameState,
    pub final_time: f64,
    pub termination: Termination,
    pub transitions: u64,
    /// Raw generator draws consumed by the run.
    pub draws: u64,
}

impl RunSummary {
    #[must_use]
    pub const fn winner(&self) -> Option<Team> {
        match self.termination {
            Termination::Elimination { winner } => Some(winner),
            Termination::Timeout | Termination::TransitionLimit => None,
        }
    }
}

/// Output of [`simulate`] in the requested [`OutputMode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SimulationResult {
    Summary(RunSummary),
    Trajectory {
        summary: RunSummary,
        trajectory: Trajectory,
    },
}

impl SimulationResult {
    #[must_use]
    pub const fn summary(&self) -> &RunSummary {
        match self {
            Self::Summary(summary) | Self::Trajectory { summary, .. } => summary,
        }
    }

    #[must_use]
    pub const fn trajectory(&self) -> Option<&Trajectory> {
        match self {
            Self::Summary(_) => None,
            Self::Trajectory { trajectory, .. } => Some(trajectory),
        }
    }

    #[must_use]
    pub const fn final_state(&self) -> GameState {
        self.summary().final_state
    }

    #[must_use]
    pub const fn final_time(&self) -> f64 {
        self.summary().final_time
    }
}

/// One accepted transition as seen by [`Simulation::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickRecord {
    pub transition: Transition,
    pub dt: f64,
    pub state: GameState,
    pub time: f64,
}

/// A single game in progress, owning its state, clock, and generator.
pub struct Simulation<'a, R> {
    config: SimulationConfig,
    policies: [&'a mut dyn TargetingPolicy; 2],
    probabilities: &'a HitProbabilities,
    rng: CountingRng<R>,
    state: GameState,
    clock: f64,
    transitions: u64,
    history: Option<Trajectory>,
    termination: Option<Termination>,
}

impl<'a, R: RngCore> Simulation<'a, R> {
    /// Start a game at `(N, N)`, `t = 0`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidConfiguration`] when `config` fails
    /// validation.
    pub fn new(
        config: SimulationConfig,
        team_one: &'a mut dyn TargetingPolicy,
        team_two: &'a mut dyn TargetingPolicy,
        probabilities: &'a HitProbabilities,
        rng: R,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        let history = match config.output {
            OutputMode::Summary => None,
            OutputMode::Trajectory => Some(Trajectory::start(config.roster)),
        };
        log::debug!(
            "starting game: roster {} rate {} timeout {:?} ({} vs {})",
            config.roster,
            config.rate,
            config.timeout,
            team_one.name(),
            team_two.name()
        );
        Ok(Self {
            state: GameState::new(config.roster),
            config,
            policies: [team_one, team_two],
            probabilities,
            rng: CountingRng::new(rng),
            clock: 0.0,
            transitions: 0,
            history,
            termination: None,
        })
    }

    #[must_use]
    pub const fn state(&self) -> GameState {
        self.state
    }

    #[must_use]
    pub const fn clock(&self) -> f64 {
        self.clock
    }

    #[must_use]
    pub const fn transitions(&self) -> u64 {
        self.transitions
    }

    #[must_use]
    pub const fn termination(&self) -> Option<Termination> {
        self.termination
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.termination.is_some()
    }

    /// Advance by one transition. Returns `None` once the game has ended.
    ///
    /// # Errors
    ///
    /// Propagates step failures such as [`SimulationError::Stalled`].
    pub fn tick(&mut self) -> Result<Option<TickRecord>, SimulationError> {
        if self.termination.is_some() {
            return Ok(None);
        }

        let [team_one, team_two] = &mut self.policies;
        let outcome = step(
            self.config.roster,
            self.state,
            self.config.rate,
            [&mut **team_one, &mut **team_two],
            self.probabilities,
            &mut self.rng,
        )
        .inspect_err(|err| log::debug!("game failed at t = {:.4}: {err}", self.clock))?;

        self.state = self.state.apply(outcome.transition);
        self.clock += outcome.dt;
        self.transitions += 1;
        if let Some(history) = self.history.as_mut() {
            history.push(self.state, self.clock);
        }
        log::trace!(
            "t = {:.4} {:?} -> {}",
            self.clock,
            outcome.transition,
            self.state
        );

        self.termination = self.check_termination();
        if let Some(termination) = self.termination {
            log::debug!(
                "game over after {} transitions at t = {:.4}: {:?}",
                self.transitions,
                self.clock,
                termination
            );
        }

        Ok(Some(TickRecord {
            transition: outcome.transition,
            dt: outcome.dt,
            state: self.state,
            time: self.clock,
        }))
    }

    fn check_termination(&self) -> Option<Termination> {
        if let Some(winner) = self.state.winner() {
            return Some(Termination::Elimination { winner });
        }
        if self.config.timeout.is_some_and(|limit| self.clock >= limit) {
            return Some(Termination::Timeout);
        }
        if self
            .config
            .max_transitions
            .is_some_and(|limit| self.transitions >= limit)
        {
            return Some(Termination::TransitionLimit);
        }
        None
    }

    /// Run until a terminal condition and return the result.
    ///
    /// # Errors
    ///
    /// Propagates the first step failure.
    pub fn run(mut self) -> Result<SimulationResult, SimulationError> {
        while self.tick()?.is_some() {}
        Ok(self.into_result())
    }

    fn into_result(self) -> SimulationResult {
        let summary = RunSummary {
            final_state: self.state,
            final_time: self.clock,
            termination: self.termination.unwrap_or(Termination::TransitionLimit),
            transitions: self.transitions,
            draws: self.rng.draws(),
        };
        match self.history {
            None => SimulationResult::Summary(summary),
            Some(trajectory) => SimulationResult::Trajectory {
                summary,
                trajectory,
            },
        }
    }
}

/// Play one game from `(N, N)` to a terminal state.
///
/// # Errors
///
/// - [`SimulationError::InvalidConfiguration`] for a bad `config`.
/// - [`SimulationError::Stalled`] when no throw can change the state.
/// - [`SimulationError::ProbabilityOutOfRange`] when `pe` / `pj` misbehave.
pub fn simulate<R: RngCore>(
    config: &SimulationConfig,
    team_one: &mut dyn TargetingPolicy,
    team_two: &mut dyn TargetingPolicy,
    probabilities: &HitProbabilities,
    rng: R,
) -> Result<SimulationResult, SimulationError> {
    Simulation::new(config.clone(), team_one, team_two, probabilities, rng)?.run()
}
