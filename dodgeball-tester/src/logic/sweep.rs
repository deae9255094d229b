//! Seed sweeps over the simulator and their aggregate statistics.

use clap::ValueEnum;
use dodgeball_game::numbers::{mean_and_std, ratio, u64_to_f64};
use dodgeball_game::{
    HitProbabilities, OutputMode, RunSummary, SimulationConfig, SimulationError, StrategyId,
    Team, Termination, Trajectory, derive_stream_seed, game_rng, simulate,
};
use serde::Serialize;

/// How the hit probabilities scale with the number of players involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// `pe(k) = pe`, `pj(k) = pj`
    #[default]
    Constant,
    /// `pe(k) = pe * k / N`, `pj(k) = pj * k / N`
    Linear,
}

impl Profile {
    #[must_use]
    pub fn probabilities(self, roster: u32, pe: f64, pj: f64) -> HitProbabilities {
        match self {
            Self::Constant => HitProbabilities::constant(pe, pj),
            Self::Linear => HitProbabilities::linear(roster, pe, pj),
        }
    }
}

/// Everything needed to replay a sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepPlan {
    pub config: SimulationConfig,
    pub team_one: StrategyId,
    pub team_two: StrategyId,
    pub profile: Profile,
    pub pe: f64,
    pub pj: f64,
    pub seeds: Vec<u64>,
    pub iterations: u64,
    /// Record the full trajectory of the first run.
    #[serde(skip)]
    pub capture_trajectory: bool,
}

impl SweepPlan {
    #[must_use]
    pub fn total_runs(&self) -> u64 {
        u64::try_from(self.seeds.len())
            .unwrap_or(u64::MAX)
            .saturating_mul(self.iterations)
    }

    /// Per-run config: only the captured run records a trajectory.
    fn run_config(&self, capture: bool) -> SimulationConfig {
        let output = if capture {
            OutputMode::Trajectory
        } else {
            OutputMode::Summary
        };
        self.config.clone().with_output(output)
    }

    fn policy_seeds(run_seed: u64) -> [u64; 2] {
        [
            derive_stream_seed(run_seed, u64::from(Team::One.number())),
            derive_stream_seed(run_seed, u64::from(Team::Two.number())),
        ]
    }
}

/// Why a run produced no summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunFailure {
    pub message: String,
    pub stalled: bool,
}

impl From<&SimulationError> for RunFailure {
    fn from(err: &SimulationError) -> Self {
        Self {
            message: err.to_string(),
            stalled: matches!(err, SimulationError::Stalled { .. }),
        }
    }
}

/// One game of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameRecord {
    pub seed: u64,
    pub iteration: u64,
    pub run_seed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RunSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<RunFailure>,
}

impl GameRecord {
    #[must_use]
    pub const fn failed(&self) -> bool {
        self.failure.is_some()
    }

    #[must_use]
    pub fn outcome_label(&self) -> String {
        match (&self.summary, &self.failure) {
            (Some(summary), _) => match summary.termination {
                Termination::Elimination { winner } => format!("{winner} wins"),
                Termination::Timeout => "timeout".to_string(),
                Termination::TransitionLimit => "transition limit".to_string(),
            },
            (None, Some(failure)) if failure.stalled => "stalled".to_string(),
            _ => "error".to_string(),
        }
    }
}

/// Aggregate statistics over a sweep. Rates are shares of completed games.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SweepAggregate {
    pub games: usize,
    pub completed: usize,
    pub failed: usize,
    pub stalled: usize,
    pub team_one_wins: usize,
    pub team_two_wins: usize,
    pub timeouts: usize,
    pub transition_limits: usize,
    pub team_one_win_rate: f64,
    pub team_two_win_rate: f64,
    pub timeout_rate: f64,
    pub mean_length: f64,
    pub std_length: f64,
    pub mean_transitions: f64,
}

impl SweepAggregate {
    #[must_use]
    pub fn from_records(records: &[GameRecord]) -> Self {
        let mut aggregate = Self {
            games: records.len(),
            ..Self::default()
        };
        let mut lengths = Vec::with_capacity(records.len());
        let mut transitions = Vec::with_capacity(records.len());

        for record in records {
            if let Some(failure) = &record.failure {
                aggregate.failed += 1;
                if failure.stalled {
                    aggregate.stalled += 1;
                }
                continue;
            }
            let Some(summary) = &record.summary else {
                continue;
            };
            aggregate.completed += 1;
            match summary.termination {
                Termination::Elimination { winner: Team::One } => aggregate.team_one_wins += 1,
                Termination::Elimination { winner: Team::Two } => aggregate.team_two_wins += 1,
                Termination::Timeout => aggregate.timeouts += 1,
                Termination::TransitionLimit => aggregate.transition_limits += 1,
            }
            lengths.push(summary.final_time);
            transitions.push(u64_to_f64(summary.transitions));
        }

        aggregate.team_one_win_rate = ratio(aggregate.team_one_wins, aggregate.completed);
        aggregate.team_two_win_rate = ratio(aggregate.team_two_wins, aggregate.completed);
        aggregate.timeout_rate = ratio(aggregate.timeouts, aggregate.completed);
        (aggregate.mean_length, aggregate.std_length) = mean_and_std(&lengths);
        aggregate.mean_transitions = mean_and_std(&transitions).0;
        aggregate
    }
}

/// Records, aggregate, and the optional captured trajectory of a sweep.
#[derive(Debug, Clone)]
pub struct SweepOutcome {
    pub records: Vec<GameRecord>,
    pub aggregate: SweepAggregate,
    pub trajectory: Option<Trajectory>,
}

impl SweepOutcome {
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.aggregate.failed > 0
    }
}

/// Play `iterations` games per seed, in seed order.
#[must_use]
pub fn run_sweep(plan: &SweepPlan) -> SweepOutcome {
    let probabilities = plan
        .profile
        .probabilities(plan.config.roster, plan.pe, plan.pj);
    let capacity = usize::try_from(plan.total_runs()).unwrap_or(0);
    let mut records = Vec::with_capacity(capacity);
    let mut trajectory = None;

    for &seed in &plan.seeds {
        for iteration in 0..plan.iterations {
            let run_seed = derive_stream_seed(seed, iteration);
            let capture = plan.capture_trajectory && records.is_empty();
            let config = plan.run_config(capture);
            let [seed_one, seed_two] = SweepPlan::policy_seeds(run_seed);
            let mut team_one = plan.team_one.create_policy(seed_one);
            let mut team_two = plan.team_two.create_policy(seed_two);

            let mut record = GameRecord {
                seed,
                iteration,
                run_seed,
                summary: None,
                failure: None,
            };
            match simulate(
                &config,
                team_one.as_mut(),
                team_two.as_mut(),
                &probabilities,
                game_rng(run_seed),
            ) {
                Ok(result) => {
                    record.summary = Some(*result.summary());
                    if capture {
                        trajectory = result.trajectory().cloned();
                    }
                }
                Err(err) => {
                    log::warn!("seed {seed} iteration {iteration} failed: {err}");
                    record.failure = Some(RunFailure::from(&err));
                }
            }
            records.push(record);
        }
    }

    let aggregate = SweepAggregate::from_records(&records);
    log::debug!(
        "sweep finished: {} games, {} failed",
        aggregate.games,
        aggregate.failed
    );
    SweepOutcome {
        records,
        aggregate,
        trajectory,
    }
}
