//! Dodgeball Simulation Engine
//!
//! Continuous-time jump process over the court counts `(X1, X2)` of two teams
//! of `N` players. Each event either sends a player to jail (a hit) or frees
//! one (a rescue); waiting times are exponential. This crate holds the engine
//! only: plotting, sweeps, and command-line handling live with the callers.
//!
//! ```
//! use dodgeball_game::{HitProbabilities, Heuristic, SimulationConfig, game_rng, simulate};
//!
//! let probabilities = HitProbabilities::constant(0.6, 0.3);
//! let config = SimulationConfig::new(5);
//! let result = simulate(&config, &mut Heuristic, &mut Heuristic, &probabilities, game_rng(42))
//!     .expect("valid configuration");
//! assert!(result.final_state().is_eliminated());
//! ```

pub mod config;
pub mod error;
pub mod numbers;
pub mod probability;
pub mod rng;
pub mod simulation;
pub mod state;
pub mod step;
pub mod strategy;

// Re-export commonly used types
pub use config::{OutputMode, SimulationConfig};
pub use error::{ConfigError, Oracle, SimulationError};
pub use probability::{HitProbabilities, ProbabilityFn};
pub use rng::{CountingRng, GameRng, RandomSource, derive_stream_seed, exponential, game_rng};
pub use simulation::{
    RunSummary, Simulation, SimulationResult, TickRecord, Termination, Trajectory, simulate,
};
pub use state::{GameState, Team, Transition};
pub use step::{StepOutcome, step};
pub use strategy::{
    AlwaysAttack, AlwaysRescue, Heuristic, RandomTargeting, Situation, StrategyId, Target,
    TargetingPolicy, decide_target,
};
