pub mod reports;
pub mod seeds;
pub mod sweep;

pub use seeds::resolve_seed_inputs;
pub use sweep::{GameRecord, Profile, SweepAggregate, SweepOutcome, SweepPlan, run_sweep};
