//! Targeting decisions: attack the enemy court or try a jail rescue.
//!
//! Teams choose through [`TargetingPolicy`]. Any `FnMut(GameState) -> Target`
//! closure is a policy, and the built-ins below cover the heuristic from the
//! model plus fixed and random baselines.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SimulationError;
use crate::probability::HitProbabilities;
use crate::rng::{GameRng, RandomSource, game_rng};
use crate::state::{GameState, Team};

/// Where a team aims its next throw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// Throw at the opposing court.
    Enemy,
    /// Throw into the own jail to free a teammate.
    Jail,
}

impl Target {
    /// Indicator used in the rate formula: 1 for attack, 0 for rescue.
    #[must_use]
    pub const fn weight(self) -> f64 {
        match self {
            Self::Enemy => 1.0,
            Self::Jail => 0.0,
        }
    }
}

/// Everything a policy may look at when choosing a target.
#[derive(Debug, Clone, Copy)]
pub struct Situation<'a> {
    pub roster: u32,
    pub state: GameState,
    pub probabilities: &'a HitProbabilities,
    pub team: Team,
}

/// Per-team targeting rule, evaluated once per transition step.
pub trait TargetingPolicy {
    /// Name used for logging/report output.
    fn name(&self) -> &'static str {
        "custom"
    }

    /// Choose the target for `situation.team`.
    ///
    /// # Errors
    ///
    /// Returns an error when the decision cannot be made for this state.
    fn choose(&mut self, situation: &Situation<'_>) -> Result<Target, SimulationError>;
}

impl<F> TargetingPolicy for F
where
    F: FnMut(GameState) -> Target,
{
    fn choose(&mut self, situation: &Situation<'_>) -> Result<Target, SimulationError> {
        Ok(self(situation.state))
    }
}

/// Compare the expected value of attacking against rescuing.
///
/// ```text
/// attack = X[i] / (sum(X) - 1) * pe(X[j])
/// rescue = X[j] / (sum(X) + 1) * pj(N - X[i])
/// ```
///
/// Ties go to the attack. An empty jail (`N - X[i] == 0`) gives a rescue
/// value of 0 without consulting `pj`; see [`HitProbabilities::jail`].
///
/// # Errors
///
/// Returns [`SimulationError::DegenerateStrategyInput`] when fewer than two
/// players remain on court (the attack denominator would be zero) and
/// [`SimulationError::ProbabilityOutOfRange`] when `pe` / `pj` misbehave.
pub fn decide_target(
    roster: u32,
    state: GameState,
    probabilities: &HitProbabilities,
    team: Team,
) -> Result<Target, SimulationError> {
    let total = state.total();
    if total <= 1 {
        return Err(SimulationError::DegenerateStrategyInput { court: state.court });
    }
    let own = f64::from(state.active(team));
    let enemy = state.active(team.opponent());

    let attack = own / f64::from(total - 1) * probabilities.enemy(enemy)?;
    let rescue =
        f64::from(enemy) / f64::from(total + 1) * probabilities.jail(state.jailed(roster, team))?;

    Ok(if attack >= rescue {
        Target::Enemy
    } else {
        Target::Jail
    })
}

/// The expected-value heuristic of [`decide_target`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Heuristic;

impl TargetingPolicy for Heuristic {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn choose(&mut self, situation: &Situation<'_>) -> Result<Target, SimulationError> {
        decide_target(
            situation.roster,
            situation.state,
            situation.probabilities,
            situation.team,
        )
    }
}

/// Always throw at the enemy court.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAttack;

impl TargetingPolicy for AlwaysAttack {
    fn name(&self) -> &'static str {
        "aggressive"
    }

    fn choose(&mut self, _situation: &Situation<'_>) -> Result<Target, SimulationError> {
        Ok(Target::Enemy)
    }
}

/// Rescue whenever someone is in jail, attack otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRescue;

impl TargetingPolicy for AlwaysRescue {
    fn name(&self) -> &'static str {
        "defensive"
    }

    fn choose(&mut self, situation: &Situation<'_>) -> Result<Target, SimulationError> {
        if situation.state.jailed(situation.roster, situation.team) > 0 {
            Ok(Target::Jail)
        } else {
            Ok(Target::Enemy)
        }
    }
}

/// Seeded coin flip between attack and rescue.
#[derive(Debug, Clone)]
pub struct RandomTargeting {
    rng: GameRng,
    attack_bias: f64,
}

impl RandomTargeting {
    /// `attack_bias` is the chance of attacking, clamped to `[0, 1]`.
    #[must_use]
    pub fn new(seed: u64, attack_bias: f64) -> Self {
        let attack_bias = if attack_bias.is_nan() {
            0.5
        } else {
            attack_bias.clamp(0.0, 1.0)
        };
        Self {
            rng: game_rng(seed),
            attack_bias,
        }
    }
}

impl TargetingPolicy for RandomTargeting {
    fn name(&self) -> &'static str {
        "random"
    }

    fn choose(&mut self, _situation: &Situation<'_>) -> Result<Target, SimulationError> {
        if self.rng.uniform() <= self.attack_bias {
            Ok(Target::Enemy)
        } else {
            Ok(Target::Jail)
        }
    }
}

/// Built-in strategies addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyId {
    Heuristic,
    Aggressive,
    Defensive,
    Random,
}

impl StrategyId {
    pub const ALL: [Self; 4] = [
        Self::Heuristic,
        Self::Aggressive,
        Self::Defensive,
        Self::Random,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Heuristic => "heuristic",
            Self::Aggressive => "aggressive",
            Self::Defensive => "defensive",
            Self::Random => "random",
        }
    }

    /// Instantiate the policy. `seed` only matters for [`StrategyId::Random`].
    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn TargetingPolicy + Send> {
        match self {
            Self::Heuristic => Box::new(Heuristic),
            Self::Aggressive => Box::new(AlwaysAttack),
            Self::Defensive => Box::new(AlwaysRescue),
            Self::Random => Box::new(RandomTargeting::new(seed, 0.5)),
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StrategyId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown strategy: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn situation(probs: &HitProbabilities, x1: u32, x2: u32, team: Team) -> Situation<'_> {
        Situation {
            roster: 5,
            state: GameState::from_counts(x1, x2),
            probabilities: probs,
            team,
        }
    }

    #[test]
    fn decide_target_is_pure() {
        let probs = HitProbabilities::constant(0.5, 0.5);
        let state = GameState::from_counts(3, 4);
        let first = decide_target(5, state, &probs, Team::One).unwrap();
        let second = decide_target(5, state, &probs, Team::One).unwrap();
        assert_eq!(first, second);
        // attack = 3/6 * 0.5 = 0.25, rescue = 4/8 * 0.5 = 0.25: tie attacks.
        assert_eq!(first, Target::Enemy);
    }

    #[test]
    fn decide_target_rescues_when_jail_is_cheap() {
        let probs = HitProbabilities::constant(0.1, 0.9);
        // attack = 1/4 * 0.1 = 0.025, rescue = 4/6 * 0.9 = 0.6
        let target = decide_target(5, GameState::from_counts(1, 4), &probs, Team::One).unwrap();
        assert_eq!(target, Target::Jail);
        // team 2 has a full court: empty jail, so it attacks.
        let target = decide_target(5, GameState::from_counts(1, 5), &probs, Team::Two).unwrap();
        assert_eq!(target, Target::Enemy);
    }

    #[test]
    fn decide_target_guards_degenerate_denominator() {
        let probs = HitProbabilities::constant(0.5, 0.5);
        for (x1, x2) in [(1, 0), (0, 1), (0, 0)] {
            assert_eq!(
                decide_target(5, GameState::from_counts(x1, x2), &probs, Team::One),
                Err(SimulationError::DegenerateStrategyInput { court: [x1, x2] })
            );
        }
    }

    #[test]
    fn decide_target_propagates_bad_probabilities() {
        let probs = HitProbabilities::new(|_| -0.1, |_| 0.5);
        assert!(matches!(
            decide_target(5, GameState::from_counts(2, 2), &probs, Team::Two),
            Err(SimulationError::ProbabilityOutOfRange { .. })
        ));
    }

    #[test]
    fn closures_act_as_policies() {
        let probs = HitProbabilities::constant(0.5, 0.5);
        let mut calls = 0;
        let mut policy = |state: GameState| {
            calls += 1;
            if state.court[0] > 2 {
                Target::Enemy
            } else {
                Target::Jail
            }
        };
        assert_eq!(
            policy.choose(&situation(&probs, 3, 1, Team::One)).unwrap(),
            Target::Enemy
        );
        assert_eq!(
            policy.choose(&situation(&probs, 2, 1, Team::One)).unwrap(),
            Target::Jail
        );
        assert_eq!(policy.name(), "custom");
        assert_eq!(calls, 2);
    }

    #[test]
    fn fixed_policies_behave_as_named() {
        let probs = HitProbabilities::constant(0.5, 0.5);
        assert_eq!(
            AlwaysAttack.choose(&situation(&probs, 1, 5, Team::One)).unwrap(),
            Target::Enemy
        );
        assert_eq!(
            AlwaysRescue.choose(&situation(&probs, 1, 5, Team::One)).unwrap(),
            Target::Jail
        );
        assert_eq!(
            AlwaysRescue.choose(&situation(&probs, 1, 5, Team::Two)).unwrap(),
            Target::Enemy
        );
    }

    #[test]
    fn random_targeting_respects_bias_extremes() {
        let probs = HitProbabilities::constant(0.5, 0.5);
        let sit = situation(&probs, 3, 3, Team::One);
        let mut always = RandomTargeting::new(1, 1.0);
        let mut never = RandomTargeting::new(1, 0.0);
        for _ in 0..200 {
            assert_eq!(always.choose(&sit).unwrap(), Target::Enemy);
            assert_eq!(never.choose(&sit).unwrap(), Target::Jail);
        }
    }

    #[test]
    fn strategy_ids_parse_and_build() {
        for id in StrategyId::ALL {
            assert_eq!(id.label().parse::<StrategyId>().unwrap(), id);
            assert_eq!(id.create_policy(3).name(), id.label());
        }
        assert_eq!("HEURISTIC".parse::<StrategyId>(), Ok(StrategyId::Heuristic));
        assert!("sniper".parse::<StrategyId>().is_err());
    }

    #[test]
    fn empty_jail_skips_rescue_probability() {
        // pj would be out of range if it were called.
        let probs = HitProbabilities::new(|_| 0.5, |_| 2.0);
        let full = GameState::new(3);
        assert_eq!(decide_target(3, full, &probs, Team::One), Ok(Target::Enemy));
        assert!(decide_target(3, GameState::from_counts(2, 3), &probs, Team::One).is_err());
    }
}
