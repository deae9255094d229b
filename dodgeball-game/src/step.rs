//! One jump of the process: waiting time plus which of four events fired.
//!
//! Throws that change nothing are folded into the waiting time. The event
//! rate is `rate * sum(X) * P` where `P` is the chance a throw changes the
//! state, and the event itself is drawn conditional on a change.

use crate::error::SimulationError;
use crate::probability::HitProbabilities;
use crate::rng::{RandomSource, exponential};
use crate::state::{GameState, Team, Transition};
use crate::strategy::{Situation, Target, TargetingPolicy};

/// Result of a single transition step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub transition: Transition,
    /// Waiting time until the transition, strictly positive.
    pub dt: f64,
    /// Targets chosen by team 1 and team 2 for this step.
    pub targets: [Target; 2],
    /// Probability `P` that a throw changes the state.
    pub change_probability: f64,
}

/// Draw the next transition from `state`.
///
/// Draw order: waiting time first, then the uniform selecting the event.
/// Events are matched by sequential subtraction in the fixed order
/// team 1 hit, team 2 hit, team 1 rescue, team 2 rescue.
///
/// # Errors
///
/// - [`SimulationError::AlreadyEliminated`] if a court is already empty.
/// - [`SimulationError::Stalled`] if no event has positive probability.
/// - Any error raised by the targeting policies or probability functions.
pub fn step<S: RandomSource + ?Sized>(
    roster: u32,
    state: GameState,
    rate: f64,
    targeting: [&mut dyn TargetingPolicy; 2],
    probabilities: &HitProbabilities,
    source: &mut S,
) -> Result<StepOutcome, SimulationError> {
    if state.is_eliminated() {
        return Err(SimulationError::AlreadyEliminated { court: state.court });
    }

    let total = f64::from(state.total());
    let w1 = f64::from(state.active(Team::One)) / total;
    let w2 = f64::from(state.active(Team::Two)) / total;

    let [team_one, team_two] = targeting;
    let t1 = team_one.choose(&situation(roster, state, probabilities, Team::One))?;
    let t2 = team_two.choose(&situation(roster, state, probabilities, Team::Two))?;
    let (d1, d2) = (t1.weight(), t2.weight());

    let pe_at_two = probabilities.enemy(state.active(Team::Two))?;
    let pe_at_one = probabilities.enemy(state.active(Team::One))?;
    let pj_one = probabilities.jail(state.jailed(roster, Team::One))?;
    let pj_two = probabilities.jail(state.jailed(roster, Team::Two))?;

    let p = w1 * (d1 * pe_at_two + (1.0 - d1) * pj_one)
        + w2 * (d2 * pe_at_one + (1.0 - d2) * pj_two);
    if !(p > 0.0) {
        return Err(SimulationError::Stalled { court: state.court });
    }

    let dt = exponential(source, rate * total * p)?;

    let segments = [
        (w1 * d1 * pe_at_two, Transition::TeamOneHits),
        (w2 * d2 * pe_at_one, Transition::TeamTwoHits),
        (w1 * (1.0 - d1) * pj_one, Transition::TeamOneRescues),
        (w2 * (1.0 - d2) * pj_two, Transition::TeamTwoRescues),
    ];
    let transition = select_segment(&segments, p, source.uniform());

    Ok(StepOutcome {
        transition,
        dt,
        targets: [t1, t2],
        change_probability: p,
    })
}

const fn situation(
    roster: u32,
    state: GameState,
    probabilities: &HitProbabilities,
    team: Team,
) -> Situation<'_> {
    Situation {
        roster,
        state,
        probabilities,
        team,
    }
}

/// First segment whose normalized mass covers `u`; the last one takes the rest.
///
/// Rounding can leave a sliver of `u` past the first three segments. If the
/// last segment has no mass at all, that sliver goes to the latest segment
/// that does, so an impossible event (a rescue from an empty jail) is never
/// produced.
fn select_segment(segments: &[(f64, Transition); 4], p: f64, mut u: f64) -> Transition {
    for &(mass, transition) in &segments[..3] {
        let share = mass / p;
        if u <= share {
            return transition;
        }
        u -= share;
    }
    segments
        .iter()
        .rev()
        .find(|(mass, _)| *mass > 0.0)
        .map_or(Transition::TeamTwoRescues, |&(_, transition)| transition)
}
