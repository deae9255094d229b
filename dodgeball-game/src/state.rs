//! Court counts, teams, and the four transitions of the jump process.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two fixed groups of `N` players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    One,
    Two,
}

impl Team {
    pub const BOTH: [Self; 2] = [Self::One, Self::Two];

    /// Zero-based index into court arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    /// One-based team number as used in reports.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "team {}", self.number())
    }
}

/// Active players on each court. Jailed players are `roster - court[i]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameState {
    pub court: [u32; 2],
}

impl GameState {
    /// Opening state: every player of both teams on court.
    #[must_use]
    pub const fn new(roster: u32) -> Self {
        Self {
            court: [roster, roster],
        }
    }

    #[must_use]
    pub const fn from_counts(x1: u32, x2: u32) -> Self {
        Self { court: [x1, x2] }
    }

    #[must_use]
    pub const fn active(&self, team: Team) -> u32 {
        self.court[team.index()]
    }

    #[must_use]
    pub const fn jailed(&self, roster: u32, team: Team) -> u32 {
        roster.saturating_sub(self.active(team))
    }

    /// Players on both courts combined.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.court[0] + self.court[1]
    }

    #[must_use]
    pub const fn is_eliminated(&self) -> bool {
        self.court[0] == 0 || self.court[1] == 0
    }

    /// Team still holding players once the other court is empty.
    #[must_use]
    pub const fn winner(&self) -> Option<Team> {
        match self.court {
            [0, 0] => None,
            [_, 0] => Some(Team::One),
            [0, _] => Some(Team::Two),
            _ => None,
        }
    }

    /// Whether both courts respect `0 <= x <= roster`.
    #[must_use]
    pub const fn within_roster(&self, roster: u32) -> bool {
        self.court[0] <= roster && self.court[1] <= roster
    }

    /// State after `transition`. Counts saturate at zero.
    #[must_use]
    pub fn apply(self, transition: Transition) -> Self {
        let (d1, d2) = transition.delta();
        Self {
            court: [
                self.court[0].saturating_add_signed(d1),
                self.court[1].saturating_add_signed(d2),
            ],
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.court[0], self.court[1])
    }
}

/// Outcome of one accepted throw event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transition {
    /// Team 1 hits a player on team 2's court.
    TeamOneHits,
    /// Team 2 hits a player on team 1's court.
    TeamTwoHits,
    /// Team 1 frees one of its jailed players.
    TeamOneRescues,
    /// Team 2 frees one of its jailed players.
    TeamTwoRescues,
}

impl Transition {
    /// Change in `(X1, X2)`: exactly one entry is non-zero.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::TeamOneHits => (0, -1),
            Self::TeamTwoHits => (-1, 0),
            Self::TeamOneRescues => (1, 0),
            Self::TeamTwoRescues => (0, 1),
        }
    }

    /// Team that threw the ball.
    #[must_use]
    pub const fn thrower(self) -> Team {
        match self {
            Self::TeamOneHits | Self::TeamOneRescues => Team::One,
            Self::TeamTwoHits | Self::TeamTwoRescues => Team::Two,
        }
    }

    #[must_use]
    pub const fn is_rescue(self) -> bool {
        matches!(self, Self::TeamOneRescues | Self::TeamTwoRescues)
    }
}
