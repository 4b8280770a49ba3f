//! Turn order and end detection
//!
//! Team A moves first. Within a team, members act in roster order; once a
//! team has no living member left after the pointer, play passes to the
//! other team's first living member. Passing from team B back to team A
//! starts a new round.

use serde::{Deserialize, Serialize};

use super::combatant::{Combatant, TeamId};
use super::roster::Roster;

/// Why a battle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Both teams fell in the same step
    MutualElimination,
    /// One team has no living member
    Elimination,
    /// Round limit reached; decided by survivors
    Timeout,
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EndReason::MutualElimination => "mutual elimination",
            EndReason::Elimination => "elimination",
            EndReason::Timeout => "timeout",
        };
        write!(f, "{}", s)
    }
}

/// Final result of a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleResult {
    /// `None` is a draw
    pub winner: Option<TeamId>,
    pub reason: EndReason,
}

impl BattleResult {
    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

impl std::fmt::Display for BattleResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.winner {
            Some(team) => write!(f, "{} wins by {}", team, self.reason),
            None => write!(f, "draw by {}", self.reason),
        }
    }
}

/// Turn pointer: team, roster position and round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOrder {
    pub team: TeamId,
    pub index: usize,
    /// Starts at 1
    pub round: u32,
}

impl TurnOrder {
    /// Pointer at the first living member of team A, or of team B if A has
    /// nobody standing
    pub fn start(roster: &Roster) -> Self {
        let (team, index) = match roster.first_living(TeamId::A) {
            Some(idx) => (TeamId::A, idx),
            None => (TeamId::B, roster.first_living(TeamId::B).unwrap_or(0)),
        };
        Self {
            team,
            index,
            round: 1,
        }
    }

    /// The combatant the pointer is on, if still alive
    pub fn pending<'a>(&self, roster: &'a Roster) -> Option<&'a Combatant> {
        roster
            .team(self.team)
            .get(self.index)
            .filter(|c| c.is_alive())
    }

    /// Move to the next living combatant
    ///
    /// Returns `false` and leaves the pointer alone when nobody is alive.
    pub fn next_turn(&mut self, roster: &Roster) -> bool {
        if let Some(idx) = roster.next_living_after(self.team, self.index) {
            self.index = idx;
            return true;
        }

        let other = self.team.other();
        let (team, index) = match roster.first_living(other) {
            Some(idx) => (other, idx),
            None => match roster.first_living(self.team) {
                Some(idx) => (self.team, idx),
                None => return false,
            },
        };

        // Leaving team B, or wrapping a lone surviving team, closes the round
        if self.team == TeamId::B || team == self.team {
            self.round += 1;
        }
        self.team = team;
        self.index = index;
        true
    }
}

/// Decide whether the battle is over
///
/// Checked in order: both teams down, one team down, round limit passed.
pub fn check_end(roster: &Roster, round: u32, max_rounds: u32) -> Option<BattleResult> {
    let a = roster.living_count(TeamId::A);
    let b = roster.living_count(TeamId::B);

    if a == 0 && b == 0 {
        return Some(BattleResult {
            winner: None,
            reason: EndReason::MutualElimination,
        });
    }
    if a == 0 || b == 0 {
        let winner = if a == 0 { TeamId::B } else { TeamId::A };
        return Some(BattleResult {
            winner: Some(winner),
            reason: EndReason::Elimination,
        });
    }
    if round > max_rounds {
        let winner = match a.cmp(&b) {
            std::cmp::Ordering::Greater => Some(TeamId::A),
            std::cmp::Ordering::Less => Some(TeamId::B),
            std::cmp::Ordering::Equal => None,
        };
        return Some(BattleResult {
            winner,
            reason: EndReason::Timeout,
        });
    }
    None
}
