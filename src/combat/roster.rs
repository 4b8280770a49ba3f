//! Two-team roster in fixed turn order

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::combatant::{Combatant, TeamId};
use super::error::{CombatError, IllegalReason};
use crate::config::TargetFallback;

/// Both teams, each kept in roster order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    team_a: Vec<Combatant>,
    team_b: Vec<Combatant>,
}

impl Roster {
    /// Build a roster; both teams must be non-empty and ids unique
    pub fn new(team_a: Vec<Combatant>, team_b: Vec<Combatant>) -> Result<Self, CombatError> {
        if team_a.is_empty() || team_b.is_empty() {
            return Err(CombatError::InvalidSetup(
                "both teams need at least one combatant".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for c in team_a.iter().chain(team_b.iter()) {
            if !seen.insert(c.id.as_str()) {
                return Err(CombatError::InvalidSetup(format!(
                    "duplicate combatant id: {}",
                    c.id
                )));
            }
        }

        Ok(Self { team_a, team_b })
    }

    pub fn team(&self, team: TeamId) -> &[Combatant] {
        match team {
            TeamId::A => &self.team_a,
            TeamId::B => &self.team_b,
        }
    }

    pub fn team_mut(&mut self, team: TeamId) -> &mut [Combatant] {
        match team {
            TeamId::A => &mut self.team_a,
            TeamId::B => &mut self.team_b,
        }
    }

    /// Every combatant, team A first
    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.team_a.iter().chain(self.team_b.iter())
    }

    pub fn get(&self, id: &str) -> Option<&Combatant> {
        self.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Combatant> {
        self.team_a
            .iter_mut()
            .chain(self.team_b.iter_mut())
            .find(|c| c.id == id)
    }

    /// Team and roster position of a combatant
    pub fn position(&self, id: &str) -> Option<(TeamId, usize)> {
        [TeamId::A, TeamId::B].into_iter().find_map(|team| {
            self.team(team)
                .iter()
                .position(|c| c.id == id)
                .map(|idx| (team, idx))
        })
    }

    pub fn living_count(&self, team: TeamId) -> usize {
        self.team(team).iter().filter(|c| c.is_alive()).count()
    }

    /// Position of the first living member of a team
    pub fn first_living(&self, team: TeamId) -> Option<usize> {
        self.team(team).iter().position(|c| c.is_alive())
    }

    /// Position of the next living member strictly after `after`
    pub fn next_living_after(&self, team: TeamId, after: usize) -> Option<usize> {
        self.team(team)
            .iter()
            .enumerate()
            .skip(after + 1)
            .find(|(_, c)| c.is_alive())
            .map(|(idx, _)| idx)
    }

    /// First living enemy of a team, in roster order
    pub fn first_living_enemy(&self, team: TeamId) -> Option<&Combatant> {
        self.team(team.other()).iter().find(|c| c.is_alive())
    }

    /// Current HP of every combatant
    pub fn hp_by_id(&self) -> Vec<(String, i32)> {
        self.iter().map(|c| (c.id.clone(), c.hp())).collect()
    }

    /// Pick a legal living enemy target for a member of `team`
    pub fn enemy_target(
        &self,
        team: TeamId,
        requested: Option<&str>,
        fallback: TargetFallback,
    ) -> Result<String, CombatError> {
        let target = match (requested, fallback) {
            (Some(id), _) => self.get(id).ok_or(IllegalReason::UnknownCombatant)?,
            (None, TargetFallback::FirstLivingEnemy) => self
                .first_living_enemy(team)
                .ok_or(IllegalReason::TargetDefeated)?,
            (None, TargetFallback::Require) => return Err(IllegalReason::MissingTarget.into()),
        };

        if target.team == team {
            return Err(IllegalReason::TargetNotEnemy.into());
        }
        if !target.is_alive() {
            return Err(IllegalReason::TargetDefeated.into());
        }
        Ok(target.id.clone())
    }
}
