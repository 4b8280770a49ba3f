//! Battle state machine
//!
//! `Waiting -> Active -> Ended`. A battle starts `Active` unless the
//! readiness gate is configured, in which case it waits until every living
//! combatant has been marked ready. `Ended` is terminal.
//!
//! Every call that returns `Err` leaves the battle exactly as it was.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::action::{self, Action, ActionContext, HpDelta};
use super::combatant::{Combatant, CombatantSpec, TeamId};
use super::dice::Dice;
use super::effects::{EffectKind, EffectLedger};
use super::error::{CombatError, IllegalReason};
use super::log::{BattleLog, LogEvent, LogRecord};
use super::roster::Roster;
use super::turn::{self, BattleResult, EndReason, TurnOrder};
use crate::config::BattleConfig;

/// Lifecycle of a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BattleStatus {
    Waiting,
    Active,
    Ended { result: BattleResult },
}

/// Who is forfeiting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForfeitTarget {
    Team(TeamId),
    /// Forfeits the combatant's whole team
    Combatant(String),
}

/// Everything a caller learns from one accepted action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// Records appended by this call, in order
    pub records: Vec<LogRecord>,
    pub hp_deltas: Vec<HpDelta>,
    pub turn_ended: bool,
    pub ended: bool,
    pub result: Option<BattleResult>,
    /// Pending actor after this action, `None` once ended
    pub next_actor: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Battle {
    id: String,
    roster: Roster,
    ledger: EffectLedger,
    turn: TurnOrder,
    status: BattleStatus,
    ready: BTreeSet<String>,
    log: BattleLog,
    config: BattleConfig,
}

impl Battle {
    /// Set up a battle from two team rosters
    pub fn create(
        id: impl Into<String>,
        team_a: &[CombatantSpec],
        team_b: &[CombatantSpec],
        config: BattleConfig,
    ) -> Result<Self, CombatError> {
        config.validate()?;

        let build = |specs: &[CombatantSpec], team: TeamId| {
            specs
                .iter()
                .map(|spec| {
                    Combatant::from_spec(
                        spec,
                        team,
                        &config.stat_bounds,
                        config.default_max_hp,
                        &config.starting_items,
                    )
                })
                .collect::<Result<Vec<_>, _>>()
        };
        let roster = Roster::new(build(team_a, TeamId::A)?, build(team_b, TeamId::B)?)?;

        let mut battle = Self {
            id: id.into(),
            turn: TurnOrder::start(&roster),
            roster,
            ledger: EffectLedger::new(config.effect_expiry),
            status: BattleStatus::Waiting,
            ready: BTreeSet::new(),
            log: BattleLog::new(config.log_capacity),
            config,
        };

        info!(
            "battle {} created: {} vs {} combatants",
            battle.id,
            team_a.len(),
            team_b.len()
        );

        if !battle.config.require_ready {
            battle.activate(&mut Vec::new());
        }
        Ok(battle)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> BattleStatus {
        self.status
    }

    pub fn result(&self) -> Option<BattleResult> {
        match self.status {
            BattleStatus::Ended { result } => Some(result),
            _ => None,
        }
    }

    pub fn is_ended(&self) -> bool {
        self.result().is_some()
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn ledger(&self) -> &EffectLedger {
        &self.ledger
    }

    pub fn log(&self) -> &BattleLog {
        &self.log
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn round(&self) -> u32 {
        self.turn.round
    }

    /// Combatant whose action is awaited; `None` unless active
    pub fn pending_actor(&self) -> Option<&Combatant> {
        match self.status {
            BattleStatus::Active => self.turn.pending(&self.roster),
            _ => None,
        }
    }

    fn pending_id(&self) -> Option<String> {
        self.pending_actor().map(|c| c.id.clone())
    }

    /// Mark a combatant ready; returns true if this started the battle
    pub fn mark_ready(&mut self, id: &str) -> Result<bool, CombatError> {
        if self.roster.get(id).is_none() {
            return Err(IllegalReason::UnknownCombatant.into());
        }
        match self.status {
            BattleStatus::Ended { .. } => return Err(CombatError::AlreadyEnded),
            BattleStatus::Active => return Ok(false),
            BattleStatus::Waiting => {}
        }

        self.ready.insert(id.to_string());
        debug!("battle {}: {} ready", self.id, id);

        if self
            .roster
            .iter()
            .filter(|c| c.is_alive())
            .all(|c| self.ready.contains(&c.id))
        {
            self.activate(&mut Vec::new());
            return Ok(true);
        }
        Ok(false)
    }

    fn activate(&mut self, records: &mut Vec<LogRecord>) {
        self.status = BattleStatus::Active;
        info!("battle {} started", self.id);
        if !self.settle(records) {
            self.begin_turn();
        }
    }

    /// Start-of-turn upkeep for the pending actor
    fn begin_turn(&mut self) {
        let Some(id) = self.turn.pending(&self.roster).map(|c| c.id.clone()) else {
            return;
        };
        if let Some(actor) = self.roster.get_mut(&id) {
            actor.defending = false;
        }
        for expired in self.ledger.tick_owner(&id) {
            debug!(
                "battle {}: {} {} from {} expired",
                self.id, expired.owner, expired.kind, expired.source
            );
        }
    }

    /// End the battle if an end condition holds; returns true if ended
    fn settle(&mut self, records: &mut Vec<LogRecord>) -> bool {
        if let BattleStatus::Ended { .. } = self.status {
            return true;
        }
        match turn::check_end(&self.roster, self.turn.round, self.config.max_rounds) {
            Some(result) => {
                self.finish(result, records);
                true
            }
            None => false,
        }
    }

    fn finish(&mut self, result: BattleResult, records: &mut Vec<LogRecord>) {
        self.status = BattleStatus::Ended { result };
        info!("battle {} ended: {}", self.id, result);
        let record = self.log.push(
            self.turn.round,
            None,
            LogEvent::Ended { result },
            format!("battle over: {}", result),
        );
        records.push(record);
    }

    fn check_actor(&self, actor_id: &str) -> Result<(), CombatError> {
        match self.status {
            BattleStatus::Ended { .. } => return Err(CombatError::AlreadyEnded),
            BattleStatus::Waiting => return Err(IllegalReason::NotStarted.into()),
            BattleStatus::Active => {}
        }

        let actor = self
            .roster
            .get(actor_id)
            .ok_or(IllegalReason::UnknownCombatant)?;
        if !actor.is_alive() {
            return Err(IllegalReason::ActorDefeated.into());
        }
        if self.turn.pending(&self.roster).map(|c| c.id.as_str()) != Some(actor_id) {
            return Err(IllegalReason::NotYourTurn.into());
        }
        Ok(())
    }

    /// Submit the pending actor's action
    pub fn submit_action(
        &mut self,
        dice: &mut dyn Dice,
        actor_id: &str,
        action: Action,
    ) -> Result<ActionOutcome, CombatError> {
        self.run_action(dice, actor_id, action, false)
    }

    /// Auto-pass for a pending actor whose turn timer ran out
    pub fn force_timeout(
        &mut self,
        dice: &mut dyn Dice,
        actor_id: &str,
    ) -> Result<ActionOutcome, CombatError> {
        self.run_action(dice, actor_id, Action::Pass, true)
    }

    fn run_action(
        &mut self,
        dice: &mut dyn Dice,
        actor_id: &str,
        action: Action,
        timed_out: bool,
    ) -> Result<ActionOutcome, CombatError> {
        self.check_actor(actor_id)?;

        let mut ctx = ActionContext {
            roster: &mut self.roster,
            ledger: &mut self.ledger,
            dice,
            config: &self.config,
        };
        let dispatched = action::dispatch(&mut ctx, actor_id, &action)?;

        let mut message = dispatched.resolution.describe(actor_id, &self.roster);
        if timed_out {
            message.push_str(" (turn timed out)");
        }
        debug!("battle {}: {}", self.id, message);

        let mut records = vec![self.log.push(
            self.turn.round,
            Some(actor_id),
            LogEvent::Action {
                action,
                resolution: dispatched.resolution,
                hp_deltas: dispatched.hp_deltas.clone(),
                timed_out,
            },
            message,
        )];

        if !self.settle(&mut records) {
            self.turn.next_turn(&self.roster);
            if !self.settle(&mut records) {
                self.begin_turn();
            }
        }

        Ok(ActionOutcome {
            records,
            hp_deltas: dispatched.hp_deltas,
            turn_ended: dispatched.turn_ended,
            ended: self.is_ended(),
            result: self.result(),
            next_actor: self.pending_id(),
        })
    }

    /// Forfeit a side, knocking out every member
    ///
    /// On an already-ended battle this returns the existing result.
    pub fn forfeit(&mut self, target: ForfeitTarget) -> Result<BattleResult, CombatError> {
        if let Some(result) = self.result() {
            return Ok(result);
        }

        let team = match target {
            ForfeitTarget::Team(team) => team,
            ForfeitTarget::Combatant(id) => {
                self.roster
                    .get(&id)
                    .ok_or(IllegalReason::UnknownCombatant)?
                    .team
            }
        };

        for member in self.roster.team_mut(team) {
            member.knock_out();
        }
        let ids: Vec<String> = self.roster.team(team).iter().map(|c| c.id.clone()).collect();
        for id in &ids {
            self.ledger.clear_owner(id);
        }

        info!("battle {}: {} forfeits", self.id, team);
        self.log.push(
            self.turn.round,
            None,
            LogEvent::Forfeit { team },
            format!("{} forfeits", team),
        );

        let result = turn::check_end(&self.roster, self.turn.round, self.config.max_rounds)
            .unwrap_or(BattleResult {
                winner: Some(team.other()),
                reason: EndReason::Elimination,
            });
        self.finish(result, &mut Vec::new());
        Ok(result)
    }

    /// Grant a transient effect to a combatant
    ///
    /// Used by scripted encounters and tests to hand out attack
    /// multipliers and other modifiers outside the item economy.
    pub fn grant_effect(
        &mut self,
        owner: &str,
        kind: EffectKind,
        magnitude: i32,
        charges: u32,
        source: &str,
    ) -> Result<(), CombatError> {
        if self.is_ended() {
            return Err(CombatError::AlreadyEnded);
        }
        let target = self
            .roster
            .get(owner)
            .ok_or(IllegalReason::UnknownCombatant)?;
        if !target.is_alive() {
            return Err(IllegalReason::TargetDefeated.into());
        }
        self.ledger.add(owner, kind, magnitude, charges, source);
        Ok(())
    }
}
