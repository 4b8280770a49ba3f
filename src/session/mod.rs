//! Battle session registry
//!
//! Holds every running battle behind its own lock:
//! - Calls for one battle are applied one at a time, in arrival order
//! - Different battles never contend beyond the brief map lookup
//! - Each battle owns its dice, so seeded battles replay exactly

pub mod autopilot;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use crate::combat::{
    Action, ActionOutcome, Battle, BattleResult, BattleStatus, CombatError, CombatantSpec, Dice,
    EffectKind, ForfeitTarget, ThreadDice,
};
use crate::config::BattleConfig;

/// A battle plus the dice that drive it
pub struct Session {
    battle: Battle,
    dice: Box<dyn Dice>,
    created_at: DateTime<Utc>,
}

/// Listing entry for a running battle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BattleSummary {
    pub id: String,
    pub status: BattleStatus,
    pub round: u32,
    pub pending_actor: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Registry of battles, keyed by id
pub struct BattleManager {
    battles: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
    /// Rules for battles created without an explicit config
    config: BattleConfig,
}

impl Default for BattleManager {
    fn default() -> Self {
        Self::new(BattleConfig::default())
    }
}

impl BattleManager {
    pub fn new(config: BattleConfig) -> Self {
        Self {
            battles: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Create a shared instance
    pub fn shared(config: BattleConfig) -> Arc<Self> {
        Arc::new(Self::new(config))
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Start a battle with the default rules and unseeded dice
    pub async fn create_battle(
        &self,
        team_a: &[CombatantSpec],
        team_b: &[CombatantSpec],
    ) -> Result<String, CombatError> {
        self.create_battle_with(team_a, team_b, self.config.clone(), Box::new(ThreadDice))
            .await
    }

    /// Start a battle with explicit rules and dice
    pub async fn create_battle_with(
        &self,
        team_a: &[CombatantSpec],
        team_b: &[CombatantSpec],
        config: BattleConfig,
        dice: Box<dyn Dice>,
    ) -> Result<String, CombatError> {
        let id = Uuid::new_v4().to_string();
        let battle = Battle::create(id.clone(), team_a, team_b, config)?;

        let session = Session {
            battle,
            dice,
            created_at: Utc::now(),
        };
        self.battles
            .write()
            .await
            .insert(id.clone(), Arc::new(Mutex::new(session)));

        info!("Registered battle {}", id);
        Ok(id)
    }

    async fn session(&self, battle_id: &str) -> Result<Arc<Mutex<Session>>, CombatError> {
        let battles = self.battles.read().await;
        battles
            .get(battle_id)
            .cloned()
            .ok_or_else(|| CombatError::UnknownBattle(battle_id.to_string()))
    }

    /// Submit an action for the pending actor
    pub async fn submit(
        &self,
        battle_id: &str,
        actor_id: &str,
        action: Action,
    ) -> Result<ActionOutcome, CombatError> {
        let session = self.session(battle_id).await?;
        let mut guard = session.lock().await;
        let Session { battle, dice, .. } = &mut *guard;

        let result = battle.submit_action(&mut **dice, actor_id, action);
        if let Err(e) = &result {
            warn!("Battle {}: rejected action from {}: {}", battle_id, actor_id, e);
        }
        result
    }

    /// Submit an action given as a JSON envelope
    pub async fn submit_json(
        &self,
        battle_id: &str,
        actor_id: &str,
        json: &str,
    ) -> Result<ActionOutcome, CombatError> {
        let action = Action::from_json(json).map_err(|e| {
            warn!("Battle {}: unreadable action from {}: {}", battle_id, actor_id, e);
            e
        })?;
        self.submit(battle_id, actor_id, action).await
    }

    /// Auto-pass a pending actor whose turn timer expired
    pub async fn force_timeout(
        &self,
        battle_id: &str,
        actor_id: &str,
    ) -> Result<ActionOutcome, CombatError> {
        let session = self.session(battle_id).await?;
        let mut guard = session.lock().await;
        let Session { battle, dice, .. } = &mut *guard;
        battle.force_timeout(&mut **dice, actor_id)
    }

    /// Forfeit a side; returns the (possibly already decided) result
    pub async fn forfeit(
        &self,
        battle_id: &str,
        target: ForfeitTarget,
    ) -> Result<BattleResult, CombatError> {
        let session = self.session(battle_id).await?;
        let mut guard = session.lock().await;
        guard.battle.forfeit(target)
    }

    pub async fn mark_ready(&self, battle_id: &str, combatant_id: &str) -> Result<bool, CombatError> {
        let session = self.session(battle_id).await?;
        let mut guard = session.lock().await;
        guard.battle.mark_ready(combatant_id)
    }

    pub async fn grant_effect(
        &self,
        battle_id: &str,
        owner: &str,
        kind: EffectKind,
        magnitude: i32,
        charges: u32,
        source: &str,
    ) -> Result<(), CombatError> {
        let session = self.session(battle_id).await?;
        let mut guard = session.lock().await;
        guard
            .battle
            .grant_effect(owner, kind, magnitude, charges, source)
    }

    /// Id of the combatant whose action is awaited
    pub async fn pending_actor(&self, battle_id: &str) -> Result<Option<String>, CombatError> {
        let session = self.session(battle_id).await?;
        let guard = session.lock().await;
        Ok(guard.battle.pending_actor().map(|c| c.id.clone()))
    }

    /// Copy of a battle's current state
    pub async fn snapshot(&self, battle_id: &str) -> Result<Battle, CombatError> {
        let session = self.session(battle_id).await?;
        let guard = session.lock().await;
        Ok(guard.battle.clone())
    }

    /// All registered battles, oldest first
    pub async fn list(&self) -> Vec<BattleSummary> {
        let sessions: Vec<Arc<Mutex<Session>>> =
            self.battles.read().await.values().cloned().collect();

        let mut summaries = Vec::with_capacity(sessions.len());
        for session in sessions {
            let guard = session.lock().await;
            summaries.push(BattleSummary {
                id: guard.battle.id().to_string(),
                status: guard.battle.status(),
                round: guard.battle.round(),
                pending_actor: guard.battle.pending_actor().map(|c| c.id.clone()),
                created_at: guard.created_at,
            });
        }
        summaries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        summaries
    }

    /// Drop a battle; returns whether it existed
    pub async fn remove(&self, battle_id: &str) -> bool {
        let removed = self.battles.write().await.remove(battle_id).is_some();
        if removed {
            info!("Removed battle {}", battle_id);
        }
        removed
    }

    /// Drop every ended battle; returns how many were removed
    pub async fn prune_ended(&self) -> usize {
        let mut battles = self.battles.write().await;
        let mut ended = Vec::new();
        for (id, session) in battles.iter() {
            if session.lock().await.battle.is_ended() {
                ended.push(id.clone());
            }
        }
        for id in &ended {
            battles.remove(id);
        }
        ended.len()
    }

    pub async fn len(&self) -> usize {
        self.battles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.battles.read().await.is_empty()
    }
}
