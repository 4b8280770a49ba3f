//! Transient effect ledger
//!
//! Effects let one action modify a later one: `defend` boosts the defense of
//! the next incoming hit, `dodge` its evasion, some items the next attack.
//!
//! Stacking: all matching entries are summed and each spends one charge in
//! the same call. An entry whose last charge is spent is dropped before the
//! call returns, so no resolver ever sees a spent effect. Sums saturate at
//! the `i32` range.
//!
//! Defensive effects are spent in two steps. Evasion is spent whenever the
//! owner is the target of a resolved attack. Defense is spent only when that
//! attack lands, so a defense bonus survives a miss.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Kinds of transient modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Percentage bonus on the owner's next attack damage (50 = x1.5)
    AttackMultiplier,
    /// Added to the owner's defense on the next hit it takes
    DefenseBonus,
    /// Added to the owner's evasion score on the next attack against it
    EvasionBonus,
}

impl std::fmt::Display for EffectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EffectKind::AttackMultiplier => "attack multiplier",
            EffectKind::DefenseBonus => "defense bonus",
            EffectKind::EvasionBonus => "evasion bonus",
        };
        write!(f, "{}", s)
    }
}

/// How long an unconsumed effect lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectExpiry {
    /// Persists until consumed or the battle ends
    #[default]
    UntilConsumed,
    /// Dropped once the owner has started this many turns without using it
    AfterOwnerTurns(u32),
}

/// A single ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    pub owner: String,
    pub kind: EffectKind,
    pub magnitude: i32,
    pub charges: u32,
    /// What created this effect, for logging
    pub source: String,
    /// Owner turns left before expiry, when expiry is enabled
    pub expires_in: Option<u32>,
}

impl Effect {
    fn note(&self) -> String {
        match self.kind {
            EffectKind::AttackMultiplier => {
                format!("{}: +{}% damage", self.source, self.magnitude)
            }
            EffectKind::DefenseBonus => format!("{}: +{} defense", self.source, self.magnitude),
            EffectKind::EvasionBonus => format!("{}: +{} evasion", self.source, self.magnitude),
        }
    }
}

/// Attacker-side modifiers consumed for one attack
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackModifier {
    /// Summed percentage bonus; 0 means x1
    pub bonus_pct: i32,
    pub notes: Vec<String>,
}

/// Defender-side modifiers consumed for one incoming attack
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitModifier {
    pub defense_bonus: i32,
    pub evasion_bonus: i32,
    pub notes: Vec<String>,
}

/// Per-battle store of active effects, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectLedger {
    effects: Vec<Effect>,
    expiry: EffectExpiry,
}

impl EffectLedger {
    pub fn new(expiry: EffectExpiry) -> Self {
        Self {
            effects: Vec::new(),
            expiry,
        }
    }

    /// Add an effect. Zero-charge effects are ignored.
    pub fn add(
        &mut self,
        owner: &str,
        kind: EffectKind,
        magnitude: i32,
        charges: u32,
        source: &str,
    ) {
        if charges == 0 {
            return;
        }
        let expires_in = match self.expiry {
            EffectExpiry::UntilConsumed => None,
            EffectExpiry::AfterOwnerTurns(n) => Some(n),
        };
        debug!(
            "effect added: {} {} {} x{} ({})",
            owner, kind, magnitude, charges, source
        );
        self.effects.push(Effect {
            owner: owner.to_string(),
            kind,
            magnitude,
            charges,
            source: source.to_string(),
            expires_in,
        });
    }

    /// Spend one charge from each matching entry, returning the summed
    /// magnitude and a note per entry
    fn consume(&mut self, owner: &str, kind: EffectKind) -> (i32, Vec<String>) {
        let mut total: i32 = 0;
        let mut notes = Vec::new();

        for effect in self
            .effects
            .iter_mut()
            .filter(|e| e.owner == owner && e.kind == kind)
        {
            total = total.saturating_add(effect.magnitude);
            notes.push(effect.note());
            effect.charges -= 1;
        }

        self.effects.retain(|e| e.charges > 0);
        (total, notes)
    }

    /// Consume the actor's attack multipliers for the attack it is making
    pub fn consume_on_attack_by(&mut self, actor: &str) -> AttackModifier {
        let (bonus_pct, notes) = self.consume(actor, EffectKind::AttackMultiplier);
        AttackModifier { bonus_pct, notes }
    }

    /// Consume the target's evasion bonuses for an attack aimed at it
    pub fn consume_evasion_of(&mut self, target: &str) -> HitModifier {
        let (evasion_bonus, notes) = self.consume(target, EffectKind::EvasionBonus);
        HitModifier {
            defense_bonus: 0,
            evasion_bonus,
            notes,
        }
    }

    /// Consume the target's defense bonuses for an attack landing on it
    pub fn consume_on_hit_of(&mut self, target: &str) -> HitModifier {
        let (defense_bonus, notes) = self.consume(target, EffectKind::DefenseBonus);
        HitModifier {
            defense_bonus,
            evasion_bonus: 0,
            notes,
        }
    }

    /// Advance expiry for an owner whose turn is starting
    ///
    /// Returns the effects that expired unused.
    pub fn tick_owner(&mut self, owner: &str) -> Vec<Effect> {
        if self.expiry == EffectExpiry::UntilConsumed {
            return Vec::new();
        }

        for effect in self.effects.iter_mut().filter(|e| e.owner == owner) {
            if let Some(left) = effect.expires_in.as_mut() {
                *left = left.saturating_sub(1);
            }
        }

        let (expired, kept): (Vec<Effect>, Vec<Effect>) = self
            .effects
            .drain(..)
            .partition(|e| e.owner == owner && e.expires_in == Some(0));
        self.effects = kept;
        expired
    }

    /// Drop every effect owned by a combatant
    pub fn clear_owner(&mut self, owner: &str) {
        self.effects.retain(|e| e.owner != owner);
    }

    /// Active effects for a combatant
    pub fn effects_of<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = &'a Effect> + 'a {
        self.effects.iter().filter(move |e| e.owner == owner)
    }

    pub fn has(&self, owner: &str, kind: EffectKind) -> bool {
        self.effects_of(owner).any(|e| e.kind == kind)
    }

    pub fn expiry(&self) -> EffectExpiry {
        self.expiry
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
