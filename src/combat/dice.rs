//! Dice rolling
//!
//! Every random draw the engine makes goes through a [`Dice`] passed in by
//! the caller, so a battle can be replayed from a seed or driven by a fixed
//! script in tests.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of randomness for combat resolution
pub trait Dice: Send {
    /// Roll a single die, returning a value in `[1, sides]`
    fn roll_d(&mut self, sides: u32) -> u32;

    /// Succeed with probability `p` (clamped into `[0, 1]`)
    fn chance(&mut self, p: f64) -> bool;

    /// Roll a single d20
    fn roll_d20(&mut self) -> u32 {
        self.roll_d(20)
    }
}

fn clamp_probability(p: f64) -> Option<f64> {
    if p.is_nan() {
        None
    } else {
        Some(p.clamp(0.0, 1.0))
    }
}

/// Dice backed by the thread-local generator
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadDice;

impl Dice for ThreadDice {
    fn roll_d(&mut self, sides: u32) -> u32 {
        rand::rng().random_range(1..=sides.max(1))
    }

    fn chance(&mut self, p: f64) -> bool {
        clamp_probability(p).is_some_and(|p| rand::rng().random_bool(p))
    }
}

/// Reproducible dice from a 64-bit seed
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: StdRng,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Dice for SeededDice {
    fn roll_d(&mut self, sides: u32) -> u32 {
        self.rng.random_range(1..=sides.max(1))
    }

    fn chance(&mut self, p: f64) -> bool {
        clamp_probability(p).is_some_and(|p| self.rng.random_bool(p))
    }
}

/// Dice that replay queued results in order
///
/// Rolls and chance checks are kept in separate queues. A scripted roll is
/// clamped into the die's range. Once a queue runs dry, rolls come up 1 and
/// chance checks fail.
#[derive(Debug, Default, Clone)]
pub struct ScriptedDice {
    rolls: VecDeque<u32>,
    chances: VecDeque<bool>,
}

impl ScriptedDice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script die rolls, consumed first to last
    pub fn with_rolls(mut self, rolls: impl IntoIterator<Item = u32>) -> Self {
        self.rolls.extend(rolls);
        self
    }

    /// Script chance outcomes, consumed first to last
    pub fn with_chances(mut self, chances: impl IntoIterator<Item = bool>) -> Self {
        self.chances.extend(chances);
        self
    }

    pub fn push_roll(&mut self, roll: u32) {
        self.rolls.push_back(roll);
    }

    pub fn push_chance(&mut self, outcome: bool) {
        self.chances.push_back(outcome);
    }

    /// Rolls not yet consumed
    pub fn remaining_rolls(&self) -> usize {
        self.rolls.len()
    }
}

impl Dice for ScriptedDice {
    fn roll_d(&mut self, sides: u32) -> u32 {
        let sides = sides.max(1);
        self.rolls.pop_front().unwrap_or(1).clamp(1, sides)
    }

    fn chance(&mut self, _p: f64) -> bool {
        self.chances.pop_front().unwrap_or(false)
    }
}

impl<D: Dice + ?Sized> Dice for Box<D> {
    fn roll_d(&mut self, sides: u32) -> u32 {
        (**self).roll_d(sides)
    }

    fn chance(&mut self, p: f64) -> bool {
        (**self).chance(p)
    }
}
