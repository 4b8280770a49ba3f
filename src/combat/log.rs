//! Battle audit log
//!
//! A bounded ring of structured records. Sequence numbers keep counting when
//! old records fall off the front, so observers can poll with `since`.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::action::{Action, HpDelta, Resolution};
use super::combatant::TeamId;
use super::turn::BattleResult;

/// What a record describes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    /// One accepted action
    Action {
        action: Action,
        resolution: Resolution,
        hp_deltas: Vec<HpDelta>,
        /// Auto-pass forced by a turn timeout
        timed_out: bool,
    },
    Forfeit {
        team: TeamId,
    },
    Ended {
        result: BattleResult,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub seq: u64,
    pub round: u32,
    pub at: DateTime<Utc>,
    /// Acting combatant, if any
    pub actor: Option<String>,
    #[serde(flatten)]
    pub event: LogEvent,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleLog {
    records: VecDeque<LogRecord>,
    capacity: usize,
    next_seq: u64,
}

impl BattleLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
            next_seq: 1,
        }
    }

    /// Append a record, evicting the oldest when full
    pub fn push(
        &mut self,
        round: u32,
        actor: Option<&str>,
        event: LogEvent,
        message: String,
    ) -> LogRecord {
        let record = LogRecord {
            seq: self.next_seq,
            round,
            at: Utc::now(),
            actor: actor.map(str::to_string),
            event,
            message,
        };
        self.next_seq += 1;

        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record.clone());
        record
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogRecord> {
        self.records.iter()
    }

    /// Records with a sequence number greater than `seq`
    pub fn since(&self, seq: u64) -> impl Iterator<Item = &LogRecord> {
        self.records.iter().filter(move |r| r.seq > seq)
    }

    pub fn last(&self) -> Option<&LogRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
