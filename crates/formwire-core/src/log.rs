#![forbid(unsafe_code)]

//! Bounded interaction log.
//!
//! One record per handled action or host callback, drained by the host as
//! JSON lines. The log keeps the newest `capacity` records.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The action changed the document or produced an effect.
    Applied,
    /// The action ran and found nothing to change.
    Unchanged,
    /// A required element or value was missing.
    Skipped,
    /// A host capability reported failure.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub seq: u64,
    pub action: String,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl InteractionRecord {
    /// Serialize as a single JSON line (no trailing newline).
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        // A struct of strings and integers cannot fail to serialize.
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct InteractionLog {
    records: VecDeque<InteractionRecord>,
    capacity: usize,
    next_seq: u64,
}

impl InteractionLog {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::new(),
            capacity: capacity.max(1),
            next_seq: 0,
        }
    }

    pub fn record(&mut self, action: &str, outcome: Outcome, detail: Option<String>) {
        if self.records.len() >= self.capacity {
            let overflow = self.records.len() - self.capacity + 1;
            self.records.drain(..overflow);
        }
        self.records.push_back(InteractionRecord {
            seq: self.next_seq,
            action: action.to_string(),
            outcome,
            detail,
        });
        self.next_seq += 1;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InteractionRecord> {
        self.records.iter()
    }

    pub fn drain(&mut self) -> Vec<InteractionRecord> {
        self.records.drain(..).collect()
    }
}
