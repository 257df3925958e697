//! ErrorFeed - the list of classified errors currently shown to the user.
//!
//! Transient kinds (user cancellations, rejected connections) drop out after
//! `auto_clear`; everything else stays until dismissed.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::classify::ClassifiedError;
use crate::core::consts::timing;

#[derive(Debug, Clone, Serialize)]
pub struct FeedEntry {
    pub id: u64,
    pub context: String,
    pub error: ClassifiedError,
    pub posted_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ErrorFeed {
    entries: Vec<FeedEntry>,
    next_id: u64,
    auto_clear: Duration,
}

impl Default for ErrorFeed {
    fn default() -> Self { Self::new(Duration::milliseconds(timing::ERROR_AUTO_CLEAR_MS)) }
}

impl ErrorFeed {
    pub fn new(auto_clear: Duration) -> Self { Self { entries: Vec::new(), next_id: 1, auto_clear } }

    pub fn push(&mut self, error: ClassifiedError, context: &str) -> u64 { self.push_at(error, context, Utc::now()) }

    pub fn push_at(&mut self, error: ClassifiedError, context: &str, now: DateTime<Utc>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(FeedEntry { id, context: context.to_string(), error, posted_at: now });
        id
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) { self.entries.clear(); }

    pub fn visible(&self) -> Vec<FeedEntry> { self.visible_at(Utc::now()) }

    /// Entries still on screen at `now`, oldest first.
    pub fn visible_at(&self, now: DateTime<Utc>) -> Vec<FeedEntry> {
        self.entries.iter().filter(|e| !self.cleared(e, now)).cloned().collect()
    }

    /// Drop auto-cleared entries. Returns how many were removed.
    pub fn prune_at(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let auto_clear = self.auto_clear;
        self.entries.retain(|e| !(e.error.is_transient() && now - e.posted_at >= auto_clear));
        before - self.entries.len()
    }

    fn cleared(&self, entry: &FeedEntry, now: DateTime<Utc>) -> bool {
        entry.error.is_transient() && now - entry.posted_at >= self.auto_clear
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}
