//! Recently picked colors
//!
//! The history is a JSON array of `{color, timestamp}` records under the
//! `selectedColors` key, newest first and capped at [`HISTORY_LIMIT`] entries.
//! A color pick prepends one entry; an area snap replaces the whole list.

use crate::core::error::Result;
use crate::core::storage::{read_collection, write_collection, KeyValueStore, SELECTED_COLORS_KEY};
use chrono::{DateTime, TimeZone, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Maximum number of remembered colors
pub const HISTORY_LIMIT: usize = 20;

/// One remembered color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub color: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl HistoryEntry {
    pub fn new(color: impl Into<String>, timestamp: i64) -> Self {
        Self {
            color: color.into(),
            timestamp,
        }
    }

    /// Relative age for display: "Just now", "5m ago", "3h ago", else the date.
    pub fn age_label(&self, now: DateTime<Utc>) -> String {
        let minutes = (now.timestamp_millis() - self.timestamp) / 60_000;
        let hours = minutes / 60;

        if minutes < 1 {
            "Just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if hours < 24 {
            format!("{}h ago", hours)
        } else {
            match Utc.timestamp_millis_opt(self.timestamp).single() {
                Some(at) => at.format("%Y-%m-%d").to_string(),
                None => "Unknown".to_string(),
            }
        }
    }
}

/// Bounded, persisted list of recently picked colors
#[derive(Clone)]
pub struct ColorHistory {
    store: Arc<dyn KeyValueStore>,
    entries: Vec<HistoryEntry>,
}

impl ColorHistory {
    /// Load the stored history. A missing key is an empty history.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let mut entries: Vec<HistoryEntry> = read_collection(store.as_ref(), SELECTED_COLORS_KEY)?;
        entries.truncate(HISTORY_LIMIT);
        debug!("Loaded {} history entries", entries.len());
        Ok(Self { store, entries })
    }

    /// Entries, newest first
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prepend a picked color, dropping the oldest entry past the cap
    pub fn push(&mut self, color: &str) -> Result<()> {
        let mut entries = Vec::with_capacity(HISTORY_LIMIT);
        entries.push(HistoryEntry::new(color, Utc::now().timestamp_millis()));
        entries.extend(self.entries.iter().take(HISTORY_LIMIT - 1).cloned());
        self.commit(entries)
    }

    /// Replace the history with `colors`, all stamped now
    pub fn replace<I, S>(&mut self, colors: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let now = Utc::now().timestamp_millis();
        let entries = colors
            .into_iter()
            .take(HISTORY_LIMIT)
            .map(|c| HistoryEntry::new(c.as_ref(), now))
            .collect();
        self.commit(entries)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.commit(Vec::new())
    }

    // In-memory state only changes once the write succeeded.
    fn commit(&mut self, entries: Vec<HistoryEntry>) -> Result<()> {
        write_collection(self.store.as_ref(), SELECTED_COLORS_KEY, &entries)?;
        self.entries = entries;
        Ok(())
    }
}
