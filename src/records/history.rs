use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::deck::Card;

pub const HISTORY_LIMIT: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub card_id: String,
    /// Title at the time of the draw, kept even if the catalog changes
    pub title: String,
    pub drawn_at: DateTime<Utc>,
}

/// Draw log, newest first, capped at [`HISTORY_LIMIT`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match serde_json::from_str::<Vec<HistoryEntry>>(raw) {
            Ok(mut entries) => {
                entries.truncate(HISTORY_LIMIT);
                Self { entries }
            }
            Err(e) => {
                warn!("Stored history is malformed, starting empty: {e}");
                Self::default()
            }
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn record(&mut self, card: &Card, at: DateTime<Utc>) {
        self.entries.insert(
            0,
            HistoryEntry {
                card_id: card.id.clone(),
                title: card.title.clone(),
                drawn_at: at,
            },
        );
        self.entries.truncate(HISTORY_LIMIT);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.entries).unwrap_or_else(|_| "[]".to_string())
    }
}
