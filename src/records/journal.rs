use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    pub card_id: String,
    pub entry: String,
    pub created_at: DateTime<Utc>,
}

/// Every shape `journalEntries` has been stored in.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredJournal {
    Entries(Vec<JournalEntry>),
    /// Older builds kept one note per card: `{ cardId: text }`
    Legacy(BTreeMap<String, serde_json::Value>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match serde_json::from_str::<StoredJournal>(raw) {
            Ok(StoredJournal::Entries(entries)) => Self { entries },
            Ok(StoredJournal::Legacy(map)) => {
                let entries: Vec<_> = map
                    .into_iter()
                    .filter_map(|(card_id, value)| match value {
                        serde_json::Value::String(text) if !text.trim().is_empty() => {
                            Some(JournalEntry {
                                id: format!("legacy-{card_id}"),
                                card_id,
                                entry: text,
                                created_at: DateTime::<Utc>::default(),
                            })
                        }
                        _ => None,
                    })
                    .collect();
                debug!("Read {} legacy journal entries", entries.len());
                Self { entries }
            }
            Err(e) => {
                warn!("Stored journal is malformed, starting empty: {e}");
                Self::default()
            }
        }
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries for one card, newest first
    pub fn entries_for(&self, card_id: &str) -> Vec<&JournalEntry> {
        let mut found: Vec<_> = self
            .entries
            .iter()
            .filter(|e| e.card_id == card_id)
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found
    }

    /// All entries, newest first
    pub fn newest_first(&self) -> Vec<&JournalEntry> {
        let mut all: Vec<_> = self.entries.iter().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }

    /// Append an entry. Blank text is rejected.
    pub fn add<R: Rng + ?Sized>(
        &mut self,
        card_id: &str,
        text: &str,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Option<&JournalEntry> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let suffix: String = rng
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect();
        self.entries.push(JournalEntry {
            id: format!("{}-{suffix}", now.timestamp_millis()),
            card_id: card_id.to_string(),
            entry: text.to_string(),
            created_at: now,
        });
        self.entries.last()
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Always the array shape
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.entries).unwrap_or_else(|_| "[]".to_string())
    }
}
