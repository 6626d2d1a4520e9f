pub mod favorites;
pub mod history;
pub mod journal;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::debug;

use crate::deck::Card;
use crate::storage::{Persistence, KEY_FAVORITES, KEY_HISTORY, KEY_JOURNAL, KEY_LAST_CARD};

pub use favorites::Favorites;
pub use history::{History, HISTORY_LIMIT};
pub use journal::{Journal, JournalEntry};

/// Everything the user accumulates across runs, kept in memory and written
/// back through [`Persistence`] on every change.
pub struct Records {
    history: History,
    journal: Journal,
    favorites: Favorites,
    persistence: Persistence,
}

impl Records {
    pub fn load(persistence: Persistence) -> Self {
        let history = History::parse(persistence.get(KEY_HISTORY).as_deref());
        let journal = Journal::parse(persistence.get(KEY_JOURNAL).as_deref());
        let favorites = Favorites::parse(persistence.get(KEY_FAVORITES).as_deref());

        // The table always opens at the fan, so the last card is only noted.
        if let Some(last) = persistence.get(KEY_LAST_CARD) {
            debug!("Last drawn card was {last}; not restoring it");
        }

        debug!(
            "Loaded {} history, {} journal, {} favorites",
            history.len(),
            journal.len(),
            favorites.count()
        );
        Self {
            history,
            journal,
            favorites,
            persistence,
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn record_draw(&mut self, card: &Card, at: DateTime<Utc>) {
        self.history.record(card, at);
        self.persistence.set(KEY_HISTORY, self.history.to_json());
    }

    pub fn remember_last_card(&mut self, card: &Card) {
        self.persistence.set(KEY_LAST_CARD, card.id.clone());
    }

    pub fn toggle_favorite(&mut self, card_id: &str) -> bool {
        let now = self.favorites.toggle(card_id);
        self.persistence.set(KEY_FAVORITES, self.favorites.to_json());
        now
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.persistence.set(KEY_HISTORY, self.history.to_json());
    }

    pub fn add_journal_entry<R: Rng + ?Sized>(
        &mut self,
        card_id: &str,
        text: &str,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Option<JournalEntry> {
        let entry = self.journal.add(card_id, text, now, rng)?.clone();
        self.persistence.set(KEY_JOURNAL, self.journal.to_json());
        Some(entry)
    }

    pub fn delete_journal_entry(&mut self, id: &str) -> bool {
        if !self.journal.delete(id) {
            return false;
        }
        self.persistence.set(KEY_JOURNAL, self.journal.to_json());
        true
    }

    pub async fn flush(&mut self) {
        self.persistence.flush().await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};

    fn card(id: &str) -> Card {
        Card {
            id: id.into(),
            title: id.to_uppercase(),
            image: String::new(),
            kind: Default::default(),
            detail: None,
        }
    }

    fn records(store: &Arc<MemoryStore>) -> Records {
        Records::load(Persistence::inline(store.clone()))
    }

    #[test]
    fn changes_are_written_under_their_keys() {
        let store = Arc::new(MemoryStore::new());
        let mut r = records(&store);
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();

        r.record_draw(&card("tide"), at);
        r.remember_last_card(&card("tide"));
        r.toggle_favorite("tide");
        let mut rng = StdRng::seed_from_u64(3);
        let entry = r.add_journal_entry("tide", "note", at, &mut rng).unwrap();

        assert!(store.get(KEY_HISTORY).unwrap().unwrap().contains("\"tide\""));
        assert_eq!(store.get(KEY_LAST_CARD).unwrap().as_deref(), Some("tide"));
        assert_eq!(store.get(KEY_FAVORITES).unwrap().as_deref(), Some(r#"{"tide":true}"#));
        assert!(store.get(KEY_JOURNAL).unwrap().unwrap().contains(&entry.id));

        // a fresh load sees the same data
        let again = records(&store);
        assert_eq!(again.history().len(), 1);
        assert_eq!(again.journal().len(), 1);
        assert!(again.favorites().is_favorite("tide"));
    }

    #[test]
    fn legacy_journal_is_upgraded_on_next_write() {
        let store = Arc::new(MemoryStore::new());
        store.set(KEY_JOURNAL, r#"{"card-1":"hello"}"#).unwrap();
        let mut r = records(&store);
        assert_eq!(r.journal().len(), 1);

        assert!(r.delete_journal_entry("legacy-card-1"));
        assert_eq!(store.get(KEY_JOURNAL).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn clear_history_persists_empty_log() {
        let store = Arc::new(MemoryStore::new());
        let mut r = records(&store);
        r.record_draw(&card("salt"), Utc::now());
        r.clear_history();
        assert!(r.history().is_empty());
        assert_eq!(store.get(KEY_HISTORY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn malformed_stored_values_load_as_defaults() {
        let store = Arc::new(MemoryStore::new());
        store.set(KEY_HISTORY, "{{{").unwrap();
        store.set(KEY_FAVORITES, "[]").unwrap();
        let r = records(&store);
        assert!(r.history().is_empty());
        assert_eq!(r.favorites().count(), 0);
    }
}
