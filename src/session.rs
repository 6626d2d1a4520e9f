use std::time::Duration;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info};

use crate::animation::timeline::{PhaseValues, RunId, ShuffleTiming, Timeline};
use crate::deck::{draw_next, CardRef, Catalog, DeckState};
use crate::machine::{
    DrawMode, Face, FlipMode, RevealMachine, RevealState, RevealTiming, SelectOutcome, Selection,
    SelectionPhase, Settled, TapOutcome,
};
use crate::records::{JournalEntry, Records};

/// Tunables for one table session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub fan_size: usize,
    pub mode: DrawMode,
    pub shuffle: ShuffleTiming,
    pub reveal: RevealTiming,
    pub flip_mode: FlipMode,
    /// Confirm highlight animation, in and out
    pub confirm: Duration,
    pub auto_flip_delay: Duration,
    /// Extra delay per card after the first in a multi-card draw
    pub auto_flip_stagger: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            fan_size: 9,
            mode: DrawMode::Single,
            shuffle: ShuffleTiming::default(),
            reveal: RevealTiming::default(),
            flip_mode: FlipMode::Transform,
            confirm: Duration::from_millis(220),
            auto_flip_delay: Duration::from_millis(350),
            auto_flip_stagger: Duration::from_millis(250),
        }
    }
}

/// Things that happened during [`Session::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A shuffle animation finished and the deck order was replaced
    ShuffleCommitted,
    /// A card's flip landed
    CardSettled { index: usize, state: RevealState },
}

#[derive(Debug, Clone)]
struct SpreadCard {
    card: CardRef,
    reveal: RevealMachine,
}

/// Render-ready view of one dealt card.
#[derive(Debug, Clone)]
pub struct SpreadView {
    pub card: CardRef,
    pub state: RevealState,
    pub flip: f32,
    pub displayed: Face,
    pub favorite: bool,
    pub locked: bool,
}

#[derive(Debug, Clone)]
pub struct SelectionView {
    pub phase: SelectionPhase,
    pub slots: Vec<usize>,
    pub confirm_pending: bool,
    pub confirm_value: f32,
}

/// Everything the presentation layer needs for one frame.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub mode: DrawMode,
    pub fan_size: usize,
    pub shuffling: bool,
    pub shuffle_progress: Option<f32>,
    pub phase: PhaseValues,
    pub selection: SelectionView,
    /// Dealt cards; empty while the fan is showing
    pub spread: Vec<SpreadView>,
    pub focus: usize,
}

impl Snapshot {
    pub fn focused(&self) -> Option<&SpreadView> {
        self.spread.get(self.focus)
    }

    pub fn showing_fan(&self) -> bool {
        self.spread.is_empty()
    }
}

/// The card table: deck, shuffle timeline, fan selection, dealt cards and
/// the user's records, all driven by [`Session::advance`].
pub struct Session<R: Rng = StdRng> {
    deck: DeckState,
    rng: R,
    timeline: Timeline,
    shuffle_run: Option<RunId>,
    selection: Selection,
    spread: Vec<SpreadCard>,
    focus: usize,
    records: Records,
    config: SessionConfig,
}

impl<R: Rng> Session<R> {
    pub fn new(catalog: &Catalog, records: Records, config: SessionConfig, rng: R) -> Self {
        let deck = DeckState::new(catalog.drawable(), catalog.fallback_card());
        info!(
            "Session ready: {} drawable cards, {} mode, fan of {}",
            deck.cards().len(),
            config.mode,
            config.fan_size
        );
        Self {
            deck,
            rng,
            timeline: Timeline::new(config.shuffle.phases()),
            shuffle_run: None,
            selection: Selection::new(config.mode, config.confirm),
            spread: Vec::new(),
            focus: 0,
            records,
            config,
        }
    }

    #[cfg(test)]
    pub fn deck(&self) -> &DeckState {
        &self.deck
    }

    pub fn records(&self) -> &Records {
        &self.records
    }

    pub fn mode(&self) -> DrawMode {
        self.selection.mode()
    }

    pub fn fan_size(&self) -> usize {
        self.config.fan_size
    }

    pub fn is_shuffling(&self) -> bool {
        self.shuffle_run.is_some()
    }

    pub fn showing_fan(&self) -> bool {
        self.spread.is_empty()
    }

    pub fn selection_phase(&self) -> SelectionPhase {
        self.selection.phase()
    }

    pub fn focused_card(&self) -> Option<&CardRef> {
        self.spread.get(self.focus).map(|s| &s.card)
    }

    /// Gather the table back into the fan and play a shuffle from the start.
    pub fn request_shuffle(&mut self) -> RunId {
        self.request_shuffle_from(0.0)
    }

    /// Play a shuffle that appears to be `progress` of the way through.
    /// Any running shuffle is superseded; only the newest one commits.
    pub fn request_shuffle_from(&mut self, progress: f32) -> RunId {
        self.spread.clear();
        self.focus = 0;
        self.selection.clear();
        let id = self.timeline.resume_at(progress);
        self.shuffle_run = Some(id);
        info!("Shuffle {id} requested at {:.0}%", progress.clamp(0.0, 1.0) * 100.0);
        id
    }

    /// Tap a fan slot. A confirming tap deals the cards.
    pub fn select_slot(&mut self, slot: usize) -> SelectOutcome {
        if self.is_shuffling() || slot >= self.config.fan_size || !self.spread.is_empty() {
            debug!("Slot {slot} tap ignored");
            return SelectOutcome::Ignored;
        }
        let outcome = self.selection.select(slot);
        if let SelectOutcome::Confirmed(slots) = &outcome {
            self.commit_draw(slots.len());
        }
        outcome
    }

    /// Answer the "draw these?" prompt. Returns whether anything changed.
    pub fn confirm_selection(&mut self, yes: bool) -> bool {
        if !yes {
            return self.selection.cancel();
        }
        if self.is_shuffling() {
            return false;
        }
        match self.selection.confirm() {
            Some(slots) => {
                self.commit_draw(slots.len());
                true
            }
            None => false,
        }
    }

    fn commit_draw(&mut self, count: usize) {
        let now = Utc::now();
        let mut spread = Vec::with_capacity(count);
        for i in 0..count {
            let (next, card) = draw_next(&self.deck, &mut self.rng);
            self.deck = next;
            if card.kind.is_drawable() {
                self.records.record_draw(&card, now);
            }

            let mut reveal =
                RevealMachine::new(card.has_detail(), self.config.flip_mode, self.config.reveal);
            let stagger = self.config.auto_flip_stagger * i as u32;
            reveal.schedule_auto_flip(self.config.auto_flip_delay + stagger);
            spread.push(SpreadCard { card, reveal });
        }
        if let Some(last) = spread.last() {
            self.records.remember_last_card(&last.card);
        }
        info!(
            "Dealt {}",
            spread
                .iter()
                .map(|s| s.card.id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        self.spread = spread;
        self.focus = 0;
    }

    pub fn tap_card(&mut self) -> TapOutcome {
        match self.spread.get_mut(self.focus) {
            Some(s) => s.reveal.tap(),
            None => TapOutcome::Ignored,
        }
    }

    pub fn tap_detail_back(&mut self) -> TapOutcome {
        match self.spread.get_mut(self.focus) {
            Some(s) => s.reveal.tap_detail_back(),
            None => TapOutcome::Ignored,
        }
    }

    pub fn focus_next(&mut self) {
        if !self.spread.is_empty() {
            self.focus = (self.focus + 1).min(self.spread.len() - 1);
        }
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.saturating_sub(1);
    }

    /// Toggle the focused card's favorite flag; `None` with no card dealt.
    pub fn toggle_favorite(&mut self) -> Option<bool> {
        let id = self.focused_card()?.id.clone();
        Some(self.records.toggle_favorite(&id))
    }

    pub fn toggle_draw_mode(&mut self) -> bool {
        let shuffling = self.is_shuffling();
        self.selection.toggle_mode(shuffling)
    }

    pub fn clear_history(&mut self) {
        self.records.clear_history();
        info!("History cleared");
    }

    /// Journal against the focused card. Blank text, or no card, saves nothing.
    pub fn save_journal_entry(&mut self, text: &str) -> Option<JournalEntry> {
        let id = self.focused_card()?.id.clone();
        self.records.add_journal_entry(&id, text, Utc::now(), &mut self.rng)
    }

    pub fn delete_journal_entry(&mut self, id: &str) -> bool {
        self.records.delete_journal_entry(id)
    }

    /// Put the dealt cards away and show the fan again.
    pub fn return_to_fan(&mut self) -> bool {
        if self.spread.is_empty() && self.selection.phase() == SelectionPhase::Idle {
            return false;
        }
        self.spread.clear();
        self.focus = 0;
        self.selection.clear();
        debug!("Back to the fan");
        true
    }

    /// Move the session clock forward.
    pub fn advance(&mut self, dt: Duration) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        if let Some(done) = self.timeline.advance(dt) {
            if self.shuffle_run == Some(done.0) {
                self.shuffle_run = None;
                self.deck.reshuffle(&mut self.rng);
                events.push(SessionEvent::ShuffleCommitted);
            }
        }

        self.selection.advance(dt);

        for (index, s) in self.spread.iter_mut().enumerate() {
            if let Some(Settled(state)) = s.reveal.advance(dt) {
                events.push(SessionEvent::CardSettled { index, state });
            }
        }
        events
    }

    pub fn snapshot(&self) -> Snapshot {
        let favorites = self.records.favorites();
        Snapshot {
            mode: self.selection.mode(),
            fan_size: self.config.fan_size,
            shuffling: self.is_shuffling(),
            shuffle_progress: self.timeline.progress(),
            phase: self.timeline.values(),
            selection: SelectionView {
                phase: self.selection.phase(),
                slots: self.selection.slots().to_vec(),
                confirm_pending: self.selection.is_confirm_pending(),
                confirm_value: self.selection.confirm_value(),
            },
            spread: self
                .spread
                .iter()
                .map(|s| SpreadView {
                    card: s.card.clone(),
                    state: s.reveal.state(),
                    flip: s.reveal.flip_value(),
                    displayed: s.reveal.displayed_face(),
                    favorite: favorites.is_favorite(&s.card.id),
                    locked: s.reveal.is_locked(),
                })
                .collect(),
            focus: self.focus,
        }
    }

    /// Wait for pending writes to reach the store.
    pub async fn flush(&mut self) {
        self.records.flush().await;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use rand::SeedableRng;

    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore, Persistence, KEY_HISTORY, KEY_LAST_CARD};

    const MS: Duration = Duration::from_millis(1);

    fn six_card_catalog() -> Catalog {
        let mut src = String::from("name = \"Test\"\n");
        src.push_str("[[cards]]\nid = \"rules\"\ntitle = \"Rules\"\nkind = \"rules\"\n");
        for i in 1..=6 {
            src.push_str(&format!("[[cards]]\nid = \"c{i}\"\ntitle = \"Card {i}\"\n"));
        }
        src.push_str(
            "[[cards]]\nid = \"deep\"\ntitle = \"Deep\"\nkind = \"rules\"\n[cards.detail]\nparagraphs = [\"x\"]\n",
        );
        Catalog::from_toml(&src).unwrap()
    }

    fn config() -> SessionConfig {
        SessionConfig {
            fan_size: 7,
            mode: DrawMode::Single,
            shuffle: ShuffleTiming {
                collapse: 100 * MS,
                hold: 20 * MS,
                shake_step: 40 * MS,
                shake_steps: 3,
                swirl: 200 * MS,
                swirl_reset: 40 * MS,
                expand: 100 * MS,
            },
            reveal: RevealTiming {
                flip: 100 * MS,
                lock_margin: 20 * MS,
                detail_settle: 10 * MS,
                content_swap_delay: 40 * MS,
            },
            flip_mode: FlipMode::Transform,
            confirm: 50 * MS,
            auto_flip_delay: 300 * MS,
            auto_flip_stagger: 100 * MS,
        }
    }

    fn session_with(store: &Arc<MemoryStore>, config: SessionConfig) -> Session<StdRng> {
        let records = Records::load(Persistence::inline(store.clone()));
        Session::new(&six_card_catalog(), records, config, StdRng::seed_from_u64(42))
    }

    fn session() -> Session<StdRng> {
        session_with(&Arc::new(MemoryStore::new()), config())
    }

    fn draw_one(s: &mut Session<StdRng>, slot: usize) -> CardRef {
        assert_eq!(s.select_slot(slot), SelectOutcome::ConfirmPending);
        assert!(matches!(s.select_slot(slot), SelectOutcome::Confirmed(_)));
        s.focused_card().cloned().unwrap()
    }

    mod drawing {
        use super::*;

        #[test]
        fn six_draws_without_a_shuffle_deal_every_card_once() {
            let mut s = session();
            assert!(!s.deck().is_shuffled());

            let mut seen = HashSet::new();
            for round in 0..6 {
                let card = draw_one(&mut s, round % 7);
                assert!(s.deck().is_shuffled());
                assert_eq!(s.deck().order().len(), 6);
                assert!(seen.insert(card.id.clone()), "dealt {} twice", card.id);
                assert!(s.return_to_fan());
            }
            assert_eq!(seen.len(), 6);
            assert!(seen.iter().all(|id| id.starts_with('c')));
            assert_eq!(s.records().history().len(), 6);
        }

        #[test]
        fn draw_is_recorded_and_last_card_stored() {
            let store = Arc::new(MemoryStore::new());
            let mut s = session_with(&store, config());
            let card = draw_one(&mut s, 3);

            assert_eq!(s.records().history().entries()[0].card_id, card.id);
            assert_eq!(store.get(KEY_LAST_CARD).unwrap().as_deref(), Some(card.id.as_str()));
            assert!(store.get(KEY_HISTORY).unwrap().unwrap().contains(&card.id));
        }

        #[test]
        fn explicit_yes_deals_and_no_clears_after_animation() {
            let mut s = session();
            s.select_slot(2);
            assert!(s.confirm_selection(false));
            assert!(s.snapshot().selection.confirm_pending);
            s.advance(50 * MS);
            assert_eq!(s.snapshot().selection.phase, SelectionPhase::Idle);

            s.select_slot(4);
            assert!(s.confirm_selection(true));
            assert_eq!(s.snapshot().spread.len(), 1);
            assert!(!s.confirm_selection(true));
        }

        #[test]
        fn fan_taps_outside_the_fan_or_during_a_spread_are_ignored() {
            let mut s = session();
            assert_eq!(s.select_slot(7), SelectOutcome::Ignored);
            draw_one(&mut s, 0);
            assert_eq!(s.select_slot(1), SelectOutcome::Ignored);
        }

        #[test]
        fn empty_catalog_deals_fallback_without_history() {
            let catalog = Catalog::from_toml("name = \"Empty\"\n").unwrap();
            let records = Records::load(Persistence::inline(Arc::new(MemoryStore::new())));
            let mut s = Session::new(&catalog, records, config(), StdRng::seed_from_u64(1));
            let card = draw_one(&mut s, 0);
            assert_eq!(card.id, "placeholder");
            assert!(s.records().history().is_empty());
        }
    }

    mod shuffling {
        use super::*;

        const TOTAL: Duration = Duration::from_millis(840);

        #[test]
        fn completed_shuffle_replaces_the_order() {
            let mut s = session();
            draw_one(&mut s, 0);
            s.return_to_fan();
            draw_one(&mut s, 0);
            assert_eq!(s.deck().cursor(), 2);

            s.request_shuffle();
            assert!(s.showing_fan());
            assert!(s.is_shuffling());
            assert!(s.advance(TOTAL - MS).is_empty());
            assert_eq!(s.advance(MS), vec![SessionEvent::ShuffleCommitted]);
            assert!(!s.is_shuffling());
            assert_eq!(s.deck().cursor(), 0);
            assert_eq!(s.snapshot().phase, PhaseValues::default());
        }

        #[test]
        fn slot_taps_and_mode_switch_are_ignored_while_shuffling() {
            let mut s = session();
            s.request_shuffle();
            s.advance(10 * MS);
            assert_eq!(s.select_slot(1), SelectOutcome::Ignored);
            assert!(!s.toggle_draw_mode());
            s.advance(TOTAL);
            assert!(s.toggle_draw_mode());
            assert_eq!(s.mode(), DrawMode::Three);
        }

        #[test]
        fn a_superseded_shuffle_never_commits() {
            let mut s = session();
            s.request_shuffle();
            s.advance(400 * MS);
            s.request_shuffle();
            let commits = (0..100)
                .flat_map(|_| s.advance(10 * MS))
                .filter(|e| *e == SessionEvent::ShuffleCommitted)
                .count();
            assert_eq!(commits, 1);
        }

        #[test]
        fn resumed_at_the_end_commits_on_the_next_zero_step() {
            let mut s = session();
            s.request_shuffle_from(1.0);
            assert_eq!(s.advance(Duration::ZERO), vec![SessionEvent::ShuffleCommitted]);
        }

        #[test]
        fn resumed_midway_shows_motion_immediately() {
            let mut s = session();
            s.request_shuffle_from(0.5);
            let snap = s.snapshot();
            assert!(snap.shuffling);
            assert!(snap.phase.collapse > 0.99);
            let p = snap.shuffle_progress.unwrap();
            assert!((p - 0.5).abs() < 0.01);
        }
    }

    mod three_card {
        use super::*;

        fn three() -> Session<StdRng> {
            let mut s = session();
            assert!(s.toggle_draw_mode());
            s
        }

        #[test]
        fn toggling_a_pick_off_then_completing() {
            let mut s = three();
            assert_eq!(s.select_slot(2), SelectOutcome::Added(2));
            assert_eq!(s.select_slot(5), SelectOutcome::Added(5));
            assert_eq!(s.select_slot(2), SelectOutcome::Removed(2));
            assert_eq!(s.snapshot().selection.slots, vec![5]);

            assert!(!s.toggle_draw_mode());

            s.select_slot(1);
            assert_eq!(s.select_slot(6), SelectOutcome::ConfirmPending);
            assert_eq!(s.select_slot(3), SelectOutcome::Ignored);
            assert!(matches!(s.select_slot(1), SelectOutcome::Confirmed(v) if v == vec![5, 1, 6]));

            let snap = s.snapshot();
            assert_eq!(snap.spread.len(), 3);
            let ids: HashSet<_> = snap.spread.iter().map(|v| v.card.id.clone()).collect();
            assert_eq!(ids.len(), 3);
            assert_eq!(s.records().history().len(), 3);
        }

        #[test]
        fn auto_flips_are_staggered() {
            let mut s = three();
            s.select_slot(0);
            s.select_slot(1);
            s.select_slot(2);
            s.confirm_selection(true);

            s.advance(300 * MS);
            let states: Vec<_> = s.snapshot().spread.iter().map(|v| v.state).collect();
            assert_eq!(states, [RevealState::Front, RevealState::Back, RevealState::Back]);

            let events = s.advance(100 * MS);
            assert!(events.contains(&SessionEvent::CardSettled {
                index: 0,
                state: RevealState::Front
            }));
            assert_eq!(s.snapshot().spread[1].state, RevealState::Front);

            s.advance(200 * MS);
            assert!(s
                .snapshot()
                .spread
                .iter()
                .all(|v| v.state == RevealState::Front && v.flip == 1.0));
        }

        #[test]
        fn focus_moves_within_the_spread() {
            let mut s = three();
            for slot in [0, 1, 2] {
                s.select_slot(slot);
            }
            s.confirm_selection(true);
            s.focus_prev();
            assert_eq!(s.snapshot().focus, 0);
            s.focus_next();
            s.focus_next();
            s.focus_next();
            assert_eq!(s.snapshot().focus, 2);
            let third = s.snapshot().spread[2].card.id.clone();
            assert_eq!(s.focused_card().unwrap().id, third);
        }
    }

    mod card_actions {
        use super::*;

        #[test]
        fn double_tap_inside_the_lock_flips_once() {
            let mut s = session();
            draw_one(&mut s, 0);
            assert_eq!(s.tap_card(), TapOutcome::Started(RevealState::Front));
            s.advance(50 * MS);
            assert_eq!(s.tap_card(), TapOutcome::Ignored);
            s.advance(100 * MS);
            assert_eq!(s.snapshot().spread[0].state, RevealState::Front);
        }

        #[test]
        fn auto_flip_is_dropped_after_a_manual_flip() {
            let mut s = session();
            draw_one(&mut s, 0);
            s.tap_card();
            s.advance(200 * MS);
            // plain card: Front → Back
            assert_eq!(s.tap_card(), TapOutcome::Started(RevealState::Back));
            s.advance(500 * MS);
            assert_eq!(s.snapshot().spread[0].state, RevealState::Back);
        }

        #[test]
        fn favorite_and_journal_follow_the_focused_card() {
            let mut s = session();
            assert_eq!(s.toggle_favorite(), None);
            assert!(s.save_journal_entry("no card").is_none());

            let card = draw_one(&mut s, 0);
            assert_eq!(s.toggle_favorite(), Some(true));
            assert!(s.snapshot().spread[0].favorite);

            assert!(s.save_journal_entry("   ").is_none());
            let entry = s.save_journal_entry("the tide turns").unwrap();
            assert_eq!(entry.card_id, card.id);
            assert_eq!(s.records().journal().entries_for(&card.id).len(), 1);
            assert!(s.delete_journal_entry(&entry.id));
            assert!(s.records().journal().is_empty());
        }

        #[test]
        fn clear_history_empties_the_log() {
            let mut s = session();
            draw_one(&mut s, 0);
            s.clear_history();
            assert!(s.records().history().is_empty());
        }

        #[test]
        fn return_to_fan_is_a_no_op_when_idle() {
            let mut s = session();
            assert!(!s.return_to_fan());
            s.select_slot(1);
            assert!(s.return_to_fan());
            assert_eq!(s.snapshot().selection.phase, SelectionPhase::Idle);
        }
    }
}
