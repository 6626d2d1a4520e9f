use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, trace};

use crate::animation::AnimationState;
use crate::config::Config;
use crate::deck::Catalog;
use crate::machine::{SelectOutcome, SelectionPhase, TapOutcome};
use crate::session::{Session, SessionEvent};
use crate::ui::components::confirm_dialog::ConfirmDialog;
use crate::ui::components::input_dialog::InputDialog;
use crate::ui::theme::Theme;

const TOAST_DURATION: Duration = Duration::from_secs(3);
/// Longest frame gap fed to the session; a stalled terminal should not make
/// every animation jump to its end.
const MAX_FRAME_STEP: Duration = Duration::from_millis(250);

// ── Page & Mode enums ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Table,
    History,
    Journal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Input,
    Dialog,
}

// ── Per-page state ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct ListPageState {
    pub selected_index: usize,
}

impl ListPageState {
    fn up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    fn down(&mut self, len: usize) {
        if len > 0 && self.selected_index < len - 1 {
            self.selected_index += 1;
        }
    }

    fn clamp(&mut self, len: usize) {
        self.selected_index = self.selected_index.min(len.saturating_sub(1));
    }
}

// ── Pending Action (for confirm dialog) ───────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    /// Deal the selected fan slots
    Draw,
    ClearHistory,
    DeleteJournalEntry(String),
}

// ── Pending Input (for input dialog) ──────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingInput {
    /// Journal entry for the focused card
    Journal,
}

// ── Application State ─────────────────────────────────────────────────

pub struct App {
    pub active_page: Page,
    pub mode: Mode,
    pub should_quit: bool,
    pub show_help: bool,
    pub theme: Theme,
    pub animation: AnimationState,

    pub session: Session,
    /// Static card data, for resolving ids stored in the records
    pub catalog: Catalog,

    /// Highlighted slot in the fan
    pub fan_cursor: usize,
    pub history_state: ListPageState,
    pub journal_state: ListPageState,

    // Dialogs
    pub input_dialog: InputDialog,
    pub confirm_dialog: ConfirmDialog,

    pub show_help_bar: bool,

    // Toast notification
    pub toast_message: Option<String>,
    pub toast_is_error: bool,
    pub toast_remaining: Duration,

    pub pending_action: Option<PendingAction>,
    pub pending_input: Option<PendingInput>,

    last_tick: Option<Instant>,
}

impl App {
    pub fn new(session: Session, catalog: Catalog, config: &Config) -> Self {
        let fan_cursor = session.fan_size() / 2;
        Self {
            active_page: Page::Table,
            mode: Mode::Normal,
            should_quit: false,
            show_help: false,
            theme: Theme::from_config(&config.theme),
            animation: AnimationState::new(config.animations()),

            session,
            catalog,

            fan_cursor,
            history_state: ListPageState::default(),
            journal_state: ListPageState::default(),

            input_dialog: InputDialog::new("", ""),
            confirm_dialog: ConfirmDialog::new(),

            show_help_bar: config.appearance.show_help_bar,

            toast_message: None,
            toast_is_error: false,
            toast_remaining: Duration::ZERO,

            pending_action: None,
            pending_input: None,
            last_tick: None,
        }
    }

    // ── Clock ─────────────────────────────────────────────────────────

    /// Called on every `Event::Frame`: advance everything by the real time
    /// since the previous tick.
    pub fn on_tick(&mut self, now: Instant) {
        let dt = match self.last_tick.replace(now) {
            Some(prev) => now.saturating_duration_since(prev).min(MAX_FRAME_STEP),
            None => Duration::ZERO,
        };
        self.advance(dt);
    }

    pub fn advance(&mut self, dt: Duration) {
        self.animation.tick();
        self.tick_toast(dt);
        for event in self.session.advance(dt) {
            match event {
                SessionEvent::ShuffleCommitted => {
                    self.fan_cursor = self.session.fan_size() / 2;
                    self.show_toast("Deck shuffled", false);
                }
                SessionEvent::CardSettled { index, state } => {
                    trace!("Card {index} settled at {state:?}");
                }
            }
        }

        // A cancelled draw prompt clears once its animation lands
        if self.pending_action == Some(PendingAction::Draw)
            && self.session.selection_phase() != SelectionPhase::ConfirmPending
        {
            self.pending_action = None;
        }
    }

    /// Handle a key event, dispatching to the appropriate handler
    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.mode {
            Mode::Input => {
                self.handle_input_key(key);
                return;
            }
            Mode::Dialog => {
                self.handle_dialog_key(key);
                return;
            }
            Mode::Normal => {}
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
                self.show_help = false;
            }
            return;
        }

        // Global keybindings
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                return;
            }
            KeyCode::Tab => {
                self.next_page();
                return;
            }
            KeyCode::BackTab => {
                self.prev_page();
                return;
            }
            KeyCode::Char('1') => {
                self.active_page = Page::Table;
                return;
            }
            KeyCode::Char('2') => {
                self.active_page = Page::History;
                return;
            }
            KeyCode::Char('3') => {
                self.active_page = Page::Journal;
                return;
            }
            _ => {}
        }

        match self.active_page {
            Page::Table => self.handle_table_key(key),
            Page::History => self.handle_history_key(key),
            Page::Journal => self.handle_journal_key(key),
        }
    }

    // ── Navigation ────────────────────────────────────────────────────

    fn next_page(&mut self) {
        self.active_page = match self.active_page {
            Page::Table => Page::History,
            Page::History => Page::Journal,
            Page::Journal => Page::Table,
        };
    }

    fn prev_page(&mut self) {
        self.active_page = match self.active_page {
            Page::Table => Page::Journal,
            Page::History => Page::Table,
            Page::Journal => Page::History,
        };
    }

    // ── Toast Management ──────────────────────────────────────────────

    pub fn show_toast(&mut self, message: &str, is_error: bool) {
        self.toast_message = Some(message.to_string());
        self.toast_is_error = is_error;
        self.toast_remaining = TOAST_DURATION;
    }

    pub fn tick_toast(&mut self, dt: Duration) {
        if self.toast_message.is_none() {
            return;
        }
        self.toast_remaining = self.toast_remaining.saturating_sub(dt);
        if self.toast_remaining.is_zero() {
            self.toast_message = None;
        }
    }

    fn open_confirm(&mut self, action: PendingAction, title: &str, message: &str) {
        self.pending_action = Some(action);
        self.confirm_dialog.show(title, message, None);
        self.animation.start_dialog_slide();
        self.mode = Mode::Dialog;
    }

    // ── Table Keys ────────────────────────────────────────────────────

    fn handle_table_key(&mut self, key: KeyEvent) {
        let fan = self.session.showing_fan();
        match key.code {
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.session.request_shuffle();
            }
            KeyCode::Char('m') | KeyCode::Char('M') => self.toggle_draw_mode(),
            KeyCode::Left | KeyCode::Char('h') => {
                if fan {
                    self.fan_cursor = self.fan_cursor.saturating_sub(1);
                } else {
                    self.session.focus_prev();
                }
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if fan {
                    let last = self.session.fan_size().saturating_sub(1);
                    self.fan_cursor = (self.fan_cursor + 1).min(last);
                } else {
                    self.session.focus_next();
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if fan {
                    self.select_fan_slot();
                } else if self.session.tap_card() == TapOutcome::Ignored {
                    trace!("Tap ignored");
                }
            }
            KeyCode::Char('b') | KeyCode::Char('B') | KeyCode::Backspace => {
                self.session.tap_detail_back();
            }
            KeyCode::Char('f') | KeyCode::Char('F') => match self.session.toggle_favorite() {
                Some(true) => self.show_toast("Added to favorites", false),
                Some(false) => self.show_toast("Removed from favorites", false),
                None => {}
            },
            KeyCode::Char('j') | KeyCode::Char('J') => self.open_journal_input(),
            KeyCode::Esc => {
                if fan {
                    self.session.confirm_selection(false);
                } else {
                    self.session.return_to_fan();
                }
            }
            _ => {}
        }
    }

    fn select_fan_slot(&mut self) {
        match self.session.select_slot(self.fan_cursor) {
            SelectOutcome::ConfirmPending | SelectOutcome::Moved { .. } => {
                let message = match self.session.mode().required() {
                    1 => "Draw this card?".to_string(),
                    n => format!("Draw these {n} cards?"),
                };
                self.open_confirm(PendingAction::Draw, "Draw", &message);
            }
            SelectOutcome::Confirmed(slots) => {
                debug!("Drew from slots {slots:?}");
                self.pending_action = None;
            }
            SelectOutcome::Added(_) | SelectOutcome::Removed(_) | SelectOutcome::Ignored => {}
        }
    }

    fn toggle_draw_mode(&mut self) {
        if self.session.toggle_draw_mode() {
            let mode = self.session.mode();
            self.show_toast(&format!("{mode} mode"), false);
        } else if self.session.is_shuffling() {
            self.show_toast("Wait for the shuffle to finish", true);
        } else {
            self.show_toast("Finish or cancel the current pick first", true);
        }
    }

    fn open_journal_input(&mut self) {
        let Some(card) = self.session.focused_card() else {
            self.show_toast("Draw a card to journal about it", true);
            return;
        };
        let title = format!("Journal: {}", card.title);
        self.input_dialog = InputDialog::new(&title, "What does this card bring up?");
        self.input_dialog.show();
        self.pending_input = Some(PendingInput::Journal);
        self.animation.start_dialog_slide();
        self.mode = Mode::Input;
    }

    // ── History Keys ──────────────────────────────────────────────────

    fn handle_history_key(&mut self, key: KeyEvent) {
        let len = self.session.records().history().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.history_state.up(),
            KeyCode::Down | KeyCode::Char('j') => self.history_state.down(len),
            KeyCode::Home | KeyCode::Char('g') => self.history_state.selected_index = 0,
            KeyCode::End | KeyCode::Char('G') => {
                self.history_state.selected_index = len.saturating_sub(1)
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                if len == 0 {
                    self.show_toast("History is already empty", true);
                    return;
                }
                self.open_confirm(
                    PendingAction::ClearHistory,
                    "Clear History",
                    &format!("Forget all {len} draws?"),
                );
            }
            _ => {}
        }
    }

    // ── Journal Keys ──────────────────────────────────────────────────

    fn handle_journal_key(&mut self, key: KeyEvent) {
        let len = self.session.records().journal().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.journal_state.up(),
            KeyCode::Down | KeyCode::Char('j') => self.journal_state.down(len),
            KeyCode::Home | KeyCode::Char('g') => self.journal_state.selected_index = 0,
            KeyCode::End | KeyCode::Char('G') => {
                self.journal_state.selected_index = len.saturating_sub(1)
            }
            KeyCode::Char('x') | KeyCode::Char('X') | KeyCode::Delete => {
                let selected = self
                    .session
                    .records()
                    .journal()
                    .newest_first()
                    .get(self.journal_state.selected_index)
                    .map(|e| e.id.clone());
                if let Some(id) = selected {
                    self.open_confirm(
                        PendingAction::DeleteJournalEntry(id),
                        "Delete Entry",
                        "Delete this journal entry?",
                    );
                }
            }
            _ => {}
        }
    }

    // ── Input Dialog ──────────────────────────────────────────────────

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.input_dialog.hide();
                self.pending_input = None;
                self.mode = Mode::Normal;
            }
            KeyCode::Enter => {
                let value = self.input_dialog.value().to_string();
                self.input_dialog.hide();
                self.mode = Mode::Normal;
                if let Some(input) = self.pending_input.take() {
                    self.on_input_submit(input, &value);
                }
            }
            KeyCode::Backspace => self.input_dialog.delete_char(),
            KeyCode::Delete => self.input_dialog.delete_forward(),
            KeyCode::Left => self.input_dialog.move_left(),
            KeyCode::Right => self.input_dialog.move_right(),
            KeyCode::Home => self.input_dialog.move_start(),
            KeyCode::End => self.input_dialog.move_end(),
            KeyCode::Char(c) => self.input_dialog.insert_char(c),
            _ => {}
        }
    }

    fn on_input_submit(&mut self, input: PendingInput, value: &str) {
        match input {
            PendingInput::Journal => match self.session.save_journal_entry(value) {
                Some(_) => self.show_toast("Journal entry saved", false),
                None => self.show_toast("Nothing to save", true),
            },
        }
    }

    // ── Confirm Dialog ────────────────────────────────────────────────

    fn handle_dialog_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.confirm_dialog.hide();
                self.mode = Mode::Normal;
                self.on_confirm();
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_dialog.hide();
                self.mode = Mode::Normal;
                self.on_decline();
            }
            _ => {}
        }
    }

    fn on_confirm(&mut self) {
        let Some(action) = self.pending_action.take() else {
            return;
        };

        match action {
            PendingAction::Draw => {
                if !self.session.confirm_selection(true) {
                    self.show_toast("Nothing to draw", true);
                }
            }
            PendingAction::ClearHistory => {
                self.session.clear_history();
                self.history_state = ListPageState::default();
                self.show_toast("History cleared", false);
            }
            PendingAction::DeleteJournalEntry(id) => {
                if self.session.delete_journal_entry(&id) {
                    let len = self.session.records().journal().len();
                    self.journal_state.clamp(len);
                    self.show_toast("Entry deleted", false);
                }
            }
        }
    }

    fn on_decline(&mut self) {
        // The draw prompt animates out; the pending action clears when it lands
        if self.pending_action == Some(PendingAction::Draw) {
            self.session.confirm_selection(false);
            return;
        }
        self.pending_action = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::{KeyEventKind, KeyEventState};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::records::Records;
    use crate::storage::{MemoryStore, Persistence};

    fn app() -> App {
        let config = Config::default();
        let catalog = Catalog::embedded();
        let records = Records::load(Persistence::inline(Arc::new(MemoryStore::new())));
        let session = Session::new(&catalog, records, config.session(), StdRng::seed_from_u64(9));
        App::new(session, catalog, &config)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn press(app: &mut App, codes: &[KeyCode]) {
        for code in codes {
            app.handle_key(key(*code));
        }
    }

    #[test]
    fn quit_and_page_keys() {
        let mut app = app();
        press(&mut app, &[KeyCode::Char('2')]);
        assert_eq!(app.active_page, Page::History);
        press(&mut app, &[KeyCode::Tab]);
        assert_eq!(app.active_page, Page::Journal);
        press(&mut app, &[KeyCode::BackTab, KeyCode::BackTab]);
        assert_eq!(app.active_page, Page::Table);
        press(&mut app, &[KeyCode::Char('q')]);
        assert!(app.should_quit);
    }

    #[test]
    fn help_overlay_swallows_keys_until_closed() {
        let mut app = app();
        press(&mut app, &[KeyCode::Char('?'), KeyCode::Char('q')]);
        assert!(app.show_help);
        assert!(!app.should_quit);
        press(&mut app, &[KeyCode::Esc]);
        assert!(!app.show_help);
    }

    #[test]
    fn pick_confirm_and_draw() {
        let mut app = app();
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.mode, Mode::Dialog);
        assert_eq!(app.pending_action, Some(PendingAction::Draw));

        press(&mut app, &[KeyCode::Char('y')]);
        assert_eq!(app.mode, Mode::Normal);
        assert!(app.session.focused_card().is_some());
        assert_eq!(app.session.records().history().len(), 1);

        // back to the fan
        press(&mut app, &[KeyCode::Esc]);
        assert!(app.session.showing_fan());
    }

    #[test]
    fn declining_the_draw_animates_the_pick_away() {
        let mut app = app();
        press(&mut app, &[KeyCode::Enter, KeyCode::Char('n')]);
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(
            app.session.snapshot().selection.phase,
            SelectionPhase::ConfirmPending
        );
        app.advance(Duration::from_millis(500));
        assert_eq!(app.session.snapshot().selection.phase, SelectionPhase::Idle);
        assert_eq!(app.pending_action, None);
        assert!(app.session.showing_fan());
    }

    #[test]
    fn mode_switch_rejected_mid_pick() {
        let mut app = app();
        press(&mut app, &[KeyCode::Char('m')]);
        assert_eq!(app.session.mode(), crate::machine::DrawMode::Three);

        press(&mut app, &[KeyCode::Enter, KeyCode::Char('m')]);
        assert_eq!(app.session.mode(), crate::machine::DrawMode::Three);
        assert!(app.toast_is_error);
    }

    #[test]
    fn journal_entry_round_trip() {
        let mut app = app();
        press(&mut app, &[KeyCode::Char('j')]);
        assert_eq!(app.mode, Mode::Normal);
        assert!(app.toast_is_error);

        press(&mut app, &[KeyCode::Enter, KeyCode::Char('y'), KeyCode::Char('j')]);
        assert_eq!(app.mode, Mode::Input);
        for c in "calm".chars() {
            press(&mut app, &[KeyCode::Char(c)]);
        }
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.session.records().journal().len(), 1);
        assert_eq!(app.session.records().journal().entries()[0].entry, "calm");

        press(&mut app, &[KeyCode::Char('3'), KeyCode::Char('x'), KeyCode::Char('y')]);
        assert!(app.session.records().journal().is_empty());
    }

    #[test]
    fn cancelled_journal_input_saves_nothing() {
        let mut app = app();
        press(&mut app, &[KeyCode::Enter, KeyCode::Char('y'), KeyCode::Char('j')]);
        assert_eq!(app.pending_input, Some(PendingInput::Journal));

        press(&mut app, &[KeyCode::Char('x'), KeyCode::Esc]);
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.pending_input, None);
        assert_eq!(app.session.records().journal().len(), 0);

        // the submission follows the pending purpose, not the dialog title
        press(&mut app, &[KeyCode::Char('j')]);
        app.input_dialog.title = "Something else".into();
        press(&mut app, &[KeyCode::Char('o'), KeyCode::Char('k'), KeyCode::Enter]);
        assert_eq!(app.pending_input, None);
        assert_eq!(app.session.records().journal().len(), 1);
    }

    #[test]
    fn clearing_history_asks_first() {
        let mut app = app();
        press(&mut app, &[KeyCode::Enter, KeyCode::Char('y'), KeyCode::Char('2')]);
        press(&mut app, &[KeyCode::Char('c'), KeyCode::Char('n')]);
        assert_eq!(app.session.records().history().len(), 1);
        press(&mut app, &[KeyCode::Char('c'), KeyCode::Char('y')]);
        assert!(app.session.records().history().is_empty());
    }

    #[test]
    fn toast_expires() {
        let mut app = app();
        app.show_toast("hello", false);
        app.advance(Duration::from_secs(2));
        assert!(app.toast_message.is_some());
        app.advance(Duration::from_secs(2));
        assert!(app.toast_message.is_none());
    }

    #[test]
    fn shuffle_key_runs_to_commit() {
        let mut app = app();
        press(&mut app, &[KeyCode::Char('s')]);
        assert!(app.session.is_shuffling());
        for _ in 0..40 {
            app.advance(Duration::from_millis(200));
        }
        assert!(!app.session.is_shuffling());
        assert!(app.session.deck().is_shuffled());
    }
}
