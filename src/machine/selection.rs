use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::animation::transitions::Tween;
use crate::animation::Easing;

/// How many cards one confirmed pick deals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawMode {
    #[default]
    Single,
    Three,
}

impl DrawMode {
    pub fn required(self) -> usize {
        match self {
            Self::Single => 1,
            Self::Three => 3,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Single => Self::Three,
            Self::Three => Self::Single,
        }
    }
}

impl fmt::Display for DrawMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "Single card"),
            Self::Three => write!(f, "Three cards"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    Idle,
    Selecting,
    ConfirmPending,
}

/// Result of tapping a fan slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    Ignored,
    Added(usize),
    Removed(usize),
    /// Single-card mode: the pending pick moved to another slot
    Moved { from: usize, to: usize },
    /// The selection is now complete and awaits confirmation
    ConfirmPending,
    /// The complete selection was tapped again: deal these slots
    Confirmed(Vec<usize>),
}

/// Tentative fan-slot picks and their confirmation.
///
/// Confirmation can only be pending while exactly `mode.required()` slots
/// are chosen. The confirm value animates 0 → 1 on entering the pending
/// state and 1 → 0 on cancel; the selection is cleared when the cancel
/// animation lands.
#[derive(Debug, Clone)]
pub struct Selection {
    mode: DrawMode,
    slots: Vec<usize>,
    confirm_pending: bool,
    cancelling: bool,
    confirm: Tween,
    confirm_duration: Duration,
}

impl Selection {
    pub fn new(mode: DrawMode, confirm_duration: Duration) -> Self {
        Self {
            mode,
            slots: Vec::with_capacity(3),
            confirm_pending: false,
            cancelling: false,
            confirm: Tween::new(0.0).with_easing(Easing::EaseOutCubic),
            confirm_duration,
        }
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    /// Selected slots in the order they were picked
    pub fn slots(&self) -> &[usize] {
        &self.slots
    }

    pub fn is_confirm_pending(&self) -> bool {
        self.confirm_pending
    }

    #[cfg(test)]
    pub fn is_cancelling(&self) -> bool {
        self.cancelling
    }

    pub fn confirm_value(&self) -> f32 {
        self.confirm.value()
    }

    pub fn phase(&self) -> SelectionPhase {
        if self.confirm_pending {
            SelectionPhase::ConfirmPending
        } else if self.slots.is_empty() {
            SelectionPhase::Idle
        } else {
            SelectionPhase::Selecting
        }
    }

    /// Tap a fan slot.
    pub fn select(&mut self, slot: usize) -> SelectOutcome {
        if self.cancelling {
            return SelectOutcome::Ignored;
        }

        let required = self.mode.required();
        if let Some(pos) = self.slots.iter().position(|&s| s == slot) {
            if self.confirm_pending {
                return SelectOutcome::Confirmed(self.finish());
            }
            self.slots.remove(pos);
            if self.slots.len() < required {
                self.confirm_pending = false;
            }
            debug!("Slot {slot} deselected, {} remain", self.slots.len());
            return SelectOutcome::Removed(slot);
        }

        if self.slots.len() < required {
            self.slots.push(slot);
            if self.slots.len() == required {
                self.confirm_pending = true;
                self.confirm.animate_to(1.0, self.confirm_duration);
                debug!("Selection complete: {:?}", self.slots);
                return SelectOutcome::ConfirmPending;
            }
            return SelectOutcome::Added(slot);
        }

        match self.mode {
            DrawMode::Single => {
                let from = self.slots[0];
                self.slots[0] = slot;
                self.confirm.set(0.0);
                self.confirm.animate_to(1.0, self.confirm_duration);
                SelectOutcome::Moved { from, to: slot }
            }
            DrawMode::Three => SelectOutcome::Ignored,
        }
    }

    /// Explicit "yes": returns the slots to deal if confirmation was pending.
    pub fn confirm(&mut self) -> Option<Vec<usize>> {
        if !self.confirm_pending || self.cancelling {
            return None;
        }
        Some(self.finish())
    }

    /// Explicit "no". A pending confirmation animates out before the
    /// selection clears; a partial selection clears at once.
    pub fn cancel(&mut self) -> bool {
        if self.cancelling {
            return false;
        }
        if self.confirm_pending {
            self.cancelling = true;
            self.confirm.animate_to(0.0, self.confirm_duration);
            debug!("Cancelling selection {:?}", self.slots);
            return true;
        }
        if self.slots.is_empty() {
            return false;
        }
        self.clear();
        true
    }

    /// Switch between single and three-card draws. Only allowed when nothing
    /// is selected and no shuffle is running.
    pub fn toggle_mode(&mut self, shuffling: bool) -> bool {
        if shuffling || self.cancelling || self.confirm_pending || !self.slots.is_empty() {
            debug!("Draw mode switch rejected");
            return false;
        }
        self.mode = self.mode.toggled();
        debug!("Draw mode is now {:?}", self.mode);
        true
    }

    /// Drop everything immediately, without animating.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.confirm_pending = false;
        self.cancelling = false;
        self.confirm.set(0.0);
    }

    pub fn advance(&mut self, dt: Duration) {
        if self.confirm.advance(dt) && self.cancelling {
            self.clear();
        }
    }

    fn finish(&mut self) -> Vec<usize> {
        let slots = std::mem::take(&mut self.slots);
        self.clear();
        slots
    }
}
