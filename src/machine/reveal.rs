use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, trace};

use crate::animation::schedule::Scheduler;
use crate::animation::transitions::Tween;
use crate::animation::Easing;

/// Logical side of the active card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Back,
    Front,
    /// Content swapped to the detail visual, flip in progress
    DetailEntering,
    Detail,
    /// Content swapped back to the card face, flip in progress
    DetailLeaving,
}

/// Which visual sits on the front face of the flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Card,
    Detail,
}

/// How the renderer performs a flip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlipMode {
    /// A transform hides the face while it is turned away, so content can
    /// swap the moment the flip starts.
    #[default]
    Transform,
    /// No reliable transform: the painted content itself is swapped a
    /// little after the flip starts so it never shows early.
    ContentSwap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTiming {
    pub flip: Duration,
    /// Extra lock time after a flip before the next tap counts
    pub lock_margin: Duration,
    /// Wait before the detail flip starts, letting the tap gesture settle
    pub detail_settle: Duration,
    /// Delay from flip start to the painted-content swap in `ContentSwap` mode
    pub content_swap_delay: Duration,
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self {
            flip: Duration::from_millis(450),
            lock_margin: Duration::from_millis(100),
            detail_settle: Duration::from_millis(50),
            content_swap_delay: Duration::from_millis(120),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    Ignored,
    Started(RevealState),
}

/// Emitted by [`RevealMachine::advance`] when a flip lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settled(pub RevealState);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    StartFlip { version: u64 },
    SwapContent { version: u64, face: Face },
    AutoFlip { version: u64 },
}

/// Back / front / detail state of one card and the flip that shows it.
///
/// The flip value runs 0 (back showing) → 1 (front showing). Entering or
/// leaving the detail layer swaps the front content, snaps the flip to the
/// back without animating, then flips forward again after a settle delay.
/// Every scheduled step carries the version of the transition that queued
/// it; a newer transition bumps the version so older steps are dropped.
#[derive(Debug, Clone)]
pub struct RevealMachine {
    state: RevealState,
    has_detail: bool,
    mode: FlipMode,
    timing: RevealTiming,
    flip: Tween,
    front: Face,
    displayed: Face,
    locked_until: Duration,
    version: u64,
    timers: Scheduler<Timer>,
}

impl RevealMachine {
    pub fn new(has_detail: bool, mode: FlipMode, timing: RevealTiming) -> Self {
        Self {
            state: RevealState::Back,
            has_detail,
            mode,
            timing,
            flip: Tween::new(0.0).with_easing(Easing::EaseInOutCubic),
            front: Face::Card,
            displayed: Face::Card,
            locked_until: Duration::ZERO,
            version: 0,
            timers: Scheduler::new(),
        }
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    /// 0 = back facing the viewer, 1 = front facing the viewer
    pub fn flip_value(&self) -> f32 {
        self.flip.value()
    }

    /// Content assigned to the flip's front face
    #[cfg(test)]
    pub fn front_face(&self) -> Face {
        self.front
    }

    /// Content actually painted on the front face right now
    pub fn displayed_face(&self) -> Face {
        self.displayed
    }

    pub fn is_locked(&self) -> bool {
        self.timers.now() < self.locked_until
    }

    #[cfg(test)]
    pub fn is_flipping(&self) -> bool {
        self.flip.is_running()
    }

    /// Tap the card.
    pub fn tap(&mut self) -> TapOutcome {
        if self.is_locked() {
            trace!("Tap ignored: flip in flight");
            return TapOutcome::Ignored;
        }
        match self.state {
            RevealState::Back => self.flip_to(RevealState::Front),
            RevealState::Front if self.has_detail => self.swap_and_flip(Face::Detail),
            RevealState::Front => self.flip_to(RevealState::Back),
            RevealState::Detail => self.swap_and_flip(Face::Card),
            RevealState::DetailEntering | RevealState::DetailLeaving => TapOutcome::Ignored,
        }
    }

    /// The "back" control shown over the detail layer.
    pub fn tap_detail_back(&mut self) -> TapOutcome {
        if self.is_locked() || self.state != RevealState::Detail {
            return TapOutcome::Ignored;
        }
        self.swap_and_flip(Face::Card)
    }

    /// Turn the card face up after `delay` unless something else happens
    /// to it first.
    pub fn schedule_auto_flip(&mut self, delay: Duration) {
        self.timers.after(
            delay,
            Timer::AutoFlip {
                version: self.version,
            },
        );
    }

    /// Step the flip and any scheduled steps. Time is split at each due
    /// step so a flip started by a timer runs from the timer's due time.
    pub fn advance(&mut self, dt: Duration) -> Option<Settled> {
        let mut settled = None;
        let mut left = dt;
        loop {
            let step = self.timers.until_next().map_or(left, |gap| gap.min(left));
            if self.flip.advance(step) {
                settled = self.land().or(settled);
            }
            for timer in self.timers.advance(step) {
                self.fire(timer);
            }
            left -= step;
            if left.is_zero() && self.timers.until_next() != Some(Duration::ZERO) {
                break;
            }
        }
        settled
    }

    fn flip_to(&mut self, target: RevealState) -> TapOutcome {
        self.version += 1;
        self.timers.cancel_all();
        self.state = target;
        let value = match target {
            RevealState::Back => 0.0,
            _ => 1.0,
        };
        self.flip.animate_to(value, self.timing.flip);
        self.lock_for(self.timing.flip);
        debug!("Card flipping to {target:?}");
        TapOutcome::Started(target)
    }

    fn swap_and_flip(&mut self, face: Face) -> TapOutcome {
        self.version += 1;
        self.timers.cancel_all();
        self.state = match face {
            Face::Detail => RevealState::DetailEntering,
            Face::Card => RevealState::DetailLeaving,
        };

        self.front = face;
        self.flip.set(0.0);
        match self.mode {
            FlipMode::Transform => self.displayed = face,
            FlipMode::ContentSwap => self.timers.after(
                self.timing.detail_settle + self.timing.content_swap_delay,
                Timer::SwapContent {
                    version: self.version,
                    face,
                },
            ),
        }
        self.timers.after(
            self.timing.detail_settle,
            Timer::StartFlip {
                version: self.version,
            },
        );
        self.lock_for(self.timing.detail_settle + self.timing.flip);
        debug!("Card swapping to {face:?}");
        TapOutcome::Started(self.state)
    }

    fn lock_for(&mut self, span: Duration) {
        self.locked_until = self.timers.now() + span + self.timing.lock_margin;
    }

    fn fire(&mut self, timer: Timer) {
        match timer {
            Timer::StartFlip { version } if version == self.version => {
                self.flip.animate_to(1.0, self.timing.flip);
            }
            Timer::SwapContent { version, face } if version == self.version => {
                self.displayed = face;
            }
            Timer::AutoFlip { version } if version == self.version => {
                if self.state == RevealState::Back && !self.is_locked() {
                    self.flip_to(RevealState::Front);
                }
            }
            stale => trace!("Dropping stale reveal timer {stale:?}"),
        }
    }

    /// A flip just finished: settle the logical state and make sure the
    /// painted content matches it.
    fn land(&mut self) -> Option<Settled> {
        self.displayed = self.front;
        self.state = match self.state {
            RevealState::DetailEntering => RevealState::Detail,
            RevealState::DetailLeaving => RevealState::Front,
            other => other,
        };
        debug!("Card settled at {:?}", self.state);
        Some(Settled(self.state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    fn timing() -> RevealTiming {
        RevealTiming {
            flip: MS * 100,
            lock_margin: MS * 20,
            detail_settle: MS * 10,
            content_swap_delay: MS * 40,
        }
    }

    fn plain() -> RevealMachine {
        RevealMachine::new(false, FlipMode::Transform, timing())
    }

    fn detailed(mode: FlipMode) -> RevealMachine {
        RevealMachine::new(true, mode, timing())
    }

    /// Advance in small steps, collecting every settle.
    fn run(m: &mut RevealMachine, total: Duration) -> Vec<RevealState> {
        let mut out = Vec::new();
        let mut elapsed = Duration::ZERO;
        while elapsed < total {
            if let Some(Settled(s)) = m.advance(MS * 5) {
                out.push(s);
            }
            elapsed += MS * 5;
        }
        out
    }

    mod plain_card {
        use super::*;

        #[test]
        fn toggles_back_and_front() {
            let mut m = plain();
            assert_eq!(m.tap(), TapOutcome::Started(RevealState::Front));
            assert_eq!(run(&mut m, MS * 150), vec![RevealState::Front]);
            assert_eq!(m.flip_value(), 1.0);

            assert_eq!(m.tap(), TapOutcome::Started(RevealState::Back));
            run(&mut m, MS * 150);
            assert_eq!(m.state(), RevealState::Back);
            assert_eq!(m.flip_value(), 0.0);
        }

        #[test]
        fn taps_inside_lock_window_are_ignored() {
            let mut m = plain();
            m.tap();
            assert_eq!(m.tap(), TapOutcome::Ignored);
            run(&mut m, MS * 110);
            // flip done but margin not yet over
            assert_eq!(m.tap(), TapOutcome::Ignored);
            run(&mut m, MS * 20);
            assert_eq!(m.tap(), TapOutcome::Started(RevealState::Back));
        }

        #[test]
        fn detail_back_does_nothing_without_detail() {
            let mut m = plain();
            m.tap();
            run(&mut m, MS * 200);
            assert_eq!(m.tap_detail_back(), TapOutcome::Ignored);
            assert_eq!(m.state(), RevealState::Front);
        }
    }

    mod detail_card {
        use super::*;

        fn face_up(mode: FlipMode) -> RevealMachine {
            let mut m = detailed(mode);
            m.tap();
            run(&mut m, MS * 200);
            assert_eq!(m.state(), RevealState::Front);
            m
        }

        #[test]
        fn double_tap_makes_one_transition() {
            let mut m = detailed(FlipMode::Transform);
            assert_eq!(m.tap(), TapOutcome::Started(RevealState::Front));
            assert_eq!(m.tap(), TapOutcome::Ignored);
            assert_eq!(run(&mut m, MS * 200), vec![RevealState::Front]);

            assert_eq!(m.tap(), TapOutcome::Started(RevealState::DetailEntering));
            assert_eq!(m.tap(), TapOutcome::Ignored);
            assert_eq!(run(&mut m, MS * 200), vec![RevealState::Detail]);
        }

        #[test]
        fn entering_detail_snaps_to_back_then_flips_forward() {
            let mut m = face_up(FlipMode::Transform);

            m.tap();
            assert_eq!(m.state(), RevealState::DetailEntering);
            assert_eq!(m.flip_value(), 0.0);
            assert_eq!(m.front_face(), Face::Detail);
            assert!(!m.is_flipping());

            // Settle delay passes, flip begins
            m.advance(MS * 15);
            assert!(m.is_flipping());

            assert_eq!(run(&mut m, MS * 120), vec![RevealState::Detail]);
            assert_eq!(m.flip_value(), 1.0);
            assert_eq!(m.displayed_face(), Face::Detail);
        }

        #[test]
        fn leaving_detail_mirrors_entry() {
            let mut m = face_up(FlipMode::Transform);
            m.tap();
            run(&mut m, MS * 200);
            assert_eq!(m.state(), RevealState::Detail);

            assert_eq!(m.tap_detail_back(), TapOutcome::Started(RevealState::DetailLeaving));
            assert_eq!(m.front_face(), Face::Card);
            assert_eq!(m.flip_value(), 0.0);
            assert_eq!(run(&mut m, MS * 200), vec![RevealState::Front]);
            assert_eq!(m.displayed_face(), Face::Card);
        }

        #[test]
        fn tapping_detail_returns_to_front() {
            let mut m = face_up(FlipMode::Transform);
            m.tap();
            run(&mut m, MS * 200);
            assert_eq!(m.tap(), TapOutcome::Started(RevealState::DetailLeaving));
            run(&mut m, MS * 200);
            assert_eq!(m.state(), RevealState::Front);
        }

        #[test]
        fn content_swap_mode_paints_detail_late() {
            let mut m = face_up(FlipMode::ContentSwap);
            m.tap();
            assert_eq!(m.front_face(), Face::Detail);
            assert_eq!(m.displayed_face(), Face::Card);

            // settle (10) done, swap (10 + 40) not yet
            m.advance(MS * 30);
            assert!(m.is_flipping());
            assert_eq!(m.displayed_face(), Face::Card);

            m.advance(MS * 25);
            assert_eq!(m.displayed_face(), Face::Detail);

            run(&mut m, MS * 100);
            assert_eq!(m.state(), RevealState::Detail);
            assert_eq!(m.displayed_face(), m.front_face());
        }

        #[test]
        fn landing_always_matches_content_even_with_slow_swap() {
            let slow = RevealTiming {
                content_swap_delay: MS * 500,
                ..timing()
            };
            let mut m = RevealMachine::new(true, FlipMode::ContentSwap, slow);
            m.tap();
            run(&mut m, MS * 200);
            m.tap();
            run(&mut m, MS * 200);
            assert_eq!(m.state(), RevealState::Detail);
            assert_eq!(m.displayed_face(), Face::Detail);
        }
    }

    mod auto_flip {
        use super::*;

        #[test]
        fn flips_after_delay() {
            let mut m = plain();
            m.schedule_auto_flip(MS * 50);
            m.advance(MS * 45);
            assert_eq!(m.state(), RevealState::Back);
            m.advance(MS * 10);
            assert_eq!(m.state(), RevealState::Front);
            assert!(m.is_flipping());
        }

        #[test]
        fn manual_tap_supersedes_pending_auto_flip() {
            let mut m = plain();
            m.schedule_auto_flip(MS * 50);
            m.tap();
            run(&mut m, MS * 200);
            assert_eq!(m.state(), RevealState::Front);
            // the stale auto flip never turned it back over
            assert_eq!(m.flip_value(), 1.0);
        }
    }
}
