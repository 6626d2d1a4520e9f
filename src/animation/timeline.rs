//! The shuffle pipeline: a fixed sequence of timed phases composed into one
//! run, with fast-forward support so a run can begin already in motion.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use tracing::debug;

use super::Easing;

/// Progress values driven by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Collapse,
    Shake,
    Swirl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    /// Fan gathers into a pile: collapse 0 → 1
    Collapse,
    /// Pause, nothing moves
    Hold,
    /// Back-and-forth jitter: shake 0 → 1 → 0 once per step
    Shake { steps: u32 },
    /// Orbit a few cards: swirl 0 → 1
    Swirl,
    /// Quick return: swirl 1 → 0
    SwirlReset,
    /// Pile re-opens into the fan: collapse 1 → 0
    Expand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase {
    pub kind: PhaseKind,
    pub duration: Duration,
}

impl Phase {
    pub fn new(kind: PhaseKind, duration: Duration) -> Self {
        Self { kind, duration }
    }

    pub fn channel(&self) -> Option<Channel> {
        match self.kind {
            PhaseKind::Collapse | PhaseKind::Expand => Some(Channel::Collapse),
            PhaseKind::Shake { .. } => Some(Channel::Shake),
            PhaseKind::Swirl | PhaseKind::SwirlReset => Some(Channel::Swirl),
            PhaseKind::Hold => None,
        }
    }

    /// Channel value at local progress `t` in [0, 1].
    pub fn value_at(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self.kind {
            PhaseKind::Collapse => Easing::EaseInOutCubic.apply(t),
            PhaseKind::Expand => 1.0 - Easing::EaseInOutCubic.apply(t),
            PhaseKind::Shake { steps } => {
                if t >= 1.0 || steps == 0 {
                    return 0.0;
                }
                let frac = (t * steps as f32).fract();
                if frac < 0.5 {
                    frac * 2.0
                } else {
                    2.0 - frac * 2.0
                }
            }
            PhaseKind::Swirl => t,
            PhaseKind::SwirlReset => 1.0 - t,
            PhaseKind::Hold => 0.0,
        }
    }

    pub fn end_value(&self) -> f32 {
        self.value_at(1.0)
    }

    fn progress(&self, elapsed: Duration) -> f32 {
        if self.duration.is_zero() {
            1.0
        } else {
            elapsed.as_secs_f32() / self.duration.as_secs_f32()
        }
    }
}

/// Durations for each step of the shuffle pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShuffleTiming {
    pub collapse: Duration,
    pub hold: Duration,
    pub shake_step: Duration,
    pub shake_steps: u32,
    pub swirl: Duration,
    pub swirl_reset: Duration,
    pub expand: Duration,
}

impl Default for ShuffleTiming {
    fn default() -> Self {
        Self {
            collapse: Duration::from_millis(400),
            hold: Duration::from_millis(150),
            shake_step: Duration::from_millis(90),
            shake_steps: 4,
            swirl: Duration::from_millis(700),
            swirl_reset: Duration::from_millis(120),
            expand: Duration::from_millis(450),
        }
    }
}

impl ShuffleTiming {
    /// collapse, hold, shake, hold, swirl ×2 (each followed by a reset), expand
    pub fn phases(&self) -> Vec<Phase> {
        use PhaseKind::*;
        vec![
            Phase::new(Collapse, self.collapse),
            Phase::new(Hold, self.hold),
            Phase::new(
                Shake {
                    steps: self.shake_steps,
                },
                self.shake_step.saturating_mul(self.shake_steps),
            ),
            Phase::new(Hold, self.hold),
            Phase::new(Swirl, self.swirl),
            Phase::new(SwirlReset, self.swirl_reset),
            Phase::new(Swirl, self.swirl),
            Phase::new(SwirlReset, self.swirl_reset),
            Phase::new(Expand, self.expand),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseValues {
    pub collapse: f32,
    pub shake: f32,
    pub swirl: f32,
}

impl PhaseValues {
    pub fn get(&self, channel: Channel) -> f32 {
        match channel {
            Channel::Collapse => self.collapse,
            Channel::Shake => self.shake,
            Channel::Swirl => self.swirl,
        }
    }

    fn set(&mut self, channel: Channel, value: f32) {
        match channel {
            Channel::Collapse => self.collapse = value,
            Channel::Shake => self.shake = value,
            Channel::Swirl => self.swirl = value,
        }
    }
}

/// Identifies one run of a timeline. Ids only ever increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run#{}", self.0)
    }
}

/// Reported by [`Timeline::advance`] when a run finishes on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completed(pub RunId);

#[derive(Debug, Clone)]
struct ActiveRun {
    id: RunId,
    queue: VecDeque<Queued>,
}

#[derive(Debug, Clone, Copy)]
struct Queued {
    phase: usize,
    elapsed: Duration,
}

/// Runs one phase pipeline at a time.
#[derive(Debug, Clone)]
pub struct Timeline {
    phases: Vec<Phase>,
    values: PhaseValues,
    run: Option<ActiveRun>,
    next_id: u64,
}

impl Timeline {
    pub fn new(phases: Vec<Phase>) -> Self {
        Self {
            phases,
            values: PhaseValues::default(),
            run: None,
            next_id: 1,
        }
    }

    pub fn total_duration(&self) -> Duration {
        self.phases
            .iter()
            .fold(Duration::ZERO, |acc, p| acc.saturating_add(p.duration))
    }

    pub fn values(&self) -> PhaseValues {
        self.values
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    #[cfg(test)]
    pub fn current_run(&self) -> Option<RunId> {
        self.run.as_ref().map(|r| r.id)
    }

    /// Whether `id` is the run still in progress
    #[cfg(test)]
    pub fn is_current(&self, id: RunId) -> bool {
        self.current_run() == Some(id)
    }

    /// Start a fresh run from the first phase.
    #[cfg(test)]
    pub fn start(&mut self) -> RunId {
        self.resume_at(0.0)
    }

    /// Start a run that looks as if it had already been playing for
    /// `fraction` of the total duration.
    ///
    /// Phases wholly inside the skipped span jump to their end values; the
    /// phase the span ends in is set to its interpolated value and queued
    /// with only its remaining time. Any previous run is stopped first.
    pub fn resume_at(&mut self, fraction: f32) -> RunId {
        self.stop();

        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let total = self.total_duration();
        let mut left = if fraction >= 1.0 {
            total
        } else {
            Duration::from_nanos((total.as_nanos() as f64 * fraction as f64) as u64)
        };

        let mut queue = VecDeque::with_capacity(self.phases.len());
        for (index, phase) in self.phases.iter().enumerate() {
            if !queue.is_empty() {
                queue.push_back(Queued {
                    phase: index,
                    elapsed: Duration::ZERO,
                });
                continue;
            }
            if left >= phase.duration {
                left -= phase.duration;
                if let Some(channel) = phase.channel() {
                    self.values.set(channel, phase.end_value());
                }
                continue;
            }
            if let Some(channel) = phase.channel() {
                self.values.set(channel, phase.value_at(phase.progress(left)));
            }
            queue.push_back(Queued {
                phase: index,
                elapsed: left,
            });
            left = Duration::ZERO;
        }

        let id = RunId(self.next_id);
        self.next_id += 1;
        debug!(
            "Timeline {id} started at {:.0}% ({} phases queued)",
            fraction * 100.0,
            queue.len()
        );
        self.run = Some(ActiveRun { id, queue });
        id
    }

    /// Cancel the active run, if any, and zero every channel. The cancelled
    /// run never reports completion. Safe to call repeatedly.
    pub fn stop(&mut self) -> bool {
        self.values = PhaseValues::default();
        match self.run.take() {
            Some(run) => {
                debug!("Timeline {} stopped", run.id);
                true
            }
            None => false,
        }
    }

    /// Step the active run by `dt`. Returns the completion of the run when it
    /// finishes during this call; a run with nothing left completes even on a
    /// zero step.
    pub fn advance(&mut self, dt: Duration) -> Option<Completed> {
        let phases = &self.phases;
        let values = &mut self.values;
        let run = self.run.as_mut()?;

        let mut left = dt;
        while let Some(front) = run.queue.front_mut() {
            let phase = phases[front.phase];
            let remaining = phase.duration.saturating_sub(front.elapsed);
            if left >= remaining {
                left -= remaining;
                if let Some(channel) = phase.channel() {
                    values.set(channel, phase.end_value());
                }
                run.queue.pop_front();
                continue;
            }
            front.elapsed += left;
            if let Some(channel) = phase.channel() {
                values.set(channel, phase.value_at(phase.progress(front.elapsed)));
            }
            break;
        }

        if !run.queue.is_empty() {
            return None;
        }
        let id = run.id;
        self.run = None;
        self.values = PhaseValues::default();
        debug!("Timeline {id} completed");
        Some(Completed(id))
    }

    /// Overall progress of the active run in [0, 1]; `None` when idle.
    pub fn progress(&self) -> Option<f32> {
        let run = self.run.as_ref()?;
        let total = self.total_duration();
        if total.is_zero() {
            return Some(1.0);
        }
        let remaining = run.queue.iter().fold(Duration::ZERO, |acc, q| {
            acc.saturating_add(self.phases[q.phase].duration.saturating_sub(q.elapsed))
        });
        Some(1.0 - remaining.as_secs_f32() / total.as_secs_f32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);
    const EPS: f32 = 1e-3;

    fn timing() -> ShuffleTiming {
        ShuffleTiming {
            collapse: MS * 100,
            hold: MS * 20,
            shake_step: MS * 40,
            shake_steps: 3,
            swirl: MS * 200,
            swirl_reset: MS * 40,
            expand: MS * 100,
        }
    }

    fn timeline() -> Timeline {
        Timeline::new(timing().phases())
    }

    fn close(a: PhaseValues, b: PhaseValues) -> bool {
        (a.collapse - b.collapse).abs() < EPS
            && (a.shake - b.shake).abs() < EPS
            && (a.swirl - b.swirl).abs() < EPS
    }

    mod phases {
        use super::*;

        #[test]
        fn pipeline_order_is_fixed() {
            let kinds: Vec<PhaseKind> = timing().phases().iter().map(|p| p.kind).collect();
            assert_eq!(
                kinds,
                vec![
                    PhaseKind::Collapse,
                    PhaseKind::Hold,
                    PhaseKind::Shake { steps: 3 },
                    PhaseKind::Hold,
                    PhaseKind::Swirl,
                    PhaseKind::SwirlReset,
                    PhaseKind::Swirl,
                    PhaseKind::SwirlReset,
                    PhaseKind::Expand,
                ]
            );
        }

        #[test]
        fn total_is_sum_of_phases() {
            // 100 + 20 + 120 + 20 + 200 + 40 + 200 + 40 + 100
            assert_eq!(timeline().total_duration(), MS * 840);
        }

        #[test]
        fn extreme_timing_saturates_instead_of_overflowing() {
            let huge = ShuffleTiming {
                shake_step: Duration::from_millis(i64::MAX as u64),
                shake_steps: u32::MAX,
                ..timing()
            };
            let phases = huge.phases();
            assert_eq!(phases[2].duration, Duration::MAX);
            let mut tl = Timeline::new(phases);
            assert_eq!(tl.total_duration(), Duration::MAX);
            tl.resume_at(0.5);
            assert!(tl.progress().is_some());
            assert_eq!(tl.advance(MS * 10), None);
        }

        #[test]
        fn shake_oscillates_per_step() {
            let shake = Phase::new(PhaseKind::Shake { steps: 2 }, MS * 100);
            assert!((shake.value_at(0.0)).abs() < EPS);
            assert!((shake.value_at(0.125) - 0.5).abs() < EPS);
            assert!((shake.value_at(0.25) - 1.0).abs() < EPS);
            assert!((shake.value_at(0.5)).abs() < EPS);
            assert!((shake.value_at(0.75) - 1.0).abs() < EPS);
            assert_eq!(shake.end_value(), 0.0);
        }
    }

    mod runs {
        use super::*;

        #[test]
        fn fresh_run_walks_every_channel_and_completes_once() {
            let mut tl = timeline();
            let id = tl.start();

            tl.advance(MS * 100);
            assert!((tl.values().collapse - 1.0).abs() < EPS);

            // Midway through the first swirl
            tl.advance(MS * (20 + 120 + 20 + 100));
            assert!((tl.values().swirl - 0.5).abs() < EPS);
            assert!((tl.values().collapse - 1.0).abs() < EPS);

            assert_eq!(tl.advance(MS * 479), None);
            assert_eq!(tl.advance(MS), Some(Completed(id)));
            assert_eq!(tl.values(), PhaseValues::default());
            assert!(!tl.is_running());
            assert_eq!(tl.advance(MS * 1000), None);
        }

        #[test]
        fn resume_at_zero_matches_fresh_start() {
            let mut fresh = timeline();
            let mut resumed = timeline();
            fresh.start();
            resumed.resume_at(0.0);
            assert!(close(fresh.values(), resumed.values()));

            for _ in 0..90 {
                let a = fresh.advance(MS * 10).is_some();
                let b = resumed.advance(MS * 10).is_some();
                assert_eq!(a, b);
                assert!(close(fresh.values(), resumed.values()));
            }
        }

        #[test]
        fn resume_at_one_completes_without_animating() {
            let mut tl = timeline();
            let id = tl.resume_at(1.0);
            assert!(tl.is_running());
            assert_eq!(tl.progress(), Some(1.0));
            assert_eq!(tl.advance(Duration::ZERO), Some(Completed(id)));
            assert_eq!(tl.values(), PhaseValues::default());
            assert_eq!(tl.advance(Duration::ZERO), None);
        }

        #[test]
        fn resume_lands_inside_partial_phase() {
            let mut tl = timeline();
            // 50ms of an 840ms pipeline: halfway through the collapse
            tl.resume_at(50.0 / 840.0);
            assert!((tl.values().collapse - 0.5).abs() < EPS);
            assert_eq!(tl.values().swirl, 0.0);

            assert_eq!(tl.advance(MS * 789), None);
            assert!(tl.advance(MS * 2).is_some());
        }

        #[test]
        fn resume_matches_a_run_fast_forwarded_by_hand() {
            let mut played = timeline();
            played.start();
            played.advance(MS * 420);

            let mut resumed = timeline();
            resumed.resume_at(420.0 / 840.0);
            assert!(close(played.values(), resumed.values()));

            for _ in 0..42 {
                let a = played.advance(MS * 10).is_some();
                let b = resumed.advance(MS * 10).is_some();
                assert_eq!(a, b);
                assert!(close(played.values(), resumed.values()));
            }
        }

        #[test]
        fn skipped_phases_take_their_end_values() {
            let mut tl = timeline();
            // Past collapse, hold, shake and hold; 40ms into the first swirl
            tl.resume_at(300.0 / 840.0);
            let v = tl.values();
            assert!((v.collapse - 1.0).abs() < EPS);
            assert!(v.shake.abs() < EPS);
            assert!((v.swirl - 0.2).abs() < EPS);
        }

        #[test]
        fn out_of_range_fractions_are_clamped() {
            let mut tl = timeline();
            tl.resume_at(-2.0);
            assert!(close(tl.values(), PhaseValues::default()));
            let id = tl.resume_at(f32::NAN);
            assert_eq!(tl.progress(), Some(0.0));
            let id2 = tl.resume_at(5.0);
            assert!(id2 > id);
            assert_eq!(tl.advance(Duration::ZERO), Some(Completed(id2)));
        }
    }

    mod cancellation {
        use super::*;

        #[test]
        fn stop_is_idempotent_and_silences_completion() {
            let mut tl = timeline();
            tl.start();
            tl.advance(MS * 60);
            assert!(tl.stop());
            assert!(!tl.stop());
            assert_eq!(tl.values(), PhaseValues::default());
            assert_eq!(tl.advance(MS * 10_000), None);
        }

        #[test]
        fn restarting_replaces_the_old_run() {
            let mut tl = timeline();
            let first = tl.start();
            tl.advance(MS * 300);

            let second = tl.start();
            assert_ne!(first, second);
            assert!(!tl.is_current(first));
            assert!(tl.is_current(second));
            assert!(close(tl.values(), PhaseValues::default()));

            let mut completions = Vec::new();
            for _ in 0..200 {
                if let Some(done) = tl.advance(MS * 10) {
                    completions.push(done);
                }
            }
            assert_eq!(completions, vec![Completed(second)]);
        }
    }
}
