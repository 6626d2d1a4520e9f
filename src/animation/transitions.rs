use std::time::Duration;

use super::{lerp, Easing};

/// A single value animated toward a target over a fixed duration.
///
/// Completion is reported by [`Tween::advance`] exactly once per
/// `animate_to`, including zero-length animations, so callers always see
/// the same "finished" edge regardless of timing.
#[derive(Debug, Clone)]
pub struct Tween {
    value: f32,
    from: f32,
    to: f32,
    duration: Duration,
    elapsed: Duration,
    easing: Easing,
    running: bool,
}

impl Tween {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            from: value,
            to: value,
            duration: Duration::ZERO,
            elapsed: Duration::ZERO,
            easing: Easing::Linear,
            running: false,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Start animating from the current value to `target`.
    pub fn animate_to(&mut self, target: f32, duration: Duration) {
        self.from = self.value;
        self.to = target;
        self.duration = duration;
        self.elapsed = Duration::ZERO;
        self.running = true;
    }

    /// Snap to `value` and drop any animation in flight.
    pub fn set(&mut self, value: f32) {
        self.value = value;
        self.from = value;
        self.to = value;
        self.elapsed = Duration::ZERO;
        self.running = false;
    }

    /// Step the animation. Returns `true` if it finished during this call.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if !self.running {
            return false;
        }
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.value = self.to;
            self.running = false;
            return true;
        }
        let t = self.elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.value = lerp(self.from, self.to, self.easing.apply(t));
        false
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Default for Tween {
    fn default() -> Self {
        Self::new(0.0)
    }
}
