pub mod schedule;
pub mod spinner;
pub mod timeline;
pub mod transitions;

/// Presentation-only animation state that is not owned by the session:
/// a frame counter for glyph cycling and the dialog slide-in.
#[derive(Debug)]
pub struct AnimationState {
    /// Monotonically increasing tick counter
    pub tick_count: u64,
    /// Dialog slide-in offset (decreases from max to 0)
    pub dialog_offset: f32,
    /// Max dialog slide offset
    pub dialog_offset_max: f32,
    pub enabled: bool,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            tick_count: 0,
            dialog_offset: 0.0,
            dialog_offset_max: 3.0,
            enabled: true,
        }
    }
}

impl AnimationState {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Default::default()
        }
    }

    /// Advance by one tick
    pub fn tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
        if self.dialog_offset > 0.0 {
            self.dialog_offset = ease_out(self.dialog_offset, 0.0, 0.45);
            if self.dialog_offset < 0.05 {
                self.dialog_offset = 0.0;
            }
        }
    }

    /// Start the dialog slide-in animation
    pub fn start_dialog_slide(&mut self) {
        if self.enabled {
            self.dialog_offset = self.dialog_offset_max;
        }
    }

    /// Get dialog Y offset as integer for rendering
    pub fn dialog_y_offset(&self) -> u16 {
        self.dialog_offset.ceil() as u16
    }
}

/// Shape of a value's progress over a normalized time `t` in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Easing {
    #[default]
    Linear,
    EaseOutCubic,
    EaseInOutCubic,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// Linear interpolation
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t.clamp(0.0, 1.0)
}

/// Exponential ease-out interpolation (smooth approach)
pub fn ease_out(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}
