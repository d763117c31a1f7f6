use crate::constants::{MORPH_RATE, PROGRESS_EPSILON};
use crate::state::MorphState;
use std::time::Duration;

/// Shared morph progress, 0 = scattered, 1 = tree.
///
/// Each frame the value approaches the target of the current `MorphState`
/// with a frame-rate independent exponential step. It never jumps, never
/// overshoots, and reverses from wherever it sits when the state flips.
#[derive(Clone, Debug)]
pub struct MorphScheduler {
    progress: f32,
    rate: f32,
}

impl MorphScheduler {
    pub fn new(initial: MorphState) -> Self {
        Self {
            progress: initial.target(),
            rate: MORPH_RATE,
        }
    }

    pub fn with_rate(initial: MorphState, rate: f32) -> Self {
        let rate = if rate.is_finite() && rate > 0.0 {
            rate
        } else {
            log::warn!("morph rate {rate} is not positive, using {MORPH_RATE}");
            MORPH_RATE
        };
        Self {
            progress: initial.target(),
            rate,
        }
    }

    #[inline]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    #[inline]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Overrides the current value, clamped to \[0, 1\].
    pub fn set_progress(&mut self, progress: f32) {
        self.progress = clamp_unit(progress);
    }

    /// Fraction of the remaining distance covered after `dt`.
    #[inline]
    pub fn step_fraction(&self, dt: Duration) -> f32 {
        1.0 - (-self.rate * dt.as_secs_f32()).exp()
    }

    pub fn advance(&mut self, state: MorphState, dt: Duration) -> f32 {
        let target = state.target();
        if self.progress == target {
            return self.progress;
        }
        let next = self.progress + (target - self.progress) * self.step_fraction(dt);
        self.progress = if (target - next).abs() < PROGRESS_EPSILON {
            log::debug!("morph settled at {target}");
            target
        } else {
            clamp_unit(next)
        };
        self.progress
    }

    #[inline]
    pub fn is_settled(&self, state: MorphState) -> bool {
        (state.target() - self.progress).abs() < PROGRESS_EPSILON
    }
}

#[inline]
fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}
