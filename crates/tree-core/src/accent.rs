//! Whole-assembly spin and the topper/light accents.
//!
//! Everything here keys off the `MorphState` flag rather than the shared
//! progress, so spin speed and glow react the frame the flag flips. The topper
//! runs its own slower lerp toward its current target point.

use crate::constants::*;
use crate::state::{MorphState, SceneConfig};
use glam::{Mat4, Quat, Vec3};
use std::f32::consts::TAU;
use std::time::Duration;

/// Accent outputs for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AccentFrame {
    /// Yaw of the whole assembly in \[0, 2π).
    pub assembly_angle: f32,
    /// Topper position in assembly space.
    pub topper_position: Vec3,
    pub topper_spin: f32,
    pub topper_glow: f32,
    pub lights_glow: f32,
}

impl AccentFrame {
    pub fn assembly_matrix(&self) -> Mat4 {
        Mat4::from_rotation_y(self.assembly_angle)
    }

    /// Topper transform relative to the assembly.
    pub fn topper_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(TOPPER_SCALE),
            Quat::from_rotation_y(self.topper_spin),
            self.topper_position,
        )
    }
}

#[inline]
pub fn spin_factor(state: MorphState) -> f32 {
    match state {
        MorphState::Scattered => SCATTERED_SPIN_FACTOR,
        MorphState::Tree => TREE_SPIN_FACTOR,
    }
}

#[inline]
pub fn topper_target(state: MorphState) -> Vec3 {
    match state {
        MorphState::Scattered => topper_float_position(),
        MorphState::Tree => topper_tree_position(),
    }
}

pub fn topper_glow(state: MorphState, time: f32) -> f32 {
    let base = match state {
        MorphState::Scattered => TOPPER_GLOW_SCATTERED,
        MorphState::Tree => TOPPER_GLOW_TREE,
    };
    base * (1.0 + TOPPER_GLOW_PULSE * (time * TOPPER_GLOW_FREQ).sin())
}

#[inline]
pub fn lights_glow(state: MorphState) -> f32 {
    match state {
        MorphState::Scattered => LIGHTS_GLOW_SCATTERED,
        MorphState::Tree => LIGHTS_GLOW_TREE,
    }
}

#[derive(Clone, Debug)]
pub struct AccentController {
    frame: AccentFrame,
}

impl AccentController {
    pub fn new(initial: MorphState) -> Self {
        Self {
            frame: AccentFrame {
                assembly_angle: 0.0,
                topper_position: topper_target(initial),
                topper_spin: 0.0,
                topper_glow: topper_glow(initial, 0.0),
                lights_glow: lights_glow(initial),
            },
        }
    }

    #[inline]
    pub fn frame(&self) -> &AccentFrame {
        &self.frame
    }

    pub fn update(&mut self, config: &SceneConfig, dt: Duration, time: f32) -> AccentFrame {
        let dt_sec = dt.as_secs_f32();
        let state = config.morph_state;
        let f = &mut self.frame;

        let speed = config.rotation_speed.max(0.0) * spin_factor(state);
        f.assembly_angle = (f.assembly_angle + speed * dt_sec).rem_euclid(TAU);

        let k = (TOPPER_LERP_RATE * dt_sec).clamp(0.0, 1.0);
        f.topper_position = f.topper_position.lerp(topper_target(state), k);
        f.topper_spin = (f.topper_spin + TOPPER_SPIN_SPEED * dt_sec).rem_euclid(TAU);

        f.topper_glow = topper_glow(state, time);
        f.lights_glow = lights_glow(state);
        *f
    }
}
