//! Externally owned scene state shared with the frontends.
//!
//! These types avoid referencing platform-specific APIs. The frontend owns a
//! `SceneConfig`, mutates it from user input and hands it to the scene by
//! reference every frame; the engine never writes to it.

use crate::constants::*;
use glam::{Mat4, Vec3};

/// Which formation the scene is heading toward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MorphState {
    Scattered,
    #[default]
    Tree,
}

impl MorphState {
    /// Numeric progress target: 0 for the cloud, 1 for the tree.
    #[inline]
    pub fn target(self) -> f32 {
        match self {
            MorphState::Scattered => 0.0,
            MorphState::Tree => 1.0,
        }
    }

    #[inline]
    pub fn toggled(self) -> Self {
        match self {
            MorphState::Scattered => MorphState::Tree,
            MorphState::Tree => MorphState::Scattered,
        }
    }
}

/// Per-frame tuning supplied by the control layer.
///
/// - `rotation_speed`: full-speed yaw rate of the assembly in rad/s
/// - `bloom_intensity`: glow multiplier, consumed only by the renderer
/// - `lights_color`: linear RGB of the ornaments and topper
/// - `morph_state`: the formation the scene should morph toward
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub rotation_speed: f32,
    pub bloom_intensity: f32,
    pub lights_color: [f32; 3],
    pub morph_state: MorphState,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            rotation_speed: DEFAULT_ROTATION_SPEED,
            bloom_intensity: DEFAULT_BLOOM_INTENSITY,
            lights_color: DEFAULT_LIGHTS_COLOR,
            morph_state: MorphState::Tree,
        }
    }
}

impl SceneConfig {
    /// Copy with speed and bloom forced positive and finite.
    pub fn sanitized(&self) -> Self {
        let mut out = self.clone();
        if !(out.rotation_speed.is_finite() && out.rotation_speed > 0.0) {
            log::warn!(
                "rotation_speed {} out of range, using {}",
                out.rotation_speed,
                MIN_ROTATION_SPEED
            );
            out.rotation_speed = MIN_ROTATION_SPEED;
        }
        if !(out.bloom_intensity.is_finite() && out.bloom_intensity > 0.0) {
            log::warn!(
                "bloom_intensity {} out of range, using {}",
                out.bloom_intensity,
                MIN_BLOOM_INTENSITY
            );
            out.bloom_intensity = MIN_BLOOM_INTENSITY;
        }
        for c in out.lights_color.iter_mut() {
            if !c.is_finite() {
                *c = 0.0;
            }
            *c = c.max(0.0);
        }
        out
    }

    #[inline]
    pub fn lights_color_vec3(&self) -> Vec3 {
        Vec3::from(self.lights_color)
    }
}

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::from(CAMERA_EYE),
            target: Vec3::from(CAMERA_TARGET),
            up: Vec3::Y,
            aspect: 16.0 / 9.0,
            fovy_radians: std::f32::consts::FRAC_PI_4,
            znear: 0.1,
            zfar: 200.0,
        }
    }
}

impl Camera {
    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }
    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
    /// World-space right and up vectors, used to billboard point sprites.
    pub fn billboard_axes(&self) -> (Vec3, Vec3) {
        let forward = (self.target - self.eye).normalize_or_zero();
        let right = forward.cross(self.up).normalize_or_zero();
        let up = right.cross(forward);
        (right, up)
    }
}
