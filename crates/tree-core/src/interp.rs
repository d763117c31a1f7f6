//! Per-frame interpolation of the three populations.
//!
//! Each population reads the shared progress, reshapes it with its own curve
//! and writes only its own output buffer. Buffers are flat arrays indexed by
//! element index and overwritten in place every frame.

use crate::constants::*;
use crate::easing::{ease_in_out_cubic, ease_out_cubic, gift_blend};
use crate::error::{LayoutError, PopulationKind};
use crate::layout::{GiftElement, OrnamentElement, ParticleElement};
use glam::{EulerRot, Mat4, Quat, Vec3};
use std::f32::consts::TAU;

// ===================== Particle field =====================

/// Evaluated attributes of one particle for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleSample {
    pub position: Vec3,
    pub size: f32,
    pub alpha: f32,
}

/// Blend factor of the particle field for a given progress.
#[inline]
pub fn particle_blend(progress: f32) -> f32 {
    ease_out_cubic(progress)
}

/// Point size multiplier; grows monotonically with `t` and is 1 at `t = 1`.
#[inline]
pub fn particle_size_factor(t: f32) -> f32 {
    1.0 - (1.0 - SIZE_SCATTER_FLOOR) * (1.0 - t.clamp(0.0, 1.0))
}

#[inline]
pub fn particle_alpha(seed: f32, time: f32) -> f32 {
    ALPHA_BASE + ALPHA_PULSE * (time * ALPHA_FREQ + seed * TAU).sin()
}

/// Host-side twin of `vs_particles` in `shaders/particles.wgsl`.
///
/// `t` is the already eased blend factor, `time` the elapsed seconds.
pub fn particle_vertex(el: &ParticleElement, t: f32, time: f32) -> ParticleSample {
    let t = t.clamp(0.0, 1.0);
    let mut position = el.scatter.lerp(el.target, t);

    // breathing, mostly visible once assembled
    let outward = Vec3::new(position.x, 0.0, position.z).normalize_or_zero();
    let breathe = (time * BREATHE_FREQ + el.seed * TAU).sin() * BREATHE_AMPLITUDE * t;
    position += outward * breathe;

    // jitter, mostly visible while scattered
    let jitter = Vec3::new(
        (time * JITTER_FREQ[0] + el.seed * JITTER_PHASE[0]).sin(),
        (time * JITTER_FREQ[1] + el.seed * JITTER_PHASE[1]).cos(),
        (time * JITTER_FREQ[2] + el.seed * JITTER_PHASE[2]).sin(),
    );
    position += jitter * JITTER_AMPLITUDE * (1.0 - t);

    ParticleSample {
        position,
        size: el.size * particle_size_factor(t),
        alpha: particle_alpha(el.seed, time),
    }
}

/// Static per-vertex record uploaded once for the GPU path.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleVertex {
    pub scatter: [f32; 3],
    pub size: f32,
    pub target: [f32; 3],
    pub seed: f32,
}

impl From<&ParticleElement> for ParticleVertex {
    fn from(el: &ParticleElement) -> Self {
        Self {
            scatter: el.scatter.to_array(),
            size: el.size,
            target: el.target.to_array(),
            seed: el.seed,
        }
    }
}

/// Per-frame inputs of the particle shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleUniforms {
    pub blend: f32,
    pub time: f32,
    pub _pad: [f32; 2],
}

impl ParticleUniforms {
    pub fn new(progress: f32, time: f32) -> Self {
        Self {
            blend: particle_blend(progress),
            time,
            _pad: [0.0; 2],
        }
    }
}

/// Host-side particle output buffers.
#[derive(Clone, Debug, Default)]
pub struct ParticleFrame {
    pub positions: Vec<Vec3>,
    pub sizes: Vec<f32>,
    pub alphas: Vec<f32>,
}

impl ParticleFrame {
    pub fn new(len: usize) -> Self {
        Self {
            positions: vec![Vec3::ZERO; len],
            sizes: vec![0.0; len],
            alphas: vec![0.0; len],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn update(&mut self, elements: &[ParticleElement], progress: f32, time: f32) {
        let t = particle_blend(progress);
        for (i, el) in elements.iter().enumerate().take(self.len()) {
            let s = particle_vertex(el, t, time);
            self.positions[i] = s.position;
            self.sizes[i] = s.size;
            self.alphas[i] = s.alpha;
        }
    }
}

// ===================== Instances =====================

/// Per-frame transforms of an instanced population.
///
/// `rotations` holds the Euler angles actually applied; ornaments never
/// rotate so theirs stay zero.
#[derive(Clone, Debug)]
pub struct InstanceBuffer {
    kind: PopulationKind,
    pub transforms: Vec<Mat4>,
    pub rotations: Vec<Vec3>,
    pub glow: Vec<f32>,
}

impl InstanceBuffer {
    pub fn new(kind: PopulationKind, len: usize) -> Self {
        Self {
            kind,
            transforms: vec![Mat4::IDENTITY; len],
            rotations: vec![Vec3::ZERO; len],
            glow: vec![1.0; len],
        }
    }

    #[inline]
    pub fn kind(&self) -> PopulationKind {
        self.kind
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Fails unless every side buffer matches `elements`.
    pub fn check_len(&self, elements: usize) -> Result<(), LayoutError> {
        let lens = [self.transforms.len(), self.rotations.len(), self.glow.len()];
        match lens.iter().find(|&&n| n != elements) {
            Some(&transforms) => Err(LayoutError::BufferLengthMismatch {
                population: self.kind,
                elements,
                transforms,
            }),
            None => Ok(()),
        }
    }

    /// Flat column-major floats, ready for a vertex buffer upload.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.transforms)
    }
}

/// Blend factor shared by ornaments and (before lagging) gifts.
#[inline]
pub fn ornament_blend(progress: f32) -> f32 {
    ease_in_out_cubic(progress)
}

#[inline]
fn in_transit(progress: f32) -> bool {
    progress < SETTLE_THRESHOLD
}

pub fn ornament_position(el: &OrnamentElement, index: usize, progress: f32, time: f32) -> Vec3 {
    let e = ornament_blend(progress);
    let mut p = el.scatter.lerp(el.target, e);
    if in_transit(progress) {
        p.y += (time * ORNAMENT_FLOAT_FREQ + index as f32).sin()
            * ORNAMENT_FLOAT_AMPLITUDE
            * (1.0 - e);
    }
    p
}

#[inline]
pub fn ornament_twinkle(seed: f32, time: f32) -> f32 {
    0.75 + 0.25 * (time * ORNAMENT_TWINKLE_FREQ + seed * TAU).sin()
}

pub fn update_ornaments(
    elements: &[OrnamentElement],
    out: &mut InstanceBuffer,
    progress: f32,
    time: f32,
) {
    let scale = Vec3::splat(ORNAMENT_SCALE);
    for (i, el) in elements.iter().enumerate().take(out.len()) {
        let p = ornament_position(el, i, progress, time);
        out.transforms[i] = Mat4::from_scale_rotation_translation(scale, Quat::IDENTITY, p);
        out.glow[i] = ornament_twinkle(el.seed, time);
    }
}

/// Lagged blend factor of the gifts for a given progress.
///
/// Once settled the gifts join the ornaments' factor so they rest on their
/// spiral targets; the raw lag curve alone stops at 0.99.
#[inline]
pub fn gift_factor(progress: f32) -> f32 {
    let e = ornament_blend(progress);
    if in_transit(progress) {
        gift_blend(e)
    } else {
        e
    }
}

/// Euler rotation of a gift; exactly zero once the tree has settled.
pub fn gift_rotation(el: &GiftElement, index: usize, progress: f32, time: f32) -> Vec3 {
    if !in_transit(progress) {
        return Vec3::ZERO;
    }
    let i = index as f32;
    el.rotation_seed
        + Vec3::new(
            (time * GIFT_SPIN_FREQ[0] + i).sin() * GIFT_SPIN_AMPLITUDE,
            (time * GIFT_SPIN_FREQ[1] + i * 0.7).sin() * GIFT_SPIN_AMPLITUDE,
            0.0,
        )
}

pub fn gift_position(el: &GiftElement, index: usize, progress: f32, time: f32) -> Vec3 {
    let g = gift_factor(progress);
    let mut p = el.scatter.lerp(el.target, g);
    if in_transit(progress) {
        p.y += (time * GIFT_FLOAT_FREQ + index as f32).sin() * GIFT_FLOAT_AMPLITUDE * (1.0 - g);
    }
    p
}

pub fn update_gifts(elements: &[GiftElement], out: &mut InstanceBuffer, progress: f32, time: f32) {
    let scale = Vec3::splat(GIFT_SCALE);
    for (i, el) in elements.iter().enumerate().take(out.len()) {
        let p = gift_position(el, i, progress, time);
        let r = gift_rotation(el, i, progress, time);
        let q = Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z);
        out.transforms[i] = Mat4::from_scale_rotation_translation(scale, q, p);
        out.rotations[i] = r;
    }
}
