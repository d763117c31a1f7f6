//! Procedural layout: scatter and tree endpoints for every population.
//!
//! Generation runs once per scene. The resulting `SceneLayout` is immutable;
//! per-frame code only reads it through shared slices, and the element index
//! is the key that ties a scatter point to its target and to its slot in the
//! per-frame output buffers.

use crate::constants::*;
use crate::error::{LayoutError, PopulationKind};
use glam::Vec3;
use rand::prelude::*;
use smallvec::SmallVec;
use std::f32::consts::TAU;

/// Horizontal band of the conical canopy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeLayer {
    pub center_y: f32,
    pub max_radius: f32,
    pub thickness: f32,
}

/// One ring of ornaments around the trunk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingSpec {
    pub height: f32,
    pub radius: f32,
    pub count: usize,
}

#[derive(Clone, Debug)]
pub struct ParticleParams {
    pub count: usize,
    pub scatter_radius: f32,
    pub scatter_y_bias: f32,
    pub layers: SmallVec<[TreeLayer; 8]>,
    pub surface_fraction: f32,
    pub base_size: f32,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            count: PARTICLE_COUNT,
            scatter_radius: PARTICLE_SCATTER_RADIUS,
            scatter_y_bias: PARTICLE_SCATTER_Y_BIAS,
            layers: TREE_LAYERS
                .iter()
                .map(|&[center_y, max_radius, thickness]| TreeLayer {
                    center_y,
                    max_radius,
                    thickness,
                })
                .collect(),
            surface_fraction: PARTICLE_SURFACE_FRACTION,
            base_size: PARTICLE_BASE_SIZE,
        }
    }
}

#[derive(Clone, Debug)]
pub struct OrnamentParams {
    pub capacity: usize,
    pub rings: SmallVec<[RingSpec; 8]>,
    pub scatter_radius: f32,
    pub scatter_y_bias: f32,
    pub ring_phase_step: f32,
    pub vertical_jitter: f32,
}

impl Default for OrnamentParams {
    fn default() -> Self {
        Self {
            capacity: ORNAMENT_CAPACITY,
            rings: ORNAMENT_RINGS
                .iter()
                .map(|&(height, radius, count)| RingSpec {
                    height,
                    radius,
                    count,
                })
                .collect(),
            scatter_radius: ORNAMENT_SCATTER_RADIUS,
            scatter_y_bias: ORNAMENT_SCATTER_Y_BIAS,
            ring_phase_step: ORNAMENT_RING_PHASE_STEP,
            vertical_jitter: ORNAMENT_VERTICAL_JITTER,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GiftParams {
    pub count: usize,
    pub scatter_radius: f32,
    pub scatter_y_bias: f32,
    pub spiral_turns: f32,
    pub bottom_y: f32,
    pub top_y: f32,
    pub bottom_radius: f32,
    pub top_radius: f32,
}

impl Default for GiftParams {
    fn default() -> Self {
        Self {
            count: GIFT_COUNT,
            scatter_radius: GIFT_SCATTER_RADIUS,
            scatter_y_bias: GIFT_SCATTER_Y_BIAS,
            spiral_turns: GIFT_SPIRAL_TURNS,
            bottom_y: GIFT_SPIRAL_BOTTOM_Y,
            top_y: GIFT_SPIRAL_TOP_Y,
            bottom_radius: GIFT_SPIRAL_BOTTOM_RADIUS,
            top_radius: GIFT_SPIRAL_TOP_RADIUS,
        }
    }
}

/// Full set of generation parameters.
#[derive(Clone, Debug, Default)]
pub struct LayoutParams {
    pub particles: ParticleParams,
    pub ornaments: OrnamentParams,
    pub gifts: GiftParams,
}

fn check_radius(name: &'static str, value: f32) -> Result<(), LayoutError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidParameter { name, value })
    }
}

fn check_finite(name: &'static str, value: f32) -> Result<(), LayoutError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(LayoutError::InvalidParameter { name, value })
    }
}

impl LayoutParams {
    pub fn validate(&self) -> Result<(), LayoutError> {
        let p = &self.particles;
        if p.count == 0 || p.layers.is_empty() {
            return Err(LayoutError::EmptyPopulation(PopulationKind::Particles));
        }
        check_radius("particles.scatter_radius", p.scatter_radius)?;
        check_finite("particles.scatter_y_bias", p.scatter_y_bias)?;
        check_radius("particles.base_size", p.base_size)?;
        if !(0.0..=1.0).contains(&p.surface_fraction) {
            return Err(LayoutError::InvalidParameter {
                name: "particles.surface_fraction",
                value: p.surface_fraction,
            });
        }
        for layer in &p.layers {
            check_finite("particles.layer.center_y", layer.center_y)?;
            check_radius("particles.layer.max_radius", layer.max_radius)?;
            check_radius("particles.layer.thickness", layer.thickness)?;
        }

        let o = &self.ornaments;
        if o.capacity == 0 || o.rings.iter().all(|r| r.count == 0) {
            return Err(LayoutError::EmptyPopulation(PopulationKind::Ornaments));
        }
        check_radius("ornaments.scatter_radius", o.scatter_radius)?;
        check_finite("ornaments.scatter_y_bias", o.scatter_y_bias)?;
        check_finite("ornaments.ring_phase_step", o.ring_phase_step)?;
        check_radius("ornaments.vertical_jitter", o.vertical_jitter)?;
        for ring in &o.rings {
            check_finite("ornaments.ring.height", ring.height)?;
            check_radius("ornaments.ring.radius", ring.radius)?;
        }

        let g = &self.gifts;
        if g.count == 0 {
            return Err(LayoutError::EmptyPopulation(PopulationKind::Gifts));
        }
        check_radius("gifts.scatter_radius", g.scatter_radius)?;
        check_finite("gifts.scatter_y_bias", g.scatter_y_bias)?;
        if !(g.spiral_turns.is_finite() && g.spiral_turns > 0.0) {
            return Err(LayoutError::InvalidParameter {
                name: "gifts.spiral_turns",
                value: g.spiral_turns,
            });
        }
        check_finite("gifts.bottom_y", g.bottom_y)?;
        check_finite("gifts.top_y", g.top_y)?;
        check_radius("gifts.bottom_radius", g.bottom_radius)?;
        check_radius("gifts.top_radius", g.top_radius)?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleElement {
    pub scatter: Vec3,
    pub target: Vec3,
    pub size: f32,
    pub seed: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrnamentElement {
    pub scatter: Vec3,
    pub target: Vec3,
    pub seed: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GiftElement {
    pub scatter: Vec3,
    pub target: Vec3,
    /// XYZ Euler angles applied while the gift is in transit.
    pub rotation_seed: Vec3,
}

/// Uniform point inside a sphere of `radius` centered at the origin.
///
/// Inverse-transform sampling: uniform azimuth, uniform cos(polar) and a
/// cube-root radius so density is volumetric rather than surface-biased.
pub fn sample_in_sphere<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec3 {
    let azimuth = rng.gen::<f32>() * TAU;
    let cos_polar = rng.gen::<f32>() * 2.0 - 1.0;
    let sin_polar = (1.0 - cos_polar * cos_polar).max(0.0).sqrt();
    let r = radius * rng.gen::<f32>().cbrt();
    Vec3::new(
        r * sin_polar * azimuth.cos(),
        r * cos_polar,
        r * sin_polar * azimuth.sin(),
    )
}

/// Point on the layered canopy.
pub fn sample_canopy<R: Rng + ?Sized>(
    rng: &mut R,
    layers: &[TreeLayer],
    surface_fraction: f32,
) -> Vec3 {
    let Some(layer) = layers.choose(rng) else {
        return Vec3::ZERO;
    };
    let h = rng.gen::<f32>();
    let y = layer.center_y + (h - 0.5) * layer.thickness;
    let cone_radius = layer.max_radius * (1.0 - h);
    let multiplier = if rng.gen::<f32>() < surface_fraction {
        rng.gen_range(PARTICLE_SURFACE_MIN..=1.0)
    } else {
        rng.gen::<f32>()
    };
    let r = cone_radius * multiplier;
    let azimuth = rng.gen::<f32>() * TAU;
    Vec3::new(r * azimuth.cos(), y, r * azimuth.sin())
}

pub fn generate_particles<R: Rng + ?Sized>(
    params: &ParticleParams,
    rng: &mut R,
) -> Vec<ParticleElement> {
    let bias = Vec3::new(0.0, params.scatter_y_bias, 0.0);
    (0..params.count)
        .map(|_| {
            let scatter = sample_in_sphere(rng, params.scatter_radius) + bias;
            let target = sample_canopy(rng, &params.layers, params.surface_fraction);
            let size = params.base_size * rng.gen_range(0.5..1.5);
            let seed = rng.gen::<f32>();
            ParticleElement {
                scatter,
                target,
                size,
                seed,
            }
        })
        .collect()
}

/// Fills rings in order until `params.capacity` is reached.
///
/// The ring that hits the cap is cut short and later rings are skipped.
pub fn generate_ornaments<R: Rng + ?Sized>(
    params: &OrnamentParams,
    rng: &mut R,
) -> Vec<OrnamentElement> {
    let bias = Vec3::new(0.0, params.scatter_y_bias, 0.0);
    let wanted: usize = params.rings.iter().map(|r| r.count).sum();
    let mut out = Vec::with_capacity(wanted.min(params.capacity));
    'rings: for (ring_index, ring) in params.rings.iter().enumerate() {
        let phase = ring_index as f32 * params.ring_phase_step;
        for j in 0..ring.count {
            if out.len() >= params.capacity {
                log::debug!(
                    "ornament capacity {} reached in ring {ring_index}, dropping {} slots",
                    params.capacity,
                    wanted - out.len()
                );
                break 'rings;
            }
            let angle = j as f32 / ring.count as f32 * TAU + phase;
            let jitter = (rng.gen::<f32>() - 0.5) * params.vertical_jitter;
            let target = Vec3::new(
                ring.radius * angle.cos(),
                ring.height + jitter,
                ring.radius * angle.sin(),
            );
            let scatter = sample_in_sphere(rng, params.scatter_radius) + bias;
            out.push(OrnamentElement {
                scatter,
                target,
                seed: rng.gen::<f32>(),
            });
        }
    }
    out
}

/// Target point `index` of `count` along the gift garland.
pub fn spiral_point(params: &GiftParams, index: usize, count: usize) -> Vec3 {
    let f = if count > 1 {
        index as f32 / (count - 1) as f32
    } else {
        0.0
    };
    let angle = f * params.spiral_turns * TAU;
    let y = params.bottom_y + (params.top_y - params.bottom_y) * f;
    let r = params.bottom_radius + (params.top_radius - params.bottom_radius) * f;
    Vec3::new(r * angle.cos(), y, r * angle.sin())
}

pub fn generate_gifts<R: Rng + ?Sized>(params: &GiftParams, rng: &mut R) -> Vec<GiftElement> {
    let bias = Vec3::new(0.0, params.scatter_y_bias, 0.0);
    (0..params.count)
        .map(|i| {
            let scatter = sample_in_sphere(rng, params.scatter_radius) + bias;
            let target = spiral_point(params, i, params.count);
            let rotation_seed = Vec3::new(
                rng.gen::<f32>() * TAU,
                rng.gen::<f32>() * TAU,
                rng.gen::<f32>() * TAU,
            );
            GiftElement {
                scatter,
                target,
                rotation_seed,
            }
        })
        .collect()
}

/// The immutable endpoint buffers of all three populations.
#[derive(Clone, Debug)]
pub struct SceneLayout {
    particles: Vec<ParticleElement>,
    ornaments: Vec<OrnamentElement>,
    gifts: Vec<GiftElement>,
}

impl SceneLayout {
    pub fn generate<R: Rng + ?Sized>(
        params: &LayoutParams,
        rng: &mut R,
    ) -> Result<Self, LayoutError> {
        params.validate()?;
        let particles = generate_particles(&params.particles, rng);
        let ornaments = generate_ornaments(&params.ornaments, rng);
        let gifts = generate_gifts(&params.gifts, rng);
        log::info!(
            "[layout] particles={} ornaments={}/{} gifts={}",
            particles.len(),
            ornaments.len(),
            params.ornaments.capacity,
            gifts.len()
        );
        Ok(Self {
            particles,
            ornaments,
            gifts,
        })
    }

    pub fn from_seed(params: &LayoutParams, seed: u64) -> Result<Self, LayoutError> {
        Self::generate(params, &mut StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(params: &LayoutParams) -> Result<Self, LayoutError> {
        Self::generate(params, &mut StdRng::from_entropy())
    }

    #[inline]
    pub fn particles(&self) -> &[ParticleElement] {
        &self.particles
    }
    #[inline]
    pub fn ornaments(&self) -> &[OrnamentElement] {
        &self.ornaments
    }
    #[inline]
    pub fn gifts(&self) -> &[GiftElement] {
        &self.gifts
    }

    pub fn len_of(&self, kind: PopulationKind) -> usize {
        match kind {
            PopulationKind::Particles => self.particles.len(),
            PopulationKind::Ornaments => self.ornaments.len(),
            PopulationKind::Gifts => self.gifts.len(),
        }
    }
}
