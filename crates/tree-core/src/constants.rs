use glam::Vec3;

// Shared layout/animation tuning constants used by the core and the frontends.

// Morph scheduling
pub const MORPH_RATE: f32 = 2.0; // exponential approach rate (1/s)
pub const PROGRESS_EPSILON: f32 = 1e-4; // snap distance to the target
pub const SETTLE_THRESHOLD: f32 = 0.99; // progress at which instances stop floating

// Particle field
pub const PARTICLE_COUNT: usize = 8000;
pub const PARTICLE_SCATTER_RADIUS: f32 = 15.0;
pub const PARTICLE_SCATTER_Y_BIAS: f32 = 2.0;
pub const PARTICLE_BASE_SIZE: f32 = 0.12; // world units, before the per-particle variance
pub const PARTICLE_SURFACE_FRACTION: f32 = 0.8; // share of particles hugging the cone shell
pub const PARTICLE_SURFACE_MIN: f32 = 0.9; // radius multiplier floor for shell particles

/// One horizontal band of the canopy: `(center_y, max_radius, thickness)`.
pub const TREE_LAYERS: [[f32; 3]; 5] = [
    [-3.6, 5.2, 3.6],
    [-1.2, 4.3, 3.2],
    [0.9, 3.4, 2.8],
    [2.8, 2.5, 2.4],
    [4.5, 1.6, 2.0],
];

// Particle per-vertex effects (mirrored in shaders/particles.wgsl)
pub const BREATHE_FREQ: f32 = 1.5;
pub const BREATHE_AMPLITUDE: f32 = 0.08;
pub const JITTER_AMPLITUDE: f32 = 0.35;
pub const JITTER_FREQ: [f32; 3] = [0.8, 0.6, 0.7];
pub const JITTER_PHASE: [f32; 3] = [10.0, 7.0, 13.0];
pub const SIZE_SCATTER_FLOOR: f32 = 0.35; // fraction of full size left when fully scattered
pub const ALPHA_BASE: f32 = 0.65;
pub const ALPHA_PULSE: f32 = 0.35;
pub const ALPHA_FREQ: f32 = 2.0;

// Ornaments (light instances)
pub const ORNAMENT_CAPACITY: usize = 120;
pub const ORNAMENT_SCATTER_RADIUS: f32 = 18.0;
pub const ORNAMENT_SCATTER_Y_BIAS: f32 = 3.0;
pub const ORNAMENT_RING_PHASE_STEP: f32 = 0.6; // radians added per ring
pub const ORNAMENT_VERTICAL_JITTER: f32 = 0.3; // full span of the per-element height noise
pub const ORNAMENT_SCALE: f32 = 0.28;
pub const ORNAMENT_FLOAT_FREQ: f32 = 3.0;
pub const ORNAMENT_FLOAT_AMPLITUDE: f32 = 0.15;
pub const ORNAMENT_TWINKLE_FREQ: f32 = 2.2;

/// Ring table: `(height, radius, count)`, radius shrinking per ring index.
pub const ORNAMENT_RINGS: [(f32, f32, usize); 5] = [
    (-3.4, 4.8, 10),
    (-1.2, 3.9, 14),
    (0.8, 3.0, 18),
    (2.6, 2.1, 22),
    (4.2, 1.2, 26),
];

// Gifts (heavy instances)
pub const GIFT_COUNT: usize = 25;
pub const GIFT_SCATTER_RADIUS: f32 = 12.0;
pub const GIFT_SCATTER_Y_BIAS: f32 = -4.0;
pub const GIFT_SPIRAL_TURNS: f32 = 10.0;
pub const GIFT_SPIRAL_BOTTOM_Y: f32 = -4.6;
pub const GIFT_SPIRAL_TOP_Y: f32 = 4.0;
pub const GIFT_SPIRAL_BOTTOM_RADIUS: f32 = 5.4;
pub const GIFT_SPIRAL_TOP_RADIUS: f32 = 1.0;
pub const GIFT_SCALE: f32 = 0.45;
pub const GIFT_LAG: f32 = 0.1; // eased progress the gifts wait for
pub const GIFT_BOOST: f32 = 1.1; // catch-up factor after the lag
pub const GIFT_SPIN_FREQ: [f32; 2] = [0.5, 0.35];
pub const GIFT_SPIN_AMPLITUDE: f32 = 0.6;
pub const GIFT_FLOAT_FREQ: f32 = 1.2;
pub const GIFT_FLOAT_AMPLITUDE: f32 = 0.1;

// Assembly rotation
pub const SCATTERED_SPIN_FACTOR: f32 = 0.2;
pub const TREE_SPIN_FACTOR: f32 = 1.0;

// Topper accent
pub const TOPPER_TREE_Y: f32 = 6.0;
pub const TOPPER_FLOAT_Y: f32 = 8.5;
pub const TOPPER_LERP_RATE: f32 = 1.5; // lerp factor per second, slower than the morph
pub const TOPPER_SPIN_SPEED: f32 = 0.8; // rad/s
pub const TOPPER_SCALE: f32 = 0.7;
pub const TOPPER_GLOW_TREE: f32 = 1.6;
pub const TOPPER_GLOW_SCATTERED: f32 = 0.5;
pub const TOPPER_GLOW_PULSE: f32 = 0.25;
pub const TOPPER_GLOW_FREQ: f32 = 2.5;
pub const LIGHTS_GLOW_TREE: f32 = 1.0;
pub const LIGHTS_GLOW_SCATTERED: f32 = 0.45;

// Scene config defaults
pub const DEFAULT_ROTATION_SPEED: f32 = 0.5; // rad/s at full speed
pub const DEFAULT_BLOOM_INTENSITY: f32 = 1.2;
pub const DEFAULT_LIGHTS_COLOR: [f32; 3] = [1.0, 0.78, 0.35]; // warm gold
pub const MIN_ROTATION_SPEED: f32 = 0.05;
pub const MIN_BLOOM_INTENSITY: f32 = 0.1;

// Camera
pub const CAMERA_EYE: [f32; 3] = [0.0, 2.0, 22.0];
pub const CAMERA_TARGET: [f32; 3] = [0.0, 0.5, 0.0];

#[inline]
pub fn topper_tree_position() -> Vec3 {
    Vec3::new(0.0, TOPPER_TREE_Y, 0.0)
}

#[inline]
pub fn topper_float_position() -> Vec3 {
    Vec3::new(0.0, TOPPER_FLOAT_Y, 0.0)
}
