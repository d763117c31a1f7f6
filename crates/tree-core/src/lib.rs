//! Dual-state procedural scene engine for the morphing tree.
//!
//! Generation (`layout`) runs once. Every frame the `Scene` advances the
//! shared progress (`progress`), re-eases it per population (`interp`) and
//! updates the assembly spin and accents (`accent`).

pub mod accent;
pub mod clock;
pub mod constants;
pub mod easing;
pub mod error;
pub mod interp;
pub mod layout;
pub mod progress;
pub mod scene;
pub mod state;

pub use accent::*;
pub use clock::*;
pub use constants::*;
pub use easing::*;
pub use error::*;
pub use interp::*;
pub use layout::*;
pub use progress::*;
pub use scene::*;
pub use state::*;

// Shaders bundled as string constants
pub static PARTICLES_WGSL: &str = include_str!("../shaders/particles.wgsl");
pub static INSTANCES_WGSL: &str = include_str!("../shaders/instances.wgsl");
