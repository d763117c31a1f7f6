//! Scene context: owns the layout, the scheduler and every per-frame buffer.
//!
//! The frontend keeps the `SceneConfig` and passes it in by reference; the scene
//! never holds on to it. Frame order is fixed: scheduler, interpolators, accents.

use crate::accent::{AccentController, AccentFrame};
use crate::clock::FrameTime;
use crate::error::{LayoutError, PopulationKind};
use crate::interp::{
    update_gifts, update_ornaments, InstanceBuffer, ParticleFrame, ParticleUniforms,
    ParticleVertex,
};
use crate::layout::SceneLayout;
use crate::progress::MorphScheduler;
use crate::state::{MorphState, SceneConfig};
use std::time::Duration;

pub struct Scene {
    layout: SceneLayout,
    scheduler: MorphScheduler,
    ornaments: InstanceBuffer,
    gifts: InstanceBuffer,
    particles: Option<ParticleFrame>,
    accent: AccentController,
    time: f32,
}

impl Scene {
    /// Scene starting in `initial`, with freshly sized output buffers.
    pub fn new(layout: SceneLayout, initial: MorphState) -> Result<Self, LayoutError> {
        let ornaments = InstanceBuffer::new(PopulationKind::Ornaments, layout.ornaments().len());
        let gifts = InstanceBuffer::new(PopulationKind::Gifts, layout.gifts().len());
        Self::from_parts(layout, initial, ornaments, gifts)
    }

    /// Scene over caller-provided instance buffers.
    ///
    /// Each buffer must be tagged with its own population and hold exactly
    /// one slot per element of it.
    pub fn from_parts(
        layout: SceneLayout,
        initial: MorphState,
        ornaments: InstanceBuffer,
        gifts: InstanceBuffer,
    ) -> Result<Self, LayoutError> {
        for (buf, kind) in [
            (&ornaments, PopulationKind::Ornaments),
            (&gifts, PopulationKind::Gifts),
        ] {
            if buf.kind() != kind {
                return Err(LayoutError::WrongPopulation {
                    expected: kind,
                    found: buf.kind(),
                });
            }
            buf.check_len(layout.len_of(kind))?;
        }
        let mut scene = Self {
            scheduler: MorphScheduler::new(initial),
            accent: AccentController::new(initial),
            layout,
            ornaments,
            gifts,
            particles: None,
            time: 0.0,
        };
        scene.interpolate();
        Ok(scene)
    }

    /// Also evaluate the particle field on the CPU each frame.
    pub fn with_host_particles(mut self, enabled: bool) -> Self {
        self.particles = if enabled {
            let mut frame = ParticleFrame::new(self.layout.particles().len());
            frame.update(self.layout.particles(), self.scheduler.progress(), self.time);
            Some(frame)
        } else {
            None
        };
        self
    }

    pub fn with_scheduler(mut self, scheduler: MorphScheduler) -> Self {
        self.scheduler = scheduler;
        self.interpolate();
        self
    }

    pub fn update(&mut self, config: &SceneConfig, dt: Duration, time: f32) {
        self.time = time;
        self.scheduler.advance(config.morph_state, dt);
        self.interpolate();
        self.accent.update(config, dt, time);
    }

    #[inline]
    pub fn update_frame(&mut self, config: &SceneConfig, frame: FrameTime) {
        self.update(config, frame.dt, frame.elapsed);
    }

    fn interpolate(&mut self) {
        let progress = self.scheduler.progress();
        update_ornaments(self.layout.ornaments(), &mut self.ornaments, progress, self.time);
        update_gifts(self.layout.gifts(), &mut self.gifts, progress, self.time);
        if let Some(frame) = &mut self.particles {
            frame.update(self.layout.particles(), progress, self.time);
        }
    }

    #[inline]
    pub fn progress(&self) -> f32 {
        self.scheduler.progress()
    }
    #[inline]
    pub fn scheduler(&self) -> &MorphScheduler {
        &self.scheduler
    }
    #[inline]
    pub fn layout(&self) -> &SceneLayout {
        &self.layout
    }
    #[inline]
    pub fn ornaments(&self) -> &InstanceBuffer {
        &self.ornaments
    }
    #[inline]
    pub fn gifts(&self) -> &InstanceBuffer {
        &self.gifts
    }
    #[inline]
    pub fn particles(&self) -> Option<&ParticleFrame> {
        self.particles.as_ref()
    }
    #[inline]
    pub fn accent(&self) -> &AccentFrame {
        self.accent.frame()
    }

    pub fn particle_uniforms(&self) -> ParticleUniforms {
        ParticleUniforms::new(self.scheduler.progress(), self.time)
    }

    /// Static vertex data for the GPU particle path.
    pub fn particle_vertices(&self) -> Vec<ParticleVertex> {
        self.layout.particles().iter().map(ParticleVertex::from).collect()
    }
}
