use instant::Instant;
use std::time::Duration;

/// Time inputs for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    pub dt: Duration,
    /// Seconds since the clock started.
    pub elapsed: f32,
}

/// Wall clock feeding `Scene::update` from a render loop.
#[derive(Clone, Debug)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now - self.last;
        self.last = now;
        FrameTime {
            dt,
            elapsed: (now - self.start).as_secs_f32(),
        }
    }
}
