//! Frame timing.
//!
//! The [`Scene`](crate::ecs::Scene) advances its [`Time`] at the start of every
//! frame, either by a caller-supplied delta ([`Scene::update`](crate::ecs::Scene::update))
//! or by measuring the wall clock ([`Scene::tick`](crate::ecs::Scene::tick)).
//! Systems read it through [`Scene::time`](crate::ecs::Scene::time).

use std::time::{Duration, Instant};

/// Per-scene frame clock.
#[derive(Clone, Copy, Debug)]
pub struct Time {
    /// When the current frame started, for wall-clock ticking.
    frame_start: Instant,
    /// Duration of the current frame.
    delta: Duration,
    /// Sum of every delta since the last reset.
    elapsed: Duration,
    frame_count: u64,
}

impl Time {
    pub(crate) fn new() -> Self {
        Self {
            frame_start: Instant::now(),
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advance by `dt` seconds. Negative or non-finite deltas count as zero;
    /// deltas too large for a [`Duration`] saturate.
    pub(crate) fn advance(&mut self, dt: f32) {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.delta = Duration::try_from_secs_f32(dt).unwrap_or(Duration::MAX);
        self.elapsed = self.elapsed.saturating_add(self.delta);
        self.frame_count += 1;
        self.frame_start = Instant::now();
    }

    /// Advance by the wall-clock time since the previous frame. Returns the
    /// delta in seconds.
    pub(crate) fn tick(&mut self) -> f32 {
        let now = Instant::now();
        self.delta = now - self.frame_start;
        self.frame_start = now;
        self.elapsed = self.elapsed.saturating_add(self.delta);
        self.frame_count += 1;
        self.delta.as_secs_f32()
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }

    /// Duration of the current frame.
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Delta time in seconds (f32), the most common way to use it.
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Total simulated time since the scene was created or last reset.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Number of frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Estimated FPS based on the current frame's delta.
    pub fn fps(&self) -> f32 {
        if self.delta.as_secs_f32() > 0.0 {
            1.0 / self.delta.as_secs_f32()
        } else {
            0.0
        }
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
