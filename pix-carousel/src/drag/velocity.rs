//! Pointer velocity estimate used to launch coasting.

use std::time::{Duration, Instant};

use crate::config::MotionConfig;

/// Samples pointer travel at a fixed interval and keeps an exponentially
/// smoothed velocity.
///
/// Each sample computes `v = scale * -delta / (1 + elapsed_ms)` over the
/// pointer travel since the previous sample, then blends it as
/// `smoothing * v + (1 - smoothing) * previous`. The sign is inverted so a
/// leftward pull yields positive scroll.
#[derive(Debug, Clone)]
pub struct VelocitySampler {
    interval: Duration,
    scale: f32,
    smoothing: f32,
    sampled_at: Instant,
    sampled_x: f32,
    current_x: f32,
    velocity: f32,
}

impl VelocitySampler {
    pub fn new(motion: &MotionConfig, x: f32, now: Instant) -> Self {
        Self {
            interval: motion.sample_interval(),
            scale: motion.velocity_scale,
            smoothing: motion.smoothing,
            sampled_at: now,
            sampled_x: x,
            current_x: x,
            velocity: 0.0,
        }
    }

    /// Records the pointer position and samples every elapsed interval.
    pub fn record(&mut self, x: f32, now: Instant) {
        self.current_x = x;
        self.tick(now);
    }

    /// Samples if an interval has passed since the last sample.
    pub fn tick(&mut self, now: Instant) {
        if now.saturating_duration_since(self.sampled_at) >= self.interval {
            self.sample(now);
        }
    }

    fn sample(&mut self, now: Instant) {
        let elapsed =
            now.saturating_duration_since(self.sampled_at).as_secs_f32() * 1000.0;
        let delta = self.current_x - self.sampled_x;
        let v = self.scale * -delta / (1.0 + elapsed);
        self.velocity = self.smoothing * v + (1.0 - self.smoothing) * self.velocity;
        self.sampled_at = now;
        self.sampled_x = self.current_x;
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }
}
