//! Momentum after a scrolling release.

use std::time::{Duration, Instant};

use crate::config::MotionConfig;

/// Exponentially decaying per-frame scroll delta.
///
/// At elapsed time `t` the frame applies `amplitude * e^(-t / tau)`; the
/// coaster stops on the first frame whose delta magnitude is below
/// `min_delta`.
#[derive(Debug, Clone)]
pub struct Coaster {
    amplitude: f32,
    started_at: Instant,
    time_constant: Duration,
    min_delta: f32,
    stopped: bool,
}

impl Coaster {
    /// Starts coasting, or `None` when the velocity would not move a pixel.
    pub fn launch(
        amplitude: f32,
        motion: &MotionConfig,
        now: Instant,
    ) -> Option<Self> {
        if !amplitude.is_finite() || amplitude.abs() < motion.min_delta {
            return None;
        }
        Some(Self {
            amplitude,
            started_at: now,
            time_constant: Duration::from_millis(motion.time_constant_ms),
            min_delta: motion.min_delta,
            stopped: false,
        })
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    /// Decayed delta at `elapsed` since launch.
    pub fn offset_at(&self, elapsed: Duration) -> f32 {
        let ratio = elapsed.as_secs_f32() / self.time_constant.as_secs_f32();
        self.amplitude * (-ratio).exp()
    }

    /// Scroll delta for the frame at `now`, or `None` once coasting is over.
    pub fn tick(&mut self, now: Instant) -> Option<f32> {
        if self.stopped {
            return None;
        }
        let delta = self.offset_at(now.saturating_duration_since(self.started_at));
        if delta.abs() < self.min_delta {
            self.stopped = true;
            return None;
        }
        Some(delta)
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}
