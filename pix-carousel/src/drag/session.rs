//! One pointer-down-to-up gesture over a thumbnail.
//!
//! Classification is a pure function of the previous phase and the current
//! deltas, so replaying a delta trace always reaches the same branch.

use std::time::Instant;

use pix_model::ItemId;

use super::velocity::VelocitySampler;
use crate::config::CarouselConfig;
use crate::controller::CarouselId;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    /// Pointer is down but has not travelled past the take-off limit.
    Armed,
    /// Horizontal delta drives the strip. `locked` once past the slide
    /// limit; a locked gesture stays scrolling until release.
    Scrolling { locked: bool },
    /// Vertical pull towards removal.
    Removing,
    /// A floating proxy follows the pointer. Sticky until release.
    Transferring,
    /// Released without leaving `Armed`.
    Tapped,
}

impl DragPhase {
    pub fn is_active(&self) -> bool {
        !matches!(self, DragPhase::Idle | DragPhase::Tapped)
    }
}

/// Pixel thresholds the classifier compares against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub take_off: f32,
    pub slide_limit: f32,
    pub transfer_dy: f32,
    pub transfer_dx: f32,
}

impl From<&CarouselConfig> for Thresholds {
    fn from(config: &CarouselConfig) -> Self {
        Self {
            take_off: config.take_off_limit,
            slide_limit: config.slide_limit,
            transfer_dy: config.transfer_dy,
            transfer_dx: config.transfer_dx,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from(&CarouselConfig::default())
    }
}

/// Next phase for a move with total deltas `(dx, dy)` since pointer-down.
///
/// `removal_enabled` is the per-thumbnail policy (the acting user owns the
/// item and the carousel allows vertical removal).
pub fn classify(
    phase: DragPhase,
    dx: f32,
    dy: f32,
    removal_enabled: bool,
    thresholds: &Thresholds,
) -> DragPhase {
    match phase {
        DragPhase::Idle | DragPhase::Tapped => return phase,
        DragPhase::Transferring | DragPhase::Scrolling { locked: true } => {
            return phase;
        }
        DragPhase::Armed if dx.hypot(dy) <= thresholds.take_off => {
            return phase;
        }
        _ => {}
    }

    let (ax, ay) = (dx.abs(), dy.abs());
    if ay > thresholds.transfer_dy && ax > thresholds.transfer_dx {
        DragPhase::Transferring
    } else if removal_enabled
        && ay > thresholds.take_off
        && ax <= thresholds.transfer_dx
    {
        DragPhase::Removing
    } else {
        DragPhase::Scrolling {
            locked: ax > thresholds.slide_limit,
        }
    }
}

/// Share of the thumbnail height covered by a vertical pull.
pub fn removal_ratio(dy: f32, thumb_height: f32) -> f32 {
    if thumb_height > 0.0 {
        dy.abs() / thumb_height
    } else {
        0.0
    }
}

/// Strictly greater: a pull of exactly `down2remove` snaps back.
pub fn removal_commits(ratio: f32, down2remove: f32) -> bool {
    down2remove > 0.0 && ratio > down2remove
}

#[derive(Debug, Clone)]
pub struct DragSession {
    origin: CarouselId,
    item: ItemId,
    start: (f32, f32),
    delta: (f32, f32),
    phase: DragPhase,
    removal_enabled: bool,
    thresholds: Thresholds,
    thumb_height: f32,
    /// Strip scroll the horizontal delta is measured from. Wraparound
    /// shifts it by whole thumbnails.
    scroll_anchor: f32,
    sampler: VelocitySampler,
    /// Carousel currently showing the drag clone.
    preview: Option<CarouselId>,
}

impl DragSession {
    #[allow(clippy::too_many_arguments)]
    pub fn begin(
        origin: CarouselId,
        item: ItemId,
        x: f32,
        y: f32,
        scroll: f32,
        thumb_height: f32,
        removal_enabled: bool,
        config: &CarouselConfig,
        now: Instant,
    ) -> Self {
        Self {
            origin,
            item,
            start: (x, y),
            delta: (0.0, 0.0),
            phase: DragPhase::Armed,
            removal_enabled,
            thresholds: Thresholds::from(config),
            thumb_height,
            scroll_anchor: scroll,
            sampler: VelocitySampler::new(&config.motion, x, now),
            preview: None,
        }
    }

    /// Applies a pointer move and returns the resulting phase.
    pub fn update(&mut self, x: f32, y: f32, now: Instant) -> DragPhase {
        self.delta = (x - self.start.0, y - self.start.1);
        self.sampler.record(x, now);
        self.phase = classify(
            self.phase,
            self.delta.0,
            self.delta.1,
            self.removal_enabled,
            &self.thresholds,
        );
        self.phase
    }

    /// Frame tick: keeps velocity sampling on schedule while the pointer
    /// rests.
    pub fn tick(&mut self, now: Instant) {
        self.sampler.tick(now);
    }

    /// Ends the gesture. An armed gesture becomes a tap.
    pub fn release(&mut self) -> DragPhase {
        if self.phase == DragPhase::Armed {
            self.phase = DragPhase::Tapped;
        }
        self.phase
    }

    pub fn origin(&self) -> CarouselId {
        self.origin
    }

    pub fn item(&self) -> ItemId {
        self.item
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn delta(&self) -> (f32, f32) {
        self.delta
    }

    pub fn removal_ratio(&self) -> f32 {
        removal_ratio(self.delta.1, self.thumb_height)
    }

    pub fn scroll_anchor(&self) -> f32 {
        self.scroll_anchor
    }

    pub fn set_scroll_anchor(&mut self, anchor: f32) {
        self.scroll_anchor = anchor;
    }

    pub fn velocity(&self) -> f32 {
        self.sampler.velocity()
    }

    pub fn preview(&self) -> Option<CarouselId> {
        self.preview
    }

    pub fn set_preview(&mut self, carousel: Option<CarouselId>) {
        self.preview = carousel;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t() -> Thresholds {
        Thresholds::default()
    }

    #[test]
    fn small_moves_stay_armed() {
        assert_eq!(classify(DragPhase::Armed, 3.0, 3.0, true, &t()), DragPhase::Armed);
        assert_eq!(
            classify(DragPhase::Armed, 6.0, 0.0, true, &t()),
            DragPhase::Scrolling { locked: false }
        );
    }

    #[test]
    fn vertical_pull_removes_only_when_enabled() {
        assert_eq!(classify(DragPhase::Armed, 2.0, 30.0, true, &t()), DragPhase::Removing);
        assert_eq!(
            classify(DragPhase::Armed, 2.0, 30.0, false, &t()),
            DragPhase::Scrolling { locked: false }
        );
    }

    #[test]
    fn diagonal_pull_transfers_and_sticks() {
        let phase = classify(DragPhase::Removing, 30.0, 50.0, true, &t());
        assert_eq!(phase, DragPhase::Transferring);
        assert_eq!(classify(phase, 0.0, 0.0, true, &t()), DragPhase::Transferring);
    }

    #[test]
    fn slide_lock_blocks_later_transfer() {
        let phase = classify(DragPhase::Armed, 15.0, 0.0, true, &t());
        assert_eq!(phase, DragPhase::Scrolling { locked: true });
        assert_eq!(classify(phase, 60.0, 90.0, true, &t()), phase);
    }

    #[test]
    fn ratio_boundary_does_not_commit() {
        let ratio = removal_ratio(-100.0, 200.0);
        assert_eq!(ratio, 0.5);
        assert!(!removal_commits(ratio, 0.5));
        assert!(removal_commits(removal_ratio(120.0, 200.0), 0.5));
        assert!(!removal_commits(0.9, 0.0));
    }

    #[test]
    fn release_while_armed_is_a_tap() {
        let now = Instant::now();
        let mut session = DragSession::begin(
            CarouselId(0),
            ItemId(1),
            10.0,
            10.0,
            0.0,
            200.0,
            true,
            &CarouselConfig::default(),
            now,
        );
        session.update(12.0, 11.0, now);
        assert_eq!(session.release(), DragPhase::Tapped);
    }
}
