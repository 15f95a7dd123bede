//! Carousel constants
//!
//! Compiled defaults for every carousel option. `CarouselConfig` starts from
//! these; tuning that should apply everywhere happens here.

/// Gesture classification thresholds, in pixels.
pub mod drag {
    /// Displacement that arms a drag; anything less is a tap.
    pub const TAKE_OFF_LIMIT: f32 = 5.0;
    /// Horizontal travel that locks a gesture into scrolling.
    pub const SLIDE_LIMIT: f32 = 10.0;
    /// Vertical travel that signals intent to carry the thumbnail away.
    pub const TRANSFER_DY: f32 = 40.0;
    /// Horizontal travel that confirms a transfer.
    pub const TRANSFER_DX: f32 = 24.0;
    /// Fraction of the thumbnail height a vertical drag must exceed to remove.
    pub const DOWN_TO_REMOVE: f32 = 0.5;
}

/// Velocity sampling and momentum after release.
pub mod motion {
    /// Interval between velocity samples (ms).
    pub const SAMPLE_INTERVAL_MS: u64 = 50;
    /// Weight of the newest sample in the smoothed velocity.
    pub const SMOOTHING: f32 = 0.8;
    /// Scale from px/ms to per-frame scroll amplitude.
    pub const VELOCITY_SCALE: f32 = 30.0;
    /// Decay time constant of coasting (ms).
    pub const TIME_CONSTANT_MS: u64 = 325;
    /// Per-tick delta below which coasting stops (px).
    pub const MIN_DELTA: f32 = 0.7;
}

/// Snap-back of a cancelled removal.
pub mod snap {
    pub const DURATION_MS: u64 = 200;
    /// Easing kind: 0=Linear, 1=EaseIn, 2=EaseOut, 3=EaseInOut.
    pub const EASING_KIND: u8 = 2;
}

/// Strip geometry.
pub mod layout {
    /// Default thumbnail height (px).
    pub const HEIGHT: f32 = 200.0;
    /// Gap between neighbouring thumbnails (px).
    pub const THUMB_GAP: f32 = 1.0;
    /// Aspect ratio used before an item's dimensions are known.
    pub const DEFAULT_ASPECT: f32 = 1.0;
}

/// Seeding an empty carousel.
pub mod collector {
    /// Candidates probed per fill.
    pub const LIMIT: usize = 12;
    pub const MIN_WIDTH: u32 = 100;
    pub const MIN_HEIGHT: u32 = 100;
}

/// Loading views and listings.
pub mod loading {
    /// Ids pulled from another view by a prepend.
    pub const FETCH_LIMIT: usize = 8;
    /// Items shown by a recent-items listing.
    pub const RECENT_LIMIT: usize = 32;
}

/// Source handling.
pub mod sources {
    pub const IPFS_GATEWAY: &str = "http://127.0.0.1:8080/ipfs/";
    /// Hosts whose sources are saved without a dimension probe.
    pub const SKIP_PROBE_HOSTS: [&str; 4] =
        ["ggif.co", "th.ai", "youtu.be", "youtube.com"];
}
