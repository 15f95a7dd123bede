//! Pix carousel interaction
//!
//! Drag gestures, momentum scrolling and the per-carousel controllers that
//! turn them into view mutations persisted through `pix-core`.
//!
//! Notes
//! - Controllers never block or await; follow-up work comes back as a
//!   [`task::Task`] to be driven by the host (or [`board::Board::settle`]).
//! - All time-dependent APIs take an explicit `Instant`.
//! - The `pix-replay` binary replays recorded pointer traces against an
//!   in-memory board.

pub mod animator;
pub mod board;
pub mod collaborators;
pub mod config;
pub mod constants;
pub mod controller;
pub mod drag;
pub mod messages;
pub mod strip;
pub mod task;

pub use board::{Board, DragOutcome};
pub use collaborators::{
    Collaborators, Dimensions, Harvester, ImageProbe, IngestError, PageScraper,
    ScrapedPage,
};
pub use config::{CarouselConfig, ConfigError};
pub use controller::{CarouselController, CarouselId, TapAction};
pub use drag::DragPhase;
pub use messages::{BoardMessage, CarouselMessage};
pub use task::Task;
