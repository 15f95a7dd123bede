//! Pointer gesture handling for carousel thumbnails.

pub mod coasting;
pub mod session;
pub mod velocity;

pub use coasting::Coaster;
pub use session::{
    DragPhase, DragSession, Thresholds, classify, removal_ratio, removal_commits,
};
pub use velocity::VelocitySampler;
