//! Per-carousel options, loadable from TOML or JSON.

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read carousel config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid carousel config {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Velocity sampling and coasting.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MotionConfig {
    pub sample_interval_ms: u64,
    /// Weight of the newest sample; the previous estimate keeps the rest.
    pub smoothing: f32,
    pub velocity_scale: f32,
    pub time_constant_ms: u64,
    /// Coasting stops once a tick would move less than this (px).
    pub min_delta: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: constants::motion::SAMPLE_INTERVAL_MS,
            smoothing: constants::motion::SMOOTHING,
            velocity_scale: constants::motion::VELOCITY_SCALE,
            time_constant_ms: constants::motion::TIME_CONSTANT_MS,
            min_delta: constants::motion::MIN_DELTA,
        }
    }
}

impl MotionConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }
}

/// Filters for seeding an empty carousel.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub limit: usize,
    pub min_width: u32,
    pub min_height: u32,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            limit: constants::collector::LIMIT,
            min_width: constants::collector::MIN_WIDTH,
            min_height: constants::collector::MIN_HEIGHT,
        }
    }
}

/// Options recognized by a carousel.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CarouselConfig {
    /// Wrap thumbnails around while drag-scrolling.
    pub allow_patterns: bool,
    /// Removal threshold as a fraction of thumbnail height. Zero disables
    /// vertical removal.
    pub down2remove: f32,
    pub take_off_limit: f32,
    pub slide_limit: f32,
    pub transfer_dy: f32,
    pub transfer_dx: f32,
    /// Disables the edge-wrap fallback while coasting.
    pub infinite: bool,
    pub fetch_limit: usize,
    /// Harvest images from the page when the path is a URL.
    pub preload_local: bool,
    /// Fall back to image search for plain topics.
    pub preload_search: bool,
    pub height: f32,
    pub thumb_gap: f32,
    pub motion: MotionConfig,
    pub collector: CollectorConfig,
    pub ipfs_gateway: String,
    pub skip_probe_hosts: Vec<String>,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            allow_patterns: false,
            down2remove: constants::drag::DOWN_TO_REMOVE,
            take_off_limit: constants::drag::TAKE_OFF_LIMIT,
            slide_limit: constants::drag::SLIDE_LIMIT,
            transfer_dy: constants::drag::TRANSFER_DY,
            transfer_dx: constants::drag::TRANSFER_DX,
            infinite: true,
            fetch_limit: constants::loading::FETCH_LIMIT,
            preload_local: true,
            preload_search: true,
            height: constants::layout::HEIGHT,
            thumb_gap: constants::layout::THUMB_GAP,
            motion: MotionConfig::default(),
            collector: CollectorConfig::default(),
            ipfs_gateway: constants::sources::IPFS_GATEWAY.to_owned(),
            skip_probe_hosts: constants::sources::SKIP_PROBE_HOSTS
                .iter()
                .map(|host| (*host).to_owned())
                .collect(),
        }
    }
}

impl CarouselConfig {
    /// Env var naming a config file to load.
    pub const PATH_ENV: &'static str = "PIX_CAROUSEL_CONFIG";

    /// `$PIX_CAROUSEL_CONFIG` when set, otherwise defaults.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        match env::var(Self::PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => {
                Self::load_from_file(Path::new(&path))
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let origin = path.display().to_string();
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&contents).map_err(|err| {
                ConfigError::Parse {
                    origin: origin.clone(),
                    message: err.to_string(),
                }
            })?,
            _ => Self::parse_toml(&contents, &origin)?,
        };
        config.validated()
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Self::parse_toml(contents, "<inline>")?.validated()
    }

    fn parse_toml(contents: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|err| ConfigError::Parse {
            origin: origin.to_owned(),
            message: err.to_string(),
        })
    }

    /// Rejects values the gesture and motion code cannot work with.
    pub fn validated(self) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&self.down2remove) {
            return Err(ConfigError::Invalid {
                field: "down2remove",
                reason: format!("{} is outside [0, 1]", self.down2remove),
            });
        }
        let positive = [
            ("take_off_limit", self.take_off_limit),
            ("slide_limit", self.slide_limit),
            ("transfer_dy", self.transfer_dy),
            ("transfer_dx", self.transfer_dx),
            ("height", self.height),
            ("motion.min_delta", self.motion.min_delta),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} must be positive"),
                });
            }
        }
        if self.thumb_gap < 0.0 {
            return Err(ConfigError::Invalid {
                field: "thumb_gap",
                reason: "must not be negative".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.motion.smoothing) {
            return Err(ConfigError::Invalid {
                field: "motion.smoothing",
                reason: format!("{} is outside [0, 1]", self.motion.smoothing),
            });
        }
        if self.motion.time_constant_ms == 0 || self.motion.sample_interval_ms == 0
        {
            return Err(ConfigError::Invalid {
                field: "motion",
                reason: "intervals must be non-zero".into(),
            });
        }
        Ok(self)
    }

    /// Vertical removal is on at all.
    pub fn removal_enabled(&self) -> bool {
        self.down2remove > 0.0
    }

    pub fn time_constant(&self) -> Duration {
        Duration::from_millis(self.motion.time_constant_ms)
    }
}
