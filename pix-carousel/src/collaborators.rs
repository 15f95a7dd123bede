//! Ingestion collaborators: page harvesting, image search, probing and
//! page scraping. Implementations live outside this crate.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IngestError {
    #[error("failed to load {0}")]
    LoadFailed(String),

    #[error("{src} is {width}x{height}, below the minimum size")]
    TooSmall { src: String, width: u32, height: u32 },

    #[error("nothing usable found at {0}")]
    NothingFound(String),

    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
}

/// Intrinsic size reported by a successful probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn at_least(&self, min_width: u32, min_height: u32) -> bool {
        self.width >= min_width && self.height >= min_height
    }
}

/// Representative content of a web page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScrapedPage {
    pub title: Option<String>,
    pub src: Option<String>,
}

/// Candidate sources for seeding an empty carousel.
#[async_trait]
pub trait Harvester: Send + Sync {
    /// Image sources found on the page at `url`.
    async fn harvest_page(&self, url: &str) -> Result<Vec<String>, IngestError>;

    /// Third-party image search for a plain topic.
    async fn search(&self, query: &str) -> Result<Vec<String>, IngestError>;
}

/// Loads a source far enough to learn its dimensions.
#[async_trait]
pub trait ImageProbe: Send + Sync {
    async fn probe(&self, src: &str) -> Result<Dimensions, IngestError>;
}

#[async_trait]
pub trait PageScraper: Send + Sync {
    async fn scrape(&self, url: &str) -> Result<ScrapedPage, IngestError>;
}

/// Collaborators shared by every carousel on a board.
#[derive(Clone)]
pub struct Collaborators {
    pub harvester: Arc<dyn Harvester>,
    pub probe: Arc<dyn ImageProbe>,
    pub scraper: Arc<dyn PageScraper>,
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

impl Collaborators {
    /// Collaborators that find nothing and fail every probe. Carousels
    /// still load and persist views; fills and includes come up empty.
    pub fn offline() -> Self {
        Self {
            harvester: Arc::new(Offline),
            probe: Arc::new(Offline),
            scraper: Arc::new(Offline),
        }
    }
}

#[derive(Debug)]
struct Offline;

#[async_trait]
impl Harvester for Offline {
    async fn harvest_page(&self, url: &str) -> Result<Vec<String>, IngestError> {
        Err(IngestError::Unavailable(format!("harvest {url}")))
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, IngestError> {
        Err(IngestError::Unavailable(format!("search {query}")))
    }
}

#[async_trait]
impl ImageProbe for Offline {
    async fn probe(&self, src: &str) -> Result<Dimensions, IngestError> {
        Err(IngestError::LoadFailed(src.to_owned()))
    }
}

#[async_trait]
impl PageScraper for Offline {
    async fn scrape(&self, url: &str) -> Result<ScrapedPage, IngestError> {
        Err(IngestError::NothingFound(url.to_owned()))
    }
}
