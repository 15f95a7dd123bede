//! Continuations delivered back to a carousel when deferred work resolves.

use pix_model::{ItemId, Response, ThumbKey, View};

use crate::collaborators::{Dimensions, IngestError, ScrapedPage};
use crate::controller::CarouselId;

#[derive(Debug, Clone)]
pub enum CarouselMessage {
    // Persistence
    /// Reply to the save issued as `generation`.
    ViewSaved {
        generation: u64,
        response: Response,
    },
    ViewUpdated {
        items: Vec<ItemId>,
        response: Response,
    },
    PublicRefreshed(Response),

    // View resolution
    PrivateViewLoaded {
        path: String,
        response: Response,
    },
    PublicViewLoaded {
        path: String,
        response: Response,
    },
    /// Items missing from the store were preloaded for `view`.
    ViewReady {
        view: View,
        bind: bool,
        response: Response,
    },
    RecentLoaded(Response),
    PrependReady(Option<View>),

    // Fill
    Harvested {
        batch: u64,
        result: Result<Vec<String>, IngestError>,
    },
    FillProbed {
        batch: u64,
        src: String,
        result: Result<Dimensions, IngestError>,
    },
    FillSaved {
        batch: u64,
        response: Response,
    },

    // Include
    IncludeProbed {
        key: ThumbKey,
        result: Result<Dimensions, IngestError>,
    },
    IncludeScraped {
        key: ThumbKey,
        result: Result<ScrapedPage, IngestError>,
    },
    IncludeSaved {
        key: ThumbKey,
        response: Response,
    },
}

/// Carousel messages addressed through the board.
#[derive(Debug, Clone)]
pub enum BoardMessage {
    Carousel(CarouselId, CarouselMessage),
}
