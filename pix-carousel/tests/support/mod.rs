#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use pix_carousel::{
    Board, CarouselConfig, CarouselId, Collaborators, Dimensions, Harvester,
    ImageProbe, IngestError, PageScraper, ScrapedPage,
};
use pix_core::ItemStore;
use pix_core::sync::{MemoryRemote, SyncEngine};
use pix_model::{
    Command, DEFAULT_COLLECTION, Item, ItemId, Record, UserId, View,
};

pub const USER: &str = "ann";

pub fn user() -> UserId {
    UserId::from(USER)
}

pub fn ids(raw: &[u64]) -> Vec<ItemId> {
    raw.iter().copied().map(ItemId).collect()
}

/// Square item (200px wide at the default height) owned by `owner`.
pub fn item(id: u64, owner: &str) -> Item {
    Item::image(format!("http://img.test/{id}.jpg"))
        .with_id(ItemId(id))
        .with_owner(UserId::from(owner))
}

#[derive(Debug, Default)]
pub struct FakeHarvester {
    pub sources: Vec<String>,
}

#[async_trait]
impl Harvester for FakeHarvester {
    async fn harvest_page(&self, _url: &str) -> Result<Vec<String>, IngestError> {
        Ok(self.sources.clone())
    }

    async fn search(&self, _query: &str) -> Result<Vec<String>, IngestError> {
        Ok(self.sources.clone())
    }
}

/// Answers probes from a table; unknown sources fail to load.
#[derive(Debug, Default)]
pub struct FakeProbe {
    pub sizes: HashMap<String, Dimensions>,
}

#[async_trait]
impl ImageProbe for FakeProbe {
    async fn probe(&self, src: &str) -> Result<Dimensions, IngestError> {
        self.sizes
            .get(src)
            .copied()
            .ok_or_else(|| IngestError::LoadFailed(src.to_owned()))
    }
}

#[derive(Debug, Default)]
pub struct FakeScraper {
    pub pages: HashMap<String, ScrapedPage>,
}

#[async_trait]
impl PageScraper for FakeScraper {
    async fn scrape(&self, url: &str) -> Result<ScrapedPage, IngestError> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| IngestError::NothingFound(url.to_owned()))
    }
}

#[derive(Debug, Default)]
pub struct Fixture {
    pub config: CarouselConfig,
    pub items: Vec<Item>,
    pub views: Vec<View>,
    pub harvester: FakeHarvester,
    pub probe: FakeProbe,
    pub scraper: FakeScraper,
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(mut self, items: impl IntoIterator<Item = Item>) -> Self {
        self.items.extend(items);
        self
    }

    /// Saved private view of the acting user.
    pub fn view(self, path: &str, items: &[u64]) -> Self {
        self.owned_view(path, USER, items)
    }

    pub fn owned_view(mut self, path: &str, owner: &str, items: &[u64]) -> Self {
        self.views
            .push(View::private(path, UserId::from(owner), ids(items)));
        self
    }

    pub fn config(mut self, config: CarouselConfig) -> Self {
        self.config = config;
        self
    }

    pub fn public_view(mut self, path: &str, items: &[u64]) -> Self {
        self.views.push(View::public(path, ids(items)));
        self
    }

    pub fn harvest(mut self, sources: &[&str]) -> Self {
        self.harvester.sources = sources.iter().map(|s| (*s).to_owned()).collect();
        self
    }

    pub fn probe(mut self, src: &str, width: u32, height: u32) -> Self {
        self.probe
            .sizes
            .insert(src.to_owned(), Dimensions::new(width, height));
        self
    }

    pub fn page(mut self, url: &str, title: &str, src: &str) -> Self {
        self.scraper.pages.insert(
            url.to_owned(),
            ScrapedPage {
                title: Some(title.to_owned()),
                src: Some(src.to_owned()),
            },
        );
        self
    }

    pub fn build(self) -> Harness {
        // Saved ids start well above anything a test seeds.
        let remote = Arc::new(MemoryRemote::starting_at(1000));
        remote.seed(DEFAULT_COLLECTION, self.items.into_iter().map(Record::from));
        let view_ids = (900..).map(ItemId);
        remote.seed(
            DEFAULT_COLLECTION,
            self.views
                .into_iter()
                .zip(view_ids)
                .map(|(view, id)| Record::from(view.with_id(id))),
        );
        let engine = Arc::new(SyncEngine::new(remote.clone()));
        engine.establish_session();
        let collaborators = Collaborators {
            harvester: Arc::new(self.harvester),
            probe: Arc::new(self.probe),
            scraper: Arc::new(self.scraper),
        };
        let board = Board::new(
            self.config,
            engine,
            ItemStore::new(),
            collaborators,
            user(),
        );
        Harness { board, remote }
    }
}

#[derive(Debug)]
pub struct Harness {
    pub board: Board,
    pub remote: Arc<MemoryRemote>,
}

impl Harness {
    /// Adds a carousel showing `path` and settles its loading.
    pub async fn carousel(&mut self, path: &str) -> CarouselId {
        let id = self.board.add_carousel();
        let task = self.board.with_carousel(id, |c| {
            c.set_viewport(800.0);
            c.load_view(path, None)
        });
        self.board.settle(task).await;
        id
    }

    pub fn ids(&self, id: CarouselId) -> Vec<ItemId> {
        self.board
            .carousel(id)
            .map(|c| c.get_ids())
            .unwrap_or_default()
    }

    pub fn take_commands(&self) -> Vec<Command> {
        self.remote.take_commands()
    }
}

pub fn updates(commands: &[Command]) -> Vec<(ItemId, Vec<ItemId>)> {
    commands
        .iter()
        .filter_map(|command| match command {
            Command::Update { id, set, .. } => {
                Some((*id, set.items.clone().unwrap_or_default()))
            }
            _ => None,
        })
        .collect()
}

pub fn saved_views(commands: &[Command]) -> Vec<View> {
    commands
        .iter()
        .filter_map(|command| match command {
            Command::Save { item, .. } => item.as_view().cloned(),
            _ => None,
        })
        .collect()
}

pub fn saved_items(commands: &[Command]) -> Vec<Item> {
    commands
        .iter()
        .filter_map(|command| match command {
            Command::Save { item, .. } => item.as_item().cloned(),
            _ => None,
        })
        .collect()
}
