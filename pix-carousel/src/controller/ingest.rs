use log::{debug, info, warn};
use pix_core::CoreError;
use pix_core::sources::{
    checked_source, format_url, full_resolution_url, kind_for_source,
    skips_probe, unwrap_search_link, with_scheme,
};
use pix_model::{Item, ItemId, ItemKind, Record, Response, ThumbKey};

use super::{CarouselController, FillBatch, PendingInclude};
use crate::collaborators::{Dimensions, IngestError, ScrapedPage};
use crate::messages::CarouselMessage;
use crate::task::Task;

impl CarouselController {
    /// Seeds the carousel from `path`: harvests candidate sources, probes
    /// the first `collector.limit` of them and saves those meeting the
    /// minimum size. The order is persisted once every probe has settled.
    ///
    /// A no-op while another fill is running.
    pub fn fill(&mut self, path: &str) -> Task<CarouselMessage> {
        if self.fill.is_some() {
            debug!("{}: fill already running", self.id);
            return Task::none();
        }
        let config = &self.shared.config;
        let is_url = path.starts_with("http://") || path.starts_with("https://");
        let harvester = self.shared.collaborators.harvester.clone();
        let query = path.to_owned();
        let harvest = if config.preload_local && is_url {
            Task::perform(
                async move { harvester.harvest_page(&query).await },
                |result| result,
            )
        } else if config.preload_search {
            Task::perform(
                async move { harvester.search(&query).await },
                |result| result,
            )
        } else {
            debug!("{}: no source enabled to fill {path}", self.id);
            return Task::none();
        };

        self.fill_batches += 1;
        let batch = self.fill_batches;
        self.fill = Some(FillBatch {
            id: batch,
            path: path.to_owned(),
            remaining: 0,
        });
        harvest.map(move |result| CarouselMessage::Harvested { batch, result })
    }

    pub(crate) fn on_harvested(
        &mut self,
        batch: u64,
        result: Result<Vec<String>, IngestError>,
    ) -> Task<CarouselMessage> {
        let Some(fill) = self.fill.as_mut().filter(|fill| fill.id == batch) else {
            return Task::none();
        };
        let sources = match result {
            Ok(sources) => sources,
            Err(err) => {
                warn!("{}: harvesting {} failed: {err}", self.id, fill.path);
                self.fill = None;
                return Task::none();
            }
        };

        let mut candidates: Vec<String> = Vec::new();
        for src in sources {
            let src = with_scheme(&full_resolution_url(&src));
            if !candidates.contains(&src) {
                candidates.push(src);
            }
        }
        candidates.truncate(self.shared.config.collector.limit);
        fill.remaining = candidates.len();
        info!(
            "{}: probing {} candidates for {}",
            self.id,
            candidates.len(),
            fill.path
        );

        self.view.replace_all(std::iter::empty());
        self.strip.reset();
        if candidates.is_empty() {
            return self.finish_fill();
        }

        let gateway = self.shared.config.ipfs_gateway.clone();
        Task::batch(candidates.into_iter().map(|src| {
            let probe = self.shared.collaborators.probe.clone();
            let url = format_url(&src, &gateway);
            Task::perform(async move { probe.probe(&url).await }, move |result| {
                CarouselMessage::FillProbed { batch, src, result }
            })
        }))
    }

    pub(crate) fn on_fill_probed(
        &mut self,
        batch: u64,
        src: String,
        result: Result<Dimensions, IngestError>,
    ) -> Task<CarouselMessage> {
        let Some(fill) = self.fill.as_ref().filter(|fill| fill.id == batch) else {
            return Task::none();
        };
        let collector = &self.shared.config.collector;
        let dims = match result {
            Ok(dims) if dims.at_least(collector.min_width, collector.min_height) => {
                dims
            }
            Ok(dims) => {
                debug!(
                    "{}: {src} too small ({}x{})",
                    self.id, dims.width, dims.height
                );
                return self.settle_candidate();
            }
            Err(err) => {
                debug!("{}: candidate failed: {err}", self.id);
                return self.settle_candidate();
            }
        };

        let item = Item::image(src)
            .with_path(fill.path.clone())
            .with_owner(self.shared.user.clone())
            .with_dimensions(dims.width, dims.height);
        let reply = self.shared.engine.save(item);
        Task::perform(reply, move |response| CarouselMessage::FillSaved {
            batch,
            response,
        })
    }

    pub(crate) fn on_fill_saved(
        &mut self,
        batch: u64,
        response: Response,
    ) -> Task<CarouselMessage> {
        if !self.fill.as_ref().is_some_and(|fill| fill.id == batch) {
            return Task::none();
        }
        if let Some(id) = response
            .item
            .and_then(Record::into_item)
            .and_then(|item| self.shared.store.insert(item))
        {
            self.view.append(id);
        }
        self.settle_candidate()
    }

    /// Counts one candidate as done, finishing the fill at zero.
    fn settle_candidate(&mut self) -> Task<CarouselMessage> {
        let Some(fill) = self.fill.as_mut() else {
            return Task::none();
        };
        fill.remaining = fill.remaining.saturating_sub(1);
        if fill.remaining == 0 {
            self.finish_fill()
        } else {
            Task::none()
        }
    }

    fn finish_fill(&mut self) -> Task<CarouselMessage> {
        if let Some(fill) = self.fill.take() {
            info!(
                "{}: fill of {} finished with {} items",
                self.id,
                fill.path,
                self.view.len()
            );
        }
        self.update_view()
    }

    /// Adds `url` before `anchor` (appended when `None`): probes it for
    /// dimensions, saves the item and persists the order.
    ///
    /// When the probe fails the source is treated as a web page. The scraper
    /// supplies a representative image that gets one more probe. Thumbnails
    /// already showing the same source are removed first.
    pub fn include(
        &mut self,
        url: &str,
        anchor: Option<ItemId>,
    ) -> Result<Task<CarouselMessage>, CoreError> {
        let src = checked_source(&unwrap_search_link(url.trim()))?;

        let duplicates: Vec<ItemId> = self
            .view
            .to_ordered_ids()
            .into_iter()
            .filter(|id| {
                self.shared.store.get(*id).is_some_and(|item| item.src == src)
            })
            .collect();
        for id in duplicates {
            self.release_lead(id);
            self.view.remove(id);
        }

        let mut item = Item::new(src.clone(), kind_for_source(&src))
            .with_path(self.view.path())
            .with_owner(self.shared.user.clone());
        item.href = Some(self.view.path().to_owned());
        item.validate()?;

        let key = ThumbKey::new();
        let skip_probe = item.kind == ItemKind::Embed
            || skips_probe(&src, &self.shared.config.skip_probe_hosts);
        self.pending.insert(key, PendingInclude { item, anchor });

        if skip_probe {
            debug!("{}: saving {src} without probe", self.id);
            return Ok(self.save_include(key));
        }
        Ok(self.probe_include(key, &src))
    }

    fn probe_include(&self, key: ThumbKey, src: &str) -> Task<CarouselMessage> {
        let probe = self.shared.collaborators.probe.clone();
        let url = format_url(src, &self.shared.config.ipfs_gateway);
        Task::perform(async move { probe.probe(&url).await }, move |result| {
            CarouselMessage::IncludeProbed { key, result }
        })
    }

    fn save_include(&mut self, key: ThumbKey) -> Task<CarouselMessage> {
        let Some(pending) = self.pending.get(&key) else {
            return Task::none();
        };
        if let Err(err) = pending.item.validate() {
            warn!("{}: not saving {}: {err}", self.id, pending.item.src);
            self.pending.remove(&key);
            return Task::none();
        }
        let reply = self.shared.engine.save(pending.item.clone());
        Task::perform(reply, move |response| CarouselMessage::IncludeSaved {
            key,
            response,
        })
    }

    pub(crate) fn on_include_probed(
        &mut self,
        key: ThumbKey,
        result: Result<Dimensions, IngestError>,
    ) -> Task<CarouselMessage> {
        let Some(pending) = self.pending.get_mut(&key) else {
            return Task::none();
        };
        match result {
            Ok(dims) => {
                pending.item.width = Some(dims.width);
                pending.item.height = Some(dims.height);
                self.save_include(key)
            }
            Err(err) if pending.item.kind == ItemKind::Link => {
                warn!("{}: unable to load {}: {err}", self.id, pending.item.src);
                self.pending.remove(&key);
                Task::none()
            }
            Err(err) => {
                debug!(
                    "{}: {} is not an image ({err}), scraping",
                    self.id, pending.item.src
                );
                pending.item.kind = ItemKind::Link;
                pending.item.link = Some(pending.item.src.clone());
                let scraper = self.shared.collaborators.scraper.clone();
                let url = pending.item.src.clone();
                Task::perform(
                    async move { scraper.scrape(&url).await },
                    move |result| CarouselMessage::IncludeScraped { key, result },
                )
            }
        }
    }

    pub(crate) fn on_include_scraped(
        &mut self,
        key: ThumbKey,
        result: Result<ScrapedPage, IngestError>,
    ) -> Task<CarouselMessage> {
        let Some(pending) = self.pending.get_mut(&key) else {
            return Task::none();
        };
        let page = match result {
            Ok(ScrapedPage { title, src: Some(src) }) => (title, src),
            Ok(_) | Err(_) => {
                warn!(
                    "{}: unable to find an image in {}",
                    self.id, pending.item.src
                );
                self.pending.remove(&key);
                return Task::none();
            }
        };
        let (title, src) = page;
        let src = with_scheme(&src);
        pending.item.title = title;
        pending.item.src = src.clone();
        self.probe_include(key, &src)
    }

    pub(crate) fn on_include_saved(
        &mut self,
        key: ThumbKey,
        response: Response,
    ) -> Task<CarouselMessage> {
        let Some(pending) = self.pending.remove(&key) else {
            return Task::none();
        };
        let Some(id) = response
            .item
            .and_then(Record::into_item)
            .and_then(|item| self.shared.store.insert(item))
        else {
            warn!("{}: include of {} was not saved", self.id, pending.item.src);
            return Task::none();
        };
        let anchor = pending.anchor.filter(|anchor| self.view.contains(*anchor));
        if !self.view.insert_before(id, anchor) {
            return Task::none();
        }
        info!("{}: included {}", self.id, pending.item.src);
        self.update_view()
    }
}
