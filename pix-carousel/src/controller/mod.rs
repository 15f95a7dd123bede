//! Per-carousel orchestration: view model, strip, motion and persistence.
//!
//! A [`CarouselController`] never awaits. Operations that need the remote
//! store or a collaborator return a [`Task`] whose messages are fed back
//! through [`CarouselController::update`].

mod ingest;
mod loading;
mod persist;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use log::debug;
use pix_core::sources::parse_video_url;
use pix_core::sync::SyncEngine;
use pix_core::{ItemStore, ViewModel};
use pix_model::{Item, ItemId, ItemKind, ThumbKey, UserId};

use crate::animator::SnapAnimator;
use crate::collaborators::Collaborators;
use crate::config::CarouselConfig;
use crate::drag::Coaster;
use crate::messages::CarouselMessage;
use crate::strip::Strip;
use crate::task::Task;

pub use loading::fetch_view;

/// Board-assigned carousel handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CarouselId(pub usize);

impl fmt::Display for CarouselId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "carousel#{}", self.0)
    }
}

/// What a tap on a thumbnail asks the host to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapAction {
    /// Open the linked page.
    Open(String),
    /// Start the embedded player at this URL.
    Play(String),
    Focus(ItemId),
}

/// Everything a controller shares with its siblings on a board.
#[derive(Clone)]
pub struct Shared {
    pub config: Arc<CarouselConfig>,
    pub engine: Arc<SyncEngine>,
    pub store: ItemStore,
    pub collaborators: Collaborators,
    pub user: UserId,
}

impl fmt::Debug for Shared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("user", &self.user)
            .field("items", &self.store.len())
            .finish_non_exhaustive()
    }
}

/// An include waiting on a probe, scrape or save.
#[derive(Debug, Clone)]
pub(crate) struct PendingInclude {
    item: Item,
    anchor: Option<ItemId>,
}

/// In-flight fill. Each candidate decrements `remaining` exactly once.
#[derive(Debug, Clone)]
pub(crate) struct FillBatch {
    id: u64,
    path: String,
    remaining: usize,
}

#[derive(Debug)]
pub struct CarouselController {
    id: CarouselId,
    shared: Shared,
    view: ViewModel,
    strip: Strip,
    coaster: Option<Coaster>,
    snap: SnapAnimator,
    /// Vertical offset of the thumbnail being pulled for removal.
    margin: Option<(ItemId, f32)>,
    fill: Option<FillBatch>,
    fill_batches: u64,
    pending: HashMap<ThumbKey, PendingInclude>,
    /// Generation of the view save in flight; later mutations wait for its
    /// id. Replies carrying another generation are stale.
    saving: Option<u64>,
    save_generation: u64,
    resave: bool,
    title: Option<String>,
}

impl CarouselController {
    pub fn new(id: CarouselId, shared: Shared) -> Self {
        let strip = Strip::new(shared.config.height, shared.config.thumb_gap);
        Self {
            id,
            shared,
            view: ViewModel::new(""),
            strip,
            coaster: None,
            snap: SnapAnimator::new(),
            margin: None,
            fill: None,
            fill_batches: 0,
            pending: HashMap::new(),
            saving: None,
            save_generation: 0,
            resave: false,
            title: None,
        }
    }

    pub fn id(&self) -> CarouselId {
        self.id
    }

    pub fn config(&self) -> &CarouselConfig {
        &self.shared.config
    }

    pub fn user(&self) -> &UserId {
        &self.shared.user
    }

    pub fn view_model(&self) -> &ViewModel {
        &self.view
    }

    pub(crate) fn view_model_mut(&mut self) -> &mut ViewModel {
        &mut self.view
    }

    pub fn strip(&self) -> &Strip {
        &self.strip
    }

    pub fn path(&self) -> &str {
        self.view.path()
    }

    /// Page title attached to views saved for URL paths.
    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }

    pub fn set_viewport(&mut self, width: f32) {
        self.strip.set_viewport(width);
    }

    /// True while a fill is harvesting or probing.
    pub fn is_loading(&self) -> bool {
        self.fill.is_some()
    }

    pub fn pending_includes(&self) -> usize {
        self.pending.len()
    }

    /// Shows already-saved items at the end of the strip without persisting.
    /// Unsaved items are skipped.
    pub fn load(&mut self, items: Vec<Item>) -> usize {
        let mut added = 0;
        for item in items {
            match self.shared.store.insert(item) {
                Some(id) => {
                    if self.view.append(id) {
                        added += 1;
                    }
                }
                None => debug!("{}: skipped unsaved item in load", self.id),
            }
        }
        added
    }

    /// Removes every thumbnail of `id` and persists the new order.
    pub fn remove(&mut self, id: ItemId) -> Task<CarouselMessage> {
        let ids = self.view.ids();
        self.strip.release_lead(id, &ids);
        if self.margin.is_some_and(|(item, _)| item == id) {
            self.margin = None;
        }
        let removed = self.view.remove(id);
        if removed == 0 {
            return Task::none();
        }
        debug!("{}: removed {id} ({removed} thumbnails)", self.id);
        self.update_view()
    }

    /// Items in persisted order.
    pub fn list(&self) -> Vec<Item> {
        self.view
            .to_ordered_ids()
            .into_iter()
            .filter_map(|id| self.shared.store.get(id))
            .collect()
    }

    pub fn get_ids(&self) -> Vec<ItemId> {
        self.view.to_ordered_ids()
    }

    /// Thumbnails in drawn order, drag clones included.
    pub fn drawn_ids(&self) -> Vec<ItemId> {
        self.strip.project(&self.view.ids())
    }

    pub fn tap(&self, id: ItemId) -> TapAction {
        let Some(item) = self.shared.store.get(id) else {
            return TapAction::Focus(id);
        };
        match item.kind {
            ItemKind::Link => TapAction::Open(item.link.unwrap_or(item.src)),
            ItemKind::Embed => TapAction::Play(
                parse_video_url(&item.src)
                    .map(|video| video.embed_url())
                    .unwrap_or(item.src),
            ),
            ItemKind::Image | ItemKind::Uploading => TapAction::Focus(id),
        }
    }

    // Gesture support

    pub fn thumb_at(&self, x: f32) -> Option<ItemId> {
        self.strip.hit_test(x, &self.view.ids(), &self.shared.store)
    }

    pub fn insertion_anchor(&self, x: f32, dragged: ItemId) -> Option<ItemId> {
        self.strip.insertion_anchor(
            x,
            &self.view.to_ordered_ids(),
            &self.shared.store,
            dragged,
        )
    }

    /// Vertical removal is allowed for `id` here.
    pub fn removal_enabled(&self, id: ItemId) -> bool {
        self.shared.config.removal_enabled()
            && !self.view.is_detached()
            && self.owns(id)
    }

    /// The acting user owns the item.
    pub fn owns(&self, id: ItemId) -> bool {
        self.shared
            .store
            .get(id)
            .is_some_and(|item| item.is_owned_by(&self.shared.user))
    }

    /// Drag-scrolls relative to `anchor`, returning the wrapped anchor.
    pub fn drag_scroll(&mut self, anchor: f32, delta_x: f32) -> f32 {
        let ids = self.view.ids();
        self.strip.drag_to(
            anchor,
            delta_x,
            self.shared.config.allow_patterns,
            &ids,
            &self.shared.store,
        )
    }

    pub fn show_preview(&mut self, id: ItemId, anchor: Option<ItemId>) {
        self.view.clear_transient();
        self.view.insert_transient(id, anchor);
    }

    pub fn clear_preview(&mut self) {
        self.view.clear_transient();
    }

    pub fn margin(&self) -> Option<(ItemId, f32)> {
        self.margin
    }

    pub fn set_margin(&mut self, id: ItemId, dy: f32) {
        self.snap.cancel();
        self.margin = Some((id, dy));
    }

    pub fn clear_margin(&mut self) {
        self.snap.cancel();
        self.margin = None;
    }

    /// Animates a cancelled removal back to rest.
    pub fn snap_back(&mut self, now: Instant) {
        if let Some((_, dy)) = self.margin {
            self.snap.snap_back(dy, now);
        }
    }

    /// Moves `id` before `anchor` in place and persists once if the order
    /// changed.
    pub fn reorder(
        &mut self,
        id: ItemId,
        anchor: Option<ItemId>,
    ) -> Option<Task<CarouselMessage>> {
        self.view.clear_transient();
        let ids = self.view.ids();
        let lead = self.strip.lead();
        self.strip.release_lead(id, &ids);
        if !self.view.move_within(id, anchor) {
            self.strip.set_lead(lead);
            return None;
        }
        Some(self.update_view())
    }

    pub(crate) fn release_lead(&mut self, id: ItemId) {
        let ids = self.view.ids();
        self.strip.release_lead(id, &ids);
    }

    // Motion

    /// Starts coasting; `false` when the velocity is negligible.
    pub fn coast(&mut self, amplitude: f32, now: Instant) -> bool {
        self.coaster = Coaster::launch(amplitude, &self.shared.config.motion, now);
        self.coaster.is_some()
    }

    pub fn is_coasting(&self) -> bool {
        self.coaster.is_some()
    }

    /// Explicit stop flag; also raised by a new gesture on this carousel.
    pub fn stop(&mut self) {
        if let Some(coaster) = &mut self.coaster {
            coaster.stop();
        }
        self.coaster = None;
    }

    /// Animation frame. Returns whether anything is still moving.
    pub fn frame(&mut self, now: Instant) -> bool {
        if let Some(coaster) = &mut self.coaster {
            match coaster.tick(now) {
                Some(delta) => {
                    let ids = self.view.ids();
                    self.strip.scroll_by(
                        delta,
                        self.shared.config.infinite,
                        &ids,
                        &self.shared.store,
                    );
                }
                None => self.coaster = None,
            }
        }
        if let Some(offset) = self.snap.tick(now) {
            if let Some((_, dy)) = &mut self.margin {
                *dy = offset;
            }
            if !self.snap.is_active() {
                self.margin = None;
            }
        }
        self.coaster.is_some() || self.snap.is_active()
    }

    pub fn update(&mut self, message: CarouselMessage) -> Task<CarouselMessage> {
        match message {
            CarouselMessage::ViewSaved {
                generation,
                response,
            } => self.on_view_saved(generation, response),
            CarouselMessage::ViewUpdated { items, response } => {
                self.on_view_updated(items, response)
            }
            CarouselMessage::PublicRefreshed(response) => {
                debug!(
                    "{}: public view refreshed ({})",
                    self.id,
                    if response.is_empty() { "empty" } else { "ok" }
                );
                Task::none()
            }
            CarouselMessage::PrivateViewLoaded { path, response } => {
                self.on_private_view(path, response)
            }
            CarouselMessage::PublicViewLoaded { path, response } => {
                self.on_public_view(path, response)
            }
            CarouselMessage::ViewReady {
                view,
                bind,
                response,
            } => self.on_view_ready(view, bind, response),
            CarouselMessage::RecentLoaded(response) => {
                self.on_recent(response);
                Task::none()
            }
            CarouselMessage::PrependReady(view) => self.on_prepend(view),
            CarouselMessage::Harvested { batch, result } => {
                self.on_harvested(batch, result)
            }
            CarouselMessage::FillProbed { batch, src, result } => {
                self.on_fill_probed(batch, src, result)
            }
            CarouselMessage::FillSaved { batch, response } => {
                self.on_fill_saved(batch, response)
            }
            CarouselMessage::IncludeProbed { key, result } => {
                self.on_include_probed(key, result)
            }
            CarouselMessage::IncludeScraped { key, result } => {
                self.on_include_scraped(key, result)
            }
            CarouselMessage::IncludeSaved { key, response } => {
                self.on_include_saved(key, response)
            }
        }
    }
}
