use std::sync::Arc;

use log::{debug, info};
use pix_core::ItemStore;
use pix_core::paths::{TagOwner, normalize_path, parse_tag};
use pix_core::sync::SyncEngine;
use pix_model::{Filter, Record, Response, UserId, View};

use super::CarouselController;
use crate::constants::loading::RECENT_LIMIT;
use crate::messages::CarouselMessage;
use crate::task::Task;

/// Resolves the view for `path`: `owner`'s private view, else the public
/// one. Items the store lacks are preloaded before returning.
pub async fn fetch_view(
    engine: Arc<SyncEngine>,
    store: ItemStore,
    path: String,
    owner: UserId,
) -> Option<View> {
    let private = engine.get(Filter::view(path.clone(), owner)).await;
    let view = match private.item.and_then(Record::into_view) {
        Some(view) => view,
        None => engine
            .get(Filter::public(path))
            .await
            .item
            .and_then(Record::into_view)?,
    };
    let missing = store.missing(&view.items);
    if !missing.is_empty() {
        let loaded = engine.load(Filter::by_ids(missing), None).await;
        store.merge_response(&loaded);
    }
    Some(view)
}

impl CarouselController {
    /// Clears the strip and resolves `path`: private view of `owner` (the
    /// acting user when `None`), then the public view, then a fill.
    pub fn load_view(
        &mut self,
        path: &str,
        owner: Option<UserId>,
    ) -> Task<CarouselMessage> {
        let path = normalize_path(path);
        let owner = owner.unwrap_or_else(|| self.shared.user.clone());
        self.reset_to(&path, Some(owner.clone()));
        debug!("{}: loading view {path}@{owner}", self.id);

        let reply = self.shared.engine.get(Filter::view(path.clone(), owner));
        Task::perform(reply, move |response| {
            CarouselMessage::PrivateViewLoaded { path, response }
        })
    }

    /// Clears the strip and shows the public view for `path`, filling when
    /// there is none.
    pub fn load_public(&mut self, path: &str) -> Task<CarouselMessage> {
        let path = normalize_path(path);
        self.reset_to(&path, None);
        self.request_public(path)
    }

    fn request_public(&self, path: String) -> Task<CarouselMessage> {
        let reply = self.shared.engine.get(Filter::public(path.clone()));
        Task::perform(reply, move |response| {
            CarouselMessage::PublicViewLoaded { path, response }
        })
    }

    fn reset_to(&mut self, path: &str, owner: Option<UserId>) {
        self.view.reset();
        self.view.set_path(path);
        self.view.set_owner(owner);
        self.strip.reset();
        self.stop();
        self.margin = None;
        self.saving = None;
        self.resave = false;
    }

    /// Routes a `path@owner` tag. `parent_path` is the path of the carousel
    /// above, used when the tag starts with `@`.
    pub fn on_tag(
        &mut self,
        tag: &str,
        parent_path: Option<&str>,
    ) -> Task<CarouselMessage> {
        let tag = parse_tag(tag, parent_path);
        match tag.owner {
            TagOwner::Current => self.load_view(&tag.path, None),
            TagOwner::Public => self.load_public(&tag.path),
            TagOwner::User(owner) => self.load_view(&tag.path, Some(owner)),
        }
    }

    /// Shows `view`, preloading only the ids the store lacks. A bound view
    /// is updated in place by later mutations; an unbound one is forked
    /// into a private view on the first mutation.
    pub fn set_view(&mut self, view: View, bind: bool) -> Task<CarouselMessage> {
        let missing = self.shared.store.missing(&view.items);
        if missing.is_empty() {
            self.show_view(view, bind);
            return Task::none();
        }
        debug!("{}: preloading {} items", self.id, missing.len());
        let reply = self.shared.engine.load(Filter::by_ids(missing), None);
        Task::perform(reply, move |response| CarouselMessage::ViewReady {
            view,
            bind,
            response,
        })
    }

    fn show_view(&mut self, mut view: View, bind: bool) {
        let store = &self.shared.store;
        view.items.retain(|id| store.contains(*id));
        info!(
            "{}: showing {} view {} ({} items)",
            self.id,
            if bind { "private" } else { "public" },
            view.path,
            view.items.len()
        );
        self.strip.reset();
        if bind {
            self.view.bind(view);
        } else {
            self.view.show_unbound(&view);
        }
    }

    pub(crate) fn on_private_view(
        &mut self,
        path: String,
        response: Response,
    ) -> Task<CarouselMessage> {
        if path != self.view.path() {
            return Task::none();
        }
        match response.item.and_then(Record::into_view) {
            Some(view) => self.set_view(view, true),
            None => self.request_public(path),
        }
    }

    pub(crate) fn on_public_view(
        &mut self,
        path: String,
        response: Response,
    ) -> Task<CarouselMessage> {
        if path != self.view.path() {
            return Task::none();
        }
        match response.item.and_then(Record::into_view) {
            Some(view) => self.set_view(view, false),
            None => self.fill(&path),
        }
    }

    pub(crate) fn on_view_ready(
        &mut self,
        view: View,
        bind: bool,
        response: Response,
    ) -> Task<CarouselMessage> {
        self.shared.store.merge_response(&response);
        if view.path == self.view.path() {
            self.show_view(view, bind);
        }
        Task::none()
    }

    /// Puts the first `fetch_limit` items of another path's view in front
    /// and persists.
    pub fn prepend_view(&mut self, path: &str) -> Task<CarouselMessage> {
        let owner = self
            .view
            .owner()
            .cloned()
            .unwrap_or_else(|| self.shared.user.clone());
        let fetch = fetch_view(
            self.shared.engine.clone(),
            self.shared.store.clone(),
            normalize_path(path),
            owner,
        );
        Task::perform(fetch, CarouselMessage::PrependReady)
    }

    pub(crate) fn on_prepend(
        &mut self,
        view: Option<View>,
    ) -> Task<CarouselMessage> {
        let Some(view) = view else {
            debug!("{}: nothing to prepend", self.id);
            return Task::none();
        };
        let store = &self.shared.store;
        let ids: Vec<_> = view
            .items
            .iter()
            .take(self.shared.config.fetch_limit)
            .copied()
            .filter(|id| store.contains(*id))
            .collect();
        if self.view.prepend(&ids) == 0 {
            return Task::none();
        }
        self.update_view()
    }

    /// Lists the newest items of `author` in a detached strip whose order
    /// is never persisted.
    pub fn load_recent(&mut self, author: UserId) -> Task<CarouselMessage> {
        let reply = self
            .shared
            .engine
            .load_newest(Filter::by_author(author), RECENT_LIMIT);
        Task::perform(reply, CarouselMessage::RecentLoaded)
    }

    pub(crate) fn on_recent(&mut self, response: Response) {
        let ids = self.shared.store.merge_response(&response);
        debug!("{}: {} recent items", self.id, ids.len());
        self.strip.reset();
        self.view.detach(ids);
    }
}
