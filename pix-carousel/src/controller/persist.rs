use log::{debug, info, warn};
use pix_core::PersistPlan;
use pix_model::{ItemId, Patch, Record, Response};

use super::CarouselController;
use crate::messages::CarouselMessage;
use crate::task::Task;

impl CarouselController {
    /// Persists the current order: `save` with the full order when no view
    /// exists yet, otherwise `update` with only `items`.
    ///
    /// Every call issues its own command, with one exception: while the
    /// first save is in flight, later calls are folded into a single update
    /// sent once the view has an id. Saving again instead would create a
    /// second private view for the same path.
    pub fn update_view(&mut self) -> Task<CarouselMessage> {
        if self.saving.is_some() {
            self.resave = true;
            debug!("{}: save in flight, deferring persistence", self.id);
            return Task::none();
        }
        match self.view.persist_plan(&self.shared.user) {
            PersistPlan::Skip => Task::none(),
            PersistPlan::Save(mut view) => {
                if view.path.starts_with("http") {
                    view.title.clone_from(&self.title);
                }
                debug!(
                    "{}: saving view {} with {} items",
                    self.id,
                    view.path,
                    view.items.len()
                );
                self.save_generation += 1;
                let generation = self.save_generation;
                self.saving = Some(generation);
                let reply = self.shared.engine.save(view);
                Task::perform(reply, move |response| CarouselMessage::ViewSaved {
                    generation,
                    response,
                })
            }
            PersistPlan::Update { id, items } => {
                debug!("{}: updating view {id} with {} items", self.id, items.len());
                let reply = self
                    .shared
                    .engine
                    .update(id, Patch::items(items.clone()));
                Task::perform(reply, move |response| {
                    CarouselMessage::ViewUpdated { items, response }
                })
            }
        }
    }

    /// Asks the server to recompute the community view for this path.
    pub fn refresh_public(&self) -> Task<CarouselMessage> {
        let reply = self.shared.engine.refresh_public(self.view.path());
        Task::perform(reply, CarouselMessage::PublicRefreshed)
    }

    pub(crate) fn on_view_saved(
        &mut self,
        generation: u64,
        response: Response,
    ) -> Task<CarouselMessage> {
        if self.saving != Some(generation) {
            debug!("{}: ignoring reply to superseded save {generation}", self.id);
            return Task::none();
        }
        self.saving = None;
        let resave = std::mem::take(&mut self.resave);

        let saved = response.item.and_then(Record::into_view);
        let Some(view) = saved.filter(|view| view.id.is_some()) else {
            warn!("{}: view save returned nothing", self.id);
            return if resave { self.update_view() } else { Task::none() };
        };
        if view.path != self.view.path() || self.view.is_detached() {
            debug!("{}: ignoring save for stale view {}", self.id, view.path);
            return Task::none();
        }

        info!("{}: view {} saved", self.id, view.path);
        self.view.adopt(view);
        let refresh = self.refresh_public();
        if resave {
            Task::batch([refresh, self.update_view()])
        } else {
            refresh
        }
    }

    pub(crate) fn on_view_updated(
        &mut self,
        items: Vec<ItemId>,
        response: Response,
    ) -> Task<CarouselMessage> {
        if response.item.is_none() {
            warn!("{}: view update was not acknowledged", self.id);
            return Task::none();
        }
        self.view.acknowledge(items);
        self.refresh_public()
    }
}
