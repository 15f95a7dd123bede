//! A stack of carousels sharing one item store, sync engine and user, and
//! the single drag session that may span them.

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use log::{debug, info};
use pix_core::ItemStore;
use pix_core::sync::SyncEngine;
use pix_model::{ItemId, UserId};

use crate::collaborators::Collaborators;
use crate::config::CarouselConfig;
use crate::controller::{CarouselController, CarouselId, Shared, TapAction};
use crate::drag::{DragPhase, DragSession, removal_commits};
use crate::messages::{BoardMessage, CarouselMessage};
use crate::task::Task;

/// How a gesture ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    Tapped(TapAction),
    Removed(ItemId),
    /// Removal pull released below the threshold.
    SnappedBack,
    Reordered,
    Transferred { from: CarouselId, to: CarouselId },
    /// A transfer nobody accepted. Nothing changed.
    Returned,
    /// Scroll released too slowly to coast.
    Scrolled,
    Coasting,
    Cancelled,
}

#[derive(Debug)]
pub struct Board {
    shared: Shared,
    carousels: Vec<CarouselController>,
    next_id: usize,
    drag: Option<DragSession>,
    /// Set once a gesture starts transferring; drop targets check it.
    drag_active: bool,
}

impl Board {
    pub fn new(
        config: CarouselConfig,
        engine: Arc<SyncEngine>,
        store: ItemStore,
        collaborators: Collaborators,
        user: UserId,
    ) -> Self {
        Self {
            shared: Shared {
                config: Arc::new(config),
                engine,
                store,
                collaborators,
                user,
            },
            carousels: Vec::new(),
            next_id: 0,
            drag: None,
            drag_active: false,
        }
    }

    pub fn store(&self) -> &ItemStore {
        &self.shared.store
    }

    pub fn engine(&self) -> &Arc<SyncEngine> {
        &self.shared.engine
    }

    pub fn user(&self) -> &UserId {
        &self.shared.user
    }

    pub fn add_carousel(&mut self) -> CarouselId {
        let id = CarouselId(self.next_id);
        self.next_id += 1;
        self.carousels
            .push(CarouselController::new(id, self.shared.clone()));
        id
    }

    /// Drops a carousel, cancelling a drag that started in it. Commands it
    /// already issued still run to completion.
    pub fn remove_carousel(&mut self, id: CarouselId) -> bool {
        if self.drag.as_ref().is_some_and(|drag| drag.origin() == id) {
            self.cancel();
        }
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.carousels.remove(index);
        if let Some(drag) = &mut self.drag
            && drag.preview() == Some(id)
        {
            drag.set_preview(None);
        }
        true
    }

    pub fn carousel(&self, id: CarouselId) -> Option<&CarouselController> {
        self.carousels.iter().find(|c| c.id() == id)
    }

    pub fn carousel_mut(
        &mut self,
        id: CarouselId,
    ) -> Option<&mut CarouselController> {
        self.carousels.iter_mut().find(|c| c.id() == id)
    }

    pub fn carousel_ids(&self) -> Vec<CarouselId> {
        self.carousels.iter().map(CarouselController::id).collect()
    }

    /// Runs a controller operation and addresses its follow-up messages.
    pub fn with_carousel(
        &mut self,
        id: CarouselId,
        op: impl FnOnce(&mut CarouselController) -> Task<CarouselMessage>,
    ) -> Task<BoardMessage> {
        match self.carousel_mut(id) {
            Some(carousel) => route(id, op(carousel)),
            None => Task::none(),
        }
    }

    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn is_drag_active(&self) -> bool {
        self.drag_active
    }

    fn index_of(&self, id: CarouselId) -> Option<usize> {
        self.carousels.iter().position(|c| c.id() == id)
    }

    // Pointer input. `x` is relative to the carousels' shared left edge,
    // `y` is any vertical coordinate that stays fixed during the gesture.

    /// Starts a gesture over `carousel`. Returns whether it landed on a
    /// thumbnail.
    pub fn pointer_down(
        &mut self,
        carousel: CarouselId,
        x: f32,
        y: f32,
        now: Instant,
    ) -> bool {
        if self.drag.is_some() {
            self.cancel();
        }
        let config = self.shared.config.clone();
        let Some(origin) = self.carousel_mut(carousel) else {
            return false;
        };
        origin.stop();
        let Some(item) = origin.thumb_at(x) else {
            return false;
        };
        let session = DragSession::begin(
            carousel,
            item,
            x,
            y,
            origin.strip().scroll(),
            origin.strip().height(),
            origin.removal_enabled(item),
            &config,
            now,
        );
        debug!("{carousel}: gesture armed on {item}");
        self.drag = Some(session);
        true
    }

    /// Feeds a pointer move; `over` is the carousel under the pointer.
    pub fn pointer_move(
        &mut self,
        x: f32,
        y: f32,
        over: Option<CarouselId>,
        now: Instant,
    ) -> DragPhase {
        let Some(mut drag) = self.drag.take() else {
            return DragPhase::Idle;
        };
        let before = drag.phase();
        let phase = drag.update(x, y, now);
        let (dx, dy) = drag.delta();
        let (origin, item) = (drag.origin(), drag.item());

        if before == DragPhase::Removing
            && phase != DragPhase::Removing
            && let Some(carousel) = self.carousel_mut(origin)
        {
            carousel.clear_margin();
        }

        match phase {
            DragPhase::Scrolling { .. } => {
                if let Some(carousel) = self.carousel_mut(origin) {
                    let anchor = carousel.drag_scroll(drag.scroll_anchor(), dx);
                    drag.set_scroll_anchor(anchor);
                }
            }
            DragPhase::Removing => {
                if let Some(carousel) = self.carousel_mut(origin) {
                    carousel.set_margin(item, dy);
                }
            }
            DragPhase::Transferring => {
                if !self.drag_active {
                    debug!("{origin}: transferring {item}");
                }
                self.drag_active = true;
                self.update_preview(&mut drag, x, over);
            }
            DragPhase::Idle | DragPhase::Armed | DragPhase::Tapped => {}
        }
        self.drag = Some(drag);
        phase
    }

    /// Moves the drag clone into the gap under the pointer, in a carousel
    /// that would accept the drop.
    fn update_preview(
        &mut self,
        drag: &mut DragSession,
        x: f32,
        over: Option<CarouselId>,
    ) {
        let item = drag.item();
        let target = over.filter(|id| self.accepts(drag, *id));
        if drag.preview() != target
            && let Some(previous) = drag.preview()
            && let Some(carousel) = self.carousel_mut(previous)
        {
            carousel.clear_preview();
        }
        drag.set_preview(target);
        if let Some(carousel) = target.and_then(|id| self.carousel_mut(id)) {
            let anchor = carousel.insertion_anchor(x, item);
            carousel.show_preview(item, anchor);
        }
    }

    /// Drop acceptance for the dragged item over `target`.
    ///
    /// An empty carousel other than the origin takes anything. Otherwise the
    /// acting user must own the dragged item, and a different carousel must
    /// not already hold it.
    fn accepts(&self, drag: &DragSession, target: CarouselId) -> bool {
        if !self.drag_active {
            return false;
        }
        let (Some(origin), Some(carousel)) =
            (self.carousel(drag.origin()), self.carousel(target))
        else {
            return false;
        };
        if target == drag.origin() {
            return origin.owns(drag.item());
        }
        let ids = carousel.get_ids();
        if ids.is_empty() {
            return true;
        }
        origin.owns(drag.item()) && !ids.contains(&drag.item())
    }

    /// Ends the gesture over `over` at `x`.
    pub fn pointer_up(
        &mut self,
        x: f32,
        over: Option<CarouselId>,
        now: Instant,
    ) -> (DragOutcome, Task<BoardMessage>) {
        let Some(mut drag) = self.drag.take() else {
            return (DragOutcome::Cancelled, Task::none());
        };
        let phase = drag.release();
        let (origin, item) = (drag.origin(), drag.item());
        let accepted = over.filter(|id| self.accepts(&drag, *id));
        self.clear_previews(&drag);
        self.drag_active = false;

        match phase {
            DragPhase::Tapped => {
                let action = self
                    .carousel(origin)
                    .map_or(TapAction::Focus(item), |c| c.tap(item));
                (DragOutcome::Tapped(action), Task::none())
            }
            DragPhase::Removing => {
                let ratio = drag.removal_ratio();
                let Some(carousel) = self.carousel_mut(origin) else {
                    return (DragOutcome::Cancelled, Task::none());
                };
                if removal_commits(ratio, carousel.config().down2remove) {
                    info!("{origin}: removing {item} (pulled {ratio:.2})");
                    carousel.clear_margin();
                    let task = route(origin, carousel.remove(item));
                    (DragOutcome::Removed(item), task)
                } else {
                    carousel.snap_back(now);
                    (DragOutcome::SnappedBack, Task::none())
                }
            }
            DragPhase::Transferring => self.drop_item(origin, item, x, accepted),
            DragPhase::Scrolling { .. } => {
                let velocity = drag.velocity();
                let coasting = self
                    .carousel_mut(origin)
                    .is_some_and(|carousel| carousel.coast(velocity, now));
                if coasting {
                    (DragOutcome::Coasting, Task::none())
                } else {
                    (DragOutcome::Scrolled, Task::none())
                }
            }
            DragPhase::Idle | DragPhase::Armed => {
                (DragOutcome::Cancelled, Task::none())
            }
        }
    }

    fn drop_item(
        &mut self,
        origin: CarouselId,
        item: ItemId,
        x: f32,
        target: Option<CarouselId>,
    ) -> (DragOutcome, Task<BoardMessage>) {
        let Some(target) = target else {
            debug!("{origin}: transfer of {item} not accepted");
            return (DragOutcome::Returned, Task::none());
        };

        if target == origin {
            let Some(carousel) = self.carousel_mut(origin) else {
                return (DragOutcome::Returned, Task::none());
            };
            let anchor = carousel.insertion_anchor(x, item);
            return match carousel.reorder(item, anchor) {
                Some(task) => (DragOutcome::Reordered, route(origin, task)),
                None => (DragOutcome::Returned, Task::none()),
            };
        }

        let (Some(from), Some(to)) = (self.index_of(origin), self.index_of(target))
        else {
            return (DragOutcome::Returned, Task::none());
        };
        let Ok([source, dest]) = self.carousels.get_disjoint_mut([from, to]) else {
            return (DragOutcome::Returned, Task::none());
        };
        let anchor = dest.insertion_anchor(x, item);
        source.release_lead(item);
        if !source
            .view_model_mut()
            .move_to(item, dest.view_model_mut(), anchor)
        {
            return (DragOutcome::Returned, Task::none());
        }
        info!("moved {item} from {origin} to {target}");
        // Two views, two independent persistence calls.
        let task = Task::batch([
            route(origin, source.update_view()),
            route(target, dest.update_view()),
        ]);
        (
            DragOutcome::Transferred {
                from: origin,
                to: target,
            },
            task,
        )
    }

    fn clear_previews(&mut self, drag: &DragSession) {
        if let Some(carousel) = drag.preview().and_then(|id| self.carousel_mut(id))
        {
            carousel.clear_preview();
        }
    }

    /// Abandons the gesture without mutating anything.
    pub fn cancel(&mut self) -> DragOutcome {
        if let Some(drag) = self.drag.take() {
            self.clear_previews(&drag);
            if let Some(carousel) = self.carousel_mut(drag.origin()) {
                carousel.clear_margin();
            }
            debug!("{}: gesture cancelled", drag.origin());
        }
        self.drag_active = false;
        DragOutcome::Cancelled
    }

    /// Animation frame for every carousel. Returns whether anything still
    /// moves.
    pub fn frame(&mut self, now: Instant) -> bool {
        if let Some(drag) = &mut self.drag {
            drag.tick(now);
        }
        let mut moving = false;
        for carousel in &mut self.carousels {
            moving |= carousel.frame(now);
        }
        moving
    }

    pub fn update(&mut self, message: BoardMessage) -> Task<BoardMessage> {
        let BoardMessage::Carousel(id, message) = message;
        match self.carousel_mut(id) {
            Some(carousel) => route(id, carousel.update(message)),
            None => {
                debug!("{id}: message for a removed carousel dropped");
                Task::none()
            }
        }
    }

    /// Drives `task` and every follow-up it produces until nothing is left.
    /// Returns how many messages were handled.
    pub async fn settle(&mut self, task: Task<BoardMessage>) -> usize {
        let mut running: FuturesUnordered<_> =
            task.into_futures().into_iter().collect();
        let mut handled = 0;
        while let Some(message) = running.next().await {
            handled += 1;
            running.extend(self.update(message).into_futures());
        }
        handled
    }
}

fn route(id: CarouselId, task: Task<CarouselMessage>) -> Task<BoardMessage> {
    task.map(move |message| BoardMessage::Carousel(id, message))
}
