//! Horizontal layout of a carousel's thumbnails.
//!
//! The drawn order is a rotation of the view model's order starting at the
//! `lead` thumbnail. Wraparound only moves the lead, so it never mutates or
//! persists anything.

use pix_core::ItemStore;
use pix_model::ItemId;

use crate::constants::layout::DEFAULT_ASPECT;

/// A thumbnail placed in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thumb {
    pub id: ItemId,
    pub x: f32,
    pub width: f32,
}

impl Thumb {
    pub fn midpoint(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn contains(&self, x: f32) -> bool {
        x >= self.x && x < self.x + self.width
    }
}

#[derive(Debug, Clone)]
pub struct Strip {
    height: f32,
    gap: f32,
    viewport: f32,
    scroll: f32,
    lead: Option<ItemId>,
}

impl Strip {
    pub fn new(height: f32, gap: f32) -> Self {
        Self {
            height,
            gap,
            viewport: 0.0,
            scroll: 0.0,
            lead: None,
        }
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    pub fn viewport(&self) -> f32 {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: f32) {
        self.viewport = width.max(0.0);
    }

    pub fn lead(&self) -> Option<ItemId> {
        self.lead
    }

    /// Drawn order: `ids` rotated to start at the lead.
    pub fn project(&self, ids: &[ItemId]) -> Vec<ItemId> {
        match self.lead.and_then(|lead| ids.iter().position(|id| *id == lead)) {
            Some(at) => ids[at..].iter().chain(&ids[..at]).copied().collect(),
            None => ids.to_vec(),
        }
    }

    /// Width of one thumbnail at strip height.
    pub fn width_of(&self, id: ItemId, store: &ItemStore) -> f32 {
        let aspect = store
            .get(id)
            .and_then(|item| item.aspect_ratio())
            .unwrap_or(DEFAULT_ASPECT);
        self.height * aspect
    }

    pub fn thumbs(&self, ids: &[ItemId], store: &ItemStore) -> Vec<Thumb> {
        let mut x = 0.0;
        self.project(ids)
            .into_iter()
            .map(|id| {
                let width = self.width_of(id, store);
                let thumb = Thumb { id, x, width };
                x += width + self.gap;
                thumb
            })
            .collect()
    }

    pub fn content_width(&self, ids: &[ItemId], store: &ItemStore) -> f32 {
        self.thumbs(ids, store)
            .last()
            .map_or(0.0, |last| last.x + last.width)
    }

    pub fn max_scroll(&self, ids: &[ItemId], store: &ItemStore) -> f32 {
        (self.content_width(ids, store) - self.viewport).max(0.0)
    }

    pub fn scroll_to(&mut self, x: f32, ids: &[ItemId], store: &ItemStore) {
        self.scroll = x.clamp(0.0, self.max_scroll(ids, store));
    }

    /// Thumbnail under viewport position `x`.
    pub fn hit_test(
        &self,
        x: f32,
        ids: &[ItemId],
        store: &ItemStore,
    ) -> Option<ItemId> {
        let x = x + self.scroll;
        self.thumbs(ids, store)
            .into_iter()
            .find(|thumb| thumb.contains(x))
            .map(|thumb| thumb.id)
    }

    /// Thumbnail a drop at viewport position `x` lands in front of, or
    /// `None` to append. `dragged` is ignored so a thumbnail never anchors
    /// to itself.
    pub fn insertion_anchor(
        &self,
        x: f32,
        ids: &[ItemId],
        store: &ItemStore,
        dragged: ItemId,
    ) -> Option<ItemId> {
        let x = x + self.scroll;
        let thumbs: Vec<Thumb> = self
            .thumbs(ids, store)
            .into_iter()
            .filter(|thumb| thumb.id != dragged)
            .collect();
        if let Some(thumb) = thumbs.iter().find(|thumb| thumb.midpoint() > x) {
            return Some(thumb.id);
        }
        // Past the last drawn thumbnail. With a rotation the drawn end sits
        // just before the lead.
        match self.lead {
            Some(lead) if lead != dragged && ids.first() != Some(&lead) => {
                Some(lead)
            }
            _ => None,
        }
    }

    /// Drag-scrolls to `anchor - delta_x` and returns the adjusted anchor.
    ///
    /// With `wrap` the edge thumbnail crossing the viewport edge is moved to
    /// the other end and the anchor shifts by its width, keeping the picture
    /// still.
    pub fn drag_to(
        &mut self,
        anchor: f32,
        delta_x: f32,
        wrap: bool,
        ids: &[ItemId],
        store: &ItemStore,
    ) -> f32 {
        let mut anchor = anchor;
        let mut x = anchor - delta_x;
        if wrap && ids.len() > 1 {
            for _ in 0..ids.len() {
                let drawn = self.project(ids);
                let first = self.width_of(drawn[0], store) + self.gap;
                if x > first {
                    self.lead = Some(drawn[1]);
                    anchor -= first;
                    x -= first;
                    continue;
                }
                if x < 0.0 {
                    let last = drawn[drawn.len() - 1];
                    self.lead = Some(last);
                    let width = self.width_of(last, store) + self.gap;
                    anchor += width;
                    x += width;
                    continue;
                }
                break;
            }
        }
        self.scroll_to(x, ids, store);
        anchor
    }

    /// Scrolls by `delta` (coasting). Without `infinite`, crossing either end
    /// rotates the edge thumbnail across instead of stopping.
    pub fn scroll_by(
        &mut self,
        delta: f32,
        infinite: bool,
        ids: &[ItemId],
        store: &ItemStore,
    ) {
        let x = self.scroll + delta.round();
        if infinite || ids.len() < 2 {
            self.scroll_to(x, ids, store);
            return;
        }
        let drawn = self.project(ids);
        if x < 0.0 {
            let last = drawn[drawn.len() - 1];
            self.lead = Some(last);
            let width = self.width_of(last, store) + self.gap;
            self.scroll_to(x + width, ids, store);
        } else if x > self.max_scroll(ids, store) {
            let first = self.width_of(drawn[0], store) + self.gap;
            self.lead = Some(drawn[1]);
            self.scroll_to(x - first, ids, store);
        } else {
            self.scroll = x;
        }
    }

    /// Hands the lead to the next drawn thumbnail before `id` leaves or
    /// moves, so the drawn order does not jump.
    pub fn release_lead(&mut self, id: ItemId, ids: &[ItemId]) {
        if self.lead != Some(id) {
            return;
        }
        self.lead = self
            .project(ids)
            .into_iter()
            .nth(1)
            .filter(|next| ids.first() != Some(next));
    }

    pub(crate) fn set_lead(&mut self, lead: Option<ItemId>) {
        self.lead = lead;
    }

    pub fn reset(&mut self) {
        self.scroll = 0.0;
        self.lead = None;
    }
}
