//! Ordered item ids of one carousel plus its view binding.
//!
//! The slot order here is authoritative; whatever the carousel draws is a
//! projection of [`ViewModel::ids`]. Persistent ids are unique within a view.
//! Transient slots (drag clones) may repeat an id and are never persisted.

use pix_model::{ItemId, UserId, View, Visibility};
use tracing::debug;

/// How the carousel's order relates to a remote view.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewBinding {
    /// Nothing persisted yet, or showing someone else's view. The first
    /// mutation saves a new private view.
    #[default]
    Unbound,
    /// Mutations update this view in place once it has an id.
    Bound(View),
    /// Read-only listing (recent items); mutations are never persisted.
    Detached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    id: ItemId,
    transient: bool,
}

/// What persisting the current order requires.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistPlan {
    Skip,
    /// First persistence: create the view with the full order.
    Save(View),
    /// Overwrite only the `items` field of an existing view.
    Update { id: ItemId, items: Vec<ItemId> },
}

#[derive(Debug, Clone, Default)]
pub struct ViewModel {
    path: String,
    owner: Option<UserId>,
    binding: ViewBinding,
    slots: Vec<Slot>,
}

impl ViewModel {
    pub fn new(path: impl Into<String>) -> Self {
        ViewModel {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_owner(mut self, owner: UserId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    pub fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }

    pub fn set_owner(&mut self, owner: Option<UserId>) {
        self.owner = owner;
    }

    pub fn binding(&self) -> &ViewBinding {
        &self.binding
    }

    pub fn view(&self) -> Option<&View> {
        match &self.binding {
            ViewBinding::Bound(view) => Some(view),
            _ => None,
        }
    }

    pub fn is_detached(&self) -> bool {
        matches!(self.binding, ViewBinding::Detached)
    }

    /// Binds `view` and replaces the order with its items.
    pub fn bind(&mut self, view: View) {
        self.load_view_items(&view);
        self.binding = ViewBinding::Bound(view);
    }

    /// Shows `view` without binding it, so the first mutation forks a
    /// private copy.
    pub fn show_unbound(&mut self, view: &View) {
        self.load_view_items(view);
        self.binding = ViewBinding::Unbound;
    }

    /// Replaces the order with a listing that is never persisted.
    pub fn detach(&mut self, ids: impl IntoIterator<Item = ItemId>) {
        self.replace_all(ids);
        self.binding = ViewBinding::Detached;
    }

    /// Binds a freshly saved view while keeping the local order, which may
    /// have moved on since the save was issued.
    pub fn adopt(&mut self, view: View) {
        if let Some(owner) = &view.owner {
            self.owner = Some(owner.clone());
        }
        self.binding = ViewBinding::Bound(view);
    }

    /// Records the items acknowledged by an update.
    pub fn acknowledge(&mut self, items: Vec<ItemId>) {
        if let ViewBinding::Bound(view) = &mut self.binding {
            view.items = items;
        }
    }

    /// Drops the binding and the order.
    pub fn reset(&mut self) {
        self.binding = ViewBinding::Unbound;
        self.slots.clear();
    }

    fn load_view_items(&mut self, view: &View) {
        if let Some(owner) = &view.owner
            && view.visibility == Visibility::Private
        {
            self.owner = Some(owner.clone());
        }
        self.path.clone_from(&view.path);
        self.replace_all(view.items.iter().copied());
    }

    /// Replaces the order, keeping the first occurrence of repeated ids.
    pub fn replace_all(&mut self, ids: impl IntoIterator<Item = ItemId>) {
        self.slots.clear();
        let mut dropped = 0usize;
        for id in ids {
            if !self.append(id) {
                dropped += 1;
            }
        }
        if dropped > 0 {
            debug!(path = %self.path, dropped, "dropped repeated ids");
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.slots.iter().any(|slot| !slot.transient && slot.id == id)
    }

    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| !slot.transient && slot.id == id)
    }

    /// Display order, transient clones included.
    pub fn ids(&self) -> Vec<ItemId> {
        self.slots.iter().map(|slot| slot.id).collect()
    }

    /// Order to persist. Transient clones are excluded.
    pub fn to_ordered_ids(&self) -> Vec<ItemId> {
        self.slots
            .iter()
            .filter(|slot| !slot.transient)
            .map(|slot| slot.id)
            .collect()
    }

    pub fn append(&mut self, id: ItemId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.slots.push(Slot {
            id,
            transient: false,
        });
        true
    }

    /// Inserts before `anchor`, or appends when the anchor is absent.
    pub fn insert_before(&mut self, id: ItemId, anchor: Option<ItemId>) -> bool {
        if self.contains(id) {
            return false;
        }
        let at = self.anchor_index(anchor);
        self.slots.insert(
            at,
            Slot {
                id,
                transient: false,
            },
        );
        true
    }

    /// Puts `ids` in front, in the given order, skipping ids already
    /// present. Returns how many were added.
    pub fn prepend(&mut self, ids: &[ItemId]) -> usize {
        let first = self.slots.iter().find(|s| !s.transient).map(|s| s.id);
        ids.iter()
            .filter(|id| self.insert_before(**id, first))
            .count()
    }

    /// Removes every occurrence of `id`, transient clones included.
    pub fn remove(&mut self, id: ItemId) -> usize {
        let before = self.slots.len();
        self.slots.retain(|slot| slot.id != id);
        before - self.slots.len()
    }

    /// Moves `id` before `anchor` in this view. Returns whether the order
    /// changed.
    pub fn move_within(&mut self, id: ItemId, anchor: Option<ItemId>) -> bool {
        if anchor == Some(id) {
            return false;
        }
        let Some(from) = self.position(id) else {
            return false;
        };
        let before = self.to_ordered_ids();
        self.slots.remove(from);
        let at = self.anchor_index(anchor);
        self.slots.insert(
            at,
            Slot {
                id,
                transient: false,
            },
        );
        self.to_ordered_ids() != before
    }

    /// Transfers `id` into `target` before `anchor` (appended when absent).
    ///
    /// Refused when the id is missing here or already present in the target,
    /// leaving both views untouched.
    pub fn move_to(
        &mut self,
        id: ItemId,
        target: &mut ViewModel,
        anchor: Option<ItemId>,
    ) -> bool {
        if !self.contains(id) || target.contains(id) {
            return false;
        }
        self.remove(id);
        target.insert_before(id, anchor)
    }

    /// Adds a drag clone that is shown but never persisted.
    pub fn insert_transient(&mut self, id: ItemId, anchor: Option<ItemId>) {
        let at = self.anchor_index(anchor);
        self.slots.insert(
            at,
            Slot {
                id,
                transient: true,
            },
        );
    }

    pub fn clear_transient(&mut self) {
        self.slots.retain(|slot| !slot.transient);
    }

    fn anchor_index(&self, anchor: Option<ItemId>) -> usize {
        anchor
            .and_then(|a| self.position(a))
            .unwrap_or(self.slots.len())
    }

    /// Decides how the current order reaches the remote store.
    ///
    /// `acting` owns a newly created view when the carousel has no owner.
    pub fn persist_plan(&self, acting: &UserId) -> PersistPlan {
        match &self.binding {
            ViewBinding::Detached => PersistPlan::Skip,
            ViewBinding::Bound(View { id: Some(id), .. }) => {
                PersistPlan::Update {
                    id: *id,
                    items: self.to_ordered_ids(),
                }
            }
            ViewBinding::Bound(_) | ViewBinding::Unbound => {
                let items = self.to_ordered_ids();
                if items.is_empty() {
                    return PersistPlan::Skip;
                }
                let owner = self.owner.clone().unwrap_or_else(|| acting.clone());
                let mut view = View::private(self.path.clone(), owner, items);
                view.author = Some(acting.clone());
                PersistPlan::Save(view)
            }
        }
    }
}
