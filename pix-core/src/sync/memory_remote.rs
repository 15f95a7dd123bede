//! A remote store that lives in process memory.
//!
//! Answers every command immediately. Used by the replay tool and by tests
//! that need realistic responses without a network.

use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;
use pix_model::{Command, Filter, ItemId, Record, Response, View, Visibility};
use tracing::debug;

use super::transport::{Completion, Transport, completion};

#[derive(Debug)]
struct RemoteState {
    next_id: u64,
    collections: HashMap<String, BTreeMap<ItemId, Record>>,
}

#[derive(Debug)]
pub struct MemoryRemote {
    state: Mutex<RemoteState>,
    log: Mutex<Vec<Command>>,
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRemote {
    pub fn new() -> Self {
        MemoryRemote {
            state: Mutex::new(RemoteState {
                next_id: 1,
                collections: HashMap::new(),
            }),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Ids handed out by `save` start at `first`.
    pub fn starting_at(first: u64) -> Self {
        let remote = Self::new();
        remote.state.lock().next_id = first;
        remote
    }

    /// Stores records as if saved earlier. Records without an id get one.
    pub fn seed(&self, collection: &str, records: impl IntoIterator<Item = Record>) {
        let mut state = self.state.lock();
        for mut record in records {
            let id = match record.id() {
                Some(id) => id,
                None => {
                    let id = ItemId(state.next_id);
                    record.set_id(id);
                    id
                }
            };
            state.next_id = state.next_id.max(id.get() + 1);
            state
                .collections
                .entry(collection.to_owned())
                .or_default()
                .insert(id, record);
        }
    }

    /// Every command received so far, in arrival order.
    pub fn commands(&self) -> Vec<Command> {
        self.log.lock().clone()
    }

    pub fn take_commands(&self) -> Vec<Command> {
        std::mem::take(&mut *self.log.lock())
    }

    pub fn records(&self, collection: &str) -> Vec<Record> {
        self.state
            .lock()
            .collections
            .get(collection)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Computes the response `command` gets, applying its writes.
    pub fn answer(&self, command: &Command) -> Response {
        let mut state = self.state.lock();
        match command {
            Command::Save { item, collection } => {
                let mut record = item.clone();
                let id = match record.id() {
                    Some(id) => id,
                    None => {
                        let id = ItemId(state.next_id);
                        state.next_id += 1;
                        record.set_id(id);
                        id
                    }
                };
                state
                    .collections
                    .entry(collection.clone())
                    .or_default()
                    .insert(id, record.clone());
                Response::with_item(record)
            }
            Command::Update { id, set, collection } => {
                match state
                    .collections
                    .get_mut(collection)
                    .and_then(|records| records.get_mut(id))
                {
                    Some(record) => {
                        set.apply(record);
                        Response::with_item(record.clone())
                    }
                    None => Response::empty(),
                }
            }
            Command::Get { filter, collection } => Response {
                item: find(&state, collection, filter).into_iter().next(),
                items: None,
            },
            Command::Load {
                filter,
                limit,
                order,
                collection,
            } => {
                let mut found = find(&state, collection, filter);
                order.arrange(&mut found);
                if let Some(limit) = limit {
                    found.truncate(*limit);
                }
                Response::with_items(found)
            }
            Command::RefreshPublic { path, collection } => {
                refresh_public(&mut state, collection, path)
            }
        }
    }
}

fn find(state: &RemoteState, collection: &str, filter: &Filter) -> Vec<Record> {
    state
        .collections
        .get(collection)
        .map(|records| {
            records
                .values()
                .filter(|record| filter.matches(record))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

/// Rebuilds the public view of `path` from every private view there, in
/// view id order, without repeats.
fn refresh_public(
    state: &mut RemoteState,
    collection: &str,
    path: &str,
) -> Response {
    let private = find(state, collection, &Filter {
        path: Some(path.to_owned()),
        kind: Some(Visibility::Private.into()),
        ..Default::default()
    });
    let mut items: Vec<ItemId> = Vec::new();
    for view in private.iter().filter_map(Record::as_view) {
        for id in &view.items {
            if !items.contains(id) {
                items.push(*id);
            }
        }
    }

    let existing = find(state, collection, &Filter::public(path))
        .into_iter()
        .find_map(|record| record.id());
    let id = match existing {
        Some(id) => id,
        None => {
            let id = ItemId(state.next_id);
            state.next_id += 1;
            id
        }
    };
    let public = Record::from(View::public(path, items).with_id(id));
    state
        .collections
        .entry(collection.to_owned())
        .or_default()
        .insert(id, public.clone());
    debug!(path, %id, "public view recomputed");
    Response::with_item(public)
}

impl Transport for MemoryRemote {
    fn send(&self, command: Command) -> Completion {
        let response = self.answer(&command);
        self.log.lock().push(command);
        let (responder, completion) = completion();
        responder.respond(response);
        completion
    }
}
