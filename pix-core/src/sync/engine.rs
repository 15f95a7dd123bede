use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use pix_model::{
    Command, DEFAULT_COLLECTION, Filter, ItemId, Patch, Record, Response,
    SortOrder,
};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::cache::LocalCache;
use super::session::SessionGate;
use super::transport::{Completion, Transport, resolve};

/// How commands reach the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Commands wait for a session and may be answered from the cache.
    #[default]
    Session,
    /// Every command goes straight to a privileged host process, which
    /// owns its own session and cache.
    Bridge,
}

/// Where an issued command's result will come from.
enum Issued {
    Sent(Completion),
    Queued(oneshot::Receiver<Completion>),
}

impl Issued {
    async fn resolve(self) -> Response {
        match self {
            Issued::Sent(completion) => resolve(completion).await,
            Issued::Queued(rx) => match rx.await {
                Ok(completion) => resolve(completion).await,
                // Engine dropped with the command still queued.
                Err(_) => Response::empty(),
            },
        }
    }
}

/// Result of one dispatched command.
///
/// The command is issued (sent or queued) when `dispatch` returns; awaiting
/// the reply only observes the outcome. It resolves exactly once, to an
/// empty response if the transport failed.
#[must_use = "a reply does nothing unless awaited, but the command is already issued"]
pub struct Reply {
    inner: BoxFuture<'static, Response>,
}

impl Reply {
    pub fn ready(response: Response) -> Self {
        Reply {
            inner: futures::future::ready(response).boxed(),
        }
    }

    fn pending(
        issued: Issued,
        cache: Option<Arc<dyn LocalCache>>,
        collection: String,
    ) -> Self {
        Reply {
            inner: async move {
                let response = issued.resolve().await;
                if let Some(cache) = cache {
                    store(cache.as_ref(), &collection, &response);
                }
                response
            }
            .boxed(),
        }
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reply").finish_non_exhaustive()
    }
}

impl Future for Reply {
    type Output = Response;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Response> {
        self.inner.poll_unpin(cx)
    }
}

fn store(cache: &dyn LocalCache, collection: &str, response: &Response) {
    let records: Vec<Record> = response
        .records()
        .filter(|record| record.id().is_some())
        .cloned()
        .collect();
    if records.is_empty() {
        return;
    }
    if let Err(err) = cache.upsert(collection, &records) {
        warn!(%err, collection, "cache upsert failed");
    }
}

pub struct SyncEngineBuilder {
    transport: Arc<dyn Transport>,
    cache: Option<Arc<dyn LocalCache>>,
    mode: SyncMode,
    collection: String,
}

impl fmt::Debug for SyncEngineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncEngineBuilder")
            .field("has_cache", &self.cache.is_some())
            .field("mode", &self.mode)
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

impl SyncEngineBuilder {
    pub fn cache(mut self, cache: Arc<dyn LocalCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn mode(mut self, mode: SyncMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collection = name.into();
        self
    }

    pub fn build(self) -> SyncEngine {
        SyncEngine {
            transport: self.transport,
            cache: self.cache,
            mode: self.mode,
            collection: self.collection,
            gate: Mutex::new(SessionGate::default()),
        }
    }
}

/// Shared command dispatcher for every carousel of a page.
///
/// There is no ordering between commands: two updates issued back to back
/// may complete in either order and the later response wins.
pub struct SyncEngine {
    transport: Arc<dyn Transport>,
    cache: Option<Arc<dyn LocalCache>>,
    mode: SyncMode,
    collection: String,
    gate: Mutex<SessionGate>,
}

impl fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncEngine")
            .field("mode", &self.mode)
            .field("collection", &self.collection)
            .field("has_cache", &self.cache.is_some())
            .field("queued", &self.queued())
            .finish_non_exhaustive()
    }
}

impl SyncEngine {
    pub fn builder(transport: Arc<dyn Transport>) -> SyncEngineBuilder {
        SyncEngineBuilder {
            transport,
            cache: None,
            mode: SyncMode::Session,
            collection: DEFAULT_COLLECTION.to_owned(),
        }
    }

    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::builder(transport).build()
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    pub fn has_session(&self) -> bool {
        self.mode == SyncMode::Bridge || self.gate.lock().is_established()
    }

    /// Commands waiting for the session.
    pub fn queued(&self) -> usize {
        self.gate.lock().len()
    }

    /// Opens the session and flushes queued commands in issue order.
    /// Later calls are no-ops. Returns how many commands were flushed.
    pub fn establish_session(&self) -> usize {
        let mut gate = self.gate.lock();
        let pending = gate.open();
        let flushed = pending.len();
        // The lock stays held so nothing overtakes the backlog.
        for entry in pending {
            let completion = self.transport.send(entry.command);
            if entry.deliver.send(completion).is_err() {
                debug!("reply for flushed command was dropped");
            }
        }
        drop(gate);
        if flushed > 0 {
            info!(flushed, "session established; queue flushed");
        } else {
            debug!("session established");
        }
        flushed
    }

    /// Opens the session when `signal` fires. A signal dropped unfired
    /// leaves the queue in place.
    pub async fn watch_session(&self, signal: oneshot::Receiver<()>) {
        if signal.await.is_ok() {
            self.establish_session();
        } else {
            debug!("session signal dropped before firing");
        }
    }

    pub fn dispatch(&self, command: Command) -> Reply {
        let command = command.with_collection(&self.collection);

        if self.mode == SyncMode::Bridge {
            debug!(cmd = command.name(), "forwarding to bridge host");
            return Reply::pending(
                Issued::Sent(self.transport.send(command)),
                None,
                String::new(),
            );
        }

        if let Some(cache) = &self.cache {
            if let Some(hit) = self.answer_from_cache(cache.as_ref(), &command)
            {
                debug!(cmd = command.name(), "answered from cache");
                let refresh = self.issue(command);
                self.refresh_in_background(refresh);
                return Reply::ready(hit);
            }

            if let Command::Update { id, set, .. } = &command {
                match cache.patch(&self.collection, *id, set) {
                    Ok(true) => debug!(%id, "applied update to cache"),
                    Ok(false) => {}
                    Err(err) => warn!(%err, %id, "optimistic cache patch failed"),
                }
            }
        }

        let issued = self.issue(command);
        Reply::pending(issued, self.cache.clone(), self.collection.clone())
    }

    pub fn save(&self, record: impl Into<Record>) -> Reply {
        self.dispatch(Command::save(record))
    }

    pub fn update(&self, id: ItemId, set: Patch) -> Reply {
        self.dispatch(Command::update(id, set))
    }

    pub fn get(&self, filter: Filter) -> Reply {
        self.dispatch(Command::get(filter))
    }

    pub fn load(&self, filter: Filter, limit: Option<usize>) -> Reply {
        let command = Command::load(filter);
        self.dispatch(match limit {
            Some(limit) => command.with_limit(limit),
            None => command,
        })
    }

    /// A `load` of the most recently created matches, newest first.
    pub fn load_newest(&self, filter: Filter, limit: usize) -> Reply {
        self.dispatch(
            Command::load(filter)
                .with_limit(limit)
                .with_order(SortOrder::Newest),
        )
    }

    pub fn refresh_public(&self, path: impl Into<String>) -> Reply {
        self.dispatch(Command::refresh_public(path))
    }

    fn issue(&self, command: Command) -> Issued {
        let mut gate = self.gate.lock();
        if gate.is_established() {
            debug!(cmd = command.name(), "sending");
            Issued::Sent(self.transport.send(command))
        } else {
            let name = command.name();
            let rx = gate.enqueue(command);
            debug!(cmd = name, queued = gate.len(), "queued until session");
            Issued::Queued(rx)
        }
    }

    /// A cache answer for `get`/`load`. Id filters only count as a hit when
    /// every requested id is cached.
    fn answer_from_cache(
        &self,
        cache: &dyn LocalCache,
        command: &Command,
    ) -> Option<Response> {
        let (filter, limit, order) = match command {
            Command::Get { filter, .. } => (filter, Some(1), SortOrder::Oldest),
            Command::Load {
                filter,
                limit,
                order,
                ..
            } => (filter, *limit, *order),
            _ => return None,
        };

        let mut hits = match cache.find(&self.collection, filter) {
            Ok(hits) => hits,
            Err(err) => {
                warn!(%err, "cache lookup failed; treating as miss");
                return None;
            }
        };
        if hits.is_empty() {
            return None;
        }
        if let Some(ids) = &filter.ids
            && ids.iter().any(|id| !hits.iter().any(|r| r.id() == Some(*id)))
        {
            return None;
        }
        order.arrange(&mut hits);
        if let Some(limit) = limit {
            hits.truncate(limit);
        }

        Some(match command {
            Command::Get { .. } => Response {
                item: hits.into_iter().next(),
                items: None,
            },
            _ => Response::with_items(hits),
        })
    }

    fn refresh_in_background(&self, issued: Issued) {
        let cache = self.cache.clone();
        let collection = self.collection.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let response = issued.resolve().await;
                    if let Some(cache) = cache {
                        store(cache.as_ref(), &collection, &response);
                    }
                });
            }
            Err(_) => {
                debug!("no runtime for background refresh; result discarded")
            }
        }
    }
}
