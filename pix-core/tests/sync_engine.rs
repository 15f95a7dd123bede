//! Dispatch behaviour of the sync engine against controllable transports.

mod support;

use std::sync::Arc;
use std::time::Duration;

use pix_core::sync::{LocalCache, MemoryCache, MemoryRemote, SyncEngine};
use pix_model::{
    Command, DEFAULT_COLLECTION, Filter, Item, ItemId, Patch, Record, Response,
    View,
};
use support::ManualTransport;
use tokio::time::timeout;

fn cached(records: Vec<Record>) -> Arc<MemoryCache> {
    let cache = Arc::new(MemoryCache::new());
    cache.upsert(DEFAULT_COLLECTION, &records).unwrap();
    cache
}

#[tokio::test]
async fn cache_hit_answers_without_session() {
    let transport = Arc::new(ManualTransport::new());
    let cache = cached(vec![Item::image("a").with_id(ItemId(1)).into()]);
    let engine = SyncEngine::builder(transport.clone())
        .cache(cache)
        .build();

    let response = timeout(Duration::from_millis(100), engine.get(Filter::by_id(ItemId(1))))
        .await
        .expect("cache hit must not wait for a session");
    assert_eq!(response.item.and_then(|r| r.id()), Some(ItemId(1)));

    // The refresh still waits for the session.
    assert_eq!(engine.queued(), 1);
    assert!(transport.sent().is_empty());
    engine.establish_session();
    assert_eq!(transport.sent().len(), 1);
}

#[tokio::test]
async fn cache_miss_waits_for_session() {
    let transport = Arc::new(ManualTransport::new());
    let engine = Arc::new(
        SyncEngine::builder(transport.clone())
            .cache(Arc::new(MemoryCache::new()))
            .build(),
    );

    let reply = tokio::spawn({
        let engine = engine.clone();
        async move { engine.get(Filter::by_id(ItemId(4))).await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!reply.is_finished());
    assert!(transport.sent().is_empty());

    engine.establish_session();
    assert_eq!(transport.sent(), vec![Command::get(Filter::by_id(ItemId(4)))]);
    transport.respond(0, Response::with_item(Item::image("d").with_id(ItemId(4))));

    let response = reply.await.unwrap();
    assert_eq!(response.item.and_then(|r| r.id()), Some(ItemId(4)));
}

#[tokio::test]
async fn partial_id_hits_go_remote() {
    let transport = Arc::new(ManualTransport::new());
    let cache = cached(vec![Item::image("a").with_id(ItemId(1)).into()]);
    let engine = SyncEngine::builder(transport.clone())
        .cache(cache.clone())
        .build();
    engine.establish_session();

    let reply = engine.load(Filter::by_ids([ItemId(1), ItemId(2)]), None);
    assert_eq!(transport.sent().len(), 1);
    transport.respond(
        0,
        Response::with_items(vec![
            Item::image("a").with_id(ItemId(1)).into(),
            Item::image("b").with_id(ItemId(2)).into(),
        ]),
    );
    assert_eq!(reply.await.items.map(|items| items.len()), Some(2));
    assert_eq!(cache.len(DEFAULT_COLLECTION), 2);
}

#[tokio::test]
async fn responses_upsert_the_cache() {
    let remote = Arc::new(MemoryRemote::starting_at(30));
    let cache = Arc::new(MemoryCache::new());
    let engine = SyncEngine::builder(remote.clone())
        .cache(cache.clone())
        .build();
    engine.establish_session();

    let saved = engine.save(Item::image("http://a/x.png")).await;
    let id = saved.item.and_then(|r| r.id()).unwrap();
    assert_eq!(id, ItemId(30));
    let found = cache.find(DEFAULT_COLLECTION, &Filter::by_id(id)).unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn transport_failure_is_an_empty_response() {
    let transport = Arc::new(ManualTransport::new());
    let engine = SyncEngine::new(transport.clone());
    engine.establish_session();

    let reply = engine.get(Filter::public("cats"));
    transport.fail(0);
    assert!(reply.await.is_empty());
}

#[tokio::test]
async fn later_response_wins_in_cache() {
    let transport = Arc::new(ManualTransport::new());
    let view = View::public("cats", vec![ItemId(1), ItemId(2)]).with_id(ItemId(9));
    let cache = cached(vec![view.clone().into()]);
    let engine = SyncEngine::builder(transport.clone())
        .cache(cache.clone())
        .build();
    engine.establish_session();

    let first = engine.update(ItemId(9), Patch::items(vec![ItemId(2), ItemId(1)]));
    let second = engine.update(ItemId(9), Patch::items(vec![ItemId(1)]));

    // Completions arrive out of issue order.
    let mut newer = view.clone();
    newer.items = vec![ItemId(1)];
    let mut older = view;
    older.items = vec![ItemId(2), ItemId(1)];
    transport.respond(1, Response::with_item(newer));
    second.await;
    transport.respond(0, Response::with_item(older));
    first.await;

    let found = cache.find(DEFAULT_COLLECTION, &Filter::by_id(ItemId(9))).unwrap();
    assert_eq!(found[0].as_view().unwrap().items, vec![ItemId(2), ItemId(1)]);
}

#[tokio::test]
async fn session_signal_flushes_queue() {
    let remote = Arc::new(MemoryRemote::new());
    let engine = Arc::new(SyncEngine::new(remote.clone()));
    let (fire, signal) = tokio::sync::oneshot::channel();

    let reply = engine.save(Item::image("http://a/1.png"));
    let watcher = tokio::spawn({
        let engine = engine.clone();
        async move { engine.watch_session(signal).await }
    });
    assert!(remote.commands().is_empty());

    fire.send(()).unwrap();
    watcher.await.unwrap();
    assert!(engine.has_session());
    assert!(reply.await.item.is_some());
    assert_eq!(remote.commands().len(), 1);
}
