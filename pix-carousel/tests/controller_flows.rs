//! View loading, persistence and ingestion flows of a single carousel.

mod support;

use pix_carousel::{CarouselConfig, TapAction};
use pix_core::CoreError;
use pix_model::{Command, Filter, Item, ItemId, ItemKind, SortOrder, UserId};
use support::{
    Fixture, USER, ids, item, saved_items, saved_views, updates, user,
};

#[tokio::test]
async fn public_view_is_forked_on_first_mutation() {
    let mut h = Fixture::new()
        .items([item(1, "bob"), item(2, "bob")])
        .public_view("birds", &[1, 2])
        .build();
    let birds = h.carousel("birds").await;
    assert_eq!(h.ids(birds), ids(&[1, 2]));
    assert!(h.board.carousel(birds).unwrap().view_model().view().is_none());

    let commands = h.take_commands();
    assert!(commands.contains(&Command::get(Filter::public("birds"))));

    let task = h.board.with_carousel(birds, |c| c.remove(ItemId(1)));
    h.board.settle(task).await;
    let commands = h.take_commands();
    let saved = saved_views(&commands);
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].items, ids(&[2]));
    assert_eq!(saved[0].owner, Some(user()));
    assert!(commands.contains(&Command::refresh_public("birds")));

    // Bound now: the next mutation updates the fork in place.
    let task = h.board.with_carousel(birds, |c| c.remove(ItemId(2)));
    h.board.settle(task).await;
    assert_eq!(
        updates(&h.take_commands()),
        vec![(ItemId(1000), vec![])]
    );
}

#[tokio::test]
async fn private_view_wins_over_public() {
    let mut h = Fixture::new()
        .items((1..=3).map(|id| item(id, USER)))
        .view("cats", &[3, 1])
        .public_view("cats", &[1, 2, 3])
        .build();
    let cats = h.carousel("cats").await;
    assert_eq!(h.ids(cats), ids(&[3, 1]));

    let commands = h.take_commands();
    assert!(!commands.contains(&Command::get(Filter::public("cats"))));
    // Only the missing items were preloaded, once.
    assert_eq!(
        commands
            .iter()
            .filter(|command| matches!(command, Command::Load { .. }))
            .count(),
        1
    );
}

#[tokio::test]
async fn view_ids_unknown_to_the_server_are_dropped() {
    let mut h = Fixture::new()
        .items([item(1, USER)])
        .view("cats", &[1, 42])
        .build();
    let cats = h.carousel("cats").await;
    assert_eq!(h.ids(cats), ids(&[1]));
}

#[tokio::test]
async fn fill_saves_candidates_that_load_and_are_large_enough() {
    let page = "http://page.test/gallery";
    let mut h = Fixture::new()
        .harvest(&[
            "a.test/1.jpg",
            "http://a.test/2.jpg",
            "http://a.test/2.jpg",
            "http://a.test/small.jpg",
            "http://a.test/missing.jpg",
        ])
        .probe("http://a.test/1.jpg", 640, 480)
        .probe("http://a.test/2.jpg", 300, 300)
        .probe("http://a.test/small.jpg", 50, 50)
        .build();
    let gallery = h.carousel(page).await;
    let carousel = h.board.carousel(gallery).unwrap();
    assert!(!carousel.is_loading());

    let commands = h.take_commands();
    let items = saved_items(&commands);
    let mut sources: Vec<_> = items.iter().map(|item| item.src.as_str()).collect();
    sources.sort_unstable();
    assert_eq!(sources, ["http://a.test/1.jpg", "http://a.test/2.jpg"]);
    for item in &items {
        assert_eq!(item.path.as_deref(), Some(page));
        assert_eq!(item.owner, Some(user()));
        assert!(item.width.is_some() && item.height.is_some());
    }

    let views = saved_views(&commands);
    assert_eq!(views.len(), 1);
    let mut shown = h.ids(gallery);
    shown.sort();
    let mut persisted = views[0].items.clone();
    persisted.sort();
    assert_eq!(shown, persisted);
    assert_eq!(shown.len(), 2);
}

#[tokio::test]
async fn fill_where_every_candidate_fails_still_finishes() {
    let mut h = Fixture::new()
        .harvest(&["http://a.test/gone.jpg", "http://a.test/also-gone.jpg"])
        .build();
    let dogs = h.carousel("dogs").await;

    let carousel = h.board.carousel(dogs).unwrap();
    assert!(!carousel.is_loading());
    assert!(carousel.get_ids().is_empty());
    let commands = h.take_commands();
    assert!(saved_items(&commands).is_empty());
    // Nothing to persist for an empty carousel.
    assert!(saved_views(&commands).is_empty());
}

#[tokio::test]
async fn fill_respects_the_collector_limit() {
    let sources: Vec<String> =
        (0..5).map(|n| format!("http://a.test/{n}.jpg")).collect();
    let config = CarouselConfig {
        collector: pix_carousel::config::CollectorConfig {
            limit: 3,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut fixture = Fixture::new().config(config);
    fixture.harvester.sources = sources.clone();
    for src in &sources {
        fixture = fixture.probe(src, 400, 400);
    }
    let mut h = fixture.build();
    let dogs = h.carousel("dogs").await;

    assert_eq!(h.ids(dogs).len(), 3);
    assert_eq!(saved_items(&h.take_commands()).len(), 3);
}

#[tokio::test]
async fn disabled_sources_leave_the_carousel_empty() {
    let config = CarouselConfig {
        preload_local: false,
        preload_search: false,
        ..Default::default()
    };
    let mut h = Fixture::new()
        .config(config)
        .harvest(&["http://a.test/1.jpg"])
        .probe("http://a.test/1.jpg", 400, 400)
        .build();
    let dogs = h.carousel("dogs").await;
    assert!(h.ids(dogs).is_empty());
    assert!(!h.board.carousel(dogs).unwrap().is_loading());
}

#[tokio::test]
async fn include_falls_back_to_the_page_image() {
    let mut h = Fixture::new()
        .items([item(1, USER)])
        .view("cats", &[1])
        .page("http://blog.test/post", "Post", "img.test/cover.jpg")
        .probe("http://img.test/cover.jpg", 800, 600)
        .build();
    let cats = h.carousel("cats").await;
    h.take_commands();

    let task = h.board.with_carousel(cats, |c| {
        c.include("blog.test/post", None).expect("valid source")
    });
    h.board.settle(task).await;

    let commands = h.take_commands();
    let saved = saved_items(&commands);
    assert_eq!(saved.len(), 1);
    let link = &saved[0];
    assert_eq!(link.kind, ItemKind::Link);
    assert_eq!(link.src, "http://img.test/cover.jpg");
    assert_eq!(link.link.as_deref(), Some("http://blog.test/post"));
    assert_eq!(link.title.as_deref(), Some("Post"));
    assert_eq!(link.width, Some(800));

    let new_id = ItemId(1000);
    assert_eq!(h.ids(cats), vec![ItemId(1), new_id]);
    assert_eq!(updates(&commands), vec![(ItemId(900), vec![ItemId(1), new_id])]);
    let carousel = h.board.carousel(cats).unwrap();
    assert_eq!(carousel.pending_includes(), 0);
    assert_eq!(
        carousel.tap(new_id),
        TapAction::Open("http://blog.test/post".to_owned())
    );
}

#[tokio::test]
async fn include_gives_up_when_the_page_image_fails_too() {
    let mut h = Fixture::new()
        .items([item(1, USER)])
        .view("cats", &[1])
        .page("http://blog.test/post", "Post", "http://img.test/broken.jpg")
        .build();
    let cats = h.carousel("cats").await;
    h.take_commands();

    let task = h.board.with_carousel(cats, |c| {
        c.include("http://blog.test/post", None).expect("valid source")
    });
    h.board.settle(task).await;

    assert_eq!(h.ids(cats), ids(&[1]));
    assert_eq!(h.board.carousel(cats).unwrap().pending_includes(), 0);
    assert!(h.take_commands().is_empty());
}

#[tokio::test]
async fn include_refuses_an_image_without_area() {
    let mut h = Fixture::new()
        .items([item(1, USER)])
        .view("cats", &[1])
        .probe("http://img.test/flat.png", 640, 0)
        .build();
    let cats = h.carousel("cats").await;
    h.take_commands();

    let task = h.board.with_carousel(cats, |c| {
        c.include("http://img.test/flat.png", None).expect("valid source")
    });
    h.board.settle(task).await;

    assert_eq!(h.ids(cats), ids(&[1]));
    assert_eq!(h.board.carousel(cats).unwrap().pending_includes(), 0);
    assert!(h.take_commands().is_empty());
}

#[tokio::test]
async fn include_gives_up_when_the_page_has_no_image() {
    let mut h = Fixture::new()
        .items([item(1, USER)])
        .view("cats", &[1])
        .build();
    let cats = h.carousel("cats").await;
    h.take_commands();

    let task = h.board.with_carousel(cats, |c| {
        c.include("http://nothing.test/", None).expect("valid source")
    });
    h.board.settle(task).await;

    assert_eq!(h.ids(cats), ids(&[1]));
    assert!(h.take_commands().is_empty());
}

#[tokio::test]
async fn video_links_are_saved_without_probing() {
    let mut h = Fixture::new()
        .items([item(1, USER)])
        .view("cats", &[1])
        .build();
    let cats = h.carousel("cats").await;
    h.take_commands();

    let task = h.board.with_carousel(cats, |c| {
        c.include("https://www.youtube.com/watch?v=abc123", Some(ItemId(1)))
            .expect("valid source")
    });
    h.board.settle(task).await;

    let saved = saved_items(&h.take_commands());
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].kind, ItemKind::Embed);
    assert_eq!(h.ids(cats), vec![ItemId(1000), ItemId(1)]);
    assert_eq!(
        h.board.carousel(cats).unwrap().tap(ItemId(1000)),
        TapAction::Play("https://www.youtube.com/embed/abc123?rel=0".to_owned())
    );
}

#[tokio::test]
async fn including_a_shown_source_replaces_its_thumbnail() {
    let mut h = Fixture::new()
        .items([item(1, USER), item(2, USER)])
        .view("cats", &[1, 2])
        .probe("http://img.test/1.jpg", 500, 500)
        .build();
    let cats = h.carousel("cats").await;
    h.take_commands();

    let task = h.board.with_carousel(cats, |c| {
        c.include("http://img.test/1.jpg", None).expect("valid source")
    });
    h.board.settle(task).await;

    assert_eq!(h.ids(cats), vec![ItemId(2), ItemId(1000)]);
    assert_eq!(
        updates(&h.take_commands()),
        vec![(ItemId(900), vec![ItemId(2), ItemId(1000)])]
    );
}

#[tokio::test]
async fn blank_source_is_rejected() {
    let mut h = Fixture::new().build();
    let cats = h.carousel("cats").await;
    let carousel = h.board.carousel_mut(cats).unwrap();
    assert!(matches!(
        carousel.include("   ", None),
        Err(CoreError::InvalidSource(_))
    ));
    assert_eq!(carousel.pending_includes(), 0);
}

#[tokio::test]
async fn prepend_takes_the_first_fetch_limit_items() {
    let mut h = Fixture::new()
        .items((1..=11).map(|id| item(id, USER)))
        .view("cats", &[1])
        .view("dogs", &[2, 3, 4, 5, 6, 7, 8, 9, 10, 11])
        .build();
    let cats = h.carousel("cats").await;
    h.take_commands();

    let task = h.board.with_carousel(cats, |c| c.prepend_view("Dogs"));
    h.board.settle(task).await;

    let expected = ids(&[2, 3, 4, 5, 6, 7, 8, 9, 1]);
    assert_eq!(h.ids(cats), expected);
    assert_eq!(updates(&h.take_commands()), vec![(ItemId(900), expected)]);
}

#[tokio::test]
async fn prepend_of_a_missing_view_changes_nothing() {
    let mut h = Fixture::new()
        .items([item(1, USER)])
        .view("cats", &[1])
        .build();
    let cats = h.carousel("cats").await;
    h.take_commands();

    let task = h.board.with_carousel(cats, |c| c.prepend_view("nowhere"));
    h.board.settle(task).await;
    assert_eq!(h.ids(cats), ids(&[1]));
    assert!(updates(&h.take_commands()).is_empty());
}

#[tokio::test]
async fn recent_items_are_listed_but_never_persisted() {
    let mut h = Fixture::new()
        .items([item(20, "bob"), item(21, "bob"), item(22, USER)])
        .build();
    let recent = h.board.add_carousel();
    let task = h
        .board
        .with_carousel(recent, |c| c.load_recent(UserId::from("bob")));
    h.board.settle(task).await;

    assert_eq!(h.ids(recent), ids(&[21, 20]));
    let carousel = h.board.carousel(recent).unwrap();
    assert!(carousel.view_model().is_detached());
    assert!(!carousel.removal_enabled(ItemId(20)));
    let commands = h.take_commands();
    assert!(matches!(
        commands.as_slice(),
        [Command::Load {
            limit: Some(32),
            order: SortOrder::Newest,
            ..
        }]
    ));

    let task = h.board.with_carousel(recent, |c| c.remove(ItemId(20)));
    h.board.settle(task).await;
    assert_eq!(h.ids(recent), ids(&[21]));
    assert!(h.take_commands().is_empty());
}

#[tokio::test]
async fn recent_listing_keeps_the_newest_items() {
    let mut h = Fixture::new()
        .items((1..=40).map(|id| item(id, "bob")))
        .build();
    let recent = h.board.add_carousel();
    let task = h
        .board
        .with_carousel(recent, |c| c.load_recent(UserId::from("bob")));
    h.board.settle(task).await;

    let listed = h.ids(recent);
    assert_eq!(listed.len(), 32);
    assert_eq!(listed.first(), Some(&ItemId(40)));
    assert_eq!(listed.last(), Some(&ItemId(9)));
}

#[tokio::test]
async fn tags_route_to_the_named_owner() {
    let mut h = Fixture::new()
        .items([item(1, "bob"), item(2, USER)])
        .owned_view("cats", "bob", &[1])
        .view("cats", &[2])
        .build();
    let c = h.carousel("dogs").await;
    h.take_commands();

    let task = h.board.with_carousel(c, |c| c.on_tag("@bob", Some("Cats")));
    h.board.settle(task).await;
    assert_eq!(h.board.carousel(c).unwrap().path(), "cats");
    assert_eq!(h.ids(c), ids(&[1]));
    assert!(
        h.take_commands()
            .contains(&Command::get(Filter::view("cats", UserId::from("bob"))))
    );

    let task = h.board.with_carousel(c, |c| c.on_tag("cats", None));
    h.board.settle(task).await;
    assert_eq!(h.ids(c), ids(&[2]));
}

#[tokio::test]
async fn mutations_during_the_first_save_fold_into_one_update() {
    let mut h = Fixture::new()
        .items((1..=3).map(|id| item(id, USER)))
        .public_view("birds", &[1, 2, 3])
        .build();
    let birds = h.carousel("birds").await;
    h.take_commands();

    let task = h.board.with_carousel(birds, |c| {
        let first = c.remove(ItemId(1));
        let second = c.remove(ItemId(2));
        assert!(second.is_none());
        first
    });
    h.board.settle(task).await;

    let commands = h.take_commands();
    let saved = saved_views(&commands);
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].items, ids(&[2, 3]));
    assert_eq!(updates(&commands), vec![(ItemId(1000), ids(&[3]))]);
    assert_eq!(h.ids(birds), ids(&[3]));
}

#[tokio::test]
async fn late_save_reply_for_a_previous_path_keeps_the_fold() {
    let mut h = Fixture::new()
        .items((1..=3).map(|id| item(id, USER)))
        .public_view("cats", &[1, 2, 3])
        .public_view("dogs", &[1, 2, 3])
        .build();
    let c = h.carousel("cats").await;
    let cats_save = h.board.with_carousel(c, |c| c.remove(ItemId(1)));

    let task = h.board.with_carousel(c, |c| c.load_view("dogs", None));
    h.board.settle(task).await;
    assert_eq!(h.ids(c), ids(&[1, 2, 3]));
    h.take_commands();

    let dogs_save = h.board.with_carousel(c, |c| c.remove(ItemId(1)));
    h.board.settle(cats_save).await;
    let folded = h.board.with_carousel(c, |c| c.remove(ItemId(2)));
    assert!(folded.is_none());
    h.board.settle(dogs_save).await;

    let commands = h.take_commands();
    let saved = saved_views(&commands);
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].path, "dogs");
    assert_eq!(saved[0].items, ids(&[2, 3]));
    assert_eq!(updates(&commands), vec![(ItemId(1001), ids(&[3]))]);
    assert_eq!(h.ids(c), ids(&[3]));
}

#[tokio::test]
async fn load_shows_saved_items_without_persisting() {
    let mut h = Fixture::new()
        .items([item(1, USER)])
        .view("cats", &[1])
        .build();
    let cats = h.carousel("cats").await;
    h.take_commands();

    let carousel = h.board.carousel_mut(cats).unwrap();
    let added = carousel.load(vec![
        item(5, USER),
        item(1, USER),
        Item::image("http://img.test/unsaved.jpg"),
    ]);
    assert_eq!(added, 1);
    assert_eq!(carousel.get_ids(), ids(&[1, 5]));
    assert_eq!(carousel.list().len(), 2);
    assert!(h.take_commands().is_empty());
}
