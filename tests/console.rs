mod support;

use catalogctl::http::HttpClient;
use catalogctl::catalog::CatalogClient;
use catalogctl::loader::CollectionLoad;
use catalogctl::models::EntityId;
use catalogctl::poster::ImageResolver;
use catalogctl::sections::{DeleteOutcome, EpisodeForm, SeasonForm};
use catalogctl::Console;
use serde_json::json;
use std::cell::Cell;
use std::time::Duration;
use support::{episode, season, show, Stub};

fn ids(rows: impl IntoIterator<Item = EntityId>) -> Vec<u64> {
    rows.into_iter().map(|id| id.0).collect()
}

#[tokio::test]
async fn load_orders_every_collection_newest_first() {
    let stub = Stub::start().await;
    stub.seed(
        "tv_shows",
        vec![show(3, "Dark", "70523"), show(12, "Lost", "4607"), show(7, "Fargo", "60622")],
    );
    stub.seed("seasons", vec![season(2, 3, 1), season(9, 3, 2)]);
    stub.seed(
        "movies",
        vec![
            json!({"id": "5", "title": "Heat", "thumbnail": "", "is_featured": "1"}),
            json!({"id": 40, "title": "Alien", "thumbnail": null, "is_featured": 0}),
        ],
    );

    let mut console = stub.console();
    let report = console.load().await;

    assert!(report.all_loaded());
    assert_eq!(ids(console.store().shows.ids()), vec![12, 7, 3]);
    assert_eq!(ids(console.store().seasons.ids()), vec![9, 2]);
    assert_eq!(ids(console.store().movies.ids()), vec![40, 5]);
    assert!(console.store().episodes.is_empty());

    let summary = console.summary();
    assert_eq!(summary.shows, 3);
    assert_eq!(summary.featured, 1);
}

#[tokio::test]
async fn load_of_an_empty_catalog() {
    let stub = Stub::start().await;
    let mut console = stub.console();

    let report = console.load().await;

    assert_eq!(report.shows, CollectionLoad::Loaded(0));
    assert_eq!(report.movies, CollectionLoad::Loaded(0));
    assert!(console.store().shows.is_empty());
    assert!(console.store().seasons.is_empty());
}

#[tokio::test]
async fn failed_collection_keeps_its_previous_rows() {
    let stub = Stub::start().await;
    stub.seed("tv_shows", vec![show(1, "Dark", "70523")]);
    stub.seed("seasons", vec![season(4, 1, 1)]);

    let mut console = stub.console();
    assert!(console.load().await.all_loaded());

    stub.seed("tv_shows", vec![show(2, "Lost", "4607")]);
    stub.seed("seasons", vec![season(5, 2, 1)]);
    stub.with(|s| s.failing.insert("seasons".into()));

    let report = console.load().await;

    assert!(!report.all_loaded());
    assert!(matches!(report.seasons, CollectionLoad::Failed(_)));
    assert_eq!(ids(console.store().shows.ids()), vec![2, 1]);
    assert_eq!(ids(console.store().seasons.ids()), vec![4]);
}

#[tokio::test]
async fn unreachable_backend_leaves_an_empty_store() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let http = HttpClient::new(Duration::from_secs(2)).unwrap();
    let api = CatalogClient::new(http, format!("http://{addr}"));
    let mut console = Console::new(api, ImageResolver::new("https://img", "placeholder.png"));

    let report = console.load().await;

    assert!(matches!(report.shows, CollectionLoad::Failed(_)));
    assert!(matches!(report.movies, CollectionLoad::Failed(_)));
    assert_eq!(console.summary().shows, 0);
}

#[tokio::test]
async fn season_create_sends_the_legacy_show_reference() {
    let stub = Stub::start().await;
    stub.seed("tv_shows", vec![show(7, "Fargo", "60622")]);
    let mut console = stub.console();
    console.load().await;

    let form = SeasonForm {
        show_id: Some(EntityId(7)),
        name: "S01 : Fargo".into(),
        ..SeasonForm::default()
    };
    let created = console.create_season(&form).await.unwrap().unwrap();

    let stored = stub.row("seasons", created.id.0).unwrap();
    assert_eq!(stored["tv_show_id"], "[\"7\"]");
    assert_eq!(stored["status"], 1);

    let local = console.store().seasons.get(created.id).unwrap();
    assert_eq!(local.show_id, Some(EntityId(7)));
    assert_eq!(console.seasons(Some(EntityId(7))).len(), 1);
}

#[tokio::test]
async fn create_without_an_echoed_row_reloads() {
    let stub = Stub::start().await;
    stub.seed("tv_shows", vec![show(7, "Fargo", "60622")]);
    stub.with(|s| s.echo_rows = false);
    let mut console = stub.console();
    console.load().await;
    let gets_before = stub.count("GET /seasons");

    let form = SeasonForm {
        show_id: Some(EntityId(7)),
        name: "S02 : Fargo".into(),
        order: 2,
        ..SeasonForm::default()
    };
    let created = console.create_season(&form).await.unwrap();

    assert!(created.is_none());
    assert_eq!(stub.count("GET /seasons"), gets_before + 1);
    assert_eq!(console.store().seasons.len(), 1);
    let season = console.store().seasons.iter().next().unwrap();
    assert_eq!(season.season_name, "S02 : Fargo");
}

#[tokio::test]
async fn validation_failure_sends_nothing() {
    let stub = Stub::start().await;
    let mut console = stub.console();
    console.load().await;
    let before = stub.requests().len();

    let err = console
        .create_season(&SeasonForm::default())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("required"));
    assert_eq!(stub.requests().len(), before);
}

#[tokio::test]
async fn repeating_an_update_is_idempotent() {
    let stub = Stub::start().await;
    stub.seed("tv_shows", vec![show(7, "Fargo", "60622")]);
    stub.seed("seasons", vec![season(4, 7, 1)]);
    let mut console = stub.console();
    console.load().await;

    let mut form = console.season_form(EntityId(4)).unwrap();
    form.name = "S01 : Fargo".into();
    form.published = false;

    let first = console.update_season(EntityId(4), &form).await.unwrap();
    let server_after_first = stub.row("seasons", 4).unwrap();
    let second = console.update_season(EntityId(4), &form).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(stub.row("seasons", 4).unwrap(), server_after_first);
    assert_eq!(server_after_first["status"], 0);
    assert_eq!(console.store().seasons.len(), 1);
    assert_eq!(console.store().seasons.get(EntityId(4)), Some(&second));
}

#[tokio::test]
async fn deleting_a_season_drops_its_episodes() {
    let stub = Stub::start().await;
    stub.seed("tv_shows", vec![show(7, "Fargo", "60622")]);
    stub.seed("seasons", vec![season(4, 7, 1), season(5, 7, 2)]);
    stub.seed(
        "episodes",
        vec![episode(10, 4, 7, 1), episode(11, 4, 7, 2), episode(12, 5, 7, 1)],
    );
    let mut console = stub.console();
    console.load().await;

    let asked = Cell::new(None);
    let confirm = |prompt: &str| {
        asked.set(Some(prompt.to_string()));
        true
    };
    let outcome = console.delete_season(EntityId(4), &confirm).await.unwrap();

    let DeleteOutcome::Deleted(removed) = outcome else {
        panic!("expected a delete, got {outcome:?}");
    };
    assert_eq!(removed.seasons, 1);
    assert_eq!(removed.episodes, 2);
    assert!(asked.take().unwrap().contains("2 episode(s)"));

    assert_eq!(ids(console.store().episodes.ids()), vec![12]);
    assert_eq!(stub.rows("episodes").len(), 1);

    console.load().await;
    assert_eq!(ids(console.store().seasons.ids()), vec![5]);
    assert_eq!(ids(console.store().episodes.ids()), vec![12]);
}

#[tokio::test]
async fn deleting_a_show_cascades_locally() {
    let stub = Stub::start().await;
    stub.seed("tv_shows", vec![show(7, "Fargo", "60622"), show(8, "Dark", "70523")]);
    stub.seed("seasons", vec![season(4, 7, 1), season(5, 8, 1)]);
    stub.seed("episodes", vec![episode(10, 4, 7, 1), episode(12, 5, 8, 1)]);
    let mut console = stub.console();
    console.load().await;

    let outcome = console
        .delete_show(EntityId(7), &|_: &str| true)
        .await
        .unwrap();

    assert!(matches!(outcome, DeleteOutcome::Deleted(r) if r.seasons == 1 && r.episodes == 1));
    assert_eq!(ids(console.store().shows.ids()), vec![8]);
    assert_eq!(ids(console.store().seasons.ids()), vec![5]);
    assert_eq!(ids(console.store().episodes.ids()), vec![12]);
    assert_eq!(stub.rows("seasons").len(), 1);
}

#[tokio::test]
async fn cancelled_delete_sends_no_request() {
    let stub = Stub::start().await;
    stub.seed("movies", vec![json!({"id": 3, "title": "Heat", "thumbnail": "", "is_featured": 0})]);
    let mut console = stub.console();
    console.load().await;

    let outcome = console
        .delete_movie(EntityId(3), &|_: &str| false)
        .await
        .unwrap();

    assert_eq!(outcome, DeleteOutcome::Cancelled);
    assert_eq!(stub.count("DELETE"), 0);
    assert_eq!(console.store().movies.len(), 1);
}

#[tokio::test]
async fn featuring_a_movie_writes_a_numeric_flag() {
    let stub = Stub::start().await;
    stub.seed("movies", vec![json!({"id": 3, "title": "Heat", "thumbnail": "", "is_featured": "0"})]);
    let mut console = stub.console();
    console.load().await;

    let movie = console.set_featured(EntityId(3), true).await.unwrap();

    assert!(movie.is_featured);
    assert_eq!(stub.row("movies", 3).unwrap()["is_featured"], 1);
    assert_eq!(console.movies(true).len(), 1);
}

#[tokio::test]
async fn episode_create_fills_the_series_from_its_season() {
    let stub = Stub::start().await;
    stub.seed("tv_shows", vec![show(7, "Fargo", "60622")]);
    stub.seed("seasons", vec![season(4, 7, 1)]);
    let mut console = stub.console();
    console.load().await;

    let form = EpisodeForm {
        season_id: Some(EntityId(4)),
        name: "The Crocodile's Dilemma".into(),
        ..EpisodeForm::default()
    };
    let created = console.create_episode(&form).await.unwrap().unwrap();

    assert_eq!(created.series_id, EntityId(7));
    let stored = stub.row("episodes", created.id.0).unwrap();
    assert_eq!(stored["series_id"], 7);
    assert_eq!(stored["season_id"], 4);
    assert_eq!(console.episodes(Some(EntityId(4))).len(), 1);
}

#[tokio::test]
async fn bulk_urls_fill_from_the_start_episode() {
    let stub = Stub::start().await;
    stub.seed("tv_shows", vec![show(7, "Fargo", "60622")]);
    stub.seed("seasons", vec![season(4, 7, 1)]);
    stub.seed(
        "episodes",
        (1..=5).map(|n| episode(100 + n, 4, 7, n as i64)).collect(),
    );
    let mut console = stub.console();
    console.load().await;

    let mut ticks = Vec::new();
    let report = console
        .assign_urls(
            EntityId(4),
            EntityId(103),
            "https://cdn/3.mp4\n\n  https://cdn/4.mp4\nhttps://cdn/5.mp4\n",
            |done, total| ticks.push((done, total)),
        )
        .await
        .unwrap();

    assert_eq!(report.matched, 3);
    assert_eq!(report.updated, 3);
    assert_eq!(report.failed, 0);
    assert_eq!(ticks, vec![(1, 3), (2, 3), (3, 3)]);
    assert_eq!(stub.count("PUT"), 3);

    for (id, url) in [(101, ""), (102, ""), (103, "https://cdn/3.mp4"), (104, "https://cdn/4.mp4"), (105, "https://cdn/5.mp4")] {
        assert_eq!(stub.row("episodes", id).unwrap()["file_url"], url, "episode {id}");
        assert_eq!(
            console.store().episodes.get(EntityId(id)).unwrap().file_url,
            url
        );
    }
}

#[tokio::test]
async fn bulk_urls_stop_at_the_last_episode() {
    let stub = Stub::start().await;
    stub.seed("seasons", vec![season(4, 7, 1)]);
    stub.seed("episodes", vec![episode(101, 4, 7, 1), episode(102, 4, 7, 2)]);
    let mut console = stub.console();
    console.load().await;

    let report = console
        .assign_urls(EntityId(4), EntityId(102), "a\nb\nc", |_, _| {})
        .await
        .unwrap();

    assert_eq!(report.matched, 1);
    assert_eq!(stub.count("PUT"), 1);
    assert_eq!(stub.row("episodes", 102).unwrap()["file_url"], "a");
}

#[tokio::test]
async fn bulk_urls_reject_an_episode_outside_the_season() {
    let stub = Stub::start().await;
    stub.seed("seasons", vec![season(4, 7, 1), season(5, 7, 2)]);
    stub.seed("episodes", vec![episode(101, 4, 7, 1), episode(201, 5, 7, 1)]);
    let mut console = stub.console();
    console.load().await;

    let err = console
        .assign_urls(EntityId(4), EntityId(201), "a", |_, _| {})
        .await
        .unwrap_err();

    assert!(matches!(err, catalogctl::ConsoleError::NotFound { id: 201, .. }));
    assert_eq!(stub.count("PUT"), 0);
}

#[tokio::test]
async fn reload_policy_refetches_after_each_mutation() {
    let stub = Stub::start().await;
    stub.seed("movies", vec![json!({"id": 3, "title": "Heat", "thumbnail": "", "is_featured": 0})]);
    let mut console = stub.console().with_reload_after_mutation(true);
    console.load().await;
    let gets_before = stub.count("GET /movies");

    console.set_featured(EntityId(3), true).await.unwrap();

    assert_eq!(stub.count("GET /movies"), gets_before + 1);
    assert!(console.store().movies.get(EntityId(3)).unwrap().is_featured);
}

#[tokio::test]
async fn deleting_a_movie_reports_it_removed() {
    let stub = Stub::start().await;
    stub.seed("movies", vec![json!({"id": 3, "title": "Heat", "thumbnail": "", "is_featured": 1})]);
    let mut console = stub.console();
    console.load().await;

    let outcome = console
        .delete_movie(EntityId(3), &|_: &str| true)
        .await
        .unwrap();

    let DeleteOutcome::Deleted(removed) = outcome else {
        panic!("expected a delete, got {outcome:?}");
    };
    assert_eq!(removed.movies, 1);
    assert_eq!(stub.count("DELETE /movies/3"), 1);
    assert!(console.store().movies.is_empty());
}

#[tokio::test]
async fn loose_episode_rows_do_not_stale_the_collection() {
    let stub = Stub::start().await;
    stub.seed("seasons", vec![season(4, 7, 1)]);
    let mut orphan = episode(11, 4, 7, 2);
    orphan["season_id"] = json!(null);
    stub.seed("episodes", vec![episode(10, 4, 7, 1), orphan, episode(12, 4, 7, 3)]);
    stub.seed_at("episodes", 13, json!({"id": "abc", "season_id": 4, "episode_name": "Broken"}));
    let mut console = stub.console();

    let report = console.load().await;

    assert_eq!(report.episodes, CollectionLoad::Loaded(3));
    assert_eq!(ids(console.store().episodes.ids()), vec![12, 11, 10]);
    let playable: Vec<u64> = console
        .episodes(Some(EntityId(4)))
        .iter()
        .map(|e| e.id.0)
        .collect();
    assert_eq!(playable, vec![10, 12]);
    assert_eq!(
        console.store().episodes.get(EntityId(11)).unwrap().season_id,
        EntityId(0)
    );
}
