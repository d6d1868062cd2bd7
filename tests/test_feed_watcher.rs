mod common;

use chrono::{Duration, Utc};
use common::{body, entry, setup_with, RecordingDispatch, Stubs};
use signaldesk::application::feed_state::FeedState;
use signaldesk::domain::ports::feed_source::{FeedError, FetchResponse};
use signaldesk::domain::ports::news_event_repository::NewsEventRepository;
use signaldesk::infrastructure::sqlite::event_repo::SqliteNewsEventRepo;
use std::sync::Arc;

fn two_entries() -> Vec<signaldesk::domain::ports::feed_source::FeedEntry> {
    let now = Utc::now();
    vec![
        entry("https://news.example.com/a", "NVDA jumps on AI demand", Some(now)),
        entry("https://news.example.com/b", "Oil slides", Some(now - Duration::minutes(5))),
    ]
}

#[tokio::test]
async fn test_repeated_polls_do_not_duplicate_items() {
    let h = setup_with(Stubs {
        feed: vec![body("v1", None), body("v1", None)],
        entries: two_entries(),
        ..Default::default()
    });
    let dispatch = Arc::new(RecordingDispatch::default());
    let watcher = h.desk.watcher_since(dispatch.clone(), Utc::now() - Duration::hours(1));

    let first = watcher.poll_all_once().await;
    assert_eq!(first[0].entries_added, 2);

    // Fresh state each pass, so the same body is parsed again.
    let second = watcher.poll_all_once().await;
    assert_eq!(second[0].entries_added, 0);
    assert_eq!(second[0].entries_deduped, 2);
    assert_eq!(dispatch.links().len(), 2);
}

#[tokio::test]
async fn test_identical_body_is_not_reparsed() {
    let h = setup_with(Stubs {
        feed: vec![body("v1", Some("\"e1\"")), body("v1", Some("\"e1\""))],
        entries: two_entries(),
        ..Default::default()
    });
    let dispatch = Arc::new(RecordingDispatch::default());
    let watcher = h.desk.watcher_since(dispatch.clone(), Utc::now() - Duration::hours(1));
    let spec = watcher.feeds()[0].clone();
    let mut state = FeedState::default();

    let first = watcher.poll_source(&spec, &mut state, Utc::now()).await;
    assert_eq!(first.entries_added, 2);
    assert_eq!(state.etag.as_deref(), Some("\"e1\""));

    let second = watcher.poll_source(&spec, &mut state, Utc::now()).await;
    assert!(second.unchanged);
    assert_eq!(second.entries_added, 0);
    assert_eq!(h.feed.parse_count(), 1);
    assert_eq!(h.feed.requests()[1].etag.as_deref(), Some("\"e1\""));
}

#[tokio::test]
async fn test_not_modified_resets_errors() {
    let h = setup_with(Stubs {
        feed: vec![Err(FeedError::Status(503)), Ok(FetchResponse::NotModified)],
        entries: two_entries(),
        ..Default::default()
    });
    let watcher = h.desk.watcher_since(Arc::new(RecordingDispatch::default()), Utc::now());
    let spec = watcher.feeds()[0].clone();
    let mut state = FeedState::default();

    let t0 = Utc::now();
    let failed = watcher.poll_source(&spec, &mut state, t0).await;
    assert_eq!(failed.errors.len(), 1);
    assert_eq!(state.consecutive_errors, 1);
    // 30 s interval plus a 30 s penalty, strictly exceeded.
    assert!(!state.should_poll(t0 + Duration::seconds(60), &spec.policy));
    assert!(state.should_poll(t0 + Duration::seconds(61), &spec.policy));

    let unchanged = watcher.poll_source(&spec, &mut state, t0 + Duration::seconds(61)).await;
    assert!(unchanged.unchanged);
    assert!(unchanged.errors.is_empty());
    assert_eq!(state.consecutive_errors, 0);
    assert_eq!(h.feed.parse_count(), 0);
}

#[tokio::test]
async fn test_entries_before_cutoff_are_skipped() {
    let now = Utc::now();
    let h = setup_with(Stubs {
        feed: vec![body("v1", None)],
        entries: vec![
            entry("https://news.example.com/old", "Old story", Some(now - Duration::days(2))),
            entry("https://news.example.com/new", "New story", Some(now)),
            entry("https://news.example.com/undated", "Undated story", None),
        ],
        ..Default::default()
    });
    let dispatch = Arc::new(RecordingDispatch::default());
    let watcher = h.desk.watcher_since(dispatch.clone(), now - Duration::hours(1));

    let results = watcher.poll_all_once().await;
    assert_eq!(results[0].entries_fetched, 3);
    assert_eq!(results[0].entries_too_old, 1);
    assert_eq!(results[0].entries_added, 2);
    assert!(!dispatch.links().contains(&"https://news.example.com/old".to_string()));
}

#[tokio::test]
async fn test_new_items_queue_ticker_events() {
    let h = setup_with(Stubs {
        feed: vec![body("v1", None)],
        entries: two_entries(),
        ..Default::default()
    });
    let watcher = h.desk.watcher_since(
        Arc::new(RecordingDispatch::default()),
        Utc::now() - Duration::hours(1),
    );
    watcher.poll_all_once().await;

    let events = SqliteNewsEventRepo::new(h.conn.clone());
    let nvda = events.take_unprocessed("NVDA").unwrap();
    assert_eq!(nvda.len(), 1);
    assert_eq!(nvda[0].headline, "NVDA jumps on AI demand");
    assert!(events.take_unprocessed("NVDA").unwrap().is_empty());
}

#[tokio::test]
async fn test_watch_loop_stops_on_cancel() {
    let h = setup_with(Stubs {
        entries: two_entries(),
        ..Default::default()
    });
    let dispatch = Arc::new(RecordingDispatch::default());
    let watcher = Arc::new(h.desk.watcher_since(dispatch.clone(), Utc::now() - Duration::hours(1)));
    let cancel = tokio_util::sync::CancellationToken::new();

    let task = tokio::spawn(watcher.clone().run(cancel.clone()));
    for _ in 0..100 {
        if dispatch.links().len() == 2 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    cancel.cancel();
    tokio::time::timeout(std::time::Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(dispatch.links().len(), 2);
}
