mod common;

use common::{news_item, setup, setup_with, Stubs};
use signaldesk::application::dispatcher::NewsDispatch;
use signaldesk::domain::values::action::Action;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_dispatched_items_are_all_decided() {
    let h = setup();
    let dispatcher = h.desk.start_dispatcher(CancellationToken::new());
    for i in 0..5 {
        dispatcher.dispatch(news_item(&format!("https://news.example.com/{i}")));
    }
    dispatcher.shutdown().await;

    let decisions = h.desk.decisions(10).unwrap();
    assert_eq!(decisions.len(), 5);
    assert!(decisions
        .iter()
        .all(|s| s.decision.as_ref().map(|d| d.action) == Some(Action::Long)));
    assert_eq!(h.desk.positions(None, None, None).unwrap().len(), 5);
}

#[tokio::test]
async fn test_panicking_run_records_error_decision() {
    let h = setup_with(Stubs {
        panic_on_decide: true,
        ..Default::default()
    });
    let dispatcher = h.desk.start_dispatcher(CancellationToken::new());
    dispatcher.dispatch(news_item("https://news.example.com/boom"));
    dispatcher.dispatch(news_item("https://news.example.com/boom-2"));
    dispatcher.shutdown().await;

    for link in ["https://news.example.com/boom", "https://news.example.com/boom-2"] {
        let stored = h.desk.news(link).unwrap();
        assert_eq!(stored.decision.unwrap().action, Action::Error);
    }
    assert!(h.desk.positions(None, None, None).unwrap().is_empty());
}

#[tokio::test]
async fn test_cancelled_dispatcher_shuts_down() {
    let h = setup();
    let cancel = CancellationToken::new();
    let dispatcher = h.desk.start_dispatcher(cancel.clone());
    cancel.cancel();
    tokio::time::timeout(std::time::Duration::from_secs(5), dispatcher.shutdown())
        .await
        .unwrap();
}
