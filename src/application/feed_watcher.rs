use crate::application::dispatcher::NewsDispatch;
use crate::application::feed_state::{fingerprint, FeedState, PollPolicy};
use crate::application::ticker_scan::scan_tickers;
use crate::domain::entities::news_event::NewsEvent;
use crate::domain::entities::news_item::NewsItem;
use crate::domain::ports::feed_source::{FeedEntry, FeedError, FeedSource, FetchResponse};
use crate::domain::ports::news_event_repository::NewsEventRepository;
use crate::domain::ports::news_repository::NewsRepository;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// One syndication endpoint to watch.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSpec {
    pub name: String,
    pub url: String,
    pub policy: PollPolicy,
}

/// Outcome of polling one source once.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedResult {
    pub feed_name: String,
    pub entries_fetched: usize,
    pub entries_added: usize,
    pub entries_deduped: usize,
    pub entries_too_old: usize,
    /// 304, or a body identical to the previous one.
    pub unchanged: bool,
    pub errors: Vec<String>,
}

impl FeedResult {
    fn new(feed_name: &str) -> Self {
        Self {
            feed_name: feed_name.to_string(),
            ..Default::default()
        }
    }
}

pub struct FeedWatcher {
    feeds: Vec<FeedSpec>,
    source: Arc<dyn FeedSource>,
    news_repo: Arc<dyn NewsRepository>,
    event_repo: Arc<dyn NewsEventRepository>,
    dispatch: Arc<dyn NewsDispatch>,
    /// Entries published before this instant are ignored.
    since: DateTime<Utc>,
    tick: Duration,
    request_timeout: Duration,
}

impl FeedWatcher {
    pub fn new(
        feeds: Vec<FeedSpec>,
        source: Arc<dyn FeedSource>,
        news_repo: Arc<dyn NewsRepository>,
        event_repo: Arc<dyn NewsEventRepository>,
        dispatch: Arc<dyn NewsDispatch>,
    ) -> Self {
        Self {
            feeds,
            source,
            news_repo,
            event_repo,
            dispatch,
            since: Utc::now(),
            tick: Duration::from_secs(1),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Overrides the startup cutoff.
    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = since;
        self
    }

    pub fn with_timing(mut self, tick: Duration, request_timeout: Duration) -> Self {
        self.tick = tick;
        self.request_timeout = request_timeout;
        self
    }

    pub fn feeds(&self) -> &[FeedSpec] {
        &self.feeds
    }

    /// Polls every source once, concurrently, with fresh state.
    pub async fn poll_all_once(&self) -> Vec<FeedResult> {
        let polls = self.feeds.iter().map(|spec| async move {
            let mut state = FeedState::default();
            self.poll_source(spec, &mut state, Utc::now())
                .instrument(tracing::info_span!("feed", source = %spec.name))
                .await
        });
        join_all(polls).await
    }

    /// One task per source until cancelled. A failing source never delays
    /// the others.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        let mut tasks = JoinSet::new();
        for index in 0..self.feeds.len() {
            let watcher = self.clone();
            let cancel = cancel.clone();
            let span = tracing::info_span!("feed", source = %self.feeds[index].name);
            tasks.spawn(
                async move { watcher.watch_source(index, cancel).await }.instrument(span),
            );
        }
        tracing::info!(sources = self.feeds.len(), "feed watcher started");
        while let Some(res) = tasks.join_next().await {
            if let Err(e) = res {
                tracing::error!(error = %e, "feed task failed");
            }
        }
    }

    async fn watch_source(&self, index: usize, cancel: CancellationToken) {
        let spec = &self.feeds[index];
        let mut state = FeedState::default();
        loop {
            let now = Utc::now();
            if state.should_poll(now, &spec.policy) {
                let result = self.poll_source(spec, &mut state, now).await;
                if result.entries_added > 0 {
                    tracing::info!(added = result.entries_added, fetched = result.entries_fetched, "new items");
                }
            }
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.tick) => {}
            }
        }
        tracing::debug!("feed task stopped");
    }

    /// One conditional fetch of `spec`, updating `state`.
    pub async fn poll_source(
        &self,
        spec: &FeedSpec,
        state: &mut FeedState,
        now: DateTime<Utc>,
    ) -> FeedResult {
        let mut result = FeedResult::new(&spec.name);

        let fetched = match tokio::time::timeout(
            self.request_timeout,
            self.source.fetch(&spec.url, &state.validators()),
        )
        .await
        {
            Ok(res) => res,
            Err(_) => Err(FeedError::Network(format!(
                "timed out after {:?}",
                self.request_timeout
            ))),
        };

        let (body, etag, last_modified) = match fetched {
            Ok(FetchResponse::NotModified) => {
                state.record_not_modified(now);
                result.unchanged = true;
                tracing::debug!("not modified");
                return result;
            }
            Ok(FetchResponse::Body {
                body,
                etag,
                last_modified,
            }) => (body, etag, last_modified),
            Err(e) => return self.fail(state, now, result, e),
        };

        let fp = fingerprint(&body);
        if state.is_unchanged(&fp) {
            state.record_success(now, etag, last_modified, fp);
            result.unchanged = true;
            tracing::debug!("identical content");
            return result;
        }

        let entries = match self.source.parse(&body) {
            Ok(entries) => entries,
            Err(e) => return self.fail(state, now, result, e),
        };
        state.record_success(now, etag, last_modified, fp.clone());
        result.entries_fetched = entries.len();

        for entry in entries {
            self.ingest(spec, entry, &fp, now, &mut result);
        }
        result
    }

    fn fail(
        &self,
        state: &mut FeedState,
        now: DateTime<Utc>,
        mut result: FeedResult,
        error: FeedError,
    ) -> FeedResult {
        state.record_error(now);
        tracing::warn!(error = %error, consecutive_errors = state.consecutive_errors, "feed poll failed");
        result.errors.push(error.to_string());
        result
    }

    fn ingest(
        &self,
        spec: &FeedSpec,
        entry: FeedEntry,
        fp: &str,
        now: DateTime<Utc>,
        result: &mut FeedResult,
    ) {
        let published_at = entry.published_at.unwrap_or(now);
        if published_at < self.since {
            result.entries_too_old += 1;
            return;
        }

        match self.news_repo.exists(&entry.link) {
            Ok(true) => {
                result.entries_deduped += 1;
                return;
            }
            Ok(false) => {}
            Err(e) => {
                result.errors.push(format!("{}: {e}", entry.link));
                return;
            }
        }

        let title = if entry.title.is_empty() {
            "(untitled)".to_string()
        } else {
            entry.title
        };
        let item = NewsItem::new(
            spec.name.clone(),
            title,
            entry.link,
            entry.summary,
            published_at,
            fp.to_string(),
        );

        match self.news_repo.insert_if_absent(&item) {
            Ok(true) => {}
            Ok(false) => {
                result.entries_deduped += 1;
                return;
            }
            Err(e) => {
                tracing::warn!(link = %item.link, error = %e, "failed to store item");
                result.errors.push(format!("{}: {e}", item.link));
                return;
            }
        }
        result.entries_added += 1;
        tracing::info!(link = %item.link, title = %item.title, "new item");

        for ticker in scan_tickers(&item.scannable_text()) {
            let event = NewsEvent::new(ticker, item.title.clone(), item.link.clone());
            if let Err(e) = self.event_repo.record(&event) {
                tracing::warn!(ticker = %event.ticker, error = %e, "failed to record news event");
            }
        }

        self.dispatch.dispatch(item);
    }
}
