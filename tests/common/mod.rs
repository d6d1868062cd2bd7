//! Shared test helpers: an in-memory desk wired to scripted collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use signaldesk::application::dispatcher::NewsDispatch;
use signaldesk::application::pipeline::{Collaborators, SpecialistTable};
use signaldesk::config::{AppConfig, FeedConfig};
use signaldesk::domain::entities::analysis::InitialAnalysis;
use signaldesk::domain::entities::news_item::NewsItem;
use signaldesk::domain::entities::ticker_candidate::TickerCandidate;
use signaldesk::domain::error::CollaboratorError;
use signaldesk::domain::ports::article_fetcher::ArticleFetcher;
use signaldesk::domain::ports::feed_source::{CacheValidators, FeedEntry, FeedError, FeedSource, FetchResponse};
use signaldesk::domain::ports::inference::{DecisionMaker, DecisionPayload, FocusAnalyst, RawDecision, Summarizer, TickerExtractor};
use signaldesk::domain::ports::market_data::{Instrument, MarketData};
use signaldesk::domain::ports::notifier::{ExitStrategist, Notifier};
use signaldesk::domain::values::agent_kind::AgentKind;
use signaldesk::domain::values::sentiment::Sentiment;
use signaldesk::infrastructure::sqlite::{open_database, SharedConnection};
use signaldesk::SignalDesk;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const FEED_URL: &str = "https://feeds.example.com/markets.rss";

pub fn decision(action: &str, ticker: Option<&str>, allocation: f64) -> RawDecision {
    RawDecision {
        action: action.to_string(),
        ticker: ticker.map(String::from),
        confidence: Some("HIGH".into()),
        horizon: Some("1-2 weeks".into()),
        justification: "Guidance raised above consensus".into(),
        allocation_pct: Some(allocation),
        positives: vec!["Revenue beat".into()],
        negatives: vec!["Valuation".into()],
    }
}

pub fn candidate(symbol: &str, company: &str) -> TickerCandidate {
    TickerCandidate::new(symbol.into(), company.into(), "named in the article".into())
}

pub fn news_item(link: &str) -> NewsItem {
    NewsItem::new(
        "wire".into(),
        "Apple beats estimates".into(),
        link.into(),
        String::new(),
        Utc::now(),
        "fp".into(),
    )
}

pub fn entry(link: &str, title: &str, published_at: Option<DateTime<Utc>>) -> FeedEntry {
    FeedEntry {
        title: title.into(),
        link: link.into(),
        summary: String::new(),
        published_at,
    }
}

/// Scripted collaborator behaviour for one test.
pub struct Stubs {
    /// `None` makes the article fetch fail.
    pub article: Option<String>,
    pub tickers: Vec<TickerCandidate>,
    /// Symbols the market stub recognises.
    pub known: Vec<String>,
    pub price: f64,
    pub extract_error: bool,
    /// Analyses whose focus contains this text fail.
    pub failing_focus: Option<String>,
    pub decision: DecisionPayload,
    pub panic_on_decide: bool,
    pub feed: Vec<Result<FetchResponse, FeedError>>,
    pub entries: Vec<FeedEntry>,
}

impl Default for Stubs {
    fn default() -> Self {
        Self {
            article: Some("Apple reported record quarterly revenue and raised guidance.".into()),
            tickers: vec![candidate("AAPL", "Apple Inc.")],
            known: vec!["AAPL".into()],
            price: 190.0,
            extract_error: false,
            failing_focus: None,
            decision: DecisionPayload::Single(decision("LONG", Some("AAPL"), 2.0)),
            panic_on_decide: false,
            feed: Vec::new(),
            entries: Vec::new(),
        }
    }
}

pub struct Harness {
    pub desk: SignalDesk,
    pub conn: SharedConnection,
    pub analyst: Arc<RecordingAnalyst>,
    pub decider: Arc<StubDecisionMaker>,
    pub market: Arc<StubMarket>,
    pub notifier: Arc<RecordingNotifier>,
    pub strategist: Arc<RecordingStrategist>,
    pub feed: Arc<StubFeedSource>,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database_path = ":memory:".into();
    config.feeds = vec![FeedConfig {
        name: "wire".into(),
        url: FEED_URL.into(),
        min_interval_secs: 30,
    }];
    config.watcher.tick_millis = 10;
    config.pipeline.workers = 2;
    config.pipeline.call_timeout_secs = 5;
    config
}

pub fn setup() -> Harness {
    setup_with(Stubs::default())
}

pub fn setup_with(stubs: Stubs) -> Harness {
    let conn = open_database(":memory:").unwrap();
    setup_on(conn, stubs, test_config())
}

pub fn setup_on(conn: SharedConnection, stubs: Stubs, config: AppConfig) -> Harness {
    let analyst = Arc::new(RecordingAnalyst::failing_on(stubs.failing_focus));
    let decider = Arc::new(StubDecisionMaker {
        payload: stubs.decision,
        panic: stubs.panic_on_decide,
        debriefings: Mutex::new(Vec::new()),
    });
    let market = Arc::new(StubMarket::new(stubs.known.clone(), stubs.price));
    let notifier = Arc::new(RecordingNotifier::default());
    let strategist = Arc::new(RecordingStrategist::default());
    let feed = Arc::new(StubFeedSource::new(stubs.feed, stubs.entries));

    let collaborators = Collaborators {
        fetcher: Arc::new(StubFetcher(stubs.article)),
        summarizer: Arc::new(StubSummarizer),
        extractor: Arc::new(StubExtractor {
            tickers: stubs.tickers,
            fail: stubs.extract_error,
        }),
        market: market.clone(),
        specialists: SpecialistTable::uniform(analyst.clone()),
        decision_maker: decider.clone(),
    };

    let desk = SignalDesk::with_collaborators(
        conn.clone(),
        collaborators,
        notifier.clone(),
        strategist.clone(),
        feed.clone(),
        config,
    );

    Harness {
        desk,
        conn,
        analyst,
        decider,
        market,
        notifier,
        strategist,
        feed,
    }
}

pub struct StubFetcher(Option<String>);

#[async_trait]
impl ArticleFetcher for StubFetcher {
    async fn fetch(&self, _link: &str) -> Result<String, CollaboratorError> {
        self.0
            .clone()
            .ok_or_else(|| CollaboratorError::Network("connection refused".into()))
    }
}

pub struct StubSummarizer;

#[async_trait]
impl Summarizer for StubSummarizer {
    async fn analyze(&self, text: &str) -> Result<InitialAnalysis, CollaboratorError> {
        Ok(InitialAnalysis {
            summary: text.chars().take(80).collect(),
            impact: 7,
            sentiment: Sentiment::Positive,
            entities: vec!["Apple".into(), "iPhone".into()],
        })
    }
}

pub struct StubExtractor {
    tickers: Vec<TickerCandidate>,
    fail: bool,
}

#[async_trait]
impl TickerExtractor for StubExtractor {
    async fn extract_tickers(&self, _summary: &str, _text: &str) -> Result<Vec<TickerCandidate>, CollaboratorError> {
        if self.fail {
            return Err(CollaboratorError::Malformed("expected a JSON list of tickers".into()));
        }
        Ok(self.tickers.clone())
    }
}

pub struct StubMarket {
    known: Vec<String>,
    price: Mutex<f64>,
}

impl StubMarket {
    fn new(known: Vec<String>, price: f64) -> Self {
        Self {
            known,
            price: Mutex::new(price),
        }
    }

    pub fn set_price(&self, price: f64) {
        *self.price.lock().unwrap() = price;
    }

    fn quote(&self, ticker: &str) -> Option<f64> {
        self.known
            .iter()
            .any(|k| k == ticker)
            .then(|| *self.price.lock().unwrap())
    }
}

#[async_trait]
impl MarketData for StubMarket {
    async fn resolve(&self, ticker: &str) -> Result<Option<Instrument>, CollaboratorError> {
        Ok(self.known.iter().any(|k| k == ticker).then(|| Instrument {
            symbol: ticker.to_string(),
            name: Some(format!("{ticker} Corp")),
            currency: Some("USD".into()),
            exchange: Some("NMS".into()),
        }))
    }

    async fn intraday_price(&self, ticker: &str) -> Result<Option<f64>, CollaboratorError> {
        Ok(self.quote(ticker))
    }

    async fn quote_field_price(&self, _ticker: &str) -> Result<Option<f64>, CollaboratorError> {
        Ok(None)
    }

    async fn recent_close(&self, _ticker: &str) -> Result<Option<f64>, CollaboratorError> {
        Ok(None)
    }
}

/// Records every (kind, focus) it is asked to analyse.
pub struct RecordingAnalyst {
    calls: Mutex<Vec<(AgentKind, String)>>,
    failing_focus: Option<String>,
}

impl RecordingAnalyst {
    fn failing_on(failing_focus: Option<String>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing_focus,
        }
    }

    pub fn calls(&self) -> Vec<(AgentKind, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FocusAnalyst for RecordingAnalyst {
    async fn analyze_focus(
        &self,
        kind: AgentKind,
        focus: &str,
        _summary: &str,
        _text: &str,
    ) -> Result<String, CollaboratorError> {
        self.calls.lock().unwrap().push((kind, focus.to_string()));
        if self.failing_focus.as_deref().is_some_and(|f| focus.contains(f)) {
            return Err(CollaboratorError::Timeout(std::time::Duration::from_secs(60)));
        }
        Ok(format!("Outlook for {focus}: constructive"))
    }
}

pub struct StubDecisionMaker {
    payload: DecisionPayload,
    panic: bool,
    debriefings: Mutex<Vec<String>>,
}

impl StubDecisionMaker {
    pub fn debriefings(&self) -> Vec<String> {
        self.debriefings.lock().unwrap().clone()
    }
}

#[async_trait]
impl DecisionMaker for StubDecisionMaker {
    async fn decide(
        &self,
        debriefing: &str,
        _capital: f64,
        _ticker_summary: &str,
    ) -> Result<DecisionPayload, CollaboratorError> {
        self.debriefings.lock().unwrap().push(debriefing.to_string());
        if self.panic {
            panic!("decision maker exploded");
        }
        Ok(self.payload.clone())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) -> Result<(), CollaboratorError> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingStrategist {
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl RecordingStrategist {
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExitStrategist for RecordingStrategist {
    async fn on_news(&self, ticker: &str, headlines: &[String]) -> Result<(), CollaboratorError> {
        self.calls
            .lock()
            .unwrap()
            .push((ticker.to_string(), headlines.to_vec()));
        Ok(())
    }
}

/// Replays scripted fetch outcomes; once exhausted, serves `default_body`.
pub struct StubFeedSource {
    responses: Mutex<VecDeque<Result<FetchResponse, FeedError>>>,
    entries: Vec<FeedEntry>,
    requests: Mutex<Vec<CacheValidators>>,
    parses: Mutex<usize>,
}

impl StubFeedSource {
    fn new(responses: Vec<Result<FetchResponse, FeedError>>, entries: Vec<FeedEntry>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            entries,
            requests: Mutex::new(Vec::new()),
            parses: Mutex::new(0),
        }
    }

    pub fn requests(&self) -> Vec<CacheValidators> {
        self.requests.lock().unwrap().clone()
    }

    pub fn parse_count(&self) -> usize {
        *self.parses.lock().unwrap()
    }
}

pub fn body(content: &str, etag: Option<&str>) -> Result<FetchResponse, FeedError> {
    Ok(FetchResponse::Body {
        body: content.as_bytes().to_vec(),
        etag: etag.map(String::from),
        last_modified: None,
    })
}

#[async_trait]
impl FeedSource for StubFeedSource {
    async fn fetch(&self, _url: &str, validators: &CacheValidators) -> Result<FetchResponse, FeedError> {
        self.requests.lock().unwrap().push(validators.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| body("default-body", None))
    }

    fn parse(&self, _body: &[u8]) -> Result<Vec<FeedEntry>, FeedError> {
        *self.parses.lock().unwrap() += 1;
        Ok(self.entries.clone())
    }
}

/// Dispatch sink that only records what it was handed.
#[derive(Default)]
pub struct RecordingDispatch {
    items: Mutex<Vec<NewsItem>>,
}

impl RecordingDispatch {
    pub fn links(&self) -> Vec<String> {
        self.items.lock().unwrap().iter().map(|i| i.link.clone()).collect()
    }
}

impl NewsDispatch for RecordingDispatch {
    fn dispatch(&self, item: NewsItem) {
        self.items.lock().unwrap().push(item);
    }
}
