pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::dispatcher::{NewsDispatch, PipelineDispatcher};
use crate::application::feed_watcher::FeedWatcher;
use crate::application::lifecycle::{LifecycleManager, LifecycleReport};
use crate::application::pipeline::{Collaborators, DecisionPipeline, SpecialistTable};
use crate::application::query::QueryUseCase;
use crate::config::AppConfig;
use crate::domain::entities::decision::Decision;
use crate::domain::entities::news_item::NewsItem;
use crate::domain::entities::position::Position;
use crate::domain::error::DomainError;
use crate::domain::ports::feed_source::FeedSource;
use crate::domain::ports::news_event_repository::NewsEventRepository;
use crate::domain::ports::news_repository::{NewsRepository, StoredNews};
use crate::domain::ports::notifier::{ExitStrategist, Notifier};
use crate::domain::ports::position_repository::PositionRepository;
use crate::domain::values::position_status::PositionStatus;
use crate::infrastructure::article::HttpArticleFetcher;
use crate::infrastructure::feeds::HttpFeedSource;
use crate::infrastructure::llm::OpenAiInference;
use crate::infrastructure::market_data::YahooMarketData;
use crate::infrastructure::notify::{LogExitStrategist, LogNotifier};
use crate::infrastructure::sqlite::event_repo::SqliteNewsEventRepo;
use crate::infrastructure::sqlite::news_repo::SqliteNewsRepo;
use crate::infrastructure::sqlite::position_repo::SqlitePositionRepo;
use crate::infrastructure::sqlite::{open_database, SharedConnection};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Wires the store, the collaborators and the three long-running services.
pub struct SignalDesk {
    config: AppConfig,
    news_repo: Arc<dyn NewsRepository>,
    position_repo: Arc<dyn PositionRepository>,
    event_repo: Arc<dyn NewsEventRepository>,
    collaborators: Collaborators,
    notifier: Arc<dyn Notifier>,
    exit_strategist: Arc<dyn ExitStrategist>,
    feed_source: Arc<dyn FeedSource>,
    pipeline: Arc<DecisionPipeline>,
    query_uc: QueryUseCase,
}

impl SignalDesk {
    /// Production wiring: SQLite at `database_path`, HTTP feeds, OpenAI
    /// compatible inference and Yahoo market data.
    pub fn open(config: AppConfig) -> Result<Self, DomainError> {
        let conn = open_database(&config.database_path)?;

        if config.llm.api_key.is_empty() {
            tracing::warn!("no LLM api key configured, every analysis will end in an ERROR decision");
        }
        let inference = Arc::new(OpenAiInference::new(
            config.llm.api_key.clone(),
            Some(config.llm.base_url.clone()),
            Some(config.llm.model.clone()),
        ));
        let collaborators = Collaborators {
            fetcher: Arc::new(HttpArticleFetcher::new(
                config.request_timeout(),
                config.pipeline.max_article_chars,
            )),
            summarizer: inference.clone(),
            extractor: inference.clone(),
            market: Arc::new(YahooMarketData::new(Some(config.market_data.base_url.clone()))),
            specialists: SpecialistTable::uniform(inference.clone()),
            decision_maker: inference,
        };
        let feed_source = Arc::new(HttpFeedSource::new(config.request_timeout()));

        Ok(Self::with_collaborators(
            conn,
            collaborators,
            Arc::new(LogNotifier),
            Arc::new(LogExitStrategist),
            feed_source,
            config,
        ))
    }

    pub fn with_collaborators(
        conn: SharedConnection,
        collaborators: Collaborators,
        notifier: Arc<dyn Notifier>,
        exit_strategist: Arc<dyn ExitStrategist>,
        feed_source: Arc<dyn FeedSource>,
        config: AppConfig,
    ) -> Self {
        let news_repo: Arc<dyn NewsRepository> = Arc::new(SqliteNewsRepo::new(conn.clone()));
        let position_repo: Arc<dyn PositionRepository> = Arc::new(SqlitePositionRepo::new(conn.clone()));
        let event_repo: Arc<dyn NewsEventRepository> = Arc::new(SqliteNewsEventRepo::new(conn));

        let pipeline = Arc::new(DecisionPipeline::new(
            collaborators.clone(),
            config.pipeline_settings(),
            news_repo.clone(),
            position_repo.clone(),
        ));

        Self {
            query_uc: QueryUseCase::new(news_repo.clone(), position_repo.clone()),
            config,
            news_repo,
            position_repo,
            event_repo,
            collaborators,
            notifier,
            exit_strategist,
            feed_source,
            pipeline,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn pipeline(&self) -> Arc<DecisionPipeline> {
        self.pipeline.clone()
    }

    pub fn start_dispatcher(&self, cancel: CancellationToken) -> PipelineDispatcher {
        PipelineDispatcher::start(self.pipeline.clone(), self.config.pipeline.workers, cancel)
    }

    pub fn watcher(&self, dispatch: Arc<dyn NewsDispatch>) -> FeedWatcher {
        FeedWatcher::new(
            self.config.feed_specs(),
            self.feed_source.clone(),
            self.news_repo.clone(),
            self.event_repo.clone(),
            dispatch,
        )
        .with_timing(self.config.tick(), self.config.request_timeout())
    }

    /// Watcher that also accepts entries published after `since`, for one
    /// shot polls where the startup cutoff would drop everything.
    pub fn watcher_since(&self, dispatch: Arc<dyn NewsDispatch>, since: DateTime<Utc>) -> FeedWatcher {
        self.watcher(dispatch).with_since(since)
    }

    pub fn lifecycle(&self) -> LifecycleManager {
        LifecycleManager::new(
            self.position_repo.clone(),
            self.event_repo.clone(),
            self.collaborators.market.clone(),
            self.notifier.clone(),
            self.exit_strategist.clone(),
            self.config.lifecycle_settings(),
        )
    }

    /// Runs the pipeline for one link without storing anything. A failed
    /// run yields the ERROR decision that `process` would have stored.
    pub async fn analyze(&self, link: String, title: Option<String>) -> Decision {
        let item = NewsItem::manual(link, title);
        match self.pipeline.analyze(item).await {
            Ok(ctx) => ctx
                .into_decision()
                .unwrap_or_else(|| Decision::error("pipeline finished without a decision", Vec::new())),
            Err(e) => Decision::error(e.to_string(), e.execution_log),
        }
    }

    pub async fn close_expired(&self) -> LifecycleReport {
        self.lifecycle().run_cycle(Utc::now()).await
    }

    /// Processes stored items that never received a decision, oldest first.
    pub async fn backfill(&self, limit: usize) -> Result<Vec<Decision>, DomainError> {
        let pending = self.query_uc.pending(limit)?;
        let mut decisions = Vec::with_capacity(pending.len());
        for item in pending {
            let decision = self
                .pipeline
                .process(&item)
                .await
                .map_err(|e| DomainError::Database(e.to_string()))?;
            decisions.push(decision);
        }
        Ok(decisions)
    }

    pub fn positions(
        &self,
        status: Option<PositionStatus>,
        ticker: Option<String>,
        limit: Option<usize>,
    ) -> Result<Vec<Position>, DomainError> {
        self.query_uc.positions(status, ticker, limit)
    }

    pub fn decisions(&self, limit: usize) -> Result<Vec<StoredNews>, DomainError> {
        self.query_uc.decisions(limit)
    }

    pub fn news(&self, link: &str) -> Result<StoredNews, DomainError> {
        self.query_uc.news(link)
    }
}
