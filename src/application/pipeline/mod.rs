//! Five-stage decision pipeline: initial analysis, ticker extraction and
//! validation, routing, specialized analysis, final decision.
//!
//! Each stage takes the [`AnalysisContext`] by value and hands it back on
//! success. The first [`StageError`] ends the run; [`DecisionPipeline::process`]
//! turns it into an ERROR decision so every processed item gets exactly one
//! persisted outcome.

pub mod context;
pub mod debriefing;
pub mod error;
pub mod routing;
pub mod stages;

pub use context::AnalysisContext;
pub use error::{Stage, StageError, StageErrorKind};

use crate::domain::entities::decision::Decision;
use crate::domain::entities::news_item::NewsItem;
use crate::domain::entities::position::NewPosition;
use crate::domain::ports::article_fetcher::ArticleFetcher;
use crate::domain::ports::inference::{DecisionMaker, FocusAnalyst, Summarizer, TickerExtractor};
use crate::domain::ports::market_data::MarketData;
use crate::domain::ports::news_repository::NewsRepository;
use crate::domain::ports::position_repository::PositionRepository;
use crate::domain::values::agent_kind::AgentKind;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Specialized analysts by kind. Lookup is an exhaustive match, so adding
/// a kind does not compile until it has an analyst.
#[derive(Clone)]
pub struct SpecialistTable {
    pub equity: Arc<dyn FocusAnalyst>,
    pub sector: Arc<dyn FocusAnalyst>,
    pub macro_: Arc<dyn FocusAnalyst>,
}

impl SpecialistTable {
    /// The same analyst for every kind.
    pub fn uniform(analyst: Arc<dyn FocusAnalyst>) -> Self {
        Self {
            equity: analyst.clone(),
            sector: analyst.clone(),
            macro_: analyst,
        }
    }

    pub fn for_kind(&self, kind: AgentKind) -> &Arc<dyn FocusAnalyst> {
        match kind {
            AgentKind::Equity => &self.equity,
            AgentKind::Sector => &self.sector,
            AgentKind::Macro => &self.macro_,
        }
    }
}

/// External collaborators of a run.
#[derive(Clone)]
pub struct Collaborators {
    pub fetcher: Arc<dyn ArticleFetcher>,
    pub summarizer: Arc<dyn Summarizer>,
    pub extractor: Arc<dyn TickerExtractor>,
    pub market: Arc<dyn MarketData>,
    pub specialists: SpecialistTable,
    pub decision_maker: Arc<dyn DecisionMaker>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    pub capital: f64,
    /// Upper bound on every collaborator call.
    pub call_timeout: Duration,
    pub max_candidates: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            capital: 25_000.0,
            call_timeout: Duration::from_secs(60),
            max_candidates: 5,
        }
    }
}

pub struct DecisionPipeline {
    collaborators: Collaborators,
    settings: PipelineSettings,
    news_repo: Arc<dyn NewsRepository>,
    position_repo: Arc<dyn PositionRepository>,
}

impl DecisionPipeline {
    pub fn new(
        collaborators: Collaborators,
        settings: PipelineSettings,
        news_repo: Arc<dyn NewsRepository>,
        position_repo: Arc<dyn PositionRepository>,
    ) -> Self {
        Self {
            collaborators,
            settings,
            news_repo,
            position_repo,
        }
    }

    /// Runs the five stages without touching the store.
    pub async fn analyze(&self, item: NewsItem) -> Result<AnalysisContext, StageError> {
        let ctx = AnalysisContext::new(item);
        let span = tracing::info_span!("pipeline", run_id = %ctx.run_id, link = %ctx.item.link);
        self.run_stages(ctx).instrument(span).await
    }

    /// Runs the stages, persists the decision (an ERROR decision if a stage
    /// failed) and opens a position for LONG/SHORT.
    pub async fn process(&self, item: &NewsItem) -> Result<Decision, StageError> {
        let ctx = AnalysisContext::new(item.clone());
        let span = tracing::info_span!("pipeline", run_id = %ctx.run_id, link = %item.link);
        async move {
            let decision = match self.run_stages(ctx).await {
                Ok(ctx) => ctx.into_decision().unwrap_or_else(|| {
                    Decision::error("pipeline finished without a decision", Vec::new())
                }),
                Err(e) => {
                    tracing::warn!(stage = %e.stage, error = %e.kind, "pipeline run failed");
                    Decision::error(e.to_string(), e.execution_log)
                }
            };
            self.persist(item, decision)
        }
        .instrument(span)
        .await
    }

    async fn run_stages(&self, ctx: AnalysisContext) -> Result<AnalysisContext, StageError> {
        let collab = &self.collaborators;
        let settings = &self.settings;

        let ctx = stages::initial_analysis(collab, settings, ctx).await?;
        let ctx = stages::extract_tickers(collab, settings, ctx).await?;
        let ctx = stages::route_agents(ctx)?;
        let ctx = stages::specialized_analysis(collab, settings, ctx).await?;
        stages::final_decision(collab, settings, ctx).await
    }

    /// Stores an ERROR decision for an item whose run never completed.
    pub fn record_failure(&self, item: &NewsItem, reason: &str) -> Result<Decision, StageError> {
        self.persist(item, Decision::error(reason, Vec::new()))
    }

    fn persist(&self, item: &NewsItem, decision: Decision) -> Result<Decision, StageError> {
        self.news_repo
            .insert_if_absent(item)
            .map_err(|e| StageError::persistence(e.to_string()))?;
        let saved = self
            .news_repo
            .save_decision(&item.link, &decision)
            .map_err(|e| StageError::persistence(e.to_string()))?;
        if !saved {
            tracing::info!(link = %item.link, "decision already stored, keeping the first one");
            return Ok(decision);
        }

        tracing::info!(
            action = %decision.action,
            ticker = decision.ticker.as_deref().unwrap_or("-"),
            allocation = %decision.allocation,
            "decision stored"
        );

        if let (Some(direction), Some(ticker)) = (decision.action.direction(), &decision.ticker) {
            let opened = match self
                .position_repo
                .open_if_absent(&NewPosition {
                    source_link: item.link.clone(),
                    ticker: ticker.clone(),
                    direction,
                    entry_at: decision.decided_at,
                    entry_price: decision.price_at_decision,
                })
            {
                Ok(opened) => opened,
                Err(e) => {
                    // A LONG/SHORT decision is never left stored without its position.
                    tracing::error!(link = %item.link, ticker = %ticker, error = %e, "failed to open position, withdrawing decision");
                    if let Err(clear_err) = self.news_repo.clear_decision(&item.link) {
                        tracing::error!(link = %item.link, error = %clear_err, "failed to withdraw decision");
                    }
                    return Err(StageError::persistence(e.to_string()));
                }
            };
            match opened {
                Some(id) => tracing::info!(id, ticker = %ticker, %direction, "position opened"),
                None => tracing::debug!(ticker = %ticker, "position already exists"),
            }
        }
        Ok(decision)
    }
}
