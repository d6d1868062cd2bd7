use crate::domain::entities::analysis::InitialAnalysis;
use crate::domain::entities::ticker_candidate::TickerCandidate;
use crate::domain::error::CollaboratorError;
use crate::domain::values::agent_kind::AgentKind;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Produces the summary, impact, sentiment and entities of an article.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<InitialAnalysis, CollaboratorError>;
}

/// Proposes instrument symbols mentioned in, or affected by, an article.
#[async_trait]
pub trait TickerExtractor: Send + Sync {
    async fn extract_tickers(
        &self,
        summary: &str,
        text: &str,
    ) -> Result<Vec<TickerCandidate>, CollaboratorError>;
}

/// A specialized analysis unit. One implementation may serve several kinds.
#[async_trait]
pub trait FocusAnalyst: Send + Sync {
    async fn analyze_focus(
        &self,
        kind: AgentKind,
        focus: &str,
        summary: &str,
        text: &str,
    ) -> Result<String, CollaboratorError>;
}

/// Turns the debriefing into a trading recommendation.
#[async_trait]
pub trait DecisionMaker: Send + Sync {
    async fn decide(
        &self,
        debriefing: &str,
        capital: f64,
        ticker_summary: &str,
    ) -> Result<DecisionPayload, CollaboratorError>;
}

/// Decision-maker output before validation. Some collaborators answer with a
/// list instead of a single object; the pipeline keeps the first element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DecisionPayload {
    Many(Vec<RawDecision>),
    Single(RawDecision),
}

/// Unvalidated decision fields. `action` and `confidence` are parsed strictly
/// by the pipeline, so adapters translate any other vocabulary first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDecision {
    #[serde(alias = "decision")]
    pub action: String,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default, alias = "confiance")]
    pub confidence: Option<String>,
    #[serde(default)]
    pub horizon: Option<String>,
    #[serde(default, alias = "justification_synthetique")]
    pub justification: String,
    #[serde(
        default,
        alias = "allocation_capital_pourcentage",
        alias = "allocation_pourcentage"
    )]
    pub allocation_pct: Option<f64>,
    #[serde(default, alias = "points_cles_positifs")]
    pub positives: Vec<String>,
    #[serde(default, alias = "points_cles_negatifs_risques")]
    pub negatives: Vec<String>,
}
