use super::error::{Stage, StageError, StageErrorKind};
use crate::domain::entities::analysis::InitialAnalysis;
use crate::domain::entities::assignment::AgentAssignment;
use crate::domain::entities::decision::{Decision, Provenance};
use crate::domain::entities::news_item::NewsItem;
use crate::domain::entities::ticker_candidate::TickerCandidate;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

/// Working record of one pipeline run. Owned by that run only.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisContext {
    pub run_id: Uuid,
    pub item: NewsItem,
    pub article_text: String,
    pub analysis: Option<InitialAnalysis>,
    pub candidates: Vec<TickerCandidate>,
    pub assignments: Vec<AgentAssignment>,
    pub debriefing: String,
    pub decision: Option<Decision>,
    pub execution_log: Vec<String>,
}

impl AnalysisContext {
    pub fn new(item: NewsItem) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            item,
            article_text: String::new(),
            analysis: None,
            candidates: Vec::new(),
            assignments: Vec::new(),
            debriefing: String::new(),
            decision: None,
            execution_log: Vec::new(),
        }
    }

    /// Appends a timestamped step to the execution log.
    pub fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!("{message}");
        self.execution_log
            .push(format!("[{}] {message}", Utc::now().format("%H:%M:%S")));
    }

    pub fn summary(&self) -> &str {
        self.analysis.as_ref().map(|a| a.summary.as_str()).unwrap_or("")
    }

    pub fn entities(&self) -> &[String] {
        self.analysis
            .as_ref()
            .map(|a| a.entities.as_slice())
            .unwrap_or(&[])
    }

    /// Ends the run with an error, keeping the log for the ERROR decision.
    pub fn fail(mut self, stage: Stage, kind: StageErrorKind) -> StageError {
        self.log(format!("{stage} failed: {kind}"));
        StageError {
            stage,
            kind,
            execution_log: self.execution_log,
        }
    }

    /// The final decision with candidates, team and log attached.
    pub fn into_decision(self) -> Option<Decision> {
        let mut decision = self.decision?;
        decision.provenance = Provenance {
            candidates: self.candidates,
            assignments: self.assignments,
            execution_log: self.execution_log,
        };
        Some(decision)
    }
}
