use crate::domain::entities::assignment::AgentAssignment;
use crate::domain::entities::ticker_candidate::TickerCandidate;
use crate::domain::values::action::Action;
use crate::domain::values::allocation::Allocation;
use crate::domain::values::confidence::Confidence;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DOWNGRADE_NOTE: &str =
    "[Downgraded] Long signal without capital allocation; conviction insufficient to act.";
pub const MISSING_TICKER_NOTE: &str =
    "[Downgraded] Actionable signal without a tradable ticker.";

/// How a decision was reached: the candidates that survived validation, the
/// team that analysed them, and the step log of the run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub candidates: Vec<TickerCandidate>,
    pub assignments: Vec<AgentAssignment>,
    pub execution_log: Vec<String>,
}

/// Structured trading recommendation produced for one news item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub action: Action,
    pub ticker: Option<String>,
    pub confidence: Confidence,
    /// Free-form holding horizon as stated by the decision maker.
    #[serde(default)]
    pub horizon: Option<String>,
    pub allocation: Allocation,
    pub justification: String,
    pub positives: Vec<String>,
    pub negatives: Vec<String>,
    /// Price captured right after the action was finalized; 0.0 when unknown.
    pub price_at_decision: f64,
    pub decided_at: DateTime<Utc>,
    #[serde(default)]
    pub provenance: Provenance,
}

impl Decision {
    /// Terminal decision for a run that could not complete.
    pub fn error(reason: impl Into<String>, execution_log: Vec<String>) -> Self {
        let reason = reason.into();
        Self {
            action: Action::Error,
            ticker: None,
            confidence: Confidence::Low,
            horizon: None,
            allocation: Allocation::zero(),
            justification: format!("System error: {reason}"),
            positives: vec![],
            negatives: vec![reason],
            price_at_decision: 0.0,
            decided_at: Utc::now(),
            provenance: Provenance {
                execution_log,
                ..Default::default()
            },
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.action.is_actionable()
    }

    /// A LONG with zero allocation is contradictory: rewrite it to a low
    /// conviction WATCH. Returns true when the decision was rewritten.
    pub fn apply_consistency_correction(&mut self) -> bool {
        if self.action == Action::Long && self.allocation.is_zero() {
            self.downgrade(DOWNGRADE_NOTE);
            return true;
        }
        false
    }

    /// Actionable decisions need a ticker to open a position against.
    /// Returns true when the decision was rewritten.
    pub fn require_ticker(&mut self) -> bool {
        let has_ticker = self.ticker.as_deref().is_some_and(|t| !t.trim().is_empty());
        if self.is_actionable() && !has_ticker {
            self.ticker = None;
            self.downgrade(MISSING_TICKER_NOTE);
            return true;
        }
        false
    }

    /// Only LONG and SHORT may carry an allocation.
    pub fn zero_allocation_unless_actionable(&mut self) {
        if !self.is_actionable() {
            self.allocation = Allocation::zero();
        }
    }

    fn downgrade(&mut self, note: &str) {
        self.action = Action::Watch;
        self.confidence = Confidence::Low;
        self.allocation = Allocation::zero();
        self.justification = if self.justification.is_empty() {
            note.to_string()
        } else {
            format!("{note} {}", self.justification)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(action: Action, allocation: f64, ticker: Option<&str>) -> Decision {
        Decision {
            action,
            ticker: ticker.map(String::from),
            confidence: Confidence::High,
            horizon: None,
            allocation: Allocation::clamped(allocation),
            justification: "Strong guidance".into(),
            positives: vec![],
            negatives: vec![],
            price_at_decision: 0.0,
            decided_at: Utc::now(),
            provenance: Provenance::default(),
        }
    }

    #[test]
    fn test_long_with_zero_allocation_is_downgraded() {
        let mut d = decision(Action::Long, 0.0, Some("AAPL"));
        assert!(d.apply_consistency_correction());
        assert_eq!(d.action, Action::Watch);
        assert_eq!(d.confidence, Confidence::Low);
        assert!(d.justification.starts_with(DOWNGRADE_NOTE));
        assert!(d.justification.ends_with("Strong guidance"));
    }

    #[test]
    fn test_long_with_allocation_is_kept() {
        let mut d = decision(Action::Long, 2.0, Some("AAPL"));
        assert!(!d.apply_consistency_correction());
        assert_eq!(d.action, Action::Long);
        assert_eq!(d.confidence, Confidence::High);
    }

    #[test]
    fn test_short_with_zero_allocation_untouched_by_rule() {
        let mut d = decision(Action::Short, 0.0, Some("TSLA"));
        assert!(!d.apply_consistency_correction());
        assert_eq!(d.action, Action::Short);
    }

    #[test]
    fn test_actionable_without_ticker_is_downgraded() {
        let mut d = decision(Action::Short, 1.0, Some("  "));
        assert!(d.require_ticker());
        assert_eq!(d.action, Action::Watch);
        assert!(d.ticker.is_none());
        assert!(d.allocation.is_zero());
    }

    #[test]
    fn test_watch_loses_allocation() {
        let mut d = decision(Action::Watch, 3.0, Some("AAPL"));
        d.zero_allocation_unless_actionable();
        assert!(d.allocation.is_zero());
    }

    #[test]
    fn test_error_decision_shape() {
        let d = Decision::error("fetch failed", vec!["step".into()]);
        assert_eq!(d.action, Action::Error);
        assert!(d.ticker.is_none());
        assert!(d.allocation.is_zero());
        assert_eq!(d.provenance.execution_log, vec!["step".to_string()]);
    }
}
