use super::context::AnalysisContext;
use super::debriefing::{format_debriefing, ticker_summary, SpecialistReport};
use super::error::{Stage, StageErrorKind};
use super::routing::route;
use super::{Collaborators, PipelineSettings};
use crate::application::pricing::snapshot_price;
use crate::application::timeout::bounded;
use crate::domain::entities::decision::{Decision, Provenance};
use crate::domain::entities::ticker_candidate::TickerCandidate;
use crate::domain::error::CollaboratorError;
use crate::domain::ports::inference::{DecisionPayload, RawDecision};
use crate::domain::values::action::Action;
use crate::domain::values::allocation::Allocation;
use crate::domain::values::confidence::Confidence;
use chrono::Utc;
use futures_util::future::join_all;
use std::collections::HashSet;

type StageResult = Result<AnalysisContext, super::error::StageError>;

/// Stage 1: article text, then summary, impact, sentiment and entities.
pub async fn initial_analysis(
    collab: &Collaborators,
    settings: &PipelineSettings,
    mut ctx: AnalysisContext,
) -> StageResult {
    ctx.log("Initial analysis started");
    let limit = settings.call_timeout;

    let fetched = bounded(limit, collab.fetcher.fetch(&ctx.item.link)).await;
    let text = match fetched {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            return Err(ctx.fail(
                Stage::InitialAnalysis,
                CollaboratorError::Unavailable("article text is empty".into()).into(),
            ))
        }
        Err(e) => return Err(ctx.fail(Stage::InitialAnalysis, e.into())),
    };

    let analyzed = bounded(limit, collab.summarizer.analyze(&text)).await;
    let analysis = match analyzed {
        Ok(analysis) => analysis,
        Err(e) => return Err(ctx.fail(Stage::InitialAnalysis, e.into())),
    };

    ctx.log(format!(
        "Initial analysis done: impact {}/10, sentiment {}",
        analysis.impact, analysis.sentiment
    ));
    ctx.log(format!("Entities: {}", analysis.entities.join(", ")));
    ctx.article_text = text;
    ctx.analysis = Some(analysis);
    Ok(ctx)
}

/// Stage 2: propose, normalize, cap and validate candidates. Extraction
/// failures leave the run with no candidates instead of failing it.
pub async fn extract_tickers(
    collab: &Collaborators,
    settings: &PipelineSettings,
    mut ctx: AnalysisContext,
) -> StageResult {
    let limit = settings.call_timeout;
    let extracted = bounded(
        limit,
        collab
            .extractor
            .extract_tickers(ctx.summary(), &ctx.article_text),
    )
    .await;
    let proposed = match extracted {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!(stage = %Stage::TickerExtraction, error = %e, "ticker extraction failed, continuing without tickers");
            ctx.log(format!("Ticker extraction failed: {e}"));
            Vec::new()
        }
    };

    let mut seen = HashSet::new();
    let normalized: Vec<TickerCandidate> = proposed
        .into_iter()
        .filter_map(|c| {
            let symbol = TickerCandidate::normalize_symbol(&c.symbol)?;
            seen.insert(symbol.clone()).then(|| TickerCandidate {
                symbol,
                validated: false,
                ..c
            })
        })
        .take(settings.max_candidates)
        .collect();

    let lookups = normalized
        .iter()
        .map(|c| bounded(limit, collab.market.resolve(&c.symbol)));
    let results = join_all(lookups).await;

    let mut validated = Vec::new();
    for (mut candidate, result) in normalized.into_iter().zip(results) {
        match result {
            Ok(Some(instrument)) => {
                if candidate.company.trim().is_empty() {
                    candidate.company = instrument.name.unwrap_or_else(|| instrument.symbol.clone());
                }
                candidate.validated = true;
                ctx.log(format!("Ticker validated: {} ({})", candidate.symbol, candidate.company));
                validated.push(candidate);
            }
            Ok(None) => ctx.log(format!("Ticker rejected, not quoted: {}", candidate.symbol)),
            Err(e) => {
                tracing::warn!(ticker = %candidate.symbol, error = %e, "ticker validation failed");
                ctx.log(format!("Ticker rejected, lookup failed: {} ({e})", candidate.symbol));
            }
        }
    }

    if validated.is_empty() {
        ctx.log("No validated ticker, macro orientation");
    }
    ctx.candidates = validated;
    Ok(ctx)
}

/// Stage 3: deterministic team selection.
pub fn route_agents(mut ctx: AnalysisContext) -> StageResult {
    let team = route(&ctx.candidates, ctx.entities(), ctx.summary());
    for assignment in &team {
        ctx.log(format!("Assigned {} -> {}", assignment.kind, assignment.focus));
    }
    ctx.assignments = team;
    Ok(ctx)
}

/// Stage 4: concurrent fan-out. A failed assignment becomes a note.
pub async fn specialized_analysis(
    collab: &Collaborators,
    settings: &PipelineSettings,
    mut ctx: AnalysisContext,
) -> StageResult {
    let limit = settings.call_timeout;
    let calls = ctx.assignments.iter().map(|assignment| {
        let analyst = collab.specialists.for_kind(assignment.kind);
        bounded(
            limit,
            analyst.analyze_focus(assignment.kind, &assignment.focus, ctx.summary(), &ctx.article_text),
        )
    });
    let outcomes = join_all(calls).await;

    let reports: Vec<SpecialistReport> = ctx
        .assignments
        .iter()
        .cloned()
        .zip(outcomes)
        .map(|(assignment, outcome)| SpecialistReport { assignment, outcome })
        .collect();

    let failed = reports.iter().filter(|r| r.outcome.is_err()).count();
    for report in reports.iter().filter(|r| r.outcome.is_err()) {
        if let Err(e) = &report.outcome {
            tracing::warn!(stage = %Stage::SpecializedAnalysis, kind = %report.assignment.kind, focus = %report.assignment.focus, error = %e, "analysis unavailable, noted in debriefing");
        }
    }
    ctx.log(format!(
        "Debriefing consolidated: {} analyses, {failed} failed",
        reports.len()
    ));
    ctx.debriefing = format_debriefing(&reports, &ticker_summary(&ctx.candidates));
    Ok(ctx)
}

/// Stage 5: decide, correct, price.
pub async fn final_decision(
    collab: &Collaborators,
    settings: &PipelineSettings,
    mut ctx: AnalysisContext,
) -> StageResult {
    let limit = settings.call_timeout;
    let summary = ticker_summary(&ctx.candidates);
    let decided = bounded(
        limit,
        collab
            .decision_maker
            .decide(&ctx.debriefing, settings.capital, &summary),
    )
    .await;
    let payload = match decided {
        Ok(payload) => payload,
        Err(e) => return Err(ctx.fail(Stage::FinalDecision, e.into())),
    };

    let raw = match payload {
        DecisionPayload::Single(raw) => raw,
        DecisionPayload::Many(list) => {
            tracing::warn!(count = list.len(), "decision maker returned a list, keeping the first element");
            ctx.log(format!("Decision list of {} received, first element kept", list.len()));
            match list.into_iter().next() {
                Some(raw) => raw,
                None => {
                    return Err(ctx.fail(
                        Stage::FinalDecision,
                        StageErrorKind::Malformed("empty decision list".into()),
                    ))
                }
            }
        }
    };

    let mut decision = match build_decision(raw) {
        Ok(d) => d,
        Err(kind) => return Err(ctx.fail(Stage::FinalDecision, kind)),
    };

    if decision.apply_consistency_correction() {
        tracing::warn!("LONG with zero allocation downgraded to WATCH");
        ctx.log("Inconsistency: LONG with 0% allocation, downgraded to WATCH");
    }
    if decision.require_ticker() {
        tracing::warn!("actionable decision without ticker downgraded to WATCH");
        ctx.log("Inconsistency: actionable decision without ticker, downgraded to WATCH");
    }
    decision.zero_allocation_unless_actionable();

    if let Some(ticker) = &decision.ticker {
        if !ctx.candidates.iter().any(|c| &c.symbol == ticker) {
            tracing::warn!(ticker = %ticker, "decision names a ticker outside the validated list");
        }
        decision.price_at_decision = snapshot_price(collab.market.as_ref(), ticker, limit).await;
    }
    decision.decided_at = Utc::now();

    ctx.log(format!(
        "Decision: {} {} ({}, {})",
        decision.action,
        decision.ticker.as_deref().unwrap_or("-"),
        decision.confidence,
        decision.allocation
    ));
    ctx.decision = Some(decision);
    Ok(ctx)
}

fn build_decision(raw: RawDecision) -> Result<Decision, StageErrorKind> {
    let action: Action = raw
        .action
        .parse()
        .map_err(StageErrorKind::Malformed)?;
    let confidence = raw
        .confidence
        .as_deref()
        .and_then(|c| c.parse::<Confidence>().ok())
        .unwrap_or_default();

    Ok(Decision {
        action,
        ticker: raw.ticker.as_deref().and_then(TickerCandidate::normalize_symbol),
        confidence,
        horizon: raw.horizon.filter(|h| !h.trim().is_empty()),
        allocation: Allocation::clamped(raw.allocation_pct.unwrap_or(0.0)),
        justification: raw.justification.trim().to_string(),
        positives: raw.positives,
        negatives: raw.negatives,
        price_at_decision: 0.0,
        decided_at: Utc::now(),
        provenance: Provenance::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(action: &str, allocation: Option<f64>) -> RawDecision {
        RawDecision {
            action: action.into(),
            ticker: Some("$aapl".into()),
            confidence: Some("medium".into()),
            allocation_pct: allocation,
            ..Default::default()
        }
    }

    #[test]
    fn test_build_decision_normalizes_fields() {
        let d = build_decision(raw("LONG", Some(9.0))).unwrap();
        assert_eq!(d.action, Action::Long);
        assert_eq!(d.ticker.as_deref(), Some("AAPL"));
        assert_eq!(d.confidence, Confidence::Medium);
        assert_eq!(d.allocation.value(), 5.0);
    }

    #[test]
    fn test_build_decision_rejects_unknown_action() {
        assert!(matches!(
            build_decision(raw("BUY", Some(1.0))),
            Err(StageErrorKind::Malformed(_))
        ));
    }

    #[test]
    fn test_missing_allocation_is_zero() {
        let d = build_decision(raw("SHORT", None)).unwrap();
        assert!(d.allocation.is_zero());
    }
}
