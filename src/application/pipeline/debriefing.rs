use crate::domain::entities::assignment::AgentAssignment;
use crate::domain::entities::ticker_candidate::TickerCandidate;
use crate::domain::error::CollaboratorError;

/// Outcome of one specialized analysis.
#[derive(Debug, Clone)]
pub struct SpecialistReport {
    pub assignment: AgentAssignment,
    pub outcome: Result<String, CollaboratorError>,
}

/// Consolidates reports, each tagged with its kind and focus, followed by
/// the validated ticker list.
pub fn format_debriefing(reports: &[SpecialistReport], ticker_summary: &str) -> String {
    let mut parts: Vec<String> = reports
        .iter()
        .enumerate()
        .map(|(i, report)| {
            let body = match &report.outcome {
                Ok(text) => text.trim().to_string(),
                Err(e) => format!("[analysis unavailable: {e}]"),
            };
            format!(
                "\n--- ANALYSIS {} : {} ---\nFocus : {}\n\n{}\n{}",
                i + 1,
                report.assignment.kind.label(),
                report.assignment.focus,
                body,
                "=".repeat(80)
            )
        })
        .collect();
    parts.push(format!("\n--- VALIDATED TICKERS ---\n{ticker_summary}"));
    parts.join("\n")
}

/// One line per validated candidate, or a fixed marker when there is none.
pub fn ticker_summary(candidates: &[TickerCandidate]) -> String {
    let lines: Vec<String> = candidates
        .iter()
        .filter(|c| c.validated)
        .map(|c| format!("• {} ({}): {}", c.symbol, c.company, c.rationale))
        .collect();
    if lines.is_empty() {
        "No ticker identified".to_string()
    } else {
        lines.join("\n")
    }
}
