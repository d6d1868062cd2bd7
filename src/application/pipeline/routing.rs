use crate::domain::entities::assignment::AgentAssignment;
use crate::domain::entities::ticker_candidate::TickerCandidate;
use crate::domain::values::sector::Sector;
use std::collections::BTreeMap;

/// Builds the analysis team. Only validated candidates are routed; the
/// result is never empty.
pub fn route(candidates: &[TickerCandidate], entities: &[String], summary: &str) -> Vec<AgentAssignment> {
    let validated: Vec<&TickerCandidate> = candidates.iter().filter(|c| c.validated).collect();

    if validated.is_empty() {
        return vec![AgentAssignment::macro_view(macro_focus(entities, summary))];
    }

    let mut team: Vec<AgentAssignment> = validated
        .iter()
        .map(|c| AgentAssignment::equity(&c.symbol, &c.company))
        .collect();

    if validated.len() > 1 {
        let shared = shared_sectors(&validated);
        if !shared.is_empty() {
            let names: Vec<String> = shared.iter().map(Sector::to_string).collect();
            team.push(AgentAssignment::sector(format!(
                "Sector impact on {}",
                names.join(", ")
            )));
        }
    }

    team
}

/// Sectors inferred for at least two candidates, in declaration order.
fn shared_sectors(candidates: &[&TickerCandidate]) -> Vec<Sector> {
    let mut counts: BTreeMap<Sector, usize> = BTreeMap::new();
    for candidate in candidates {
        if let Some(sector) = Sector::infer(&candidate.rationale) {
            *counts.entry(sector).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .filter(|(_, n)| *n >= 2)
        .map(|(sector, _)| sector)
        .collect()
}

fn macro_focus(entities: &[String], summary: &str) -> String {
    let named: Vec<&str> = entities
        .iter()
        .map(|e| e.trim())
        .filter(|e| !e.is_empty())
        .collect();
    if !named.is_empty() {
        format!("Macro impact of news involving {}", named.join(", "))
    } else if !summary.trim().is_empty() {
        format!("Macro impact of: {}", summary.trim())
    } else {
        "Macro impact of the news".to_string()
    }
}
