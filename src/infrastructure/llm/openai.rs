use super::vocabulary::{normalize_action, normalize_confidence, normalize_ticker};
use crate::domain::entities::analysis::InitialAnalysis;
use crate::domain::entities::ticker_candidate::TickerCandidate;
use crate::domain::error::CollaboratorError;
use crate::domain::ports::inference::{
    DecisionMaker, DecisionPayload, FocusAnalyst, RawDecision, Summarizer, TickerExtractor,
};
use crate::domain::values::agent_kind::AgentKind;
use crate::domain::values::sentiment::Sentiment;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Chat-completions client serving every inference port.
pub struct OpenAiInference {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[derive(Deserialize)]
struct AnalysisReply {
    summary: String,
    #[serde(default)]
    impact: f64,
    #[serde(default)]
    sentiment: String,
    #[serde(default)]
    entities: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TickerReply {
    List(Vec<TickerItem>),
    Wrapped { tickers: Vec<TickerItem> },
}

#[derive(Deserialize)]
struct TickerItem {
    #[serde(alias = "symbol")]
    ticker: String,
    #[serde(default, alias = "company_name")]
    company: String,
    #[serde(default, alias = "justification")]
    rationale: String,
}

const SYSTEM_JSON: &str = "You are a financial news analyst. Answer with valid JSON only.";
const SYSTEM_TEXT: &str = "You are a financial news analyst. Answer in concise prose.";

impl OpenAiInference {
    pub fn new(api_key: String, base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, CollaboratorError> {
        if self.api_key.is_empty() {
            return Err(CollaboratorError::Unavailable(
                "inference API key is not configured".into(),
            ));
        }

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&ChatRequest {
                model: &self.model,
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: system,
                    },
                    ChatMessage {
                        role: "user",
                        content: prompt,
                    },
                ],
                temperature: 0.0,
            })
            .send()
            .await
            .map_err(|e| CollaboratorError::Network(format!("Inference API error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(CollaboratorError::Network(format!(
                "Inference API {status}: {body}"
            )));
        }

        let reply: ChatResponse = resp
            .json()
            .await
            .map_err(|e| CollaboratorError::Malformed(format!("Parse error: {e}")))?;

        reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| CollaboratorError::Malformed("empty completion".into()))
    }

    async fn complete_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
    ) -> Result<T, CollaboratorError> {
        let content = self.complete(SYSTEM_JSON, prompt).await?;
        let clean = strip_code_fence(&content);
        serde_json::from_str(clean).map_err(|e| {
            CollaboratorError::Malformed(format!("Failed to parse JSON reply: {e}"))
        })
    }
}

/// Removes a surrounding markdown code fence, if any.
fn strip_code_fence(content: &str) -> &str {
    content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

#[async_trait]
impl Summarizer for OpenAiInference {
    async fn analyze(&self, text: &str) -> Result<InitialAnalysis, CollaboratorError> {
        let prompt = format!(
            "Summarize the article below for a trader. Reply with an object holding \
             \"summary\" (string), \"impact\" (integer 1-10), \"sentiment\" \
             (positive, negative or neutral) and \"entities\" (companies, tickers, sectors).\n\n{text}"
        );
        let reply: AnalysisReply = self.complete_json(&prompt).await?;
        Ok(InitialAnalysis {
            summary: reply.summary,
            impact: reply.impact.round().clamp(1.0, 10.0) as u8,
            sentiment: reply.sentiment.parse().unwrap_or_default(),
            entities: reply.entities,
        })
    }
}

#[async_trait]
impl TickerExtractor for OpenAiInference {
    async fn extract_tickers(
        &self,
        summary: &str,
        text: &str,
    ) -> Result<Vec<TickerCandidate>, CollaboratorError> {
        let prompt = format!(
            "List the listed instruments most directly affected by this news. Reply with an \
             array of objects holding \"ticker\", \"company\" and \"rationale\". Reply with [] \
             when no listed company is concerned.\n\nSummary: {summary}\n\nArticle:\n{text}"
        );
        let reply: TickerReply = self.complete_json(&prompt).await?;
        let items = match reply {
            TickerReply::List(items) | TickerReply::Wrapped { tickers: items } => items,
        };
        Ok(items
            .into_iter()
            .filter_map(|item| {
                let symbol = normalize_ticker(Some(&item.ticker))?;
                Some(TickerCandidate::new(symbol, item.company, item.rationale))
            })
            .collect())
    }
}

#[async_trait]
impl FocusAnalyst for OpenAiInference {
    async fn analyze_focus(
        &self,
        kind: AgentKind,
        focus: &str,
        summary: &str,
        text: &str,
    ) -> Result<String, CollaboratorError> {
        let angle = match kind {
            AgentKind::Equity => "the company and its stock",
            AgentKind::Sector => "the industry as a whole and its competitive dynamics",
            AgentKind::Macro => "the macroeconomic and cross-asset consequences",
        };
        let prompt = format!(
            "Analyse this news from the angle of {angle}. Focus: {focus}.\n\n\
             Summary: {summary}\n\nArticle:\n{text}"
        );
        self.complete(SYSTEM_TEXT, &prompt).await
    }
}

#[async_trait]
impl DecisionMaker for OpenAiInference {
    async fn decide(
        &self,
        debriefing: &str,
        capital: f64,
        ticker_summary: &str,
    ) -> Result<DecisionPayload, CollaboratorError> {
        let prompt = format!(
            "Available capital: {capital:.2}.\nValidated tickers:\n{ticker_summary}\n\n\
             Analyst reports:\n{debriefing}\n\n\
             Reply with one object holding \"action\" (LONG, SHORT, WATCH or IGNORE), \
             \"ticker\" (one of the validated tickers or null), \"confidence\" (HIGH, MEDIUM \
             or LOW), \"horizon\", \"justification\", \"allocation_pct\" (0.0 to 5.0, 0 unless \
             LONG or SHORT), \"positives\" and \"negatives\" (string arrays)."
        );
        let payload: DecisionPayload = self.complete_json(&prompt).await?;
        Ok(match payload {
            DecisionPayload::Single(raw) => DecisionPayload::Single(normalize_decision(raw)),
            DecisionPayload::Many(list) => {
                DecisionPayload::Many(list.into_iter().map(normalize_decision).collect())
            }
        })
    }
}

fn normalize_decision(raw: RawDecision) -> RawDecision {
    RawDecision {
        action: normalize_action(&raw.action),
        ticker: normalize_ticker(raw.ticker.as_deref()),
        confidence: raw.confidence.as_deref().and_then(normalize_confidence),
        ..raw
    }
}
