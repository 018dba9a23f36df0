//! AI gateway: one outbound call per domain operation against the configured
//! backend, translated into a typed result or a typed failure.
//!
//! Every call is single-shot (retry is a user-initiated re-click) and carries
//! a per-request timeout so a cold-starting backend fails distinctly from a
//! dead network.

use crate::config::Config;
use crate::error::{InsightError, Result};
use crate::models::{
    ChatMessage, DocumentInsights, DocumentSummary, Language, ReadinessScore, ResearchDocument,
    Role,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Character cap on the document content embedded into a chat prompt, to
/// respect the backend's token limits.
pub const CHAT_CONTEXT_CAP: usize = 20_000;

const CONNECT_TIMEOUT_SECS: u64 = 10;

pub struct AiGateway {
    client: Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
}

#[derive(Serialize)]
struct ChatRequest {
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct SearchResponse {
    answer: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    response: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Wire shape of `/research-readiness/`: the backend is allowed to omit or
/// null any field, so everything is optional until normalized.
#[derive(Deserialize)]
struct RawReadiness {
    #[serde(default)]
    novelty_score: Option<f32>,
    #[serde(default)]
    technical_depth_score: Option<f32>,
    #[serde(default)]
    experimental_rigor_score: Option<f32>,
    #[serde(default)]
    literature_coverage_score: Option<f32>,
    #[serde(default)]
    publication_readiness_score: Option<f32>,
    #[serde(default)]
    strengths: Option<Vec<String>>,
    #[serde(default)]
    weaknesses: Option<Vec<String>>,
    #[serde(default)]
    suggestions: Option<Vec<String>>,
    #[serde(default)]
    suitable_venues: Option<Vec<String>>,
    #[serde(default)]
    final_verdict: Option<String>,
}

impl RawReadiness {
    fn normalize(self) -> ReadinessScore {
        ReadinessScore {
            novelty_score: self.novelty_score.unwrap_or(0.0),
            technical_depth_score: self.technical_depth_score.unwrap_or(0.0),
            experimental_rigor_score: self.experimental_rigor_score.unwrap_or(0.0),
            literature_coverage_score: self.literature_coverage_score.unwrap_or(0.0),
            publication_readiness_score: self.publication_readiness_score.unwrap_or(0.0),
            strengths: self.strengths.unwrap_or_default(),
            weaknesses: self.weaknesses.unwrap_or_default(),
            suggestions: self.suggestions.unwrap_or_default(),
            suitable_venues: self
                .suitable_venues
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| vec!["Not specified".to_string()]),
            final_verdict: self
                .final_verdict
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "Evaluation Incomplete".to_string()),
        }
    }
}

impl AiGateway {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| InsightError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    pub async fn summarize(&self, text: &str) -> Result<DocumentSummary> {
        self.post_json("/summarize/", &TextRequest { text }).await
    }

    pub async fn extract_insights(&self, text: &str) -> Result<DocumentInsights> {
        self.post_json("/insights/", &TextRequest { text }).await
    }

    /// Free-text query across the backend's corpus; returns the synthesized
    /// natural-language answer.
    pub async fn search(&self, query: &str) -> Result<String> {
        let response: SearchResponse = self.post_json("/search/", &SearchRequest { query }).await?;
        Ok(response.answer)
    }

    /// Sends the prior history plus one composed prompt embedding the
    /// document context and the language preference.
    pub async fn chat(
        &self,
        doc: &ResearchDocument,
        history: &[ChatMessage],
        question: &str,
        language: Language,
    ) -> Result<String> {
        let mut messages = history.to_vec();
        messages.push(ChatMessage {
            role: Role::User,
            content: build_chat_prompt(doc, question, language),
        });
        let response: ChatResponse = self.post_json("/chat/", &ChatRequest { messages }).await?;
        Ok(response
            .response
            .unwrap_or_else(|| "No response generated.".to_string()))
    }

    /// Evaluates the full document text. The backend response is defensively
    /// normalized so a partially-filled reply never reaches a view.
    pub async fn evaluate_readiness(&self, text: &str) -> Result<ReadinessScore> {
        let raw: RawReadiness = self
            .post_json("/research-readiness/", &TextRequest { text })
            .await?;
        Ok(raw.normalize())
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("POST {url}");

        let response = self
            .client
            .post(&url)
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            let fallback = status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string();
            let message = match response.json::<ErrorBody>().await {
                Ok(ErrorBody { error: Some(msg) }) => msg,
                _ => fallback,
            };
            log::warn!("backend returned {status} for {path}: {message}");
            return Err(InsightError::Backend(message));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| InsightError::Parse(format!("malformed backend response: {e}")))
    }

    fn classify_transport(&self, err: reqwest::Error) -> InsightError {
        if err.is_timeout() {
            InsightError::Timeout(self.timeout.as_secs())
        } else {
            InsightError::Network(err.to_string())
        }
    }
}

pub(crate) fn build_chat_prompt(
    doc: &ResearchDocument,
    question: &str,
    language: Language,
) -> String {
    let snippet: String = doc.content.chars().take(CHAT_CONTEXT_CAP).collect();
    format!(
        "You are an intelligent research assistant.\n\
         User Language Preference: {}\n\n\
         Context Document:\n\
         Title: {}\n\
         Content Snippet (first {} chars):\n{}\n\n\
         User Question: {}\n\n\
         Instructions:\n\
         1. Answer based ONLY on the provided context if possible.\n\
         2. If the user asks in Hindi/Marathi, reply in that language.\n\
         3. If 'Hinglish' is selected, reply in a mix of Hindi and English.\n\
         4. Be concise and accurate.",
        language.code(),
        doc.name,
        CHAT_CONTEXT_CAP,
        snippet,
        question
    )
}
