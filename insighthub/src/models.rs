use serde::{Deserialize, Serialize};

/// A single ingested paper. Wire names follow the persisted camelCase layout
/// so existing `research_docs` collections keep loading.
///
/// `content` is immutable after creation; `summary` and `insights` are set
/// wholesale by one generation each and may be overwritten by re-generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchDocument {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub upload_date: String,
    pub content: String,
    pub page_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<DocumentSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<DocumentInsights>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chunks: Vec<DocumentChunk>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub findings: Vec<String>,
    pub methodology: String,
    pub limitations: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInsights {
    pub key_concepts: Vec<String>,
    pub objectives: Vec<String>,
    pub results: Vec<String>,
    pub conclusions: Vec<String>,
}

/// Sentence-packed slice of a document. `page` is approximated from the
/// character position; `embedding` is filled in by the search index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub text: String,
    pub page: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// Normalized research-readiness evaluation. Every field is concrete: the
/// gateway fills missing backend fields with these defaults before the score
/// reaches a view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessScore {
    pub novelty_score: f32,
    pub technical_depth_score: f32,
    pub experimental_rigor_score: f32,
    pub literature_coverage_score: f32,
    pub publication_readiness_score: f32,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
    pub suitable_venues: Vec<String>,
    pub final_verdict: String,
}

impl ReadinessScore {
    /// Rounded mean of the five sub-scores.
    pub fn average(&self) -> u32 {
        let total = self.novelty_score
            + self.technical_depth_score
            + self.experimental_rigor_score
            + self.literature_coverage_score
            + self.publication_readiness_score;
        (total / 5.0).round() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub doc_id: String,
    pub doc_name: String,
    pub text: String,
    pub page: usize,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Reply-language preference for chat. Embedded into the prompt as an
/// instruction because the backend is a single free-text completion endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    Hindi,
    Marathi,
    Hinglish,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::Hindi => "hi-IN",
            Language::Marathi => "mr-IN",
            Language::Hinglish => "hinglish",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Marathi => "Marathi",
            Language::Hinglish => "Hinglish",
        }
    }

    /// Accepts either the speech-tag code or the display label.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        [
            Language::English,
            Language::Hindi,
            Language::Marathi,
            Language::Hinglish,
        ]
        .into_iter()
        .find(|lang| {
            lang.code().to_lowercase() == value || lang.label().to_lowercase() == value
        })
    }
}
