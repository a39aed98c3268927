use async_trait::async_trait;
use log::warn;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::AnalysisError;

const GENERATE_CONTENT_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Explicit bound so a degraded upstream cannot hang a request forever.
const MODEL_TIMEOUT: Duration = Duration::from_secs(60);

/// Per-comment sentiment labels and keyword lists, index-aligned with the
/// comment list they were produced from.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub sentiments: Vec<String>,
    pub keywords: Vec<Vec<String>>,
}

/// Model-backed analyzer seam. `GeminiModel` is the production
/// implementation; handlers hold the trait object.
#[async_trait]
pub trait SentimentModel: Send + Sync {
    async fn analyze(&self, comments: &[String]) -> Result<Analysis, AnalysisError>;
}

/// Turns the model's free-form reply text into an `Analysis`.
///
/// Kept as a strategy so a schema-constrained or differently-prompted
/// variant can replace the fence-stripping one without touching the
/// handler or the client.
pub trait ResponseDecoder: Send + Sync {
    fn decode(&self, raw: &str, comment_count: usize) -> Result<Analysis, AnalysisError>;
}

/// Default decoder: strip surrounding markdown fences, then parse strict
/// JSON with `sentiments` and `keywords` keys.
pub struct FencedJsonDecoder;

#[derive(Debug, Deserialize)]
struct DecodedReply {
    sentiments: Vec<String>,
    keywords: Vec<Vec<String>>,
}

impl ResponseDecoder for FencedJsonDecoder {
    fn decode(&self, raw: &str, comment_count: usize) -> Result<Analysis, AnalysisError> {
        let cleaned = strip_code_fences(raw);

        let reply: DecodedReply =
            serde_json::from_str(cleaned).map_err(|e| AnalysisError::ModelOutputParse {
                reason: e.to_string(),
                cleaned: cleaned.to_string(),
            })?;

        // The model is told to emit one entry per comment; a count drift
        // would silently misalign the front end's rows, so fail loudly.
        if reply.sentiments.len() != comment_count || reply.keywords.len() != comment_count {
            return Err(AnalysisError::ModelOutputParse {
                reason: format!(
                    "expected {} sentiments and keyword lists, got {} and {}",
                    comment_count,
                    reply.sentiments.len(),
                    reply.keywords.len()
                ),
                cleaned: cleaned.to_string(),
            });
        }

        Ok(Analysis {
            sentiments: reply.sentiments,
            keywords: reply.keywords,
        })
    }
}

/// Remove a leading ``` fence (optional case-insensitive `json` tag) and a
/// trailing ``` fence. Fences embedded in the body are left alone.
fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let rest = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
        text = rest.trim_start();
    }

    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }

    text
}

/// Render the numbered comment list plus the fixed instruction block.
fn build_prompt(comments: &[String]) -> String {
    let text_block = comments
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. {}", i + 1, c))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a JSON generator. Given a list of YouTube comments, output a JSON object \
         with two keys:\n\
         \x20 1) \"sentiments\": [\"positive\",\"neutral\",\"negative\",...]\n\
         \x20 2) \"keywords\": [[...], [...], ...]\n\n\
         Comments:\n{}\n\n\
         Respond ONLY with the raw JSON object. Do NOT wrap it in markdown fences or add any extra text.",
        text_block
    )
}

/// Gemini `generateContent` client.
pub struct GeminiModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
    decoder: Box<dyn ResponseDecoder>,
}

impl GeminiModel {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_decoder(api_key, model, Box::new(FencedJsonDecoder))
    }

    pub fn with_decoder(api_key: String, model: String, decoder: Box<dyn ResponseDecoder>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(MODEL_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_key,
            model,
            decoder,
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, AnalysisError> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let url = format!(
            "{}/{}:generateContent?key={}",
            GENERATE_CONTENT_URL, self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalysisError::ModelInvocation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::ModelInvocation(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let reply: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::ModelInvocation(e.to_string()))?;

        let text = reply
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(AnalysisError::ModelInvocation(
                "empty reply from model".to_string(),
            ));
        }

        Ok(text)
    }
}

#[async_trait]
impl SentimentModel for GeminiModel {
    async fn analyze(&self, comments: &[String]) -> Result<Analysis, AnalysisError> {
        // Nothing to label; skip the paid call and keep the lists aligned.
        if comments.is_empty() {
            return Ok(Analysis {
                sentiments: Vec::new(),
                keywords: Vec::new(),
            });
        }

        let prompt = build_prompt(comments);
        let raw = self.generate(&prompt).await?;

        self.decoder.decode(&raw, comments.len()).map_err(|e| {
            warn!("Model reply rejected: {}", e);
            e
        })
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Deserialize)]
struct ReplyPart {
    text: String,
}
