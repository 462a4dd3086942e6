//! Google Gemini over REST.
//!
//! One `POST {base}/v1beta/models/{model}:generateContent` per evaluation.
//! The request carries a single user turn whose parts are, in order: the
//! instruction, the page image, and the job description. An empty job
//! description is left out of the parts list; Gemini rejects empty text
//! parts.

use super::{EvaluationProvider, EvaluationRequest, ProviderResponse};
use crate::config::DEFAULT_API_BASE_URL;
use crate::error::HireMeterError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

const PROVIDER_NAME: &str = "gemini";

/// [`EvaluationProvider`] for Gemini's `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, HireMeterError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("hiremeter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HireMeterError::ProviderNotConfigured {
                provider: PROVIDER_NAME.into(),
                hint: format!("HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_API_BASE_URL.to_string(),
        })
    }

    /// Point at a different host (proxy, regional endpoint, test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn failed(&self, message: impl Into<String>) -> HireMeterError {
        HireMeterError::ProviderFailed {
            provider: PROVIDER_NAME.into(),
            message: message.into(),
        }
    }
}

impl fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl EvaluationProvider for GeminiProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &EvaluationRequest) -> Result<ProviderResponse, HireMeterError> {
        let body = build_body(request);
        let url = self.endpoint();
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.failed(format!("request error: {e}")))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| self.failed(format!("reading response: {e}")))?;

        if !status.is_success() {
            return Err(self.failed(format!("HTTP {}: {}", status.as_u16(), error_message(&raw))));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&raw)
            .map_err(|e| self.failed(format!("unexpected response body: {e}")))?;

        parsed.into_provider_response().map_err(|m| self.failed(m))
    }
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: Blob<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u64>,
    candidates_token_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    status: Option<String>,
}

fn build_body(request: &EvaluationRequest) -> GenerateContentRequest<'_> {
    let mut parts = vec![
        Part::Text {
            text: &request.instruction,
        },
        Part::Inline {
            inline_data: Blob {
                mime_type: &request.payload.mime_type,
                data: &request.payload.data,
            },
        },
    ];
    if !request.context.is_empty() {
        parts.push(Part::Text {
            text: &request.context,
        });
    }

    let generation_config = if request.temperature.is_some() || request.max_tokens.is_some() {
        Some(GenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_tokens,
        })
    } else {
        None
    };

    GenerateContentRequest {
        contents: vec![Content { role: "user", parts }],
        generation_config,
    }
}

impl GenerateContentResponse {
    fn into_provider_response(self) -> Result<ProviderResponse, String> {
        let usage = self.usage_metadata;
        let candidate = match self.candidates.into_iter().next() {
            Some(c) => c,
            None => {
                let reason = self
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .unwrap_or_else(|| "no candidates returned".into());
                return Err(format!("prompt rejected: {reason}"));
            }
        };

        let texts: Vec<String> = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if texts.is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".into());
            return Err(format!("response has no text (finish reason {reason})"));
        }

        Ok(ProviderResponse {
            text: texts.concat(),
            input_tokens: usage.as_ref().and_then(|u| u.prompt_token_count),
            output_tokens: usage.as_ref().and_then(|u| u.candidates_token_count),
        })
    }
}

/// Best human-readable message from an error body.
fn error_message(raw: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(raw) {
        Ok(env) => match env.error.status {
            Some(status) => format!("{status}: {}", env.error.message),
            None => env.error.message,
        },
        Err(_) if raw.trim().is_empty() => "empty response body".into(),
        Err(_) => raw.trim().chars().take(300).collect(),
    }
}
