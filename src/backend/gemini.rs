//! Backend for the Gemini `generateContent` API.
//!
//! [`GeminiBackend`] translates normalized [`GenerateRequest`]s into
//! `POST {base}/v1beta/models/{model}:generateContent` calls and reads back
//! text parts, grounding citations, and `inlineData` image parts.

use super::{Backend, Capability, GenerateRequest, GenerateResponse, InlineData};
use crate::error::Result;
use crate::PipelineError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

/// API version segment appended to the base URL.
const API_VERSION: &str = "v1beta";

/// Backend for Google's Gemini API.
///
/// The API key is sent as the `x-goog-api-key` header. Without a key every
/// call fails with [`PipelineError::ProviderUnavailable`] before any
/// network traffic.
///
/// # Example
///
/// ```
/// use soul_curator::backend::GeminiBackend;
///
/// let backend = GeminiBackend::new().with_api_key("AIza...");
/// assert!(backend.has_api_key());
/// ```
#[derive(Clone, Default)]
pub struct GeminiBackend {
    pub(crate) api_key: Option<String>,
}

impl std::fmt::Debug for GeminiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiBackend")
            .field(
                "api_key",
                &self.api_key.as_ref().map(|k| {
                    let prefix: String = k.chars().take(4).collect();
                    if k.chars().count() > 4 {
                        format!("{}***", prefix)
                    } else {
                        "***".to_string()
                    }
                }),
            )
            .finish()
    }
}

impl GeminiBackend {
    /// Create a backend without a credential.
    pub fn new() -> Self {
        Self { api_key: None }
    }

    /// Set the API key. Blank keys are treated as absent.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = if key.trim().is_empty() {
            None
        } else {
            Some(key)
        };
        self
    }

    /// Returns `true` if an API key has been configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Full endpoint URL for a model. Accepts `"gemini-x"` or `"models/gemini-x"`.
    pub(crate) fn endpoint(base_url: &str, model: &str) -> String {
        let model = model.trim();
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!(
            "{}/{}/models/{}:generateContent",
            base_url.trim_end_matches('/'),
            API_VERSION,
            model
        )
    }

    /// Build the JSON body for `generateContent`.
    pub(crate) fn build_body(request: &GenerateRequest) -> Value {
        let mut body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }],
            }],
        });

        match &request.capability {
            Capability::Text => {}
            Capability::SearchGrounding => {
                body["tools"] = json!([{ "google_search": {} }]);
            }
            Capability::StructuredOutput(schema) => {
                body["generationConfig"] = json!({
                    "responseMimeType": "application/json",
                    "responseSchema": schema,
                });
            }
            Capability::Image => {
                body["generationConfig"] = json!({
                    "responseModalities": ["TEXT", "IMAGE"],
                });
            }
        }

        body
    }

    /// Normalize a decoded `generateContent` response.
    ///
    /// Only the first candidate is read, matching how the SDKs expose
    /// `response.text`.
    pub(crate) fn normalize(wire: WireResponse, status: u16) -> GenerateResponse {
        let Some(candidate) = wire.candidates.into_iter().next() else {
            return GenerateResponse {
                status,
                ..Default::default()
            };
        };

        let mut text = String::new();
        let mut inline_data = Vec::new();
        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            if let Some(t) = part.text {
                text.push_str(&t);
            }
            if let Some(blob) = part.inline_data {
                inline_data.push(InlineData {
                    mime_type: blob.mime_type,
                    data: blob.data,
                });
            }
        }

        let citations = candidate
            .grounding_metadata
            .map(|m| m.grounding_chunks)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|chunk| chunk.web.and_then(|w| w.uri))
            .filter(|uri| !uri.is_empty())
            .collect();

        GenerateResponse {
            text,
            citations,
            inline_data,
            status,
        }
    }
}

#[async_trait]
impl Backend for GeminiBackend {
    async fn generate(
        &self,
        client: &Client,
        base_url: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            PipelineError::ProviderUnavailable("Gemini API key is not configured".into())
        })?;

        let url = Self::endpoint(base_url, &request.model);
        let body = Self::build_body(request);

        let resp = client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();

        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(PipelineError::HttpError { status, body: text });
        }

        let raw = resp.text().await?;
        let wire: WireResponse = serde_json::from_str(&raw).map_err(|e| {
            PipelineError::MalformedResponse(format!("undecodable Gemini response: {}", e))
        })?;

        Ok(Self::normalize(wire, status))
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

// ── Wire format (only the fields we read) ──

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCandidate {
    content: Option<WireContent>,
    grounding_metadata: Option<WireGroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct WireContent {
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    text: Option<String>,
    #[serde(alias = "inline_data")]
    inline_data: Option<WireBlob>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBlob {
    #[serde(alias = "mime_type")]
    mime_type: Option<String>,
    #[serde(default)]
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireGroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<WireGroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct WireGroundingChunk {
    web: Option<WireWeb>,
}

#[derive(Debug, Deserialize)]
struct WireWeb {
    uri: Option<String>,
}
