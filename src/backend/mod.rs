//! Backend trait and normalized request/response types.
//!
//! The [`Backend`] trait is the generative provider capability. It takes a
//! normalized [`GenerateRequest`] and returns a [`GenerateResponse`] holding
//! the text, any grounding citations, and any inline binary payloads.
//! Built-in implementations: [`GeminiBackend`], [`MockBackend`].
//!
//! ## Architecture
//!
//! ```text
//! Stage ──► GenerateRequest ──► Backend::generate() ──► GenerateResponse
//!                                      │
//!                           ┌──────────┴──────────┐
//!                     GeminiBackend           MockBackend
//!                :generateContent          canned replies,
//!                google_search tool        recorded requests
//!                responseSchema
//!                inlineData parts
//! ```

pub mod gemini;
pub mod mock;

pub use gemini::GeminiBackend;
pub use mock::{MockBackend, MockReply};

use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// Optional provider capability attached to a request.
///
/// Search grounding and structured output cannot be combined, so a request
/// carries exactly one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Capability {
    /// Plain text generation. None of the built-in stages send this; it is
    /// for callers driving a [`Backend`] directly.
    Text,
    /// Text generation augmented with live web search; citations come back
    /// in [`GenerateResponse::citations`].
    SearchGrounding,
    /// Text constrained to the given response schema, returned as JSON.
    StructuredOutput(Value),
    /// Image generation; results come back in [`GenerateResponse::inline_data`].
    Image,
}

impl Capability {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Capability::Text => "text",
            Capability::SearchGrounding => "search-grounding",
            Capability::StructuredOutput(_) => "structured-output",
            Capability::Image => "image",
        }
    }
}

/// A normalized, provider-agnostic generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    /// Model identifier (e.g. `"gemini-2.5-flash"`).
    pub model: String,

    /// The user prompt text.
    pub prompt: String,

    /// Which provider capability to enable.
    pub capability: Capability,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>, capability: Capability) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            capability,
        }
    }
}

/// Binary content returned inline in a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineData {
    /// MIME type, when the provider reported one.
    pub mime_type: Option<String>,
    /// Base64-encoded bytes, as sent by the provider.
    pub data: String,
}

/// A normalized generation response.
#[derive(Debug, Clone, Default)]
pub struct GenerateResponse {
    /// Concatenated text parts. Empty when the model returned none.
    pub text: String,

    /// Grounding citation URIs, in provider order, possibly repeated.
    pub citations: Vec<String>,

    /// Inline binary parts, in provider order.
    pub inline_data: Vec<InlineData>,

    /// HTTP status code (for diagnostics/logging).
    pub status: u16,
}

impl GenerateResponse {
    /// A text-only response.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            status: 200,
            ..Default::default()
        }
    }

    /// First inline part that carries data and is not typed as a non-image.
    ///
    /// Parts with a missing or blank MIME type are accepted.
    pub fn first_inline_image(&self) -> Option<&InlineData> {
        self.inline_data.iter().find(|part| {
            let typed_non_image = part
                .mime_type
                .as_deref()
                .map(str::trim)
                .is_some_and(|mime| !mime.is_empty() && !mime.starts_with("image/"));
            !part.data.is_empty() && !typed_non_image
        })
    }
}

/// Abstraction over the generative provider.
///
/// Implementors translate between the normalized request/response types and
/// the provider's HTTP API. One call to [`Backend::generate`] is one network
/// round trip; implementations must not retry.
///
/// # Object Safety
///
/// This trait is object-safe and designed to be used as `Arc<dyn Backend>`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Execute a single generation call.
    async fn generate(
        &self,
        client: &Client,
        base_url: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse>;

    /// Human-readable name for logging and diagnostics.
    fn name(&self) -> &'static str;
}
