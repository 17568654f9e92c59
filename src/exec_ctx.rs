//! Execution context shared by all stages of a run.
//!
//! [`ExecCtx`] carries the HTTP client, the provider backend, the API base
//! URL, and an optional event handler. The backend is injected here rather
//! than read from process-wide state, so tests hand in a
//! [`MockBackend`](crate::backend::MockBackend) without any setup.

use crate::backend::{Backend, GeminiBackend};
use crate::error::Result;
use crate::events::{emit, Event, EventHandler};
use crate::PipelineError;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Default Gemini API host.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Shared execution context for stage invocations.
///
/// # Example
///
/// ```
/// use soul_curator::ExecCtx;
///
/// let ctx = ExecCtx::builder("https://generativelanguage.googleapis.com")
///     .gemini_with_key("AIza...")
///     .build()
///     .unwrap();
/// assert_eq!(ctx.backend.name(), "gemini");
/// ```
pub struct ExecCtx {
    /// Shared HTTP client; clones share one connection pool.
    pub client: Client,
    /// Base URL for the provider, without the API version segment.
    pub base_url: String,
    /// Provider backend. Default: [`GeminiBackend`] without a key.
    pub backend: Arc<dyn Backend>,
    /// Optional event handler for lifecycle events.
    pub event_handler: Option<Arc<dyn EventHandler>>,
}

impl ExecCtx {
    /// Create a new builder.
    pub fn builder(base_url: impl Into<String>) -> ExecCtxBuilder {
        ExecCtxBuilder {
            client: None,
            base_url: base_url.into(),
            backend: None,
            event_handler: None,
            timeout: None,
        }
    }

    /// Forward an event to the handler, if one is set.
    pub(crate) fn emit(&self, event: Event) {
        emit(&self.event_handler, event);
    }
}

impl std::fmt::Debug for ExecCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecCtx")
            .field("base_url", &self.base_url)
            .field("backend", &self.backend.name())
            .field("has_event_handler", &self.event_handler.is_some())
            .finish()
    }
}

/// Builder for [`ExecCtx`].
pub struct ExecCtxBuilder {
    client: Option<Client>,
    base_url: String,
    backend: Option<Arc<dyn Backend>>,
    event_handler: Option<Arc<dyn EventHandler>>,
    timeout: Option<Duration>,
}

impl ExecCtxBuilder {
    /// Set the HTTP client. If not set, a default client is created.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the provider backend. Default: [`GeminiBackend`] without a key.
    pub fn backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Use the Gemini backend with the given API key.
    pub fn gemini_with_key(mut self, api_key: impl Into<String>) -> Self {
        self.backend = Some(Arc::new(GeminiBackend::new().with_api_key(api_key)));
        self
    }

    /// Set the event handler.
    pub fn event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Set a per-request timeout. Default: none, a stalled call waits forever.
    ///
    /// Ignored when a custom `Client` is provided via `.client()`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the execution context.
    pub fn build(self) -> Result<ExecCtx> {
        let client = match self.client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                builder.build().map_err(|e| {
                    PipelineError::InvalidConfig(format!("failed to build HTTP client: {}", e))
                })?
            }
        };
        Ok(ExecCtx {
            client,
            base_url: normalize_base_url(&self.base_url),
            backend: self
                .backend
                .unwrap_or_else(|| Arc::new(GeminiBackend::new())),
            event_handler: self.event_handler,
        })
    }
}

/// Strip API path suffixes from a base URL.
/// This prevents double-pathing when the backend appends its own path.
/// e.g., "https://generativelanguage.googleapis.com/v1beta" -> "https://generativelanguage.googleapis.com"
fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    // Longest first
    for suffix in &["/v1beta/models", "/v1beta", "/v1/models", "/v1"] {
        if let Some(stripped) = trimmed.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;

    #[test]
    fn test_normalize_base_url_strips_version() {
        assert_eq!(
            normalize_base_url("https://generativelanguage.googleapis.com/v1beta"),
            "https://generativelanguage.googleapis.com"
        );
        assert_eq!(
            normalize_base_url("https://generativelanguage.googleapis.com/v1beta/models/"),
            "https://generativelanguage.googleapis.com"
        );
    }

    #[test]
    fn test_normalize_base_url_preserves_clean() {
        assert_eq!(normalize_base_url(DEFAULT_BASE_URL), DEFAULT_BASE_URL);
        assert_eq!(normalize_base_url("http://127.0.0.1:8080/"), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_default_backend_is_gemini() {
        let ctx = ExecCtx::builder(DEFAULT_BASE_URL).build().unwrap();
        assert_eq!(ctx.backend.name(), "gemini");
        assert!(ctx.event_handler.is_none());
    }

    #[test]
    fn test_injected_backend_and_timeout() {
        let ctx = ExecCtx::builder("http://unused")
            .backend(Arc::new(MockBackend::fixed("{}")))
            .timeout(Duration::from_secs(90))
            .build()
            .unwrap();
        assert_eq!(ctx.backend.name(), "mock");
    }
}
