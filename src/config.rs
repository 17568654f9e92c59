//! Runtime configuration for a curation pipeline.

use crate::{
    backend::{Backend, GeminiBackend},
    error::Result,
    exec_ctx::{ExecCtx, DEFAULT_BASE_URL},
    pipeline::CurationPipeline,
    stages::{
        history::{DEFAULT_REGION, DEFAULT_TEXT_MODEL},
        image::DEFAULT_IMAGE_MODEL,
        HistoryStage, ImageStage, PlanningStage,
    },
    PipelineError,
};
use std::sync::Arc;
use std::time::Duration;

pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
/// Checked when [`ENV_API_KEY`] is unset.
pub const ENV_API_KEY_FALLBACK: &str = "API_KEY";
pub const ENV_API_BASE: &str = "GEMINI_API_BASE";
pub const ENV_TEXT_MODEL: &str = "CURATOR_TEXT_MODEL";
pub const ENV_IMAGE_MODEL: &str = "CURATOR_IMAGE_MODEL";
pub const ENV_REGION: &str = "CURATOR_REGION";
pub const ENV_TIMEOUT_SECS: &str = "CURATOR_TIMEOUT_SECS";

/// Models, region, endpoint and credential for a pipeline.
///
/// A missing API key is not a configuration error. The Gemini backend
/// reports [`PipelineError::ProviderUnavailable`] on the first call instead.
#[derive(Clone)]
pub struct CuratorConfig {
    /// Gemini API key.
    pub api_key: Option<String>,

    /// API host, without the version segment.
    pub base_url: String,

    /// Model for the history and planning stages.
    pub text_model: String,

    /// Model for the poster.
    pub image_model: String,

    /// Interpolated into every prompt, e.g. `"Busan, South Korea"`.
    pub region: String,

    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for CuratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            region: DEFAULT_REGION.to_string(),
            timeout: None,
        }
    }
}

impl std::fmt::Debug for CuratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CuratorConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .field("region", &self.region)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CuratorConfig {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read configuration from the process environment.
    ///
    /// Unset or blank variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self {
            api_key: get(ENV_API_KEY).or_else(|| get(ENV_API_KEY_FALLBACK)),
            ..Self::default()
        };
        if let Some(base_url) = get(ENV_API_BASE) {
            config.base_url = base_url;
        }
        if let Some(model) = get(ENV_TEXT_MODEL) {
            config.text_model = model;
        }
        if let Some(model) = get(ENV_IMAGE_MODEL) {
            config.image_model = model;
        }
        if let Some(region) = get(ENV_REGION) {
            config.region = region;
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            config.timeout = Some(parse_timeout(&raw)?);
        }
        Ok(config)
    }

    /// Build an execution context backed by Gemini.
    pub fn build_ctx(&self) -> Result<ExecCtx> {
        let backend = match &self.api_key {
            Some(key) => GeminiBackend::new().with_api_key(key.as_str()),
            None => GeminiBackend::new(),
        };
        self.build_ctx_with_backend(Arc::new(backend))
    }

    /// Build an execution context around an injected backend.
    pub fn build_ctx_with_backend(&self, backend: Arc<dyn Backend>) -> Result<ExecCtx> {
        let mut builder = ExecCtx::builder(self.base_url.as_str()).backend(backend);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }

    /// Build a Gemini-backed pipeline.
    pub fn build_pipeline(&self) -> Result<CurationPipeline> {
        Ok(self.build_pipeline_with_ctx(self.build_ctx()?))
    }

    /// Build a pipeline around an injected backend.
    pub fn build_pipeline_with_backend(
        &self,
        backend: Arc<dyn Backend>,
    ) -> Result<CurationPipeline> {
        Ok(self.build_pipeline_with_ctx(self.build_ctx_with_backend(backend)?))
    }

    /// Build a pipeline around a prepared context, applying models and region.
    pub fn build_pipeline_with_ctx(&self, ctx: ExecCtx) -> CurationPipeline {
        CurationPipeline::builder(ctx)
            .history_stage(HistoryStage::new().with_model(self.text_model.as_str()))
            .planning_stage(PlanningStage::new().with_model(self.text_model.as_str()))
            .image_stage(ImageStage::new().with_model(self.image_model.as_str()))
            .region(self.region.as_str())
            .build()
    }
}

fn parse_timeout(raw: &str) -> Result<Duration> {
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(PipelineError::InvalidConfig(format!(
            "{} must be a positive number of seconds, got '{}'",
            ENV_TIMEOUT_SECS, raw
        ))),
    }
}
