//! The three generation stages.
//!
//! Each stage is a small, stateless value (model name plus prompt logic)
//! whose `run` method makes exactly one provider call and either returns its
//! artifact or a [`PipelineError::StageFailed`] carrying the coarse stage
//! message. The fine-grained cause is logged here and kept as the error's
//! source.

pub mod history;
pub mod image;
pub mod planning;

pub use history::HistoryStage;
pub use image::ImageStage;
pub use planning::PlanningStage;

use crate::backend::{GenerateRequest, GenerateResponse};
use crate::error::Result;
use crate::events::Event;
use crate::exec_ctx::ExecCtx;
use crate::PipelineError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use std::future::Future;

/// Identifies a stage in logs, events, and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    History,
    Planning,
    Image,
}

impl StageKind {
    pub fn name(self) -> &'static str {
        match self {
            StageKind::History => "history",
            StageKind::Planning => "planning",
            StageKind::Image => "image",
        }
    }

    /// The user-facing message shown when this stage fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            StageKind::History => "failed to retrieve historical information",
            StageKind::Planning => "failed to plan content",
            StageKind::Image => "failed to generate image",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Send one request through the context's backend.
pub(crate) async fn call_provider(
    ctx: &ExecCtx,
    stage: StageKind,
    request: &GenerateRequest,
) -> Result<GenerateResponse> {
    tracing::debug!(
        stage = stage.name(),
        backend = ctx.backend.name(),
        model = %request.model,
        capability = request.capability.label(),
        prompt_chars = request.prompt.chars().count(),
        "calling provider"
    );
    ctx.backend
        .generate(&ctx.client, &ctx.base_url, request)
        .await
}

/// Run a stage body, emitting start/end events and collapsing any failure
/// into the stage's coarse error.
pub(crate) async fn guarded<T, Fut>(
    ctx: &ExecCtx,
    stage: StageKind,
    model: &str,
    body: Fut,
) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    ctx.emit(Event::StageStart {
        stage,
        model: model.to_string(),
    });

    let outcome = body.await;

    ctx.emit(Event::StageEnd {
        stage,
        ok: outcome.is_ok(),
    });

    outcome.map_err(|e| {
        tracing::error!(
            stage = stage.name(),
            kind = ?e.kind(),
            error = %e,
            "stage failed"
        );
        PipelineError::stage_failed(stage, e)
    })
}

/// Deserialize a located JSON object into the stage's payload type.
///
/// Missing or mistyped fields become [`PipelineError::MalformedResponse`].
pub(crate) fn decode_object<T: DeserializeOwned>(object: Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(object))
        .map_err(|e| PipelineError::MalformedResponse(e.to_string()))
}
