//! Stage 2: a structured content plan from history and emotion.

use super::history::{DEFAULT_REGION, DEFAULT_TEXT_MODEL};
use super::{call_provider, decode_object, guarded, StageKind};
use crate::backend::{Capability, GenerateRequest};
use crate::error::Result;
use crate::exec_ctx::ExecCtx;
use crate::output_parser::parse_json_object;
use crate::prompt::{render, PromptVars};
use crate::types::{ContentFormat, ContentPlan, HistoryResult};
use crate::PipelineError;
use serde_json::{json, Value};

const TEMPLATE: &str = r#"You are a cultural content editor with a fresh, trend-setting voice for people in their twenties and thirties.

## Input
- Place: {location} ({region})
- Historical summary: {summary}
- The user's emotion: {emotion}
- Desired content format: {content_type}

## Goal
Using the input, plan a piece of '{content_type}' cultural content that deeply comforts and empathizes with the feeling '{emotion}'.

## Output (JSON, all text in Korean)
- contentType: the proposed format (e.g. {content_type})
- title: a young, hip title, e.g. '00의 밤, 그리고 우리'
- concept: the planning intent and core idea
- storyline: the story outline with concrete characters and material
- empathyPoint: how this content comforts the user's emotion
- socialPostText: an Instagram caption in a young, hip voice, never stiff. Break lines often to keep each breath short. Place mood emojis such as ☁️✨🌊🎞️🌿 mid-sentence or at line ends. Weave the history in as metaphor and write lines that make readers want to save the post. No hashtags.
- hashtags: three hashtags of your own followed by 부산여행, 감성글귀, 위로, 힙플

Keep the tone trendy and sensory; offer comfort that never feels dated."#;

/// Plans cultural content. Uses the provider's structured-output mode.
#[derive(Debug, Clone)]
pub struct PlanningStage {
    model: String,
    region: String,
}

impl Default for PlanningStage {
    fn default() -> Self {
        Self {
            model: DEFAULT_TEXT_MODEL.to_string(),
            region: DEFAULT_REGION.to_string(),
        }
    }
}

impl PlanningStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The rendered request text.
    pub fn prompt(
        &self,
        location: &str,
        history: &HistoryResult,
        emotion: &str,
        content_type: ContentFormat,
    ) -> String {
        let vars = PromptVars::new()
            .insert("location", location)
            .insert("region", self.region.as_str())
            .insert("summary", history.summary.as_str())
            .insert("emotion", emotion)
            .insert("content_type", content_type.label());
        render(TEMPLATE, &vars)
    }

    /// Response schema handed to the provider. Every plan field is required.
    pub fn response_schema() -> Value {
        let mut properties = serde_json::Map::new();
        for field in ContentPlan::FIELDS {
            let schema = if field == "hashtags" {
                json!({"type": "ARRAY", "items": {"type": "STRING"}})
            } else {
                json!({"type": "STRING"})
            };
            properties.insert(field.to_string(), schema);
        }
        json!({
            "type": "OBJECT",
            "properties": properties,
            "required": ContentPlan::FIELDS,
        })
    }

    /// Plan content. Exactly one provider call.
    pub async fn run(
        &self,
        ctx: &ExecCtx,
        location: &str,
        history: &HistoryResult,
        emotion: &str,
        content_type: ContentFormat,
    ) -> Result<ContentPlan> {
        let body = self.plan(ctx, location, history, emotion, content_type);
        guarded(ctx, StageKind::Planning, &self.model, body).await
    }

    async fn plan(
        &self,
        ctx: &ExecCtx,
        location: &str,
        history: &HistoryResult,
        emotion: &str,
        content_type: ContentFormat,
    ) -> Result<ContentPlan> {
        let request = GenerateRequest::new(
            self.model.as_str(),
            self.prompt(location, history, emotion, content_type),
            Capability::StructuredOutput(Self::response_schema()),
        );
        let response = call_provider(ctx, StageKind::Planning, &request).await?;

        // Schema mode should give bare JSON, but some models still fence it.
        let plan: ContentPlan = decode_object(parse_json_object(&response.text)?)?;
        if let Some(name) = plan.blank_field() {
            return Err(PipelineError::MalformedResponse(format!("empty field `{}`", name)));
        }
        if plan.hashtags.is_empty() {
            tracing::warn!(title = %plan.title, "content plan has no hashtags");
        }
        Ok(plan)
    }
}
