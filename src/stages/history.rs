//! Stage 1: search-grounded historical facts about a place.

use super::{call_provider, decode_object, guarded, StageKind};
use crate::backend::{Capability, GenerateRequest};
use crate::error::Result;
use crate::exec_ctx::ExecCtx;
use crate::output_parser::parse_json_object;
use crate::prompt::{render, PromptVars};
use crate::types::HistoryResult;
use serde::Deserialize;
use std::collections::BTreeSet;

pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_REGION: &str = "Busan, South Korea";

// Grounding and response schemas are mutually exclusive, so the JSON shape
// is requested in the prompt and recovered by the response parser.
const TEMPLATE: &str = r#"Search for historical facts about the place '{location}' in {region}.
Reply in Korean, strictly in the following JSON shape, inside a ```json code block:
{{
  "summary": "the historical background and key events, in 2-3 sentences",
  "facts": ["key historical fact 1", "key historical fact 2", "key historical fact 3"]
}}
Every statement must rest on verifiable historical sources. Do not add any other commentary."#;

/// What the model is asked to return.
#[derive(Debug, Deserialize)]
struct HistoryPayload {
    summary: String,
    facts: Vec<String>,
}

/// Retrieves a short history of a location with grounding citations.
#[derive(Debug, Clone)]
pub struct HistoryStage {
    model: String,
    region: String,
}

impl Default for HistoryStage {
    fn default() -> Self {
        Self {
            model: DEFAULT_TEXT_MODEL.to_string(),
            region: DEFAULT_REGION.to_string(),
        }
    }
}

impl HistoryStage {
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

    /// The rendered request text for a location.
    pub fn prompt(&self, location: &str) -> String {
        let vars = PromptVars::new()
            .insert("location", location)
            .insert("region", self.region.as_str());
        render(TEMPLATE, &vars)
    }

    /// Fetch the history of `location`. Exactly one provider call.
    pub async fn run(&self, ctx: &ExecCtx, location: &str) -> Result<HistoryResult> {
        guarded(ctx, StageKind::History, &self.model, self.fetch(ctx, location)).await
    }

    async fn fetch(&self, ctx: &ExecCtx, location: &str) -> Result<HistoryResult> {
        let request = GenerateRequest::new(
            self.model.as_str(),
            self.prompt(location),
            Capability::SearchGrounding,
        );
        let response = call_provider(ctx, StageKind::History, &request).await?;

        let payload: HistoryPayload = decode_object(parse_json_object(&response.text)?)?;
        if payload.facts.is_empty() {
            tracing::warn!(location, "history response has no facts");
        }

        let sources: BTreeSet<String> = response.citations.into_iter().collect();

        Ok(HistoryResult {
            location: location.to_string(),
            summary: payload.summary,
            facts: payload.facts,
            source_urls: (!sources.is_empty()).then_some(sources),
        })
    }
}
