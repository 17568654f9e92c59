//! Stage 3: a poster image for the plan.

use super::history::DEFAULT_REGION;
use super::{call_provider, guarded, StageKind};
use crate::backend::{Capability, GenerateRequest};
use crate::error::Result;
use crate::exec_ctx::ExecCtx;
use crate::prompt::{render, PromptVars};
use crate::types::{ContentPlan, GeneratedPoster, PosterStyle};
use crate::PipelineError;

pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

const PANEL_TEMPLATE: &str = r#"Draw one image laid out as a four-panel comic strip in the style of a Korean webtoon.
Tell this story across the panels, in order: "{storyline}".

Setting: {location}, {region}.
Emotion: {emotion}.

Panels:
1. An establishing shot of {location}, soft and sentimental.
2. A character quietly carrying the emotion, drawn in a modern, stylish way.
3. A symbolic moment from the place's history, rendered abstractly.
4. A calm resolution that feels like healing.

Look: contemporary manhwa, dreamy and translucent, pastel colors with a little sparkle.
Layout: a 2x2 grid or a vertical strip, all four panels in the single image.

Do not draw any text, dialogue, captions, or speech bubbles anywhere. The panels must tell the story through pictures alone."#;

const SCENE_TEMPLATE: &str = r#"Paint an ethereal watercolor illustration of {location}, {region}.
Theme: "{title}", carrying the emotion "{emotion}".

Technique: refined wet-on-wet watercolor with translucent washes and a modern, youthful sensibility.
Palette: soft pastels against a few deep, emotional tones.
Mood: serene and luminous, cinematic light with a gentle bloom.
Composition: clean, with generous negative space.

No text overlay of any kind. High resolution with fine detail."#;

/// Generates a single poster image, styled by the plan's content type.
#[derive(Debug, Clone)]
pub struct ImageStage {
    model: String,
    region: String,
}

impl Default for ImageStage {
    fn default() -> Self {
        Self {
            model: DEFAULT_IMAGE_MODEL.to_string(),
            region: DEFAULT_REGION.to_string(),
        }
    }
}

impl ImageStage {
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

    /// The rendered request text. Webtoon plans get a panel layout, all
    /// others a single watercolor scene.
    pub fn prompt(&self, plan: &ContentPlan, location: &str, emotion: &str) -> String {
        let vars = PromptVars::new()
            .insert("location", location)
            .insert("region", self.region.as_str())
            .insert("emotion", emotion);

        match plan.poster_style() {
            PosterStyle::PanelSequence => {
                render(PANEL_TEMPLATE, &vars.insert("storyline", plan.storyline.as_str()))
            }
            PosterStyle::SingleScene => {
                render(SCENE_TEMPLATE, &vars.insert("title", plan.title.as_str()))
            }
        }
    }

    /// Generate the poster. Exactly one provider call.
    pub async fn run(
        &self,
        ctx: &ExecCtx,
        plan: &ContentPlan,
        location: &str,
        emotion: &str,
    ) -> Result<GeneratedPoster> {
        let body = self.generate(ctx, plan, location, emotion);
        guarded(ctx, StageKind::Image, &self.model, body).await
    }

    async fn generate(
        &self,
        ctx: &ExecCtx,
        plan: &ContentPlan,
        location: &str,
        emotion: &str,
    ) -> Result<GeneratedPoster> {
        let request = GenerateRequest::new(
            self.model.as_str(),
            self.prompt(plan, location, emotion),
            Capability::Image,
        );
        let response = call_provider(ctx, StageKind::Image, &request).await?;

        let part = response
            .first_inline_image()
            .ok_or(PipelineError::NoImageProduced)?;
        Ok(GeneratedPoster::from_inline(
            part.mime_type.as_deref(),
            &part.data,
        ))
    }
}
