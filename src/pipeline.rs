//! The curation controller: history, then plan, then poster.
//!
//! [`CurationPipeline`] owns one [`PipelineRun`] and drives it through
//! [`PipelineState`]. Stages run strictly in order and a failure stops the
//! run in [`PipelineState::Error`], leaving whatever earlier stages produced
//! visible until the next submission.

use crate::{
    error::Result,
    events::Event,
    exec_ctx::ExecCtx,
    stages::{HistoryStage, ImageStage, PlanningStage, StageKind},
    types::{ContentPlan, CurationInput, GeneratedPoster, HistoryResult},
    PipelineError,
};
use std::fmt;

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    FetchingHistory,
    PlanningContent,
    GeneratingImage,
    Completed,
    Error,
}

impl PipelineState {
    pub fn name(self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::FetchingHistory => "fetching_history",
            PipelineState::PlanningContent => "planning_content",
            PipelineState::GeneratingImage => "generating_image",
            PipelineState::Completed => "completed",
            PipelineState::Error => "error",
        }
    }

    /// True while a stage is outstanding.
    pub fn is_working(self) -> bool {
        matches!(
            self,
            PipelineState::FetchingHistory
                | PipelineState::PlanningContent
                | PipelineState::GeneratingImage
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything a single submission produced so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineRun {
    /// The validated input of the latest submission.
    pub input: Option<CurationInput>,
    pub state: PipelineState,
    pub history: Option<HistoryResult>,
    pub plan: Option<ContentPlan>,
    pub poster: Option<GeneratedPoster>,
    /// Coarse, user-facing message of the stage that failed.
    pub error: Option<String>,
    pub failed_stage: Option<StageKind>,
}

impl PipelineRun {
    /// The three artifacts, once the run has completed.
    pub fn artifacts(&self) -> Option<(&HistoryResult, &ContentPlan, &GeneratedPoster)> {
        if self.state != PipelineState::Completed {
            return None;
        }
        Some((
            self.history.as_ref()?,
            self.plan.as_ref()?,
            self.poster.as_ref()?,
        ))
    }
}

/// Drives one curation at a time.
///
/// `submit` takes `&mut self`, so a second submission cannot start while a
/// run is in flight on the same controller.
///
/// # Example
///
/// ```
/// use soul_curator::backend::{MockBackend, MockReply};
/// use soul_curator::{CurationPipeline, ExecCtx, PipelineState};
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let mock = Arc::new(MockBackend::new(vec![
///     MockReply::text(r#"{"summary": "s", "facts": ["f"]}"#),
///     MockReply::text(r#"{"contentType": "시(Poem)", "title": "t", "concept": "c",
///         "storyline": "s", "empathyPoint": "e", "socialPostText": "p", "hashtags": ["h"]}"#),
///     MockReply::image("image/png", "iVBORw0KGgo="),
/// ]));
/// let ctx = ExecCtx::builder("http://unused").backend(mock).build()?;
/// let mut pipeline = CurationPipeline::builder(ctx).build();
///
/// let run = pipeline.submit("해운대", "설렘", "시(Poem)").await?;
/// assert_eq!(run.state, PipelineState::Completed);
/// # Ok::<(), soul_curator::PipelineError>(())
/// # }).unwrap();
/// ```
pub struct CurationPipeline {
    ctx: ExecCtx,
    history_stage: HistoryStage,
    planning_stage: PlanningStage,
    image_stage: ImageStage,
    run: PipelineRun,
}

impl fmt::Debug for CurationPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurationPipeline")
            .field("ctx", &self.ctx)
            .field("history_model", &self.history_stage.model())
            .field("planning_model", &self.planning_stage.model())
            .field("image_model", &self.image_stage.model())
            .field("state", &self.run.state)
            .finish()
    }
}

impl CurationPipeline {
    /// Create a new pipeline builder around an execution context.
    pub fn builder(ctx: ExecCtx) -> CurationPipelineBuilder {
        CurationPipelineBuilder {
            ctx,
            history_stage: HistoryStage::default(),
            planning_stage: PlanningStage::default(),
            image_stage: ImageStage::default(),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.run.state
    }

    /// The latest run, including partial results after a failure.
    pub fn run(&self) -> &PipelineRun {
        &self.run
    }

    pub fn ctx(&self) -> &ExecCtx {
        &self.ctx
    }

    /// Run all three stages for one request.
    ///
    /// Input is validated first; an invalid request returns
    /// [`PipelineError::InvalidInput`] and leaves the previous run untouched.
    /// A stage failure returns [`PipelineError::StageFailed`] with the run
    /// left in [`PipelineState::Error`].
    pub async fn submit(
        &mut self,
        location: &str,
        emotion: &str,
        content_type: &str,
    ) -> Result<&PipelineRun> {
        self.submit_with_progress(location, emotion, content_type, |_| {})
            .await
    }

    /// Like [`submit`](Self::submit), calling `on_state` after every state
    /// change.
    pub async fn submit_with_progress<F>(
        &mut self,
        location: &str,
        emotion: &str,
        content_type: &str,
        mut on_state: F,
    ) -> Result<&PipelineRun>
    where
        F: FnMut(PipelineState),
    {
        let input = CurationInput::new(location, emotion, content_type)?;

        // A fresh run; only the state carries over so the transition is reported.
        self.run = PipelineRun {
            input: Some(input.clone()),
            state: self.run.state,
            ..PipelineRun::default()
        };
        self.transition(PipelineState::FetchingHistory, &mut on_state);

        let fetched = self.history_stage.run(&self.ctx, &input.location).await;
        let history = match fetched {
            Ok(history) => history,
            Err(e) => return Err(self.fail(e, &mut on_state)),
        };
        self.run.history = Some(history.clone());
        self.transition(PipelineState::PlanningContent, &mut on_state);

        let planned = self
            .planning_stage
            .run(
                &self.ctx,
                &input.location,
                &history,
                &input.emotion,
                input.content_type,
            )
            .await;
        let plan = match planned {
            Ok(plan) => plan,
            Err(e) => return Err(self.fail(e, &mut on_state)),
        };
        self.run.plan = Some(plan.clone());
        self.transition(PipelineState::GeneratingImage, &mut on_state);

        let drawn = self
            .image_stage
            .run(&self.ctx, &plan, &input.location, &input.emotion)
            .await;
        let poster = match drawn {
            Ok(poster) => poster,
            Err(e) => return Err(self.fail(e, &mut on_state)),
        };
        self.run.poster = Some(poster);
        self.transition(PipelineState::Completed, &mut on_state);

        Ok(&self.run)
    }

    /// Return to [`PipelineState::Idle`].
    ///
    /// Results of the previous run stay readable until the next submission.
    pub fn reset(&mut self) {
        self.transition(PipelineState::Idle, &mut |_| {});
    }

    fn transition<F>(&mut self, to: PipelineState, on_state: &mut F)
    where
        F: FnMut(PipelineState),
    {
        let from = self.run.state;
        if from == to {
            return;
        }
        self.run.state = to;
        tracing::info!(from = from.name(), to = to.name(), "pipeline state changed");
        self.ctx.emit(Event::StateChanged { from, to });
        on_state(to);
    }

    fn fail<F>(&mut self, err: PipelineError, on_state: &mut F) -> PipelineError
    where
        F: FnMut(PipelineState),
    {
        self.run.error = Some(err.to_string());
        self.run.failed_stage = err.stage();
        self.transition(PipelineState::Error, on_state);
        err
    }
}

/// Builder for [`CurationPipeline`].
pub struct CurationPipelineBuilder {
    ctx: ExecCtx,
    history_stage: HistoryStage,
    planning_stage: PlanningStage,
    image_stage: ImageStage,
}

impl CurationPipelineBuilder {
    pub fn history_stage(mut self, stage: HistoryStage) -> Self {
        self.history_stage = stage;
        self
    }

    pub fn planning_stage(mut self, stage: PlanningStage) -> Self {
        self.planning_stage = stage;
        self
    }

    pub fn image_stage(mut self, stage: ImageStage) -> Self {
        self.image_stage = stage;
        self
    }

    /// Set the region interpolated into every stage's prompt.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        let region = region.into();
        self.history_stage = self.history_stage.with_region(region.as_str());
        self.planning_stage = self.planning_stage.with_region(region.as_str());
        self.image_stage = self.image_stage.with_region(region);
        self
    }

    pub fn build(self) -> CurationPipeline {
        CurationPipeline {
            ctx: self.ctx,
            history_stage: self.history_stage,
            planning_stage: self.planning_stage,
            image_stage: self.image_stage,
            run: PipelineRun::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockBackend, MockReply};
    use crate::error::ErrorKind;
    use std::sync::Arc;

    const HISTORY: &str = r#"{"summary": "영도다리 아래 점바치 골목", "facts": ["1934년 개통"]}"#;
    const PLAN: &str = r#"{"contentType": "웹툰", "title": "다시 만나는 다리", "concept": "c",
        "storyline": "s", "empathyPoint": "e", "socialPostText": "p", "hashtags": ["영도"]}"#;

    fn pipeline(replies: Vec<MockReply>) -> (CurationPipeline, Arc<MockBackend>) {
        let mock = Arc::new(MockBackend::new(replies));
        let ctx = ExecCtx::builder("http://unused")
            .backend(mock.clone())
            .build()
            .unwrap();
        (CurationPipeline::builder(ctx).build(), mock)
    }

    #[test]
    fn test_state_names_and_working_flag() {
        assert_eq!(PipelineState::default(), PipelineState::Idle);
        assert_eq!(PipelineState::PlanningContent.to_string(), "planning_content");
        assert!(PipelineState::GeneratingImage.is_working());
        assert!(!PipelineState::Error.is_working());
        assert!(!PipelineState::Completed.is_working());
    }

    #[tokio::test]
    async fn test_invalid_input_leaves_state_untouched() {
        let (mut pipeline, mock) = pipeline(vec![MockReply::text(HISTORY)]);
        let err = pipeline.submit("영도대교", "  ", "웹툰").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert!(pipeline.run().input.is_none());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_image_failure_keeps_history_and_plan() {
        let (mut pipeline, _mock) = pipeline(vec![
            MockReply::text(HISTORY),
            MockReply::text(PLAN),
            MockReply::text("no picture today"),
        ]);
        let err = pipeline.submit("영도대교", "그리움", "웹툰").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoImageProduced);

        let run = pipeline.run();
        assert_eq!(run.state, PipelineState::Error);
        assert_eq!(run.failed_stage, Some(StageKind::Image));
        assert_eq!(run.error.as_deref(), Some("failed to generate image"));
        assert!(run.history.is_some());
        assert!(run.plan.is_some());
        assert!(run.poster.is_none());
        assert!(run.artifacts().is_none());
    }

    #[tokio::test]
    async fn test_reset_keeps_results_until_next_submit() {
        let (mut pipeline, _mock) = pipeline(vec![MockReply::fail("offline")]);
        pipeline.submit("영도대교", "그리움", "웹툰").await.unwrap_err();
        assert_eq!(pipeline.state(), PipelineState::Error);

        pipeline.reset();
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert_eq!(pipeline.run().failed_stage, Some(StageKind::History));

        pipeline.reset();
        assert_eq!(pipeline.state(), PipelineState::Idle);
    }

    #[tokio::test]
    async fn test_region_reaches_every_prompt() {
        let mock = Arc::new(MockBackend::new(vec![
            MockReply::text(HISTORY),
            MockReply::text(PLAN),
            MockReply::image("image/png", "AAAA"),
        ]));
        let ctx = ExecCtx::builder("http://unused")
            .backend(mock.clone())
            .build()
            .unwrap();
        let mut pipeline = CurationPipeline::builder(ctx)
            .region("Tongyeong, South Korea")
            .build();
        pipeline.submit("동피랑", "설렘", "웹툰").await.unwrap();

        for call in mock.calls() {
            assert!(call.prompt.contains("Tongyeong, South Korea"), "{}", call.prompt);
        }
    }
}
