//! # Soul Curator
//!
//! A three-stage curation pipeline on a generative provider: search-grounded
//! history of a place, an emotion-driven cultural content plan, and a poster
//! image. Each stage is one provider call; stages run strictly in order.
//!
//! ## Core Concepts
//!
//! - **[`CurationPipeline`]**: the controller. Owns a [`PipelineRun`] and
//!   moves it through [`PipelineState`].
//! - **[`ExecCtx`]**: shared execution context (HTTP client, API base URL,
//!   injected [`Backend`](backend::Backend), optional event handler).
//! - **[`stages`]**: [`HistoryStage`], [`PlanningStage`], [`ImageStage`].
//! - **[`output_parser`]**: recovers a JSON object from fenced or prose-wrapped
//!   model text.
//! - **[`CuratorConfig`]**: models, region, endpoint and credential, optionally
//!   from the environment.
//!
//! ## Quick Start
//!
//! ```no_run
//! use soul_curator::CuratorConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut pipeline = CuratorConfig::from_env()?.build_pipeline()?;
//!
//!     match pipeline.submit("40계단", "그리움", "에세이").await {
//!         Ok(run) => {
//!             if let Some((history, plan, poster)) = run.artifacts() {
//!                 println!("{}", history.summary);
//!                 println!("{}: {}", plan.title, plan.concept);
//!                 println!("{} bytes of data URI", poster.image_url.len());
//!             }
//!         }
//!         Err(e) => eprintln!("{}", e),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! A stage failure surfaces as [`PipelineError::StageFailed`], whose message
//! names only the failed stage. [`PipelineError::kind`] still tells a missing
//! credential or unreachable provider apart from an unusable reply.

pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod exec_ctx;
pub mod output_parser;
pub mod pipeline;
pub mod prompt;
pub mod report;
pub mod stages;
pub mod types;

pub use config::CuratorConfig;
pub use error::{ErrorKind, PipelineError, Result};
pub use events::{Event, EventHandler, FnEventHandler};
pub use exec_ctx::{ExecCtx, ExecCtxBuilder};
pub use pipeline::{CurationPipeline, CurationPipelineBuilder, PipelineRun, PipelineState};
pub use stages::{HistoryStage, ImageStage, PlanningStage, StageKind};
pub use types::{
    ContentFormat, ContentPlan, CurationInput, GeneratedPoster, HistoryResult, PosterStyle,
};
