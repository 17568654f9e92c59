//! Event system for pipeline lifecycle hooks.
//!
//! Provides an optional, non-intrusive way to observe a run. The pipeline
//! emits an event on every state transition and around every stage. Users
//! can implement [`EventHandler`] to drive progress indicators.

use crate::pipeline::PipelineState;
use crate::stages::StageKind;
use std::sync::Arc;

/// Events emitted during a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The pipeline moved from one state to another.
    StateChanged {
        from: PipelineState,
        to: PipelineState,
    },
    /// A stage is about to call the provider.
    StageStart {
        stage: StageKind,
        /// Model the stage will call.
        model: String,
    },
    /// A stage has finished.
    StageEnd {
        stage: StageKind,
        /// Whether the stage produced its result.
        ok: bool,
    },
}

/// Handler for pipeline lifecycle events.
///
/// This is entirely optional -- the pipeline works without an event handler.
///
/// # Example
///
/// ```
/// use soul_curator::events::{Event, EventHandler};
///
/// struct PrintHandler;
///
/// impl EventHandler for PrintHandler {
///     fn on_event(&self, event: Event) {
///         match event {
///             Event::StateChanged { to, .. } => println!("[state] {:?}", to),
///             Event::StageEnd { stage, ok } => println!("[end] {} ok={}", stage, ok),
///             _ => {}
///         }
///     }
/// }
/// ```
pub trait EventHandler: Send + Sync {
    /// Called when the pipeline emits an event.
    fn on_event(&self, event: Event);
}

/// Emit an event if a handler is present. No-op otherwise.
pub(crate) fn emit(handler: &Option<Arc<dyn EventHandler>>, event: Event) {
    if let Some(ref h) = handler {
        h.on_event(event);
    }
}

/// An [`EventHandler`] backed by a closure.
///
/// # Example
///
/// ```
/// use soul_curator::events::{Event, FnEventHandler};
/// use std::sync::Arc;
///
/// let handler = Arc::new(FnEventHandler(|event: Event| {
///     if let Event::StateChanged { to, .. } = event {
///         println!("now {:?}", to);
///     }
/// }));
/// ```
pub struct FnEventHandler<F: Fn(Event) + Send + Sync>(pub F);

impl<F: Fn(Event) + Send + Sync> EventHandler for FnEventHandler<F> {
    fn on_event(&self, event: Event) {
        (self.0)(event);
    }
}
