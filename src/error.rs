use crate::stages::StageKind;
use thiserror::Error;

/// Errors produced by the pipeline and its components.
///
/// Stage implementations produce the fine-grained variants; at the stage
/// boundary they are wrapped in [`PipelineError::StageFailed`], whose
/// `Display` is the coarse user-facing message. Use [`PipelineError::kind`]
/// to recover the underlying [`ErrorKind`] for logging.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The provider cannot be used at all (e.g. no credential configured).
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Low-level HTTP transport failure (connection refused, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-success status code.
    #[error("HTTP {status}: {body}")]
    HttpError {
        /// HTTP status code (e.g. 401, 429, 500).
        status: u16,
        /// Response body text.
        body: String,
    },

    /// The provider replied, but the reply could not be turned into the
    /// expected shape (no JSON object, bad JSON, missing field).
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// JSON parsing failed at the serde level.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The image call succeeded but carried no inline image payload.
    #[error("no image was produced")]
    NoImageProduced,

    /// A pipeline stage failed. Displays only the coarse stage message.
    #[error("{}", .stage.failure_message())]
    StageFailed {
        stage: StageKind,
        #[source]
        source: Box<PipelineError>,
    },

    /// Submission rejected before any stage ran.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration detected at build time.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(String),
}

/// Coarse error taxonomy shared by every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Credential missing, or the provider call failed outright.
    ProviderUnavailable,
    /// The provider replied but the reply was unusable.
    MalformedResponse,
    /// The image call returned no inline image data.
    NoImageProduced,
    /// The caller's input was rejected.
    InvalidInput,
    /// Anything else (configuration, glue code).
    Other,
}

impl PipelineError {
    /// Wrap a fine-grained error at a stage boundary.
    pub fn stage_failed(stage: StageKind, source: PipelineError) -> Self {
        PipelineError::StageFailed {
            stage,
            source: Box::new(source),
        }
    }

    /// Classify this error. `StageFailed` reports the kind of its source.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::ProviderUnavailable(_)
            | PipelineError::Request(_)
            | PipelineError::HttpError { .. } => ErrorKind::ProviderUnavailable,
            PipelineError::MalformedResponse(_) | PipelineError::Json(_) => {
                ErrorKind::MalformedResponse
            }
            PipelineError::NoImageProduced => ErrorKind::NoImageProduced,
            PipelineError::StageFailed { source, .. } => source.kind(),
            PipelineError::InvalidInput(_) => ErrorKind::InvalidInput,
            PipelineError::InvalidConfig(_) | PipelineError::Other(_) => ErrorKind::Other,
        }
    }

    /// The stage that failed, if this error crossed a stage boundary.
    pub fn stage(&self) -> Option<StageKind> {
        match self {
            PipelineError::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl From<crate::output_parser::ParseError> for PipelineError {
    fn from(err: crate::output_parser::ParseError) -> Self {
        PipelineError::MalformedResponse(err.to_string())
    }
}

impl From<anyhow::Error> for PipelineError {
    fn from(err: anyhow::Error) -> Self {
        PipelineError::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_errors_are_provider_unavailable() {
        let err = PipelineError::HttpError {
            status: 503,
            body: "overloaded".into(),
        };
        assert_eq!(err.kind(), ErrorKind::ProviderUnavailable);
        assert_eq!(
            PipelineError::ProviderUnavailable("no key".into()).kind(),
            ErrorKind::ProviderUnavailable
        );
    }

    #[test]
    fn test_json_error_is_malformed() {
        let err: PipelineError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_stage_failed_displays_coarse_message() {
        let err = PipelineError::stage_failed(
            StageKind::History,
            PipelineError::MalformedResponse("missing field `facts`".into()),
        );
        assert_eq!(err.to_string(), "failed to retrieve historical information");
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
        assert_eq!(err.stage(), Some(StageKind::History));
    }

    #[test]
    fn test_stage_failed_keeps_source() {
        use std::error::Error as _;

        let err = PipelineError::stage_failed(StageKind::Image, PipelineError::NoImageProduced);
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("no image was produced"));
        assert_eq!(err.to_string(), "failed to generate image");
    }
}
