//! Error types for the response parser.

/// Errors returned by the response parser.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The model response was empty or whitespace-only.
    #[error("empty model response")]
    EmptyResponse,

    /// Neither a JSON fence nor a `{ ... }` span was found.
    #[error("no JSON object found in model response: {text}")]
    NoJsonObject {
        /// A truncated copy of the response (max 200 chars).
        text: String,
    },

    /// A candidate was located but is not valid JSON.
    #[error("invalid JSON in model response: {reason}")]
    InvalidJson {
        /// The serde error message.
        reason: String,
        /// The candidate that failed to parse (truncated).
        raw_json: String,
    },

    /// The candidate parsed, but to something other than an object.
    #[error("expected a JSON object, found {found}")]
    NotAnObject {
        /// JSON type name of what was found.
        found: &'static str,
    },
}

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &s[..cut]),
        None => s.to_string(),
    }
}
