//! # Response Parser
//!
//! Pulls a single JSON object out of free-form model output. Models wrap
//! their answers in prose or markdown fences even when told not to, so the
//! parser locates the object before handing it to `serde_json`.
//!
//! | Function | Use Case |
//! |----------|---------|
//! | [`parse_json_object`] | Locate and parse the JSON object in a response |
//! | [`extract_json_fence`] | Interior of the first `` ```json `` block |
//! | [`outer_braces`] | Span from the first `{` to the last `}` |
//!
//! Schema checks (required fields, types) are left to the caller.

pub mod error;
pub mod extract;
pub mod json;

pub use error::ParseError;
pub use extract::{extract_json_fence, outer_braces};
pub use json::{locate_json_object, parse_json_object};
