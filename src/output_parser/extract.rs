//! Candidate location for JSON in model output.
//!
//! Both functions only slice the input; nothing here parses JSON.

const FENCE: &str = "```";
const JSON_LABEL: &str = "json";

/// Extract the interior of the first markdown fence labelled `json`.
///
/// The label match is ASCII case-insensitive and must be a whole word, so
/// `` ```jsonc `` is not treated as JSON. The interior runs up to the next
/// `` ``` `` and is trimmed. Unlabelled fences are ignored.
///
/// # Examples
///
/// ```
/// use soul_curator::output_parser::extract_json_fence;
///
/// let input = "Here:\n```json\n{\"a\": 1}\n```";
/// assert_eq!(extract_json_fence(input), Some("{\"a\": 1}"));
/// assert_eq!(extract_json_fence("```\n{}\n```"), None);
/// ```
pub fn extract_json_fence(text: &str) -> Option<&str> {
    let mut search_from = 0;
    while let Some(fence_start) = text[search_from..].find(FENCE) {
        let after_backticks = search_from + fence_start + FENCE.len();
        let rest = &text[after_backticks..];

        if has_json_label(rest) {
            let content_start = after_backticks + JSON_LABEL.len();
            let close = text[content_start..].find(FENCE)?;
            return Some(text[content_start..content_start + close].trim());
        }

        search_from = after_backticks;
    }
    None
}

fn has_json_label(rest: &str) -> bool {
    let Some(label) = rest.get(..JSON_LABEL.len()) else {
        return false;
    };
    if !label.eq_ignore_ascii_case(JSON_LABEL) {
        return false;
    }
    !rest[JSON_LABEL.len()..]
        .chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() || c == '_')
}

/// Return the span from the first `{` to the last `}`, inclusive.
///
/// No nesting analysis is done: everything between the outermost braces is
/// kept, which is what lets a single object survive surrounding prose.
///
/// # Examples
///
/// ```
/// use soul_curator::output_parser::outer_braces;
///
/// let input = r#"Result: {"a": {"b": 2}} -- hope this helps"#;
/// assert_eq!(outer_braces(input), Some(r#"{"a": {"b": 2}}"#));
/// assert_eq!(outer_braces("} backwards {"), None);
/// ```
pub fn outer_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── extract_json_fence ──

    #[test]
    fn fence_with_newline() {
        let input = "Sure!\n```json\n{\"summary\": \"s\"}\n```\nAnything else?";
        assert_eq!(extract_json_fence(input), Some("{\"summary\": \"s\"}"));
    }

    #[test]
    fn fence_on_one_line() {
        let input = "```json {\"a\": 1}```";
        assert_eq!(extract_json_fence(input), Some("{\"a\": 1}"));
    }

    #[test]
    fn fence_label_case_insensitive() {
        let input = "```JSON\n{\"a\": 1}\n```";
        assert_eq!(extract_json_fence(input), Some("{\"a\": 1}"));
    }

    #[test]
    fn fence_skips_other_languages() {
        let input = "```yaml\na: 1\n```\n```json\n{\"a\": 2}\n```";
        assert_eq!(extract_json_fence(input), Some("{\"a\": 2}"));
    }

    #[test]
    fn fence_rejects_longer_label() {
        let input = "```jsonc\n{\"a\": 1}\n```";
        assert_eq!(extract_json_fence(input), None);
    }

    #[test]
    fn fence_unclosed() {
        assert_eq!(extract_json_fence("```json\n{\"a\": 1}"), None);
    }

    #[test]
    fn fence_absent() {
        assert_eq!(extract_json_fence("no code blocks here"), None);
    }

    // ── outer_braces ──

    #[test]
    fn braces_in_prose() {
        let input = r#"The answer is {"a": 1} as requested."#;
        assert_eq!(outer_braces(input), Some(r#"{"a": 1}"#));
    }

    #[test]
    fn braces_take_first_open_and_last_close() {
        let input = r#"{"a": 1} and {"b": 2}"#;
        assert_eq!(outer_braces(input), Some(r#"{"a": 1} and {"b": 2}"#));
    }

    #[test]
    fn braces_missing() {
        assert_eq!(outer_braces("no braces here"), None);
        assert_eq!(outer_braces("only { open"), None);
        assert_eq!(outer_braces("only } close"), None);
    }

    #[test]
    fn braces_with_multibyte_text() {
        let input = "요약: {\"summary\": \"영도대교\"} 끝";
        assert_eq!(outer_braces(input), Some("{\"summary\": \"영도대교\"}"));
    }
}
