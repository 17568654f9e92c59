use std::collections::HashMap;

/// Values substituted into `{key}` placeholders.
#[derive(Debug, Clone, Default)]
pub struct PromptVars {
    vars: HashMap<String, String>,
}

impl PromptVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

/// Build a prompt string with variable substitution.
///
/// Replaces `{key}` placeholders in the template with values from `vars`.
/// Use `{{` to insert a literal `{` and `}}` to insert a literal `}`, which
/// keeps JSON shapes in templates readable. Unknown placeholders are left
/// as written. Substituted values are inserted verbatim and never expanded.
///
/// # Example
///
/// ```
/// use soul_curator::prompt::{render, PromptVars};
///
/// let vars = PromptVars::new().insert("place", "영도대교");
/// let result = render("About {place}, answer as {{\"summary\": \"...\"}}", &vars);
/// assert_eq!(result, r#"About 영도대교, answer as {"summary": "..."}"#);
/// ```
pub fn render(template: &str, vars: &PromptVars) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(&['{', '}'][..]) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }

        let value = tail
            .strip_prefix('{')
            .and_then(|inner| inner.split_once('}'))
            .map(|(key, _)| key)
            .filter(|key| is_placeholder_key(key))
            .and_then(|key| vars.get(key).map(|value| (key.len(), value)));

        match value {
            Some((key_len, value)) => {
                out.push_str(value);
                rest = &tail[key_len + 2..];
            }
            None => {
                out.push_str(&tail[..1]);
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn is_placeholder_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Create a `- item` list, one item per line.
pub fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic() {
        let vars = PromptVars::new()
            .insert("location", "40계단")
            .insert("emotion", "그리움");
        let result = render("Place: {location}, feeling: {emotion}", &vars);
        assert_eq!(result, "Place: 40계단, feeling: 그리움");
    }

    #[test]
    fn test_render_plain_text_unchanged() {
        assert_eq!(render("no placeholders here", &PromptVars::new()), "no placeholders here");
    }

    #[test]
    fn test_render_unknown_placeholder_left_alone() {
        let result = render("Hello {who}", &PromptVars::new());
        assert_eq!(result, "Hello {who}");
    }

    #[test]
    fn test_render_escaped_json_shape() {
        let vars = PromptVars::new().insert("n", "3");
        let result = render("Return {{\"facts\": [...{n} items]}}", &vars);
        assert_eq!(result, r#"Return {"facts": [...3 items]}"#);
    }

    #[test]
    fn test_render_values_are_not_expanded() {
        let vars = PromptVars::new()
            .insert("summary", "a {title} b {{x}}")
            .insert("title", "T");
        let result = render("S: {summary} / {title}", &vars);
        assert_eq!(result, "S: a {title} b {{x}} / T");
    }

    #[test]
    fn test_render_stray_braces_survive() {
        let vars = PromptVars::new().insert("a", "1");
        assert_eq!(render("} { {a} {not a key}", &vars), "} { 1 {not a key}");
    }

    #[test]
    fn test_bullet_list() {
        let items = vec!["First".to_string(), "Second".to_string()];
        assert_eq!(bullet_list(&items), "- First\n- Second");
        assert_eq!(bullet_list(&[]), "");
    }
}
