use once_cell::sync::Lazy;
use regex::Regex;

static THINK_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<think>[\s\S]*?</think>|<think\s*/>").unwrap());

static CODE_FENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?\s*([\s\S]*?)```").unwrap());

static OPEN_FENCE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"```(?:json)?\s*").unwrap());

/// Extracts the JSON payload from a raw LLM response, stripping reasoning
/// tags and Markdown code fences. An opening fence without a closing one
/// (truncated output) still yields everything after the opener.
pub fn extract_json_payload(response: &str) -> String {
    let cleaned = THINK_TAG_PATTERN.replace_all(response, "");
    let cleaned = cleaned.trim();

    if let Some(captures) = CODE_FENCE_PATTERN.captures(cleaned) {
        if let Some(inner) = captures.get(1) {
            return inner.as_str().trim().to_string();
        }
    }

    if let Some(opener) = OPEN_FENCE_PATTERN.find(cleaned) {
        return cleaned[opener.end()..].trim().to_string();
    }

    cleaned.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_json_passes_through() {
        let input = r#"{"title": "T"}"#;
        assert_eq!(extract_json_payload(input), input);
    }

    #[test]
    fn test_json_fence_stripped() {
        let input = "```json\n{\"title\": \"T\"}\n```";
        assert_eq!(extract_json_payload(input), "{\"title\": \"T\"}");
    }

    #[test]
    fn test_plain_fence_stripped() {
        let input = "```\n{\"title\": \"T\"}\n```";
        assert_eq!(extract_json_payload(input), "{\"title\": \"T\"}");
    }

    #[test]
    fn test_fence_with_surrounding_prose() {
        let input = "Here is your story:\n```json\n{\"title\": \"T\"}\n```\nEnjoy!";
        assert_eq!(extract_json_payload(input), "{\"title\": \"T\"}");
    }

    #[test]
    fn test_unterminated_fence_stripped() {
        let input = "```json\n{\"title\": \"T\"}";
        assert_eq!(extract_json_payload(input), "{\"title\": \"T\"}");
    }

    #[test]
    fn test_unterminated_fence_after_prose() {
        let input = "Here you go:\n```json\n{\"title\": \"T\"}";
        assert_eq!(extract_json_payload(input), "{\"title\": \"T\"}");
    }

    #[test]
    fn test_think_tags_removed() {
        let input = "<think>planning the plot</think>{\"title\": \"T\"}";
        assert_eq!(extract_json_payload(input), "{\"title\": \"T\"}");
    }
}
