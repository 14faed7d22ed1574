use crate::error::{LlmError, Result};
use serde::de::DeserializeOwned;

/// Extract the YAML payload from a model response.
///
/// Strategies, in order: a ```yaml fenced block, the first plain fenced
/// block (with an optional language specifier stripped), then the whole
/// response.
#[must_use]
pub fn extract_yaml_block(response: &str) -> &str {
    if let Some(block) = fenced_block(response, "```yaml") {
        return block;
    }
    if let Some(block) = fenced_block(response, "```yml") {
        return block;
    }
    if let Some(block) = fenced_block(response, "```") {
        // A bare fence may still carry a language specifier on its first line.
        let block = block
            .strip_prefix("yaml\n")
            .or_else(|| block.strip_prefix("yml\n"))
            .unwrap_or(block);
        return block.trim();
    }
    response.trim()
}

fn fenced_block<'a>(response: &'a str, opener: &str) -> Option<&'a str> {
    let start = response.find(opener)? + opener.len();
    let rest = &response[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

/// Parse a typed value out of a model response that is expected to carry
/// YAML. Parse failures are retryable [`LlmError::InvalidResponse`]s.
pub fn parse_yaml_response<T: DeserializeOwned>(response: &str) -> Result<T> {
    let block = extract_yaml_block(response);
    serde_yaml::from_str(block).map_err(|err| {
        let preview: String = response.chars().take(200).collect();
        LlmError::InvalidResponse(format!("YAML parse failed: {err}; response starts: {preview}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_yaml_fence() {
        let response = "Here you go:\n```yaml\n- a\n- b\n```\nDone.";
        assert_eq!(extract_yaml_block(response), "- a\n- b");
    }

    #[test]
    fn extracts_plain_fence_with_specifier() {
        let response = "```\nyaml\n- a\n```";
        assert_eq!(extract_yaml_block(response), "- a");
    }

    #[test]
    fn falls_back_to_whole_response() {
        assert_eq!(extract_yaml_block("  - a\n  - b  "), "- a\n  - b");
    }

    #[test]
    fn parses_typed_list() {
        let items: Vec<String> = parse_yaml_response("```yaml\n- x\n- y\n```").unwrap();
        assert_eq!(items, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn parse_failure_is_invalid_response() {
        let err = parse_yaml_response::<Vec<u32>>("```yaml\n{ not: [valid\n```").unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }
}
