use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use synapse_models::InteractiveOption;

use crate::error::EngineError;

/// Body of a fenced block, with or without a `json` info string.
static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?[ \t]*\r?\n(.*?)```").expect("fenced block pattern is valid")
});

/// The first JSON object in LLM output, as its exact source text.
///
/// Fenced blocks are searched before the raw text, so prose ahead of a fence
/// is never mistaken for the payload.
pub fn extract_json(text: &str) -> Result<String, EngineError> {
    FENCED_BLOCK
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|body| body.as_str()))
        .chain(std::iter::once(text))
        .find_map(first_object)
        .ok_or_else(|| {
            EngineError::Parse(format!(
                "No valid JSON object found in response (length={})",
                text.len()
            ))
        })
}

/// Tries each `{` in turn and lets serde_json decide where the object ends.
fn first_object(text: &str) -> Option<String> {
    text.match_indices('{').find_map(|(start, _)| {
        let rest = &text[start..];
        let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<serde_json::Value>();
        match stream.next() {
            Some(Ok(value)) if value.is_object() => Some(rest[..stream.byte_offset()].to_string()),
            _ => None,
        }
    })
}

#[derive(Deserialize)]
struct OptionsEnvelope {
    options: Vec<InteractiveOption>,
}

/// Parse `{"options": [{label, action_tag, description}, ...]}` out of raw
/// LLM output. The list must hold two or three entries.
pub fn parse_options(raw: &str) -> Result<Vec<InteractiveOption>, EngineError> {
    let json_str = extract_json(raw)?;
    let envelope: OptionsEnvelope = serde_json::from_str(&json_str)
        .map_err(|e| EngineError::Parse(format!("Failed to parse options: {e}\nJSON: {json_str}")))?;

    let count = envelope.options.len();
    if !(2..=3).contains(&count) {
        return Err(EngineError::Parse(format!(
            "Expected 2-3 options, got {count}"
        )));
    }
    Ok(envelope.options)
}

/// Trim `text` and cut it to at most `max_words` words, marking the cut with `...`.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    let trimmed = text.trim();
    let words: Vec<&str> = trimmed.split_whitespace().collect();
    if words.len() <= max_words {
        return trimmed.to_string();
    }
    format!("{}...", words[..max_words].join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_clean_json() {
        let input = r#"{"options": []}"#;
        assert_eq!(extract_json(input).unwrap(), input);
    }

    #[test]
    fn extract_from_markdown() {
        let input = "Here you go:\n```json\n{\"options\": []}\n```\nDone.";
        assert_eq!(extract_json(input).unwrap(), r#"{"options": []}"#);
    }

    #[test]
    fn extract_with_prefix_text_and_braces_in_strings() {
        let input = r#"Sure! {"note": "use {curly} braces", "n": 1} trailing"#;
        assert_eq!(
            extract_json(input).unwrap(),
            r#"{"note": "use {curly} braces", "n": 1}"#
        );
    }

    #[test]
    fn extract_skips_unbalanced_prefix() {
        let input = r#"Options { draft: {"options": ["a", "b"]}"#;
        assert_eq!(extract_json(input).unwrap(), r#"{"options": ["a", "b"]}"#);
    }

    #[test]
    fn extract_prefers_fenced_block() {
        let input = "Ignore {\"stale\": true}\n```\n{\"options\": []}\n```";
        assert_eq!(extract_json(input).unwrap(), r#"{"options": []}"#);
    }

    #[test]
    fn extract_fails_without_object() {
        assert!(matches!(
            extract_json("no json here"),
            Err(EngineError::Parse(_))
        ));
    }

    #[test]
    fn parse_two_options() {
        let raw = r#"```json
{"options": [
  {"label": "Reroute via Alternative Path", "action_tag": "reroute_alternative", "description": "Use backup route"},
  {"label": "Notify Customers of Delay", "action_tag": "notify_customers", "description": "Send delay notifications"}
]}
```"#;
        let options = parse_options(raw).unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].action_tag, "reroute_alternative");
    }

    #[test]
    fn parse_rejects_wrong_option_count() {
        let one = r#"{"options": [{"label": "a", "action_tag": "a", "description": "a"}]}"#;
        assert!(parse_options(one).is_err());

        let four = r#"{"options": [
            {"label": "a", "action_tag": "a", "description": "a"},
            {"label": "b", "action_tag": "b", "description": "b"},
            {"label": "c", "action_tag": "c", "description": "c"},
            {"label": "d", "action_tag": "d", "description": "d"}
        ]}"#;
        assert!(parse_options(four).is_err());
    }

    #[test]
    fn truncate_long_text() {
        let text = (0..120).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let truncated = truncate_words(&text, 100);
        assert!(truncated.ends_with("w99..."));
        assert_eq!(truncated.split_whitespace().count(), 100);
    }

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate_words("  Reroute now.  ", 100), "Reroute now.");
    }
}
