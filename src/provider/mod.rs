use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::cli::ProviderKind;
use crate::config::Config;
use crate::errors::PlannerError;
use crate::wire::PlannerRequest;

pub mod anthropic;
pub mod ollama;
pub mod openai;

/// Sends a planner request to a model and returns the JSON object it produced.
/// Schema validation is left to the caller.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn send(&self, req: &PlannerRequest, debug: bool) -> Result<Value>;
}

pub type DynProvider = Box<dyn Provider + Send + Sync>;

pub fn make_provider(cfg: &Config) -> Result<DynProvider> {
    let timeout = Duration::from_secs(cfg.timeout_secs);
    match cfg.provider {
        ProviderKind::OpenAI => {
            let api_key = std::env::var("OPENAI_API_KEY")
                .map_err(|_| PlannerError::Provider("OPENAI_API_KEY env var is not set".into()))?;
            Ok(Box::new(openai::OpenAIProvider::new(
                cfg.model.clone(),
                api_key,
                cfg.openai_url.clone(),
                timeout,
            )?))
        }
        ProviderKind::Anthropic => {
            let api_key = std::env::var("ANTHROPIC_API_KEY")
                .map_err(|_| PlannerError::Provider("ANTHROPIC_API_KEY env var is not set".into()))?;
            Ok(Box::new(anthropic::Anthropic::new(
                cfg.model.clone(),
                api_key,
                cfg.anthropic_url.clone(),
                cfg.anthropic_version.clone(),
                cfg.max_tokens,
                timeout,
            )?))
        }
        ProviderKind::Ollama => Ok(Box::new(ollama::Ollama::new(
            cfg.model.clone(),
            cfg.ollama_url.clone(),
            timeout,
        )?)),
    }
}

/// Parse model output as a JSON object, falling back to the first balanced
/// `{...}` in the text that parses, for models that wrap it in prose or
/// code fences.
pub fn parse_content(content: &str) -> Result<Value, PlannerError> {
    if let Ok(v @ Value::Object(_)) = serde_json::from_str::<Value>(content.trim()) {
        return Ok(v);
    }
    for (start, _) in content.match_indices('{') {
        let Some(fragment) = balanced_object_at(content, start) else { continue };
        if let Ok(v @ Value::Object(_)) = serde_json::from_str::<Value>(fragment) {
            return Ok(v);
        }
    }
    Err(PlannerError::Schema(format!(
        "model did not return a JSON object.\n--- content start ---\n{}\n--- content end ---",
        content
    )))
}

/// The `{...}` that opens at byte `start`. Braces inside JSON strings are ignored.
fn balanced_object_at(s: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in s.bytes().enumerate().skip(start) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&s[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_json_object() {
        let v = parse_content(r#" {"summary":"ok"} "#).unwrap();
        assert_eq!(v["summary"], "ok");
    }

    #[test]
    fn object_wrapped_in_prose_and_fences() {
        let content = "Here is the plan:\n```json\n{\"summary\":\"use {braces} freely\",\"n\":{\"a\":1}}\n```\nThanks!";
        let v = parse_content(content).unwrap();
        assert_eq!(v["summary"], "use {braces} freely");
        assert_eq!(v["n"]["a"], 1);
    }

    #[test]
    fn escaped_quotes_inside_strings() {
        let content = r#"x {"summary":"say \"}\" loudly"} y"#;
        let start = content.find('{').unwrap();
        assert_eq!(balanced_object_at(content, start), Some(r#"{"summary":"say \"}\" loudly"}"#));
    }

    #[test]
    fn braces_in_leading_prose_are_skipped() {
        let v = parse_content(r#"Plan below {see notes}: {"summary":"ok"}"#).unwrap();
        assert_eq!(v["summary"], "ok");

        let v = parse_content("Budget {approx} {\"summary\":\"nested\",\"a\":{\"b\":2}} trailing {x}").unwrap();
        assert_eq!(v["summary"], "nested");
        assert_eq!(v["a"]["b"], 2);
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(matches!(parse_content("[1,2,3]"), Err(PlannerError::Schema(_))));
        assert!(matches!(parse_content("no json here"), Err(PlannerError::Schema(_))));
    }
}
