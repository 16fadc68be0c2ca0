use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::errors::PlannerError;
use crate::wire::PlannerRequest;

/// Chat-completions provider. The schema travels as a `json_schema`
/// response format so the model is constrained server-side as well.
pub struct OpenAIProvider {
    model: String,
    api_key: String,
    api_base: String,
    client: Client,
}

impl OpenAIProvider {
    pub fn new(model: String, api_key: String, api_base: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { model, api_key, api_base, client })
    }

    fn body(&self, req: &PlannerRequest) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": req.instruction.system },
                { "role": "user", "content": req.instruction.user }
            ],
            "temperature": 0.2,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "mvp_plan",
                    // Non-strict: strict mode rejects `pattern` and optional properties.
                    "strict": false,
                    "schema": req.schema
                }
            }
        })
    }
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[async_trait]
impl super::Provider for OpenAIProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn send(&self, req: &PlannerRequest, debug: bool) -> Result<Value> {
        let url = format!("{}/v1/chat/completions", self.api_base.trim_end_matches('/'));
        let body = self.body(req);

        if debug {
            tracing::debug!(%url, body = %serde_json::to_string_pretty(&body)?, "openai request");
        }

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("openai request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("openai read body failed")?;

        if debug {
            tracing::debug!(%status, raw = %text, "openai response");
        }

        if !status.is_success() {
            return Err(PlannerError::Provider(format!("OpenAI API error ({}): {}", status, text)).into());
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| PlannerError::Provider(format!("failed to parse OpenAI response: {e}\nRaw: {text}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| PlannerError::Provider("openai: empty content".into()))?;

        Ok(super::parse_content(&content)?)
    }
}
