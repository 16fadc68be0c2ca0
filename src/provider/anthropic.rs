use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::Provider;
use crate::errors::PlannerError;
use crate::wire::PlannerRequest;

pub struct Anthropic {
    pub model: String,
    pub api_key: String,
    pub api_base: String,
    pub api_version: String,
    pub max_tokens: u32,
    client: Client,
}

impl Anthropic {
    pub fn new(
        model: String,
        api_key: String,
        api_base: String,
        api_version: String,
        max_tokens: u32,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { model, api_key, api_base, api_version, max_tokens, client })
    }
}

#[derive(Serialize)]
struct MsgRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Msg<'a>>,
    system: String,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MsgResponse {
    content: Vec<Block>,
}

#[derive(Deserialize)]
struct Block {
    #[serde(default)]
    text: String,
    #[serde(default)]
    r#type: String,
}

/// The messages API has no schema parameter, so the schema rides along in
/// the system prompt.
fn system_with_schema(req: &PlannerRequest) -> Result<String> {
    let mut system = req.instruction.system.clone();
    system.push_str("\n\nThe response MUST validate against this JSON Schema:\n");
    system.push_str(&serde_json::to_string(&req.schema)?);
    Ok(system)
}

#[async_trait]
impl Provider for Anthropic {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn send(&self, req: &PlannerRequest, debug: bool) -> Result<Value> {
        let url = format!("{}/v1/messages", self.api_base.trim_end_matches('/'));
        let body = MsgRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Msg { role: "user", content: &req.instruction.user }],
            system: system_with_schema(req)?,
        };

        if debug {
            tracing::debug!(%url, "anthropic request");
        }

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&body)
            .send()
            .await
            .context("anthropic request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("anthropic read body failed")?;
        if debug {
            tracing::debug!(%status, raw = %text, "anthropic response");
        }
        if !status.is_success() {
            return Err(PlannerError::Provider(format!("Anthropic API error ({}): {}", status, text)).into());
        }

        let parsed: MsgResponse = serde_json::from_str(&text)
            .map_err(|e| PlannerError::Provider(format!("anthropic response parse error: {}", e)))?;

        let content = parsed
            .content
            .into_iter()
            .find(|b| b.r#type == "text" && !b.text.is_empty())
            .map(|b| b.text)
            .ok_or_else(|| PlannerError::Provider("anthropic: empty content".into()))?;

        Ok(super::parse_content(&content)?)
    }
}
