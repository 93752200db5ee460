//! OpenAI adapter for the moderation gate.
//!
//! One chat-completions request per submission; the gate in `adboard-core`
//! owns the timeout and the fail-closed decision rule, so this client only
//! returns the raw response text or an error.

use async_trait::async_trait;

use adboard_core::{errors::Error, moderation::ModerationClient, Result};

#[derive(Clone, Debug)]
pub struct OpenAiModerationClient {
    api_key: String,
    model: String,
    http: reqwest::Client,
}

impl OpenAiModerationClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::External(format!("http client build: {e}")))?;
        Ok(Self {
            api_key: api_key.into(),
            model: model.into(),
            http,
        })
    }
}

#[async_trait]
impl ModerationClient for OpenAiModerationClient {
    async fn classify(&self, instruction: &str, submission: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": instruction },
                { "role": "user", "content": submission },
            ],
            "max_tokens": 8,
            "temperature": 0,
        });

        let resp = self
            .http
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::External(format!("moderation request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::External(format!(
                "moderation call failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let v: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| Error::External(format!("moderation json error: {e}")))?;

        let text = v
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|t| t.as_str())
            .unwrap_or("")
            .to_string();

        if text.trim().is_empty() {
            return Err(Error::External(
                "moderation returned empty response".to_string(),
            ));
        }

        Ok(text)
    }
}
