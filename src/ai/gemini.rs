//! Typed HTTP client for the Gemini `generateContent` API.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{build_prompt, AiError};
use crate::config::AiConfig;
use crate::ledger::UsageLedger;

pub struct GeminiClient {
    http: reqwest::Client,
    api_base: String,
    model: String,
    api_key_env: String,
    api_key: Option<String>,
    request_delay: Duration,
    usage: UsageLedger,
}

// ── Gemini API types ──────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

// ── Client impl ─────────────────────────────────────

impl GeminiClient {
    /// Build a client from config, reading the API key from the configured env var.
    pub fn from_config(config: &AiConfig, usage: UsageLedger) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            tracing::debug!(var = %config.api_key_env, "no AI API key configured");
        }

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key_env: config.api_key_env.clone(),
            api_key,
            request_delay: Duration::from_millis(config.request_delay_ms),
            usage,
        })
    }

    /// Replace the API key picked up from the environment.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn usage(&self) -> &UsageLedger {
        &self.usage
    }

    /// Send `prompt` and return the model's text. Waits the configured delay first.
    pub async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AiError::MissingApiKey(self.api_key_env.clone()))?;

        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        tracing::info!(model = %self.model, prompt_chars = prompt.len(), "calling generative model");
        let resp = self
            .http
            .post(format!(
                "{}/models/{}:generateContent",
                self.api_base, self.model
            ))
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status, "generative model returned an error");
            return Err(AiError::Provider { status, body });
        }

        let parsed: GenerateResponse = resp.json().await?;
        let text = parsed.text().ok_or(AiError::EmptyResponse)?;

        self.usage.track_quietly(prompt);
        self.usage.track_quietly(&text);
        Ok(text)
    }

    /// Answer `question` from `context` using the vault prompt.
    pub async fn ask(&self, question: &str, context: &str) -> Result<String, AiError> {
        self.generate(&build_prompt(question, context)).await
    }

    /// Like [`ask`](Self::ask), but failures come back as displayable text.
    pub async fn answer(&self, question: &str, context: &str) -> String {
        match self.ask(question, context).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "AI answer failed");
                e.user_message()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let resp: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [
                {"content": {"parts": [{"text": "Learn "}, {"text": "Rust."}], "role": "model"}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(resp.text().as_deref(), Some("Learn Rust."));
    }

    #[test]
    fn blocked_response_has_no_text() {
        let resp: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert!(resp.text().is_none());

        let resp: GenerateResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        assert!(resp.text().is_none());
    }

    #[test]
    fn request_body_shape() {
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: "hi" }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"contents": [{"parts": [{"text": "hi"}]}]})
        );
    }
}
