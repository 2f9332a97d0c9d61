#[cfg(any(test, feature = "test-util"))]
pub mod scripted;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde_json::{json, Value};

use crate::chat::{GenerationConfig, HistoryTurn};
use crate::config::AppConfig;

#[cfg(any(test, feature = "test-util"))]
pub use scripted::ScriptedModel;

/// Handle to a generative model. Built once at startup and shared
/// read-only between requests.
pub trait ChatProvider: Send + Sync {
    fn start_session(
        &self,
        history: Vec<HistoryTurn>,
        config: GenerationConfig,
    ) -> Box<dyn ChatSession>;
}

/// A conversation seeded with prior turns.
#[async_trait]
pub trait ChatSession: Send {
    async fn send_message(&mut self, text: &str) -> Result<ProviderReply>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderReply {
    text: Option<String>,
}

impl ProviderReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    pub fn empty() -> Self {
        Self { text: None }
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

// A wrapper for the Gemini generateContent REST API
pub struct GeminiModel {
    endpoint: String,
    api_key: String,
    client: Client,
}

impl GeminiModel {
    pub fn new(config: &AppConfig) -> Result<Self> {
        info!("Initializing Gemini client for model {}", config.model);

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            info!("Provider request timeout: {:?}", timeout);
            builder = builder.timeout(timeout);
        }

        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            config.api_base.trim_end_matches('/'),
            config.model
        );
        debug!("Gemini endpoint: {}", endpoint);

        Ok(Self {
            endpoint,
            api_key: config.api_key.clone(),
            client: builder.build()?,
        })
    }
}

impl ChatProvider for GeminiModel {
    fn start_session(
        &self,
        history: Vec<HistoryTurn>,
        config: GenerationConfig,
    ) -> Box<dyn ChatSession> {
        Box::new(GeminiSession {
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone(),
            client: self.client.clone(),
            history,
            config,
        })
    }
}

pub struct GeminiSession {
    endpoint: String,
    api_key: String,
    client: Client,
    history: Vec<HistoryTurn>,
    config: GenerationConfig,
}

#[async_trait]
impl ChatSession for GeminiSession {
    async fn send_message(&mut self, text: &str) -> Result<ProviderReply> {
        let payload = build_request_body(&self.history, text, &self.config);

        debug!(
            "Sending request to Gemini with {} history turns, max_output_tokens: {}",
            self.history.len(),
            self.config.max_output_tokens
        );
        debug!("Payload: {}", payload);

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(anyhow!(
                "Gemini API request failed ({}): {}",
                status,
                error_text
            ));
        }

        let response_json: Value = response.json().await?;
        debug!("Response JSON: {}", response_json);

        let reply = extract_reply(&response_json)?;
        debug!("Gemini response length: {} characters", reply.text().len());

        self.history.push(HistoryTurn::user(text));
        self.history.push(HistoryTurn::model(reply.text()));
        Ok(reply)
    }
}

fn build_request_body(history: &[HistoryTurn], text: &str, config: &GenerationConfig) -> Value {
    let mut contents: Vec<Value> = history
        .iter()
        .map(|turn| {
            json!({
                "role": turn.role,
                "parts": [{ "text": turn.content }],
            })
        })
        .collect();
    contents.push(json!({
        "role": "user",
        "parts": [{ "text": text }],
    }));

    json!({
        "contents": contents,
        "generationConfig": {
            "maxOutputTokens": config.max_output_tokens,
            "temperature": config.temperature,
        }
    })
}

/// Finish reasons that withhold the candidate's text, even when some was
/// produced before the stop.
const BLOCKING_FINISH_REASONS: [&str; 3] = ["SAFETY", "RECITATION", "LANGUAGE"];

fn extract_reply(response: &Value) -> Result<ProviderReply> {
    if let Some(reason) = response
        .pointer("/promptFeedback/blockReason")
        .and_then(Value::as_str)
    {
        return Err(anyhow!("Response was blocked due to {}", reason));
    }

    let candidate = response.get("candidates").and_then(|c| c.get(0));
    if let Some(reason) = candidate
        .and_then(|c| c.get("finishReason"))
        .and_then(Value::as_str)
        .filter(|reason| BLOCKING_FINISH_REASONS.contains(reason))
    {
        return Err(anyhow!("Response was blocked due to {}", reason));
    }

    let text: String = candidate
        .and_then(|c| c.pointer("/content/parts"))
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        Ok(ProviderReply::empty())
    } else {
        Ok(ProviderReply::new(text))
    }
}
