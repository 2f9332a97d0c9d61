use std::sync::Arc;

use log::{debug, error, info};
use uuid::Uuid;

use crate::chat::NormalizedRequest;
use crate::error::ChatError;
use crate::model::ChatProvider;

pub const FALLBACK_REPLY: &str = "Sorry, I couldn't generate a response.";

/// Sampling parameters applied to every provider session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_output_tokens: 500,
            temperature: 0.7,
        }
    }
}

/// Runs one normalized request against the provider and classifies the
/// outcome. Holds no per-request state.
#[derive(Clone)]
pub struct ChatOrchestrator {
    provider: Arc<dyn ChatProvider>,
    config: GenerationConfig,
}

impl ChatOrchestrator {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            provider,
            config: GenerationConfig::default(),
        }
    }

    pub async fn reply(
        &self,
        request_id: Uuid,
        request: NormalizedRequest,
    ) -> Result<String, ChatError> {
        debug!(
            "[{}] Starting session with {} history turns",
            request_id,
            request.history.len()
        );

        let mut session = self.provider.start_session(request.history, self.config);
        let reply = session
            .send_message(&request.latest_message)
            .await
            .map_err(|e| {
                let err = ChatError::classify(&format!("{:#}", e));
                error!(
                    "[{}] Provider error ({}): {}",
                    request_id,
                    err.category(),
                    err.details()
                );
                err
            })?;

        let text = reply.text();
        if text.is_empty() {
            info!("[{}] Provider returned no text, using fallback", request_id);
            return Ok(FALLBACK_REPLY.to_string());
        }

        info!("[{}] Reply length: {} characters", request_id, text.len());
        Ok(text.to_string())
    }
}
