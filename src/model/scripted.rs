use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::debug;

use crate::chat::{GenerationConfig, HistoryTurn};
use crate::model::{ChatProvider, ChatSession, ProviderReply};

#[derive(Debug, Clone)]
enum Outcome {
    Reply(ProviderReply),
    Failure(String),
}

/// What a session was seeded with and what it was sent.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub history: Vec<HistoryTurn>,
    pub config: GenerationConfig,
    pub sent: Vec<String>,
}

/// In-process provider that answers every message with the same canned
/// outcome and records each session it opens.
#[derive(Clone)]
pub struct ScriptedModel {
    outcome: Outcome,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl ScriptedModel {
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_outcome(Outcome::Reply(ProviderReply::new(text)))
    }

    pub fn replying_empty() -> Self {
        Self::with_outcome(Outcome::Reply(ProviderReply::empty()))
    }

    pub fn failing(signal: impl Into<String>) -> Self {
        Self::with_outcome(Outcome::Failure(signal.into()))
    }

    fn with_outcome(outcome: Outcome) -> Self {
        Self {
            outcome,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }
}

impl ChatProvider for ScriptedModel {
    fn start_session(
        &self,
        history: Vec<HistoryTurn>,
        config: GenerationConfig,
    ) -> Box<dyn ChatSession> {
        let mut calls = lock(&self.calls);
        calls.push(RecordedCall {
            history,
            config,
            sent: Vec::new(),
        });

        Box::new(ScriptedSession {
            index: calls.len() - 1,
            outcome: self.outcome.clone(),
            calls: self.calls.clone(),
        })
    }
}

struct ScriptedSession {
    index: usize,
    outcome: Outcome,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

#[async_trait]
impl ChatSession for ScriptedSession {
    async fn send_message(&mut self, text: &str) -> Result<ProviderReply> {
        debug!("Scripted session {} received: {}", self.index, text);
        if let Some(call) = lock(&self.calls).get_mut(self.index) {
            call.sent.push(text.to_string());
        }

        match &self.outcome {
            Outcome::Reply(reply) => Ok(reply.clone()),
            Outcome::Failure(signal) => Err(anyhow!("{}", signal)),
        }
    }
}

fn lock(calls: &Mutex<Vec<RecordedCall>>) -> MutexGuard<'_, Vec<RecordedCall>> {
    calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_history_and_sent_text() {
        let model = ScriptedModel::replying("pong");

        let mut session =
            model.start_session(vec![HistoryTurn::user("hi")], GenerationConfig::default());
        let reply = session.send_message("ping").await.unwrap();

        assert_eq!(reply.text(), "pong");
        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].history, vec![HistoryTurn::user("hi")]);
        assert_eq!(calls[0].sent, vec!["ping".to_string()]);
    }

    #[tokio::test]
    async fn test_failing_model_returns_signal() {
        let model = ScriptedModel::failing("QUOTA_EXCEEDED");

        let mut session = model.start_session(Vec::new(), GenerationConfig::default());
        let err = session.send_message("ping").await.unwrap_err();

        assert_eq!(err.to_string(), "QUOTA_EXCEEDED");
    }
}
