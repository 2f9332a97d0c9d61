//! Chat relay in front of the Gemini API.
//!
//! A client transcript is normalized into the provider's turn shape
//! (`chat::normalizer`), sent through an injected provider handle
//! (`chat::orchestrator`, `model`), and any failure is classified into a
//! stable category (`error`).

pub mod chat;
pub mod config;
pub mod error;
pub mod model;
pub mod web;

use std::sync::Arc;

use chat::ChatOrchestrator;
use model::ChatProvider;

// App state structure
pub struct AppState {
    pub orchestrator: ChatOrchestrator,
}

impl AppState {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            orchestrator: ChatOrchestrator::new(provider),
        }
    }
}
