use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::web::models::ErrorResponse;

/// Failure categories surfaced to chat clients.
///
/// The display text is the user-facing message; the payload carries the
/// raw diagnostic detail.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Messages are required")]
    InvalidInput(String),

    #[error("Invalid Google API key. Please check your configuration.")]
    Auth(String),

    #[error("API quota exceeded. Please try again later.")]
    RateLimit(String),

    #[error("Content blocked by safety filters. Please rephrase your message.")]
    ContentPolicy(String),

    #[error("Failed to get response from AI")]
    Upstream(String),
}

impl ChatError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Map a provider failure signal onto a category. First match wins.
    pub fn classify(signal: &str) -> Self {
        let details = signal.to_string();
        if signal.contains("API_KEY_INVALID") {
            Self::Auth(details)
        } else if signal.contains("QUOTA_EXCEEDED") {
            Self::RateLimit(details)
        } else if signal.contains("SAFETY") {
            Self::ContentPolicy(details)
        } else {
            Self::Upstream(details)
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::Auth(_) => "auth",
            Self::RateLimit(_) => "rate_limit",
            Self::ContentPolicy(_) => "content_policy",
            Self::Upstream(_) => "upstream",
        }
    }

    pub fn details(&self) -> &str {
        match self {
            Self::InvalidInput(d)
            | Self::Auth(d)
            | Self::RateLimit(d)
            | Self::ContentPolicy(d)
            | Self::Upstream(d) => d,
        }
    }
}

impl ResponseError for ChatError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::RateLimit(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::ContentPolicy(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            category: self.category().to_string(),
            details: self.details().to_string(),
        })
    }
}
