use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse, Responder};
use log::{info, warn};
use serde_json::json;
use uuid::Uuid;

use crate::chat::normalize;
use crate::error::ChatError;
use crate::web::models::{ChatRequest, ChatResponse};
use crate::AppState;

// Health check endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

// Chat API endpoint
pub async fn chat(
    data: web::Data<AppState>,
    req: web::Json<ChatRequest>,
) -> Result<HttpResponse, ChatError> {
    let request_id = Uuid::new_v4();
    info!(
        "[{}] Chat request with {} messages",
        request_id,
        req.messages.len()
    );

    let normalized = normalize(&req.messages).map_err(|e| {
        warn!("[{}] Rejected request: {}", request_id, e.details());
        e
    })?;
    let message = data.orchestrator.reply(request_id, normalized).await?;

    Ok(HttpResponse::Ok().json(ChatResponse { message }))
}

/// Turns body extraction failures into `InvalidInput` before any
/// provider call.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    warn!("Rejected chat body: {}", err);
    ChatError::invalid_input(err.to_string()).into()
}
