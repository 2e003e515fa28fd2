//! HTTP request handlers

use super::types::{
    ConsultasResponse, ConversationEntry, ConversationsResponse, ErrorResponse, PageQuery,
    PurgeQuery, PurgeResponse, SuccessResponse, VerifyQuery, DEFAULT_PURGE_DAYS,
};
use super::AppState;
use crate::runtime::{EngineError, HandleOutcome};
use crate::transport::WebhookPayload;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde_json::{json, Value};

const API_KEY_HEADER: &str = "x-api-key";
const ACCESS_DENIED: &str = "Acceso denegado. API Key incorrecta.";

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // WhatsApp webhook: verification handshake and deliveries
        .route("/webhook", get(verify_webhook).post(receive_webhook))
        // Admin: interaction records
        .route("/consultas", get(list_consultas))
        .route("/consultas/limpiar", delete(purge_consultas))
        // Admin: live conversation state
        .route("/conversaciones", get(list_conversations))
        .route("/conversaciones/:sender", delete(reset_conversation))
        .route("/health", get(health))
        .with_state(state)
}

// ============================================================
// Webhook
// ============================================================

async fn verify_webhook(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<String, AppError> {
    let expected = state.verify_token.as_deref();
    let verified = query.mode.as_deref() == Some("subscribe")
        && expected.is_some()
        && query.token.as_deref() == expected;

    if verified {
        tracing::info!("Webhook verified");
        Ok(query.challenge.unwrap_or_default())
    } else {
        tracing::warn!(mode = ?query.mode, "Webhook verification failed");
        Err(AppError::Forbidden("Verificación fallida".to_string()))
    }
}

async fn receive_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let payload: WebhookPayload = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "Malformed webhook payload");
        AppError::BadRequest(format!("Invalid webhook payload: {e}"))
    })?;

    let messages = payload.into_messages();
    if messages.is_empty() {
        tracing::debug!("Webhook delivery without messages");
        return Ok(StatusCode::OK);
    }

    let mut failed = 0usize;
    for message in messages {
        let sender = message.sender.clone();
        match state.engine.handle(message).await {
            Ok(HandleOutcome::Processed { update }) => {
                tracing::debug!(sender = %sender, update = ?update, "Message processed");
            }
            Ok(HandleOutcome::Ignored) => {}
            Err(e) => {
                tracing::error!(sender = %sender, error = %e, "Failed to process message");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(AppError::Internal(format!(
            "{failed} message(s) could not be processed"
        )));
    }
    Ok(StatusCode::OK)
}

// ============================================================
// Admin
// ============================================================

fn require_api_key(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    match (state.api_key.as_deref(), provided) {
        (Some(expected), Some(provided)) if expected == provided => Ok(()),
        _ => {
            tracing::warn!("Rejected admin request with missing or wrong API key");
            Err(AppError::Forbidden(ACCESS_DENIED.to_string()))
        }
    }
}

async fn list_consultas(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Result<Json<ConsultasResponse>, AppError> {
    require_api_key(&state, &headers)?;

    let (page, limit) = query.normalized();
    let data = state.db.list_interactions(page, limit).map_err(|e| {
        tracing::error!(error = %e, "Failed to list interaction records");
        AppError::Internal("Error al obtener las consultas".to_string())
    })?;

    Ok(Json(ConsultasResponse {
        success: true,
        data,
    }))
}

async fn purge_consultas(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PurgeQuery>,
) -> Result<Json<PurgeResponse>, AppError> {
    require_api_key(&state, &headers)?;

    let days = query.dias.unwrap_or(DEFAULT_PURGE_DAYS);
    let cutoff = chrono::Utc::now()
        .checked_sub_signed(chrono::Duration::days(i64::from(days)))
        .unwrap_or(chrono::DateTime::<chrono::Utc>::MIN_UTC);
    let deleted = state.db.delete_older_than(cutoff).map_err(|e| {
        tracing::error!(error = %e, "Failed to purge interaction records");
        AppError::Internal("Error al limpiar consultas".to_string())
    })?;

    tracing::info!(days, deleted, "Purged old interaction records");
    Ok(Json(PurgeResponse {
        success: true,
        message: format!("Consultas de más de {days} días eliminadas."),
        deleted,
    }))
}

async fn list_conversations(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ConversationsResponse>, AppError> {
    require_api_key(&state, &headers)?;

    let data = state
        .engine
        .active_conversations()
        .await?
        .into_iter()
        .map(|(sender, state)| ConversationEntry { sender, state })
        .collect();

    Ok(Json(ConversationsResponse {
        success: true,
        data,
    }))
}

async fn reset_conversation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(sender): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    require_api_key(&state, &headers)?;

    state.engine.reset(&sender).await?;

    Ok(Json(SuccessResponse {
        success: true,
        message: "Conversación reiniciada".to_string(),
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Forbidden(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        tracing::error!(error = %e, "Conversation state unavailable");
        AppError::Internal(e.to_string())
    }
}
