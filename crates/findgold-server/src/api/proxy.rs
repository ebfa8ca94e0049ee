use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::middleware::RequestId;

use super::{ApiError, AppState};

const CHAT_FAILURE: &str = "Erreur lors de la communication avec OpenAI";
const IMAGE_FAILURE: &str = "Erreur lors de l'analyse de l'image";

#[derive(Debug, Deserialize)]
pub(super) struct ChatRequest {
    pub messages: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeImageRequest {
    pub image: String,
    pub prompt: String,
}

/// `POST /api/chat`: forwards `messages` and answers with the first
/// completion message, unmodified.
pub(super) async fn chat(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::rejected(&req_id, &e))?;

    tracing::info!(
        request_id = %req_id.0,
        messages = request.messages.len(),
        "proxying chat completion"
    );

    let message = state
        .completions
        .chat(&request.messages)
        .await
        .map_err(|e| ApiError::upstream(&req_id, &e, CHAT_FAILURE))?;

    Ok(Json(message))
}

/// `POST /api/analyze-image`: wraps `prompt` and `image` into a single user
/// message and answers with the first completion message.
pub(super) async fn analyze_image(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<AnalyzeImageRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::rejected(&req_id, &e))?;

    tracing::info!(
        request_id = %req_id.0,
        image_bytes = request.image.len(),
        "proxying image analysis"
    );

    let message = state
        .completions
        .analyze_image(&request.image, &request.prompt)
        .await
        .map_err(|e| ApiError::upstream(&req_id, &e, IMAGE_FAILURE))?;

    Ok(Json(message))
}
