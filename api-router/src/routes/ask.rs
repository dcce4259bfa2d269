use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub document_id: String,
    pub question: String,
}

pub async fn ask(
    State(state): State<ApiState>,
    Json(input): Json<AskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if input.question.trim().is_empty() {
        return Err(ApiError::ValidationError("question is required".to_string()));
    }

    let answer = state
        .generator
        .answer_question(&input.document_id, input.question.trim())
        .await;

    Ok(Json(json!({ "answer": answer })))
}
