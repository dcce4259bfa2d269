use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use common::storage::types::document::Document;
use serde::Serialize;
use serde_json::json;

use crate::{api_state::ApiState, error::ApiError};

use super::OwnerQuery;

#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub filename: String,
    pub created_at: DateTime<Utc>,
}

pub async fn list_documents(
    State(state): State<ApiState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let documents: Vec<DocumentSummary> = Document::list_for_user(&user_id, &state.db)
        .await?
        .into_iter()
        .map(|document| DocumentSummary {
            id: document.id,
            filename: document.filename,
            created_at: document.created_at,
        })
        .collect();

    Ok(Json(documents))
}

pub async fn delete_document(
    State(state): State<ApiState>,
    Path(document_id): Path<String>,
    Query(owner): Query<OwnerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .ingestion
        .delete_document(&document_id, &owner.user_id)
        .await?;

    Ok(Json(json!({ "message": "Document deleted successfully" })))
}
