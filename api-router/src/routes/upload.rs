use axum::{extract::State, response::IntoResponse, Json};
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart};
use bytes::Bytes;
use common::error::AppError;
use ingestion_pipeline::UploadedPdf;
use serde_json::json;
use tempfile::NamedTempFile;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, TryFromMultipart)]
pub struct UploadParams {
    pub user_id: String,
    // Capped by the route's body limit.
    #[form_data(limit = "unlimited")]
    pub file: FieldData<NamedTempFile>,
}

pub async fn upload_pdf(
    State(state): State<ApiState>,
    TypedMultipart(input): TypedMultipart<UploadParams>,
) -> Result<impl IntoResponse, ApiError> {
    let filename = input.file.metadata.file_name.clone().unwrap_or_default();
    let contents = tokio::fs::read(input.file.contents.path())
        .await
        .map_err(AppError::from)?;

    info!(
        user_id = %input.user_id,
        filename = %filename,
        size_bytes = contents.len(),
        "Received PDF upload"
    );

    let ingested = state
        .ingestion
        .ingest_pdf(UploadedPdf {
            user_id: input.user_id,
            filename,
            bytes: Bytes::from(contents),
        })
        .await?;

    Ok(Json(json!({
        "message": "Uploaded and indexed successfully",
        "document_id": ingested.document.id,
        "filename": ingested.document.filename,
        "total_chunks": ingested.total_chunks,
    })))
}
