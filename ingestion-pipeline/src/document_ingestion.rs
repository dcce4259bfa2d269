use std::sync::Arc;

use bytes::Bytes;
use common::{
    error::AppError,
    storage::{db::SurrealDbClient, store::StorageManager, types::document::Document},
};
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{pipeline::IndexingPipeline, utils::pdf_text_extraction::extract_pdf_text};

pub struct UploadedPdf {
    pub user_id: String,
    pub filename: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone)]
pub struct IngestedDocument {
    pub document: Document,
    pub total_chunks: usize,
}

/// Turns an uploaded PDF into a stored, indexed document and removes documents again.
#[derive(Clone)]
pub struct DocumentIngestion {
    db: Arc<SurrealDbClient>,
    storage: StorageManager,
    pipeline: Arc<IndexingPipeline>,
}

impl DocumentIngestion {
    pub fn new(
        db: Arc<SurrealDbClient>,
        storage: StorageManager,
        pipeline: Arc<IndexingPipeline>,
    ) -> Self {
        Self {
            db,
            storage,
            pipeline,
        }
    }

    /// Store the file, extract its text, record the document and index it.
    ///
    /// Nothing is left behind when the PDF has no usable text.
    #[tracing::instrument(skip_all, fields(user_id = %upload.user_id, filename = %upload.filename))]
    pub async fn ingest_pdf(&self, upload: UploadedPdf) -> Result<IngestedDocument, AppError> {
        let UploadedPdf {
            user_id,
            filename,
            bytes,
        } = upload;

        if user_id.trim().is_empty() {
            return Err(AppError::Validation("user_id is required".into()));
        }
        if !filename.to_lowercase().ends_with(".pdf") {
            return Err(AppError::Validation("Only PDF files are supported".into()));
        }

        let text = extract_pdf_text(bytes.to_vec()).await?;
        if text.trim().is_empty() {
            return Err(AppError::Validation("The PDF contains no text".into()));
        }

        let sha256 = format!("{:x}", Sha256::digest(&bytes));
        let file_path = format!("{user_id}/{}/{}", Uuid::new_v4(), sanitize_filename(&filename));
        self.storage.put(&file_path, bytes).await?;

        let mut document = Document::new(user_id, filename, file_path, sha256);
        if let Err(err) = self.db.store_item(document.clone()).await {
            // The create may have committed before the response failed to decode.
            self.discard_record(&document.id).await;
            self.discard_file(&document.file_path).await;
            return Err(err.into());
        }

        let total_chunks = match self.pipeline.index(&document.id, &text).await {
            Ok(count) => count,
            Err(err) => {
                // Earlier batches may already be indexed; only the record and file are undone.
                self.discard_record(&document.id).await;
                self.discard_file(&document.file_path).await;
                return Err(err);
            }
        };

        Document::set_chunk_count(&document.id, total_chunks, &self.db).await?;
        document.chunk_count = total_chunks;

        info!(
            document_id = %document.id,
            total_chunks,
            text_chars = text.chars().count(),
            "document ingested"
        );

        Ok(IngestedDocument {
            document,
            total_chunks,
        })
    }

    /// Deletes the document record and, best effort, its stored file.
    pub async fn delete_document(&self, id: &str, user_id: &str) -> Result<Document, AppError> {
        let document = Document::delete_owned(id, user_id, &self.db).await?;
        self.discard_file(&document.file_path).await;
        Ok(document)
    }

    async fn discard_record(&self, id: &str) {
        if let Err(err) = self.db.delete_item::<Document>(id).await {
            warn!(document_id = id, error = %err, "failed to remove document record");
        }
    }

    async fn discard_file(&self, location: &str) {
        if let Err(err) = self.storage.delete(location).await {
            warn!(location, error = %err, "failed to remove stored file");
        }
    }
}

fn sanitize_filename(filename: &str) -> String {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "upload.pdf".to_string()
    } else {
        cleaned
    }
}
