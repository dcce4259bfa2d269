use std::ops::Range;

use common::{error::AppError, storage::vector_index::IndexedEntry};
use tracing::error;

use super::{config::IndexingConfig, services::IndexingServices};

/// A chunk of one document, ready to be embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub document_id: String,
    pub chunk_index: usize,
    pub text: String,
    pub range: Range<usize>,
}

pub struct IndexingContext<'a> {
    pub document_id: &'a str,
    pub pipeline_config: &'a IndexingConfig,
    pub services: &'a dyn IndexingServices,
    pub chunks: Vec<Chunk>,
    pub entries: Vec<IndexedEntry>,
}

impl<'a> IndexingContext<'a> {
    pub fn new(
        document_id: &'a str,
        pipeline_config: &'a IndexingConfig,
        services: &'a dyn IndexingServices,
    ) -> Self {
        Self {
            document_id,
            pipeline_config,
            services,
            chunks: Vec::new(),
            entries: Vec::new(),
        }
    }

    pub fn abort(&mut self, err: AppError) -> AppError {
        error!(
            document_id = %self.document_id,
            chunk_count = self.chunks.len(),
            error = %err,
            "indexing pipeline aborted"
        );
        err
    }
}
