use std::sync::Arc;

use async_trait::async_trait;
use common::{
    error::AppError,
    storage::vector_index::{IndexedEntry, VectorIndex},
    utils::embedding::EmbeddingProvider,
};

use crate::chunker::{ChunkSegment, TextChunker};

/// The outside world as seen by the indexing stages.
#[async_trait]
pub trait IndexingServices: Send + Sync {
    fn split(&self, text: &str) -> Vec<ChunkSegment>;

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, AppError>;

    async fn insert_batch(&self, entries: Vec<IndexedEntry>) -> Result<(), AppError>;
}

pub struct DefaultIndexingServices {
    chunker: TextChunker,
    embedding_provider: Arc<EmbeddingProvider>,
    index: VectorIndex,
}

impl DefaultIndexingServices {
    pub fn new(
        chunker: TextChunker,
        embedding_provider: Arc<EmbeddingProvider>,
        index: VectorIndex,
    ) -> Self {
        Self {
            chunker,
            embedding_provider,
            index,
        }
    }
}

#[async_trait]
impl IndexingServices for DefaultIndexingServices {
    fn split(&self, text: &str) -> Vec<ChunkSegment> {
        self.chunker.split(text)
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, AppError> {
        Ok(self.embedding_provider.embed_batch(texts).await?)
    }

    async fn insert_batch(&self, entries: Vec<IndexedEntry>) -> Result<(), AppError> {
        self.index.insert(entries).await
    }
}
