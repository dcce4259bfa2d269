mod config;
mod context;
mod services;
mod stages;
mod state;

pub use config::{IndexingConfig, IndexingTuning};
pub use context::Chunk;
#[allow(clippy::module_name_repetitions)]
pub use services::{DefaultIndexingServices, IndexingServices};

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use common::{
    error::AppError, storage::vector_index::VectorIndex, utils::embedding::EmbeddingProvider,
};
use tracing::info;

use crate::chunker::TextChunker;

use self::{
    context::IndexingContext,
    stages::{chunk_text, embed_chunks, persist_entries},
    state::ready,
};

/// Chunk, embed and store one document's text in the vector collection.
#[allow(clippy::module_name_repetitions)]
pub struct IndexingPipeline {
    pipeline_config: IndexingConfig,
    services: Arc<dyn IndexingServices>,
}

impl IndexingPipeline {
    pub fn new(
        chunker: TextChunker,
        embedding_provider: Arc<EmbeddingProvider>,
        index: VectorIndex,
    ) -> Self {
        Self::with_config(chunker, embedding_provider, index, IndexingConfig::default())
    }

    pub fn with_config(
        chunker: TextChunker,
        embedding_provider: Arc<EmbeddingProvider>,
        index: VectorIndex,
        pipeline_config: IndexingConfig,
    ) -> Self {
        Self::with_services(
            pipeline_config,
            Arc::new(DefaultIndexingServices::new(
                chunker,
                embedding_provider,
                index,
            )),
        )
    }

    pub fn with_services(
        pipeline_config: IndexingConfig,
        services: Arc<dyn IndexingServices>,
    ) -> Self {
        Self {
            pipeline_config,
            services,
        }
    }

    fn duration_millis(duration: Duration) -> u64 {
        u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
    }

    /// Returns the number of chunks written.
    ///
    /// Text that yields no usable chunk fails with
    /// [`AppError::NoIndexableContent`] before anything is written. Indexing
    /// only ever appends; running it twice for a document stores its chunks twice.
    #[tracing::instrument(skip_all, fields(document_id = %document_id))]
    pub async fn index(&self, document_id: &str, text: &str) -> Result<usize, AppError> {
        let mut ctx =
            IndexingContext::new(document_id, &self.pipeline_config, self.services.as_ref());

        let machine = ready();
        let pipeline_started = Instant::now();

        let machine = chunk_text(machine, &mut ctx, text).map_err(|err| ctx.abort(err))?;

        let stage_start = Instant::now();
        let machine = embed_chunks(machine, &mut ctx)
            .await
            .map_err(|err| ctx.abort(err))?;
        let embed_ms = Self::duration_millis(stage_start.elapsed());

        let stage_start = Instant::now();
        let (_machine, chunk_count) = persist_entries(machine, &mut ctx)
            .await
            .map_err(|err| ctx.abort(err))?;
        let persist_ms = Self::duration_millis(stage_start.elapsed());

        info!(
            document_id = %document_id,
            chunk_count,
            total_ms = Self::duration_millis(pipeline_started.elapsed()),
            embed_ms,
            persist_ms,
            "indexing pipeline finished"
        );

        Ok(chunk_count)
    }
}
