mod assembly;
mod config;

pub use assembly::{assemble_context, AssemblyLimits};
pub use config::{RetrievalConfig, CONTEXT_SEPARATOR};

use std::{sync::Arc, time::Instant};

use common::{
    error::AppError, storage::vector_index::VectorIndex, utils::embedding::EmbeddingProvider,
};
use tracing::{debug, info, warn};

use crate::{ContextOutcome, InsufficientReason};

/// One retrieval request, scoped to a single document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalQuery {
    pub document_id: String,
    pub query: String,
    pub k: usize,
    pub min_chunk_chars: usize,
    pub max_context_chars: usize,
}

impl RetrievalQuery {
    pub fn new(
        document_id: impl Into<String>,
        query: impl Into<String>,
        config: &RetrievalConfig,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            query: query.into(),
            k: config.k,
            min_chunk_chars: config.min_chunk_chars,
            max_context_chars: config.max_context_chars,
        }
    }

    #[must_use]
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }
}

/// Filtered similarity search plus the budgeting policy.
#[derive(Clone)]
pub struct ContextRetriever {
    embedding_provider: Arc<EmbeddingProvider>,
    index: VectorIndex,
    config: RetrievalConfig,
}

impl ContextRetriever {
    pub fn new(
        embedding_provider: Arc<EmbeddingProvider>,
        index: VectorIndex,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            embedding_provider,
            index,
            config,
        }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Query seeded with this retriever's defaults.
    pub fn query(&self, document_id: &str, text: &str) -> RetrievalQuery {
        RetrievalQuery::new(document_id, text, &self.config)
    }

    /// Never fails: backend trouble is reported as
    /// [`InsufficientReason::Unavailable`].
    #[tracing::instrument(skip_all, fields(document_id = %query.document_id, k = query.k))]
    pub async fn retrieve(&self, query: &RetrievalQuery) -> ContextOutcome {
        let started = Instant::now();

        let hits = match self.search(query).await {
            Ok(hits) => hits,
            Err(err) => {
                warn!(
                    document_id = %query.document_id,
                    error = %err,
                    "context retrieval unavailable"
                );
                return ContextOutcome::Insufficient(InsufficientReason::Unavailable);
            }
        };

        debug!(
            document_id = %query.document_id,
            hit_count = hits.len(),
            top_score = hits.first().map(|hit| hit.score),
            "vector search finished"
        );

        let outcome = assemble_context(
            &query.document_id,
            &hits,
            AssemblyLimits {
                min_chunk_chars: query.min_chunk_chars,
                max_context_chars: query.max_context_chars,
                min_context_chars: self.config.min_context_chars,
            },
        );

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match &outcome {
            ContextOutcome::Context(context) => info!(
                document_id = %query.document_id,
                context_chars = context.char_count(),
                chunk_count = context.chunk_indices.len(),
                elapsed_ms,
                "context assembled"
            ),
            ContextOutcome::Insufficient(reason) => info!(
                document_id = %query.document_id,
                reason = ?reason,
                elapsed_ms,
                "no usable context"
            ),
        }

        outcome
    }

    async fn search(
        &self,
        query: &RetrievalQuery,
    ) -> Result<Vec<common::storage::vector_index::SearchHit>, AppError> {
        let embedding = self
            .embedding_provider
            .embed(&query.query)
            .await
            .map_err(|err| AppError::RetrievalUnavailable(format!("embedding failed: {err}")))?;

        self.index
            .search(&query.document_id, embedding, query.k)
            .await
            .map_err(|err| AppError::RetrievalUnavailable(format!("vector search failed: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::{config::OpenAIConfig, Client};
    use common::storage::{
        db::SurrealDbClient,
        vector_index::{ChunkMetadata, IndexedEntry},
    };
    use uuid::Uuid;

    async fn memory_index() -> VectorIndex {
        let database = Uuid::new_v4().to_string();
        let db = SurrealDbClient::memory("retrieval_test", &database)
            .await
            .expect("Failed to create in-memory SurrealDB");
        let index = VectorIndex::new(Arc::new(db), "documents").expect("collection");
        index.ensure_initialized().await.expect("init collection");
        index
    }

    async fn add_chunks(
        index: &VectorIndex,
        provider: &EmbeddingProvider,
        document_id: &str,
        texts: &[&str],
    ) {
        let embeddings = provider
            .embed_batch(texts.iter().map(ToString::to_string).collect())
            .await
            .expect("embed");
        let entries = texts
            .iter()
            .zip(embeddings)
            .enumerate()
            .map(|(idx, (text, embedding))| IndexedEntry {
                text: (*text).to_string(),
                metadata: ChunkMetadata {
                    document_id: document_id.to_string(),
                    chunk_index: idx,
                    byte_start: 0,
                    byte_end: text.len(),
                },
                embedding,
            })
            .collect();
        index.insert(entries).await.expect("insert");
    }

    fn lenient_config() -> RetrievalConfig {
        RetrievalConfig {
            k: 6,
            min_chunk_chars: 10,
            max_context_chars: 4_000,
            min_context_chars: 10,
        }
    }

    #[tokio::test]
    async fn vietnamese_round_trip_stays_within_document() {
        let provider = Arc::new(EmbeddingProvider::new_hashed(128));
        let index = memory_index().await;
        add_chunks(&index, &provider, "1", &["Định nghĩa A là X."]).await;
        add_chunks(&index, &provider, "2", &["Định nghĩa B là Y."]).await;

        let retriever = ContextRetriever::new(provider, index, lenient_config());

        let outcome = retriever
            .retrieve(&retriever.query("1", "Định nghĩa A"))
            .await;
        let context = outcome.context().expect("context for document 1");
        assert!(context.text.contains("A là X"));
        assert!(!context.text.contains("B là Y"));

        let outcome = retriever
            .retrieve(&retriever.query("2", "Định nghĩa A"))
            .await;
        let context = outcome.context().expect("context for document 2");
        assert!(context.text.contains("B là Y"));
        assert!(!context.text.contains("A là X"));
    }

    #[tokio::test]
    async fn both_definitions_return_for_their_document_only() {
        let provider = Arc::new(EmbeddingProvider::new_hashed(128));
        let index = memory_index().await;
        add_chunks(
            &index,
            &provider,
            "1",
            &["Định nghĩa A là X.", "Định nghĩa B là Y."],
        )
        .await;

        let retriever = ContextRetriever::new(provider, index, lenient_config());

        let outcome = retriever.retrieve(&retriever.query("1", "Định nghĩa")).await;
        let context = outcome.context().expect("context for document 1");
        assert!(context.text.contains("Định nghĩa A là X."));
        assert!(context.text.contains("Định nghĩa B là Y."));

        let outcome = retriever.retrieve(&retriever.query("2", "Định nghĩa")).await;
        assert_eq!(
            outcome,
            ContextOutcome::Insufficient(InsufficientReason::NoMatches)
        );
    }

    #[tokio::test]
    async fn empty_document_is_insufficient_not_an_error() {
        let provider = Arc::new(EmbeddingProvider::new_hashed(32));
        let index = memory_index().await;
        let retriever = ContextRetriever::new(provider, index, RetrievalConfig::default());

        let outcome = retriever
            .retrieve(&retriever.query("missing", "anything"))
            .await;
        assert_eq!(
            outcome,
            ContextOutcome::Insufficient(InsufficientReason::NoMatches)
        );
    }

    #[tokio::test]
    async fn short_material_is_reported_as_too_short() {
        let provider = Arc::new(EmbeddingProvider::new_hashed(32));
        let index = memory_index().await;
        add_chunks(
            &index,
            &provider,
            "1",
            &["A single sentence that is long enough to keep."],
        )
        .await;
        let retriever = ContextRetriever::new(provider, index, RetrievalConfig::default());

        let outcome = retriever.retrieve(&retriever.query("1", "sentence")).await;
        assert_eq!(
            outcome,
            ContextOutcome::Insufficient(InsufficientReason::TooShort)
        );
    }

    #[tokio::test]
    async fn respects_k_and_ranks_best_first() {
        let provider = Arc::new(EmbeddingProvider::new_hashed(256));
        let index = memory_index().await;
        add_chunks(
            &index,
            &provider,
            "1",
            &[
                "photosynthesis happens in chloroplasts of plant cells",
                "mitochondria produce energy for the cell through respiration",
                "ribosomes assemble proteins from amino acids",
            ],
        )
        .await;
        let retriever = ContextRetriever::new(provider, index, lenient_config());

        let outcome = retriever
            .retrieve(&retriever.query("1", "mitochondria energy respiration").with_k(1))
            .await;
        let context = outcome.context().expect("context");
        assert_eq!(context.chunk_indices, vec![1]);
        assert!(context.text.starts_with("mitochondria"));
    }

    #[tokio::test]
    async fn backend_failure_degrades_to_unavailable() {
        let client = Arc::new(Client::with_config(
            OpenAIConfig::new()
                .with_api_key("sk-test")
                .with_api_base("http://127.0.0.1:9/v1"),
        ));
        let provider = Arc::new(EmbeddingProvider::new_openai(
            client,
            "text-embedding-3-small".into(),
            8,
        ));
        let retriever = ContextRetriever::new(provider, memory_index().await, lenient_config());

        let outcome = retriever.retrieve(&retriever.query("1", "anything")).await;
        assert_eq!(
            outcome,
            ContextOutcome::Insufficient(InsufficientReason::Unavailable)
        );
    }
}
