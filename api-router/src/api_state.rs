use std::sync::Arc;

use common::{
    error::AppError,
    storage::{db::SurrealDbClient, store::StorageManager, vector_index::VectorIndex},
    utils::{config::AppConfig, embedding::EmbeddingProvider, llm::CompletionService},
};
use generation_pipeline::{GenerationConfig, StudyGenerator};
use ingestion_pipeline::{
    ChunkingConfig, DocumentIngestion, IndexingConfig, IndexingPipeline, TextChunker,
};
use retrieval_pipeline::{ContextRetriever, RetrievalConfig};

#[derive(Clone)]
pub struct ApiState {
    pub db: Arc<SurrealDbClient>,
    pub config: AppConfig,
    pub index: VectorIndex,
    pub ingestion: DocumentIngestion,
    pub generator: Arc<StudyGenerator>,
}

impl ApiState {
    /// Connects to SurrealDB from `config` and wires the pipelines on top of it.
    pub async fn new(
        config: &AppConfig,
        storage: StorageManager,
        embedding_provider: Arc<EmbeddingProvider>,
        completion: Arc<dyn CompletionService>,
    ) -> Result<Self, AppError> {
        let surreal_db_client = Arc::new(
            SurrealDbClient::new(
                &config.surrealdb_address,
                &config.surrealdb_username,
                &config.surrealdb_password,
                &config.surrealdb_namespace,
                &config.surrealdb_database,
            )
            .await?,
        );

        Self::from_parts(
            surreal_db_client,
            config,
            storage,
            embedding_provider,
            completion,
        )
        .await
    }

    pub async fn from_parts(
        db: Arc<SurrealDbClient>,
        config: &AppConfig,
        storage: StorageManager,
        embedding_provider: Arc<EmbeddingProvider>,
        completion: Arc<dyn CompletionService>,
    ) -> Result<Self, AppError> {
        db.ensure_initialized().await?;

        let index = VectorIndex::new(Arc::clone(&db), config.vector_collection.clone())?;
        index.ensure_initialized().await?;

        let chunker = TextChunker::new(ChunkingConfig::from(config))?;
        let pipeline = IndexingPipeline::with_config(
            chunker,
            Arc::clone(&embedding_provider),
            index.clone(),
            IndexingConfig::from(config),
        );
        let ingestion = DocumentIngestion::new(Arc::clone(&db), storage, Arc::new(pipeline));

        let retriever = ContextRetriever::new(
            embedding_provider,
            index.clone(),
            RetrievalConfig::from(config),
        );
        let generator = StudyGenerator::new(retriever, completion, GenerationConfig::from(config));

        Ok(Self {
            db,
            config: config.clone(),
            index,
            ingestion,
            generator: Arc::new(generator),
        })
    }
}
