use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Local,
    Memory,
}

fn default_storage_kind() -> StorageKind {
    StorageKind::Local
}

#[derive(Clone, Copy, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    #[default]
    OpenAI,
    FastEmbed,
    Hashed,
}

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    pub openai_api_key: String,
    #[serde(default = "default_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_surrealdb_address")]
    pub surrealdb_address: String,
    #[serde(default)]
    pub surrealdb_username: String,
    #[serde(default)]
    pub surrealdb_password: String,
    #[serde(default = "default_surrealdb_scope")]
    pub surrealdb_namespace: String,
    #[serde(default = "default_surrealdb_scope")]
    pub surrealdb_database: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_storage_kind")]
    pub storage: StorageKind,
    #[serde(default)]
    pub embedding_backend: EmbeddingBackend,
    /// Model code for the selected backend; `None` picks the backend default.
    #[serde(default)]
    pub embedding_model: Option<String>,
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: u32,
    #[serde(default = "default_vector_collection")]
    pub vector_collection: String,
    #[serde(default = "default_generation_model")]
    pub generation_model: String,
    #[serde(default = "default_chunk_max_chars")]
    pub chunk_max_chars: usize,
    #[serde(default = "default_chunk_overlap_chars")]
    pub chunk_overlap_chars: usize,
    #[serde(default = "default_min_chunk_chars")]
    pub min_chunk_chars: usize,
    #[serde(default = "default_retrieval_k")]
    pub retrieval_k: usize,
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
    #[serde(default = "default_min_context_chars")]
    pub min_context_chars: usize,
    #[serde(default = "default_flashcard_k")]
    pub flashcard_k: usize,
    #[serde(default = "default_quiz_k")]
    pub quiz_k: usize,
    #[serde(default = "default_flashcard_temperature")]
    pub flashcard_temperature: f32,
    #[serde(default = "default_quiz_temperature")]
    pub quiz_temperature: f32,
    #[serde(default = "default_answer_temperature")]
    pub answer_temperature: f32,
    #[serde(default = "default_quiz_context_char_limit")]
    pub quiz_context_char_limit: usize,
    #[serde(default = "default_embedding_batch_size")]
    pub embedding_batch_size: usize,
    #[serde(default = "default_embedding_attempts")]
    pub embedding_attempts: usize,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
    #[serde(default = "default_upload_max_body_bytes")]
    pub upload_max_body_bytes: usize,
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_surrealdb_address() -> String {
    "surrealkv://data/surreal".to_string()
}

fn default_surrealdb_scope() -> String {
    "study".to_string()
}

fn default_http_port() -> u16 {
    8000
}

fn default_embedding_dimensions() -> u32 {
    1536
}

fn default_vector_collection() -> String {
    "documents".to_string()
}

fn default_generation_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_chunk_max_chars() -> usize {
    1_000
}

fn default_chunk_overlap_chars() -> usize {
    200
}

fn default_min_chunk_chars() -> usize {
    40
}

fn default_retrieval_k() -> usize {
    6
}

fn default_max_context_chars() -> usize {
    4_000
}

fn default_min_context_chars() -> usize {
    200
}

fn default_flashcard_k() -> usize {
    8
}

fn default_quiz_k() -> usize {
    10
}

fn default_flashcard_temperature() -> f32 {
    0.15
}

fn default_quiz_temperature() -> f32 {
    0.3
}

fn default_answer_temperature() -> f32 {
    0.1
}

fn default_quiz_context_char_limit() -> usize {
    6_000
}

fn default_embedding_batch_size() -> usize {
    16
}

fn default_embedding_attempts() -> usize {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2_000
}

fn default_upload_max_body_bytes() -> usize {
    25 * 1024 * 1024
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_base_url: default_base_url(),
            surrealdb_address: default_surrealdb_address(),
            surrealdb_username: String::new(),
            surrealdb_password: String::new(),
            surrealdb_namespace: default_surrealdb_scope(),
            surrealdb_database: default_surrealdb_scope(),
            data_dir: default_data_dir(),
            http_port: default_http_port(),
            storage: default_storage_kind(),
            embedding_backend: EmbeddingBackend::default(),
            embedding_model: None,
            embedding_dimensions: default_embedding_dimensions(),
            vector_collection: default_vector_collection(),
            generation_model: default_generation_model(),
            chunk_max_chars: default_chunk_max_chars(),
            chunk_overlap_chars: default_chunk_overlap_chars(),
            min_chunk_chars: default_min_chunk_chars(),
            retrieval_k: default_retrieval_k(),
            max_context_chars: default_max_context_chars(),
            min_context_chars: default_min_context_chars(),
            flashcard_k: default_flashcard_k(),
            quiz_k: default_quiz_k(),
            flashcard_temperature: default_flashcard_temperature(),
            quiz_temperature: default_quiz_temperature(),
            answer_temperature: default_answer_temperature(),
            quiz_context_char_limit: default_quiz_context_char_limit(),
            embedding_batch_size: default_embedding_batch_size(),
            embedding_attempts: default_embedding_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
            upload_max_body_bytes: default_upload_max_body_bytes(),
        }
    }
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_everything_but_the_api_key() {
        let config: AppConfig = Config::builder()
            .set_override("openai_api_key", "sk-test")
            .and_then(|builder| builder.build())
            .and_then(Config::try_deserialize)
            .expect("config should deserialize with defaults");

        assert_eq!(config.openai_api_key, "sk-test");
        assert_eq!(config.http_port, 8000);
        assert_eq!(config.storage, StorageKind::Local);
        assert_eq!(config.embedding_backend, EmbeddingBackend::OpenAI);
        assert_eq!(config.vector_collection, "documents");
        assert_eq!(config.max_context_chars, 4_000);
        assert_eq!(config.min_context_chars, 200);
        assert_eq!(config.min_chunk_chars, 40);
        assert_eq!((config.flashcard_k, config.quiz_k), (8, 10));
        assert_eq!(config.quiz_context_char_limit, 6_000);
        assert_eq!(config.embedding_batch_size, 16);
        assert_eq!(config.embedding_attempts, 3);
    }

    #[test]
    fn generation_and_indexing_knobs_are_overridable() {
        let config: AppConfig = Config::builder()
            .set_override("openai_api_key", "sk-test")
            .and_then(|builder| builder.set_override("quiz_temperature", 0.7))
            .and_then(|builder| builder.set_override("quiz_context_char_limit", 900))
            .and_then(|builder| builder.set_override("embedding_batch_size", 4))
            .and_then(|builder| builder.set_override("retry_max_delay_ms", 500))
            .and_then(|builder| builder.build())
            .and_then(Config::try_deserialize)
            .expect("config should deserialize");

        assert!((config.quiz_temperature - 0.7).abs() < f32::EPSILON);
        assert!((config.flashcard_temperature - 0.15).abs() < f32::EPSILON);
        assert_eq!(config.quiz_context_char_limit, 900);
        assert_eq!(config.embedding_batch_size, 4);
        assert_eq!(config.retry_max_delay_ms, 500);
    }

    #[test]
    fn backend_names_are_lowercase() {
        let config: AppConfig = Config::builder()
            .set_override("openai_api_key", "sk-test")
            .and_then(|builder| builder.set_override("embedding_backend", "hashed"))
            .and_then(|builder| builder.set_override("storage", "memory"))
            .and_then(|builder| builder.build())
            .and_then(Config::try_deserialize)
            .expect("config should deserialize");

        assert_eq!(config.embedding_backend, EmbeddingBackend::Hashed);
        assert_eq!(config.storage, StorageKind::Memory);
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let result = Config::builder()
            .build()
            .and_then(Config::try_deserialize::<AppConfig>);

        assert!(result.is_err());
    }
}
