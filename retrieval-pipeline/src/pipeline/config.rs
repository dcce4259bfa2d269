use common::utils::config::AppConfig;
use serde::{Deserialize, Serialize};

/// Joins selected chunks in the assembled context.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Budgeting knobs for context assembly. All lengths are in characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Nearest neighbours fetched per query.
    pub k: usize,
    /// Hits shorter than this after trimming are skipped.
    pub min_chunk_chars: usize,
    /// Assembly stops once the selected chunks reach this total.
    pub max_context_chars: usize,
    /// Contexts shorter than this are reported as insufficient.
    pub min_context_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: 6,
            min_chunk_chars: 40,
            max_context_chars: 4_000,
            min_context_chars: 200,
        }
    }
}

impl From<&AppConfig> for RetrievalConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            k: config.retrieval_k,
            min_chunk_chars: config.min_chunk_chars,
            max_context_chars: config.max_context_chars,
            min_context_chars: config.min_context_chars,
        }
    }
}
