use common::utils::config::AppConfig;
use serde::{Deserialize, Serialize};

/// Per-task retrieval depth and sampling temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub flashcard_k: usize,
    pub quiz_k: usize,
    pub flashcard_temperature: f32,
    pub quiz_temperature: f32,
    pub answer_temperature: f32,
    /// Quiz prompts embed at most this many characters of context.
    pub quiz_context_char_limit: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            flashcard_k: 8,
            quiz_k: 10,
            flashcard_temperature: 0.15,
            quiz_temperature: 0.3,
            answer_temperature: 0.1,
            quiz_context_char_limit: 6_000,
        }
    }
}

impl From<&AppConfig> for GenerationConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            flashcard_k: config.flashcard_k,
            quiz_k: config.quiz_k,
            flashcard_temperature: config.flashcard_temperature,
            quiz_temperature: config.quiz_temperature,
            answer_temperature: config.answer_temperature,
            quiz_context_char_limit: config.quiz_context_char_limit,
        }
    }
}
