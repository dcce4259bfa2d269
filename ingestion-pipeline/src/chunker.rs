use std::ops::Range;

use common::{error::AppError, utils::config::AppConfig};
use text_splitter::{ChunkConfig, TextSplitter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Upper bound on a chunk, in characters.
    pub max_chars: usize,
    /// Characters shared between neighbouring chunks.
    pub overlap_chars: usize,
    /// Chunks shorter than this after trimming are discarded.
    pub min_chunk_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: 1_000,
            overlap_chars: 200,
            min_chunk_chars: 40,
        }
    }
}

impl From<&AppConfig> for ChunkingConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_chars: config.chunk_max_chars,
            overlap_chars: config.chunk_overlap_chars,
            min_chunk_chars: config.min_chunk_chars,
        }
    }
}

/// A slice of the source text. `range` is a byte range into the text passed to
/// [`TextChunker::split`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSegment {
    pub text: String,
    pub range: Range<usize>,
}

/// Splits extracted text into overlapping, size-bounded segments, preferring
/// paragraph, sentence and word boundaries.
pub struct TextChunker {
    splitter: TextSplitter<text_splitter::Characters>,
    config: ChunkingConfig,
}

impl TextChunker {
    pub fn new(config: ChunkingConfig) -> Result<Self, AppError> {
        if config.max_chars == 0 || config.overlap_chars == 0 {
            return Err(AppError::Validation(
                "chunk size and overlap must both be greater than zero".into(),
            ));
        }
        if config.overlap_chars >= config.max_chars {
            return Err(AppError::Validation(format!(
                "chunk overlap ({}) must be smaller than the chunk size ({})",
                config.overlap_chars, config.max_chars
            )));
        }

        let chunk_config = ChunkConfig::new(config.max_chars)
            .with_overlap(config.overlap_chars)
            .map_err(|e| AppError::Validation(format!("invalid chunk overlap: {e}")))?;

        Ok(Self {
            splitter: TextSplitter::new(chunk_config),
            config,
        })
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Deterministic for a given text and config. Empty input gives an empty result.
    pub fn split(&self, text: &str) -> Vec<ChunkSegment> {
        self.splitter
            .chunk_indices(text)
            .filter_map(|(start, chunk)| {
                let trimmed = chunk.trim();
                if trimmed.chars().count() < self.config.min_chunk_chars {
                    return None;
                }
                let leading = chunk.len() - chunk.trim_start().len();
                let begin = start + leading;
                Some(ChunkSegment {
                    text: trimmed.to_string(),
                    range: begin..begin + trimmed.len(),
                })
            })
            .collect()
    }
}
