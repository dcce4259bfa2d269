use common::storage::vector_index::SearchHit;
use tracing::error;

use super::config::CONTEXT_SEPARATOR;
use crate::{AssembledContext, ContextOutcome, InsufficientReason};

/// Limits applied while assembling.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyLimits {
    pub min_chunk_chars: usize,
    pub max_context_chars: usize,
    pub min_context_chars: usize,
}

/// Builds the prompt context from ranked hits.
///
/// Hits are taken in order. Short hits and hits belonging to another document
/// are skipped. Selection stops once the selected text reaches
/// `max_context_chars`; the chunk that crosses the budget is kept whole, so the
/// overshoot is bounded by one chunk.
pub fn assemble_context(
    document_id: &str,
    hits: &[SearchHit],
    limits: AssemblyLimits,
) -> ContextOutcome {
    if hits.is_empty() {
        return ContextOutcome::Insufficient(InsufficientReason::NoMatches);
    }

    let mut selected: Vec<&str> = Vec::new();
    let mut chunk_indices = Vec::new();
    let mut total_chars = 0usize;

    for hit in hits {
        if hit.metadata.document_id != document_id {
            error!(
                requested = %document_id,
                returned = %hit.metadata.document_id,
                chunk_index = hit.metadata.chunk_index,
                "vector search returned a chunk of another document; discarding"
            );
            continue;
        }

        let text = hit.text.trim();
        let chars = text.chars().count();
        if chars == 0 || chars < limits.min_chunk_chars {
            continue;
        }

        selected.push(text);
        chunk_indices.push(hit.metadata.chunk_index);
        total_chars = total_chars.saturating_add(chars);

        if total_chars >= limits.max_context_chars {
            break;
        }
    }

    let text = selected.join(CONTEXT_SEPARATOR);
    let context_chars = text.chars().count();

    if context_chars < limits.min_context_chars || selected.is_empty() {
        return ContextOutcome::Insufficient(InsufficientReason::TooShort);
    }

    ContextOutcome::Context(AssembledContext {
        text,
        chunk_indices,
    })
}
