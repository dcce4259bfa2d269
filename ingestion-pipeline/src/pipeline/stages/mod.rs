use std::time::Duration;

use common::{
    error::AppError,
    storage::vector_index::{ChunkMetadata, IndexedEntry},
};
use state_machines::core::GuardError;
use tokio_retry::{
    strategy::{jitter, ExponentialBackoff},
    Retry,
};
use tracing::{debug, info, instrument, warn};

use super::{
    config::IndexingTuning,
    context::{Chunk, IndexingContext},
    state::{Chunked, Embedded, IndexingMachine, Persisted, Ready},
};

#[instrument(level = "trace", skip_all, fields(document_id = %ctx.document_id))]
pub fn chunk_text(
    machine: IndexingMachine<(), Ready>,
    ctx: &mut IndexingContext<'_>,
    text: &str,
) -> Result<IndexingMachine<(), Chunked>, AppError> {
    let chunks: Vec<Chunk> = ctx
        .services
        .split(text)
        .into_iter()
        .enumerate()
        .map(|(chunk_index, segment)| Chunk {
            document_id: ctx.document_id.to_string(),
            chunk_index,
            text: segment.text,
            range: segment.range,
        })
        .collect();

    if chunks.is_empty() {
        return Err(AppError::NoIndexableContent(ctx.document_id.to_string()));
    }

    debug!(
        document_id = %ctx.document_id,
        text_chars = text.chars().count(),
        chunk_count = chunks.len(),
        "document chunked"
    );

    ctx.chunks = chunks;

    machine
        .chunk()
        .map_err(|(_, guard)| map_guard_error("chunk", &guard))
}

#[instrument(level = "trace", skip_all, fields(document_id = %ctx.document_id))]
pub async fn embed_chunks(
    machine: IndexingMachine<(), Chunked>,
    ctx: &mut IndexingContext<'_>,
) -> Result<IndexingMachine<(), Embedded>, AppError> {
    let tuning = &ctx.pipeline_config.tuning;
    let services = ctx.services;
    let batch_size = tuning.embedding_batch_size.max(1);
    let mut entries = Vec::with_capacity(ctx.chunks.len());

    for (batch_index, batch) in ctx.chunks.chunks(batch_size).enumerate() {
        let texts: Vec<String> = batch.iter().map(|chunk| chunk.text.clone()).collect();
        let texts_ref = &texts;
        let document_id = ctx.document_id;

        let embeddings = Retry::spawn(retry_strategy(tuning), || {
            let inputs = texts_ref.clone();
            async move {
                services.embed_batch(inputs).await.inspect_err(|err| {
                    warn!(
                        document_id = %document_id,
                        batch_index,
                        error = %err,
                        "embedding batch failed"
                    );
                })
            }
        })
        .await?;

        if embeddings.len() != batch.len() {
            return Err(AppError::Processing(format!(
                "embedding backend returned {} vectors for {} chunks",
                embeddings.len(),
                batch.len()
            )));
        }

        entries.extend(batch.iter().zip(embeddings).map(|(chunk, embedding)| {
            IndexedEntry {
                text: chunk.text.clone(),
                metadata: ChunkMetadata {
                    document_id: chunk.document_id.clone(),
                    chunk_index: chunk.chunk_index,
                    byte_start: chunk.range.start,
                    byte_end: chunk.range.end,
                },
                embedding,
            }
        }));

        debug!(
            document_id = %ctx.document_id,
            batch_index,
            batch_len = batch.len(),
            "embedding batch ready"
        );
    }

    ctx.entries = entries;

    machine
        .embed()
        .map_err(|(_, guard)| map_guard_error("embed", &guard))
}

/// Writes one transaction per batch. A failure leaves earlier batches in place.
#[instrument(level = "trace", skip_all, fields(document_id = %ctx.document_id))]
pub async fn persist_entries(
    machine: IndexingMachine<(), Embedded>,
    ctx: &mut IndexingContext<'_>,
) -> Result<(IndexingMachine<(), Persisted>, usize), AppError> {
    let batch_size = ctx.pipeline_config.tuning.embedding_batch_size.max(1);
    let entries = std::mem::take(&mut ctx.entries);
    let mut written = 0usize;

    for batch in entries.chunks(batch_size) {
        ctx.services.insert_batch(batch.to_vec()).await.inspect_err(|err| {
            warn!(
                document_id = %ctx.document_id,
                written,
                error = %err,
                "chunk batch write failed; earlier batches remain indexed"
            );
        })?;
        written += batch.len();
    }

    info!(
        document_id = %ctx.document_id,
        chunk_count = written,
        "document chunks persisted"
    );

    let machine = machine
        .persist()
        .map_err(|(_, guard)| map_guard_error("persist", &guard))?;

    Ok((machine, written))
}

fn retry_strategy(tuning: &IndexingTuning) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(tuning.retry_base_delay_ms.max(1) / 2 + 1)
        .max_delay(Duration::from_millis(tuning.retry_max_delay_ms))
        .map(jitter)
        .take(tuning.embedding_attempts.saturating_sub(1))
}

fn map_guard_error(event: &str, guard: &GuardError) -> AppError {
    AppError::InternalError(format!(
        "invalid indexing pipeline transition during {event}: {guard:?}"
    ))
}
