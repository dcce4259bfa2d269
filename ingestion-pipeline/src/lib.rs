#![allow(clippy::missing_docs_in_private_items, clippy::result_large_err)]

pub mod chunker;
pub mod document_ingestion;
pub mod pipeline;
pub mod utils;

pub use chunker::{ChunkSegment, ChunkingConfig, TextChunker};
pub use document_ingestion::{DocumentIngestion, IngestedDocument, UploadedPdf};
pub use pipeline::{Chunk, IndexingConfig, IndexingPipeline, IndexingTuning};
