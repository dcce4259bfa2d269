#![allow(clippy::missing_docs_in_private_items)]

pub mod pipeline;

pub use pipeline::{
    assemble_context, AssemblyLimits, ContextRetriever, RetrievalConfig, RetrievalQuery,
    CONTEXT_SEPARATOR,
};

/// Context handed to generation: selected chunk texts in rank order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledContext {
    pub text: String,
    /// `chunk_index` of every selected chunk, in the order they appear in `text`.
    pub chunk_indices: Vec<usize>,
}

impl AssembledContext {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Why no usable context could be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsufficientReason {
    /// The document has no indexed chunks.
    NoMatches,
    /// The embedding backend or the vector index failed.
    Unavailable,
    /// Chunks were found but together fall below the usefulness threshold.
    TooShort,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextOutcome {
    Context(AssembledContext),
    Insufficient(InsufficientReason),
}

impl ContextOutcome {
    pub fn context(&self) -> Option<&AssembledContext> {
        match self {
            ContextOutcome::Context(context) => Some(context),
            ContextOutcome::Insufficient(_) => None,
        }
    }
}
