#![allow(clippy::missing_docs_in_private_items)]

pub mod config;
pub mod fallback;
pub mod generator;
pub mod parsing;
pub mod prompts;

pub use config::GenerationConfig;
pub use generator::{StudyGenerator, ANSWER_FAILED, ANSWER_NOT_FOUND};
