use std::{sync::Arc, time::Instant};

use common::{
    error::AppError,
    storage::types::{flashcard_set::Flashcard, quiz::QuizQuestion},
    utils::llm::CompletionService,
};
use retrieval_pipeline::{AssembledContext, ContextOutcome, ContextRetriever};
use tracing::{info, warn};

use crate::{
    config::GenerationConfig,
    fallback::{fallback_flashcards, fallback_quiz},
    parsing::{parse_flashcards, parse_quiz},
    prompts,
};

pub const ANSWER_NOT_FOUND: &str = "This information was not found in the document.";
pub const ANSWER_FAILED: &str = "Could not generate an answer right now. Please try again.";

/// Turns retrieved context into flashcards, quizzes and answers. Every method
/// returns a usable result; failures degrade to fallbacks and are logged.
#[derive(Clone)]
pub struct StudyGenerator {
    retriever: ContextRetriever,
    completion: Arc<dyn CompletionService>,
    config: GenerationConfig,
}

impl StudyGenerator {
    pub fn new(
        retriever: ContextRetriever,
        completion: Arc<dyn CompletionService>,
        config: GenerationConfig,
    ) -> Self {
        Self {
            retriever,
            completion,
            config,
        }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    async fn context(&self, document_id: &str, query: &str, k: usize) -> Option<AssembledContext> {
        let query = self.retriever.query(document_id, query).with_k(k);
        match self.retriever.retrieve(&query).await {
            ContextOutcome::Context(context) => Some(context),
            ContextOutcome::Insufficient(reason) => {
                info!(document_id, ?reason, "insufficient context, using fallback");
                None
            }
        }
    }

    #[tracing::instrument(skip(self), fields(task = "flashcards"))]
    pub async fn generate_flashcards(&self, document_id: &str, count: usize) -> Vec<Flashcard> {
        let started = Instant::now();
        let Some(context) = self
            .context(
                document_id,
                prompts::FLASHCARD_RETRIEVAL_QUERY,
                self.config.flashcard_k,
            )
            .await
        else {
            return fallback_flashcards(count);
        };

        let prompt = prompts::flashcard_prompt(count, context.as_str());
        let parsed = self
            .completion
            .complete(&prompt, self.config.flashcard_temperature)
            .await
            .and_then(|raw| parse_flashcards(&raw));

        let cards = settle(parsed, count, fallback_flashcards, document_id, "flashcards");
        info!(
            document_id,
            card_count = cards.len(),
            elapsed_ms = elapsed_ms(started),
            "flashcards generated"
        );
        cards
    }

    #[tracing::instrument(skip(self), fields(task = "quiz"))]
    pub async fn generate_quiz(&self, document_id: &str, count: usize) -> Vec<QuizQuestion> {
        let started = Instant::now();
        let Some(context) = self
            .context(document_id, prompts::QUIZ_RETRIEVAL_QUERY, self.config.quiz_k)
            .await
        else {
            return fallback_quiz(count);
        };

        let material = truncate_chars(context.as_str(), self.config.quiz_context_char_limit);
        let prompt = prompts::quiz_prompt(count, material);
        let parsed = self
            .completion
            .complete(&prompt, self.config.quiz_temperature)
            .await
            .and_then(|raw| parse_quiz(&raw));

        let questions = settle(parsed, count, fallback_quiz, document_id, "quiz");
        info!(
            document_id,
            question_count = questions.len(),
            elapsed_ms = elapsed_ms(started),
            "quiz generated"
        );
        questions
    }

    #[tracing::instrument(skip(self, question), fields(task = "answer"))]
    pub async fn answer_question(&self, document_id: &str, question: &str) -> String {
        let query = prompts::answer_retrieval_query(question);
        let Some(context) = self
            .context(document_id, &query, self.retriever.config().k)
            .await
        else {
            return ANSWER_NOT_FOUND.to_string();
        };

        let prompt = prompts::answer_prompt(question, context.as_str());
        match self
            .completion
            .complete(&prompt, self.config.answer_temperature)
            .await
        {
            Ok(answer) if !answer.trim().is_empty() => answer,
            Ok(_) => {
                warn!(document_id, "empty answer from completion service");
                ANSWER_FAILED.to_string()
            }
            Err(err) => {
                warn!(document_id, error = %err, "answer generation failed");
                ANSWER_FAILED.to_string()
            }
        }
    }
}

/// Parsed items truncated to `count`, or the fallback when nothing usable came back.
fn settle<T>(
    parsed: Result<Vec<T>, AppError>,
    count: usize,
    fallback: fn(usize) -> Vec<T>,
    document_id: &str,
    task: &'static str,
) -> Vec<T> {
    match parsed {
        Ok(mut items) => {
            if items.len() < count {
                info!(
                    document_id,
                    task,
                    requested = count,
                    received = items.len(),
                    "model returned fewer items than requested"
                );
            }
            items.truncate(count);
            items
        }
        Err(err) => {
            warn!(document_id, task, error = %err, "generation failed, using fallback");
            fallback(count)
        }
    }
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use common::{
        storage::{
            db::SurrealDbClient,
            vector_index::{ChunkMetadata, IndexedEntry, VectorIndex},
        },
        utils::embedding::EmbeddingProvider,
    };
    use retrieval_pipeline::RetrievalConfig;
    use uuid::Uuid;

    struct ScriptedCompletion {
        reply: Option<String>,
        calls: Mutex<Vec<(String, f32)>>,
    }

    impl ScriptedCompletion {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(reply.to_string()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, f32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionService for ScriptedCompletion {
        async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, AppError> {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), temperature));
            self.reply
                .clone()
                .ok_or_else(|| AppError::InternalError("completion backend down".into()))
        }
    }

    fn fact(i: usize) -> String {
        format!("Fact number {i:02} states that concept {i:02} is defined by property {i:02}.")
    }

    async fn generator_with(
        completion: Arc<ScriptedCompletion>,
        facts: usize,
        config: GenerationConfig,
    ) -> StudyGenerator {
        let db = SurrealDbClient::memory("generation_test", &Uuid::new_v4().to_string())
            .await
            .expect("memory db");
        let index = VectorIndex::new(Arc::new(db), "documents").expect("collection");
        index.ensure_initialized().await.expect("init");

        let provider = Arc::new(EmbeddingProvider::new_hashed(64));
        let texts: Vec<String> = (0..facts).map(fact).collect();
        if !texts.is_empty() {
            let embeddings = provider.embed_batch(texts.clone()).await.expect("embed");
            let entries = texts
                .into_iter()
                .zip(embeddings)
                .enumerate()
                .map(|(idx, (text, embedding))| IndexedEntry {
                    metadata: ChunkMetadata {
                        document_id: "1".into(),
                        chunk_index: idx,
                        byte_start: 0,
                        byte_end: text.len(),
                    },
                    text,
                    embedding,
                })
                .collect();
            index.insert(entries).await.expect("insert");
        }

        let retriever = ContextRetriever::new(provider, index, RetrievalConfig::default());
        StudyGenerator::new(retriever, completion, config)
    }

    fn flashcards_json(n: usize) -> String {
        let items: Vec<String> = (1..=n)
            .map(|i| format!(r#"{{"question": "Q{i}", "answer": "A{i}"}}"#))
            .collect();
        format!("[{}]", items.join(","))
    }

    fn quiz_json(n: usize) -> String {
        let items: Vec<String> = (1..=n)
            .map(|i| {
                format!(
                    r#"{{"question": "Q{i}", "options": {{"A": "a{i}", "B": "b{i}", "C": "c{i}", "D": "d{i}"}}, "correct_answer": "C"}}"#
                )
            })
            .collect();
        format!("[{}]", items.join(","))
    }

    #[tokio::test]
    async fn insufficient_context_yields_exact_fallback_without_calling_model() {
        let completion = ScriptedCompletion::replying(&flashcards_json(3));
        let generator = generator_with(completion.clone(), 0, GenerationConfig::default()).await;

        let cards = generator.generate_flashcards("1", 5).await;
        assert_eq!(cards, fallback_flashcards(5));

        let quiz = generator.generate_quiz("1", 4).await;
        assert_eq!(quiz, fallback_quiz(4));

        assert!(completion.calls().is_empty());
    }

    #[tokio::test]
    async fn truncated_json_falls_back_to_requested_count() {
        let completion = ScriptedCompletion::replying(r#"[{"question": "Q1", "answer": "A"#);
        let generator = generator_with(completion.clone(), 6, GenerationConfig::default()).await;

        let cards = generator.generate_flashcards("1", 7).await;
        assert_eq!(cards.len(), 7);
        assert_eq!(cards[0].question, "Concept 1");
        assert_eq!(completion.calls().len(), 1);
    }

    #[tokio::test]
    async fn completion_failure_falls_back() {
        let completion = ScriptedCompletion::failing();
        let generator = generator_with(completion, 6, GenerationConfig::default()).await;

        let quiz = generator.generate_quiz("1", 3).await;
        assert_eq!(quiz, fallback_quiz(3));
    }

    #[tokio::test]
    async fn over_delivery_is_truncated_and_under_delivery_kept() {
        let completion = ScriptedCompletion::replying(&format!(
            "```json\n{}\n```",
            flashcards_json(12)
        ));
        let generator = generator_with(completion, 6, GenerationConfig::default()).await;
        let cards = generator.generate_flashcards("1", 10).await;
        assert_eq!(cards.len(), 10);
        assert_eq!(cards[9].question, "Q10");

        let completion = ScriptedCompletion::replying(&flashcards_json(2));
        let generator = generator_with(completion, 6, GenerationConfig::default()).await;
        let cards = generator.generate_flashcards("1", 10).await;
        assert_eq!(cards.len(), 2);
    }

    #[tokio::test]
    async fn parsed_quiz_is_truncated_to_requested_count() {
        let completion =
            ScriptedCompletion::replying(&format!("```json\n{}\n```", quiz_json(12)));
        let generator = generator_with(completion, 12, GenerationConfig::default()).await;

        let quiz = generator.generate_quiz("1", 10).await;
        assert_eq!(quiz.len(), 10);
        assert_eq!(quiz[0].question, "Q1");
        assert_eq!(quiz[9].question, "Q10");
        assert_eq!(quiz[0].correct_answer, "C");
        assert_eq!(quiz[0].options.len(), 4);
        assert_ne!(quiz, fallback_quiz(10));
    }

    #[tokio::test]
    async fn uses_task_depth_and_temperature() {
        let completion = ScriptedCompletion::replying(&flashcards_json(1));
        let generator = generator_with(completion.clone(), 12, GenerationConfig::default()).await;

        generator.generate_flashcards("1", 1).await;
        let quiz = generator.generate_quiz("1", 1).await;
        assert_eq!(quiz, fallback_quiz(1));

        let calls = completion.calls();
        assert_eq!(calls.len(), 2);

        let facts_in = |prompt: &str| (0..12).filter(|i| prompt.contains(&fact(*i))).count();
        assert_eq!(facts_in(&calls[0].0), 8);
        assert!((calls[0].1 - 0.15).abs() < f32::EPSILON);
        assert_eq!(facts_in(&calls[1].0), 10);
        assert!((calls[1].1 - 0.3).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn quiz_context_is_capped() {
        let completion = ScriptedCompletion::replying("[]");
        let config = GenerationConfig {
            quiz_context_char_limit: 50,
            ..GenerationConfig::default()
        };
        let generator = generator_with(completion.clone(), 6, config).await;

        generator.generate_quiz("1", 2).await;
        let calls = completion.calls();
        assert_eq!(calls.len(), 1);
        assert!((0..6).all(|i| !calls[0].0.contains(&fact(i))));
    }

    #[tokio::test]
    async fn answers_degrade_to_fixed_messages() {
        let completion = ScriptedCompletion::replying("Concept 03 is defined by property 03.");
        let generator = generator_with(completion.clone(), 6, GenerationConfig::default()).await;
        let answer = generator.answer_question("1", "What defines concept 03?").await;
        assert_eq!(answer, "Concept 03 is defined by property 03.");
        let calls = completion.calls();
        assert!(calls[0].0.contains("What defines concept 03?"));
        assert!((calls[0].1 - 0.1).abs() < f32::EPSILON);

        let answer = generator.answer_question("2", "Anything?").await;
        assert_eq!(answer, ANSWER_NOT_FOUND);

        let generator = generator_with(
            ScriptedCompletion::failing(),
            6,
            GenerationConfig::default(),
        )
        .await;
        let answer = generator.answer_question("1", "What defines concept 03?").await;
        assert_eq!(answer, ANSWER_FAILED);
    }

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate_chars("Định nghĩa", 4), "Định");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
