use std::collections::BTreeMap;

use common::storage::types::{flashcard_set::Flashcard, quiz::QuizQuestion};

const OPTION_LABELS: [&str; 4] = ["A", "B", "C", "D"];

/// Placeholder cards used when no usable material or model output exists.
pub fn fallback_flashcards(count: usize) -> Vec<Flashcard> {
    (1..=count)
        .map(|n| Flashcard {
            question: format!("Concept {n}"),
            answer: "Could not be extracted from the document".to_string(),
        })
        .collect()
}

/// Placeholder questions with options A to D. The correct label cycles with
/// the question index so output is reproducible.
pub fn fallback_quiz(count: usize) -> Vec<QuizQuestion> {
    (0..count)
        .map(|i| {
            let options: BTreeMap<String, String> = OPTION_LABELS
                .iter()
                .map(|label| ((*label).to_string(), format!("Option {label}")))
                .collect();
            let correct = OPTION_LABELS[i % OPTION_LABELS.len()];

            QuizQuestion {
                question: format!("Key concept #{} in the document?", i + 1),
                options,
                correct_answer: correct.to_string(),
            }
        })
        .collect()
}
