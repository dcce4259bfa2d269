use std::collections::BTreeMap;

use common::{
    error::AppError,
    storage::types::{flashcard_set::Flashcard, quiz::QuizQuestion},
};
use serde_json::Value;
use tracing::debug;

/// Removes an optional Markdown code fence (```` ``` ```` or ```` ```json ````) around the payload.
pub fn strip_code_fences(raw: &str) -> &str {
    raw.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```JSON")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

fn parse_array(raw: &str) -> Result<Vec<Value>, AppError> {
    let cleaned = strip_code_fences(raw);
    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| AppError::GenerationMalformed(format!("Failed to parse JSON: {e}")))?;

    match value {
        Value::Array(items) => Ok(items),
        other => Err(AppError::GenerationMalformed(format!(
            "expected a JSON array, got {}",
            value_kind(&other)
        ))),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn non_empty_str(item: &Value, key: &str) -> Option<String> {
    item.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Every valid flashcard in the output. Items lacking a non-empty question or
/// answer are dropped; an output with none left is malformed.
pub fn parse_flashcards(raw: &str) -> Result<Vec<Flashcard>, AppError> {
    let items = parse_array(raw)?;
    let total = items.len();

    let cards: Vec<Flashcard> = items
        .iter()
        .filter_map(|item| {
            Some(Flashcard {
                question: non_empty_str(item, "question")?,
                answer: non_empty_str(item, "answer")?,
            })
        })
        .collect();

    if cards.len() < total {
        debug!(
            dropped = total - cards.len(),
            kept = cards.len(),
            "dropped invalid flashcards"
        );
    }

    if cards.is_empty() {
        return Err(AppError::GenerationMalformed(
            "no valid flashcards in output".into(),
        ));
    }

    Ok(cards)
}

fn parse_question(item: &Value) -> Option<QuizQuestion> {
    let question = non_empty_str(item, "question")?;

    let raw_options = item.get("options")?.as_object()?;
    let mut options = BTreeMap::new();
    for (label, text) in raw_options {
        let label = label.trim();
        let text = text.as_str()?.trim();
        if label.is_empty() || text.is_empty() {
            return None;
        }
        options.insert(label.to_string(), text.to_string());
    }
    if options.is_empty() {
        return None;
    }

    let correct_answer = non_empty_str(item, "correct_answer")?;
    if !options.contains_key(&correct_answer) {
        return None;
    }

    Some(QuizQuestion {
        question,
        options,
        correct_answer,
    })
}

/// Every valid quiz question in the output. A question needs text, a non-empty
/// option map and a correct label that names one of its options.
pub fn parse_quiz(raw: &str) -> Result<Vec<QuizQuestion>, AppError> {
    let items = parse_array(raw)?;
    let total = items.len();

    let questions: Vec<QuizQuestion> = items.iter().filter_map(parse_question).collect();

    if questions.len() < total {
        debug!(
            dropped = total - questions.len(),
            kept = questions.len(),
            "dropped invalid quiz questions"
        );
    }

    if questions.is_empty() {
        return Err(AppError::GenerationMalformed(
            "no valid quiz questions in output".into(),
        ));
    }

    Ok(questions)
}
