use std::collections::BTreeMap;

use crate::{error::AppError, storage::db::SurrealDbClient, stored_object};
use uuid::Uuid;

/// Multiple-choice question. `options` maps a label ("A", "B", ...) to its text
/// and `correct_answer` is one of those labels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizQuestion {
    pub question: String,
    pub options: BTreeMap<String, String>,
    pub correct_answer: String,
}

stored_object!(Quiz, "quiz", {
    user_id: String,
    document_id: String,
    title: String,
    questions: Vec<QuizQuestion>
});

impl Quiz {
    pub fn new(
        user_id: String,
        document_id: String,
        title: String,
        questions: Vec<QuizQuestion>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            user_id,
            document_id,
            title,
            questions,
        }
    }

    pub async fn list_for_user(
        user_id: &str,
        document_id: Option<&str>,
        db: &SurrealDbClient,
    ) -> Result<Vec<Self>, AppError> {
        db.list_owned_items(user_id, document_id).await
    }

    pub async fn get_owned(id: &str, user_id: &str, db: &SurrealDbClient) -> Result<Self, AppError> {
        db.get_owned_item(id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Quiz not found".into()))
    }

    pub async fn delete_owned(id: &str, user_id: &str, db: &SurrealDbClient) -> Result<(), AppError> {
        if db.delete_owned_item::<Self>(id, user_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Quiz not found".into()))
        }
    }
}
