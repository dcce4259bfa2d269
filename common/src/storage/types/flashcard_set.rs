use crate::{error::AppError, storage::db::SurrealDbClient, stored_object};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

stored_object!(FlashcardSet, "flashcard_set", {
    user_id: String,
    document_id: String,
    title: String,
    cards: Vec<Flashcard>
});

impl FlashcardSet {
    pub fn new(user_id: String, document_id: String, title: String, cards: Vec<Flashcard>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            user_id,
            document_id,
            title,
            cards,
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
            .ok_or_else(|| AppError::NotFound("Flashcard set not found".into()))
    }

    pub async fn delete_owned(id: &str, user_id: &str, db: &SurrealDbClient) -> Result<(), AppError> {
        if db.delete_owned_item::<Self>(id, user_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Flashcard set not found".into()))
        }
    }
}
