pub mod ask;
pub mod auth;
pub mod documents;
pub mod flashcards;
pub mod liveness;
pub mod quizzes;
pub mod readiness;
pub mod upload;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DocumentFilter {
    pub document_id: Option<String>,
}
