use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use common::{
    error::AppError,
    storage::types::{document::Document, flashcard_set::FlashcardSet},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

use super::{DocumentFilter, OwnerQuery};

pub const MAX_CARDS: i64 = 20;

fn default_num_cards() -> i64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct CreateFlashcardsRequest {
    pub user_id: String,
    pub document_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_num_cards")]
    pub num_cards: i64,
}

#[derive(Debug, Serialize)]
pub struct FlashcardSetSummary {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

pub async fn create_flashcards(
    State(state): State<ApiState>,
    Json(input): Json<CreateFlashcardsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let count = usize::try_from(input.num_cards)
        .ok()
        .filter(|_| (1..=MAX_CARDS).contains(&input.num_cards))
        .ok_or_else(|| {
            ApiError::ValidationError(format!("num_cards must be between 1 and {MAX_CARDS}"))
        })?;

    let document = Document::get_owned(&input.document_id, &input.user_id, &state.db).await?;

    let title = input
        .title
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| {
            format!(
                "Flashcard - {} - {}",
                document.filename,
                Utc::now().format("%d/%m/%Y %H:%M")
            )
        });

    let cards = state
        .generator
        .generate_flashcards(&document.id, count)
        .await;

    let set = FlashcardSet::new(input.user_id, document.id, title, cards);
    state.db.store_item(set.clone()).await.map_err(AppError::from)?;

    info!(
        set_id = %set.id,
        document_id = %set.document_id,
        total_cards = set.cards.len(),
        "Flashcard set created"
    );

    Ok(Json(json!({
        "message": "Flashcard created successfully",
        "set_id": set.id,
        "total_cards": set.cards.len(),
        "cards": set.cards,
    })))
}

pub async fn list_flashcard_sets(
    State(state): State<ApiState>,
    Path(user_id): Path<String>,
    Query(filter): Query<DocumentFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let sets: Vec<FlashcardSetSummary> =
        FlashcardSet::list_for_user(&user_id, filter.document_id.as_deref(), &state.db)
            .await?
            .into_iter()
            .map(|set| FlashcardSetSummary {
                id: set.id,
                title: set.title,
                created_at: set.created_at,
            })
            .collect();

    Ok(Json(sets))
}

pub async fn get_flashcard_set(
    State(state): State<ApiState>,
    Path(set_id): Path<String>,
    Query(owner): Query<OwnerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let set = FlashcardSet::get_owned(&set_id, &owner.user_id, &state.db).await?;

    Ok(Json(json!({
        "set_id": set.id,
        "total_cards": set.cards.len(),
        "cards": set.cards,
    })))
}

pub async fn delete_flashcard_set(
    State(state): State<ApiState>,
    Path(set_id): Path<String>,
    Query(owner): Query<OwnerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    FlashcardSet::delete_owned(&set_id, &owner.user_id, &state.db).await?;

    Ok(Json(json!({ "message": "Flashcard set deleted" })))
}
