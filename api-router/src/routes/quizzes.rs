use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use common::{
    error::AppError,
    storage::types::{document::Document, quiz::Quiz},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

use super::{DocumentFilter, OwnerQuery};

fn default_num_questions() -> i64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct CreateQuizRequest {
    pub user_id: String,
    pub document_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_num_questions")]
    pub num_questions: i64,
}

#[derive(Debug, Serialize)]
pub struct QuizSummary {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

pub async fn create_quiz(
    State(state): State<ApiState>,
    Json(input): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let count = usize::try_from(input.num_questions)
        .ok()
        .filter(|count| *count > 0)
        .ok_or_else(|| {
            ApiError::ValidationError("num_questions must be greater than 0".to_string())
        })?;

    let document = Document::get_owned(&input.document_id, &input.user_id, &state.db).await?;

    let title = input
        .title
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| {
            format!(
                "Quiz - {} - {}",
                document.filename,
                Utc::now().format("%d/%m/%Y %H:%M")
            )
        });

    let questions = state.generator.generate_quiz(&document.id, count).await;

    let quiz = Quiz::new(input.user_id, document.id, title, questions);
    state.db.store_item(quiz.clone()).await.map_err(AppError::from)?;

    info!(
        quiz_id = %quiz.id,
        document_id = %quiz.document_id,
        total_questions = quiz.questions.len(),
        "Quiz created"
    );

    Ok(Json(json!({
        "message": "Quiz created successfully",
        "quiz_id": quiz.id,
        "total_questions": quiz.questions.len(),
        "quiz": quiz.questions,
    })))
}

pub async fn list_quizzes(
    State(state): State<ApiState>,
    Path(user_id): Path<String>,
    Query(filter): Query<DocumentFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let quizzes: Vec<QuizSummary> =
        Quiz::list_for_user(&user_id, filter.document_id.as_deref(), &state.db)
            .await?
            .into_iter()
            .map(|quiz| QuizSummary {
                id: quiz.id,
                title: quiz.title,
                created_at: quiz.created_at,
            })
            .collect();

    Ok(Json(quizzes))
}

pub async fn get_quiz(
    State(state): State<ApiState>,
    Path(quiz_id): Path<String>,
    Query(owner): Query<OwnerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let quiz = Quiz::get_owned(&quiz_id, &owner.user_id, &state.db).await?;

    Ok(Json(quiz.questions))
}

pub async fn delete_quiz(
    State(state): State<ApiState>,
    Path(quiz_id): Path<String>,
    Query(owner): Query<OwnerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Quiz::delete_owned(&quiz_id, &owner.user_id, &state.db).await?;

    Ok(Json(json!({ "message": "Quiz deleted" })))
}
