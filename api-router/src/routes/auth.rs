use axum::{extract::State, response::IntoResponse, Json};
use common::storage::types::user::User;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

pub async fn register(
    State(state): State<ApiState>,
    Json(input): Json<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    let user = User::register(&input.username, &input.password, &state.db).await?;
    info!(user_id = %user.id, "User registered");

    Ok(Json(json!({ "message": "Registered successfully" })))
}

pub async fn login(
    State(state): State<ApiState>,
    Json(input): Json<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    let user = User::authenticate(&input.username, &input.password, &state.db).await?;

    Ok(Json(json!({ "id": user.id, "username": user.username })))
}
