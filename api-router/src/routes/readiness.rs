use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::api_state::ApiState;

fn check<E>(result: &Result<(), E>) -> &'static str {
    if result.is_ok() {
        "ok"
    } else {
        "fail"
    }
}

/// Readiness probe: 200 once the record store and the vector collection answer, else 503.
pub async fn ready(State(state): State<ApiState>) -> impl IntoResponse {
    let db = state.db.client.query("RETURN true").await.map(|_| ());
    let index = state.index.ping().await;
    let checks = json!({ "db": check(&db), "index": check(&index) });

    let reason = match (db, index) {
        (Ok(()), Ok(())) => {
            return (StatusCode::OK, Json(json!({ "status": "ok", "checks": checks })));
        }
        (Err(e), _) => e.to_string(),
        (_, Err(e)) => e.to_string(),
    };

    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
            "status": "error",
            "checks": checks,
            "reason": reason
        })),
    )
}
