use api_state::ApiState;
use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{delete, get, post},
    Router,
};
use routes::{
    ask::ask,
    auth::{login, register},
    documents::{delete_document, list_documents},
    flashcards::{
        create_flashcards, delete_flashcard_set, get_flashcard_set, list_flashcard_sets,
    },
    liveness::{live, root},
    quizzes::{create_quiz, delete_quiz, get_quiz, list_quizzes},
    readiness::ready,
    upload::upload_pdf,
};
use tower_http::cors::CorsLayer;

pub mod api_state;
pub mod error;
mod routes;

/// Every JSON endpoint of the study service. CORS is open to any origin.
pub fn api_routes<S>(app_state: &ApiState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    // Health checks
    let health = Router::new()
        .route("/", get(root))
        .route("/ready", get(ready))
        .route("/live", get(live));

    let auth = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login));

    let documents = Router::new()
        .route(
            "/upload/pdf",
            post(upload_pdf).layer(DefaultBodyLimit::max(
                app_state.config.upload_max_body_bytes,
            )),
        )
        .route("/documents/user/{user_id}", get(list_documents))
        .route("/documents/{document_id}", delete(delete_document));

    let study = Router::new()
        .route("/flashcard/create", post(create_flashcards))
        .route("/flashcard/list/{user_id}", get(list_flashcard_sets))
        .route(
            "/flashcard/{set_id}",
            get(get_flashcard_set).delete(delete_flashcard_set),
        )
        .route("/quiz/create", post(create_quiz))
        .route("/quiz/list/{user_id}", get(list_quizzes))
        .route("/quiz/{quiz_id}", get(get_quiz).delete(delete_quiz))
        .route("/ask", post(ask));

    health
        .merge(auth)
        .merge(documents)
        .merge(study)
        .layer(CorsLayer::permissive())
}
