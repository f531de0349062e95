pub mod auth;
pub mod boards;
pub mod categories;
pub mod comments;
pub mod error;
pub mod extract;
pub mod feedback;
pub mod guard;
pub mod middleware;
pub mod oauth;
pub mod verifier;

use axum::{
    Json, Router, middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use serde_json::{Value, json};

use crate::auth::AppState;
use crate::error::ApiError;

/// Build the full HTTP surface. Everything except health, categories and
/// the OAuth handshake sits behind [`middleware::require_auth`].
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/categories", get(categories::list_categories))
        .route("/auth/google/login", get(auth::google_login))
        .route("/auth/google/callback", get(auth::google_callback));

    let protected_routes = Router::new()
        .route("/auth/profile", get(auth::profile))
        .route("/admin/users/{user_id}/role", put(auth::update_user_role))
        .route("/boards", get(boards::list_boards).post(boards::create_board))
        .route("/boards/{board_id}", get(boards::get_board).put(boards::update_board))
        .route(
            "/boards/{board_id}/members",
            get(boards::list_members).post(boards::add_member),
        )
        .route("/boards/{board_id}/members/{user_id}", delete(boards::remove_member))
        .route(
            "/boards/{board_id}/feedback",
            get(feedback::list_feedback).post(feedback::create_feedback),
        )
        .route("/feedback/{feedback_id}/vote", post(feedback::vote))
        .route("/feedback/{feedback_id}/status", put(feedback::update_status))
        .route(
            "/feedback/{feedback_id}/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route("/comments/{comment_id}/replies", post(comments::create_reply))
        .route("/comments/{comment_id}/reactions", post(comments::react_to_comment))
        .route("/replies/{reply_id}/reactions", post(comments::react_to_reply))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Run repository work on the blocking pool. rusqlite calls must never run
/// on the async executor.
pub(crate) async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&voxboard_db::Database) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| ApiError::Storage(anyhow::anyhow!("spawn_blocking join error: {}", e)))?
}
