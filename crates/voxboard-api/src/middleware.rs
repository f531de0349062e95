use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::verifier;

/// Verify the bearer credential and hand the resulting `Identity` to the
/// handler as a request extension. Identity is re-derived from the token on
/// every request; no caller-supplied identity header is read.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = verifier::verify(&state.tokens, req.headers())?;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
