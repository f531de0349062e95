use axum::{Json, extract::State};

use voxboard_types::models::Category;

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;

pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    blocking(&state, |db| Ok(db.list_categories()?)).await.map(Json)
}
