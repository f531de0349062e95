use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;

use voxboard_db::Database;
use voxboard_types::api::{AddMemberRequest, BoardNameRequest, MessageResponse};
use voxboard_types::models::{Board, BoardMember, Identity};
use voxboard_types::roles::LevelSet;
use voxboard_types::validate;

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::guard::{Scope, authorize};

fn existing_board(db: &Database, board_id: i64) -> Result<Board, ApiError> {
    db.get_board(board_id)?.ok_or(ApiError::NotFound("board"))
}

/// Admins see every board; everyone else sees the boards they belong to.
pub async fn list_boards(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<Board>>, ApiError> {
    blocking(&state, move |db| {
        authorize(db, &identity, Scope::Global, LevelSet::ANY_MEMBER)?;
        let boards = if identity.is_admin() {
            db.list_all_boards()?
        } else {
            db.list_boards_for_user(identity.subject_id)?
        };
        Ok(boards)
    })
    .await
    .map(Json)
}

pub async fn create_board(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiJson(req): ApiJson<BoardNameRequest>,
) -> Result<(StatusCode, Json<Board>), ApiError> {
    let board = blocking(&state, move |db| {
        authorize(db, &identity, Scope::Global, LevelSet::ADMIN_ONLY)?;
        let name = validate::board_name(&req.name)?;
        Ok(db.create_board(name, identity.subject_id)?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(board)))
}

pub async fn get_board(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(board_id): Path<i64>,
) -> Result<Json<Board>, ApiError> {
    blocking(&state, move |db| {
        authorize(db, &identity, Scope::Board(board_id), LevelSet::ANY_MEMBER)?;
        existing_board(db, board_id)
    })
    .await
    .map(Json)
}

pub async fn update_board(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(board_id): Path<i64>,
    ApiJson(req): ApiJson<BoardNameRequest>,
) -> Result<Json<Board>, ApiError> {
    blocking(&state, move |db| {
        authorize(db, &identity, Scope::Board(board_id), LevelSet::MANAGER_OR_ADMIN)?;
        let name = validate::board_name(&req.name)?;
        if !db.rename_board(board_id, name)? {
            return Err(ApiError::NotFound("board"));
        }
        info!("Board {} renamed to {:?} by user {}", board_id, name, identity.subject_id);
        Ok(Board {
            id: board_id,
            name: name.to_string(),
        })
    })
    .await
    .map(Json)
}

pub async fn list_members(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(board_id): Path<i64>,
) -> Result<Json<Vec<BoardMember>>, ApiError> {
    blocking(&state, move |db| {
        authorize(db, &identity, Scope::Board(board_id), LevelSet::MANAGER_OR_ADMIN)?;
        existing_board(db, board_id)?;
        Ok(db.list_board_members(board_id)?)
    })
    .await
    .map(Json)
}

/// Adding an existing member again replaces their board role.
pub async fn add_member(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(board_id): Path<i64>,
    ApiJson(req): ApiJson<AddMemberRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    blocking(&state, move |db| {
        authorize(db, &identity, Scope::Board(board_id), LevelSet::MANAGER_OR_ADMIN)?;
        existing_board(db, board_id)?;
        let email = validate::email(&req.email)?.to_lowercase();
        let user = db
            .find_user_by_email(&email)?
            .ok_or(ApiError::NotFound("user"))?;

        db.add_board_member(board_id, user.id, req.role)?;
        info!(
            "User {} added {} to board {} as {}",
            identity.subject_id,
            user.email,
            board_id,
            req.role.as_str()
        );
        Ok(MessageResponse::new("member added"))
    })
    .await
    .map(Json)
}

pub async fn remove_member(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((board_id, user_id)): Path<(i64, i64)>,
) -> Result<Json<MessageResponse>, ApiError> {
    blocking(&state, move |db| {
        authorize(db, &identity, Scope::Board(board_id), LevelSet::MANAGER_OR_ADMIN)?;
        if !db.remove_board_member(board_id, user_id)? {
            return Err(ApiError::NotFound("membership"));
        }
        info!(
            "User {} removed user {} from board {}",
            identity.subject_id, user_id, board_id
        );
        Ok(MessageResponse::new("member removed"))
    })
    .await
    .map(Json)
}
