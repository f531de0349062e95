use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use voxboard_db::Database;
use voxboard_db::feedback::NewFeedback;
use voxboard_types::api::{
    CreateFeedbackRequest, StatusResponse, UpdateStatusRequest, VoteRequest, VoteResponse,
};
use voxboard_types::models::{Feedback, Identity};
use voxboard_types::reaction::ReactionTarget;
use voxboard_types::roles::LevelSet;
use voxboard_types::validate::{self, ValidationError};

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::guard::{Scope, authorize};

/// Authorize `identity` on the board that owns `target`.
pub(crate) fn authorize_target(
    db: &Database,
    identity: &Identity,
    target: ReactionTarget,
    required: LevelSet,
) -> Result<i64, ApiError> {
    let board_id = db
        .board_for_target(target)?
        .ok_or(ApiError::NotFound(target.kind()))?;
    authorize(db, identity, Scope::Board(board_id), required)?;
    Ok(board_id)
}

pub async fn list_feedback(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(board_id): Path<i64>,
) -> Result<Json<Vec<Feedback>>, ApiError> {
    blocking(&state, move |db| {
        authorize(db, &identity, Scope::Board(board_id), LevelSet::ANY_MEMBER)?;
        db.get_board(board_id)?.ok_or(ApiError::NotFound("board"))?;
        Ok(db.list_feedback(board_id, Some(identity.subject_id))?)
    })
    .await
    .map(Json)
}

pub async fn create_feedback(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(board_id): Path<i64>,
    ApiJson(req): ApiJson<CreateFeedbackRequest>,
) -> Result<(StatusCode, Json<Feedback>), ApiError> {
    let feedback = blocking(&state, move |db| {
        authorize(db, &identity, Scope::Board(board_id), LevelSet::ANY_MEMBER)?;
        let (title, description) = validate::feedback(&req.title, &req.description, req.category_id)?;
        db.get_board(board_id)?.ok_or(ApiError::NotFound("board"))?;
        if !db.category_exists(req.category_id)? {
            return Err(ValidationError::InvalidCategory(req.category_id).into());
        }

        Ok(db.create_feedback(&NewFeedback {
            board_id,
            title,
            description,
            category_id: req.category_id,
        })?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(feedback)))
}

/// Toggle the caller's vote. Repeating a vote removes it; the opposite vote
/// switches it.
pub async fn vote(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(feedback_id): Path<i64>,
    ApiJson(req): ApiJson<VoteRequest>,
) -> Result<Json<VoteResponse>, ApiError> {
    blocking(&state, move |db| {
        let target = ReactionTarget::Feedback(feedback_id);
        authorize_target(db, &identity, target, LevelSet::ANY_MEMBER)?;
        let outcome = db.toggle_reaction(target, identity.subject_id, req.vote_type.into())?;
        Ok(VoteResponse::new(feedback_id, outcome))
    })
    .await
    .map(Json)
}

/// Any status may follow any other.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(feedback_id): Path<i64>,
    ApiJson(req): ApiJson<UpdateStatusRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    blocking(&state, move |db| {
        let target = ReactionTarget::Feedback(feedback_id);
        authorize_target(db, &identity, target, LevelSet::MANAGER_OR_ADMIN)?;
        if !db.update_feedback_status(feedback_id, req.status)? {
            return Err(ApiError::NotFound("feedback"));
        }
        Ok(StatusResponse {
            id: feedback_id,
            status: req.status,
        })
    })
    .await
    .map(Json)
}
