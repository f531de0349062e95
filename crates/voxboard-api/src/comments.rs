use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use voxboard_types::api::{ContentRequest, CreatedResponse, ReactRequest, ReactResponse};
use voxboard_types::models::{Comment, Identity};
use voxboard_types::reaction::{Polarity, ReactionTarget};
use voxboard_types::roles::LevelSet;
use voxboard_types::validate;

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::feedback::authorize_target;

pub async fn list_comments(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(feedback_id): Path<i64>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    blocking(&state, move |db| {
        authorize_target(db, &identity, ReactionTarget::Feedback(feedback_id), LevelSet::ANY_MEMBER)?;
        Ok(db.list_comments(feedback_id, identity.subject_id)?)
    })
    .await
    .map(Json)
}

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(feedback_id): Path<i64>,
    ApiJson(req): ApiJson<ContentRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let id = blocking(&state, move |db| {
        authorize_target(db, &identity, ReactionTarget::Feedback(feedback_id), LevelSet::ANY_MEMBER)?;
        let content = validate::comment(&req.content)?;
        Ok(db.create_comment(feedback_id, identity.subject_id, content)?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn create_reply(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(comment_id): Path<i64>,
    ApiJson(req): ApiJson<ContentRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let id = blocking(&state, move |db| {
        authorize_target(db, &identity, ReactionTarget::Comment(comment_id), LevelSet::ANY_MEMBER)?;
        let content = validate::comment(&req.content)?;
        Ok(db.create_reply(comment_id, identity.subject_id, content)?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn react_to_comment(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(comment_id): Path<i64>,
    ApiJson(req): ApiJson<ReactRequest>,
) -> Result<Json<ReactResponse>, ApiError> {
    react(state, identity, ReactionTarget::Comment(comment_id), req).await
}

pub async fn react_to_reply(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(reply_id): Path<i64>,
    ApiJson(req): ApiJson<ReactRequest>,
) -> Result<Json<ReactResponse>, ApiError> {
    react(state, identity, ReactionTarget::Reply(reply_id), req).await
}

async fn react(
    state: AppState,
    identity: Identity,
    target: ReactionTarget,
    req: ReactRequest,
) -> Result<Json<ReactResponse>, ApiError> {
    blocking(&state, move |db| {
        authorize_target(db, &identity, target, LevelSet::ANY_MEMBER)?;
        let outcome =
            db.toggle_reaction(target, identity.subject_id, Polarity::from_is_like(req.is_like))?;
        Ok(ReactResponse::from(outcome))
    })
    .await
    .map(Json)
}
