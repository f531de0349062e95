use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use voxboard_db::reactions::ToggleError;
use voxboard_types::api::ErrorResponse;
use voxboard_types::validate::ValidationError;

/// Every way a request can fail. Validation and authorization failures are
/// reported in full; storage and provider failures are logged and surfaced
/// as an opaque message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing bearer credential")]
    MissingCredential,
    #[error("invalid or expired credential")]
    InvalidCredential,
    #[error("insufficient permission")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    BadRequest(&'static str),
    #[error("invalid request body: {0}")]
    InvalidBody(String),
    #[error("request conflicted with a concurrent update, retry")]
    Conflict,
    #[error("identity provider request failed")]
    Provider(#[source] anyhow::Error),
    #[error("internal server error")]
    Storage(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingCredential | Self::InvalidCredential => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::BadRequest(_) | Self::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Conflict => StatusCode::CONFLICT,
            Self::Provider(_) => StatusCode::BAD_GATEWAY,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ToggleError> for ApiError {
    fn from(err: ToggleError) -> Self {
        match err {
            ToggleError::TargetNotFound(target) => Self::NotFound(target.kind()),
            ToggleError::Conflict => Self::Conflict,
            ToggleError::Storage(e) => Self::Storage(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Storage(e) => error!("Storage error: {:#}", e),
            Self::Provider(e) => warn!("Identity provider error: {:#}", e),
            _ => {}
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxboard_types::reaction::ReactionTarget;

    #[test]
    fn taxonomy_maps_to_status_codes() {
        assert_eq!(ApiError::MissingCredential.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidCredential.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::from(ValidationError::EmptyBoardName).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::from(ToggleError::Conflict).status(), StatusCode::CONFLICT);
    }

    #[test]
    fn storage_detail_is_not_leaked() {
        let err = ApiError::from(anyhow::anyhow!("disk I/O error at /var/lib/voxboard.db"));
        assert_eq!(err.to_string(), "internal server error");
    }

    #[test]
    fn missing_toggle_target_names_its_kind() {
        let err = ApiError::from(ToggleError::TargetNotFound(ReactionTarget::Reply(3)));
        assert_eq!(err.to_string(), "reply not found");
    }
}
