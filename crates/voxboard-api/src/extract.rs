use axum::{
    Json,
    extract::{FromRequest, Request},
};

use crate::error::ApiError;

/// `Json` body extractor whose rejections (bad syntax, unknown enum
/// variants, wrong content type) come back as [`ApiError::InvalidBody`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = axum::extract::rejection::JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
