//! Credential Verifier: turns a bearer credential into an [`Identity`].
//!
//! The same HS256 key signs the bearer tokens issued after login and the
//! short-lived OAuth `state` tokens. The two claim shapes are disjoint, so
//! neither can be replayed as the other.

use anyhow::Context;
use axum::http::{HeaderMap, header};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::warn;

use voxboard_types::api::Claims;
use voxboard_types::models::{Identity, User};

use crate::error::ApiError;

const STATE_PURPOSE: &str = "oauth_state";
const STATE_TTL_MINUTES: i64 = 10;

#[derive(Debug, Serialize, Deserialize)]
struct StateClaims {
    purpose: String,
    iat: i64,
    exp: usize,
}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issue a bearer token carrying the user's current global role.
    pub fn issue(&self, user: &User) -> anyhow::Result<String> {
        let expires = Utc::now()
            .checked_add_signed(self.ttl)
            .context("token expiry out of range")?;
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            exp: expires.timestamp() as usize,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Fails with `InvalidCredential` on a bad signature, malformed token or
    /// expiry.
    pub fn verify(&self, token: &str) -> Result<Identity, ApiError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(|e| {
            warn!("Rejected bearer credential: {}", e);
            ApiError::InvalidCredential
        })?;
        Ok(data.claims.into())
    }

    pub fn issue_state(&self) -> anyhow::Result<String> {
        let now = Utc::now();
        let claims = StateClaims {
            purpose: STATE_PURPOSE.into(),
            iat: now.timestamp_micros(),
            exp: (now + Duration::minutes(STATE_TTL_MINUTES)).timestamp() as usize,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn verify_state(&self, state: &str) -> bool {
        decode::<StateClaims>(state, &self.decoding, &Validation::default())
            .is_ok_and(|data| data.claims.purpose == STATE_PURPOSE)
    }
}

/// Absent header is `MissingCredential`; anything present but unusable is
/// `InvalidCredential`.
pub fn bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(ApiError::MissingCredential)?;

    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::InvalidCredential)
}

pub fn verify(tokens: &TokenService, headers: &HeaderMap) -> Result<Identity, ApiError> {
    tokens.verify(bearer(headers)?)
}
