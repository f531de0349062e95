use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::Duration;
use tracing::info;

use voxboard_db::Database;
use voxboard_db::users::NewUser;
use voxboard_types::api::{
    LoginResponse, LoginUrlResponse, OAuthCallbackQuery, ProfileResponse, UpdateRoleRequest,
};
use voxboard_types::models::{Identity, User};
use voxboard_types::roles::{GlobalRole, LevelSet};

use crate::blocking;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::guard::{Scope, authorize};
use crate::oauth::{GoogleConfig, GoogleOAuth, ProviderProfile};
use crate::verifier::TokenService;

pub type AppState = Arc<AppStateInner>;

/// Authentication settings, built once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    /// Lowercased emails that become app_admin on first login.
    pub admin_emails: Vec<String>,
    pub google: GoogleConfig,
}

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenService,
    pub google: GoogleOAuth,
    pub admin_emails: Vec<String>,
}

impl AppStateInner {
    pub fn new(db: Database, auth: AuthConfig) -> AppState {
        Arc::new(Self {
            db,
            tokens: TokenService::new(&auth.jwt_secret, auth.token_ttl),
            google: GoogleOAuth::new(auth.google),
            admin_emails: auth.admin_emails,
        })
    }
}

pub async fn google_login(State(state): State<AppState>) -> Result<Json<LoginUrlResponse>, ApiError> {
    if !state.google.is_configured() {
        return Err(ApiError::BadRequest("OAuth login is not configured"));
    }
    let login_state = state.tokens.issue_state()?;
    let url = state.google.authorize_url(&login_state)?;
    Ok(Json(LoginUrlResponse { url }))
}

pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<Json<LoginResponse>, ApiError> {
    let code = query.code.ok_or(ApiError::BadRequest("missing authorization code"))?;
    let login_state = query.state.ok_or(ApiError::BadRequest("missing state"))?;
    if !state.tokens.verify_state(&login_state) {
        return Err(ApiError::InvalidCredential);
    }

    let profile = state.google.exchange(&code).await.map_err(ApiError::Provider)?;

    let app = state.clone();
    blocking(&state, move |db| complete_login(db, &app.tokens, &app.admin_emails, &profile))
        .await
        .map(Json)
}

/// Find or create the user behind a provider profile and issue a bearer
/// token. Emails listed in `admin_emails` are created as app_admin; an
/// existing user keeps the role they already have.
pub fn complete_login(
    db: &Database,
    tokens: &TokenService,
    admin_emails: &[String],
    profile: &ProviderProfile,
) -> Result<LoginResponse, ApiError> {
    let email = voxboard_types::validate::email(&profile.email)?.to_lowercase();
    let role = if admin_emails.iter().any(|admin| *admin == email) {
        GlobalRole::AppAdmin
    } else {
        GlobalRole::User
    };
    let name = if profile.name.trim().is_empty() { email.as_str() } else { profile.name.trim() };

    let user = db.find_or_create_user(&NewUser {
        email: &email,
        name,
        picture: &profile.picture,
        provider: "google",
        role,
    })?;
    let token = tokens.issue(&user)?;
    info!("User {} logged in as {}", user.email, user.role.as_str());

    Ok(LoginResponse {
        token,
        name: user.name,
        email: user.email,
    })
}

pub async fn profile(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<ProfileResponse>, ApiError> {
    blocking(&state, move |db| {
        let user = db
            .get_user(identity.subject_id)?
            .ok_or(ApiError::NotFound("user"))?;
        let board_roles = db.board_roles_for_user(user.id)?;
        Ok(ProfileResponse { user, board_roles })
    })
    .await
    .map(Json)
}

pub async fn update_user_role(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<i64>,
    ApiJson(req): ApiJson<UpdateRoleRequest>,
) -> Result<Json<User>, ApiError> {
    blocking(&state, move |db| {
        authorize(db, &identity, Scope::Global, LevelSet::ADMIN_ONLY)?;
        if !db.update_user_role(user_id, req.role)? {
            return Err(ApiError::NotFound("user"));
        }
        info!(
            "User {} set global role of user {} to {}",
            identity.subject_id,
            user_id,
            req.role.as_str()
        );
        db.get_user(user_id)?.ok_or(ApiError::NotFound("user"))
    })
    .await
    .map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(email: &str) -> ProviderProfile {
        ProviderProfile {
            email: email.into(),
            name: "Grace".into(),
            picture: String::new(),
        }
    }

    #[test]
    fn listed_email_bootstraps_admin() {
        let db = Database::open_in_memory().unwrap();
        let tokens = TokenService::new("test-secret", Duration::hours(1));
        let admins = vec!["boss@example.com".to_string()];

        let login = complete_login(&db, &tokens, &admins, &profile("Boss@Example.com")).unwrap();
        let identity = tokens.verify(&login.token).unwrap();
        assert_eq!(identity.global_role, GlobalRole::AppAdmin);
        assert_eq!(login.email, "boss@example.com");

        let login = complete_login(&db, &tokens, &admins, &profile("dev@example.com")).unwrap();
        assert_eq!(tokens.verify(&login.token).unwrap().global_role, GlobalRole::User);
    }

    #[test]
    fn repeat_login_reuses_user_and_keeps_role() {
        let db = Database::open_in_memory().unwrap();
        let tokens = TokenService::new("test-secret", Duration::hours(1));

        let first = complete_login(&db, &tokens, &[], &profile("dev@example.com")).unwrap();
        let id = tokens.verify(&first.token).unwrap().subject_id;
        db.update_user_role(id, GlobalRole::Stakeholder).unwrap();

        let second = complete_login(&db, &tokens, &[], &profile("dev@example.com")).unwrap();
        let identity = tokens.verify(&second.token).unwrap();
        assert_eq!(identity.subject_id, id);
        assert_eq!(identity.global_role, GlobalRole::Stakeholder);
    }

    #[test]
    fn empty_provider_email_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let tokens = TokenService::new("test-secret", Duration::hours(1));
        let err = complete_login(&db, &tokens, &[], &profile("  ")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
