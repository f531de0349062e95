use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{FeedbackStatus, Identity, User};
use crate::reaction::{Polarity, ToggleOutcome, VoteType};
use crate::roles::{BoardRole, GlobalRole};

// -- JWT Claims --

/// Bearer token claims. `sub` is the numeric user id, serialized as a
/// number everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub name: String,
    pub role: GlobalRole,
    pub exp: usize,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            subject_id: claims.sub,
            email: claims.email,
            name: claims.name,
            global_role: claims.role,
        }
    }
}

// -- Auth --

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginUrlResponse {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: User,
    pub board_roles: BTreeMap<i64, BoardRole>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRoleRequest {
    pub role: GlobalRole,
}

// -- Boards --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoardNameRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddMemberRequest {
    pub email: String,
    pub role: BoardRole,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

// -- Feedback --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateFeedbackRequest {
    pub title: String,
    pub description: String,
    pub category_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateStatusRequest {
    pub status: FeedbackStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub id: i64,
    pub status: FeedbackStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VoteRequest {
    pub vote_type: VoteType,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub feedback_id: i64,
    pub vote: Option<VoteType>,
    pub upvotes: i64,
    pub downvotes: i64,
}

impl VoteResponse {
    pub fn new(feedback_id: i64, outcome: ToggleOutcome) -> Self {
        Self {
            feedback_id,
            vote: outcome.current.map(VoteType::from),
            upvotes: outcome.counters.positive,
            downvotes: outcome.counters.negative,
        }
    }
}

// -- Comments --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReactRequest {
    pub is_like: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactResponse {
    pub is_liked: bool,
    pub is_disliked: bool,
    pub likes: i64,
    pub dislikes: i64,
}

impl From<ToggleOutcome> for ReactResponse {
    fn from(outcome: ToggleOutcome) -> Self {
        Self {
            is_liked: outcome.current == Some(Polarity::Positive),
            is_disliked: outcome.current == Some(Polarity::Negative),
            likes: outcome.counters.positive,
            dislikes: outcome.counters.negative,
        }
    }
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
