//! Role Resolver and Authorization Guard.
//!
//! The credential has already been verified by [`crate::middleware::require_auth`]
//! by the time a handler runs; the handler passes the verified [`Identity`]
//! here together with the scope of the operation and the levels it admits.

use anyhow::Result;
use tracing::debug;

use voxboard_db::Database;
use voxboard_types::models::Identity;
use voxboard_types::roles::{BoardRole, GlobalRole, LevelSet, PermissionLevel};

use crate::error::ApiError;

/// Where board memberships come from.
pub trait MembershipSource {
    fn board_role(&self, subject_id: i64, board_id: i64) -> Result<Option<BoardRole>>;
}

impl MembershipSource for Database {
    fn board_role(&self, subject_id: i64, board_id: i64) -> Result<Option<BoardRole>> {
        Database::board_role(self, subject_id, board_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Not tied to a board, e.g. listing one's own boards.
    Global,
    Board(i64),
}

/// Effective permission level of `identity` for `scope`.
///
/// An app_admin is `Admin` everywhere without consulting memberships.
pub fn resolve<M: MembershipSource + ?Sized>(
    members: &M,
    identity: &Identity,
    scope: Scope,
) -> Result<PermissionLevel> {
    if identity.global_role == GlobalRole::AppAdmin {
        return Ok(PermissionLevel::Admin);
    }

    match scope {
        Scope::Global => Ok(match identity.global_role {
            GlobalRole::Stakeholder => PermissionLevel::Manager,
            _ => PermissionLevel::Member,
        }),
        Scope::Board(board_id) => Ok(members
            .board_role(identity.subject_id, board_id)?
            .map_or(PermissionLevel::Denied, PermissionLevel::from)),
    }
}

/// Admit the operation when the resolved level is in `required`.
pub fn authorize<M: MembershipSource + ?Sized>(
    members: &M,
    identity: &Identity,
    scope: Scope,
    required: LevelSet,
) -> Result<PermissionLevel, ApiError> {
    let level = resolve(members, identity, scope)?;
    let admitted = required.contains(level);
    debug!(subject_id = identity.subject_id, ?scope, ?level, admitted, "Guard decision");

    if admitted { Ok(level) } else { Err(ApiError::Forbidden) }
}
