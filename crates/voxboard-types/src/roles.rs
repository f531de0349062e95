use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-wide role, carried in the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlobalRole {
    AppAdmin,
    Stakeholder,
    User,
}

impl GlobalRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AppAdmin => "app_admin",
            Self::Stakeholder => "stakeholder",
            Self::User => "user",
        }
    }
}

/// Per-board membership role. Only consulted for non-admin subjects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardRole {
    Stakeholder,
    User,
}

impl BoardRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stakeholder => "stakeholder",
            Self::User => "user",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for GlobalRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "app_admin" => Ok(Self::AppAdmin),
            "stakeholder" => Ok(Self::Stakeholder),
            "user" => Ok(Self::User),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl FromStr for BoardRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stakeholder" => Ok(Self::Stakeholder),
            "user" => Ok(Self::User),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Effective permission for one operation after combining the global role
/// with the board membership (if any).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionLevel {
    Denied,
    Member,
    Manager,
    Admin,
}

impl PermissionLevel {
    const fn bit(self) -> u8 {
        match self {
            Self::Denied => 0b0001,
            Self::Member => 0b0010,
            Self::Manager => 0b0100,
            Self::Admin => 0b1000,
        }
    }
}

impl From<BoardRole> for PermissionLevel {
    fn from(role: BoardRole) -> Self {
        match role {
            BoardRole::Stakeholder => Self::Manager,
            BoardRole::User => Self::Member,
        }
    }
}

/// The set of levels an operation admits. Membership is tested per level,
/// so `MANAGER_OR_ADMIN` does not admit a plain `Member`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSet(u8);

impl LevelSet {
    pub const ADMIN_ONLY: Self = Self::of(&[PermissionLevel::Admin]);
    pub const MANAGER_OR_ADMIN: Self =
        Self::of(&[PermissionLevel::Manager, PermissionLevel::Admin]);
    pub const ANY_MEMBER: Self = Self::of(&[
        PermissionLevel::Member,
        PermissionLevel::Manager,
        PermissionLevel::Admin,
    ]);

    pub const fn of(levels: &[PermissionLevel]) -> Self {
        let mut mask = 0;
        let mut i = 0;
        while i < levels.len() {
            mask |= levels[i].bit();
            i += 1;
        }
        Self(mask)
    }

    pub const fn contains(self, level: PermissionLevel) -> bool {
        self.0 & level.bit() != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_strings_round_trip() {
        for role in [GlobalRole::AppAdmin, GlobalRole::Stakeholder, GlobalRole::User] {
            assert_eq!(role.as_str().parse::<GlobalRole>().unwrap(), role);
        }
        assert!("admin".parse::<GlobalRole>().is_err());
        assert!("app_admin".parse::<BoardRole>().is_err());
    }

    #[test]
    fn unknown_strings_name_the_rejected_value() {
        use crate::models::FeedbackStatus;
        use crate::reaction::VoteType;

        assert_eq!(
            "admin".parse::<GlobalRole>().unwrap_err().to_string(),
            "unknown role 'admin'"
        );
        assert_eq!(
            "sideways".parse::<VoteType>().unwrap_err().to_string(),
            "unknown vote type 'sideways'"
        );
        assert_eq!(
            "shipped".parse::<FeedbackStatus>().unwrap_err().to_string(),
            "unknown feedback status 'shipped'"
        );
    }

    #[test]
    fn denied_is_never_admitted() {
        for set in [LevelSet::ADMIN_ONLY, LevelSet::MANAGER_OR_ADMIN, LevelSet::ANY_MEMBER] {
            assert!(!set.contains(PermissionLevel::Denied));
        }
    }

    #[test]
    fn manager_gate_rejects_member() {
        assert!(!LevelSet::MANAGER_OR_ADMIN.contains(PermissionLevel::Member));
        assert!(LevelSet::MANAGER_OR_ADMIN.contains(PermissionLevel::Manager));
        assert!(LevelSet::MANAGER_OR_ADMIN.contains(PermissionLevel::Admin));
        assert!(!LevelSet::ADMIN_ONLY.contains(PermissionLevel::Manager));
    }

    #[test]
    fn board_role_maps_to_level() {
        assert_eq!(PermissionLevel::from(BoardRole::Stakeholder), PermissionLevel::Manager);
        assert_eq!(PermissionLevel::from(BoardRole::User), PermissionLevel::Member);
    }

    #[test]
    fn serde_uses_snake_case() {
        assert_eq!(serde_json::to_string(&GlobalRole::AppAdmin).unwrap(), "\"app_admin\"");
        let role: BoardRole = serde_json::from_str("\"stakeholder\"").unwrap();
        assert_eq!(role, BoardRole::Stakeholder);
    }
}
