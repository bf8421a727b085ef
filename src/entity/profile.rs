// src/entity/profile.rs
use serde::{Deserialize, Serialize};

use super::{Record, RecordBase};
use crate::error::{ClefError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    User,
    Accueil,
    Flce,
    Admin,
    SuperAdmin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "USER"),
            Role::Accueil => write!(f, "ACCUEIL"),
            Role::Flce => write!(f, "FLCE"),
            Role::Admin => write!(f, "ADMIN"),
            Role::SuperAdmin => write!(f, "SUPER_ADMIN"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "user" => Ok(Role::User),
            "accueil" => Ok(Role::Accueil),
            "flce" => Ok(Role::Flce),
            "admin" => Ok(Role::Admin),
            "super_admin" | "superadmin" => Ok(Role::SuperAdmin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// User administration operations gated by role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Create,
    Update,
    Delete,
}

impl UserAction {
    /// Roles allowed to perform this action
    pub fn allowed_roles(self) -> &'static [Role] {
        match self {
            UserAction::Create => &[Role::Accueil, Role::Admin, Role::SuperAdmin],
            UserAction::Update | UserAction::Delete => &[Role::Admin, Role::SuperAdmin],
        }
    }
}

impl std::fmt::Display for UserAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserAction::Create => write!(f, "create users"),
            UserAction::Update => write!(f, "update users"),
            UserAction::Delete => write!(f, "delete users"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDetails {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub base: RecordBase,
    #[serde(flatten)]
    pub details: ProfileDetails,
}

impl Record for UserProfile {
    const KIND: &'static str = "profile";
    type Fields = ProfileDetails;

    fn from_parts(base: RecordBase, fields: ProfileDetails) -> Self {
        Self {
            base,
            details: fields,
        }
    }

    fn base(&self) -> &RecordBase {
        &self.base
    }

    fn fields(&self) -> &ProfileDetails {
        &self.details
    }
}

/// Linear permission check: the caller's role must be in the action's list.
/// A caller without a profile is always refused.
pub fn require_role(profile: Option<&ProfileDetails>, action: UserAction) -> Result<()> {
    let role = match profile {
        Some(p) => p.role,
        None => {
            return Err(ClefError::PermissionDenied {
                role: "none".to_string(),
                action: action.to_string(),
            })
        }
    };

    if action.allowed_roles().contains(&role) {
        Ok(())
    } else {
        Err(ClefError::PermissionDenied {
            role: role.to_string(),
            action: action.to_string(),
        })
    }
}
