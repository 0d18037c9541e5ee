//! Source permission vocabulary and its mapping onto target access levels

use std::fmt;
use std::str::FromStr;

use crate::client::models::{AccessMode, GitHubPermissions};
use crate::error::MigrateError;

/// Team permission tokens GitHub reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePermission {
    Pull,
    Triage,
    Push,
    Maintain,
    Admin,
}

impl FromStr for SourcePermission {
    type Err = MigrateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pull" => Ok(SourcePermission::Pull),
            "triage" => Ok(SourcePermission::Triage),
            "push" => Ok(SourcePermission::Push),
            "maintain" => Ok(SourcePermission::Maintain),
            "admin" => Ok(SourcePermission::Admin),
            _ => Err(MigrateError::UnknownPermission(s.to_string())),
        }
    }
}

impl fmt::Display for SourcePermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourcePermission::Pull => "pull",
            SourcePermission::Triage => "triage",
            SourcePermission::Push => "push",
            SourcePermission::Maintain => "maintain",
            SourcePermission::Admin => "admin",
        };
        f.write_str(s)
    }
}

impl SourcePermission {
    /// Target access level for this permission.
    ///
    /// Gitea has no maintain level, so maintain collapses to write. Triage has
    /// no counterpart at all.
    pub fn access_mode(self) -> Result<AccessMode, MigrateError> {
        match self {
            SourcePermission::Pull => Ok(AccessMode::Read),
            SourcePermission::Push | SourcePermission::Maintain => Ok(AccessMode::Write),
            SourcePermission::Admin => Ok(AccessMode::Admin),
            SourcePermission::Triage => Err(MigrateError::UnsupportedPermission(self.to_string())),
        }
    }
}

/// Map a team permission token to a target access level.
pub fn team_access(token: &str) -> Result<AccessMode, MigrateError> {
    token.parse::<SourcePermission>()?.access_mode()
}

/// Reduce a collaborator's permission flags to a single access level.
///
/// Highest flag wins: admin, then maintain, then push, then pull. With no
/// recognized flag set the collaborator gets read access.
pub fn collaborator_access(permissions: &GitHubPermissions) -> AccessMode {
    if permissions.admin {
        AccessMode::Admin
    } else if permissions.maintain || permissions.push {
        AccessMode::Write
    } else {
        AccessMode::Read
    }
}
