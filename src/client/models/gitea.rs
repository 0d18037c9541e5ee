//! Gitea REST API models

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Organization visibility on Gitea
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Limited,
    #[default]
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Visibility::Public => "public",
            Visibility::Limited => "limited",
            Visibility::Private => "private",
        };
        f.write_str(s)
    }
}

impl FromStr for Visibility {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "limited" => Ok(Visibility::Limited),
            "private" => Ok(Visibility::Private),
            other => Err(ConfigError::Invalid(format!(
                "unknown visibility '{}', expected public, limited or private",
                other
            ))),
        }
    }
}

/// Access level vocabulary of Gitea teams and collaborators
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    None,
    #[default]
    Read,
    Write,
    Admin,
    Owner,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccessMode::None => "none",
            AccessMode::Read => "read",
            AccessMode::Write => "write",
            AccessMode::Admin => "admin",
            AccessMode::Owner => "owner",
        };
        f.write_str(s)
    }
}

/// Gitea user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GiteaUser {
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub login: String,

    #[serde(default)]
    pub full_name: String,

    #[serde(default)]
    pub email: String,
}

/// Gitea organization
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GiteaOrg {
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub full_name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

/// Gitea team
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GiteaTeam {
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<AccessMode>,

    #[serde(default)]
    pub units: Vec<String>,

    #[serde(default)]
    pub can_create_org_repo: bool,
}

/// Envelope returned by the team search endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamSearchResults {
    #[serde(default)]
    pub data: Vec<GiteaTeam>,

    #[serde(default)]
    pub ok: bool,
}

/// Gitea repository
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GiteaRepo {
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub full_name: String,

    #[serde(default)]
    pub private: bool,
}

/// Request body for `POST /orgs`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateOrgOption {
    pub username: String,
    pub description: String,
    pub visibility: Visibility,
}

/// Request body for `POST /admin/users`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateUserOption {
    pub source_id: i64,
    pub login_name: String,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub must_change_password: bool,
    pub send_notify: bool,
}

/// Request body for `POST /orgs/{org}/teams`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateTeamOption {
    pub name: String,
    pub description: String,
    pub permission: AccessMode,
    pub units: Vec<String>,
    pub can_create_org_repo: bool,
    pub includes_all_repositories: bool,
}

/// Request body for `PUT /repos/{owner}/{repo}/collaborators/{user}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddCollaboratorOption {
    pub permission: AccessMode,
}

/// Request body for `POST /repos/migrate`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MigrateRepoOption {
    pub clone_addr: String,
    pub repo_name: String,
    pub repo_owner: String,
    pub service: String,
    pub auth_username: String,
    pub auth_token: String,
    pub private: bool,
    pub description: String,
    pub mirror: bool,
    pub wiki: bool,
    pub issues: bool,
    pub pull_requests: bool,
    pub releases: bool,
    pub labels: bool,
    pub milestones: bool,
}

/// Request body for `POST /admin/users/{user}/keys`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateKeyOption {
    pub title: String,
    pub key: String,
    pub read_only: bool,
}
