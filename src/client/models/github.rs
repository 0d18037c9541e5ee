//! GitHub REST API models
//!
//! Only the attributes the migration reads are modelled. Attributes GitHub may
//! omit are `Option` and read through accessors that substitute empty values.

use serde::{Deserialize, Serialize};

/// Principal type GitHub reports for human accounts.
pub const USER_TYPE: &str = "User";

/// GitHub user, organization member, team member or repository collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubUser {
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub login: String,

    /// Display name (profile endpoint only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Public email (profile endpoint only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Principal type: User, Bot, Organization
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,

    /// Repository permissions (collaborator listings only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<GitHubPermissions>,
}

impl GitHubUser {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn email(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }

    pub fn user_type(&self) -> &str {
        self.user_type.as_deref().unwrap_or_default()
    }

    /// Whether this principal is a human account rather than a bot or org.
    pub fn is_user(&self) -> bool {
        self.user_type() == USER_TYPE
    }
}

/// Per-repository permission flags of a collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubPermissions {
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub maintain: bool,
    #[serde(default)]
    pub push: bool,
    #[serde(default)]
    pub triage: bool,
    #[serde(default)]
    pub pull: bool,
}

/// GitHub organization
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubOrg {
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub login: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl GitHubOrg {
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

/// Organization membership of a user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubMembership {
    /// admin or member
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// active or pending
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// GitHub team
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubTeam {
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub slug: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// pull, triage, push, maintain or admin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
}

impl GitHubTeam {
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn permission(&self) -> &str {
        self.permission.as_deref().unwrap_or_default()
    }
}

/// Repository owner reference
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubOwner {
    #[serde(default)]
    pub login: String,
}

/// GitHub repository
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubRepo {
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub full_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<GitHubOwner>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clone_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub private: bool,
}

impl GitHubRepo {
    pub fn owner_login(&self) -> &str {
        self.owner.as_ref().map(|o| o.login.as_str()).unwrap_or_default()
    }

    pub fn clone_url(&self) -> &str {
        self.clone_url.as_deref().unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

/// Public SSH key of a user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubKey {
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub key: String,

    /// Only present on authenticated-user endpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}
