//! Create-or-reuse operations against the target platform

use std::sync::Arc;

use log::debug;

use super::defaults::MigrationDefaults;
use super::permission::{collaborator_access, team_access};
use crate::client::TargetApi;
use crate::client::models::{
    AccessMode, CreateKeyOption, CreateOrgOption, CreateTeamOption, CreateUserOption,
    GitHubPermissions, GiteaOrg, GiteaRepo, GiteaTeam, GiteaUser, MigrateRepoOption, Visibility,
};
use crate::error::{MigrateError, Result};

/// Rejection text the target uses for an SSH key registered elsewhere
const KEY_IN_USE: &str = "key content has been used";

/// Which branch a create-or-reuse took
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provisioned<T> {
    Created(T),
    Existing(T),
}

impl<T> Provisioned<T> {
    pub fn was_created(&self) -> bool {
        matches!(self, Provisioned::Created(_))
    }

    #[cfg(test)]
    pub fn get(&self) -> &T {
        match self {
            Provisioned::Created(v) | Provisioned::Existing(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Provisioned::Created(v) | Provisioned::Existing(v) => v,
        }
    }
}

/// Result of an SSH key upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyUpload {
    Added,
    AlreadyPresent,
}

/// One repository import request
#[derive(Debug, Clone, Default)]
pub struct RepoImport {
    pub name: String,
    pub owner: String,
    pub clone_addr: String,
    pub auth_username: String,
    pub auth_token: String,
    pub private: bool,
    pub description: String,
}

impl RepoImport {
    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("repository name");
        }
        if self.owner.trim().is_empty() {
            missing.push("repository owner");
        }
        if self.clone_addr.trim().is_empty() {
            missing.push("clone address");
        }
        missing
    }
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
///
/// The replacement is one-for-one, so `"Infra/Ops!"` becomes `"Infra_Ops_"`.
pub fn sanitize_team_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Target platform operations with create-or-reuse semantics
pub struct TargetGateway<T: TargetApi> {
    api: Arc<T>,
    defaults: Arc<MigrationDefaults>,
}

impl<T: TargetApi> TargetGateway<T> {
    pub fn new(api: Arc<T>, defaults: Arc<MigrationDefaults>) -> Self {
        Self { api, defaults }
    }

    pub fn api(&self) -> &T {
        &self.api
    }

    /// Look up the organization and create it when absent.
    ///
    /// An existing organization is returned untouched, even if its description
    /// or visibility differ.
    pub async fn ensure_org(
        &self,
        name: &str,
        description: &str,
        visibility: Visibility,
    ) -> Result<Provisioned<GiteaOrg>> {
        match self.api.get_org(name).await {
            Ok(org) => {
                debug!("Reusing organization org={}", name);
                return Ok(Provisioned::Existing(org));
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let org = self
            .api
            .create_org(&CreateOrgOption {
                username: name.to_string(),
                description: description.to_string(),
                visibility,
            })
            .await?;
        Ok(Provisioned::Created(org))
    }

    /// Look up the user and create it through the admin API when absent.
    pub async fn ensure_user(
        &self,
        username: &str,
        full_name: &str,
        email: &str,
    ) -> Result<Provisioned<GiteaUser>> {
        match self.api.get_user(username).await {
            Ok(user) => return Ok(Provisioned::Existing(user)),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let user = self
            .api
            .admin_create_user(&CreateUserOption {
                source_id: self.defaults.auth_source_id,
                login_name: username.to_string(),
                username: username.to_string(),
                full_name: full_name.to_string(),
                email: email.to_string(),
                must_change_password: false,
                send_notify: false,
            })
            .await?;
        debug!("Created user user={}", username);
        Ok(Provisioned::Created(user))
    }

    /// Find a team by its sanitized name or create it.
    ///
    /// The permission is mapped before any request, so an unsupported or
    /// unknown token never reaches the network.
    pub async fn ensure_team(
        &self,
        org: &str,
        name: &str,
        description: &str,
        permission: &str,
    ) -> Result<Provisioned<GiteaTeam>> {
        let access = team_access(permission)?;
        let name = sanitize_team_name(name);

        let found = self.api.search_org_teams(org, &name).await?;
        if let Some(team) = found
            .into_iter()
            .find(|t| t.name.eq_ignore_ascii_case(&name))
        {
            debug!("Reusing team org={} team={} id={}", org, name, team.id);
            return Ok(Provisioned::Existing(team));
        }

        let team = self
            .api
            .create_team(
                org,
                &CreateTeamOption {
                    name: name.clone(),
                    description: description.to_string(),
                    permission: access,
                    units: self.defaults.team_units.clone(),
                    can_create_org_repo: access == AccessMode::Admin,
                    includes_all_repositories: false,
                },
            )
            .await?;
        Ok(Provisioned::Created(team))
    }

    pub async fn add_team_member(&self, team: &GiteaTeam, username: &str) -> Result<()> {
        self.api.add_team_member(team.id, username).await
    }

    /// Start a repository import with the full content bundle.
    pub async fn migrate_repo(&self, import: &RepoImport) -> Result<GiteaRepo> {
        let missing = import.missing_fields();
        if !missing.is_empty() {
            return Err(MigrateError::MissingRepoFields(missing).into());
        }

        let content = self.defaults.content;
        let option = MigrateRepoOption {
            clone_addr: import.clone_addr.clone(),
            repo_name: import.name.clone(),
            repo_owner: import.owner.clone(),
            service: self.defaults.service.clone(),
            auth_username: import.auth_username.clone(),
            auth_token: import.auth_token.clone(),
            private: import.private,
            description: import.description.clone(),
            mirror: false,
            wiki: content.wiki,
            issues: content.issues,
            pull_requests: content.pull_requests,
            releases: content.releases,
            labels: content.labels,
            milestones: content.milestones,
        };
        self.api.migrate_repo(&option).await
    }

    /// Grant a collaborator the access level derived from their source flags.
    pub async fn grant_collaborator(
        &self,
        owner: &str,
        repo: &str,
        username: &str,
        permissions: &GitHubPermissions,
    ) -> Result<AccessMode> {
        let access = collaborator_access(permissions);
        self.api
            .add_collaborator(owner, repo, username, access)
            .await?;
        Ok(access)
    }

    /// Upload an SSH key; a key already registered on the target is not an error.
    pub async fn upload_key(&self, username: &str, title: &str, key: &str) -> Result<KeyUpload> {
        let option = CreateKeyOption {
            title: title.to_string(),
            key: key.to_string(),
            read_only: false,
        };
        match self.api.admin_create_user_key(username, &option).await {
            Ok(()) => Ok(KeyUpload::Added),
            Err(e) if e.to_string().to_lowercase().contains(KEY_IN_USE) => {
                Ok(KeyUpload::AlreadyPresent)
            }
            Err(e) => Err(e),
        }
    }
}
