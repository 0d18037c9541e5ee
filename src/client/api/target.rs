//! Target platform API trait

use async_trait::async_trait;

use crate::client::models::{
    AccessMode, CreateKeyOption, CreateOrgOption, CreateTeamOption, CreateUserOption, GiteaOrg,
    GiteaRepo, GiteaTeam, GiteaUser, MigrateRepoOption,
};
use crate::error::Result;

/// Raw operations against the target platform (Gitea)
///
/// These map one-to-one onto API calls. Create-or-reuse semantics live in
/// [`TargetGateway`](crate::migrate::TargetGateway), which is built on top of
/// this trait. Lookups report a missing entity as `ApiError::NotFound`.
#[async_trait]
pub trait TargetApi: Send + Sync {
    // ========================================================================
    // Users
    // ========================================================================

    /// The user owning the access token
    async fn current_user(&self) -> Result<GiteaUser>;

    async fn get_user(&self, username: &str) -> Result<GiteaUser>;

    /// Create an account through the admin API
    async fn admin_create_user(&self, option: &CreateUserOption) -> Result<GiteaUser>;

    /// Add an SSH public key to a user's account through the admin API
    async fn admin_create_user_key(&self, username: &str, option: &CreateKeyOption) -> Result<()>;

    // ========================================================================
    // Organizations & Teams
    // ========================================================================

    async fn get_org(&self, name: &str) -> Result<GiteaOrg>;

    async fn create_org(&self, option: &CreateOrgOption) -> Result<GiteaOrg>;

    /// Search teams of an organization by name
    async fn search_org_teams(&self, org: &str, query: &str) -> Result<Vec<GiteaTeam>>;

    async fn create_team(&self, org: &str, option: &CreateTeamOption) -> Result<GiteaTeam>;

    /// Add a user to a team. Adding an existing member succeeds.
    async fn add_team_member(&self, team_id: i64, username: &str) -> Result<()>;

    // ========================================================================
    // Repositories
    // ========================================================================

    /// Start a repository import from a remote clone address
    async fn migrate_repo(&self, option: &MigrateRepoOption) -> Result<GiteaRepo>;

    async fn add_collaborator(
        &self,
        owner: &str,
        repo: &str,
        username: &str,
        permission: AccessMode,
    ) -> Result<()>;
}
