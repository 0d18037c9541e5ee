//! Source platform API trait

use async_trait::async_trait;

use crate::client::models::{GitHubKey, GitHubOrg, GitHubRepo, GitHubTeam, GitHubUser};
use crate::error::Result;

/// Read access to the source platform (GitHub)
///
/// Every `list_*` method returns the complete, deduplicated listing. A failure
/// on any page fails the whole call.
#[async_trait]
pub trait SourceApi: Send + Sync {
    // ========================================================================
    // Users
    // ========================================================================

    /// The user owning the access token
    async fn current_user(&self) -> Result<GitHubUser>;

    /// Full profile of a user by login
    async fn get_user(&self, login: &str) -> Result<GitHubUser>;

    /// Public SSH keys of a user
    async fn list_user_keys(&self, login: &str) -> Result<Vec<GitHubKey>>;

    // ========================================================================
    // Organizations
    // ========================================================================

    /// Organization metadata
    async fn get_org(&self, org: &str) -> Result<GitHubOrg>;

    /// Organization members (summary records, without profile details)
    async fn list_org_members(&self, org: &str) -> Result<Vec<GitHubUser>>;

    /// Role of a member within the organization (`admin` or `member`)
    async fn get_org_role(&self, org: &str, login: &str) -> Result<String>;

    // ========================================================================
    // Teams
    // ========================================================================

    async fn list_org_teams(&self, org: &str) -> Result<Vec<GitHubTeam>>;

    async fn list_team_members(&self, org: &str, team_slug: &str) -> Result<Vec<GitHubUser>>;

    /// Repositories the team has access to
    async fn list_team_repos(&self, org: &str, team_slug: &str) -> Result<Vec<GitHubRepo>>;

    // ========================================================================
    // Repositories
    // ========================================================================

    async fn list_org_repos(&self, org: &str) -> Result<Vec<GitHubRepo>>;

    /// Collaborators of a repository, with their `type` and permission flags
    async fn list_repo_collaborators(&self, owner: &str, repo: &str)
    -> Result<Vec<GitHubUser>>;
}
