//! In-memory platform clients for testing
//!
//! [`MockSource`] serves a canned GitHub organization. [`MockTarget`] behaves
//! like a small Gitea instance: lookups answer `NotFound` until an entity is
//! created, creates reject duplicates, and every call is counted so tests can
//! assert which branch of a create-or-reuse was taken.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::api::{SourceApi, TargetApi};
use super::models::{
    AccessMode, CreateKeyOption, CreateOrgOption, CreateTeamOption, CreateUserOption, GitHubKey,
    GitHubOrg, GitHubRepo, GitHubTeam, GitHubUser, GiteaOrg, GiteaRepo, GiteaTeam, GiteaUser,
    MigrateRepoOption, USER_TYPE,
};
use crate::error::{ApiError, Result};

/// Message Gitea answers with when an SSH key is already registered.
pub const KEY_IN_USE_MESSAGE: &str = "Key content has been used as non-deploy key";

/// Build a summary GitHub user of type `User`.
pub fn gh_user(login: &str) -> GitHubUser {
    GitHubUser {
        id: login.bytes().map(i64::from).sum(),
        login: login.to_string(),
        user_type: Some(USER_TYPE.to_string()),
        ..Default::default()
    }
}

/// Build a GitHub repository owned by `org`.
pub fn gh_repo(org: &str, name: &str) -> GitHubRepo {
    GitHubRepo {
        id: format!("{}/{}", org, name).bytes().map(i64::from).sum(),
        name: name.to_string(),
        full_name: format!("{}/{}", org, name),
        owner: Some(super::models::GitHubOwner {
            login: org.to_string(),
        }),
        clone_url: Some(format!("https://github.com/{}/{}.git", org, name)),
        description: Some(format!("{} repository", name)),
        private: true,
    }
}

// ============================================================================
// MockSource
// ============================================================================

#[derive(Default)]
struct SourceState {
    current_user: Option<GitHubUser>,
    profiles: HashMap<String, GitHubUser>,
    orgs: HashMap<String, GitHubOrg>,
    members: HashMap<String, Vec<GitHubUser>>,
    roles: HashMap<String, String>,
    teams: HashMap<String, Vec<GitHubTeam>>,
    team_members: HashMap<String, Vec<GitHubUser>>,
    team_repos: HashMap<String, Vec<GitHubRepo>>,
    repos: HashMap<String, Vec<GitHubRepo>>,
    collaborators: HashMap<String, Vec<GitHubUser>>,
    keys: HashMap<String, Vec<GitHubKey>>,
    failures: HashSet<String>,
    calls: HashMap<&'static str, usize>,
}

/// Mock source platform.
///
/// # Example
/// ```ignore
/// let source = MockSource::new()
///     .with_org("acme", "Acme Corp").await
///     .with_repos("acme", vec![gh_repo("acme", "api")]).await
///     .failing("get_user", "bob").await;
/// ```
#[derive(Clone, Default)]
pub struct MockSource {
    state: Arc<Mutex<SourceState>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_current_user(self, login: &str) -> Self {
        self.state.lock().await.current_user = Some(gh_user(login));
        self
    }

    /// Register a full profile returned by `get_user`.
    pub async fn with_profile(self, user: GitHubUser) -> Self {
        self.state
            .lock()
            .await
            .profiles
            .insert(user.login.clone(), user);
        self
    }

    pub async fn with_org(self, login: &str, description: &str) -> Self {
        self.state.lock().await.orgs.insert(
            login.to_string(),
            GitHubOrg {
                id: 1,
                login: login.to_string(),
                name: None,
                description: Some(description.to_string()),
            },
        );
        self
    }

    pub async fn with_members(self, org: &str, members: Vec<GitHubUser>) -> Self {
        self.state
            .lock()
            .await
            .members
            .insert(org.to_string(), members);
        self
    }

    /// Set the organization role `get_org_role` reports for `login`.
    pub async fn with_role(self, login: &str, role: &str) -> Self {
        self.state
            .lock()
            .await
            .roles
            .insert(login.to_string(), role.to_string());
        self
    }

    pub async fn with_team(
        self,
        org: &str,
        team: GitHubTeam,
        members: Vec<GitHubUser>,
        repos: Vec<GitHubRepo>,
    ) -> Self {
        {
            let mut state = self.state.lock().await;
            state.team_members.insert(team.slug.clone(), members);
            state.team_repos.insert(team.slug.clone(), repos);
            state.teams.entry(org.to_string()).or_default().push(team);
        }
        self
    }

    pub async fn with_repos(self, org: &str, repos: Vec<GitHubRepo>) -> Self {
        self.state.lock().await.repos.insert(org.to_string(), repos);
        self
    }

    pub async fn with_collaborators(self, owner: &str, repo: &str, users: Vec<GitHubUser>) -> Self {
        self.state
            .lock()
            .await
            .collaborators
            .insert(format!("{}/{}", owner, repo), users);
        self
    }

    pub async fn with_keys(self, login: &str, keys: Vec<GitHubKey>) -> Self {
        self.state
            .lock()
            .await
            .keys
            .insert(login.to_string(), keys);
        self
    }

    /// Make `operation` fail for `subject` (a login, slug, org or repo name).
    pub async fn failing(self, operation: &str, subject: &str) -> Self {
        self.state
            .lock()
            .await
            .failures
            .insert(format!("{}:{}", operation, subject));
        self
    }

    /// Number of calls made to `operation`.
    pub async fn calls(&self, operation: &str) -> usize {
        self.state
            .lock()
            .await
            .calls
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    async fn enter(&self, operation: &'static str, subject: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        *state.calls.entry(operation).or_default() += 1;
        if state.failures.contains(&format!("{}:{}", operation, subject)) {
            return Err(ApiError::ServerError(format!("{} failed for {}", operation, subject)).into());
        }
        Ok(())
    }
}

#[async_trait]
impl SourceApi for MockSource {
    async fn current_user(&self) -> Result<GitHubUser> {
        self.enter("current_user", "").await?;
        self.state
            .lock()
            .await
            .current_user
            .clone()
            .ok_or_else(|| ApiError::Unauthorized.into())
    }

    async fn get_user(&self, login: &str) -> Result<GitHubUser> {
        self.enter("get_user", login).await?;
        let state = self.state.lock().await;
        Ok(state
            .profiles
            .get(login)
            .cloned()
            .unwrap_or_else(|| gh_user(login)))
    }

    async fn list_user_keys(&self, login: &str) -> Result<Vec<GitHubKey>> {
        self.enter("list_user_keys", login).await?;
        Ok(self
            .state
            .lock()
            .await
            .keys
            .get(login)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_org(&self, org: &str) -> Result<GitHubOrg> {
        self.enter("get_org", org).await?;
        self.state
            .lock()
            .await
            .orgs
            .get(org)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("/orgs/{}", org)).into())
    }

    async fn list_org_members(&self, org: &str) -> Result<Vec<GitHubUser>> {
        self.enter("list_org_members", org).await?;
        Ok(self
            .state
            .lock()
            .await
            .members
            .get(org)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_org_role(&self, _org: &str, login: &str) -> Result<String> {
        self.enter("get_org_role", login).await?;
        Ok(self
            .state
            .lock()
            .await
            .roles
            .get(login)
            .cloned()
            .unwrap_or_else(|| "member".to_string()))
    }

    async fn list_org_teams(&self, org: &str) -> Result<Vec<GitHubTeam>> {
        self.enter("list_org_teams", org).await?;
        Ok(self
            .state
            .lock()
            .await
            .teams
            .get(org)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_team_members(&self, _org: &str, team_slug: &str) -> Result<Vec<GitHubUser>> {
        self.enter("list_team_members", team_slug).await?;
        Ok(self
            .state
            .lock()
            .await
            .team_members
            .get(team_slug)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_team_repos(&self, _org: &str, team_slug: &str) -> Result<Vec<GitHubRepo>> {
        self.enter("list_team_repos", team_slug).await?;
        Ok(self
            .state
            .lock()
            .await
            .team_repos
            .get(team_slug)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_org_repos(&self, org: &str) -> Result<Vec<GitHubRepo>> {
        self.enter("list_org_repos", org).await?;
        Ok(self
            .state
            .lock()
            .await
            .repos
            .get(org)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_repo_collaborators(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<GitHubUser>> {
        self.enter("list_repo_collaborators", repo).await?;
        Ok(self
            .state
            .lock()
            .await
            .collaborators
            .get(&format!("{}/{}", owner, repo))
            .cloned()
            .unwrap_or_default())
    }
}

// ============================================================================
// MockTarget
// ============================================================================

/// A collaborator grant recorded by [`MockTarget`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub owner: String,
    pub repo: String,
    pub username: String,
    pub permission: AccessMode,
}

struct TargetState {
    current_user: Option<GiteaUser>,
    orgs: Vec<GiteaOrg>,
    users: Vec<GiteaUser>,
    created_users: Vec<CreateUserOption>,
    teams: HashMap<String, Vec<GiteaTeam>>,
    team_members: HashMap<i64, BTreeSet<String>>,
    grants: Vec<Grant>,
    migrations: Vec<MigrateRepoOption>,
    keys: HashMap<String, Vec<CreateKeyOption>>,
    failures: HashSet<String>,
    stalls: HashMap<String, Duration>,
    calls: HashMap<&'static str, usize>,
    next_id: i64,
}

impl Default for TargetState {
    fn default() -> Self {
        Self {
            current_user: Some(GiteaUser {
                id: 1,
                login: "root".to_string(),
                full_name: "Site Admin".to_string(),
                email: "root@example.com".to_string(),
            }),
            orgs: Vec::new(),
            users: Vec::new(),
            created_users: Vec::new(),
            teams: HashMap::new(),
            team_members: HashMap::new(),
            grants: Vec::new(),
            migrations: Vec::new(),
            keys: HashMap::new(),
            failures: HashSet::new(),
            stalls: HashMap::new(),
            calls: HashMap::new(),
            next_id: 100,
        }
    }
}

impl TargetState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn has_user(&self, username: &str) -> bool {
        self.users
            .iter()
            .any(|u| u.login.eq_ignore_ascii_case(username))
    }
}

/// Mock target platform with Gitea-like create/lookup semantics.
#[derive(Clone, Default)]
pub struct MockTarget {
    state: Arc<Mutex<TargetState>>,
}

impl MockTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `current_user` fail as with a bad token.
    pub async fn unauthenticated(self) -> Self {
        self.state.lock().await.current_user = None;
        self
    }

    pub async fn with_org(self, name: &str) -> Self {
        {
            let mut state = self.state.lock().await;
            let id = state.next_id();
            state.orgs.push(GiteaOrg {
                id,
                name: name.to_string(),
                ..Default::default()
            });
        }
        self
    }

    pub async fn with_user(self, login: &str) -> Self {
        {
            let mut state = self.state.lock().await;
            let id = state.next_id();
            state.users.push(GiteaUser {
                id,
                login: login.to_string(),
                ..Default::default()
            });
        }
        self
    }

    pub async fn with_team(self, org: &str, name: &str) -> Self {
        {
            let mut state = self.state.lock().await;
            let id = state.next_id();
            state.teams.entry(org.to_string()).or_default().push(GiteaTeam {
                id,
                name: name.to_string(),
                ..Default::default()
            });
        }
        self
    }

    /// Register an SSH key already present on the instance.
    pub async fn with_key(self, username: &str, key: &str) -> Self {
        self.state
            .lock()
            .await
            .keys
            .entry(username.to_string())
            .or_default()
            .push(CreateKeyOption {
                title: "existing".to_string(),
                key: key.to_string(),
                read_only: false,
            });
        self
    }

    /// Make `operation` fail for `subject` (a name, login or repo name).
    pub async fn failing(self, operation: &str, subject: &str) -> Self {
        self.state
            .lock()
            .await
            .failures
            .insert(format!("{}:{}", operation, subject));
        self
    }

    /// Make `operation` hang for `delay` before answering for `subject`.
    pub async fn stalling(self, operation: &str, subject: &str, delay: Duration) -> Self {
        self.state
            .lock()
            .await
            .stalls
            .insert(format!("{}:{}", operation, subject), delay);
        self
    }

    /// Number of calls made to `operation`.
    pub async fn calls(&self, operation: &str) -> usize {
        self.state
            .lock()
            .await
            .calls
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    pub async fn orgs(&self) -> Vec<GiteaOrg> {
        self.state.lock().await.orgs.clone()
    }

    pub async fn users(&self) -> Vec<GiteaUser> {
        self.state.lock().await.users.clone()
    }

    /// Request bodies of every user creation
    pub async fn created_users(&self) -> Vec<CreateUserOption> {
        self.state.lock().await.created_users.clone()
    }

    pub async fn teams(&self, org: &str) -> Vec<GiteaTeam> {
        self.state
            .lock()
            .await
            .teams
            .get(org)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn team_members(&self, team_id: i64) -> Vec<String> {
        self.state
            .lock()
            .await
            .team_members
            .get(&team_id)
            .map(|m| m.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn grants(&self) -> Vec<Grant> {
        self.state.lock().await.grants.clone()
    }

    pub async fn migrations(&self) -> Vec<MigrateRepoOption> {
        self.state.lock().await.migrations.clone()
    }

    pub async fn keys(&self, username: &str) -> Vec<CreateKeyOption> {
        self.state
            .lock()
            .await
            .keys
            .get(username)
            .cloned()
            .unwrap_or_default()
    }

    async fn enter(&self, operation: &'static str, subject: &str) -> Result<()> {
        let key = format!("{}:{}", operation, subject);
        let delay = {
            let mut state = self.state.lock().await;
            *state.calls.entry(operation).or_default() += 1;
            if state.failures.contains(&key) {
                return Err(ApiError::ServerError(format!("{} failed for {}", operation, subject)).into());
            }
            state.stalls.get(&key).copied()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}

#[async_trait]
impl TargetApi for MockTarget {
    async fn current_user(&self) -> Result<GiteaUser> {
        self.enter("current_user", "").await?;
        self.state
            .lock()
            .await
            .current_user
            .clone()
            .ok_or_else(|| ApiError::Unauthorized.into())
    }

    async fn get_user(&self, username: &str) -> Result<GiteaUser> {
        self.enter("get_user", username).await?;
        self.state
            .lock()
            .await
            .users
            .iter()
            .find(|u| u.login.eq_ignore_ascii_case(username))
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("/users/{}", username)).into())
    }

    async fn admin_create_user(&self, option: &CreateUserOption) -> Result<GiteaUser> {
        self.enter("admin_create_user", &option.username).await?;
        let mut state = self.state.lock().await;
        if state.has_user(&option.username) {
            return Err(ApiError::Unprocessable("user already exists".to_string()).into());
        }
        let user = GiteaUser {
            id: state.next_id(),
            login: option.username.clone(),
            full_name: option.full_name.clone(),
            email: option.email.clone(),
        };
        state.users.push(user.clone());
        state.created_users.push(option.clone());
        Ok(user)
    }

    async fn admin_create_user_key(&self, username: &str, option: &CreateKeyOption) -> Result<()> {
        self.enter("admin_create_user_key", &option.title).await?;
        let mut state = self.state.lock().await;
        let in_use = state
            .keys
            .values()
            .flatten()
            .any(|existing| existing.key == option.key);
        if in_use {
            return Err(ApiError::Unprocessable(KEY_IN_USE_MESSAGE.to_string()).into());
        }
        state
            .keys
            .entry(username.to_string())
            .or_default()
            .push(option.clone());
        Ok(())
    }

    async fn get_org(&self, name: &str) -> Result<GiteaOrg> {
        self.enter("get_org", name).await?;
        self.state
            .lock()
            .await
            .orgs
            .iter()
            .find(|o| o.name.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("/orgs/{}", name)).into())
    }

    async fn create_org(&self, option: &CreateOrgOption) -> Result<GiteaOrg> {
        self.enter("create_org", &option.username).await?;
        let mut state = self.state.lock().await;
        if state
            .orgs
            .iter()
            .any(|o| o.name.eq_ignore_ascii_case(&option.username))
        {
            return Err(ApiError::Unprocessable("organization already exists".to_string()).into());
        }
        let org = GiteaOrg {
            id: state.next_id(),
            name: option.username.clone(),
            full_name: String::new(),
            description: option.description.clone(),
            visibility: Some(option.visibility),
        };
        state.orgs.push(org.clone());
        Ok(org)
    }

    async fn search_org_teams(&self, org: &str, query: &str) -> Result<Vec<GiteaTeam>> {
        self.enter("search_org_teams", query).await?;
        let query = query.to_lowercase();
        Ok(self
            .state
            .lock()
            .await
            .teams
            .get(org)
            .map(|teams| {
                teams
                    .iter()
                    .filter(|t| t.name.to_lowercase().contains(&query))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create_team(&self, org: &str, option: &CreateTeamOption) -> Result<GiteaTeam> {
        self.enter("create_team", &option.name).await?;
        let mut state = self.state.lock().await;
        let team = GiteaTeam {
            id: state.next_id(),
            name: option.name.clone(),
            description: option.description.clone(),
            permission: Some(option.permission),
            units: option.units.clone(),
            can_create_org_repo: option.can_create_org_repo,
        };
        state.teams.entry(org.to_string()).or_default().push(team.clone());
        Ok(team)
    }

    async fn add_team_member(&self, team_id: i64, username: &str) -> Result<()> {
        self.enter("add_team_member", username).await?;
        let mut state = self.state.lock().await;
        if !state.has_user(username) {
            return Err(ApiError::NotFound(format!("/users/{}", username)).into());
        }
        state
            .team_members
            .entry(team_id)
            .or_default()
            .insert(username.to_string());
        Ok(())
    }

    async fn migrate_repo(&self, option: &MigrateRepoOption) -> Result<GiteaRepo> {
        self.enter("migrate_repo", &option.repo_name).await?;
        let mut state = self.state.lock().await;
        let exists = state
            .migrations
            .iter()
            .any(|m| m.repo_owner == option.repo_owner && m.repo_name == option.repo_name);
        if exists {
            return Err(ApiError::Conflict(
                "The repository with the same name already exists.".to_string(),
            )
            .into());
        }
        state.migrations.push(option.clone());
        Ok(GiteaRepo {
            id: state.next_id(),
            name: option.repo_name.clone(),
            full_name: format!("{}/{}", option.repo_owner, option.repo_name),
            private: option.private,
        })
    }

    async fn add_collaborator(
        &self,
        owner: &str,
        repo: &str,
        username: &str,
        permission: AccessMode,
    ) -> Result<()> {
        self.enter("add_collaborator", username).await?;
        let mut state = self.state.lock().await;
        if !state.has_user(username) {
            return Err(ApiError::NotFound(format!("/users/{}", username)).into());
        }
        state.grants.push(Grant {
            owner: owner.to_string(),
            repo: repo.to_string(),
            username: username.to_string(),
            permission,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::models::Visibility;

    #[tokio::test]
    async fn test_mock_target_lookup_then_create() {
        let target = MockTarget::new();

        assert!(target.get_org("acme").await.unwrap_err().is_not_found());

        let option = CreateOrgOption {
            username: "acme".to_string(),
            description: String::new(),
            visibility: Visibility::Private,
        };
        target.create_org(&option).await.unwrap();
        assert!(target.get_org("acme").await.is_ok());
        assert!(target.create_org(&option).await.is_err());
        assert_eq!(target.calls("create_org").await, 2);
    }

    #[tokio::test]
    async fn test_mock_target_rejects_reused_key() {
        let target = MockTarget::new().with_key("bob", "ssh-ed25519 AAAA").await;
        let err = target
            .admin_create_user_key(
                "alice",
                &CreateKeyOption {
                    title: "laptop".to_string(),
                    key: "ssh-ed25519 AAAA".to_string(),
                    read_only: false,
                },
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("has been used"));
    }

    #[tokio::test]
    async fn test_mock_source_failure_injection() {
        let source = MockSource::new().failing("get_user", "bob").await;

        assert!(source.get_user("alice").await.is_ok());
        assert!(source.get_user("bob").await.is_err());
        assert_eq!(source.calls("get_user").await, 2);
    }
}
