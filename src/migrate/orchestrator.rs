//! Migration run sequencing
//!
//! A run authenticates against both platforms, mirrors the organization, then
//! walks members, teams, repositories and the optional roster. Only the first
//! three steps can abort the run. Everything after is recorded per unit in the
//! [`RunReport`] and the loop moves on.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use super::gateway::{KeyUpload, Provisioned, RepoImport, TargetGateway};
use super::permission::team_access;
use super::report::{KeyTally, Phase, RunReport};
use crate::client::models::{AccessMode, GitHubRepo, GitHubTeam, GitHubUser, Visibility};
use crate::client::{SourceApi, TargetApi};
use crate::error::{Error, Result};
use crate::roster::RosterEntry;

/// What to migrate and where
#[derive(Debug, Clone, Default)]
pub struct MigrationPlan {
    pub source_org: String,
    pub target_org: String,
    pub visibility: Visibility,
    /// Identities to provision after the repositories, if any
    pub roster: Option<Vec<RosterEntry>>,
    pub skip_ssh_keys: bool,
}

/// A destination team with access to a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamGrant {
    pub team: String,
    pub team_id: i64,
    pub access: AccessMode,
}

/// Repository name to the destination teams that had access on the source
pub type TeamRepoIndex = BTreeMap<String, Vec<TeamGrant>>;

/// Sequences a migration run over a source and a target platform.
pub struct Migrator<S: SourceApi, T: TargetApi> {
    source: Arc<S>,
    gateway: TargetGateway<T>,
    source_token: String,
    source_login: String,
    report: RunReport,
    team_repos: TeamRepoIndex,
}

impl<S: SourceApi, T: TargetApi> Migrator<S, T> {
    /// `source_token` is handed to the target importer to clone private
    /// repositories.
    pub fn new(source: Arc<S>, gateway: TargetGateway<T>, source_token: impl Into<String>) -> Self {
        Self {
            source,
            gateway,
            source_token: source_token.into(),
            source_login: String::new(),
            report: RunReport::new(),
            team_repos: TeamRepoIndex::new(),
        }
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    #[cfg(test)]
    pub fn team_repos(&self) -> &TeamRepoIndex {
        &self.team_repos
    }

    /// Run every step of the plan.
    ///
    /// Returns an error only when authentication, the source organization
    /// fetch or the destination organization setup fails.
    pub async fn run(&mut self, plan: &MigrationPlan) -> Result<()> {
        self.authenticate().await?;

        let org = self.source.get_org(&plan.source_org).await?;
        info!("Fetched source organization org={}", org.login);

        match self
            .gateway
            .ensure_org(&plan.target_org, org.description(), plan.visibility)
            .await?
        {
            Provisioned::Created(_) => info!(
                "Created destination organization org={} visibility={}",
                plan.target_org, plan.visibility
            ),
            Provisioned::Existing(_) => {
                info!("Using existing destination organization org={}", plan.target_org)
            }
        }

        self.migrate_members(&plan.source_org).await;
        self.migrate_teams(&plan.source_org, &plan.target_org).await;
        self.migrate_repos(&plan.source_org, &plan.target_org).await;

        if let Some(roster) = &plan.roster {
            self.provision_roster(roster, plan.skip_ssh_keys).await;
        }

        Ok(())
    }

    /// Run the plan, abandoning whatever is in flight once `deadline` passes.
    ///
    /// Units finished before the deadline stay in the report.
    pub async fn run_with_deadline(
        &mut self,
        plan: &MigrationPlan,
        deadline: Duration,
    ) -> Result<()> {
        match tokio::time::timeout(deadline, self.run(plan)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Deadline of {:?} reached, stopping migration", deadline);
                Err(Error::Timeout(deadline))
            }
        }
    }

    /// Check both tokens by asking each platform who we are.
    pub async fn authenticate(&mut self) -> Result<()> {
        let source_user = self.source.current_user().await?;
        let target_user = self.gateway.api().current_user().await?;
        info!(
            "Authenticated source_user={} target_user={}",
            source_user.login, target_user.login
        );
        self.source_login = source_user.login;
        Ok(())
    }

    pub async fn migrate_members(&mut self, source_org: &str) {
        let members = match self.source.list_org_members(source_org).await {
            Ok(members) => members,
            Err(e) => {
                self.report
                    .failed(Phase::Member, format!("{}/members", source_org), e);
                return;
            }
        };
        info!("Migrating {} members of org={}", members.len(), source_org);

        for member in &members {
            match self.migrate_member(source_org, member).await {
                Ok(()) => self.report.succeeded(Phase::Member, &member.login),
                Err(e) => self.report.failed(Phase::Member, &member.login, e),
            }
        }
    }

    async fn migrate_member(&self, source_org: &str, member: &GitHubUser) -> Result<()> {
        self.ensure_user_from_profile(&member.login, None).await?;
        let role = self.source.get_org_role(source_org, &member.login).await?;
        debug!("Member user={} role={}", member.login, role);
        Ok(())
    }

    pub async fn migrate_teams(&mut self, source_org: &str, target_org: &str) {
        let teams = match self.source.list_org_teams(source_org).await {
            Ok(teams) => teams,
            Err(e) => {
                self.report
                    .failed(Phase::Team, format!("{}/teams", source_org), e);
                return;
            }
        };
        info!("Migrating {} teams of org={}", teams.len(), source_org);

        for team in &teams {
            self.migrate_team(source_org, target_org, team).await;
        }
    }

    async fn migrate_team(&mut self, source_org: &str, target_org: &str, team: &GitHubTeam) {
        let repos = match self.source.list_team_repos(source_org, &team.slug).await {
            Ok(repos) => Some(repos),
            Err(e) => {
                warn!(
                    "Failed to list repositories team={} error={}",
                    team.name, e
                );
                None
            }
        };

        let created = match self
            .gateway
            .ensure_team(target_org, &team.name, team.description(), team.permission())
            .await
        {
            Ok(created) => created,
            Err(e) => {
                self.report.failed(Phase::Team, &team.name, e);
                return;
            }
        };
        let target_team = created.into_inner();

        if let Some(repos) = repos {
            self.index_team_repos(&target_team.name, target_team.id, team.permission(), &repos);
        }

        let members = match self.source.list_team_members(source_org, &team.slug).await {
            Ok(members) => members,
            Err(e) => {
                self.report.failed(Phase::Team, &team.name, e);
                return;
            }
        };
        self.report.succeeded(Phase::Team, &team.name);

        for member in &members {
            let subject = format!("{}/{}", target_team.name, member.login);
            match self
                .gateway
                .add_team_member(&target_team, &member.login)
                .await
            {
                Ok(()) => self.report.succeeded(Phase::TeamMember, subject),
                Err(e) => self.report.failed(Phase::TeamMember, subject, e),
            }
        }
    }

    fn index_team_repos(&mut self, team: &str, team_id: i64, permission: &str, repos: &[GitHubRepo]) {
        let access = team_access(permission).unwrap_or_default();
        for repo in repos {
            debug!(
                "Team access team={} repo={} access={}",
                team, repo.name, access
            );
            self.team_repos
                .entry(repo.name.clone())
                .or_default()
                .push(TeamGrant {
                    team: team.to_string(),
                    team_id,
                    access,
                });
        }
    }

    pub async fn migrate_repos(&mut self, source_org: &str, target_org: &str) {
        let repos = match self.source.list_org_repos(source_org).await {
            Ok(repos) => repos,
            Err(e) => {
                self.report
                    .failed(Phase::Repository, format!("{}/repositories", source_org), e);
                return;
            }
        };
        info!("Migrating {} repositories of org={}", repos.len(), source_org);

        for repo in &repos {
            self.migrate_repo(source_org, target_org, repo).await;
        }
    }

    /// Import one repository, then replicate its collaborators.
    pub async fn migrate_repo(&mut self, source_org: &str, target_org: &str, repo: &GitHubRepo) {
        let import = RepoImport {
            name: repo.name.clone(),
            owner: target_org.to_string(),
            clone_addr: repo.clone_url().to_string(),
            auth_username: self.source_login.clone(),
            auth_token: self.source_token.clone(),
            private: repo.private,
            description: repo.description().to_string(),
        };
        if let Err(e) = self.gateway.migrate_repo(&import).await {
            self.report.failed(Phase::Repository, &repo.name, e);
            return;
        }
        self.report.succeeded(Phase::Repository, &repo.name);

        let owner = match repo.owner_login() {
            "" => source_org,
            login => login,
        };
        let collaborators = match self.source.list_repo_collaborators(owner, &repo.name).await {
            Ok(collaborators) => collaborators,
            Err(e) => {
                self.report
                    .failed(Phase::Collaborator, format!("{}/collaborators", repo.name), e);
                return;
            }
        };

        for collaborator in &collaborators {
            let subject = format!("{}/{}", repo.name, collaborator.login);
            if !collaborator.is_user() {
                let kind = match collaborator.user_type() {
                    "" => "unknown",
                    kind => kind,
                };
                self.report.skipped(
                    Phase::Collaborator,
                    subject,
                    format!("principal type {}", kind),
                );
                continue;
            }
            match self
                .migrate_collaborator(target_org, &repo.name, collaborator)
                .await
            {
                Ok(access) => {
                    debug!("Granted user={} repo={} access={}", collaborator.login, repo.name, access);
                    self.report.succeeded(Phase::Collaborator, subject);
                }
                Err(e) => self.report.failed(Phase::Collaborator, subject, e),
            }
        }
    }

    async fn migrate_collaborator(
        &self,
        target_org: &str,
        repo: &str,
        collaborator: &GitHubUser,
    ) -> Result<AccessMode> {
        self.ensure_user_from_profile(&collaborator.login, None)
            .await?;
        let permissions = collaborator.permissions.unwrap_or_default();
        self.gateway
            .grant_collaborator(target_org, repo, &collaborator.login, &permissions)
            .await
    }

    /// Create roster accounts and copy their public SSH keys.
    pub async fn provision_roster(&mut self, roster: &[RosterEntry], skip_ssh_keys: bool) {
        info!("Provisioning {} roster users", roster.len());

        for entry in roster {
            if let Err(e) = self
                .ensure_user_from_profile(&entry.login, Some(&entry.email))
                .await
            {
                self.report.failed(Phase::RosterUser, &entry.login, e);
                continue;
            }
            info!("Roster user ready user={} role={}", entry.login, entry.role);
            self.report.succeeded(Phase::RosterUser, &entry.login);

            if !skip_ssh_keys {
                self.migrate_keys(&entry.login).await;
            }
        }
    }

    async fn migrate_keys(&mut self, login: &str) {
        let keys = match self.source.list_user_keys(login).await {
            Ok(keys) => keys,
            Err(e) => {
                self.report
                    .failed(Phase::SshKey, format!("{}/keys", login), e);
                return;
            }
        };

        let mut tally = KeyTally {
            total: keys.len(),
            ..Default::default()
        };
        for (index, key) in keys.iter().enumerate() {
            let title = match key.title.as_deref() {
                Some(title) if !title.is_empty() => title.to_string(),
                _ => format!("Migrate key-{} from {}", index, login),
            };
            let subject = format!("{}/{}", login, title);
            match self.gateway.upload_key(login, &title, &key.key).await {
                Ok(KeyUpload::Added) => {
                    tally.added += 1;
                    self.report.succeeded(Phase::SshKey, subject);
                }
                Ok(KeyUpload::AlreadyPresent) => {
                    tally.existing += 1;
                    self.report
                        .skipped(Phase::SshKey, subject, "already present");
                }
                Err(e) => {
                    tally.failed += 1;
                    self.report.failed(Phase::SshKey, subject, e);
                }
            }
        }
        self.report.record_keys(login, tally);
    }

    /// Ensure a target account for `login`, filled from the source profile.
    ///
    /// `email` overrides the profile email when given.
    async fn ensure_user_from_profile(&self, login: &str, email: Option<&str>) -> Result<()> {
        let profile = self.source.get_user(login).await?;
        let email = email.unwrap_or_else(|| profile.email());
        let user = self
            .gateway
            .ensure_user(login, profile.display_name(), email)
            .await?;
        if user.was_created() {
            info!("Created user user={}", login);
        }
        Ok(())
    }
}
