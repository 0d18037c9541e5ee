//! GitHub API client implementation

use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;

use super::api::SourceApi;
use super::http::{ApiTransport, TransportOptions};
use super::models::{GitHubKey, GitHubMembership, GitHubOrg, GitHubRepo, GitHubTeam, GitHubUser};
use super::pagination::{collect_pages, dedup_by_key};
use crate::error::Result;

/// Public GitHub API root
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// GitHub (or GitHub Enterprise Server) API client
pub struct GitHubClient {
    transport: ApiTransport,
}

impl GitHubClient {
    /// Create a client for github.com, or for an Enterprise Server when
    /// `server` is given.
    pub fn new(
        server: Option<&str>,
        token: &str,
        skip_verify: bool,
        requests_per_second: u32,
    ) -> Result<Self> {
        Self::with_base_url(&api_url(server), token, skip_verify, requests_per_second)
    }

    /// Create a client against an explicit API root
    pub fn with_base_url(
        base_url: &str,
        token: &str,
        skip_verify: bool,
        requests_per_second: u32,
    ) -> Result<Self> {
        let transport = ApiTransport::new(TransportOptions {
            base_url: base_url.to_string(),
            authorization: format!("Bearer {}", token),
            skip_verify,
            requests_per_second,
        })?;
        Ok(Self { transport })
    }

    /// Follow every page of `path`, deduplicating by the entity id
    async fn list_all<T, K>(&self, path: &str, id: K) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        K: Fn(&T) -> i64,
    {
        let items = collect_pages(|page| self.transport.get_page::<T>(path, page)).await?;
        debug!("Fetched {} items from {}", items.len(), path);
        Ok(dedup_by_key(items, id))
    }
}

/// API root for a server setting.
///
/// Enterprise Server exposes the REST API under `/api/v3`.
pub fn api_url(server: Option<&str>) -> String {
    match server.map(|s| s.trim_end_matches('/')) {
        None | Some("") => GITHUB_API_URL.to_string(),
        Some(server) if server.ends_with("/api/v3") => server.to_string(),
        Some(server) => format!("{}/api/v3", server),
    }
}

#[async_trait]
impl SourceApi for GitHubClient {
    async fn current_user(&self) -> Result<GitHubUser> {
        self.transport.get("/user").await
    }

    async fn get_user(&self, login: &str) -> Result<GitHubUser> {
        self.transport.get(&format!("/users/{}", login)).await
    }

    async fn list_user_keys(&self, login: &str) -> Result<Vec<GitHubKey>> {
        self.list_all(&format!("/users/{}/keys", login), |k: &GitHubKey| k.id)
            .await
    }

    async fn get_org(&self, org: &str) -> Result<GitHubOrg> {
        self.transport.get(&format!("/orgs/{}", org)).await
    }

    async fn list_org_members(&self, org: &str) -> Result<Vec<GitHubUser>> {
        self.list_all(&format!("/orgs/{}/members", org), |u: &GitHubUser| u.id)
            .await
    }

    async fn get_org_role(&self, org: &str, login: &str) -> Result<String> {
        let membership: GitHubMembership = self
            .transport
            .get(&format!("/orgs/{}/memberships/{}", org, login))
            .await?;
        Ok(membership.role.unwrap_or_default())
    }

    async fn list_org_teams(&self, org: &str) -> Result<Vec<GitHubTeam>> {
        self.list_all(&format!("/orgs/{}/teams", org), |t: &GitHubTeam| t.id)
            .await
    }

    async fn list_team_members(&self, org: &str, team_slug: &str) -> Result<Vec<GitHubUser>> {
        self.list_all(
            &format!("/orgs/{}/teams/{}/members", org, team_slug),
            |u: &GitHubUser| u.id,
        )
        .await
    }

    async fn list_team_repos(&self, org: &str, team_slug: &str) -> Result<Vec<GitHubRepo>> {
        self.list_all(
            &format!("/orgs/{}/teams/{}/repos", org, team_slug),
            |r: &GitHubRepo| r.id,
        )
        .await
    }

    async fn list_org_repos(&self, org: &str) -> Result<Vec<GitHubRepo>> {
        self.list_all(&format!("/orgs/{}/repos", org), |r: &GitHubRepo| r.id)
            .await
    }

    async fn list_repo_collaborators(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<GitHubUser>> {
        self.list_all(
            &format!("/repos/{}/{}/collaborators", owner, repo),
            |u: &GitHubUser| u.id,
        )
        .await
    }
}
