//! Gitea API client implementation

use async_trait::async_trait;

use super::api::TargetApi;
use super::http::{ApiTransport, TransportOptions};
use super::models::{
    AccessMode, AddCollaboratorOption, CreateKeyOption, CreateOrgOption, CreateTeamOption,
    CreateUserOption, GiteaOrg, GiteaRepo, GiteaTeam, GiteaUser, MigrateRepoOption,
    TeamSearchResults,
};
use crate::error::{ApiError, Result};

/// Default Gitea server
pub const GITEA_DEFAULT_SERVER: &str = "https://gitea.com";

/// Gitea API client
pub struct GiteaClient {
    transport: ApiTransport,
}

impl GiteaClient {
    /// Create a client for a Gitea server root such as `https://gitea.com`.
    pub fn new(
        server: &str,
        token: &str,
        skip_verify: bool,
        requests_per_second: u32,
    ) -> Result<Self> {
        let transport = ApiTransport::new(TransportOptions {
            base_url: format!("{}/api/v1", server.trim_end_matches('/')),
            authorization: format!("token {}", token),
            skip_verify,
            requests_per_second,
        })?;
        Ok(Self { transport })
    }
}

#[async_trait]
impl TargetApi for GiteaClient {
    async fn current_user(&self) -> Result<GiteaUser> {
        self.transport.get("/user").await
    }

    async fn get_user(&self, username: &str) -> Result<GiteaUser> {
        self.transport.get(&format!("/users/{}", username)).await
    }

    async fn admin_create_user(&self, option: &CreateUserOption) -> Result<GiteaUser> {
        self.transport.post("/admin/users", option).await
    }

    async fn admin_create_user_key(&self, username: &str, option: &CreateKeyOption) -> Result<()> {
        self.transport
            .post_no_content(&format!("/admin/users/{}/keys", username), option)
            .await
    }

    async fn get_org(&self, name: &str) -> Result<GiteaOrg> {
        self.transport.get(&format!("/orgs/{}", name)).await
    }

    async fn create_org(&self, option: &CreateOrgOption) -> Result<GiteaOrg> {
        self.transport.post("/orgs", option).await
    }

    async fn search_org_teams(&self, org: &str, query: &str) -> Result<Vec<GiteaTeam>> {
        let results: TeamSearchResults = self
            .transport
            .get_query(
                &format!("/orgs/{}/teams/search", org),
                &[("q", query.to_string())],
            )
            .await?;
        if !results.ok {
            return Err(ApiError::InvalidResponse(format!(
                "team search in {} was not successful",
                org
            ))
            .into());
        }
        Ok(results.data)
    }

    async fn create_team(&self, org: &str, option: &CreateTeamOption) -> Result<GiteaTeam> {
        self.transport
            .post(&format!("/orgs/{}/teams", org), option)
            .await
    }

    async fn add_team_member(&self, team_id: i64, username: &str) -> Result<()> {
        self.transport
            .put::<()>(&format!("/teams/{}/members/{}", team_id, username), None)
            .await
    }

    async fn migrate_repo(&self, option: &MigrateRepoOption) -> Result<GiteaRepo> {
        self.transport.post("/repos/migrate", option).await
    }

    async fn add_collaborator(
        &self,
        owner: &str,
        repo: &str,
        username: &str,
        permission: AccessMode,
    ) -> Result<()> {
        let body = AddCollaboratorOption { permission };
        self.transport
            .put(
                &format!("/repos/{}/{}/collaborators/{}", owner, repo, username),
                Some(&body),
            )
            .await
    }
}
