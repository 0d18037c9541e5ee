//! Platform data models
//!
//! GitHub models describe what the source reader returns; Gitea models
//! describe both responses and request bodies of the target platform.

mod gitea;
mod github;

pub use gitea::{
    AccessMode, AddCollaboratorOption, CreateKeyOption, CreateOrgOption, CreateTeamOption,
    CreateUserOption, GiteaOrg, GiteaRepo, GiteaTeam, GiteaUser, MigrateRepoOption,
    TeamSearchResults, Visibility,
};
pub use github::{
    GitHubKey, GitHubMembership, GitHubOrg, GitHubPermissions, GitHubRepo, GitHubTeam, GitHubUser,
};
#[cfg(test)]
pub use github::{GitHubOwner, USER_TYPE};
