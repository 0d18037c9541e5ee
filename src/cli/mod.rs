//! Command line definition

use std::path::PathBuf;

use clap::Parser;

use crate::config::ConfigLayer;

/// hub2tea - migrate a GitHub organization to Gitea
///
/// Copies the organization, its members, teams, repositories and collaborator
/// permissions, and optionally provisions accounts and SSH keys from a CSV
/// roster. Entities that already exist on Gitea are reused, never updated.
#[derive(Parser, Debug, Default)]
#[command(name = "hub2tea")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// GitHub personal access token
    #[arg(long, env = "HUB2TEA_GH_TOKEN", hide_env_values = true)]
    pub gh_token: Option<String>,

    /// GitHub Enterprise Server URL [default: github.com]
    #[arg(long, env = "HUB2TEA_GH_SERVER", hide_env_values = true)]
    pub gh_server: Option<String>,

    /// Accept invalid TLS certificates from GitHub
    #[arg(long, env = "HUB2TEA_GH_SKIP_VERIFY", hide_env_values = true)]
    pub gh_skip_verify: bool,

    /// Gitea server URL [default: https://gitea.com]
    #[arg(long, env = "HUB2TEA_GT_SERVER", hide_env_values = true)]
    pub gt_server: Option<String>,

    /// Gitea access token (site administrator)
    #[arg(long, env = "HUB2TEA_GT_TOKEN", hide_env_values = true)]
    pub gt_token: Option<String>,

    /// Accept invalid TLS certificates from Gitea
    #[arg(long, env = "HUB2TEA_GT_SKIP_VERIFY", hide_env_values = true)]
    pub gt_skip_verify: bool,

    /// Gitea authentication source id for created users [default: 0]
    #[arg(long, env = "HUB2TEA_GT_SOURCE_ID", hide_env_values = true)]
    pub gt_source_id: Option<i64>,

    /// Deadline for the whole run, e.g. 10m or 1h30m [default: 10m]
    #[arg(long, env = "HUB2TEA_TIMEOUT", hide_env_values = true)]
    pub timeout: Option<String>,

    /// GitHub organization to migrate from
    #[arg(long, env = "HUB2TEA_SOURCE_ORG", hide_env_values = true)]
    pub source_org: Option<String>,

    /// Gitea organization to migrate into
    #[arg(long, env = "HUB2TEA_TARGET_ORG", hide_env_values = true)]
    pub target_org: Option<String>,

    /// Visibility of a newly created organization: public, limited, private [default: private]
    #[arg(long, env = "HUB2TEA_ORG_VISIBILITY", hide_env_values = true)]
    pub org_visibility: Option<String>,

    /// CSV roster of users to provision (timestamp, id, login, email, role)
    #[arg(long, env = "HUB2TEA_USER_LIST", hide_env_values = true)]
    pub user_list: Option<PathBuf>,

    /// Do not copy roster users' SSH keys
    #[arg(long, env = "HUB2TEA_SKIP_SSH_KEYS", hide_env_values = true)]
    pub skip_ssh_keys: bool,

    /// Maximum API requests per second to each platform [default: 10]
    #[arg(long, env = "HUB2TEA_REQUESTS_PER_SECOND", hide_env_values = true)]
    pub requests_per_second: Option<u32>,

    /// YAML file with default settings
    #[arg(long, env = "HUB2TEA_CONFIG", hide_env_values = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, env = "HUB2TEA_DEBUG", hide_env_values = true)]
    pub debug: bool,
}

impl Cli {
    /// Settings given on the command line or through the environment.
    ///
    /// Switches left off are unset so a config file can still turn them on.
    pub fn to_layer(&self) -> ConfigLayer {
        ConfigLayer {
            gh_token: self.gh_token.clone(),
            gh_server: self.gh_server.clone(),
            gh_skip_verify: self.gh_skip_verify.then_some(true),
            gt_server: self.gt_server.clone(),
            gt_token: self.gt_token.clone(),
            gt_skip_verify: self.gt_skip_verify.then_some(true),
            gt_source_id: self.gt_source_id,
            timeout: self.timeout.clone(),
            source_org: self.source_org.clone(),
            target_org: self.target_org.clone(),
            org_visibility: self.org_visibility.clone(),
            user_list: self.user_list.clone(),
            skip_ssh_keys: self.skip_ssh_keys.then_some(true),
            requests_per_second: self.requests_per_second,
        }
    }
}
