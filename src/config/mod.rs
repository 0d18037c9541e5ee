//! Configuration management for hub2tea
//!
//! Settings come from three layers, highest first: command line flags (or
//! their `HUB2TEA_*` environment variables), an optional YAML file, and
//! built-in defaults. Each layer is a [`ConfigLayer`]; [`Config::resolve`]
//! applies the defaults and validates the result.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::client::gitea::GITEA_DEFAULT_SERVER;
use crate::client::models::Visibility;
use crate::error::{ConfigError, Result};

/// Default run deadline
pub const DEFAULT_TIMEOUT: &str = "10m";

/// Default request pacing per platform
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 10;

/// One layer of partially specified settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub gh_token: Option<String>,
    pub gh_server: Option<String>,
    pub gh_skip_verify: Option<bool>,
    pub gt_server: Option<String>,
    pub gt_token: Option<String>,
    pub gt_skip_verify: Option<bool>,
    pub gt_source_id: Option<i64>,
    pub timeout: Option<String>,
    pub source_org: Option<String>,
    pub target_org: Option<String>,
    pub org_visibility: Option<String>,
    pub user_list: Option<PathBuf>,
    pub skip_ssh_keys: Option<bool>,
    pub requests_per_second: Option<u32>,
}

impl ConfigLayer {
    /// Load a YAML layer from a file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::Invalid(format!(
                "config file {} does not exist",
                path.display()
            ))
            .into());
        }

        let contents = std::fs::read_to_string(path)?;
        let layer: ConfigLayer = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        Ok(layer)
    }

    /// Fill every unset field of `self` from `fallback`.
    pub fn or(self, fallback: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            gh_token: self.gh_token.or(fallback.gh_token),
            gh_server: self.gh_server.or(fallback.gh_server),
            gh_skip_verify: self.gh_skip_verify.or(fallback.gh_skip_verify),
            gt_server: self.gt_server.or(fallback.gt_server),
            gt_token: self.gt_token.or(fallback.gt_token),
            gt_skip_verify: self.gt_skip_verify.or(fallback.gt_skip_verify),
            gt_source_id: self.gt_source_id.or(fallback.gt_source_id),
            timeout: self.timeout.or(fallback.timeout),
            source_org: self.source_org.or(fallback.source_org),
            target_org: self.target_org.or(fallback.target_org),
            org_visibility: self.org_visibility.or(fallback.org_visibility),
            user_list: self.user_list.or(fallback.user_list),
            skip_ssh_keys: self.skip_ssh_keys.or(fallback.skip_ssh_keys),
            requests_per_second: self.requests_per_second.or(fallback.requests_per_second),
        }
    }
}

/// Fully resolved settings of one run
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub gh_token: String,
    /// Enterprise Server root; github.com when unset
    pub gh_server: Option<String>,
    pub gh_skip_verify: bool,
    pub gt_server: String,
    pub gt_token: String,
    pub gt_skip_verify: bool,
    /// Authentication source id assigned to created accounts
    pub gt_source_id: i64,
    pub timeout: Duration,
    pub source_org: String,
    pub target_org: String,
    pub visibility: Visibility,
    pub user_list: Option<PathBuf>,
    pub skip_ssh_keys: bool,
    pub requests_per_second: u32,
}

impl Config {
    /// Apply defaults to a merged layer and validate the result.
    pub fn resolve(layer: ConfigLayer) -> Result<Self> {
        let timeout = parse_duration(layer.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))?;
        let visibility = match layer.org_visibility.as_deref() {
            Some(v) => v.parse::<Visibility>()?,
            None => Visibility::default(),
        };

        let config = Config {
            gh_token: layer.gh_token.unwrap_or_default(),
            gh_server: layer.gh_server.filter(|s| !s.trim().is_empty()),
            gh_skip_verify: layer.gh_skip_verify.unwrap_or(false),
            gt_server: layer
                .gt_server
                .unwrap_or_else(|| GITEA_DEFAULT_SERVER.to_string()),
            gt_token: layer.gt_token.unwrap_or_default(),
            gt_skip_verify: layer.gt_skip_verify.unwrap_or(false),
            gt_source_id: layer.gt_source_id.unwrap_or(0),
            timeout,
            source_org: layer.source_org.unwrap_or_default(),
            target_org: layer.target_org.unwrap_or_default(),
            visibility,
            user_list: layer.user_list,
            skip_ssh_keys: layer.skip_ssh_keys.unwrap_or(false),
            requests_per_second: layer
                .requests_per_second
                .unwrap_or(DEFAULT_REQUESTS_PER_SECOND),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that required settings are present and well formed
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("gh-token", &self.gh_token),
            ("gt-token", &self.gt_token),
            ("source-org", &self.source_org),
            ("target-org", &self.target_org),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(name).into());
            }
        }

        check_server(&self.gt_server)?;
        if let Some(server) = &self.gh_server {
            check_server(server)?;
        }

        if self.requests_per_second == 0 {
            return Err(
                ConfigError::Invalid("requests-per-second must be at least 1".to_string()).into(),
            );
        }
        Ok(())
    }
}

fn check_server(server: &str) -> Result<()> {
    if server.starts_with("http://") || server.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidServer(server.to_string()).into())
    }
}

/// Parse a duration such as `10m`, `1h30m`, `45s` or `500ms`.
///
/// Every number needs a unit. Zero durations are rejected.
pub fn parse_duration(input: &str) -> std::result::Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidDuration(input.to_string());
    let s = input.trim();
    if s.is_empty() {
        return Err(invalid());
    }

    let mut total = Duration::ZERO;
    let mut rest = s;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 {
            return Err(invalid());
        }
        let value: u64 = rest[..digits].parse().map_err(|_| invalid())?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let unit = match &rest[..unit_len] {
            "h" => Duration::from_secs(3600),
            "m" => Duration::from_secs(60),
            "s" => Duration::from_secs(1),
            "ms" => Duration::from_millis(1),
            _ => return Err(invalid()),
        };
        rest = &rest[unit_len..];

        let part = unit
            .checked_mul(u32::try_from(value).map_err(|_| invalid())?)
            .ok_or_else(invalid)?;
        total = total.checked_add(part).ok_or_else(invalid)?;
    }

    if total.is_zero() {
        return Err(invalid());
    }
    Ok(total)
}
