//! Fixed settings applied to every created team and migrated repository

/// Repository feature areas granted to every created team.
pub const TEAM_UNITS: &[&str] = &[
    "repo.code",
    "repo.issues",
    "repo.ext_issues",
    "repo.wiki",
    "repo.ext_wiki",
    "repo.pulls",
    "repo.releases",
    "repo.projects",
    "repo.packages",
    "repo.actions",
];

/// Import service the target uses to talk to the source
pub const CLONE_SERVICE: &str = "github";

/// Repository content requested on every migration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentBundle {
    pub wiki: bool,
    pub issues: bool,
    pub pull_requests: bool,
    pub releases: bool,
    pub labels: bool,
    pub milestones: bool,
}

impl ContentBundle {
    /// Everything the importer can carry over
    pub const fn full() -> Self {
        Self {
            wiki: true,
            issues: true,
            pull_requests: true,
            releases: true,
            labels: true,
            milestones: true,
        }
    }
}

impl Default for ContentBundle {
    fn default() -> Self {
        Self::full()
    }
}

/// Run-wide constants, built once and shared by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationDefaults {
    pub team_units: Vec<String>,
    pub content: ContentBundle,
    pub service: String,
    /// Authentication source that vouches for created accounts
    pub auth_source_id: i64,
}

impl MigrationDefaults {
    pub fn new(auth_source_id: i64) -> Self {
        Self {
            team_units: TEAM_UNITS.iter().map(|u| u.to_string()).collect(),
            content: ContentBundle::full(),
            service: CLONE_SERVICE.to_string(),
            auth_source_id,
        }
    }
}

impl Default for MigrationDefaults {
    fn default() -> Self {
        Self::new(0)
    }
}
