//! hub2tea - migrate a GitHub organization to Gitea

use std::sync::Arc;

use clap::Parser;
use log::info;

mod cli;
mod client;
mod config;
mod error;
mod migrate;
mod roster;

use cli::Cli;
use client::{GiteaClient, GitHubClient};
use config::{Config, ConfigLayer};
use error::Result;
use migrate::{MigrationDefaults, MigrationPlan, Migrator, TargetGateway};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// Log at info, or debug with `--debug`. `RUST_LOG` overrides both.
fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let file = match &cli.config {
        Some(path) => ConfigLayer::load_from(path)?,
        None => ConfigLayer::default(),
    };
    let config = Config::resolve(cli.to_layer().or(file))?;

    let roster = config
        .user_list
        .as_deref()
        .map(roster::read_roster)
        .transpose()?;

    let source = Arc::new(GitHubClient::new(
        config.gh_server.as_deref(),
        &config.gh_token,
        config.gh_skip_verify,
        config.requests_per_second,
    )?);
    let target = Arc::new(GiteaClient::new(
        &config.gt_server,
        &config.gt_token,
        config.gt_skip_verify,
        config.requests_per_second,
    )?);
    let defaults = Arc::new(MigrationDefaults::new(config.gt_source_id));
    let mut migrator = Migrator::new(
        source,
        TargetGateway::new(target, defaults),
        config.gh_token.clone(),
    );

    let plan = MigrationPlan {
        source_org: config.source_org.clone(),
        target_org: config.target_org.clone(),
        visibility: config.visibility,
        roster,
        skip_ssh_keys: config.skip_ssh_keys,
    };

    info!(
        "Starting migration source_org={} target_org={} target={} timeout={:?}",
        plan.source_org, plan.target_org, config.gt_server, config.timeout
    );
    let outcome = migrator.run_with_deadline(&plan, config.timeout).await;
    migrator.report().log_summary();
    outcome
}
