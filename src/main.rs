use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

mod config;
mod github;
mod velocity;

use config::VelocityConfig;
use velocity::renderer::{OutputFormat, ReportRenderer};
use velocity::VelocityReport;

#[derive(Parser)]
#[command(name = "github-velocity")]
#[command(about = "Velocity metrics for a GitHub repository: releases and PR merges")]
struct Cli {
    /// Repository owner (org or user)
    #[arg(long, env = "GITHUB_OWNER")]
    owner: String,

    /// Repository name
    #[arg(long)]
    repo: String,

    /// Count only PRs merged for this GitHub login
    #[arg(long)]
    author: Option<String>,

    /// GitHub token (optional; raises the API rate limit)
    #[arg(long, env = "GITHUB_TOKEN")]
    token: Option<String>,

    /// Target releases per month (overrides the config file)
    #[arg(long)]
    release_target: Option<f64>,

    /// Target PR merges per month (overrides the config file)
    #[arg(long)]
    pr_target: Option<f64>,

    /// Path to a TOML config file with monthly targets
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, default_value = "text")]
    format: OutputFormat,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => VelocityConfig::load(path)?,
        None => VelocityConfig::default(),
    };
    if let Some(target) = cli.release_target {
        config.targets.releases = target;
    }
    if let Some(target) = cli.pr_target {
        config.targets.pull_requests = target;
    }

    let client = github::client::GitHubClient::new(cli.token.clone())?;

    info!(owner = %cli.owner, repo = %cli.repo, "fetching velocity data");
    let releases = client.fetch_releases(&cli.owner, &cli.repo).await?;
    let pulls = client
        .fetch_merged_pulls(&cli.owner, &cli.repo, cli.author.as_deref())
        .await?;

    let report = VelocityReport::build(
        &cli.owner,
        &cli.repo,
        cli.author.clone(),
        &releases,
        &pulls,
        Utc::now(),
        &config.targets,
    );

    let renderer = ReportRenderer::new(cli.format)?;
    let content = renderer.render(&report)?;

    if let Some(output_path) = cli.output {
        std::fs::write(&output_path, content)?;
        println!("Report written to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    Ok(())
}
