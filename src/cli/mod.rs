//! CLI routing and command dispatch.

use crate::core::config::{self, RotateConfig};
use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::warn;

pub mod rotate;
pub mod status;

/// Shared context passed to all command handlers.
pub struct CliContext {
    pub region: Option<String>,
}

#[derive(Parser, Debug)]
#[command(
    name = "access-key-rotate",
    version,
    about = "Rotate AWS access keys for GitHub Actions"
)]
pub struct Cli {
    /// Show extra logging detail (-vv for trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// AWS region for the IAM client (defaults to the AWS config chain)
    #[arg(long, global = true, value_name = "REGION")]
    pub region: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub async fn run(self) -> Result<ExitCode> {
        let ctx = CliContext {
            region: self.region,
        };

        match self.command {
            Commands::Rotate(args) => rotate::run(&ctx, args).await,
            Commands::Status(args) => status::run(&ctx, args).await,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rotate access keys and update repository secrets
    Rotate(rotate::RotateArgs),
    /// Show the age of each profile's access key (read-only)
    Status(status::StatusArgs),
}

/// Configuration file and profile selection shared by commands.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Config to use
    #[arg(long, value_name = "CONFIG", env = "ACCESS_KEY_ROTATE_CONFIG")]
    pub config: PathBuf,

    /// Profile to rotate (default: all profiles)
    #[arg(long, value_name = "PROFILE")]
    pub profile: Option<String>,
}

/// Load the configuration and report mappings to unknown profiles.
pub fn load_config(path: &Path) -> Result<RotateConfig> {
    let config = config::load(path)?;
    for orphan in config.orphan_mappings() {
        warn!(
            repo = %orphan.consumer_repo,
            profile = %orphan.profile_name,
            "repository references unknown profile"
        );
    }
    Ok(config)
}

/// Render a duration as fractional hours.
pub(crate) fn format_hours(duration: chrono::Duration) -> String {
    format!("{:.1}h", duration.num_minutes() as f64 / 60.0)
}
