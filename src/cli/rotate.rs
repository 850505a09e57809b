use crate::cli::{format_hours, load_config, CliContext, TargetArgs};
use crate::constants;
use crate::core::orchestrator::{
    ProfileReport, RotateOptions, RotationOrchestrator, RotationOutcome, RunReport,
};
use crate::providers::aws::IamConnector;
use crate::providers::github::GithubSecrets;
use anyhow::{anyhow, Result};
use clap::Args;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};
use std::env;
use std::process::ExitCode;

#[derive(Args, Debug)]
pub struct RotateArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Begin the rotation (without it, only report what would change)
    #[arg(long)]
    pub commit: bool,

    /// Force a rotation regardless of key age
    #[arg(long)]
    pub force: bool,
}

pub async fn run(ctx: &CliContext, args: RotateArgs) -> Result<ExitCode> {
    let config = load_config(&args.target.config)?;

    let token = env::var(constants::GITHUB_TOKEN_ENV)
        .ok()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| anyhow!("${} is missing", constants::GITHUB_TOKEN_ENV))?;
    let api_url = env::var(constants::GITHUB_API_URL_ENV)
        .unwrap_or_else(|_| constants::DEFAULT_GITHUB_API_URL.to_string());
    let github = GithubSecrets::new(&api_url, &token)?;

    let connector = IamConnector {
        region: ctx.region.clone(),
    };
    let options = RotateOptions {
        commit: args.commit,
        force: args.force,
    };
    let report = RotationOrchestrator::new(&config, &connector, &github, options)
        .run(args.target.profile.as_deref())
        .await?;

    println!("{}", summary_table(&report));
    if !args.commit {
        println!("DryRun done, use --commit to rotate");
    }

    if report.has_failures() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn summary_table(report: &RunReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("Profile").add_attribute(Attribute::Bold),
        Cell::new("Result").add_attribute(Attribute::Bold),
        Cell::new("Detail").add_attribute(Attribute::Bold),
    ]);
    for profile in &report.profiles {
        let (result, detail) = describe(profile);
        table.add_row(vec![profile.profile.clone(), result, detail]);
    }
    table
}

fn describe(report: &ProfileReport) -> (String, String) {
    let outcome = match &report.result {
        Ok(outcome) => outcome,
        Err(err) => return ("failed".to_string(), err.to_string()),
    };
    match outcome {
        RotationOutcome::SkippedTooYoung {
            access_key_id,
            remaining,
        } => (
            "skipped".to_string(),
            format!("{} due in {}", access_key_id, format_hours(*remaining)),
        ),
        RotationOutcome::SkippedInvalidProfile { reason } => {
            ("invalid".to_string(), reason.clone())
        }
        RotationOutcome::SkippedNoConsumers => {
            ("skipped".to_string(), "no repositories".to_string())
        }
        RotationOutcome::Rotated {
            new_access_key_id,
            retired,
            consumers,
        } => (
            "rotated".to_string(),
            format!(
                "{} -> {} repositories, removed {}",
                new_access_key_id,
                consumers,
                retired.as_deref().unwrap_or("-")
            ),
        ),
        RotationOutcome::RotatedDryRun {
            retiring,
            consumers,
        } => (
            "dry-run".to_string(),
            format!(
                "would update {} repositories, remove {}",
                consumers,
                retiring.as_deref().unwrap_or("-")
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ProviderError, RotateError};

    #[test]
    fn test_describe_outcomes() {
        let rotated = ProfileReport {
            profile: "dev".into(),
            result: Ok(RotationOutcome::Rotated {
                new_access_key_id: "AKIANEW".into(),
                retired: Some("AKIAOLD".into()),
                consumers: 2,
            }),
        };
        assert_eq!(
            describe(&rotated),
            (
                "rotated".to_string(),
                "AKIANEW -> 2 repositories, removed AKIAOLD".to_string()
            )
        );

        let failed = ProfileReport {
            profile: "dev".into(),
            result: Err(RotateError::Provider(ProviderError::new(
                "DeleteAccessKey",
                "ci",
                "throttled",
            ))),
        };
        assert_eq!(describe(&failed).0, "failed");
        assert!(describe(&failed).1.contains("throttled"));
    }

    #[test]
    fn test_summary_table_has_row_per_profile() {
        let report = RunReport {
            profiles: vec![
                ProfileReport {
                    profile: "a".into(),
                    result: Ok(RotationOutcome::SkippedNoConsumers),
                },
                ProfileReport {
                    profile: "b".into(),
                    result: Ok(RotationOutcome::RotatedDryRun {
                        retiring: None,
                        consumers: 1,
                    }),
                },
            ],
        };
        let rendered = summary_table(&report).to_string();
        assert!(rendered.contains("no repositories"));
        assert!(rendered.contains("would update 1 repositories"));
    }
}
