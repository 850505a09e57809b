//! Read-only view of each profile's access key age.

use crate::cli::{format_hours, load_config, CliContext, TargetArgs};
use crate::core::lifecycle::CredentialLifecycle;
use crate::core::policy;
use crate::models::profile::Profile;
use crate::providers::aws::IamConnector;
use crate::providers::ProviderConnector;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, Utc};
use clap::Args;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};
use serde::Serialize;
use std::process::ExitCode;

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Output format: table|json
    #[arg(long, default_value = "table")]
    pub format: String,
}

#[derive(Debug, Serialize)]
struct StatusItem {
    profile: String,
    user: Option<String>,
    access_key_id: Option<String>,
    created_at: Option<DateTime<Utc>>,
    age_hours: Option<f64>,
    max_age_hours: Option<f64>,
    due: Option<bool>,
    error: Option<String>,
}

impl StatusItem {
    fn new(profile: &str) -> Self {
        Self {
            profile: profile.to_string(),
            user: None,
            access_key_id: None,
            created_at: None,
            age_hours: None,
            max_age_hours: None,
            due: None,
            error: None,
        }
    }
}

pub async fn run(ctx: &CliContext, args: StatusArgs) -> Result<ExitCode> {
    if args.format != "table" && args.format != "json" {
        bail!("invalid format: {} (use table|json)", args.format);
    }
    let config = load_config(&args.target.config)?;
    let connector = IamConnector {
        region: ctx.region.clone(),
    };

    let mut items = Vec::new();
    for (name, entry) in config.select(args.target.profile.as_deref())? {
        let mut item = StatusItem::new(name);
        item.user = entry.user_name().map(String::from);
        item.max_age_hours = entry.max_age_hours();
        match Profile::validate(name, entry) {
            Ok(profile) => {
                if let Err(e) = inspect(&connector, &profile, &mut item, Utc::now()).await {
                    item.error = Some(e.to_string());
                }
            }
            Err(e) => item.error = Some(e.to_string()),
        }
        items.push(item);
    }

    if args.format == "json" {
        let json = serde_json::to_string_pretty(&items).context("serialize status")?;
        println!("{}", json);
    } else {
        println!("{}", status_table(&items));
    }

    if items.iter().any(|i| i.error.is_some()) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

async fn inspect(
    connector: &dyn ProviderConnector,
    profile: &Profile,
    item: &mut StatusItem,
    now: DateTime<Utc>,
) -> Result<()> {
    let provider = connector.connect(&profile.name).await?;
    let lifecycle = CredentialLifecycle::new(profile, provider);
    let current = lifecycle.current_active().await?;
    let decision = policy::decide(current.as_ref(), profile.max_age(), false, now);
    if let Some(current) = current {
        item.age_hours = Some((now - current.created_at).num_minutes() as f64 / 60.0);
        item.access_key_id = Some(current.id);
        item.created_at = Some(current.created_at);
    }
    item.due = Some(decision.is_rotate());
    Ok(())
}

fn status_table(items: &[StatusItem]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("Profile").add_attribute(Attribute::Bold),
        Cell::new("User").add_attribute(Attribute::Bold),
        Cell::new("Access key").add_attribute(Attribute::Bold),
        Cell::new("Created").add_attribute(Attribute::Bold),
        Cell::new("Age").add_attribute(Attribute::Bold),
        Cell::new("Max age").add_attribute(Attribute::Bold),
        Cell::new("Due").add_attribute(Attribute::Bold),
    ]);

    for item in items {
        let created = item
            .created_at
            .map(|t| {
                let local: DateTime<Local> = t.into();
                local.format("%Y-%m-%d %H:%M:%S").to_string()
            })
            .unwrap_or_else(|| "-".to_string());
        let age = item
            .age_hours
            .map(|h| format_hours(chrono::Duration::minutes((h * 60.0) as i64)))
            .unwrap_or_else(|| "-".to_string());
        let max_age = item
            .max_age_hours
            .map(|h| format!("{}h", h))
            .unwrap_or_else(|| "-".to_string());
        let due = match (&item.error, item.due) {
            (Some(err), _) => format!("error: {}", err),
            (None, Some(true)) => "yes".to_string(),
            (None, Some(false)) => "no".to_string(),
            (None, None) => "-".to_string(),
        };
        table.add_row(vec![
            item.profile.clone(),
            item.user.clone().unwrap_or_else(|| "-".to_string()),
            item.access_key_id.clone().unwrap_or_else(|| "-".to_string()),
            created,
            age,
            max_age,
            due,
        ]);
    }
    table
}
