use anyhow::{bail, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde_json::Value;

use crate::activity::{ActivityLog, ConsoleSink, Fanout};
use crate::config::{self, Overrides};
use crate::github::manager::Manager;
use crate::github::transport::HttpTransport;
use crate::model::credentials::RepoRef;
use crate::model::entry::FormRecord;
use crate::model::kind::{ListMode, ResourceKind};
use crate::model::remote::{RemoteLabel, RemoteMilestone};

#[derive(Parser, Debug)]
#[command(name = "repo-labels")]
#[command(about = "Manage GitHub labels and milestones across repositories")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Repository to edit, overrides the config file (OWNER/REPO)
    #[arg(long, global = true)]
    pub home_repo: Option<String>,

    /// Repository to copy from, overrides the config file (OWNER/REPO)
    #[arg(long, global = true)]
    pub template_repo: Option<String>,

    /// Personal access token, overrides the config file
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace). Default is warn.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every entry of a kind
    List {
        /// label or milestone
        kind: String,
        /// Read from the template repository instead of the home one
        #[arg(long)]
        template: bool,
    },
    /// Create an entry in the home repository
    Create {
        kind: String,
        #[command(flatten)]
        entry: EntryArgs,
    },
    /// Update an existing entry (labels by --original-name, milestones by --number)
    Update {
        kind: String,
        #[command(flatten)]
        entry: EntryArgs,
    },
    /// Delete an entry by label name or milestone number
    Delete { kind: String, sign: String },
    /// Copy every entry of a kind from the template repository
    Copy { kind: String },
    /// Delete every entry of a kind from the home repository
    Purge {
        kind: String,
        /// Required: confirms the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Show recent activity
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

/// The edit form, one flag per field.
#[derive(Args, Debug, Default)]
pub struct EntryArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub original_name: Option<String>,
    #[arg(long)]
    pub color: Option<String>,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub original_title: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub due_date: Option<String>,
    /// HH:MM:SS, defaults to midnight
    #[arg(long)]
    pub due_time: Option<String>,
    #[arg(long)]
    pub number: Option<u64>,
}

impl From<EntryArgs> for FormRecord {
    fn from(args: EntryArgs) -> Self {
        FormRecord {
            name: args.name,
            original_name: args.original_name,
            color: args.color,
            title: args.title,
            original_title: args.original_title,
            state: args.state,
            description: args.description,
            due_date: args.due_date,
            due_time: args.due_time,
            number: args.number,
        }
    }
}

/// Run one command. Returns `false` when the operation failed; the failure has
/// already been reported to the user by then.
pub async fn run(cli: Cli) -> Result<bool> {
    if let Command::History { limit } = cli.command {
        print_history(limit);
        return Ok(true);
    }
    if let Command::Purge { yes: false, kind } = &cli.command {
        bail!("Refusing to delete every {kind} without --yes");
    }

    let config = config::load_config()?;
    let overrides = Overrides {
        token: cli.token,
        home: cli.home_repo.as_deref().map(str::parse::<RepoRef>).transpose()?,
        template: cli.template_repo.as_deref().map(str::parse::<RepoRef>).transpose()?,
    };
    let creds = config::resolve_credentials(&config, overrides)?;

    let sink = Fanout(vec![Box::new(ConsoleSink), Box::new(ActivityLog::new())]);
    let manager = Manager::new(creds, Box::new(HttpTransport::new()), Box::new(sink));

    let ok = match cli.command {
        Command::List { kind, template } => {
            let mode = if template {
                ListMode::Template
            } else {
                ListMode::List
            };
            match manager.list(&kind, mode).await {
                Ok(records) => {
                    // `list` already validated the kind.
                    let kind: ResourceKind = kind.parse()?;
                    for line in records.iter().map(|r| format_record(kind, r)) {
                        println!("{line}");
                    }
                    true
                }
                Err(_) => false,
            }
        }
        Command::Create { kind, entry } => manager.create(&kind, &entry.into()).await.is_ok(),
        Command::Update { kind, entry } => manager.update(&kind, &entry.into()).await.is_ok(),
        Command::Delete { kind, sign } => manager.delete(&kind, &sign).await.is_ok(),
        Command::Copy { kind } => manager
            .copy_from_template(&kind)
            .await
            .is_ok_and(|report| report.failed == 0),
        Command::Purge { kind, .. } => manager
            .purge(&kind)
            .await
            .is_ok_and(|report| report.failed == 0),
        Command::History { .. } => true,
    };

    Ok(ok)
}

fn print_history(limit: usize) {
    let events = ActivityLog::new().read_events(Some(limit));
    if events.is_empty() {
        println!("No activity recorded yet.");
        return;
    }
    for event in events {
        println!("{}  {:<7} {}", event.timestamp, event.action, event.message);
    }
}

/// One display line for a listed record; falls back to raw JSON if it does not decode.
pub fn format_record(kind: ResourceKind, record: &Value) -> String {
    let decoded = match kind {
        ResourceKind::Label => {
            serde_json::from_value::<RemoteLabel>(record.clone()).map(|l| format_label(&l))
        }
        ResourceKind::Milestone => {
            serde_json::from_value::<RemoteMilestone>(record.clone()).map(|m| format_milestone(&m))
        }
    };
    decoded.unwrap_or_else(|_| record.to_string())
}

fn format_label(label: &RemoteLabel) -> String {
    match label.description.as_deref().filter(|d| !d.is_empty()) {
        Some(desc) => format!("{}  #{}  {desc}", label.name, label.color),
        None => format!("{}  #{}", label.name, label.color),
    }
}

fn format_milestone(milestone: &RemoteMilestone) -> String {
    let mut line = format!(
        "#{}  {}  [{}]",
        milestone.number, milestone.title, milestone.state
    );
    if let Some(due) = &milestone.due_on {
        line.push_str(&format!("  due {due}"));
    }
    if let Some(desc) = milestone.description.as_deref().filter(|d| !d.is_empty()) {
        line.push_str(&format!("  {desc}"));
    }
    line
}
