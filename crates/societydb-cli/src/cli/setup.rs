use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "societydb",
    bin_name = "societydb",
    version,
    disable_help_subcommand = true,
    after_help = "Sections: notices, documents, events, gallery, committee, contact, settings"
)]
#[command(about = "File-based content store for a residential society website", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base data directory (overrides SOCIETYDB_DATA_DIR and societydb.toml)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// Data tree to use: demo or production
    #[arg(long, global = true, value_name = "MODE", help_heading = "Options")]
    pub mode: Option<String>,

    /// Name recorded in stamps and the audit log
    #[arg(long, global = true, value_name = "NAME", help_heading = "Options")]
    pub user: Option<String>,

    /// Log to stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count, help_heading = "Options")]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the directory layout, master files and site config
    Init,

    /// Create a record
    Create {
        section: String,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Update fields of an active record
    Update {
        section: String,
        id: String,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Show one active record as JSON
    Get { section: String, id: String },

    /// List active records
    #[command(alias = "ls")]
    List {
        section: String,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Show a section's master summaries
    Master { section: String },

    /// Soft-delete records (moves them under deleted/)
    #[command(alias = "rm")]
    Delete {
        section: String,
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Bring soft-deleted records back
    Restore {
        section: String,
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// List soft-deleted records
    Deleted { section: String },

    /// Permanently remove soft-deleted records
    Purge {
        section: String,
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Purge soft-deleted records older than a number of days
    Cleanup {
        /// Only this section (default: all sections)
        #[arg(long)]
        section: Option<String>,

        /// Age threshold in days (default: cleanup_after_days)
        #[arg(long)]
        days: Option<u32>,
    },

    /// Query the audit log (newest first)
    Audit(AuditArgs),

    /// Move old audit entries to the archive
    RotateAudit {
        /// Age threshold in days (default: audit_retention_days)
        #[arg(long)]
        days: Option<u32>,
    },

    /// Show or change site settings (config/config.json)
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },

    /// Reconcile master files with the records on disk
    Doctor {
        /// Only this section (default: all sections)
        section: Option<String>,
    },

    /// Record counts per section
    Status,

    /// Write a .tar.gz archive of the current data tree
    Backup {
        /// Archive path (default: a dated file in the current directory)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Print a documented societydb.toml template
    Config,
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// Show all settings, or one key
    Get { key: Option<String> },
    /// Set one key (the value is parsed as JSON when possible)
    Set {
        key: String,
        #[arg(value_parser = parse_value)]
        value: Value,
    },
}

#[derive(Args, Debug, Default)]
pub struct PayloadArgs {
    /// Field assignment, repeatable: --set title="Lift repair" --set floor=3
    #[arg(long = "set", short = 's', value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub sets: Vec<(String, Value)>,

    /// Fields as a JSON object
    #[arg(long, value_name = "OBJECT")]
    pub json: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct QueryArgs {
    /// Case-insensitive text search over content fields
    #[arg(long)]
    pub search: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    /// Exact field match, repeatable: --where status=open
    #[arg(long = "where", short = 'w', value_name = "KEY=VALUE", value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,

    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Page size (0 shows everything; default: per_page)
    #[arg(long)]
    pub per_page: Option<usize>,

    /// Oldest first
    #[arg(long)]
    pub oldest: bool,
}

#[derive(Args, Debug, Default)]
pub struct AuditArgs {
    #[arg(long)]
    pub section: Option<String>,

    #[arg(long = "by", value_name = "USER")]
    pub user: Option<String>,

    /// create, update, delete, restore, purge, cleanup or settings
    #[arg(long)]
    pub action: Option<String>,

    #[arg(long)]
    pub record: Option<String>,

    /// RFC 3339 timestamp or YYYY-MM-DD
    #[arg(long, value_parser = parse_time)]
    pub since: Option<DateTime<Utc>>,

    /// RFC 3339 timestamp or YYYY-MM-DD (exclusive)
    #[arg(long, value_parser = parse_time)]
    pub until: Option<DateTime<Utc>>,

    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

/// JSON when it parses, a plain string otherwise.
pub fn parse_value(raw: &str) -> Result<Value, String> {
    Ok(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())))
}

fn split_pair(raw: &str) -> Result<(&str, &str), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{}'", raw));
    }
    Ok((key, value))
}

pub fn parse_assignment(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = split_pair(raw)?;
    Ok((key.to_string(), parse_value(value)?))
}

pub fn parse_filter(raw: &str) -> Result<(String, String), String> {
    let (key, value) = split_pair(raw)?;
    Ok((key.to_string(), value.to_string()))
}

/// A date means midnight UTC of that day.
pub fn parse_time(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("expected RFC 3339 or YYYY-MM-DD, got '{}'", raw))
}
