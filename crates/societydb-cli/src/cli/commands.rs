use super::render::{
    print_messages, render_audit, render_deleted, render_record, render_record_list,
    render_settings, render_status, render_summaries,
};
use super::setup::{AuditArgs, Cli, Commands, PayloadArgs, QueryArgs, SettingsAction};
use super::styles::color_enabled;
use anyhow::{bail, Context, Result};
use clap::Parser;
use console::Term;
use serde_json::{Map, Value};
use societydb::api::{parse_action, parse_section};
use societydb::audit::AuditFilter;
use societydb::commands::get::{RecordQuery, SortOrder};
use societydb::config::{user_config_path, StoreConfig, CONFIG_FILE_NAME};
use societydb::init::{initialize, SocietyContext};
use societydb::model::RecordId;
use tracing_subscriber::EnvFilter;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Commands::Config = cli.command {
        return handle_config();
    }

    let mut config = StoreConfig::load()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(mode) = cli.mode {
        config.mode = Some(mode);
    }
    if let Some(user) = cli.user {
        config.user = user;
    }

    let mut ctx = initialize(config)?;
    tracing::debug!(mode = %ctx.mode, base = %ctx.base.display(), "context ready");

    match cli.command {
        Commands::Init => handle_init(&mut ctx),
        Commands::Create { section, payload } => handle_create(&mut ctx, &section, payload),
        Commands::Update {
            section,
            id,
            payload,
        } => handle_update(&mut ctx, &section, &id, payload),
        Commands::Get { section, id } => handle_get(&ctx, &section, &id),
        Commands::List { section, query } => handle_list(&ctx, &section, query),
        Commands::Master { section } => handle_master(&ctx, &section),
        Commands::Delete { section, ids } => handle_delete(&mut ctx, &section, &ids),
        Commands::Restore { section, ids } => handle_restore(&mut ctx, &section, &ids),
        Commands::Deleted { section } => handle_deleted(&ctx, &section),
        Commands::Purge { section, ids, yes } => handle_purge(&mut ctx, &section, &ids, yes),
        Commands::Cleanup { section, days } => handle_cleanup(&mut ctx, section.as_deref(), days),
        Commands::Audit(args) => handle_audit(&ctx, args),
        Commands::RotateAudit { days } => handle_rotate(&mut ctx, days),
        Commands::Settings { action } => handle_settings(&mut ctx, action),
        Commands::Doctor { section } => handle_doctor(&mut ctx, section.as_deref()),
        Commands::Status => handle_status(&ctx),
        Commands::Backup { output } => handle_backup(&ctx, output.as_deref()),
        Commands::Config => handle_config(),
    }
}

/// Logs go to stderr so stdout stays clean for piping. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Merges `--json` and `--set` into one object. `--set` wins on conflicts.
fn build_payload(payload: PayloadArgs) -> Result<Map<String, Value>> {
    let mut data = match payload.json {
        Some(raw) => match serde_json::from_str::<Value>(&raw).context("--json is not valid JSON")? {
            Value::Object(map) => map,
            _ => bail!("--json must be a JSON object"),
        },
        None => Map::new(),
    };
    for (key, value) in payload.sets {
        data.insert(key, value);
    }
    Ok(data)
}

fn build_query(args: QueryArgs) -> RecordQuery {
    RecordQuery {
        filters: args.filters,
        category: args.category,
        search: args.search,
        sort: if args.oldest {
            SortOrder::Oldest
        } else {
            SortOrder::Newest
        },
        page: args.page.max(1),
        per_page: args.per_page,
    }
}

fn build_audit_filter(args: AuditArgs) -> Result<AuditFilter> {
    Ok(AuditFilter {
        section: args.section.as_deref().map(parse_section).transpose()?,
        user: args.user,
        action: args.action.as_deref().map(parse_action).transpose()?,
        record_id: args.record.as_deref().map(RecordId::parse).transpose()?,
        since: args.since,
        until: args.until,
        limit: args.limit,
    })
}

fn handle_init(ctx: &mut SocietyContext) -> Result<()> {
    let result = ctx.api.init()?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_create(ctx: &mut SocietyContext, section: &str, payload: PayloadArgs) -> Result<()> {
    let data = build_payload(payload)?;
    let result = ctx.api.create(section, data)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_update(
    ctx: &mut SocietyContext,
    section: &str,
    id: &str,
    payload: PayloadArgs,
) -> Result<()> {
    let data = build_payload(payload)?;
    if data.is_empty() {
        bail!("Nothing to update: pass --set KEY=VALUE or --json");
    }
    let result = ctx.api.update(section, id, data)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_get(ctx: &SocietyContext, section: &str, id: &str) -> Result<()> {
    let result = ctx.api.get(section, id)?;
    for record in &result.listed_records {
        print!("{}", render_record(record));
    }
    Ok(())
}

fn handle_list(ctx: &SocietyContext, section: &str, args: QueryArgs) -> Result<()> {
    let query = build_query(args);
    let result = ctx.api.query(section, &query)?;
    print!(
        "{}",
        render_record_list(&result.listed_records, result.page.as_ref(), color_enabled(None))
    );
    Ok(())
}

fn handle_master(ctx: &SocietyContext, section: &str) -> Result<()> {
    let result = ctx.api.master(section)?;
    print!("{}", render_summaries(&result.summaries, color_enabled(None)));
    Ok(())
}

fn handle_delete(ctx: &mut SocietyContext, section: &str, ids: &[String]) -> Result<()> {
    let result = ctx.api.delete(section, ids)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_restore(ctx: &mut SocietyContext, section: &str, ids: &[String]) -> Result<()> {
    let result = ctx.api.restore(section, ids)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_deleted(ctx: &SocietyContext, section: &str) -> Result<()> {
    let result = ctx.api.list_deleted(section)?;
    print!("{}", render_deleted(&result.listed_records, color_enabled(None)));
    Ok(())
}

fn handle_purge(ctx: &mut SocietyContext, section: &str, ids: &[String], yes: bool) -> Result<()> {
    let doomed = ctx.api.purge_preview(section, ids)?;
    if !yes {
        print!("{}", render_deleted(&doomed, color_enabled(None)));
        if !confirm(&format!(
            "Permanently remove {} record(s)? [y/N] ",
            doomed.len()
        ))? {
            println!("Aborted.");
            return Ok(());
        }
    }
    let result = ctx.api.purge(section, ids)?;
    print_messages(&result.messages);
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    let term = Term::stderr();
    if !term.is_term() {
        bail!("Refusing to purge without confirmation; pass --yes");
    }
    term.write_str(prompt)?;
    let answer = term.read_line()?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn handle_cleanup(ctx: &mut SocietyContext, section: Option<&str>, days: Option<u32>) -> Result<()> {
    let result = ctx.api.cleanup(section, days)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_audit(ctx: &SocietyContext, args: AuditArgs) -> Result<()> {
    let filter = build_audit_filter(args)?;
    let result = ctx.api.audit(&filter)?;
    print!("{}", render_audit(&result.audit_entries, color_enabled(None)));
    Ok(())
}

fn handle_rotate(ctx: &mut SocietyContext, days: Option<u32>) -> Result<()> {
    let result = ctx.api.rotate_audit(days)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_settings(ctx: &mut SocietyContext, action: Option<SettingsAction>) -> Result<()> {
    match action {
        None => print_settings(ctx, None),
        Some(SettingsAction::Get { key }) => print_settings(ctx, key.as_deref()),
        Some(SettingsAction::Set { key, value }) => {
            let mut patch = Map::new();
            patch.insert(key, value);
            let result = ctx.api.update_settings(patch)?;
            print_messages(&result.messages);
            Ok(())
        }
    }
}

fn print_settings(ctx: &SocietyContext, key: Option<&str>) -> Result<()> {
    let result = ctx.api.settings()?;
    let settings = result.settings.unwrap_or_default();
    print!("{}", render_settings(&settings, key));
    Ok(())
}

fn handle_doctor(ctx: &mut SocietyContext, section: Option<&str>) -> Result<()> {
    let result = ctx.api.doctor(section)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_status(ctx: &SocietyContext) -> Result<()> {
    let result = ctx.api.status()?;
    print!(
        "{}",
        render_status(ctx.mode, &result.status, color_enabled(None))
    );
    println!("Data directory: {}", ctx.base.display());
    Ok(())
}

fn handle_backup(ctx: &SocietyContext, output: Option<&std::path::Path>) -> Result<()> {
    let result = ctx.api.backup(output)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_config() -> Result<()> {
    println!("# Save as ./{} or {}", CONFIG_FILE_NAME, describe_user_path());
    print!("{}", StoreConfig::template());
    Ok(())
}

fn describe_user_path() -> String {
    user_config_path()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "(no user config directory)".to_string())
}
