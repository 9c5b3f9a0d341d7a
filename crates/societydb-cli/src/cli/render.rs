//! # Rendering Module
//!
//! Turns `CmdResult` pieces into terminal text. Every `render_*` function returns a
//! `String` and takes `use_color: bool`, so tests can assert on plain output. The
//! `print_*` wrappers resolve color against the terminal and write to stdout.
//!
//! Layout math (column widths, truncation) is Unicode-aware via `unicode-width`;
//! colors come from the semantic names in `styles`.

use super::styles::{color_enabled, names, paint};
use chrono::{DateTime, Utc};
use societydb::audit::AuditEntry;
use societydb::commands::{CmdMessage, MessageLevel, PageInfo, SectionStatus};
use societydb::config::SiteConfig;
use societydb::model::{Mode, Record, Summary};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const LINE_WIDTH: usize = 100;
pub const ID_WIDTH: usize = 24;
pub const TIME_WIDTH: usize = 14;
pub const CATEGORY_WIDTH: usize = 14;
const ELLIPSIS: char = '…';

/// Cuts `text` to at most `width` display columns, ending in an ellipsis when cut.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push(ELLIPSIS);
    out
}

/// Left-aligns `text` in a `width`-column cell, truncating when needed.
fn cell(text: &str, width: usize) -> String {
    let cut = truncate_to_width(text, width);
    let pad = width.saturating_sub(cut.width());
    format!("{}{}", cut, " ".repeat(pad))
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let formatter = timeago::Formatter::new();
    let text = formatter.convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", text, width = TIME_WIDTH)
}

fn title_width() -> usize {
    LINE_WIDTH - ID_WIDTH - CATEGORY_WIDTH - TIME_WIDTH - 3
}

fn level_style(level: &MessageLevel) -> &'static str {
    match level {
        MessageLevel::Info => names::INFO,
        MessageLevel::Success => names::SUCCESS,
        MessageLevel::Warning => names::WARNING,
        MessageLevel::Error => names::ERROR,
    }
}

pub fn render_messages(messages: &[CmdMessage], use_color: bool) -> String {
    let mut out = String::new();
    for message in messages {
        out.push_str(&paint(level_style(&message.level), &message.content, use_color));
        out.push('\n');
    }
    out
}

pub fn print_messages(messages: &[CmdMessage]) {
    let output = render_messages(messages, color_enabled(None));
    if !output.is_empty() {
        print!("{}", output);
    }
}

/// A full record as pretty JSON, as stored on disk.
pub fn render_record(record: &Record) -> String {
    match serde_json::to_string_pretty(record) {
        Ok(json) => format!("{}\n", json),
        Err(e) => format!("Render error: {}\n", e),
    }
}

fn record_line(record: &Record, use_color: bool) -> String {
    let summary = record.summary();
    let category = summary.category.as_deref().unwrap_or("");
    format!(
        "{} {} {} {}\n",
        paint(names::ID, &cell(record.id.as_str(), ID_WIDTH), use_color),
        paint(names::TITLE, &cell(&summary.title, title_width()), use_color),
        paint(names::CATEGORY, &cell(category, CATEGORY_WIDTH), use_color),
        paint(names::TIME, &format_time_ago(record.updated_at), use_color),
    )
}

pub fn render_record_list(records: &[Record], page: Option<&PageInfo>, use_color: bool) -> String {
    if records.is_empty() {
        return paint(names::MUTED, "No records.", use_color) + "\n";
    }
    let mut out = String::new();
    for record in records {
        out.push_str(&record_line(record, use_color));
    }
    if let Some(page) = page {
        if page.total_pages > 1 {
            let footer = format!(
                "Page {} of {} ({} records)",
                page.page, page.total_pages, page.total
            );
            out.push_str(&paint(names::MUTED, &footer, use_color));
            out.push('\n');
        }
    }
    out
}

pub fn render_summaries(summaries: &[Summary], use_color: bool) -> String {
    if summaries.is_empty() {
        return paint(names::MUTED, "No records.", use_color) + "\n";
    }
    let mut out = String::new();
    for summary in summaries {
        let date = summary.date.as_deref().unwrap_or("");
        let category = summary.category.as_deref().unwrap_or("");
        out.push_str(&format!(
            "{} {} {} {}\n",
            paint(names::ID, &cell(summary.id.as_str(), ID_WIDTH), use_color),
            paint(names::TITLE, &cell(&summary.title, title_width()), use_color),
            paint(names::CATEGORY, &cell(category, CATEGORY_WIDTH), use_color),
            paint(names::TIME, &cell(date, TIME_WIDTH), use_color),
        ));
    }
    out
}

pub fn render_deleted(records: &[Record], use_color: bool) -> String {
    if records.is_empty() {
        return paint(names::MUTED, "Nothing deleted.", use_color) + "\n";
    }
    let mut out = String::new();
    for record in records {
        let summary = record.summary();
        let when = record
            .deleted_at
            .map(format_time_ago)
            .unwrap_or_else(|| " ".repeat(TIME_WIDTH));
        let by = record.deleted_by.as_deref().unwrap_or("");
        out.push_str(&format!(
            "{} {} {} {}\n",
            paint(names::ID, &cell(record.id.as_str(), ID_WIDTH), use_color),
            paint(names::DELETED, &cell(&summary.title, title_width()), use_color),
            paint(names::TIME, &when, use_color),
            paint(names::MUTED, by, use_color),
        ));
    }
    out
}

pub fn render_audit(entries: &[AuditEntry], use_color: bool) -> String {
    if entries.is_empty() {
        return paint(names::MUTED, "No audit entries.", use_color) + "\n";
    }
    let mut out = String::new();
    for entry in entries {
        let target = match (&entry.section, &entry.record_id) {
            (Some(section), Some(id)) => format!("{}/{}", section, id),
            (Some(section), None) => section.to_string(),
            (None, Some(id)) => id.to_string(),
            (None, None) => String::new(),
        };
        let mut line = format!(
            "{} {} {} {}",
            paint(
                names::TIME,
                &entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                use_color
            ),
            paint(names::CATEGORY, &cell(entry.action.as_str(), 9), use_color),
            paint(names::ID, &cell(&target, ID_WIDTH + 10), use_color),
            entry.user,
        );
        if let Some(details) = &entry.details {
            line.push(' ');
            line.push_str(&paint(names::MUTED, &details.to_string(), use_color));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

pub fn render_status(mode: Mode, status: &[SectionStatus], use_color: bool) -> String {
    let mut out = format!(
        "{} {}\n",
        paint(names::HEADER, "Mode:", use_color),
        paint(names::TITLE, mode.as_str(), use_color)
    );
    for row in status {
        out.push_str(&format!(
            "  {} {:>5} active {:>5} deleted\n",
            cell(row.section.as_str(), 12),
            row.active,
            row.deleted
        ));
    }
    out
}

/// The whole site config, or the value of `key`, as JSON.
pub fn render_settings(settings: &SiteConfig, key: Option<&str>) -> String {
    let rendered = match key {
        Some(key) => match settings.get(key) {
            Some(value) => serde_json::to_string_pretty(&value),
            None => return format!("{} is not set\n", key),
        },
        None => serde_json::to_string_pretty(settings),
    };
    match rendered {
        Ok(json) => format!("{}\n", json),
        Err(e) => format!("Render error: {}\n", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};
    use societydb::audit::AuditAction;
    use societydb::model::{RecordId, Section};

    fn make_record(id: &str, fields: Value) -> Record {
        let fields: Map<String, Value> = fields.as_object().cloned().unwrap();
        Record::new(RecordId::parse(id).unwrap(), fields, "admin", Utc::now())
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdefghij", 5), "abcd…");
        assert_eq!(truncate_to_width("abc", 0), "");
        // Wide glyphs count as two columns.
        let cut = truncate_to_width("会議のお知らせです", 7);
        assert!(cut.width() <= 7);
        assert!(cut.ends_with(ELLIPSIS));
    }

    #[test]
    fn test_render_empty_list() {
        assert_eq!(render_record_list(&[], None, false), "No records.\n");
    }

    #[test]
    fn test_render_record_line() {
        let record = make_record(
            "NOT-20260102120000",
            json!({"title": "Water supply cut", "category": "maintenance"}),
        );
        let output = render_record_list(&[record], None, false);
        assert!(output.contains("NOT-20260102120000"));
        assert!(output.contains("Water supply cut"));
        assert!(output.contains("maintenance"));
        assert!(!output.contains("\u{1b}["));
    }

    #[test]
    fn test_page_footer_only_when_paged() {
        let record = make_record("A", json!({"title": "A"}));
        let single = PageInfo {
            total: 1,
            page: 1,
            per_page: 10,
            total_pages: 1,
        };
        assert!(!render_record_list(&[record.clone()], Some(&single), false).contains("Page"));

        let paged = PageInfo {
            total: 12,
            page: 2,
            per_page: 10,
            total_pages: 2,
        };
        assert!(render_record_list(&[record], Some(&paged), false)
            .contains("Page 2 of 2 (12 records)"));
    }

    #[test]
    fn test_render_deleted_shows_who() {
        let mut record = make_record("EVT-1", json!({"title": "Holi"}));
        record.mark_deleted("treasurer", Utc::now());
        let output = render_deleted(&[record], false);
        assert!(output.contains("Holi"));
        assert!(output.contains("treasurer"));
        assert_eq!(render_deleted(&[], false), "Nothing deleted.\n");
    }

    #[test]
    fn test_render_audit_line() {
        let id = RecordId::parse("NOT-1").unwrap();
        let entry = AuditEntry::for_record(AuditAction::Delete, Section::Notices, &id, "admin")
            .with_details(json!({"title": "Old"}));
        let output = render_audit(&[entry], false);
        assert!(output.contains("delete"));
        assert!(output.contains("notices/NOT-1"));
        assert!(output.contains("admin"));
        assert!(output.contains(r#"{"title":"Old"}"#));
    }

    #[test]
    fn test_render_messages_plain() {
        let output = render_messages(
            &[CmdMessage::success("Created A"), CmdMessage::warning("careful")],
            false,
        );
        assert_eq!(output, "Created A\ncareful\n");
    }

    #[test]
    fn test_render_status() {
        let rows = vec![SectionStatus {
            section: Section::Events,
            active: 3,
            deleted: 1,
        }];
        let output = render_status(Mode::Production, &rows, false);
        assert!(output.starts_with("Mode: production"));
        assert!(output.contains("events"));
        assert!(output.contains("3 active"));
        assert!(output.contains("1 deleted"));
    }

    #[test]
    fn test_render_settings_key() {
        let config: SiteConfig =
            serde_json::from_value(json!({"mode": "demo", "societyName": "Green Acres"})).unwrap();
        assert_eq!(
            render_settings(&config, Some("societyName")),
            "\"Green Acres\"\n"
        );
        assert_eq!(render_settings(&config, Some("phone")), "phone is not set\n");
        assert!(render_settings(&config, None).contains("\"mode\": \"demo\""));
    }

    #[test]
    fn test_render_record_is_json() {
        let record = make_record("GAL-1", json!({"title": "Diwali"}));
        let parsed: Value = serde_json::from_str(&render_record(&record)).unwrap();
        assert_eq!(parsed["id"], "GAL-1");
        assert_eq!(parsed["title"], "Diwali");
    }
}
