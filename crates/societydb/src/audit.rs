//! # Audit Trail
//!
//! Every mutating operation appends one JSON line to `<base>/audit.log`:
//!
//! ```text
//! {"timestamp":"2026-01-02T12:00:00Z","action":"create","section":"notices","recordId":"NOT-20260102120000","user":"admin","details":{"title":"Lift repair"}}
//! ```
//!
//! Lines are never edited. Queries are a linear scan over the whole file, which is
//! fine for the volume a single society admin produces.
//!
//! ## Rotation
//!
//! [`partition_for_rotation`] splits the live log at a cutoff: older lines are
//! appended to `audit-archive/audit-<YYYY-MM-DD>.log` (dated by the day the rotation
//! ran) and the live log is rewritten with what remains. Lines that fail to parse
//! are kept in the live log rather than archived or dropped.

use crate::model::{RecordId, Section};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Result, SocietyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Restore,
    Purge,
    Cleanup,
    Settings,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
            AuditAction::Restore => "restore",
            AuditAction::Purge => "purge",
            AuditAction::Cleanup => "cleanup",
            AuditAction::Settings => "settings",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = SocietyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(AuditAction::Create),
            "update" => Ok(AuditAction::Update),
            "delete" => Ok(AuditAction::Delete),
            "restore" => Ok(AuditAction::Restore),
            "purge" => Ok(AuditAction::Purge),
            "cleanup" => Ok(AuditAction::Cleanup),
            "settings" => Ok(AuditAction::Settings),
            _ => Err(SocietyError::Api(format!("Unknown audit action: {}", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<RecordId>,
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl AuditEntry {
    pub fn new(action: AuditAction, user: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            action,
            section: None,
            record_id: None,
            user: user.to_string(),
            details: None,
        }
    }

    /// Entry about a single record.
    pub fn for_record(action: AuditAction, section: Section, id: &RecordId, user: &str) -> Self {
        Self {
            section: Some(section),
            record_id: Some(id.clone()),
            ..Self::new(action, user)
        }
    }

    pub fn with_section(mut self, section: Section) -> Self {
        self.section = Some(section);
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn to_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_line(line: &str) -> Option<Self> {
        serde_json::from_str(line).ok()
    }
}

/// Conjunctive filter for audit queries. `since` is inclusive, `until` exclusive.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub section: Option<Section>,
    pub user: Option<String>,
    pub action: Option<AuditAction>,
    pub record_id: Option<RecordId>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl AuditFilter {
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(section) = self.section {
            if entry.section != Some(section) {
                return false;
            }
        }
        if let Some(user) = &self.user {
            if &entry.user != user {
                return false;
            }
        }
        if let Some(action) = self.action {
            if entry.action != action {
                return false;
            }
        }
        if let Some(id) = &self.record_id {
            if entry.record_id.as_ref() != Some(id) {
                return false;
            }
        }
        if let Some(since) = self.since {
            if entry.timestamp < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if entry.timestamp >= until {
                return false;
            }
        }
        true
    }

    /// Applies the filter, newest first, truncated to `limit`.
    pub fn apply(&self, entries: Vec<AuditEntry>) -> Vec<AuditEntry> {
        let mut matched: Vec<AuditEntry> =
            entries.into_iter().filter(|e| self.matches(e)).collect();
        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }
        matched
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RotationReport {
    pub archived: usize,
    pub kept: usize,
    pub archive_path: Option<PathBuf>,
}

/// Splits raw log lines into `(archived, kept)` around `cutoff`.
pub fn partition_for_rotation(
    lines: Vec<String>,
    cutoff: DateTime<Utc>,
) -> (Vec<String>, Vec<String>) {
    let mut archived = Vec::new();
    let mut kept = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        match AuditEntry::from_line(&line) {
            Some(entry) if entry.timestamp < cutoff => archived.push(line),
            _ => kept.push(line),
        }
    }
    (archived, kept)
}

pub fn archive_file_name(day: NaiveDate) -> String {
    format!("audit-{}.log", day.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 9, 0, 0).unwrap()
    }

    fn entry(action: AuditAction, section: Section, user: &str, day: u32) -> AuditEntry {
        let id = RecordId::parse("NOT-1").unwrap();
        AuditEntry::for_record(action, section, &id, user).at(ts(day))
    }

    #[test]
    fn test_line_format() {
        let line = entry(AuditAction::Create, Section::Notices, "admin", 1)
            .with_details(json!({"title": "Hi"}))
            .to_line()
            .unwrap();
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["action"], "create");
        assert_eq!(value["section"], "notices");
        assert_eq!(value["recordId"], "NOT-1");
        assert_eq!(value["user"], "admin");
        assert_eq!(value["details"]["title"], "Hi");
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_from_line_rejects_garbage() {
        assert!(AuditEntry::from_line("not json").is_none());
        assert!(AuditEntry::from_line("{\"action\":\"create\"}").is_none());
    }

    #[test]
    fn test_filter_composes() {
        let entries = vec![
            entry(AuditAction::Create, Section::Notices, "alice", 1),
            entry(AuditAction::Update, Section::Notices, "bob", 2),
            entry(AuditAction::Create, Section::Events, "alice", 3),
            entry(AuditAction::Delete, Section::Notices, "alice", 4),
        ];

        let filter = AuditFilter {
            section: Some(Section::Notices),
            user: Some("alice".into()),
            ..Default::default()
        };
        let result = filter.apply(entries.clone());
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].action, AuditAction::Delete);
        assert_eq!(result[1].action, AuditAction::Create);

        let by_action = AuditFilter {
            action: Some(AuditAction::Create),
            ..Default::default()
        };
        assert_eq!(by_action.apply(entries).len(), 2);
    }

    #[test]
    fn test_date_range_is_half_open() {
        let entries: Vec<AuditEntry> = (1..=5)
            .map(|d| entry(AuditAction::Update, Section::Notices, "admin", d))
            .collect();
        let filter = AuditFilter {
            since: Some(ts(2)),
            until: Some(ts(4)),
            ..Default::default()
        };
        let days: Vec<DateTime<Utc>> = filter.apply(entries).iter().map(|e| e.timestamp).collect();
        assert_eq!(days, vec![ts(3), ts(2)]);
    }

    #[test]
    fn test_limit_keeps_newest() {
        let entries: Vec<AuditEntry> = (1..=5)
            .map(|d| entry(AuditAction::Update, Section::Notices, "admin", d))
            .collect();
        let filter = AuditFilter {
            limit: Some(2),
            ..Default::default()
        };
        let result = filter.apply(entries);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].timestamp, ts(5));
    }

    #[test]
    fn test_partition_for_rotation() {
        let old = entry(AuditAction::Create, Section::Notices, "admin", 1)
            .to_line()
            .unwrap();
        let new = entry(AuditAction::Create, Section::Notices, "admin", 20)
            .to_line()
            .unwrap();
        let lines = vec![old.clone(), "garbage".to_string(), String::new(), new.clone()];

        let (archived, kept) = partition_for_rotation(lines, ts(10));
        assert_eq!(archived, vec![old]);
        assert_eq!(kept, vec!["garbage".to_string(), new]);
    }

    #[test]
    fn test_archive_file_name() {
        let day = (ts(7) + Duration::hours(1)).date_naive();
        assert_eq!(archive_file_name(day), "audit-2026-03-07.log");
    }

    #[test]
    fn test_action_parse() {
        assert_eq!("Purge".parse::<AuditAction>().unwrap(), AuditAction::Purge);
        assert!("drop".parse::<AuditAction>().is_err());
    }
}
