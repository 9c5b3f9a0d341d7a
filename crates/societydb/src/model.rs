//! # Domain Model: Sections, Records and Master Summaries
//!
//! This module defines the core data structures of the store: [`Section`], [`Mode`],
//! [`RecordId`], [`Record`] and [`Summary`].
//!
//! ## Records
//!
//! A record is a loosely-typed JSON object. The store only cares about a handful of
//! bookkeeping keys; everything else is content owned by whoever submitted it:
//!
//! ```text
//! {
//!   "id": "NOT-20260102120000",        <-- assigned on create, never rewritten
//!   "title": "Water supply cut",       <-- free-form content fields
//!   "category": "maintenance",
//!   "createdAt": "...", "createdBy": "admin",
//!   "updatedAt": "...", "updatedBy": "admin",
//!   "deletedAt": "...", "deletedBy": "admin"   <-- only while under deleted/
//! }
//! ```
//!
//! The bookkeeping keys are listed in [`RESERVED_KEYS`]. Submitted payloads are
//! stripped of them before they are merged into a record, so content can never
//! forge a stamp or rename a record.
//!
//! ## Master Summaries
//!
//! Each section keeps a `master.json` array of [`Summary`] entries so list views do
//! not need to open every record. The summary is always *derived* from the record
//! (see [`Summary::from_record`]); it is never edited on its own.
//!
//! ## Record Ids
//!
//! Generated ids look like `NOT-20260102120000`: the section prefix plus the UTC
//! creation time to the second. Ids double as file names, so any id that comes from
//! outside goes through [`RecordId::parse`], which only admits ASCII alphanumerics,
//! `-` and `_`, and refuses `master` (the index file shares the folder).

use crate::error::{Result, SocietyError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Keys owned by the store. Never taken from submitted data.
pub const RESERVED_KEYS: &[&str] = &[
    "id",
    "createdAt",
    "createdBy",
    "updatedAt",
    "updatedBy",
    "deletedAt",
    "deletedBy",
];

const MAX_ID_LEN: usize = 128;

/// File stem of the section index. Never a record id.
pub const MASTER_STEM: &str = "master";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Notices,
    Documents,
    Events,
    Gallery,
    Committee,
    Contact,
    Settings,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Notices,
        Section::Documents,
        Section::Events,
        Section::Gallery,
        Section::Committee,
        Section::Contact,
        Section::Settings,
    ];

    /// Directory name under the mode tree.
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Notices => "notices",
            Section::Documents => "documents",
            Section::Events => "events",
            Section::Gallery => "gallery",
            Section::Committee => "committee",
            Section::Contact => "contact",
            Section::Settings => "settings",
        }
    }

    pub fn id_prefix(&self) -> &'static str {
        match self {
            Section::Notices => "NOT",
            Section::Documents => "DOC",
            Section::Events => "EVT",
            Section::Gallery => "GAL",
            Section::Committee => "COM",
            Section::Contact => "CON",
            Section::Settings => "SET",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = SocietyError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Section::ALL
            .iter()
            .copied()
            .find(|section| section.as_str() == wanted)
            .ok_or_else(|| SocietyError::UnknownSection(s.to_string()))
    }
}

/// Which data tree (`<base>/<mode>/`) is read and written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Demo,
    Production,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Demo => "demo",
            Mode::Production => "production",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = SocietyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "demo" => Ok(Mode::Demo),
            "production" | "prod" => Ok(Mode::Production),
            _ => Err(SocietyError::UnknownMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Validates an externally supplied id.
    pub fn parse(raw: &str) -> Result<Self> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_ID_LEN
            && !raw.eq_ignore_ascii_case(MASTER_STEM)
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(RecordId(raw.to_string()))
        } else {
            Err(SocietyError::InvalidId(raw.to_string()))
        }
    }

    /// Base id for a record created at `now`, e.g. `EVT-20260102120000`.
    pub fn generate(section: Section, now: DateTime<Utc>) -> Self {
        RecordId(format!(
            "{}-{}",
            section.id_prefix(),
            now.format("%Y%m%d%H%M%S")
        ))
    }

    /// The `n`th fallback when the base id is already taken (`n >= 2`).
    pub fn with_suffix(&self, n: u32) -> Self {
        RecordId(format!("{}-{}", self.0, n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecordId {
    type Err = SocietyError;

    fn from_str(s: &str) -> Result<Self> {
        RecordId::parse(s)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: RecordId, fields: Map<String, Value>, user: &str, now: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at: now,
            created_by: user.to_string(),
            updated_at: now,
            updated_by: user.to_string(),
            deleted_at: None,
            deleted_by: None,
            fields: strip_reserved(fields),
        }
    }

    /// Overlays `patch` onto the content fields (shallow) and stamps the update.
    pub fn apply_update(&mut self, patch: Map<String, Value>, user: &str, now: DateTime<Utc>) {
        for (key, value) in strip_reserved(patch) {
            self.fields.insert(key, value);
        }
        self.touch(user, now);
    }

    pub fn touch(&mut self, user: &str, now: DateTime<Utc>) {
        self.updated_at = now;
        self.updated_by = user.to_string();
    }

    pub fn mark_deleted(&mut self, user: &str, now: DateTime<Utc>) {
        self.deleted_at = Some(now);
        self.deleted_by = Some(user.to_string());
    }

    pub fn clear_deleted(&mut self) {
        self.deleted_at = None;
        self.deleted_by = None;
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// A content field, if it holds a string.
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn summary(&self) -> Summary {
        Summary::from_record(self)
    }
}

/// Removes bookkeeping keys from a submitted payload.
pub fn strip_reserved(mut fields: Map<String, Value>) -> Map<String, Value> {
    for key in RESERVED_KEYS {
        fields.remove(*key);
    }
    fields
}

/// Textual form of a JSON scalar, used for equality filters.
pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// One entry of a section's `master.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub id: RecordId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Summary {
    pub fn from_record(record: &Record) -> Self {
        let title = ["title", "name"]
            .iter()
            .filter_map(|key| record.field_str(key))
            .find(|s| !s.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| record.id.to_string());

        let date = ["date", "eventDate", "publishDate"]
            .iter()
            .find_map(|key| record.field_str(key))
            .map(str::to_string);

        Self {
            id: record.id.clone(),
            title,
            date,
            category: record.field_str("category").map(str::to_string),
            updated_at: Some(record.updated_at),
        }
    }
}
