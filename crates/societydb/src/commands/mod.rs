//! # Command Layer
//!
//! This module contains the **core business logic**. Each command lives in its own
//! submodule and implements plain Rust functions over a [`DataStore`].
//!
//! ## Role and Responsibilities
//!
//! Commands are where the lifecycle rules live:
//! - Merge submitted data with the section schema and validate it
//! - Assign ids and stamp `createdAt/By`, `updatedAt/By`, `deletedAt/By`
//! - Move records between the active folder and `deleted/`
//! - Append exactly one audit entry per mutating call
//! - Filter, search and paginate listings
//!
//! ## What Commands Do NOT Do
//!
//! - **Any terminal I/O**: no stdout, stderr or prompts
//! - **Argument parsing**: section names and ids arrive typed (see `api.rs`)
//! - **Storage consistency**: write ordering belongs to the store
//!
//! ## Structured Returns
//!
//! Commands return [`CmdResult`], not strings. The UI decides how to render it.
//!
//! ## Testing Strategy
//!
//! **This is where the lion's share of testing lives.** Command tests use
//! `InMemoryStore` so they never touch the filesystem.
//!
//! [`DataStore`]: crate::store::DataStore

use crate::audit::{AuditEntry, RotationReport};
use crate::config::SiteConfig;
use crate::model::{Record, RecordId, Section, Summary};
use crate::store::DoctorReport;
use serde::Serialize;
use std::path::PathBuf;

pub mod audit;
pub mod backup;
pub mod create;
pub mod delete;
pub mod doctor;
pub mod get;
pub mod helpers;
pub mod init;
pub mod purge;
pub mod restore;
pub mod settings;
pub mod status;
pub mod update;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// Pagination metadata for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

/// Record counts for one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionStatus {
    pub section: Section,
    pub active: usize,
    pub deleted: usize,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_records: Vec<Record>,
    pub listed_records: Vec<Record>,
    pub summaries: Vec<Summary>,
    pub purged_ids: Vec<RecordId>,
    pub page: Option<PageInfo>,
    pub audit_entries: Vec<AuditEntry>,
    pub rotation: Option<RotationReport>,
    pub doctor: Option<DoctorReport>,
    pub status: Vec<SectionStatus>,
    pub settings: Option<SiteConfig>,
    pub paths: Vec<PathBuf>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_listed_records(mut self, records: Vec<Record>) -> Self {
        self.listed_records = records;
        self
    }

    pub fn with_summaries(mut self, summaries: Vec<Summary>) -> Self {
        self.summaries = summaries;
        self
    }

    pub fn with_page(mut self, page: PageInfo) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_audit_entries(mut self, entries: Vec<AuditEntry>) -> Self {
        self.audit_entries = entries;
        self
    }

    pub fn with_settings(mut self, settings: SiteConfig) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Appends another result's contents onto this one.
    pub fn absorb(&mut self, other: CmdResult) {
        self.affected_records.extend(other.affected_records);
        self.listed_records.extend(other.listed_records);
        self.summaries.extend(other.summaries);
        self.purged_ids.extend(other.purged_ids);
        self.audit_entries.extend(other.audit_entries);
        self.status.extend(other.status);
        self.paths.extend(other.paths);
        self.messages.extend(other.messages);
        if other.page.is_some() {
            self.page = other.page;
        }
        if other.rotation.is_some() {
            self.rotation = other.rotation;
        }
        if other.settings.is_some() {
            self.settings = other.settings;
        }
        if let Some(report) = other.doctor {
            match self.doctor.as_mut() {
                Some(existing) => existing.merge(&report),
                None => self.doctor = Some(report),
            }
        }
    }
}
