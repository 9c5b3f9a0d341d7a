//! # Storage Layer
//!
//! This module defines the storage abstraction. The [`DataStore`] trait is what the
//! command layer talks to; [`backend::StorageBackend`] is the raw I/O underneath it.
//!
//! ## Two Sources, One Truth
//!
//! Every section keeps:
//! 1. **Records**: one `<id>.json` per record. These are the truth.
//! 2. **Master**: `master.json`, an array of [`Summary`] entries derived from the
//!    records, so list views do not have to open every file.
//!
//! Nothing locks the two together. [`record_store::RecordStore`] keeps them aligned by
//! ordering its writes so that a crash can only ever leave the *safe* kind of drift:
//!
//! - **Save**: record file first, then master. A crash in between leaves an orphan
//!   file (recoverable), never a master entry pointing at nothing.
//! - **Move** (soft delete / restore): write to the destination bucket first, then
//!   remove from the source. A crash leaves the record in both places.
//! - **Remove**: master entry first, then file.
//!
//! `doctor` repairs whatever drift remains (see [`DoctorReport`]).
//!
//! ## Buckets
//!
//! A section has two [`Bucket`]s: the section folder itself (active records, indexed
//! by master) and its `deleted/` subfolder (soft-deleted records, not indexed).
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: `RecordStore` over the filesystem.
//! - [`memory::InMemoryStore`]: `RecordStore` over memory, for tests.
//!
//! ## Storage Layout
//!
//! ```text
//! <base>/
//! ├── config/config.json
//! ├── schemas/<section>.json
//! ├── audit.log
//! ├── audit-archive/audit-YYYY-MM-DD.log
//! └── <mode>/<section>/
//!     ├── master.json
//!     ├── <id>.json
//!     └── deleted/<id>.json
//! ```

use crate::audit::{AuditEntry, RotationReport};
use crate::config::SiteConfig;
use crate::error::Result;
use crate::model::{Mode, Record, RecordId, Section, Summary};
use crate::schema::Schema;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::path::PathBuf;

pub mod backend;
pub mod fs;
pub mod fs_backend;
pub mod mem_backend;
pub mod memory;
pub mod record_store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Active,
    Deleted,
}

/// Report from the `doctor` operation.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DoctorReport {
    /// Master entries whose record file was missing.
    pub removed_entries: usize,
    /// Record files that had no master entry.
    pub recovered_records: usize,
    /// Master entries that no longer matched their record.
    pub refreshed_summaries: usize,
    /// Repeated ids in master.
    pub collapsed_duplicates: usize,
    /// Ids present both active and under `deleted/`. Reported, not fixed.
    pub conflicting_records: usize,
    /// Record files that could not be parsed. Reported, not fixed.
    pub corrupt_records: usize,
}

impl DoctorReport {
    pub fn is_clean(&self) -> bool {
        *self == DoctorReport::default()
    }

    pub fn merge(&mut self, other: &DoctorReport) {
        self.removed_entries += other.removed_entries;
        self.recovered_records += other.recovered_records;
        self.refreshed_summaries += other.refreshed_summaries;
        self.collapsed_duplicates += other.collapsed_duplicates;
        self.conflicting_records += other.conflicting_records;
        self.corrupt_records += other.corrupt_records;
    }
}

/// Abstract interface for record storage.
///
/// Implementations own the consistency between record files and master entries.
/// Business rules (stamping, validation, auditing) live in the command layer.
pub trait DataStore {
    /// The data tree this store reads and writes.
    fn mode(&self) -> Mode;

    /// The section's master index, as stored.
    fn master(&self, section: Section) -> Result<Vec<Summary>>;

    /// Fetch a record, failing with `RecordNotFound` if it is not in `bucket`.
    fn get_record(&self, section: Section, bucket: Bucket, id: &RecordId) -> Result<Record>;

    /// Fetch a record if present.
    fn find_record(
        &self,
        section: Section,
        bucket: Bucket,
        id: &RecordId,
    ) -> Result<Option<Record>>;

    /// Active records in master order, or every deleted record.
    fn list_records(&self, section: Section, bucket: Bucket) -> Result<Vec<Record>>;

    /// Ids of every record file in the bucket, whether or not master lists them.
    fn record_ids(&self, section: Section, bucket: Bucket) -> Result<Vec<RecordId>>;

    /// A record file's bytes as stored, without parsing.
    fn record_bytes(
        &self,
        section: Section,
        bucket: Bucket,
        id: &RecordId,
    ) -> Result<Option<Vec<u8>>>;

    /// The section's `master.json` bytes as stored, if the file exists.
    fn master_bytes(&self, section: Section) -> Result<Option<Vec<u8>>>;

    /// Whether `id` is taken in either bucket.
    fn id_in_use(&self, section: Section, id: &RecordId) -> Result<bool>;

    /// Create or overwrite a record. Active saves also upsert the master summary.
    fn save_record(&mut self, section: Section, bucket: Bucket, record: &Record) -> Result<()>;

    /// Remove a record. Active removals also drop the master summary.
    fn remove_record(&mut self, section: Section, bucket: Bucket, id: &RecordId) -> Result<()>;

    /// Write `record` into `to`, then remove it from `from`.
    fn relocate(
        &mut self,
        section: Section,
        record: &Record,
        from: Bucket,
        to: Bucket,
    ) -> Result<()>;

    /// Location of a record (real path for file stores, virtual for memory).
    fn record_path(&self, section: Section, bucket: Bucket, id: &RecordId) -> PathBuf;

    fn schema(&self, section: Section) -> Result<Schema>;

    fn site_config(&self) -> Result<SiteConfig>;

    fn save_site_config(&mut self, config: &SiteConfig) -> Result<()>;

    fn append_audit(&mut self, entry: &AuditEntry) -> Result<()>;

    /// Raw audit lines, oldest first.
    fn audit_lines(&self) -> Result<Vec<String>>;

    /// Parsed audit entries, oldest first. Malformed lines are skipped.
    fn audit_entries(&self) -> Result<Vec<AuditEntry>>;

    /// Move entries older than `cutoff` into the archive file for `today`.
    fn rotate_audit(&mut self, cutoff: DateTime<Utc>, today: NaiveDate)
        -> Result<RotationReport>;

    /// Create the section folders and empty masters for the current mode.
    fn init_layout(&mut self) -> Result<()>;

    /// Verify and fix master/record drift for one section.
    fn doctor(&mut self, section: Section) -> Result<DoctorReport>;
}
