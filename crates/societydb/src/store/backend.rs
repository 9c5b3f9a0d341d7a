use super::Bucket;
use crate::config::SiteConfig;
use crate::error::Result;
use crate::model::{Mode, Record, RecordId, Section, Summary};
use crate::schema::Schema;
use std::path::PathBuf;

/// Abstract interface for raw storage I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while RecordStore handles the "what" (write ordering, master upkeep, doctor).
pub trait StorageBackend {
    fn mode(&self) -> Mode;

    // --- Master Operations ---

    /// Load `master.json`. Missing file is an empty master.
    fn load_master(&self, section: Section) -> Result<Vec<Summary>>;

    /// Raw bytes of `master.json`, if present. No parsing.
    fn read_master_bytes(&self, section: Section) -> Result<Option<Vec<u8>>>;

    /// Rewrite `master.json`.
    fn save_master(&self, section: Section, master: &[Summary]) -> Result<()>;

    // --- Record Operations ---

    /// Returns Ok(None) if the file does not exist.
    /// Returns Err on I/O errors and on files that do not parse (`Corrupt`).
    fn read_record(&self, section: Section, bucket: Bucket, id: &RecordId)
        -> Result<Option<Record>>;

    /// Raw bytes of a record file, if present. No parsing.
    fn read_record_bytes(
        &self,
        section: Section,
        bucket: Bucket,
        id: &RecordId,
    ) -> Result<Option<Vec<u8>>>;

    /// MUST be atomic (write to tmp then rename) to avoid partial writes.
    fn write_record(&self, section: Section, bucket: Bucket, record: &Record) -> Result<()>;

    /// Removing an absent record is not an error.
    fn remove_record(&self, section: Section, bucket: Bucket, id: &RecordId) -> Result<()>;

    /// Ids of every record file in the bucket, sorted.
    fn list_record_ids(&self, section: Section, bucket: Bucket) -> Result<Vec<RecordId>>;

    fn record_path(&self, section: Section, bucket: Bucket, id: &RecordId) -> PathBuf;

    // --- Schema & Site Config ---

    /// Ok(None) when the section has no schema file.
    fn load_schema(&self, section: Section) -> Result<Option<Schema>>;

    /// Ok(None) when `config/config.json` does not exist.
    fn load_site_config(&self) -> Result<Option<SiteConfig>>;

    fn save_site_config(&self, config: &SiteConfig) -> Result<()>;

    // --- Audit Log ---

    fn append_audit_line(&self, line: &str) -> Result<()>;

    fn read_audit_lines(&self) -> Result<Vec<String>>;

    /// Rewrite the live log with exactly `lines`.
    fn replace_audit_lines(&self, lines: &[String]) -> Result<()>;

    /// Append `lines` to the named archive file, returning its location.
    fn append_audit_archive(&self, name: &str, lines: &[String]) -> Result<PathBuf>;

    // --- Layout ---

    /// Make sure both bucket folders of a section exist.
    fn ensure_section(&self, section: Section) -> Result<()>;
}
