use super::backend::StorageBackend;
use super::{Bucket, DataStore, DoctorReport};
use crate::audit::{archive_file_name, partition_for_rotation, AuditEntry, RotationReport};
use crate::config::SiteConfig;
use crate::error::{Result, SocietyError};
use crate::model::{Mode, Record, RecordId, Section, Summary};
use crate::schema::Schema;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;
use std::path::PathBuf;

pub struct RecordStore<B: StorageBackend> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
}

impl<B: StorageBackend> RecordStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn upsert_summary(&self, section: Section, summary: Summary) -> Result<()> {
        let mut master = self.backend.load_master(section)?;
        match master.iter_mut().find(|s| s.id == summary.id) {
            Some(existing) => *existing = summary,
            None => master.push(summary),
        }
        self.backend.save_master(section, &master)
    }

    fn drop_summary(&self, section: Section, id: &RecordId) -> Result<bool> {
        let mut master = self.backend.load_master(section)?;
        let before = master.len();
        master.retain(|s| &s.id != id);
        if master.len() == before {
            return Ok(false);
        }
        self.backend.save_master(section, &master)?;
        Ok(true)
    }

    /// Internal reconciliation of master against the active folder.
    fn reconcile(&self, section: Section) -> Result<DoctorReport> {
        let master = self.backend.load_master(section)?;
        let active_ids = self.backend.list_record_ids(section, Bucket::Active)?;
        let deleted_ids = self.backend.list_record_ids(section, Bucket::Deleted)?;

        let mut report = DoctorReport::default();
        let mut seen: HashSet<RecordId> = HashSet::new();
        let mut rebuilt: Vec<Summary> = Vec::with_capacity(master.len());

        // 1. Walk master: drop zombies and repeats, refresh stale summaries
        for summary in master {
            if !seen.insert(summary.id.clone()) {
                report.collapsed_duplicates += 1;
                continue;
            }
            match self.backend.read_record(section, Bucket::Active, &summary.id) {
                Ok(Some(record)) => {
                    let derived = record.summary();
                    if derived != summary {
                        report.refreshed_summaries += 1;
                    }
                    rebuilt.push(derived);
                }
                Ok(None) => {
                    tracing::warn!(%section, id = %summary.id, "master entry without record file");
                    report.removed_entries += 1;
                }
                Err(SocietyError::Corrupt { path, .. }) => {
                    tracing::warn!(path = %path.display(), "unreadable record kept in master");
                    report.corrupt_records += 1;
                    rebuilt.push(summary);
                }
                Err(e) => return Err(e),
            }
        }

        // 2. Adopt orphans: files on disk that master does not know about
        for id in &active_ids {
            if seen.contains(id) {
                continue;
            }
            match self.backend.read_record(section, Bucket::Active, id) {
                Ok(Some(record)) => {
                    tracing::info!(%section, %id, "recovered orphan record");
                    rebuilt.push(record.summary());
                    report.recovered_records += 1;
                }
                Ok(None) => {}
                Err(SocietyError::Corrupt { path, .. }) => {
                    tracing::warn!(path = %path.display(), "unreadable orphan record");
                    report.corrupt_records += 1;
                }
                Err(e) => return Err(e),
            }
        }

        // 3. Report ids living in both buckets (interrupted move)
        for id in &deleted_ids {
            if active_ids.contains(id) {
                tracing::warn!(%section, %id, "record is both active and deleted");
                report.conflicting_records += 1;
            }
        }

        let changed = report.removed_entries
            + report.recovered_records
            + report.refreshed_summaries
            + report.collapsed_duplicates
            > 0;
        if changed {
            self.backend.save_master(section, &rebuilt)?;
        }

        Ok(report)
    }
}

impl<B: StorageBackend> DataStore for RecordStore<B> {
    fn mode(&self) -> Mode {
        self.backend.mode()
    }

    fn master(&self, section: Section) -> Result<Vec<Summary>> {
        self.backend.load_master(section)
    }

    fn get_record(&self, section: Section, bucket: Bucket, id: &RecordId) -> Result<Record> {
        self.find_record(section, bucket, id)?
            .ok_or_else(|| SocietyError::not_found(section, id))
    }

    fn find_record(
        &self,
        section: Section,
        bucket: Bucket,
        id: &RecordId,
    ) -> Result<Option<Record>> {
        self.backend.read_record(section, bucket, id)
    }

    fn list_records(&self, section: Section, bucket: Bucket) -> Result<Vec<Record>> {
        match bucket {
            Bucket::Active => {
                let master = self.backend.load_master(section)?;
                let mut records = Vec::with_capacity(master.len());
                for summary in master {
                    match self.backend.read_record(section, bucket, &summary.id)? {
                        Some(record) => records.push(record),
                        None => {
                            tracing::warn!(%section, id = %summary.id, "master entry without record file, skipping")
                        }
                    }
                }
                Ok(records)
            }
            Bucket::Deleted => {
                let mut records = Vec::new();
                for id in self.backend.list_record_ids(section, bucket)? {
                    if let Some(record) = self.backend.read_record(section, bucket, &id)? {
                        records.push(record);
                    }
                }
                Ok(records)
            }
        }
    }

    fn record_ids(&self, section: Section, bucket: Bucket) -> Result<Vec<RecordId>> {
        self.backend.list_record_ids(section, bucket)
    }

    fn record_bytes(
        &self,
        section: Section,
        bucket: Bucket,
        id: &RecordId,
    ) -> Result<Option<Vec<u8>>> {
        self.backend.read_record_bytes(section, bucket, id)
    }

    fn master_bytes(&self, section: Section) -> Result<Option<Vec<u8>>> {
        self.backend.read_master_bytes(section)
    }

    fn id_in_use(&self, section: Section, id: &RecordId) -> Result<bool> {
        if self.backend.read_record(section, Bucket::Active, id)?.is_some()
            || self.backend.read_record(section, Bucket::Deleted, id)?.is_some()
        {
            return Ok(true);
        }
        Ok(self.backend.load_master(section)?.iter().any(|s| &s.id == id))
    }

    fn save_record(&mut self, section: Section, bucket: Bucket, record: &Record) -> Result<()> {
        // 1. Record file FIRST (atomic), so master never points at nothing
        self.backend.write_record(section, bucket, record)?;

        // 2. Master summary
        if bucket == Bucket::Active {
            self.upsert_summary(section, record.summary())?;
        }
        Ok(())
    }

    fn remove_record(&mut self, section: Section, bucket: Bucket, id: &RecordId) -> Result<()> {
        let exists = self.backend.read_record(section, bucket, id)?.is_some();
        let in_master = bucket == Bucket::Active && self.drop_summary(section, id)?;
        if !exists && !in_master {
            return Err(SocietyError::not_found(section, id));
        }
        self.backend.remove_record(section, bucket, id)
    }

    fn relocate(
        &mut self,
        section: Section,
        record: &Record,
        from: Bucket,
        to: Bucket,
    ) -> Result<()> {
        if from == to {
            return self.save_record(section, to, record);
        }

        // Destination first. Crash between the two steps leaves the record in both
        // buckets, which doctor reports; nothing is lost.
        self.save_record(section, to, record)?;
        self.remove_record(section, from, &record.id)
    }

    fn record_path(&self, section: Section, bucket: Bucket, id: &RecordId) -> PathBuf {
        self.backend.record_path(section, bucket, id)
    }

    fn schema(&self, section: Section) -> Result<Schema> {
        Ok(self.backend.load_schema(section)?.unwrap_or_default())
    }

    fn site_config(&self) -> Result<SiteConfig> {
        Ok(self.backend.load_site_config()?.unwrap_or_default())
    }

    fn save_site_config(&mut self, config: &SiteConfig) -> Result<()> {
        self.backend.save_site_config(config)
    }

    fn append_audit(&mut self, entry: &AuditEntry) -> Result<()> {
        self.backend.append_audit_line(&entry.to_line()?)
    }

    fn audit_lines(&self) -> Result<Vec<String>> {
        self.backend.read_audit_lines()
    }

    fn audit_entries(&self) -> Result<Vec<AuditEntry>> {
        let mut entries = Vec::new();
        for (n, line) in self.backend.read_audit_lines()?.iter().enumerate() {
            match AuditEntry::from_line(line) {
                Some(entry) => entries.push(entry),
                None => tracing::warn!(line = n + 1, "skipping malformed audit line"),
            }
        }
        Ok(entries)
    }

    fn rotate_audit(
        &mut self,
        cutoff: DateTime<Utc>,
        today: NaiveDate,
    ) -> Result<RotationReport> {
        let lines = self.backend.read_audit_lines()?;
        let (archived, kept) = partition_for_rotation(lines, cutoff);
        if archived.is_empty() {
            return Ok(RotationReport {
                archived: 0,
                kept: kept.len(),
                archive_path: None,
            });
        }

        // Archive before truncating: a crash duplicates lines instead of losing them
        let path = self
            .backend
            .append_audit_archive(&archive_file_name(today), &archived)?;
        self.backend.replace_audit_lines(&kept)?;

        Ok(RotationReport {
            archived: archived.len(),
            kept: kept.len(),
            archive_path: Some(path),
        })
    }

    fn init_layout(&mut self) -> Result<()> {
        for section in Section::ALL {
            self.backend.ensure_section(section)?;
            if self.backend.load_master(section)?.is_empty() {
                self.backend.save_master(section, &[])?;
            }
        }
        if self.backend.load_site_config()?.is_none() {
            let config = SiteConfig {
                mode: self.backend.mode(),
                ..SiteConfig::default()
            };
            self.backend.save_site_config(&config)?;
        }
        Ok(())
    }

    fn doctor(&mut self, section: Section) -> Result<DoctorReport> {
        self.reconcile(section)
    }
}
