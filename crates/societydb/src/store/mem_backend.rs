use super::backend::StorageBackend;
use super::Bucket;
use crate::config::SiteConfig;
use crate::error::{Result, SocietyError};
use crate::model::{Mode, Record, RecordId, Section, Summary};
use crate::schema::Schema;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability since the store is single-threaded.
/// This avoids the overhead of `RwLock` while still allowing the
/// `StorageBackend` trait to use `&self` for all methods.
pub struct MemBackend {
    mode: Mode,
    masters: RefCell<HashMap<Section, Vec<Summary>>>,
    records: RefCell<HashMap<(Section, Bucket), BTreeMap<RecordId, Record>>>,
    schemas: RefCell<HashMap<Section, Schema>>,
    site_config: RefCell<Option<SiteConfig>>,
    audit: RefCell<Vec<String>>,
    archives: RefCell<HashMap<String, Vec<String>>>,
    simulate_write_error: RefCell<bool>,
}

impl Default for MemBackend {
    fn default() -> Self {
        Self {
            mode: Mode::Demo,
            masters: RefCell::new(HashMap::new()),
            records: RefCell::new(HashMap::new()),
            schemas: RefCell::new(HashMap::new()),
            site_config: RefCell::new(None),
            audit: RefCell::new(Vec::new()),
            archives: RefCell::new(HashMap::new()),
            simulate_write_error: RefCell::new(false),
        }
    }
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Test helper to install a schema for a section.
    pub fn set_schema(&self, section: Section, schema: Schema) {
        self.schemas.borrow_mut().insert(section, schema);
    }

    /// Test helper to read back an archive written by rotation.
    pub fn archive(&self, name: &str) -> Option<Vec<String>> {
        self.archives.borrow().get(name).cloned()
    }

    fn check_writable(&self) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(SocietyError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }
}

impl StorageBackend for MemBackend {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn load_master(&self, section: Section) -> Result<Vec<Summary>> {
        Ok(self
            .masters
            .borrow()
            .get(&section)
            .cloned()
            .unwrap_or_default())
    }

    fn read_master_bytes(&self, section: Section) -> Result<Option<Vec<u8>>> {
        self.masters
            .borrow()
            .get(&section)
            .map(|master| serde_json::to_vec_pretty(master).map_err(SocietyError::Serialization))
            .transpose()
    }

    fn save_master(&self, section: Section, master: &[Summary]) -> Result<()> {
        self.check_writable()?;
        self.masters.borrow_mut().insert(section, master.to_vec());
        Ok(())
    }

    fn read_record(
        &self,
        section: Section,
        bucket: Bucket,
        id: &RecordId,
    ) -> Result<Option<Record>> {
        Ok(self
            .records
            .borrow()
            .get(&(section, bucket))
            .and_then(|records| records.get(id))
            .cloned())
    }

    fn read_record_bytes(
        &self,
        section: Section,
        bucket: Bucket,
        id: &RecordId,
    ) -> Result<Option<Vec<u8>>> {
        self.read_record(section, bucket, id)?
            .map(|record| serde_json::to_vec_pretty(&record).map_err(SocietyError::Serialization))
            .transpose()
    }

    fn write_record(&self, section: Section, bucket: Bucket, record: &Record) -> Result<()> {
        self.check_writable()?;
        self.records
            .borrow_mut()
            .entry((section, bucket))
            .or_default()
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn remove_record(&self, section: Section, bucket: Bucket, id: &RecordId) -> Result<()> {
        if let Some(records) = self.records.borrow_mut().get_mut(&(section, bucket)) {
            records.remove(id);
        }
        Ok(())
    }

    fn list_record_ids(&self, section: Section, bucket: Bucket) -> Result<Vec<RecordId>> {
        Ok(self
            .records
            .borrow()
            .get(&(section, bucket))
            .map(|records| records.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn record_path(&self, section: Section, bucket: Bucket, id: &RecordId) -> PathBuf {
        let folder = match bucket {
            Bucket::Active => section.as_str().to_string(),
            Bucket::Deleted => format!("{}/deleted", section.as_str()),
        };
        PathBuf::from(format!("memory://{}/{}/{}.json", self.mode, folder, id))
    }

    fn load_schema(&self, section: Section) -> Result<Option<Schema>> {
        Ok(self.schemas.borrow().get(&section).cloned())
    }

    fn load_site_config(&self) -> Result<Option<SiteConfig>> {
        Ok(self.site_config.borrow().clone())
    }

    fn save_site_config(&self, config: &SiteConfig) -> Result<()> {
        self.check_writable()?;
        *self.site_config.borrow_mut() = Some(config.clone());
        Ok(())
    }

    fn append_audit_line(&self, line: &str) -> Result<()> {
        self.check_writable()?;
        self.audit.borrow_mut().push(line.to_string());
        Ok(())
    }

    fn read_audit_lines(&self) -> Result<Vec<String>> {
        Ok(self.audit.borrow().clone())
    }

    fn replace_audit_lines(&self, lines: &[String]) -> Result<()> {
        self.check_writable()?;
        *self.audit.borrow_mut() = lines.to_vec();
        Ok(())
    }

    fn append_audit_archive(&self, name: &str, lines: &[String]) -> Result<PathBuf> {
        self.check_writable()?;
        self.archives
            .borrow_mut()
            .entry(name.to_string())
            .or_default()
            .extend(lines.iter().cloned());
        Ok(PathBuf::from(format!("memory://audit-archive/{}", name)))
    }

    fn ensure_section(&self, section: Section) -> Result<()> {
        let mut records = self.records.borrow_mut();
        records.entry((section, Bucket::Active)).or_default();
        records.entry((section, Bucket::Deleted)).or_default();
        Ok(())
    }
}
