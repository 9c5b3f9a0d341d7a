use super::backend::StorageBackend;
use super::Bucket;
use crate::config::SiteConfig;
use crate::error::{Result, SocietyError};
use crate::model::{Mode, Record, RecordId, Section, Summary, MASTER_STEM};
use crate::schema::Schema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const DELETED_DIR: &str = "deleted";
const AUDIT_FILE: &str = "audit.log";
const AUDIT_ARCHIVE_DIR: &str = "audit-archive";

pub struct FsBackend {
    base: PathBuf,
    mode: Mode,
}

impl FsBackend {
    pub fn new(base: PathBuf, mode: Mode) -> Self {
        Self { base, mode }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn section_dir(&self, section: Section) -> PathBuf {
        self.base.join(self.mode.as_str()).join(section.as_str())
    }

    fn bucket_dir(&self, section: Section, bucket: Bucket) -> PathBuf {
        match bucket {
            Bucket::Active => self.section_dir(section),
            Bucket::Deleted => self.section_dir(section).join(DELETED_DIR),
        }
    }

    fn master_path(&self, section: Section) -> PathBuf {
        self.section_dir(section).join(format!("{}.json", MASTER_STEM))
    }

    fn schema_path(&self, section: Section) -> PathBuf {
        self.base
            .join("schemas")
            .join(format!("{}.json", section.as_str()))
    }

    fn site_config_path(&self) -> PathBuf {
        self.base.join("config").join("config.json")
    }

    fn audit_path(&self) -> PathBuf {
        self.base.join(AUDIT_FILE)
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(SocietyError::Io)?;
        }
        Ok(())
    }

    fn read_bytes(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SocietyError::Io(e)),
        }
    }

    /// Reads and parses a JSON file. Missing file is Ok(None).
    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SocietyError::Io(e)),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| SocietyError::Corrupt {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Atomic write: serialize to a tmp file in the same directory, then rename.
    fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| SocietyError::Store(format!("No parent for {}", path.display())))?;
        self.ensure_dir(dir)?;

        let content = serde_json::to_string_pretty(value).map_err(SocietyError::Serialization)?;
        let tmp_path = dir.join(format!(".tmp-{}", Uuid::new_v4()));
        fs::write(&tmp_path, content).map_err(SocietyError::Io)?;
        fs::rename(&tmp_path, path).map_err(SocietyError::Io)?;

        tracing::debug!(path = %path.display(), "wrote file");
        Ok(())
    }
}

impl StorageBackend for FsBackend {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn load_master(&self, section: Section) -> Result<Vec<Summary>> {
        Ok(self
            .read_json(&self.master_path(section))?
            .unwrap_or_default())
    }

    fn read_master_bytes(&self, section: Section) -> Result<Option<Vec<u8>>> {
        self.read_bytes(&self.master_path(section))
    }

    fn save_master(&self, section: Section, master: &[Summary]) -> Result<()> {
        self.write_json(&self.master_path(section), master)
    }

    fn read_record(
        &self,
        section: Section,
        bucket: Bucket,
        id: &RecordId,
    ) -> Result<Option<Record>> {
        self.read_json(&self.record_path(section, bucket, id))
    }

    fn read_record_bytes(
        &self,
        section: Section,
        bucket: Bucket,
        id: &RecordId,
    ) -> Result<Option<Vec<u8>>> {
        self.read_bytes(&self.record_path(section, bucket, id))
    }

    fn write_record(&self, section: Section, bucket: Bucket, record: &Record) -> Result<()> {
        self.write_json(&self.record_path(section, bucket, &record.id), record)
    }

    fn remove_record(&self, section: Section, bucket: Bucket, id: &RecordId) -> Result<()> {
        let path = self.record_path(section, bucket, id);
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "removed file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SocietyError::Io(e)),
        }
    }

    fn list_record_ids(&self, section: Section, bucket: Bucket) -> Result<Vec<RecordId>> {
        let dir = self.bucket_dir(section, bucket);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&dir).map_err(SocietyError::Io)? {
            let path = entry.map_err(SocietyError::Io)?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Ok(id) = RecordId::parse(stem) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn record_path(&self, section: Section, bucket: Bucket, id: &RecordId) -> PathBuf {
        self.bucket_dir(section, bucket)
            .join(format!("{}.json", id.as_str()))
    }

    fn load_schema(&self, section: Section) -> Result<Option<Schema>> {
        let path = self.schema_path(section);
        let Some(value) = self.read_json::<serde_json::Value>(&path)? else {
            return Ok(None);
        };
        Schema::from_value(value)
            .map(Some)
            .ok_or_else(|| SocietyError::Corrupt {
                path,
                source: <serde_json::Error as serde::de::Error>::custom(
                    "schema must be a JSON object",
                ),
            })
    }

    fn load_site_config(&self) -> Result<Option<SiteConfig>> {
        self.read_json(&self.site_config_path())
    }

    fn save_site_config(&self, config: &SiteConfig) -> Result<()> {
        self.write_json(&self.site_config_path(), config)
    }

    fn append_audit_line(&self, line: &str) -> Result<()> {
        self.ensure_dir(&self.base)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.audit_path())
            .map_err(SocietyError::Io)?;
        writeln!(file, "{}", line).map_err(SocietyError::Io)?;
        Ok(())
    }

    fn read_audit_lines(&self) -> Result<Vec<String>> {
        match fs::read_to_string(self.audit_path()) {
            Ok(content) => Ok(content
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(SocietyError::Io(e)),
        }
    }

    fn replace_audit_lines(&self, lines: &[String]) -> Result<()> {
        self.ensure_dir(&self.base)?;
        let mut content = lines.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        let tmp_path = self.base.join(format!(".audit-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_path, content).map_err(SocietyError::Io)?;
        fs::rename(&tmp_path, self.audit_path()).map_err(SocietyError::Io)?;
        Ok(())
    }

    fn append_audit_archive(&self, name: &str, lines: &[String]) -> Result<PathBuf> {
        let dir = self.base.join(AUDIT_ARCHIVE_DIR);
        self.ensure_dir(&dir)?;
        let path = dir.join(name);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(SocietyError::Io)?;
        for line in lines {
            writeln!(file, "{}", line).map_err(SocietyError::Io)?;
        }
        tracing::debug!(path = %path.display(), lines = lines.len(), "appended audit archive");
        Ok(path)
    }

    fn ensure_section(&self, section: Section) -> Result<()> {
        self.ensure_dir(&self.bucket_dir(section, Bucket::Deleted))
    }
}
