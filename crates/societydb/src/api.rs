//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single entry
//! point for every store operation, whichever UI drives it.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Parses inputs**: section names into [`Section`], raw ids into [`RecordId`]
//!   (rejecting anything that is not a safe file name before the store is touched)
//! - **Fills in defaults**: acting user, page size, cleanup and retention ages
//! - **Dispatches** to the command function
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: that belongs in `commands/*.rs`
//! - **Terminal I/O**: no stdout, stderr or prompts
//!
//! ## Batches
//!
//! `delete`, `restore` and `purge` accept several ids. Ids are de-duplicated keeping
//! their order, then processed one by one. Each processed id is audited on its own;
//! the first failure stops the batch and is returned.
//!
//! ## Generic Over DataStore
//!
//! `SocietyApi<S: DataStore>` runs over `FileStore` in production and `InMemoryStore`
//! in tests.

use crate::audit::{AuditAction, AuditFilter};
use crate::commands::{self, get::RecordQuery, CmdResult};
use crate::error::Result;
use crate::model::{Mode, Record, RecordId, Section};
use crate::store::DataStore;
use chrono::Duration;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Values used when a call does not supply its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiDefaults {
    pub user: String,
    pub per_page: usize,
    pub cleanup_after_days: u32,
    pub audit_retention_days: u32,
}

impl Default for ApiDefaults {
    fn default() -> Self {
        Self {
            user: "admin".to_string(),
            per_page: 10,
            cleanup_after_days: 30,
            audit_retention_days: 90,
        }
    }
}

/// The main API facade.
pub struct SocietyApi<S: DataStore> {
    store: S,
    defaults: ApiDefaults,
}

impl<S: DataStore> SocietyApi<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            defaults: ApiDefaults::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: ApiDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn defaults(&self) -> &ApiDefaults {
        &self.defaults
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn mode(&self) -> Mode {
        self.store.mode()
    }

    pub fn init(&mut self) -> Result<CmdResult> {
        commands::init::run(&mut self.store)
    }

    pub fn create(&mut self, section: &str, data: Map<String, Value>) -> Result<CmdResult> {
        let section = parse_section(section)?;
        commands::create::run(&mut self.store, section, data, &self.defaults.user)
    }

    pub fn update(
        &mut self,
        section: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<CmdResult> {
        let section = parse_section(section)?;
        let id = RecordId::parse(id)?;
        commands::update::run(&mut self.store, section, &id, data, &self.defaults.user)
    }

    pub fn get(&self, section: &str, id: &str) -> Result<CmdResult> {
        let section = parse_section(section)?;
        let id = RecordId::parse(id)?;
        commands::get::run(&self.store, section, &id)
    }

    /// Filtered, sorted, paged listing of active records.
    pub fn query(&self, section: &str, query: &RecordQuery) -> Result<CmdResult> {
        let section = parse_section(section)?;
        commands::get::run_query(&self.store, section, query, self.defaults.per_page)
    }

    /// Every active record in master order.
    pub fn list(&self, section: &str) -> Result<CmdResult> {
        commands::get::run_all(&self.store, parse_section(section)?)
    }

    pub fn master(&self, section: &str) -> Result<CmdResult> {
        commands::get::run_master(&self.store, parse_section(section)?)
    }

    pub fn list_deleted(&self, section: &str) -> Result<CmdResult> {
        commands::get::run_list_deleted(&self.store, parse_section(section)?)
    }

    pub fn delete<I: AsRef<str>>(&mut self, section: &str, ids: &[I]) -> Result<CmdResult> {
        let section = parse_section(section)?;
        let ids = parse_ids(ids)?;
        commands::delete::run(&mut self.store, section, &ids, &self.defaults.user)
    }

    pub fn restore<I: AsRef<str>>(&mut self, section: &str, ids: &[I]) -> Result<CmdResult> {
        let section = parse_section(section)?;
        let ids = parse_ids(ids)?;
        commands::restore::run(&mut self.store, section, &ids, &self.defaults.user)
    }

    /// Deleted records that `purge` would remove.
    pub fn purge_preview<I: AsRef<str>>(&self, section: &str, ids: &[I]) -> Result<Vec<Record>> {
        let section = parse_section(section)?;
        let ids = parse_ids(ids)?;
        commands::purge::preview(&self.store, section, &ids)
    }

    pub fn purge<I: AsRef<str>>(&mut self, section: &str, ids: &[I]) -> Result<CmdResult> {
        let section = parse_section(section)?;
        let ids = parse_ids(ids)?;
        commands::purge::run(&mut self.store, section, &ids, &self.defaults.user)
    }

    /// Purges deleted records older than `days` (default from configuration) in one
    /// section, or in every section when `section` is `None`.
    pub fn cleanup(&mut self, section: Option<&str>, days: Option<u32>) -> Result<CmdResult> {
        let older_than = Duration::days(i64::from(
            days.unwrap_or(self.defaults.cleanup_after_days),
        ));
        if let Some(name) = section {
            let section = parse_section(name)?;
            return commands::purge::cleanup(
                &mut self.store,
                section,
                older_than,
                &self.defaults.user,
            );
        }

        let mut result = CmdResult::default();
        for section in Section::ALL {
            let step =
                commands::purge::cleanup(&mut self.store, section, older_than, &self.defaults.user)?;
            if !step.purged_ids.is_empty() {
                result.absorb(step);
            }
        }
        if result.purged_ids.is_empty() {
            result.add_message(commands::CmdMessage::info("Nothing to clean up"));
        }
        Ok(result)
    }

    pub fn audit(&self, filter: &AuditFilter) -> Result<CmdResult> {
        commands::audit::query(&self.store, filter)
    }

    /// Rotates audit entries older than `days` (default from configuration).
    pub fn rotate_audit(&mut self, days: Option<u32>) -> Result<CmdResult> {
        let days = days.unwrap_or(self.defaults.audit_retention_days);
        commands::audit::rotate(&mut self.store, Duration::days(i64::from(days)))
    }

    pub fn settings(&self) -> Result<CmdResult> {
        commands::settings::get(&self.store)
    }

    pub fn update_settings(&mut self, patch: Map<String, Value>) -> Result<CmdResult> {
        commands::settings::update(&mut self.store, patch, &self.defaults.user)
    }

    /// Reconciles one section, or every section when `section` is `None`.
    pub fn doctor(&mut self, section: Option<&str>) -> Result<CmdResult> {
        let sections = match section {
            Some(name) => vec![parse_section(name)?],
            None => Section::ALL.to_vec(),
        };
        commands::doctor::run(&mut self.store, &sections)
    }

    pub fn status(&self) -> Result<CmdResult> {
        commands::status::run(&self.store)
    }

    /// Writes a backup archive to `output`, or to a dated file in the current
    /// directory when `output` is `None`.
    pub fn backup(&self, output: Option<&Path>) -> Result<CmdResult> {
        let path = match output {
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(commands::backup::default_file_name(chrono::Utc::now())),
        };
        let file = File::create(&path)?;
        let mut result = commands::backup::run(&self.store, BufWriter::new(file))?;
        result.add_message(commands::CmdMessage::info(format!(
            "Archive: {}",
            path.display()
        )));
        result.paths.push(path);
        Ok(result)
    }
}

/// Parses an audit action name for filter construction.
pub fn parse_action(name: &str) -> Result<AuditAction> {
    name.parse()
}

pub fn parse_section(name: &str) -> Result<Section> {
    name.parse()
}

/// Validates and de-duplicates ids, keeping the first occurrence of each.
fn parse_ids<I: AsRef<str>>(inputs: &[I]) -> Result<Vec<RecordId>> {
    let mut ids: Vec<RecordId> = Vec::with_capacity(inputs.len());
    for input in inputs {
        let id = RecordId::parse(input.as_ref().trim())?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SocietyError;
    use crate::store::memory::InMemoryStore;
    use crate::store::Bucket;
    use serde_json::json;

    fn api() -> SocietyApi<InMemoryStore> {
        SocietyApi::new(InMemoryStore::new()).with_defaults(ApiDefaults {
            user: "secretary".into(),
            per_page: 2,
            ..Default::default()
        })
    }

    fn data(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn create(api: &mut SocietyApi<InMemoryStore>, title: &str) -> String {
        api.create("notices", data(json!({ "title": title })))
            .unwrap()
            .affected_records[0]
            .id
            .to_string()
    }

    #[test]
    fn create_uses_configured_user() {
        let mut api = api();
        let result = api.create("Notices", data(json!({"title": "A"}))).unwrap();
        assert_eq!(result.affected_records[0].created_by, "secretary");
    }

    #[test]
    fn unknown_section_is_rejected() {
        let mut api = api();
        let err = api.create("minutes", Map::new()).unwrap_err();
        assert!(matches!(err, SocietyError::UnknownSection(_)));
    }

    #[test]
    fn unsafe_ids_never_reach_the_store() {
        let mut api = api();
        assert!(matches!(
            api.get("notices", "../config/config"),
            Err(SocietyError::InvalidId(_))
        ));
        assert!(matches!(
            api.get("notices", "master"),
            Err(SocietyError::InvalidId(_))
        ));
        assert!(matches!(
            api.update("notices", "master", Map::new()),
            Err(SocietyError::InvalidId(_))
        ));
        assert!(matches!(
            api.delete("notices", &["NOT-1", "a/b"]),
            Err(SocietyError::InvalidId(_))
        ));
        assert!(api.store().audit_entries().unwrap().is_empty());
    }

    #[test]
    fn query_uses_default_page_size() {
        let mut api = api();
        for title in ["A", "B", "C"] {
            create(&mut api, title);
        }
        let result = api.query("notices", &RecordQuery::default()).unwrap();
        assert_eq!(result.listed_records.len(), 2);
        assert_eq!(result.page.unwrap().total_pages, 2);

        let all = RecordQuery {
            per_page: Some(0),
            ..Default::default()
        };
        assert_eq!(api.query("notices", &all).unwrap().listed_records.len(), 3);
        assert_eq!(api.list("notices").unwrap().listed_records.len(), 3);
    }

    #[test]
    fn batch_delete_dedups_ids() {
        let mut api = api();
        let id = create(&mut api, "A");
        let result = api.delete("notices", &[id.as_str(), id.as_str()]).unwrap();
        assert_eq!(result.affected_records.len(), 1);
        assert_eq!(api.list_deleted("notices").unwrap().listed_records.len(), 1);
    }

    #[test]
    fn lifecycle_through_the_facade() {
        let mut api = api();
        let id = create(&mut api, "A");
        api.update("notices", &id, data(json!({"title": "B"}))).unwrap();
        api.delete("notices", &[&id]).unwrap();
        api.restore("notices", &[&id]).unwrap();
        api.delete("notices", &[&id]).unwrap();
        assert_eq!(api.purge_preview("notices", &[&id]).unwrap().len(), 1);
        api.purge("notices", &[&id]).unwrap();

        let actions: Vec<AuditAction> = api
            .audit(&AuditFilter::default())
            .unwrap()
            .audit_entries
            .iter()
            .rev()
            .map(|e| e.action)
            .collect();
        assert_eq!(
            actions,
            vec![
                AuditAction::Create,
                AuditAction::Update,
                AuditAction::Delete,
                AuditAction::Restore,
                AuditAction::Delete,
                AuditAction::Purge
            ]
        );
        assert!(!api
            .store()
            .id_in_use(Section::Notices, &RecordId::parse(&id).unwrap())
            .unwrap());
    }

    #[test]
    fn cleanup_without_section_covers_everything() {
        let mut api = api();
        let id = create(&mut api, "Old");
        api.delete("notices", &[&id]).unwrap();

        let nothing = api.cleanup(None, None).unwrap();
        assert!(nothing.purged_ids.is_empty());
        assert_eq!(nothing.messages.len(), 1);

        let result = api.cleanup(None, Some(0)).unwrap();
        assert_eq!(result.purged_ids.len(), 1);
        assert!(api
            .store()
            .find_record(
                Section::Notices,
                Bucket::Deleted,
                &RecordId::parse(&id).unwrap()
            )
            .unwrap()
            .is_none());
    }

    #[test]
    fn doctor_and_status_cover_all_sections() {
        let mut api = api();
        create(&mut api, "A");
        assert!(api.doctor(None).unwrap().doctor.unwrap().is_clean());
        assert!(api.doctor(Some("events")).unwrap().doctor.unwrap().is_clean());
        assert_eq!(api.status().unwrap().status.len(), Section::ALL.len());
    }

    #[test]
    fn settings_round_trip() {
        let mut api = api();
        api.update_settings(data(json!({"societyName": "Green Acres"})))
            .unwrap();
        let settings = api.settings().unwrap().settings.unwrap();
        assert_eq!(settings.get("societyName"), Some(json!("Green Acres")));
    }

    #[test]
    fn backup_writes_to_given_path() {
        let mut api = api();
        create(&mut api, "A");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.tar.gz");
        let result = api.backup(Some(&path)).unwrap();
        assert_eq!(result.paths, vec![path.clone()]);
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn huge_day_counts_purge_and_rotate_nothing() {
        let mut api = api();
        let id = create(&mut api, "Recent");
        api.delete("notices", &[&id]).unwrap();
        let audit_lines = api.store().audit_lines().unwrap().len();

        let cleaned = api.cleanup(Some("notices"), Some(u32::MAX)).unwrap();
        assert!(cleaned.purged_ids.is_empty());
        assert!(api.cleanup(None, Some(u32::MAX)).unwrap().purged_ids.is_empty());
        assert_eq!(api.list_deleted("notices").unwrap().listed_records.len(), 1);

        let rotated = api.rotate_audit(Some(u32::MAX)).unwrap();
        assert_eq!(rotated.rotation.unwrap().archived, 0);
        assert_eq!(api.store().audit_lines().unwrap().len(), audit_lines);
    }
}
