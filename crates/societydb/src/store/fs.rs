use super::fs_backend::FsBackend;
use super::record_store::RecordStore;
use crate::model::Mode;
use std::path::{Path, PathBuf};

/// Production store: a [`RecordStore`] over the filesystem tree rooted at `base`.
pub type FileStore = RecordStore<FsBackend>;

impl RecordStore<FsBackend> {
    pub fn new_fs(base: PathBuf, mode: Mode) -> Self {
        RecordStore::with_backend(FsBackend::new(base, mode))
    }

    pub fn base(&self) -> &Path {
        self.backend.base()
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::{create, delete, purge, restore};
    use crate::model::{Mode, Section};
    use crate::store::{Bucket, DataStore};
    use crate::test_utils::TestEnv;
    use serde_json::json;
    use std::fs;

    #[test]
    fn lifecycle_on_disk() {
        let mut env = TestEnv::new();
        let data = json!({"title": "Water cut", "category": "maintenance"})
            .as_object()
            .cloned()
            .unwrap();
        let record = create::run(&mut env.store, Section::Notices, data, "admin")
            .unwrap()
            .affected_records
            .remove(0);

        let section_dir = env.root.join("demo").join("notices");
        let active_file = section_dir.join(format!("{}.json", record.id));
        let deleted_file = section_dir.join("deleted").join(format!("{}.json", record.id));
        assert!(active_file.exists());
        let master: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(section_dir.join("master.json")).unwrap())
                .unwrap();
        assert_eq!(master[0]["id"], record.id.as_str());
        assert_eq!(master[0]["category"], "maintenance");

        delete::run(&mut env.store, Section::Notices, &[record.id.clone()], "admin").unwrap();
        assert!(!active_file.exists());
        assert!(deleted_file.exists());
        let on_disk: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&deleted_file).unwrap()).unwrap();
        assert_eq!(on_disk["deletedBy"], "admin");

        restore::run(&mut env.store, Section::Notices, &[record.id.clone()], "admin").unwrap();
        assert!(active_file.exists());
        assert!(!deleted_file.exists());

        delete::run(&mut env.store, Section::Notices, &[record.id.clone()], "admin").unwrap();
        purge::run(&mut env.store, Section::Notices, &[record.id.clone()], "admin").unwrap();
        assert!(!deleted_file.exists());

        let log = fs::read_to_string(env.root.join("audit.log")).unwrap();
        assert_eq!(log.lines().count(), 5);
    }

    #[test]
    fn modes_use_separate_trees() {
        let mut env = TestEnv::with_mode(Mode::Production);
        let data = json!({"title": "Live"}).as_object().cloned().unwrap();
        let record = create::run(&mut env.store, Section::Events, data, "admin")
            .unwrap()
            .affected_records
            .remove(0);

        assert!(env
            .root
            .join("production/events")
            .join(format!("{}.json", record.id))
            .exists());
        assert!(!env.root.join("demo").exists());

        let demo = super::FileStore::new_fs(env.root.clone(), Mode::Demo);
        assert!(demo
            .find_record(Section::Events, Bucket::Active, &record.id)
            .unwrap()
            .is_none());
    }

    #[test]
    fn base_is_reported() {
        let env = TestEnv::new();
        assert_eq!(env.store.base(), env.root.as_path());
    }
}
