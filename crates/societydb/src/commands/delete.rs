use crate::audit::AuditAction;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{RecordId, Section};
use crate::store::{Bucket, DataStore};
use chrono::Utc;

use super::helpers::{audit_record, label};

/// Soft-deletes each id in turn. Stops at the first failure.
pub fn run<S: DataStore>(
    store: &mut S,
    section: Section,
    ids: &[RecordId],
    user: &str,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    for id in ids {
        let mut record = store.get_record(section, Bucket::Active, id)?;
        record.mark_deleted(user, Utc::now());
        store.relocate(section, &record, Bucket::Active, Bucket::Deleted)?;
        audit_record(store, AuditAction::Delete, section, &record, user)?;
        tracing::info!(%section, %id, %user, "record moved to deleted");

        result.add_message(CmdMessage::success(format!(
            "Deleted {}",
            label(section, &record)
        )));
        result.affected_records.push(record);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create;
    use crate::store::memory::InMemoryStore;
    use serde_json::json;

    fn add(store: &mut InMemoryStore, title: &str) -> RecordId {
        let data = json!({ "title": title }).as_object().cloned().unwrap();
        create::run(store, Section::Documents, data, "alice")
            .unwrap()
            .affected_records[0]
            .id
            .clone()
    }

    #[test]
    fn moves_record_to_deleted_bucket() {
        let mut store = InMemoryStore::new();
        let id = add(&mut store, "Bylaws");

        let result = run(&mut store, Section::Documents, &[id.clone()], "bob").unwrap();
        let record = &result.affected_records[0];
        assert!(record.is_deleted());
        assert_eq!(record.deleted_by.as_deref(), Some("bob"));

        assert!(store
            .find_record(Section::Documents, Bucket::Active, &id)
            .unwrap()
            .is_none());
        let stored = store
            .get_record(Section::Documents, Bucket::Deleted, &id)
            .unwrap();
        assert!(stored.deleted_at.is_some());
        assert_eq!(stored.field_str("title"), Some("Bylaws"));
        assert!(store.master(Section::Documents).unwrap().is_empty());
    }

    #[test]
    fn audits_each_deleted_record() {
        let mut store = InMemoryStore::new();
        let a = add(&mut store, "A");
        let b = add(&mut store, "B");
        run(&mut store, Section::Documents, &[a, b], "bob").unwrap();

        let deletes: Vec<_> = store
            .audit_entries()
            .unwrap()
            .into_iter()
            .filter(|e| e.action == AuditAction::Delete)
            .collect();
        assert_eq!(deletes.len(), 2);
        assert!(deletes.iter().all(|e| e.user == "bob"));
    }

    #[test]
    fn stops_at_first_missing_id() {
        let mut store = InMemoryStore::new();
        let a = add(&mut store, "A");
        let b = add(&mut store, "B");
        let missing = RecordId::parse("DOC-404").unwrap();

        let err = run(
            &mut store,
            Section::Documents,
            &[a.clone(), missing, b.clone()],
            "bob",
        )
        .unwrap_err();
        assert!(err.is_not_found());

        assert!(store
            .find_record(Section::Documents, Bucket::Deleted, &a)
            .unwrap()
            .is_some());
        assert!(store
            .find_record(Section::Documents, Bucket::Active, &b)
            .unwrap()
            .is_some());
    }

    #[test]
    fn deleting_twice_is_not_found() {
        let mut store = InMemoryStore::new();
        let id = add(&mut store, "A");
        run(&mut store, Section::Documents, &[id.clone()], "bob").unwrap();
        let err = run(&mut store, Section::Documents, &[id], "bob").unwrap_err();
        assert!(err.is_not_found());
    }
}
