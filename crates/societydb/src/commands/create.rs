use crate::audit::AuditAction;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{strip_reserved, Record, Section};
use crate::store::{Bucket, DataStore};
use chrono::Utc;
use serde_json::{Map, Value};

use super::helpers::{audit_record, label, next_id};

pub fn run<S: DataStore>(
    store: &mut S,
    section: Section,
    data: Map<String, Value>,
    user: &str,
) -> Result<CmdResult> {
    let schema = store.schema(section)?;
    let merged = schema.merge(&strip_reserved(data));
    schema.validate(section, &merged)?;

    let now = Utc::now();
    let id = next_id(store, section, now)?;
    let record = Record::new(id, merged, user, now);

    store.save_record(section, Bucket::Active, &record)?;
    audit_record(store, AuditAction::Create, section, &record, user)?;
    tracing::info!(%section, id = %record.id, %user, "record created");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Created {}",
        label(section, &record)
    )));
    result.affected_records.push(record);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SocietyError;
    use crate::schema::Schema;
    use crate::store::mem_backend::MemBackend;
    use crate::store::memory::InMemoryStore;
    use crate::store::record_store::RecordStore;
    use serde_json::json;

    fn data(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn creates_record_file_and_master_entry() {
        let mut store = InMemoryStore::new();
        let result = run(
            &mut store,
            Section::Notices,
            data(json!({"title": "Water cut", "category": "maintenance"})),
            "admin",
        )
        .unwrap();

        let record = &result.affected_records[0];
        assert!(record.id.as_str().starts_with("NOT-"));
        assert_eq!(record.created_by, "admin");
        assert_eq!(record.updated_by, "admin");
        assert_eq!(record.created_at, record.updated_at);

        let stored = store
            .get_record(Section::Notices, Bucket::Active, &record.id)
            .unwrap();
        assert_eq!(&stored, record);

        let master = store.master(Section::Notices).unwrap();
        assert_eq!(master.len(), 1);
        assert_eq!(master[0].id, record.id);
        assert_eq!(master[0].category.as_deref(), Some("maintenance"));
    }

    #[test]
    fn appends_exactly_one_audit_entry() {
        let mut store = InMemoryStore::new();
        run(&mut store, Section::Events, data(json!({"title": "AGM"})), "alice").unwrap();

        let entries = store.audit_entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::Create);
        assert_eq!(entries[0].section, Some(Section::Events));
        assert_eq!(entries[0].user, "alice");
        assert_eq!(entries[0].details.as_ref().unwrap()["title"], "AGM");
    }

    #[test]
    fn two_creates_in_same_second_get_distinct_ids() {
        let mut store = InMemoryStore::new();
        let a = run(&mut store, Section::Notices, data(json!({"title": "A"})), "admin").unwrap();
        let b = run(&mut store, Section::Notices, data(json!({"title": "B"})), "admin").unwrap();
        assert_ne!(a.affected_records[0].id, b.affected_records[0].id);
        assert_eq!(store.master(Section::Notices).unwrap().len(), 2);
    }

    #[test]
    fn reserved_keys_in_payload_are_ignored() {
        let mut store = InMemoryStore::new();
        let result = run(
            &mut store,
            Section::Notices,
            data(json!({"title": "A", "id": "../../x", "createdBy": "mallory"})),
            "admin",
        )
        .unwrap();
        let record = &result.affected_records[0];
        assert!(record.id.as_str().starts_with("NOT-"));
        assert_eq!(record.created_by, "admin");
    }

    #[test]
    fn applies_schema_defaults_and_validation() {
        let backend = MemBackend::new();
        backend.set_schema(
            Section::Events,
            Schema::from_value(json!({"title": "", "venue": "Clubhouse", "poster": null})).unwrap(),
        );
        let mut store = RecordStore::with_backend(backend);

        let err = run(&mut store, Section::Events, data(json!({})), "admin").unwrap_err();
        match err {
            SocietyError::Validation { missing, .. } => assert_eq!(missing, vec!["title"]),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(store.master(Section::Events).unwrap().is_empty());
        assert!(store.audit_entries().unwrap().is_empty());

        let result = run(
            &mut store,
            Section::Events,
            data(json!({"title": "Holi"})),
            "admin",
        )
        .unwrap();
        let record = &result.affected_records[0];
        assert_eq!(record.field_str("venue"), Some("Clubhouse"));
        assert_eq!(record.fields["poster"], Value::Null);
    }
}
