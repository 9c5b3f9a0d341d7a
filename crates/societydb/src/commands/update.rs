use crate::audit::{AuditAction, AuditEntry};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{strip_reserved, RecordId, Section};
use crate::store::{Bucket, DataStore};
use chrono::Utc;
use serde_json::{json, Map, Value};

use super::helpers::label;

/// Shallow-merges `patch` over an active record and rewrites it with a fresh summary.
pub fn run<S: DataStore>(
    store: &mut S,
    section: Section,
    id: &RecordId,
    patch: Map<String, Value>,
    user: &str,
) -> Result<CmdResult> {
    let mut record = store.get_record(section, Bucket::Active, id)?;
    let patch = strip_reserved(patch);
    let changed: Vec<String> = patch
        .iter()
        .filter(|(key, value)| record.fields.get(*key) != Some(*value))
        .map(|(key, _)| key.clone())
        .collect();

    let schema = store.schema(section)?;
    record.apply_update(patch, user, Utc::now());
    record.fields = schema.merge(&record.fields);
    schema.validate(section, &record.fields)?;

    store.save_record(section, Bucket::Active, &record)?;
    let entry = AuditEntry::for_record(AuditAction::Update, section, &record.id, user)
        .with_details(json!({ "title": record.summary().title, "fields": changed }));
    store.append_audit(&entry)?;
    tracing::info!(%section, %id, %user, "record updated");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Updated {}",
        label(section, &record)
    )));
    result.affected_records.push(record);
    Ok(result)
}
