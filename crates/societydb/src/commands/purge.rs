use crate::audit::{AuditAction, AuditEntry};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{Record, RecordId, Section};
use crate::store::{Bucket, DataStore};
use chrono::{Duration, Utc};
use serde_json::json;

use super::helpers::{audit_record, cutoff_before, label};

/// Records that `run` would remove, without removing anything.
///
/// Use this to show a confirmation prompt in the CLI before calling `run`.
pub fn preview<S: DataStore>(store: &S, section: Section, ids: &[RecordId]) -> Result<Vec<Record>> {
    ids.iter()
        .map(|id| store.get_record(section, Bucket::Deleted, id))
        .collect()
}

/// Permanently removes soft-deleted records. Active records are never touched.
pub fn run<S: DataStore>(
    store: &mut S,
    section: Section,
    ids: &[RecordId],
    user: &str,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    for id in ids {
        let record = store.get_record(section, Bucket::Deleted, id)?;
        store.remove_record(section, Bucket::Deleted, id)?;
        audit_record(store, AuditAction::Purge, section, &record, user)?;
        tracing::info!(%section, %id, %user, "record purged");

        result.add_message(CmdMessage::success(format!(
            "Purged {}",
            label(section, &record)
        )));
        result.purged_ids.push(record.id);
    }

    Ok(result)
}

/// Purges every deleted record whose `deletedAt` is older than `older_than`.
///
/// Writes one `cleanup` audit entry naming the purged ids, or none when
/// nothing qualified.
pub fn cleanup<S: DataStore>(
    store: &mut S,
    section: Section,
    older_than: Duration,
    user: &str,
) -> Result<CmdResult> {
    let cutoff = cutoff_before(Utc::now(), older_than);
    let expired: Vec<RecordId> = store
        .list_records(section, Bucket::Deleted)?
        .into_iter()
        .filter(|record| record.deleted_at.is_some_and(|at| at < cutoff))
        .map(|record| record.id)
        .collect();

    let mut result = CmdResult::default();
    if expired.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "Nothing to clean up in {}",
            section
        )));
        return Ok(result);
    }

    for id in &expired {
        store.remove_record(section, Bucket::Deleted, id)?;
    }

    let entry = AuditEntry::new(AuditAction::Cleanup, user)
        .with_section(section)
        .with_details(json!({
            "purged": expired,
            "olderThanDays": older_than.num_days(),
        }));
    store.append_audit(&entry)?;
    tracing::info!(%section, count = expired.len(), "cleanup purged deleted records");

    result.add_message(CmdMessage::success(format!(
        "Purged {} record(s) from {}",
        expired.len(),
        section
    )));
    result.purged_ids = expired;
    Ok(result)
}
