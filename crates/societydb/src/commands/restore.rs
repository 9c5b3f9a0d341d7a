use crate::audit::AuditAction;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, SocietyError};
use crate::model::{RecordId, Section};
use crate::store::{Bucket, DataStore};
use chrono::Utc;

use super::helpers::{audit_record, label};

/// Moves soft-deleted records back to the active folder. Stops at the first failure.
pub fn run<S: DataStore>(
    store: &mut S,
    section: Section,
    ids: &[RecordId],
    user: &str,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    for id in ids {
        let mut record = store.get_record(section, Bucket::Deleted, id)?;
        if store.find_record(section, Bucket::Active, id)?.is_some() {
            return Err(SocietyError::RecordExists {
                section,
                id: id.clone(),
            });
        }

        record.clear_deleted();
        record.touch(user, Utc::now());
        store.relocate(section, &record, Bucket::Deleted, Bucket::Active)?;
        audit_record(store, AuditAction::Restore, section, &record, user)?;
        tracing::info!(%section, %id, %user, "record restored");

        result.add_message(CmdMessage::success(format!(
            "Restored {}",
            label(section, &record)
        )));
        result.affected_records.push(record);
    }

    Ok(result)
}
