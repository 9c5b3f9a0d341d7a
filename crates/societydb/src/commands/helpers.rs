use crate::audit::{AuditAction, AuditEntry};
use crate::error::{Result, SocietyError};
use crate::model::{Record, RecordId, Section};
use crate::store::DataStore;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;

/// Upper bound on same-second suffixes before giving up.
const MAX_ID_SUFFIX: u32 = 1000;

/// First free id for a record created at `now`: the base id, then `-2`, `-3`, ...
pub fn next_id<S: DataStore>(store: &S, section: Section, now: DateTime<Utc>) -> Result<RecordId> {
    let base = RecordId::generate(section, now);
    if !store.id_in_use(section, &base)? {
        return Ok(base);
    }
    for n in 2..=MAX_ID_SUFFIX {
        let candidate = base.with_suffix(n);
        if !store.id_in_use(section, &candidate)? {
            return Ok(candidate);
        }
    }
    Err(SocietyError::Store(format!(
        "No free id left for {} at {}",
        section, base
    )))
}

/// `now - age`, clamped to the earliest representable instant when the age
/// reaches past it. Nothing is older than the clamped cutoff.
pub fn cutoff_before(now: DateTime<Utc>, age: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(age)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Appends the audit entry for a single-record operation.
pub fn audit_record<S: DataStore>(
    store: &mut S,
    action: AuditAction,
    section: Section,
    record: &Record,
    user: &str,
) -> Result<()> {
    let entry = AuditEntry::for_record(action, section, &record.id, user)
        .with_details(json!({ "title": record.summary().title }));
    store.append_audit(&entry)
}

/// Display label used in command messages: `notices/NOT-...: Title`.
pub fn label(section: Section, record: &Record) -> String {
    format!("{}/{}: {}", section, record.id, record.summary().title)
}
