use crate::audit::AuditFilter;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::DataStore;

use super::helpers::cutoff_before;
use chrono::{Duration, Utc};

/// Audit entries matching `filter`, newest first.
pub fn query<S: DataStore>(store: &S, filter: &AuditFilter) -> Result<CmdResult> {
    let entries = filter.apply(store.audit_entries()?);
    Ok(CmdResult::default().with_audit_entries(entries))
}

/// Moves entries older than `older_than` into today's archive file.
pub fn rotate<S: DataStore>(store: &mut S, older_than: Duration) -> Result<CmdResult> {
    let now = Utc::now();
    let report = store.rotate_audit(cutoff_before(now, older_than), now.date_naive())?;

    let mut result = CmdResult::default();
    match &report.archive_path {
        Some(path) if report.archived > 0 => {
            result.add_message(CmdMessage::success(format!(
                "Archived {} audit entries to {} ({} kept)",
                report.archived,
                path.display(),
                report.kept
            )));
        }
        _ => result.add_message(CmdMessage::info("No audit entries old enough to rotate")),
    }
    result.rotation = Some(report);
    Ok(result)
}
