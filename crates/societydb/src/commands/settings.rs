use crate::audit::{AuditAction, AuditEntry};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::DataStore;
use serde_json::{json, Map, Value};

/// Current site settings, defaults when the config file is missing.
pub fn get<S: DataStore>(store: &S) -> Result<CmdResult> {
    Ok(CmdResult::default().with_settings(store.site_config()?))
}

/// Shallow-merges `patch` into the site settings and audits the change.
pub fn update<S: DataStore>(
    store: &mut S,
    patch: Map<String, Value>,
    user: &str,
) -> Result<CmdResult> {
    let mut config = store.site_config()?;
    let keys: Vec<String> = patch.keys().cloned().collect();
    config.apply(patch)?;
    store.save_site_config(&config)?;

    let entry = AuditEntry::new(AuditAction::Settings, user).with_details(json!({ "keys": keys }));
    store.append_audit(&entry)?;
    tracing::info!(?keys, %user, "settings updated");

    let mut result = CmdResult::default().with_settings(config);
    result.add_message(CmdMessage::success(format!(
        "Updated settings: {}",
        keys.join(", ")
    )));
    Ok(result)
}
