use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::Section;
use crate::store::DataStore;

pub fn run<S: DataStore>(store: &mut S) -> Result<CmdResult> {
    store.init_layout()?;
    let mode = store.mode();

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Initialized {} data tree ({} sections)",
        mode,
        Section::ALL.len()
    )));
    let configured = store.site_config()?.mode;
    if configured != mode {
        result.add_message(CmdMessage::warning(format!(
            "config/config.json selects {}; this tree is only used when {} is chosen explicitly",
            configured, mode
        )));
    }
    Ok(result)
}
