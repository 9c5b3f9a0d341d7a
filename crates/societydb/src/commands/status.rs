use crate::commands::{CmdResult, SectionStatus};
use crate::error::Result;
use crate::model::Section;
use crate::store::{Bucket, DataStore};

/// Active and deleted record counts for every section.
pub fn run<S: DataStore>(store: &S) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    for section in Section::ALL {
        result.status.push(SectionStatus {
            section,
            active: store.master(section)?.len(),
            deleted: store.list_records(section, Bucket::Deleted)?.len(),
        });
    }
    Ok(result)
}
