use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::Section;
use crate::store::DataStore;

/// Reconciles master files with the active folders of `sections`.
pub fn run<S: DataStore>(store: &mut S, sections: &[Section]) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    for &section in sections {
        let report = store.doctor(section)?;
        if report.is_clean() {
            continue;
        }
        if report.removed_entries > 0 {
            result.add_message(CmdMessage::info(format!(
                "{}: removed {} master entries without a record file",
                section, report.removed_entries
            )));
        }
        if report.recovered_records > 0 {
            result.add_message(CmdMessage::info(format!(
                "{}: recovered {} records missing from master",
                section, report.recovered_records
            )));
        }
        if report.refreshed_summaries > 0 {
            result.add_message(CmdMessage::info(format!(
                "{}: refreshed {} stale summaries",
                section, report.refreshed_summaries
            )));
        }
        if report.collapsed_duplicates > 0 {
            result.add_message(CmdMessage::info(format!(
                "{}: collapsed {} repeated master entries",
                section, report.collapsed_duplicates
            )));
        }
        if report.conflicting_records > 0 {
            result.add_message(CmdMessage::warning(format!(
                "{}: {} records exist both active and deleted; resolve by hand",
                section, report.conflicting_records
            )));
        }
        if report.corrupt_records > 0 {
            result.add_message(CmdMessage::warning(format!(
                "{}: {} record files could not be parsed",
                section, report.corrupt_records
            )));
        }
        match result.doctor.as_mut() {
            Some(total) => total.merge(&report),
            None => result.doctor = Some(report),
        }
    }

    if result.doctor.is_none() {
        result.doctor = Some(Default::default());
        result.add_message(CmdMessage::success("No inconsistencies found."));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create;
    use crate::model::{Record, RecordId};
    use crate::store::backend::StorageBackend;
    use crate::store::memory::InMemoryStore;
    use crate::store::Bucket;
    use chrono::Utc;
    use serde_json::{json, Map};

    #[test]
    fn clean_store_reports_nothing() {
        let mut store = InMemoryStore::new();
        let data = json!({"title": "Fine"}).as_object().cloned().unwrap();
        create::run(&mut store, Section::Notices, data, "admin").unwrap();

        let result = run(&mut store, &Section::ALL).unwrap();
        assert!(result.doctor.unwrap().is_clean());
        assert_eq!(result.messages.len(), 1);
    }

    #[test]
    fn repairs_drift_across_sections() {
        let mut store = InMemoryStore::new();
        let data = json!({"title": "Zombie"}).as_object().cloned().unwrap();
        let zombie = create::run(&mut store, Section::Notices, data, "admin")
            .unwrap()
            .affected_records
            .remove(0);
        // file gone, master entry left behind
        store
            .backend()
            .remove_record(Section::Notices, Bucket::Active, &zombie.id)
            .unwrap();

        let orphan = Record::new(
            RecordId::parse("EVT-orphan").unwrap(),
            Map::new(),
            "admin",
            Utc::now(),
        );
        store
            .backend()
            .write_record(Section::Events, Bucket::Active, &orphan)
            .unwrap();

        let result = run(&mut store, &[Section::Notices, Section::Events]).unwrap();
        let report = result.doctor.unwrap();
        assert_eq!(report.removed_entries, 1);
        assert_eq!(report.recovered_records, 1);
        assert!(store.master(Section::Notices).unwrap().is_empty());
        assert_eq!(store.master(Section::Events).unwrap()[0].id, orphan.id);

        let again = run(&mut store, &Section::ALL).unwrap();
        assert!(again.doctor.unwrap().is_clean());
    }
}
