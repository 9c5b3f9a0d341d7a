use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{Record, Section};
use crate::store::{Bucket, DataStore};
use chrono::{DateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;

const ROOT: &str = "societydb";

/// Default archive name for a backup taken at `now`.
pub fn default_file_name(now: DateTime<Utc>) -> String {
    format!("societydb-{}.tar.gz", now.format("%Y-%m-%d_%H%M%S"))
}

/// Writes a gzip-compressed tar of the current mode tree, the site config and
/// the audit log to `writer`.
///
/// Files are copied byte for byte from whatever is in each folder, so records
/// missing from master and files that no longer parse are archived too. The
/// unparseable ones are logged and reported as warnings.
pub fn run<S: DataStore, W: Write>(store: &S, writer: W) -> Result<CmdResult> {
    let enc = GzEncoder::new(writer, Compression::default());
    let mut tar = tar::Builder::new(enc);
    let mode = store.mode();
    let mut files = 0usize;
    let mut corrupt: Vec<String> = Vec::new();

    for section in Section::ALL {
        let dir = format!("{}/{}/{}", ROOT, mode, section);

        let master = match store.master_bytes(section)? {
            Some(bytes) => bytes,
            None => b"[]\n".to_vec(),
        };
        append(&mut tar, &format!("{}/master.json", dir), &master)?;
        files += 1;

        for bucket in [Bucket::Active, Bucket::Deleted] {
            let folder = match bucket {
                Bucket::Active => dir.clone(),
                Bucket::Deleted => format!("{}/deleted", dir),
            };
            for id in store.record_ids(section, bucket)? {
                let Some(body) = store.record_bytes(section, bucket, &id)? else {
                    continue;
                };
                let name = format!("{}/{}.json", folder, id);
                if serde_json::from_slice::<Record>(&body).is_err() {
                    tracing::warn!(file = %name, "backing up unparseable record as is");
                    corrupt.push(name.clone());
                }
                append(&mut tar, &name, &body)?;
                files += 1;
            }
        }
    }

    let config = serde_json::to_vec_pretty(&store.site_config()?)?;
    append(&mut tar, &format!("{}/config/config.json", ROOT), &config)?;

    let mut log = store.audit_lines()?.join("\n");
    if !log.is_empty() {
        log.push('\n');
    }
    append(&mut tar, &format!("{}/audit.log", ROOT), log.as_bytes())?;
    files += 2;

    tar.into_inner()?.finish()?;
    tracing::info!(%mode, files, corrupt = corrupt.len(), "backup written");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Backed up {} files from the {} tree",
        files, mode
    )));
    for name in corrupt {
        result.add_message(CmdMessage::warning(format!(
            "{} does not parse; archived unchanged",
            name
        )));
    }
    Ok(result)
}

fn append<W: Write>(tar: &mut tar::Builder<W>, name: &str, data: &[u8]) -> Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(Utc::now().timestamp().max(0) as u64);
    header.set_cksum();
    tar.append_data(&mut header, name, data)?;
    Ok(())
}
