//! # Context Setup
//!
//! Turns a resolved [`StoreConfig`] into a ready-to-use [`SocietyApi`] over the
//! filesystem.
//!
//! ## Mode Resolution
//!
//! The data tree (`<base>/demo/` or `<base>/production/`) is chosen in this order:
//! 1. `StoreConfig::mode` (CLI flag, `SOCIETYDB_MODE`, or `societydb.toml`).
//! 2. The `mode` key of `<base>/config/config.json`.
//! 3. [`Mode::Demo`].
//!
//! Nothing is created on disk here; directories appear on first write or on `init`.

use crate::api::{ApiDefaults, SocietyApi};
use crate::config::StoreConfig;
use crate::error::Result;
use crate::model::Mode;
use crate::store::backend::StorageBackend;
use crate::store::fs::FileStore;
use crate::store::fs_backend::FsBackend;
use std::path::{Path, PathBuf};

pub struct SocietyContext {
    pub api: SocietyApi<FileStore>,
    pub mode: Mode,
    pub base: PathBuf,
    pub config: StoreConfig,
}

/// Mode stored in the site config under `base`, if the file exists.
pub fn configured_mode(base: &Path) -> Result<Option<Mode>> {
    let backend = FsBackend::new(base.to_path_buf(), Mode::default());
    Ok(backend.load_site_config()?.map(|config| config.mode))
}

pub fn resolve_mode(config: &StoreConfig) -> Result<Mode> {
    if let Some(mode) = config.mode()? {
        return Ok(mode);
    }
    Ok(configured_mode(&config.data_dir)?.unwrap_or_default())
}

/// Builds the API for `config`.
pub fn initialize(config: StoreConfig) -> Result<SocietyContext> {
    let mode = resolve_mode(&config)?;
    let base = config.data_dir.clone();
    tracing::debug!(base = %base.display(), %mode, "opening store");

    let store = FileStore::new_fs(base.clone(), mode);
    let api = SocietyApi::new(store).with_defaults(ApiDefaults {
        user: config.user.clone(),
        per_page: config.per_page,
        cleanup_after_days: config.cleanup_after_days,
        audit_retention_days: config.audit_retention_days,
    });

    Ok(SocietyContext {
        api,
        mode,
        base,
        config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config_for(dir: &Path) -> StoreConfig {
        StoreConfig {
            data_dir: dir.to_path_buf(),
            ..StoreConfig::defaults().unwrap()
        }
    }

    #[test]
    fn defaults_to_demo_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = initialize(config_for(dir.path())).unwrap();
        assert_eq!(ctx.mode, Mode::Demo);
        assert_eq!(ctx.api.mode(), Mode::Demo);
    }

    #[test]
    fn reads_mode_from_site_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        fs::write(
            dir.path().join("config/config.json"),
            r#"{"mode": "production", "societyName": "Green Acres"}"#,
        )
        .unwrap();

        let ctx = initialize(config_for(dir.path())).unwrap();
        assert_eq!(ctx.mode, Mode::Production);
    }

    #[test]
    fn explicit_mode_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        fs::write(dir.path().join("config/config.json"), r#"{"mode": "production"}"#).unwrap();

        let config = StoreConfig {
            mode: Some("demo".into()),
            ..config_for(dir.path())
        };
        assert_eq!(initialize(config).unwrap().mode, Mode::Demo);
    }

    #[test]
    fn passes_defaults_to_api() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            user: "treasurer".into(),
            per_page: 25,
            ..config_for(dir.path())
        };
        let ctx = initialize(config).unwrap();
        assert_eq!(ctx.api.defaults().user, "treasurer");
        assert_eq!(ctx.api.defaults().per_page, 25);
    }
}
