//! # Configuration
//!
//! Two different things are called "config" here:
//!
//! - [`StoreConfig`]: how *this tool* runs (where the data lives, who is acting, page
//!   sizes, retention). Managed by [`confique`]: layered from environment variables,
//!   TOML files and compiled defaults.
//! - [`SiteConfig`]: the society website's own settings, stored *inside* the data tree
//!   at `<base>/config/config.json`. It carries the active [`Mode`] plus free-form keys
//!   the site reads (society name, contact email, ...).
//!
//! ## StoreConfig Resolution
//!
//! Resolved in priority order:
//! 1. **CLI flags**: applied by the caller after loading.
//! 2. **Environment variables**: `SOCIETYDB_DATA_DIR`, `SOCIETYDB_MODE`, ...
//! 3. **Local file**: `./societydb.toml`.
//! 4. **User file**: `societydb.toml` in the OS config directory (via `directories`).
//! 5. **Compiled defaults**: `#[config(default = ...)]`.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `data_dir` | `data` | Base directory of the store |
//! | `mode` | unset | Overrides the mode stored in `config/config.json` |
//! | `user` | `admin` | Actor recorded in stamps and audit entries |
//! | `per_page` | `10` | Default page size for listings |
//! | `cleanup_after_days` | `30` | Default age for purging soft-deleted records |
//! | `audit_retention_days` | `90` | Default age for rotating audit lines |

use crate::error::{Result, SocietyError};
use crate::model::Mode;
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "societydb.toml";

/// Configuration for the store, stored in `societydb.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Base directory holding config/, schemas/, audit.log and the mode trees.
    #[config(env = "SOCIETYDB_DATA_DIR", default = "data")]
    pub data_dir: PathBuf,

    /// Data tree to use ("demo" or "production"). When absent, the mode stored in
    /// config/config.json is used.
    #[config(env = "SOCIETYDB_MODE")]
    pub mode: Option<String>,

    /// Name recorded as createdBy/updatedBy/deletedBy and in the audit log.
    #[config(env = "SOCIETYDB_USER", default = "admin")]
    pub user: String,

    /// Default page size for listings. 0 lists everything.
    #[config(env = "SOCIETYDB_PER_PAGE", default = 10)]
    pub per_page: usize,

    /// Soft-deleted records older than this many days are purged by cleanup.
    #[config(env = "SOCIETYDB_CLEANUP_AFTER_DAYS", default = 30)]
    pub cleanup_after_days: u32,

    /// Audit lines older than this many days are moved to the archive on rotation.
    #[config(env = "SOCIETYDB_AUDIT_RETENTION_DAYS", default = 90)]
    pub audit_retention_days: u32,
}

impl StoreConfig {
    /// The compiled defaults alone, with no file or environment layered on top.
    pub fn defaults() -> Result<Self> {
        StoreConfig::builder()
            .load()
            .map_err(|e| SocietyError::Config(e.to_string()))
    }

    /// Loads from the environment, `./societydb.toml` and the user config directory.
    pub fn load() -> Result<Self> {
        let mut builder = StoreConfig::builder().env().file(CONFIG_FILE_NAME);
        if let Some(path) = user_config_path() {
            builder = builder.file(path);
        }
        builder
            .load()
            .map_err(|e| SocietyError::Config(e.to_string()))
    }

    /// Loads from a single file (plus compiled defaults), ignoring the environment.
    pub fn from_file(path: &Path) -> Result<Self> {
        StoreConfig::builder()
            .file(path)
            .load()
            .map_err(|e| SocietyError::Config(e.to_string()))
    }

    /// The configured mode override, if any.
    pub fn mode(&self) -> Result<Option<Mode>> {
        self.mode.as_deref().map(str::parse).transpose()
    }

    /// Sample `societydb.toml` with every key documented and commented out.
    pub fn template() -> String {
        confique::toml::template::<StoreConfig>(confique::toml::FormatOptions::default())
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "societydb", "societydb")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Site settings stored in `<base>/config/config.json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SiteConfig {
    #[serde(default)]
    pub mode: Mode,

    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl SiteConfig {
    /// Shallow merge of `patch` into the settings. A `mode` key switches the mode.
    pub fn apply(&mut self, mut patch: Map<String, Value>) -> Result<()> {
        if let Some(mode) = patch.remove("mode") {
            let name = mode
                .as_str()
                .ok_or_else(|| SocietyError::UnknownMode(mode.to_string()))?;
            self.mode = name.parse()?;
        }
        for (key, value) in patch {
            self.settings.insert(key, value);
        }
        Ok(())
    }

    /// Lookup by key; `mode` resolves to the typed mode.
    pub fn get(&self, key: &str) -> Option<Value> {
        if key == "mode" {
            return Some(Value::String(self.mode.to_string()));
        }
        self.settings.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::defaults().unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.user, "admin");
        assert_eq!(config.per_page, 10);
        assert_eq!(config.mode().unwrap(), None);
    }

    #[test]
    fn test_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            "data_dir = \"/srv/society\"\nmode = \"production\"\nper_page = 25\n",
        )
        .unwrap();

        let config = StoreConfig::from_file(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/society"));
        assert_eq!(config.mode().unwrap(), Some(Mode::Production));
        assert_eq!(config.per_page, 25);
        assert_eq!(config.user, "admin");
        assert_eq!(config.audit_retention_days, 90);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::from_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, StoreConfig::defaults().unwrap());
    }

    #[test]
    fn test_bad_mode_is_reported() {
        let config = StoreConfig {
            mode: Some("staging".into()),
            ..StoreConfig::defaults().unwrap()
        };
        assert!(config.mode().is_err());
    }

    #[test]
    fn test_defaults_agree_with_api_defaults() {
        let config = StoreConfig::defaults().unwrap();
        let api = crate::api::ApiDefaults::default();
        assert_eq!(config.user, api.user);
        assert_eq!(config.per_page, api.per_page);
        assert_eq!(config.cleanup_after_days, api.cleanup_after_days);
        assert_eq!(config.audit_retention_days, api.audit_retention_days);
    }

    #[test]
    fn test_template_is_valid_toml() {
        let template = StoreConfig::template();
        assert!(template.contains("data_dir"));
        assert!(template.parse::<toml::Table>().is_ok());
    }

    #[test]
    fn test_site_config_shape() {
        let config: SiteConfig =
            serde_json::from_value(json!({"mode": "production", "societyName": "Green Acres"}))
                .unwrap();
        assert_eq!(config.mode, Mode::Production);
        assert_eq!(config.get("societyName"), Some(json!("Green Acres")));
        assert_eq!(config.get("mode"), Some(json!("production")));

        let missing_mode: SiteConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(missing_mode.mode, Mode::Demo);
    }

    #[test]
    fn test_site_config_apply() {
        let mut config = SiteConfig::default();
        let patch = json!({"mode": "production", "email": "office@society.in"});
        config.apply(patch.as_object().cloned().unwrap()).unwrap();
        assert_eq!(config.mode, Mode::Production);
        assert_eq!(config.settings["email"], "office@society.in");
        assert!(!config.settings.contains_key("mode"));

        let bad = json!({"mode": 3});
        assert!(config.apply(bad.as_object().cloned().unwrap()).is_err());
    }
}
