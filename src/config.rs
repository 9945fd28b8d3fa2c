use crate::error::{Result, TidyError};
use crate::storage::MAX_PAGE_SIZE;
use chrono::FixedOffset;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides `google.access_token`
pub const ACCESS_TOKEN_ENV: &str = "DRIVETIDY_ACCESS_TOKEN";

/// Value shipped in fresh configs; treated the same as an unset root
pub const ROOT_FOLDER_PLACEHOLDER: &str = "__ID_ROOT_FOLDER__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub google: Google,

    #[serde(default)]
    pub sheets: Sheets,

    #[serde(default)]
    pub inventory: Inventory,

    #[serde(default)]
    pub prune: Prune,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Google {
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default = "default_drive_api_base")]
    pub drive_api_base: String,

    #[serde(default = "default_sheets_api_base")]
    pub sheets_api_base: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sheets {
    #[serde(default)]
    pub spreadsheet_id: String,

    /// Sheet with one row per owned file
    #[serde(default = "default_primary_sheet")]
    pub primary: String,

    /// Sheet receiving rows of deleted files
    #[serde(default = "default_archive_sheet")]
    pub archive: String,

    /// Sheet logging folders removed by the pruner
    #[serde(default = "default_prune_log_sheet")]
    pub prune_log: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Dates are written at this fixed offset, not the viewer's zone
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,

    #[serde(default = "default_folder_url_prefix")]
    pub folder_url_prefix: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Prune {
    #[serde(default)]
    pub root_folder_id: Option<String>,
}

impl Default for Google {
    fn default() -> Self {
        Self {
            access_token: None,
            drive_api_base: default_drive_api_base(),
            sheets_api_base: default_sheets_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for Sheets {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            primary: default_primary_sheet(),
            archive: default_archive_sheet(),
            prune_log: default_prune_log_sheet(),
        }
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            utc_offset_hours: default_utc_offset_hours(),
            folder_url_prefix: default_folder_url_prefix(),
        }
    }
}

fn default_drive_api_base() -> String { "https://www.googleapis.com/drive/v3".to_string() }
fn default_sheets_api_base() -> String { "https://sheets.googleapis.com/v4".to_string() }
fn default_timeout_secs() -> u64 { 60 }
fn default_primary_sheet() -> String { "MyFIles".to_string() }
fn default_archive_sheet() -> String { "Removed".to_string() }
fn default_prune_log_sheet() -> String { "emptyFolders".to_string() }
fn default_page_size() -> u32 { MAX_PAGE_SIZE }
fn default_utc_offset_hours() -> i32 { -5 }
fn default_folder_url_prefix() -> String { "https://drive.google.com/drive/folders/".to_string() }

impl Config {
    /// Get the config file path, e.g. ~/.config/drivetidy/config.toml
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "drivetidy").ok_or_else(|| {
            TidyError::Configuration("could not determine a home directory".to_string())
        })?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load config from the default path or return defaults
    pub fn load() -> Self {
        let mut config = match Self::config_path() {
            Ok(path) if path.exists() => match Self::load_from(&path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to load config file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            _ => Self::default(),
        };
        config.apply_env();
        config
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
            if !token.trim().is_empty() {
                self.google.access_token = Some(token.trim().to_string());
            }
        }
    }

    /// Apply CLI option overrides
    pub fn apply_cli_overrides(&mut self, root_folder_id: Option<String>) {
        if let Some(root) = root_folder_id {
            self.prune.root_folder_id = Some(root);
        }
    }

    /// Root folder for the pruner, rejecting unset and placeholder values
    pub fn root_folder_id(&self) -> Result<&str> {
        match self.prune.root_folder_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() && id != ROOT_FOLDER_PLACEHOLDER => Ok(id),
            _ => Err(TidyError::Configuration(
                "prune.root_folder_id is not set; set it in the config file or pass --root"
                    .to_string(),
            )),
        }
    }

    pub fn access_token(&self) -> Result<&str> {
        match self.google.access_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(TidyError::Configuration(format!(
                "no access token; set google.access_token or {}",
                ACCESS_TOKEN_ENV
            ))),
        }
    }

    pub fn spreadsheet_id(&self) -> Result<&str> {
        let id = self.sheets.spreadsheet_id.trim();
        if id.is_empty() {
            return Err(TidyError::Configuration(
                "sheets.spreadsheet_id is not set".to_string(),
            ));
        }
        Ok(id)
    }

    pub fn page_size(&self) -> u32 {
        self.inventory.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// Offset used when formatting created/modified dates
    pub fn date_offset(&self) -> Result<FixedOffset> {
        self.inventory
            .utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                TidyError::Configuration(format!(
                    "inventory.utc_offset_hours out of range: {}",
                    self.inventory.utc_offset_hours
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.sheets.primary, "MyFIles");
        assert_eq!(config.sheets.archive, "Removed");
        assert_eq!(config.sheets.prune_log, "emptyFolders");
        assert_eq!(config.inventory.page_size, 1000);
        assert_eq!(config.inventory.utc_offset_hours, -5);
        assert_eq!(
            config.inventory.folder_url_prefix,
            "https://drive.google.com/drive/folders/"
        );
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [sheets]
            spreadsheet_id = "sheet-123"
            "#,
        )
        .unwrap();
        assert_eq!(config.spreadsheet_id().unwrap(), "sheet-123");
        assert_eq!(config.sheets.primary, "MyFIles");
        assert_eq!(config.google.timeout_secs, 60);
    }

    #[test]
    fn test_root_folder_id_rejects_placeholder() {
        let mut config = Config::default();
        assert!(config.root_folder_id().is_err());

        config.prune.root_folder_id = Some(ROOT_FOLDER_PLACEHOLDER.to_string());
        assert!(matches!(
            config.root_folder_id(),
            Err(TidyError::Configuration(_))
        ));

        config.apply_cli_overrides(Some("folder-1".to_string()));
        assert_eq!(config.root_folder_id().unwrap(), "folder-1");
    }

    #[test]
    fn test_cli_override_none_keeps_value() {
        let mut config = Config::default();
        config.prune.root_folder_id = Some("keep".to_string());
        config.apply_cli_overrides(None);
        assert_eq!(config.root_folder_id().unwrap(), "keep");
    }

    #[test]
    fn test_date_offset() {
        let config = Config::default();
        assert_eq!(config.date_offset().unwrap().local_minus_utc(), -5 * 3600);

        let mut bad = Config::default();
        bad.inventory.utc_offset_hours = 48;
        assert!(bad.date_offset().is_err());
    }

    #[test]
    fn test_page_size_clamped() {
        let mut config = Config::default();
        config.inventory.page_size = 0;
        assert_eq!(config.page_size(), 1);
        config.inventory.page_size = 10_000;
        assert_eq!(config.page_size(), 1000);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.sheets.spreadsheet_id = "abc".to_string();
        config.prune.root_folder_id = Some("root".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.sheets.spreadsheet_id, "abc");
        assert_eq!(loaded.prune.root_folder_id.as_deref(), Some("root"));
    }

    #[test]
    fn test_load_from_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[sheets\nprimary = 1").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(TidyError::Serialization(_))
        ));
    }
}
