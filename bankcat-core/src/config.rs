//! Configuration management
//!
//! Settings live in `settings.json` inside the bankcat directory:
//! ```json
//! {
//!   "categorizerUrl": "http://localhost:8080/api/",
//!   "defaultBank": "RBC",
//!   "defaultFileType": "text/csv",
//!   "verifyCategorization": false,
//!   "export": { "uncategorized": "undefined", "quoting": "none" }
//! }
//! ```
//! Keys bankcat doesn't know about are kept when saving.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::http::{resolve_base_url, API_URL_ENV};
use crate::services::export::{ExportOptions, Quoting, UncategorizedStyle};

pub const SETTINGS_FILE: &str = "settings.json";

/// Environment variable overriding the bankcat directory
pub const DIR_ENV: &str = "BANKCAT_DIR";

/// Environment variable overriding `verifyCategorization`
pub const VERIFY_ENV: &str = "BANKCAT_VERIFY_CATEGORIZATION";

/// Keys accepted by [`Config::set`]
pub const SETTABLE_KEYS: &[&str] = &[
    "categorizerUrl",
    "defaultBank",
    "defaultFileType",
    "verifyCategorization",
    "export.uncategorized",
    "export.quoting",
];

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    categorizer_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_bank: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_file_type: Option<String>,
    #[serde(default)]
    verify_categorization: bool,
    #[serde(default)]
    export: ExportOptions,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Directory holding settings.json and logs.duckdb
///
/// `BANKCAT_DIR` if set, otherwise `~/.bankcat`.
pub fn default_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(DIR_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".bankcat"))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "true" | "1" | "yes" | "TRUE" | "YES" => Some(true),
        "false" | "0" | "no" | "FALSE" | "NO" => Some(false),
        _ => None,
    }
}

/// bankcat configuration (settings with environment overrides applied)
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub categorizer_url: Option<String>,
    pub default_bank: Option<String>,
    pub default_file_type: Option<String>,
    pub verify_categorization: bool,
    pub export: ExportOptions,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Config {
    /// Load config from the bankcat directory
    ///
    /// A missing settings file gives the defaults. `BANKCAT_VERIFY_CATEGORIZATION`
    /// overrides the stored verification flag.
    pub fn load(dir: &Path) -> Result<Self> {
        let settings_path = dir.join(SETTINGS_FILE);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {}", settings_path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid settings in {}", settings_path.display()))?
        } else {
            SettingsFile::default()
        };

        let verify_override = std::env::var(VERIFY_ENV).ok().and_then(|v| parse_flag(&v));
        Ok(Self::from_settings(raw, verify_override))
    }

    /// Effective config from the stored settings; the raw file value of
    /// `verifyCategorization` stays in `_raw_settings` for `save`
    fn from_settings(raw: SettingsFile, verify_override: Option<bool>) -> Self {
        Self {
            categorizer_url: raw.categorizer_url.clone(),
            default_bank: raw.default_bank.clone(),
            default_file_type: raw.default_file_type.clone(),
            verify_categorization: verify_override.unwrap_or(raw.verify_categorization),
            export: raw.export,
            _raw_settings: raw,
        }
    }

    /// Save config to the bankcat directory
    ///
    /// Preserves other settings that bankcat doesn't manage. The
    /// verification flag is written as stored, never from the environment.
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let settings_path = dir.join(SETTINGS_FILE);

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            self._raw_settings.clone()
        };

        settings.categorizer_url = self.categorizer_url.clone();
        settings.default_bank = self.default_bank.clone();
        settings.default_file_type = self.default_file_type.clone();
        settings.verify_categorization = self._raw_settings.verify_categorization;
        settings.export = self.export;

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)
            .with_context(|| format!("Failed to write {}", settings_path.display()))?;
        Ok(())
    }

    /// Set one setting from its settings.json key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "categorizerUrl" => {
                crate::adapters::http::categorize_endpoint(value)?;
                self.categorizer_url = Some(value.to_string());
            }
            "defaultBank" => self.default_bank = Some(value.to_string()),
            "defaultFileType" => self.default_file_type = Some(value.to_string()),
            "verifyCategorization" => {
                let verify = parse_flag(value)
                    .with_context(|| format!("Expected true or false, got '{}'", value))?;
                self.verify_categorization = verify;
                self._raw_settings.verify_categorization = verify;
            }
            "export.uncategorized" => self.export.uncategorized = value.parse::<UncategorizedStyle>()?,
            "export.quoting" => self.export.quoting = value.parse::<Quoting>()?,
            other => anyhow::bail!(
                "Unknown setting '{}'. Known settings: {}",
                other,
                SETTABLE_KEYS.join(", ")
            ),
        }
        Ok(())
    }

    /// Categorization service base URL after environment overrides
    pub fn effective_categorizer_url(&self) -> String {
        resolve_base_url(self.categorizer_url.as_deref())
    }

    /// Whether the categorizer URL comes from the environment
    pub fn categorizer_url_from_env(&self) -> bool {
        std::env::var(API_URL_ENV).is_ok_and(|v| !v.trim().is_empty())
    }
}
