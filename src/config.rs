use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use directories::BaseDirs;
use serde::Deserialize;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_NAME: &str = "optlist";

pub const DEFAULT_PHONE_REGION: &str = "US";
pub const DEFAULT_MAX_RECENT_REPORTS: usize = 5;
pub const DEFAULT_SMS_DOMAIN: &str = "@expensify.sms";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Engine policy knobs. Every field has a built-in default so the engine can
/// run without any file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub config_path: Option<PathBuf>,
    /// Region used to add a country code to phone input that lacks one.
    pub phone_region: String,
    /// Recent reports shown when there is no search input.
    pub max_recent_reports: usize,
    /// Automated accounts hidden unless a caller opts in.
    pub system_accounts: Vec<String>,
    /// Suffix the store appends to phone-number logins.
    pub sms_domain: String,
    /// Unsearched taxonomies with fewer enabled entries than this render as a
    /// single untitled section.
    pub list_collapse_threshold: Option<usize>,
    pub log_level: String,
    /// Top-level keys the file carried that nothing reads.
    pub unknown_keys: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: None,
            phone_region: DEFAULT_PHONE_REGION.to_string(),
            max_recent_reports: DEFAULT_MAX_RECENT_REPORTS,
            system_accounts: default_system_accounts(),
            sms_domain: DEFAULT_SMS_DOMAIN.to_string(),
            list_collapse_threshold: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            unknown_keys: Vec::new(),
        }
    }
}

impl Config {
    pub fn is_system_account(&self, login: &str) -> bool {
        let login = login.trim();
        self.system_accounts
            .iter()
            .any(|account| account.eq_ignore_ascii_case(login))
    }

    /// Log one warning per unknown key, once a subscriber is installed.
    pub fn warn_unknown_keys(&self) {
        for key in &self.unknown_keys {
            tracing::warn!(key = %key, "unknown configuration key ignored");
        }
    }
}

fn default_system_accounts() -> Vec<String> {
    vec![
        "concierge@expensify.com".into(),
        "chronos@expensify.com".into(),
        "receipts@expensify.com".into(),
    ]
}

// =============================================================================
// Config file structure
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ConfigFile {
    phone_region: Option<String>,
    max_recent_reports: usize,
    system_accounts: Vec<String>,
    sms_domain: String,
    list_collapse_threshold: Option<usize>,
    log_level: String,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let defaults = Config::default();
        Self {
            phone_region: None,
            max_recent_reports: defaults.max_recent_reports,
            system_accounts: defaults.system_accounts,
            sms_domain: defaults.sms_domain,
            list_collapse_threshold: defaults.list_collapse_threshold,
            log_level: defaults.log_level,
        }
    }
}

impl ConfigFile {
    fn into_config(self, config_path: Option<PathBuf>, unknown_keys: Vec<String>) -> Result<Config> {
        let phone_region = self
            .phone_region
            .as_ref()
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(|value| value.to_ascii_uppercase())
            .unwrap_or_else(|| DEFAULT_PHONE_REGION.to_string());

        if phone_region.len() != 2 || !phone_region.chars().all(|c| c.is_ascii_alphabetic()) {
            bail!(
                "invalid phone_region '{}', expected a two-letter region code such as US",
                phone_region
            );
        }

        if self.list_collapse_threshold == Some(0) {
            bail!("list_collapse_threshold must be at least 1 when set");
        }

        let system_accounts = self
            .system_accounts
            .into_iter()
            .map(|login| login.trim().to_lowercase())
            .filter(|login| !login.is_empty())
            .collect();

        Ok(Config {
            config_path,
            phone_region,
            max_recent_reports: self.max_recent_reports,
            system_accounts,
            sms_domain: self.sms_domain.trim().to_lowercase(),
            list_collapse_threshold: self.list_collapse_threshold,
            log_level: self.log_level,
            unknown_keys,
        })
    }
}

fn config_root() -> Result<PathBuf> {
    let base = BaseDirs::new().context("unable to determine base directories")?;
    Ok(base.config_dir().join(APP_NAME))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_root()?.join(CONFIG_FILE_NAME))
}

/// Load the default configuration file, or built-in defaults when it does not
/// exist.
pub fn load() -> Result<Config> {
    let path = config_path()?;
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no configuration file, using defaults");
        return Ok(Config::default());
    }
    load_from(&path)
}

/// Load an explicitly named configuration file. A missing file is an error.
pub fn load_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        bail!("configuration file not found at {}", path.display());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration file at {}", path.display()))?;

    parse_str(&raw, Some(path.to_path_buf()))
        .with_context(|| format!("failed to load configuration from {}", path.display()))
}

pub fn parse_str(raw: &str, config_path: Option<PathBuf>) -> Result<Config> {
    let value: toml::Value = toml::from_str(raw).context("failed to parse configuration as TOML")?;

    let unknown_keys = unknown_keys(&value);

    let cfg_file: ConfigFile = value
        .try_into()
        .context("failed to deserialize configuration")?;

    cfg_file.into_config(config_path, unknown_keys)
}

// =============================================================================
// Unknown keys
// =============================================================================

const KNOWN_KEYS: &[&str] = &[
    "phone_region",
    "max_recent_reports",
    "system_accounts",
    "sms_domain",
    "list_collapse_threshold",
    "log_level",
];

fn unknown_keys(value: &toml::Value) -> Vec<String> {
    let Some(table) = value.as_table() else {
        return Vec::new();
    };
    table
        .keys()
        .filter(|key| !KNOWN_KEYS.contains(&key.as_str()))
        .cloned()
        .collect()
}
