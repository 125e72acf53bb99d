use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

const CONFIG_DIR_NAME: &str = "prlens";
const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_RELOAD_DELAY_MS: u64 = 3000;
const DEFAULT_TAB_DELAY_MS: u64 = 2000;
const DEFAULT_SCROLL_DELAY_MS: u64 = 3000;
const DEFAULT_POLL_INTERVAL_MS: u64 = 250;
const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 20;

/// CSS selectors locating the diff structure on the review page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSelectors {
    pub summary_header: String,
    pub file_name: String,
    pub line_content: String,
    pub files_tab: String,
    pub changes_viewer: String,
    pub added_class: String,
    pub removed_class: String,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            summary_header: ".repos-summary-header".to_string(),
            file_name: ".body-s.secondary-text.text-ellipsis".to_string(),
            line_content: ".repos-line-content".to_string(),
            files_tab: "#__bolt-tab-files".to_string(),
            changes_viewer: ".repos-changes-viewer".to_string(),
            added_class: "added".to_string(),
            removed_class: "removed".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplanationProvider {
    Gemini,
    Endpoint,
}

impl ExplanationProvider {
    pub fn parse(value: &str) -> AppResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "gemini" => Ok(ExplanationProvider::Gemini),
            "endpoint" => Ok(ExplanationProvider::Endpoint),
            other => Err(AppError::Configuration(format!(
                "unknown explanation provider '{other}' (expected gemini or endpoint)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleMode {
    Fixed,
    Poll,
}

impl SettleMode {
    pub fn parse(value: &str) -> AppResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "fixed" => Ok(SettleMode::Fixed),
            "poll" => Ok(SettleMode::Poll),
            other => Err(AppError::Configuration(format!(
                "unknown settle mode '{other}' (expected fixed or poll)"
            ))),
        }
    }
}

/// How long to let the page settle after each interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettleConfig {
    pub mode: SettleMode,
    pub reload_delay: Duration,
    pub tab_delay: Duration,
    pub scroll_delay: Duration,
    pub poll_interval: Duration,
    pub max_attempts: u32,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            mode: SettleMode::Poll,
            reload_delay: Duration::from_millis(DEFAULT_RELOAD_DELAY_MS),
            tab_delay: Duration::from_millis(DEFAULT_TAB_DELAY_MS),
            scroll_delay: Duration::from_millis(DEFAULT_SCROLL_DELAY_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub provider: ExplanationProvider,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub endpoint_url: Option<String>,
    pub explain_timeout: Option<Duration>,
    pub settle: SettleConfig,
    pub clipboard_command: Option<String>,
    pub selectors: PageSelectors,
}

impl AppConfig {
    pub fn load() -> AppResult<Self> {
        let stored = StoredConfig::load()?;
        Self::resolve(stored, |key| env::var(key).ok())
    }

    /// Layers environment overrides on top of the stored file, then defaults.
    pub fn resolve(
        stored: StoredConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> AppResult<Self> {
        let pick = |key: &str, stored: Option<String>| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .or(stored)
                .filter(|value| !value.trim().is_empty())
        };

        let provider = match pick("PRLENS_PROVIDER", stored.provider) {
            Some(value) => ExplanationProvider::parse(&value)?,
            None => ExplanationProvider::Gemini,
        };

        let defaults = SettleConfig::default();
        let settle_mode = match stored.settle_mode.as_deref() {
            Some(value) => SettleMode::parse(value)?,
            None => defaults.mode,
        };
        let millis = |value: Option<u64>, fallback: Duration| {
            value.map(Duration::from_millis).unwrap_or(fallback)
        };
        let settle = SettleConfig {
            mode: settle_mode,
            reload_delay: millis(stored.reload_delay_ms, defaults.reload_delay),
            tab_delay: millis(stored.tab_delay_ms, defaults.tab_delay),
            scroll_delay: millis(stored.scroll_delay_ms, defaults.scroll_delay),
            poll_interval: millis(stored.poll_interval_ms, defaults.poll_interval),
            max_attempts: stored.poll_max_attempts.unwrap_or(defaults.max_attempts).max(1),
        };

        Ok(Self {
            provider,
            gemini_api_key: pick("PRLENS_GEMINI_API_KEY", stored.gemini_api_key),
            gemini_model: pick("PRLENS_GEMINI_MODEL", stored.gemini_model)
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            endpoint_url: pick("PRLENS_ENDPOINT", stored.endpoint_url),
            explain_timeout: stored
                .explain_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            settle,
            clipboard_command: pick("PRLENS_CLIPBOARD_COMMAND", stored.clipboard_command),
            selectors: stored.selectors.unwrap_or_default(),
        })
    }
}

/// On-disk configuration, edited by `prlens config init`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explain_timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settle_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reload_delay_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_delay_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_delay_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_max_attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clipboard_command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selectors: Option<PageSelectors>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        Self::load_from(&config_file_path()?)
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str::<StoredConfig>(&contents)
                .map_err(|err| AppError::Configuration(format!("invalid config file: {err}"))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(StoredConfig::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn save(&self) -> AppResult<()> {
        self.save_to(&config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|err| AppError::Configuration(format!("failed to write config: {err}")))?;
        fs::write(path, data)?;
        Ok(())
    }
}

pub fn config_directory() -> AppResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .ok_or_else(|| AppError::Configuration("cannot locate a config directory".to_string()))
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}
