use crate::error::{PmboardError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PmboardConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub tui: TuiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout. Requests wait indefinitely when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Override for the session file. Defaults to `~/.config/pmboard/session.json`.
    #[serde(default)]
    pub path: Option<String>,
}

impl SessionConfig {
    pub fn resolve_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(p) => Ok(PathBuf::from(p)),
            None => config_dir()
                .map(|d| d.join("session.json"))
                .ok_or_else(|| {
                    PmboardError::Config("cannot determine config directory".to_string())
                }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuiConfig {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// How many ticks an error toast stays on screen.
    #[serde(default = "default_error_ticks")]
    pub error_ticks: u16,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            error_ticks: default_error_ticks(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Valid values for `logging.level`.
pub const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_tick_ms() -> u64 {
    50
}
fn default_error_ticks() -> u16 {
    100
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl PmboardConfig {
    /// Load configuration with three-layer TOML merge, then environment:
    /// 1. ~/.config/pmboard/config.toml (global)
    /// 2. .pmboard/config.toml (project)
    /// 3. .pmboard/config.local.toml (local, gitignored)
    /// 4. `PMBOARD__SECTION__KEY` variables
    pub fn load(project_dir: Option<&Path>) -> Result<Self> {
        Self::load_layers(global_config_path(), project_dir, true)
    }

    fn load_layers(
        global_path: Option<PathBuf>,
        project_dir: Option<&Path>,
        with_env: bool,
    ) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(global_path) = global_path {
            if global_path.exists() {
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        if let Some(dir) = project_dir {
            let project_config = dir.join(".pmboard").join("config.toml");
            if project_config.exists() {
                builder = builder.add_source(File::from(project_config).required(false));
            }

            let local_config = dir.join(".pmboard").join("config.local.toml");
            if local_config.exists() {
                builder = builder.add_source(File::from(local_config).required(false));
            }
        }

        if with_env {
            builder = builder.add_source(
                Environment::with_prefix("PMBOARD")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let config = builder
            .build()
            .map_err(|e| PmboardError::Config(e.to_string()))?;

        let mut cfg: Self = config
            .try_deserialize()
            .map_err(|e| PmboardError::Config(e.to_string()))?;

        cfg.validate();
        Ok(cfg)
    }

    /// Defaults only (no files, no environment).
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Validate config values, resetting bad ones and logging warnings.
    /// Lenient: it fixes values rather than rejecting the config.
    pub fn validate(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        let trimmed = self.api.base_url.trim().trim_end_matches('/').to_string();
        match reqwest::Url::parse(&trimmed) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                self.api.base_url = trimmed;
            }
            _ => {
                warnings.push(format!(
                    "api.base_url '{}' is not an http(s) URL, using {DEFAULT_BASE_URL}",
                    self.api.base_url
                ));
                self.api.base_url = default_base_url();
            }
        }

        if self.api.timeout_secs == Some(0) {
            warnings.push("api.timeout_secs = 0, disabling the timeout".to_string());
            self.api.timeout_secs = None;
        }

        if self.tui.tick_ms == 0 {
            warnings.push(format!(
                "tui.tick_ms = 0, setting to {}",
                default_tick_ms()
            ));
            self.tui.tick_ms = default_tick_ms();
        }
        if self.tui.error_ticks == 0 {
            warnings.push(format!(
                "tui.error_ticks = 0, setting to {}",
                default_error_ticks()
            ));
            self.tui.error_ticks = default_error_ticks();
        }

        let level = self.logging.level.to_lowercase();
        if VALID_LOG_LEVELS.contains(&level.as_str()) {
            self.logging.level = level;
        } else {
            warnings.push(format!(
                "unknown logging.level '{}', valid: {}",
                self.logging.level,
                VALID_LOG_LEVELS.join(", ")
            ));
            self.logging.level = default_log_level();
        }

        for w in &warnings {
            tracing::warn!("config: {}", w);
        }

        warnings
    }
}

/// `~/.config/pmboard`
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("pmboard"))
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("config.toml"))
}
