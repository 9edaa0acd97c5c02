// Wizard configuration
//
// Layered with the `config` crate: built-in defaults, then an optional `ppdb-wizard.toml`
// (or the file named by `PPDB_CONFIG`), then `PPDB_*` environment variables
// (`PPDB_SUBMISSION__MODE=http` sets `submission.mode`).

use crate::utils::path_resolver;
use crate::wizard::DRAFT_STORAGE_KEY;
use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, Environment, File};
use log::LevelFilter;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CONFIG_FILE_STEM: &str = "ppdb-wizard";
pub const CONFIG_PATH_ENV: &str = "PPDB_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionMode {
    Simulated,
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DraftSettings {
    pub storage_key: String,
    pub store_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionSettings {
    pub mode: SubmissionMode,
    pub base_url: String,
    pub timeout_secs: u64,
    pub simulated_latency_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default)]
    pub dir: Option<PathBuf>,
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WizardConfig {
    pub draft: DraftSettings,
    pub submission: SubmissionSettings,
    pub logging: LoggingSettings,
}

fn base_builder() -> Result<ConfigBuilder<DefaultState>, SettingsError> {
    let store_path = path_resolver::default_draft_store_path()
        .map_err(|e| SettingsError::Invalid(e.to_string()))?;

    Ok(Config::builder()
        .set_default("draft.storage_key", DRAFT_STORAGE_KEY)?
        .set_default("draft.store_path", store_path.to_string_lossy().to_string())?
        .set_default("submission.mode", "simulated")?
        .set_default("submission.base_url", "http://127.0.0.1:8000")?
        .set_default("submission.timeout_secs", 15)?
        .set_default("submission.simulated_latency_ms", 400)?
        .set_default("logging.level", "debug")?)
}

impl WizardConfig {
    /// Defaults + `ppdb-wizard.toml` (or `$PPDB_CONFIG`) + environment.
    pub fn load() -> Result<Self, SettingsError> {
        let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        Self::load_from(explicit.as_deref(), true)
    }

    pub fn load_from(file: Option<&Path>, with_env: bool) -> Result<Self, SettingsError> {
        let mut builder = base_builder()?;

        builder = match file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(CONFIG_FILE_STEM).required(false)),
        };

        if with_env {
            builder = builder.add_source(
                Environment::with_prefix("PPDB")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let cfg: WizardConfig = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Built-in defaults only; no file, no environment.
    pub fn defaults() -> Result<Self, SettingsError> {
        let cfg: WizardConfig = base_builder()?.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn log_level(&self) -> LevelFilter {
        LevelFilter::from_str(&self.logging.level).unwrap_or(LevelFilter::Debug)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.draft.storage_key.trim().is_empty() {
            return Err(SettingsError::Invalid(
                "draft.storage_key must not be empty".to_string(),
            ));
        }
        if self.submission.timeout_secs == 0 {
            return Err(SettingsError::Invalid(
                "submission.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if LevelFilter::from_str(&self.logging.level).is_err() {
            return Err(SettingsError::Invalid(format!(
                "logging.level '{}' is not a log level",
                self.logging.level
            )));
        }
        if self.submission.mode == SubmissionMode::Http
            && url::Url::parse(&self.submission.base_url).is_err()
        {
            return Err(SettingsError::Invalid(format!(
                "submission.base_url '{}' is not a URL",
                self.submission.base_url
            )));
        }
        Ok(())
    }
}
