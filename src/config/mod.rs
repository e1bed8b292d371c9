pub mod init;
mod schema;

pub use schema::Config;

use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::provider::{ConfigSource, FetchOptions};

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_FETCH_RETRIES: usize = 2;

/// Get the config directory path (~/.config/grade-calc/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("grade-calc"))
}

/// Get the default settings file path (~/.config/grade-calc/config.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.yaml"))
}

/// Get the default grading document path (~/.config/grade-calc/grading.json)
pub fn get_grading_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("grading.json"))
}

/// Load settings from a YAML file
///
/// An explicit `path` must exist. The default path is optional: when it is
/// missing, built-in settings are used.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let (config_path, explicit) = match path {
        Some(p) => (p, true),
        None => (get_config_path()?, false),
    };

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        tracing::debug!(path = %config_path.display(), "no settings file, using defaults");
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!(
            "Failed to parse config: invalid YAML in {}",
            config_path.display()
        )
    })?;

    tracing::debug!(path = %config_path.display(), "loaded settings");
    Ok(config)
}

/// Validate settings at startup. Returns all errors at once.
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref timeout) = config.fetch_timeout {
        match humantime::parse_duration(timeout) {
            Ok(d) if d.is_zero() => errors.push("fetch_timeout: must be greater than zero".to_string()),
            Ok(_) => {}
            Err(e) => errors.push(format!("fetch_timeout: invalid '{}' - {}", timeout, e)),
        }
    }

    if let Some(ref theme) = config.theme {
        if !matches!(theme.as_str(), "auto" | "dark" | "light") {
            errors.push(format!(
                "theme: invalid '{}' - expected auto, dark or light",
                theme
            ));
        }
    }

    if let Some(ref source) = config.source {
        if source.trim().is_empty() {
            errors.push("source: must not be empty".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

impl Config {
    /// Where to load the grading document from. A command-line override wins
    /// over the settings file, which wins over the default path.
    pub fn grading_source(&self, cli_override: Option<&str>) -> Result<ConfigSource> {
        match cli_override.or(self.source.as_deref()) {
            Some(s) => Ok(ConfigSource::parse(s)),
            None => Ok(ConfigSource::File(get_grading_path()?)),
        }
    }

    pub fn fetch_options(&self) -> Result<FetchOptions> {
        let timeout = match self.fetch_timeout {
            Some(ref t) => humantime::parse_duration(t)
                .with_context(|| format!("Invalid fetch_timeout '{}'", t))?,
            None => DEFAULT_FETCH_TIMEOUT,
        };
        Ok(FetchOptions {
            timeout,
            retries: self.fetch_retries.unwrap_or(DEFAULT_FETCH_RETRIES),
        })
    }
}

/// Write `contents` to `path` atomically, creating parent directories.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save {}", path.display()))?;

    Ok(())
}
