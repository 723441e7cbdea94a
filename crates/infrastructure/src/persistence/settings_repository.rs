//! Client settings persistence.
//!
//! Stores settings in the platform-specific config directory:
//! - Linux: ~/.config/questboard/settings.json
//! - macOS: ~/Library/Application Support/questboard/settings.json
//! - Windows: %APPDATA%/questboard/settings.json
//!
//! Environment variables override the file when loading.

use std::path::{Path, PathBuf};

use questboard_domain::{ClientSettings, DomainError};
use tokio::fs;
use tracing::debug;

use crate::serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};

/// Overrides `api_base_url`.
pub const ENV_API_URL: &str = "QUESTBOARD_API_URL";
/// Overrides `auth_token`.
pub const ENV_AUTH_TOKEN: &str = "QUESTBOARD_AUTH_TOKEN";
/// Overrides `timeout_ms`.
pub const ENV_TIMEOUT_MS: &str = "QUESTBOARD_TIMEOUT_MS";

/// Error type for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// Settings failed validation.
    #[error(transparent)]
    Invalid(#[from] DomainError),

    /// An environment override could not be parsed.
    #[error("invalid value for {name}: {value}")]
    InvalidOverride {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },

    /// Could not determine config directory.
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Repository for client settings persistence.
#[derive(Debug, Clone, Default)]
pub struct SettingsRepository {
    dir: Option<PathBuf>,
}

impl SettingsRepository {
    /// Creates a repository rooted at the platform config directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: dirs::config_dir().map(|p| p.join("questboard")),
        }
    }

    /// Creates a repository rooted at `dir`.
    #[must_use]
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Returns the path where settings are stored, if available.
    #[must_use]
    pub fn settings_path(&self) -> Option<PathBuf> {
        self.dir.as_deref().map(|p| p.join("settings.json"))
    }

    /// Loads settings from disk.
    ///
    /// Returns default settings if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(&self) -> Result<ClientSettings, SettingsError> {
        let Some(path) = self.settings_path() else {
            return Ok(ClientSettings::default());
        };
        if !fs::try_exists(&path).await? {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(ClientSettings::default());
        }

        let content = fs::read(&path).await?;
        Ok(from_json_bytes(&content)?)
    }

    /// Loads settings, applies environment overrides and validates them.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails, an override is malformed or the
    /// resulting settings are invalid.
    pub async fn load_effective(&self) -> Result<ClientSettings, SettingsError> {
        let settings = self.load().await?;
        let settings = apply_overrides(settings, |name| std::env::var(name).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if no config directory is known or writing fails.
    pub async fn save(&self, settings: &ClientSettings) -> Result<(), SettingsError> {
        let Some(dir) = self.dir.as_deref() else {
            return Err(SettingsError::NoConfigDir);
        };
        write_settings(dir, settings).await
    }
}

async fn write_settings(dir: &Path, settings: &ClientSettings) -> Result<(), SettingsError> {
    fs::create_dir_all(dir).await?;
    let content = to_json_stable_bytes(settings)?;
    fs::write(dir.join("settings.json"), content).await?;
    Ok(())
}

/// Applies `QUESTBOARD_*` overrides read through `lookup`.
///
/// An empty `QUESTBOARD_AUTH_TOKEN` clears the token.
fn apply_overrides(
    mut settings: ClientSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings, SettingsError> {
    if let Some(url) = lookup(ENV_API_URL) {
        settings.api_base_url = url;
    }
    if let Some(token) = lookup(ENV_AUTH_TOKEN) {
        settings.auth_token = (!token.trim().is_empty()).then_some(token);
    }
    if let Some(value) = lookup(ENV_TIMEOUT_MS) {
        settings.timeout_ms = value
            .trim()
            .parse()
            .map_err(|_| SettingsError::InvalidOverride {
                name: ENV_TIMEOUT_MS,
                value,
            })?;
    }
    Ok(settings)
}
