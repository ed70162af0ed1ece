//! Provider configuration.
//!
//! Credentials and endpoints for the station directory (NREL) and the
//! mapping provider (HERE). Loaded from the environment or from a JSON
//! file keyed by provider name, then passed explicitly to the clients.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::mapping::MappingConfig;
use crate::stations::StationClientConfig;

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),

    /// The settings file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid
    #[error("invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings for every external provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub nrel: StationClientConfig,
    pub here: MappingConfig,
}

/// On-disk layout: `{"NREL": {...}, "HERE": {...}}`.
#[derive(Debug, Deserialize)]
struct SettingsFile {
    #[serde(rename = "NREL")]
    nrel: NrelSection,
    #[serde(rename = "HERE")]
    here: HereSection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct NrelSection {
    api_key: String,
    #[serde(default)]
    base_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct HereSection {
    app_id: String,
    app_code: String,
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    geocode_url: Option<String>,
}

impl Settings {
    /// Load settings from environment variables.
    ///
    /// Required: `NREL_API_KEY`, `HERE_APP_ID`, `HERE_APP_CODE`.
    /// Optional: `NREL_BASE_URL`, `HERE_ROUTE_URL`, `HERE_GEOCODE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings using `lookup` to read variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::MissingVar(key));

        let mut nrel = StationClientConfig::new(require("NREL_API_KEY")?);
        if let Some(url) = get("NREL_BASE_URL") {
            nrel = nrel.with_base_url(url);
        }

        let mut here = MappingConfig::new(require("HERE_APP_ID")?, require("HERE_APP_CODE")?);
        if let Some(url) = get("HERE_ROUTE_URL") {
            here = here.with_route_url(url);
        }
        if let Some(url) = get("HERE_GEOCODE_URL") {
            here = here.with_geocode_url(url);
        }

        Ok(Self { nrel, here })
    }

    /// Load settings from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Parse settings from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let file: SettingsFile = serde_json::from_str(json)?;

        let mut nrel = StationClientConfig::new(file.nrel.api_key);
        if let Some(url) = file.nrel.base_url {
            nrel = nrel.with_base_url(url);
        }

        let mut here = MappingConfig::new(file.here.app_id, file.here.app_code);
        if let Some(url) = file.here.base_url {
            here = here.with_route_url(url);
        }
        if let Some(url) = file.here.geocode_url {
            here = here.with_geocode_url(url);
        }

        Ok(Self { nrel, here })
    }
}
