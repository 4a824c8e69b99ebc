//! Configuration loading
//!
//! Settings come from a TOML file resolved in priority order:
//! 1. Explicit path (command-line argument)
//! 2. `TIGER_REVIEW_CONFIG` environment variable
//! 3. Platform config dir (`<config>/tiger-review/config.toml`)
//! 4. Compiled defaults
//!
//! A missing file is only an error when the path was given explicitly.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Environment variable naming an alternate config file
pub const CONFIG_ENV_VAR: &str = "TIGER_REVIEW_CONFIG";

const DEFAULT_OSM_API_URL: &str = "https://api.openstreetmap.org";
const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
const DEFAULT_COMMENT: &str = "Reviewing and updating TIGER import road tags";

/// Tool settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// OSM API base URL (point at the dev server for testing)
    pub osm_api_url: String,
    /// Overpass interpreter endpoint
    pub overpass_url: String,
    /// OAuth 2.0 bearer token for authenticated OSM API calls
    pub access_token: Option<String>,
    /// Default changeset comment
    pub comment: String,
    /// Imagery/source credit recorded on the changeset
    pub source: String,
    /// Host tag recorded on the changeset
    pub host: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            osm_api_url: DEFAULT_OSM_API_URL.to_string(),
            overpass_url: DEFAULT_OVERPASS_URL.to_string(),
            access_token: None,
            comment: DEFAULT_COMMENT.to_string(),
            source: String::new(),
            host: String::new(),
        }
    }
}

impl Settings {
    /// Load settings following the resolution order above
    pub fn load(explicit_path: Option<&Path>) -> Result<Settings> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::from_file(Path::new(&path));
        }
        if let Some(path) = default_config_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }
        Ok(Settings::default())
    }

    /// Parse a specific settings file; missing or malformed files are
    /// configuration errors here.
    pub fn from_file(path: &Path) -> Result<Settings> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("could not read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("could not parse {}: {}", path.display(), e)))
    }
}

/// Platform default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tiger-review").join("config.toml"))
}
