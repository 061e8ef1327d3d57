/// Uploader configuration
///
/// Stored as JSON in the user's config directory:
/// - Linux: ~/.config/avatar-uploader/config.json
/// - macOS: ~/Library/Application Support/avatar-uploader/config.json
/// - Windows: %APPDATA%\avatar-uploader\config.json
///
/// Every field has a default, so a partial file (or none) is fine.
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::upload::validator::ValidationRules;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct UploaderConfig {
    /// Pre-upload limits
    pub rules: ValidationRules,
    /// Where the placeholder transport pretends to send files
    pub destination: String,
    /// Form field name reported in the transport response
    pub field_name: String,
    /// How long a notification stays on screen
    pub toast_seconds: u32,
    /// Simulated transport latency
    pub transport_latency_ms: u64,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            rules: ValidationRules::default(),
            destination: "//jsonplaceholder.typicode.com/posts/".to_string(),
            field_name: "avatar".to_string(),
            toast_seconds: 3,
            transport_latency_ms: 400,
        }
    }
}

impl UploaderConfig {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("avatar-uploader");
        path.push("config.json");
        Some(path)
    }

    /// Load from the default location, defaults when there is no file
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("📁 Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn toast_lifetime(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::from(self.toast_seconds))
    }

    pub fn transport_latency(&self) -> Duration {
        Duration::from_millis(self.transport_latency_ms)
    }
}
