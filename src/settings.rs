//! Client settings: JSON file, then environment, then command line

use reqwest::Url;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::form::DEFAULT_PROFILE;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";

pub const ENV_SERVER: &str = "MANGA2EPUB_SERVER";
pub const ENV_PROFILE: &str = "MANGA2EPUB_PROFILE";
pub const ENV_OUTPUT_DIR: &str = "MANGA2EPUB_OUTPUT_DIR";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Base URL of the conversion service
    pub server: String,
    /// `WxH` device preset
    pub profile: String,
    /// Where converted books are saved
    pub output_dir: PathBuf,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            profile: DEFAULT_PROFILE.to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl ClientSettings {
    /// Defaults, overlaid by `path` when given, overlaid by the environment
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, String> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
        serde_json::from_str(&raw)
            .map_err(|e| format!("Failed to parse config {}: {}", path.display(), e))
    }

    /// Apply `MANGA2EPUB_*` values from `lookup`; blank values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        if let Some(server) = get(ENV_SERVER) {
            self.server = server;
        }
        if let Some(profile) = get(ENV_PROFILE) {
            self.profile = profile;
        }
        if let Some(output_dir) = get(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(output_dir);
        }
    }

    /// Absolute path on the configured server, e.g. `endpoint("/convert")`
    pub fn endpoint(&self, path: &str) -> Result<Url, String> {
        let base = Url::parse(&self.server)
            .map_err(|e| format!("Invalid server URL {}: {}", self.server, e))?;
        base.join(path)
            .map_err(|e| format!("Invalid endpoint {}: {}", path, e))
    }
}
