use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_READY_POLL_INTERVAL_MS: u64 = 10;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read host profile: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Which registration and dispatch model a host class exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventModel {
    /// `addEventListener` with capture support, event passed as argument.
    #[default]
    Standard,
    /// Named `on<event>` attach/detach, no capture phase, event exposed
    /// through a global reference.
    Legacy,
}

/// Capabilities of one host class, selected once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostProfile {
    pub model: EventModel,
    /// Override for native non-bubbling `mouseenter`/`mouseleave`;
    /// defaults to the model.
    pub native_hover: Option<bool>,
    /// Override for the legacy mouse button encoding; defaults to the model.
    pub legacy_buttons: Option<bool>,
    /// Override for `DOMContentLoaded` support; defaults to the model.
    pub content_loaded: Option<bool>,
    pub ready_poll_interval_ms: u64,
}

impl Default for HostProfile {
    fn default() -> Self {
        Self::standard()
    }
}

impl HostProfile {
    pub fn standard() -> Self {
        Self {
            model: EventModel::Standard,
            native_hover: None,
            legacy_buttons: None,
            content_loaded: None,
            ready_poll_interval_ms: DEFAULT_READY_POLL_INTERVAL_MS,
        }
    }

    pub fn legacy() -> Self {
        Self {
            model: EventModel::Legacy,
            ..Self::standard()
        }
    }

    pub fn with_native_hover(mut self, native_hover: bool) -> Self {
        self.native_hover = Some(native_hover);
        self
    }

    pub fn with_content_loaded(mut self, content_loaded: bool) -> Self {
        self.content_loaded = Some(content_loaded);
        self
    }

    pub fn with_ready_poll_interval(mut self, interval: Duration) -> Self {
        self.ready_poll_interval_ms = u64::try_from(interval.as_millis())
            .unwrap_or(u64::MAX)
            .max(1);
        self
    }

    pub fn native_hover(&self) -> bool {
        self.native_hover
            .unwrap_or(self.model == EventModel::Standard)
    }

    pub fn uses_legacy_buttons(&self) -> bool {
        self.legacy_buttons
            .unwrap_or(self.model == EventModel::Legacy)
    }

    pub fn has_content_loaded(&self) -> bool {
        self.content_loaded
            .unwrap_or(self.model == EventModel::Standard)
    }

    pub fn ready_poll_interval(&self) -> Duration {
        Duration::from_millis(self.ready_poll_interval_ms.max(1))
    }

    /// Load a profile from YAML, falling back to the standard profile when
    /// no path is given or the file does not exist.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ProfileError> {
        match config_path {
            Some(path) if path.exists() => {
                let contents = fs::read_to_string(path)?;
                Self::from_yaml_str(&contents)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ProfileError> {
        Ok(serde_yaml::from_str(contents)?)
    }
}
