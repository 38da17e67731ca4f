//! Application configuration
//!
//! This module re-exports shared types from waksense-types and provides the
//! platform default log location and persistence for AppConfig.

use std::path::Path;

pub use waksense_types::{
    AppConfig, ClassKind, DedupSettings, TailerSettings, TrackedCharacter,
};

use super::error::ConfigError;

const APP_NAME: &str = "waksense";
const CONFIG_NAME: &str = "config";

// ─────────────────────────────────────────────────────────────────────────────
// Platform-Specific Defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Chat log written by the Ankama launcher's game client.
pub fn default_log_file() -> String {
    dirs::config_dir()
        .map(|p| p.join("zaap/gamesLogs/wakfu/logs/wakfu_chat.log"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────────────────
// AppConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for AppConfig persistence and character management
pub trait AppConfigExt: Sized {
    fn load() -> Self;
    fn load_from(path: &Path) -> Result<Self, ConfigError>;
    fn load_with_defaults() -> Self;
    fn save(&self) -> Result<(), ConfigError>;
    fn save_to(&self, path: &Path) -> Result<(), ConfigError>;
    fn set_locked(&mut self, name: &str, locked: bool) -> Result<(), ConfigError>;
    fn add_character(&mut self, name: &str, class: ClassKind) -> Result<(), ConfigError>;
    fn remove_character(&mut self, name: &str) -> Result<TrackedCharacter, ConfigError>;
}

impl AppConfigExt for AppConfig {
    fn load() -> Self {
        match confy::load::<AppConfig>(APP_NAME, CONFIG_NAME) {
            Ok(config) => with_default_log_file(config),
            Err(err) => {
                tracing::warn!(error = %err, "Failed to load configuration, using defaults");
                Self::load_with_defaults()
            }
        }
    }

    fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config: AppConfig = confy::load_path(path)?;
        Ok(with_default_log_file(config))
    }

    /// Load with the platform default log path (used when no config file exists)
    fn load_with_defaults() -> Self {
        AppConfig::with_log_file(default_log_file())
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        confy::store_path(path, self).map_err(ConfigError::Save)
    }

    fn set_locked(&mut self, name: &str, locked: bool) -> Result<(), ConfigError> {
        let character = self
            .characters
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| ConfigError::UnknownCharacter {
                name: name.to_string(),
            })?;
        character.locked = locked;
        Ok(())
    }

    fn add_character(&mut self, name: &str, class: ClassKind) -> Result<(), ConfigError> {
        if self.character(name).is_some() {
            return Err(ConfigError::DuplicateCharacter {
                name: name.to_string(),
            });
        }
        self.characters.push(TrackedCharacter {
            name: name.to_string(),
            class,
            locked: false,
        });
        Ok(())
    }

    fn remove_character(&mut self, name: &str) -> Result<TrackedCharacter, ConfigError> {
        let idx = self
            .characters
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| ConfigError::UnknownCharacter {
                name: name.to_string(),
            })?;
        Ok(self.characters.remove(idx))
    }
}

fn with_default_log_file(mut config: AppConfig) -> AppConfig {
    if config.log_file.is_empty() {
        config.log_file = default_log_file();
    }
    config
}
