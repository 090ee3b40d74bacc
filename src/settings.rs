//! Host timing settings
//!
//! Loaded from an optional JSON file; anything missing falls back to the
//! built-in defaults. These only tune how the host feeds the simulation,
//! never the level progression itself.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Simulation timing knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Minimum gap between accepted moves (milliseconds)
    pub move_cooldown_ms: u64,
    /// Largest elapsed time a single tick simulates (seconds)
    pub max_step_secs: f32,
    /// How long the level banner stays up (seconds)
    pub level_message_secs: f32,
    /// How long the death flash lasts (seconds)
    pub death_flash_secs: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            move_cooldown_ms: MOVE_COOLDOWN_MS,
            max_step_secs: MAX_STEP_SECS,
            level_message_secs: LEVEL_MESSAGE_SECS,
            death_flash_secs: DEATH_FLASH_SECS,
        }
    }
}

impl Settings {
    /// Parse settings from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Move cooldown in seconds
    pub fn move_cooldown_secs(&self) -> f64 {
        self.move_cooldown_ms as f64 / 1000.0
    }

    /// Load settings from a JSON file, or use defaults
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::info!("Using default settings");
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Invalid settings in {}: {e}; using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read {}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }
}
