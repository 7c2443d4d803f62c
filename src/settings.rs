//! Game settings and preferences
//!
//! Persisted in LocalStorage as JSON. Missing fields take their defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{COMBINATION_LEN, MAX_CLICKS, MIN_CLICKS, REVEAL_DELAY_SECS};
use crate::vault::{CombinationError, CombinationRules};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Rules(#[from] CombinationError),
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Combination ===
    /// Pairs per secret
    pub combination_len: usize,
    /// Fewest clicks a pair may require
    pub min_clicks: u32,
    /// Most clicks a pair may require
    pub max_clicks: u32,

    // === Presentation ===
    /// Pause between the door opening and the reveal blink
    pub reveal_delay_secs: f32,
    /// Reduced motion (shorter failure spin, no blink)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            combination_len: COMBINATION_LEN,
            min_clicks: MIN_CLICKS,
            max_clicks: MAX_CLICKS,
            reveal_delay_secs: REVEAL_DELAY_SECS,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Parse and validate settings JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.rules()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Combination rules described by these settings
    pub fn rules(&self) -> Result<CombinationRules, SettingsError> {
        Ok(CombinationRules::new(
            self.combination_len,
            self.min_clicks,
            self.max_clicks,
        )?)
    }

    /// Reveal delay, clamped to something sane for the view
    pub fn effective_reveal_delay(&self) -> f32 {
        self.reveal_delay_secs.clamp(0.0, 5.0)
    }

    /// Toggle reduced motion (driven by the view's preference control)
    pub fn set_reduced_motion(&mut self, enabled: bool) {
        if self.reduced_motion != enabled {
            log::info!("Reduced motion {}", if enabled { "on" } else { "off" });
        }
        self.reduced_motion = enabled;
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "vault_lock_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match self.to_json() {
                Ok(json) => {
                    let _ = storage.set_item(Self::STORAGE_KEY, &json);
                    log::info!("Settings saved");
                }
                Err(e) => log::warn!("Could not save settings: {}", e),
            }
        }
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
