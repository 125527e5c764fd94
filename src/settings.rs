//! Game settings and preferences
//!
//! Persisted separately from score data in LocalStorage.

use serde::{Deserialize, Serialize};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f64,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f64,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f64,
    /// Mute when the tab loses focus
    pub mute_on_blur: bool,

    // === Visuals ===
    /// Ambient weather overlays (rain, fog, lightning)
    pub weather_enabled: bool,
    /// Show FPS counter
    pub show_fps: bool,

    // === Accessibility ===
    /// Reduced motion (skip lightning flashes and particle bursts)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.6,
            mute_on_blur: true,

            weather_enabled: true,
            show_fps: false,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "skydash_settings";

    /// Effective clip volume for sound effects
    pub fn effective_sfx_volume(&self) -> f64 {
        (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
    }

    /// Effective clip volume for music
    pub fn effective_music_volume(&self) -> f64 {
        (self.master_volume * self.music_volume).clamp(0.0, 1.0)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
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
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
