//! Asset handles with per-kind fallbacks
//!
//! The host feeds the catalog a manifest from the external asset source.
//! Every lookup is by tagged kind and falls back to a built-in default
//! when the record is absent, so missing optional assets never block the
//! game. Required images still have to finish decoding before the round
//! controller leaves its loading state; the host enforces that with
//! [`AssetCatalog::required_urls`].

use serde::{Deserialize, Serialize};

use crate::sim::CollectibleKind;

/// Sound cues the simulation can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCue {
    Music,
    Jump,
    /// Default collision sound
    Collision,
    /// Collision against a specific obstacle skin; falls back to
    /// [`AudioCue::Collision`] when the skin has no sound of its own
    CollisionSkin(usize),
    /// Shield absorbed a hit
    ShieldBreak,
    /// Obstacle passed
    PipePass,
    Pickup(CollectibleKind),
}

/// Every asset the game can ask for, by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Background,
    PlayerSprite,
    ObstacleSkin(usize),
    CollectibleSprite(CollectibleKind),
    AudioClip(AudioCue),
}

/// A named handle from the external asset source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub name: String,
    pub url: String,
}

/// One obstacle skin, optionally with its own collision sound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinRecord {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub sound: Option<String>,
}

/// Collectible sprite handles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectibleRecords {
    #[serde(default)]
    pub coin: Option<AssetRecord>,
    #[serde(default)]
    pub shield: Option<AssetRecord>,
    #[serde(default, rename = "slowMo")]
    pub slow_mo: Option<AssetRecord>,
    #[serde(default, rename = "doubleScore")]
    pub double_score: Option<AssetRecord>,
}

/// Audio clip handles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioRecords {
    #[serde(default)]
    pub music: Option<String>,
    #[serde(default)]
    pub jump: Option<String>,
    #[serde(default)]
    pub collision: Option<String>,
    #[serde(default)]
    pub pass: Option<String>,
    #[serde(default)]
    pub shield_break: Option<String>,
    #[serde(default)]
    pub coin: Option<String>,
    #[serde(default)]
    pub shield: Option<String>,
    #[serde(default, rename = "slowMo")]
    pub slow_mo: Option<String>,
    #[serde(default, rename = "doubleScore")]
    pub double_score: Option<String>,
}

/// Manifest shape delivered by the external asset source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetManifest {
    #[serde(default)]
    pub bg: Option<AssetRecord>,
    #[serde(default)]
    pub player: Option<AssetRecord>,
    #[serde(default)]
    pub pipes: Vec<SkinRecord>,
    #[serde(default)]
    pub collectibles: CollectibleRecords,
    #[serde(default)]
    pub audio: AudioRecords,
}

/// Built-in fallback paths, shipped with the page.
mod defaults {
    pub const BACKGROUND: &str = "assets/bg.png";
    pub const PLAYER: &str = "assets/player.png";
    pub const PIPE: &str = "assets/pipe.png";
}

/// Resolved asset lookup table.
#[derive(Debug, Clone)]
pub struct AssetCatalog {
    background: String,
    player: String,
    skins: Vec<SkinRecord>,
    collectibles: CollectibleRecords,
    audio: AudioRecords,
}

impl Default for AssetCatalog {
    fn default() -> Self {
        Self::from_manifest(AssetManifest::default())
    }
}

impl AssetCatalog {
    pub fn from_manifest(manifest: AssetManifest) -> Self {
        let skins = if manifest.pipes.is_empty() {
            vec![SkinRecord {
                name: "default".to_string(),
                url: defaults::PIPE.to_string(),
                sound: None,
            }]
        } else {
            manifest.pipes
        };
        Self {
            background: manifest
                .bg
                .map(|r| r.url)
                .unwrap_or_else(|| defaults::BACKGROUND.to_string()),
            player: manifest
                .player
                .map(|r| r.url)
                .unwrap_or_else(|| defaults::PLAYER.to_string()),
            skins,
            collectibles: manifest.collectibles,
            audio: manifest.audio,
        }
    }

    /// Parse a manifest from JSON; malformed input falls back to defaults.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<AssetManifest>(json) {
            Ok(manifest) => Self::from_manifest(manifest),
            Err(err) => {
                log::warn!("Malformed asset manifest, using defaults: {err}");
                Self::default()
            }
        }
    }

    /// Number of obstacle skins available to the spawner. Always >= 1.
    pub fn skin_count(&self) -> usize {
        self.skins.len()
    }

    /// Look up an asset URL by kind.
    ///
    /// Background, player and skins always resolve (defaults exist);
    /// collectible sprites and audio clips may be absent, in which case
    /// the render/audio layers substitute their own fallbacks.
    pub fn url(&self, kind: AssetKind) -> Option<&str> {
        match kind {
            AssetKind::Background => Some(&self.background),
            AssetKind::PlayerSprite => Some(&self.player),
            AssetKind::ObstacleSkin(i) => self
                .skins
                .get(i)
                .or_else(|| self.skins.first())
                .map(|s| s.url.as_str()),
            AssetKind::CollectibleSprite(kind) => match kind {
                CollectibleKind::Coin => self.collectibles.coin.as_ref(),
                CollectibleKind::Shield => self.collectibles.shield.as_ref(),
                CollectibleKind::SlowMo => self.collectibles.slow_mo.as_ref(),
                CollectibleKind::DoubleScore => self.collectibles.double_score.as_ref(),
            }
            .map(|r| r.url.as_str()),
            AssetKind::AudioClip(cue) => self.audio_url(cue),
        }
    }

    fn audio_url(&self, cue: AudioCue) -> Option<&str> {
        match cue {
            AudioCue::Music => self.audio.music.as_deref(),
            AudioCue::Jump => self.audio.jump.as_deref(),
            AudioCue::Collision => self.audio.collision.as_deref(),
            AudioCue::CollisionSkin(i) => self
                .skins
                .get(i)
                .and_then(|s| s.sound.as_deref())
                .or(self.audio.collision.as_deref()),
            AudioCue::ShieldBreak => self
                .audio
                .shield_break
                .as_deref()
                .or(self.audio.collision.as_deref()),
            AudioCue::PipePass => self.audio.pass.as_deref(),
            AudioCue::Pickup(kind) => match kind {
                CollectibleKind::Coin => self.audio.coin.as_deref(),
                CollectibleKind::Shield => self.audio.shield.as_deref(),
                CollectibleKind::SlowMo => self.audio.slow_mo.as_deref(),
                CollectibleKind::DoubleScore => self.audio.double_score.as_deref(),
            },
        }
    }

    /// Image URLs that must decode before the game may enter `Ready`.
    pub fn required_urls(&self) -> Vec<String> {
        let mut urls = vec![self.background.clone(), self.player.clone()];
        urls.extend(self.skins.iter().map(|s| s.url.clone()));
        urls
    }
}
