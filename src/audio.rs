//! Audio playback over catalog clips
//!
//! Clips come from the asset catalog as URLs and are held as
//! `HtmlAudioElement`s, one per cue. Playback is best-effort: a missing
//! clip or a rejected play() promise is silently ignored (browsers
//! refuse autoplay before the first user gesture).

use std::collections::HashMap;

use web_sys::HtmlAudioElement;

use crate::assets::{AssetCatalog, AssetKind, AudioCue};
use crate::settings::Settings;
use crate::sim::CollectibleKind;

/// One audio element per cue, wired up from the catalog.
pub struct AudioPlayer {
    clips: HashMap<AudioCue, HtmlAudioElement>,
    music: Option<HtmlAudioElement>,
    sfx_volume: f64,
    music_volume: f64,
    muted: bool,
}

impl AudioPlayer {
    pub fn new(catalog: &AssetCatalog, settings: &Settings) -> Self {
        let mut cues = vec![
            AudioCue::Jump,
            AudioCue::Collision,
            AudioCue::ShieldBreak,
            AudioCue::PipePass,
            AudioCue::Pickup(CollectibleKind::Coin),
            AudioCue::Pickup(CollectibleKind::Shield),
            AudioCue::Pickup(CollectibleKind::SlowMo),
            AudioCue::Pickup(CollectibleKind::DoubleScore),
        ];
        for skin in 0..catalog.skin_count() {
            cues.push(AudioCue::CollisionSkin(skin));
        }

        let mut clips = HashMap::new();
        for cue in cues {
            if let Some(url) = catalog.url(AssetKind::AudioClip(cue)) {
                match HtmlAudioElement::new_with_src(url) {
                    Ok(el) => {
                        el.set_preload("auto");
                        clips.insert(cue, el);
                    }
                    Err(err) => log::warn!("Failed to create audio clip for {cue:?}: {err:?}"),
                }
            }
        }

        let music = catalog
            .url(AssetKind::AudioClip(AudioCue::Music))
            .and_then(|url| HtmlAudioElement::new_with_src(url).ok());
        if let Some(m) = &music {
            m.set_loop(true);
        }

        log::info!("Audio player ready ({} clips)", clips.len());

        Self {
            clips,
            music,
            sfx_volume: settings.effective_sfx_volume(),
            music_volume: settings.effective_music_volume(),
            muted: false,
        }
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.sfx_volume = settings.effective_sfx_volume();
        self.music_volume = settings.effective_music_volume();
        if let Some(m) = &self.music {
            m.set_volume(if self.muted { 0.0 } else { self.music_volume });
        }
    }

    /// Mute/unmute everything (tab blur)
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if let Some(m) = &self.music {
            m.set_volume(if muted { 0.0 } else { self.music_volume });
        }
    }

    /// Play a one-shot cue from the start.
    pub fn play(&self, cue: AudioCue) {
        if self.muted || self.sfx_volume <= 0.0 {
            return;
        }
        let clip = match self.clips.get(&cue) {
            Some(clip) => Some(clip),
            // Skins without their own sound fall back to the stock clip
            None => match cue {
                AudioCue::CollisionSkin(_) => self.clips.get(&AudioCue::Collision),
                AudioCue::ShieldBreak => self.clips.get(&AudioCue::Collision),
                _ => None,
            },
        };
        if let Some(clip) = clip {
            clip.set_volume(self.sfx_volume);
            clip.set_current_time(0.0);
            let _ = clip.play();
        }
    }

    /// Start the background music loop (must follow a user gesture).
    pub fn start_music(&self) {
        if let Some(m) = &self.music {
            m.set_volume(if self.muted { 0.0 } else { self.music_volume });
            let _ = m.play();
        }
    }

    pub fn stop_music(&self) {
        if let Some(m) = &self.music {
            let _ = m.pause();
        }
    }
}
