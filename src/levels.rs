//! Difficulty presets and game modes
//!
//! Level records arrive from an external source (merged over the built-in
//! defaults) and are immutable for the duration of a round. Swapping level
//! or mode mid-round resets the round.

use serde::{Deserialize, Serialize};

use crate::consts::{SLOWMO_INTERVAL_SCALE, SLOWMO_SPEED_SCALE};

/// Tuning values for one difficulty level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelParams {
    pub id: String,
    pub name: String,
    /// Downward acceleration per frame (must be positive)
    pub gravity: f64,
    /// Instantaneous upward impulse applied on jump (negative)
    pub lift: f64,
    /// Base vertical gap between obstacle segments
    pub gap: f64,
    /// Horizontal obstacle speed, pixels per frame
    pub speed: f64,
    /// Frames between obstacle spawns (must be positive)
    #[serde(rename = "spawnRate")]
    pub spawn_interval: u32,
}

impl LevelParams {
    /// A record is usable only if its invariants hold.
    pub fn is_valid(&self) -> bool {
        self.gravity > 0.0 && self.spawn_interval > 0
    }

    /// Parameters as seen by physics and the spawner this frame.
    ///
    /// SlowMo halves obstacle speed and stretches the spawn cadence.
    pub fn effective(&self, slowmo: bool) -> EffectiveParams {
        if slowmo {
            EffectiveParams {
                gravity: self.gravity,
                lift: self.lift,
                gap: self.gap,
                speed: self.speed * SLOWMO_SPEED_SCALE,
                spawn_interval: ((self.spawn_interval as f64 * SLOWMO_INTERVAL_SCALE).round()
                    as u32)
                    .max(1),
                speed_scale: SLOWMO_SPEED_SCALE,
            }
        } else {
            EffectiveParams {
                gravity: self.gravity,
                lift: self.lift,
                gap: self.gap,
                speed: self.speed,
                spawn_interval: self.spawn_interval.max(1),
                speed_scale: 1.0,
            }
        }
    }
}

/// Per-frame view of the active level after power-up multipliers.
#[derive(Debug, Clone, Copy)]
pub struct EffectiveParams {
    pub gravity: f64,
    pub lift: f64,
    pub gap: f64,
    pub speed: f64,
    pub spawn_interval: u32,
    /// Multiplier applied to each obstacle's own stored speed
    pub speed_scale: f64,
}

/// Game modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameMode {
    #[default]
    Classic,
    /// Fixed-duration round ended by a countdown instead of (only) collision
    TimeAttack,
    /// No failure, no external score persistence
    Zen,
    /// Hardest preset regardless of selected level
    Insane,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Classic => "Classic",
            GameMode::TimeAttack => "Time Attack",
            GameMode::Zen => "Zen",
            GameMode::Insane => "Insane",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(' ', "").as_str() {
            "classic" => Some(GameMode::Classic),
            "timeattack" => Some(GameMode::TimeAttack),
            "zen" => Some(GameMode::Zen),
            "insane" => Some(GameMode::Insane),
            _ => None,
        }
    }

    /// Cycle through modes in UI order.
    pub fn next(&self) -> Self {
        match self {
            GameMode::Classic => GameMode::TimeAttack,
            GameMode::TimeAttack => GameMode::Zen,
            GameMode::Zen => GameMode::Insane,
            GameMode::Insane => GameMode::Classic,
        }
    }
}

fn preset(id: &str, name: &str, gravity: f64, lift: f64, gap: f64, speed: f64, rate: u32) -> LevelParams {
    LevelParams {
        id: id.to_string(),
        name: name.to_string(),
        gravity,
        lift,
        gap,
        speed,
        spawn_interval: rate,
    }
}

/// Built-in levels, used whenever the external level source is empty or
/// unavailable.
pub fn default_levels() -> Vec<LevelParams> {
    vec![
        preset("easy", "Easy", 0.3, -6.0, 240.0, 2.5, 90),
        preset("normal", "Normal", 0.4, -7.0, 220.0, 3.5, 80),
        preset("hard", "Hard", 0.5, -8.0, 200.0, 4.5, 70),
        preset("insane", "Insane", 0.6, -9.0, 180.0, 6.0, 50),
    ]
}

/// The fixed preset Insane mode forces, independent of level selection.
pub fn insane_preset() -> LevelParams {
    preset("insane", "Insane", 0.6, -9.0, 180.0, 6.0, 50)
}

/// Merge remote level records over the defaults.
///
/// Records with a known id replace the matching default; unknown ids append.
/// Invalid records (non-positive gravity or spawn interval) are skipped.
pub fn merge_levels(remote: Vec<LevelParams>) -> Vec<LevelParams> {
    let mut levels = default_levels();
    for record in remote {
        if !record.is_valid() {
            log::warn!("Skipping invalid level record '{}'", record.id);
            continue;
        }
        match levels.iter_mut().find(|l| l.id == record.id) {
            Some(existing) => *existing = record,
            None => levels.push(record),
        }
    }
    levels
}

/// Look up a level by id, falling back to the first level when the id is
/// unknown. Never fails: callers always get a usable level.
pub fn pick_level<'a>(levels: &'a [LevelParams], id: &str) -> &'a LevelParams {
    levels
        .iter()
        .find(|l| l.id == id)
        .unwrap_or_else(|| &levels[0])
}

/// Level actually played this round: Insane mode overrides the selection.
pub fn resolve_level(levels: &[LevelParams], selected_id: &str, mode: GameMode) -> LevelParams {
    if mode == GameMode::Insane {
        return levels
            .iter()
            .find(|l| l.id == "insane")
            .cloned()
            .unwrap_or_else(insane_preset);
    }
    pick_level(levels, selected_id).clone()
}
