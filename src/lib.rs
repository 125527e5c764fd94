//! Skydash - a side-scrolling obstacle-dodge game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, power-ups, weather)
//! - `levels`: Difficulty presets and game modes
//! - `assets`: Asset handles with per-kind fallbacks
//! - `profile`: Player profile and achievement deltas
//! - `outbox`: Typed round-result events for external sinks
//! - `highscores`: Local fallback persistence (LocalStorage)
//! - `render`: Canvas2D presentation (web only)

pub mod assets;
pub mod highscores;
pub mod levels;
pub mod outbox;
pub mod profile;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod render;

pub use highscores::LocalBoard;
pub use levels::{GameMode, LevelParams};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Player's nominal horizontal position (wind perturbs around this)
    pub const PLAYER_X: f64 = 120.0;
    /// Player sprite width cap; actual width is min of this and 12% of canvas
    pub const PLAYER_MAX_W: f64 = 120.0;
    /// Player height as a fraction of width
    pub const PLAYER_ASPECT: f64 = 0.75;

    /// Obstacles and collectibles are retired once their trailing edge
    /// crosses this x coordinate
    pub const OFFSCREEN_X: f64 = -40.0;
    /// New obstacles spawn this far past the right edge
    pub const SPAWN_LEAD_X: f64 = 30.0;
    /// Minimum top-segment height for a spawned obstacle
    pub const MIN_TOP_HEIGHT: f64 = 90.0;
    /// Margin reserved below the gap when sizing the top segment
    pub const BOTTOM_MARGIN: f64 = 120.0;
    /// Gap size jitter applied at spawn, +/- this many pixels
    pub const GAP_JITTER: f64 = 25.0;
    /// Obstacle width bounds; nominal width is 12% of canvas width
    pub const OBSTACLE_MIN_W: f64 = 60.0;
    pub const OBSTACLE_MAX_W: f64 = 140.0;
    /// Probability a spawned obstacle oscillates vertically
    pub const OSCILLATE_CHANCE: f64 = 0.25;
    /// Oscillation bounces within +/- this offset
    pub const OSCILLATE_LIMIT: f64 = 50.0;
    /// Oscillation offset change per frame
    pub const OSCILLATE_STEP: f64 = 0.6;

    /// Probability a collectible accompanies a freshly spawned obstacle
    pub const COLLECTIBLE_CHANCE: f64 = 0.5;
    /// Collectible sprite edge length
    pub const COLLECTIBLE_SIZE: f64 = 40.0;

    /// Duration of SlowMo and DoubleScore effects, in frames
    pub const EFFECT_DURATION_FRAMES: u32 = 300;
    /// Obstacle speed multiplier while SlowMo is active
    pub const SLOWMO_SPEED_SCALE: f64 = 0.5;
    /// Spawn interval multiplier while SlowMo is active
    pub const SLOWMO_INTERVAL_SCALE: f64 = 1.5;

    /// Weather picks a new kind every this many frames
    pub const WEATHER_CYCLE_FRAMES: u64 = 1200;
    /// Fog overlay opacity target while fog is active
    pub const FOG_TARGET_ALPHA: f64 = 0.6;
    /// Fog opacity easing step per frame
    pub const FOG_ALPHA_STEP: f64 = 0.01;
    /// Per-frame chance of a new rain drop while raining
    pub const RAIN_DROP_CHANCE: f64 = 0.3;
    /// Per-frame chance of a lightning flash while raining
    pub const LIGHTNING_CHANCE: f64 = 0.002;

    /// Ambient wind force on the player, pixels per frame
    pub const WIND_STRENGTH: f64 = 0.15;
    /// Wind holds one direction for a random span in this range (frames)
    pub const WIND_HOLD_MIN: u32 = 300;
    pub const WIND_HOLD_MAX: u32 = 900;

    /// TimeAttack round length in seconds
    pub const TIME_ATTACK_SECS: u32 = 60;

    /// Background scroll speed, pixels per frame
    pub const BG_SCROLL_SPEED: f64 = 0.3;
}

/// Axis-aligned rectangle overlap test.
///
/// Strict inequalities: rectangles that merely share an edge do not overlap.
#[inline]
pub fn rects_overlap(
    ax: f64,
    ay: f64,
    aw: f64,
    ah: f64,
    bx: f64,
    by: f64,
    bw: f64,
    bh: f64,
) -> bool {
    ax < bx + bw && ax + aw > bx && ay < by + bh && ay + ah > by
}
