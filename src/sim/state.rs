//! Round state and entity store
//!
//! All mutable per-round state lives in [`GameState`]: one player body,
//! active obstacles and collectibles, cosmetic particles and floating
//! texts, power-up timers and weather. The struct has a single writer and
//! is passed `&mut` through the tick pipeline; no globals.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::assets::AudioCue;
use crate::consts::*;
use crate::levels::{GameMode, LevelParams};

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Entities reset, waiting for first input
    Ready,
    /// Tick pipeline running
    Playing,
    /// Round finalized, waiting for restart
    Over,
}

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Player left the vertical play area
    BoundaryHit,
    /// Player struck an obstacle segment
    ObstacleHit,
    /// TimeAttack countdown reached zero
    TimeUp,
}

/// Collectible kinds, with their pickup semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectibleKind {
    Coin,
    Shield,
    SlowMo,
    DoubleScore,
}

/// The player's body. Only `y` is dynamically free under gravity/lift;
/// `x` is nominally fixed but nudged by wind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    /// Vertical velocity, positive downward
    pub vel: f64,
}

/// A top+bottom obstacle pair with a gap the player must pass through.
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub x: f64,
    pub w: f64,
    /// Height of the top segment at zero oscillation offset
    pub top: f64,
    /// Height of the bottom segment at zero oscillation offset
    pub bottom: f64,
    /// Base speed captured from the level at spawn time
    pub speed: f64,
    pub passed: bool,
    pub oscillates: bool,
    pub osc_offset: f64,
    /// +1 or -1
    pub osc_dir: f64,
    pub gap: f64,
    /// Index into the available obstacle skins
    pub skin: usize,
}

impl Obstacle {
    /// Top segment rect with oscillation applied: (x, y, w, h).
    pub fn top_rect(&self) -> (f64, f64, f64, f64) {
        (self.x, 0.0, self.w, self.top + self.osc_offset)
    }

    /// Bottom segment rect with oscillation applied, for a given canvas height.
    pub fn bottom_rect(&self, canvas_h: f64) -> (f64, f64, f64, f64) {
        let y = self.top + self.osc_offset + self.gap;
        (self.x, y, self.w, (canvas_h - y).max(0.0))
    }
}

/// A pickup granting coins or a timed/one-shot power-up.
#[derive(Debug, Clone, PartialEq)]
pub struct Collectible {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub kind: CollectibleKind,
}

/// Timed and one-shot power-up effects.
///
/// Mutated only through [`PowerUps::activate`], [`PowerUps::tick`] and
/// [`PowerUps::consume_shield`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PowerUps {
    shield: bool,
    slowmo_frames: u32,
    double_frames: u32,
}

impl PowerUps {
    pub fn activate(&mut self, kind: CollectibleKind) {
        match kind {
            CollectibleKind::Shield => self.shield = true,
            CollectibleKind::SlowMo => self.slowmo_frames = EFFECT_DURATION_FRAMES,
            CollectibleKind::DoubleScore => self.double_frames = EFFECT_DURATION_FRAMES,
            CollectibleKind::Coin => {}
        }
    }

    /// Decrement timed effects; counters never go below zero.
    pub fn tick(&mut self) {
        self.slowmo_frames = self.slowmo_frames.saturating_sub(1);
        self.double_frames = self.double_frames.saturating_sub(1);
    }

    pub fn shield_active(&self) -> bool {
        self.shield
    }

    pub fn slowmo_active(&self) -> bool {
        self.slowmo_frames > 0
    }

    pub fn double_score_active(&self) -> bool {
        self.double_frames > 0
    }

    /// Spend the shield if it is up. Returns whether it absorbed the hit.
    pub fn consume_shield(&mut self) -> bool {
        if self.shield {
            self.shield = false;
            true
        } else {
            false
        }
    }

    pub fn slowmo_remaining(&self) -> u32 {
        self.slowmo_frames
    }

    pub fn double_remaining(&self) -> u32 {
        self.double_frames
    }
}

/// Weather kinds. Purely cosmetic: weather never alters collision
/// geometry or scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherKind {
    Clear,
    Rain,
    Fog,
}

/// A falling rain streak
#[derive(Debug, Clone, Copy)]
pub struct RainDrop {
    pub pos: DVec2,
    pub len: f64,
    pub speed: f64,
}

/// Cosmetic weather overlay state
#[derive(Debug, Clone)]
pub struct Weather {
    pub kind: WeatherKind,
    /// Eased toward `FOG_TARGET_ALPHA` while foggy, 0 otherwise
    pub fog_alpha: f64,
    pub drops: Vec<RainDrop>,
    /// Full-screen flash, decays each frame
    pub lightning_alpha: f64,
}

impl Default for Weather {
    fn default() -> Self {
        Self {
            kind: WeatherKind::Clear,
            fog_alpha: 0.0,
            drops: Vec::new(),
            lightning_alpha: 0.0,
        }
    }
}

/// A rising "+1"/"+2" score popup
#[derive(Debug, Clone)]
pub struct FloatingText {
    pub pos: DVec2,
    pub text: String,
    pub alpha: f64,
    pub vy: f64,
}

/// Drifting ambient dust, and jump puffs
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub pos: DVec2,
    pub vel: DVec2,
    pub size: f64,
    pub alpha: f64,
}

/// Slowly reversing horizontal wind acting on the player
#[derive(Debug, Clone, Copy)]
pub struct Wind {
    pub strength: f64,
    /// +1 or -1
    pub dir: f64,
    /// Frames until the direction flips
    pub hold: u32,
}

/// Visible canvas extent in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBounds {
    pub w: f64,
    pub h: f64,
}

/// Events the simulation hands to the host after each tick.
///
/// The host plays sounds and dispatches persistence; the sim never waits
/// on any of it.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Sound(AudioCue),
    RoundEnded {
        score: u32,
        coins: u32,
        reason: EndReason,
    },
}

/// Complete per-round state. Exactly one player body per round.
#[derive(Debug, Clone)]
pub struct GameState {
    pub phase: RoundPhase,
    pub mode: GameMode,
    pub frame: u64,
    pub score: u32,
    pub coins: u32,
    /// TimeAttack seconds left; `None` in other modes
    pub time_remaining: Option<u32>,
    pub player: Player,
    pub obstacles: Vec<Obstacle>,
    pub collectibles: Vec<Collectible>,
    pub particles: Vec<Particle>,
    pub texts: Vec<FloatingText>,
    pub weather: Weather,
    pub powerups: PowerUps,
    pub wind: Wind,
    pub bounds: ViewBounds,
    /// Background scroll offset (render wraps it)
    pub bg_x: f64,
    pub seed: u64,
    pub rng: Pcg32,
    /// Number of obstacle skins available to the spawner
    pub skin_count: usize,
    /// Shield absorbs this round (feeds achievements)
    pub shield_absorbs: u32,
    /// Boundary clamps plus absorbed and terminal hits this round
    pub collisions: u32,
    /// Whether SlowMo was activated at least once this round
    pub slowmo_used: bool,
    events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(seed: u64, mode: GameMode, bounds: ViewBounds, skin_count: usize) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let wind = Wind {
            strength: WIND_STRENGTH,
            dir: if rng.random_bool(0.5) { 1.0 } else { -1.0 },
            hold: rng.random_range(WIND_HOLD_MIN..=WIND_HOLD_MAX),
        };
        let mut state = Self {
            phase: RoundPhase::Ready,
            mode,
            frame: 0,
            score: 0,
            coins: 0,
            time_remaining: None,
            player: Player {
                x: PLAYER_X,
                y: 0.0,
                w: 0.0,
                h: 0.0,
                vel: 0.0,
            },
            obstacles: Vec::new(),
            collectibles: Vec::new(),
            particles: Vec::new(),
            texts: Vec::new(),
            weather: Weather::default(),
            powerups: PowerUps::default(),
            wind,
            bounds,
            bg_x: 0.0,
            seed,
            rng,
            skin_count: skin_count.max(1),
            shield_absorbs: 0,
            collisions: 0,
            slowmo_used: false,
            events: Vec::new(),
        };
        state.reset();
        state
    }

    /// Full entity reset: back to `Ready` with a fresh player body.
    pub fn reset(&mut self) {
        let w = PLAYER_MAX_W.min(self.bounds.w * 0.12);
        self.player = Player {
            x: PLAYER_X,
            y: self.bounds.h / 2.0,
            w,
            h: w * PLAYER_ASPECT,
            vel: 0.0,
        };
        self.obstacles.clear();
        self.collectibles.clear();
        self.texts.clear();
        self.frame = 0;
        self.score = 0;
        self.coins = 0;
        self.powerups = PowerUps::default();
        self.shield_absorbs = 0;
        self.collisions = 0;
        self.slowmo_used = false;
        self.time_remaining = match self.mode {
            GameMode::TimeAttack => Some(TIME_ATTACK_SECS),
            _ => None,
        };
        self.phase = RoundPhase::Ready;
        self.events.clear();
    }

    /// Transition into `Playing` from `Ready` or `Over`.
    ///
    /// Restart from `Over` performs a full entity reset first.
    pub fn begin_round(&mut self) {
        if self.phase == RoundPhase::Over {
            self.reset();
        }
        self.phase = RoundPhase::Playing;
    }

    /// Apply a jump impulse: velocity is set to `lift` outright,
    /// overriding whatever it was. Safe between ticks.
    pub fn jump(&mut self, level: &LevelParams) {
        self.player.vel = level.lift;
        self.events.push(GameEvent::Sound(AudioCue::Jump));
        // Small feedback puff behind the player
        for _ in 0..4 {
            let vel = DVec2::new(
                -self.rng.random_range(0.5..1.5),
                self.rng.random_range(-0.5..0.5),
            );
            self.particles.push(Particle {
                pos: DVec2::new(self.player.x, self.player.y + self.player.h / 2.0),
                vel,
                size: self.rng.random_range(2.0..5.0),
                alpha: 0.8,
            });
        }
    }

    /// Finalize the round. Idempotent: the first call wins.
    pub fn end_round(&mut self, reason: EndReason) {
        if self.phase != RoundPhase::Playing {
            return;
        }
        self.phase = RoundPhase::Over;
        self.events.push(GameEvent::RoundEnded {
            score: self.score,
            coins: self.coins,
            reason,
        });
    }

    /// One-second TimeAttack countdown step, driven by the host's
    /// wall-clock interval rather than the frame loop. Ends the round
    /// exactly like a collision when it hits zero.
    pub fn countdown_second(&mut self) {
        if self.phase != RoundPhase::Playing {
            return;
        }
        if let Some(remaining) = self.time_remaining {
            let next = remaining.saturating_sub(1);
            self.time_remaining = Some(next);
            if next == 0 {
                self.end_round(EndReason::TimeUp);
            }
        }
    }

    /// Viewport changed while idle: coordinate space is new, reset.
    /// While playing the next physics tick clamps positions instead.
    pub fn resize(&mut self, bounds: ViewBounds) {
        self.bounds = bounds;
        if self.phase != RoundPhase::Playing {
            self.reset();
        }
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand accumulated events to the host. Never blocks.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> ViewBounds {
        ViewBounds { w: 800.0, h: 600.0 }
    }

    #[test]
    fn powerup_timers_never_negative() {
        let mut p = PowerUps::default();
        p.tick();
        p.tick();
        assert_eq!(p.slowmo_remaining(), 0);
        assert_eq!(p.double_remaining(), 0);
        assert!(!p.slowmo_active());
        assert!(!p.double_score_active());
    }

    #[test]
    fn powerup_activation_and_expiry() {
        let mut p = PowerUps::default();
        p.activate(CollectibleKind::SlowMo);
        assert!(p.slowmo_active());
        for _ in 0..EFFECT_DURATION_FRAMES {
            p.tick();
        }
        assert!(!p.slowmo_active());
    }

    #[test]
    fn shield_is_single_use() {
        let mut p = PowerUps::default();
        p.activate(CollectibleKind::Shield);
        assert!(p.consume_shield());
        assert!(!p.consume_shield());
        assert!(!p.shield_active());
    }

    #[test]
    fn coin_does_not_touch_powerups() {
        let mut p = PowerUps::default();
        p.activate(CollectibleKind::Coin);
        assert_eq!(p, PowerUps::default());
    }

    #[test]
    fn reset_produces_single_centered_player() {
        let state = GameState::new(7, GameMode::Classic, bounds(), 2);
        assert_eq!(state.phase, RoundPhase::Ready);
        assert_eq!(state.player.y, 300.0);
        assert_eq!(state.player.w, 800.0 * 0.12);
        assert!(state.obstacles.is_empty());
        assert!(state.collectibles.is_empty());
    }

    #[test]
    fn time_attack_gets_countdown_and_others_do_not() {
        let state = GameState::new(1, GameMode::TimeAttack, bounds(), 1);
        assert_eq!(state.time_remaining, Some(TIME_ATTACK_SECS));
        let state = GameState::new(1, GameMode::Classic, bounds(), 1);
        assert_eq!(state.time_remaining, None);
    }

    #[test]
    fn countdown_ends_round_at_zero() {
        let mut state = GameState::new(1, GameMode::TimeAttack, bounds(), 1);
        state.begin_round();
        state.time_remaining = Some(2);
        state.countdown_second();
        assert_eq!(state.phase, RoundPhase::Playing);
        state.countdown_second();
        assert_eq!(state.phase, RoundPhase::Over);
        let events = state.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::RoundEnded {
                reason: EndReason::TimeUp,
                ..
            }
        )));
    }

    #[test]
    fn end_round_is_idempotent() {
        let mut state = GameState::new(1, GameMode::Classic, bounds(), 1);
        state.begin_round();
        state.end_round(EndReason::BoundaryHit);
        state.end_round(EndReason::ObstacleHit);
        let events = state.drain_events();
        let ends = events
            .iter()
            .filter(|e| matches!(e, GameEvent::RoundEnded { .. }))
            .count();
        assert_eq!(ends, 1);
    }

    #[test]
    fn jump_overrides_velocity() {
        let level = crate::levels::default_levels().remove(0);
        let mut state = GameState::new(1, GameMode::Classic, bounds(), 1);
        state.begin_round();
        state.player.vel = 12.5;
        state.jump(&level);
        assert_eq!(state.player.vel, level.lift);
    }

    #[test]
    fn resize_while_idle_resets_entities() {
        let mut state = GameState::new(1, GameMode::Classic, bounds(), 1);
        state.resize(ViewBounds { w: 400.0, h: 300.0 });
        assert_eq!(state.player.y, 150.0);
        assert_eq!(state.phase, RoundPhase::Ready);
    }
}
