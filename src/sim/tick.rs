//! Per-frame round orchestration
//!
//! One tick per animation frame while `Playing`:
//! physics -> spawner -> power-up/weather timers -> cosmetics.
//! Input arrives between ticks and is applied at the top of the next one.

use crate::levels::LevelParams;

use super::effects;
use super::physics;
use super::spawn;
use super::state::{GameState, RoundPhase};

/// Input gathered since the previous tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Jump/tap was pressed
    pub jump: bool,
}

/// Advance the round by one frame.
///
/// No-op outside `Playing`; a frame that does not tick changes nothing.
pub fn tick(state: &mut GameState, input: &TickInput, level: &LevelParams) {
    if state.phase != RoundPhase::Playing {
        return;
    }

    if input.jump {
        state.jump(level);
    }

    let eff = level.effective(state.powerups.slowmo_active());

    physics::step(state, &eff);
    if state.phase != RoundPhase::Playing {
        return;
    }

    state.frame += 1;
    spawn::maybe_spawn(state, level, &eff);

    effects::tick_powerups(state);
    effects::tick_weather(state);
    effects::tick_cosmetics(state, eff.speed_scale);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TIME_ATTACK_SECS;
    use crate::levels::{GameMode, default_levels};
    use crate::sim::state::{
        Collectible, CollectibleKind, EndReason, GameEvent, Obstacle, ViewBounds,
    };

    const JUMP: TickInput = TickInput { jump: true };
    const COAST: TickInput = TickInput { jump: false };

    fn bounds() -> ViewBounds {
        ViewBounds { w: 800.0, h: 600.0 }
    }

    fn easy() -> LevelParams {
        default_levels()[0].clone()
    }

    fn obstacle_on_player(state: &GameState) -> Obstacle {
        Obstacle {
            x: state.player.x,
            w: 80.0,
            top: state.player.y + 200.0,
            bottom: 0.0,
            speed: 2.5,
            passed: false,
            oscillates: false,
            osc_offset: 0.0,
            osc_dir: 1.0,
            gap: 240.0,
            skin: 0,
        }
    }

    #[test]
    fn tick_outside_playing_changes_nothing() {
        let level = easy();
        let mut state = GameState::new(2, GameMode::Classic, bounds(), 1);
        let player = state.player;
        tick(&mut state, &JUMP, &level);
        assert_eq!(state.phase, RoundPhase::Ready);
        assert_eq!(state.player, player);
        assert_eq!(state.frame, 0);
        assert_eq!(state.score, 0);
    }

    /// Scenario A: easy level, one jump then hands off. The player falls
    /// out the bottom and the score equals the obstacles passed.
    #[test]
    fn round_ends_by_gravity_on_easy() {
        let level = easy();
        let mut state = GameState::new(404, GameMode::Classic, bounds(), 2);
        state.begin_round();
        tick(&mut state, &JUMP, &level);

        let mut ended = None;
        for _ in 0..2000 {
            tick(&mut state, &COAST, &level);
            for event in state.drain_events() {
                if let GameEvent::RoundEnded { score, reason, .. } = event {
                    ended = Some((score, reason));
                }
            }
            if ended.is_some() {
                break;
            }
        }

        let (score, reason) = ended.expect("round should end");
        assert_eq!(reason, EndReason::BoundaryHit);
        assert_eq!(state.phase, RoundPhase::Over);
        let passed = state.obstacles.iter().filter(|o| o.passed).count() as u32;
        assert_eq!(score, passed);
    }

    /// Scenario B: Zen mode never ends the round via collision.
    #[test]
    fn zen_round_survives_deliberate_collisions() {
        let level = easy();
        let mut state = GameState::new(7, GameMode::Zen, bounds(), 1);
        state.begin_round();

        for i in 0..1000u32 {
            // Park an obstacle on the player every 50 frames
            if i % 50 == 0 {
                let o = obstacle_on_player(&state);
                state.obstacles.push(o);
            }
            let input = if i % 20 == 0 { JUMP } else { COAST };
            tick(&mut state, &input, &level);
            assert_eq!(state.phase, RoundPhase::Playing);
        }
    }

    /// Scenario C: TimeAttack ends via the countdown, not physics.
    #[test]
    fn time_attack_ends_by_countdown() {
        // Oversized gap so obstacles cannot touch an autopiloted player
        let mut level = easy();
        level.gap = 500.0;
        let mut state = GameState::new(99, GameMode::TimeAttack, bounds(), 1);
        state.begin_round();
        assert_eq!(state.time_remaining, Some(TIME_ATTACK_SECS));

        let mut seconds = 0;
        for i in 0.. {
            // Rough autopilot: flap whenever we sink below the midline
            let input = if state.player.y + state.player.h > 360.0 && state.player.vel > 0.0 {
                JUMP
            } else {
                COAST
            };
            tick(&mut state, &input, &level);
            assert_ne!(
                state.phase,
                RoundPhase::Over,
                "round must not end before the timer"
            );

            if i % 60 == 59 {
                state.countdown_second(); // host's one-second interval
                seconds += 1;
                if seconds == TIME_ATTACK_SECS {
                    break;
                }
            }
        }

        assert_eq!(state.phase, RoundPhase::Over);
        assert_eq!(state.time_remaining, Some(0));
        let events = state.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::RoundEnded {
                reason: EndReason::TimeUp,
                ..
            }
        )));
    }

    /// Scenario D: a DoubleScore pickup makes the next pass worth 2.
    #[test]
    fn double_score_pickup_doubles_next_pass() {
        let level = easy();
        let mut state = GameState::new(31, GameMode::Classic, bounds(), 1);
        state.begin_round();

        state.collectibles.push(Collectible {
            x: state.player.x,
            y: state.player.y,
            w: 40.0,
            h: 40.0,
            kind: CollectibleKind::DoubleScore,
        });
        tick(&mut state, &JUMP, &level);
        assert!(state.powerups.double_score_active());
        assert_eq!(state.score, 0);

        let mut o = obstacle_on_player(&state);
        o.x = state.player.x - o.w - 1.0;
        o.top = 0.0; // keep it out of the player's way
        o.gap = 600.0;
        state.obstacles.push(o);
        tick(&mut state, &JUMP, &level);
        assert_eq!(state.score, 2);
    }

    #[test]
    fn restart_after_over_resets_entities_and_score() {
        let level = easy();
        let mut state = GameState::new(1, GameMode::Classic, bounds(), 1);
        state.begin_round();
        state.player.y = 700.0;
        tick(&mut state, &COAST, &level);
        assert_eq!(state.phase, RoundPhase::Over);

        state.begin_round();
        assert_eq!(state.phase, RoundPhase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.frame, 0);
        assert!(state.obstacles.is_empty());
        assert_eq!(state.player.y, 300.0);
    }

    #[test]
    fn spawner_runs_on_level_cadence() {
        let mut level = easy();
        level.gravity = 0.0001; // keep the player airborne long enough
        let mut state = GameState::new(12, GameMode::Zen, bounds(), 1);
        state.begin_round();
        for _ in 0..(level.spawn_interval * 3) {
            tick(&mut state, &COAST, &level);
        }
        assert_eq!(state.obstacles.len(), 3);
    }

    #[test]
    fn slowmo_timer_expires_during_play() {
        let level = easy();
        let mut state = GameState::new(8, GameMode::Zen, bounds(), 1);
        state.begin_round();
        state.powerups.activate(CollectibleKind::SlowMo);
        for _ in 0..crate::consts::EFFECT_DURATION_FRAMES {
            tick(&mut state, &COAST, &level);
        }
        assert!(!state.powerups.slowmo_active());
    }
}
