//! Obstacle and collectible spawning
//!
//! Runs on the spawn cadence of the effective level parameters. Gap
//! placement and sizing, oscillation assignment and skin choice are all
//! drawn from the round's seeded RNG.

use rand::Rng;

use crate::consts::*;
use crate::levels::{EffectiveParams, LevelParams};

use super::state::{Collectible, CollectibleKind, GameState, Obstacle};

/// Spawn one obstacle pair when the frame counter hits the cadence,
/// and maybe one collectible centered in the fresh gap.
pub(crate) fn maybe_spawn(state: &mut GameState, level: &LevelParams, eff: &EffectiveParams) {
    let interval = eff.spawn_interval.max(1) as u64;
    if state.frame % interval != 0 {
        return;
    }

    let cw = state.bounds.w;
    let ch = state.bounds.h;

    let gap = eff.gap + state.rng.random_range(-GAP_JITTER..=GAP_JITTER);
    let min_top = MIN_TOP_HEIGHT;
    let max_top = (ch - gap - BOTTOM_MARGIN).max(min_top + 1.0);
    let top = (min_top + state.rng.random::<f64>() * (max_top - min_top)).floor();
    let w = (cw * 0.12).clamp(OBSTACLE_MIN_W, OBSTACLE_MAX_W);
    let oscillates = state.rng.random_bool(OSCILLATE_CHANCE);
    let skin = state.rng.random_range(0..state.skin_count);
    let x = cw + SPAWN_LEAD_X;

    state.obstacles.push(Obstacle {
        x,
        w,
        top,
        bottom: (ch - (top + gap)).max(0.0),
        speed: level.speed,
        passed: false,
        oscillates,
        osc_offset: 0.0,
        osc_dir: 1.0,
        gap,
        skin,
    });

    // Collectibles only ever ride along with a fresh obstacle
    if state.rng.random_bool(COLLECTIBLE_CHANCE) {
        let kind = weighted_kind(state.rng.random::<f64>());
        let size = COLLECTIBLE_SIZE;
        state.collectibles.push(Collectible {
            x: x + w / 2.0 - size / 2.0,
            y: top + gap / 2.0 - size / 2.0,
            w: size,
            h: size,
            kind,
        });
    }
}

/// Weighted draw: Coin 70%, Shield 15%, SlowMo 10%, DoubleScore 5%.
fn weighted_kind(roll: f64) -> CollectibleKind {
    if roll < 0.70 {
        CollectibleKind::Coin
    } else if roll < 0.85 {
        CollectibleKind::Shield
    } else if roll < 0.95 {
        CollectibleKind::SlowMo
    } else {
        CollectibleKind::DoubleScore
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::{GameMode, default_levels};
    use crate::sim::state::ViewBounds;

    fn test_state() -> GameState {
        let mut state = GameState::new(
            11,
            GameMode::Classic,
            ViewBounds { w: 800.0, h: 600.0 },
            3,
        );
        state.begin_round();
        state
    }

    #[test]
    fn spawns_only_on_cadence() {
        let mut state = test_state();
        let level = default_levels()[0].clone();
        let eff = level.effective(false);

        state.frame = 89;
        maybe_spawn(&mut state, &level, &eff);
        assert!(state.obstacles.is_empty());
        assert!(state.collectibles.is_empty());

        state.frame = 90;
        maybe_spawn(&mut state, &level, &eff);
        assert_eq!(state.obstacles.len(), 1);
    }

    #[test]
    fn spawned_obstacle_respects_geometry() {
        for seed in 0..50u64 {
            let mut state = GameState::new(
                seed,
                GameMode::Classic,
                ViewBounds { w: 800.0, h: 600.0 },
                3,
            );
            state.begin_round();
            let level = default_levels()[0].clone();
            let eff = level.effective(false);
            state.frame = level.spawn_interval as u64;
            maybe_spawn(&mut state, &level, &eff);

            let o = &state.obstacles[0];
            assert_eq!(o.x, 830.0);
            assert_eq!(o.w, 800.0 * 0.12);
            assert!(o.gap >= level.gap - GAP_JITTER && o.gap <= level.gap + GAP_JITTER);
            assert!(o.top >= MIN_TOP_HEIGHT);
            assert!(o.top <= 600.0 - o.gap - BOTTOM_MARGIN);
            assert_eq!(o.top, o.top.floor());
            assert!(o.skin < 3);
            assert_eq!(o.speed, level.speed);
        }
    }

    #[test]
    fn width_is_clamped_on_narrow_and_wide_canvases() {
        let level = default_levels()[0].clone();
        let eff = level.effective(false);

        let mut narrow = GameState::new(
            1,
            GameMode::Classic,
            ViewBounds { w: 300.0, h: 600.0 },
            1,
        );
        narrow.begin_round();
        narrow.frame = level.spawn_interval as u64;
        maybe_spawn(&mut narrow, &level, &eff);
        assert_eq!(narrow.obstacles[0].w, OBSTACLE_MIN_W);

        let mut wide = GameState::new(
            1,
            GameMode::Classic,
            ViewBounds {
                w: 2400.0,
                h: 600.0,
            },
            1,
        );
        wide.begin_round();
        wide.frame = level.spawn_interval as u64;
        maybe_spawn(&mut wide, &level, &eff);
        assert_eq!(wide.obstacles[0].w, OBSTACLE_MAX_W);
    }

    #[test]
    fn collectible_sits_in_the_gap() {
        // Scan seeds until one produces a collectible
        for seed in 0..100u64 {
            let mut state = GameState::new(
                seed,
                GameMode::Classic,
                ViewBounds { w: 800.0, h: 600.0 },
                3,
            );
            state.begin_round();
            let level = default_levels()[0].clone();
            let eff = level.effective(false);
            state.frame = level.spawn_interval as u64;
            maybe_spawn(&mut state, &level, &eff);
            if let Some(c) = state.collectibles.first() {
                let o = &state.obstacles[0];
                assert!(c.y > o.top);
                assert!(c.y + c.h < o.top + o.gap);
                assert!(c.x >= o.x && c.x + c.w <= o.x + o.w);
                return;
            }
        }
        panic!("no collectible spawned across 100 seeds");
    }

    #[test]
    fn weighted_draw_band_boundaries() {
        assert_eq!(weighted_kind(0.0), CollectibleKind::Coin);
        assert_eq!(weighted_kind(0.699), CollectibleKind::Coin);
        assert_eq!(weighted_kind(0.70), CollectibleKind::Shield);
        assert_eq!(weighted_kind(0.849), CollectibleKind::Shield);
        assert_eq!(weighted_kind(0.85), CollectibleKind::SlowMo);
        assert_eq!(weighted_kind(0.949), CollectibleKind::SlowMo);
        assert_eq!(weighted_kind(0.95), CollectibleKind::DoubleScore);
        assert_eq!(weighted_kind(0.999), CollectibleKind::DoubleScore);
    }

    #[test]
    fn slowmo_stretches_the_cadence() {
        let mut state = test_state();
        let level = default_levels()[0].clone();
        let slow = level.effective(true);

        state.frame = 90; // base cadence, not the stretched one
        maybe_spawn(&mut state, &level, &slow);
        assert!(state.obstacles.is_empty());

        state.frame = 135;
        maybe_spawn(&mut state, &level, &slow);
        assert_eq!(state.obstacles.len(), 1);
    }
}
