//! Power-up timers, weather cycling and cosmetic animation
//!
//! Weather feeds render overlays only. It must never alter collision
//! geometry or scoring; the gameplay-affecting time dilation is SlowMo,
//! which lives in [`PowerUps`](super::state::PowerUps).

use glam::DVec2;
use rand::Rng;

use crate::consts::*;

use super::state::{GameState, Particle, RainDrop, WeatherKind};

/// Decrement timed power-up effects.
pub(crate) fn tick_powerups(state: &mut GameState) {
    state.powerups.tick();
}

/// Advance the cosmetic weather state one frame.
pub(crate) fn tick_weather(state: &mut GameState) {
    if state.frame > 0 && state.frame % WEATHER_CYCLE_FRAMES == 0 {
        state.weather.kind = match state.rng.random_range(0..3u8) {
            0 => WeatherKind::Clear,
            1 => WeatherKind::Rain,
            _ => WeatherKind::Fog,
        };
    }

    // Fog opacity eases toward its target at a fixed step
    let target = if state.weather.kind == WeatherKind::Fog {
        FOG_TARGET_ALPHA
    } else {
        0.0
    };
    let delta = target - state.weather.fog_alpha;
    if delta.abs() <= FOG_ALPHA_STEP {
        state.weather.fog_alpha = target;
    } else {
        state.weather.fog_alpha += FOG_ALPHA_STEP * delta.signum();
    }

    if state.weather.kind == WeatherKind::Rain {
        if state.rng.random_bool(RAIN_DROP_CHANCE) {
            let drop = RainDrop {
                pos: DVec2::new(state.rng.random_range(0.0..state.bounds.w), -10.0),
                len: state.rng.random_range(10.0..25.0),
                speed: state.rng.random_range(8.0..14.0),
            };
            state.weather.drops.push(drop);
        }
        if state.rng.random_bool(LIGHTNING_CHANCE) {
            state.weather.lightning_alpha = 0.8;
        }
    }

    let ch = state.bounds.h;
    for drop in &mut state.weather.drops {
        drop.pos.y += drop.speed;
    }
    state.weather.drops.retain(|d| d.pos.y < ch + d.len);

    state.weather.lightning_alpha *= 0.85;
    if state.weather.lightning_alpha < 0.01 {
        state.weather.lightning_alpha = 0.0;
    }
}

/// Ambient dust, jump puffs, floating score texts and background scroll.
pub(crate) fn tick_cosmetics(state: &mut GameState, speed_scale: f64) {
    if state.rng.random_bool(0.1) {
        let p = Particle {
            pos: DVec2::new(
                state.bounds.w + 5.0,
                state.rng.random_range(0.0..state.bounds.h),
            ),
            vel: DVec2::new(state.rng.random_range(-2.0..-0.5), 0.0),
            size: state.rng.random_range(1.0..3.0),
            alpha: state.rng.random_range(0.2..0.6),
        };
        state.particles.push(p);
    }
    for p in &mut state.particles {
        p.pos += p.vel;
        p.alpha -= 0.004;
    }
    state
        .particles
        .retain(|p| p.alpha > 0.0 && p.pos.x > -10.0);

    for t in &mut state.texts {
        t.pos.y -= t.vy;
        t.alpha -= 0.02;
    }
    state.texts.retain(|t| t.alpha > 0.0);

    // Background scroll rate halves under SlowMo; render wraps the offset
    state.bg_x -= BG_SCROLL_SPEED * speed_scale;
}
