//! Per-frame physics and collision resolution
//!
//! Advances the player under gravity and wind, moves obstacles and
//! collectibles, resolves AABB overlaps with shield/absorb semantics,
//! scores passed obstacles and garbage-collects off-screen entities.

use crate::assets::AudioCue;
use crate::consts::*;
use crate::levels::{EffectiveParams, GameMode};
use crate::rects_overlap;
use glam::DVec2;
use rand::Rng;

use super::state::{
    CollectibleKind, EndReason, FloatingText, GameEvent, GameState, RoundPhase,
};

/// Advance one physics frame. May transition the round to `Over`.
pub(crate) fn step(state: &mut GameState, eff: &EffectiveParams) {
    integrate_player(state, eff);
    apply_wind(state);
    check_boundaries(state);
    if state.phase != RoundPhase::Playing {
        return;
    }
    advance_obstacles(state, eff);
    if state.phase != RoundPhase::Playing {
        return;
    }
    score_passes(state);
    advance_collectibles(state, eff);
    collect_garbage(state);
}

fn integrate_player(state: &mut GameState, eff: &EffectiveParams) {
    state.player.vel += eff.gravity;
    state.player.y += state.player.vel;
}

/// Ambient wind nudges the player's x, clamped to the canvas.
/// SlowMo halves the push. The direction reverses on a slow random cadence.
fn apply_wind(state: &mut GameState) {
    if state.wind.hold == 0 {
        state.wind.dir = -state.wind.dir;
        state.wind.hold = state.rng.random_range(WIND_HOLD_MIN..=WIND_HOLD_MAX);
    } else {
        state.wind.hold -= 1;
    }

    let scale = if state.powerups.slowmo_active() {
        0.5
    } else {
        1.0
    };
    state.player.x += state.wind.strength * state.wind.dir * scale;
    state.player.x = state
        .player
        .x
        .clamp(0.0, (state.bounds.w - state.player.w).max(0.0));
}

fn check_boundaries(state: &mut GameState) {
    let out_top = state.player.y < 0.0;
    let out_bottom = state.player.y + state.player.h > state.bounds.h;
    if !out_top && !out_bottom {
        return;
    }

    if state.mode == GameMode::Zen {
        clamp_player(state);
        return;
    }

    if state.powerups.consume_shield() {
        state.shield_absorbs += 1;
        state.collisions += 1;
        clamp_player(state);
        state.push_event(GameEvent::Sound(AudioCue::ShieldBreak));
        return;
    }

    state.collisions += 1;
    state.push_event(GameEvent::Sound(AudioCue::Collision));
    state.end_round(EndReason::BoundaryHit);
}

fn clamp_player(state: &mut GameState) {
    state.player.y = state
        .player
        .y
        .clamp(0.0, (state.bounds.h - state.player.h).max(0.0));
    state.player.vel = 0.0;
}

/// Move obstacles left, bounce oscillation offsets, and resolve overlaps.
///
/// Zen mode skips collision entirely but obstacles still advance. The
/// shield absorbs at most one overlap per frame (first in iteration
/// order); the neutralized obstacle is shoved off-screen so it cannot
/// re-trigger.
fn advance_obstacles(state: &mut GameState, eff: &EffectiveParams) {
    let ch = state.bounds.h;
    let (px, py, pw, ph) = (
        state.player.x,
        state.player.y,
        state.player.w,
        state.player.h,
    );
    let zen = state.mode == GameMode::Zen;

    let mut absorb: Option<usize> = None;
    let mut fatal: Option<usize> = None;

    for (i, o) in state.obstacles.iter_mut().enumerate() {
        o.x -= o.speed * eff.speed_scale;

        if o.oscillates {
            o.osc_offset += o.osc_dir * OSCILLATE_STEP;
            if o.osc_offset.abs() >= OSCILLATE_LIMIT {
                o.osc_offset = o.osc_offset.clamp(-OSCILLATE_LIMIT, OSCILLATE_LIMIT);
                o.osc_dir = -o.osc_dir;
            }
        }

        if zen || fatal.is_some() {
            continue;
        }

        let (tx, ty, tw, th) = o.top_rect();
        let (bx, by, bw, bh) = o.bottom_rect(ch);
        let hit = rects_overlap(px, py, pw, ph, tx, ty, tw, th)
            || rects_overlap(px, py, pw, ph, bx, by, bw, bh);
        if hit {
            if absorb.is_none() && state.powerups.shield_active() {
                absorb = Some(i);
                // Consume now so a second overlap this frame is fatal
                state.powerups.consume_shield();
            } else if absorb != Some(i) {
                fatal = Some(i);
            }
        }
    }

    if let Some(i) = absorb {
        state.shield_absorbs += 1;
        state.collisions += 1;
        let o = &mut state.obstacles[i];
        // A crashed-into obstacle is not a pass: marked passed so the
        // pass check cannot score it, moved past the GC line so the
        // next sweep retires it
        o.passed = true;
        o.x = OFFSCREEN_X - o.w - 1.0;
        state.push_event(GameEvent::Sound(AudioCue::ShieldBreak));
    }

    if let Some(i) = fatal {
        state.collisions += 1;
        let skin = state.obstacles[i].skin;
        state.push_event(GameEvent::Sound(AudioCue::CollisionSkin(skin)));
        state.end_round(EndReason::ObstacleHit);
    }
}

/// Award points for obstacles whose right edge passed the player.
fn score_passes(state: &mut GameState) {
    let px = state.player.x;
    let double = state.powerups.double_score_active();
    let mut scored = 0u32;
    for o in &mut state.obstacles {
        if !o.passed && o.x + o.w < px {
            o.passed = true;
            scored += 1;
        }
    }
    if scored == 0 {
        return;
    }
    let per_pass = if double { 2 } else { 1 };
    state.score += scored * per_pass;
    state.push_event(GameEvent::Sound(AudioCue::PipePass));
    for _ in 0..scored {
        state.texts.push(FloatingText {
            pos: DVec2::new(state.player.x + state.player.w, state.player.y),
            text: format!("+{per_pass}"),
            alpha: 1.0,
            vy: 1.2,
        });
    }
}

/// Move collectibles at effective speed and apply pickups on overlap.
fn advance_collectibles(state: &mut GameState, eff: &EffectiveParams) {
    let (px, py, pw, ph) = (
        state.player.x,
        state.player.y,
        state.player.w,
        state.player.h,
    );
    let mut picked: Vec<CollectibleKind> = Vec::new();

    state.collectibles.retain_mut(|c| {
        c.x -= eff.speed;
        if rects_overlap(px, py, pw, ph, c.x, c.y, c.w, c.h) {
            picked.push(c.kind);
            false
        } else {
            true
        }
    });

    for kind in picked {
        match kind {
            CollectibleKind::Coin => state.coins += 1,
            CollectibleKind::SlowMo => {
                state.powerups.activate(kind);
                state.slowmo_used = true;
            }
            CollectibleKind::Shield | CollectibleKind::DoubleScore => {
                state.powerups.activate(kind);
            }
        }
        state.push_event(GameEvent::Sound(AudioCue::Pickup(kind)));
    }
}

/// Drop entities whose trailing edge is past the off-screen line.
fn collect_garbage(state: &mut GameState) {
    state.obstacles.retain(|o| o.x + o.w > OFFSCREEN_X);
    state.collectibles.retain(|c| c.x + c.w > OFFSCREEN_X);
}
