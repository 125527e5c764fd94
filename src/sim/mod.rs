//! Deterministic game simulation
//!
//! All gameplay logic lives here. This module must stay pure:
//! - One tick per animation frame, no wall-clock reads
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod effects;
pub mod physics;
pub mod spawn;
pub mod state;
pub mod tick;

pub use state::{
    Collectible, CollectibleKind, EndReason, FloatingText, GameEvent, GameState, Obstacle,
    Particle, Player, PowerUps, RainDrop, RoundPhase, ViewBounds, Weather, WeatherKind, Wind,
};
pub use tick::{TickInput, tick};
