//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Delta-scaled steps against a fixed reference frame
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod events;
pub mod input;
pub mod physics;
pub mod progression;
pub mod spawn;
pub mod state;
pub mod step;

pub use collision::{Aabb, Body, character_hits, overlaps};
pub use events::GameEvent;
pub use input::{Touch, TouchKind};
pub use spawn::SpawnKind;
pub use state::{
    Character, Coin, EntityKey, EntityKind, EntityRef, Floor, GameState, JumpState, Obstacle,
    ObstacleKind, PowerUp, PowerUpKind, Renderer, RunStats, RunSummary, SessionPhase, World,
};
pub use step::{FrameContext, FrameTime, delta_scale, step};
