//! Tap Dash - An endless side-scrolling tap-to-jump arcade game
//!
//! Core modules:
//! - `sim`: Deterministic per-frame simulation (physics, jumps, spawning, collisions, progression)
//! - `tuning`: Data-driven game balance
//! - `progress`: Leaderboard, achievements, coin wallet and skins

pub mod progress;
pub mod sim;
pub mod tuning;

pub use progress::{Leaderboard, Progress};
pub use tuning::{Theme, Tuning};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Reference frame duration (ms). Per-frame tuning values are expressed per this frame.
    pub const REFERENCE_FRAME_MS: f64 = 1000.0 / 60.0;
    /// Largest delta scale applied in one step (prevents tunnelling after a stall).
    /// Frames slower than 15 FPS lose scroll distance.
    pub const MAX_DELTA_SCALE: f32 = 4.0;

    /// Default viewport (used by the headless runner and tests)
    pub const DEFAULT_VIEWPORT_WIDTH: f32 = 400.0;
    pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 800.0;

    /// Character defaults
    pub const CHARACTER_WIDTH: f32 = 50.0;
    pub const CHARACTER_HEIGHT: f32 = 50.0;
    /// Character x position as a fraction of viewport width
    pub const CHARACTER_X_FRACTION: f32 = 0.2;
}

/// Y coordinate of the top edge of the floor
#[inline]
pub fn floor_top(viewport_height: f32, floor_height: f32) -> f32 {
    viewport_height - floor_height
}

/// Center position that rests a body of the given size on the floor
#[inline]
pub fn resting_center(x: f32, size: Vec2, viewport_height: f32, floor_height: f32) -> Vec2 {
    Vec2::new(x, floor_top(viewport_height, floor_height) - size.y / 2.0)
}
