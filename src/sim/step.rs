//! Per-frame orchestration
//!
//! Runs the systems in a fixed order once per rendered frame:
//! physics -> jumps -> spawn/scroll/collide -> progression.

use serde::{Deserialize, Serialize};

use super::autopilot;
use super::events::GameEvent;
use super::input::{self, PressSummary, Touch};
use super::physics;
use super::progression;
use super::spawn;
use super::state::{GameState, SessionPhase};
use crate::consts::*;

/// Host clock for one frame (ms)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameTime {
    /// Monotonic timestamp of this frame
    pub current: f64,
    /// Time since the previous frame
    pub delta: f64,
}

/// Everything the host supplies for one frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameContext {
    /// Touch samples received since the previous frame, in order
    pub touches: Vec<Touch>,
    pub time: FrameTime,
    /// Attract mode - the simulation taps for itself
    #[serde(default)]
    pub autopilot: bool,
}

impl FrameContext {
    /// A frame with no input
    pub fn idle(current: f64, delta: f64) -> Self {
        Self {
            touches: Vec::new(),
            time: FrameTime { current, delta },
            autopilot: false,
        }
    }

    /// A frame with a single new touch
    pub fn tap(current: f64, delta: f64, touch_id: u32) -> Self {
        Self {
            touches: vec![Touch::start(touch_id)],
            ..Self::idle(current, delta)
        }
    }
}

/// Normalize a frame delta to reference frames.
///
/// Capped at `MAX_DELTA_SCALE`: below 15 FPS the world scrolls slower than
/// wall time, while spawn and invincibility timers keep using the host's
/// clock (ms).
pub fn delta_scale(delta_ms: f64) -> f32 {
    ((delta_ms / REFERENCE_FRAME_MS) as f32).clamp(0.0, MAX_DELTA_SCALE)
}

/// Advance the session by one rendered frame.
///
/// Returns the events emitted this frame. Outside `Running`, or when the
/// store is missing its world or character, nothing changes and no events
/// are returned.
pub fn step(state: &mut GameState, ctx: &FrameContext) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.phase != SessionPhase::Running {
        return events;
    }

    let Some(mut world) = state.world.take() else {
        log::warn!("step() called without a world entity");
        return events;
    };
    let Some(mut character) = state.character.take() else {
        log::warn!("step() called without a character entity");
        state.world = Some(world);
        return events;
    };

    let scale = delta_scale(ctx.time.delta);
    let now = ctx.time.current;
    state.stats.frames += 1;

    // Physics
    physics::integrate(
        &mut character,
        state.tuning.gravity,
        world.height,
        state.tuning.floor_height,
        scale,
    );

    // Jumps
    let mut presses = input::detect_presses(&mut state.held_touches, &ctx.touches);
    if ctx.autopilot && autopilot::wants_press(&character, &state.obstacles, &world) {
        presses.edges += 1;
    }
    if presses != PressSummary::default() {
        input::resolve(
            &mut character,
            &state.tuning,
            presses,
            &mut state.stats,
            &mut events,
        );
    }

    // Spawn, scroll, collide
    spawn::try_spawn(state, &mut world, &character, now);
    let game_over = spawn::advance(state, &world, &mut character, scale, now, &mut events);

    // Progression
    progression::update(
        &mut world,
        state.floor.as_mut(),
        &mut character,
        state.score,
        &state.tuning,
        now,
        scale,
        &mut events,
    );

    state.world = Some(world);
    state.character = Some(character);

    if game_over {
        state.phase = SessionPhase::GameOver;
        log::info!(
            "Game over: score {} coins {} after {} frames",
            state.score,
            state.coin_count,
            state.stats.frames
        );
    }

    events
}
