//! Attract-mode controller
//!
//! Decides when a demo runner should tap. Looks only at the store, so the
//! same seed and frame timing always play the same run.

use super::collision::Body;
use super::state::{Character, JumpState, Obstacle, ObstacleKind, World};

/// Frames of lead before a ground obstacle reaches the runner
const TAKEOFF_LEAD_FRAMES: f32 = 10.0;
/// Frames of lookahead for the rescue double jump
const RESCUE_LEAD_FRAMES: f32 = 6.0;

/// Distance from the runner's right edge to the obstacle's left edge
fn gap(character: &Character, obstacle: &Obstacle) -> f32 {
    obstacle.aabb().left() - character.aabb().right()
}

/// Should the autopilot press this frame?
pub fn wants_press(character: &Character, obstacles: &[Obstacle], world: &World) -> bool {
    let speed = world.game_speed.max(0.1);
    match character.jump_state() {
        JumpState::Grounded => obstacles.iter().any(|o| {
            if o.kind != ObstacleKind::Ground || o.hit || o.passed {
                return false;
            }
            let d = gap(character, o);
            (0.0..=speed * TAKEOFF_LEAD_FRAMES).contains(&d)
        }),
        JumpState::FirstJump => {
            // Falling onto something: spend the double jump
            if character.vel.y <= 0.0 {
                return false;
            }
            let bottom = character.aabb().bottom();
            obstacles.iter().any(|o| {
                if o.kind != ObstacleKind::Ground || o.hit || o.passed {
                    return false;
                }
                let d = gap(character, o);
                d <= speed * RESCUE_LEAD_FRAMES
                    && o.aabb().right() >= character.aabb().left()
                    && bottom + character.vel.y * RESCUE_LEAD_FRAMES > o.aabb().top()
            })
        }
        JumpState::DoubleJumped => false,
    }
}
