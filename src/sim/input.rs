//! Touch samples and the jump state machine
//!
//! Grounded -> FirstJump on a press edge, FirstJump -> DoubleJumped on the
//! next edge while airborne. Landing (physics) goes back to Grounded.
//! Only the leading edge of a touch counts: a finger held down across many
//! frames jumps once.

use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::state::{Character, JumpState, RunStats};
use crate::tuning::Tuning;

/// Phase of a touch sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchKind {
    /// Finger went down
    Start,
    Move,
    /// Finger lifted
    End,
    /// Host's hold threshold elapsed on a touch that is still down
    LongPress,
}

/// One touch sample from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Touch {
    /// Host-assigned touch identifier (stable for the life of a touch)
    pub id: u32,
    pub kind: TouchKind,
}

impl Touch {
    pub fn start(id: u32) -> Self {
        Self { id, kind: TouchKind::Start }
    }

    pub fn end(id: u32) -> Self {
        Self { id, kind: TouchKind::End }
    }

    pub fn long_press(id: u32) -> Self {
        Self { id, kind: TouchKind::LongPress }
    }
}

/// What a frame's samples amount to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PressSummary {
    /// Leading edges in this frame
    pub edges: u32,
    /// Long-press notifications in this frame
    pub long_presses: u32,
}

/// Detect press edges and track held touches.
///
/// A `Start` for a touch id that is already held is ignored, so a repeated
/// or duplicated sample of one continuous touch never triggers twice.
pub fn detect_presses(held: &mut Vec<u32>, touches: &[Touch]) -> PressSummary {
    let mut summary = PressSummary::default();
    for touch in touches {
        match touch.kind {
            TouchKind::Start => {
                if !held.contains(&touch.id) {
                    held.push(touch.id);
                    summary.edges += 1;
                }
            }
            TouchKind::End => held.retain(|&id| id != touch.id),
            TouchKind::LongPress => {
                if held.contains(&touch.id) {
                    summary.long_presses += 1;
                }
            }
            TouchKind::Move => {}
        }
    }
    summary
}

/// Apply one press edge to the character
pub fn press(character: &mut Character, tuning: &Tuning) -> Option<GameEvent> {
    match character.jump_state() {
        JumpState::Grounded => {
            character.vel.y = tuning.jump_force;
            character.is_jumping = true;
            character.double_jump_available = true;
            character.jumping = true;
            log::debug!("Jump");
            Some(GameEvent::Jump)
        }
        JumpState::FirstJump => {
            character.vel.y = tuning.double_jump_force();
            character.double_jump_available = false;
            character.jumping = true;
            log::debug!("Double jump");
            Some(GameEvent::DoubleJump)
        }
        JumpState::DoubleJumped => None,
    }
}

/// Hold-for-higher-jump: boost a rising first jump once per airborne phase
pub fn long_press(character: &mut Character, tuning: &Tuning) -> Option<GameEvent> {
    if character.jump_state() != JumpState::FirstJump
        || character.super_jump_used
        || character.vel.y >= 0.0
    {
        return None;
    }
    character.vel.y = character.vel.y.min(tuning.super_jump_force);
    character.super_jump_used = true;
    log::debug!("Super jump");
    Some(GameEvent::SuperJump)
}

/// Resolve a frame's presses against the character, pushing accepted jumps
pub fn resolve(
    character: &mut Character,
    tuning: &Tuning,
    presses: PressSummary,
    stats: &mut RunStats,
    events: &mut Vec<GameEvent>,
) {
    for _ in 0..presses.edges {
        if let Some(event) = press(character, tuning) {
            match event {
                GameEvent::Jump => stats.jumps += 1,
                GameEvent::DoubleJump => stats.double_jumps += 1,
                _ => {}
            }
            events.push(event);
        }
    }
    for _ in 0..presses.long_presses {
        if let Some(event) = long_press(character, tuning) {
            stats.super_jumps += 1;
            events.push(event);
        }
    }
}
