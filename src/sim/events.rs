//! Events emitted by the simulation for the presentation layer
//!
//! Sound, haptics and HUD react to these; the core never does.

use serde::{Deserialize, Serialize};

use super::state::PowerUpKind;

/// A discriminated event record, serialized as `{"type": "jump"}` etc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GameEvent {
    /// First jump from the ground
    Jump,
    /// Second jump while airborne
    DoubleJump,
    /// Long-press boost during the first jump
    SuperJump,
    /// An obstacle was cleared
    Score { score: u64 },
    /// Score crossed a multiple of `milestone_every`
    Milestone { score: u64 },
    /// The character hit an obstacle; the session is over
    GameOver { score: u64 },
    /// Background theme advanced
    ThemeChange { theme: usize },
    CoinCollected { coins: u64 },
    PowerupCollected { kind: PowerUpKind },
    InvincibilityEnd,
}

impl GameEvent {
    /// Wire name of the event type
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::Jump => "jump",
            GameEvent::DoubleJump => "double-jump",
            GameEvent::SuperJump => "super-jump",
            GameEvent::Score { .. } => "score",
            GameEvent::Milestone { .. } => "milestone",
            GameEvent::GameOver { .. } => "game-over",
            GameEvent::ThemeChange { .. } => "theme-change",
            GameEvent::CoinCollected { .. } => "coin-collected",
            GameEvent::PowerupCollected { .. } => "powerup-collected",
            GameEvent::InvincibilityEnd => "invincibility-end",
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self, GameEvent::GameOver { .. })
    }
}
