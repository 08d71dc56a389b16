//! Entity store and core simulation types
//!
//! Everything one session needs lives in `GameState`. Spawned entities are
//! kept in typed collections ordered by id; the singletons (world, floor,
//! character) are optional so a half-built store can be detected and skipped.

use std::fmt;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::resting_center;
use crate::tuning::Tuning;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Waiting for a start trigger
    Idle,
    /// Active gameplay
    Running,
    /// Run ended, waiting for reset
    GameOver,
}

/// Entity categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    World,
    Floor,
    Character,
    Obstacle,
    Coin,
    PowerUp,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::World => "world",
            EntityKind::Floor => "floor",
            EntityKind::Character => "character",
            EntityKind::Obstacle => "obstacle",
            EntityKind::Coin => "coin",
            EntityKind::PowerUp => "powerup",
        }
    }
}

/// Stable key of an entity: category plus a monotonic id (0 for singletons)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: u32,
}

impl EntityKey {
    pub fn singleton(kind: EntityKind) -> Self {
        Self { kind, id: 0 }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.id == 0 {
            f.write_str(self.kind.as_str())
        } else {
            write!(f, "{}-{}", self.kind.as_str(), self.id)
        }
    }
}

/// Opaque renderer reference, only interpreted by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Renderer {
    Character,
    Obstacle,
    Coin,
    PowerUp,
    Background,
}

/// Viewport and global pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub width: f32,
    pub height: f32,
    /// Smoothed scroll speed (px per reference frame)
    pub game_speed: f32,
    /// Timestamp (ms) of the most recent spawn
    pub last_spawn_time: Option<f64>,
    /// Wait (ms) after the last spawn before the next one
    pub next_spawn_delay_ms: f64,
    /// Derived from score, starts at 1
    pub difficulty_level: u32,
    /// Score bracket already announced (score / score_per_level)
    pub score_bracket: u64,
    /// Milestones already announced (score / milestone_every)
    pub milestones: u64,
}

impl World {
    pub fn new(width: f32, height: f32, initial_speed: f32) -> Self {
        Self {
            width,
            height,
            game_speed: initial_speed,
            last_spawn_time: None,
            next_spawn_delay_ms: 0.0,
            difficulty_level: 1,
            score_bracket: 0,
            milestones: 0,
        }
    }
}

/// Jump state machine, derived from the character's flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpState {
    Grounded,
    FirstJump,
    DoubleJumped,
}

/// The runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    /// Center position
    pub pos: Vec2,
    /// Velocity (only y is used)
    pub vel: Vec2,
    pub size: Vec2,
    /// Airborne
    pub is_jumping: bool,
    pub double_jump_available: bool,
    /// Long-press boost already used this airborne phase
    pub super_jump_used: bool,
    /// Animation flag: rising or above the floor
    pub jumping: bool,
    pub is_invincible: bool,
    /// Timestamp (ms) the current invincibility started
    pub invincibility_start_time: f64,
    pub renderer: Renderer,
}

impl Character {
    /// A grounded character at the standard x position of the viewport
    pub fn new(viewport_width: f32, viewport_height: f32, floor_height: f32) -> Self {
        let size = Vec2::new(CHARACTER_WIDTH, CHARACTER_HEIGHT);
        Self {
            pos: resting_center(
                viewport_width * CHARACTER_X_FRACTION,
                size,
                viewport_height,
                floor_height,
            ),
            vel: Vec2::ZERO,
            size,
            is_jumping: false,
            double_jump_available: true,
            super_jump_used: false,
            jumping: false,
            is_invincible: false,
            invincibility_start_time: 0.0,
            renderer: Renderer::Character,
        }
    }

    pub fn jump_state(&self) -> JumpState {
        match (self.is_jumping, self.double_jump_available) {
            (false, _) => JumpState::Grounded,
            (true, true) => JumpState::FirstJump,
            (true, false) => JumpState::DoubleJumped,
        }
    }

    /// Resting center y on a floor of the given thickness
    pub fn floor_y(&self, viewport_height: f32, floor_height: f32) -> f32 {
        viewport_height - floor_height - self.size.y / 2.0
    }

    /// Back on the ground: jump flags reset
    pub fn land(&mut self, floor_y: f32) {
        self.pos.y = floor_y;
        self.vel.y = 0.0;
        self.is_jumping = false;
        self.double_jump_available = true;
        self.super_jump_used = false;
    }
}

/// The ground strip; carries the background theme
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Floor {
    pub pos: Vec2,
    pub size: Vec2,
    pub theme_index: usize,
    pub renderer: Renderer,
}

impl Floor {
    pub fn new(viewport_width: f32, viewport_height: f32, floor_height: f32) -> Self {
        Self {
            pos: Vec2::new(viewport_width / 2.0, viewport_height - floor_height / 2.0),
            size: Vec2::new(viewport_width, floor_height),
            theme_index: 0,
            renderer: Renderer::Background,
        }
    }
}

/// Obstacle placement band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Sits on the floor, jump over it
    Ground,
    /// Floats above head height, don't jump into it
    Air,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    pub pos: Vec2,
    pub size: Vec2,
    /// Latch: collided with the character
    pub hit: bool,
    /// Latch: scrolled behind the character and scored
    pub passed: bool,
    pub renderer: Renderer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    /// Latch
    pub collected: bool,
    pub renderer: Renderer,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Invincibility,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub size: Vec2,
    /// Latch
    pub collected: bool,
    pub renderer: Renderer,
}

/// Borrowed view of any entity in the store
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    World(&'a World),
    Floor(&'a Floor),
    Character(&'a Character),
    Obstacle(&'a Obstacle),
    Coin(&'a Coin),
    PowerUp(&'a PowerUp),
}

/// Per-run counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub frames: u64,
    pub jumps: u32,
    pub double_jumps: u32,
    pub super_jumps: u32,
    pub obstacles_passed: u32,
    pub coins_collected: u32,
    pub powerups_collected: u32,
    /// Total scroll distance (px)
    pub distance: f32,
}

/// What a finished run hands to meta progression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub score: u64,
    pub coins: u64,
    pub stats: RunStats,
}

fn default_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Complete state of one game session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    /// Number of resets so far (each run gets its own RNG stream)
    pub runs: u32,
    #[serde(deserialize_with = "crate::tuning::deserialize_validated")]
    pub tuning: Tuning,
    pub phase: SessionPhase,
    pub world: Option<World>,
    pub floor: Option<Floor>,
    pub character: Option<Character>,
    /// Live obstacles (sorted by id)
    pub obstacles: Vec<Obstacle>,
    /// Live coins (sorted by id)
    pub coins: Vec<Coin>,
    /// Live power-ups (sorted by id)
    pub powerups: Vec<PowerUp>,
    pub score: u64,
    /// Coins collected this run
    pub coin_count: u64,
    pub stats: RunStats,
    /// Touch ids currently held down (edge detection across frames)
    #[serde(skip)]
    pub(crate) held_touches: Vec<u32>,
    #[serde(skip, default = "default_rng")]
    pub(crate) rng: Pcg32,
    /// Next entity id
    next_id: u32,
}

impl GameState {
    /// Create an idle session with default tuning
    pub fn new(width: f32, height: f32, seed: u64) -> Self {
        Self::with_tuning(width, height, seed, Tuning::default())
    }

    /// Create an idle session with the given tuning
    pub fn with_tuning(width: f32, height: f32, seed: u64, tuning: Tuning) -> Self {
        let tuning = tuning.validated();
        let mut state = Self {
            seed,
            runs: 0,
            tuning,
            phase: SessionPhase::Idle,
            world: None,
            floor: None,
            character: None,
            obstacles: Vec::new(),
            coins: Vec::new(),
            powerups: Vec::new(),
            score: 0,
            coin_count: 0,
            stats: RunStats::default(),
            held_touches: Vec::new(),
            rng: default_rng(),
            next_id: 1,
        };
        state.populate(width, height);
        state
    }

    /// Empty store with no world or character (for hosts that build entities themselves)
    pub fn empty(seed: u64, tuning: Tuning) -> Self {
        let mut state = Self::with_tuning(0.0, 0.0, seed, tuning);
        state.world = None;
        state.floor = None;
        state.character = None;
        state
    }

    /// Rebuild world, floor and character; clear everything spawned
    fn populate(&mut self, width: f32, height: f32) {
        let floor_height = self.tuning.floor_height;
        self.world = Some(World::new(width, height, self.tuning.initial_speed));
        self.floor = Some(Floor::new(width, height, floor_height));
        self.character = Some(Character::new(width, height, floor_height));
        self.obstacles.clear();
        self.coins.clear();
        self.powerups.clear();
        self.score = 0;
        self.coin_count = 0;
        self.stats = RunStats::default();
        self.held_touches.clear();
        self.rng = Pcg32::seed_from_u64(self.seed.wrapping_add(self.runs as u64));
        self.next_id = 1;
    }

    /// Idle -> Running
    pub fn start(&mut self) {
        if self.phase == SessionPhase::Idle {
            log::info!("Session started (seed {})", self.seed);
            self.phase = SessionPhase::Running;
        }
    }

    /// Reinitialize the store for a new run and start it
    pub fn reset(&mut self, width: f32, height: f32) {
        self.runs += 1;
        self.populate(width, height);
        self.phase = SessionPhase::Running;
        log::info!("Session reset to {}x{} (run {})", width, height, self.runs);
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Current background theme (0 if there is no floor)
    pub fn theme_index(&self) -> usize {
        self.floor.as_ref().map(|f| f.theme_index).unwrap_or(0)
    }

    /// Every live entity in stable render order
    pub fn entities(&self) -> Vec<(EntityKey, EntityRef<'_>)> {
        let spawned = self.obstacles.len() + self.coins.len() + self.powerups.len();
        let mut out = Vec::with_capacity(3 + spawned);
        if let Some(world) = &self.world {
            out.push((EntityKey::singleton(EntityKind::World), EntityRef::World(world)));
        }
        if let Some(floor) = &self.floor {
            out.push((EntityKey::singleton(EntityKind::Floor), EntityRef::Floor(floor)));
        }
        for o in &self.obstacles {
            out.push((
                EntityKey { kind: EntityKind::Obstacle, id: o.id },
                EntityRef::Obstacle(o),
            ));
        }
        for c in &self.coins {
            out.push((EntityKey { kind: EntityKind::Coin, id: c.id }, EntityRef::Coin(c)));
        }
        for p in &self.powerups {
            out.push((
                EntityKey { kind: EntityKind::PowerUp, id: p.id },
                EntityRef::PowerUp(p),
            ));
        }
        // Character last so it draws on top
        if let Some(character) = &self.character {
            out.push((
                EntityKey::singleton(EntityKind::Character),
                EntityRef::Character(character),
            ));
        }
        out
    }

    /// Snapshot handed to meta progression when a run ends
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            seed: self.seed.wrapping_add(self.runs as u64),
            score: self.score,
            coins: self.coin_count,
            stats: self.stats.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle_and_grounded() {
        let state = GameState::new(400.0, 800.0, 1);
        assert_eq!(state.phase, SessionPhase::Idle);
        let character = state.character.as_ref().unwrap();
        assert_eq!(character.jump_state(), JumpState::Grounded);
        assert_eq!(character.pos.y, character.floor_y(800.0, state.tuning.floor_height));
        assert_eq!(character.pos.x, 80.0);
    }

    #[test]
    fn test_reset_clears_spawned_and_runs() {
        let mut state = GameState::new(400.0, 800.0, 1);
        state.start();
        state.score = 12;
        state.coin_count = 3;
        let id = state.next_entity_id();
        state.coins.push(Coin {
            id,
            pos: Vec2::new(100.0, 100.0),
            size: Vec2::splat(30.0),
            collected: false,
            renderer: Renderer::Coin,
        });
        state.phase = SessionPhase::GameOver;

        state.reset(500.0, 900.0);
        assert_eq!(state.phase, SessionPhase::Running);
        assert_eq!(state.score, 0);
        assert_eq!(state.coin_count, 0);
        assert!(state.coins.is_empty());
        assert_eq!(state.world.as_ref().unwrap().width, 500.0);
        assert_eq!(state.next_entity_id(), 1);
    }

    #[test]
    fn test_entity_keys_are_unique_and_render_ordered() {
        let mut state = GameState::new(400.0, 800.0, 1);
        for _ in 0..3 {
            let id = state.next_entity_id();
            state.obstacles.push(Obstacle {
                id,
                kind: ObstacleKind::Ground,
                pos: Vec2::new(500.0, 725.0),
                size: Vec2::new(30.0, 50.0),
                hit: false,
                passed: false,
                renderer: Renderer::Obstacle,
            });
        }
        let keys: Vec<String> = state.entities().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(
            keys,
            vec!["world", "floor", "obstacle-1", "obstacle-2", "obstacle-3", "character"]
        );
    }

    #[test]
    fn test_empty_store_has_no_singletons() {
        let state = GameState::empty(7, Tuning::default());
        assert!(state.world.is_none());
        assert!(state.character.is_none());
        assert!(state.entities().is_empty());
    }
}
