//! Data-driven game balance
//!
//! One authoritative tuning table. All per-frame values are per reference
//! frame (see `consts::REFERENCE_FRAME_MS`) and get scaled by the frame's
//! delta scale inside the simulation.

use serde::{Deserialize, Deserializer, Serialize};

/// Cap on each spawn category weight
pub const MAX_SPAWN_WEIGHT: u32 = u16::MAX as u32;

/// A background palette
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    /// Sky color (CSS hex)
    pub sky: String,
    /// Ground color (CSS hex)
    pub ground: String,
}

impl Theme {
    fn new(name: &str, sky: &str, ground: &str) -> Self {
        Self {
            name: name.to_string(),
            sky: sky.to_string(),
            ground: ground.to_string(),
        }
    }
}

/// Default palettes, cycled every `score_per_level` points
pub fn default_themes() -> Vec<Theme> {
    vec![
        Theme::new("Meadow", "#87CEEB", "#8B4513"),
        Theme::new("Sunset", "#FF8C61", "#5C3A21"),
        Theme::new("Night", "#1B1F3B", "#2E2E2E"),
        Theme::new("Desert", "#F4D58D", "#C2A15A"),
    ]
}

/// Game balance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Physics ===
    /// Downward acceleration (px/frame²)
    pub gravity: f32,
    /// First jump velocity (negative = up)
    pub jump_force: f32,
    /// Double jump = jump_force * this
    pub double_jump_multiplier: f32,
    /// Long-press boost velocity during first-jump ascent
    pub super_jump_force: f32,
    /// Floor thickness (px)
    pub floor_height: f32,

    // === Speed ===
    pub initial_speed: f32,
    pub max_speed: f32,
    /// Target speed increase per score point
    pub speed_increase_rate: f32,
    /// Exponential smoothing factor per reference frame (0 = snap to target)
    pub speed_smoothing: f32,

    // === Spawning ===
    /// Base spawn interval at initial speed (ms)
    pub spawn_interval_ms: f64,
    /// Random extra interval (ms)
    pub spawn_interval_jitter_ms: f64,
    /// Minimum horizontal distance from the rightmost live entity (px)
    pub min_spacing: f32,
    /// Random extra spacing (px)
    pub spacing_variation: f32,
    /// Distance beyond the right viewport edge where entities appear
    pub spawn_margin: f32,
    pub obstacle_width: f32,
    pub obstacle_min_height: f32,
    /// Jumpable cap on obstacle height
    pub obstacle_max_height: f32,
    /// Height range widening per difficulty level
    pub height_step_per_level: f32,
    pub air_obstacle_min_level: u32,
    pub air_obstacle_chance: f64,
    /// Gap between a grounded character's head and an air obstacle
    pub air_clearance: f32,
    pub obstacle_weight: u32,
    pub coin_weight: u32,
    pub powerup_weight: u32,
    pub coin_size: f32,
    pub powerup_size: f32,

    // === Scoring & progression ===
    pub coin_value: u64,
    pub powerup_duration_ms: f64,
    /// Collision forgiveness as a fraction of the character size
    pub forgiveness: f32,
    /// Score bracket for difficulty level and theme
    pub score_per_level: u64,
    pub milestone_every: u64,
    pub themes: Vec<Theme>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 0.8,
            jump_force: -15.0,
            double_jump_multiplier: 1.2,
            super_jump_force: -20.0,
            floor_height: 50.0,

            initial_speed: 5.0,
            max_speed: 10.0,
            speed_increase_rate: 0.1,
            speed_smoothing: 0.95,

            spawn_interval_ms: 1200.0,
            spawn_interval_jitter_ms: 600.0,
            min_spacing: 260.0,
            spacing_variation: 140.0,
            spawn_margin: 40.0,
            obstacle_width: 30.0,
            obstacle_min_height: 40.0,
            obstacle_max_height: 90.0,
            height_step_per_level: 10.0,
            air_obstacle_min_level: 2,
            air_obstacle_chance: 0.3,
            air_clearance: 12.0,
            obstacle_weight: 70,
            coin_weight: 25,
            powerup_weight: 5,
            coin_size: 30.0,
            powerup_size: 34.0,

            coin_value: 1,
            powerup_duration_ms: 5000.0,
            forgiveness: 0.15,
            score_per_level: 10,
            milestone_every: 5,
            themes: default_themes(),
        }
    }
}

/// Deserialize a tuning table and clamp it, for tuning embedded in saved state
pub fn deserialize_validated<'de, D>(deserializer: D) -> Result<Tuning, D::Error>
where
    D: Deserializer<'de>,
{
    Tuning::deserialize(deserializer).map(Tuning::validated)
}

impl Tuning {
    /// Parse a (possibly partial) tuning table; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.validated())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Clamp values that would break the simulation
    pub fn validated(mut self) -> Self {
        self.gravity = self.gravity.max(0.0);
        if self.jump_force > 0.0 {
            self.jump_force = -self.jump_force;
        }
        if self.super_jump_force > 0.0 {
            self.super_jump_force = -self.super_jump_force;
        }
        self.double_jump_multiplier = self.double_jump_multiplier.max(0.0);
        self.floor_height = self.floor_height.max(0.0);
        self.initial_speed = self.initial_speed.max(0.0);
        self.max_speed = self.max_speed.max(self.initial_speed);
        self.speed_increase_rate = self.speed_increase_rate.max(0.0);
        self.speed_smoothing = self.speed_smoothing.clamp(0.0, 0.999);
        self.spawn_interval_ms = self.spawn_interval_ms.max(0.0);
        self.spawn_interval_jitter_ms = self.spawn_interval_jitter_ms.max(0.0);
        self.min_spacing = self.min_spacing.max(0.0);
        self.spacing_variation = self.spacing_variation.max(0.0);
        self.spawn_margin = self.spawn_margin.max(0.0);
        self.obstacle_width = self.obstacle_width.max(1.0);
        self.obstacle_min_height = self.obstacle_min_height.max(1.0);
        self.obstacle_max_height = self.obstacle_max_height.max(self.obstacle_min_height);
        self.height_step_per_level = self.height_step_per_level.max(0.0);
        self.air_obstacle_chance = self.air_obstacle_chance.clamp(0.0, 1.0);
        for weight in [
            &mut self.obstacle_weight,
            &mut self.coin_weight,
            &mut self.powerup_weight,
        ] {
            *weight = (*weight).min(MAX_SPAWN_WEIGHT);
        }
        if self.total_spawn_weight() == 0 {
            self.obstacle_weight = 1;
        }
        self.forgiveness = self.forgiveness.clamp(0.0, 0.49);
        self.score_per_level = self.score_per_level.max(1);
        self.milestone_every = self.milestone_every.max(1);
        if self.themes.is_empty() {
            self.themes = default_themes();
        }
        self
    }

    /// Number of background themes (never zero after validation)
    pub fn theme_count(&self) -> usize {
        self.themes.len().max(1)
    }

    /// Sum of the spawn category weights
    pub fn total_spawn_weight(&self) -> u32 {
        self.obstacle_weight
            .saturating_add(self.coin_weight)
            .saturating_add(self.powerup_weight)
    }

    /// Velocity applied by a double jump
    pub fn double_jump_force(&self) -> f32 {
        self.jump_force * self.double_jump_multiplier
    }
}
