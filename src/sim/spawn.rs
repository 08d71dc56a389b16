//! Procedural spawning and scrolling of obstacles, coins and power-ups
//!
//! New entities appear beyond the right edge of the viewport, never closer
//! than `min_spacing` to the rightmost live entity. Everything scrolls left at
//! the world's game speed, collides with the runner and is culled once it is
//! fully past the left edge.

use glam::Vec2;
use rand::Rng;

use super::collision::{Body, character_hits};
use super::events::GameEvent;
use super::state::{
    Character, Coin, EntityKey, EntityKind, GameState, Obstacle, ObstacleKind, PowerUp,
    PowerUpKind, Renderer, World,
};
use crate::floor_top;

/// Spawn categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnKind {
    Obstacle,
    Coin,
    PowerUp,
}

/// Largest x among every live spawned entity (None if there are none)
pub fn rightmost_x(state: &GameState) -> Option<f32> {
    state
        .obstacles
        .iter()
        .map(|o| o.pos.x)
        .chain(state.coins.iter().map(|c| c.pos.x))
        .chain(state.powerups.iter().map(|p| p.pos.x))
        .reduce(f32::max)
}

/// Height of a jump's apex above the takeoff point
fn jump_apex(state: &GameState) -> f32 {
    let t = &state.tuning;
    if t.gravity <= 0.0 {
        return 0.0;
    }
    t.jump_force * t.jump_force / (2.0 * t.gravity)
}

/// Weighted category roll
fn roll_kind(state: &mut GameState) -> SpawnKind {
    let t = &state.tuning;
    let total = t.total_spawn_weight();
    if total == 0 {
        return SpawnKind::Obstacle;
    }
    let obstacle = t.obstacle_weight;
    let roll = state.rng.random_range(0..total);
    if roll < obstacle {
        SpawnKind::Obstacle
    } else if roll < obstacle.saturating_add(t.coin_weight) {
        SpawnKind::Coin
    } else {
        SpawnKind::PowerUp
    }
}

/// Upper bound of the obstacle height range at a difficulty level
pub fn max_obstacle_height(state: &GameState, level: u32) -> f32 {
    let t = &state.tuning;
    (t.obstacle_min_height + t.height_step_per_level * level as f32).min(t.obstacle_max_height)
}

/// Spawn something if the timer and spacing gates allow it.
///
/// Returns the key of the new entity.
pub fn try_spawn(
    state: &mut GameState,
    world: &mut World,
    character: &Character,
    now: f64,
) -> Option<EntityKey> {
    if let Some(last) = world.last_spawn_time {
        if now - last < world.next_spawn_delay_ms {
            return None;
        }
    }

    let edge = world.width + state.tuning.spawn_margin;
    let min_spacing = state.tuning.min_spacing;
    let x = match rightmost_x(state) {
        None => edge,
        Some(rightmost) => {
            // Previous spawn hasn't scrolled in far enough yet
            if rightmost + min_spacing > edge {
                return None;
            }
            let jitter = state.rng.random::<f32>() * state.tuning.spacing_variation;
            (rightmost + min_spacing + jitter).max(edge)
        }
    };

    let kind = roll_kind(state);
    let floor_y = floor_top(world.height, state.tuning.floor_height);
    let apex = jump_apex(state);
    let id = state.next_entity_id();

    let key = match kind {
        SpawnKind::Obstacle => {
            let level = world.difficulty_level;
            let t = &state.tuning;
            let air = level >= t.air_obstacle_min_level
                && t.air_obstacle_chance > 0.0
                && state.rng.random_bool(t.air_obstacle_chance);
            let (kind, size, y) = if air {
                let height = t.obstacle_min_height;
                let bottom = floor_y - character.size.y - t.air_clearance;
                (ObstacleKind::Air, Vec2::new(t.obstacle_width, height), bottom - height / 2.0)
            } else {
                let min = t.obstacle_min_height;
                let max = max_obstacle_height(state, level);
                let height = min + state.rng.random::<f32>() * (max - min);
                let width = state.tuning.obstacle_width;
                (ObstacleKind::Ground, Vec2::new(width, height), floor_y - height / 2.0)
            };
            state.obstacles.push(Obstacle {
                id,
                kind,
                pos: Vec2::new(x, y),
                size,
                hit: false,
                passed: false,
                renderer: Renderer::Obstacle,
            });
            log::debug!("Spawned {:?} obstacle {} at x={:.0} h={:.0}", kind, id, x, size.y);
            EntityKey { kind: EntityKind::Obstacle, id }
        }
        SpawnKind::Coin => {
            let size = Vec2::splat(state.tuning.coin_size);
            let lift = state.rng.random::<f32>() * apex * 0.8;
            state.coins.push(Coin {
                id,
                pos: Vec2::new(x, floor_y - size.y / 2.0 - lift),
                size,
                collected: false,
                renderer: Renderer::Coin,
            });
            log::debug!("Spawned coin {} at x={:.0}", id, x);
            EntityKey { kind: EntityKind::Coin, id }
        }
        SpawnKind::PowerUp => {
            let size = Vec2::splat(state.tuning.powerup_size);
            let lift = (0.3 + state.rng.random::<f32>() * 0.4) * apex;
            state.powerups.push(PowerUp {
                id,
                kind: PowerUpKind::Invincibility,
                pos: Vec2::new(x, floor_y - size.y / 2.0 - lift),
                size,
                collected: false,
                renderer: Renderer::PowerUp,
            });
            log::debug!("Spawned power-up {} at x={:.0}", id, x);
            EntityKey { kind: EntityKind::PowerUp, id }
        }
    };

    // Faster world, shorter wait
    let t = &state.tuning;
    let jitter = state.rng.random::<f64>() * t.spawn_interval_jitter_ms;
    let speed_ratio = (t.initial_speed / world.game_speed.max(f32::EPSILON)) as f64;
    world.next_spawn_delay_ms = (t.spawn_interval_ms + jitter) * speed_ratio;
    world.last_spawn_time = Some(now);

    Some(key)
}

/// Scroll, collide, score and cull every spawned entity.
///
/// Returns true if the character hit an obstacle this frame.
pub fn advance(
    state: &mut GameState,
    world: &World,
    character: &mut Character,
    delta_scale: f32,
    now: f64,
    events: &mut Vec<GameEvent>,
) -> bool {
    let dx = world.game_speed * delta_scale;
    let forgiveness = state.tuning.forgiveness;
    state.stats.distance += dx;

    let mut game_over = false;
    let character_left = character.aabb().left();

    for obstacle in &mut state.obstacles {
        obstacle.pos.x -= dx;

        // Invincible runners pass straight through
        if !obstacle.hit
            && !character.is_invincible
            && character_hits(character, obstacle, forgiveness)
        {
            obstacle.hit = true;
            if !game_over {
                game_over = true;
                log::info!("Hit obstacle {} at score {}", obstacle.id, state.score);
                events.push(GameEvent::GameOver { score: state.score });
            }
        }

        let behind = obstacle.aabb().right() < character_left;
        if !game_over && !obstacle.passed && !obstacle.hit && behind {
            obstacle.passed = true;
            state.score += 1;
            state.stats.obstacles_passed += 1;
            events.push(GameEvent::Score { score: state.score });
        }
    }
    state.obstacles.retain(|o| o.aabb().right() >= 0.0);

    for coin in &mut state.coins {
        coin.pos.x -= dx;
        if !game_over && !coin.collected && character_hits(character, coin, forgiveness) {
            coin.collected = true;
            state.coin_count += 1;
            state.score += state.tuning.coin_value;
            state.stats.coins_collected += 1;
            events.push(GameEvent::CoinCollected {
                coins: state.coin_count,
            });
        }
    }
    state.coins.retain(|c| !c.collected && c.aabb().right() >= 0.0);

    for powerup in &mut state.powerups {
        powerup.pos.x -= dx;
        if !game_over && !powerup.collected && character_hits(character, powerup, forgiveness) {
            powerup.collected = true;
            match powerup.kind {
                PowerUpKind::Invincibility => {
                    character.is_invincible = true;
                    character.invincibility_start_time = now;
                }
            }
            state.stats.powerups_collected += 1;
            log::info!("Power-up {:?} collected", powerup.kind);
            events.push(GameEvent::PowerupCollected { kind: powerup.kind });
        }
    }
    state.powerups.retain(|p| !p.collected && p.aabb().right() >= 0.0);

    game_over
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    const W: f32 = 400.0;
    const H: f32 = 800.0;

    fn running(seed: u64) -> GameState {
        let mut state = GameState::new(W, H, seed);
        state.start();
        state
    }

    fn take(state: &mut GameState) -> (World, Character) {
        (state.world.take().unwrap(), state.character.take().unwrap())
    }

    fn push_obstacle(state: &mut GameState, x: f32, y: f32) -> u32 {
        let id = state.next_entity_id();
        state.obstacles.push(Obstacle {
            id,
            kind: ObstacleKind::Ground,
            pos: Vec2::new(x, y),
            size: Vec2::new(30.0, 50.0),
            hit: false,
            passed: false,
            renderer: Renderer::Obstacle,
        });
        id
    }

    #[test]
    fn test_first_spawn_at_right_edge() {
        let mut state = running(1);
        let (mut world, character) = take(&mut state);
        let key = try_spawn(&mut state, &mut world, &character, 0.0).unwrap();
        assert_eq!(key.id, 1);
        assert_eq!(rightmost_x(&state), Some(W + state.tuning.spawn_margin));
        assert_eq!(world.last_spawn_time, Some(0.0));
    }

    #[test]
    fn test_timer_gate_blocks_early_spawn() {
        let mut state = running(1);
        let (mut world, character) = take(&mut state);
        try_spawn(&mut state, &mut world, &character, 0.0).unwrap();
        // Clear the spacing gate so only the timer matters
        state.obstacles.clear();
        state.coins.clear();
        state.powerups.clear();
        assert!(try_spawn(&mut state, &mut world, &character, 10.0).is_none());
        assert!(try_spawn(&mut state, &mut world, &character, 1.0e6).is_some());
    }

    #[test]
    fn test_spacing_gate_blocks_stacking() {
        let mut state = running(1);
        let (mut world, character) = take(&mut state);
        try_spawn(&mut state, &mut world, &character, 0.0).unwrap();
        // Timer long expired but the last spawn is still off screen
        assert!(try_spawn(&mut state, &mut world, &character, 1.0e6).is_none());
        assert_eq!(state.obstacles.len() + state.coins.len() + state.powerups.len(), 1);
    }

    #[test]
    fn test_spawn_roll_with_huge_weights() {
        let mut state = running(5);
        // Written straight into the store, skipping validation
        state.tuning.obstacle_weight = u32::MAX;
        state.tuning.coin_weight = u32::MAX;
        state.tuning.powerup_weight = u32::MAX;
        let (mut world, character) = take(&mut state);
        for i in 0..20 {
            state.obstacles.clear();
            state.coins.clear();
            state.powerups.clear();
            world.last_spawn_time = None;
            assert!(try_spawn(&mut state, &mut world, &character, i as f64).is_some());
        }
    }

    #[test]
    fn test_obstacle_heights_capped_by_difficulty() {
        let tuning = Tuning {
            coin_weight: 0,
            powerup_weight: 0,
            air_obstacle_chance: 0.0,
            ..Default::default()
        };
        let mut state = GameState::with_tuning(W, H, 3, tuning);
        state.start();
        let (mut world, character) = take(&mut state);
        for level in [1u32, 3, 20] {
            world.difficulty_level = level;
            let cap = max_obstacle_height(&state, level);
            for i in 0..50 {
                state.obstacles.clear();
                world.last_spawn_time = None;
                try_spawn(&mut state, &mut world, &character, i as f64).unwrap();
                let o = &state.obstacles[0];
                assert!(o.size.y >= state.tuning.obstacle_min_height);
                assert!(o.size.y <= cap);
                assert!(o.size.y <= state.tuning.obstacle_max_height);
                // Sits on the floor
                assert!((o.aabb().bottom() - floor_top(H, 50.0)).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn test_air_obstacles_clear_grounded_character() {
        let tuning = Tuning {
            coin_weight: 0,
            powerup_weight: 0,
            air_obstacle_chance: 1.0,
            ..Default::default()
        };
        let mut state = GameState::with_tuning(W, H, 3, tuning);
        state.start();
        let (mut world, mut character) = take(&mut state);
        world.difficulty_level = 2;
        try_spawn(&mut state, &mut world, &character, 0.0).unwrap();
        let o = &mut state.obstacles[0];
        assert_eq!(o.kind, ObstacleKind::Air);
        // Put it right on top of the runner: a grounded runner passes underneath
        o.pos.x = character.pos.x;
        let mut events = Vec::new();
        let hit = advance(&mut state, &world, &mut character, 0.0, 0.0, &mut events);
        assert!(!hit);
        assert!(events.is_empty());
    }

    #[test]
    fn test_pass_scores_exactly_once() {
        let mut state = running(1);
        let (world, mut character) = take(&mut state);
        // Just behind the runner
        push_obstacle(&mut state, character.pos.x - 45.0, 725.0);
        let mut events = Vec::new();
        advance(&mut state, &world, &mut character, 0.0, 0.0, &mut events);
        assert_eq!(state.score, 1);
        assert!(state.obstacles[0].passed);
        advance(&mut state, &world, &mut character, 0.0, 0.0, &mut events);
        advance(&mut state, &world, &mut character, 1.0, 0.0, &mut events);
        assert_eq!(state.score, 1);
        assert_eq!(events, vec![GameEvent::Score { score: 1 }]);
    }

    #[test]
    fn test_hit_latches_and_game_over_once() {
        let mut state = running(1);
        let (world, mut character) = take(&mut state);
        push_obstacle(&mut state, character.pos.x, character.pos.y);
        let mut events = Vec::new();
        assert!(advance(&mut state, &world, &mut character, 0.0, 0.0, &mut events));
        assert!(state.obstacles[0].hit);
        // Repeated checks never re-fire and a hit obstacle never scores
        assert!(!advance(&mut state, &world, &mut character, 0.0, 0.0, &mut events));
        for _ in 0..30 {
            advance(&mut state, &world, &mut character, 1.0, 0.0, &mut events);
        }
        assert_eq!(events, vec![GameEvent::GameOver { score: 0 }]);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_invincible_runner_survives() {
        let mut state = running(1);
        let (world, mut character) = take(&mut state);
        character.is_invincible = true;
        push_obstacle(&mut state, character.pos.x, character.pos.y);
        let mut events = Vec::new();
        assert!(!advance(&mut state, &world, &mut character, 0.0, 0.0, &mut events));
        assert!(!state.obstacles[0].hit);
        assert!(events.is_empty());
    }

    #[test]
    fn test_coin_collected_once_and_removed() {
        let mut state = running(1);
        let (world, mut character) = take(&mut state);
        let id = state.next_entity_id();
        state.coins.push(Coin {
            id,
            pos: character.pos,
            size: Vec2::splat(30.0),
            collected: false,
            renderer: Renderer::Coin,
        });
        let mut events = Vec::new();
        advance(&mut state, &world, &mut character, 0.0, 0.0, &mut events);
        advance(&mut state, &world, &mut character, 0.0, 0.0, &mut events);
        assert!(state.coins.is_empty());
        assert_eq!(state.coin_count, 1);
        assert_eq!(state.score, state.tuning.coin_value);
        assert_eq!(events, vec![GameEvent::CoinCollected { coins: 1 }]);
    }

    #[test]
    fn test_powerup_grants_invincibility() {
        let mut state = running(1);
        let (world, mut character) = take(&mut state);
        let id = state.next_entity_id();
        state.powerups.push(PowerUp {
            id,
            kind: PowerUpKind::Invincibility,
            pos: character.pos,
            size: Vec2::splat(34.0),
            collected: false,
            renderer: Renderer::PowerUp,
        });
        let mut events = Vec::new();
        advance(&mut state, &world, &mut character, 0.0, 1234.0, &mut events);
        assert!(character.is_invincible);
        assert_eq!(character.invincibility_start_time, 1234.0);
        assert!(state.powerups.is_empty());
        assert_eq!(
            events,
            vec![GameEvent::PowerupCollected {
                kind: PowerUpKind::Invincibility
            }]
        );
    }

    #[test]
    fn test_offscreen_entities_are_culled() {
        let mut state = running(1);
        let (world, mut character) = take(&mut state);
        push_obstacle(&mut state, -14.0, 725.0);
        let mut events = Vec::new();
        advance(&mut state, &world, &mut character, 1.0, 0.0, &mut events);
        assert!(state.obstacles.is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_spawned_entities_respect_min_spacing(seed in any::<u64>()) {
            let mut state = running(seed);
            let (mut world, mut character) = take(&mut state);
            let min_spacing = state.tuning.min_spacing;
            let mut events = Vec::new();
            let mut now = 0.0;
            for _ in 0..600 {
                now += crate::consts::REFERENCE_FRAME_MS;
                let before: Vec<f32> = state
                    .obstacles
                    .iter()
                    .map(|o| o.pos.x)
                    .chain(state.coins.iter().map(|c| c.pos.x))
                    .chain(state.powerups.iter().map(|p| p.pos.x))
                    .collect();
                if let Some(key) = try_spawn(&mut state, &mut world, &character, now) {
                    let x = match key.kind {
                        EntityKind::Obstacle => state.obstacles.last().map(|o| o.pos.x),
                        EntityKind::Coin => state.coins.last().map(|c| c.pos.x),
                        _ => state.powerups.last().map(|p| p.pos.x),
                    };
                    let x = x.unwrap();
                    prop_assert!(x >= world.width);
                    for other in before {
                        prop_assert!((x - other).abs() >= min_spacing - 1e-3);
                    }
                }
                // Invincible so the run never ends
                character.is_invincible = true;
                advance(&mut state, &world, &mut character, 1.0, now, &mut events);
            }
        }
    }
}
