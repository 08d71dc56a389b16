//! Score-driven progression: speed, difficulty, themes, milestones and the
//! invincibility timer.

use super::events::GameEvent;
use super::state::{Character, Floor, World};
use crate::tuning::Tuning;

/// Speed the world is heading toward at this score
pub fn target_speed(score: u64, tuning: &Tuning) -> f32 {
    let speed = tuning.initial_speed + score as f32 * tuning.speed_increase_rate;
    speed.clamp(tuning.initial_speed, tuning.max_speed)
}

/// Exponential smoothing toward the target, frame-rate independent.
///
/// Never decreases within a session (the target only rises with score).
pub fn smoothed_speed(current: f32, target: f32, tuning: &Tuning, delta_scale: f32) -> f32 {
    let alpha = tuning.speed_smoothing.powf(delta_scale);
    let blended = current * alpha + target * (1.0 - alpha);
    blended
        .max(current)
        .clamp(tuning.initial_speed, tuning.max_speed)
}

/// Score bracket (tuning written straight into the store may hold a zero period)
pub fn score_bracket(score: u64, tuning: &Tuning) -> u64 {
    score / tuning.score_per_level.max(1)
}

pub fn difficulty_level(score: u64, tuning: &Tuning) -> u32 {
    u32::try_from(score_bracket(score, tuning))
        .unwrap_or(u32::MAX)
        .saturating_add(1)
}

pub fn theme_index(score: u64, tuning: &Tuning) -> usize {
    (score_bracket(score, tuning) % tuning.theme_count() as u64) as usize
}

/// Update speed, level, theme, milestones and power-up timers for one frame
#[allow(clippy::too_many_arguments)]
pub fn update(
    world: &mut World,
    floor: Option<&mut Floor>,
    character: &mut Character,
    score: u64,
    tuning: &Tuning,
    now: f64,
    delta_scale: f32,
    events: &mut Vec<GameEvent>,
) {
    let target = target_speed(score, tuning);
    world.game_speed = smoothed_speed(world.game_speed, target, tuning, delta_scale);
    world.difficulty_level = difficulty_level(score, tuning);

    // Fires once per bracket, even if a frame skipped over the exact multiple
    let bracket = score_bracket(score, tuning);
    if bracket > world.score_bracket {
        world.score_bracket = bracket;
        let theme = theme_index(score, tuning);
        if let Some(floor) = floor {
            if floor.theme_index != theme {
                floor.theme_index = theme;
                let name = tuning.themes.get(theme).map(|t| t.name.as_str()).unwrap_or("?");
                log::info!("Theme -> {} ({})", theme, name);
                events.push(GameEvent::ThemeChange { theme });
            }
        }
    }

    let milestones = score / tuning.milestone_every.max(1);
    if milestones > world.milestones {
        world.milestones = milestones;
        events.push(GameEvent::Milestone { score });
    }

    let elapsed = now - character.invincibility_start_time;
    if character.is_invincible && elapsed > tuning.powerup_duration_ms {
        character.is_invincible = false;
        log::debug!("Invincibility ended");
        events.push(GameEvent::InvincibilityEnd);
    }
}
