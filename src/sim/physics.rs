//! Vertical physics for the runner
//!
//! Gravity, floor landing and the ceiling. Velocity is integrated before
//! position; both are scaled by the frame's delta scale.

use super::state::Character;

/// Advance the character by one (delta-scaled) step
pub fn integrate(
    character: &mut Character,
    gravity: f32,
    viewport_height: f32,
    floor_height: f32,
    delta_scale: f32,
) {
    character.vel.y += gravity * delta_scale;
    character.pos.y += character.vel.y * delta_scale;

    let floor_y = character.floor_y(viewport_height, floor_height);
    if character.pos.y > floor_y {
        if character.is_jumping {
            log::debug!("Landed");
        }
        character.land(floor_y);
    }

    // Can't leave through the top of the viewport
    let ceiling_y = character.size.y / 2.0;
    if character.pos.y < ceiling_y {
        character.pos.y = ceiling_y;
        character.vel.y = 0.0;
    }

    character.jumping = character.vel.y < 0.0 || character.pos.y < floor_y;
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const HEIGHT: f32 = 800.0;
    const FLOOR: f32 = 50.0;

    fn grounded() -> Character {
        Character::new(400.0, HEIGHT, FLOOR)
    }

    #[test]
    fn test_grounded_character_stays_put() {
        let mut c = grounded();
        let y = c.pos.y;
        integrate(&mut c, 0.8, HEIGHT, FLOOR, 1.0);
        assert_eq!(c.pos.y, y);
        assert_eq!(c.vel.y, 0.0);
        assert!(!c.jumping);
        assert!(!c.is_jumping);
    }

    #[test]
    fn test_gravity_pulls_airborne_character_down() {
        let mut c = grounded();
        c.pos.y -= 200.0;
        c.is_jumping = true;
        integrate(&mut c, 0.8, HEIGHT, FLOOR, 1.0);
        assert!((c.vel.y - 0.8).abs() < 1e-6);
        assert!(c.jumping);
    }

    #[test]
    fn test_delta_scale_doubles_the_step() {
        let mut a = grounded();
        a.pos.y -= 300.0;
        a.vel.y = -5.0;
        let mut b = a.clone();
        integrate(&mut a, 0.8, HEIGHT, FLOOR, 2.0);
        integrate(&mut b, 0.8, HEIGHT, FLOOR, 1.0);
        assert!((a.vel.y - (-5.0 + 1.6)).abs() < 1e-5);
        assert!((b.vel.y - (-5.0 + 0.8)).abs() < 1e-5);
    }

    #[test]
    fn test_landing_resets_jump_flags() {
        let mut c = grounded();
        let floor_y = c.pos.y;
        c.pos.y = floor_y - 2.0;
        c.vel.y = 10.0;
        c.is_jumping = true;
        c.double_jump_available = false;
        c.super_jump_used = true;
        integrate(&mut c, 0.8, HEIGHT, FLOOR, 1.0);
        assert_eq!(c.pos.y, floor_y);
        assert_eq!(c.vel.y, 0.0);
        assert!(!c.is_jumping);
        assert!(c.double_jump_available);
        assert!(!c.super_jump_used);
    }

    #[test]
    fn test_ceiling_clamp() {
        let mut c = grounded();
        c.pos.y = 30.0;
        c.vel.y = -40.0;
        c.is_jumping = true;
        integrate(&mut c, 0.8, HEIGHT, FLOOR, 1.0);
        assert_eq!(c.pos.y, 25.0);
        assert_eq!(c.vel.y, 0.0);
    }

    proptest! {
        #[test]
        fn prop_floor_clamp_never_sinks(
            offset in 0.0f32..50.0,
            vel in -100.0f32..100.0,
            scale in 0.1f32..40.0,
        ) {
            let mut c = grounded();
            let floor_y = c.pos.y;
            c.pos.y = floor_y - offset;
            c.vel.y = vel;
            c.is_jumping = true;
            integrate(&mut c, 0.8, HEIGHT, FLOOR, scale);
            prop_assert!(c.pos.y <= floor_y);
            if !c.is_jumping {
                prop_assert_eq!(c.pos.y, floor_y);
                prop_assert_eq!(c.vel.y, 0.0);
            }
        }
    }

    #[test]
    fn test_floor_clamp_with_upward_velocity_and_large_scale() {
        let mut c = grounded();
        let floor_y = c.pos.y;
        c.pos.y = floor_y - 1.0;
        c.vel.y = -100.0;
        c.is_jumping = true;
        // Gravity overwhelms the upward velocity within one big step
        integrate(&mut c, 0.8, HEIGHT, FLOOR, 200.0);
        assert!(c.pos.y <= floor_y);
        assert_eq!(c.pos.y, floor_y);
        assert_eq!(c.vel.y, 0.0);
    }
}
