//! Collision detection between the runner and spawned entities
//!
//! Everything is an axis-aligned box described by its center and size. The
//! character's box is shrunk by a forgiveness margin so near misses don't end
//! the run.

use glam::Vec2;

use super::state::{Character, Coin, Obstacle, PowerUp};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.max.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.max.y
    }
}

/// Anything with a center position and a size
pub trait Body {
    fn center(&self) -> Vec2;
    fn size(&self) -> Vec2;

    fn aabb(&self) -> Aabb {
        Aabb::from_center(self.center(), self.size())
    }
}

macro_rules! impl_body {
    ($($ty:ty),*) => {
        $(impl Body for $ty {
            fn center(&self) -> Vec2 {
                self.pos
            }
            fn size(&self) -> Vec2 {
                self.size
            }
        })*
    };
}

impl_body!(Character, Obstacle, Coin, PowerUp);

/// Box overlap with `margin` removed from each side of the overlap region.
///
/// Strict inequalities: boxes that only touch (after the margin) don't overlap.
/// Symmetric in `a` and `b`.
pub fn overlaps(a: &Aabb, b: &Aabb, margin: Vec2) -> bool {
    a.right() - margin.x > b.left()
        && a.left() + margin.x < b.right()
        && a.bottom() - margin.y > b.top()
        && a.top() + margin.y < b.bottom()
}

/// Forgiveness margin derived from the character's own size
#[inline]
pub fn forgiveness_margin(character: &Character, forgiveness: f32) -> Vec2 {
    character.size * forgiveness
}

/// Does `body` touch the character (with forgiveness)?
pub fn character_hits<B: Body>(character: &Character, body: &B, forgiveness: f32) -> bool {
    overlaps(
        &character.aabb(),
        &body.aabb(),
        forgiveness_margin(character, forgiveness),
    )
}
