//! Circle-circle collision tests
//!
//! Every interaction in the game reduces to overlapping circles: bullets vs
//! snake heads, snake heads vs the player. The boundary case (circles exactly
//! touching) counts as a miss.

use glam::Vec2;

/// Strict circle overlap: colliding iff `d < r1 + r2`.
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let sum = ra + rb;
    (b - a).length_squared() < sum * sum
}

/// Contact damage a snake deals when it reaches the player: a fixed base
/// plus a term proportional to its radius, so big snakes hit harder.
#[inline]
pub fn contact_damage(radius: f32) -> f32 {
    crate::consts::CONTACT_DAMAGE_BASE + crate::consts::CONTACT_DAMAGE_PER_RADIUS * radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn overlapping_circles_collide() {
        assert!(circles_overlap(
            Vec2::new(0.0, 0.0),
            10.0,
            Vec2::new(15.0, 0.0),
            10.0
        ));
    }

    #[test]
    fn touching_circles_do_not_collide() {
        // d == r1 + r2 exactly
        assert!(!circles_overlap(
            Vec2::new(0.0, 0.0),
            10.0,
            Vec2::new(20.0, 0.0),
            10.0
        ));
    }

    #[test]
    fn separated_circles_do_not_collide() {
        assert!(!circles_overlap(
            Vec2::new(0.0, 0.0),
            5.0,
            Vec2::new(0.0, 50.0),
            5.0
        ));
    }

    #[test]
    fn contact_damage_scales_with_radius() {
        assert!(contact_damage(30.0) > contact_damage(10.0));
        assert_eq!(
            contact_damage(0.0),
            crate::consts::CONTACT_DAMAGE_BASE
        );
    }

    proptest! {
        #[test]
        fn overlap_matches_distance_predicate(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0,
            ra in 0.1f32..50.0, rb in 0.1f32..50.0,
        ) {
            let a = Vec2::new(ax, ay);
            let b = Vec2::new(bx, by);
            let expected = (b - a).length() < ra + rb;
            prop_assert_eq!(circles_overlap(a, ra, b, rb), expected);
        }
    }
}
