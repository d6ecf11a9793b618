//! Ray picking of the topmost ball under a viewport point.
use bevy::prelude::*;

/// Nearest non-negative hit distance of a ray against a sphere. The ray
/// direction is unit length so the quadratic's `a` term is 1.
pub fn ray_sphere(ray: &Ray3d, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let d: Vec3 = *ray.direction;
    let b = oc.dot(d);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let t0 = -b - sqrt_disc;
    let t1 = -b + sqrt_disc;
    if t0 >= 0.0 {
        Some(t0)
    } else if t1 >= 0.0 {
        // origin inside the sphere
        Some(t1)
    } else {
        None
    }
}

/// Pick the ball owning the nearest ray intersection.
///
/// Candidates are `(entity, world_center, world_radius, visible)` in a
/// deterministic order; invisible balls never hit, and exact distance ties
/// keep the earlier candidate. If the overall nearest hit belongs to
/// `exclude` the pick yields `None` rather than falling through to the
/// next-nearest ball.
pub fn pick_ball<I>(ray: &Ray3d, candidates: I, exclude: Option<Entity>) -> Option<Entity>
where
    I: IntoIterator<Item = (Entity, Vec3, f32, bool)>,
{
    let mut best: Option<(Entity, f32)> = None;
    for (entity, center, radius, visible) in candidates {
        if !visible {
            continue;
        }
        let Some(t) = ray_sphere(ray, center, radius) else {
            continue;
        };
        if !t.is_finite() {
            continue;
        }
        match best {
            Some((_, best_t)) if t >= best_t => {}
            _ => best = Some((entity, t)),
        }
    }
    match best {
        Some((e, _)) if Some(e) == exclude => None,
        Some((e, _)) => Some(e),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ray_toward_neg_z(x: f32, y: f32) -> Ray3d {
        Ray3d {
            origin: Vec3::new(x, y, 100.0),
            direction: Dir3::NEG_Z,
        }
    }

    fn entity(index: u32) -> Entity {
        Entity::from_raw(index)
    }

    #[test]
    fn direct_hit_reports_distance() {
        let ray = ray_toward_neg_z(0.0, 0.0);
        let t = ray_sphere(&ray, Vec3::ZERO, 5.0).unwrap();
        assert!((t - 95.0).abs() < 1e-4);
    }

    #[test]
    fn graze_outside_radius_misses() {
        let ray = ray_toward_neg_z(6.0, 0.0);
        assert!(ray_sphere(&ray, Vec3::ZERO, 5.0).is_none());
    }

    #[test]
    fn sphere_behind_origin_misses() {
        let ray = ray_toward_neg_z(0.0, 0.0);
        assert!(ray_sphere(&ray, Vec3::new(0.0, 0.0, 200.0), 5.0).is_none());
    }

    #[test]
    fn origin_inside_sphere_hits_forward() {
        let ray = Ray3d {
            origin: Vec3::ZERO,
            direction: Dir3::NEG_Z,
        };
        let t = ray_sphere(&ray, Vec3::ZERO, 5.0).unwrap();
        assert!((t - 5.0).abs() < 1e-4);
    }

    #[test]
    fn nearest_ball_wins() {
        let ray = ray_toward_neg_z(0.0, 0.0);
        let picked = pick_ball(
            &ray,
            [
                (entity(1), Vec3::new(0.0, 0.0, -20.0), 5.0, true),
                (entity(2), Vec3::new(0.0, 0.0, 0.0), 5.0, true),
            ],
            None,
        );
        assert_eq!(picked, Some(entity(2)));
    }

    #[test]
    fn hidden_balls_are_never_picked() {
        let ray = ray_toward_neg_z(0.0, 0.0);
        let picked = pick_ball(
            &ray,
            [
                (entity(1), Vec3::ZERO, 5.0, false),
                (entity(2), Vec3::new(0.0, 0.0, -20.0), 5.0, true),
            ],
            None,
        );
        assert_eq!(picked, Some(entity(2)));
    }

    #[test]
    fn nearest_hit_on_excluded_ball_yields_none() {
        let ray = ray_toward_neg_z(0.0, 0.0);
        let picked = pick_ball(
            &ray,
            [
                (entity(1), Vec3::ZERO, 5.0, true),
                (entity(2), Vec3::new(0.0, 0.0, -20.0), 5.0, true),
            ],
            Some(entity(1)),
        );
        assert_eq!(picked, None);
    }

    #[test]
    fn exclude_of_farther_ball_does_not_block_nearest() {
        let ray = ray_toward_neg_z(0.0, 0.0);
        let picked = pick_ball(
            &ray,
            [
                (entity(1), Vec3::ZERO, 5.0, true),
                (entity(2), Vec3::new(0.0, 0.0, -20.0), 5.0, true),
            ],
            Some(entity(2)),
        );
        assert_eq!(picked, Some(entity(1)));
    }

    #[test]
    fn exact_tie_keeps_earlier_candidate() {
        let ray = ray_toward_neg_z(0.0, 0.0);
        let picked = pick_ball(
            &ray,
            [
                (entity(7), Vec3::ZERO, 5.0, true),
                (entity(8), Vec3::ZERO, 5.0, true),
            ],
            None,
        );
        assert_eq!(picked, Some(entity(7)));
    }

    #[test]
    fn empty_candidates_yield_none() {
        let ray = ray_toward_neg_z(0.0, 0.0);
        assert_eq!(pick_ball(&ray, [], None), None);
    }
}
