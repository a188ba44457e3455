//! Geometry helpers shared by target queries, blocking and reflection.
//!
//! All ray functions expect a unit `direction` and return the distance along
//! the ray (0 when the origin already sits inside the volume).

use bevy::prelude::*;

/// Forward vector used when a caller hands us a degenerate direction
/// (Bevy forward = -Z).
pub const DEFAULT_FORWARD: Vec3 = Vec3::NEG_Z;

/// Squared length below which a vector is treated as zero
const DEGENERATE_LENGTH_SQ: f32 = 1e-12;

/// Normalize `v`, falling back to `DEFAULT_FORWARD` for zero/NaN input.
pub fn safe_normalize(v: Vec3) -> Vec3 {
    safe_normalize_or(v, DEFAULT_FORWARD)
}

/// Normalize `v`, falling back to `fallback` for zero/NaN input.
pub fn safe_normalize_or(v: Vec3, fallback: Vec3) -> Vec3 {
    let length_sq = v.length_squared();
    if !length_sq.is_finite() || length_sq <= DEGENERATE_LENGTH_SQ {
        return fallback;
    }
    v / length_sq.sqrt()
}

/// Clamp to `[0, +inf)`; NaN becomes 0.
pub fn non_negative(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else if value == f32::INFINITY {
        f32::INFINITY
    } else {
        0.0
    }
}

/// Damage as applied to targets: rounded, at least `floor` (itself ≥ 1).
///
/// Returns `None` when `amount` is not a positive finite number.
pub fn round_damage(amount: f32, floor: u32) -> Option<u32> {
    if !amount.is_finite() || amount <= 0.0 {
        return None;
    }
    let rounded = amount.round().min(u32::MAX as f32) as u32;
    Some(rounded.max(floor.max(1)))
}

/// Ray vs sphere, analytic.
pub fn ray_sphere(origin: Vec3, direction: Vec3, center: Vec3, radius: f32, far: f32) -> Option<f32> {
    let radius = non_negative(radius);
    let m = origin - center;
    let c = m.length_squared() - radius * radius;
    if c <= 0.0 {
        // Origin inside the sphere
        return Some(0.0);
    }

    let b = m.dot(direction);
    if b > 0.0 {
        // Outside and pointing away
        return None;
    }

    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let t = -b - discriminant.sqrt();
    (t <= far).then_some(t.max(0.0))
}

/// Ray vs axis-aligned box (slab method). Returns distance and entry normal.
pub fn ray_aabb(origin: Vec3, direction: Vec3, min: Vec3, max: Vec3, far: f32) -> Option<(f32, Vec3)> {
    let mut t_min = 0.0_f32;
    let mut t_max = far;
    let mut normal = -direction;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        let (lo, hi) = (min[axis], max[axis]);

        if d.abs() < 1e-8 {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let mut t0 = (lo - o) * inv;
        let mut t1 = (hi - o) * inv;
        // Entering through the min face when travelling +axis
        let mut entry_sign = -1.0;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
            entry_sign = 1.0;
        }

        if t0 > t_min {
            t_min = t0;
            let mut axis_normal = Vec3::ZERO;
            axis_normal[axis] = entry_sign;
            normal = axis_normal;
        }
        t_max = t_max.min(t1);

        if t_min > t_max {
            return None;
        }
    }

    Some((t_min, normal))
}

/// Projection of `point` onto the ray, clamped to `[0, far]`.
///
/// Returns `(projected distance, distance from point to that ray point)`.
pub fn clamped_projection(origin: Vec3, direction: Vec3, point: Vec3, far: f32) -> (f32, f32) {
    let t = (point - origin).dot(direction).clamp(0.0, non_negative(far));
    let closest = origin + direction * t;
    (t, closest.distance(point))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_normalize_degenerate() {
        assert_eq!(safe_normalize(Vec3::ZERO), DEFAULT_FORWARD);
        assert_eq!(safe_normalize(Vec3::splat(f32::NAN)), DEFAULT_FORWARD);
        assert!((safe_normalize(Vec3::new(3.0, 0.0, 4.0)).length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_round_damage() {
        assert_eq!(round_damage(0.4, 1), Some(1)); // floor 1
        assert_eq!(round_damage(44.5, 1), Some(45));
        assert_eq!(round_damage(3.0, 5), Some(5));
        assert_eq!(round_damage(0.0, 1), None);
        assert_eq!(round_damage(-10.0, 1), None);
        assert_eq!(round_damage(f32::NAN, 1), None);
    }

    #[test]
    fn test_ray_sphere_analytic_distance() {
        // Sphere r=1 at z=-5, ray from origin toward -Z → hit at 4
        let t = ray_sphere(Vec3::ZERO, Vec3::NEG_Z, Vec3::new(0.0, 0.0, -5.0), 1.0, 100.0);
        assert!((t.unwrap() - 4.0).abs() < 1e-5);

        // Beyond far
        assert!(ray_sphere(Vec3::ZERO, Vec3::NEG_Z, Vec3::new(0.0, 0.0, -5.0), 1.0, 3.0).is_none());

        // Behind the origin
        assert!(ray_sphere(Vec3::ZERO, Vec3::Z, Vec3::new(0.0, 0.0, -5.0), 1.0, 100.0).is_none());

        // Inside
        assert_eq!(ray_sphere(Vec3::ZERO, Vec3::Z, Vec3::ZERO, 1.0, 100.0), Some(0.0));
    }

    #[test]
    fn test_ray_aabb_entry_normal() {
        let hit = ray_aabb(
            Vec3::new(-5.0, 0.5, 0.5),
            Vec3::X,
            Vec3::ZERO,
            Vec3::ONE,
            100.0,
        );
        let (t, normal) = hit.unwrap();
        assert!((t - 5.0).abs() < 1e-5);
        assert_eq!(normal, Vec3::NEG_X);

        // Parallel, outside slab
        assert!(ray_aabb(Vec3::new(-5.0, 2.0, 0.5), Vec3::X, Vec3::ZERO, Vec3::ONE, 100.0).is_none());
    }

    #[test]
    fn test_clamped_projection() {
        let (t, dist) = clamped_projection(Vec3::ZERO, Vec3::X, Vec3::new(3.0, 1.0, 0.0), 10.0);
        assert!((t - 3.0).abs() < 1e-6);
        assert!((dist - 1.0).abs() < 1e-6);

        // Behind → clamped to 0
        let (t, dist) = clamped_projection(Vec3::ZERO, Vec3::X, Vec3::new(-2.0, 0.0, 0.0), 10.0);
        assert_eq!(t, 0.0);
        assert!((dist - 2.0).abs() < 1e-6);
    }
}
