//! ReflectionPolicy: surfaces that send projectiles back instead of eating them.
//!
//! A reflector is an explicit capability (`Reflector` component on the
//! blocker entity or its parent), never an implicit search. On acceptance:
//!
//! ```text
//! multiplier = max(0.05, m)            (m defaults to 1.0, optional ceiling)
//! speed      = max(0.1, old_speed × multiplier)
//! velocity   = -incoming_direction × speed
//! position   = hit_point + new_direction × max(radius × 1.25, remaining travel)
//! ```

use bevy::prelude::*;

use crate::math::{non_negative, safe_normalize};

/// Smallest accepted speed multiplier
pub const MIN_REFLECTION_MULTIPLIER: f32 = 0.05;

/// Smallest speed a reflected projectile leaves with
pub const MIN_REFLECTED_SPEED: f32 = 0.1;

/// Push-out past the surface, in projectile radii
pub const REFLECTION_CLEARANCE: f32 = 1.25;

/// What the surface is told about the incoming projectile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReflectionQuery {
    pub time: f32,
    pub point: Vec3,
    /// Unit incoming direction
    pub direction: Vec3,
    pub speed: f32,
}

/// Surface's answer
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ReflectionResponse {
    #[default]
    Ignore,
    /// `None` → 1.0
    Reflect { speed_multiplier: Option<f32> },
}

/// Reflection capability attached to a blocker (or its owning group)
pub trait ReflectionSurface: Send + Sync {
    fn try_reflect(&self, query: &ReflectionQuery) -> ReflectionResponse;
}

/// Always reflects with a fixed multiplier (mirror walls, reflect totems)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedReflector {
    pub speed_multiplier: f32,
}

impl ReflectionSurface for FixedReflector {
    fn try_reflect(&self, _query: &ReflectionQuery) -> ReflectionResponse {
        ReflectionResponse::Reflect {
            speed_multiplier: Some(self.speed_multiplier),
        }
    }
}

/// Reflects only inside a time window (timed parry on a raised guard)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParryWindowReflector {
    pub opens_at: f32,
    pub closes_at: f32,
    pub speed_multiplier: f32,
}

impl ReflectionSurface for ParryWindowReflector {
    fn try_reflect(&self, query: &ReflectionQuery) -> ReflectionResponse {
        if query.time >= self.opens_at && query.time <= self.closes_at {
            ReflectionResponse::Reflect {
                speed_multiplier: Some(self.speed_multiplier),
            }
        } else {
            ReflectionResponse::Ignore
        }
    }
}

/// New kinematic state after a reflection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Redirect {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Multiplier actually applied (after floor/ceiling)
    pub multiplier: f32,
}

/// Clamp a surface-provided multiplier: `None`/NaN → 1.0, floor 0.05,
/// optional ceiling.
pub fn effective_multiplier(requested: Option<f32>, ceiling: Option<f32>) -> f32 {
    let requested = requested.filter(|m| !m.is_nan()).unwrap_or(1.0);
    let floored = requested.max(MIN_REFLECTION_MULTIPLIER);
    match ceiling {
        Some(ceiling) if ceiling.is_finite() => floored.min(ceiling.max(MIN_REFLECTION_MULTIPLIER)),
        _ => floored,
    }
}

/// Reflected state for a projectile that reached `hit_point` with `remaining`
/// travel left in the frame.
pub fn compute_redirect(
    query: &ReflectionQuery,
    radius: f32,
    remaining: f32,
    requested: Option<f32>,
    ceiling: Option<f32>,
) -> Redirect {
    let multiplier = effective_multiplier(requested, ceiling);
    let speed = (non_negative(query.speed) * multiplier).max(MIN_REFLECTED_SPEED);
    let direction = -safe_normalize(query.direction);
    let clearance = (non_negative(radius) * REFLECTION_CLEARANCE).max(non_negative(remaining));

    Redirect {
        position: query.point + direction * clearance,
        velocity: direction * speed,
        multiplier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(speed: f32) -> ReflectionQuery {
        ReflectionQuery {
            time: 1.0,
            point: Vec3::new(0.0, 0.0, -5.0),
            direction: Vec3::NEG_Z,
            speed,
        }
    }

    #[test]
    fn test_multiplier_floor_and_default() {
        assert_eq!(effective_multiplier(None, None), 1.0);
        assert_eq!(effective_multiplier(Some(0.0), None), MIN_REFLECTION_MULTIPLIER);
        assert_eq!(effective_multiplier(Some(-3.0), None), MIN_REFLECTION_MULTIPLIER);
        assert_eq!(effective_multiplier(Some(f32::NAN), None), 1.0);
        // Unbounded without a ceiling
        assert_eq!(effective_multiplier(Some(7.0), None), 7.0);
        assert_eq!(effective_multiplier(Some(7.0), Some(2.0)), 2.0);
    }

    #[test]
    fn test_redirect_reverses_and_scales_speed() {
        let redirect = compute_redirect(&query(20.0), 0.12, 0.0, Some(1.5), None);
        assert!((redirect.velocity - Vec3::new(0.0, 0.0, 30.0)).length() < 1e-4);
        // Pushed out by radius × 1.25 along the new direction
        assert!((redirect.position.z - (-5.0 + 0.15)).abs() < 1e-5);
    }

    #[test]
    fn test_redirect_minimum_speed() {
        let redirect = compute_redirect(&query(1.0), 0.12, 0.0, Some(0.05), None);
        assert!((redirect.velocity.length() - MIN_REFLECTED_SPEED).abs() < 1e-6);
    }

    #[test]
    fn test_redirect_covers_remaining_travel() {
        let redirect = compute_redirect(&query(20.0), 0.12, 2.0, None, None);
        assert!((redirect.position.z - (-3.0)).abs() < 1e-5);
    }

    #[test]
    fn test_parry_window() {
        let parry = ParryWindowReflector {
            opens_at: 0.5,
            closes_at: 0.8,
            speed_multiplier: 2.0,
        };
        assert_eq!(parry.try_reflect(&query(10.0)), ReflectionResponse::Ignore);

        let inside = ReflectionQuery { time: 0.6, ..query(10.0) };
        assert_eq!(
            parry.try_reflect(&inside),
            ReflectionResponse::Reflect {
                speed_multiplier: Some(2.0)
            }
        );
    }
}
