//! Static world collision sources.
//!
//! The blocking policy only needs "first surface along this segment", so the
//! world sits behind the narrow `WorldCollision` trait:
//! - `NoWorldCollision`: empty arena
//! - `StaticWorld`: ground plane + boxes, pure Rust (tests, headless runs)
//! - `RapierContext`: environment colliders of the rapier scene
//! - `NearestSurface`: nearest hit over several sources

use bevy::prelude::*;
use bevy_rapier3d::prelude::{QueryFilter, RapierContext};
use serde::{Deserialize, Serialize};

use super::blocker::SurfaceHit;
use crate::collision_layers::projectile_query_groups;
use crate::math::{non_negative, ray_aabb, safe_normalize};

/// First static surface along a ray
pub trait WorldCollision {
    /// `direction` is a unit vector; hits beyond `max_distance` are ignored
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<SurfaceHit>;
}

/// Nothing to hit
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWorldCollision;

impl WorldCollision for NoWorldCollision {
    fn cast(&self, _origin: Vec3, _direction: Vec3, _max_distance: f32) -> Option<SurfaceHit> {
        None
    }
}

/// Axis-aligned wall / obstacle
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct StaticBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl StaticBox {
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }
}

/// Arena geometry without a physics engine
#[derive(Resource, Debug, Clone, Default, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticWorld {
    /// Height of an infinite ground plane (normal +Y)
    pub ground_height: Option<f32>,
    pub boxes: Vec<StaticBox>,
}

impl StaticWorld {
    pub fn with_ground(height: f32) -> Self {
        Self {
            ground_height: Some(height),
            boxes: Vec::new(),
        }
    }

    pub fn add_box(&mut self, obstacle: StaticBox) {
        self.boxes.push(obstacle);
    }

    fn cast_ground(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<SurfaceHit> {
        let height = self.ground_height?;
        if origin.y < height {
            // Already under the ground
            return Some(SurfaceHit {
                distance: 0.0,
                point: origin,
                normal: Vec3::Y,
            });
        }
        if direction.y >= 0.0 {
            return None;
        }

        let distance = (origin.y - height) / -direction.y;
        (distance <= max_distance).then(|| SurfaceHit {
            distance,
            point: origin + direction * distance,
            normal: Vec3::Y,
        })
    }
}

impl WorldCollision for StaticWorld {
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<SurfaceHit> {
        let direction = safe_normalize(direction);
        let max_distance = non_negative(max_distance);

        let mut best = self.cast_ground(origin, direction, max_distance);
        for obstacle in &self.boxes {
            let Some((distance, normal)) = ray_aabb(origin, direction, obstacle.min, obstacle.max, max_distance) else {
                continue;
            };
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(SurfaceHit {
                    distance,
                    point: origin + direction * distance,
                    normal,
                });
            }
        }

        best
    }
}

/// Nearest hit over several sources; earlier sources win ties
pub struct NearestSurface<'a>(pub &'a [&'a dyn WorldCollision]);

impl WorldCollision for NearestSurface<'_> {
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<SurfaceHit> {
        let mut best: Option<SurfaceHit> = None;
        for source in self.0 {
            let Some(hit) = source.cast(origin, direction, max_distance) else {
                continue;
            };
            if best.map_or(true, |b| hit.distance < b.distance) {
                best = Some(hit);
            }
        }
        best
    }
}

/// Environment colliders of the rapier scene (sensors ignored)
impl WorldCollision for RapierContext<'_> {
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<SurfaceHit> {
        let filter = QueryFilter::new().exclude_sensors().groups(projectile_query_groups());
        let (_entity, hit) = self.cast_ray_and_get_normal(origin, direction, max_distance, true, filter)?;

        Some(SurfaceHit {
            distance: hit.point.distance(origin),
            point: hit.point,
            normal: hit.normal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_plane() {
        let world = StaticWorld::with_ground(0.0);
        let hit = world
            .cast(Vec3::new(0.0, 2.0, 0.0), Vec3::new(1.0, -1.0, 0.0), 10.0)
            .unwrap();
        assert!((hit.distance - 2.0 * 2f32.sqrt()).abs() < 1e-4);
        assert_eq!(hit.normal, Vec3::Y);

        // Upward ray never reaches it
        assert!(world.cast(Vec3::new(0.0, 2.0, 0.0), Vec3::Y, 10.0).is_none());
    }

    #[test]
    fn test_nearest_box_wins() {
        let mut world = StaticWorld::default();
        world.add_box(StaticBox::from_center(Vec3::new(8.0, 0.0, 0.0), Vec3::splat(0.5)));
        world.add_box(StaticBox::from_center(Vec3::new(4.0, 0.0, 0.0), Vec3::splat(0.5)));

        let hit = world.cast(Vec3::ZERO, Vec3::X, 20.0).unwrap();
        assert!((hit.distance - 3.5).abs() < 1e-4);
        assert_eq!(hit.normal, Vec3::NEG_X);
    }

    #[test]
    fn test_nearest_surface_combines_sources() {
        let far_wall = StaticWorld {
            ground_height: None,
            boxes: vec![StaticBox::from_center(Vec3::new(10.0, 0.0, 0.0), Vec3::splat(1.0))],
        };
        let near_wall = StaticWorld {
            ground_height: None,
            boxes: vec![StaticBox::from_center(Vec3::new(5.0, 0.0, 0.0), Vec3::splat(1.0))],
        };
        let sources: [&dyn WorldCollision; 3] = [&NoWorldCollision, &far_wall, &near_wall];

        let hit = NearestSurface(&sources).cast(Vec3::ZERO, Vec3::X, 50.0).unwrap();
        assert!((hit.distance - 4.0).abs() < 1e-4);
    }
}
