//! Dynamic blockers: player-raised shields, deployable walls, decorative colliders.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::reflection::ReflectionSurface;
use crate::math::{non_negative, ray_aabb, ray_sphere, safe_normalize_or};
use crate::targets::TargetId;

/// Stable id of a blocker (ECS entity bits when driven by `ImpactPlugin`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect, Serialize, Deserialize)]
pub struct BlockerId(pub u64);

impl fmt::Display for BlockerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blocker#{}", self.0)
    }
}

/// Where a segment touched a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Distance along the segment
    pub distance: f32,
    pub point: Vec3,
    /// Outward unit normal at `point`
    pub normal: Vec3,
}

/// Blocker geometry in world space
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub enum BlockerShape {
    Sphere { center: Vec3, radius: f32 },
    Aabb { min: Vec3, max: Vec3 },
}

impl BlockerShape {
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self::Sphere {
            center,
            radius: non_negative(radius),
        }
    }

    /// Box from center + half extents
    pub fn aabb(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self::Aabb {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec3 {
        match *self {
            BlockerShape::Sphere { center, .. } => center,
            BlockerShape::Aabb { min, max } => (min + max) * 0.5,
        }
    }

    /// Point inside the shape grown by `inflate`
    pub fn contains(&self, point: Vec3, inflate: f32) -> bool {
        match *self {
            BlockerShape::Sphere { center, radius } => {
                let reach = radius + inflate;
                point.distance_squared(center) <= reach * reach
            }
            BlockerShape::Aabb { min, max } => {
                let grow = Vec3::splat(inflate);
                point.cmpge(min - grow).all() && point.cmple(max + grow).all()
            }
        }
    }

    /// Same shape moved so its center is at `center`
    pub fn recentered(&self, center: Vec3) -> Self {
        match *self {
            BlockerShape::Sphere { radius, .. } => BlockerShape::Sphere { center, radius },
            BlockerShape::Aabb { min, max } => {
                let half = (max - min) * 0.5;
                BlockerShape::Aabb {
                    min: center - half,
                    max: center + half,
                }
            }
        }
    }

    /// Ray test with the shape inflated by `inflate` (projectile radius).
    ///
    /// A ray starting inside the shape and heading away from its center is
    /// leaving it: no hit. Heading inward it is blocked at distance 0.
    pub fn ray_hit(&self, origin: Vec3, direction: Vec3, far: f32, inflate: f32) -> Option<SurfaceHit> {
        let inflate = non_negative(inflate);
        if self.contains(origin, inflate) && (origin - self.center()).dot(direction) >= 0.0 {
            return None;
        }

        match *self {
            BlockerShape::Sphere { center, radius } => {
                let distance = ray_sphere(origin, direction, center, radius + inflate, far)?;
                let point = origin + direction * distance;
                Some(SurfaceHit {
                    distance,
                    point,
                    normal: safe_normalize_or(point - center, -direction),
                })
            }
            BlockerShape::Aabb { min, max } => {
                let grow = Vec3::splat(inflate);
                let (distance, normal) = ray_aabb(origin, direction, min - grow, max + grow, far)?;
                Some(SurfaceHit {
                    distance,
                    point: origin + direction * distance,
                    normal,
                })
            }
        }
    }
}

/// One blocker as seen by a single `update` call
#[derive(Clone)]
pub struct Blocker {
    pub id: BlockerId,
    /// Whoever raised it (own projectiles pass through)
    pub owner: Option<TargetId>,
    pub shape: BlockerShape,
    /// Terrain-like: plain world collision, no block handler, no reflection
    pub world_only: bool,
    pub reflector: Option<Arc<dyn ReflectionSurface>>,
}

impl Blocker {
    pub fn new(id: BlockerId, shape: BlockerShape) -> Self {
        Self {
            id,
            owner: None,
            shape,
            world_only: false,
            reflector: None,
        }
    }

    pub fn with_owner(mut self, owner: TargetId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn world_only(mut self) -> Self {
        self.world_only = true;
        self
    }

    pub fn with_reflector(mut self, reflector: Arc<dyn ReflectionSurface>) -> Self {
        self.reflector = Some(reflector);
        self
    }
}

impl fmt::Debug for Blocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blocker")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("shape", &self.shape)
            .field("world_only", &self.world_only)
            .field("reflector", &self.reflector.is_some())
            .finish()
    }
}
