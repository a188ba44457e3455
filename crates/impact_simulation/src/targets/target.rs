//! Registry entry types: id, hittable volume, category and the handle trait.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::hit::{Hit, HitReaction};
use crate::math::{non_negative, ray_aabb, ray_sphere};

/// Stable id of a combat target (unique among live registry entries)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect, Serialize, Deserialize)]
pub struct TargetId(pub u64);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target#{}", self.0)
    }
}

/// UI category of a target (health bar style, boss frame)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum TargetCategory {
    #[default]
    Normal,
    Elite,
    Boss,
    Player,
    Summon,
}

/// World-space hittable volume of a target
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum HitVolume {
    Sphere { center: Vec3, radius: f32 },
    Aabb { min: Vec3, max: Vec3 },
}

impl HitVolume {
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

    /// Bounding sphere `(center, radius)` used by swept/radius queries
    pub fn bounding_sphere(&self) -> (Vec3, f32) {
        match *self {
            HitVolume::Sphere { center, radius } => (center, radius),
            HitVolume::Aabb { min, max } => {
                let center = (min + max) * 0.5;
                (center, (max - center).length())
            }
        }
    }

    pub fn center(&self) -> Vec3 {
        self.bounding_sphere().0
    }

    /// Move the volume so that its center lands on `center`
    pub fn recentered(&self, center: Vec3) -> Self {
        match *self {
            HitVolume::Sphere { radius, .. } => HitVolume::Sphere { center, radius },
            HitVolume::Aabb { min, max } => {
                let half = (max - min) * 0.5;
                HitVolume::Aabb {
                    min: center - half,
                    max: center + half,
                }
            }
        }
    }

    /// Exact ray test against the volume (unit direction)
    pub fn ray_distance(&self, origin: Vec3, direction: Vec3, far: f32) -> Option<f32> {
        match *self {
            HitVolume::Sphere { center, radius } => ray_sphere(origin, direction, center, radius, far),
            HitVolume::Aabb { min, max } => ray_aabb(origin, direction, min, max, far).map(|(t, _)| t),
        }
    }
}

/// Capability interface of a hittable entity.
///
/// Implemented by whatever owns the gameplay state (actor health, boss phase
/// logic, summon lifetime). The registry only calls into it.
pub trait CombatTargetHandle: Send + Sync {
    /// Inactive targets stay registered but are skipped by every query
    fn is_active(&self) -> bool {
        true
    }

    fn health(&self) -> f32;

    fn max_health(&self) -> f32;

    /// Called at most once per discrete collision event
    fn on_hit(&mut self, hit: &Hit) -> HitReaction;
}

/// One registry entry
pub struct CombatTarget {
    pub id: TargetId,
    pub volume: HitVolume,
    pub category: TargetCategory,
    pub label: String,
    pub handle: Box<dyn CombatTargetHandle>,
}

impl CombatTarget {
    pub fn new(id: TargetId, volume: HitVolume, handle: Box<dyn CombatTargetHandle>) -> Self {
        Self {
            id,
            volume,
            category: TargetCategory::Normal,
            label: String::new(),
            handle,
        }
    }

    pub fn with_category(mut self, category: TargetCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_active()
    }

    pub fn health(&self) -> f32 {
        self.handle.health()
    }

    pub fn max_health(&self) -> f32 {
        self.handle.max_health()
    }
}

impl fmt::Debug for CombatTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombatTarget")
            .field("id", &self.id)
            .field("volume", &self.volume)
            .field("category", &self.category)
            .field("label", &self.label)
            .field("active", &self.handle.is_active())
            .field("health", &self.handle.health())
            .finish()
    }
}

/// Plain health-pool target (training dummies, summons, tests).
///
/// Despawns itself from the registry on death when `remove_on_death` is set.
#[derive(Debug, Clone)]
pub struct SimpleTarget {
    pub health: f32,
    pub max_health: f32,
    pub active: bool,
    pub remove_on_death: bool,
}

impl SimpleTarget {
    pub fn new(max_health: f32) -> Self {
        let max_health = non_negative(max_health);
        Self {
            health: max_health,
            max_health,
            active: true,
            remove_on_death: true,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

impl CombatTargetHandle for SimpleTarget {
    fn is_active(&self) -> bool {
        self.active && self.is_alive()
    }

    fn health(&self) -> f32 {
        self.health
    }

    fn max_health(&self) -> f32 {
        self.max_health
    }

    fn on_hit(&mut self, hit: &Hit) -> HitReaction {
        self.health = (self.health - hit.damage as f32).max(0.0);

        if self.remove_on_death && !self.is_alive() {
            HitReaction::Remove
        } else {
            HitReaction::Keep
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::HitSource;

    #[test]
    fn test_aabb_bounding_sphere() {
        let volume = HitVolume::aabb(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 2.0, 2.0));
        let (center, radius) = volume.bounding_sphere();
        assert_eq!(center, Vec3::new(1.0, 2.0, 3.0));
        assert!((radius - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_recentered_keeps_size() {
        let volume = HitVolume::aabb(Vec3::ZERO, Vec3::ONE).recentered(Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(
            volume,
            HitVolume::Aabb {
                min: Vec3::new(4.0, -1.0, -1.0),
                max: Vec3::new(6.0, 1.0, 1.0),
            }
        );
    }

    #[test]
    fn test_simple_target_dies() {
        let mut target = SimpleTarget::new(30.0);
        let hit = Hit {
            time: 0.0,
            source: HitSource::Melee,
            damage: 20,
            point: Vec3::ZERO,
            direction: Vec3::X,
        };

        assert_eq!(target.on_hit(&hit), HitReaction::Keep);
        assert_eq!(target.health, 10.0);
        assert_eq!(target.on_hit(&hit), HitReaction::Remove);
        assert_eq!(target.health, 0.0);
        assert!(!target.is_active());
    }
}
