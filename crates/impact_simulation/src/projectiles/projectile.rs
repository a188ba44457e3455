//! Projectile record + fire configuration.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::lifecycle::{MotionProfile, ProjectileLifecycle};
use super::pool::VisualHandle;
use crate::blocking::BlockerId;
use crate::motion::{LinearBody, RemovalReason};
use crate::targets::TargetId;

/// Unique id of a fired projectile (never reused by one simulator)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect, Serialize, Deserialize)]
pub struct ProjectileId(pub u64);

impl fmt::Display for ProjectileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "projectile#{}", self.0)
    }
}

/// Cosmetic overrides (renderer only, never read by gameplay)
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileCosmetics {
    /// RGBA 0..1; gives the projectile an exclusive material
    pub color: Option<[f32; 4]>,
    pub explosion_color: Option<[f32; 4]>,
    /// Visual size; also the collision radius unless `FireConfig::radius` is set
    pub visual_radius: Option<f32>,
}

/// Resolved splash parameters of one projectile
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct SplashConfig {
    pub radius: f32,
    pub damage: f32,
    /// Minimum damage per splashed target (≥ 1)
    pub min_damage: u32,
}

/// `fire()` options. Every field is optional; unset fields use
/// `SimulationConfig` defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireConfig {
    /// Units per second (default 18)
    pub speed: Option<f32>,
    /// Seconds (default 2.2)
    pub lifetime: Option<f32>,
    /// Collision radius (default: visual radius or 0.12)
    pub radius: Option<f32>,
    /// Larger swept radius against combat targets (oversized projectiles)
    pub target_hit_radius: f32,
    /// Direct damage (default `max(8, round(10 + speed × 0.6))`)
    pub damage: Option<f32>,
    pub energy_gain_on_hit: Option<f32>,
    pub split_on_impact: bool,
    pub explosion_radius: Option<f32>,
    pub explosion_damage: Option<f32>,
    pub explosion_min_damage: Option<u32>,
    pub cosmetics: ProjectileCosmetics,
    /// Shooter's own target id (never hit by this projectile)
    pub owner: Option<TargetId>,
    /// Detonate when a target comes this close after a move
    pub proximity_fuse: Option<f32>,
    /// Built-in force behavior (`None` → default gravity)
    pub motion: Option<MotionProfile>,
}

impl FireConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_lifetime(mut self, lifetime: f32) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn with_damage(mut self, damage: f32) -> Self {
        self.damage = Some(damage);
        self
    }

    pub fn with_owner(mut self, owner: TargetId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_motion(mut self, motion: MotionProfile) -> Self {
        self.motion = Some(motion);
        self
    }

    /// Splash on impact with default radius/damage
    pub fn split_on_impact(mut self) -> Self {
        self.split_on_impact = true;
        self
    }

    pub fn with_explosion(mut self, radius: f32, damage: f32) -> Self {
        self.explosion_radius = Some(radius);
        self.explosion_damage = Some(damage);
        self
    }

    pub fn with_proximity_fuse(mut self, distance: f32) -> Self {
        self.proximity_fuse = Some(distance);
        self
    }
}

/// One live projectile, exclusively owned by `ProjectileSimulator`.
pub struct Projectile {
    pub id: ProjectileId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub radius: f32,
    pub target_hit_radius: f32,
    pub age: f32,
    pub max_life: f32,
    /// Rounded direct damage; 0 → hits resolve without damage
    pub damage: u32,
    pub energy_gain: f32,
    pub owner: Option<TargetId>,
    pub splash: Option<SplashConfig>,
    pub proximity_fuse: Option<f32>,
    pub cosmetics: ProjectileCosmetics,
    pub visual: VisualHandle,
    pub reflections: u32,
    pub(crate) lifecycle: Option<Box<dyn ProjectileLifecycle>>,
    /// One-shot splash marker
    pub(crate) exploded: bool,
    pub(crate) pending_removal: Option<RemovalReason>,
    pub(crate) detonate_on_removal: bool,
    /// Blockers a handler let this projectile through
    pub(crate) ignored_blockers: Vec<BlockerId>,
}

impl Projectile {
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    pub fn exploded(&self) -> bool {
        self.exploded
    }

    pub fn is_pending_removal(&self) -> bool {
        self.pending_removal.is_some()
    }

    pub fn ignored_blockers(&self) -> &[BlockerId] {
        &self.ignored_blockers
    }

    pub fn lifecycle_name(&self) -> Option<&'static str> {
        self.lifecycle.as_ref().map(|lifecycle| lifecycle.name())
    }
}

impl LinearBody for Projectile {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn velocity_mut(&mut self) -> &mut Vec3 {
        &mut self.velocity
    }

    fn life(&self) -> f32 {
        self.age
    }

    fn add_life(&mut self, delta: f32) {
        self.age += delta;
    }

    fn max_life(&self) -> f32 {
        self.max_life
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn pending_removal(&self) -> Option<RemovalReason> {
        self.pending_removal
    }
}

impl fmt::Debug for Projectile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Projectile")
            .field("id", &self.id)
            .field("position", &self.position)
            .field("velocity", &self.velocity)
            .field("radius", &self.radius)
            .field("age", &self.age)
            .field("max_life", &self.max_life)
            .field("damage", &self.damage)
            .field("owner", &self.owner)
            .field("splash", &self.splash)
            .field("lifecycle", &self.lifecycle_name())
            .field("exploded", &self.exploded)
            .field("pending_removal", &self.pending_removal)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fire_config_from_json() {
        let config: FireConfig = serde_json::from_str(
            r#"{
                "speed": 30.0,
                "split_on_impact": true,
                "owner": 7,
                "motion": { "kind": "straight" },
                "cosmetics": { "color": [1.0, 0.5, 0.0, 1.0] }
            }"#,
        )
        .unwrap();

        assert_eq!(config.speed, Some(30.0));
        assert!(config.split_on_impact);
        assert_eq!(config.owner, Some(TargetId(7)));
        assert_eq!(config.motion, Some(MotionProfile::Straight));
        assert_eq!(config.cosmetics.color, Some([1.0, 0.5, 0.0, 1.0]));
        assert_eq!(config.lifetime, None);
    }
}
