//! Hit value delivered to combat targets.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// What produced the hit (UI feedback, resistances on the receiving side)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum HitSource {
    /// Melee sweep (`perform_melee_attack`)
    Melee,
    /// Instant ray attack resolved by ability code
    Hitscan,
    /// Direct projectile impact
    Projectile,
    /// Splash damage from a detonation
    Explosion,
}

/// A single discrete collision event.
///
/// Lives only for the duration of the `on_hit` call that receives it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Simulation time (seconds) of the frame that produced the hit
    pub time: f32,
    pub source: HitSource,
    /// Rounded damage, always ≥ 1
    pub damage: u32,
    /// World-space impact point
    pub point: Vec3,
    /// Unit direction the hit travelled in
    pub direction: Vec3,
}

/// Target's answer to a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HitReaction {
    /// Stay registered
    #[default]
    Keep,
    /// Remove this entry from the registry (death, despawn)
    Remove,
}
