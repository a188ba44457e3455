//! Per-ability projectile behavior.
//!
//! `ProjectileLifecycle` is the capability interface abilities implement
//! (custom forces, early expiry, removal side effects). `MotionProfile` is the
//! data-only form of the common cases so it can travel inside `FireConfig`
//! (events, JSON ability tables).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::projectile::ProjectileId;
use crate::motion::{ForceOutcome, RemovalReason};
use crate::targets::{CombatTargetRegistry, TargetId};

/// Mutable view handed to `apply_forces`
pub struct ForceContext<'a> {
    pub id: ProjectileId,
    pub now: f32,
    pub delta: f32,
    pub age: f32,
    pub position: Vec3,
    pub velocity: &'a mut Vec3,
    /// Default gravity of the simulation
    pub gravity: Vec3,
    pub owner: Option<TargetId>,
    /// Read-only access for seeking behavior
    pub registry: &'a CombatTargetRegistry,
}

/// Snapshot handed to `should_expire`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpiryContext {
    pub id: ProjectileId,
    pub age: f32,
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Snapshot handed to `on_remove` (fires once per projectile)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemovalContext {
    pub id: ProjectileId,
    pub reason: RemovalReason,
    pub position: Vec3,
    pub velocity: Vec3,
    pub age: f32,
    /// Splash already went off
    pub exploded: bool,
}

pub trait ProjectileLifecycle: Send + Sync {
    /// Short tag for logs
    fn name(&self) -> &'static str {
        "custom"
    }

    /// `Declined` → default gravity this frame
    fn apply_forces(&mut self, _ctx: &mut ForceContext<'_>) -> ForceOutcome {
        ForceOutcome::Declined
    }

    fn should_expire(&self, _ctx: &ExpiryContext) -> bool {
        false
    }

    fn on_remove(&mut self, _ctx: &RemovalContext) {}
}

/// Built-in motion behaviors
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MotionProfile {
    /// No acceleration at all (energy bolts)
    Straight,
    /// Gravity scaled per ability (grenades, arcing shots)
    Ballistic { gravity_scale: f32 },
    /// Exponential slowdown, fizzles below `min_speed`
    Drag { coefficient: f32, min_speed: f32 },
    /// Turns toward the nearest target within `acquire_radius`
    Homing { turn_rate: f32, acquire_radius: f32 },
}

impl MotionProfile {
    pub fn into_lifecycle(self) -> Box<dyn ProjectileLifecycle> {
        match self {
            MotionProfile::Straight => Box::new(Straight),
            MotionProfile::Ballistic { gravity_scale } => Box::new(Ballistic { gravity_scale }),
            MotionProfile::Drag { coefficient, min_speed } => Box::new(Drag { coefficient, min_speed }),
            MotionProfile::Homing {
                turn_rate,
                acquire_radius,
            } => Box::new(Homing {
                turn_rate,
                acquire_radius,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Straight;

impl ProjectileLifecycle for Straight {
    fn name(&self) -> &'static str {
        "straight"
    }

    fn apply_forces(&mut self, _ctx: &mut ForceContext<'_>) -> ForceOutcome {
        ForceOutcome::Applied
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Ballistic {
    pub gravity_scale: f32,
}

impl ProjectileLifecycle for Ballistic {
    fn name(&self) -> &'static str {
        "ballistic"
    }

    fn apply_forces(&mut self, ctx: &mut ForceContext<'_>) -> ForceOutcome {
        if !self.gravity_scale.is_finite() {
            return ForceOutcome::Declined;
        }
        *ctx.velocity += ctx.gravity * self.gravity_scale * ctx.delta;
        ForceOutcome::Applied
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Drag {
    pub coefficient: f32,
    pub min_speed: f32,
}

impl ProjectileLifecycle for Drag {
    fn name(&self) -> &'static str {
        "drag"
    }

    fn apply_forces(&mut self, ctx: &mut ForceContext<'_>) -> ForceOutcome {
        let coefficient = if self.coefficient.is_finite() { self.coefficient.max(0.0) } else { 0.0 };
        let keep = (1.0 - coefficient * ctx.delta).max(0.0);
        *ctx.velocity *= keep;
        ForceOutcome::Applied
    }

    fn should_expire(&self, ctx: &ExpiryContext) -> bool {
        ctx.velocity.length() < self.min_speed
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Homing {
    /// Radians per second
    pub turn_rate: f32,
    pub acquire_radius: f32,
}

impl ProjectileLifecycle for Homing {
    fn name(&self) -> &'static str {
        "homing"
    }

    fn apply_forces(&mut self, ctx: &mut ForceContext<'_>) -> ForceOutcome {
        let speed = ctx.velocity.length();
        if speed <= f32::EPSILON {
            return ForceOutcome::Applied;
        }

        let Some(nearest) = ctx.registry.nearest_within(ctx.position, self.acquire_radius, ctx.owner) else {
            return ForceOutcome::Applied;
        };
        let Some(target) = ctx.registry.get(nearest.id) else {
            return ForceOutcome::Applied;
        };

        let current = *ctx.velocity / speed;
        let Some(desired) = (target.volume.center() - ctx.position).try_normalize() else {
            return ForceOutcome::Applied;
        };

        let max_turn = (self.turn_rate * ctx.delta).max(0.0);
        *ctx.velocity = rotate_toward(current, desired, max_turn) * speed;
        ForceOutcome::Applied
    }
}

/// Rotate unit `current` toward unit `desired` by at most `max_angle` radians
fn rotate_toward(current: Vec3, desired: Vec3, max_angle: f32) -> Vec3 {
    let angle = current.angle_between(desired);
    if !angle.is_finite() || angle <= max_angle {
        return desired;
    }

    let axis = current
        .cross(desired)
        .try_normalize()
        .unwrap_or_else(|| current.any_orthonormal_vector());
    Quat::from_axis_angle(axis, max_angle) * current
}
