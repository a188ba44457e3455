//! Notifications produced by `ProjectileSimulator::update`.
//!
//! Buffered inside the simulator and drained by the host (`ImpactPlugin`
//! forwards them as Bevy events for VFX/UI/audio).

use bevy::prelude::*;

use super::projectile::ProjectileId;
use crate::blocking::{BlockDecision, BlockerId};
use crate::motion::RemovalReason;
use crate::targets::TargetId;

#[derive(Event, Debug, Clone, PartialEq)]
pub enum SimulationEvent {
    Fired {
        projectile: ProjectileId,
        origin: Vec3,
        velocity: Vec3,
    },
    /// Direct damage delivered to a combat target
    TargetHit {
        projectile: ProjectileId,
        target: TargetId,
        damage: u32,
        point: Vec3,
    },
    /// Resource granted to the shooter for a direct hit
    EnergyGained {
        projectile: ProjectileId,
        owner: Option<TargetId>,
        amount: f32,
    },
    /// Ability-specific handler was consulted about a blocker hit
    BlockHandled {
        projectile: ProjectileId,
        blocker: BlockerId,
        decision: BlockDecision,
    },
    Reflected {
        projectile: ProjectileId,
        blocker: BlockerId,
        point: Vec3,
        velocity: Vec3,
        multiplier: f32,
    },
    /// Splash went off (at most once per projectile)
    Exploded {
        projectile: ProjectileId,
        center: Vec3,
        radius: f32,
        targets_hit: usize,
        color: Option<[f32; 4]>,
    },
    /// Terminal; exactly one per projectile
    ProjectileRemoved {
        projectile: ProjectileId,
        reason: RemovalReason,
        position: Vec3,
    },
}

impl SimulationEvent {
    pub fn projectile(&self) -> ProjectileId {
        match self {
            SimulationEvent::Fired { projectile, .. }
            | SimulationEvent::TargetHit { projectile, .. }
            | SimulationEvent::EnergyGained { projectile, .. }
            | SimulationEvent::BlockHandled { projectile, .. }
            | SimulationEvent::Reflected { projectile, .. }
            | SimulationEvent::Exploded { projectile, .. }
            | SimulationEvent::ProjectileRemoved { projectile, .. } => *projectile,
        }
    }
}
