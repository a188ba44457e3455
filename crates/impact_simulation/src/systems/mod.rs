//! ECS host for the hit-detection core.
//!
//! ECS ответственность:
//! - Resources: `CombatTargetRegistry`, `ProjectileSimulator`,
//!   `SimulationConfig`, `StaticWorld`, `BlockHandlerSlot`
//! - Requests in: `FireProjectile`, `MeleeAttackRequest`,
//!   `ForceRemoveProjectile`
//! - Notifications out: `SimulationEvent`, `MeleeAttackResolved`,
//!   `VisualReleased`
//!
//! Host ответственность (renderer, abilities):
//! - Spawning entities with `CombatTargetBinding` / `BlockerVolume`
//! - Drawing from `VisualReleased` and the simulator's pool handles

use bevy::prelude::*;

pub mod pipeline;

pub use pipeline::{
    apply_config_changes, process_fire_requests, process_force_removals, process_melee_requests, step_simulation,
    sync_target_volumes,
};

use crate::blocking::{BlockHitHandler, StaticWorld};
use crate::config::SimulationConfig;
use crate::projectiles::{FireConfig, ProjectileId, ProjectileSimulator, ReleasedResource, SimulationEvent};
use crate::targets::{CombatTargetRegistry, MeleeSwing, TargetId};

/// Request: spawn a projectile at the start of the next fixed tick
#[derive(Event, Debug, Clone)]
pub struct FireProjectile {
    pub origin: Vec3,
    pub direction: Vec3,
    pub config: FireConfig,
}

/// Request: resolve a melee swing against the registry
#[derive(Event, Debug, Clone, Copy)]
pub struct MeleeAttackRequest(pub MeleeSwing);

/// Result of a `MeleeAttackRequest`
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeleeAttackResolved {
    pub attacker: Option<TargetId>,
    pub hits: usize,
}

/// Request: remove a projectile (ability cancel, owner death)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForceRemoveProjectile {
    pub projectile: ProjectileId,
    pub detonate: bool,
}

/// Pooled visual resource the renderer may free
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualReleased(pub ReleasedResource);

/// Ability-specific blocker reaction for projectiles stepped by the plugin.
/// Empty slot = every blocker hit is `Declined`.
#[derive(Resource, Default)]
pub struct BlockHandlerSlot(pub Option<Box<dyn BlockHitHandler>>);

impl BlockHandlerSlot {
    pub fn new(handler: impl BlockHitHandler + 'static) -> Self {
        Self(Some(Box::new(handler)))
    }
}

/// Running totals for the headless host (debug output, tests)
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct ImpactStats {
    pub ticks: u64,
    pub fired: u64,
    pub removed: u64,
    pub target_hits: u64,
    pub explosions: u64,
    pub reflections: u64,
    pub energy_granted: f32,
}

/// Impact Plugin
///
/// Registers the hit-detection pipeline in FixedUpdate.
///
/// Execution order:
/// 1. apply_config_changes: push edited `SimulationConfig` into the simulator
/// 2. sync_target_volumes: Transform → registry volume
/// 3. process_melee_requests: MeleeAttackRequest → perform_melee_attack
/// 4. process_fire_requests: FireProjectile → fire
/// 5. process_force_removals: ForceRemoveProjectile → force_remove
/// 6. step_simulation: one `update` per tick, events forwarded
#[derive(Default)]
pub struct ImpactPlugin {
    pub config: SimulationConfig,
}

impl ImpactPlugin {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }
}

impl Plugin for ImpactPlugin {
    fn build(&self, app: &mut App) {
        // Ресурсы
        app.insert_resource(self.config.clone())
            .insert_resource(ProjectileSimulator::new(self.config.clone()))
            .init_resource::<CombatTargetRegistry>()
            .init_resource::<StaticWorld>()
            .init_resource::<BlockHandlerSlot>()
            .init_resource::<ImpactStats>();

        // Регистрация событий
        app.add_event::<FireProjectile>()
            .add_event::<MeleeAttackRequest>()
            .add_event::<MeleeAttackResolved>()
            .add_event::<ForceRemoveProjectile>()
            .add_event::<SimulationEvent>()
            .add_event::<VisualReleased>();

        app.add_systems(
            FixedUpdate,
            (
                // Фаза 1: tuning + target volumes
                apply_config_changes,
                sync_target_volumes,

                // Фаза 2: requests (melee резолвится сразу)
                process_melee_requests,
                process_fire_requests,
                process_force_removals,

                // Фаза 3: projectile step (один update на тик)
                step_simulation,
            )
                .chain(),
        );
    }
}
