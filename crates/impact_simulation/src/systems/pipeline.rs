//! FixedUpdate systems of `ImpactPlugin` (see the plugin for ordering).

use bevy::prelude::*;
use bevy_rapier3d::prelude::ReadRapierContext;

use super::{
    BlockHandlerSlot, FireProjectile, ForceRemoveProjectile, ImpactStats, MeleeAttackRequest, MeleeAttackResolved,
    VisualReleased,
};
use crate::blocking::{Blocker, BlockerId, NearestSurface, StaticWorld, WorldCollision};
use crate::collision_layers::{get_layer_name, COLLISION_LAYER_PROJECTILES, COLLISION_MASK_PROJECTILES};
use crate::components::{BlockerVolume, CombatTargetBinding, Reflector, WorldOnlyBlocker};
use crate::config::SimulationConfig;
use crate::logger;
use crate::projectiles::{FrameInput, ProjectileSimulator, SimulationEvent};
use crate::targets::CombatTargetRegistry;

/// System: push an edited `SimulationConfig` resource into the simulator.
/// Invalid edits are rejected and logged; the simulator keeps its tuning.
pub fn apply_config_changes(config: Res<SimulationConfig>, mut simulator: ResMut<ProjectileSimulator>) {
    if !config.is_changed() || config.is_added() {
        return;
    }

    match config.validate() {
        Ok(()) => {
            simulator.set_config(config.clone());
            logger::log_info("⚙️ SimulationConfig updated");
        }
        Err(err) => {
            logger::log_warning(&format!("⚠️ SimulationConfig rejected: {}", err));
        }
    }
}

/// System: registered volumes follow their entity's `Transform`
pub fn sync_target_volumes(
    mut registry: ResMut<CombatTargetRegistry>,
    targets: Query<(&CombatTargetBinding, &Transform), Changed<Transform>>,
) {
    for (binding, transform) in targets.iter() {
        let Some(volume) = registry.get(binding.0).map(|target| target.volume) else {
            continue;
        };
        registry.set_volume(binding.0, volume.recentered(transform.translation));
    }
}

/// System: MeleeAttackRequest → perform_melee_attack → MeleeAttackResolved
pub fn process_melee_requests(
    time: Res<Time>,
    mut requests: EventReader<MeleeAttackRequest>,
    mut resolved: EventWriter<MeleeAttackResolved>,
    mut registry: ResMut<CombatTargetRegistry>,
) {
    if requests.is_empty() {
        return;
    }

    registry.set_clock(time.elapsed_secs());
    for MeleeAttackRequest(swing) in requests.read() {
        let hits = registry.perform_melee_attack(swing);
        resolved.write(MeleeAttackResolved {
            attacker: swing.attacker,
            hits,
        });
    }
}

/// System: FireProjectile → ProjectileSimulator::fire
pub fn process_fire_requests(
    mut requests: EventReader<FireProjectile>,
    mut simulator: ResMut<ProjectileSimulator>,
    mut stats: ResMut<ImpactStats>,
) {
    for request in requests.read() {
        simulator.fire(request.origin, request.direction, &request.config);
        stats.fired += 1;
    }
}

/// System: ForceRemoveProjectile → ProjectileSimulator::force_remove
pub fn process_force_removals(
    mut requests: EventReader<ForceRemoveProjectile>,
    mut simulator: ResMut<ProjectileSimulator>,
) {
    for request in requests.read() {
        if !simulator.force_remove(request.projectile, request.detonate) {
            logger::log(&format!("ForceRemoveProjectile: {} not in flight", request.projectile));
        }
    }
}

/// System: one simulator step per fixed tick
///
/// 1. Snapshot ECS blockers (shape at Transform, reflector on self or parent)
/// 2. World = rapier scene (if any) + `StaticWorld`
/// 3. `update` with the installed block handler
/// 4. Forward events, released visuals and energy totals
#[allow(clippy::too_many_arguments)]
pub fn step_simulation(
    time: Res<Time>,
    mut simulator: ResMut<ProjectileSimulator>,
    mut registry: ResMut<CombatTargetRegistry>,
    static_world: Res<StaticWorld>,
    mut handler_slot: ResMut<BlockHandlerSlot>,
    mut stats: ResMut<ImpactStats>,
    blockers: Query<(
        Entity,
        &BlockerVolume,
        &Transform,
        Has<WorldOnlyBlocker>,
        Option<&Reflector>,
        Option<&ChildOf>,
    )>,
    reflectors: Query<&Reflector>,
    rapier_context: ReadRapierContext,
    mut simulation_events: EventWriter<SimulationEvent>,
    mut released_events: EventWriter<VisualReleased>,
    mut rapier_announced: Local<bool>,
) {
    let snapshot: Vec<Blocker> = blockers
        .iter()
        .map(|(entity, volume, transform, world_only, reflector, child_of)| {
            let mut blocker = Blocker::new(
                BlockerId(entity.to_bits()),
                volume.shape.recentered(transform.translation),
            );
            blocker.owner = volume.owner;
            if world_only {
                return blocker.world_only();
            }

            let reflector = reflector.or_else(|| child_of.and_then(|parent| reflectors.get(parent.parent()).ok()));
            match reflector {
                Some(reflector) => blocker.with_reflector(reflector.0.clone()),
                None => blocker,
            }
        })
        .collect();

    let rapier = rapier_context.single().ok();
    let mut sources: Vec<&dyn WorldCollision> = vec![&*static_world];
    if let Some(rapier) = rapier.as_ref() {
        if !*rapier_announced {
            *rapier_announced = true;
            logger::log_info(&format!(
                "🌍 Rapier world casts enabled: {} layer vs {} colliders",
                get_layer_name(COLLISION_LAYER_PROJECTILES),
                get_layer_name(COLLISION_MASK_PROJECTILES)
            ));
        }
        sources.push(rapier);
    }
    let world = NearestSurface(&sources);

    let mut frame = FrameInput::new(time.elapsed_secs(), time.delta_secs())
        .with_blockers(&snapshot)
        .with_world(&world);
    if let Some(handler) = handler_slot.0.as_deref_mut() {
        frame = frame.with_block_handler(handler);
    }

    simulator.update(&mut registry, frame);

    stats.ticks += 1;
    stats.energy_granted += simulator.take_energy();
    for event in simulator.drain_events() {
        match &event {
            SimulationEvent::TargetHit { .. } => stats.target_hits += 1,
            SimulationEvent::Exploded { .. } => stats.explosions += 1,
            SimulationEvent::Reflected { .. } => stats.reflections += 1,
            SimulationEvent::ProjectileRemoved { .. } => stats.removed += 1,
            _ => {}
        }
        simulation_events.write(event);
    }
    for resource in simulator.drain_released() {
        released_events.write(VisualReleased(resource));
    }
}
