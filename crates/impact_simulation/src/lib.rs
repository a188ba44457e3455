//! Impact Simulation Core
//!
//! Real-time hit detection and projectile physics on Bevy 0.16.
//!
//! Layers:
//! - Pure core: `targets` (registry), `motion` (integrator), `blocking`
//!   (blockers, world casts, reflection), `projectiles` (simulator)
//! - ECS host: `components` + `systems::ImpactPlugin` (FixedUpdate pipeline)
//!
//! The core has no Bevy world dependency: hosts may drive
//! `ProjectileSimulator::update` directly once per frame.

use bevy::prelude::*;

pub mod blocking;
pub mod collision_layers;
pub mod components;
pub mod config;
pub mod logger;
pub mod math;
pub mod motion;
pub mod projectiles;
pub mod systems;
pub mod targets;

// Re-exports of the main types
pub use blocking::{
    BlockDecision, BlockHit, BlockHitHandler, Blocker, BlockerId, BlockerShape, FixedReflector,
    ParryWindowReflector, ReflectionSurface, StaticBox, StaticWorld, WorldCollision,
};
pub use components::*;
pub use config::{ConfigError, SimulationConfig};
pub use logger::{init_logger, log, log_error, log_info, log_warning, LogLevel, LogPrinter};
pub use motion::{LinearBody, LinearMotionIntegrator, MotionHooks, RemovalReason};
pub use projectiles::{
    FireConfig, FrameInput, MotionProfile, Projectile, ProjectileId, ProjectileLifecycle, ProjectileSimulator,
    SimulationEvent,
};
pub use systems::{
    BlockHandlerSlot, FireProjectile, ForceRemoveProjectile, ImpactPlugin, ImpactStats, MeleeAttackRequest,
    MeleeAttackResolved, VisualReleased,
};
pub use targets::{
    CombatTarget, CombatTargetHandle, CombatTargetRegistry, Hit, HitReaction, HitSource, HitVolume, MeleeSwing,
    RegistryError, SimpleTarget, TargetId,
};

/// Minimal Bevy App for headless simulation: 60 Hz FixedUpdate and
/// `ImpactPlugin` with fragment scatter seeded from `seed`.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();

    let config = SimulationConfig {
        seed,
        ..SimulationConfig::default()
    };

    app.add_plugins(MinimalPlugins)
        .insert_resource(Time::<Fixed>::from_hz(60.0)) // 60Hz FixedUpdate
        .add_plugins(ImpactPlugin::new(config));

    app
}

/// Byte snapshot of the simulator for determinism comparisons
/// (projectiles by id, then fragments in storage order).
pub fn simulation_snapshot(simulator: &ProjectileSimulator) -> Vec<u8> {
    let mut snapshot = Vec::new();

    let mut projectiles: Vec<_> = simulator.projectiles().iter().collect();
    projectiles.sort_by_key(|projectile| projectile.id);

    // Debug formatting is enough: f32 Debug output is exact
    for projectile in projectiles {
        snapshot.extend_from_slice(&projectile.id.0.to_le_bytes());
        snapshot.extend_from_slice(
            format!("{:?}{:?}{}", projectile.position, projectile.velocity, projectile.age).as_bytes(),
        );
    }
    for fragment in simulator.fragments() {
        snapshot.extend_from_slice(format!("{:?}{:?}", fragment.position, fragment.velocity).as_bytes());
    }

    snapshot
}
