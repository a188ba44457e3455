//! Impact integration test
//!
//! Drives the full `ImpactPlugin` pipeline in a headless App with a manual
//! 60 Hz clock: requests go in as events, results come out as events and
//! registry state.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use impact_simulation::systems::step_simulation;
use impact_simulation::*;

/// Everything the pipeline emitted, in order
#[derive(Resource, Default)]
struct Recorded {
    simulation: Vec<SimulationEvent>,
    melee: Vec<MeleeAttackResolved>,
}

fn record_events(
    mut recorded: ResMut<Recorded>,
    mut simulation: EventReader<SimulationEvent>,
    mut melee: EventReader<MeleeAttackResolved>,
) {
    recorded.simulation.extend(simulation.read().cloned());
    recorded.melee.extend(melee.read().copied());
}

/// Target that only records what it receives
struct RecordingTarget {
    hits: Arc<Mutex<Vec<Hit>>>,
}

impl CombatTargetHandle for RecordingTarget {
    fn health(&self) -> f32 {
        100.0
    }

    fn max_health(&self) -> f32 {
        100.0
    }

    fn on_hit(&mut self, hit: &Hit) -> HitReaction {
        self.hits.lock().unwrap().push(*hit);
        HitReaction::Keep
    }
}

/// Helper: headless App, one FixedUpdate tick per `update()`
fn create_test_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 60.0)))
        .init_resource::<Recorded>()
        .add_systems(FixedUpdate, record_events.after(step_simulation));

    // First update only initializes the clock
    app.update();
    app
}

fn run_ticks(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.update();
    }
}

fn register_recording_target(app: &mut App, id: TargetId, position: Vec3) -> Arc<Mutex<Vec<Hit>>> {
    let hits = Arc::new(Mutex::new(Vec::new()));
    let target = CombatTarget::new(
        id,
        HitVolume::sphere(position, 0.5),
        Box::new(RecordingTarget { hits: hits.clone() }),
    );
    app.world_mut()
        .resource_mut::<CombatTargetRegistry>()
        .register(target)
        .unwrap();
    hits
}

fn straight_shot(speed: f32) -> FireConfig {
    FireConfig::new().with_speed(speed).with_motion(MotionProfile::Straight)
}

fn fire(app: &mut App, origin: Vec3, direction: Vec3, config: FireConfig) {
    app.world_mut().send_event(FireProjectile {
        origin,
        direction,
        config,
    });
}

fn removals(app: &App) -> Vec<(ProjectileId, RemovalReason)> {
    app.world()
        .resource::<Recorded>()
        .simulation
        .iter()
        .filter_map(|event| match event {
            SimulationEvent::ProjectileRemoved { projectile, reason, .. } => Some((*projectile, *reason)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_fire_request_hits_registered_target() {
    let mut app = create_test_app(42);
    let hits = register_recording_target(&mut app, TargetId(1), Vec3::new(0.0, 0.0, -10.0));

    fire(&mut app, Vec3::ZERO, Vec3::NEG_Z, straight_shot(20.0));
    run_ticks(&mut app, 60);

    let hits = hits.lock().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].source, HitSource::Projectile);
    assert_eq!(hits[0].damage, 22);
    assert!(hits[0].time > 0.0);

    let recorded = app.world().resource::<Recorded>();
    assert!(recorded.simulation.iter().any(|event| matches!(
        event,
        SimulationEvent::TargetHit { target: TargetId(1), damage: 22, .. }
    )));
    assert_eq!(removals(&app).len(), 1);
    assert_eq!(removals(&app)[0].1, RemovalReason::Impact);

    let stats = app.world().resource::<ImpactStats>();
    assert_eq!(stats.fired, 1);
    assert_eq!(stats.target_hits, 1);
    assert!((stats.energy_granted - 4.0).abs() < 1e-5);
    assert!(app.world().resource::<ProjectileSimulator>().is_empty());
}

#[test]
fn test_reflector_on_parent_bounces_projectile() {
    let mut app = create_test_app(42);
    let hits = register_recording_target(&mut app, TargetId(1), Vec3::new(0.0, 0.0, -10.0));

    let shield_group = app
        .world_mut()
        .spawn(Reflector::new(FixedReflector { speed_multiplier: 0.5 }))
        .id();
    let shield = app
        .world_mut()
        .spawn((
            BlockerVolume::new(BlockerShape::sphere(Vec3::ZERO, 1.0)),
            Transform::from_xyz(0.0, 0.0, -6.0),
            ChildOf(shield_group),
        ))
        .id();

    fire(&mut app, Vec3::ZERO, Vec3::NEG_Z, straight_shot(20.0));
    run_ticks(&mut app, 30);

    let recorded = app.world().resource::<Recorded>();
    let reflected: Vec<_> = recorded
        .simulation
        .iter()
        .filter_map(|event| match event {
            SimulationEvent::Reflected { blocker, velocity, .. } => Some((*blocker, *velocity)),
            _ => None,
        })
        .collect();
    assert_eq!(reflected.len(), 1);
    assert_eq!(reflected[0].0, BlockerId(shield.to_bits()));
    assert!((reflected[0].1 - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-3);

    assert!(hits.lock().unwrap().is_empty());
    assert_eq!(app.world().resource::<ImpactStats>().reflections, 1);
}

#[test]
fn test_world_only_blocker_ignores_reflector() {
    let mut app = create_test_app(42);
    let hits = register_recording_target(&mut app, TargetId(1), Vec3::new(0.0, 0.0, -10.0));

    app.world_mut().spawn((
        BlockerVolume::new(BlockerShape::aabb(Vec3::ZERO, Vec3::new(2.0, 2.0, 0.5))),
        WorldOnlyBlocker,
        Reflector::new(FixedReflector { speed_multiplier: 1.0 }),
        Transform::from_xyz(0.0, 0.0, -5.0),
    ));

    fire(&mut app, Vec3::ZERO, Vec3::NEG_Z, straight_shot(20.0));
    run_ticks(&mut app, 30);

    assert!(hits.lock().unwrap().is_empty());
    assert_eq!(app.world().resource::<ImpactStats>().reflections, 0);
    assert_eq!(removals(&app), vec![(ProjectileId(1), RemovalReason::Impact)]);
}

#[test]
fn test_projectile_stops_on_static_ground() {
    let mut app = create_test_app(42);
    app.insert_resource(StaticWorld::with_ground(-1.0));

    fire(&mut app, Vec3::ZERO, Vec3::new(0.0, -1.0, -1.0), straight_shot(10.0));
    run_ticks(&mut app, 30);

    let recorded = app.world().resource::<Recorded>();
    let stop = recorded.simulation.iter().find_map(|event| match event {
        SimulationEvent::ProjectileRemoved { reason, position, .. } => Some((*reason, *position)),
        _ => None,
    });
    let (reason, position) = stop.unwrap();
    assert_eq!(reason, RemovalReason::Impact);
    assert!(position.y > -1.05);
}

#[test]
fn test_melee_request_damages_target() {
    let mut app = create_test_app(42);
    let target = CombatTarget::new(
        TargetId(7),
        HitVolume::sphere(Vec3::new(0.0, 0.0, -2.0), 0.5),
        Box::new(SimpleTarget::new(100.0)),
    );
    app.world_mut()
        .resource_mut::<CombatTargetRegistry>()
        .register(target)
        .unwrap();

    let swing = MeleeSwing::new(Vec3::ZERO, Vec3::NEG_Z, 30.0, 3.0).with_attacker(TargetId(1));
    app.world_mut().send_event(MeleeAttackRequest(swing));
    run_ticks(&mut app, 2);

    let recorded = app.world().resource::<Recorded>();
    assert_eq!(
        recorded.melee,
        vec![MeleeAttackResolved {
            attacker: Some(TargetId(1)),
            hits: 1
        }]
    );

    let registry = app.world().resource::<CombatTargetRegistry>();
    let health = registry.get(TargetId(7)).map(|target| target.health());
    assert_eq!(health, Some(70.0));
}

#[test]
fn test_force_removal_detonates_once() {
    let mut app = create_test_app(42);

    fire(&mut app, Vec3::ZERO, Vec3::NEG_Z, straight_shot(1.0).split_on_impact());
    run_ticks(&mut app, 5);

    app.world_mut().send_event(ForceRemoveProjectile {
        projectile: ProjectileId(1),
        detonate: true,
    });
    // Second request for the same projectile is a no-op
    app.world_mut().send_event(ForceRemoveProjectile {
        projectile: ProjectileId(1),
        detonate: true,
    });
    run_ticks(&mut app, 3);

    assert_eq!(removals(&app), vec![(ProjectileId(1), RemovalReason::Forced)]);
    assert_eq!(app.world().resource::<ImpactStats>().explosions, 1);
    assert_eq!(app.world().resource::<ProjectileSimulator>().fragments().len(), 10);
}

#[test]
fn test_target_volume_follows_transform() {
    let mut app = create_test_app(42);
    register_recording_target(&mut app, TargetId(3), Vec3::ZERO);
    let entity = app
        .world_mut()
        .spawn((CombatTargetBinding(TargetId(3)), Transform::default()))
        .id();
    run_ticks(&mut app, 2);

    app.world_mut()
        .get_mut::<Transform>(entity)
        .unwrap()
        .translation = Vec3::new(5.0, 0.0, 0.0);
    run_ticks(&mut app, 2);

    let registry = app.world().resource::<CombatTargetRegistry>();
    let center = registry.get(TargetId(3)).map(|target| target.volume.center());
    assert_eq!(center, Some(Vec3::new(5.0, 0.0, 0.0)));
}

#[test]
fn test_config_edits_reach_simulator() {
    let mut app = create_test_app(42);
    run_ticks(&mut app, 2);

    app.world_mut().resource_mut::<SimulationConfig>().default_speed = 30.0;
    run_ticks(&mut app, 2);
    assert_eq!(
        app.world().resource::<ProjectileSimulator>().config().default_speed,
        30.0
    );

    // Invalid edit is rejected, previous tuning stays
    app.world_mut().resource_mut::<SimulationConfig>().default_radius = -1.0;
    run_ticks(&mut app, 2);
    let simulator = app.world().resource::<ProjectileSimulator>();
    assert_eq!(simulator.config().default_speed, 30.0);
    assert!((simulator.config().default_radius - 0.12).abs() < 1e-6);
}
