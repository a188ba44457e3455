//! Headless impact simulation
//!
//! Runs the Bevy App without rendering: a turret fires at a row of dummies,
//! one of which hides behind a reflecting shield.

use bevy::prelude::*;
use impact_simulation::{
    create_headless_app, BlockerShape, BlockerVolume, CombatTarget, CombatTargetBinding, CombatTargetRegistry,
    FireConfig, FireProjectile, FixedReflector, HitVolume, ImpactStats, MotionProfile, Reflector, SimpleTarget,
    StaticWorld, TargetId,
};

fn main() {
    let seed = 42;
    println!("Starting impact headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.insert_resource(StaticWorld::with_ground(-1.0));

    // Dummies at z = -10, spaced along x
    for index in 0..3u64 {
        let id = TargetId(index + 1);
        let position = Vec3::new(index as f32 * 3.0, 0.0, -10.0);
        let target = CombatTarget::new(id, HitVolume::sphere(position, 0.5), Box::new(SimpleTarget::new(100.0)))
            .with_label(format!("dummy-{}", index + 1));

        let registered = app.world_mut().resource_mut::<CombatTargetRegistry>().register(target);
        if let Err(err) = registered {
            eprintln!("Failed to register dummy: {}", err);
            return;
        }
        app.world_mut()
            .spawn((CombatTargetBinding(id), Transform::from_translation(position)));
    }

    // Shield in front of the last dummy
    app.world_mut().spawn((
        BlockerVolume::new(BlockerShape::sphere(Vec3::ZERO, 1.0)).with_owner(TargetId(3)),
        Reflector::new(FixedReflector { speed_multiplier: 0.8 }),
        Transform::from_xyz(6.0, 0.0, -8.0),
    ));

    let shooter = TargetId(100);
    for tick in 0..1000 {
        // Volley every second, one shot per dummy
        if tick % 60 == 0 {
            for index in 0..3 {
                let origin = Vec3::new(index as f32 * 3.0, 0.0, 0.0);
                let config = FireConfig::new()
                    .with_speed(20.0)
                    .with_owner(shooter)
                    .with_motion(MotionProfile::Straight)
                    .split_on_impact();
                app.world_mut().send_event(FireProjectile {
                    origin,
                    direction: Vec3::NEG_Z,
                    config,
                });
            }
        }

        app.update();

        if tick % 100 == 0 {
            let stats = app.world().resource::<ImpactStats>();
            println!(
                "Tick {}: {} fired, {} hits, {} reflections, {} explosions",
                tick, stats.fired, stats.target_hits, stats.reflections, stats.explosions
            );
        }
    }

    let registry = app.world().resource::<CombatTargetRegistry>();
    for target in registry.iter() {
        println!("{}: health {:.0}/{:.0}", target.id, target.health(), target.max_health());
    }

    println!("Simulation complete!");
}
