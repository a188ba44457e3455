//! ProjectileSimulator: owns projectiles, fragments and their visuals.
//!
//! # Frame
//!
//! `update(registry, frame)` once per host tick:
//! 1. clamp delta, stamp the registry clock
//! 2. `LinearMotionIntegrator::advance` over projectiles (newest first) with
//!    `FrameHooks`: forces → segment → blocking policy → reflection / damage /
//!    splash → expiry → proximity fuse
//! 3. advance explosion fragments (gravity only)
//!
//! # Idempotence
//!
//! - a projectile leaves the collection exactly once → one `on_remove`
//! - splash is gated by the per-projectile `exploded` marker
//! - a projectile resolves at most one target hit (the hit removes it)

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::events::SimulationEvent;
use super::fragments::{ExplosionFragment, FragmentHooks};
use super::lifecycle::{ExpiryContext, ForceContext, ProjectileLifecycle, RemovalContext};
use super::pool::{ReleasedResource, VisualPool};
use super::projectile::{FireConfig, Projectile, ProjectileId, SplashConfig};
use crate::blocking::{
    compute_redirect, resolve_segment, BlockDecision, BlockHit, BlockHitHandler, Blocker, BlockingHit,
    NoWorldCollision, ReflectionQuery, ReflectionResponse, SegmentQuery, SurfaceHit, WorldCollision,
};
use crate::config::SimulationConfig;
use crate::logger;
use crate::math::{non_negative, round_damage, safe_normalize};
use crate::motion::{
    ForceOutcome, LinearMotionIntegrator, MotionHooks, RemovalReason, TravelOutcome, TravelSegment,
};
use crate::targets::{CombatTargetRegistry, Hit, HitSource, TargetHit, TargetId};

/// Default direct damage: `max(8, round(10 + speed × 0.6))`
pub fn default_projectile_damage(speed: f32) -> u32 {
    let damage = (10.0 + non_negative(speed) * 0.6).round();
    (damage.min(u32::MAX as f32) as u32).max(8)
}

/// Everything one `update` call needs from the host
pub struct FrameInput<'a> {
    pub now: f32,
    pub delta: f32,
    pub blockers: &'a [Blocker],
    pub block_handler: Option<&'a mut dyn BlockHitHandler>,
    pub world: &'a dyn WorldCollision,
}

impl<'a> FrameInput<'a> {
    pub fn new(now: f32, delta: f32) -> Self {
        Self {
            now,
            delta,
            blockers: &[],
            block_handler: None,
            world: &NoWorldCollision,
        }
    }

    pub fn with_blockers(mut self, blockers: &'a [Blocker]) -> Self {
        self.blockers = blockers;
        self
    }

    pub fn with_block_handler(mut self, handler: &'a mut dyn BlockHitHandler) -> Self {
        self.block_handler = Some(handler);
        self
    }

    pub fn with_world(mut self, world: &'a dyn WorldCollision) -> Self {
        self.world = world;
        self
    }
}

#[derive(Resource)]
pub struct ProjectileSimulator {
    config: SimulationConfig,
    integrator: LinearMotionIntegrator,
    projectiles: Vec<Projectile>,
    fragments: Vec<ExplosionFragment>,
    pool: VisualPool,
    rng: ChaCha8Rng,
    next_id: u64,
    events: Vec<SimulationEvent>,
    /// Energy granted since the last `take_energy`
    energy: f32,
}

impl Default for ProjectileSimulator {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl ProjectileSimulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            integrator: LinearMotionIntegrator::new(config.gravity, config.travel_epsilon),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            projectiles: Vec::new(),
            fragments: Vec::new(),
            pool: VisualPool::new(),
            next_id: 0,
            events: Vec::new(),
            energy: 0.0,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Swap tuning (live projectiles keep their resolved parameters)
    pub fn set_config(&mut self, config: SimulationConfig) {
        self.integrator = LinearMotionIntegrator::new(config.gravity, config.travel_epsilon);
        self.config = config;
    }

    // ------------------------------------------------------------------------
    // Fire
    // ------------------------------------------------------------------------

    /// Spawn a projectile; its force behavior comes from `config.motion`.
    pub fn fire(&mut self, origin: Vec3, direction: Vec3, config: &FireConfig) -> ProjectileId {
        let lifecycle = config.motion.map(|profile| profile.into_lifecycle());
        self.spawn(origin, direction, config, lifecycle)
    }

    /// Spawn a projectile with ability-specific hooks (overrides `config.motion`).
    pub fn fire_with_lifecycle(
        &mut self,
        origin: Vec3,
        direction: Vec3,
        config: &FireConfig,
        lifecycle: Box<dyn ProjectileLifecycle>,
    ) -> ProjectileId {
        self.spawn(origin, direction, config, Some(lifecycle))
    }

    fn spawn(
        &mut self,
        origin: Vec3,
        direction: Vec3,
        config: &FireConfig,
        lifecycle: Option<Box<dyn ProjectileLifecycle>>,
    ) -> ProjectileId {
        self.next_id += 1;
        let id = ProjectileId(self.next_id);

        let origin = if origin.is_finite() {
            origin
        } else {
            logger::log_warning(&format!("⚠️ {} fired from non-finite origin {:?}, using zero", id, origin));
            Vec3::ZERO
        };

        let defaults = &self.config;
        let speed = config.speed.map(non_negative).unwrap_or(defaults.default_speed);
        let lifetime = config.lifetime.map(non_negative).unwrap_or(defaults.default_lifetime);
        let radius = config
            .radius
            .or(config.cosmetics.visual_radius)
            .map(non_negative)
            .unwrap_or(defaults.default_radius);
        let damage = match config.damage {
            Some(amount) => round_damage(amount, 1).unwrap_or(0),
            None => default_projectile_damage(speed),
        };
        let energy_gain = config
            .energy_gain_on_hit
            .map(non_negative)
            .unwrap_or(defaults.energy_gain_on_hit);

        let splash = self.resolve_splash(config, damage);
        let visual = self.pool.acquire(
            config.cosmetics.visual_radius.map(non_negative).unwrap_or(radius),
            config.cosmetics.color,
        );
        let velocity = safe_normalize(direction) * speed;

        logger::log(&format!(
            "🚀 Fired {} from {:?}: speed {:.1}, damage {}, splash {:?}, motion {}",
            id,
            origin,
            speed,
            damage,
            splash.map(|s| s.radius),
            lifecycle.as_ref().map_or("gravity", |l| l.name())
        ));

        self.projectiles.push(Projectile {
            id,
            position: origin,
            velocity,
            radius,
            target_hit_radius: non_negative(config.target_hit_radius),
            age: 0.0,
            max_life: lifetime,
            damage,
            energy_gain,
            owner: config.owner,
            splash,
            proximity_fuse: config.proximity_fuse.map(non_negative).filter(|d| *d > 0.0),
            cosmetics: config.cosmetics,
            visual,
            reflections: 0,
            lifecycle,
            exploded: false,
            pending_removal: None,
            detonate_on_removal: false,
            ignored_blockers: Vec::new(),
        });
        self.events.push(SimulationEvent::Fired {
            projectile: id,
            origin,
            velocity,
        });

        id
    }

    fn resolve_splash(&self, config: &FireConfig, damage: u32) -> Option<SplashConfig> {
        let explicit_radius = config.explosion_radius.map(non_negative).filter(|r| *r > 0.0);
        if !config.split_on_impact && explicit_radius.is_none() {
            return None;
        }

        let radius = explicit_radius.unwrap_or(self.config.splash_radius);
        let damage = config
            .explosion_damage
            .map(non_negative)
            .filter(|d| *d > 0.0)
            .unwrap_or_else(|| (damage as f32 * self.config.splash_damage_factor).round());
        let min_damage = config
            .explosion_min_damage
            .unwrap_or(self.config.splash_min_damage)
            .max(1);

        Some(SplashConfig {
            radius,
            damage,
            min_damage,
        })
    }

    // ------------------------------------------------------------------------
    // Frame
    // ------------------------------------------------------------------------

    /// Advance everything by one host tick. Returns how many projectiles
    /// were removed this frame.
    pub fn update(&mut self, registry: &mut CombatTargetRegistry, frame: FrameInput<'_>) -> usize {
        let delta = if frame.delta.is_finite() {
            frame.delta.clamp(0.0, self.config.max_frame_delta)
        } else {
            0.0
        };
        registry.set_clock(frame.now);

        let Self {
            config,
            integrator,
            projectiles,
            fragments,
            pool,
            rng,
            events,
            energy,
            ..
        } = self;

        let mut hooks = FrameHooks {
            config,
            registry,
            pool,
            fragments: &mut *fragments,
            rng,
            events,
            energy,
            blockers: frame.blockers,
            block_handler: frame.block_handler,
            world: frame.world,
            now: frame.now,
        };
        let removed = integrator.advance(projectiles, frame.now, delta, &mut hooks);

        integrator.advance(fragments, frame.now, delta, &mut FragmentHooks);

        removed
    }

    /// Mark a projectile for removal with reason `Forced` on its next visit.
    /// `detonate` also fires its splash (once). False for unknown ids.
    pub fn force_remove(&mut self, id: ProjectileId, detonate: bool) -> bool {
        let Some(projectile) = self.projectiles.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        if projectile.pending_removal.is_some() {
            return false;
        }

        projectile.pending_removal = Some(RemovalReason::Forced);
        projectile.detonate_on_removal = detonate;
        logger::log(&format!("🛑 {} marked for forced removal (detonate: {})", id, detonate));
        true
    }

    /// Remove every projectile and fragment, release all pooled resources.
    /// Safe to call any number of times.
    pub fn dispose(&mut self) {
        let count = self.projectiles.len();

        while let Some(mut projectile) = self.projectiles.pop() {
            notify_removed(&mut projectile, RemovalReason::Cleared, &mut self.events);
            self.pool.release(&projectile.visual);
        }
        self.fragments.clear();
        self.pool.release_all();

        if count > 0 {
            logger::log_info(&format!("🧹 ProjectileSimulator disposed ({} projectiles)", count));
        }
    }

    // ------------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------------

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.projectiles.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    pub fn fragments(&self) -> &[ExplosionFragment] {
        &self.fragments
    }

    pub fn pool(&self) -> &VisualPool {
        &self.pool
    }

    pub fn drain_events(&mut self) -> Vec<SimulationEvent> {
        std::mem::take(&mut self.events)
    }

    /// Energy granted by direct hits since the last call
    pub fn take_energy(&mut self) -> f32 {
        std::mem::take(&mut self.energy)
    }

    /// Render resources nobody references anymore
    pub fn drain_released(&mut self) -> Vec<ReleasedResource> {
        self.pool.drain_released()
    }
}

/// Lifecycle `on_remove` + terminal event. Called exactly once per projectile.
fn notify_removed(projectile: &mut Projectile, reason: RemovalReason, events: &mut Vec<SimulationEvent>) {
    let ctx = RemovalContext {
        id: projectile.id,
        reason,
        position: projectile.position,
        velocity: projectile.velocity,
        age: projectile.age,
        exploded: projectile.exploded,
    };
    if let Some(lifecycle) = projectile.lifecycle.as_mut() {
        lifecycle.on_remove(&ctx);
    }

    events.push(SimulationEvent::ProjectileRemoved {
        projectile: projectile.id,
        reason,
        position: projectile.position,
    });
    logger::log(&format!(
        "💨 {} removed: {:?} at {:?} (age {:.2}s)",
        projectile.id, reason, projectile.position, projectile.age
    ));
}

/// Per-frame view over the simulator + host input (disjoint borrows)
struct FrameHooks<'s, 'f> {
    config: &'s SimulationConfig,
    registry: &'s mut CombatTargetRegistry,
    pool: &'s mut VisualPool,
    fragments: &'s mut Vec<ExplosionFragment>,
    rng: &'s mut ChaCha8Rng,
    events: &'s mut Vec<SimulationEvent>,
    energy: &'s mut f32,
    blockers: &'f [Blocker],
    block_handler: Option<&'f mut dyn BlockHitHandler>,
    world: &'f dyn WorldCollision,
    now: f32,
}

impl FrameHooks<'_, '_> {
    /// Direct hit: damage + energy, then splash around the victim (excluded).
    fn hit_target(&mut self, projectile: &mut Projectile, hit: TargetHit, direction: Vec3) {
        projectile.position = hit.point;

        if projectile.damage > 0 {
            let delivered = self.registry.apply_hit(
                hit.id,
                Hit {
                    time: self.registry.clock(),
                    source: HitSource::Projectile,
                    damage: projectile.damage,
                    point: hit.point,
                    direction,
                },
            );

            if delivered {
                self.events.push(SimulationEvent::TargetHit {
                    projectile: projectile.id,
                    target: hit.id,
                    damage: projectile.damage,
                    point: hit.point,
                });
                logger::log(&format!(
                    "💥 {} hit {} for {} at {:?}",
                    projectile.id, hit.id, projectile.damage, hit.point
                ));

                if projectile.energy_gain > 0.0 {
                    *self.energy += projectile.energy_gain;
                    self.events.push(SimulationEvent::EnergyGained {
                        projectile: projectile.id,
                        owner: projectile.owner,
                        amount: projectile.energy_gain,
                    });
                }
            }
        }

        self.detonate(projectile, hit.point, Some(hit.id));
    }

    /// Generic stop at a surface (+ splash if configured)
    fn stop_at(&mut self, projectile: &mut Projectile, surface: &SurfaceHit) -> TravelOutcome {
        projectile.position = surface.point;
        self.detonate(projectile, surface.point, None);
        TravelOutcome::Remove(RemovalReason::Impact)
    }

    /// One-shot splash: fragments + one `apply_explosion_damage` call.
    fn detonate(&mut self, projectile: &mut Projectile, center: Vec3, exclude: Option<TargetId>) {
        if projectile.exploded {
            return;
        }
        let Some(splash) = projectile.splash else {
            return;
        };
        projectile.exploded = true;

        let targets_hit = self.registry.apply_explosion_damage_with_floor(
            center,
            splash.radius,
            splash.damage,
            projectile.velocity,
            exclude,
            splash.min_damage,
        );
        let color = projectile.cosmetics.explosion_color.or(projectile.cosmetics.color);
        self.spawn_fragments(center, color);

        self.events.push(SimulationEvent::Exploded {
            projectile: projectile.id,
            center,
            radius: splash.radius,
            targets_hit,
            color,
        });
        logger::log(&format!(
            "🔥 {} exploded at {:?}: radius {:.1}, {} targets",
            projectile.id, center, splash.radius, targets_hit
        ));
    }

    fn spawn_fragments(&mut self, center: Vec3, color: Option<[f32; 4]>) {
        let count = self.config.fragment_count;
        let max = self.config.max_fragments;
        if count == 0 || max == 0 {
            return;
        }

        // Oldest fragments make room
        let overflow = (self.fragments.len() + count).saturating_sub(max);
        let overflow = overflow.min(self.fragments.len());
        self.fragments.drain(..overflow);

        for _ in 0..count.min(max) {
            let mut fragment = ExplosionFragment::scatter(
                &mut *self.rng,
                center,
                self.config.fragment_speed,
                self.config.fragment_lifetime,
                self.config.fragment_radius,
            );
            fragment.color = color;
            self.fragments.push(fragment);
        }
    }

    /// Blocker reached: handler → reflection → generic stop.
    fn hit_blocker(
        &mut self,
        projectile: &mut Projectile,
        blocker: &Blocker,
        surface: &SurfaceHit,
        segment: &TravelSegment,
    ) -> Option<TravelOutcome> {
        let speed = projectile.velocity.length();

        if let Some(handler) = self.block_handler.as_deref_mut() {
            let decision = handler.handle_block_hit(&BlockHit {
                time: self.now,
                projectile: projectile.id,
                shooter: projectile.owner,
                blocker: blocker.id,
                blocker_owner: blocker.owner,
                point: surface.point,
                normal: surface.normal,
                direction: segment.direction,
                speed,
                damage: projectile.damage,
            });
            self.events.push(SimulationEvent::BlockHandled {
                projectile: projectile.id,
                blocker: blocker.id,
                decision,
            });

            match decision {
                BlockDecision::Declined => {}
                BlockDecision::Absorbed => {
                    logger::log(&format!("🛡️ {} absorbed by {}", projectile.id, blocker.id));
                    projectile.position = surface.point;
                    return Some(TravelOutcome::Remove(RemovalReason::Impact));
                }
                BlockDecision::Detonated => {
                    return Some(self.stop_at(projectile, surface));
                }
                BlockDecision::PassThrough => {
                    projectile.ignored_blockers.push(blocker.id);
                    // Re-resolve the segment without this blocker
                    return None;
                }
            }
        }

        if let Some(reflector) = blocker.reflector.as_ref() {
            let query = ReflectionQuery {
                time: self.now,
                point: surface.point,
                direction: segment.direction,
                speed,
            };

            if let ReflectionResponse::Reflect { speed_multiplier } = reflector.try_reflect(&query) {
                let remaining = (segment.distance - surface.distance).max(0.0);
                let redirect = compute_redirect(
                    &query,
                    projectile.radius,
                    remaining,
                    speed_multiplier,
                    self.config.max_reflection_multiplier,
                );

                projectile.position = redirect.position;
                projectile.velocity = redirect.velocity;
                projectile.reflections += 1;
                // Reflected shots belong to whoever reflected them; an
                // ownerless mirror leaves them ownerless
                projectile.owner = blocker.owner;

                self.events.push(SimulationEvent::Reflected {
                    projectile: projectile.id,
                    blocker: blocker.id,
                    point: surface.point,
                    velocity: redirect.velocity,
                    multiplier: redirect.multiplier,
                });
                logger::log(&format!(
                    "🪞 {} reflected by {}: ×{:.2} → speed {:.1}",
                    projectile.id,
                    blocker.id,
                    redirect.multiplier,
                    redirect.velocity.length()
                ));
                return Some(TravelOutcome::Redirected);
            }
        }

        Some(self.stop_at(projectile, surface))
    }
}

impl MotionHooks<Projectile> for FrameHooks<'_, '_> {
    fn apply_forces(&mut self, projectile: &mut Projectile, now: f32, delta: f32) -> ForceOutcome {
        let Some(lifecycle) = projectile.lifecycle.as_mut() else {
            return ForceOutcome::Declined;
        };

        let mut velocity = projectile.velocity;
        let outcome = lifecycle.apply_forces(&mut ForceContext {
            id: projectile.id,
            now,
            delta,
            age: projectile.age,
            position: projectile.position,
            velocity: &mut velocity,
            gravity: self.config.gravity,
            owner: projectile.owner,
            registry: &*self.registry,
        });
        projectile.velocity = velocity;
        outcome
    }

    fn on_travel(&mut self, projectile: &mut Projectile, segment: &TravelSegment) -> TravelOutcome {
        loop {
            let query = SegmentQuery {
                origin: segment.origin,
                direction: segment.direction,
                distance: segment.distance,
                radius: projectile.radius,
                target_radius: projectile.radius.max(projectile.target_hit_radius),
                owner: projectile.owner,
                ignored_blockers: &projectile.ignored_blockers,
            };
            let blocking = resolve_segment(&*self.registry, self.world, self.blockers, &query);

            match blocking {
                None => return TravelOutcome::Continue,
                Some(BlockingHit::Target(hit)) => {
                    self.hit_target(projectile, hit, segment.direction);
                    return TravelOutcome::Remove(RemovalReason::Impact);
                }
                Some(BlockingHit::World(surface)) => return self.stop_at(projectile, &surface),
                Some(BlockingHit::Blocker { blocker, hit }) => {
                    if let Some(outcome) = self.hit_blocker(projectile, blocker, &hit, segment) {
                        return outcome;
                    }
                }
            }
        }
    }

    fn should_expire(&mut self, projectile: &Projectile) -> bool {
        projectile.lifecycle.as_ref().is_some_and(|lifecycle| {
            lifecycle.should_expire(&ExpiryContext {
                id: projectile.id,
                age: projectile.age,
                position: projectile.position,
                velocity: projectile.velocity,
            })
        })
    }

    fn on_after_move(&mut self, projectile: &mut Projectile, _now: f32) -> Option<RemovalReason> {
        let fuse = projectile.proximity_fuse?;
        let near = self.registry.nearest_within(projectile.position, fuse, projectile.owner)?;

        logger::log(&format!("📡 {} proximity fuse: {} within {:.2}", projectile.id, near.id, fuse));
        let direction = safe_normalize(projectile.velocity);
        self.hit_target(
            projectile,
            TargetHit {
                point: projectile.position,
                ..near
            },
            direction,
        );
        Some(RemovalReason::Impact)
    }

    fn on_remove(&mut self, mut projectile: Projectile, reason: RemovalReason) {
        if reason == RemovalReason::Forced && projectile.detonate_on_removal {
            let center = projectile.position;
            self.detonate(&mut projectile, center, None);
        }

        notify_removed(&mut projectile, reason, self.events);
        self.pool.release(&projectile.visual);
    }
}
