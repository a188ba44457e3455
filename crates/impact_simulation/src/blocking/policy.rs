//! CollisionBlockingPolicy: what stops a projectile on this segment.
//!
//! Three independent candidates per segment:
//! - (a) combat target (`CombatTargetRegistry::intersect`)
//! - (b) static world (`WorldCollision`, plus world-only blockers)
//! - (c) dynamic blocker (shields, deployable walls)
//!
//! Resolution: the target wins when its distance ≤ min(world, blocker);
//! otherwise the nearer of world/blocker, the world winning ties.

use bevy::prelude::*;

use super::blocker::{Blocker, BlockerId, SurfaceHit};
use super::world::WorldCollision;
use crate::projectiles::ProjectileId;
use crate::targets::{CombatTargetRegistry, TargetHit, TargetId};

/// One travel segment of one projectile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentQuery<'a> {
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
    pub distance: f32,
    /// Collision radius against blockers
    pub radius: f32,
    /// Swept radius against combat targets
    pub target_radius: f32,
    /// Shooter: never hit, its own blockers let the projectile through
    pub owner: Option<TargetId>,
    /// Blockers this projectile already passed through
    pub ignored_blockers: &'a [BlockerId],
}

/// Winning candidate of a segment
#[derive(Debug, Clone, Copy)]
pub enum BlockingHit<'a> {
    Target(TargetHit),
    World(SurfaceHit),
    Blocker { blocker: &'a Blocker, hit: SurfaceHit },
}

impl BlockingHit<'_> {
    pub fn distance(&self) -> f32 {
        match self {
            BlockingHit::Target(hit) => hit.distance,
            BlockingHit::World(hit) => hit.distance,
            BlockingHit::Blocker { hit, .. } => hit.distance,
        }
    }
}

/// Pick the nearest of target / world / blocker for one segment.
pub fn resolve_segment<'a>(
    registry: &CombatTargetRegistry,
    world: &dyn WorldCollision,
    blockers: &'a [Blocker],
    query: &SegmentQuery<'_>,
) -> Option<BlockingHit<'a>> {
    let target = registry.intersect_excluding(
        query.origin,
        query.direction,
        query.distance,
        query.target_radius,
        query.owner,
    );

    let mut world_hit = world.cast(query.origin, query.direction, query.distance);
    let mut blocker_hit: Option<(&'a Blocker, SurfaceHit)> = None;

    for blocker in blockers {
        if query.ignored_blockers.contains(&blocker.id) {
            continue;
        }
        // Self-shield bypass
        if blocker.owner.is_some() && blocker.owner == query.owner {
            continue;
        }
        let Some(hit) = blocker
            .shape
            .ray_hit(query.origin, query.direction, query.distance, query.radius)
        else {
            continue;
        };

        if blocker.world_only {
            if world_hit.map_or(true, |w| hit.distance < w.distance) {
                world_hit = Some(hit);
            }
        } else if blocker_hit.map_or(true, |(_, b)| hit.distance < b.distance) {
            blocker_hit = Some((blocker, hit));
        }
    }

    let obstacle = match (world_hit, blocker_hit) {
        (Some(world), Some((_, blocked))) if world.distance <= blocked.distance => Some(BlockingHit::World(world)),
        (_, Some((blocker, hit))) => Some(BlockingHit::Blocker { blocker, hit }),
        (Some(world), None) => Some(BlockingHit::World(world)),
        (None, None) => None,
    };

    match (target, obstacle) {
        (Some(target), Some(obstacle)) if target.distance <= obstacle.distance() => Some(BlockingHit::Target(target)),
        (_, Some(obstacle)) => Some(obstacle),
        (target, None) => target.map(BlockingHit::Target),
    }
}

/// What the ability-specific handler is told about a blocker hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockHit {
    pub time: f32,
    pub projectile: ProjectileId,
    /// Shooter of the projectile
    pub shooter: Option<TargetId>,
    pub blocker: BlockerId,
    /// Whoever raised the blocker
    pub blocker_owner: Option<TargetId>,
    pub point: Vec3,
    pub normal: Vec3,
    /// Unit travel direction
    pub direction: Vec3,
    pub speed: f32,
    pub damage: u32,
}

/// Handler verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum BlockDecision {
    /// Not mine: reflection, then generic stop (+ splash)
    #[default]
    Declined,
    /// Eaten by the blocker, no splash
    Absorbed,
    /// Blow up at the blocker (splash if configured)
    Detonated,
    /// Keep flying; this blocker is ignored for the rest of the projectile's life
    PassThrough,
}

/// Ability-specific reaction to projectiles hitting its blockers
/// (energy shield drain, absorb-and-recharge, early detonation).
pub trait BlockHitHandler: Send + Sync {
    fn handle_block_hit(&mut self, hit: &BlockHit) -> BlockDecision;
}

/// Closures work as handlers (tests, one-off abilities)
impl<F> BlockHitHandler for F
where
    F: FnMut(&BlockHit) -> BlockDecision + Send + Sync,
{
    fn handle_block_hit(&mut self, hit: &BlockHit) -> BlockDecision {
        self(hit)
    }
}
