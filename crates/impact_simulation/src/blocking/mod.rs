//! Blocking and reflection: everything that can stop a projectile besides a
//! combat target.
//!
//! # Architecture
//!
//! - `Blocker`: per-frame snapshot of a shield / wall (shape, owner,
//!   world-only tag, optional reflector)
//! - `WorldCollision`: static world ray casts (rapier or `StaticWorld`)
//! - `resolve_segment`: nearest of target / world / blocker
//! - `BlockHitHandler`: ability-specific reaction, asked first
//! - `ReflectionSurface` + `compute_redirect`: bounce instead of stop

pub mod blocker;
pub mod policy;
pub mod reflection;
pub mod world;

pub use blocker::{Blocker, BlockerId, BlockerShape, SurfaceHit};
pub use policy::{resolve_segment, BlockDecision, BlockHit, BlockHitHandler, BlockingHit, SegmentQuery};
pub use reflection::{
    compute_redirect, effective_multiplier, FixedReflector, ParryWindowReflector, Redirect, ReflectionQuery,
    ReflectionResponse, ReflectionSurface, MIN_REFLECTED_SPEED, MIN_REFLECTION_MULTIPLIER, REFLECTION_CLEARANCE,
};
pub use world::{NearestSurface, NoWorldCollision, StaticBox, StaticWorld, WorldCollision};
