//! Projectile simulation.
//!
//! # Architecture
//!
//! - `ProjectileSimulator` (Resource): owns every `Projectile` and
//!   `ExplosionFragment`, their pooled visuals and the fragment RNG
//! - `fire()` → `Projectile` record; `update()` once per tick drives
//!   `LinearMotionIntegrator` with the blocking/reflection policies
//! - `ProjectileLifecycle`: per-ability hooks (forces, expiry, removal)
//! - `SimulationEvent`: hits, reflections, explosions, removals for the host
//!
//! Lifecycle: `Flying → {Impacted, Expired, ForcedRemoved, Cleared}`; all
//! terminal, one `on_remove` each. Splash is a one-shot side transition.

pub mod events;
pub mod fragments;
pub mod lifecycle;
pub mod pool;
pub mod projectile;
pub mod simulator;


pub use events::SimulationEvent;
pub use fragments::ExplosionFragment;
pub use lifecycle::{
    Ballistic, Drag, ExpiryContext, ForceContext, Homing, MotionProfile, ProjectileLifecycle, RemovalContext,
    Straight,
};
pub use pool::{GeometryKey, MaterialKey, ReleasedResource, VisualHandle, VisualPool};
pub use projectile::{FireConfig, Projectile, ProjectileCosmetics, ProjectileId, SplashConfig};
pub use simulator::{default_projectile_damage, FrameInput, ProjectileSimulator};
