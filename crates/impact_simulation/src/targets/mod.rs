//! Combat targets: who can be hit and how hits are delivered.
//!
//! # Architecture
//!
//! - `CombatTargetRegistry` (Resource): shared list of hittable entries,
//!   populated by spawners (actors, bosses, summons), read by projectiles
//! - `CombatTarget`: registry entry: id, volume, category/label, handle
//! - `CombatTargetHandle`: capability trait: activity, health, `on_hit`
//! - `Hit`: ephemeral value passed to `on_hit`, never retained
//!
//! Removal during a query (target dies inside `on_hit`) is index-stable:
//! the registry removes the entry right after the callback and the query
//! never revisits it.

pub mod hit;
pub mod registry;
pub mod target;


pub use hit::{Hit, HitReaction, HitSource};
pub use registry::{CombatTargetRegistry, MeleeSwing, RegistryError, TargetHit};
pub use target::{CombatTarget, CombatTargetHandle, HitVolume, SimpleTarget, TargetCategory, TargetId};
