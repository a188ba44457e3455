//! ECS Components for entities that take part in hit detection
//!
//! Организация по доменам:
//! - target: links an entity to its `CombatTargetRegistry` record
//! - blocker: shields / walls that stop or reflect projectiles

pub mod blocker;
pub mod target;

pub use blocker::*;
pub use target::*;
