//! Collision Layers Constants
//!
//! Rapier collision groups: centralised constants for world ray casts.
//!
//! ## Architecture:
//! - **Memberships:** which group a collider belongs to
//! - **Filters:** which groups a collider / query interacts with
//!
//! ## Groups:
//! - Group 1: Reserved
//! - Group 2: Actors (combat target colliders)
//! - Group 3: Environment (static walls, obstacles, terrain)
//! - Group 4: Projectiles
//! - Group 5: Blockers (shields, deployable walls)
//!
//! Projectile travel only asks rapier about the environment: actors are
//! resolved by `CombatTargetRegistry` and blockers by the blocking policy.
//!
//! ## Usage:
//! ```ignore
//! commands.spawn((
//!     Collider::cuboid(5.0, 2.0, 0.5),
//!     CollisionGroups::new(COLLISION_LAYER_ENVIRONMENT, COLLISION_MASK_ENVIRONMENT),
//! ));
//! ```

use bevy_rapier3d::prelude::{CollisionGroups, Group};

// ============================================================================
// Layers (memberships)
// ============================================================================

/// Group 2: Actors (players, NPCs, summons)
pub const COLLISION_LAYER_ACTORS: Group = Group::GROUP_2;

/// Group 3: Environment (walls, obstacles, terrain)
pub const COLLISION_LAYER_ENVIRONMENT: Group = Group::GROUP_3;

/// Group 4: Projectiles
pub const COLLISION_LAYER_PROJECTILES: Group = Group::GROUP_4;

/// Group 5: Ability-placed blockers
pub const COLLISION_LAYER_BLOCKERS: Group = Group::GROUP_5;

// ============================================================================
// Masks (filters)
// ============================================================================

/// Environment interacts with everything that moves
pub const COLLISION_MASK_ENVIRONMENT: Group = COLLISION_LAYER_ACTORS
    .union(COLLISION_LAYER_PROJECTILES)
    .union(COLLISION_LAYER_BLOCKERS);

/// Projectile world casts see the environment only
pub const COLLISION_MASK_PROJECTILES: Group = COLLISION_LAYER_ENVIRONMENT;

// ============================================================================
// Helper Functions
// ============================================================================

/// Groups used by `WorldCollision for RapierContext`
pub fn projectile_query_groups() -> CollisionGroups {
    CollisionGroups::new(COLLISION_LAYER_PROJECTILES, COLLISION_MASK_PROJECTILES)
}

/// Layer name for debug logs
pub fn get_layer_name(layer: Group) -> &'static str {
    if layer == COLLISION_LAYER_ACTORS {
        "Actors"
    } else if layer == COLLISION_LAYER_ENVIRONMENT {
        "Environment"
    } else if layer == COLLISION_LAYER_PROJECTILES {
        "Projectiles"
    } else if layer == COLLISION_LAYER_BLOCKERS {
        "Blockers"
    } else {
        "Unknown"
    }
}
