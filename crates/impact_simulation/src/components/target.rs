//! Combat target components

use bevy::prelude::*;

use crate::targets::TargetId;

/// Entity ↔ registry link. `sync_target_volumes` moves the registered
/// volume to follow this entity's `Transform`.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CombatTargetBinding(pub TargetId);
