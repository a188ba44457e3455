//! Blocker components (energy shields, walls, parry volumes)

use std::sync::Arc;

use bevy::prelude::*;

use crate::blocking::{BlockerShape, ReflectionSurface};
use crate::targets::TargetId;

/// Volume that stops projectiles. Only the extent of `shape` matters: its
/// center is replaced by the entity's `Transform` translation every tick.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct BlockerVolume {
    pub shape: BlockerShape,
    /// Projectiles fired by this target pass through (own shield)
    pub owner: Option<TargetId>,
}

impl BlockerVolume {
    pub fn new(shape: BlockerShape) -> Self {
        Self { shape, owner: None }
    }

    pub fn with_owner(mut self, owner: TargetId) -> Self {
        self.owner = Some(owner);
        self
    }
}

/// Tag: treated as static world geometry (no handler, no reflection)
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct WorldOnlyBlocker;

/// Reflection capability. Looked up on the blocker entity first, then on
/// its direct `ChildOf` parent; nothing further up.
#[derive(Component, Clone)]
pub struct Reflector(pub Arc<dyn ReflectionSurface>);

impl Reflector {
    pub fn new(surface: impl ReflectionSurface + 'static) -> Self {
        Self(Arc::new(surface))
    }
}

impl std::fmt::Debug for Reflector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reflector").finish_non_exhaustive()
    }
}
