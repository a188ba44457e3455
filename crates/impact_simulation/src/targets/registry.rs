//! CombatTargetRegistry: shared list of hittable entries + hit queries.
//!
//! # Queries
//!
//! - `intersect_by_ray`: exact ray test against each active volume
//! - `intersect_by_radius`: swept sphere: bounding-sphere center projected
//!   on the ray (clamped to `[0, far]`), accepted when the closest-point
//!   distance ≤ target radius + query radius
//! - `intersect`: both; the ray hit wins ties
//!
//! # Hit delivery
//!
//! - `apply_hit`: single target
//! - `perform_melee_attack`: N nearest targets in ascending distance
//! - `apply_explosion_damage`: radial falloff, optional excluded id
//!
//! Multi-target delivery iterates backward (or re-resolves ids) so an entry
//! removed inside its own `on_hit` is never visited again.

use bevy::prelude::*;
use thiserror::Error;

use super::hit::{Hit, HitReaction, HitSource};
use super::target::{CombatTarget, HitVolume, TargetId};
use crate::logger;
use crate::math::{clamped_projection, non_negative, round_damage, safe_normalize};

/// Splash falloff: damage = base × (SPLASH_EDGE_FACTOR + (1 - d/r) × SPLASH_CENTER_BONUS)
pub const SPLASH_EDGE_FACTOR: f32 = 0.45;
pub const SPLASH_CENTER_BONUS: f32 = 0.55;

/// Registry contract violations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("combat target {0} is already registered")]
    DuplicateTarget(TargetId),
}

/// Result of a single-target query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetHit {
    pub id: TargetId,
    /// Distance along the query ray
    pub distance: f32,
    /// World-space point on the ray at `distance`
    pub point: Vec3,
}

/// Melee sweep parameters (cleave / AoE weapons).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeleeSwing {
    pub origin: Vec3,
    pub direction: Vec3,
    pub damage: f32,
    pub max_distance: f32,
    /// Swept-sphere radius of the weapon arc
    pub hit_radius: f32,
    /// How many of the nearest candidates take damage
    pub max_hits: usize,
    /// Attacker's own target id (never hit by its own swing)
    pub attacker: Option<TargetId>,
}

impl MeleeSwing {
    pub fn new(origin: Vec3, direction: Vec3, damage: f32, max_distance: f32) -> Self {
        Self {
            origin,
            direction,
            damage,
            max_distance,
            hit_radius: 0.5,
            max_hits: 1,
            attacker: None,
        }
    }

    pub fn with_hit_radius(mut self, hit_radius: f32) -> Self {
        self.hit_radius = hit_radius;
        self
    }

    pub fn with_max_hits(mut self, max_hits: usize) -> Self {
        self.max_hits = max_hits;
        self
    }

    pub fn with_attacker(mut self, attacker: TargetId) -> Self {
        self.attacker = Some(attacker);
        self
    }
}

/// Shared registry of combat targets.
///
/// Mutated by spawners between frames; projectiles and melee only read it
/// and deliver hits through it.
#[derive(Resource, Default)]
pub struct CombatTargetRegistry {
    targets: Vec<CombatTarget>,
    /// Time stamped on every delivered `Hit`
    clock: f32,
}

impl CombatTargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Add a target. At most one live entry per id.
    pub fn register(&mut self, target: CombatTarget) -> Result<(), RegistryError> {
        if self.contains(target.id) {
            logger::log_warning(&format!("⚠️ Duplicate combat target registration: {}", target.id));
            return Err(RegistryError::DuplicateTarget(target.id));
        }

        logger::log(&format!(
            "🎯 Registered {} '{}' ({:?})",
            target.id, target.label, target.category
        ));
        self.targets.push(target);
        Ok(())
    }

    /// Remove a target (death, scene teardown). Order of the rest is kept.
    pub fn unregister(&mut self, id: TargetId) -> Option<CombatTarget> {
        let index = self.index_of(id)?;
        Some(self.targets.remove(index))
    }

    pub fn clear(&mut self) {
        self.targets.clear();
    }

    /// Move/resize a target's volume (transform sync). Returns false for unknown ids.
    pub fn set_volume(&mut self, id: TargetId, volume: HitVolume) -> bool {
        match self.get_mut(id) {
            Some(target) => {
                target.volume = volume;
                true
            }
            None => false,
        }
    }

    pub fn set_clock(&mut self, now: f32) {
        if now.is_finite() {
            self.clock = now;
        }
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    // ------------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------------

    pub fn contains(&self, id: TargetId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn get(&self, id: TargetId) -> Option<&CombatTarget> {
        self.targets.iter().find(|target| target.id == id)
    }

    pub fn get_mut(&mut self, id: TargetId) -> Option<&mut CombatTarget> {
        self.targets.iter_mut().find(|target| target.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CombatTarget> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    fn index_of(&self, id: TargetId) -> Option<usize> {
        self.targets.iter().position(|target| target.id == id)
    }

    fn active_targets(&self, exclude: Option<TargetId>) -> impl Iterator<Item = &CombatTarget> {
        self.targets
            .iter()
            .filter(move |target| Some(target.id) != exclude && target.is_active())
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Nearest active target whose volume the ray enters within `far`.
    pub fn intersect_by_ray(&self, origin: Vec3, direction: Vec3, far: f32) -> Option<TargetHit> {
        self.intersect_by_ray_excluding(origin, direction, far, None)
    }

    pub fn intersect_by_ray_excluding(
        &self,
        origin: Vec3,
        direction: Vec3,
        far: f32,
        exclude: Option<TargetId>,
    ) -> Option<TargetHit> {
        let direction = safe_normalize(direction);
        let far = non_negative(far);
        let mut best: Option<TargetHit> = None;

        for target in self.active_targets(exclude) {
            let Some(distance) = target.volume.ray_distance(origin, direction, far) else {
                continue;
            };
            // Strict `<` keeps registration order on equal distances
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(TargetHit {
                    id: target.id,
                    distance,
                    point: origin + direction * distance,
                });
            }
        }

        best
    }

    /// Swept-sphere query (see module docs). Smallest projected distance wins.
    pub fn intersect_by_radius(&self, origin: Vec3, direction: Vec3, far: f32, radius: f32) -> Option<TargetHit> {
        self.intersect_by_radius_excluding(origin, direction, far, radius, None)
    }

    pub fn intersect_by_radius_excluding(
        &self,
        origin: Vec3,
        direction: Vec3,
        far: f32,
        radius: f32,
        exclude: Option<TargetId>,
    ) -> Option<TargetHit> {
        let direction = safe_normalize(direction);
        self.radius_candidates(origin, direction, far, radius, exclude, false)
            .into_iter()
            .next()
    }

    /// Ray + swept sphere; ray hit wins when its distance ≤ the radius hit's.
    pub fn intersect(&self, origin: Vec3, direction: Vec3, far: f32, radius: f32) -> Option<TargetHit> {
        self.intersect_excluding(origin, direction, far, radius, None)
    }

    pub fn intersect_excluding(
        &self,
        origin: Vec3,
        direction: Vec3,
        far: f32,
        radius: f32,
        exclude: Option<TargetId>,
    ) -> Option<TargetHit> {
        let ray_hit = self.intersect_by_ray_excluding(origin, direction, far, exclude);
        if non_negative(radius) <= 0.0 {
            return ray_hit;
        }

        let radius_hit = self.intersect_by_radius_excluding(origin, direction, far, radius, exclude);
        match (ray_hit, radius_hit) {
            (Some(ray), Some(swept)) if ray.distance <= swept.distance => Some(ray),
            (_, Some(swept)) => Some(swept),
            (ray, None) => ray,
        }
    }

    /// Nearest active target whose bounding sphere is within `distance` of `point`.
    pub fn nearest_within(&self, point: Vec3, distance: f32, exclude: Option<TargetId>) -> Option<TargetHit> {
        let distance = non_negative(distance);
        let mut best: Option<TargetHit> = None;

        for target in self.active_targets(exclude) {
            let (center, radius) = target.volume.bounding_sphere();
            let gap = (center.distance(point) - radius).max(0.0);
            if gap <= distance && best.map_or(true, |b| gap < b.distance) {
                best = Some(TargetHit {
                    id: target.id,
                    distance: gap,
                    point,
                });
            }
        }

        best
    }

    /// All swept-sphere candidates sorted ascending by projected distance.
    fn radius_candidates(
        &self,
        origin: Vec3,
        direction: Vec3,
        far: f32,
        radius: f32,
        exclude: Option<TargetId>,
        ahead_only: bool,
    ) -> Vec<TargetHit> {
        let far = non_negative(far);
        let radius = non_negative(radius);

        let mut candidates: Vec<TargetHit> = self
            .active_targets(exclude)
            .filter_map(|target| {
                let (center, target_radius) = target.volume.bounding_sphere();
                if ahead_only && (center - origin).dot(direction) < -target_radius {
                    return None;
                }

                let (t, gap) = clamped_projection(origin, direction, center, far);
                (gap <= target_radius + radius).then(|| TargetHit {
                    id: target.id,
                    distance: t,
                    point: origin + direction * t,
                })
            })
            .collect();

        // Stable sort: equal distances keep registration order
        candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        candidates
    }

    // ------------------------------------------------------------------------
    // Hit delivery
    // ------------------------------------------------------------------------

    /// Deliver one hit. Returns false if the target is unknown or inactive.
    ///
    /// A target answering `HitReaction::Remove` is unregistered immediately.
    pub fn apply_hit(&mut self, id: TargetId, hit: Hit) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.deliver_at(index, hit)
    }

    fn deliver_at(&mut self, index: usize, hit: Hit) -> bool {
        let Some(target) = self.targets.get_mut(index) else {
            return false;
        };
        if !target.is_active() {
            return false;
        }

        if target.handle.on_hit(&hit) == HitReaction::Remove {
            let removed = self.targets.remove(index);
            logger::log(&format!("💀 {} removed after {:?} hit", removed.id, hit.source));
        }
        true
    }

    /// Cleave attack: damages up to `max_hits` nearest targets ahead of the
    /// attacker, nearest first. Returns how many were actually hit.
    pub fn perform_melee_attack(&mut self, swing: &MeleeSwing) -> usize {
        let max_distance = non_negative(swing.max_distance);
        if max_distance <= 0.0 || swing.max_hits == 0 {
            return 0;
        }
        let Some(damage) = round_damage(swing.damage, 1) else {
            return 0;
        };

        let direction = safe_normalize(swing.direction);
        let candidates = self.radius_candidates(
            swing.origin,
            direction,
            max_distance,
            swing.hit_radius,
            swing.attacker,
            true,
        );

        let mut hits = 0;
        for candidate in candidates.into_iter().take(swing.max_hits) {
            let hit = Hit {
                time: self.clock,
                source: HitSource::Melee,
                damage,
                point: candidate.point,
                direction,
            };
            if self.apply_hit(candidate.id, hit) {
                hits += 1;
            }
        }

        hits
    }

    /// Splash damage with the default floor of 1.
    pub fn apply_explosion_damage(
        &mut self,
        center: Vec3,
        radius: f32,
        base_damage: f32,
        direction: Vec3,
        exclude: Option<TargetId>,
    ) -> usize {
        self.apply_explosion_damage_with_floor(center, radius, base_damage, direction, exclude, 1)
    }

    /// Splash damage: every active target with its center within `radius`
    /// takes `round(base × (0.45 + (1 - d/r) × 0.55))`, at least `floor`.
    /// Returns how many targets were hit.
    pub fn apply_explosion_damage_with_floor(
        &mut self,
        center: Vec3,
        radius: f32,
        base_damage: f32,
        direction: Vec3,
        exclude: Option<TargetId>,
        floor: u32,
    ) -> usize {
        let radius = non_negative(radius);
        if radius <= 0.0 || !base_damage.is_finite() || base_damage <= 0.0 {
            return 0;
        }
        let direction = safe_normalize(direction);

        let mut hits = 0;
        // Backward: removal inside on_hit doesn't shift unvisited entries
        for index in (0..self.targets.len()).rev() {
            let Some(target) = self.targets.get(index) else {
                continue;
            };
            if Some(target.id) == exclude || !target.is_active() {
                continue;
            }

            let target_center = target.volume.center();
            let distance = target_center.distance(center);
            if distance > radius {
                continue;
            }

            let falloff = SPLASH_EDGE_FACTOR + (1.0 - distance / radius) * SPLASH_CENTER_BONUS;
            let Some(damage) = round_damage(base_damage * falloff, floor) else {
                continue;
            };

            let hit = Hit {
                time: self.clock,
                source: HitSource::Explosion,
                damage,
                point: target_center,
                direction,
            };
            if self.deliver_at(index, hit) {
                hits += 1;
            }
        }

        hits
    }
}
