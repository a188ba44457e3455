//! VisualPool: reference-tracked render resources of projectiles.
//!
//! Geometry is shared per radius bucket (millimetres). Projectiles without a
//! color override share one default material; a color override gets an
//! exclusive material owned by that projectile alone. A resource is queued
//! for release once nothing live references it; the renderer drains the
//! queue with `drain_released`.

use std::collections::{BTreeMap, BTreeSet};

/// Shared sphere geometry, keyed by radius in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryKey(pub u32);

impl GeometryKey {
    pub fn from_radius(radius: f32) -> Self {
        let millimetres = (radius.max(0.0) * 1000.0).round();
        Self(millimetres.min(u32::MAX as f32) as u32)
    }

    pub fn radius(&self) -> f32 {
        self.0 as f32 / 1000.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MaterialKey {
    /// Default projectile material
    Shared,
    /// Owned by a single projectile (color override)
    Exclusive(u64),
}

/// Render handle held by one projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualHandle {
    pub geometry: GeometryKey,
    pub material: MaterialKey,
    pub color: Option<[u8; 4]>,
}

impl VisualHandle {
    /// Owns a disposable material
    pub fn is_exclusive(&self) -> bool {
        matches!(self.material, MaterialKey::Exclusive(_))
    }
}

/// Resource nobody references anymore
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleasedResource {
    Geometry(GeometryKey),
    Material(MaterialKey),
}

#[derive(Debug, Default)]
pub struct VisualPool {
    geometry_refs: BTreeMap<GeometryKey, usize>,
    shared_material_refs: usize,
    exclusive_materials: BTreeSet<u64>,
    next_material: u64,
    released: Vec<ReleasedResource>,
}

impl VisualPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for a projectile of `radius`, optional RGBA color override (0..1)
    pub fn acquire(&mut self, radius: f32, color: Option<[f32; 4]>) -> VisualHandle {
        let geometry = GeometryKey::from_radius(radius);
        *self.geometry_refs.entry(geometry).or_insert(0) += 1;

        let material = match color {
            Some(_) => {
                self.next_material += 1;
                self.exclusive_materials.insert(self.next_material);
                MaterialKey::Exclusive(self.next_material)
            }
            None => {
                self.shared_material_refs += 1;
                MaterialKey::Shared
            }
        };

        VisualHandle {
            geometry,
            material,
            color: color.map(quantize_color),
        }
    }

    /// Drop one reference; last reference queues the resource for release.
    pub fn release(&mut self, handle: &VisualHandle) {
        if let MaterialKey::Exclusive(id) = handle.material {
            if !self.exclusive_materials.contains(&id) {
                // Already released
                return;
            }
        }

        if let Some(count) = self.geometry_refs.get_mut(&handle.geometry) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.geometry_refs.remove(&handle.geometry);
                self.released.push(ReleasedResource::Geometry(handle.geometry));
            }
        }

        match handle.material {
            MaterialKey::Exclusive(id) => {
                if self.exclusive_materials.remove(&id) {
                    self.released.push(ReleasedResource::Material(handle.material));
                }
            }
            MaterialKey::Shared => {
                if self.shared_material_refs > 0 {
                    self.shared_material_refs -= 1;
                    if self.shared_material_refs == 0 {
                        self.released.push(ReleasedResource::Material(MaterialKey::Shared));
                    }
                }
            }
        }
    }

    /// Release everything still referenced (teardown)
    pub fn release_all(&mut self) {
        let geometries: Vec<_> = std::mem::take(&mut self.geometry_refs).into_keys().collect();
        self.released
            .extend(geometries.into_iter().map(ReleasedResource::Geometry));

        let exclusive: Vec<_> = std::mem::take(&mut self.exclusive_materials).into_iter().collect();
        self.released.extend(
            exclusive
                .into_iter()
                .map(|id| ReleasedResource::Material(MaterialKey::Exclusive(id))),
        );

        if self.shared_material_refs > 0 {
            self.shared_material_refs = 0;
            self.released.push(ReleasedResource::Material(MaterialKey::Shared));
        }
    }

    pub fn drain_released(&mut self) -> Vec<ReleasedResource> {
        std::mem::take(&mut self.released)
    }

    pub fn live_geometries(&self) -> usize {
        self.geometry_refs.len()
    }

    pub fn live_exclusive_materials(&self) -> usize {
        self.exclusive_materials.len()
    }

    pub fn shared_material_refs(&self) -> usize {
        self.shared_material_refs
    }

    pub fn is_empty(&self) -> bool {
        self.geometry_refs.is_empty() && self.exclusive_materials.is_empty() && self.shared_material_refs == 0
    }
}

fn quantize_color(color: [f32; 4]) -> [u8; 4] {
    color.map(|channel| {
        let channel = if channel.is_finite() { channel.clamp(0.0, 1.0) } else { 0.0 };
        (channel * 255.0).round() as u8
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_shared_per_radius_bucket() {
        let mut pool = VisualPool::new();
        let a = pool.acquire(0.12, None);
        let b = pool.acquire(0.1201, None);
        let c = pool.acquire(0.3, None);

        assert_eq!(a.geometry, b.geometry);
        assert_ne!(a.geometry, c.geometry);
        assert_eq!(pool.live_geometries(), 2);
        assert_eq!(pool.shared_material_refs(), 3);

        pool.release(&a);
        assert!(pool.drain_released().is_empty());
        pool.release(&b);
        assert_eq!(pool.drain_released(), vec![ReleasedResource::Geometry(GeometryKey(120))]);
    }

    #[test]
    fn test_color_override_gets_exclusive_material() {
        let mut pool = VisualPool::new();
        let plain = pool.acquire(0.12, None);
        let tinted = pool.acquire(0.12, Some([1.0, 0.2, 0.2, 1.0]));

        assert!(!plain.is_exclusive());
        assert!(tinted.is_exclusive());
        assert_eq!(tinted.color, Some([255, 51, 51, 255]));

        pool.release(&tinted);
        assert_eq!(
            pool.drain_released(),
            vec![ReleasedResource::Material(tinted.material)]
        );
        // Releasing twice is a no-op
        pool.release(&tinted);
        assert!(pool.drain_released().is_empty());
    }

    #[test]
    fn test_release_all_empties_pool() {
        let mut pool = VisualPool::new();
        pool.acquire(0.12, None);
        pool.acquire(0.2, Some([0.0, 0.0, 1.0, 1.0]));

        pool.release_all();
        assert!(pool.is_empty());
        assert_eq!(pool.drain_released().len(), 4);

        pool.release_all();
        assert!(pool.drain_released().is_empty());
    }
}
