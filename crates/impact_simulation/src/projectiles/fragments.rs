//! Decorative explosion fragments. No gameplay state, never queried.

use bevy::prelude::*;
use rand::Rng;

use crate::motion::{LinearBody, MotionHooks, RemovalReason};

#[derive(Debug, Clone, PartialEq)]
pub struct ExplosionFragment {
    pub position: Vec3,
    pub velocity: Vec3,
    pub life: f32,
    pub max_life: f32,
    pub radius: f32,
    pub color: Option<[f32; 4]>,
}

impl ExplosionFragment {
    /// Random upward-biased scatter around `center`
    pub fn scatter<R: Rng>(rng: &mut R, center: Vec3, speed: f32, max_life: f32, radius: f32) -> Self {
        let direction = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(0.2..=1.0),
            rng.gen_range(-1.0..=1.0),
        )
        .normalize_or(Vec3::Y);
        let speed = speed * rng.gen_range(0.5..=1.0);
        let max_life = max_life * rng.gen_range(0.75..=1.0);

        Self {
            position: center,
            velocity: direction * speed,
            life: 0.0,
            max_life,
            radius,
            color: None,
        }
    }
}

impl LinearBody for ExplosionFragment {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn velocity_mut(&mut self) -> &mut Vec3 {
        &mut self.velocity
    }

    fn life(&self) -> f32 {
        self.life
    }

    fn add_life(&mut self, delta: f32) {
        self.life += delta;
    }

    fn max_life(&self) -> f32 {
        self.max_life
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

/// Fragments only fall and fade: default gravity, no collision
pub(crate) struct FragmentHooks;

impl MotionHooks<ExplosionFragment> for FragmentHooks {
    fn on_remove(&mut self, _fragment: ExplosionFragment, _reason: RemovalReason) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::LinearMotionIntegrator;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_scatter_is_deterministic_per_seed() {
        let mut a = ChaCha8Rng::seed_from_u64(42);
        let mut b = ChaCha8Rng::seed_from_u64(42);

        let fa = ExplosionFragment::scatter(&mut a, Vec3::ZERO, 6.0, 0.6, 0.05);
        let fb = ExplosionFragment::scatter(&mut b, Vec3::ZERO, 6.0, 0.6, 0.05);
        assert_eq!(fa, fb);
        assert!(fa.velocity.y > 0.0);
        assert!(fa.velocity.length() <= 6.0 + 1e-4);
    }

    #[test]
    fn test_fragments_fade_out() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut fragments: Vec<_> = (0..10)
            .map(|_| ExplosionFragment::scatter(&mut rng, Vec3::ZERO, 6.0, 0.6, 0.05))
            .collect();

        let integrator = LinearMotionIntegrator::default();
        for frame in 0..40 {
            integrator.advance(&mut fragments, frame as f32 / 60.0, 1.0 / 60.0, &mut FragmentHooks);
        }
        assert!(fragments.is_empty());
    }
}
