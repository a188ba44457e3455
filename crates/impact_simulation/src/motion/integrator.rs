//! LinearMotionIntegrator: generic frame step for linear bodies.
//!
//! Per body, per frame:
//! 1. pending removal (forced/cleared from outside) → remove, nothing else
//! 2. `apply_forces` hook; declined → default gravity
//! 3. travel segment `position → position + velocity × delta`
//! 4. segment longer than epsilon → `on_travel` (collision resolution)
//! 5. commit position (unless redirected), accumulate life,
//!    expire on `life ≥ max_life` or `should_expire`
//! 6. `on_after_move` (proximity checks)
//!
//! Removal moves the body out of the collection and hands it to
//! `on_remove`: exactly once per body. Iteration runs from the end of the
//! collection backward, so removing index `i` never shifts an unvisited body.

use bevy::prelude::*;

/// Terminal reason attached to every removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum RemovalReason {
    /// Collision resolved to removal (target, world, blocker)
    Impact,
    /// `life ≥ max_life` or the expiry predicate fired
    Expired,
    /// Bulk teardown (`dispose`, scene reset)
    Cleared,
    /// External request (ability ended early)
    Forced,
}

/// Did the force hook take care of acceleration this frame?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceOutcome {
    /// Custom forces applied, skip default gravity
    Applied,
    /// Hook has nothing to say, apply default gravity
    Declined,
}

/// Result of collision resolution for one segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelOutcome {
    /// Nothing blocking: commit the precomputed next position
    Continue,
    /// Hook already moved the body (reflection); don't overwrite position
    Redirected,
    /// Stop here and remove the body
    Remove(RemovalReason),
}

/// The path a body wants to travel this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TravelSegment {
    pub origin: Vec3,
    pub target: Vec3,
    /// Unit direction `origin → target`
    pub direction: Vec3,
    pub distance: f32,
    pub now: f32,
    pub delta: f32,
}

/// Kinematic record the integrator can advance
pub trait LinearBody {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    fn velocity(&self) -> Vec3;
    fn velocity_mut(&mut self) -> &mut Vec3;
    fn life(&self) -> f32;
    fn add_life(&mut self, delta: f32);
    fn max_life(&self) -> f32;
    fn radius(&self) -> f32;

    /// Removal requested outside the frame loop (checked before anything else)
    fn pending_removal(&self) -> Option<RemovalReason> {
        None
    }
}

/// Caller-supplied decisions for a collection of `T`
pub trait MotionHooks<T: LinearBody> {
    fn apply_forces(&mut self, _body: &mut T, _now: f32, _delta: f32) -> ForceOutcome {
        ForceOutcome::Declined
    }

    fn on_travel(&mut self, _body: &mut T, _segment: &TravelSegment) -> TravelOutcome {
        TravelOutcome::Continue
    }

    fn should_expire(&mut self, _body: &T) -> bool {
        false
    }

    fn on_after_move(&mut self, _body: &mut T, _now: f32) -> Option<RemovalReason> {
        None
    }

    /// Body has left the collection; fired exactly once
    fn on_remove(&mut self, body: T, reason: RemovalReason);
}

/// Gravity + epsilon; everything else comes from the hooks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearMotionIntegrator {
    pub gravity: Vec3,
    /// Segments shorter than this skip `on_travel`
    pub epsilon: f32,
}

impl Default for LinearMotionIntegrator {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            epsilon: 1e-5,
        }
    }
}

impl LinearMotionIntegrator {
    pub fn new(gravity: Vec3, epsilon: f32) -> Self {
        Self { gravity, epsilon }
    }

    /// Advance every body by `delta`. Returns how many were removed.
    pub fn advance<T, H>(&self, bodies: &mut Vec<T>, now: f32, delta: f32, hooks: &mut H) -> usize
    where
        T: LinearBody,
        H: MotionHooks<T>,
    {
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        let mut removed = 0;

        for index in (0..bodies.len()).rev() {
            let Some(body) = bodies.get_mut(index) else {
                continue;
            };

            if let Some(reason) = self.step(body, now, delta, hooks) {
                let body = bodies.remove(index);
                hooks.on_remove(body, reason);
                removed += 1;
            }
        }

        removed
    }

    /// One body, one frame. `Some(reason)` → caller removes the body.
    fn step<T, H>(&self, body: &mut T, now: f32, delta: f32, hooks: &mut H) -> Option<RemovalReason>
    where
        T: LinearBody,
        H: MotionHooks<T>,
    {
        if let Some(reason) = body.pending_removal() {
            return Some(reason);
        }

        if hooks.apply_forces(body, now, delta) == ForceOutcome::Declined {
            *body.velocity_mut() += self.gravity * delta;
        }
        if !body.velocity().is_finite() {
            *body.velocity_mut() = Vec3::ZERO;
        }

        let origin = body.position();
        let next = origin + body.velocity() * delta;
        let travel = next - origin;
        let distance = travel.length();

        let mut redirected = false;
        if distance > self.epsilon {
            let segment = TravelSegment {
                origin,
                target: next,
                direction: travel / distance,
                distance,
                now,
                delta,
            };

            match hooks.on_travel(body, &segment) {
                TravelOutcome::Continue => {}
                TravelOutcome::Redirected => redirected = true,
                TravelOutcome::Remove(reason) => return Some(reason),
            }
        }

        if !redirected {
            body.set_position(next);
        }
        body.add_life(delta);

        if body.life() >= body.max_life() || hooks.should_expire(body) {
            return Some(RemovalReason::Expired);
        }

        hooks.on_after_move(body, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Particle {
        id: u32,
        position: Vec3,
        velocity: Vec3,
        life: f32,
        max_life: f32,
        forced: bool,
    }

    impl Particle {
        fn new(id: u32, velocity: Vec3, max_life: f32) -> Self {
            Self {
                id,
                position: Vec3::ZERO,
                velocity,
                life: 0.0,
                max_life,
                forced: false,
            }
        }
    }

    impl LinearBody for Particle {
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
            0.1
        }
        fn pending_removal(&self) -> Option<RemovalReason> {
            self.forced.then_some(RemovalReason::Forced)
        }
    }

    /// Records removals; optional wall at x = `wall_x`
    #[derive(Default)]
    struct Recorder {
        removed: Vec<(u32, RemovalReason)>,
        travels: usize,
        wall_x: Option<f32>,
        no_gravity: bool,
    }

    impl MotionHooks<Particle> for Recorder {
        fn apply_forces(&mut self, _body: &mut Particle, _now: f32, _delta: f32) -> ForceOutcome {
            if self.no_gravity {
                ForceOutcome::Applied
            } else {
                ForceOutcome::Declined
            }
        }

        fn on_travel(&mut self, _body: &mut Particle, segment: &TravelSegment) -> TravelOutcome {
            self.travels += 1;
            match self.wall_x {
                Some(x) if segment.target.x >= x => TravelOutcome::Remove(RemovalReason::Impact),
                _ => TravelOutcome::Continue,
            }
        }

        fn on_remove(&mut self, body: Particle, reason: RemovalReason) {
            self.removed.push((body.id, reason));
        }
    }

    #[test]
    fn test_default_gravity_when_forces_declined() {
        let integrator = LinearMotionIntegrator::default();
        let mut bodies = vec![Particle::new(1, Vec3::ZERO, 10.0)];
        let mut hooks = Recorder::default();

        integrator.advance(&mut bodies, 0.0, 0.5, &mut hooks);

        assert!((bodies[0].velocity.y + 9.81 * 0.5).abs() < 1e-5);
        assert!(bodies[0].position.y < 0.0);
    }

    #[test]
    fn test_custom_forces_skip_gravity() {
        let integrator = LinearMotionIntegrator::default();
        let mut bodies = vec![Particle::new(1, Vec3::X, 10.0)];
        let mut hooks = Recorder {
            no_gravity: true,
            ..Default::default()
        };

        integrator.advance(&mut bodies, 0.0, 1.0, &mut hooks);

        assert_eq!(bodies[0].velocity, Vec3::X);
        assert_eq!(bodies[0].position, Vec3::X);
    }

    #[test]
    fn test_expires_at_max_life_exactly_once() {
        let integrator = LinearMotionIntegrator::default();
        let mut bodies = vec![Particle::new(1, Vec3::X, 2.2)];
        let mut hooks = Recorder {
            no_gravity: true,
            ..Default::default()
        };

        let mut frames = 0;
        while !bodies.is_empty() && frames < 100 {
            integrator.advance(&mut bodies, frames as f32 * 0.1, 0.1, &mut hooks);
            frames += 1;
        }

        assert!(bodies.is_empty());
        assert!((22..=23).contains(&frames), "frames = {}", frames);
        assert_eq!(hooks.removed, vec![(1, RemovalReason::Expired)]);

        // Further frames don't re-fire
        integrator.advance(&mut bodies, 100.0, 0.1, &mut hooks);
        assert_eq!(hooks.removed.len(), 1);
    }

    #[test]
    fn test_travel_hook_removal_skips_commit() {
        let integrator = LinearMotionIntegrator::default();
        let mut bodies = vec![Particle::new(1, Vec3::new(10.0, 0.0, 0.0), 10.0)];
        let mut hooks = Recorder {
            no_gravity: true,
            wall_x: Some(5.0),
            ..Default::default()
        };

        integrator.advance(&mut bodies, 0.0, 0.25, &mut hooks); // x = 2.5
        assert_eq!(bodies.len(), 1);
        integrator.advance(&mut bodies, 0.25, 0.25, &mut hooks); // x would be 5.0
        assert!(bodies.is_empty());
        assert_eq!(hooks.removed, vec![(1, RemovalReason::Impact)]);
    }

    #[test]
    fn test_short_segment_skips_travel_hook() {
        let integrator = LinearMotionIntegrator::default();
        let mut bodies = vec![Particle::new(1, Vec3::ZERO, 10.0)];
        let mut hooks = Recorder {
            no_gravity: true,
            ..Default::default()
        };

        integrator.advance(&mut bodies, 0.0, 0.1, &mut hooks);
        assert_eq!(hooks.travels, 0);
        assert!((bodies[0].life - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_pending_removal_wins_before_motion() {
        let integrator = LinearMotionIntegrator::default();
        let mut forced = Particle::new(2, Vec3::X, 10.0);
        forced.forced = true;
        let mut bodies = vec![Particle::new(1, Vec3::X, 10.0), forced, Particle::new(3, Vec3::X, 10.0)];
        let mut hooks = Recorder {
            no_gravity: true,
            ..Default::default()
        };

        let removed = integrator.advance(&mut bodies, 0.0, 0.1, &mut hooks);

        assert_eq!(removed, 1);
        assert_eq!(hooks.removed, vec![(2, RemovalReason::Forced)]);
        // Forced body never travelled; the other two did
        assert_eq!(hooks.travels, 2);
        let ids: Vec<_> = bodies.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_removing_many_in_one_frame_visits_each_once() {
        let integrator = LinearMotionIntegrator::default();
        let mut bodies: Vec<_> = (0..5).map(|id| Particle::new(id, Vec3::X, 0.05)).collect();
        let mut hooks = Recorder {
            no_gravity: true,
            ..Default::default()
        };

        let removed = integrator.advance(&mut bodies, 0.0, 0.1, &mut hooks);

        assert_eq!(removed, 5);
        // Backward iteration: newest first
        let ids: Vec<_> = hooks.removed.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_negative_delta_is_clamped() {
        let integrator = LinearMotionIntegrator::default();
        let mut bodies = vec![Particle::new(1, Vec3::X, 10.0)];
        let mut hooks = Recorder::default();

        integrator.advance(&mut bodies, 0.0, -1.0, &mut hooks);

        assert_eq!(bodies[0].position, Vec3::ZERO);
        assert_eq!(bodies[0].life, 0.0);
    }
}
