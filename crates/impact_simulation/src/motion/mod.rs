//! Per-frame linear motion for any projectile-like collection.
//!
//! The integrator owns no records: it advances a `Vec<T: LinearBody>` and
//! asks caller-supplied `MotionHooks` for forces, collision resolution,
//! expiry and removal side effects.

pub mod integrator;

pub use integrator::{
    ForceOutcome, LinearBody, LinearMotionIntegrator, MotionHooks, RemovalReason, TravelOutcome, TravelSegment,
};
