//! SimulationConfig: tuning of the projectile simulation.
//!
//! Loaded from JSON (ability/balance tables) or built with `Default`.
//! Every field has a default, so partial JSON is fine.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Malformed configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Default acceleration when a projectile has no custom forces
    pub gravity: Vec3,
    /// Segments shorter than this skip collision resolution
    pub travel_epsilon: f32,
    /// Frame delta cap (seconds), bounds tunnelling after a host stall
    pub max_frame_delta: f32,

    // Projectile defaults (fire)
    pub default_speed: f32,
    pub default_lifetime: f32,
    pub default_radius: f32,
    /// Resource granted to the shooter per direct target hit
    pub energy_gain_on_hit: f32,

    // Splash defaults
    pub splash_radius: f32,
    /// Splash damage = direct damage × factor (when not configured)
    pub splash_damage_factor: f32,
    pub splash_min_damage: u32,

    // Explosion fragments (decorative)
    pub fragment_count: usize,
    pub fragment_speed: f32,
    pub fragment_lifetime: f32,
    pub fragment_radius: f32,
    pub max_fragments: usize,

    /// Upper bound of the reflection speed multiplier (`None` = unbounded)
    pub max_reflection_multiplier: Option<f32>,

    /// Seed of the fragment scatter RNG
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            travel_epsilon: 1e-5,
            max_frame_delta: 0.25,
            default_speed: 18.0,
            default_lifetime: 2.2,
            default_radius: 0.12,
            energy_gain_on_hit: 4.0,
            splash_radius: 2.4,
            splash_damage_factor: 0.5,
            splash_min_damage: 1,
            fragment_count: 10,
            fragment_speed: 6.0,
            fragment_lifetime: 0.6,
            fragment_radius: 0.05,
            max_fragments: 256,
            max_reflection_multiplier: None,
            seed: 42,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would corrupt the simulation (NaN, negative sizes).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gravity.is_finite() {
            return Err(invalid("gravity", "must be finite"));
        }

        let non_negative = [
            ("travel_epsilon", self.travel_epsilon),
            ("default_speed", self.default_speed),
            ("energy_gain_on_hit", self.energy_gain_on_hit),
            ("splash_radius", self.splash_radius),
            ("splash_damage_factor", self.splash_damage_factor),
            ("fragment_speed", self.fragment_speed),
            ("fragment_lifetime", self.fragment_lifetime),
            ("fragment_radius", self.fragment_radius),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, format!("must be a finite value ≥ 0, got {}", value)));
            }
        }

        let positive = [
            ("max_frame_delta", self.max_frame_delta),
            ("default_lifetime", self.default_lifetime),
            ("default_radius", self.default_radius),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(field, format!("must be a finite value > 0, got {}", value)));
            }
        }

        if let Some(ceiling) = self.max_reflection_multiplier {
            if !ceiling.is_finite() || ceiling <= 0.0 {
                return Err(invalid(
                    "max_reflection_multiplier",
                    format!("must be a finite value > 0, got {}", ceiling),
                ));
            }
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
