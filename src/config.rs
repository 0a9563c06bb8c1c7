//! Simulation configuration
//!
//! Passed in at initialize/reset time. Can also be loaded from JSON by the
//! headless runner.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SimError};

/// Simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Total population (kinds assigned round-robin)
    pub entity_count: usize,
    /// Collision radius shared by every entity
    pub radius: f32,
    pub arena_width: f32,
    pub arena_height: f32,
    /// Run seed (drawn from the OS when absent)
    pub seed: Option<u64>,

    // === Motion ===
    /// Initial speed range (px/s)
    pub speed_min: f32,
    pub speed_max: f32,
    /// Post-collision speed floor, 0 (default) keeps bounces purely elastic
    pub min_speed: f32,

    // === Collisions ===
    /// Separation overshoot factor (>= 1)
    pub separation_bias: f32,
    /// Broad-phase cell size (raised to at least one diameter)
    pub cell_size: Option<f32>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            entity_count: 30,
            radius: radius_for_per_type(10),
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            seed: None,

            speed_min: SPEED_MIN,
            speed_max: SPEED_MAX,
            min_speed: 0.0,

            separation_bias: SEPARATION_BIAS,
            cell_size: None,
        }
    }
}

impl SimConfig {
    /// Config with `per_type` entities of each kind, sized by the icon policy,
    /// with the post-collision speed floor switched on
    pub fn for_per_type(per_type: usize) -> Self {
        Self {
            entity_count: per_type * 3,
            radius: radius_for_per_type(per_type),
            min_speed: MIN_SPEED,
            ..Self::default()
        }
    }

    /// Builder-style seed override
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Effective broad-phase cell size
    pub fn effective_cell_size(&self) -> f32 {
        let diameter = 2.0 * self.radius;
        self.cell_size
            .unwrap_or(diameter * CELL_SIZE_FACTOR)
            .max(diameter)
    }

    /// Reject parameters the simulation cannot run with. No silent clamping.
    pub fn validate(&self) -> Result<()> {
        if self.entity_count == 0 {
            return Err(SimError::invalid("entity_count must be positive"));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(SimError::invalid(format!(
                "radius must be positive, got {}",
                self.radius
            )));
        }
        let dims_ok = |v: f32| v.is_finite() && v > 0.0;
        if !dims_ok(self.arena_width) || !dims_ok(self.arena_height) {
            return Err(SimError::invalid(format!(
                "arena must have positive size, got {}x{}",
                self.arena_width, self.arena_height
            )));
        }
        if 2.0 * self.radius > self.arena_width.min(self.arena_height) {
            return Err(SimError::invalid(format!(
                "radius {} does not fit in a {}x{} arena",
                self.radius, self.arena_width, self.arena_height
            )));
        }
        if !(self.speed_min.is_finite() && self.speed_max.is_finite())
            || self.speed_min < 0.0
            || self.speed_min > self.speed_max
        {
            return Err(SimError::invalid(format!(
                "bad speed range {}..{}",
                self.speed_min, self.speed_max
            )));
        }
        if !self.min_speed.is_finite() || self.min_speed < 0.0 {
            return Err(SimError::invalid("min_speed must be >= 0"));
        }
        if !self.separation_bias.is_finite() || self.separation_bias < 1.0 {
            return Err(SimError::invalid("separation_bias must be >= 1"));
        }
        if let Some(cell) = self.cell_size {
            if !cell.is_finite() || cell <= 0.0 {
                return Err(SimError::invalid("cell_size must be positive"));
            }
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Step-wise icon sizing: fewer entities get bigger icons.
///
/// Returns the collision radius for `per_type` entities of each kind.
pub fn radius_for_per_type(per_type: usize) -> f32 {
    let side = match per_type {
        0..=2 => 100.0,
        3..=5 => 64.0,
        6..=10 => 48.0,
        11..=20 => 40.0,
        21..=40 => 32.0,
        _ => 24.0,
    };
    side * ICON_RADIUS_FACTOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad = [
            SimConfig {
                entity_count: 0,
                ..Default::default()
            },
            SimConfig {
                radius: 0.0,
                ..Default::default()
            },
            SimConfig {
                radius: -3.0,
                ..Default::default()
            },
            SimConfig {
                radius: 400.0,
                ..Default::default()
            },
            SimConfig {
                arena_width: 0.0,
                ..Default::default()
            },
            SimConfig {
                speed_min: 300.0,
                speed_max: 100.0,
                ..Default::default()
            },
            SimConfig {
                separation_bias: 0.5,
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(SimError::InvalidConfiguration(_))),
                "{config:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_speed_floor_opt_in() {
        assert_eq!(SimConfig::default().min_speed, 0.0);
        let config = SimConfig::for_per_type(4);
        assert_eq!(config.entity_count, 12);
        assert_eq!(config.min_speed, MIN_SPEED);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_icon_sizing_steps() {
        assert!((radius_for_per_type(1) - 45.0).abs() < 1e-4);
        assert_eq!(radius_for_per_type(5), 64.0 * 0.45);
        assert_eq!(radius_for_per_type(100), 24.0 * 0.45);
        assert!(radius_for_per_type(10) > radius_for_per_type(11));
    }

    #[test]
    fn test_cell_size_never_below_diameter() {
        let config = SimConfig {
            radius: 10.0,
            cell_size: Some(5.0),
            ..Default::default()
        };
        assert_eq!(config.effective_cell_size(), 20.0);

        let config = SimConfig {
            radius: 10.0,
            cell_size: None,
            ..Default::default()
        };
        assert!((config.effective_cell_size() - 24.0).abs() < 1e-4);
    }

    #[test]
    fn test_json_partial_config_uses_defaults() {
        let config = SimConfig::from_json_str(r#"{ "entity_count": 9, "seed": 7 }"#).unwrap();
        assert_eq!(config.entity_count, 9);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.speed_min, SPEED_MIN);
    }

    #[test]
    fn test_json_invalid_config_rejected() {
        let err = SimConfig::from_json_str(r#"{ "radius": -1.0 }"#).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfiguration(_)));

        let err = SimConfig::from_json_str("not json").unwrap_err();
        assert!(matches!(err, SimError::Json(_)));
    }
}
